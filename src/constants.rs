//! Centralised gameplay constants.
//!
//! All tuneable values live here so they can be found, reasoned-about, and
//! modified in one place without source-diving across multiple modules.
//! Runtime overrides load from `assets/game.toml` via [`crate::config`].
//!
//! ## Tuning guidance
//!
//! Each constant includes the observable consequence of changing it.  The
//! simulation is tick-based: one `Update` pass of the schedule is one tick,
//! nominally 60 per second, and every duration below is counted in ticks.

// ── Spawn Controller ──────────────────────────────────────────────────────────

/// Hard cap on the total NPC population.
///
/// The spawner never exceeds this regardless of how stale the schedule is.
pub const NPC_POPULATION_CAP: usize = 12;

/// Radius around the player inside which NPCs count as "nearby" for both the
/// spawn gate and the spawn-delay penalty.
pub const NPC_NEARBY_RADIUS: f32 = 1000.0;

/// Maximum nearby NPCs before spawning pauses entirely.
pub const NPC_NEARBY_CAP: usize = 5;

/// Base delay between spawn attempts (ticks; 180 ≈ 3 s).
pub const SPAWN_BASE_DELAY: u64 = 180;

/// Extra delay per NPC already near the player (ticks; 120 ≈ 2 s).
///
/// Crowded space slows the trickle of new arrivals.
pub const SPAWN_DELAY_PER_NEARBY: u64 = 120;

/// Spawn kind weights.  They sum to 1.0; the draw walks the table in this
/// order, so reordering changes which kind absorbs rounding slack.
pub const SPAWN_WEIGHT_FREIGHTER: f32 = 0.25;
pub const SPAWN_WEIGHT_TRADER: f32 = 0.30;
pub const SPAWN_WEIGHT_PATROL: f32 = 0.20;
pub const SPAWN_WEIGHT_PIRATE: f32 = 0.25;

/// Merchant spawn ring around the chosen planet (added to planet radius).
pub const SPAWN_MERCHANT_RING_MIN: f32 = 100.0;
pub const SPAWN_MERCHANT_RING_MAX: f32 = 200.0;

/// Traders leave their spawn planet already outbound at this speed fraction.
pub const TRADER_SPAWN_SPEED_FRAC: f32 = 0.5;

/// Pirate spawn ring around the player.  Pirates arrive already inbound at
/// [`SPAWN_PIRATE_SPEED_FRAC`] of their max speed.
pub const SPAWN_PIRATE_RING_MIN: f32 = 1200.0;
pub const SPAWN_PIRATE_RING_MAX: f32 = 1500.0;
pub const SPAWN_PIRATE_SPEED_FRAC: f32 = 0.3;

/// Patrol spawn ring around the player, drifting toward the player at half
/// their max speed.
pub const SPAWN_PATROL_RING_MIN: f32 = 400.0;
pub const SPAWN_PATROL_RING_MAX: f32 = 800.0;
pub const SPAWN_PATROL_SPEED_FRAC: f32 = 0.5;

/// Fallback spawn ring for any kind without a dedicated placement rule.
pub const SPAWN_DEFAULT_RING_MIN: f32 = 600.0;
pub const SPAWN_DEFAULT_RING_MAX: f32 = 1200.0;
pub const SPAWN_DEFAULT_SPEED_FRAC: f32 = 0.3;

// ── NPC Lifecycle ─────────────────────────────────────────────────────────────

/// NPCs strictly farther than this from the player are silently removed.
///
/// Must exceed every spawn ring or freshly spawned ships get culled.
pub const NPC_DESPAWN_DISTANCE: f32 = 3000.0;

/// Flat credit bonus on top of any bounty when the player scores a kill.
pub const KILL_BONUS_CREDITS: u32 = 25;

/// Fraction of template credits paid for non-aggressive kills.
/// Aggressive (pirate) kills pay the full template value.
pub const NON_PIRATE_BOUNTY_FRAC: f32 = 0.5;

// ── Pirate AI ─────────────────────────────────────────────────────────────────

/// A pursuing patrol inside this range triggers pirate evasion.
pub const PIRATE_EVADE_RANGE: f32 = 600.0;

/// Fleeing thrust cones: full power inside the first, half power inside the
/// second, coast beyond.
pub const PIRATE_FLEE_FULL_CONE: f32 = std::f32::consts::FRAC_PI_6; // 30°
pub const PIRATE_FLEE_HALF_CONE: f32 = std::f32::consts::FRAC_PI_3; // 60°

/// Hunt detection radius for the player and passive NPCs.
pub const PIRATE_HUNT_RANGE: f32 = 800.0;

/// Lead-pursuit time scale: intercept time = dist / (max_speed * this).
pub const PIRATE_INTERCEPT_SCALE: f32 = 50.0;

/// Stop thrusting inside this range; brake inside [`PIRATE_BRAKE_RANGE`].
pub const PIRATE_BACKOFF_RANGE: f32 = 150.0;
pub const PIRATE_BRAKE_RANGE: f32 = 80.0;

/// Fire gate: distance and angular error.
pub const PIRATE_FIRE_RANGE: f32 = 250.0;
pub const PIRATE_FIRE_CONE: f32 = std::f32::consts::FRAC_PI_6; // 30°

/// Thrust only while roughly facing the pursuit heading.
pub const PIRATE_THRUST_CONE: f32 = std::f32::consts::FRAC_PI_4; // 45°

/// Chance per tick to re-pick the wander heading.
pub const PIRATE_WANDER_REPICK_CHANCE: f32 = 0.01;

// ── Patrol AI ─────────────────────────────────────────────────────────────────

/// A pirate this close to any passive NPC is targeted immediately.
pub const PATROL_MERCHANT_GUARD_RADIUS: f32 = 400.0;

/// Otherwise, nearest pirate inside this radius.
pub const PATROL_ENGAGE_RANGE: f32 = 1200.0;

/// Lead-pursuit time scale for patrols (lead vector is doubled on top).
pub const PATROL_INTERCEPT_SCALE: f32 = 100.0;

/// Thrust / fire cones while pursuing a pirate.
pub const PATROL_PURSUIT_CONE: f32 = std::f32::consts::FRAC_PI_2; // 90°
pub const PATROL_FIRE_RANGE: f32 = 600.0;

/// Accuracy bands by distance: < 150 / < 300 / < 450 / beyond.
pub const PATROL_ACCURACY_CLOSE: f32 = 0.8;
pub const PATROL_ACCURACY_MID: f32 = 0.5;
pub const PATROL_ACCURACY_FAR: f32 = 0.3;
pub const PATROL_ACCURACY_EXTREME: f32 = 0.2;

/// Target speed halves accuracy at 1.0 u/tick, floored at this factor.
pub const PATROL_ACCURACY_FLOOR: f32 = 0.5;

/// Give-up odds: per tick beyond [`PATROL_GIVE_UP_RANGE`], plus an extra roll
/// once the pursuit has lasted [`PATROL_PURSUIT_TIMEOUT`] ticks.
pub const PATROL_GIVE_UP_RANGE: f32 = 800.0;
pub const PATROL_GIVE_UP_CHANCE: f32 = 0.05;
pub const PATROL_PURSUIT_TIMEOUT: u32 = 300;
pub const PATROL_TIMEOUT_GIVE_UP_CHANCE: f32 = 0.10;

/// Hostile-player policing: pursue inside 1000 u, fire inside 450 u / 60°.
pub const PATROL_HOSTILE_RANGE: f32 = 1000.0;
pub const PATROL_HOSTILE_FIRE_RANGE: f32 = 450.0;
pub const PATROL_HOSTILE_FIRE_CONE: f32 = std::f32::consts::FRAC_PI_3; // 60°

/// Kills beyond this mark the player hostile even with a cold weapon.
pub const PLAYER_HOSTILE_KILL_THRESHOLD: u32 = 2;

/// Patrol wander: 2 %/tick reverse + re-roll rate, 30 %/tick small jitter.
pub const PATROL_RATE_MIN: f32 = 0.008;
pub const PATROL_RATE_MAX: f32 = 0.016;
pub const PATROL_REVERSE_CHANCE: f32 = 0.02;
pub const PATROL_JITTER_CHANCE: f32 = 0.30;
pub const PATROL_JITTER_MAX: f32 = 0.25;
pub const PATROL_WANDER_THRUST_CONE: f32 = std::f32::consts::FRAC_PI_3; // 60°

// ── Passive AI ────────────────────────────────────────────────────────────────

/// Flee a shooting player inside this range.
pub const PASSIVE_FLEE_PLAYER_RANGE: f32 = 300.0;

/// Flee any aggressive NPC inside this range.
pub const PASSIVE_FLEE_PIRATE_RANGE: f32 = 200.0;

/// While fleeing, thrust only inside this cone of the escape heading.
pub const PASSIVE_FLEE_CONE: f32 = std::f32::consts::FRAC_PI_6; // 30°

/// Destination is "reached" inside planet radius + this margin.
pub const PASSIVE_ARRIVE_MARGIN: f32 = 50.0;

/// Approach braking: inside 200 u while closing faster than 30 % of max.
pub const PASSIVE_BRAKE_RANGE: f32 = 200.0;
pub const PASSIVE_BRAKE_SPEED_FRAC: f32 = 0.3;

/// Navigation thrust cone.
pub const PASSIVE_NAV_CONE: f32 = std::f32::consts::FRAC_PI_3; // 60°

/// Chance per tick, while parked at a planet, to pick a new destination.
pub const PASSIVE_NEW_DEST_CHANCE: f32 = 0.01;

// ── Steering & Integration ────────────────────────────────────────────────────

/// Turn-rate multiplier applied while fleeing.
pub const FLEE_TURN_MULTIPLIER: f32 = 2.5;

/// Brake: velocity retained per braking tick.
pub const BRAKE_FACTOR: f32 = 0.95;

/// Ambient damping: velocity retained every tick, brake or not.
pub const SPACE_DAMPING: f32 = 0.999;

// ── Projectiles ───────────────────────────────────────────────────────────────

/// Muzzle offset beyond the shooter's size, along the fire angle.
pub const MUZZLE_OFFSET: f32 = 5.0;

/// Projectiles are removed strictly after this many ticks (age > 60).
pub const PROJECTILE_MAX_AGE: u32 = 60;

// ── Asteroids ─────────────────────────────────────────────────────────────────

/// Number of rocks seeded at session start.
pub const ASTEROID_FIELD_COUNT: usize = 50;

/// Initial field: position spread (±half), velocity per axis, radius range.
pub const ASTEROID_FIELD_SPREAD: f32 = 4000.0;
pub const ASTEROID_DRIFT_MAX: f32 = 0.15;
pub const ASTEROID_RADIUS_MIN: f32 = 2.0;
pub const ASTEROID_RADIUS_MAX: f32 = 10.0;
pub const ASTEROID_BASE_HEALTH: f32 = 20.0;

/// Asteroids wrap at this distance from the player on each axis, keeping the
/// field centred on the action without ever spawning new rocks.
pub const ASTEROID_WRAP_DISTANCE: f32 = 2000.0;

/// Chance per tick of a tiny random velocity nudge, and its magnitude.
pub const ASTEROID_NUDGE_CHANCE: f32 = 0.005;
pub const ASTEROID_NUDGE_MAX: f32 = 0.02;

/// Ship impact: damage = floor(rel_speed * radius * this); both bodies get a
/// bounce impulse of [`ASTEROID_BOUNCE_IMPULSE`] along the contact normal.
pub const ASTEROID_IMPACT_DAMAGE_SCALE: f32 = 2.0;
pub const ASTEROID_BOUNCE_IMPULSE: f32 = 0.5;

/// Fragmentation: rocks larger than this split into exactly two children at
/// 0.6× radius, 10 hp, 1 ore each.
pub const ASTEROID_FRAGMENT_MIN_RADIUS: f32 = 5.0;
pub const ASTEROID_FRAGMENT_RADIUS_SCALE: f32 = 0.6;
pub const ASTEROID_FRAGMENT_HEALTH: f32 = 10.0;
pub const ASTEROID_FRAGMENT_ORE: u32 = 1;

// ── Pickups ───────────────────────────────────────────────────────────────────

/// Velocity retained per tick (pickups coast to a stop).
pub const PICKUP_DRAG: f32 = 0.99;

/// Pickups despawn at this age (ticks; ≈ 10 s).
pub const PICKUP_MAX_LIFETIME: u32 = 600;

/// Collection radius margin beyond the ship size.
pub const PICKUP_COLLECT_MARGIN: f32 = 10.0;

// ── Player Ship ───────────────────────────────────────────────────────────────

pub const PLAYER_THRUST: f32 = 0.004;
pub const PLAYER_MAX_SPEED: f32 = 0.45;
pub const PLAYER_TURN_SPEED: f32 = 0.012;
pub const PLAYER_SIZE: f32 = 8.0;
pub const PLAYER_MAX_HULL: f32 = 100.0;
pub const PLAYER_MAX_FUEL: f32 = 100.0;
pub const PLAYER_START_CREDITS: u32 = 250;
pub const PLAYER_CARGO_CAPACITY: u32 = 10;

/// Fuel burned per thrusting tick; thrust requires more than this in tank.
pub const PLAYER_FUEL_PER_THRUST: f32 = 0.1;

/// Respawn: credits penalty, shield restored to min(this, max shield).
pub const RESPAWN_CREDIT_PENALTY: u32 = 100;
pub const RESPAWN_SHIELD_RESTORE: f32 = 50.0;

/// Ticks before the ship may land again after launching.
pub const LANDING_COOLDOWN: u32 = 120;

/// Docking requires approach speed below this.
pub const LANDING_MAX_SPEED: f32 = 0.3;

/// Docking works within planet radius plus this margin.
pub const LANDING_RANGE_MARGIN: f32 = 50.0;

/// Respawned ships appear this far outside the planet's surface.
pub const RESPAWN_OFFSET: f32 = 80.0;
