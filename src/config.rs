//! Runtime gameplay configuration loaded from `assets/game.toml`.
//!
//! [`GameConfig`] is a Bevy [`Resource`] that mirrors the tunables in
//! [`crate::constants`].  At startup, [`load_game_config`] reads
//! `assets/game.toml` and overwrites the defaults with any values present in
//! the file.  Missing keys fall back to the compile-time defaults, so a
//! minimal TOML can override just the values you care about.
//!
//! ## Usage in systems
//!
//! Add `config: Res<GameConfig>` to any system parameter list and read values
//! with `config.npc_population_cap`, `config.pirate_fire_range`, etc.
//!
//! Keep `src/constants.rs` in sync: it remains the **authoritative default**
//! source used by `GameConfig::default()`.

use crate::constants::*;
use bevy::prelude::*;
use serde::Deserialize;

/// Runtime-tunable gameplay configuration.
///
/// All fields default to the corresponding compile-time constant from
/// `src/constants.rs`.  Override any subset in `assets/game.toml`.
#[derive(Resource, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // ── Spawn Controller ─────────────────────────────────────────────────────
    pub npc_population_cap: usize,
    pub npc_nearby_radius: f32,
    pub npc_nearby_cap: usize,
    pub spawn_base_delay: u64,
    pub spawn_delay_per_nearby: u64,
    pub spawn_weight_freighter: f32,
    pub spawn_weight_trader: f32,
    pub spawn_weight_patrol: f32,
    pub spawn_weight_pirate: f32,

    // ── NPC Lifecycle ────────────────────────────────────────────────────────
    pub npc_despawn_distance: f32,
    pub kill_bonus_credits: u32,
    pub non_pirate_bounty_frac: f32,

    // ── Pirate AI ────────────────────────────────────────────────────────────
    pub pirate_evade_range: f32,
    pub pirate_hunt_range: f32,
    pub pirate_backoff_range: f32,
    pub pirate_brake_range: f32,
    pub pirate_fire_range: f32,
    pub pirate_wander_repick_chance: f32,

    // ── Patrol AI ────────────────────────────────────────────────────────────
    pub patrol_merchant_guard_radius: f32,
    pub patrol_engage_range: f32,
    pub patrol_fire_range: f32,
    pub patrol_give_up_range: f32,
    pub patrol_give_up_chance: f32,
    pub patrol_pursuit_timeout: u32,
    pub patrol_timeout_give_up_chance: f32,
    pub patrol_hostile_range: f32,
    pub patrol_hostile_fire_range: f32,
    pub player_hostile_kill_threshold: u32,

    // ── Passive AI ───────────────────────────────────────────────────────────
    pub passive_flee_player_range: f32,
    pub passive_flee_pirate_range: f32,
    pub passive_brake_range: f32,
    pub passive_new_dest_chance: f32,

    // ── Projectiles ──────────────────────────────────────────────────────────
    pub projectile_max_age: u32,

    // ── Asteroids ────────────────────────────────────────────────────────────
    pub asteroid_field_count: usize,
    pub asteroid_wrap_distance: f32,
    pub asteroid_impact_damage_scale: f32,
    pub asteroid_fragment_min_radius: f32,

    // ── Pickups ──────────────────────────────────────────────────────────────
    pub pickup_max_lifetime: u32,
    pub pickup_collect_margin: f32,

    // ── Player Ship ──────────────────────────────────────────────────────────
    pub player_thrust: f32,
    pub player_max_speed: f32,
    pub player_turn_speed: f32,
    pub player_size: f32,
    pub player_max_hull: f32,
    pub player_max_fuel: f32,
    pub player_start_credits: u32,
    pub player_cargo_capacity: u32,
    pub respawn_credit_penalty: u32,
    pub landing_cooldown: u32,
    pub landing_max_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            // Spawn Controller
            npc_population_cap: NPC_POPULATION_CAP,
            npc_nearby_radius: NPC_NEARBY_RADIUS,
            npc_nearby_cap: NPC_NEARBY_CAP,
            spawn_base_delay: SPAWN_BASE_DELAY,
            spawn_delay_per_nearby: SPAWN_DELAY_PER_NEARBY,
            spawn_weight_freighter: SPAWN_WEIGHT_FREIGHTER,
            spawn_weight_trader: SPAWN_WEIGHT_TRADER,
            spawn_weight_patrol: SPAWN_WEIGHT_PATROL,
            spawn_weight_pirate: SPAWN_WEIGHT_PIRATE,
            // NPC Lifecycle
            npc_despawn_distance: NPC_DESPAWN_DISTANCE,
            kill_bonus_credits: KILL_BONUS_CREDITS,
            non_pirate_bounty_frac: NON_PIRATE_BOUNTY_FRAC,
            // Pirate AI
            pirate_evade_range: PIRATE_EVADE_RANGE,
            pirate_hunt_range: PIRATE_HUNT_RANGE,
            pirate_backoff_range: PIRATE_BACKOFF_RANGE,
            pirate_brake_range: PIRATE_BRAKE_RANGE,
            pirate_fire_range: PIRATE_FIRE_RANGE,
            pirate_wander_repick_chance: PIRATE_WANDER_REPICK_CHANCE,
            // Patrol AI
            patrol_merchant_guard_radius: PATROL_MERCHANT_GUARD_RADIUS,
            patrol_engage_range: PATROL_ENGAGE_RANGE,
            patrol_fire_range: PATROL_FIRE_RANGE,
            patrol_give_up_range: PATROL_GIVE_UP_RANGE,
            patrol_give_up_chance: PATROL_GIVE_UP_CHANCE,
            patrol_pursuit_timeout: PATROL_PURSUIT_TIMEOUT,
            patrol_timeout_give_up_chance: PATROL_TIMEOUT_GIVE_UP_CHANCE,
            patrol_hostile_range: PATROL_HOSTILE_RANGE,
            patrol_hostile_fire_range: PATROL_HOSTILE_FIRE_RANGE,
            player_hostile_kill_threshold: PLAYER_HOSTILE_KILL_THRESHOLD,
            // Passive AI
            passive_flee_player_range: PASSIVE_FLEE_PLAYER_RANGE,
            passive_flee_pirate_range: PASSIVE_FLEE_PIRATE_RANGE,
            passive_brake_range: PASSIVE_BRAKE_RANGE,
            passive_new_dest_chance: PASSIVE_NEW_DEST_CHANCE,
            // Projectiles
            projectile_max_age: PROJECTILE_MAX_AGE,
            // Asteroids
            asteroid_field_count: ASTEROID_FIELD_COUNT,
            asteroid_wrap_distance: ASTEROID_WRAP_DISTANCE,
            asteroid_impact_damage_scale: ASTEROID_IMPACT_DAMAGE_SCALE,
            asteroid_fragment_min_radius: ASTEROID_FRAGMENT_MIN_RADIUS,
            // Pickups
            pickup_max_lifetime: PICKUP_MAX_LIFETIME,
            pickup_collect_margin: PICKUP_COLLECT_MARGIN,
            // Player Ship
            player_thrust: PLAYER_THRUST,
            player_max_speed: PLAYER_MAX_SPEED,
            player_turn_speed: PLAYER_TURN_SPEED,
            player_size: PLAYER_SIZE,
            player_max_hull: PLAYER_MAX_HULL,
            player_max_fuel: PLAYER_MAX_FUEL,
            player_start_credits: PLAYER_START_CREDITS,
            player_cargo_capacity: PLAYER_CARGO_CAPACITY,
            respawn_credit_penalty: RESPAWN_CREDIT_PENALTY,
            landing_cooldown: LANDING_COOLDOWN,
            landing_max_speed: LANDING_MAX_SPEED,
        }
    }
}

impl GameConfig {
    /// Sum of the four spawn weights; used by the validation pass.
    pub fn spawn_weight_sum(&self) -> f32 {
        self.spawn_weight_freighter
            + self.spawn_weight_trader
            + self.spawn_weight_patrol
            + self.spawn_weight_pirate
    }
}

/// Startup system: attempt to load `assets/game.toml` and overwrite the
/// `GameConfig` resource with any values present in the file.
///
/// Missing keys retain their compiled defaults.  TOML parse errors are logged
/// but do not abort the game.  A missing file is silently ignored (defaults
/// are already in place from `insert_resource`).
pub fn load_game_config(mut config: ResMut<GameConfig>) {
    let path = "assets/game.toml";
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GameConfig>(&contents) {
            Ok(loaded) => {
                *config = loaded;
                info!("Loaded game config from {path}");
            }
            Err(e) => {
                warn!("Failed to parse {path}: {e}; using defaults");
            }
        },
        Err(_) => {
            // File not present — defaults are already in place; not an error.
            info!("No {path} found; using compiled defaults");
        }
    }

    if let Err(e) = crate::error::validate_spawn_weights(config.spawn_weight_sum()) {
        warn!("{e}");
    }
    if let Err(e) = crate::error::validate_despawn_distance(config.npc_despawn_distance) {
        warn!("{e}");
    }
}
