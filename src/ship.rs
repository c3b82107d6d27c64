//! The player's ship: input, motion, firing, docking, and destruction.
//!
//! Movement shares the NPC flight model (thrust along the heading, brake
//! ×0.95, ambient damping, speed clamp) but burns fuel per thrusting tick
//! and reads a [`PlayerIntent`] resource instead of an AI steering decision.
//! Keyboard state is translated to intent once per tick so everything
//! downstream is input-device agnostic.
//!
//! Destruction does not end the session: the ship respawns at the last
//! planet visited (or the origin), fully repaired, shield partially charged,
//! and a credit penalty applied.

use crate::config::GameConfig;
use crate::constants::*;
use crate::events::{AudioCue, ExplosionBurst};
use crate::motion::{clamp_speed, wrap_angle, Heading, Thrusting, Velocity};
use crate::planet::{Commodity, PlanetId, Planets};
use crate::projectile::{spawn_projectile, Projectile, ShotOrigin, WeaponProfile};
use crate::session::{GameState, SimSet};
use bevy::prelude::*;

// ── Components ────────────────────────────────────────────────────────────────

/// Marker for the one player-controlled ship.
#[derive(Component, Debug, Clone, Copy)]
pub struct PlayerShip;

/// Hull integrity and shield charge.  Shields soak damage first; both values
/// clamp at zero.
#[derive(Component, Debug, Clone, Copy)]
pub struct Hull {
    pub hp: f32,
    pub max_hp: f32,
    pub shield: f32,
    pub max_shield: f32,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Fuel {
    pub amount: f32,
    pub max: f32,
}

/// Commodity storage.  Credits are weightless and live in [`PlayerWallet`].
#[derive(Component, Debug, Clone, Copy)]
pub struct CargoHold {
    /// Units held, indexed in [`Commodity::ALL`] order.
    pub slots: [u32; 6],
    pub capacity: u32,
}

impl CargoHold {
    pub fn empty(capacity: u32) -> Self {
        Self {
            slots: [0; 6],
            capacity,
        }
    }

    pub fn total(&self) -> u32 {
        self.slots.iter().sum()
    }

    pub fn free_space(&self) -> u32 {
        self.capacity.saturating_sub(self.total())
    }

    pub fn amount(&self, commodity: Commodity) -> u32 {
        self.slots[commodity as usize]
    }

    pub fn add(&mut self, commodity: Commodity, units: u32) {
        self.slots[commodity as usize] += units;
    }

    pub fn remove(&mut self, commodity: Commodity, units: u32) {
        let slot = &mut self.slots[commodity as usize];
        *slot = slot.saturating_sub(units);
    }
}

// ── Resources ─────────────────────────────────────────────────────────────────

/// One tick's worth of player input, decoded from the keyboard.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerIntent {
    /// −1.0, 0.0, or +1.0.
    pub turn: f32,
    pub thrust: bool,
    pub brake: bool,
    pub fire: bool,
    pub land: bool,
    pub cycle_weapon: bool,
}

/// Credits on hand.  Never negative; penalties saturate at zero.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerWallet {
    pub credits: u32,
}

/// Lifetime kill counters, fed by the NPC lifecycle and read by missions and
/// patrol hostility checks.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct KillTally {
    pub kills: u32,
    pub pirate_kills: u32,
}

/// Purchased weapons and the shared fire cooldown.  A fresh ship carries
/// nothing; the first weapon comes from a planet shop.
#[derive(Resource, Debug, Clone, Default)]
pub struct WeaponRack {
    pub weapons: Vec<WeaponProfile>,
    pub current: usize,
    pub cooldown: u32,
}

impl WeaponRack {
    pub fn current_profile(&self) -> Option<&WeaponProfile> {
        self.weapons.get(self.current)
    }

    pub fn cycle(&mut self) {
        if !self.weapons.is_empty() {
            self.current = (self.current + 1) % self.weapons.len();
        }
    }
}

/// Engine stats, upgraded at planet shops.  Lives outside the ship entity so
/// upgrades survive destruction and respawn.
#[derive(Resource, Debug, Clone, Copy)]
pub struct ShipLoadout {
    pub thrust: f32,
    pub max_speed: f32,
}

impl Default for ShipLoadout {
    fn default() -> Self {
        Self {
            thrust: PLAYER_THRUST,
            max_speed: PLAYER_MAX_SPEED,
        }
    }
}

/// Where the ship is docked (if anywhere), the relaunch cooldown, and the
/// last planet visited for respawn placement.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct DockingStatus {
    pub docked_at: Option<PlanetId>,
    pub launch_cooldown: u32,
    pub last_planet: Option<PlanetId>,
}

impl DockingStatus {
    pub fn is_docked(&self) -> bool {
        self.docked_at.is_some()
    }
}

/// Spawn the player ship at the origin with starting stats.
pub fn spawn_player_ship(commands: &mut Commands, config: &GameConfig) -> Entity {
    commands
        .spawn((
            PlayerShip,
            Hull {
                hp: config.player_max_hull,
                max_hp: config.player_max_hull,
                shield: 0.0,
                max_shield: 0.0,
            },
            Fuel {
                amount: config.player_max_fuel,
                max: config.player_max_fuel,
            },
            CargoHold::empty(config.player_cargo_capacity),
            Heading(0.0),
            Velocity::default(),
            Thrusting(false),
            Transform::from_translation(Vec3::ZERO),
        ))
        .id()
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Decode the keyboard into a [`PlayerIntent`] for this tick.
pub fn player_input_system(
    keys: Res<ButtonInput<KeyCode>>,
    mut intent: ResMut<PlayerIntent>,
) {
    let left = keys.pressed(KeyCode::ArrowLeft) || keys.pressed(KeyCode::KeyA);
    let right = keys.pressed(KeyCode::ArrowRight) || keys.pressed(KeyCode::KeyD);
    *intent = PlayerIntent {
        turn: (left as i32 - right as i32) as f32,
        thrust: keys.pressed(KeyCode::ArrowUp) || keys.pressed(KeyCode::KeyW),
        brake: keys.pressed(KeyCode::ArrowDown) || keys.pressed(KeyCode::KeyS),
        fire: keys.pressed(KeyCode::KeyF) || keys.pressed(KeyCode::Space),
        land: keys.just_pressed(KeyCode::KeyL),
        cycle_weapon: keys.just_pressed(KeyCode::Tab),
    };
}

/// Apply intent to the ship: turn, thrust (burning fuel), brake, damping,
/// clamp, integrate.  A docked ship sits still.
#[allow(clippy::type_complexity)]
pub fn player_motion_system(
    config: Res<GameConfig>,
    intent: Res<PlayerIntent>,
    loadout: Res<ShipLoadout>,
    docking: Res<DockingStatus>,
    mut q_player: Query<
        (&mut Heading, &mut Velocity, &mut Fuel, &mut Thrusting, &mut Transform),
        With<PlayerShip>,
    >,
) {
    let Ok((mut heading, mut velocity, mut fuel, mut thrusting, mut transform)) =
        q_player.single_mut()
    else {
        return;
    };
    if docking.is_docked() {
        thrusting.0 = false;
        velocity.0 = Vec2::ZERO;
        return;
    }

    heading.0 = wrap_angle(heading.0 + intent.turn * config.player_turn_speed);

    thrusting.0 = false;
    if intent.thrust && fuel.amount > PLAYER_FUEL_PER_THRUST {
        velocity.0 += heading.dir() * loadout.thrust;
        fuel.amount = (fuel.amount - PLAYER_FUEL_PER_THRUST).max(0.0);
        thrusting.0 = true;
    }
    if intent.brake {
        velocity.0 *= BRAKE_FACTOR;
    }
    velocity.0 *= SPACE_DAMPING;
    velocity.0 = clamp_speed(velocity.0, loadout.max_speed);

    transform.translation.x += velocity.0.x;
    transform.translation.y += velocity.0.y;
    transform.rotation = Quat::from_rotation_z(heading.0);
}

/// Fire and weapon cycling.  The rack's cooldown always ticks down, fired or
/// not, because patrols read it as the "player is shooting" signal.
pub fn player_fire_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    intent: Res<PlayerIntent>,
    docking: Res<DockingStatus>,
    mut rack: ResMut<WeaponRack>,
    mut audio: MessageWriter<AudioCue>,
    q_player: Query<(&Transform, &Velocity, &Heading), With<PlayerShip>>,
) {
    if intent.cycle_weapon {
        rack.cycle();
    }

    let fired = if intent.fire && rack.cooldown == 0 && !docking.is_docked() {
        if let (Some(&profile), Ok((transform, velocity, heading))) =
            (rack.current_profile(), q_player.single())
        {
            spawn_projectile(
                &mut commands,
                ShotOrigin::Player,
                transform.translation.truncate(),
                velocity.0,
                heading.0,
                config.player_size,
                Some(&profile),
            );
            audio.write(AudioCue::WeaponFired(profile.kind));
            Some(profile.cooldown)
        } else {
            None
        }
    } else {
        None
    };

    match fired {
        Some(cooldown) => rack.cooldown = cooldown,
        None => rack.cooldown = rack.cooldown.saturating_sub(1),
    }
}

/// Dock and launch.  Docking needs a slow approach inside the planet's
/// landing margin; it kills velocity, refuels, and clears every projectile
/// in flight.  Launching starts the relaunch cooldown.
#[allow(clippy::too_many_arguments)]
pub fn docking_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    intent: Res<PlayerIntent>,
    planets: Res<Planets>,
    mut docking: ResMut<DockingStatus>,
    mut audio: MessageWriter<AudioCue>,
    mut q_player: Query<(&Transform, &mut Velocity, &mut Fuel), With<PlayerShip>>,
    q_projectiles: Query<Entity, With<Projectile>>,
) {
    docking.launch_cooldown = docking.launch_cooldown.saturating_sub(1);

    if !intent.land {
        return;
    }
    let Ok((transform, mut velocity, mut fuel)) = q_player.single_mut() else {
        return;
    };

    if docking.is_docked() {
        docking.docked_at = None;
        docking.launch_cooldown = config.landing_cooldown;
        return;
    }

    if docking.launch_cooldown > 0 || velocity.0.length() > config.landing_max_speed {
        return;
    }
    let pos = transform.translation.truncate();
    let Some((planet_id, dist)) = planets.nearest(pos) else {
        return;
    };
    if dist > planets.get(planet_id).radius + LANDING_RANGE_MARGIN {
        return;
    }

    docking.docked_at = Some(planet_id);
    docking.last_planet = Some(planet_id);
    velocity.0 = Vec2::ZERO;
    fuel.amount = fuel.max;
    for projectile in q_projectiles.iter() {
        commands.entity(projectile).despawn();
    }
    audio.write(AudioCue::Docked);
    info!("Docked at {}", planets.get(planet_id).name);
}

/// Respawn on hull loss: back to the last planet (or the origin), repaired
/// and refueled, shield partially charged, and a credit fine.
pub fn player_destruction_system(
    config: Res<GameConfig>,
    planets: Res<Planets>,
    docking: Res<DockingStatus>,
    mut wallet: ResMut<PlayerWallet>,
    mut bursts: MessageWriter<ExplosionBurst>,
    mut audio: MessageWriter<AudioCue>,
    mut q_player: Query<
        (&mut Transform, &mut Velocity, &mut Hull, &mut Fuel, &mut Heading),
        With<PlayerShip>,
    >,
) {
    let Ok((mut transform, mut velocity, mut hull, mut fuel, mut heading)) = q_player.single_mut()
    else {
        return;
    };
    if hull.hp > 0.0 {
        return;
    }

    bursts.write(ExplosionBurst {
        pos: transform.translation.truncate(),
        small: false,
    });
    audio.write(AudioCue::Explosion { large: true });

    let respawn_pos = match docking.last_planet {
        Some(id) => {
            let planet = planets.get(id);
            planet.pos + Vec2::new(planet.radius + RESPAWN_OFFSET, 0.0)
        }
        None => Vec2::ZERO,
    };
    transform.translation = respawn_pos.extend(0.0);
    velocity.0 = Vec2::ZERO;
    heading.0 = 0.0;
    hull.hp = hull.max_hp;
    hull.shield = RESPAWN_SHIELD_RESTORE.min(hull.max_shield);
    fuel.amount = fuel.max;
    wallet.credits = wallet.credits.saturating_sub(config.respawn_credit_penalty);
    info!("Ship destroyed; towed to safety, {} cr fine", config.respawn_credit_penalty);
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerIntent>()
            .init_resource::<PlayerWallet>()
            .init_resource::<KillTally>()
            .init_resource::<WeaponRack>()
            .init_resource::<ShipLoadout>()
            .init_resource::<DockingStatus>()
            .add_systems(
                Update,
                (
                    player_input_system.in_set(SimSet::Input),
                    (player_motion_system, player_fire_system, docking_system)
                        .chain()
                        .in_set(SimSet::PlayerUpdate),
                    player_destruction_system.in_set(SimSet::Lifecycle),
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
