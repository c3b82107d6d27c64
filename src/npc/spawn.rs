//! NPC spawn controller: traffic density gates, weighted kind draw, and
//! per-kind placement rings.
//!
//! A spawn attempt happens at most once per scheduling window.  The gate is
//! three-fold: the schedule must be due, fewer than five NPCs may sit within
//! 1000 u of the player, and the total population must be under the hard cap
//! of twelve.  Regardless of outcome the next window is pushed out by
//! `180 + nearby·120` ticks, jittered into `[delay/2, delay·3/2)` — crowded
//! space slows traffic instead of queueing it up.

use crate::config::GameConfig;
use crate::motion::{Heading, Thrusting, Velocity};
use crate::npc::state::{
    AggressiveState, Behavior, LawfulState, Npc, NpcHealth, NpcKind, NpcStats, PassiveState,
    Steering, WeaponState,
};
use crate::planet::Planets;
use crate::session::SimTick;
use crate::ship::PlayerShip;
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

use crate::constants::{
    PATROL_RATE_MAX, PATROL_RATE_MIN, SPAWN_DEFAULT_RING_MAX, SPAWN_DEFAULT_RING_MIN,
    SPAWN_DEFAULT_SPEED_FRAC, SPAWN_MERCHANT_RING_MAX, SPAWN_MERCHANT_RING_MIN,
    SPAWN_PATROL_RING_MAX, SPAWN_PATROL_RING_MIN, SPAWN_PATROL_SPEED_FRAC, SPAWN_PIRATE_RING_MAX,
    SPAWN_PIRATE_RING_MIN, SPAWN_PIRATE_SPEED_FRAC, TRADER_SPAWN_SPEED_FRAC,
};

/// Next tick at which a spawn attempt may run.
#[derive(Resource, Debug, Clone, Default)]
pub struct SpawnScheduler {
    pub next_spawn_tick: u64,
}

/// Weighted kind draw.  `roll` is uniform in [0, 1); the table is walked in
/// freighter → trader → patrol → pirate order, so the last entry absorbs any
/// rounding slack.
pub fn draw_kind(config: &GameConfig, roll: f32) -> NpcKind {
    let mut acc = config.spawn_weight_freighter;
    if roll < acc {
        return NpcKind::Freighter;
    }
    acc += config.spawn_weight_trader;
    if roll < acc {
        return NpcKind::Trader;
    }
    acc += config.spawn_weight_patrol;
    if roll < acc {
        return NpcKind::Patrol;
    }
    NpcKind::Pirate
}

/// Spawn one fully-initialized NPC ship.
///
/// Behavior state is built here, eagerly — wander angles, patrol drift, and
/// merchant destinations all exist before the ship's first AI tick.
pub fn spawn_npc_ship(
    commands: &mut Commands,
    planets: &Planets,
    kind: NpcKind,
    pos: Vec2,
    vel: Vec2,
    heading: f32,
    rng: &mut impl Rng,
) -> Entity {
    let template = kind.template();
    let mut entity = commands.spawn((
        Npc { kind },
        NpcStats::from(template),
        NpcHealth::full(template.health),
        WeaponState::from_template(template),
        Steering::default(),
        Heading(heading),
        Velocity(vel),
        Thrusting(false),
        Transform {
            translation: pos.extend(0.1),
            rotation: Quat::from_rotation_z(heading),
            scale: Vec3::ONE,
        },
    ));

    match template.behavior {
        Behavior::Aggressive => {
            entity.insert(AggressiveState {
                wander_angle: rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI),
                fleeing: false,
            });
        }
        Behavior::Lawful => {
            entity.insert(LawfulState {
                pursuing: false,
                pursuit_timer: 0,
                patrol_angle: rng.gen_range(0.0..TAU),
                patrol_rate: rng.gen_range(PATROL_RATE_MIN..PATROL_RATE_MAX),
                patrol_direction: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
            });
        }
        Behavior::Passive => {
            entity.insert(PassiveState {
                fleeing: false,
                target_planet: planets.random_id(None, rng),
            });
        }
    }

    entity.id()
}

/// Pick a spawn position and initial velocity for a kind.
fn placement(
    kind: NpcKind,
    planets: &Planets,
    player_pos: Vec2,
    rng: &mut impl Rng,
) -> (Vec2, Vec2) {
    let max_speed = kind.template().max_speed;
    let angle = rng.gen_range(0.0..TAU);
    let dir = Vec2::new(angle.cos(), angle.sin());

    match kind {
        // Traders materialize on a planet's doorstep, already outbound.
        NpcKind::Trader => {
            let planet = planets.get(planets.random_id(None, rng));
            let distance =
                planet.radius + rng.gen_range(SPAWN_MERCHANT_RING_MIN..SPAWN_MERCHANT_RING_MAX);
            (
                planet.pos + dir * distance,
                dir * max_speed * TRADER_SPAWN_SPEED_FRAC,
            )
        }
        // Pirates close in from deep space.
        NpcKind::Pirate => {
            let distance = rng.gen_range(SPAWN_PIRATE_RING_MIN..SPAWN_PIRATE_RING_MAX);
            (
                player_pos + dir * distance,
                -dir * max_speed * SPAWN_PIRATE_SPEED_FRAC,
            )
        }
        // Patrols appear on their beat near the player.
        NpcKind::Patrol => {
            let distance = rng.gen_range(SPAWN_PATROL_RING_MIN..SPAWN_PATROL_RING_MAX);
            (
                player_pos + dir * distance,
                -dir * max_speed * SPAWN_PATROL_SPEED_FRAC,
            )
        }
        // Everything else drifts in on a wide ring around the player.
        NpcKind::Freighter => {
            let distance = rng.gen_range(SPAWN_DEFAULT_RING_MIN..SPAWN_DEFAULT_RING_MAX);
            let drift_angle = rng.gen_range(0.0..TAU);
            (
                player_pos + dir * distance,
                Vec2::new(drift_angle.cos(), drift_angle.sin())
                    * max_speed
                    * SPAWN_DEFAULT_SPEED_FRAC,
            )
        }
    }
}

/// Attempt one spawn when the schedule is due, then reschedule.
pub fn npc_spawn_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    tick: Res<SimTick>,
    planets: Res<Planets>,
    mut scheduler: ResMut<SpawnScheduler>,
    q_player: Query<&Transform, With<PlayerShip>>,
    q_npcs: Query<&Transform, With<Npc>>,
) {
    let Ok(player_transform) = q_player.single() else {
        return;
    };
    if tick.0 < scheduler.next_spawn_tick {
        return;
    }

    let player_pos = player_transform.translation.truncate();
    let nearby = q_npcs
        .iter()
        .filter(|t| t.translation.truncate().distance(player_pos) < config.npc_nearby_radius)
        .count();
    let total = q_npcs.iter().count();

    let mut rng = rand::thread_rng();

    // A cap-blocked attempt does not reschedule: the controller retries
    // every tick until the caps clear, then the spawn restarts the clock.
    if nearby >= config.npc_nearby_cap || total >= config.npc_population_cap {
        return;
    }

    let kind = draw_kind(&config, rng.gen_range(0.0..1.0));
    let (pos, vel) = placement(kind, &planets, player_pos, &mut rng);
    let heading = if vel.length_squared() > 1e-8 {
        vel.y.atan2(vel.x)
    } else {
        rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI)
    };
    spawn_npc_ship(&mut commands, &planets, kind, pos, vel, heading, &mut rng);
    info!("Spawned {} ({} ships, {} nearby)", kind.label(), total + 1, nearby);

    let delay = config.spawn_base_delay + nearby as u64 * config.spawn_delay_per_nearby;
    let jittered = rng.gen_range(delay / 2..delay * 3 / 2).max(1);
    scheduler.next_spawn_tick = tick.0 + jittered;
}
