//! Asteroid field: seeding, drift, wrap, ship impacts, and fragmentation.
//!
//! The field is a fixed population seeded once per session.  Rocks that fall
//! behind the player wrap to the far side of the field instead of despawning,
//! so the belt follows the action without ever growing or shrinking except
//! through mining.
//!
//! Destruction flow: a rock at zero health scatters its ore as pickups, and
//! if it was large enough it splits into exactly two smaller children that
//! inherit its drift.

use crate::config::GameConfig;
use crate::constants::*;
use crate::events::{AudioCue, ExplosionBurst};
use crate::motion::Velocity;
use crate::npc::state::{Killer, Npc, NpcHealth, NpcStats};
use crate::pickup::{spawn_pickup, PickupKind};
use crate::session::{GameState, SimSet};
use crate::ship::{Hull, PlayerShip};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::TAU;

// ── Components ────────────────────────────────────────────────────────────────

/// A mineable rock.
#[derive(Component, Debug, Clone, Copy)]
pub struct Asteroid {
    pub radius: f32,
    pub ore: u32,
    /// Visual spin, radians per tick.
    pub spin: f32,
}

/// Remaining rock integrity.  Separate from [`Asteroid`] so weapon hits can
/// take `&mut AsteroidHealth` without touching the shape data.
#[derive(Component, Debug, Clone, Copy)]
pub struct AsteroidHealth(pub f32);

/// Spawn one rock with the given shape and drift.
pub fn spawn_asteroid(
    commands: &mut Commands,
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    health: f32,
    ore: u32,
    spin: f32,
) -> Entity {
    commands
        .spawn((
            Asteroid { radius, ore, spin },
            AsteroidHealth(health),
            Velocity(vel),
            Transform::from_translation(pos.extend(0.0)),
        ))
        .id()
}

/// Seed the session's asteroid belt around the origin.
pub fn seed_asteroid_field(commands: &mut Commands, config: &GameConfig, rng: &mut impl Rng) {
    let half = ASTEROID_FIELD_SPREAD / 2.0;
    for _ in 0..config.asteroid_field_count {
        let pos = Vec2::new(rng.gen_range(-half..half), rng.gen_range(-half..half));
        let vel = Vec2::new(
            rng.gen_range(-ASTEROID_DRIFT_MAX..ASTEROID_DRIFT_MAX),
            rng.gen_range(-ASTEROID_DRIFT_MAX..ASTEROID_DRIFT_MAX),
        );
        let radius = rng.gen_range(ASTEROID_RADIUS_MIN..ASTEROID_RADIUS_MAX);
        let ore = rng.gen_range(1..=3);
        let spin = rng.gen_range(-0.02..0.02);
        spawn_asteroid(commands, pos, vel, radius, ASTEROID_BASE_HEALTH, ore, spin);
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Drift, spin, occasional nudge, and per-axis wrap around the player.
pub fn asteroid_drift_system(
    config: Res<GameConfig>,
    q_player: Query<&Transform, (With<PlayerShip>, Without<Asteroid>)>,
    mut q_asteroids: Query<(&Asteroid, &mut Velocity, &mut Transform)>,
) {
    let mut rng = rand::thread_rng();
    let player_pos = q_player
        .single()
        .map(|t| t.translation.truncate())
        .unwrap_or(Vec2::ZERO);
    let wrap = config.asteroid_wrap_distance;

    for (asteroid, mut velocity, mut transform) in q_asteroids.iter_mut() {
        if rng.gen_bool(ASTEROID_NUDGE_CHANCE as f64) {
            velocity.0 += Vec2::new(
                rng.gen_range(-ASTEROID_NUDGE_MAX..ASTEROID_NUDGE_MAX),
                rng.gen_range(-ASTEROID_NUDGE_MAX..ASTEROID_NUDGE_MAX),
            );
        }

        transform.translation.x += velocity.0.x;
        transform.translation.y += velocity.0.y;
        transform.rotate_z(asteroid.spin);

        // Teleport to the far edge of the field, axis by axis.
        let dx = transform.translation.x - player_pos.x;
        if dx > wrap {
            transform.translation.x -= 2.0 * wrap;
        } else if dx < -wrap {
            transform.translation.x += 2.0 * wrap;
        }
        let dy = transform.translation.y - player_pos.y;
        if dy > wrap {
            transform.translation.y -= 2.0 * wrap;
        } else if dy < -wrap {
            transform.translation.y += 2.0 * wrap;
        }
    }
}

/// Ship-vs-rock impacts.  Damage scales with relative speed and rock size;
/// both bodies take a bounce impulse along the contact normal.
#[allow(clippy::type_complexity)]
pub fn asteroid_collision_system(
    config: Res<GameConfig>,
    mut audio: MessageWriter<AudioCue>,
    mut q_player: Query<
        (&Transform, &mut Velocity, &mut Hull),
        (With<PlayerShip>, Without<Asteroid>, Without<Npc>),
    >,
    mut q_npcs: Query<
        (&Transform, &mut Velocity, &NpcStats, &mut NpcHealth),
        (With<Npc>, Without<Asteroid>),
    >,
    mut q_asteroids: Query<(&Transform, &Asteroid, &mut Velocity), Without<Npc>>,
) {
    for (rock_transform, asteroid, mut rock_vel) in q_asteroids.iter_mut() {
        let rock_pos = rock_transform.translation.truncate();

        if let Ok((player_transform, mut ship_vel, mut hull)) = q_player.single_mut() {
            let ship_pos = player_transform.translation.truncate();
            let dist = ship_pos.distance(rock_pos);
            if dist < asteroid.radius + config.player_size {
                let rel_speed = (ship_vel.0 - rock_vel.0).length();
                let damage =
                    (rel_speed * asteroid.radius * config.asteroid_impact_damage_scale).floor();
                let absorbed = hull.shield.min(damage);
                hull.shield = (hull.shield - damage).max(0.0);
                let overflow = damage - absorbed;
                if overflow > 0.0 {
                    hull.hp = (hull.hp - overflow).max(0.0);
                }
                if absorbed > 0.0 {
                    audio.write(AudioCue::ShieldHit);
                }
                let normal = (ship_pos - rock_pos).normalize_or_zero();
                ship_vel.0 += normal * ASTEROID_BOUNCE_IMPULSE;
                rock_vel.0 -= normal * ASTEROID_BOUNCE_IMPULSE;
            }
        }

        for (npc_transform, mut npc_vel, stats, mut health) in q_npcs.iter_mut() {
            let npc_pos = npc_transform.translation.truncate();
            let dist = npc_pos.distance(rock_pos);
            if dist < asteroid.radius + stats.size {
                let rel_speed = (npc_vel.0 - rock_vel.0).length();
                let damage =
                    (rel_speed * asteroid.radius * config.asteroid_impact_damage_scale).floor();
                if damage > 0.0 {
                    health.apply_damage(damage, Killer::Npc);
                }
                let normal = (npc_pos - rock_pos).normalize_or_zero();
                npc_vel.0 += normal * ASTEROID_BOUNCE_IMPULSE;
                rock_vel.0 -= normal * ASTEROID_BOUNCE_IMPULSE;
            }
        }
    }
}

/// Break up rocks at zero health: scatter ore pickups radially, split large
/// rocks into two children, and announce the blast.
pub fn asteroid_destruction_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut bursts: MessageWriter<ExplosionBurst>,
    mut audio: MessageWriter<AudioCue>,
    q_asteroids: Query<(Entity, &Transform, &Asteroid, &Velocity, &AsteroidHealth)>,
) {
    let mut rng = rand::thread_rng();

    for (entity, transform, asteroid, velocity, health) in q_asteroids.iter() {
        if health.0 > 0.0 {
            continue;
        }
        let pos = transform.translation.truncate();

        // Ore scatters evenly around the blast.
        for i in 0..asteroid.ore {
            let angle = (i as f32 / asteroid.ore.max(1) as f32) * TAU;
            let dir = Vec2::new(angle.cos(), angle.sin());
            spawn_pickup(
                &mut commands,
                PickupKind::Ore(1),
                pos + dir * asteroid.radius,
                velocity.0 + dir * 0.3,
            );
        }

        if asteroid.radius > config.asteroid_fragment_min_radius {
            let child_radius = asteroid.radius * ASTEROID_FRAGMENT_RADIUS_SCALE;
            let split_angle = rng.gen_range(0.0..TAU);
            let offset = Vec2::new(split_angle.cos(), split_angle.sin()) * asteroid.radius * 0.5;
            for sign in [1.0, -1.0] {
                spawn_asteroid(
                    &mut commands,
                    pos + offset * sign,
                    velocity.0 + offset.perp().normalize_or_zero() * 0.1 * sign,
                    child_radius,
                    ASTEROID_FRAGMENT_HEALTH,
                    ASTEROID_FRAGMENT_ORE,
                    rng.gen_range(-0.02..0.02),
                );
            }
        }

        bursts.write(ExplosionBurst { pos, small: true });
        audio.write(AudioCue::Explosion { large: false });
        commands.entity(entity).despawn();
    }
}

pub struct AsteroidPlugin;

impl Plugin for AsteroidPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                asteroid_drift_system,
                asteroid_collision_system,
                asteroid_destruction_system,
            )
                .chain()
                .in_set(SimSet::Environment)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pickup::Pickup;

    fn asteroid_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.add_message::<ExplosionBurst>();
        app.add_message::<AudioCue>();
        app
    }

    fn spawn_rock(
        app: &mut App,
        pos: Vec2,
        vel: Vec2,
        radius: f32,
        health: f32,
        ore: u32,
    ) -> Entity {
        let entity = {
            let mut commands = app.world_mut().commands();
            spawn_asteroid(&mut commands, pos, vel, radius, health, ore, 0.0)
        };
        app.world_mut().flush();
        entity
    }

    fn collect<T: Component + Copy>(world: &mut World) -> Vec<T> {
        world.query::<&T>().iter(world).copied().collect()
    }

    #[test]
    fn large_rock_splits_into_two_inheriting_children() {
        let mut app = asteroid_app();
        app.add_systems(Update, asteroid_destruction_system);

        let parent = spawn_rock(&mut app, Vec2::new(50.0, 0.0), Vec2::new(0.1, 0.0), 8.0, 0.0, 3);
        app.update();

        assert!(app.world().get_entity(parent).is_err(), "parent is gone");
        let children = collect::<Asteroid>(app.world_mut());
        assert_eq!(children.len(), 2, "exactly two fragments");
        for child in &children {
            assert!((child.radius - 4.8).abs() < 1e-4, "children shrink to 0.6×");
            assert_eq!(child.ore, 1);
        }
        let healths = collect::<AsteroidHealth>(app.world_mut());
        assert!(healths.iter().all(|h| (h.0 - 10.0).abs() < f32::EPSILON));

        let pickups = app
            .world_mut()
            .query::<&Pickup>()
            .iter(app.world())
            .count();
        assert_eq!(pickups, 3, "one ore pickup per unit of ore");
    }

    #[test]
    fn small_rock_leaves_only_ore_behind() {
        let mut app = asteroid_app();
        app.add_systems(Update, asteroid_destruction_system);

        spawn_rock(&mut app, Vec2::ZERO, Vec2::ZERO, 4.0, -2.0, 2);
        app.update();

        let rocks = collect::<Asteroid>(app.world_mut());
        assert!(rocks.is_empty(), "a 4 u rock is below the split threshold");
        let pickups = app
            .world_mut()
            .query::<&Pickup>()
            .iter(app.world())
            .count();
        assert_eq!(pickups, 2);
    }

    #[test]
    fn drifting_rock_wraps_around_the_player() {
        let mut app = asteroid_app();
        app.add_systems(Update, asteroid_drift_system);

        app.world_mut()
            .spawn((PlayerShip, Transform::from_translation(Vec3::ZERO)));
        let rock = spawn_rock(&mut app, Vec2::new(2100.0, 0.0), Vec2::ZERO, 5.0, 20.0, 1);

        app.update();

        let x = app.world().get::<Transform>(rock).unwrap().translation.x;
        assert!(
            (x - (2100.0 - 4000.0)).abs() < 1.0,
            "wrapped to the far side of the field, got {x}"
        );
    }

    #[test]
    fn impact_damage_is_shield_first_with_a_bounce() {
        let mut app = asteroid_app();
        app.add_systems(Update, asteroid_collision_system);

        let player = app
            .world_mut()
            .spawn((
                PlayerShip,
                Transform::from_translation(Vec3::ZERO),
                Velocity(Vec2::new(1.0, 0.0)),
                Hull {
                    hp: 100.0,
                    max_hp: 100.0,
                    shield: 10.0,
                    max_shield: 25.0,
                },
            ))
            .id();
        // Stationary 10 u rock right on top of the ship: rel speed 1.0,
        // damage = floor(1.0 * 10 * 2) = 20.
        let rock = spawn_rock(&mut app, Vec2::new(5.0, 0.0), Vec2::ZERO, 10.0, 20.0, 1);

        app.update();

        let hull = app.world().get::<Hull>(player).unwrap();
        assert_eq!(hull.shield, 0.0, "shield soaks the first 10");
        assert_eq!(hull.hp, 90.0, "the remaining 10 hits the hull");

        // Contact normal points from the rock toward the ship (−x here).
        let ship_vel = app.world().get::<Velocity>(player).unwrap().0;
        assert!(ship_vel.x < 1.0, "ship pushed back along the normal");
        let rock_vel = app.world().get::<Velocity>(rock).unwrap().0;
        assert!(rock_vel.x > 0.0, "rock pushed the other way");
    }
}
