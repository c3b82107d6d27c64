//! Weapons, projectile flight, and damage resolution.
//!
//! ## Flow
//!
//! 1. A fire decision (player system or NPC AI) calls [`spawn_projectile`]
//!    with the shooter's identity; unknown or missing profiles on an armed
//!    path fall back to [`WeaponProfile::DEFAULT_LASER`].
//! 2. [`projectile_flight_system`] integrates position and age; projectiles
//!    are removed strictly after 60 ticks.
//! 3. [`projectile_hit_system`] resolves circle collisions — the first body
//!    hit consumes the shot.  Shooter identity grants self-hit immunity, so a
//!    shot can never clip the ship that fired it on spawn.
//!
//! Damage ordering on the player is shield first, then hull, both clamped at
//! zero.  NPC hit points may go negative; the kill is attributed exactly once
//! at the crossing (see [`NpcHealth::apply_damage`]).

use crate::asteroid::{Asteroid, AsteroidHealth};
use crate::config::GameConfig;
use crate::constants::MUZZLE_OFFSET;
use crate::events::{AudioCue, ExplosionBurst};
use crate::motion::Velocity;
use crate::npc::state::{Killer, NpcHealth, NpcStats};
use crate::session::{GameState, SimSet};
use crate::ship::{Hull, PlayerShip};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The four weapon families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponKind {
    Laser,
    Rapid,
    Plasma,
    Mining,
}

impl WeaponKind {
    /// Muzzle speed in world units per tick (shooter velocity is added on top).
    pub fn projectile_speed(self) -> f32 {
        match self {
            WeaponKind::Laser => 2.0,
            WeaponKind::Rapid => 3.0,
            WeaponKind::Plasma => 1.5,
            WeaponKind::Mining => 2.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            WeaponKind::Laser => "laser",
            WeaponKind::Rapid => "rapid",
            WeaponKind::Plasma => "plasma",
            WeaponKind::Mining => "mining",
        }
    }
}

/// A fitted weapon: family, damage per shot, and cooldown in ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeaponProfile {
    pub kind: WeaponKind,
    pub damage: f32,
    pub cooldown: u32,
}

impl WeaponProfile {
    /// Fallback profile used when an armed fire path has no usable weapon.
    pub const DEFAULT_LASER: WeaponProfile = WeaponProfile {
        kind: WeaponKind::Laser,
        damage: 10.0,
        cooldown: 15,
    };
}

/// Who fired a projectile.  NPC shots carry the shooter entity so the hit
/// pass can skip it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotOrigin {
    Player,
    Npc(Entity),
}

/// A live shot in flight.
#[derive(Component, Debug, Clone, Copy)]
pub struct Projectile {
    pub origin: ShotOrigin,
    pub kind: WeaponKind,
    pub damage: f32,
    pub age: u32,
}

/// Spawn one projectile from a shooter.
///
/// The muzzle sits `shooter_size + 5` along the fire angle so the shot clears
/// the shooter's own collision circle; velocity is muzzle speed plus the
/// shooter's velocity (shots inherit momentum).
pub fn spawn_projectile(
    commands: &mut Commands,
    origin: ShotOrigin,
    shooter_pos: Vec2,
    shooter_vel: Vec2,
    angle: f32,
    shooter_size: f32,
    weapon: Option<&WeaponProfile>,
) -> Entity {
    let profile = weapon.copied().unwrap_or(WeaponProfile::DEFAULT_LASER);
    let dir = Vec2::new(angle.cos(), angle.sin());
    let muzzle = shooter_pos + dir * (shooter_size + MUZZLE_OFFSET);

    commands
        .spawn((
            Projectile {
                origin,
                kind: profile.kind,
                damage: profile.damage,
                age: 0,
            },
            Transform {
                translation: muzzle.extend(0.2),
                rotation: Quat::from_rotation_z(angle),
                scale: Vec3::ONE,
            },
            Velocity(dir * profile.kind.projectile_speed() + shooter_vel),
        ))
        .id()
}

pub struct ProjectilePlugin;

impl Plugin for ProjectilePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                projectile_flight_system.in_set(SimSet::Projectiles),
                projectile_hit_system.in_set(SimSet::Combat),
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

/// Integrate projectile motion and cull shots past their lifetime.
pub fn projectile_flight_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut q_projectiles: Query<(Entity, &mut Projectile, &mut Transform, &Velocity)>,
) {
    for (entity, mut projectile, mut transform, velocity) in q_projectiles.iter_mut() {
        transform.translation.x += velocity.0.x;
        transform.translation.y += velocity.0.y;
        projectile.age += 1;
        if projectile.age > config.projectile_max_age {
            commands.entity(entity).despawn();
        }
    }
}

/// Resolve projectile collisions: player, then NPCs, then asteroids.
/// The first overlap consumes the shot.
#[allow(clippy::type_complexity)]
pub fn projectile_hit_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut audio: MessageWriter<AudioCue>,
    mut bursts: MessageWriter<ExplosionBurst>,
    q_projectiles: Query<(Entity, &Transform, &Projectile)>,
    mut q_player: Query<(&Transform, &mut Hull), With<PlayerShip>>,
    mut q_npcs: Query<(Entity, &Transform, &NpcStats, &mut NpcHealth), Without<PlayerShip>>,
    mut q_asteroids: Query<(&Transform, &Asteroid, &mut AsteroidHealth)>,
) {
    for (proj_entity, proj_transform, projectile) in q_projectiles.iter() {
        let proj_pos = proj_transform.translation.truncate();
        let mut consumed = false;

        // NPC shots can strike the player.
        if projectile.origin != ShotOrigin::Player {
            if let Ok((player_transform, mut hull)) = q_player.single_mut() {
                if player_transform.translation.truncate().distance(proj_pos)
                    < config.player_size
                {
                    let absorbed = hull.shield.min(projectile.damage);
                    hull.shield = (hull.shield - projectile.damage).max(0.0);
                    let overflow = projectile.damage - absorbed;
                    if overflow > 0.0 {
                        hull.hp = (hull.hp - overflow).max(0.0);
                    }
                    audio.write(AudioCue::ShieldHit);
                    bursts.write(ExplosionBurst {
                        pos: proj_pos,
                        small: true,
                    });
                    consumed = true;
                }
            }
        }

        if !consumed {
            for (npc_entity, npc_transform, stats, mut health) in q_npcs.iter_mut() {
                if projectile.origin == ShotOrigin::Npc(npc_entity) {
                    continue;
                }
                if npc_transform.translation.truncate().distance(proj_pos) < stats.size {
                    let source = match projectile.origin {
                        ShotOrigin::Player => Killer::Player,
                        ShotOrigin::Npc(_) => Killer::Npc,
                    };
                    health.apply_damage(projectile.damage, source);
                    bursts.write(ExplosionBurst {
                        pos: proj_pos,
                        small: true,
                    });
                    consumed = true;
                    break;
                }
            }
        }

        if !consumed {
            for (ast_transform, asteroid, mut health) in q_asteroids.iter_mut() {
                if ast_transform.translation.truncate().distance(proj_pos) < asteroid.radius {
                    health.0 -= projectile.damage;
                    bursts.write(ExplosionBurst {
                        pos: proj_pos,
                        small: true,
                    });
                    consumed = true;
                    break;
                }
            }
        }

        if consumed {
            commands.entity(proj_entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npc::state::{Npc, NpcKind};

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.add_message::<AudioCue>();
        app.add_message::<ExplosionBurst>();
        app
    }

    fn spawn_shot(app: &mut App, origin: ShotOrigin, pos: Vec2, damage: f32, age: u32) -> Entity {
        app.world_mut()
            .spawn((
                Projectile {
                    origin,
                    kind: WeaponKind::Laser,
                    damage,
                    age,
                },
                Transform::from_translation(pos.extend(0.2)),
                Velocity(Vec2::ZERO),
            ))
            .id()
    }

    fn spawn_npc(app: &mut App, kind: NpcKind, pos: Vec2) -> Entity {
        let template = kind.template();
        app.world_mut()
            .spawn((
                Npc { kind },
                NpcStats::from(template),
                NpcHealth::full(template.health),
                Transform::from_translation(pos.extend(0.0)),
            ))
            .id()
    }

    #[test]
    fn projectile_lives_through_tick_sixty_and_dies_after() {
        let mut app = test_app();
        app.add_systems(Update, projectile_flight_system);

        let shot = spawn_shot(&mut app, ShotOrigin::Player, Vec2::ZERO, 10.0, 59);
        app.update(); // age 60 — still alive
        assert!(app.world().get_entity(shot).is_ok());

        app.update(); // age 61 — removed
        assert!(app.world().get_entity(shot).is_err());
    }

    #[test]
    fn shooter_is_immune_to_its_own_shot() {
        let mut app = test_app();
        app.add_systems(Update, projectile_hit_system);

        let pirate = spawn_npc(&mut app, NpcKind::Pirate, Vec2::ZERO);
        // Muzzle overlap on spawn tick: shot sits right on the shooter.
        let shot = spawn_shot(&mut app, ShotOrigin::Npc(pirate), Vec2::new(2.0, 0.0), 10.0, 0);

        app.update();

        let health = app.world().get::<NpcHealth>(pirate).unwrap();
        assert_eq!(health.hp, 80.0, "own shot must not damage the shooter");
        assert!(
            app.world().get_entity(shot).is_ok(),
            "shot passes through the shooter unconsumed"
        );
    }

    #[test]
    fn npc_shot_damages_other_npcs_and_is_consumed() {
        let mut app = test_app();
        app.add_systems(Update, projectile_hit_system);

        let shooter = spawn_npc(&mut app, NpcKind::Patrol, Vec2::new(500.0, 0.0));
        let target = spawn_npc(&mut app, NpcKind::Pirate, Vec2::ZERO);
        let shot = spawn_shot(&mut app, ShotOrigin::Npc(shooter), Vec2::new(3.0, 0.0), 6.0, 0);

        app.update();

        let health = app.world().get::<NpcHealth>(target).unwrap();
        assert_eq!(health.hp, 74.0);
        assert!(app.world().get_entity(shot).is_err(), "first hit consumes the shot");
    }

    #[test]
    fn kill_is_attributed_to_shot_origin_exactly_once() {
        let mut app = test_app();
        app.add_systems(Update, projectile_hit_system);

        let target = spawn_npc(&mut app, NpcKind::Trader, Vec2::ZERO);
        spawn_shot(&mut app, ShotOrigin::Player, Vec2::new(1.0, 0.0), 60.0, 0);
        app.update();

        let health = app.world().get::<NpcHealth>(target).unwrap();
        assert!(health.hp <= 0.0);
        assert_eq!(health.killed_by, Some(Killer::Player));

        // A late NPC shot into the wreck must not steal the attribution.
        let other = spawn_npc(&mut app, NpcKind::Pirate, Vec2::new(400.0, 0.0));
        spawn_shot(&mut app, ShotOrigin::Npc(other), Vec2::new(1.0, 0.0), 10.0, 0);
        app.update();

        let health = app.world().get::<NpcHealth>(target).unwrap();
        assert_eq!(health.killed_by, Some(Killer::Player));
    }

    #[test]
    fn player_shield_absorbs_before_hull_and_both_clamp_at_zero() {
        let mut app = test_app();
        app.add_systems(Update, projectile_hit_system);

        let player = app
            .world_mut()
            .spawn((
                PlayerShip,
                Hull {
                    hp: 100.0,
                    max_hp: 100.0,
                    shield: 15.0,
                    max_shield: 25.0,
                },
                Transform::from_translation(Vec3::ZERO),
            ))
            .id();
        let pirate = spawn_npc(&mut app, NpcKind::Pirate, Vec2::new(300.0, 0.0));
        spawn_shot(&mut app, ShotOrigin::Npc(pirate), Vec2::new(2.0, 0.0), 40.0, 0);

        app.update();

        let hull = app.world().get::<Hull>(player).unwrap();
        assert_eq!(hull.shield, 0.0, "shield soaks first and clamps at zero");
        assert_eq!(hull.hp, 75.0, "overflow lands on the hull");

        // Massive overkill never drives hull negative.
        let pirate2 = spawn_npc(&mut app, NpcKind::Pirate, Vec2::new(-300.0, 0.0));
        spawn_shot(&mut app, ShotOrigin::Npc(pirate2), Vec2::new(-2.0, 0.0), 500.0, 0);
        app.update();

        let hull = app.world().get::<Hull>(player).unwrap();
        assert_eq!(hull.hp, 0.0);
        assert_eq!(hull.shield, 0.0);
    }

    #[test]
    fn player_hit_cue_plays_even_with_no_shield() {
        let mut app = test_app();
        app.add_systems(Update, projectile_hit_system);

        app.world_mut().spawn((
            PlayerShip,
            Hull {
                hp: 100.0,
                max_hp: 100.0,
                shield: 0.0,
                max_shield: 0.0,
            },
            Transform::from_translation(Vec3::ZERO),
        ));
        let pirate = spawn_npc(&mut app, NpcKind::Pirate, Vec2::new(300.0, 0.0));
        spawn_shot(&mut app, ShotOrigin::Npc(pirate), Vec2::new(2.0, 0.0), 10.0, 0);

        app.update();

        assert_eq!(
            app.world().resource::<Messages<AudioCue>>().len(),
            1,
            "a bare-hull hit still plays the hit sound"
        );
    }

    #[test]
    fn default_laser_backs_missing_weapon_profiles() {
        let mut app = test_app();
        let shot_entity = {
            let mut commands = app.world_mut().commands();
            spawn_projectile(
                &mut commands,
                ShotOrigin::Player,
                Vec2::ZERO,
                Vec2::new(0.1, 0.0),
                0.0,
                8.0,
                None,
            )
        };
        app.world_mut().flush();

        let shot = app.world().get::<Projectile>(shot_entity).unwrap();
        assert_eq!(shot.kind, WeaponKind::Laser);
        assert_eq!(shot.damage, 10.0);

        // Muzzle offset: size 8 + 5 along +X, momentum inherited.
        let transform = app.world().get::<Transform>(shot_entity).unwrap();
        assert!((transform.translation.x - 13.0).abs() < 1e-5);
        let vel = app.world().get::<Velocity>(shot_entity).unwrap();
        assert!((vel.0.x - 2.1).abs() < 1e-5);
    }
}
