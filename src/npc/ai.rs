//! Per-tick NPC behavior selection and the shared steering/motion pass.
//!
//! ## Two-pass ordering
//!
//! [`lawful_ai_system`] runs strictly before [`aggressive_ai_system`] every
//! tick.  Patrols publish their `pursuing` flag first; pirates read it in the
//! same tick to decide whether a nearby patrol is an actual threat.  The
//! original prey/predator coupling ran on one-tick-stale data — here the
//! schedule makes the dependency explicit instead.
//!
//! ## Decision → motion split
//!
//! Every AI system only *writes* a [`Steering`] decision (plus fire actions);
//! [`npc_motion_system`] applies all of them uniformly afterwards: bounded
//! turn, thrust along the heading, brake ×0.95, ambient damping ×0.999, speed
//! clamp, integrate.  Fleeing ships turn 2.5× faster.

use crate::config::GameConfig;
use crate::constants::*;
use crate::events::AudioCue;
use crate::motion::{clamp_speed, wrap_angle, Heading, Thrusting, Velocity};
use crate::npc::state::{
    AggressiveState, LawfulState, Npc, NpcStats, PassiveState, Steering, WeaponState,
};
use crate::planet::Planets;
use crate::projectile::{spawn_projectile, Projectile, ShotOrigin};
use crate::ship::{KillTally, PlayerShip, WeaponRack};
use bevy::prelude::*;
use rand::Rng;
use std::f32::consts::PI;

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Angle from `from` toward `to`.
#[inline]
fn bearing(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Lead-intercept aim point: assume the target keeps its velocity for
/// `dist / (max_speed * scale)` ticks and aim there.
#[inline]
fn intercept_point(target_pos: Vec2, target_vel: Vec2, dist: f32, max_speed: f32, scale: f32) -> Vec2 {
    let t = dist / (max_speed * scale).max(1e-6);
    target_pos + target_vel * t
}

/// Patrol hit probability by range band, degraded against fast targets.
fn patrol_accuracy(dist: f32, target_speed: f32) -> f32 {
    let base = if dist < 150.0 {
        PATROL_ACCURACY_CLOSE
    } else if dist < 300.0 {
        PATROL_ACCURACY_MID
    } else if dist < 450.0 {
        PATROL_ACCURACY_FAR
    } else {
        PATROL_ACCURACY_EXTREME
    };
    base * (1.0 - target_speed * 0.5).max(PATROL_ACCURACY_FLOOR)
}

/// Roll a patrol shot: a hit fires a real projectile, a miss burns half the
/// cooldown with nothing to show for it.
#[allow(clippy::too_many_arguments)]
fn patrol_try_shot(
    commands: &mut Commands,
    audio: &mut MessageWriter<AudioCue>,
    rng: &mut impl Rng,
    shooter: Entity,
    pos: Vec2,
    vel: Vec2,
    heading: f32,
    stats: &NpcStats,
    weapon: &mut WeaponState,
    dist: f32,
    target_speed: f32,
) {
    let Some(profile) = weapon.weapon else {
        return;
    };
    if rng.gen_range(0.0..1.0) < patrol_accuracy(dist, target_speed) {
        spawn_projectile(
            commands,
            ShotOrigin::Npc(shooter),
            pos,
            vel,
            heading,
            stats.size,
            Some(&profile),
        );
        weapon.cooldown = profile.cooldown;
        audio.write(AudioCue::WeaponFired(profile.kind));
    } else {
        weapon.cooldown = profile.cooldown / 2;
    }
}

// ── Lawful (patrol) ───────────────────────────────────────────────────────────

/// Patrol behavior: hunt pirates, police a hostile player, otherwise walk a
/// slowly-drifting beat.  Runs before the other AI passes so `pursuing` is
/// fresh when pirates check it.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn lawful_ai_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    tally: Res<KillTally>,
    rack: Res<WeaponRack>,
    mut audio: MessageWriter<AudioCue>,
    q_player: Query<(&Transform, &Velocity), (With<PlayerShip>, Without<Npc>)>,
    mut q_patrols: Query<(
        Entity,
        &Transform,
        &Velocity,
        &Heading,
        &NpcStats,
        &mut WeaponState,
        &mut LawfulState,
        &mut Steering,
    )>,
    q_pirates: Query<(&Transform, &Velocity, &WeaponState), (With<AggressiveState>, Without<LawfulState>)>,
    q_merchants: Query<&Transform, (With<PassiveState>, Without<LawfulState>)>,
) {
    let mut rng = rand::thread_rng();

    for (entity, transform, velocity, heading, stats, mut weapon, mut state, mut steer) in
        q_patrols.iter_mut()
    {
        let pos = transform.translation.truncate();

        // Pirate target: one caught in the act wins immediately at any
        // range; otherwise the nearest inside engagement range.
        let mut caught: Option<(Vec2, Vec2, f32)> = None;
        let mut nearest: Option<(Vec2, Vec2, f32)> = None;
        for (pt, pv, pw) in q_pirates.iter() {
            let ppos = pt.translation.truncate();
            let dist = ppos.distance(pos);
            let attacking = pw.recently_fired()
                || q_merchants.iter().any(|m| {
                    m.translation.truncate().distance(ppos) < config.patrol_merchant_guard_radius
                });
            if attacking {
                caught = Some((ppos, pv.0, dist));
                break;
            }
            if dist < config.patrol_engage_range && nearest.map_or(true, |(_, _, nd)| dist < nd) {
                nearest = Some((ppos, pv.0, dist));
            }
        }

        if let Some((tpos, tvel, dist)) = caught.or(nearest) {
            state.pursuing = true;
            state.pursuit_timer += 1;

            let mut give_up = dist > config.patrol_give_up_range
                && rng.gen_bool(config.patrol_give_up_chance as f64);
            if state.pursuit_timer > config.patrol_pursuit_timeout
                && rng.gen_bool(config.patrol_timeout_give_up_chance as f64)
            {
                give_up = true;
            }

            if !give_up {
                // Lead the target hard: patrols overshoot rather than trail.
                let aim_base =
                    intercept_point(tpos, tvel, dist, stats.max_speed, PATROL_INTERCEPT_SCALE);
                let aim = tpos + (aim_base - tpos) * 2.0;
                let desired = bearing(pos, aim);
                let err = wrap_angle(desired - heading.0).abs();
                *steer = Steering {
                    desired_angle: desired,
                    thrust: err < PATROL_PURSUIT_CONE,
                    thrust_power: 1.0,
                    brake: false,
                    flee_turn: false,
                };
                if dist < config.patrol_fire_range && err < PATROL_PURSUIT_CONE && weapon.cooldown == 0
                {
                    patrol_try_shot(
                        &mut commands,
                        &mut audio,
                        &mut rng,
                        entity,
                        pos,
                        velocity.0,
                        heading.0,
                        stats,
                        &mut weapon,
                        dist,
                        tvel.length(),
                    );
                }
                continue;
            }

            state.pursuing = false;
            state.pursuit_timer = 0;
        } else {
            state.pursuing = false;
            state.pursuit_timer = 0;
        }

        // No pirate business: police a hostile player.
        if let Ok((player_transform, player_vel)) = q_player.single() {
            let player_pos = player_transform.translation.truncate();
            let dist = player_pos.distance(pos);
            let hostile =
                rack.cooldown > 0 || tally.kills > config.player_hostile_kill_threshold;
            if hostile && dist < config.patrol_hostile_range {
                let aim_base = intercept_point(
                    player_pos,
                    player_vel.0,
                    dist,
                    stats.max_speed,
                    PATROL_INTERCEPT_SCALE,
                );
                let aim = player_pos + (aim_base - player_pos) * 2.0;
                let desired = bearing(pos, aim);
                let err = wrap_angle(desired - heading.0).abs();
                *steer = Steering {
                    desired_angle: desired,
                    thrust: err < PATROL_PURSUIT_CONE,
                    thrust_power: 1.0,
                    brake: false,
                    flee_turn: false,
                };
                if dist < config.patrol_hostile_fire_range
                    && err < PATROL_HOSTILE_FIRE_CONE
                    && weapon.cooldown == 0
                {
                    patrol_try_shot(
                        &mut commands,
                        &mut audio,
                        &mut rng,
                        entity,
                        pos,
                        velocity.0,
                        heading.0,
                        stats,
                        &mut weapon,
                        dist,
                        player_vel.0.length(),
                    );
                }
                continue;
            }
        }

        // Beat-walking: drift the patrol angle, occasionally reverse or jitter.
        if rng.gen_bool(PATROL_REVERSE_CHANCE as f64) {
            state.patrol_direction = -state.patrol_direction;
            state.patrol_rate = rng.gen_range(PATROL_RATE_MIN..PATROL_RATE_MAX);
        }
        if rng.gen_bool(PATROL_JITTER_CHANCE as f64) {
            state.patrol_angle += rng.gen_range(-PATROL_JITTER_MAX..PATROL_JITTER_MAX);
        }
        state.patrol_angle = wrap_angle(state.patrol_angle + state.patrol_rate * state.patrol_direction);
        let err = wrap_angle(state.patrol_angle - heading.0).abs();
        *steer = Steering {
            desired_angle: state.patrol_angle,
            thrust: err < PATROL_WANDER_THRUST_CONE,
            thrust_power: 1.0,
            brake: false,
            flee_turn: false,
        };
    }
}

// ── Aggressive (pirate) ───────────────────────────────────────────────────────

/// Pirate behavior: evade pursuing patrols, hunt the nearest prey with a
/// lead-intercept, otherwise wander.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn aggressive_ai_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut audio: MessageWriter<AudioCue>,
    q_player: Query<(&Transform, &Velocity), (With<PlayerShip>, Without<Npc>)>,
    mut q_pirates: Query<(
        Entity,
        &Transform,
        &Velocity,
        &Heading,
        &NpcStats,
        &mut WeaponState,
        &mut AggressiveState,
        &mut Steering,
    )>,
    q_patrols: Query<(&Transform, &LawfulState), Without<AggressiveState>>,
    q_merchants: Query<(&Transform, &Velocity), (With<PassiveState>, Without<AggressiveState>)>,
) {
    let mut rng = rand::thread_rng();

    for (entity, transform, velocity, heading, stats, mut weapon, mut state, mut steer) in
        q_pirates.iter_mut()
    {
        let pos = transform.translation.truncate();
        state.fleeing = false;

        // 1. Evade: the nearest patrol that is actually pursuing, inclusive
        // at the detection boundary.
        let mut threat: Option<(Vec2, f32)> = None;
        for (pt, lawful) in q_patrols.iter() {
            if !lawful.pursuing {
                continue;
            }
            let ppos = pt.translation.truncate();
            let dist = ppos.distance(pos);
            if dist <= config.pirate_evade_range && threat.map_or(true, |(_, td)| dist < td) {
                threat = Some((ppos, dist));
            }
        }
        if let Some((threat_pos, _)) = threat {
            let desired = bearing(threat_pos, pos);
            let err = wrap_angle(desired - heading.0).abs();
            let power = if err < PIRATE_FLEE_FULL_CONE {
                1.0
            } else if err < PIRATE_FLEE_HALF_CONE {
                0.5
            } else {
                0.0
            };
            *steer = Steering {
                desired_angle: desired,
                thrust: power > 0.0,
                thrust_power: power,
                brake: false,
                flee_turn: true,
            };
            state.fleeing = true;
            continue;
        }

        // 2. Hunt: nearest prey among the live player and merchants.
        let mut prey: Option<(Vec2, Vec2, f32)> = None;
        if let Ok((pt, pv)) = q_player.single() {
            let ppos = pt.translation.truncate();
            let dist = ppos.distance(pos);
            if dist < config.pirate_hunt_range {
                prey = Some((ppos, pv.0, dist));
            }
        }
        for (mt, mv) in q_merchants.iter() {
            let mpos = mt.translation.truncate();
            let dist = mpos.distance(pos);
            if dist < config.pirate_hunt_range && prey.map_or(true, |(_, _, pd)| dist < pd) {
                prey = Some((mpos, mv.0, dist));
            }
        }
        if let Some((tpos, tvel, dist)) = prey {
            let aim = intercept_point(tpos, tvel, dist, stats.max_speed, PIRATE_INTERCEPT_SCALE);
            let desired = bearing(pos, aim);
            let err = wrap_angle(desired - heading.0).abs();
            *steer = Steering {
                desired_angle: desired,
                thrust: err < PIRATE_THRUST_CONE && dist >= config.pirate_backoff_range,
                thrust_power: 1.0,
                brake: dist < config.pirate_brake_range,
                flee_turn: false,
            };
            if dist < config.pirate_fire_range && err < PIRATE_FIRE_CONE && weapon.cooldown == 0 {
                if let Some(profile) = weapon.weapon {
                    spawn_projectile(
                        &mut commands,
                        ShotOrigin::Npc(entity),
                        pos,
                        velocity.0,
                        heading.0,
                        stats.size,
                        Some(&profile),
                    );
                    weapon.cooldown = profile.cooldown;
                    audio.write(AudioCue::WeaponFired(profile.kind));
                }
            }
            continue;
        }

        // 3. Wander.
        if rng.gen_bool(config.pirate_wander_repick_chance as f64) {
            state.wander_angle = rng.gen_range(-PI..PI);
        }
        let err = wrap_angle(state.wander_angle - heading.0).abs();
        *steer = Steering {
            desired_angle: state.wander_angle,
            thrust: err < PIRATE_THRUST_CONE,
            thrust_power: 1.0,
            brake: false,
            flee_turn: false,
        };
    }
}

// ── Passive (merchant) ────────────────────────────────────────────────────────

/// Merchant behavior: flee a shooting player or a close pirate, otherwise
/// run freight between planets.  `fleeing` is recomputed from scratch every
/// tick — danger past means business as usual.
#[allow(clippy::type_complexity)]
pub fn passive_ai_system(
    config: Res<GameConfig>,
    planets: Res<Planets>,
    rack: Res<WeaponRack>,
    q_player: Query<&Transform, (With<PlayerShip>, Without<Npc>)>,
    q_player_shots: Query<&Projectile>,
    mut q_merchants: Query<(
        &Transform,
        &Velocity,
        &Heading,
        &NpcStats,
        &mut PassiveState,
        &mut Steering,
    )>,
    q_pirates: Query<&Transform, (With<AggressiveState>, Without<PassiveState>)>,
) {
    let mut rng = rand::thread_rng();
    let player_shooting = rack.cooldown > 0
        || q_player_shots
            .iter()
            .any(|p| p.origin == ShotOrigin::Player);
    let player_pos = q_player.single().ok().map(|t| t.translation.truncate());

    for (transform, velocity, heading, stats, mut state, mut steer) in q_merchants.iter_mut() {
        let pos = transform.translation.truncate();
        state.fleeing = false;

        // 1. A shooting player nearby.
        if let Some(ppos) = player_pos {
            if player_shooting && ppos.distance(pos) < config.passive_flee_player_range {
                let desired = bearing(ppos, pos);
                let err = wrap_angle(desired - heading.0).abs();
                *steer = Steering {
                    desired_angle: desired,
                    thrust: err < PASSIVE_FLEE_CONE,
                    thrust_power: 1.0,
                    brake: false,
                    flee_turn: true,
                };
                state.fleeing = true;
                continue;
            }
        }

        // 2. A pirate breathing down the neck.
        let mut threat: Option<(Vec2, f32)> = None;
        for pt in q_pirates.iter() {
            let ppos = pt.translation.truncate();
            let dist = ppos.distance(pos);
            if dist < config.passive_flee_pirate_range && threat.map_or(true, |(_, td)| dist < td)
            {
                threat = Some((ppos, dist));
            }
        }
        if let Some((threat_pos, _)) = threat {
            let desired = bearing(threat_pos, pos);
            let err = wrap_angle(desired - heading.0).abs();
            *steer = Steering {
                desired_angle: desired,
                thrust: err < PASSIVE_FLEE_CONE,
                thrust_power: 1.0,
                brake: false,
                flee_turn: true,
            };
            state.fleeing = true;
            continue;
        }

        // 3. Freight run.
        let planet = planets.get(state.target_planet);
        let to_planet = planet.pos - pos;
        let dist = to_planet.length();
        if dist > planet.radius + PASSIVE_ARRIVE_MARGIN {
            let desired = bearing(pos, planet.pos);
            let err = wrap_angle(desired - heading.0).abs();
            let closing = if dist > 0.0 {
                velocity.0.dot(to_planet / dist)
            } else {
                0.0
            };
            let brake = dist < config.passive_brake_range
                && closing > stats.max_speed * PASSIVE_BRAKE_SPEED_FRAC;
            *steer = Steering {
                desired_angle: desired,
                thrust: !brake && err < PASSIVE_NAV_CONE,
                thrust_power: 1.0,
                brake,
                flee_turn: false,
            };
        } else {
            // Parked in orbit; eventually pick a new port of call.
            *steer = Steering {
                desired_angle: heading.0,
                thrust: false,
                thrust_power: 0.0,
                brake: true,
                flee_turn: false,
            };
            if rng.gen_bool(config.passive_new_dest_chance as f64) {
                state.target_planet = planets.random_id(Some(state.target_planet), &mut rng);
            }
        }
    }
}

// ── Motion ────────────────────────────────────────────────────────────────────

/// Apply every NPC's steering decision: bounded turn, thrust, brake, damping,
/// speed clamp, integration, and the weapon cooldown tick.
#[allow(clippy::type_complexity)]
pub fn npc_motion_system(
    mut q_npcs: Query<
        (
            &Steering,
            &NpcStats,
            &mut Heading,
            &mut Velocity,
            &mut Thrusting,
            &mut Transform,
            &mut WeaponState,
        ),
        With<Npc>,
    >,
) {
    for (steer, stats, mut heading, mut velocity, mut thrusting, mut transform, mut weapon) in
        q_npcs.iter_mut()
    {
        let diff = wrap_angle(steer.desired_angle - heading.0);
        let max_turn = stats.turn_speed
            * if steer.flee_turn {
                FLEE_TURN_MULTIPLIER
            } else {
                1.0
            };
        heading.0 = wrap_angle(heading.0 + diff.clamp(-max_turn, max_turn));

        thrusting.0 = false;
        if steer.thrust && steer.thrust_power > 0.0 {
            velocity.0 += heading.dir() * stats.thrust * steer.thrust_power;
            thrusting.0 = true;
        }
        if steer.brake {
            velocity.0 *= BRAKE_FACTOR;
        }
        velocity.0 *= SPACE_DAMPING;
        velocity.0 = clamp_speed(velocity.0, stats.max_speed);

        transform.translation.x += velocity.0.x;
        transform.translation.y += velocity.0.y;
        transform.rotation = Quat::from_rotation_z(heading.0);

        weapon.cooldown = weapon.cooldown.saturating_sub(1);
    }
}
