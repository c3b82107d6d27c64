//! NPC death handling and distance-based despawn.
//!
//! Death pays a bounty only when the player landed the killing blow:
//! aggressive kinds pay their full template credits, everything else pays
//! half (floored), and every player kill adds a flat bonus on top.  Ships
//! that drift too far from the player are removed silently with no
//! explosion, no bounty, and no tally change.

use crate::config::GameConfig;
use crate::events::{AudioCue, ExplosionBurst};
use crate::npc::state::{Behavior, Killer, Npc, NpcHealth};
use crate::ship::{KillTally, PlayerShip, PlayerWallet};
use bevy::prelude::*;

/// Credits paid for a player kill of `kind`, before the flat bonus.
fn bounty_for(npc: &Npc, config: &GameConfig) -> u32 {
    let template = npc.kind.template();
    match template.behavior {
        Behavior::Aggressive => template.credits,
        _ => (template.credits as f32 * config.non_pirate_bounty_frac) as u32,
    }
}

/// Resolve NPC deaths: explosion burst, bounty and tally for player kills,
/// then despawn.
pub fn npc_death_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut wallet: ResMut<PlayerWallet>,
    mut tally: ResMut<KillTally>,
    mut bursts: MessageWriter<ExplosionBurst>,
    mut audio: MessageWriter<AudioCue>,
    q_npcs: Query<(Entity, &Npc, &NpcHealth, &Transform)>,
) {
    for (entity, npc, health, transform) in q_npcs.iter() {
        if health.hp > 0.0 {
            continue;
        }

        bursts.write(ExplosionBurst {
            pos: transform.translation.truncate(),
            small: false,
        });
        audio.write(AudioCue::Explosion { large: true });

        if health.killed_by == Some(Killer::Player) {
            let payout = bounty_for(npc, &config) + config.kill_bonus_credits;
            wallet.credits += payout;
            tally.kills += 1;
            if npc.kind.behavior() == Behavior::Aggressive {
                tally.pirate_kills += 1;
            }
            info!(
                "{} destroyed by player, bounty {} cr",
                npc.kind.label(),
                payout
            );
        }

        commands.entity(entity).despawn();
    }
}

/// Remove NPCs strictly farther than the despawn distance from the player.
/// No explosion, no bounty; the ship just leaves the simulated bubble.
pub fn npc_despawn_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    q_player: Query<&Transform, (With<PlayerShip>, Without<Npc>)>,
    q_npcs: Query<(Entity, &Transform), With<Npc>>,
) {
    let Ok(player_transform) = q_player.single() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();

    for (entity, transform) in q_npcs.iter() {
        if transform.translation.truncate().distance(player_pos) > config.npc_despawn_distance {
            commands.entity(entity).despawn();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npc::spawn::spawn_npc_ship;
    use crate::npc::state::NpcKind;
    use crate::planet::Planets;

    fn lifecycle_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.insert_resource(PlayerWallet::default());
        app.insert_resource(KillTally::default());
        app.add_message::<ExplosionBurst>();
        app.add_message::<AudioCue>();
        app.add_systems(Update, (npc_death_system, npc_despawn_system).chain());
        app
    }

    fn spawn_kind(app: &mut App, kind: NpcKind, pos: Vec2) -> Entity {
        let planets = Planets::default();
        let mut rng = rand::thread_rng();
        let entity = {
            let mut commands = app.world_mut().commands();
            spawn_npc_ship(&mut commands, &planets, kind, pos, Vec2::ZERO, 0.0, &mut rng)
        };
        app.world_mut().flush();
        entity
    }

    fn spawn_player(app: &mut App, pos: Vec2) {
        app.world_mut().spawn((
            PlayerShip,
            Transform::from_translation(pos.extend(0.0)),
        ));
    }

    #[test]
    fn pirate_kill_pays_full_bounty_plus_bonus() {
        let mut app = lifecycle_app();
        spawn_player(&mut app, Vec2::ZERO);
        let pirate = spawn_kind(&mut app, NpcKind::Pirate, Vec2::new(100.0, 0.0));
        {
            let mut health = app.world_mut().get_mut::<NpcHealth>(pirate).unwrap();
            health.apply_damage(200.0, Killer::Player);
        }

        app.update();

        assert!(app.world().get_entity(pirate).is_err(), "corpse removed");
        // Pirate template: 150 cr, aggressive pays full, +25 bonus.
        assert_eq!(app.world().resource::<PlayerWallet>().credits, 175);
        let tally = app.world().resource::<KillTally>();
        assert_eq!(tally.kills, 1);
        assert_eq!(tally.pirate_kills, 1);
    }

    #[test]
    fn freighter_kill_pays_half_bounty_and_no_pirate_tally() {
        let mut app = lifecycle_app();
        spawn_player(&mut app, Vec2::ZERO);
        let freighter = spawn_kind(&mut app, NpcKind::Freighter, Vec2::new(100.0, 0.0));
        {
            let mut health = app.world_mut().get_mut::<NpcHealth>(freighter).unwrap();
            health.apply_damage(500.0, Killer::Player);
        }

        app.update();

        // Freighter template: 800 cr, halved to 400, +25 bonus.
        assert_eq!(app.world().resource::<PlayerWallet>().credits, 425);
        let tally = app.world().resource::<KillTally>();
        assert_eq!(tally.kills, 1);
        assert_eq!(tally.pirate_kills, 0, "only aggressive kills count as pirate kills");
    }

    #[test]
    fn npc_kills_pay_nothing() {
        let mut app = lifecycle_app();
        spawn_player(&mut app, Vec2::ZERO);
        let trader = spawn_kind(&mut app, NpcKind::Trader, Vec2::new(100.0, 0.0));
        {
            let mut health = app.world_mut().get_mut::<NpcHealth>(trader).unwrap();
            health.apply_damage(100.0, Killer::Npc);
        }

        app.update();

        assert!(app.world().get_entity(trader).is_err());
        assert_eq!(app.world().resource::<PlayerWallet>().credits, 0);
        assert_eq!(app.world().resource::<KillTally>().kills, 0);
        // The explosion still happens for everyone to see.
        let burst_count = app
            .world()
            .resource::<Messages<ExplosionBurst>>()
            .len();
        assert_eq!(burst_count, 1);
    }

    #[test]
    fn despawn_is_strictly_beyond_the_boundary() {
        let mut app = lifecycle_app();
        spawn_player(&mut app, Vec2::ZERO);
        let at_boundary = spawn_kind(&mut app, NpcKind::Trader, Vec2::new(3000.0, 0.0));
        let beyond = spawn_kind(&mut app, NpcKind::Trader, Vec2::new(3000.1, 0.0));

        app.update();

        assert!(
            app.world().get_entity(at_boundary).is_ok(),
            "exactly at the boundary stays"
        );
        assert!(app.world().get_entity(beyond).is_err(), "past it goes");
        // Silent removal: no bounty, no tally, no burst.
        assert_eq!(app.world().resource::<PlayerWallet>().credits, 0);
        assert_eq!(
            app.world().resource::<Messages<ExplosionBurst>>().len(),
            0
        );
    }
}
