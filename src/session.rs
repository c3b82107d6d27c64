//! Session state machine, the simulation tick, and the fixed system ordering.
//!
//! ## States
//!
//! `MainMenu → Playing ⇄ Paused`.  Every gameplay system is gated on
//! `Playing`, so pausing freezes the world wholesale; save and load requests
//! are handled while paused.
//!
//! ## Tick order
//!
//! One `Update` pass of the schedule is one simulation tick.  The
//! [`SimSet`] chain pins the order the original loop relied on, most
//! importantly that patrols decide before pirates react and that all motion
//! happens after all decisions:
//!
//! Tick → Input → PlayerUpdate → Spawn → LawfulAi → FreeAi → Motion →
//! Projectiles → Combat → Lifecycle → Environment → Commerce

use crate::asteroid::seed_asteroid_field;
use crate::config::GameConfig;
use crate::mission::MissionLog;
use crate::npc::SpawnScheduler;
use crate::planet::Planets;
use crate::ship::{
    spawn_player_ship, DockingStatus, KillTally, PlayerShip, PlayerWallet, ShipLoadout, WeaponRack,
};
use bevy::prelude::*;

#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash)]
pub enum GameState {
    #[default]
    MainMenu,
    Playing,
    Paused,
}

/// Monotonic simulation tick counter.  Only advances while playing.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimTick(pub u64);

/// Per-tick phases, chained in declaration order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimSet {
    Tick,
    Input,
    PlayerUpdate,
    Spawn,
    LawfulAi,
    FreeAi,
    Motion,
    Projectiles,
    Combat,
    Lifecycle,
    Environment,
    Commerce,
}

fn tick_system(mut tick: ResMut<SimTick>) {
    tick.0 += 1;
}

/// First entry into `Playing`: spawn the player, seed the belt, and reset
/// every session-scoped resource.  Resuming from pause re-enters `Playing`
/// too, so an existing player ship means there is nothing to do.
#[allow(clippy::too_many_arguments)]
fn setup_session(
    mut commands: Commands,
    config: Res<GameConfig>,
    q_player: Query<(), With<PlayerShip>>,
    mut tick: ResMut<SimTick>,
    mut wallet: ResMut<PlayerWallet>,
    mut tally: ResMut<KillTally>,
    mut rack: ResMut<WeaponRack>,
    mut loadout: ResMut<ShipLoadout>,
    mut docking: ResMut<DockingStatus>,
    mut missions: ResMut<MissionLog>,
    mut scheduler: ResMut<SpawnScheduler>,
) {
    if !q_player.is_empty() {
        return;
    }

    let mut rng = rand::thread_rng();
    spawn_player_ship(&mut commands, &config);
    seed_asteroid_field(&mut commands, &config, &mut rng);

    *tick = SimTick(0);
    *wallet = PlayerWallet {
        credits: config.player_start_credits,
    };
    *tally = KillTally::default();
    *rack = WeaponRack::default();
    *loadout = ShipLoadout::default();
    *docking = DockingStatus::default();
    *missions = MissionLog::default();
    *scheduler = SpawnScheduler::default();

    info!(
        "Session started: {} cr, {} asteroids seeded",
        config.player_start_credits, config.asteroid_field_count
    );
}

/// Enter starts a game from the menu; Escape toggles pause in flight.
fn state_control_system(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    match state.get() {
        GameState::MainMenu => {
            if keys.just_pressed(KeyCode::Enter) {
                next_state.set(GameState::Playing);
            }
        }
        GameState::Playing => {
            if keys.just_pressed(KeyCode::Escape) {
                next_state.set(GameState::Paused);
            }
        }
        GameState::Paused => {
            if keys.just_pressed(KeyCode::Escape) {
                next_state.set(GameState::Playing);
            }
        }
    }
}

pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameState>()
            .init_resource::<SimTick>()
            .init_resource::<Planets>()
            .configure_sets(
                Update,
                (
                    SimSet::Tick,
                    SimSet::Input,
                    SimSet::PlayerUpdate,
                    SimSet::Spawn,
                    SimSet::LawfulAi,
                    SimSet::FreeAi,
                    SimSet::Motion,
                    SimSet::Projectiles,
                    SimSet::Combat,
                    SimSet::Lifecycle,
                    SimSet::Environment,
                    SimSet::Commerce,
                )
                    .chain(),
            )
            .add_systems(OnEnter(GameState::Playing), setup_session)
            .add_systems(
                Update,
                (
                    state_control_system,
                    tick_system
                        .in_set(SimSet::Tick)
                        .run_if(in_state(GameState::Playing)),
                ),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asteroid::Asteroid;
    use bevy::state::app::StatesPlugin;

    fn session_app() -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin));
        // MinimalPlugins omits InputPlugin, which normally provides the
        // keyboard resource state_control_system reads.
        app.init_resource::<ButtonInput<KeyCode>>();
        app.insert_resource(GameConfig::default());
        app.init_resource::<PlayerWallet>();
        app.init_resource::<KillTally>();
        app.init_resource::<WeaponRack>();
        app.init_resource::<ShipLoadout>();
        app.init_resource::<DockingStatus>();
        app.init_resource::<MissionLog>();
        app.init_resource::<SpawnScheduler>();
        app.add_plugins(SessionPlugin);
        app
    }

    fn set_state(app: &mut App, state: GameState) {
        app.world_mut()
            .resource_mut::<NextState<GameState>>()
            .set(state);
    }

    #[test]
    fn entering_play_seeds_the_session() {
        let mut app = session_app();
        set_state(&mut app, GameState::Playing);
        app.update();

        let players = app
            .world_mut()
            .query_filtered::<(), With<PlayerShip>>()
            .iter(app.world())
            .count();
        assert_eq!(players, 1);

        let rocks = app
            .world_mut()
            .query_filtered::<(), With<Asteroid>>()
            .iter(app.world())
            .count();
        assert_eq!(rocks, GameConfig::default().asteroid_field_count);

        assert_eq!(
            app.world().resource::<PlayerWallet>().credits,
            GameConfig::default().player_start_credits
        );
    }

    #[test]
    fn resuming_from_pause_does_not_respawn_the_world() {
        let mut app = session_app();
        set_state(&mut app, GameState::Playing);
        app.update();
        app.world_mut().resource_mut::<PlayerWallet>().credits = 9999;

        set_state(&mut app, GameState::Paused);
        app.update();
        set_state(&mut app, GameState::Playing);
        app.update();

        let players = app
            .world_mut()
            .query_filtered::<(), With<PlayerShip>>()
            .iter(app.world())
            .count();
        assert_eq!(players, 1, "no duplicate player ship");
        assert_eq!(
            app.world().resource::<PlayerWallet>().credits,
            9999,
            "session resources survive a pause"
        );
    }

    #[test]
    fn the_tick_only_advances_while_playing() {
        let mut app = session_app();
        app.update();
        assert_eq!(app.world().resource::<SimTick>().0, 0, "menus do not tick");

        set_state(&mut app, GameState::Playing);
        app.update();
        app.update();
        assert_eq!(app.world().resource::<SimTick>().0, 2);

        set_state(&mut app, GameState::Paused);
        app.update();
        assert_eq!(app.world().resource::<SimTick>().0, 2, "pause freezes time");
    }
}
