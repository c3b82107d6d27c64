//! Floating pickups: ore chunks and loose credits.
//!
//! Pickups drift with heavy drag, expire after ten seconds, and are collected
//! by flying close.  Ore respects the cargo hold's free space; credits always
//! fit.

use crate::config::GameConfig;
use crate::constants::*;
use crate::events::AudioCue;
use crate::motion::Velocity;
use crate::planet::Commodity;
use crate::session::{GameState, SimSet};
use crate::ship::{CargoHold, PlayerShip, PlayerWallet};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickupKind {
    Ore(u32),
    Credits(u32),
}

#[derive(Component, Debug, Clone, Copy)]
pub struct Pickup {
    pub kind: PickupKind,
    pub age: u32,
}

pub fn spawn_pickup(commands: &mut Commands, kind: PickupKind, pos: Vec2, vel: Vec2) -> Entity {
    commands
        .spawn((
            Pickup { kind, age: 0 },
            Velocity(vel),
            Transform::from_translation(pos.extend(0.0)),
        ))
        .id()
}

/// Drag, drift, and expiry.
pub fn pickup_drift_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut q_pickups: Query<(Entity, &mut Pickup, &mut Velocity, &mut Transform)>,
) {
    for (entity, mut pickup, mut velocity, mut transform) in q_pickups.iter_mut() {
        velocity.0 *= PICKUP_DRAG;
        transform.translation.x += velocity.0.x;
        transform.translation.y += velocity.0.y;
        pickup.age += 1;
        if pickup.age >= config.pickup_max_lifetime {
            commands.entity(entity).despawn();
        }
    }
}

/// Collect pickups within reach of the player.  Ore only up to free cargo
/// space; a full hold leaves the chunk floating for later.
pub fn pickup_collect_system(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut wallet: ResMut<PlayerWallet>,
    mut audio: MessageWriter<AudioCue>,
    mut q_player: Query<(&Transform, &mut CargoHold), With<PlayerShip>>,
    q_pickups: Query<(Entity, &Transform, &Pickup)>,
) {
    let Ok((player_transform, mut cargo)) = q_player.single_mut() else {
        return;
    };
    let player_pos = player_transform.translation.truncate();
    let reach = config.player_size + config.pickup_collect_margin;

    for (entity, transform, pickup) in q_pickups.iter() {
        if transform.translation.truncate().distance(player_pos) >= reach {
            continue;
        }
        match pickup.kind {
            PickupKind::Ore(amount) => {
                if cargo.free_space() < amount {
                    continue;
                }
                cargo.add(Commodity::Ore, amount);
            }
            PickupKind::Credits(amount) => {
                wallet.credits += amount;
            }
        }
        audio.write(AudioCue::PickupCollected);
        commands.entity(entity).despawn();
    }
}

pub struct PickupPlugin;

impl Plugin for PickupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (pickup_drift_system, pickup_collect_system)
                .chain()
                .in_set(SimSet::Commerce)
                .run_if(in_state(GameState::Playing)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pickup_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(GameConfig::default());
        app.insert_resource(PlayerWallet::default());
        app.add_message::<AudioCue>();
        app.add_systems(Update, (pickup_drift_system, pickup_collect_system).chain());
        app
    }

    fn spawn_player(app: &mut App, cargo: CargoHold) -> Entity {
        app.world_mut()
            .spawn((PlayerShip, Transform::from_translation(Vec3::ZERO), cargo))
            .id()
    }

    fn drop_pickup(app: &mut App, kind: PickupKind, pos: Vec2) -> Entity {
        let entity = {
            let mut commands = app.world_mut().commands();
            spawn_pickup(&mut commands, kind, pos, Vec2::ZERO)
        };
        app.world_mut().flush();
        entity
    }

    #[test]
    fn ore_collection_respects_cargo_capacity() {
        let mut app = pickup_app();
        let mut hold = CargoHold::empty(10);
        hold.add(Commodity::Ore, 9);
        let player = spawn_player(&mut app, hold);
        let fits = drop_pickup(&mut app, PickupKind::Ore(1), Vec2::new(5.0, 0.0));
        let overflow = drop_pickup(&mut app, PickupKind::Ore(2), Vec2::new(-5.0, 0.0));

        app.update();

        assert!(app.world().get_entity(fits).is_err(), "one unit fits");
        assert!(
            app.world().get_entity(overflow).is_ok(),
            "a two-unit chunk stays afloat when only one slot is free"
        );
        assert_eq!(
            app.world()
                .get::<CargoHold>(player)
                .unwrap()
                .amount(Commodity::Ore),
            10
        );
    }

    #[test]
    fn credits_are_collected_regardless_of_cargo() {
        let mut app = pickup_app();
        let mut hold = CargoHold::empty(10);
        hold.add(Commodity::Ore, 10);
        spawn_player(&mut app, hold);
        let credits = drop_pickup(&mut app, PickupKind::Credits(40), Vec2::new(3.0, 0.0));

        app.update();

        assert!(app.world().get_entity(credits).is_err());
        assert_eq!(app.world().resource::<PlayerWallet>().credits, 40);
    }

    #[test]
    fn pickups_expire_after_their_lifetime() {
        let mut app = pickup_app();
        let entity = drop_pickup(&mut app, PickupKind::Ore(1), Vec2::new(500.0, 0.0));
        app.world_mut().get_mut::<Pickup>(entity).unwrap().age = PICKUP_MAX_LIFETIME - 1;

        app.update();

        assert!(app.world().get_entity(entity).is_err(), "aged out");
    }

    #[test]
    fn drag_bleeds_off_drift_speed() {
        let mut app = pickup_app();
        let entity = {
            let mut commands = app.world_mut().commands();
            spawn_pickup(
                &mut commands,
                PickupKind::Ore(1),
                Vec2::new(300.0, 0.0),
                Vec2::new(1.0, 0.0),
            )
        };
        app.world_mut().flush();

        app.update();

        let velocity = app.world().get::<Velocity>(entity).unwrap();
        assert!((velocity.0.x - 0.99).abs() < 1e-6);
    }
}
