//! Save slots: TOML snapshots of a running session.
//!
//! Three numbered slots live under `saves/`.  A snapshot captures the player
//! ship in full, the mission chain, and a reduced form of the world.  NPCs
//! keep position, kind, and health only; velocity and AI scratch state are
//! rebuilt fresh on load, so a reloaded pirate sits still for a tick and
//! re-decides what to do from scratch.  Asteroids and pickups keep their
//! drift.
//!
//! Save and load requests arrive as messages and are handled while paused.
//! Loading is two-phase: the request handler clears the old world and parks
//! the decoded snapshot in [`PendingLoadedSnapshot`]; the apply pass rebuilds
//! entities on the next schedule run.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::asteroid::{spawn_asteroid, Asteroid, AsteroidHealth};
use crate::error::{GameError, GameResult};
use crate::mission::MissionLog;
use crate::motion::{Heading, Velocity};
use crate::npc::spawn::spawn_npc_ship;
use crate::npc::state::{Npc, NpcHealth, NpcKind};
use crate::pickup::{spawn_pickup, Pickup, PickupKind};
use crate::planet::{PlanetId, Planets};
use crate::projectile::{Projectile, WeaponProfile};
use crate::session::{GameState, SimTick};
use crate::ship::{
    CargoHold, DockingStatus, Fuel, Hull, KillTally, PlayerShip, PlayerWallet, ShipLoadout,
    WeaponRack,
};

pub const SAVE_SLOT_COUNT: u8 = 3;
const SAVE_VERSION: u32 = 1;

#[derive(Message, Debug, Clone, Copy)]
pub struct SaveSlotRequest {
    pub slot: u8,
}

#[derive(Message, Debug, Clone, Copy)]
pub struct LoadSlotRequest {
    pub slot: u8,
}

/// A decoded snapshot waiting to be applied to the world.
#[derive(Resource, Default, Debug, Clone)]
pub struct PendingLoadedSnapshot(pub Option<SaveSnapshot>);

// ── Snapshot format ───────────────────────────────────────────────────────────

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SaveSnapshot {
    pub version: u32,
    pub saved_at_unix: u64,
    pub tick: u64,
    pub player: PlayerSnapshot,
    pub npcs: Vec<NpcSnapshot>,
    pub asteroids: Vec<AsteroidSnapshot>,
    pub pickups: Vec<PickupSnapshot>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PlayerSnapshot {
    pub pos: [f32; 2],
    pub vel: [f32; 2],
    pub heading: f32,
    pub hull: f32,
    pub max_hull: f32,
    pub shield: f32,
    pub max_shield: f32,
    pub fuel: f32,
    pub credits: u32,
    pub kills: u32,
    pub pirate_kills: u32,
    pub cargo_slots: Vec<u32>,
    pub cargo_capacity: u32,
    pub weapons: Vec<WeaponProfile>,
    pub current_weapon: usize,
    pub thrust: f32,
    pub max_speed: f32,
    pub docked_at: Option<usize>,
    pub last_planet: Option<usize>,
    pub mission_current: usize,
    pub mission_completed: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NpcSnapshot {
    pub kind: NpcKind,
    pub pos: [f32; 2],
    pub hp: f32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AsteroidSnapshot {
    pub pos: [f32; 2],
    pub vel: [f32; 2],
    pub radius: f32,
    pub health: f32,
    pub ore: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PickupSnapshot {
    pub pos: [f32; 2],
    pub vel: [f32; 2],
    pub kind: PickupKind,
}

// ── Slot I/O ──────────────────────────────────────────────────────────────────

fn save_dir() -> PathBuf {
    PathBuf::from("saves")
}

fn slot_path(slot: u8) -> GameResult<PathBuf> {
    if !(1..=SAVE_SLOT_COUNT).contains(&slot) {
        return Err(GameError::InvalidSlot { slot });
    }
    Ok(save_dir().join(format!("slot_{slot}.toml")))
}

pub fn slot_exists(slot: u8) -> bool {
    slot_path(slot).map(|p| p.exists()).unwrap_or(false)
}

pub fn write_slot(slot: u8, snapshot: &SaveSnapshot) -> GameResult<()> {
    let path = slot_path(slot)?;
    fs::create_dir_all(save_dir()).map_err(|err| GameError::SaveIo {
        context: format!("create save dir: {err}"),
    })?;
    let serialized = toml::to_string_pretty(snapshot).map_err(|err| GameError::SaveFormat {
        detail: format!("serialize: {err}"),
    })?;
    fs::write(&path, serialized).map_err(|err| GameError::SaveIo {
        context: format!("write {}: {err}", path.display()),
    })
}

pub fn load_slot(slot: u8) -> GameResult<SaveSnapshot> {
    let path = slot_path(slot)?;
    let contents = fs::read_to_string(&path).map_err(|err| GameError::SaveIo {
        context: format!("read {}: {err}", path.display()),
    })?;
    parse_snapshot_with_migration(&contents)
}

/// Decode a snapshot, patching older layouts up to the current version.
pub fn parse_snapshot_with_migration(contents: &str) -> GameResult<SaveSnapshot> {
    let mut value: toml::Value = toml::from_str(contents).map_err(|err| GameError::SaveFormat {
        detail: format!("parse: {err}"),
    })?;

    migrate_snapshot_value(&mut value)?;

    value
        .try_into::<SaveSnapshot>()
        .map_err(|err| GameError::SaveFormat {
            detail: format!("decode: {err}"),
        })
}

fn migrate_snapshot_value(value: &mut toml::Value) -> GameResult<()> {
    let table = value.as_table_mut().ok_or_else(|| GameError::SaveFormat {
        detail: "save file root must be a TOML table".to_string(),
    })?;

    // Pre-versioned files are treated as version 1.
    if !table.contains_key("version") {
        table.insert(
            "version".to_string(),
            toml::Value::Integer(SAVE_VERSION as i64),
        );
    }
    if !table.contains_key("saved_at_unix") {
        table.insert("saved_at_unix".to_string(), toml::Value::Integer(0));
    }

    let version = table
        .get("version")
        .and_then(toml::Value::as_integer)
        .ok_or_else(|| GameError::SaveFormat {
            detail: "save version is missing or invalid".to_string(),
        })?;

    if version != SAVE_VERSION as i64 {
        return Err(GameError::SaveFormat {
            detail: format!("unsupported save version {version} (expected {SAVE_VERSION})"),
        });
    }

    Ok(())
}

fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// ── Capture ───────────────────────────────────────────────────────────────────

/// Build a snapshot of the live session.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
pub fn capture_snapshot(
    tick: u64,
    wallet: &PlayerWallet,
    tally: &KillTally,
    rack: &WeaponRack,
    loadout: &ShipLoadout,
    docking: &DockingStatus,
    missions: &MissionLog,
    player: (&Transform, &Velocity, &Heading, &Hull, &Fuel, &CargoHold),
    npcs: impl Iterator<Item = (Npc, Transform, NpcHealth)>,
    asteroids: impl Iterator<Item = (Transform, Velocity, Asteroid, AsteroidHealth)>,
    pickups: impl Iterator<Item = (Transform, Velocity, Pickup)>,
) -> SaveSnapshot {
    let (transform, velocity, heading, hull, fuel, cargo) = player;

    SaveSnapshot {
        version: SAVE_VERSION,
        saved_at_unix: current_unix_timestamp(),
        tick,
        player: PlayerSnapshot {
            pos: [transform.translation.x, transform.translation.y],
            vel: [velocity.0.x, velocity.0.y],
            heading: heading.0,
            hull: hull.hp,
            max_hull: hull.max_hp,
            shield: hull.shield,
            max_shield: hull.max_shield,
            fuel: fuel.amount,
            credits: wallet.credits,
            kills: tally.kills,
            pirate_kills: tally.pirate_kills,
            cargo_slots: cargo.slots.to_vec(),
            cargo_capacity: cargo.capacity,
            weapons: rack.weapons.clone(),
            current_weapon: rack.current,
            thrust: loadout.thrust,
            max_speed: loadout.max_speed,
            docked_at: docking.docked_at.map(|id| id.0),
            last_planet: docking.last_planet.map(|id| id.0),
            mission_current: missions.current,
            mission_completed: missions.completed.clone(),
        },
        npcs: npcs
            .map(|(npc, transform, health)| NpcSnapshot {
                kind: npc.kind,
                pos: [transform.translation.x, transform.translation.y],
                hp: health.hp,
            })
            .collect(),
        asteroids: asteroids
            .map(|(transform, velocity, asteroid, health)| AsteroidSnapshot {
                pos: [transform.translation.x, transform.translation.y],
                vel: [velocity.0.x, velocity.0.y],
                radius: asteroid.radius,
                health: health.0,
                ore: asteroid.ore,
            })
            .collect(),
        pickups: pickups
            .map(|(transform, velocity, pickup)| PickupSnapshot {
                pos: [transform.translation.x, transform.translation.y],
                vel: [velocity.0.x, velocity.0.y],
                kind: pickup.kind,
            })
            .collect(),
    }
}

// ── Systems ───────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments, clippy::type_complexity)]
fn handle_save_requests_system(
    mut requests: MessageReader<SaveSlotRequest>,
    tick: Res<SimTick>,
    wallet: Res<PlayerWallet>,
    tally: Res<KillTally>,
    rack: Res<WeaponRack>,
    loadout: Res<ShipLoadout>,
    docking: Res<DockingStatus>,
    missions: Res<MissionLog>,
    q_player: Query<
        (&Transform, &Velocity, &Heading, &Hull, &Fuel, &CargoHold),
        With<PlayerShip>,
    >,
    q_npcs: Query<(&Npc, &Transform, &NpcHealth)>,
    q_asteroids: Query<(&Transform, &Velocity, &Asteroid, &AsteroidHealth)>,
    q_pickups: Query<(&Transform, &Velocity, &Pickup)>,
) {
    for request in requests.read() {
        let Ok(player) = q_player.single() else {
            warn!("No player ship to save");
            continue;
        };

        let snapshot = capture_snapshot(
            tick.0,
            &wallet,
            &tally,
            &rack,
            &loadout,
            &docking,
            &missions,
            player,
            q_npcs.iter().map(|(n, t, h)| (*n, *t, *h)),
            q_asteroids.iter().map(|(t, v, a, h)| (*t, *v, *a, *h)),
            q_pickups.iter().map(|(t, v, p)| (*t, *v, *p)),
        );

        match write_slot(request.slot, &snapshot) {
            Ok(()) => info!("Saved game to slot {}", request.slot),
            Err(err) => error!("Failed to save to slot {}: {}", request.slot, err),
        }
    }
}

/// Read a requested slot, clear the replaceable world, and queue the
/// snapshot for the apply pass.  Resumes play on success.
#[allow(clippy::type_complexity)]
fn handle_load_requests_system(
    mut commands: Commands,
    mut requests: MessageReader<LoadSlotRequest>,
    mut pending: ResMut<PendingLoadedSnapshot>,
    mut next_state: ResMut<NextState<GameState>>,
    q_world: Query<
        Entity,
        Or<(
            With<Npc>,
            With<Asteroid>,
            With<Pickup>,
            With<Projectile>,
        )>,
    >,
) {
    for request in requests.read() {
        match load_slot(request.slot) {
            Ok(snapshot) => {
                for entity in q_world.iter() {
                    commands.entity(entity).despawn();
                }
                pending.0 = Some(snapshot);
                next_state.set(GameState::Playing);
                info!("Loaded game from slot {}", request.slot);
            }
            Err(err) => error!("Failed to load slot {}: {}", request.slot, err),
        }
    }
}

/// Rebuild the world from a queued snapshot.  NPCs come back through the
/// regular spawn path and then get their saved kinematics and health; their
/// AI state starts fresh.
#[allow(clippy::too_many_arguments, clippy::type_complexity)]
fn apply_pending_snapshot_system(
    mut commands: Commands,
    mut pending: ResMut<PendingLoadedSnapshot>,
    planets: Res<Planets>,
    mut tick: ResMut<SimTick>,
    mut wallet: ResMut<PlayerWallet>,
    mut tally: ResMut<KillTally>,
    mut rack: ResMut<WeaponRack>,
    mut loadout: ResMut<ShipLoadout>,
    mut docking: ResMut<DockingStatus>,
    mut missions: ResMut<MissionLog>,
    mut q_player: Query<
        (&mut Transform, &mut Velocity, &mut Heading, &mut Hull, &mut Fuel, &mut CargoHold),
        With<PlayerShip>,
    >,
) {
    let Some(snapshot) = pending.0.take() else {
        return;
    };
    let mut rng = rand::thread_rng();
    let saved = &snapshot.player;

    *tick = SimTick(snapshot.tick);
    *wallet = PlayerWallet {
        credits: saved.credits,
    };
    *tally = KillTally {
        kills: saved.kills,
        pirate_kills: saved.pirate_kills,
    };
    *rack = WeaponRack {
        weapons: saved.weapons.clone(),
        current: saved.current_weapon.min(saved.weapons.len().saturating_sub(1)),
        cooldown: 0,
    };
    *loadout = ShipLoadout {
        thrust: saved.thrust,
        max_speed: saved.max_speed,
    };
    *docking = DockingStatus {
        docked_at: saved.docked_at.map(PlanetId),
        launch_cooldown: 0,
        last_planet: saved.last_planet.map(PlanetId),
    };
    *missions = MissionLog {
        current: saved.mission_current,
        completed: saved.mission_completed.clone(),
    };

    if let Ok((mut transform, mut velocity, mut heading, mut hull, mut fuel, mut cargo)) =
        q_player.single_mut()
    {
        transform.translation = Vec3::new(saved.pos[0], saved.pos[1], 0.0);
        velocity.0 = Vec2::new(saved.vel[0], saved.vel[1]);
        heading.0 = saved.heading;
        *hull = Hull {
            hp: saved.hull,
            max_hp: saved.max_hull,
            shield: saved.shield,
            max_shield: saved.max_shield,
        };
        fuel.amount = saved.fuel;
        let mut slots = [0u32; 6];
        for (slot, saved_slot) in slots.iter_mut().zip(saved.cargo_slots.iter()) {
            *slot = *saved_slot;
        }
        *cargo = CargoHold {
            slots,
            capacity: saved.cargo_capacity,
        };
    }

    for npc in &snapshot.npcs {
        let pos = Vec2::new(npc.pos[0], npc.pos[1]);
        let heading = rng.gen_range(-std::f32::consts::PI..std::f32::consts::PI);
        let entity = spawn_npc_ship(
            &mut commands,
            &planets,
            npc.kind,
            pos,
            Vec2::ZERO,
            heading,
            &mut rng,
        );
        let mut health = NpcHealth::full(npc.kind.template().health);
        health.hp = npc.hp;
        commands.entity(entity).insert(health);
    }

    for rock in &snapshot.asteroids {
        spawn_asteroid(
            &mut commands,
            Vec2::new(rock.pos[0], rock.pos[1]),
            Vec2::new(rock.vel[0], rock.vel[1]),
            rock.radius,
            rock.health,
            rock.ore,
            0.0,
        );
    }

    for pickup in &snapshot.pickups {
        spawn_pickup(
            &mut commands,
            pickup.kind,
            Vec2::new(pickup.pos[0], pickup.pos[1]),
            Vec2::new(pickup.vel[0], pickup.vel[1]),
        );
    }

    info!(
        "Snapshot applied: tick {}, {} NPCs, {} asteroids",
        snapshot.tick,
        snapshot.npcs.len(),
        snapshot.asteroids.len()
    );
}

pub struct SavePlugin;

impl Plugin for SavePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PendingLoadedSnapshot>()
            .add_message::<SaveSlotRequest>()
            .add_message::<LoadSlotRequest>()
            .add_systems(
                Update,
                (handle_save_requests_system, handle_load_requests_system)
                    .run_if(in_state(GameState::Paused)),
            )
            .add_systems(
                Update,
                apply_pending_snapshot_system
                    .run_if(|pending: Res<PendingLoadedSnapshot>| pending.0.is_some()),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_snapshot() -> SaveSnapshot {
        SaveSnapshot {
            version: SAVE_VERSION,
            saved_at_unix: 0,
            tick: 4200,
            player: PlayerSnapshot {
                pos: [120.0, -40.0],
                vel: [0.2, 0.0],
                heading: 1.5,
                hull: 80.0,
                max_hull: 100.0,
                shield: 12.0,
                max_shield: 25.0,
                fuel: 55.5,
                credits: 1234,
                kills: 4,
                pirate_kills: 2,
                cargo_slots: vec![1, 3, 0, 0, 0, 0],
                cargo_capacity: 15,
                weapons: vec![WeaponProfile::DEFAULT_LASER],
                current_weapon: 0,
                thrust: 0.006,
                max_speed: 0.585,
                docked_at: None,
                last_planet: Some(2),
                mission_current: 1,
                mission_completed: vec!["first_kill".to_string()],
            },
            npcs: vec![NpcSnapshot {
                kind: NpcKind::Pirate,
                pos: [900.0, 0.0],
                hp: 45.0,
            }],
            asteroids: vec![AsteroidSnapshot {
                pos: [-300.0, 600.0],
                vel: [0.05, -0.02],
                radius: 7.5,
                health: 14.0,
                ore: 2,
            }],
            pickups: vec![PickupSnapshot {
                pos: [10.0, 10.0],
                vel: [0.0, 0.0],
                kind: PickupKind::Ore(1),
            }],
        }
    }

    #[test]
    fn snapshot_round_trips_through_toml() {
        let snapshot = sample_snapshot();
        let serialized = toml::to_string_pretty(&snapshot).unwrap();
        let decoded = parse_snapshot_with_migration(&serialized).unwrap();

        assert_eq!(decoded.tick, 4200);
        assert_eq!(decoded.player.credits, 1234);
        assert_eq!(decoded.player.cargo_slots, vec![1, 3, 0, 0, 0, 0]);
        assert_eq!(decoded.player.last_planet, Some(2));
        assert_eq!(decoded.npcs.len(), 1);
        assert_eq!(decoded.npcs[0].kind, NpcKind::Pirate);
        assert!((decoded.asteroids[0].radius - 7.5).abs() < f32::EPSILON);
        assert_eq!(decoded.pickups[0].kind, PickupKind::Ore(1));
    }

    #[test]
    fn missing_version_is_treated_as_current() {
        let snapshot = sample_snapshot();
        let serialized = toml::to_string_pretty(&snapshot).unwrap();
        let stripped: String = serialized
            .lines()
            .filter(|line| !line.starts_with("version"))
            .collect::<Vec<_>>()
            .join("\n");

        let decoded = parse_snapshot_with_migration(&stripped).unwrap();
        assert_eq!(decoded.version, SAVE_VERSION);
    }

    #[test]
    fn future_versions_are_rejected() {
        let mut snapshot = sample_snapshot();
        snapshot.version = 99;
        let serialized = toml::to_string_pretty(&snapshot).unwrap();

        let err = parse_snapshot_with_migration(&serialized).unwrap_err();
        assert!(matches!(err, GameError::SaveFormat { .. }));
    }

    #[test]
    fn slot_numbers_are_validated() {
        assert!(matches!(
            slot_path(0),
            Err(GameError::InvalidSlot { slot: 0 })
        ));
        assert!(matches!(
            slot_path(SAVE_SLOT_COUNT + 1),
            Err(GameError::InvalidSlot { .. })
        ));
        assert!(slot_path(1).is_ok());
        assert!(!slot_exists(0));
    }

    #[test]
    fn garbage_files_fail_with_a_format_error() {
        let err = parse_snapshot_with_migration("not [ valid { toml").unwrap_err();
        assert!(matches!(err, GameError::SaveFormat { .. }));
    }

    #[test]
    fn loaded_npcs_start_stationary_with_fresh_ai_state() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(Planets::default());
        app.insert_resource(SimTick::default());
        app.insert_resource(PlayerWallet::default());
        app.insert_resource(KillTally::default());
        app.insert_resource(WeaponRack::default());
        app.insert_resource(ShipLoadout::default());
        app.insert_resource(DockingStatus::default());
        app.insert_resource(MissionLog::default());
        app.insert_resource(PendingLoadedSnapshot(Some(sample_snapshot())));
        app.add_systems(Update, apply_pending_snapshot_system);

        app.update();

        let world = app.world_mut();
        let mut q = world.query::<(&Npc, &Transform, &Velocity, &NpcHealth)>();
        let npcs: Vec<_> = q.iter(world).collect();
        assert_eq!(npcs.len(), 1);
        let (npc, transform, velocity, health) = npcs[0];
        assert_eq!(npc.kind, NpcKind::Pirate);
        assert_eq!(transform.translation.truncate(), Vec2::new(900.0, 0.0));
        assert_eq!(velocity.0, Vec2::ZERO, "drift is not persisted");
        assert!((health.hp - 45.0).abs() < f32::EPSILON);
        assert!(health.killed_by.is_none());
    }
}
