//! NPC ships: spawn control, behavior AI, steering, and lifecycle.
//!
//! Tick flow through the [`crate::session::SimSet`] chain:
//!
//! 1. `Spawn` — the spawn controller trickles new ships in around the player.
//! 2. `LawfulAi` — patrols pick targets and publish their `pursuing` flags.
//! 3. `FreeAi` — pirates (reading those flags) and merchants decide steering.
//! 4. `Motion` — one shared pass applies every steering decision.
//! 5. `Lifecycle` — deaths pay out, far-away ships quietly leave.

pub mod ai;
pub mod lifecycle;
pub mod spawn;
pub mod state;

pub use spawn::{spawn_npc_ship, SpawnScheduler};
pub use state::{
    AggressiveState, Behavior, Killer, LawfulState, Npc, NpcHealth, NpcKind, NpcStats,
    PassiveState, Steering, WeaponState,
};

use crate::session::{GameState, SimSet};
use bevy::prelude::*;

pub struct NpcPlugin;

impl Plugin for NpcPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SpawnScheduler>()
            .add_systems(
                Update,
                (
                    spawn::npc_spawn_system.in_set(SimSet::Spawn),
                    ai::lawful_ai_system.in_set(SimSet::LawfulAi),
                    (ai::aggressive_ai_system, ai::passive_ai_system).in_set(SimSet::FreeAi),
                    ai::npc_motion_system.in_set(SimSet::Motion),
                    (lifecycle::npc_death_system, lifecycle::npc_despawn_system)
                        .in_set(SimSet::Lifecycle),
                )
                    .run_if(in_state(GameState::Playing)),
            );
    }
}
