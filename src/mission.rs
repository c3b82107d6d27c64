//! A short sequential mission chain with automatic progress tracking.
//!
//! Missions activate one at a time in a fixed order; progress is measured
//! against the live kill tally and wallet every tick, and rewards pay out the
//! moment a goal is met.  There is no accept/turn-in step.

use crate::session::{GameState, SimSet};
use crate::ship::{KillTally, PlayerWallet};
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionGoal {
    /// Destroy this many pirates (lifetime total).
    PirateKills(u32),
    /// Hold at least this many credits at once.
    Credits(u32),
}

#[derive(Debug, Clone, Copy)]
pub struct Mission {
    pub id: &'static str,
    pub name: &'static str,
    pub goal: MissionGoal,
    pub reward: u32,
}

pub static MISSIONS: [Mission; 3] = [
    Mission {
        id: "first_kill",
        name: "First Blood",
        goal: MissionGoal::PirateKills(1),
        reward: 200,
    },
    Mission {
        id: "trader",
        name: "Making a Living",
        goal: MissionGoal::Credits(750),
        reward: 300,
    },
    Mission {
        id: "bounty_hunter",
        name: "Bounty Hunter",
        goal: MissionGoal::PirateKills(3),
        reward: 500,
    },
];

/// Mission chain progress.  `current` indexes into [`MISSIONS`]; completed
/// mission ids are kept for the save file and the UI.
#[derive(Resource, Debug, Clone, Default)]
pub struct MissionLog {
    pub current: usize,
    pub completed: Vec<String>,
}

impl MissionLog {
    pub fn active(&self) -> Option<&'static Mission> {
        MISSIONS.get(self.current)
    }
}

/// Check the active mission against the live counters and pay out on
/// completion.  At most one mission completes per tick, so a windfall that
/// satisfies two goals resolves over two ticks.
pub fn mission_progress_system(
    mut log: ResMut<MissionLog>,
    tally: Res<KillTally>,
    mut wallet: ResMut<PlayerWallet>,
) {
    let Some(mission) = log.active() else {
        return;
    };

    let done = match mission.goal {
        MissionGoal::PirateKills(n) => tally.pirate_kills >= n,
        MissionGoal::Credits(n) => wallet.credits >= n,
    };
    if !done {
        return;
    }

    wallet.credits += mission.reward;
    info!("Mission complete: {} (+{} cr)", mission.name, mission.reward);
    let id = mission.id.to_string();
    log.completed.push(id);
    log.current += 1;
}

pub struct MissionPlugin;

impl Plugin for MissionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MissionLog>().add_systems(
            Update,
            mission_progress_system
                .in_set(SimSet::Commerce)
                .run_if(in_state(GameState::Playing)),
        );
    }
}
