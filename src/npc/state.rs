//! NPC kinds, stat templates, and per-ship components.
//!
//! Every NPC carries exactly one behavior-state component — [`AggressiveState`],
//! [`LawfulState`], or [`PassiveState`] — fully initialized at spawn.  The AI
//! systems in [`crate::npc::ai`] query by that component, so a ship's behavior
//! class is fixed for its lifetime and no system ever sees a half-built state.
//!
//! ## Stat templates
//!
//! | Kind      | behavior   | maxSpeed | thrust | turn  | size | credits | hp  | weapon          |
//! |-----------|------------|----------|--------|-------|------|---------|-----|-----------------|
//! | Freighter | passive    | 0.25     | 0.002  | 0.006 | 22   | 800     | 150 | laser 3 / 40    |
//! | Trader    | passive    | 0.45     | 0.004  | 0.012 | 12   | 200     | 50  | —               |
//! | Pirate    | aggressive | 0.7      | 0.007  | 0.02  | 11   | 150     | 80  | laser 10 / 18   |
//! | Patrol    | lawful     | 1.2      | 0.015  | 0.08  | 16   | 100     | 150 | rapid 6 / 20    |

use crate::planet::PlanetId;
use crate::projectile::{WeaponKind, WeaponProfile};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// The four ship classes that roam the sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcKind {
    Freighter,
    Trader,
    Pirate,
    Patrol,
}

/// Behavior class derived from the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Passive,
    Aggressive,
    Lawful,
}

/// Immutable spawn-time stats for one kind.
#[derive(Debug, Clone, Copy)]
pub struct NpcTemplate {
    pub kind: NpcKind,
    pub behavior: Behavior,
    pub max_speed: f32,
    pub thrust: f32,
    pub turn_speed: f32,
    pub size: f32,
    pub credits: u32,
    pub health: f32,
    pub weapon: Option<WeaponProfile>,
}

const FREIGHTER: NpcTemplate = NpcTemplate {
    kind: NpcKind::Freighter,
    behavior: Behavior::Passive,
    max_speed: 0.25,
    thrust: 0.002,
    turn_speed: 0.006,
    size: 22.0,
    credits: 800,
    health: 150.0,
    weapon: Some(WeaponProfile {
        kind: WeaponKind::Laser,
        damage: 3.0,
        cooldown: 40,
    }),
};

const TRADER: NpcTemplate = NpcTemplate {
    kind: NpcKind::Trader,
    behavior: Behavior::Passive,
    max_speed: 0.45,
    thrust: 0.004,
    turn_speed: 0.012,
    size: 12.0,
    credits: 200,
    health: 50.0,
    weapon: None,
};

const PIRATE: NpcTemplate = NpcTemplate {
    kind: NpcKind::Pirate,
    behavior: Behavior::Aggressive,
    max_speed: 0.7,
    thrust: 0.007,
    turn_speed: 0.02,
    size: 11.0,
    credits: 150,
    health: 80.0,
    weapon: Some(WeaponProfile {
        kind: WeaponKind::Laser,
        damage: 10.0,
        cooldown: 18,
    }),
};

const PATROL: NpcTemplate = NpcTemplate {
    kind: NpcKind::Patrol,
    behavior: Behavior::Lawful,
    max_speed: 1.2,
    thrust: 0.015,
    turn_speed: 0.08,
    size: 16.0,
    credits: 100,
    health: 150.0,
    weapon: Some(WeaponProfile {
        kind: WeaponKind::Rapid,
        damage: 6.0,
        cooldown: 20,
    }),
};

impl NpcKind {
    pub fn template(self) -> &'static NpcTemplate {
        match self {
            NpcKind::Freighter => &FREIGHTER,
            NpcKind::Trader => &TRADER,
            NpcKind::Pirate => &PIRATE,
            NpcKind::Patrol => &PATROL,
        }
    }

    pub fn behavior(self) -> Behavior {
        self.template().behavior
    }

    pub fn label(self) -> &'static str {
        match self {
            NpcKind::Freighter => "freighter",
            NpcKind::Trader => "trader",
            NpcKind::Pirate => "pirate",
            NpcKind::Patrol => "patrol",
        }
    }
}

// ── Components ────────────────────────────────────────────────────────────────

/// Marker + kind tag present on every NPC ship.
#[derive(Component, Debug, Clone, Copy)]
pub struct Npc {
    pub kind: NpcKind,
}

/// Per-ship copy of the template's movement stats.
#[derive(Component, Debug, Clone, Copy)]
pub struct NpcStats {
    pub max_speed: f32,
    pub thrust: f32,
    pub turn_speed: f32,
    pub size: f32,
    pub credits: u32,
}

impl From<&NpcTemplate> for NpcStats {
    fn from(t: &NpcTemplate) -> Self {
        Self {
            max_speed: t.max_speed,
            thrust: t.thrust,
            turn_speed: t.turn_speed,
            size: t.size,
            credits: t.credits,
        }
    }
}

/// Who landed the killing blow.  Determines bounty payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Killer {
    Player,
    Npc,
}

/// Hit points plus the kill attribution latch.
///
/// `hp` is allowed to go negative; display code clamps via [`Self::ratio`].
/// `killed_by` is written exactly once, on the tick hp crosses ≤ 0.
#[derive(Component, Debug, Clone, Copy)]
pub struct NpcHealth {
    pub hp: f32,
    pub max_hp: f32,
    pub killed_by: Option<Killer>,
}

impl NpcHealth {
    pub fn full(max_hp: f32) -> Self {
        Self {
            hp: max_hp,
            max_hp,
            killed_by: None,
        }
    }

    /// Apply damage, latching `killed_by` only on the lethal hit.
    pub fn apply_damage(&mut self, damage: f32, source: Killer) {
        let was_alive = self.hp > 0.0;
        self.hp -= damage;
        if was_alive && self.hp <= 0.0 && self.killed_by.is_none() {
            self.killed_by = Some(source);
        }
    }

    /// Health fraction clamped into [0, 1] for display.
    pub fn ratio(&self) -> f32 {
        (self.hp / self.max_hp.max(1.0)).clamp(0.0, 1.0)
    }
}

/// Fitted weapon and its cooldown counter (ticks; 0 = ready).
#[derive(Component, Debug, Clone, Copy)]
pub struct WeaponState {
    pub weapon: Option<WeaponProfile>,
    pub cooldown: u32,
}

impl WeaponState {
    pub fn from_template(t: &NpcTemplate) -> Self {
        Self {
            weapon: t.weapon,
            cooldown: 0,
        }
    }

    /// A cooldown above zero means the weapon discharged recently — patrols
    /// use this as their "firing right now" signal.
    pub fn recently_fired(&self) -> bool {
        self.cooldown > 0
    }
}

/// One tick's steering decision, written by the AI systems and consumed by
/// the shared motion system.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Steering {
    pub desired_angle: f32,
    pub thrust: bool,
    pub thrust_power: f32,
    pub brake: bool,
    /// Fleeing ships turn 2.5× faster.
    pub flee_turn: bool,
}

/// Pirate scratch state.
#[derive(Component, Debug, Clone, Copy)]
pub struct AggressiveState {
    pub wander_angle: f32,
    pub fleeing: bool,
}

/// Patrol scratch state.
#[derive(Component, Debug, Clone, Copy)]
pub struct LawfulState {
    /// True while locked onto a pirate this tick; pirates read it to decide
    /// whether a nearby patrol is actually a threat.
    pub pursuing: bool,
    pub pursuit_timer: u32,
    pub patrol_angle: f32,
    pub patrol_rate: f32,
    /// +1.0 or −1.0.
    pub patrol_direction: f32,
}

/// Merchant scratch state.
#[derive(Component, Debug, Clone, Copy)]
pub struct PassiveState {
    pub fleeing: bool,
    pub target_planet: PlanetId,
}
