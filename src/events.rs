//! Boundary messages consumed by the (out-of-scope) renderer and audio layers.
//!
//! The simulation emits these and never reads them back; headless tests read
//! them to assert that combat and lifecycle paths fired.

use crate::projectile::WeaponKind;
use bevy::prelude::*;

/// One-shot audio notifications.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub enum AudioCue {
    /// A weapon discharged (pitch varies by kind).
    WeaponFired(WeaponKind),
    /// Something blew up; `large` selects the heavier sample.
    Explosion { large: bool },
    /// The player's shield absorbed a hit.
    ShieldHit,
    /// A pickup was collected.
    PickupCollected,
    /// The player docked at a planet.
    Docked,
}

/// Visual explosion burst at a world position.
#[derive(Message, Debug, Clone, Copy)]
pub struct ExplosionBurst {
    pub pos: Vec2,
    pub small: bool,
}

/// Registers every boundary message type.
pub struct GameEventsPlugin;

impl Plugin for GameEventsPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<AudioCue>().add_message::<ExplosionBurst>();
    }
}
