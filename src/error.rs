//! Game-specific error types.
//!
//! Trading, shop, and persistence operations propagate errors through these
//! types rather than panicking, enabling graceful degradation instead of hard
//! crashes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use crate::error::{GameError, GameResult};
//!
//! fn buy(wallet: &mut u32, cost: u32) -> GameResult<()> {
//!     if *wallet < cost {
//!         return Err(GameError::InsufficientCredits { need: cost, have: *wallet });
//!     }
//!     *wallet -= cost;
//!     Ok(())
//! }
//! ```

use std::fmt;

/// Top-level error enum for the simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum GameError {
    /// A purchase cost more than the player's wallet holds.
    InsufficientCredits {
        /// Credits required by the transaction.
        need: u32,
        /// Credits actually available.
        have: u32,
    },

    /// The cargo hold has no room for the requested quantity.
    CargoFull {
        /// Free capacity at the time of the request.
        free: u32,
        /// Quantity that was requested.
        requested: u32,
    },

    /// A sale referenced more units of a commodity than are carried.
    InsufficientCargo {
        /// Units actually carried.
        have: u32,
        /// Units requested for sale.
        requested: u32,
    },

    /// A docked-only operation was attempted in open space.
    NotDocked,

    /// A shop item id was requested that the current planet does not stock.
    ItemNotStocked {
        /// The offending item id.
        item: &'static str,
    },

    /// An upgrade was purchased twice.
    AlreadyOwned {
        /// The duplicated item id.
        item: &'static str,
    },

    /// Save slot number outside the valid range.
    InvalidSlot {
        /// The rejected slot number.
        slot: u8,
    },

    /// Save file I/O failed (read, write, or directory creation).
    SaveIo {
        /// Human-readable description of the failing operation.
        context: String,
    },

    /// Save file contents could not be parsed or migrated.
    SaveFormat {
        /// Decoder or migration error text.
        detail: String,
    },

    /// A tunable is outside its safe operating range.
    /// Returned by validation helpers; not triggered at runtime by default.
    UnsafeConstant {
        /// Name of the constant (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the safe range.
        safe_range: &'static str,
    },
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InsufficientCredits { need, have } => {
                write!(f, "not enough credits: need {}, have {}", need, have)
            }
            GameError::CargoFull { free, requested } => {
                write!(f, "cargo hold full: {} free, {} requested", free, requested)
            }
            GameError::InsufficientCargo { have, requested } => write!(
                f,
                "not enough cargo to sell: have {}, requested {}",
                have, requested
            ),
            GameError::NotDocked => write!(f, "must be docked at a planet"),
            GameError::ItemNotStocked { item } => {
                write!(f, "item '{}' is not stocked here", item)
            }
            GameError::AlreadyOwned { item } => {
                write!(f, "item '{}' is already owned", item)
            }
            GameError::InvalidSlot { slot } => write!(f, "invalid save slot {}", slot),
            GameError::SaveIo { context } => write!(f, "save I/O failed: {}", context),
            GameError::SaveFormat { detail } => write!(f, "bad save file: {}", detail),
            GameError::UnsafeConstant {
                name,
                value,
                safe_range,
            } => write!(
                f,
                "constant '{}' = {} is outside safe range {}",
                name, value, safe_range
            ),
        }
    }
}

impl std::error::Error for GameError {}

/// Convenience alias: a `Result` using `GameError` as the error type.
pub type GameResult<T> = Result<T, GameError>;

// ── Validation helpers ────────────────────────────────────────────────────────

/// Returns an error unless the four spawn weights sum to 1.0 (within epsilon).
///
/// A short sum silently starves the last table entries; a long sum skews the
/// draw toward the first.
pub fn validate_spawn_weights(sum: f32) -> GameResult<()> {
    if (sum - 1.0).abs() > 1e-3 {
        Err(GameError::UnsafeConstant {
            name: "SPAWN_WEIGHT_*",
            value: sum,
            safe_range: "sum == 1.0",
        })
    } else {
        Ok(())
    }
}

/// Returns an error if the despawn distance does not clear every spawn ring.
pub fn validate_despawn_distance(value: f32) -> GameResult<()> {
    if value <= crate::constants::SPAWN_PIRATE_RING_MAX {
        Err(GameError::UnsafeConstant {
            name: "NPC_DESPAWN_DISTANCE",
            value,
            safe_range: "(SPAWN_PIRATE_RING_MAX, ∞)",
        })
    } else {
        Ok(())
    }
}
