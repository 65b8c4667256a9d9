//! Palisade rules engine library.
//!
//! Exposes the board representation, the overlay-based rules layer,
//! turn notation and composition, and the committed game for use by
//! integration tests and harnesses.

use serde::{Deserialize, Serialize};

pub mod board;
pub mod game;
pub mod rules;
pub mod turn;

pub use board::{BoardState, Cell, Dir, Edge, GridTopology, Orientation, Player, Snapshot};
pub use game::{Game, MoveError, PlyRecord, Ruleset, TurnOutcome};
pub use turn::{Pending, RuleViolation, TurnPhase, Validation, ValidationMode};

/// Board and piece-count parameters fixed at game start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub width: u8,
    pub height: u8,
    /// Roamers each player places during setup.
    pub roamers_per_player: u8,
    /// Barriers each player starts with in their stash.
    pub barriers_per_player: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig { width: 10, height: 10, roamers_per_player: 3, barriers_per_player: 6 }
    }
}
