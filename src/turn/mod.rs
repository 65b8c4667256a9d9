//! Turn notation, phases, composition, and enumeration.

pub mod compose;
pub mod movegen;
pub mod notation;
pub mod phase;

pub use compose::{
    compose_turn, ActionKind, Composition, Pending, PlannedAction, RuleViolation, TurnPlan,
    Validation, ValidationMode,
};
pub use movegen::{legal_turns, random_turn};
pub use notation::{
    format_turn, parse_turn, ActionToken, NotationError, ParsedAction, ParsedTurn,
};
pub use phase::{phase_for_ply, player_for_ply, TurnPhase};
