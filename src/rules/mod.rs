//! Rules primitives: speculative overlays, reachability, the forced
//! oracle, capture resolution, and the barrier lifecycle.
//!
//! Everything here is pure with respect to the committed `BoardState`;
//! hypothetical changes travel in an `Overlay`.

pub mod capture;
pub mod forced;
pub mod overlay;
pub mod reach;
pub mod walls;

pub use capture::{captures_after_move, captures_after_wall, forced_at_turn_start};
pub use forced::{all_forced, is_forced, sole_forced};
pub use overlay::{Overlay, WallView};
pub use reach::{destinations_for, reach_to, Reach, ReachMode};
pub use walls::{validate_wall_action, wall_mode, WallIssue, WallMode};
