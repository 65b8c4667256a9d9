//! Board representation: value types, grid topology, committed state,
//! and per-ply snapshots.

pub mod geometry;
pub mod snapshot;
pub mod state;
pub mod topology;

pub use geometry::{Cell, Dir, Edge, Orientation, Player, ALL_DIRS, ALL_PLAYERS};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::{BarrierId, BarrierSlot, BoardState, DeltaOp, RoamerId, RoamerSlot};
pub use topology::{CoordError, GridTopology};
