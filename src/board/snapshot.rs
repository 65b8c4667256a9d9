//! Per-ply position snapshots.
//!
//! A snapshot captures everything the history convention requires for one
//! ply: the player to act, full roamer and barrier occupancy (jump flags
//! included), both stash counts, and the move string that produced the
//! position. The JSON shape is the crate's persistence surface; framing
//! beyond that is the caller's concern.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::Player;
use super::state::{BarrierSlot, BoardState, RoamerSlot};
use super::topology::GridTopology;

/// Errors produced while decoding a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot does not fit the board: conflicting or off-board occupancy")]
    Inconsistent,
}

/// Serializable state of one ply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The player whose turn it is in this position.
    pub to_act: Player,
    pub roamers: Vec<RoamerSlot>,
    pub barriers: Vec<BarrierSlot>,
    /// White stash, then black stash.
    pub stash: [u8; 2],
    /// The turn string that produced this position; `None` at game start.
    pub produced_by: Option<String>,
}

impl Snapshot {
    /// Captures the committed state.
    pub fn capture(state: &BoardState, to_act: Player, produced_by: Option<String>) -> Self {
        Snapshot {
            to_act,
            roamers: state.roamer_slots().map(|(_, r)| r).collect(),
            barriers: state.barrier_slots().map(|(_, b)| b).collect(),
            stash: [state.stash(Player::White), state.stash(Player::Black)],
            produced_by,
        }
    }

    /// Rebuilds a `BoardState` from this snapshot.
    pub fn restore(&self, topo: &GridTopology) -> Result<BoardState, SnapshotError> {
        BoardState::from_slots(topo, self.roamers.clone(), self.barriers.clone(), self.stash)
            .ok_or(SnapshotError::Inconsistent)
    }

    /// Encodes the snapshot as a single JSON line.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("snapshot serialization is infallible")
    }

    /// Decodes a snapshot from JSON.
    pub fn from_json(s: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(s)?)
    }
}
