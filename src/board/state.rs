//! Committed game position.
//!
//! Roamers and barriers live in arenas indexed by small integer ids, with
//! dense per-cell and per-edge occupancy indexes for O(1) lookup. The state
//! is mutated only through `DeltaOp`s; a ply's ops are recorded in history
//! and reverted in reverse order for undo. Speculative evaluation never
//! touches this type directly — it goes through `rules::Overlay` instead.

use serde::{Deserialize, Serialize};

use super::geometry::{Cell, Edge, Player};
use super::topology::GridTopology;
use crate::GameConfig;

/// Arena id of a roamer. Stable for the life of the game; a captured
/// roamer keeps its id but has no position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoamerId(pub u16);

/// Arena id of a barrier. Barriers never leave the board once placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BarrierId(pub u16);

/// Arena slot for a roamer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoamerSlot {
    pub owner: Player,
    /// `None` once captured. Roamers are never recreated.
    pub pos: Option<Cell>,
}

/// Arena slot for a placed barrier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarrierSlot {
    pub owner: Player,
    pub edge: Edge,
    /// Set when a roamer leaps this barrier; cleared for every barrier at
    /// the end of the full turn, not per action.
    pub jumped: bool,
}

/// A single reversible mutation of the committed state.
///
/// A ply commits as an ordered list of these; undo applies the inverse of
/// each op in reverse order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaOp {
    /// Setup-phase placement; allocates the next roamer arena slot.
    PlaceRoamer { id: RoamerId, owner: Player, cell: Cell },
    MoveRoamer { id: RoamerId, from: Cell, to: Cell },
    CaptureRoamer { id: RoamerId, from: Cell },
    /// Allocates the next barrier arena slot.
    PlaceBarrier { id: BarrierId, owner: Player, edge: Edge },
    MoveBarrier { id: BarrierId, from: Edge, to: Edge },
    SetJumped { id: BarrierId },
    ClearJumped { id: BarrierId },
    DebitStash { player: Player },
}

/// Complete committed board state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardState {
    roamers: Vec<RoamerSlot>,
    barriers: Vec<BarrierSlot>,
    /// Per-cell roamer occupancy, indexed by `GridTopology::cell_index`.
    roamer_at: Vec<Option<RoamerId>>,
    /// Per-edge barrier occupancy, indexed by `GridTopology::edge_index`.
    barrier_at: Vec<Option<BarrierId>>,
    stash: [u8; 2],
}

impl BoardState {
    /// Creates an empty position with full stashes.
    pub fn empty(topo: &GridTopology, config: &GameConfig) -> Self {
        BoardState {
            roamers: Vec::with_capacity(config.roamers_per_player as usize * 2),
            barriers: Vec::with_capacity(config.barriers_per_player as usize * 2),
            roamer_at: vec![None; topo.cell_count()],
            barrier_at: vec![None; topo.edge_count()],
            stash: [config.barriers_per_player, config.barriers_per_player],
        }
    }

    /// Rebuilds a state from raw arena slots, re-deriving the occupancy
    /// indexes. Returns `None` if a slot is off the board or two slots
    /// claim the same cell or edge.
    pub(crate) fn from_slots(
        topo: &GridTopology,
        roamers: Vec<RoamerSlot>,
        barriers: Vec<BarrierSlot>,
        stash: [u8; 2],
    ) -> Option<Self> {
        let mut roamer_at = vec![None; topo.cell_count()];
        for (i, r) in roamers.iter().enumerate() {
            if let Some(cell) = r.pos {
                if !topo.contains(cell) {
                    return None;
                }
                let slot = &mut roamer_at[topo.cell_index(cell)];
                if slot.is_some() {
                    return None;
                }
                *slot = Some(RoamerId(i as u16));
            }
        }
        let mut barrier_at = vec![None; topo.edge_count()];
        for (i, b) in barriers.iter().enumerate() {
            if !topo.valid_edge(b.edge) {
                return None;
            }
            let slot = &mut barrier_at[topo.edge_index(b.edge)];
            if slot.is_some() {
                return None;
            }
            *slot = Some(BarrierId(i as u16));
        }
        Some(BoardState { roamers, barriers, roamer_at, barrier_at, stash })
    }

    /// The roamer occupying `cell`, if any.
    pub fn roamer_at(&self, topo: &GridTopology, cell: Cell) -> Option<(RoamerId, Player)> {
        let id = self.roamer_at[topo.cell_index(cell)]?;
        Some((id, self.roamers[id.0 as usize].owner))
    }

    /// The barrier occupying `edge`, if any.
    pub fn barrier_at(&self, topo: &GridTopology, edge: Edge) -> Option<(BarrierId, BarrierSlot)> {
        let id = self.barrier_at[topo.edge_index(edge)]?;
        Some((id, self.barriers[id.0 as usize]))
    }

    pub fn roamer(&self, id: RoamerId) -> RoamerSlot {
        self.roamers[id.0 as usize]
    }

    pub fn barrier(&self, id: BarrierId) -> BarrierSlot {
        self.barriers[id.0 as usize]
    }

    /// Remaining barriers in `player`'s stash.
    pub fn stash(&self, player: Player) -> u8 {
        self.stash[player.index()]
    }

    /// Id the next placed roamer will receive.
    pub fn next_roamer_id(&self) -> RoamerId {
        RoamerId(self.roamers.len() as u16)
    }

    /// Id the next placed barrier will receive.
    pub fn next_barrier_id(&self) -> BarrierId {
        BarrierId(self.barriers.len() as u16)
    }

    /// Number of `player`'s roamers still on the board.
    pub fn roamer_count(&self, player: Player) -> usize {
        self.roamers
            .iter()
            .filter(|r| r.owner == player && r.pos.is_some())
            .count()
    }

    /// Cells occupied by `player`'s roamers.
    pub fn roamer_cells(&self, player: Player) -> impl Iterator<Item = Cell> + '_ {
        self.roamers
            .iter()
            .filter(move |r| r.owner == player)
            .filter_map(|r| r.pos)
    }

    /// All roamers ever placed, as `(id, slot)` pairs.
    pub fn roamer_slots(&self) -> impl Iterator<Item = (RoamerId, RoamerSlot)> + '_ {
        self.roamers
            .iter()
            .enumerate()
            .map(|(i, r)| (RoamerId(i as u16), *r))
    }

    /// All placed barriers as `(id, slot)` pairs.
    pub fn barrier_slots(&self) -> impl Iterator<Item = (BarrierId, BarrierSlot)> + '_ {
        self.barriers
            .iter()
            .enumerate()
            .map(|(i, b)| (BarrierId(i as u16), *b))
    }

    /// Ids of barriers currently carrying the jumped flag.
    pub fn jumped_barriers(&self) -> Vec<BarrierId> {
        self.barrier_slots()
            .filter(|(_, b)| b.jumped)
            .map(|(id, _)| id)
            .collect()
    }

    /// Applies one op. Occupancy invariants are checked by debug asserts;
    /// all legality checking happened during validation.
    pub fn apply(&mut self, topo: &GridTopology, op: DeltaOp) {
        match op {
            DeltaOp::PlaceRoamer { id, owner, cell } => {
                debug_assert_eq!(id, self.next_roamer_id());
                debug_assert!(self.roamer_at[topo.cell_index(cell)].is_none());
                self.roamers.push(RoamerSlot { owner, pos: Some(cell) });
                self.roamer_at[topo.cell_index(cell)] = Some(id);
            }
            DeltaOp::MoveRoamer { id, from, to } => {
                debug_assert_eq!(self.roamer_at[topo.cell_index(from)], Some(id));
                debug_assert!(self.roamer_at[topo.cell_index(to)].is_none());
                self.roamer_at[topo.cell_index(from)] = None;
                self.roamer_at[topo.cell_index(to)] = Some(id);
                self.roamers[id.0 as usize].pos = Some(to);
            }
            DeltaOp::CaptureRoamer { id, from } => {
                debug_assert_eq!(self.roamer_at[topo.cell_index(from)], Some(id));
                self.roamer_at[topo.cell_index(from)] = None;
                self.roamers[id.0 as usize].pos = None;
            }
            DeltaOp::PlaceBarrier { id, owner, edge } => {
                debug_assert_eq!(id, self.next_barrier_id());
                debug_assert!(self.barrier_at[topo.edge_index(edge)].is_none());
                self.barriers.push(BarrierSlot { owner, edge, jumped: false });
                self.barrier_at[topo.edge_index(edge)] = Some(id);
            }
            DeltaOp::MoveBarrier { id, from, to } => {
                debug_assert_eq!(self.barrier_at[topo.edge_index(from)], Some(id));
                debug_assert!(self.barrier_at[topo.edge_index(to)].is_none());
                self.barrier_at[topo.edge_index(from)] = None;
                self.barrier_at[topo.edge_index(to)] = Some(id);
                self.barriers[id.0 as usize].edge = to;
            }
            DeltaOp::SetJumped { id } => {
                debug_assert!(!self.barriers[id.0 as usize].jumped);
                self.barriers[id.0 as usize].jumped = true;
            }
            DeltaOp::ClearJumped { id } => {
                debug_assert!(self.barriers[id.0 as usize].jumped);
                self.barriers[id.0 as usize].jumped = false;
            }
            DeltaOp::DebitStash { player } => {
                debug_assert!(self.stash[player.index()] > 0);
                self.stash[player.index()] -= 1;
            }
        }
    }

    /// Applies the inverse of one op.
    pub fn revert(&mut self, topo: &GridTopology, op: DeltaOp) {
        match op {
            DeltaOp::PlaceRoamer { id, cell, .. } => {
                debug_assert_eq!(RoamerId(self.roamers.len() as u16 - 1), id);
                self.roamer_at[topo.cell_index(cell)] = None;
                self.roamers.pop();
            }
            DeltaOp::MoveRoamer { id, from, to } => {
                self.apply(topo, DeltaOp::MoveRoamer { id, from: to, to: from });
            }
            DeltaOp::CaptureRoamer { id, from } => {
                debug_assert!(self.roamer_at[topo.cell_index(from)].is_none());
                self.roamer_at[topo.cell_index(from)] = Some(id);
                self.roamers[id.0 as usize].pos = Some(from);
            }
            DeltaOp::PlaceBarrier { id, edge, .. } => {
                debug_assert_eq!(BarrierId(self.barriers.len() as u16 - 1), id);
                self.barrier_at[topo.edge_index(edge)] = None;
                self.barriers.pop();
            }
            DeltaOp::MoveBarrier { id, from, to } => {
                self.apply(topo, DeltaOp::MoveBarrier { id, from: to, to: from });
            }
            DeltaOp::SetJumped { id } => self.apply(topo, DeltaOp::ClearJumped { id }),
            DeltaOp::ClearJumped { id } => self.apply(topo, DeltaOp::SetJumped { id }),
            DeltaOp::DebitStash { player } => {
                self.stash[player.index()] += 1;
            }
        }
    }

    /// Applies a full ply delta in order.
    pub fn apply_all(&mut self, topo: &GridTopology, ops: &[DeltaOp]) {
        for &op in ops {
            self.apply(topo, op);
        }
    }

    /// Reverts a full ply delta: inverse ops in reverse order.
    pub fn revert_all(&mut self, topo: &GridTopology, ops: &[DeltaOp]) {
        for &op in ops.iter().rev() {
            self.revert(topo, op);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::geometry::Orientation;

    fn setup() -> (GridTopology, BoardState) {
        let topo = GridTopology::new(10, 10);
        let state = BoardState::empty(&topo, &GameConfig::default());
        (topo, state)
    }

    #[test]
    fn empty_state_has_full_stashes_and_no_pieces() {
        let (topo, state) = setup();
        assert_eq!(state.stash(Player::White), 6);
        assert_eq!(state.stash(Player::Black), 6);
        assert_eq!(state.roamer_count(Player::White), 0);
        assert!(topo.cells().all(|c| state.roamer_at(&topo, c).is_none()));
    }

    #[test]
    fn place_and_move_roamer() {
        let (topo, mut state) = setup();
        let id = state.next_roamer_id();
        state.apply(&topo, DeltaOp::PlaceRoamer { id, owner: Player::White, cell: Cell::new(2, 2) });
        assert_eq!(state.roamer_at(&topo, Cell::new(2, 2)), Some((id, Player::White)));

        state.apply(&topo, DeltaOp::MoveRoamer { id, from: Cell::new(2, 2), to: Cell::new(2, 5) });
        assert_eq!(state.roamer_at(&topo, Cell::new(2, 2)), None);
        assert_eq!(state.roamer_at(&topo, Cell::new(2, 5)), Some((id, Player::White)));
        assert_eq!(state.roamer(id).pos, Some(Cell::new(2, 5)));
    }

    #[test]
    fn capture_keeps_arena_slot() {
        let (topo, mut state) = setup();
        let id = state.next_roamer_id();
        state.apply(&topo, DeltaOp::PlaceRoamer { id, owner: Player::Black, cell: Cell::new(0, 0) });
        state.apply(&topo, DeltaOp::CaptureRoamer { id, from: Cell::new(0, 0) });
        assert_eq!(state.roamer_at(&topo, Cell::new(0, 0)), None);
        assert_eq!(state.roamer(id).pos, None);
        assert_eq!(state.roamer(id).owner, Player::Black);
        assert_eq!(state.roamer_count(Player::Black), 0);
    }

    #[test]
    fn barrier_lifecycle_and_jump_flag() {
        let (topo, mut state) = setup();
        let edge = Edge::new(Cell::new(3, 3), Orientation::Horizontal);
        let id = state.next_barrier_id();
        state.apply(&topo, DeltaOp::PlaceBarrier { id, owner: Player::White, edge });
        state.apply(&topo, DeltaOp::DebitStash { player: Player::White });
        assert_eq!(state.stash(Player::White), 5);
        assert!(!state.barrier(id).jumped);

        state.apply(&topo, DeltaOp::SetJumped { id });
        assert!(state.barrier(id).jumped);
        assert_eq!(state.jumped_barriers(), vec![id]);

        let to = Edge::new(Cell::new(4, 4), Orientation::Vertical);
        state.apply(&topo, DeltaOp::ClearJumped { id });
        state.apply(&topo, DeltaOp::MoveBarrier { id, from: edge, to });
        assert!(state.barrier_at(&topo, edge).is_none());
        assert_eq!(state.barrier_at(&topo, to).map(|(i, _)| i), Some(id));
    }

    #[test]
    fn revert_all_is_exact_inverse() {
        let (topo, mut state) = setup();
        let r = state.next_roamer_id();
        let b = state.next_barrier_id();
        let ops = vec![
            DeltaOp::PlaceRoamer { id: r, owner: Player::White, cell: Cell::new(1, 1) },
            DeltaOp::MoveRoamer { id: r, from: Cell::new(1, 1), to: Cell::new(1, 4) },
            DeltaOp::PlaceBarrier {
                id: b,
                owner: Player::White,
                edge: Edge::new(Cell::new(1, 4), Orientation::Horizontal),
            },
            DeltaOp::DebitStash { player: Player::White },
            DeltaOp::SetJumped { id: b },
            DeltaOp::CaptureRoamer { id: r, from: Cell::new(1, 4) },
        ];
        let before = state.clone();
        state.apply_all(&topo, &ops);
        assert_ne!(before, state);
        state.revert_all(&topo, &ops);
        assert_eq!(before, state);
    }
}
