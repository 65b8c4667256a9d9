//! Speculative board deltas.
//!
//! An `Overlay` describes a hypothetical change against the committed
//! `BoardState`: roamers removed or added, a barrier vacated, placed, or
//! jumped. Every rules query reads through an overlay so that validation
//! and enumeration can evaluate candidate actions without touching the
//! committed position. Overlays are plain values: builder methods return
//! a new overlay and the original stays usable.
//!
//! Query precedence: a removal overrides an addition overrides the
//! committed state. Builder methods keep the removal and addition sets
//! disjoint, so a cell vacated by one action can be re-occupied by a
//! later action of the same turn.

use crate::board::{BoardState, Cell, Edge, GridTopology, Player};

/// A barrier as seen through an overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallView {
    pub owner: Player,
    /// Jumped on the committed board or hypothetically this turn.
    pub jumped: bool,
    /// The player whose action placed or moved the barrier here, when
    /// that action is the one under evaluation. A fresh wall is one-time
    /// jumpable by that player even under the strict reach rule. For a
    /// cross-ownership relocation this is the mover, not the owner.
    pub fresh_by: Option<Player>,
}

/// An ephemeral, discardable delta against the committed state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    removed_cells: Vec<Cell>,
    removed_edges: Vec<Edge>,
    added_roamers: Vec<(Cell, Player)>,
    /// (slot, barrier owner, acting player who put it there).
    added_walls: Vec<(Edge, Player, Player)>,
    jumped: Vec<Edge>,
}

impl Overlay {
    pub fn new() -> Self {
        Overlay::default()
    }

    /// Hypothetically removes the roamer at `cell`.
    pub fn with_roamer_removed(&self, cell: Cell) -> Self {
        let mut next = self.clone();
        if let Some(i) = next.added_roamers.iter().position(|(c, _)| *c == cell) {
            next.added_roamers.swap_remove(i);
        } else if !next.removed_cells.contains(&cell) {
            next.removed_cells.push(cell);
        }
        next
    }

    /// Hypothetically places a roamer of `owner` at `cell`.
    pub fn with_roamer_added(&self, cell: Cell, owner: Player) -> Self {
        let mut next = self.clone();
        next.removed_cells.retain(|c| *c != cell);
        debug_assert!(!next.added_roamers.iter().any(|(c, _)| *c == cell));
        next.added_roamers.push((cell, owner));
        next
    }

    /// Hypothetically moves `owner`'s roamer from `from` to `to`.
    pub fn with_roamer_moved(&self, from: Cell, to: Cell, owner: Player) -> Self {
        self.with_roamer_removed(from).with_roamer_added(to, owner)
    }

    /// Hypothetically vacates the barrier slot at `edge`.
    pub fn with_wall_removed(&self, edge: Edge) -> Self {
        let mut next = self.clone();
        if let Some(i) = next.added_walls.iter().position(|(e, _, _)| *e == edge) {
            next.added_walls.swap_remove(i);
        } else if !next.removed_edges.contains(&edge) {
            next.removed_edges.push(edge);
        }
        next
    }

    /// Hypothetically places `owner`'s barrier at `edge`, fresh from an
    /// action of `by`. The two differ only for a cross-ownership
    /// relocation.
    pub fn with_wall_added(&self, edge: Edge, owner: Player, by: Player) -> Self {
        let mut next = self.clone();
        next.removed_edges.retain(|e| *e != edge);
        debug_assert!(!next.added_walls.iter().any(|(e, _, _)| *e == edge));
        next.added_walls.push((edge, owner, by));
        next
    }

    /// Hypothetically marks the barrier at `edge` as jumped.
    pub fn with_jumped(&self, edge: Edge) -> Self {
        let mut next = self.clone();
        if !next.jumped.contains(&edge) {
            next.jumped.push(edge);
        }
        next
    }

    /// Owner of the roamer at `cell`, reading through the overlay.
    pub fn roamer_owner_at(
        &self,
        topo: &GridTopology,
        state: &BoardState,
        cell: Cell,
    ) -> Option<Player> {
        if self.removed_cells.contains(&cell) {
            return None;
        }
        if let Some((_, owner)) = self.added_roamers.iter().find(|(c, _)| *c == cell) {
            return Some(*owner);
        }
        state.roamer_at(topo, cell).map(|(_, owner)| owner)
    }

    /// The barrier at `edge`, reading through the overlay.
    pub fn wall_at(&self, topo: &GridTopology, state: &BoardState, edge: Edge) -> Option<WallView> {
        if self.removed_edges.contains(&edge) {
            return None;
        }
        if let Some((_, owner, by)) = self.added_walls.iter().find(|(e, _, _)| *e == edge) {
            return Some(WallView {
                owner: *owner,
                jumped: self.jumped.contains(&edge),
                fresh_by: Some(*by),
            });
        }
        let (_, slot) = state.barrier_at(topo, edge)?;
        Some(WallView {
            owner: slot.owner,
            jumped: slot.jumped || self.jumped.contains(&edge),
            fresh_by: None,
        })
    }

    /// Cells holding `player`'s roamers, reading through the overlay.
    /// Sorted for deterministic enumeration.
    pub fn roamer_cells(&self, state: &BoardState, player: Player) -> Vec<Cell> {
        let mut cells: Vec<Cell> = state
            .roamer_cells(player)
            .filter(|c| !self.removed_cells.contains(c))
            .chain(
                self.added_roamers
                    .iter()
                    .filter(|(_, p)| *p == player)
                    .map(|(c, _)| *c),
            )
            .collect();
        cells.sort();
        cells
    }

    /// Number of `player`'s roamers still standing under the overlay.
    pub fn roamer_count(&self, state: &BoardState, player: Player) -> usize {
        self.roamer_cells(state, player).len()
    }
}
