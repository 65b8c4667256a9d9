//! Capture resolution.
//!
//! After a roamer lands, the landing cell and its four neighbors are
//! capture candidates; after a barrier action, the cells adjacent to the
//! affected edge slots are. A candidate falls iff it has no escape:
//! judged under the strict reach rule when its entrapment is fresh, and
//! under the relaxed rule when the piece was already forced before the
//! action began. The relaxed re-check for previously-forced pieces runs
//! last, against the overlay with the other captures already removed.
//!
//! Suicide priority: a mover that traps itself captures only itself and
//! suppresses every other capture of that action.

use crate::board::{BoardState, Cell, Edge, GridTopology, Player};

use super::forced::is_forced;
use super::overlay::Overlay;
use super::reach::{destinations_for, ReachMode};

fn trapped(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    owner: Player,
    cell: Cell,
    mode: ReachMode,
) -> bool {
    destinations_for(topo, state, overlay, owner, cell, mode).is_empty()
}

/// Resolves a candidate list against the strict/relaxed asymmetry.
///
/// `forced_before` holds every cell (either player's) that was already
/// forced when the turn began.
fn resolve_candidates(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    candidates: &[Cell],
    forced_before: &[Cell],
) -> Vec<Cell> {
    let mut captures = Vec::new();
    let mut deferred = Vec::new();

    for &cell in candidates {
        let Some(owner) = overlay.roamer_owner_at(topo, state, cell) else {
            continue;
        };
        if forced_before.contains(&cell) {
            deferred.push((cell, owner));
        } else if trapped(topo, state, overlay, owner, cell, ReachMode::Strict) {
            captures.push(cell);
        }
    }

    if !deferred.is_empty() {
        let mut after = overlay.clone();
        for &c in &captures {
            after = after.with_roamer_removed(c);
        }
        for (cell, owner) in deferred {
            if after.roamer_owner_at(topo, state, cell) == Some(owner)
                && trapped(topo, state, &after, owner, cell, ReachMode::Normal)
            {
                captures.push(cell);
            }
        }
    }

    captures.sort();
    captures.dedup();
    captures
}

/// Captures caused by `player`'s roamer arriving at `landing`.
///
/// `overlay` must already contain the move itself (source vacated,
/// landing occupied, leapt barrier marked jumped).
pub fn captures_after_move(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
    landing: Cell,
    forced_before: &[Cell],
) -> Vec<Cell> {
    debug_assert_eq!(overlay.roamer_owner_at(topo, state, landing), Some(player));

    // Suicide priority: decided before any neighbor is examined.
    if trapped(topo, state, overlay, player, landing, ReachMode::Strict) {
        return vec![landing];
    }

    let neighbors: Vec<Cell> = topo.neighbors(landing).collect();
    resolve_candidates(topo, state, overlay, &neighbors, forced_before)
}

/// Captures caused by placing or relocating a barrier.
///
/// `overlay` must already contain the barrier change (`from` vacated for
/// a relocation, `to` added fresh from the acting player's action).
/// Candidates are the cells adjacent to each affected edge: two for a
/// placement, up to four for a relocation. Escape checks see the fresh
/// wall as one-time jumpable by the acting player only, via the
/// overlay's freshness marker.
pub fn captures_after_wall(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    from: Option<Edge>,
    to: Edge,
    forced_before: &[Cell],
) -> Vec<Cell> {
    let mut candidates = Vec::with_capacity(4);
    let (a, b) = topo.edge_cells(to);
    candidates.push(a);
    candidates.push(b);
    if let Some(from) = from {
        let (c, d) = topo.edge_cells(from);
        for cell in [c, d] {
            if !candidates.contains(&cell) {
                candidates.push(cell);
            }
        }
    }

    resolve_candidates(topo, state, overlay, &candidates, forced_before)
}

/// Collects the start-of-turn forced cells of both players, the list the
/// capture resolver and the second action of a turn both evaluate
/// against.
pub fn forced_at_turn_start(
    topo: &GridTopology,
    state: &BoardState,
    players: [Player; 2],
) -> Vec<Cell> {
    let overlay = Overlay::new();
    let mut cells = Vec::new();
    for player in players {
        for cell in overlay.roamer_cells(state, player) {
            if is_forced(topo, state, &overlay, player, cell) {
                cells.push(cell);
            }
        }
    }
    cells
}
