//! Forced-position oracle.
//!
//! A roamer is forced when it has no destination under the strict reach
//! rule: trapped even by its own side. A forced piece must be moved or
//! relieved by its owner's next turn, and an entrapping action that
//! leaves several pieces of one player simultaneously forced triggers the
//! keep-one disambiguation in the turn composer.

use crate::board::{BoardState, Cell, GridTopology, Player};

use super::overlay::Overlay;
use super::reach::{destinations_for, ReachMode};

/// True if `player` has a roamer at `cell` (under the overlay) with no
/// destination under the strict rule.
pub fn is_forced(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
    cell: Cell,
) -> bool {
    overlay.roamer_owner_at(topo, state, cell) == Some(player)
        && destinations_for(topo, state, overlay, player, cell, ReachMode::Strict).is_empty()
}

/// Every forced cell of `player`, sorted.
pub fn all_forced(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
) -> Vec<Cell> {
    overlay
        .roamer_cells(state, player)
        .into_iter()
        .filter(|&c| {
            destinations_for(topo, state, overlay, player, c, ReachMode::Strict).is_empty()
        })
        .collect()
}

/// The authoritative single forced cell used to gate move legality.
///
/// Any legally reachable committed position has at most one forced cell
/// per player; two or more mid-turn means an unresolved disambiguation,
/// which never survives to a commit.
pub fn sole_forced(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
) -> Option<Cell> {
    let forced = all_forced(topo, state, overlay, player);
    debug_assert!(forced.len() <= 1, "committed position with {} forced cells", forced.len());
    forced.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{DeltaOp, Edge, Orientation};
    use crate::GameConfig;

    fn topo() -> GridTopology {
        GridTopology::new(10, 10)
    }

    fn place(state: &mut BoardState, t: &GridTopology, owner: Player, cell: Cell) {
        let id = state.next_roamer_id();
        state.apply(t, DeltaOp::PlaceRoamer { id, owner, cell });
    }

    fn wall(state: &mut BoardState, t: &GridTopology, owner: Player, edge: Edge) {
        let id = state.next_barrier_id();
        state.apply(t, DeltaOp::PlaceBarrier { id, owner, edge });
    }

    #[test]
    fn open_piece_is_not_forced() {
        let t = topo();
        let mut state = BoardState::empty(&t, &GameConfig::default());
        place(&mut state, &t, Player::White, Cell::new(5, 5));
        assert!(!is_forced(&t, &state, &Overlay::new(), Player::White, Cell::new(5, 5)));
        assert!(all_forced(&t, &state, &Overlay::new(), Player::White).is_empty());
    }

    #[test]
    fn edge_piece_behind_own_wall_is_forced() {
        // Lone roamer on an edge cell: three orthogonal neighbors hold
        // enemies, the fourth sits behind its own unjumped barrier. An
        // enemy-blind check would escape through the barrier; the strict
        // rule may not.
        let t = topo();
        let mut state = BoardState::empty(&t, &GameConfig::default());
        let at = Cell::new(4, 0);
        place(&mut state, &t, Player::White, at);
        place(&mut state, &t, Player::Black, Cell::new(3, 0));
        place(&mut state, &t, Player::Black, Cell::new(5, 0));
        // North neighbor blocked by White's own wall.
        wall(&mut state, &t, Player::White, Edge::new(at, Orientation::Horizontal));

        assert!(is_forced(&t, &state, &Overlay::new(), Player::White, at));
        assert_eq!(all_forced(&t, &state, &Overlay::new(), Player::White), vec![at]);
        assert_eq!(sole_forced(&t, &state, &Overlay::new(), Player::White), Some(at));
        // The relaxed rule would let it leap its own wall.
        assert!(!destinations_for(&t, &state, &Overlay::new(), Player::White, at, ReachMode::Normal)
            .is_empty());
    }

    #[test]
    fn overlay_can_relieve_a_forced_piece() {
        let t = topo();
        let mut state = BoardState::empty(&t, &GameConfig::default());
        let at = Cell::new(0, 0);
        place(&mut state, &t, Player::White, at);
        place(&mut state, &t, Player::Black, Cell::new(1, 0));
        place(&mut state, &t, Player::Black, Cell::new(0, 1));
        assert!(is_forced(&t, &state, &Overlay::new(), Player::White, at));

        // Hypothetically capture the blocker to the east.
        let relieved = Overlay::new().with_roamer_removed(Cell::new(1, 0));
        assert!(!is_forced(&t, &state, &relieved, Player::White, at));
    }

    #[test]
    fn forced_requires_an_actual_roamer() {
        let t = topo();
        let state = BoardState::empty(&t, &GameConfig::default());
        assert!(!is_forced(&t, &state, &Overlay::new(), Player::White, Cell::new(0, 0)));
        // A hypothetical roamer in a corner pocket counts.
        let o = Overlay::new()
            .with_roamer_added(Cell::new(0, 0), Player::White)
            .with_roamer_added(Cell::new(1, 0), Player::Black)
            .with_roamer_added(Cell::new(0, 1), Player::Black);
        assert!(is_forced(&t, &state, &o, Player::White, Cell::new(0, 0)));
    }
}
