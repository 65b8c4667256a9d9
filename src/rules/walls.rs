//! Barrier action lifecycle.
//!
//! While a player's stash holds barriers, their only legal barrier action
//! is a placement; once the stash is empty, the only legal barrier action
//! is relocating a placed, unjumped barrier. Relocating the opponent's
//! barrier is allowed in exactly one case: the mover occupies a cell
//! adjacent to the destination slot. Ownership never transfers.

use crate::board::{BoardState, Edge, GridTopology, Player};

use super::overlay::Overlay;

/// Which kind of barrier action the stash currently dictates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallMode {
    Placement,
    Relocation,
}

/// Why a barrier action is not legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallIssue {
    /// Stash non-empty: a relocation was given where a placement is due.
    MustPlace,
    /// Stash empty: a placement was given where a relocation is due.
    MustRelocate,
    /// Destination slot already holds a barrier.
    SlotOccupied(Edge),
    /// Relocation source holds no barrier.
    NoBarrierAt(Edge),
    /// The barrier was jumped this turn and cannot be relocated.
    BarrierJumped(Edge),
    /// Opponent's barrier and the mover does not occupy a cell adjacent
    /// to the destination.
    NotRelocatable(Edge),
    /// Relocation onto the slot it already occupies.
    SameSlot(Edge),
}

/// The barrier action mode `player`'s stash dictates.
pub fn wall_mode(state: &BoardState, player: Player) -> WallMode {
    if state.stash(player) > 0 {
        WallMode::Placement
    } else {
        WallMode::Relocation
    }
}

/// Checks a barrier action (placement when `from` is `None`, relocation
/// otherwise) against the stash mode, slot occupancy, and ownership
/// rules. Reads through `overlay` so an earlier action of the turn is
/// respected.
pub fn validate_wall_action(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
    from: Option<Edge>,
    to: Edge,
) -> Result<(), WallIssue> {
    debug_assert!(topo.valid_edge(to));
    match (wall_mode(state, player), from) {
        (WallMode::Placement, Some(_)) => return Err(WallIssue::MustPlace),
        (WallMode::Relocation, None) => return Err(WallIssue::MustRelocate),
        _ => {}
    }

    if let Some(from) = from {
        if from == to {
            return Err(WallIssue::SameSlot(to));
        }
        let wall = overlay
            .wall_at(topo, state, from)
            .ok_or(WallIssue::NoBarrierAt(from))?;
        if wall.jumped {
            return Err(WallIssue::BarrierJumped(from));
        }
        if wall.owner != player {
            let (a, b) = topo.edge_cells(to);
            let occupies_destination = overlay.roamer_owner_at(topo, state, a) == Some(player)
                || overlay.roamer_owner_at(topo, state, b) == Some(player);
            if !occupies_destination {
                return Err(WallIssue::NotRelocatable(from));
            }
        }
    }

    if overlay.wall_at(topo, state, to).is_some() {
        return Err(WallIssue::SlotOccupied(to));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Cell, DeltaOp, Orientation};
    use crate::GameConfig;

    fn topo() -> GridTopology {
        GridTopology::new(10, 10)
    }

    fn edge(col: u8, row: u8, o: Orientation) -> Edge {
        Edge::new(Cell::new(col, row), o)
    }

    fn place_wall(state: &mut BoardState, t: &GridTopology, owner: Player, e: Edge) {
        let id = state.next_barrier_id();
        state.apply(t, DeltaOp::PlaceBarrier { id, owner, edge: e });
        state.apply(t, DeltaOp::DebitStash { player: owner });
    }

    #[test]
    fn stash_dictates_the_mode() {
        let t = topo();
        let config = GameConfig { barriers_per_player: 1, ..GameConfig::default() };
        let mut state = BoardState::empty(&t, &config);
        assert_eq!(wall_mode(&state, Player::White), WallMode::Placement);

        place_wall(&mut state, &t, Player::White, edge(4, 4, Orientation::Horizontal));
        assert_eq!(wall_mode(&state, Player::White), WallMode::Relocation);
        assert_eq!(wall_mode(&state, Player::Black), WallMode::Placement);
    }

    #[test]
    fn relocation_rejected_while_stash_holds_barriers() {
        let t = topo();
        let mut state = BoardState::empty(&t, &GameConfig::default());
        place_wall(&mut state, &t, Player::White, edge(4, 4, Orientation::Horizontal));
        let o = Overlay::new();
        assert_eq!(
            validate_wall_action(&t, &state, &o, Player::White,
                Some(edge(4, 4, Orientation::Horizontal)), edge(5, 5, Orientation::Vertical)),
            Err(WallIssue::MustPlace)
        );
    }

    #[test]
    fn placement_rejected_once_stash_is_empty() {
        let t = topo();
        let config = GameConfig { barriers_per_player: 1, ..GameConfig::default() };
        let mut state = BoardState::empty(&t, &config);
        place_wall(&mut state, &t, Player::White, edge(4, 4, Orientation::Horizontal));
        let o = Overlay::new();
        assert_eq!(
            validate_wall_action(&t, &state, &o, Player::White, None, edge(5, 5, Orientation::Vertical)),
            Err(WallIssue::MustRelocate)
        );
    }

    #[test]
    fn placement_onto_occupied_slot_rejected() {
        let t = topo();
        let mut state = BoardState::empty(&t, &GameConfig::default());
        let e = edge(4, 4, Orientation::Horizontal);
        place_wall(&mut state, &t, Player::Black, e);
        let o = Overlay::new();
        assert_eq!(
            validate_wall_action(&t, &state, &o, Player::White, None, e),
            Err(WallIssue::SlotOccupied(e))
        );
        assert_eq!(
            validate_wall_action(&t, &state, &o, Player::White, None, edge(4, 4, Orientation::Vertical)),
            Ok(())
        );
    }

    #[test]
    fn jumped_barrier_cannot_be_relocated() {
        let t = topo();
        let config = GameConfig { barriers_per_player: 1, ..GameConfig::default() };
        let mut state = BoardState::empty(&t, &config);
        let e = edge(4, 4, Orientation::Horizontal);
        place_wall(&mut state, &t, Player::White, e);

        // Jumped flag set through the overlay (earlier action this turn).
        let o = Overlay::new().with_jumped(e);
        assert_eq!(
            validate_wall_action(&t, &state, &o, Player::White, Some(e), edge(2, 2, Orientation::Vertical)),
            Err(WallIssue::BarrierJumped(e))
        );
        assert_eq!(
            validate_wall_action(&t, &state, &Overlay::new(), Player::White, Some(e), edge(2, 2, Orientation::Vertical)),
            Ok(())
        );
    }

    #[test]
    fn opponent_barrier_needs_destination_occupancy() {
        let t = topo();
        let config = GameConfig { barriers_per_player: 1, ..GameConfig::default() };
        let mut state = BoardState::empty(&t, &config);
        let theirs = edge(4, 4, Orientation::Horizontal);
        place_wall(&mut state, &t, Player::Black, theirs);
        // Drain white's stash so white is in relocation mode.
        place_wall(&mut state, &t, Player::White, edge(8, 8, Orientation::Horizontal));
        // White's own wall got jumped, leaving only black's to move.
        let own_jumped = Overlay::new().with_jumped(edge(8, 8, Orientation::Horizontal));

        let to = edge(2, 2, Orientation::Horizontal);
        assert_eq!(
            validate_wall_action(&t, &state, &own_jumped, Player::White, Some(theirs), to),
            Err(WallIssue::NotRelocatable(theirs))
        );

        // With a white roamer on a cell adjacent to the destination slot,
        // the cross-ownership exception applies.
        let id = state.next_roamer_id();
        state.apply(&t, DeltaOp::PlaceRoamer { id, owner: Player::White, cell: Cell::new(2, 3) });
        assert_eq!(
            validate_wall_action(&t, &state, &own_jumped, Player::White, Some(theirs), to),
            Ok(())
        );
    }

    #[test]
    fn relocation_to_same_slot_rejected() {
        let t = topo();
        let config = GameConfig { barriers_per_player: 1, ..GameConfig::default() };
        let mut state = BoardState::empty(&t, &config);
        let e = edge(4, 4, Orientation::Horizontal);
        place_wall(&mut state, &t, Player::White, e);
        assert_eq!(
            validate_wall_action(&t, &state, &Overlay::new(), Player::White, Some(e), e),
            Err(WallIssue::SameSlot(e))
        );
    }
}
