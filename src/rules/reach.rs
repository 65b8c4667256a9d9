//! Roamer reachability.
//!
//! A roamer slides any distance in the four axis directions. Per
//! direction it may pass over at most one obstacle: either one friendly
//! roamer or one friendly unjumped barrier (the leap marks the barrier
//! jumped), never both. Enemy roamers, foreign barriers, and barriers
//! already jumped this turn block outright.

use crate::board::{BoardState, Cell, Edge, GridTopology, Player, ALL_DIRS};

use super::overlay::Overlay;

/// How the friendly pass-through allowance is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReachMode {
    /// Normal movement: one friendly roamer or one friendly unjumped
    /// barrier may be passed per direction.
    Normal,
    /// No friendly pass-through at all. A piece with no destinations even
    /// under this rule is trapped by its own side, which is the
    /// definition of forced. A fresh overlay wall stays jumpable by the
    /// player whose action put it there even here (the wall-capture
    /// escape rule).
    Strict,
}

/// One reachable destination, with the barrier the slide leaps, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reach {
    pub dest: Cell,
    pub jumped_wall: Option<Edge>,
}

/// All destinations for a `player` roamer standing at `from`, read
/// through `overlay`.
pub fn destinations_for(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
    from: Cell,
    mode: ReachMode,
) -> Vec<Reach> {
    let mut out = Vec::new();
    for dir in ALL_DIRS {
        let mut current = from;
        let mut pass_used = false;
        let mut jumped_wall = None;

        while let Some(next) = topo.neighbor(current, dir) {
            let edge = topo
                .edge_between(current, dir)
                .expect("on-board step always crosses an edge slot");

            if let Some(wall) = overlay.wall_at(topo, state, edge) {
                // The fresh allowance follows the acting player, not the
                // barrier's owner; they part ways on a cross-ownership
                // relocation.
                let fresh_leap = wall.fresh_by == Some(player);
                let jumpable = !pass_used
                    && !wall.jumped
                    && (fresh_leap || (wall.owner == player && mode == ReachMode::Normal));
                if !jumpable {
                    break;
                }
                pass_used = true;
                jumped_wall = Some(edge);
            }

            match overlay.roamer_owner_at(topo, state, next) {
                None => {
                    out.push(Reach { dest: next, jumped_wall });
                    current = next;
                }
                Some(p) if p == player && mode == ReachMode::Normal && !pass_used => {
                    pass_used = true;
                    current = next;
                }
                Some(_) => break,
            }
        }
    }
    out
}

/// True if `player`'s roamer at `from` can reach `to`; returns the leap
/// if so.
pub fn reach_to(
    topo: &GridTopology,
    state: &BoardState,
    overlay: &Overlay,
    player: Player,
    from: Cell,
    to: Cell,
    mode: ReachMode,
) -> Option<Reach> {
    destinations_for(topo, state, overlay, player, from, mode)
        .into_iter()
        .find(|r| r.dest == to)
}
