//! Legal-turn enumeration.
//!
//! Candidate turn strings are generated syntactically, then filtered
//! through the composer, so the enumeration is correct by construction:
//! a string is emitted iff [`compose_turn`] accepts it. When a candidate
//! stalls on an unresolved forced choice, it is branched once per
//! survivor candidate and retried.

use rand::Rng;

use crate::board::{BoardState, Cell, GridTopology, Player};
use crate::rules::wall_mode;
use crate::rules::WallMode;
use crate::turn::compose::{compose_turn, Composition, Pending, ValidationMode};
use crate::turn::notation::{parse_turn, ACTION_DELIMITER, CHOICE_MARKER, MOVE_SEPARATOR};
use crate::turn::phase::{phase_for_ply, player_for_ply, TurnPhase};
use crate::GameConfig;

/// All complete legal turn strings for the 1-based ply `ply`.
pub fn legal_turns(
    topo: &GridTopology,
    state: &BoardState,
    config: &GameConfig,
    ply: u32,
) -> Vec<String> {
    let player = player_for_ply(ply);
    let candidates = match phase_for_ply(ply, config) {
        TurnPhase::Setup => setup_candidates(topo, state),
        TurnPhase::FirstMove => single_action_candidates(topo, state, player),
        TurnPhase::Normal => normal_candidates(topo, state, player),
    };

    let mut out = Vec::new();
    for candidate in candidates {
        expand(topo, state, config, ply, candidate, 0, &mut out);
    }
    out.sort();
    out.dedup();
    out
}

/// A uniformly random legal turn, or `None` in a dead position.
pub fn random_turn<R: Rng>(
    topo: &GridTopology,
    state: &BoardState,
    config: &GameConfig,
    ply: u32,
    rng: &mut R,
) -> Option<String> {
    let mut turns = legal_turns(topo, state, config, ply);
    if turns.is_empty() {
        None
    } else {
        let i = rng.gen_range(0..turns.len());
        Some(turns.swap_remove(i))
    }
}

/// Composes `candidate`; emits it if complete, branches it per forced
/// survivor if a choice is missing, drops it otherwise. A turn needs at
/// most one choice per action.
fn expand(
    topo: &GridTopology,
    state: &BoardState,
    config: &GameConfig,
    ply: u32,
    candidate: String,
    depth: u8,
    out: &mut Vec<String>,
) {
    let parsed = match parse_turn(topo, &candidate) {
        Ok(parsed) => parsed,
        Err(_) => return,
    };
    match compose_turn(topo, state, config, ply, &parsed, ValidationMode::Strict) {
        Composition::Complete(_) => out.push(candidate),
        Composition::Incomplete(Pending::ChoiceNeeded { candidates }) if depth < 2 => {
            let actions: Vec<&str> = candidate.split(ACTION_DELIMITER).collect();
            for survivor in candidates {
                let suffix = format!("{}{}", CHOICE_MARKER, topo.format_cell(survivor));
                // The pending action is not identified, so try the
                // suffix on every action that lacks one.
                for i in 0..actions.len() {
                    if actions[i].contains(CHOICE_MARKER) {
                        continue;
                    }
                    let mut branched: Vec<String> =
                        actions.iter().map(|a| a.to_string()).collect();
                    branched[i].push_str(&suffix);
                    expand(
                        topo,
                        state,
                        config,
                        ply,
                        branched.join(&ACTION_DELIMITER.to_string()),
                        depth + 1,
                        out,
                    );
                }
            }
        }
        _ => {}
    }
}

fn setup_candidates(topo: &GridTopology, state: &BoardState) -> Vec<String> {
    topo.cells()
        .filter(|c| state.roamer_at(topo, *c).is_none())
        .map(|c| topo.format_cell(c))
        .collect()
}

fn single_action_candidates(
    topo: &GridTopology,
    state: &BoardState,
    player: Player,
) -> Vec<String> {
    let sources: Vec<Cell> = state.roamer_cells(player).collect();
    let mut out = move_candidates(topo, &sources);
    out.extend(wall_candidates(topo, state, player));
    out
}

fn normal_candidates(topo: &GridTopology, state: &BoardState, player: Player) -> Vec<String> {
    let sources: Vec<Cell> = state.roamer_cells(player).collect();
    let walls = wall_candidates(topo, state, player);

    let mut out = Vec::new();
    for first in move_candidates(topo, &sources) {
        // Valid as a whole turn only when the first action wipes a side
        // out; the composer sorts that out.
        out.push(first.clone());

        // After the first action one source cell has moved.
        let (from, to) = split_move(topo, &first);
        let mut seconds: Vec<Cell> = sources.iter().copied().filter(|c| *c != from).collect();
        seconds.push(to);
        for second in move_candidates(topo, &seconds).into_iter().chain(walls.iter().cloned()) {
            out.push(format!("{}{}{}", first, ACTION_DELIMITER, second));
        }
    }
    out
}

/// Every axis-aligned `from-to` string for the given sources. Reach is
/// not checked here.
fn move_candidates(topo: &GridTopology, sources: &[Cell]) -> Vec<String> {
    let mut out = Vec::new();
    for &from in sources {
        for to in topo.cells() {
            if to != from && (to.col == from.col || to.row == from.row) {
                out.push(format!(
                    "{}{}{}",
                    topo.format_cell(from),
                    MOVE_SEPARATOR,
                    topo.format_cell(to)
                ));
            }
        }
    }
    out
}

/// Barrier-action candidates in the stash mode the player is in.
/// Occupancy and relocatability are left to the composer.
fn wall_candidates(topo: &GridTopology, state: &BoardState, player: Player) -> Vec<String> {
    let empty: Vec<String> = topo
        .edges()
        .filter(|e| state.barrier_at(topo, *e).is_none())
        .map(|e| topo.format_edge(e))
        .collect();
    match wall_mode(state, player) {
        WallMode::Placement => empty,
        WallMode::Relocation => {
            let placed: Vec<String> = topo
                .edges()
                .filter(|e| state.barrier_at(topo, *e).is_some())
                .map(|e| topo.format_edge(e))
                .collect();
            let mut out = Vec::with_capacity(placed.len() * empty.len());
            for from in &placed {
                for to in &empty {
                    out.push(format!("{}{}{}", from, MOVE_SEPARATOR, to));
                }
            }
            out
        }
    }
}

/// Splits a known-well-formed `from-to` move candidate back into cells.
fn split_move(topo: &GridTopology, s: &str) -> (Cell, Cell) {
    let mut parts = s.split(MOVE_SEPARATOR);
    let from = parts.next().and_then(|c| topo.parse_cell(c).ok());
    let to = parts.next().and_then(|c| topo.parse_cell(c).ok());
    match (from, to) {
        (Some(from), Some(to)) => (from, to),
        _ => unreachable!("move candidates are generated well-formed"),
    }
}
