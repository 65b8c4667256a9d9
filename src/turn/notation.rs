//! Turn-string notation.
//!
//! A turn is one or two actions joined by `,`. A roamer action is
//! `from-to` (a bare `from` or `from-` is a partial, in-progress
//! selection); a barrier action is a single edge id (placement) or
//! `fromEdge-toEdge` (relocation); a setup action is a bare cell id. Any
//! action may carry a `/cell` suffix naming which of several
//! simultaneously forced pieces survives. Cell ids are a column letter
//! and a 1-based row (`d5`); edge ids append an orientation marker
//! (`d5h`, `a1v`).
//!
//! The parser is purely structural: whether a token kind is legal in the
//! current phase is the composer's business.

use thiserror::Error;

use crate::board::{Cell, CoordError, Edge, GridTopology};

/// The reserved delimiter between the two actions of a turn.
pub const ACTION_DELIMITER: char = ',';
/// The separator between the source and destination of one action.
pub const MOVE_SEPARATOR: char = '-';
/// Introduces a forced-choice suffix.
pub const CHOICE_MARKER: char = '/';

/// Errors produced while parsing a turn string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("empty turn string")]
    Empty,

    #[error("empty action")]
    EmptyAction,

    #[error("a turn has at most 2 actions, got {0}")]
    TooManyActions(usize),

    #[error("action has too many '-' separators: '{0}'")]
    TooManySeparators(String),

    #[error("action mixes a cell and an edge: '{0}'")]
    MixedEndpoints(String),

    #[error("action has more than one choice suffix: '{0}'")]
    DuplicateChoice(String),

    #[error(transparent)]
    Coord(#[from] CoordError),
}

/// One endpoint of an action: a cell or an edge slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Cell(Cell),
    Edge(Edge),
}

/// The structural shape of a single parsed action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionToken {
    /// A bare cell: a setup placement, or a partial roamer selection.
    CellOnly(Cell),
    /// `from-to` or the partial `from-`.
    RoamerMove { from: Cell, to: Option<Cell> },
    /// A bare edge id: a barrier placement.
    WallPlace { at: Edge },
    /// `fromEdge-toEdge`: a barrier relocation.
    WallMove { from: Edge, to: Edge },
}

/// A parsed action with its optional forced-choice suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedAction {
    pub token: ActionToken,
    pub choice: Option<Cell>,
}

/// A structurally parsed turn: one or two actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTurn {
    pub actions: Vec<ParsedAction>,
}

/// True if the token looks like an edge id: a trailing orientation
/// marker preceded by at least a column letter and a row digit.
fn looks_like_edge(s: &str) -> bool {
    s.len() >= 3 && s.ends_with(['h', 'v']) && s[..s.len() - 1].ends_with(|c: char| c.is_ascii_digit())
}

fn parse_endpoint(topo: &GridTopology, s: &str) -> Result<Endpoint, NotationError> {
    if looks_like_edge(s) {
        Ok(Endpoint::Edge(topo.parse_edge(s)?))
    } else {
        Ok(Endpoint::Cell(topo.parse_cell(s)?))
    }
}

fn parse_action(topo: &GridTopology, s: &str) -> Result<ParsedAction, NotationError> {
    if s.is_empty() {
        return Err(NotationError::EmptyAction);
    }

    let mut choice_parts = s.split(CHOICE_MARKER);
    let body = choice_parts.next().expect("split yields at least one part");
    let choice = match choice_parts.next() {
        None => None,
        Some(c) => {
            if choice_parts.next().is_some() {
                return Err(NotationError::DuplicateChoice(s.to_string()));
            }
            Some(topo.parse_cell(c)?)
        }
    };

    let mut parts = body.split(MOVE_SEPARATOR);
    let first = parts.next().expect("split yields at least one part");
    let second = parts.next();
    if parts.next().is_some() {
        return Err(NotationError::TooManySeparators(s.to_string()));
    }

    let token = match (parse_endpoint(topo, first)?, second) {
        (Endpoint::Cell(cell), None) => ActionToken::CellOnly(cell),
        // "d5-": an in-progress selection awaiting its destination.
        (Endpoint::Cell(from), Some("")) => ActionToken::RoamerMove { from, to: None },
        (Endpoint::Edge(at), None) => ActionToken::WallPlace { at },
        (Endpoint::Edge(_), Some("")) => return Err(NotationError::EmptyAction),
        (first, Some(second)) => match (first, parse_endpoint(topo, second)?) {
            (Endpoint::Cell(from), Endpoint::Cell(to)) => {
                ActionToken::RoamerMove { from, to: Some(to) }
            }
            (Endpoint::Edge(from), Endpoint::Edge(to)) => ActionToken::WallMove { from, to },
            _ => return Err(NotationError::MixedEndpoints(s.to_string())),
        },
    };

    Ok(ParsedAction { token, choice })
}

/// Parses a full turn string.
pub fn parse_turn(topo: &GridTopology, s: &str) -> Result<ParsedTurn, NotationError> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(NotationError::Empty);
    }

    let parts: Vec<&str> = trimmed.split(ACTION_DELIMITER).collect();
    if parts.len() > 2 {
        return Err(NotationError::TooManyActions(parts.len()));
    }

    let actions = parts
        .iter()
        .map(|p| parse_action(topo, p.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParsedTurn { actions })
}

/// Formats one action back into notation.
pub fn format_action(topo: &GridTopology, action: &ParsedAction) -> String {
    let mut out = match action.token {
        ActionToken::CellOnly(cell) => topo.format_cell(cell),
        ActionToken::RoamerMove { from, to: None } => {
            format!("{}{}", topo.format_cell(from), MOVE_SEPARATOR)
        }
        ActionToken::RoamerMove { from, to: Some(to) } => {
            format!("{}{}{}", topo.format_cell(from), MOVE_SEPARATOR, topo.format_cell(to))
        }
        ActionToken::WallPlace { at } => topo.format_edge(at),
        ActionToken::WallMove { from, to } => {
            format!("{}{}{}", topo.format_edge(from), MOVE_SEPARATOR, topo.format_edge(to))
        }
    };
    if let Some(choice) = action.choice {
        out.push(CHOICE_MARKER);
        out.push_str(&topo.format_cell(choice));
    }
    out
}

/// Formats a full turn back into notation.
pub fn format_turn(topo: &GridTopology, turn: &ParsedTurn) -> String {
    turn.actions
        .iter()
        .map(|a| format_action(topo, a))
        .collect::<Vec<_>>()
        .join(&ACTION_DELIMITER.to_string())
}
