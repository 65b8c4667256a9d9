//! Core board value types.
//!
//! Cells, edge slots, orientations, compass directions, and the two
//! players. These are plain `Copy` values; everything stateful lives in
//! `BoardState`.

use serde::{Deserialize, Serialize};

/// One of the two players. White acts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White,
    Black,
}

pub const ALL_PLAYERS: [Player; 2] = [Player::White, Player::Black];

impl Player {
    /// Returns the other player.
    pub const fn opponent(self) -> Player {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    /// Index into per-player arrays such as the barrier stash.
    pub const fn index(self) -> usize {
        match self {
            Player::White => 0,
            Player::Black => 1,
        }
    }

    /// Returns the single-character snapshot abbreviation.
    pub const fn abbr(self) -> char {
        match self {
            Player::White => 'w',
            Player::Black => 'b',
        }
    }

    /// Parses a player from its single-character snapshot abbreviation.
    pub fn from_abbr(c: char) -> Option<Player> {
        match c {
            'w' => Some(Player::White),
            'b' => Some(Player::Black),
            _ => None,
        }
    }
}

/// A board square, addressed by zero-based column and row.
///
/// Notation uses a column letter and a 1-based row number: `(0, 0)` is `a1`.
/// Row numbers grow northward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub col: u8,
    pub row: u8,
}

impl Cell {
    pub const fn new(col: u8, row: u8) -> Self {
        Cell { col, row }
    }
}

/// Orientation of a barrier slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    /// Boundary between a cell and its north neighbor.
    Horizontal,
    /// Boundary between a cell and its east neighbor.
    Vertical,
}

impl Orientation {
    /// Returns the single-character notation marker.
    pub const fn marker(self) -> char {
        match self {
            Orientation::Horizontal => 'h',
            Orientation::Vertical => 'v',
        }
    }

    /// Parses an orientation from its notation marker.
    pub fn from_marker(c: char) -> Option<Orientation> {
        match c {
            'h' => Some(Orientation::Horizontal),
            'v' => Some(Orientation::Vertical),
            _ => None,
        }
    }
}

/// A barrier slot: the boundary anchored at `cell` on the given side.
///
/// A horizontal edge of `c` separates `c` from the cell above it; a
/// vertical edge separates `c` from the cell to its east. Edges anchored
/// on the top row (horizontal) or east column (vertical) do not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub cell: Cell,
    pub orientation: Orientation,
}

impl Edge {
    pub const fn new(cell: Cell, orientation: Orientation) -> Self {
        Edge { cell, orientation }
    }
}

/// The four axis directions a roamer can slide in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dir {
    North,
    South,
    East,
    West,
}

pub const ALL_DIRS: [Dir; 4] = [Dir::North, Dir::South, Dir::East, Dir::West];

impl Dir {
    /// Column/row delta for one step in this direction.
    pub const fn delta(self) -> (i16, i16) {
        match self {
            Dir::North => (0, 1),
            Dir::South => (0, -1),
            Dir::East => (1, 0),
            Dir::West => (-1, 0),
        }
    }
}
