//! Grid topology: adjacency, rays, indexing, and coordinate notation.
//!
//! The rules modules never do coordinate arithmetic themselves; every
//! neighbor lookup, ray walk, and cell/edge parse goes through
//! `GridTopology` so the rules stay independent of board dimensions.

use thiserror::Error;

use super::geometry::{Cell, Dir, Edge, Orientation, ALL_DIRS};

/// Errors produced while parsing cell or edge notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordError {
    #[error("empty coordinate")]
    Empty,

    #[error("invalid column letter: '{0}'")]
    InvalidColumn(char),

    #[error("invalid row number: '{0}'")]
    InvalidRow(String),

    #[error("cell '{0}' is off the board")]
    OffBoard(String),

    #[error("invalid orientation marker: '{0}'")]
    InvalidOrientation(char),

    #[error("edge '{0}' is not a valid slot on this board")]
    InvalidEdge(String),
}

/// A rectangular board of `width` x `height` cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTopology {
    width: u8,
    height: u8,
}

impl GridTopology {
    /// Creates a topology. Width is capped at 26 by column-letter notation.
    pub fn new(width: u8, height: u8) -> Self {
        assert!(width >= 2 && width <= 26 && height >= 2, "unsupported board dimensions");
        GridTopology { width, height }
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn height(&self) -> u8 {
        self.height
    }

    /// Number of cells on the board.
    pub fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of edge slots, valid or not: two per cell (`h` and `v`).
    ///
    /// Invalid slots (top-row `h`, east-column `v`) keep the indexing dense;
    /// they are simply never occupied.
    pub fn edge_count(&self) -> usize {
        self.cell_count() * 2
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.col < self.width && cell.row < self.height
    }

    /// Dense index of a cell, row-major.
    pub fn cell_index(&self, cell: Cell) -> usize {
        debug_assert!(self.contains(cell));
        cell.row as usize * self.width as usize + cell.col as usize
    }

    /// Dense index of an edge slot.
    pub fn edge_index(&self, edge: Edge) -> usize {
        let base = self.cell_index(edge.cell) * 2;
        match edge.orientation {
            Orientation::Horizontal => base,
            Orientation::Vertical => base + 1,
        }
    }

    /// The neighbor of `cell` one step in `dir`, if on the board.
    pub fn neighbor(&self, cell: Cell, dir: Dir) -> Option<Cell> {
        let (dc, dr) = dir.delta();
        let col = cell.col as i16 + dc;
        let row = cell.row as i16 + dr;
        if col < 0 || row < 0 || col >= self.width as i16 || row >= self.height as i16 {
            return None;
        }
        Some(Cell::new(col as u8, row as u8))
    }

    /// The on-board orthogonal neighbors of `cell`.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        ALL_DIRS.iter().filter_map(move |&d| self.neighbor(cell, d))
    }

    /// True if both cells the edge separates are on the board.
    pub fn valid_edge(&self, edge: Edge) -> bool {
        if !self.contains(edge.cell) {
            return false;
        }
        let dir = match edge.orientation {
            Orientation::Horizontal => Dir::North,
            Orientation::Vertical => Dir::East,
        };
        self.neighbor(edge.cell, dir).is_some()
    }

    /// The two cells an edge separates: (anchor, far side).
    pub fn edge_cells(&self, edge: Edge) -> (Cell, Cell) {
        debug_assert!(self.valid_edge(edge));
        let dir = match edge.orientation {
            Orientation::Horizontal => Dir::North,
            Orientation::Vertical => Dir::East,
        };
        (edge.cell, self.neighbor(edge.cell, dir).expect("valid edge has a far cell"))
    }

    /// The edge crossed when stepping from `cell` in `dir`, if the step
    /// stays on the board.
    pub fn edge_between(&self, cell: Cell, dir: Dir) -> Option<Edge> {
        let next = self.neighbor(cell, dir)?;
        let edge = match dir {
            Dir::North => Edge::new(cell, Orientation::Horizontal),
            Dir::South => Edge::new(next, Orientation::Horizontal),
            Dir::East => Edge::new(cell, Orientation::Vertical),
            Dir::West => Edge::new(next, Orientation::Vertical),
        };
        Some(edge)
    }

    /// All cells, row-major.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        let (w, h) = (self.width, self.height);
        (0..h).flat_map(move |row| (0..w).map(move |col| Cell::new(col, row)))
    }

    /// All valid edge slots.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.cells().flat_map(move |c| {
            [Orientation::Horizontal, Orientation::Vertical]
                .into_iter()
                .map(move |o| Edge::new(c, o))
                .filter(|e| self.valid_edge(*e))
        })
    }

    /// Parses a cell id like `a1` or `d10`.
    pub fn parse_cell(&self, s: &str) -> Result<Cell, CoordError> {
        let mut chars = s.chars();
        let col_char = chars.next().ok_or(CoordError::Empty)?;
        if !col_char.is_ascii_lowercase() {
            return Err(CoordError::InvalidColumn(col_char));
        }
        let col = col_char as u8 - b'a';
        let row_part = chars.as_str();
        let row: u8 = row_part
            .parse::<u8>()
            .ok()
            .filter(|r| *r >= 1)
            .ok_or_else(|| CoordError::InvalidRow(row_part.to_string()))?;
        let cell = Cell::new(col, row - 1);
        if !self.contains(cell) {
            return Err(CoordError::OffBoard(s.to_string()));
        }
        Ok(cell)
    }

    /// Formats a cell as its notation id.
    pub fn format_cell(&self, cell: Cell) -> String {
        format!("{}{}", (b'a' + cell.col) as char, cell.row + 1)
    }

    /// Parses an edge id like `d5h` or `a1v`.
    pub fn parse_edge(&self, s: &str) -> Result<Edge, CoordError> {
        let marker = s.chars().last().ok_or(CoordError::Empty)?;
        let orientation =
            Orientation::from_marker(marker).ok_or(CoordError::InvalidOrientation(marker))?;
        let cell = self.parse_cell(&s[..s.len() - 1])?;
        let edge = Edge::new(cell, orientation);
        if !self.valid_edge(edge) {
            return Err(CoordError::InvalidEdge(s.to_string()));
        }
        Ok(edge)
    }

    /// Formats an edge as its notation id.
    pub fn format_edge(&self, edge: Edge) -> String {
        format!("{}{}", self.format_cell(edge.cell), edge.orientation.marker())
    }

    /// Walks from `from` in `dir`, yielding each on-board cell in order.
    pub fn ray(&self, from: Cell, dir: Dir) -> impl Iterator<Item = Cell> + '_ {
        let mut current = Some(from);
        std::iter::from_fn(move || {
            let next = self.neighbor(current?, dir)?;
            current = Some(next);
            Some(next)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topo() -> GridTopology {
        GridTopology::new(10, 10)
    }

    #[test]
    fn cell_notation_roundtrip() {
        let t = topo();
        for cell in t.cells() {
            let s = t.format_cell(cell);
            assert_eq!(t.parse_cell(&s), Ok(cell), "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn parse_cell_rejects_garbage() {
        let t = topo();
        assert_eq!(t.parse_cell(""), Err(CoordError::Empty));
        assert!(matches!(t.parse_cell("A1"), Err(CoordError::InvalidColumn('A'))));
        assert!(matches!(t.parse_cell("a0"), Err(CoordError::InvalidRow(_))));
        assert!(matches!(t.parse_cell("a"), Err(CoordError::InvalidRow(_))));
        assert!(matches!(t.parse_cell("a11"), Err(CoordError::OffBoard(_))));
        assert!(matches!(t.parse_cell("k1"), Err(CoordError::OffBoard(_))));
    }

    #[test]
    fn edge_notation_roundtrip() {
        let t = topo();
        for edge in t.edges() {
            let s = t.format_edge(edge);
            assert_eq!(t.parse_edge(&s), Ok(edge), "roundtrip failed for {}", s);
        }
    }

    #[test]
    fn top_row_has_no_horizontal_edges() {
        let t = topo();
        let e = Edge::new(Cell::new(3, 9), Orientation::Horizontal);
        assert!(!t.valid_edge(e));
        assert!(matches!(t.parse_edge("d10h"), Err(CoordError::InvalidEdge(_))));
        // The vertical slot at the same cell exists.
        assert!(t.valid_edge(Edge::new(Cell::new(3, 9), Orientation::Vertical)));
    }

    #[test]
    fn east_column_has_no_vertical_edges() {
        let t = topo();
        assert!(!t.valid_edge(Edge::new(Cell::new(9, 0), Orientation::Vertical)));
        assert!(matches!(t.parse_edge("j1v"), Err(CoordError::InvalidEdge(_))));
    }

    #[test]
    fn neighbor_respects_bounds() {
        let t = topo();
        assert_eq!(t.neighbor(Cell::new(0, 0), Dir::West), None);
        assert_eq!(t.neighbor(Cell::new(0, 0), Dir::South), None);
        assert_eq!(t.neighbor(Cell::new(0, 0), Dir::North), Some(Cell::new(0, 1)));
        assert_eq!(t.neighbor(Cell::new(0, 0), Dir::East), Some(Cell::new(1, 0)));
        assert_eq!(t.neighbor(Cell::new(9, 9), Dir::North), None);
        assert_eq!(t.neighbor(Cell::new(9, 9), Dir::East), None);
    }

    #[test]
    fn corner_cells_have_two_neighbors() {
        let t = topo();
        assert_eq!(t.neighbors(Cell::new(0, 0)).count(), 2);
        assert_eq!(t.neighbors(Cell::new(5, 5)).count(), 4);
        assert_eq!(t.neighbors(Cell::new(0, 5)).count(), 3);
    }

    #[test]
    fn edge_between_matches_edge_cells() {
        let t = topo();
        let from = Cell::new(4, 4);
        for dir in ALL_DIRS {
            let edge = t.edge_between(from, dir).unwrap();
            let (a, b) = t.edge_cells(edge);
            let next = t.neighbor(from, dir).unwrap();
            assert!(
                (a == from && b == next) || (a == next && b == from),
                "edge {:?} does not separate {:?} and {:?}",
                edge,
                from,
                next
            );
        }
    }

    #[test]
    fn edge_between_is_shared_by_both_sides() {
        let t = topo();
        let a = Cell::new(2, 2);
        let b = t.neighbor(a, Dir::North).unwrap();
        assert_eq!(t.edge_between(a, Dir::North), t.edge_between(b, Dir::South));
        let c = t.neighbor(a, Dir::East).unwrap();
        assert_eq!(t.edge_between(a, Dir::East), t.edge_between(c, Dir::West));
    }

    #[test]
    fn ray_walks_to_board_edge() {
        let t = topo();
        let cells: Vec<Cell> = t.ray(Cell::new(3, 3), Dir::West).collect();
        assert_eq!(cells, vec![Cell::new(2, 3), Cell::new(1, 3), Cell::new(0, 3)]);
        assert_eq!(t.ray(Cell::new(0, 0), Dir::South).count(), 0);
    }

    #[test]
    fn cell_and_edge_indexes_are_dense_and_unique() {
        let t = topo();
        let mut seen = vec![false; t.cell_count()];
        for cell in t.cells() {
            let i = t.cell_index(cell);
            assert!(!seen[i]);
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s));

        let mut seen_edges = vec![false; t.edge_count()];
        for edge in t.edges() {
            let i = t.edge_index(edge);
            assert!(!seen_edges[i]);
            seen_edges[i] = true;
        }
    }
}
