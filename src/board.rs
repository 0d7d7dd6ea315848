use std::fmt;

use crate::types::{Color, PieceCount, Position};

/// One of the eight compass directions. `North` decreases the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    South,
    East,
    SouthEast,
    NorthEast,
    SouthWest,
    NorthWest,
    West,
    North,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::South,
        Direction::East,
        Direction::SouthEast,
        Direction::NorthEast,
        Direction::SouthWest,
        Direction::NorthWest,
        Direction::West,
        Direction::North,
    ];

    /// `(d_row, d_col)` offset of one step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::SouthEast => (1, 1),
            Direction::NorthEast => (-1, 1),
            Direction::SouthWest => (1, -1),
            Direction::NorthWest => (-1, -1),
            Direction::West => (0, -1),
            Direction::North => (-1, 0),
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::NorthEast => Direction::SouthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::NorthWest => Direction::SouthEast,
            Direction::West => Direction::East,
            Direction::North => Direction::South,
        }
    }

    /// Position of `self` in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Square N×N grid of cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    size: usize,
    cells: Vec<Color>,
}

impl Board {
    /// Creates an all-empty board. Size validation is the caller's job.
    pub(crate) fn empty(size: usize) -> Self {
        Self {
            size,
            cells: vec![Color::Empty; size * size],
        }
    }

    pub(crate) fn from_cells(size: usize, cells: Vec<Color>) -> Self {
        debug_assert_eq!(cells.len(), size * size);
        Self { size, cells }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size
    }

    /// Cell color. Panics when `pos` is off the board.
    pub fn get(&self, pos: Position) -> Color {
        self.cells[self.index(pos)]
    }

    /// Writes `color` at `pos` and returns the previous content.
    pub(crate) fn set(&mut self, pos: Position, color: Color) -> Color {
        let idx = self.index(pos);
        std::mem::replace(&mut self.cells[idx], color)
    }

    /// Neighbor of `pos` along `dir`, if it is on the board.
    pub fn step(&self, pos: Position, dir: Direction) -> Option<Position> {
        let (dr, dc) = dir.delta();
        let row = pos.row as i32 + dr;
        let col = pos.col as i32 + dc;
        if row < 0 || col < 0 || !self.contains(row as usize, col as usize) {
            return None;
        }
        Some(Position::new(row as u8, col as u8))
    }

    /// Distance from the empty cell `pos` to a `color` anchor along `dir`,
    /// across an unbroken run of opponent pieces. Returns 0 unless the run
    /// holds at least one opponent piece, so any non-zero result is >= 2.
    /// An off-board `pos` captures nothing.
    pub fn capture_run(&self, pos: Position, dir: Direction, color: Color) -> u8 {
        if color == Color::Empty
            || !self.contains(pos.row as usize, pos.col as usize)
            || self.get(pos) != Color::Empty
        {
            return 0;
        }

        let opponent = color.opponent();
        let mut cursor = pos;
        let mut distance = 0u8;
        while let Some(next) = self.step(cursor, dir) {
            distance += 1;
            let cell = self.get(next);
            if cell == color {
                return if distance > 1 { distance } else { 0 };
            }
            if cell != opponent {
                return 0;
            }
            cursor = next;
        }
        0
    }

    /// Tally by full scan.
    pub fn count(&self) -> PieceCount {
        self.cells.iter().fold(PieceCount::default(), |mut acc, &cell| {
            acc.adjust(Color::Empty, cell);
            acc
        })
    }

    fn index(&self, pos: Position) -> usize {
        pos.row as usize * self.size + pos.col as usize
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.size) {
            let line: String = row
                .iter()
                .map(|cell| match cell {
                    Color::Empty => '.',
                    Color::First => 'X',
                    Color::Second => 'O',
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
