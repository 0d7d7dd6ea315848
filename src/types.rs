use serde::Serialize;

/// Content of a board cell, and the side to move when not `Empty`.
/// Serializes as its `u8` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum Color {
    #[default]
    Empty = 0,
    First = 1,
    Second = 2,
}

impl Color {
    /// First <-> Second. `Empty` has no opponent and maps to itself.
    pub fn opponent(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
            Self::Empty => Self::Empty,
        }
    }

    /// Slot of a playing color in per-side tables.
    pub(crate) fn side(self) -> Option<usize> {
        match self {
            Self::First => Some(0),
            Self::Second => Some(1),
            Self::Empty => None,
        }
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Empty),
            1 => Some(Self::First),
            2 => Some(Self::Second),
            _ => None,
        }
    }
}

impl From<Color> for u8 {
    fn from(color: Color) -> Self {
        color as u8
    }
}

/// A board coordinate. `row` is x, `col` is y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

/// Running piece tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PieceCount {
    pub first: u32,
    pub second: u32,
}

impl PieceCount {
    pub fn get(&self, color: Color) -> u32 {
        match color {
            Color::First => self.first,
            Color::Second => self.second,
            Color::Empty => 0,
        }
    }

    pub(crate) fn adjust(&mut self, from: Color, to: Color) {
        match from {
            Color::First => self.first -= 1,
            Color::Second => self.second -= 1,
            Color::Empty => {}
        }
        match to {
            Color::First => self.first += 1,
            Color::Second => self.second += 1,
            Color::Empty => {}
        }
    }
}

/// Public game state snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameState {
    pub size: usize,
    /// Row-major, one entry per cell.
    pub board: Vec<Color>,
    pub current_player: Color,
    pub count: PieceCount,
    pub next_moves: usize,
    pub is_game_over: bool,
}

/// Final result after game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameResult {
    /// `None` on a tie.
    pub winner: Option<Color>,
    pub count: PieceCount,
}

impl GameResult {
    pub(crate) fn from_count(count: PieceCount) -> Self {
        let winner = if count.first > count.second {
            Some(Color::First)
        } else if count.second > count.first {
            Some(Color::Second)
        } else {
            None
        };
        Self { winner, count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_swaps_playing_colors() {
        assert_eq!(Color::First.opponent(), Color::Second);
        assert_eq!(Color::Second.opponent(), Color::First);
        assert_eq!(Color::Empty.opponent(), Color::Empty);
    }

    #[test]
    fn adjust_moves_one_piece_between_tallies() {
        let mut count = PieceCount { first: 2, second: 2 };
        count.adjust(Color::Empty, Color::First);
        count.adjust(Color::Second, Color::First);

        assert_eq!(count, PieceCount { first: 4, second: 1 });
    }

    #[test]
    fn color_serializes_as_number() {
        assert_eq!(serde_json::to_string(&Color::Empty).unwrap(), "0");
        assert_eq!(serde_json::to_string(&Color::Second).unwrap(), "2");
        assert_eq!(
            serde_json::to_string(&[Color::First, Color::Empty]).unwrap(),
            "[1,0]"
        );
    }

    #[test]
    fn result_reports_tie_without_winner() {
        let result = GameResult::from_count(PieceCount { first: 32, second: 32 });
        assert_eq!(result.winner, None);

        let result = GameResult::from_count(PieceCount { first: 30, second: 34 });
        assert_eq!(result.winner, Some(Color::Second));
    }
}
