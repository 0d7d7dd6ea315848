/// Errors raised while building a game.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("board size must be even and between 4 and 254, got {0}")]
    InvalidSize(usize),

    #[error("expected {expected} cells, got {actual}")]
    CellCount { expected: usize, actual: usize },

    #[error("side to move must be First or Second")]
    EmptyToMove,
}
