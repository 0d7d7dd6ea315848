use serde::{Deserialize, Serialize};

use crate::error::GameError;

pub const DEFAULT_SIZE: usize = 8;
pub const MIN_SIZE: usize = 4;
/// Largest even size whose coordinates fit in a `u8`.
pub const MAX_SIZE: usize = 254;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Rows and columns of the board.
    pub size: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self { size: DEFAULT_SIZE }
    }
}

impl GameConfig {
    pub fn with_size(size: usize) -> Self {
        Self { size }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        validate_size(self.size)
    }
}

pub(crate) fn validate_size(size: usize) -> Result<(), GameError> {
    if size % 2 != 0 || !(MIN_SIZE..=MAX_SIZE).contains(&size) {
        return Err(GameError::InvalidSize(size));
    }
    Ok(())
}
