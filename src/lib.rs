pub mod board;
pub mod config;
pub mod error;
pub mod game;
pub mod legal_moves;
pub mod listener;
pub mod types;
pub mod wasm;

pub use board::{Board, Direction};
pub use config::GameConfig;
pub use error::GameError;
pub use game::Game;
pub use legal_moves::{Captures, LegalMoveIndex};
pub use listener::ListenerId;
pub use types::{Color, GameResult, GameState, PieceCount, Position};
