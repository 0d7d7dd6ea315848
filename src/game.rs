use std::collections::HashMap;

use tracing::{debug, trace};

use crate::board::{Board, Direction};
use crate::config::{GameConfig, validate_size};
use crate::error::GameError;
use crate::legal_moves::{Captures, LegalMoveIndex};
use crate::listener::{ListenerId, Listeners};
use crate::types::{Color, GameResult, GameState, PieceCount, Position};

const PLAYERS: [Color; 2] = [Color::First, Color::Second];

/// Reversi rules engine.
///
/// Keeps one [`LegalMoveIndex`] per color up to date incrementally: after a
/// move only the empty cells that look at a changed cell along some ray are
/// re-derived. Listeners are notified synchronously from inside the mutating
/// call, cell changes first, then validity changes, then turn, then count.
/// Validity listeners see only the net change of a move: a position that is
/// legal both before and after a move reports nothing.
#[derive(Debug)]
pub struct Game {
    board: Board,
    current_player: Color,
    count: PieceCount,
    legal: [LegalMoveIndex; 2],
    cell_listeners: HashMap<Position, Listeners<Color>>,
    turn_listeners: Listeners<Color>,
    count_listeners: Listeners<PieceCount>,
}

impl Game {
    /// Standard start: the center 2×2 block holds two pieces per color on
    /// opposite diagonals, First moves first.
    pub fn new(size: usize) -> Result<Self, GameError> {
        validate_size(size)?;

        let mut game = Self::blank(Board::empty(size), Color::First);
        let m = (size / 2) as u8;
        game.board.set(Position::new(m - 1, m - 1), Color::Second);
        game.board.set(Position::new(m, m), Color::Second);
        game.board.set(Position::new(m - 1, m), Color::First);
        game.board.set(Position::new(m, m - 1), Color::First);
        game.count = PieceCount { first: 2, second: 2 };

        // The four opening moves per color are known in closed form.
        let [first, second] = &mut game.legal;
        first.set(Position::new(m - 1, m - 2), Direction::East, 2);
        first.set(Position::new(m - 2, m - 1), Direction::South, 2);
        first.set(Position::new(m, m + 1), Direction::West, 2);
        first.set(Position::new(m + 1, m), Direction::North, 2);
        second.set(Position::new(m, m - 2), Direction::East, 2);
        second.set(Position::new(m + 1, m - 1), Direction::North, 2);
        second.set(Position::new(m - 2, m), Direction::South, 2);
        second.set(Position::new(m - 1, m + 1), Direction::West, 2);

        Ok(game)
    }

    pub fn with_config(config: &GameConfig) -> Result<Self, GameError> {
        config.validate()?;
        Self::new(config.size)
    }

    /// Builds an engine from an arbitrary position. `cells` is row-major.
    /// Both legal-move indexes are derived by a full scan.
    pub fn from_cells(size: usize, cells: Vec<Color>, to_move: Color) -> Result<Self, GameError> {
        validate_size(size)?;
        if cells.len() != size * size {
            return Err(GameError::CellCount {
                expected: size * size,
                actual: cells.len(),
            });
        }
        if to_move == Color::Empty {
            return Err(GameError::EmptyToMove);
        }

        let board = Board::from_cells(size, cells);
        let mut game = Self::blank(board, to_move);
        game.count = game.board.count();

        for row in 0..size as u8 {
            for col in 0..size as u8 {
                let pos = Position::new(row, col);
                for dir in Direction::ALL {
                    for (index, color) in game.legal.iter_mut().zip(PLAYERS) {
                        let run = game.board.capture_run(pos, dir, color);
                        if run >= 2 {
                            index.set(pos, dir, run);
                        }
                    }
                }
            }
        }

        Ok(game)
    }

    fn blank(board: Board, current_player: Color) -> Self {
        Self {
            board,
            current_player,
            count: PieceCount::default(),
            legal: [LegalMoveIndex::new(), LegalMoveIndex::new()],
            cell_listeners: HashMap::new(),
            turn_listeners: Listeners::new(),
            count_listeners: Listeners::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.board.size()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Color at `(row, col)`, `None` when off the board.
    pub fn cell(&self, row: usize, col: usize) -> Option<Color> {
        self.position(row, col).map(|pos| self.board.get(pos))
    }

    pub fn current_player(&self) -> Color {
        self.current_player
    }

    pub fn opponent(color: Color) -> Color {
        color.opponent()
    }

    /// Number of legal moves for the side to move.
    pub fn n_next_moves(&self) -> usize {
        self.index(self.current_player).map_or(0, LegalMoveIndex::len)
    }

    /// True once neither color has a legal move.
    pub fn ended(&self) -> bool {
        self.legal.iter().all(LegalMoveIndex::is_empty)
    }

    pub fn is_valid_move(&self, row: usize, col: usize, color: Color) -> bool {
        self.captures(row, col, color).is_some()
    }

    /// Capture geometry of the move at `(row, col)` for `color`, if legal.
    pub fn captures(&self, row: usize, col: usize, color: Color) -> Option<&Captures> {
        let pos = self.position(row, col)?;
        self.index(color)?.get(pos)
    }

    /// Legal moves of `color` in row-major order.
    pub fn legal_moves(&self, color: Color) -> Vec<Position> {
        self.index(color)
            .map(|index| index.positions().collect())
            .unwrap_or_default()
    }

    pub fn legal_move_index(&self, color: Color) -> Option<&LegalMoveIndex> {
        self.index(color)
    }

    pub fn piece_count(&self) -> PieceCount {
        self.count
    }

    /// Final result, available once the game has ended.
    pub fn result(&self) -> Option<GameResult> {
        self.ended().then(|| GameResult::from_count(self.count))
    }

    pub fn state(&self) -> GameState {
        GameState {
            size: self.size(),
            board: self.board.cells().to_vec(),
            current_player: self.current_player,
            count: self.count,
            next_moves: self.n_next_moves(),
            is_game_over: self.ended(),
        }
    }

    /// Plays the side to move at `(row, col)`. Returns `false`, leaving the
    /// game untouched, when the move is illegal or off the board.
    pub fn play(&mut self, row: usize, col: usize) -> bool {
        let color = self.current_player;
        let Some(captures) = self.captures(row, col, color).copied() else {
            debug!(row, col, ?color, "illegal move rejected");
            return false;
        };
        let Some(origin) = self.position(row, col) else {
            return false;
        };

        let mut changed = vec![origin];
        for (dir, run) in captures.iter() {
            let ray = std::iter::successors(self.board.step(origin, dir), |&pos| {
                self.board.step(pos, dir)
            });
            changed.extend(ray.take(run as usize - 1));
        }

        // All flips land before any legality is re-derived.
        for &pos in &changed {
            let previous = self.board.set(pos, color);
            self.count.adjust(previous, color);
            if let Some(listeners) = self.cell_listeners.get_mut(&pos) {
                listeners.notify(&color);
            }
        }
        for index in &mut self.legal {
            index.defer_notifications();
        }
        for &pos in &changed {
            self.recompute(pos);
        }
        for index in &mut self.legal {
            index.flush_notifications();
        }

        debug!(row, col, ?color, flipped = changed.len() - 1, "move played");
        self.current_player = color.opponent();
        self.turn_listeners.notify(&self.current_player);
        self.count_listeners.notify(&self.count);
        true
    }

    /// Passes the turn. Only allowed when the side to move has no legal move.
    pub fn skip_play(&mut self) -> bool {
        if self.n_next_moves() > 0 {
            debug!(color = ?self.current_player, "skip rejected, legal moves remain");
            return false;
        }
        debug!(color = ?self.current_player, "turn skipped");
        self.current_player = self.current_player.opponent();
        self.turn_listeners.notify(&self.current_player);
        true
    }

    /// Registers a listener for color changes of the cell at `(row, col)`.
    /// Returns `None` when the cell is off the board.
    pub fn add_cell_listener(
        &mut self,
        row: usize,
        col: usize,
        listener: impl FnMut(&Color) + 'static,
    ) -> Option<ListenerId> {
        let pos = self.position(row, col)?;
        Some(self.cell_listeners.entry(pos).or_default().add(listener))
    }

    pub fn remove_cell_listener(&mut self, row: usize, col: usize, id: ListenerId) -> bool {
        self.position(row, col)
            .and_then(|pos| self.cell_listeners.get_mut(&pos))
            .is_some_and(|listeners| listeners.remove(id))
    }

    /// Registers a listener for legal/illegal transitions of `(row, col)`
    /// for `color`. Returns `None` for `Color::Empty` or an off-board cell.
    pub fn add_validity_listener(
        &mut self,
        row: usize,
        col: usize,
        color: Color,
        listener: impl FnMut(&bool) + 'static,
    ) -> Option<ListenerId> {
        let pos = self.position(row, col)?;
        let index = self.index_mut(color)?;
        Some(index.add_listener(pos, listener))
    }

    pub fn remove_validity_listener(
        &mut self,
        row: usize,
        col: usize,
        color: Color,
        id: ListenerId,
    ) -> bool {
        let Some(pos) = self.position(row, col) else {
            return false;
        };
        self.index_mut(color)
            .is_some_and(|index| index.remove_listener(pos, id))
    }

    pub fn add_turn_listener(&mut self, listener: impl FnMut(&Color) + 'static) -> ListenerId {
        self.turn_listeners.add(listener)
    }

    pub fn remove_turn_listener(&mut self, id: ListenerId) -> bool {
        self.turn_listeners.remove(id)
    }

    pub fn add_count_listener(
        &mut self,
        listener: impl FnMut(&PieceCount) + 'static,
    ) -> ListenerId {
        self.count_listeners.add(listener)
    }

    pub fn remove_count_listener(&mut self, id: ListenerId) -> bool {
        self.count_listeners.remove(id)
    }

    /// Re-derives legality around `pos`, which has just become occupied.
    fn recompute(&mut self, pos: Position) {
        for index in &mut self.legal {
            index.delete(pos, None);
        }

        for dir in Direction::ALL {
            let Some(target) = self.empty_along(pos, dir) else {
                continue;
            };
            let back = dir.opposite();
            trace!(row = target.row, col = target.col, ?back, "recomputing ray");
            for (index, color) in self.legal.iter_mut().zip(PLAYERS) {
                let run = self.board.capture_run(target, back, color);
                if run >= 2 {
                    index.set(target, back, run);
                } else {
                    index.delete(target, Some(back));
                }
            }
        }
    }

    /// First empty cell along `dir` from `from`, provided the pieces between
    /// them form a single-color run. Only such a cell can see `from` through
    /// a capture line.
    fn empty_along(&self, from: Position, dir: Direction) -> Option<Position> {
        let mut cursor = self.board.step(from, dir)?;
        let mut previous = self.board.get(cursor);
        loop {
            if previous == Color::Empty {
                return Some(cursor);
            }
            cursor = self.board.step(cursor, dir)?;
            let cell = self.board.get(cursor);
            if cell != Color::Empty && cell != previous {
                return None;
            }
            previous = cell;
        }
    }

    fn position(&self, row: usize, col: usize) -> Option<Position> {
        self.board
            .contains(row, col)
            .then(|| Position::new(row as u8, col as u8))
    }

    fn index(&self, color: Color) -> Option<&LegalMoveIndex> {
        color.side().map(|side| &self.legal[side])
    }

    fn index_mut(&mut self, color: Color) -> Option<&mut LegalMoveIndex> {
        color.side().map(|side| &mut self.legal[side])
    }
}
