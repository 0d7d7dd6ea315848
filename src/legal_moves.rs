use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::trace;

use crate::board::Direction;
use crate::listener::{ListenerId, Listeners};
use crate::types::Position;

/// Capture geometry of one legal move: run length per direction,
/// 0 where the direction captures nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Captures([u8; 8]);

impl Captures {
    pub fn get(&self, dir: Direction) -> Option<u8> {
        match self.0[dir.index()] {
            0 => None,
            run => Some(run),
        }
    }

    /// `(direction, run_length)` pairs with a capture, in [`Direction::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Direction, u8)> + '_ {
        Direction::ALL
            .into_iter()
            .filter_map(move |dir| self.get(dir).map(|run| (dir, run)))
    }

    pub fn len(&self) -> usize {
        self.0.iter().filter(|&&run| run != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&run| run == 0)
    }

    fn insert(&mut self, dir: Direction, run: u8) {
        self.0[dir.index()] = run;
    }

    fn remove(&mut self, dir: Direction) {
        self.0[dir.index()] = 0;
    }

    fn clear(&mut self) {
        self.0 = [0; 8];
    }
}

/// Every currently legal move of one color, with the captures behind it.
///
/// A position is present iff it holds at least one capture record.
/// Validity listeners registered for a position fire `true` when it enters
/// the index and `false` when it leaves; overwriting records of a position
/// that stays present fires nothing. While notifications are deferred, only
/// the net change per position is reported, at flush time.
#[derive(Debug, Default)]
pub struct LegalMoveIndex {
    moves: BTreeMap<Position, Captures>,
    listeners: HashMap<Position, Listeners<bool>>,
    /// Membership before deferral, for positions touched since.
    deferred: Option<BTreeMap<Position, bool>>,
}

impl LegalMoveIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the record for `(pos, dir)`.
    /// Callers only pass real captures (`run >= 2`).
    pub fn set(&mut self, pos: Position, dir: Direction, run: u8) {
        debug_assert!(run >= 2, "capture run must be at least 2, got {run}");
        if !self.moves.contains_key(&pos) {
            trace!(row = pos.row, col = pos.col, "position became legal");
            self.transition(pos, true);
        }
        self.moves.entry(pos).or_default().insert(dir, run);
    }

    /// Removes the record for `(pos, dir)`, or all records of `pos` when
    /// `dir` is `None`. Missing records are ignored.
    pub fn delete(&mut self, pos: Position, dir: Option<Direction>) {
        let Some(captures) = self.moves.get_mut(&pos) else {
            return;
        };
        match dir {
            Some(dir) => captures.remove(dir),
            None => captures.clear(),
        }
        if captures.is_empty() {
            self.moves.remove(&pos);
            trace!(row = pos.row, col = pos.col, "position became illegal");
            self.transition(pos, false);
        }
    }

    /// Holds validity notifications back until [`Self::flush_notifications`].
    pub fn defer_notifications(&mut self) {
        self.deferred.get_or_insert_with(BTreeMap::new);
    }

    /// Reports every position whose membership differs from before the
    /// deferral, once, in row-major order.
    pub fn flush_notifications(&mut self) {
        let Some(deferred) = self.deferred.take() else {
            return;
        };
        for (pos, before) in deferred {
            let now = self.moves.contains_key(&pos);
            if now != before {
                self.notify(pos, now);
            }
        }
    }

    fn transition(&mut self, pos: Position, now: bool) {
        match &mut self.deferred {
            Some(deferred) => {
                deferred.entry(pos).or_insert(!now);
            }
            None => self.notify(pos, now),
        }
    }

    fn notify(&mut self, pos: Position, valid: bool) {
        if let Some(listeners) = self.listeners.get_mut(&pos) {
            listeners.notify(&valid);
        }
    }

    pub fn get(&self, pos: Position) -> Option<&Captures> {
        self.moves.get(&pos)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.moves.contains_key(&pos)
    }

    /// Number of legal positions.
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Legal positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.moves.keys().copied()
    }

    /// Registers a listener for future legal/illegal transitions of `pos`.
    /// The current state is not reported.
    pub fn add_listener(
        &mut self,
        pos: Position,
        listener: impl FnMut(&bool) + 'static,
    ) -> ListenerId {
        self.listeners.entry(pos).or_default().add(listener)
    }

    pub fn remove_listener(&mut self, pos: Position, id: ListenerId) -> bool {
        self.listeners
            .get_mut(&pos)
            .is_some_and(|listeners| listeners.remove(id))
    }
}

impl fmt::Display for LegalMoveIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, captures) in &self.moves {
            let runs: Vec<String> = captures
                .iter()
                .map(|(dir, run)| format!("{}:{run}", dir.index()))
                .collect();
            writeln!(f, "{},{}: {}", pos.row, pos.col, runs.join(", "))?;
        }
        Ok(())
    }
}
