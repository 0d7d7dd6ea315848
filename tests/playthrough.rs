use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reversi_engine::{Board, Color, Direction, Game, GameConfig, PieceCount, Position};

const PLAYERS: [Color; 2] = [Color::First, Color::Second];

/// Legal moves of `color` with their runs, by scanning every cell.
fn brute_force(board: &Board, color: Color) -> Vec<(Position, Vec<(Direction, u8)>)> {
    let size = board.size() as u8;
    let mut moves = Vec::new();
    for row in 0..size {
        for col in 0..size {
            let pos = Position::new(row, col);
            let runs: Vec<(Direction, u8)> = Direction::ALL
                .into_iter()
                .map(|dir| (dir, board.capture_run(pos, dir, color)))
                .filter(|&(_, run)| run >= 2)
                .collect();
            if !runs.is_empty() {
                moves.push((pos, runs));
            }
        }
    }
    moves
}

fn assert_consistent(game: &Game) {
    let board = game.board();
    for color in PLAYERS {
        let expected = brute_force(board, color);
        let index = game.legal_move_index(color).unwrap();
        assert_eq!(index.len(), expected.len(), "{color:?} move count\n{board}");
        for (pos, runs) in expected {
            let captures = index.get(pos).unwrap_or_else(|| {
                panic!("{color:?} missing {pos:?}\n{board}");
            });
            assert_eq!(captures.iter().collect::<Vec<_>>(), runs, "{pos:?}\n{board}");
        }
    }

    let both_stuck = PLAYERS
        .iter()
        .all(|&color| brute_force(board, color).is_empty());
    assert_eq!(game.ended(), both_stuck);
    assert_eq!(game.piece_count(), board.count());
}

type CellKey = (usize, usize, Color);

/// Tracks validity notifications for every cell and color and checks that
/// each one is a real transition away from the last known state.
struct ValidityTracker {
    state: Rc<RefCell<HashMap<CellKey, bool>>>,
    events: Rc<RefCell<Vec<(CellKey, bool)>>>,
}

impl ValidityTracker {
    fn attach(game: &mut Game) -> Self {
        let state = Rc::new(RefCell::new(HashMap::new()));
        let events = Rc::new(RefCell::new(Vec::new()));
        let size = game.size();
        for row in 0..size {
            for col in 0..size {
                for color in PLAYERS {
                    let key = (row, col, color);
                    state
                        .borrow_mut()
                        .insert(key, game.is_valid_move(row, col, color));
                    let sink = Rc::clone(&state);
                    let log = Rc::clone(&events);
                    game.add_validity_listener(row, col, color, move |valid| {
                        let previous = sink.borrow_mut().insert(key, *valid);
                        assert_eq!(previous, Some(!valid), "redundant notification at {key:?}");
                        log.borrow_mut().push((key, *valid));
                    });
                }
            }
        }
        Self { state, events }
    }

    fn snapshot(&self) -> HashMap<CellKey, bool> {
        self.state.borrow().clone()
    }

    /// Every event since the last call is the net change of one move:
    /// one per cell and color, and only where validity really differs.
    fn assert_net_changes(&self, before: &HashMap<CellKey, bool>, game: &Game) {
        let events: Vec<_> = self.events.borrow_mut().drain(..).collect();
        let mut seen = HashSet::new();
        for (key, valid) in events {
            let (row, col, color) = key;
            assert!(seen.insert(key), "{key:?} notified twice in one move");
            assert_ne!(before[&key], valid, "{key:?} stayed {valid} but was notified");
            assert_eq!(game.is_valid_move(row, col, color), valid, "{key:?}");
        }
        for (&key, &was) in before {
            let (row, col, color) = key;
            if game.is_valid_move(row, col, color) != was {
                assert!(seen.contains(&key), "{key:?} changed silently");
            }
        }
    }

    fn assert_matches(&self, game: &Game) {
        for (&(row, col, color), &valid) in self.state.borrow().iter() {
            assert_eq!(game.is_valid_move(row, col, color), valid, "({row},{col}) {color:?}");
        }
    }
}

fn random_game(seed: u64, size: usize) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut game = Game::with_config(&GameConfig::with_size(size)).unwrap();
    let tracker = ValidityTracker::attach(&mut game);
    let counts = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&counts);
    game.add_count_listener(move |count| sink.borrow_mut().push(*count));

    assert_consistent(&game);
    while !game.ended() {
        let player = game.current_player();
        let moves = game.legal_moves(player);
        if moves.is_empty() {
            assert!(game.skip_play());
            assert_eq!(game.current_player(), player.opponent());
            continue;
        }
        assert!(!game.skip_play());

        let before = tracker.snapshot();
        let pos = moves[rng.random_range(0..moves.len())];
        assert!(game.play(pos.row as usize, pos.col as usize));
        assert_eq!(game.current_player(), player.opponent());
        assert_eq!(counts.borrow().last(), Some(&game.piece_count()));

        assert_consistent(&game);
        tracker.assert_net_changes(&before, &game);
        tracker.assert_matches(&game);
    }

    let result = game.result().unwrap();
    assert_eq!(result.count, game.piece_count());
    assert_eq!(game.n_next_moves(), 0);
}

#[test]
fn random_playthroughs_match_brute_force_on_standard_board() {
    for seed in 0..40 {
        random_game(seed, 8);
    }
}

#[test]
fn random_playthroughs_match_brute_force_on_other_sizes() {
    for seed in 0..20 {
        random_game(seed, 4);
        random_game(seed, 6);
    }
    random_game(7, 10);
}

#[test]
fn random_playthroughs_from_scanned_positions() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..30 {
        let cells: Vec<Color> = (0..64)
            .map(|_| match rng.random_range(0..3) {
                0 => Color::Empty,
                1 => Color::First,
                _ => Color::Second,
            })
            .collect();
        let mut game = Game::from_cells(8, cells, Color::Second).unwrap();
        assert_consistent(&game);

        while !game.ended() {
            let moves = game.legal_moves(game.current_player());
            if moves.is_empty() {
                assert!(game.skip_play());
                continue;
            }
            let pos = moves[rng.random_range(0..moves.len())];
            assert!(game.play(pos.row as usize, pos.col as usize));
            assert_consistent(&game);
        }
    }
}

#[test]
fn is_valid_move_is_stable_without_mutation() {
    let game = Game::new(8).unwrap();
    for _ in 0..3 {
        assert!(game.is_valid_move(2, 3, Color::First));
        assert!(!game.is_valid_move(2, 3, Color::Second));
        assert!(!game.is_valid_move(0, 0, Color::First));
    }
}

#[test]
fn failed_calls_do_not_advance_turn() {
    let mut game = Game::new(8).unwrap();

    assert!(!game.play(0, 0));
    assert!(!game.skip_play());
    assert_eq!(game.current_player(), Color::First);

    assert!(game.play(2, 3));
    assert!(!game.play(2, 3));
    assert_eq!(game.current_player(), Color::Second);
}

#[test]
fn config_and_snapshot_round_through_json() {
    let config: GameConfig = serde_json::from_str(r#"{"size": 6}"#).unwrap();
    assert_eq!(config, GameConfig::with_size(6));
    let config: GameConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, GameConfig::default());
    let config: GameConfig = serde_json::from_str(r#"{"size": 5}"#).unwrap();
    assert!(Game::with_config(&config).is_err());

    let mut game = Game::new(4).unwrap();
    assert!(game.play(1, 0));
    let json = serde_json::to_value(game.state()).unwrap();

    assert_eq!(json["size"], 4);
    assert_eq!(json["current_player"], 2);
    assert_eq!(json["count"]["first"], 4);
    assert_eq!(json["count"]["second"], 1);
    assert_eq!(json["board"][4], 1);
    assert_eq!(json["board"][0], 0);
    assert_eq!(json["is_game_over"], false);
    assert_eq!(game.piece_count(), PieceCount { first: 4, second: 1 });
}
