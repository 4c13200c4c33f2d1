use tracing::{debug, info, trace};

use crate::board::{Board, Column, Location, Move, COLUMNS, COLUMN_CAPACITY};
use crate::token::Token;

/// Receives every move the solver makes, together with the board it produced.
pub trait Observer {
    fn on_move(&mut self, mv: Move, board: &Board);
}

impl<F: FnMut(Move, &Board)> Observer for F {
    fn on_move(&mut self, mv: Move, board: &Board) {
        self(mv, board)
    }
}

/// Rearranges `current` until every column equals the matching column of
/// `goal`. Returns the number of moves made.
///
/// Columns are aligned left to right, one step per column, and the sweep is
/// repeated until a full pass finds nothing left to do.
pub fn solve<O: Observer + ?Sized>(current: &mut Board, goal: &Board, observer: &mut O) -> usize {
    assert!(
        current.has_inventory() && goal.has_inventory(),
        "both boards must hold 3 tokens of each colour"
    );

    let mut moves = 0;
    let mut sweeps = 0;
    let mut changed = true;
    while changed {
        changed = false;
        sweeps += 1;
        for column in 0..COLUMNS {
            if current.column(column) != goal.column(column) {
                moves += align_column(current, goal, column, &mut *observer);
                changed = true;
            }
        }
        debug!(sweeps, moves, changed, "sweep finished");
    }
    debug_assert!(current.matches(goal));
    moves
}

/// Performs one alignment step on `column` and returns the moves it took.
///
/// The step runs on a snapshot of `current` whose working column is `column`,
/// so columns at or before it are never searched. The snapshot then replaces
/// `current`.
pub fn align_column<O: Observer + ?Sized>(
    current: &mut Board,
    goal: &Board,
    column: usize,
    observer: &mut O,
) -> usize {
    debug_assert_eq!(current.working(), None);
    let target = goal.column(column);
    let aligned = aligned_prefix(current.column(column), target);
    if aligned == COLUMN_CAPACITY {
        return 0;
    }

    let mut step = Step {
        board: current.clone(),
        target,
        column,
        observer,
        moves: 0,
    };
    step.board.set_working(Some(column));

    let live = step.board.column(column);
    let pull_from_staging = (aligned > 0 || live.is_empty())
        && !live.is_full()
        && target
            .at(aligned)
            .is_some_and(|token| step.board.staging().contains(token));

    debug!(
        column = column + 1,
        aligned,
        pull_from_staging,
        "aligning column"
    );
    if pull_from_staging {
        step.flow_staging(aligned);
    } else {
        step.flow_column(aligned);
    }

    let moves = step.moves;
    let mut next = step.board;
    next.set_working(None);
    *current = next;
    moves
}

/// Number of positions, from the bottom, where `current` already matches `target`.
pub fn aligned_prefix(current: &Column, target: &Column) -> usize {
    (0..COLUMN_CAPACITY)
        .take_while(|&position| current.agrees_at(position, target))
        .count()
}

struct Step<'a, O: ?Sized> {
    board: Board,
    target: &'a Column,
    column: usize,
    observer: &'a mut O,
    moves: usize,
}

impl<O: Observer + ?Sized> Step<'_, O> {
    /// Places a single token above the aligned prefix, preferring staging.
    fn flow_staging(&mut self, aligned: usize) {
        for position in aligned..COLUMN_CAPACITY {
            let Some(token) = self.target.at(position) else {
                break;
            };
            if self.board.staging().contains(token) {
                self.unstage(token);
                return;
            }
            if let Some(found) = self.board.lookup(token) {
                self.fetch(found);
                return;
            }
        }
    }

    /// Clears the column down to its aligned prefix, then rebuilds it bottom
    /// up from staging and the later columns.
    fn flow_column(&mut self, aligned: usize) {
        // The bound matters: once the column is down to `aligned` tokens the
        // slot at `aligned` reads as empty and never agrees with the target.
        for _ in 0..COLUMN_CAPACITY - aligned {
            let live = self.board.column(self.column);
            if !live.is_empty() && !live.agrees_at(aligned, self.target) {
                self.park(self.column);
            }
        }

        for position in 0..COLUMN_CAPACITY {
            if self
                .board
                .column(self.column)
                .agrees_at(position, self.target)
            {
                continue;
            }
            let Some(token) = self.target.at(position) else {
                continue;
            };
            if self.board.lookup_in_staging(token).is_some() {
                self.unstage(token);
                continue;
            }
            if let Some(found) = self.board.lookup(token) {
                self.fetch(found);
            }
        }
    }

    /// Uncovers the token at `found` and moves it onto the working column.
    fn fetch(&mut self, found: Location) {
        while !self.board.column(found.column).slot_is_empty(found.position + 1) {
            self.park(found.column);
        }
        let mv = self.board.move_column_to_column(found.column, self.column);
        self.record(mv);
    }

    /// Moves the top of `source` out of the way: into staging while it has
    /// room, otherwise onto the first later column with a free slot.
    fn park(&mut self, source: usize) {
        let mv = if !self.board.staging().is_full() {
            self.board.move_column_to_staging(source)
        } else {
            let spare = (self.column + 1..COLUMNS)
                .find(|&column| column != source && !self.board.column(column).is_full());
            match spare {
                Some(to) => {
                    info!(
                        from = source + 1,
                        to = to + 1,
                        "staging full, parking token on a column"
                    );
                    self.board.move_column_to_column(source, to)
                }
                // Nowhere left to put it; this is a staging overflow.
                None => self.board.move_column_to_staging(source),
            }
        };
        self.record(mv);
    }

    fn unstage(&mut self, token: Token) {
        let mv = self.board.move_staging_to_column(token, self.column);
        self.record(mv);
    }

    fn record(&mut self, mv: Move) {
        self.moves += 1;
        trace!(%mv, staged = self.board.staging().len(), "move");
        self.observer.on_move(mv, &self.board);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{INVENTORY, STAGING_CAPACITY};
    use crate::token::Token::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn board(columns: [[Token; 3]; 4]) -> Board {
        Board::from_tokens(&columns.concat()).unwrap()
    }

    fn touches(mv: Move, column: usize) -> bool {
        match mv {
            Move::Stage { column: c, .. } | Move::Unstage { column: c, .. } => c == column,
            Move::Shift { from, to, .. } => from == column || to == column,
        }
    }

    /// Solves and checks the board invariants after every move.
    fn solve_checked(current: &mut Board, goal: &Board) -> Vec<Move> {
        let mut log = Vec::new();
        solve(current, goal, &mut |mv: Move, board: &Board| {
            assert!(board.has_inventory(), "inventory changed after {mv}");
            assert!(board.columns().iter().all(|c| c.len() <= COLUMN_CAPACITY));
            assert!(board.staging().len() <= STAGING_CAPACITY);
            log.push(mv);
        });
        log
    }

    #[test]
    fn aligned_prefix_stops_at_first_disagreement() {
        let target: Column = [Red, Blue, Green].into_iter().collect();
        let cases: [(&[Token], usize); 5] = [
            (&[], 0),
            (&[Blue, Blue, Green], 0),
            (&[Red, Green, Green], 1),
            (&[Red, Blue], 2),
            (&[Red, Blue, Green], 3),
        ];
        for (tokens, expected) in cases {
            let current: Column = tokens.iter().copied().collect();
            assert_eq!(aligned_prefix(&current, &target), expected, "{tokens:?}");
        }
    }

    #[test]
    fn identical_boards_need_no_moves() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut current = Board::with_rng(&mut rng);
        let goal = current.clone();
        let log = solve_checked(&mut current, &goal);
        assert!(log.is_empty());
        assert!(current.matches(&goal));
    }

    #[test]
    fn aligned_column_is_never_touched() {
        let mut current = board([
            [Red, Red, Red],
            [Blue, Green, Orange],
            [Orange, Blue, Green],
            [Green, Orange, Blue],
        ]);
        let goal = board([
            [Red, Red, Red],
            [Green, Blue, Blue],
            [Orange, Orange, Green],
            [Blue, Green, Orange],
        ]);
        let log = solve_checked(&mut current, &goal);
        assert_eq!(log.len(), 15);
        assert!(log.iter().all(|&mv| !touches(mv, 0)));
        assert!(current.matches(&goal));
    }

    #[test]
    fn buried_token_is_uncovered_through_staging() {
        let mut current = board([
            [Green, Green, Orange],
            [Red, Blue, Blue],
            [Orange, Orange, Green],
            [Blue, Red, Red],
        ]);
        let goal = board([
            [Red, Blue, Green],
            [Orange, Red, Blue],
            [Green, Orange, Red],
            [Blue, Orange, Green],
        ]);
        let log = solve_checked(&mut current, &goal);
        assert_eq!(
            log[..6],
            [
                Move::Stage {
                    column: 0,
                    token: Orange
                },
                Move::Stage {
                    column: 0,
                    token: Green
                },
                Move::Stage {
                    column: 0,
                    token: Green
                },
                Move::Stage {
                    column: 1,
                    token: Blue
                },
                Move::Stage {
                    column: 1,
                    token: Blue
                },
                Move::Shift {
                    from: 1,
                    to: 0,
                    token: Red
                },
            ]
        );
        assert_eq!(log.len(), 26);
        assert!(current.matches(&goal));
    }

    #[test]
    fn staged_token_is_pulled_in_one_move() {
        let mut current = Board::from_parts(
            [&[Red], &[Green, Green, Green], &[Orange, Orange, Orange], &[Red, Red]],
            &[Blue, Blue, Blue],
        );
        let goal = board([
            [Red, Blue, Blue],
            [Green, Green, Green],
            [Orange, Orange, Orange],
            [Red, Red, Blue],
        ]);

        let mut log = Vec::new();
        let moves = align_column(&mut current, &goal, 0, &mut |mv: Move, _: &Board| log.push(mv));
        assert_eq!(moves, 1);
        assert_eq!(
            log,
            vec![Move::Unstage {
                column: 0,
                token: Blue
            }]
        );
        assert_eq!(current.working(), None);
        assert_eq!(current.staging().len(), 2);

        solve_checked(&mut current, &goal);
        assert!(current.matches(&goal));
    }

    #[test]
    fn empty_column_pulls_from_staging() {
        let mut current = Board::from_parts(
            [&[], &[Green, Green, Green], &[Orange, Orange, Orange], &[Red, Red, Red]],
            &[Blue, Blue, Blue],
        );
        let goal = board([
            [Blue, Blue, Blue],
            [Green, Green, Green],
            [Orange, Orange, Orange],
            [Red, Red, Red],
        ]);
        let log = solve_checked(&mut current, &goal);
        assert_eq!(log.len(), 3);
        assert!(log.iter().all(|mv| matches!(mv, Move::Unstage { column: 0, .. })));
        assert_eq!(current.staging().len(), 0);
    }

    #[test]
    fn full_staging_parks_on_a_later_column() {
        let mut current = board([
            [Orange, Blue, Red],
            [Red, Blue, Blue],
            [Green, Green, Orange],
            [Green, Red, Orange],
        ]);
        let goal = board([
            [Orange, Green, Green],
            [Green, Orange, Red],
            [Orange, Red, Red],
            [Blue, Blue, Blue],
        ]);

        let mut log = Vec::new();
        let mut full_at_park = false;
        solve(&mut current, &goal, &mut |mv: Move, board: &Board| {
            if mv
                == (Move::Shift {
                    from: 3,
                    to: 2,
                    token: Red,
                })
            {
                full_at_park = board.staging().is_full();
            }
            log.push(mv);
        });

        assert!(full_at_park);
        assert_eq!(log.len(), 20);
        assert!(current.matches(&goal));
    }

    #[test]
    fn random_boards_are_solved_within_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let mut current = Board::with_rng(&mut rng);
            let goal = Board::with_rng(&mut rng);
            let log = solve_checked(&mut current, &goal);
            assert!(current.matches(&goal));
            assert!(log.len() <= 5 * INVENTORY.len(), "took {} moves", log.len());
        }
    }

    #[test]
    fn solving_twice_is_a_no_op() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut current = Board::with_rng(&mut rng);
        let goal = Board::with_rng(&mut rng);
        solve_checked(&mut current, &goal);
        let mut calls = 0;
        let moves = solve(&mut current, &goal, &mut |_: Move, _: &Board| calls += 1);
        assert_eq!(moves, 0);
        assert_eq!(calls, 0);
    }

    #[test]
    #[should_panic(expected = "3 tokens of each colour")]
    fn mismatched_inventories_are_rejected() {
        let mut current = Board::from_parts(
            [&[Red, Red, Red], &[Red], &[], &[]],
            &[],
        );
        let goal = board([
            [Red, Red, Red],
            [Green, Green, Green],
            [Orange, Orange, Orange],
            [Blue, Blue, Blue],
        ]);
        solve(&mut current, &goal, &mut |_: Move, _: &Board| {});
    }
}
