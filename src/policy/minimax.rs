use rustc_hash::FxHashMap;

use crate::core::{Board, EnvRng, Observation, Outcome};

use super::Policy;

/// Perfect-play opponent.
///
/// Negamax over every reachable position, memoized per board. Scores favour
/// faster wins and slower losses; ties go to the lowest cell index.
#[derive(Clone, Debug, Default)]
pub struct MinimaxPolicy {
    memo: FxHashMap<Board, i32>,
}

impl MinimaxPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `board` for the player to move.
    pub fn value(&mut self, board: &Board) -> i32 {
        if let Some(&v) = self.memo.get(board) {
            return v;
        }

        let v = match board.outcome() {
            // The previous mover completed a line.
            Outcome::Win(_) => -(1 + board.empty_count() as i32),
            Outcome::Draw => 0,
            Outcome::InProgress => {
                let me = board.to_move();
                board
                    .legal_actions()
                    .into_iter()
                    .filter_map(|a| board.with_move(a, me).ok())
                    .map(|child| -self.value(&child))
                    .max()
                    .unwrap_or(0)
            }
        };
        self.memo.insert(*board, v);
        v
    }

    /// Best cell for the player to move on `board`.
    pub fn best_move(&mut self, board: &Board) -> Option<usize> {
        if board.outcome().is_done() {
            return None;
        }
        let me = board.to_move();
        let mut best: Option<(usize, i32)> = None;
        for a in board.legal_actions() {
            let Ok(child) = board.with_move(a, me) else {
                continue;
            };
            let score = -self.value(&child);
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((a, score));
            }
        }
        best.map(|(a, _)| a)
    }

    /// Number of memoized positions.
    #[must_use]
    pub fn positions_seen(&self) -> usize {
        self.memo.len()
    }
}

impl Policy for MinimaxPolicy {
    fn select_action(&mut self, observation: &Observation, _rng: &mut EnvRng) -> Option<usize> {
        let board = Board::from_observation(observation)?;
        self.best_move(&board)
    }

    fn name(&self) -> &str {
        "minimax"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Player;

    #[test]
    fn test_empty_board_is_a_draw() {
        let mut policy = MinimaxPolicy::new();
        assert_eq!(policy.value(&Board::new()), 0);
        assert!(policy.positions_seen() > 1000);
    }

    #[test]
    fn test_takes_immediate_win() {
        // X X .
        // O O .
        // . . .
        let board = Board::from_codes([0, 0, 2, 1, 1, 2, 2, 2, 2]).unwrap();
        let mut policy = MinimaxPolicy::new();
        assert_eq!(board.to_move(), Player::Zero);
        assert_eq!(policy.best_move(&board), Some(2));
    }

    #[test]
    fn test_blocks_opponent_line() {
        // X X .
        // . O .
        // . . .
        let board = Board::from_codes([0, 0, 2, 2, 1, 2, 2, 2, 2]).unwrap();
        let mut policy = MinimaxPolicy::new();
        assert_eq!(board.to_move(), Player::One);
        assert_eq!(policy.best_move(&board), Some(2));
    }

    #[test]
    fn test_no_move_on_finished_board() {
        let board = Board::from_codes([0, 0, 0, 1, 1, 2, 2, 2, 2]).unwrap();
        let mut policy = MinimaxPolicy::new();
        assert_eq!(policy.best_move(&board), None);
    }

    #[test]
    fn test_select_action_uses_observation() {
        let board = Board::from_codes([0, 0, 2, 1, 1, 2, 2, 2, 2]).unwrap();
        let mut policy = MinimaxPolicy::new();
        let mut rng = EnvRng::new(0);
        assert_eq!(policy.select_action(&board.observation(), &mut rng), Some(2));
    }
}
