//! The 3x3 board, turn parity and win detection.
//!
//! ## Cell codes
//!
//! Internally every cell holds a raw code:
//! - `0`: player 0's mark
//! - `1`: player 1's mark
//! - `2`: empty
//!
//! Agents never see these codes directly. Observations use the shifted
//! encoding `(code + 2) mod 3`, so an empty cell reads as `1`, player 0 as
//! `2` and player 1 as `0`. Pre-trained opponents expect exactly this
//! encoding.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::EnvError;

/// Number of cells on the board.
pub const BOARD_CELLS: usize = 9;

/// Raw code for an empty cell.
pub const EMPTY: u8 = 2;

/// Observation value of an empty cell.
pub const OBS_EMPTY: u8 = 1;

/// The 8 winning triples, in detection order.
pub const LINES: [[usize; 3]; 8] = [
    // rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // cols
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // diags
    [0, 4, 8],
    [2, 4, 6],
];

/// Observation vector handed to agents: one value in {0,1,2} per cell.
pub type Observation = [u8; BOARD_CELLS];

/// Legal cell indices; never more than 9, so no heap allocation.
pub type LegalActions = SmallVec<[usize; BOARD_CELLS]>;

/// One of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    /// Moves first on an empty board.
    Zero,
    One,
}

impl Player {
    /// Convert a 0/1 index into a player.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Player::Zero),
            1 => Some(Player::One),
            _ => None,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Player::Zero => 0,
            Player::One => 1,
        }
    }

    /// The raw cell code of this player's mark.
    #[must_use]
    pub const fn code(self) -> u8 {
        self.index() as u8
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Player::Zero => Player::One,
            Player::One => Player::Zero,
        }
    }

    /// Text symbol used by the ANSI renderer.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Player::Zero => 'X',
            Player::One => 'O',
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.index())
    }
}

/// Result of win detection on a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// A line is complete.
    Win(Player),
    /// Board full without a completed line.
    Draw,
    InProgress,
}

impl Outcome {
    #[must_use]
    pub fn is_done(self) -> bool {
        !matches!(self, Outcome::InProgress)
    }

    #[must_use]
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Win(p) => Some(p),
            _ => None,
        }
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(self, player: Player) -> bool {
        self.winner() == Some(player)
    }
}

/// A 3x3 tic-tac-toe board stored as raw cell codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [u8; BOARD_CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// An empty board.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cells: [EMPTY; BOARD_CELLS],
        }
    }

    /// Build a board from raw codes. Codes outside {0,1,2} are rejected.
    pub fn from_codes(codes: [u8; BOARD_CELLS]) -> Option<Self> {
        if codes.iter().all(|&c| c <= EMPTY) {
            Some(Self { cells: codes })
        } else {
            None
        }
    }

    /// Decode an observation back into a board: `(obs + 1) mod 3`.
    pub fn from_observation(obs: &Observation) -> Option<Self> {
        if obs.iter().any(|&v| v > 2) {
            return None;
        }
        let mut cells = [EMPTY; BOARD_CELLS];
        for (cell, &v) in cells.iter_mut().zip(obs.iter()) {
            *cell = (v + 1) % 3;
        }
        Some(Self { cells })
    }

    /// Raw cell codes.
    #[must_use]
    pub const fn codes(&self) -> &[u8; BOARD_CELLS] {
        &self.cells
    }

    /// The mark at `idx`, or `None` when empty or out of range.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<Player> {
        self.cells
            .get(idx)
            .and_then(|&code| Player::from_index(code as usize))
    }

    #[must_use]
    pub fn is_empty(&self, idx: usize) -> bool {
        self.cells.get(idx) == Some(&EMPTY)
    }

    #[must_use]
    pub fn empty_count(&self) -> usize {
        self.cells.iter().filter(|&&c| c == EMPTY).count()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Whose turn it is: `1 - (empty_count mod 2)`.
    ///
    /// With 9 empty cells this is player 0.
    #[must_use]
    pub fn to_move(&self) -> Player {
        if self.empty_count() % 2 == 1 {
            Player::Zero
        } else {
            Player::One
        }
    }

    /// Empty cell indices in ascending order.
    #[must_use]
    pub fn legal_actions(&self) -> LegalActions {
        (0..BOARD_CELLS).filter(|&i| self.is_empty(i)).collect()
    }

    /// Write `player`'s mark at `idx`.
    ///
    /// Never overwrites an existing mark.
    pub fn place(&mut self, idx: usize, player: Player) -> Result<(), EnvError> {
        match self.cells.get(idx) {
            None => Err(EnvError::InvalidAction {
                action: idx,
                n: BOARD_CELLS,
            }),
            Some(&code) if code != EMPTY => Err(EnvError::CellOccupied { position: idx }),
            Some(_) => {
                self.cells[idx] = player.code();
                Ok(())
            }
        }
    }

    /// Return a copy with `player`'s mark at `idx`.
    pub fn with_move(mut self, idx: usize, player: Player) -> Result<Self, EnvError> {
        self.place(idx, player)?;
        Ok(self)
    }

    /// Check the 8 lines for a winner, then the board for a draw.
    #[must_use]
    pub fn outcome(&self) -> Outcome {
        for &[a, b, c] in &LINES {
            let m = self.cells[a];
            if m != EMPTY && m == self.cells[b] && m == self.cells[c] {
                if let Some(player) = Player::from_index(m as usize) {
                    return Outcome::Win(player);
                }
            }
        }
        if self.is_full() {
            Outcome::Draw
        } else {
            Outcome::InProgress
        }
    }

    /// Win detection as a `(winner_code, done)` pair, `2` meaning no winner.
    #[must_use]
    pub fn who_won(&self) -> (u8, bool) {
        match self.outcome() {
            Outcome::Win(p) => (p.code(), true),
            Outcome::Draw => (EMPTY, true),
            Outcome::InProgress => (EMPTY, false),
        }
    }

    /// The agent-facing encoding: `(code + 2) mod 3` per cell.
    #[must_use]
    pub fn observation(&self) -> Observation {
        let mut obs = [0u8; BOARD_CELLS];
        for (o, &c) in obs.iter_mut().zip(self.cells.iter()) {
            *o = (c + 2) % 3;
        }
        obs
    }

    /// Number of marks each player has placed, as `(player0, player1)`.
    #[must_use]
    pub fn mark_counts(&self) -> (usize, usize) {
        let zero = self.cells.iter().filter(|&&c| c == 0).count();
        let one = self.cells.iter().filter(|&&c| c == 1).count();
        (zero, one)
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            for col in 0..3 {
                let ch = self.get(row * 3 + col).map_or('.', Player::symbol);
                if col > 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", ch)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(codes: [u8; 9]) -> Board {
        Board::from_codes(codes).unwrap()
    }

    #[test]
    fn test_new_board_is_empty() {
        let b = Board::new();
        assert_eq!(b.empty_count(), 9);
        assert_eq!(b.to_move(), Player::Zero);
        assert_eq!(b.outcome(), Outcome::InProgress);
        assert_eq!(b.legal_actions().as_slice(), &[0, 1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_turn_parity() {
        let mut b = Board::new();
        b.place(4, Player::Zero).unwrap();
        assert_eq!(b.to_move(), Player::One);
        b.place(0, Player::One).unwrap();
        assert_eq!(b.to_move(), Player::Zero);
    }

    #[test]
    fn test_place_rejects_occupied_and_out_of_range() {
        let mut b = Board::new();
        b.place(3, Player::Zero).unwrap();

        assert!(matches!(
            b.place(3, Player::One),
            Err(EnvError::CellOccupied { position: 3 })
        ));
        assert!(matches!(
            b.place(9, Player::One),
            Err(EnvError::InvalidAction { action: 9, .. })
        ));
        assert_eq!(b.get(3), Some(Player::Zero));
    }

    #[test]
    fn test_every_line_is_detected() {
        for line in LINES {
            for player in [Player::Zero, Player::One] {
                let mut codes = [EMPTY; 9];
                for &i in &line {
                    codes[i] = player.code();
                }
                assert_eq!(board(codes).outcome(), Outcome::Win(player), "line {:?}", line);
            }
        }
    }

    #[test]
    fn test_draw_detection() {
        // X O X
        // X O O
        // O X X
        let b = board([0, 1, 0, 0, 1, 1, 1, 0, 0]);
        assert_eq!(b.outcome(), Outcome::Draw);
        assert_eq!(b.who_won(), (2, true));
    }

    #[test]
    fn test_win_on_full_board_beats_draw() {
        // X X X
        // O O X
        // X O O
        let b = board([0, 0, 0, 1, 1, 0, 0, 1, 1]);
        assert_eq!(b.outcome(), Outcome::Win(Player::Zero));
        assert_eq!(b.who_won(), (0, true));
    }

    #[test]
    fn test_who_won_in_progress() {
        let b = board([0, 1, 2, 2, 2, 2, 2, 2, 2]);
        assert_eq!(b.who_won(), (2, false));
    }

    #[test]
    fn test_observation_encoding() {
        let b = board([0, 1, 2, 2, 2, 2, 2, 2, 2]);
        assert_eq!(b.observation(), [2, 0, 1, 1, 1, 1, 1, 1, 1]);
        assert_eq!(Board::new().observation(), [OBS_EMPTY; 9]);
    }

    #[test]
    fn test_observation_inverse() {
        let b = board([0, 1, 2, 1, 0, 2, 2, 2, 0]);
        assert_eq!(Board::from_observation(&b.observation()), Some(b));
        assert_eq!(Board::from_observation(&[3; 9]), None);
    }

    #[test]
    fn test_from_codes_rejects_bad_values() {
        assert!(Board::from_codes([3, 2, 2, 2, 2, 2, 2, 2, 2]).is_none());
    }

    #[test]
    fn test_display() {
        let b = board([0, 1, 2, 2, 0, 2, 2, 2, 1]);
        assert_eq!(b.to_string(), "X O .\n. X .\n. . O\n");
    }

    #[test]
    fn test_player_helpers() {
        assert_eq!(Player::Zero.other(), Player::One);
        assert_eq!(Player::from_index(1), Some(Player::One));
        assert_eq!(Player::from_index(2), None);
        assert_eq!(Player::One.to_string(), "Player 1");
    }

    #[test]
    fn test_board_serialization() {
        let b = board([0, 1, 2, 2, 0, 2, 2, 2, 1]);
        let json = serde_json::to_string(&b).unwrap();
        let back: Board = serde_json::from_str(&json).unwrap();
        assert_eq!(b, back);
    }
}
