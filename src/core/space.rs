//! Action and observation spaces.
//!
//! - `Discrete(n)`: integers `0..n` (the 9 board cells)
//! - `MultiDiscrete(nvec)`: one integer per slot, slot `i` in `0..nvec[i]`

use serde::{Deserialize, Serialize};

use super::board::BOARD_CELLS;
use super::rng::EnvRng;

/// A finite set of integer actions `0..n`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discrete {
    pub n: usize,
}

impl Discrete {
    #[must_use]
    pub const fn new(n: usize) -> Self {
        Self { n }
    }

    #[must_use]
    pub fn contains(&self, action: usize) -> bool {
        action < self.n
    }

    /// Uniform sample; `None` for an empty space.
    pub fn sample(&self, rng: &mut EnvRng) -> Option<usize> {
        (self.n > 0).then(|| rng.gen_range_usize(0..self.n))
    }
}

/// A vector of independent discrete slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiDiscrete {
    pub nvec: Vec<usize>,
}

impl MultiDiscrete {
    #[must_use]
    pub fn new(nvec: Vec<usize>) -> Self {
        Self { nvec }
    }

    /// The board observation space: 9 slots of 3 values.
    #[must_use]
    pub fn board() -> Self {
        Self::new(vec![3; BOARD_CELLS])
    }

    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        vec![self.nvec.len()]
    }

    #[must_use]
    pub fn contains(&self, values: &[u8]) -> bool {
        values.len() == self.nvec.len()
            && values
                .iter()
                .zip(&self.nvec)
                .all(|(&v, &n)| (v as usize) < n)
    }

    /// Sample every slot independently. Slots with `n == 0` read as 0.
    pub fn sample(&self, rng: &mut EnvRng) -> Vec<u8> {
        self.nvec
            .iter()
            .map(|&n| if n == 0 { 0 } else { rng.gen_range_usize(0..n) as u8 })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discrete_contains() {
        let space = Discrete::new(9);
        assert!(space.contains(0));
        assert!(space.contains(8));
        assert!(!space.contains(9));
    }

    #[test]
    fn test_discrete_sample_in_range() {
        let space = Discrete::new(9);
        let mut rng = EnvRng::new(3);
        for _ in 0..100 {
            let a = space.sample(&mut rng).unwrap();
            assert!(space.contains(a));
        }
        assert_eq!(Discrete::new(0).sample(&mut rng), None);
    }

    #[test]
    fn test_multi_discrete_board() {
        let space = MultiDiscrete::board();
        assert_eq!(space.shape(), vec![9]);
        assert!(space.contains(&[1; 9]));
        assert!(!space.contains(&[3, 1, 1, 1, 1, 1, 1, 1, 1]));
        assert!(!space.contains(&[1; 8]));
    }

    #[test]
    fn test_multi_discrete_sample() {
        let space = MultiDiscrete::board();
        let mut rng = EnvRng::new(11);
        for _ in 0..50 {
            assert!(space.contains(&space.sample(&mut rng)));
        }
    }
}
