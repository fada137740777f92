//! Winner Selection
//!
//! Pure weighted draw over participant weights. Each random word is reduced
//! modulo the remaining total weight and located with an upper-bound search
//! over the cumulative weights; the winner is then removed so later words
//! cannot pick them again.
//!
//! ```text
//! weights:     [15,  5, 15,  5, 15,  5, 15]
//! cumulative:  [15, 20, 35, 40, 55, 60, 75]
//! target 14 -> 0, target 15 -> 1, target 20 -> 2, target 74 -> 6
//! ```

use crate::errors::{JackpotError, JackpotResult};
use crate::math::reduce_word;
use crate::types::{Address, RandomWord};
use crate::Vec;

/// Candidate pool for successive draws without replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeightedDraw {
    candidates: Vec<(Address, u128)>,
    cumulative: Vec<u128>,
}

impl WeightedDraw {
    /// Build a draw over `(participant, weight)` pairs, in the given order
    pub fn new(candidates: Vec<(Address, u128)>) -> JackpotResult<Self> {
        let mut draw = Self {
            candidates,
            cumulative: Vec::new(),
        };
        draw.rebuild()?;
        Ok(draw)
    }

    fn rebuild(&mut self) -> JackpotResult<()> {
        self.cumulative.clear();
        let mut running = 0u128;
        for (_, weight) in &self.candidates {
            running = running.checked_add(*weight).ok_or(JackpotError::Overflow)?;
            self.cumulative.push(running);
        }
        Ok(())
    }

    /// Remaining weight
    pub fn total_weight(&self) -> u128 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Candidates that can still be drawn (non-zero weight)
    pub fn remaining(&self) -> usize {
        self.candidates.iter().filter(|(_, w)| *w > 0).count()
    }

    /// Index selected by a target in `[0, total_weight)`
    pub fn locate(&self, target: u128) -> usize {
        self.cumulative.partition_point(|c| *c <= target)
    }

    /// Draw one winner and remove it
    ///
    /// Returns `None` once no weight remains.
    pub fn draw(&mut self, word: &RandomWord) -> JackpotResult<Option<(Address, u128)>> {
        let total = self.total_weight();
        if total == 0 {
            return Ok(None);
        }

        let target = reduce_word(word, total)?;
        let index = self.locate(target);
        if index >= self.candidates.len() {
            return Err(JackpotError::Overflow);
        }

        let winner = self.candidates.remove(index);
        self.rebuild()?;
        Ok(Some(winner))
    }

    /// Draw one winner per word, stopping once every candidate is drawn
    pub fn draw_many(&mut self, words: &[RandomWord]) -> JackpotResult<Vec<Address>> {
        let mut winners = Vec::with_capacity(words.len());
        for word in words {
            match self.draw(word)? {
                Some((participant, _)) => winners.push(participant),
                None => break,
            }
        }
        Ok(winners)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn select_winners(candidates: Vec<(Address, u128)>, words: &[RandomWord]) -> JackpotResult<Vec<Address>> {
        WeightedDraw::new(candidates)?.draw_many(words)
    }

    fn addr(n: u8) -> Address {
        [n; 32]
    }

    fn word(value: u64) -> RandomWord {
        let mut w = [0u8; 32];
        w[24..].copy_from_slice(&value.to_be_bytes());
        w
    }

    fn alternating() -> Vec<(Address, u128)> {
        [15u128, 5, 15, 5, 15, 5, 15]
            .iter()
            .enumerate()
            .map(|(i, w)| (addr(i as u8), *w))
            .collect()
    }

    #[test]
    fn test_upper_bound_search() {
        let draw = WeightedDraw::new(alternating()).unwrap();
        assert_eq!(draw.total_weight(), 75);

        let expected = [(0, 0), (14, 0), (15, 1), (19, 1), (20, 2), (34, 2), (35, 3), (60, 6), (74, 6)];
        for (target, index) in expected {
            assert_eq!(draw.locate(target), index, "target {}", target);
        }
    }

    #[test]
    fn test_every_target_hits_its_bucket() {
        let draw = WeightedDraw::new(alternating()).unwrap();
        let mut counts = [0u128; 7];
        for target in 0..75 {
            counts[draw.locate(target)] += 1;
        }
        assert_eq!(counts, [15, 5, 15, 5, 15, 5, 15]);
    }

    #[test]
    fn test_draw_removes_winner() {
        let mut draw = WeightedDraw::new(alternating()).unwrap();
        let (first, weight) = draw.draw(&word(20)).unwrap().unwrap();
        assert_eq!(first, addr(2));
        assert_eq!(weight, 15);
        assert_eq!(draw.total_weight(), 60);

        // same target now lands on the next candidate
        let (second, _) = draw.draw(&word(20)).unwrap().unwrap();
        assert_eq!(second, addr(3));
    }

    #[test]
    fn test_zero_weight_never_selected() {
        let candidates = vec![(addr(1), 5), (addr(2), 0), (addr(3), 5)];
        let winners = select_winners(candidates, &[word(5), word(0), word(0)]).unwrap();
        assert_eq!(winners, vec![addr(3), addr(1)]);
    }

    #[test]
    fn test_winners_are_distinct() {
        let words: Vec<RandomWord> = (0..7u64).map(|i| word(i * 7_919)).collect();
        let winners = select_winners(alternating(), &words).unwrap();
        assert_eq!(winners.len(), 7);
        let unique: BTreeSet<_> = winners.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_more_words_than_candidates() {
        let candidates = vec![(addr(1), 10), (addr(2), 10)];
        let winners = select_winners(candidates, &[word(3), word(3), word(3)]).unwrap();
        assert_eq!(winners.len(), 2);
    }

    #[test]
    fn test_remaining_counts_drawable_candidates() {
        let mut draw = WeightedDraw::new(vec![(addr(1), 10), (addr(2), 0), (addr(3), 10)]).unwrap();
        assert_eq!(draw.remaining(), 2);

        let winners = draw.draw_many(&[word(4)]).unwrap();
        assert_eq!(winners, vec![addr(1)]);
        assert_eq!(draw.remaining(), 1);

        draw.draw_many(&[word(4), word(4)]).unwrap();
        assert_eq!(draw.remaining(), 0);
    }

    #[test]
    fn test_empty_candidates() {
        let winners = select_winners(Vec::new(), &[word(1)]).unwrap();
        assert!(winners.is_empty());
    }
}
