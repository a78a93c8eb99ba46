//! Ten-pin scoring.
//!
//! `ScoreState` records every throw in order and derives frame scores on
//! demand. A frame's score is final only once the throws it depends on exist:
//! an open frame needs its own two throws, a spare needs one more throw, a
//! strike needs two more. Until then the frame is pending and contributes only
//! its raw pin count to the running score.

use serde::{Deserialize, Serialize};

pub const FRAME_COUNT: usize = 10;
pub const LAST_FRAME: usize = FRAME_COUNT - 1;
pub const PINS_PER_RACK: u8 = 10;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreState {
    frame_number: usize,
    throws_this_frame: usize,
    /// Every recorded throw, in order
    pin_falls: Vec<u8>,
    /// Index into `pin_falls` of each started frame's first throw
    frame_starts: Vec<usize>,
    game_over: bool,
}

impl ScoreState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the number of pins knocked down by one throw.
    ///
    /// Counts larger than the pins still standing in the frame are clamped.
    /// Throws after the game is over are ignored.
    pub fn add_throw_result(&mut self, pins: u8) {
        if self.game_over {
            return;
        }

        let pins = pins.min(self.pins_remaining());
        if self.throws_this_frame == 0 {
            self.frame_starts.push(self.pin_falls.len());
        }
        self.pin_falls.push(pins);
        self.throws_this_frame += 1;

        if self.current_frame_complete() {
            if self.frame_number == LAST_FRAME {
                self.game_over = true;
            } else {
                self.frame_number += 1;
                self.throws_this_frame = 0;
            }
        }
    }

    /// Zero-based index of the active frame, never above `LAST_FRAME`.
    pub fn frame_number(&self) -> usize {
        self.frame_number
    }

    pub fn throws_this_frame(&self) -> usize {
        self.throws_this_frame
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn pin_falls(&self) -> &[u8] {
        &self.pin_falls
    }

    /// Throws recorded in frame `index` (empty if the frame has not started).
    pub fn frame_throws(&self, index: usize) -> &[u8] {
        let Some(&start) = self.frame_starts.get(index) else {
            return &[];
        };
        let end = self
            .frame_starts
            .get(index + 1)
            .copied()
            .unwrap_or(self.pin_falls.len());
        &self.pin_falls[start..end]
    }

    /// Pins available to the next ball of the active frame.
    pub fn pins_remaining(&self) -> u8 {
        if self.game_over {
            return 0;
        }
        let throws = if self.throws_this_frame == 0 {
            &[][..]
        } else {
            self.frame_throws(self.frame_number)
        };
        match *throws {
            [] => PINS_PER_RACK,
            [first] if first == PINS_PER_RACK => PINS_PER_RACK,
            [first] => PINS_PER_RACK - first,
            // Only the last frame gets here with two throws and a ball left.
            [first, second] if first == PINS_PER_RACK => {
                if second == PINS_PER_RACK {
                    PINS_PER_RACK
                } else {
                    PINS_PER_RACK - second
                }
            }
            [first, second] if first + second == PINS_PER_RACK => PINS_PER_RACK,
            _ => 0,
        }
    }

    /// Finalized score of frame `index`, or None while it is pending.
    pub fn frame_score(&self, index: usize) -> Option<u32> {
        let throws = self.frame_throws(index);
        let &first = throws.first()?;

        if index == LAST_FRAME {
            // Bonus balls live inside the last frame itself.
            return self
                .game_over
                .then(|| throws.iter().map(|&p| p as u32).sum());
        }

        let start = self.frame_starts[index];
        let needs_bonus = first == PINS_PER_RACK
            || (throws.len() == 2 && first + throws[1] == PINS_PER_RACK);
        if needs_bonus {
            let window = self.pin_falls.get(start..start + 3)?;
            Some(window.iter().map(|&p| p as u32).sum())
        } else if throws.len() == 2 {
            Some(first as u32 + throws[1] as u32)
        } else {
            None
        }
    }

    /// Finalized running total through frame `index`.
    pub fn cumulative_score(&self, index: usize) -> Option<u32> {
        (0..=index.min(LAST_FRAME))
            .map(|i| self.frame_score(i))
            .sum()
    }

    /// Running score: finalized frames plus the raw pins of pending frames.
    pub fn score(&self) -> u32 {
        (0..self.frame_starts.len())
            .map(|i| {
                self.frame_score(i).unwrap_or_else(|| {
                    self.frame_throws(i).iter().map(|&p| p as u32).sum()
                })
            })
            .sum()
    }

    fn current_frame_complete(&self) -> bool {
        let throws = self.frame_throws(self.frame_number);
        if self.frame_number < LAST_FRAME {
            return matches!(*throws, [PINS_PER_RACK] | [_, _]);
        }
        match *throws {
            [first, second] => first != PINS_PER_RACK && first + second < PINS_PER_RACK,
            [_, _, _] => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bowl(throws: &[u8]) -> ScoreState {
        let mut scores = ScoreState::new();
        for &pins in throws {
            scores.add_throw_result(pins);
        }
        scores
    }

    #[test]
    fn perfect_game_scores_300() {
        let scores = bowl(&[10; 12]);
        assert!(scores.game_over());
        assert_eq!(scores.score(), 300);
        assert_eq!(scores.cumulative_score(LAST_FRAME), Some(300));
        assert_eq!(scores.frame_number(), LAST_FRAME);
    }

    #[test]
    fn eleven_strikes_is_not_over() {
        let scores = bowl(&[10; 11]);
        assert!(!scores.game_over());
        assert_eq!(scores.frame_score(LAST_FRAME), None);
        assert_eq!(scores.frame_score(8), Some(30));
    }

    #[test]
    fn spare_resolves_only_after_next_throw() {
        let mut scores = bowl(&[5, 5]);
        assert_eq!(scores.frame_number(), 1);
        assert_eq!(scores.frame_score(0), None);
        assert_eq!(scores.score(), 10);

        scores.add_throw_result(3);
        assert_eq!(scores.frame_score(0), Some(13));
        assert_eq!(scores.frame_score(1), None);
    }

    #[test]
    fn strike_waits_for_two_throws() {
        let mut scores = bowl(&[10, 4]);
        assert_eq!(scores.frame_score(0), None);
        scores.add_throw_result(3);
        assert_eq!(scores.frame_score(0), Some(17));
        assert_eq!(scores.frame_score(1), Some(7));
        assert_eq!(scores.cumulative_score(1), Some(24));
    }

    #[test]
    fn double_strike_bonus_spans_frames() {
        let scores = bowl(&[10, 10, 2]);
        assert_eq!(scores.frame_score(0), Some(22));
        assert_eq!(scores.frame_score(1), None);
        assert_eq!(scores.frame_number(), 2);
    }

    #[test]
    fn double_gutter_advances_frame_with_zero() {
        let scores = bowl(&[0, 0]);
        assert_eq!(scores.frame_number(), 1);
        assert_eq!(scores.throws_this_frame(), 0);
        assert_eq!(scores.frame_score(0), Some(0));
    }

    #[test]
    fn gutter_game() {
        let scores = bowl(&[0; 20]);
        assert!(scores.game_over());
        assert_eq!(scores.score(), 0);
    }

    #[test]
    fn all_fives_score_150() {
        let scores = bowl(&[5; 21]);
        assert!(scores.game_over());
        assert_eq!(scores.score(), 150);
    }

    #[test]
    fn second_throw_is_clamped_to_standing_pins() {
        let scores = bowl(&[7, 5]);
        assert_eq!(scores.frame_throws(0), &[7, 3]);
        assert_eq!(scores.frame_score(0), None, "clamped frame is a spare");
    }

    #[test]
    fn oversized_throw_is_clamped_to_rack() {
        let scores = bowl(&[14]);
        assert_eq!(scores.pin_falls(), &[10]);
        assert_eq!(scores.frame_number(), 1);
    }

    #[test]
    fn open_tenth_frame_ends_after_two_throws() {
        let mut throws = vec![0; 18];
        throws.extend([3, 4]);
        let scores = bowl(&throws);
        assert!(scores.game_over());
        assert_eq!(scores.frame_throws(LAST_FRAME), &[3, 4]);
        assert_eq!(scores.score(), 7);
    }

    #[test]
    fn tenth_frame_spare_earns_bonus_ball() {
        let mut throws = vec![0; 18];
        throws.extend([5, 5]);
        let mut scores = bowl(&throws);
        assert!(!scores.game_over());
        assert_eq!(scores.pins_remaining(), 10);
        scores.add_throw_result(10);
        assert!(scores.game_over());
        assert_eq!(scores.frame_score(LAST_FRAME), Some(20));
    }

    #[test]
    fn tenth_frame_strike_then_partial_rack() {
        let mut throws = vec![0; 18];
        throws.extend([10, 6]);
        let mut scores = bowl(&throws);
        assert!(!scores.game_over());
        assert_eq!(scores.pins_remaining(), 4);
        scores.add_throw_result(9);
        assert_eq!(scores.frame_throws(LAST_FRAME), &[10, 6, 4]);
        assert!(scores.game_over());
        assert_eq!(scores.score(), 20);
    }

    #[test]
    fn throws_after_game_over_are_ignored() {
        let mut scores = bowl(&[10; 12]);
        scores.add_throw_result(10);
        assert_eq!(scores.pin_falls().len(), 12);
        assert_eq!(scores.score(), 300);
        assert_eq!(scores.pins_remaining(), 0);
    }

    #[test]
    fn frame_advances_only_when_budget_exhausted() {
        // Every legal open/spare/strike first frame, repeated through the game.
        for first in 0..=10u8 {
            for second in 0..=(10 - first) {
                let mut scores = ScoreState::new();
                let mut prev_frame = 0;
                for _ in 0..30 {
                    if scores.game_over() {
                        break;
                    }
                    let throws_before = scores.throws_this_frame();
                    let pins = if throws_before == 0 { first } else { second };
                    scores.add_throw_result(pins);

                    let frame = scores.frame_number();
                    assert!(frame <= LAST_FRAME);
                    assert!(frame >= prev_frame);
                    if frame != prev_frame {
                        assert_eq!(frame, prev_frame + 1);
                        let done = scores.frame_throws(prev_frame);
                        assert!(done == [10] || done.len() == 2, "{:?}", done);
                    }
                    prev_frame = frame;
                }
                assert!(scores.game_over());
                assert!(scores.frame_throws(LAST_FRAME).len() <= 3);
            }
        }
    }
}
