//! Fixed-window median filter for noisy analog inputs.
//!
//! Keeps the last [`WINDOW`] accepted samples in a ring and reports the
//! median of the current window. Raw values are clamped to the sensor's
//! valid range before insertion; the [`INVALID_RAW`](super::INVALID_RAW)
//! sentinel is rejected outright and the previous output is held.

use super::{ConditionedSample, INVALID_RAW};

/// Window length. Odd, so the median is always a real sample — no
/// tie-breaking or averaging needed.
pub const WINDOW: usize = 5;

pub struct MedianFilter {
    window: [i32; WINDOW],
    head: usize,
    count: usize,
    valid_min: i32,
    valid_max: i32,
    last_output: i32,
    rejected_last: bool,
}

impl MedianFilter {
    pub fn new(valid_min: i32, valid_max: i32) -> Self {
        Self {
            window: [0; WINDOW],
            head: 0,
            count: 0,
            valid_min,
            valid_max,
            last_output: 0,
            rejected_last: false,
        }
    }

    /// Feed one raw sample and return the conditioned output.
    ///
    /// A rejected sample holds the previous output; `stable` stays `false`
    /// only until the first sample has been accepted.
    pub fn update(&mut self, raw: i32) -> ConditionedSample {
        if raw == INVALID_RAW {
            self.rejected_last = true;
            return ConditionedSample {
                value: self.last_output,
                stable: self.count > 0,
            };
        }
        self.rejected_last = false;

        let clamped = raw.clamp(self.valid_min, self.valid_max);
        self.window[self.head] = clamped;
        self.head = (self.head + 1) % WINDOW;
        if self.count < WINDOW {
            self.count += 1;
        }

        self.last_output = self.median();
        ConditionedSample {
            value: self.last_output,
            stable: true,
        }
    }

    /// True if the most recent raw sample was a rejected sentinel.
    pub fn rejected_last(&self) -> bool {
        self.rejected_last
    }

    /// Latest conditioned value (held output when rejecting).
    pub fn output(&self) -> i32 {
        self.last_output
    }

    fn median(&self) -> i32 {
        let mut sorted = [0; WINDOW];
        sorted[..self.count].copy_from_slice(&self.window[..self.count]);
        // During warm-up only the first `count` slots are populated; the
        // ring layout does not matter for a median.
        sorted[..self.count].sort_unstable();
        sorted[self.count / 2]
    }
}
