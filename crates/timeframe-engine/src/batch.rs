//! Batch planner -- splits a time range into contiguous sub-ranges of at most
//! `batch_size` periods, e.g. to page through a rate-limited candle API.
//!
//! For `total = floor((end - start) / d)` periods there are
//! `ceil(total / batch_size)` batches. Batch `i` starts at
//! `start + i * batch_size * d` and ends at the start of its last period;
//! the final batch always ends exactly at the caller's `end`.

use serde::{Deserialize, Serialize};

use crate::timeframe::saturate_i64;

/// Default number of periods per batch (one day of minutes, plus one).
pub const DEFAULT_BATCH_SIZE: usize = 1441;

/// One contiguous slice of a planned range, in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub start_time: i64,
    pub end_time: i64,
}

impl Batch {
    pub fn span_ms(&self) -> i64 {
        self.end_time.saturating_sub(self.start_time)
    }
}

/// Lazily yields the batches of a plan in chronological order.
#[derive(Debug, Clone)]
pub struct BatchPlan {
    start_time: i64,
    end_time: i64,
    stride_ms: i128,
    last_offset_ms: i128,
    next_index: i64,
    num_batches: i64,
}

impl BatchPlan {
    /// Plan `[start_time, end_time)` in periods of `duration_ms`.
    ///
    /// A non-positive duration, a zero batch size, or a range shorter than one
    /// period produces an empty plan.
    pub fn new(duration_ms: i64, start_time: i64, end_time: i64, batch_size: usize) -> Self {
        let size = batch_size as i128;
        let (num_batches, stride_ms) = if duration_ms <= 0 || size == 0 {
            (0, 0)
        } else {
            let d = i128::from(duration_ms);
            let span = i128::from(end_time) - i128::from(start_time);
            let total_intervals = span.div_euclid(d);
            let num_batches = if total_intervals <= 0 {
                0
            } else {
                saturate_i64((total_intervals + size - 1) / size)
            };
            (num_batches, size * d)
        };

        Self {
            start_time,
            end_time,
            stride_ms,
            last_offset_ms: stride_ms - i128::from(duration_ms.max(0)),
            next_index: 0,
            num_batches,
        }
    }

    pub fn num_batches(&self) -> usize {
        usize::try_from(self.num_batches).unwrap_or(0)
    }
}

impl Iterator for BatchPlan {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.next_index >= self.num_batches {
            return None;
        }
        let i = self.next_index;
        self.next_index += 1;

        // Every batch starts inside [start_time, end_time], so it fits in i64.
        let start_time = i128::from(self.start_time) + i128::from(i) * self.stride_ms;
        let end_time = if i == self.num_batches - 1 {
            self.end_time
        } else {
            saturate_i64(start_time + self.last_offset_ms)
        };
        Some(Batch {
            start_time: saturate_i64(start_time),
            end_time,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.num_batches - self.next_index).unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for BatchPlan {}

/// Collect a [`BatchPlan`] into a vector.
///
/// # Arguments
/// - `duration_ms` -- Length of one period in milliseconds
/// - `start_time` -- Range start (epoch ms)
/// - `end_time` -- Range end (epoch ms); the last batch ends exactly here
/// - `batch_size` -- Maximum periods per batch (see [`DEFAULT_BATCH_SIZE`])
pub fn plan_batches(
    duration_ms: i64,
    start_time: i64,
    end_time: i64,
    batch_size: usize,
) -> Vec<Batch> {
    let plan = BatchPlan::new(duration_ms, start_time, end_time, batch_size);
    tracing::trace!(
        duration_ms,
        start_time,
        end_time,
        batch_size,
        num_batches = plan.num_batches(),
        "planned batches"
    );
    plan.collect()
}
