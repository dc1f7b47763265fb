//! Sentence position estimation within a playing batch.
//!
//! The provider gives no word-level timestamps, so the estimator maps
//! elapsed audio time to a sentence index. Before the true audio duration is
//! known, per-sentence durations are seeded from a words-per-minute
//! heuristic purely to avoid an undefined state; position reports are
//! suppressed until refinement because spoken duration correlates with
//! character count far better than with the time heuristic.

use crate::batch::BatchPlan;

#[derive(Debug, Clone)]
pub struct PositionEstimator {
    batch_start: usize,
    batch_end: usize,
    offsets: Vec<usize>,
    durations: Vec<f64>,
    total_duration: Option<f64>,
}

impl PositionEstimator {
    /// Seed per-sentence durations from the reading-rate heuristic, scaled by
    /// the playback rate. Never used for position reports once refined.
    pub fn seed(plan: &BatchPlan, batch_sentences: &[String], words_per_minute: f64, rate: f64) -> Self {
        let effective_wpm = (words_per_minute * rate.max(0.1)).max(1.0);
        let durations = batch_sentences
            .iter()
            .map(|sentence| {
                let words = sentence.split_whitespace().count().max(1) as f64;
                words / effective_wpm * 60.0
            })
            .collect();

        Self {
            batch_start: plan.start,
            batch_end: plan.end,
            offsets: plan.offsets.clone(),
            durations,
            total_duration: None,
        }
    }

    /// Re-apportion the true audio duration across sentences proportionally
    /// to their character share. After this, durations sum to `total_secs`.
    pub fn refine(&mut self, total_secs: f64) {
        if total_secs <= 0.0 {
            return;
        }
        let total_chars = *self.offsets.last().unwrap_or(&0);
        if total_chars == 0 {
            return;
        }
        self.durations = self
            .offsets
            .windows(2)
            .map(|pair| (pair[1] - pair[0]) as f64 / total_chars as f64 * total_secs)
            .collect();
        self.total_duration = Some(total_secs);
    }

    pub fn is_refined(&self) -> bool {
        self.total_duration.is_some()
    }

    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Global sentence index being spoken at `elapsed_secs`, or `None` before
    /// refinement. The result is always clamped to the batch bounds.
    pub fn sentence_at(&self, elapsed_secs: f64) -> Option<usize> {
        let total = self.total_duration?;
        if self.batch_start >= self.batch_end {
            return None;
        }

        let progress = (elapsed_secs / total).clamp(0.0, 1.0);
        let total_chars = *self.offsets.last().unwrap_or(&0);
        let char_position = (progress * total_chars as f64).floor() as usize;

        let mut local = self.batch_end - self.batch_start - 1;
        for (idx, pair) in self.offsets.windows(2).enumerate() {
            if char_position >= pair[0] && char_position < pair[1] {
                local = idx;
                break;
            }
        }

        let global = self.batch_start + local;
        Some(global.clamp(self.batch_start, self.batch_end - 1))
    }
}
