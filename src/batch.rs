//! Batch planning for synthesis requests.
//!
//! Each provider call carries fixed latency and cost, so sentences are
//! grouped into bounded contiguous batches. Alongside the joined text the
//! planner derives a character-offset table, the sole basis for apportioning
//! real audio duration across sentences once it is known.

/// A contiguous half-open range of sentence indices prepared for synthesis.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    /// Global index of the first sentence in the batch.
    pub start: usize,
    /// One past the global index of the last sentence.
    pub end: usize,
    /// Sentences joined with a single space.
    pub text: String,
    /// Cumulative character counts, one entry per sentence boundary plus a
    /// leading zero. One separator character is counted between adjacent
    /// sentences, so the last entry equals `text` length in characters.
    pub offsets: Vec<usize>,
}

impl BatchPlan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn total_chars(&self) -> usize {
        *self.offsets.last().unwrap_or(&0)
    }
}

/// Plan the next batch of at most `batch_size` sentences starting at
/// `cursor`. Returns `None` once the cursor has passed the end.
pub fn plan(sentences: &[String], cursor: usize, batch_size: usize) -> Option<BatchPlan> {
    let start = cursor.min(sentences.len());
    let end = start.saturating_add(batch_size).min(sentences.len());
    let batch = &sentences[start..end];

    let mut offsets = Vec::with_capacity(batch.len() + 1);
    offsets.push(0usize);
    let mut total = 0usize;
    for (idx, sentence) in batch.iter().enumerate() {
        total += sentence.chars().count();
        if idx + 1 < batch.len() {
            total += 1; // joining separator
        }
        offsets.push(total);
    }

    let plan = BatchPlan {
        start,
        end,
        text: batch.join(" "),
        offsets,
    };
    (!plan.is_empty()).then_some(plan)
}
