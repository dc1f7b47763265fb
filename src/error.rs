//! Error taxonomy for the narration engine.
//!
//! Configuration problems are surfaced before any network attempt, synthesis
//! and playback failures latch the [`crate::governor::FailureGovernor`], and
//! input mistakes are absorbed by the caller-facing API as no-ops.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, NarrationError>;

#[derive(Error, Debug)]
pub enum NarrationError {
    /// Missing credential or voice; no request is ever attempted.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Non-success response or malformed payload from the synthesis provider.
    #[error("Synthesis error (recoverable: {recoverable}): {message}")]
    Synthesis { recoverable: bool, message: String },

    /// The audio resource failed during decode or playback.
    #[error("Playback error: {0}")]
    Playback(String),

    /// Invalid index or empty sentence list handed to the controller.
    #[error("Input error: {0}")]
    Input(String),
}

impl NarrationError {
    /// Whether observing this error must permanently disable synthesis.
    pub fn latches(&self) -> bool {
        matches!(
            self,
            NarrationError::Synthesis { .. } | NarrationError::Playback(_)
        )
    }
}
