//! Provider-health latch: once the synthesis provider fails, further
//! synthesis attempts are disabled for the lifetime of the engine instance.
//! A fresh engine resets the latch.

use crate::error::{NarrationError, Result};
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

#[derive(Clone, Debug, Default)]
pub struct FailureGovernor {
    latched: Arc<AtomicBool>,
}

impl FailureGovernor {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-way transition; there is deliberately no way back.
    pub fn latch(&self) {
        self.latched.store(true, Ordering::Release);
    }

    pub fn is_latched(&self) -> bool {
        self.latched.load(Ordering::Acquire)
    }

    pub fn check(&self, stage: &'static str) -> Result<()> {
        if self.is_latched() {
            return Err(NarrationError::Synthesis {
                recoverable: false,
                message: format!("synthesis disabled after provider failure at stage={stage}"),
            });
        }
        Ok(())
    }
}
