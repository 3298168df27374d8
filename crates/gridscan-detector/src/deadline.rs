use std::time::{Duration, Instant};

use crate::result::{BailReason, Stage};

/// Per-frame watchdog checked at stage boundaries.
///
/// Stages are not interrupted mid-way; a frame that overruns its budget
/// bails at the next boundary it reaches. A zero budget bails every frame
/// at the first check.
#[derive(Clone, Copy, Debug)]
pub struct FrameDeadline {
    started: Instant,
    budget: Option<Duration>,
}

impl FrameDeadline {
    pub fn start(budget: Option<Duration>) -> Self {
        Self {
            started: Instant::now(),
            budget,
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Bail if the budget is spent by the time `stage` has finished.
    pub fn check(&self, stage: Stage) -> Result<(), BailReason> {
        let Some(budget) = self.budget else {
            return Ok(());
        };
        let elapsed = self.elapsed();
        if elapsed >= budget {
            return Err(BailReason::DeadlineExceeded {
                stage,
                elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            });
        }
        Ok(())
    }
}
