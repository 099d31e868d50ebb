//! Step and wall-clock budget for one execution.
//!
//! Every statement and every loop iteration passes through
//! [`StepBudget::checkpoint`], the single place where both limits are
//! enforced.

use super::error::{ExecutionError, RuntimeResult};
use crate::config::ExecutionOptions;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct StepBudget {
    /// Maximum statements plus iterations
    max_steps: u32,
    /// Optional wall-clock limit
    deadline: Option<Duration>,
    /// Steps taken so far
    consumed: u32,
    /// Execution start for wall-clock tracking
    start_time: Instant,
}

impl StepBudget {
    pub fn new(options: &ExecutionOptions) -> Self {
        Self {
            max_steps: options.max_steps,
            deadline: options.deadline(),
            consumed: 0,
            start_time: Instant::now(),
        }
    }

    /// Count one step, then fail if either limit has been exceeded.
    pub fn checkpoint(&mut self) -> RuntimeResult<()> {
        self.consumed = self.consumed.saturating_add(1);
        if self.consumed > self.max_steps {
            return Err(ExecutionError::StepLimitExceeded {
                limit: self.max_steps,
            });
        }
        self.check_deadline()
    }

    /// Deadline-only check; does not count a step.
    pub fn check_deadline(&self) -> RuntimeResult<()> {
        match self.deadline {
            Some(deadline) if self.start_time.elapsed() > deadline => {
                Err(ExecutionError::DeadlineExceeded {
                    deadline_ms: deadline.as_millis() as u64,
                })
            }
            _ => Ok(()),
        }
    }

    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_ceiling() {
        let mut budget = StepBudget::new(&ExecutionOptions::default().with_max_steps(2));
        assert!(budget.checkpoint().is_ok());
        assert!(budget.checkpoint().is_ok());
        assert_eq!(budget.consumed(), 2);
        assert_eq!(
            budget.checkpoint(),
            Err(ExecutionError::StepLimitExceeded { limit: 2 })
        );
        assert_eq!(budget.consumed(), 3);
    }

    #[test]
    fn test_deadline() {
        let budget = StepBudget::new(&ExecutionOptions::default().with_deadline_ms(1));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(
            budget.check_deadline(),
            Err(ExecutionError::DeadlineExceeded { deadline_ms: 1 })
        );
    }

    #[test]
    fn test_no_deadline_never_expires() {
        let mut budget = StepBudget::new(&ExecutionOptions::default());
        for _ in 0..100 {
            assert!(budget.checkpoint().is_ok());
        }
        assert!(budget.check_deadline().is_ok());
    }
}
