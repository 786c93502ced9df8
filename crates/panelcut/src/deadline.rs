use std::time::{Duration, Instant};

use crate::error::{PanelError, Result};

/// Time budget for one page, checked cooperatively between and inside stages.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    limit: Option<(Instant, Duration)>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn unbounded() -> Self {
        Self { limit: None }
    }

    /// Expires `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            limit: Some((Instant::now() + budget, budget)),
        }
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.limit, Some((at, _)) if Instant::now() >= at)
    }

    pub fn check(&self) -> Result<()> {
        match self.limit {
            Some((at, budget)) if Instant::now() >= at => Err(PanelError::TimedOut { budget }),
            _ => Ok(()),
        }
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::unbounded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unbounded_never_expires() {
        assert!(Deadline::unbounded().check().is_ok());
    }

    #[test]
    fn test_zero_budget_expires_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        assert!(deadline.is_expired());
        assert!(matches!(deadline.check(), Err(PanelError::TimedOut { budget }) if budget == Duration::ZERO));
    }

    #[test]
    fn test_generous_budget_passes() {
        assert!(Deadline::after(Duration::from_secs(3600)).check().is_ok());
    }
}
