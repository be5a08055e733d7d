use std::time::{Duration, Instant};

use uuid::Uuid;

/// Per-query trace identity and deadline book-keeping
///
/// Created by the router when a query enters the core and threaded through
/// every stage. Each outbound call derives its own deadline from
/// [`QueryContext::remaining`] so cancellation propagates from one total
/// budget instead of stacking per-stage timeouts.
#[derive(Debug, Clone)]
pub struct QueryContext {
    correlation_id: Uuid,
    started: Instant,
    deadline: Instant,
}

impl QueryContext {
    /// Open a fresh trace with the given total wall-clock budget
    pub fn new(budget: Duration) -> Self {
        let started = Instant::now();
        Self {
            correlation_id: Uuid::new_v4(),
            started,
            deadline: started + budget,
        }
    }

    pub const fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Time spent since the query entered the core
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Budget left for outbound work, `None` once the deadline has fired
    pub fn remaining(&self) -> Option<Duration> {
        let now = Instant::now();
        if now < self.deadline {
            Some(self.deadline - now)
        } else {
            None
        }
    }

    /// Whether the total budget is exhausted
    pub fn expired(&self) -> bool {
        self.remaining().is_none()
    }
}
