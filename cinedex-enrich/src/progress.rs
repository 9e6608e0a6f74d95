use tokio::time::{Duration, Instant};

/// Completion counters for one enrichment run. Mutated only by the
/// coordinator as results are reaped; the derived ETA is advisory.
#[derive(Debug)]
pub struct ProgressState {
    total: usize,
    completed: usize,
    started: Instant,
}

impl ProgressState {
    pub fn start(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            started: Instant::now(),
        }
    }

    /// Record one settled work item (success or failure).
    pub fn advance(&mut self) {
        self.completed += 1;
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Estimated time remaining, recomputed from the running average.
    pub fn eta(&self) -> Option<Duration> {
        eta(self.started.elapsed(), self.completed, self.total)
    }
}

/// `elapsed / completed * remaining`. None until the first completion.
pub fn eta(elapsed: Duration, completed: usize, total: usize) -> Option<Duration> {
    if completed == 0 {
        return None;
    }
    let remaining = total.saturating_sub(completed) as u32;
    Some(elapsed / completed as u32 * remaining)
}
