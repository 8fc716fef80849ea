use std::fmt;

/// Workload of one node at one point in time.
///
/// Field order is the ranking order: the derived `Ord` compares
/// `(running, queued, total)` lexicographically, so the minimum is the least-loaded node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadSample {
    /// Tasks currently being processed.
    pub running: u32,
    /// Tasks waiting for a processing slot.
    pub queued: u32,
    /// All tasks the node reports, whatever their state.
    pub total: u32,
}

impl LoadSample {
    pub fn new(running: u32, queued: u32, total: u32) -> Self {
        Self {
            running,
            queued,
            total,
        }
    }
}

impl fmt::Display for LoadSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "running={} queued={} total={}",
            self.running, self.queued, self.total
        )
    }
}
