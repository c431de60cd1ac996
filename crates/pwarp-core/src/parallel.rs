//! Execution policy for batch calls.

/// How a batch call spreads its independent work items.
///
/// Trials (or sparse queries) never depend on each other and every worker
/// writes a disjoint set of output rows, so both policies produce identical
/// results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Parallelism {
    /// Run on the calling thread. Preferred when the caller already
    /// parallelizes at a coarser level.
    #[default]
    Serial,
    /// Run on the global rayon thread pool.
    Rayon,
}

impl Parallelism {
    /// `Rayon` when `parallel` is set, `Serial` otherwise.
    pub fn from_flag(parallel: bool) -> Self {
        if parallel {
            Self::Rayon
        } else {
            Self::Serial
        }
    }

    pub fn is_parallel(self) -> bool {
        matches!(self, Self::Rayon)
    }
}
