/// Crawl state definitions for tracking a run's lifecycle
///
/// A run moves from `Idle` to `Running` once, and from `Running` to exactly
/// one terminal state.
use std::fmt;

/// Represents the lifecycle state of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlState {
    /// Created but not started
    Idle,

    /// Pulling listing pages and processing candidates
    Running,

    // ===== Terminal States =====
    /// The listing was exhausted or the crawl budget was met
    Completed,

    /// An external stop signal ended the run early
    Interrupted,

    /// A fatal condition ended the run (listing unreachable, output failure)
    Aborted,
}

impl CrawlState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Interrupted | Self::Aborted)
    }

    /// Returns true if the run finished every unit it set out to do
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: CrawlState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Interrupted)
                | (Self::Running, Self::Aborted)
        )
    }

    /// Process exit status reported for this state
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Completed => 0,
            Self::Interrupted => 130,
            Self::Idle | Self::Running | Self::Aborted => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
