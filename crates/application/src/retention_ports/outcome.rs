use dsretain_domain::PurgeBoundary;

/// Whether purge decisions are executed against the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PurgeMode {
    /// Issue delete requests.
    #[default]
    Apply,
    /// Compute boundaries only.
    DryRun,
}

/// Reason a pair was left untouched without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// History already holds no more than the retained count.
    NothingToPurge {
        /// Versions currently present.
        total: usize,
    },
    /// A purge was planned but not issued.
    DryRun {
        /// Boundary the delete request would carry.
        boundary: PurgeBoundary,
        /// Versions the request would remove.
        would_delete: usize,
        /// Whether the newest purged version shares the boundary timestamp.
        shares_boundary_timestamp: bool,
    },
}

impl SkipReason {
    /// Returns stable reason label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NothingToPurge { .. } => "nothing-to-purge",
            Self::DryRun { .. } => "dry-run",
        }
    }
}

/// Reason a pair could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// History could not be fetched or parsed.
    HistoryUnavailable(String),
    /// Store answered the delete request with a non-success status.
    StoreRejected {
        /// Returned status code.
        status: u16,
        /// Response body or description.
        message: String,
    },
    /// Delete request did not complete.
    Transport(String),
}

impl FailureReason {
    /// Returns stable reason label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HistoryUnavailable(_) => "history-unavailable",
            Self::StoreRejected { .. } => "store-rejected",
            Self::Transport(_) => "transport",
        }
    }

    /// Returns the failure detail.
    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::HistoryUnavailable(detail) | Self::Transport(detail) => detail.as_str(),
            Self::StoreRejected { message, .. } => message.as_str(),
        }
    }
}

/// Result of enforcing retention on one object/datastream pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// Store accepted the boundary delete.
    Purged {
        /// Versions expected to be removed, derived from the history.
        deleted_estimate: usize,
        /// Boundary sent with the request.
        boundary: PurgeBoundary,
        /// Store response body.
        store_message: String,
        /// Whether the newest purged version shares the boundary timestamp.
        shares_boundary_timestamp: bool,
    },
    /// Pair needed no delete request.
    Skipped(SkipReason),
    /// Pair could not be processed.
    Failed(FailureReason),
}

impl PurgeOutcome {
    /// Returns stable outcome label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Purged { .. } => "purged",
            Self::Skipped(_) => "skipped",
            Self::Failed(_) => "failed",
        }
    }
}
