mod discovery;
mod history;
mod observer;
mod outcome;
mod purge;
mod run;

pub use discovery::ObjectIndex;
pub use history::VersionHistorySource;
pub use observer::{DatastreamProgress, PairProgress, RetentionRunObserver};
pub use outcome::{FailureReason, PurgeMode, PurgeOutcome, SkipReason};
pub use purge::{PurgeReceipt, VersionPurger};
pub use run::{RetentionRunRequest, RunSummary};
