pub mod aggregator;
pub mod forward;
pub mod json;
pub mod junit;
pub mod message;
pub mod notify;
pub mod types;

pub use aggregator::RunAggregator;
pub use notify::NotificationDispatcher;
pub use types::{RunReport, RunSummary, TestOutcome, TestStatus};

/// Observer of one run's lifecycle, invoked by the scenario driver.
///
/// `begin` once at run start, `on_outcome` once per finished test case (from
/// concurrent tasks), `end` once at run completion, yielding the frozen report.
pub trait RunObserver: Send + Sync {
    fn begin(&self);
    fn on_outcome(&self, outcome: &TestOutcome);
    fn end(&self) -> RunReport;
}
