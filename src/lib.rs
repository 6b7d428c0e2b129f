pub mod api;
pub mod fixture;
pub mod report;
pub mod scenario;
pub mod utils;

// Re-export common items
pub use report::{RunAggregator, RunObserver};
pub use scenario::run_all;
