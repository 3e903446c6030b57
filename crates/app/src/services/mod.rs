pub mod aggregator;
pub mod dispatcher;
pub mod limiter;
pub mod worker;

// Re-exports
pub use aggregator::{RunOutcome, StateAggregator};
pub use dispatcher::Dispatcher;
pub use limiter::{ConcurrencyLimiter, Permit};
pub use worker::Worker;
