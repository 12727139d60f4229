pub mod collector;
pub mod log_scan;

pub use collector::{CollectorConfig, FirstActivityFallback, SignalCollector};
