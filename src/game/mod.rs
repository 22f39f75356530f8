pub mod format;
pub mod metrics;
pub mod platform;
pub mod stats;
