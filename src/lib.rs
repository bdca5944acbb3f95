//! Window activity sampling and time attribution.
//!
//! A periodic sampler reads two platform queries (current focus label, time
//! since last input), classifies each tick as idle or active, and attributes
//! elapsed wall-clock time to whichever label held focus. Consumers read the
//! results through two drains: a chronological change log and a per-label
//! duration table.

pub mod error;
pub mod idle;
pub mod platform;
pub mod report;
pub mod sampler;
pub mod tracker;

pub use error::Error;
pub use idle::{IdleDetector, IdleState};
pub use sampler::{SamplerConfig, SamplerService};
pub use tracker::{ActivityTracker, AggregateEntry, FocusLabel, LogEntry};
