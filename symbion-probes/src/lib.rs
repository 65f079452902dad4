//! Symbion Probes - host health checks for a monitoring supervisor
//!
//! Each probe samples one operating-system metric and prints a single
//! status line with performance data:
//! - Disk free space, memory and processor utilisation (thresholded)
//! - Service run state, TCP port listeners, event occurrences (binary)
//! - System uptime (thresholded, lower is worse)
//!
//! The process exit code carries the verdict: 0 OK, 1 WARNING,
//! 2 CRITICAL, 3 UNKNOWN.

pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod metric;
pub mod probes;
pub mod providers;
pub mod report;
pub mod sampler;
pub mod threshold;

pub use classify::{classify, classify_state, HealthState, Status, Verdict};
pub use config::ProbeConfig;
pub use error::{ErrorKind, ProbeError};
pub use metric::{Measurement, MetricReading, Sample, Unit};
pub use probes::{run, run_validated, Probe};
pub use providers::{MetricProvider, RawCounter};
pub use report::{PerfDatum, Report};
pub use sampler::{sample_rate, Pause, TokioPause};
pub use threshold::{Bounds, Polarity, ThresholdPair};
