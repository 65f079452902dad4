//! Probe pipeline
//!
//! Every probe follows the same path: validate raw arguments (at
//! construction, before any provider call), acquire the metric, classify,
//! and build the report. Each probe only differs by its provider, its
//! polarity and how it words the summary.

pub mod cpu;
pub mod disk;
pub mod eventlog;
pub mod memory;
pub mod port;
pub mod service;
pub mod uptime;

use std::future::Future;
use tracing::{debug, info, warn};

use crate::classify::Status;
use crate::error::{ErrorKind, ProbeError};
use crate::report::Report;

pub use cpu::CpuProbe;
pub use disk::DiskProbe;
pub use eventlog::EventLogProbe;
pub use memory::MemoryProbe;
pub use port::PortProbe;
pub use service::ServiceProbe;
pub use uptime::UptimeProbe;

pub trait Probe {
    /// Text before the status keyword
    fn subject(&self) -> String;

    /// Status for a missing resource; UNKNOWN unless the probe says otherwise
    fn unavailable_status(&self) -> Status {
        Status::Unknown
    }

    /// Acquire, classify and report. Validation already happened.
    fn evaluate(&self) -> impl Future<Output = Result<Report, ProbeError>> + Send;
}

/// Run a constructed probe, turning acquisition errors into a report
pub async fn run<P: Probe>(probe: &P) -> Report {
    match probe.evaluate().await {
        Ok(report) => {
            info!("{} -> {}", report.subject, report.status());
            report
        }
        Err(err) => {
            let status = failure_status(probe, &err);
            warn!("{} failed: {}", probe.subject(), err);
            Report::failure(probe.subject(), status, &err)
        }
    }
}

/// Missing resources take the probe's own status; sampling and late
/// validation failures are UNKNOWN.
fn failure_status<P: Probe>(probe: &P, err: &ProbeError) -> Status {
    match err.kind() {
        ErrorKind::Acquisition if !err.is_sampling_failure() => probe.unavailable_status(),
        ErrorKind::Acquisition => {
            debug!("Sampling failure, no rate available: {}", err);
            Status::Unknown
        }
        ErrorKind::Validation => Status::Unknown,
    }
}

/// Run a probe if its arguments validated; otherwise report UNKNOWN
/// under `subject` without touching any metric source.
pub async fn run_validated<P: Probe>(subject: &str, built: Result<P, ProbeError>) -> Report {
    match built {
        Ok(probe) => run(&probe).await,
        Err(err) => {
            warn!("{}: rejected arguments: {}", subject, err);
            Report::failure(subject, Status::Unknown, &err)
        }
    }
}

/// Round to the two decimals the status line shows
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
