//! Metric providers
//!
//! Narrow capability interfaces over the host's metric sources:
//! - `MetricProvider` for single-read metrics (disk, memory, uptime, service,
//!   port, event presence)
//! - `RawCounter` for rate metrics read twice by the sampler (CPU)
//!
//! Providers perform exactly one external read per call and never retry.

pub mod cpu;
pub mod disk;
pub mod eventlog;
pub mod memory;
pub mod port;
pub mod service;
pub mod uptime;

use std::future::Future;
use std::time::Duration;
use tokio::process::Command as AsyncCommand;
use tracing::debug;

use crate::error::ProbeError;
use crate::metric::Sample;

pub use cpu::{CpuInstance, ProcStatCounter};
pub use disk::{DiskSpace, SysinfoDisk};
pub use eventlog::{EventPresence, EventQuery, JournalEvents};
pub use memory::{MemoryStats, SysinfoMemory};
pub use port::{PortState, PortStatus, ProcNetListeners};
pub use service::{ServiceState, ServiceStatus, SystemdService};
pub use uptime::{BootClock, Uptime};

/// Single-read metric source
pub trait MetricProvider {
    type Output;

    fn read_once(&self) -> impl Future<Output = Result<Self::Output, ProbeError>> + Send;
}

/// Monotonic counter source for rate metrics
pub trait RawCounter {
    fn read_raw(&self) -> impl Future<Output = Result<Sample, ProbeError>> + Send;
}

/// Host name used in summaries
pub fn hostname() -> String {
    gethostname::gethostname().to_string_lossy().to_string()
}

/// Run an external query command with a time limit, returning stdout.
///
/// `resource` names what is being queried, for error messages.
pub(crate) async fn run_query(
    resource: &str,
    program: &str,
    args: &[String],
    timeout: Duration,
) -> Result<String, ProbeError> {
    debug!("Querying {} via {} {:?}", resource, program, args);

    let output = tokio::time::timeout(
        timeout,
        AsyncCommand::new(program)
            .args(args)
            .kill_on_drop(true)
            .output(),
    )
    .await
    .map_err(|_| {
        ProbeError::unavailable(resource, format!("{} timed out after {:?}", program, timeout))
    })?
    .map_err(|e| ProbeError::unavailable(resource, format!("failed to run {}: {}", program, e)))?;

    if !output.status.success() && output.stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProbeError::unavailable(
            resource,
            format!(
                "{} exited with {}: {}",
                program,
                output.status.code().unwrap_or(-1),
                stderr.trim()
            ),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
