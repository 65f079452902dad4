//! Rate sampling
//!
//! A rate metric is only defined over an interval: read the counter, wait a
//! fixed interval, read it again, and derive the busy percentage from the
//! two samples. The wait goes through `Pause` so tests never sleep.

use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::ProbeError;
use crate::metric::{MetricReading, Sample};
use crate::providers::RawCounter;

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(1000);

/// Suspends the probe between the two samples
pub trait Pause {
    fn pause(&self, interval: Duration) -> impl Future<Output = ()> + Send;
}

/// Production pause backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioPause;

impl Pause for TokioPause {
    async fn pause(&self, interval: Duration) {
        tokio::time::sleep(interval).await;
    }
}

/// Two-phase rate acquisition: sample, pause, sample, derive.
pub async fn sample_rate<C, P>(
    counter: &C,
    pause: &P,
    interval: Duration,
) -> Result<MetricReading, ProbeError>
where
    C: RawCounter + ?Sized,
    P: Pause + ?Sized,
{
    let first = counter.read_raw().await.map_err(into_sampling_error)?;
    pause.pause(interval).await;
    let second = counter.read_raw().await.map_err(into_sampling_error)?;

    let percent = busy_percent(first, second)?;
    debug!(
        "Sampled {:?} -> {:?} over {:?}: {:.2}%",
        first, second, interval, percent
    );
    Ok(MetricReading::percent(percent))
}

/// Busy share of the window between two samples, clamped to 0..=100.
///
/// `raw_value` counts idle ticks, so busy = 1 - d(idle) / d(ticks).
pub fn busy_percent(first: Sample, second: Sample) -> Result<f64, ProbeError> {
    let elapsed = second.timestamp_ticks - first.timestamp_ticks;
    if elapsed == 0 {
        return Err(ProbeError::DegenerateInterval(first.timestamp_ticks));
    }
    if elapsed < 0 {
        return Err(ProbeError::SamplingError(format!(
            "tick clock went backwards ({} -> {})",
            first.timestamp_ticks, second.timestamp_ticks
        )));
    }

    let idle = (second.raw_value - first.raw_value) as f64;
    let busy_fraction = 1.0 - idle / elapsed as f64;
    Ok((busy_fraction * 100.0).clamp(0.0, 100.0))
}

// Missing instances stay ResourceUnavailable so probes can report them as such
fn into_sampling_error(err: ProbeError) -> ProbeError {
    match err {
        ProbeError::ResourceUnavailable { .. } | ProbeError::SamplingError(_) => err,
        other => ProbeError::SamplingError(other.to_string()),
    }
}
