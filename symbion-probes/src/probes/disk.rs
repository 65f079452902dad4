//! Single drive space probe: free % of one volume, lower is worse.
//!
//! A drive that is missing or not ready is CRITICAL, not UNKNOWN.

use crate::classify::{classify, Status};
use crate::error::ProbeError;
use crate::metric::{Measurement, Unit};
use crate::probes::Probe;
use crate::providers::{DiskSpace, MetricProvider};
use crate::report::{PerfDatum, Report};
use crate::threshold::{Bounds, Polarity, ThresholdPair};

pub struct DiskProbe<P> {
    target: String,
    provider: P,
    thresholds: ThresholdPair,
}

impl<P> DiskProbe<P>
where
    P: MetricProvider<Output = DiskSpace> + Sync,
{
    pub fn subject_for(target: &str) -> String {
        format!("[{}]", target.trim())
    }

    /// `connect` builds the provider for the validated drive name
    pub fn new(
        raw_target: &str,
        raw_warning: &str,
        raw_critical: &str,
        connect: impl FnOnce(&str) -> P,
    ) -> Result<Self, ProbeError> {
        let target = raw_target.trim();
        if target.is_empty() {
            return Err(ProbeError::InvalidFormat {
                field: "Drive",
                raw: raw_target.to_string(),
            });
        }
        let thresholds = ThresholdPair::parse(
            raw_warning,
            raw_critical,
            Polarity::DescendingBad,
            Bounds::PERCENT,
        )?;

        Ok(Self {
            target: target.to_string(),
            provider: connect(target),
            thresholds,
        })
    }
}

impl<P> Probe for DiskProbe<P>
where
    P: MetricProvider<Output = DiskSpace> + Sync,
{
    fn subject(&self) -> String {
        Self::subject_for(&self.target)
    }

    fn unavailable_status(&self) -> Status {
        Status::Critical
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let space = self.provider.read_once().await?;
        let reading = space.reading();
        let verdict = classify(&reading, &self.thresholds);

        let total = space.total_gib();
        let summary = format!(
            "%Free = {:.2}% Total = {:.2}GB, Used = {:.2}GB, Free = {:.2}GB",
            reading.value,
            total,
            space.used_gib(),
            space.free_gib()
        );

        // Thresholds are percentages; the graphed series is in GB
        let perf = PerfDatum::new("FreeSpace", space.free_gib(), Unit::GiB)
            .with_thresholds(
                total * self.thresholds.warning() * 0.01,
                total * self.thresholds.critical() * 0.01,
            )
            .with_range(0.0, Some(total));

        Ok(Report::new(self.subject(), verdict, summary).with_perf(perf))
    }
}
