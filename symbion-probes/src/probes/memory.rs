//! Memory utilisation probe: used % of physical memory, higher is worse

use crate::classify::classify;
use crate::error::ProbeError;
use crate::metric::{Measurement, Unit};
use crate::probes::Probe;
use crate::providers::{MemoryStats, MetricProvider};
use crate::report::{PerfDatum, Report};
use crate::threshold::{Bounds, Polarity, ThresholdPair};

pub struct MemoryProbe<P> {
    provider: P,
    thresholds: ThresholdPair,
}

impl<P> MemoryProbe<P>
where
    P: MetricProvider<Output = MemoryStats> + Sync,
{
    pub const SUBJECT: &'static str = "Memory";

    pub fn new(raw_warning: &str, raw_critical: &str, provider: P) -> Result<Self, ProbeError> {
        let thresholds =
            ThresholdPair::parse(raw_warning, raw_critical, Polarity::AscendingBad, Bounds::PERCENT)?;
        Ok(Self {
            provider,
            thresholds,
        })
    }
}

impl<P> Probe for MemoryProbe<P>
where
    P: MetricProvider<Output = MemoryStats> + Sync,
{
    fn subject(&self) -> String {
        Self::SUBJECT.to_string()
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let stats = self.provider.read_once().await?;
        let reading = stats.reading();
        let verdict = classify(&reading, &self.thresholds);

        let summary = format!(
            "% Used = {:.2}%, Total = {:.2}MB, Free = {:.2}MB, Used = {:.2}MB",
            stats.used_percent(),
            stats.total_mib as f64,
            stats.free_mib as f64,
            stats.used_mib() as f64
        );

        Ok(Report::new(Self::SUBJECT, verdict, summary)
            .with_perf(PerfDatum::from_reading("Memory_Used", &reading, &self.thresholds))
            .with_perf(
                PerfDatum::new("Memory_Free", stats.free_percent(), Unit::Percent)
                    .with_range(0.0, Some(100.0)),
            ))
    }
}
