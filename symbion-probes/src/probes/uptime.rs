//! System uptime probe: minutes since boot, lower is worse.
//!
//! A CRITICAL uptime means the host came back from a shutdown or restart
//! inside the critical window; WARNING means it restarted recently.

use crate::classify::{classify, Status};
use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading};
use crate::probes::{round2, Probe};
use crate::providers::{MetricProvider, Uptime};
use crate::report::{PerfDatum, Report};
use crate::threshold::{Bounds, Polarity, ThresholdPair};

/// Upper end of the graphed range
const UPTIME_GRAPH_MAX: f64 = 1_000_000_000_000.0;

pub struct UptimeProbe<P> {
    host: String,
    provider: P,
    thresholds: ThresholdPair,
}

impl<P> UptimeProbe<P>
where
    P: MetricProvider<Output = Uptime> + Sync,
{
    pub fn new(
        raw_warning: &str,
        raw_critical: &str,
        host: impl Into<String>,
        provider: P,
    ) -> Result<Self, ProbeError> {
        let thresholds = ThresholdPair::parse(
            raw_warning,
            raw_critical,
            Polarity::DescendingBad,
            Bounds::NON_NEGATIVE,
        )?;
        Ok(Self {
            host: host.into(),
            provider,
            thresholds,
        })
    }
}

impl<P> Probe for UptimeProbe<P>
where
    P: MetricProvider<Output = Uptime> + Sync,
{
    fn subject(&self) -> String {
        self.host.clone()
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let uptime = self.provider.read_once().await?;
        // Classify the value that is shown, not the raw minutes
        let raw = uptime.reading();
        let reading = MetricReading::new(round2(raw.value), raw.unit);
        let verdict = classify(&reading, &self.thresholds);

        let mut summary = format!("System UpTime = {:.2} Minutes.", reading.value);
        match verdict.status {
            Status::Critical => {
                summary.push_str(" Appears to have recovered from Shutdown or has been Restarted.")
            }
            Status::Warning => summary.push_str(" Appears to have been recently Restarted."),
            _ => {}
        }

        let perf = PerfDatum::from_reading("SysUpTime", &reading, &self.thresholds)
            .with_range(0.0, Some(UPTIME_GRAPH_MAX));

        Ok(Report::new(self.subject(), verdict, summary).with_perf(perf))
    }
}
