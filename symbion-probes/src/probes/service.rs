//! Service run-state probe: Running is OK, every other state CRITICAL

use crate::classify::{classify_state, HealthState};
use crate::error::ProbeError;
use crate::metric::Measurement;
use crate::probes::Probe;
use crate::providers::service::validate_service_name;
use crate::providers::{MetricProvider, ServiceStatus};
use crate::report::{PerfDatum, Report};

pub struct ServiceProbe<P> {
    name: String,
    provider: P,
}

impl<P> ServiceProbe<P>
where
    P: MetricProvider<Output = ServiceStatus> + Sync,
{
    pub fn subject_for(name: &str) -> String {
        format!("[{}]", name.trim())
    }

    pub fn new(raw_name: &str, connect: impl FnOnce(&str) -> P) -> Result<Self, ProbeError> {
        let name = validate_service_name(raw_name)?;
        let provider = connect(&name);
        Ok(Self { name, provider })
    }
}

impl<P> Probe for ServiceProbe<P>
where
    P: MetricProvider<Output = ServiceStatus> + Sync,
{
    fn subject(&self) -> String {
        Self::subject_for(&self.name)
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let status = self.provider.read_once().await?;
        let verdict = classify_state(&status);

        let summary = format!("{} is {}.", status.display_name, status.state_name());
        let reading = status.reading();
        let perf = PerfDatum::new("Service_State", reading.value, reading.unit)
            .with_range(0.0, Some(5.0));

        Ok(Report::new(self.subject(), verdict, summary).with_perf(perf))
    }
}
