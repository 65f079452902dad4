//! TCP port probe: a listener on the port is OK, none is CRITICAL

use crate::classify::classify_state;
use crate::error::ProbeError;
use crate::metric::Measurement;
use crate::probes::Probe;
use crate::providers::port::parse_port;
use crate::providers::{MetricProvider, PortState, PortStatus};
use crate::report::{PerfDatum, Report};

pub struct PortProbe<P> {
    host: String,
    port: u16,
    provider: P,
}

impl<P> PortProbe<P>
where
    P: MetricProvider<Output = PortStatus> + Sync,
{
    pub fn new(
        raw_port: &str,
        host: impl Into<String>,
        connect: impl FnOnce(u16) -> P,
    ) -> Result<Self, ProbeError> {
        let port = parse_port(raw_port)?;
        Ok(Self {
            host: host.into(),
            port,
            provider: connect(port),
        })
    }
}

impl<P> Probe for PortProbe<P>
where
    P: MetricProvider<Output = PortStatus> + Sync,
{
    fn subject(&self) -> String {
        self.host.clone()
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let status = self.provider.read_once().await?;
        let verdict = classify_state(&status);

        let summary = match status.state {
            PortState::Listening => format!("Listening on Port [{}].", self.port),
            PortState::Unavailable => {
                format!("Port [{}] is Unavailable on {}", self.port, self.host)
            }
        };
        let reading = status.reading();
        let perf = PerfDatum::new("Port_State", reading.value, reading.unit)
            .with_range(0.0, Some(10.0));

        Ok(Report::new(self.subject(), verdict, summary).with_perf(perf))
    }
}
