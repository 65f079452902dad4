//! Event occurrence probe: any matching event inside the window is CRITICAL

use crate::classify::{classify_state, HealthState};
use crate::error::ProbeError;
use crate::metric::Measurement;
use crate::probes::Probe;
use crate::providers::{EventPresence, EventQuery, MetricProvider};
use crate::report::{PerfDatum, Report};

pub struct EventLogProbe<P> {
    query: EventQuery,
    provider: P,
}

impl<P> EventLogProbe<P>
where
    P: MetricProvider<Output = EventPresence> + Sync,
{
    pub fn subject_for(log: &str) -> String {
        format!("[{}]", log.trim())
    }

    pub fn new(
        raw_log: &str,
        raw_provider: &str,
        raw_event_id: &str,
        raw_window_ms: &str,
        connect: impl FnOnce(&EventQuery) -> P,
    ) -> Result<Self, ProbeError> {
        let query = EventQuery::parse(raw_log, raw_provider, raw_event_id, raw_window_ms)?;
        let provider = connect(&query);
        Ok(Self { query, provider })
    }
}

impl<P> Probe for EventLogProbe<P>
where
    P: MetricProvider<Output = EventPresence> + Sync,
{
    fn subject(&self) -> String {
        Self::subject_for(&self.query.log)
    }

    async fn evaluate(&self) -> Result<Report, ProbeError> {
        let presence = self.provider.read_once().await?;
        let verdict = classify_state(&presence);

        let window_ms = self.query.window.as_millis();
        let mut summary = if presence.is_healthy() {
            format!(
                "No Event ID {} from {} in the last {}ms.",
                self.query.event_id, self.query.provider, window_ms
            )
        } else {
            format!(
                "{} Event ID {} from {} in the last {}ms.",
                presence.count, self.query.event_id, self.query.provider, window_ms
            )
        };
        if let Some(message) = presence.latest_message.as_deref().map(single_line) {
            if !message.is_empty() {
                summary.push_str(&format!(" Latest: {}", message));
            }
        }

        let reading = presence.reading();
        let perf = PerfDatum::new("Event_Count", reading.value, reading.unit)
            .with_range(0.0, None);

        Ok(Report::new(self.subject(), verdict, summary).with_perf(perf))
    }
}

/// Event text must not break the status line: no line breaks, no `|`
fn single_line(message: &str) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| match c {
            '|' => '/',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
