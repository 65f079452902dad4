//! Event occurrence lookup in the systemd journal
//!
//! An event query names a log, the emitting provider, an event id and a
//! look-back window. Matching entries are counted; any match makes the
//! probe CRITICAL.

use chrono::{Duration as ChronoDuration, Utc};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::classify::HealthState;
use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading, Unit};
use crate::providers::{run_query, MetricProvider};
use crate::threshold::Bounds;

/// Validated event query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventQuery {
    pub log: String,
    pub provider: String,
    /// `*` matches any id
    pub event_id: String,
    pub window: Duration,
}

impl EventQuery {
    pub fn parse(log: &str, provider: &str, event_id: &str, window_ms: &str) -> Result<Self, ProbeError> {
        Ok(Self {
            log: plain_token("Log_Name", log)?,
            provider: plain_token("Provider_Name", provider)?,
            event_id: plain_token("Event_ID", event_id)?,
            window: parse_window(window_ms)?,
        })
    }

    fn journal_args(&self, since_epoch: i64) -> Vec<String> {
        let mut args = vec![
            "--no-pager".to_string(),
            "--quiet".to_string(),
            "--output=json".to_string(),
            format!("--since=@{}", since_epoch),
        ];

        match self.log.to_ascii_lowercase().as_str() {
            "system" => args.push("--system".to_string()),
            "user" => args.push("--user".to_string()),
            "application" | "all" | "*" => {}
            _ => args.push(format!("--namespace={}", self.log)),
        }

        args.push(format!("SYSLOG_IDENTIFIER={}", self.provider));
        if self.event_id != "*" {
            args.push(format!("MESSAGE_ID={}", self.event_id));
        }
        args
    }
}

fn plain_token(field: &'static str, raw: &str) -> Result<String, ProbeError> {
    let token = raw.trim();
    if token.is_empty()
        || token.starts_with('-')
        || token.contains('=')
        || token.chars().any(char::is_whitespace)
    {
        return Err(ProbeError::InvalidFormat {
            field,
            raw: raw.to_string(),
        });
    }
    Ok(token.to_string())
}

fn parse_window(raw: &str) -> Result<Duration, ProbeError> {
    let trimmed = raw.trim();
    let invalid = || ProbeError::InvalidFormat {
        field: "Milliseconds",
        raw: raw.to_string(),
    };
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let millis: u64 = trimmed.parse().map_err(|_| invalid())?;
    if millis == 0 {
        return Err(ProbeError::OutOfRange {
            field: "Milliseconds",
            value: 0.0,
            bounds: Bounds {
                min: Some(1.0),
                max: None,
            },
        });
    }
    Ok(Duration::from_millis(millis))
}

/// Outcome of an event query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventPresence {
    pub count: usize,
    pub latest_message: Option<String>,
}

impl EventPresence {
    /// Count journal JSON lines and keep the newest message.
    ///
    /// journalctl writes one entry per line, so a line that fails to parse
    /// still counts as a match; it just cannot supply the message.
    pub fn from_journal_json(output: &str) -> Self {
        let lines: Vec<&str> = output.lines().filter(|line| !line.trim().is_empty()).collect();
        let entries: Vec<Value> = lines
            .iter()
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Unparsable journal line ({}): {}", e, line);
                    None
                }
            })
            .collect();

        let latest_message = entries.last().and_then(|entry| match &entry["MESSAGE"] {
            Value::String(message) => Some(message.clone()),
            // Non-UTF-8 messages come back as byte arrays
            Value::Array(bytes) => {
                let raw: Vec<u8> = bytes
                    .iter()
                    .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                    .collect();
                Some(String::from_utf8_lossy(&raw).to_string())
            }
            _ => None,
        });

        Self {
            count: lines.len(),
            latest_message,
        }
    }
}

impl HealthState for EventPresence {
    fn is_healthy(&self) -> bool {
        self.count == 0
    }

    fn perf_tag(&self) -> f64 {
        self.count as f64
    }

    fn state_name(&self) -> String {
        if self.count == 0 {
            "Absent".to_string()
        } else {
            "Present".to_string()
        }
    }
}

impl Measurement for EventPresence {
    fn reading(&self) -> MetricReading {
        MetricReading::new(self.count as f64, Unit::Ordinal)
    }
}

/// Runs an event query through `journalctl`
#[derive(Debug, Clone)]
pub struct JournalEvents {
    query: EventQuery,
    journalctl: String,
    timeout: Duration,
}

impl JournalEvents {
    pub fn new(query: EventQuery, journalctl: impl Into<String>, timeout: Duration) -> Self {
        Self {
            query,
            journalctl: journalctl.into(),
            timeout,
        }
    }
}

impl MetricProvider for JournalEvents {
    type Output = EventPresence;

    async fn read_once(&self) -> Result<EventPresence, ProbeError> {
        let window = ChronoDuration::from_std(self.query.window).map_err(|e| {
            ProbeError::unavailable("Event log", format!("window out of range: {}", e))
        })?;
        let since = (Utc::now() - window).timestamp();

        let output = run_query(
            &format!("Event log [{}]", self.query.log),
            &self.journalctl,
            &self.query.journal_args(since),
            self.timeout,
        )
        .await?;

        let presence = EventPresence::from_journal_json(&output);
        debug!(
            "{} entries from {} (id {}) since @{}",
            presence.count, self.query.provider, self.query.event_id, since
        );
        Ok(presence)
    }
}
