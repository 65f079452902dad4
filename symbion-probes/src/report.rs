//! Status line rendering
//!
//! One line on stdout, read by the supervisor:
//!
//! `<subject>: <STATUS>! <summary> | '<label>'=<value><unit>;<warn>;<crit>;<min>;<max>;`
//!
//! Numbers use two decimals. Several perf tuples are space separated.
//! Empty perf fields (no threshold, no maximum) render as nothing.

use serde::Serialize;
use std::fmt;

use crate::classify::{Status, Verdict};
use crate::error::ProbeError;
use crate::metric::{MetricReading, Unit};
use crate::threshold::ThresholdPair;

/// One performance-data series. Presentational only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerfDatum {
    pub label: String,
    pub value: f64,
    pub unit: Unit,
    pub warn: Option<f64>,
    pub crit: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl PerfDatum {
    /// Bare datum: no thresholds, no range
    pub fn new(label: impl Into<String>, value: f64, unit: Unit) -> Self {
        Self {
            label: label.into(),
            value,
            unit,
            warn: None,
            crit: None,
            min: None,
            max: None,
        }
    }

    /// Datum carrying the reading and its thresholds; percentages get 0..100
    pub fn from_reading(
        label: impl Into<String>,
        reading: &MetricReading,
        thresholds: &ThresholdPair,
    ) -> Self {
        let datum = Self::new(label, reading.value, reading.unit)
            .with_thresholds(thresholds.warning(), thresholds.critical());
        match reading.unit {
            Unit::Percent => datum.with_range(0.0, Some(100.0)),
            _ => datum,
        }
    }

    pub fn with_thresholds(mut self, warn: f64, crit: f64) -> Self {
        self.warn = Some(warn);
        self.crit = Some(crit);
        self
    }

    pub fn with_range(mut self, min: f64, max: Option<f64>) -> Self {
        self.min = Some(min);
        self.max = max;
        self
    }
}

fn field(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_default()
}

impl fmt::Display for PerfDatum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}'={:.2}{};{};{};{};{};",
            self.label,
            self.value,
            self.unit.suffix(),
            field(self.warn),
            field(self.crit),
            field(self.min),
            field(self.max)
        )
    }
}

/// Final probe outcome: verdict plus the rendered line parts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub subject: String,
    pub verdict: Verdict,
    pub summary: String,
    pub perf: Vec<PerfDatum>,
}

impl Report {
    pub fn new(subject: impl Into<String>, verdict: Verdict, summary: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            verdict,
            summary: summary.into(),
            perf: Vec::new(),
        }
    }

    /// Report for a failed invocation: message only, no perf data
    pub fn failure(subject: impl Into<String>, status: Status, error: &ProbeError) -> Self {
        Self::new(subject, Verdict::from(status), error.to_string())
    }

    pub fn with_perf(mut self, datum: PerfDatum) -> Self {
        self.perf.push(datum);
        self
    }

    pub fn status(&self) -> Status {
        self.verdict.status
    }

    pub fn exit_code(&self) -> i32 {
        self.verdict.exit_code
    }

    pub fn render(&self) -> String {
        let mut line = format!(
            "{}: {}! {}",
            self.subject,
            self.verdict.status.keyword(),
            self.summary
        );

        if !self.perf.is_empty() {
            let perf: Vec<String> = self.perf.iter().map(ToString::to_string).collect();
            line.push_str(" | ");
            line.push_str(&perf.join(" "));
        }

        line
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Render a single-series thresholded probe in one call
pub fn format(
    subject: &str,
    summary: &str,
    verdict: Verdict,
    reading: &MetricReading,
    thresholds: &ThresholdPair,
    perf_label: &str,
) -> (String, i32) {
    let report = Report::new(subject, verdict, summary).with_perf(PerfDatum::from_reading(
        perf_label, reading, thresholds,
    ));
    (report.render(), report.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::threshold::Polarity;

    fn memory_thresholds() -> ThresholdPair {
        ThresholdPair::new(80.0, 90.0, Polarity::AscendingBad).unwrap()
    }

    #[test]
    fn test_perf_datum_full() {
        let reading = MetricReading::percent(90.0);
        let datum = PerfDatum::from_reading("Memory_Used", &reading, &memory_thresholds());
        assert_eq!(datum.to_string(), "'Memory_Used'=90.00%;80.00;90.00;0.00;100.00;");
    }

    #[test]
    fn test_perf_datum_empty_fields() {
        let datum = PerfDatum::new("Memory_Free", 10.0, Unit::Percent).with_range(0.0, Some(100.0));
        assert_eq!(datum.to_string(), "'Memory_Free'=10.00%;;;0.00;100.00;");

        let datum = PerfDatum::new("Event_Count", 2.0, Unit::Ordinal).with_range(0.0, None);
        assert_eq!(datum.to_string(), "'Event_Count'=2.00;;;0.00;;");
    }

    #[test]
    fn test_render_line() {
        let report = Report::new("Memory", Verdict::from(Status::Warning), "% Used = 85.00%")
            .with_perf(PerfDatum::new("A", 1.0, Unit::Ordinal))
            .with_perf(PerfDatum::new("B", 2.5, Unit::MiB));
        assert_eq!(
            report.render(),
            "Memory: WARNING! % Used = 85.00% | 'A'=1.00;;;;; 'B'=2.50MB;;;;;"
        );
        assert_eq!(report.exit_code(), 1);
    }

    #[test]
    fn test_failure_has_no_perf() {
        let err = ProbeError::DegenerateThresholds(80.0);
        let report = Report::failure("Memory", Status::Unknown, &err);
        assert_eq!(
            report.render(),
            "Memory: UNKNOWN! The [Warning] value cannot be equal to the [Critical] value (80.00)"
        );
        assert_eq!(report.exit_code(), 3);
        assert!(!report.render().contains('|'));
    }

    #[test]
    fn test_format_is_repeatable() {
        let reading = MetricReading::percent(42.424);
        let thresholds = memory_thresholds();
        let verdict = classify(&reading, &thresholds);

        let first = format("[_Total]", "% CPU Usage = 42.42%", verdict, &reading, &thresholds, "[_Total]");
        let second = format("[_Total]", "% CPU Usage = 42.42%", verdict, &reading, &thresholds, "[_Total]");

        assert_eq!(first, second);
        assert_eq!(
            first.0,
            "[_Total]: OK! % CPU Usage = 42.42% | '[_Total]'=42.42%;80.00;90.00;0.00;100.00;"
        );
        assert_eq!(first.1, 0);
    }
}
