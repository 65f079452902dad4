//! Metric values exchanged between providers, sampler and classifier

use serde::Serialize;

/// Unit a reading is expressed in. Drives the perf-data suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Unit {
    Percent,
    GiB,
    MiB,
    Minutes,
    Boolean,
    Ordinal,
}

impl Unit {
    /// Suffix appended to perf-data values
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Percent => "%",
            Unit::GiB => "GB",
            Unit::MiB => "MB",
            Unit::Minutes | Unit::Boolean | Unit::Ordinal => "",
        }
    }
}

/// One classified value. Consumed once, never retained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricReading {
    pub value: f64,
    pub unit: Unit,
}

impl MetricReading {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn percent(value: f64) -> Self {
        Self::new(value, Unit::Percent)
    }
}

/// Raw counter read: accumulated idle ticks against a tick clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub raw_value: i64,
    pub timestamp_ticks: i64,
}

impl Sample {
    pub fn new(raw_value: i64, timestamp_ticks: i64) -> Self {
        Self {
            raw_value,
            timestamp_ticks,
        }
    }
}

/// Anything a provider returns that reduces to a single reading
pub trait Measurement {
    fn reading(&self) -> MetricReading;
}

impl Measurement for MetricReading {
    fn reading(&self) -> MetricReading {
        *self
    }
}
