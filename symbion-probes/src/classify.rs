//! Verdict classification
//!
//! Maps a reading and its thresholds to OK / WARNING / CRITICAL. Binary
//! sources (service state, port state, event presence) skip thresholds and
//! map their enumerated state straight to OK or CRITICAL.
//!
//! Boundaries are strict on the bad side: a value equal to critical is not
//! yet critical, a value equal to warning is still OK.

use serde::Serialize;
use std::fmt;

use crate::metric::MetricReading;
use crate::threshold::{Polarity, ThresholdPair};

/// Health state, ordered by severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl Status {
    /// Exit code contract with the monitoring supervisor
    pub fn exit_code(&self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
            Status::Unknown => 3,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
            Status::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub status: Status,
    pub exit_code: i32,
}

impl From<Status> for Verdict {
    fn from(status: Status) -> Self {
        Self {
            status,
            exit_code: status.exit_code(),
        }
    }
}

/// Classify a thresholded reading. Never fails.
pub fn classify(reading: &MetricReading, thresholds: &ThresholdPair) -> Verdict {
    let value = reading.value;
    let (warning, critical) = (thresholds.warning(), thresholds.critical());

    let status = match thresholds.polarity() {
        Polarity::AscendingBad => {
            if value > critical {
                Status::Critical
            } else if value > warning {
                Status::Warning
            } else {
                Status::Ok
            }
        }
        Polarity::DescendingBad => {
            if value < critical {
                Status::Critical
            } else if value < warning {
                Status::Warning
            } else {
                Status::Ok
            }
        }
    };

    Verdict::from(status)
}

/// A closed set of named states with exactly one healthy member
pub trait HealthState {
    fn is_healthy(&self) -> bool;

    /// Numeric tag shown in perf data only
    fn perf_tag(&self) -> f64;

    /// Display name of the state ("Running", "Listening", ...)
    fn state_name(&self) -> String;
}

/// Binary classification: healthy state is OK, anything else CRITICAL
pub fn classify_state<S: HealthState + ?Sized>(state: &S) -> Verdict {
    if state.is_healthy() {
        Verdict::from(Status::Ok)
    } else {
        Verdict::from(Status::Critical)
    }
}
