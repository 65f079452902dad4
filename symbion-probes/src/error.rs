//! Probe error taxonomy
//!
//! Two families share one enum:
//! - validation failures, raised before any metric source is touched
//! - acquisition failures, raised by providers and the rate sampler

use thiserror::Error;

use crate::threshold::{Bounds, Polarity};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    #[error("A numeric [{field}] value (1.00, 12.00, 90.00 etc...) must be provided, got '{raw}'")]
    InvalidFormat { field: &'static str, raw: String },

    #[error("The [{field}] value {value:.2} must lie within {bounds}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        bounds: Bounds,
    },

    #[error("The [Warning] value cannot be equal to the [Critical] value ({0:.2})")]
    DegenerateThresholds(f64),

    #[error("The [Warning] value {warning:.2} must be {} than the [Critical] value {critical:.2}", .polarity.warning_side())]
    WrongOrder {
        warning: f64,
        critical: f64,
        polarity: Polarity,
    },

    #[error("{resource} is unavailable: {reason}")]
    ResourceUnavailable { resource: String, reason: String },

    #[error("Sampling failed: {0}")]
    SamplingError(String),

    #[error("Both samples carry timestamp {0}; no elapsed interval to derive a rate from")]
    DegenerateInterval(i64),
}

/// Which side of the pipeline raised an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Acquisition,
}

impl ProbeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProbeError::InvalidFormat { .. }
            | ProbeError::OutOfRange { .. }
            | ProbeError::DegenerateThresholds(_)
            | ProbeError::WrongOrder { .. } => ErrorKind::Validation,
            ProbeError::ResourceUnavailable { .. }
            | ProbeError::SamplingError(_)
            | ProbeError::DegenerateInterval(_) => ErrorKind::Acquisition,
        }
    }

    /// True for the sampling family (failed read or zero elapsed ticks)
    pub fn is_sampling_failure(&self) -> bool {
        matches!(
            self,
            ProbeError::SamplingError(_) | ProbeError::DegenerateInterval(_)
        )
    }

    pub fn unavailable(resource: impl Into<String>, reason: impl Into<String>) -> Self {
        ProbeError::ResourceUnavailable {
            resource: resource.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(ProbeError::DegenerateThresholds(80.0).kind(), ErrorKind::Validation);
        assert_eq!(
            ProbeError::unavailable("Disk /mnt", "not mounted").kind(),
            ErrorKind::Acquisition
        );
        assert!(ProbeError::DegenerateInterval(0).is_sampling_failure());
        assert!(!ProbeError::unavailable("x", "y").is_sampling_failure());
    }

    #[test]
    fn test_wrong_order_message() {
        let err = ProbeError::WrongOrder {
            warning: 90.0,
            critical: 80.0,
            polarity: Polarity::AscendingBad,
        };
        assert_eq!(
            err.to_string(),
            "The [Warning] value 90.00 must be less than the [Critical] value 80.00"
        );
    }
}
