//! Threshold parsing
//!
//! Turns the raw warning/critical tokens of a probe invocation into an
//! ordered, validated `ThresholdPair`. Pure: no metric source is touched.

use serde::Serialize;
use std::fmt;

use crate::error::ProbeError;

/// Direction in which a metric degrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// Higher is worse (CPU%, memory used%)
    AscendingBad,
    /// Lower is worse (free space%, uptime minutes)
    DescendingBad,
}

impl Polarity {
    /// How warning must compare to critical, for error messages
    pub fn warning_side(&self) -> &'static str {
        match self {
            Polarity::AscendingBad => "less",
            Polarity::DescendingBad => "greater",
        }
    }
}

/// Inclusive numeric range a threshold must fall into
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Bounds {
    pub const PERCENT: Bounds = Bounds {
        min: Some(0.0),
        max: Some(100.0),
    };
    pub const NON_NEGATIVE: Bounds = Bounds {
        min: Some(0.0),
        max: None,
    };

    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (Some(min), Some(max)) => write!(f, "{:.2}..={:.2}", min, max),
            (Some(min), None) => write!(f, ">= {:.2}", min),
            (None, Some(max)) => write!(f, "<= {:.2}", max),
            (None, None) => write!(f, "any value"),
        }
    }
}

/// Validated warning/critical boundaries. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdPair {
    warning: f64,
    critical: f64,
    polarity: Polarity,
}

impl ThresholdPair {
    /// Parse and validate two raw tokens.
    ///
    /// Checks run in a fixed order: format, range, equality, ordering.
    pub fn parse(
        raw_warning: &str,
        raw_critical: &str,
        polarity: Polarity,
        bounds: Bounds,
    ) -> Result<Self, ProbeError> {
        let warning = parse_token("Warning", raw_warning)?;
        let critical = parse_token("Critical", raw_critical)?;

        for (field, value) in [("Warning", warning), ("Critical", critical)] {
            if !bounds.contains(value) {
                return Err(ProbeError::OutOfRange {
                    field,
                    value,
                    bounds,
                });
            }
        }

        Self::new(warning, critical, polarity)
    }

    /// Build from already-numeric values, enforcing the ordering invariant
    pub fn new(warning: f64, critical: f64, polarity: Polarity) -> Result<Self, ProbeError> {
        if warning == critical {
            return Err(ProbeError::DegenerateThresholds(warning));
        }

        let ordered = match polarity {
            Polarity::AscendingBad => warning < critical,
            Polarity::DescendingBad => warning > critical,
        };
        if !ordered {
            return Err(ProbeError::WrongOrder {
                warning,
                critical,
                polarity,
            });
        }

        Ok(Self {
            warning,
            critical,
            polarity,
        })
    }

    pub fn warning(&self) -> f64 {
        self.warning
    }

    pub fn critical(&self) -> f64 {
        self.critical
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }
}

/// Parse one decimal token. Any letter, in any script, is a format error.
pub fn parse_token(field: &'static str, raw: &str) -> Result<f64, ProbeError> {
    let invalid = || ProbeError::InvalidFormat {
        field,
        raw: raw.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_alphabetic) {
        return Err(invalid());
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ascending() {
        let pair = ThresholdPair::parse("80.00", "90.00", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap();
        assert_eq!(pair.warning(), 80.0);
        assert_eq!(pair.critical(), 90.0);
        assert_eq!(pair.polarity(), Polarity::AscendingBad);
    }

    #[test]
    fn test_parse_descending() {
        let pair =
            ThresholdPair::parse("10.00", "5.00", Polarity::DescendingBad, Bounds::PERCENT).unwrap();
        assert_eq!(pair.warning(), 10.0);
        assert_eq!(pair.critical(), 5.0);
    }

    #[test]
    fn test_letters_rejected() {
        for raw in ["8O", "abc", "1e2", "inf", "NaN", "ä5", ""] {
            let err = ThresholdPair::parse(raw, "90", Polarity::AscendingBad, Bounds::PERCENT)
                .unwrap_err();
            assert!(
                matches!(err, ProbeError::InvalidFormat { field: "Warning", .. }),
                "{raw:?} gave {err:?}"
            );
        }

        let err = ThresholdPair::parse("80", "9x", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidFormat { field: "Critical", .. }));
    }

    #[test]
    fn test_unparseable_numbers_rejected() {
        let err = ThresholdPair::parse("80..0", "90", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidFormat { .. }));

        let err = ThresholdPair::parse("80%", "90", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::InvalidFormat { .. }));
    }

    #[test]
    fn test_whitespace_is_tolerated() {
        let pair =
            ThresholdPair::parse(" 80 ", "90\n", Polarity::AscendingBad, Bounds::PERCENT).unwrap();
        assert_eq!(pair.warning(), 80.0);
    }

    #[test]
    fn test_out_of_range() {
        let err = ThresholdPair::parse("80", "100.01", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::OutOfRange { field: "Critical", .. }));

        let err = ThresholdPair::parse("-1", "5", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::OutOfRange { field: "Warning", .. }));

        // Uptime minutes have no upper bound
        assert!(
            ThresholdPair::parse("1000000", "300", Polarity::DescendingBad, Bounds::NON_NEGATIVE)
                .is_ok()
        );
    }

    #[test]
    fn test_degenerate_before_order() {
        let err = ThresholdPair::parse("90", "90.00", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert_eq!(err, ProbeError::DegenerateThresholds(90.0));
    }

    #[test]
    fn test_wrong_order() {
        let err = ThresholdPair::parse("90", "80", Polarity::AscendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::WrongOrder { .. }));

        let err = ThresholdPair::parse("5", "10", Polarity::DescendingBad, Bounds::PERCENT)
            .unwrap_err();
        assert!(matches!(err, ProbeError::WrongOrder { .. }));
    }

    #[test]
    fn test_parse_succeeds_iff_ordered_and_bounded() {
        let steps: Vec<f64> = (0..=20).map(|i| i as f64 * 5.5 - 5.0).collect();
        for &w in &steps {
            for &c in &steps {
                let (ws, cs) = (format!("{w:.2}"), format!("{c:.2}"));
                let bounded = Bounds::PERCENT.contains(w) && Bounds::PERCENT.contains(c);

                let asc = ThresholdPair::parse(&ws, &cs, Polarity::AscendingBad, Bounds::PERCENT);
                assert_eq!(asc.is_ok(), bounded && w < c, "asc w={w} c={c}");

                let desc = ThresholdPair::parse(&ws, &cs, Polarity::DescendingBad, Bounds::PERCENT);
                assert_eq!(desc.is_ok(), bounded && w > c, "desc w={w} c={c}");
            }
        }
    }

    #[test]
    fn test_bounds_display() {
        assert_eq!(Bounds::PERCENT.to_string(), "0.00..=100.00");
        assert_eq!(Bounds::NON_NEGATIVE.to_string(), ">= 0.00");
    }
}
