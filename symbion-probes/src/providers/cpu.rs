//! Processor time counters from /proc/stat
//!
//! Each `cpu`/`cpuN` line lists cumulative ticks per mode:
//! `user nice system idle iowait irq softirq steal guest guest_nice`.
//! A sample pairs idle ticks (idle + iowait) with total ticks, so the rate
//! sampler's `1 - d(idle)/d(total)` is the busy share of the window.

use std::fmt;
use std::path::PathBuf;
use tracing::debug;

use crate::error::ProbeError;
use crate::metric::Sample;
use crate::providers::RawCounter;

/// Guest time is already folded into user/nice, so only the first 8 count
const ACCOUNTED_FIELDS: usize = 8;

/// Aggregate processor or one logical core
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuInstance {
    Total,
    Core(u32),
}

impl CpuInstance {
    /// Parse a processor instance argument: "_Total" or a core index
    pub fn parse(raw: &str) -> Result<Self, ProbeError> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("_total") {
            return Ok(CpuInstance::Total);
        }
        if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
            return Err(ProbeError::InvalidFormat {
                field: "Processor_Instance",
                raw: raw.to_string(),
            });
        }
        trimmed
            .parse::<u32>()
            .map(CpuInstance::Core)
            .map_err(|_| ProbeError::InvalidFormat {
                field: "Processor_Instance",
                raw: raw.to_string(),
            })
    }

    fn stat_key(&self) -> String {
        match self {
            CpuInstance::Total => "cpu".to_string(),
            CpuInstance::Core(n) => format!("cpu{}", n),
        }
    }
}

impl fmt::Display for CpuInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CpuInstance::Total => f.write_str("_Total"),
            CpuInstance::Core(n) => write!(f, "{}", n),
        }
    }
}

/// Reads one processor line of a /proc/stat style file
#[derive(Debug, Clone)]
pub struct ProcStatCounter {
    path: PathBuf,
    instance: CpuInstance,
}

impl ProcStatCounter {
    pub fn new(path: impl Into<PathBuf>, instance: CpuInstance) -> Self {
        Self {
            path: path.into(),
            instance,
        }
    }

    fn parse_line(&self, content: &str) -> Result<Sample, ProbeError> {
        let key = self.instance.stat_key();
        let line = content
            .lines()
            .find(|line| line.split_whitespace().next() == Some(key.as_str()))
            .ok_or_else(|| {
                ProbeError::unavailable(
                    format!("Processor Instance [{}]", self.instance),
                    "does not exist on this host",
                )
            })?;

        let ticks: Vec<i64> = line
            .split_whitespace()
            .skip(1)
            .take(ACCOUNTED_FIELDS)
            .map(|field| field.parse::<i64>())
            .collect::<Result<_, _>>()
            .map_err(|e| ProbeError::SamplingError(format!("malformed '{}' line: {}", key, e)))?;

        if ticks.len() < 4 {
            return Err(ProbeError::SamplingError(format!(
                "'{}' line has {} counters, expected at least 4",
                key,
                ticks.len()
            )));
        }

        let idle = ticks[3] + ticks.get(4).copied().unwrap_or(0);
        let total = ticks.iter().sum();
        Ok(Sample::new(idle, total))
    }
}

impl RawCounter for ProcStatCounter {
    async fn read_raw(&self) -> Result<Sample, ProbeError> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            ProbeError::unavailable(
                format!("Processor counters ({})", self.path.display()),
                e.to_string(),
            )
        })?;

        let sample = self.parse_line(&content)?;
        debug!("[{}] sample {:?}", self.instance, sample);
        Ok(sample)
    }
}
