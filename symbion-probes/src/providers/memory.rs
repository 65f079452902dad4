//! Physical memory provider

use serde::Serialize;
use sysinfo::System;
use tracing::debug;

use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading};
use crate::providers::MetricProvider;

const MIB: u64 = 1024 * 1024;

/// Physical memory counters in MiB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryStats {
    pub total_mib: i64,
    pub free_mib: i64,
}

impl MemoryStats {
    pub fn used_mib(&self) -> i64 {
        self.total_mib - self.free_mib
    }

    pub fn free_percent(&self) -> f64 {
        (self.free_mib as f64 / self.total_mib as f64) * 100.0
    }

    pub fn used_percent(&self) -> f64 {
        100.0 - self.free_percent()
    }
}

impl Measurement for MemoryStats {
    fn reading(&self) -> MetricReading {
        MetricReading::percent(self.used_percent())
    }
}

/// Memory counters from sysinfo (available memory counts as free)
#[derive(Debug, Clone, Copy, Default)]
pub struct SysinfoMemory;

impl MetricProvider for SysinfoMemory {
    type Output = MemoryStats;

    async fn read_once(&self) -> Result<MemoryStats, ProbeError> {
        let mut sys = System::new();
        sys.refresh_memory();

        let total_bytes = sys.total_memory();
        let available_bytes = sys.available_memory();
        debug!(
            "Memory: total={} bytes, available={} bytes",
            total_bytes, available_bytes
        );

        if total_bytes < MIB {
            return Err(ProbeError::unavailable(
                "Physical memory",
                "the host reported no physical memory",
            ));
        }

        Ok(MemoryStats {
            total_mib: (total_bytes / MIB) as i64,
            free_mib: (available_bytes / MIB) as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentages() {
        let stats = MemoryStats {
            total_mib: 8192,
            free_mib: 819,
        };
        assert_eq!(stats.used_mib(), 7373);
        assert!((stats.free_percent() - 9.997_558_593_75).abs() < 1e-9);
        assert!((stats.reading().value - 90.002_441_406_25).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_sysinfo_memory() {
        let stats = SysinfoMemory.read_once().await.unwrap();
        assert!(stats.total_mib > 0);
        assert!(stats.free_mib <= stats.total_mib);
    }
}
