//! Disk space provider

use serde::Serialize;
use std::path::Path;
use sysinfo::{Disk, Disks};
use tracing::debug;

use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading};
use crate::providers::MetricProvider;

const GIB: f64 = 1_073_741_824.0;

/// Capacity of one mounted filesystem, in bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskSpace {
    pub mount: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
}

impl DiskSpace {
    pub fn total_gib(&self) -> f64 {
        self.total_bytes as f64 / GIB
    }

    pub fn free_gib(&self) -> f64 {
        self.free_bytes as f64 / GIB
    }

    pub fn used_gib(&self) -> f64 {
        self.total_bytes.saturating_sub(self.free_bytes) as f64 / GIB
    }

    pub fn free_percent(&self) -> f64 {
        (self.free_gib() / self.total_gib()) * 100.0
    }
}

impl Measurement for DiskSpace {
    fn reading(&self) -> MetricReading {
        MetricReading::percent(self.free_percent())
    }
}

/// Looks up one disk by mount point, device name, or Windows drive letter
#[derive(Debug, Clone)]
pub struct SysinfoDisk {
    target: String,
}

impl SysinfoDisk {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    fn matches(&self, disk: &Disk) -> bool {
        if disk.mount_point() == Path::new(&self.target) || disk.name() == self.target.as_str() {
            return true;
        }

        // "C" names the "C:\" volume
        match self.target.trim_end_matches(['\\', ':']).as_bytes() {
            [letter] if letter.is_ascii_alphabetic() => {
                let mount = disk.mount_point().to_string_lossy().to_ascii_uppercase();
                mount == format!("{}:\\", letter.to_ascii_uppercase() as char)
            }
            _ => false,
        }
    }
}

impl MetricProvider for SysinfoDisk {
    type Output = DiskSpace;

    async fn read_once(&self) -> Result<DiskSpace, ProbeError> {
        let disks = Disks::new_with_refreshed_list();
        debug!("Enumerated {} disks", disks.list().len());

        let disk = disks
            .list()
            .iter()
            .find(|disk| self.matches(disk))
            .ok_or_else(|| {
                ProbeError::unavailable(
                    format!("The {} drive", self.target),
                    "either not online or does not exist",
                )
            })?;

        if disk.total_space() == 0 {
            return Err(ProbeError::unavailable(
                format!("The {} drive", self.target),
                "reports no capacity and is not ready",
            ));
        }

        Ok(DiskSpace {
            mount: disk.mount_point().to_string_lossy().to_string(),
            total_bytes: disk.total_space(),
            // Space usable by unprivileged writers; blocks reserved for root count as used
            free_bytes: disk.available_space(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_derivation() {
        let space = DiskSpace {
            mount: "/".to_string(),
            total_bytes: 100 * 1_073_741_824,
            free_bytes: 25 * 1_073_741_824,
        };
        assert_eq!(space.total_gib(), 100.0);
        assert_eq!(space.free_gib(), 25.0);
        assert_eq!(space.used_gib(), 75.0);
        assert_eq!(space.reading().value, 25.0);
    }

    #[tokio::test]
    async fn test_missing_disk_unavailable() {
        let err = SysinfoDisk::new("/symbion/no/such/mount")
            .read_once()
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::ResourceUnavailable { .. }));
    }
}
