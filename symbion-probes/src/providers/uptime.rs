//! System uptime from the boot-time clock

use chrono::{DateTime, Utc};
use serde::Serialize;
use sysinfo::System;

use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading, Unit};
use crate::providers::MetricProvider;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Uptime {
    pub minutes: f64,
}

impl Uptime {
    /// Minutes elapsed between boot and `now`
    pub fn between(boot: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let seconds = (now - boot).num_milliseconds() as f64 / 1000.0;
        Self {
            minutes: seconds / 60.0,
        }
    }
}

impl Measurement for Uptime {
    fn reading(&self) -> MetricReading {
        MetricReading::new(self.minutes, Unit::Minutes)
    }
}

/// Boot time reported by the OS, compared against the wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct BootClock;

impl MetricProvider for BootClock {
    type Output = Uptime;

    async fn read_once(&self) -> Result<Uptime, ProbeError> {
        let boot_secs = System::boot_time();
        let boot = i64::try_from(boot_secs)
            .ok()
            .filter(|secs| *secs > 0)
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .ok_or_else(|| {
                ProbeError::unavailable("System boot time", format!("invalid value {}", boot_secs))
            })?;

        Ok(Uptime::between(boot, Utc::now()))
    }
}
