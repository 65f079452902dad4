//! Service run state via systemd
//!
//! `systemctl show` reports the unit's load/active/freezer state. The
//! active state folds into a closed set of run states with one healthy
//! member, `Running`.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::debug;

use crate::classify::HealthState;
use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading, Unit};
use crate::providers::{run_query, MetricProvider};

/// Service run state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceState {
    Running,
    Stopped,
    Paused,
    Stopping,
    Starting,
    Unrecognized(String),
}

impl ServiceState {
    /// Fold systemd's ActiveState (+ FreezerState) into a run state
    pub fn from_systemd(active_state: &str, freezer_state: Option<&str>) -> Self {
        if matches!(freezer_state, Some("frozen") | Some("freezing")) {
            return ServiceState::Paused;
        }
        match active_state {
            "active" => ServiceState::Running,
            "inactive" | "failed" => ServiceState::Stopped,
            "deactivating" => ServiceState::Stopping,
            "activating" | "reloading" => ServiceState::Starting,
            other => ServiceState::Unrecognized(other.to_string()),
        }
    }

    /// Perf-data tag; display only
    pub fn tag(&self) -> f64 {
        match self {
            ServiceState::Running => 4.0,
            ServiceState::Stopped => 2.0,
            ServiceState::Paused => 1.0,
            ServiceState::Stopping | ServiceState::Starting => 3.0,
            ServiceState::Unrecognized(_) => 0.0,
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceState::Running => f.write_str("Running"),
            ServiceState::Stopped => f.write_str("Stopped"),
            ServiceState::Paused => f.write_str("Paused"),
            ServiceState::Stopping => f.write_str("Stopping"),
            ServiceState::Starting => f.write_str("Starting"),
            ServiceState::Unrecognized(raw) => write!(f, "in unrecognized state '{}'", raw),
        }
    }
}

/// Queried service and its state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    pub name: String,
    pub display_name: String,
    pub state: ServiceState,
}

impl HealthState for ServiceStatus {
    fn is_healthy(&self) -> bool {
        self.state == ServiceState::Running
    }

    fn perf_tag(&self) -> f64 {
        self.state.tag()
    }

    fn state_name(&self) -> String {
        self.state.to_string()
    }
}

impl Measurement for ServiceStatus {
    fn reading(&self) -> MetricReading {
        MetricReading::new(self.state.tag(), Unit::Ordinal)
    }
}

/// Validate a service name argument
pub fn validate_service_name(raw: &str) -> Result<String, ProbeError> {
    let name = raw.trim();
    if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
        return Err(ProbeError::InvalidFormat {
            field: "Service_Name",
            raw: raw.to_string(),
        });
    }
    Ok(name.to_string())
}

/// One systemd unit, queried through `systemctl show`
#[derive(Debug, Clone)]
pub struct SystemdService {
    name: String,
    systemctl: String,
    timeout: Duration,
}

impl SystemdService {
    pub fn new(name: impl Into<String>, systemctl: impl Into<String>, timeout: Duration) -> Self {
        Self {
            name: name.into(),
            systemctl: systemctl.into(),
            timeout,
        }
    }

    /// Parse `Key=Value` lines of `systemctl show`
    pub fn parse_show(name: &str, output: &str) -> Result<ServiceStatus, ProbeError> {
        let properties: HashMap<&str, &str> = output
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let resource = || format!("The Service Name [{}]", name);
        match properties.get("LoadState") {
            Some(&"not-found") | None => {
                return Err(ProbeError::unavailable(resource(), "was not found on this host"));
            }
            _ => {}
        }

        let active_state = properties.get("ActiveState").copied().ok_or_else(|| {
            ProbeError::unavailable(resource(), "reported no ActiveState")
        })?;

        let display_name = properties
            .get("Description")
            .filter(|d| !d.is_empty())
            .map(|d| d.to_string())
            .unwrap_or_else(|| name.to_string());

        Ok(ServiceStatus {
            name: name.to_string(),
            display_name,
            state: ServiceState::from_systemd(active_state, properties.get("FreezerState").copied()),
        })
    }
}

impl MetricProvider for SystemdService {
    type Output = ServiceStatus;

    async fn read_once(&self) -> Result<ServiceStatus, ProbeError> {
        let args = vec![
            "show".to_string(),
            self.name.clone(),
            "--property=LoadState,ActiveState,FreezerState,Description".to_string(),
            "--no-pager".to_string(),
        ];
        let output = run_query(
            &format!("The Service Name [{}]", self.name),
            &self.systemctl,
            &args,
            self.timeout,
        )
        .await?;

        let status = Self::parse_show(&self.name, &output)?;
        debug!("Service {} is {}", status.name, status.state);
        Ok(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify_state, Status};

    #[test]
    fn test_state_mapping() {
        assert_eq!(ServiceState::from_systemd("active", None), ServiceState::Running);
        assert_eq!(ServiceState::from_systemd("failed", None), ServiceState::Stopped);
        assert_eq!(ServiceState::from_systemd("inactive", Some("running")), ServiceState::Stopped);
        assert_eq!(ServiceState::from_systemd("active", Some("frozen")), ServiceState::Paused);
        assert_eq!(ServiceState::from_systemd("deactivating", None), ServiceState::Stopping);
        assert_eq!(ServiceState::from_systemd("activating", None), ServiceState::Starting);
        assert_eq!(
            ServiceState::from_systemd("maintenance", None),
            ServiceState::Unrecognized("maintenance".to_string())
        );
    }

    #[test]
    fn test_only_running_is_healthy() {
        let states = [
            (ServiceState::Running, Status::Ok, 4.0),
            (ServiceState::Stopped, Status::Critical, 2.0),
            (ServiceState::Paused, Status::Critical, 1.0),
            (ServiceState::Stopping, Status::Critical, 3.0),
            (ServiceState::Starting, Status::Critical, 3.0),
            (ServiceState::Unrecognized("x".into()), Status::Critical, 0.0),
        ];
        for (state, expected, tag) in states {
            let status = ServiceStatus {
                name: "demo".into(),
                display_name: "Demo".into(),
                state,
            };
            assert_eq!(classify_state(&status).status, expected);
            assert_eq!(status.perf_tag(), tag);
            assert_eq!(status.reading(), MetricReading::new(tag, Unit::Ordinal));
        }
    }

    #[test]
    fn test_parse_show() {
        let output = "LoadState=loaded\nActiveState=active\nFreezerState=running\n\
                      Description=OpenBSD Secure Shell server\n";
        let status = SystemdService::parse_show("ssh", output).unwrap();
        assert_eq!(status.display_name, "OpenBSD Secure Shell server");
        assert_eq!(status.state, ServiceState::Running);
    }

    #[test]
    fn test_parse_show_not_found() {
        let output = "LoadState=not-found\nActiveState=inactive\nDescription=nope.service\n";
        let err = SystemdService::parse_show("nope", output).unwrap_err();
        assert!(matches!(err, ProbeError::ResourceUnavailable { .. }));
    }

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_service_name(" sshd ").unwrap(), "sshd");
        assert!(validate_service_name("--all").is_err());
        assert!(validate_service_name("two words").is_err());
        assert!(validate_service_name("").is_err());
    }
}
