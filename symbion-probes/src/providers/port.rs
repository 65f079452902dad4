//! TCP listener table from /proc/net/tcp{,6}

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::classify::HealthState;
use crate::error::ProbeError;
use crate::metric::{Measurement, MetricReading, Unit};
use crate::providers::MetricProvider;

/// Kernel socket state code for LISTEN
const TCP_LISTEN: &str = "0A";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PortState {
    Listening,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortStatus {
    pub port: u16,
    pub state: PortState,
}

impl HealthState for PortStatus {
    fn is_healthy(&self) -> bool {
        self.state == PortState::Listening
    }

    fn perf_tag(&self) -> f64 {
        match self.state {
            PortState::Listening => 1.0,
            PortState::Unavailable => 0.0,
        }
    }

    fn state_name(&self) -> String {
        format!("{:?}", self.state)
    }
}

impl Measurement for PortStatus {
    fn reading(&self) -> MetricReading {
        MetricReading::new(self.perf_tag(), Unit::Boolean)
    }
}

/// Validate a port argument: digits only, at most 65535
pub fn parse_port(raw: &str) -> Result<u16, ProbeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProbeError::InvalidFormat {
            field: "Port_Number",
            raw: raw.to_string(),
        });
    }

    // Digits only, so the only failure left is overflow
    let value: f64 = trimmed.parse().map_err(|_| ProbeError::InvalidFormat {
        field: "Port_Number",
        raw: raw.to_string(),
    })?;
    if value > u16::MAX as f64 {
        return Err(ProbeError::OutOfRange {
            field: "Port_Number",
            value,
            bounds: crate::threshold::Bounds {
                min: Some(0.0),
                max: Some(u16::MAX as f64),
            },
        });
    }
    Ok(value as u16)
}

/// Ports in LISTEN state in one table's content
pub fn listening_ports(table: &str) -> BTreeSet<u16> {
    table
        .lines()
        .skip(1)
        .filter_map(|row| {
            let fields: Vec<&str> = row.split_whitespace().collect();
            let local = fields.get(1)?;
            let state = fields.get(3)?;
            if *state != TCP_LISTEN {
                return None;
            }
            let (_, port_hex) = local.rsplit_once(':')?;
            u16::from_str_radix(port_hex, 16).ok()
        })
        .collect()
}

/// Checks one port against the host's listener tables
#[derive(Debug, Clone)]
pub struct ProcNetListeners {
    port: u16,
    tables: Vec<PathBuf>,
}

impl ProcNetListeners {
    pub fn new(port: u16, tables: Vec<PathBuf>) -> Self {
        Self { port, tables }
    }
}

impl MetricProvider for ProcNetListeners {
    type Output = PortStatus;

    async fn read_once(&self) -> Result<PortStatus, ProbeError> {
        let mut listeners = BTreeSet::new();
        let mut readable = 0;

        for table in &self.tables {
            match tokio::fs::read_to_string(table).await {
                Ok(content) => {
                    readable += 1;
                    listeners.extend(listening_ports(&content));
                }
                Err(e) => warn!("Cannot read listener table {}: {}", table.display(), e),
            }
        }

        if readable == 0 {
            return Err(ProbeError::unavailable(
                "TCP listener table",
                format!("none of {:?} could be read", self.tables),
            ));
        }

        debug!("{} listening TCP ports", listeners.len());
        let state = if listeners.contains(&self.port) {
            PortState::Listening
        } else {
            PortState::Unavailable
        };
        Ok(PortStatus {
            port: self.port,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TCP: &str = "  sl  local_address rem_address   st tx_queue rx_queue tr tm->when retrnsmt   uid  timeout inode\n\
   0: 00000000:01BB 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 1 1 0000000000000000 100 0 0 10 0\n\
   1: 0100007F:0277 00000000:0000 0A 00000000:00000000 00:00000000 00000000     0        0 2 1 0000000000000000 100 0 0 10 0\n\
   2: 0F02000A:A3C2 5DB8D822:0050 01 00000000:00000000 00:00000000 00000000  1000        0 3 1 0000000000000000 20 4 30 10 -1\n";

    const TCP6: &str = "  sl  local_address                         remote_address                        st\n\
   0: 00000000000000000000000000000000:0016 00000000000000000000000000000000:0000 0A 00000000:00000000\n";

    #[test]
    fn test_listening_ports() {
        let ports = listening_ports(TCP);
        assert_eq!(ports.into_iter().collect::<Vec<_>>(), vec![443, 631]);
        assert!(listening_ports(TCP6).contains(&22));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("443").unwrap(), 443);
        assert!(matches!(parse_port("4a3"), Err(ProbeError::InvalidFormat { .. })));
        assert!(matches!(parse_port("44.3"), Err(ProbeError::InvalidFormat { .. })));
        assert!(matches!(parse_port("-1"), Err(ProbeError::InvalidFormat { .. })));
        assert!(matches!(parse_port("65536"), Err(ProbeError::OutOfRange { .. })));
        assert_eq!(parse_port("65535").unwrap(), 65535);
    }

    #[tokio::test]
    async fn test_port_lookup() {
        let mut v4 = tempfile::NamedTempFile::new().unwrap();
        v4.write_all(TCP.as_bytes()).unwrap();
        let mut v6 = tempfile::NamedTempFile::new().unwrap();
        v6.write_all(TCP6.as_bytes()).unwrap();
        let tables = vec![v4.path().to_path_buf(), v6.path().to_path_buf()];

        let open = ProcNetListeners::new(22, tables.clone()).read_once().await.unwrap();
        assert_eq!(open.state, PortState::Listening);
        assert_eq!(open.reading(), MetricReading::new(1.0, Unit::Boolean));

        // 41922 only appears as an ESTABLISHED local port
        let closed = ProcNetListeners::new(41922, tables).read_once().await.unwrap();
        assert_eq!(closed.state, PortState::Unavailable);
        assert_eq!(closed.reading().value, 0.0);
    }

    #[tokio::test]
    async fn test_no_tables() {
        let err = ProcNetListeners::new(22, vec![PathBuf::from("/symbion/none")])
            .read_once()
            .await
            .unwrap_err();
        assert!(matches!(err, ProbeError::ResourceUnavailable { .. }));
    }
}
