//! Command-line surface: one subcommand per probe
//!
//! Threshold arguments stay raw strings here. Parsing them is the probe's
//! job, so a bad threshold gets the probe's own UNKNOWN line rather than a
//! clap usage error.

use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::classify::Status;
use crate::config::ProbeConfig;
use crate::probes::{
    self, CpuProbe, DiskProbe, EventLogProbe, MemoryProbe, PortProbe, ServiceProbe, UptimeProbe,
};
use crate::providers::{
    BootClock, JournalEvents, ProcNetListeners, ProcStatCounter, SysinfoDisk, SysinfoMemory,
    SystemdService,
};
use crate::report::Report;
use crate::sampler::TokioPause;

#[derive(Debug, Parser)]
#[command(name = "symbion-probe", version, about = "Host health-check probes")]
pub struct Cli {
    /// Config file (defaults to the OS config directory)
    #[arg(long, global = true, env = "SYMBION_PROBES_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: ProbeCommand,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum ProbeCommand {
    /// Free space of one drive or mount point, in percent
    Disk {
        mount: String,
        #[arg(allow_hyphen_values = true)]
        warning: String,
        #[arg(allow_hyphen_values = true)]
        critical: String,
    },
    /// Used physical memory, in percent
    Memory {
        #[arg(allow_hyphen_values = true)]
        warning: String,
        #[arg(allow_hyphen_values = true)]
        critical: String,
    },
    /// Aggregate processor time, in percent
    Cpu {
        #[arg(allow_hyphen_values = true)]
        warning: String,
        #[arg(allow_hyphen_values = true)]
        critical: String,
    },
    /// Processor time of one core, in percent
    CpuCore {
        #[arg(allow_hyphen_values = true)]
        instance: String,
        #[arg(allow_hyphen_values = true)]
        warning: String,
        #[arg(allow_hyphen_values = true)]
        critical: String,
    },
    /// Run state of a named service
    Service {
        #[arg(allow_hyphen_values = true)]
        name: String,
    },
    /// Whether a TCP port has a listener
    Port {
        #[arg(allow_hyphen_values = true)]
        number: String,
    },
    /// Minutes since boot
    Uptime {
        #[arg(allow_hyphen_values = true)]
        warning: String,
        #[arg(allow_hyphen_values = true)]
        critical: String,
    },
    /// Occurrences of an event inside a look-back window
    Eventlog {
        log: String,
        provider: String,
        #[arg(allow_hyphen_values = true)]
        event_id: String,
        #[arg(allow_hyphen_values = true)]
        window_ms: String,
    },
}

/// What to print and how to exit when the arguments do not parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageExit {
    pub text: String,
    pub code: i32,
}

/// Parse the command line. Help and version exit 0; anything else that
/// does not parse exits UNKNOWN with the usage text.
pub fn parse<I, T>(args: I) -> Result<Cli, UsageExit>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args).map_err(|err| {
        let code = match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => Status::Unknown.exit_code(),
        };
        UsageExit {
            text: err.render().to_string(),
            code,
        }
    })
}

/// Build the probe for `command` on the host's real metric sources and run it
pub async fn execute(command: &ProbeCommand, config: &ProbeConfig, host: &str) -> Report {
    let sources = &config.sources;
    let timeout = config.command_timeout();
    let interval = config.sample_interval();

    match command {
        ProbeCommand::Disk {
            mount,
            warning,
            critical,
        } => {
            let built = DiskProbe::new(mount, warning, critical, |target| SysinfoDisk::new(target));
            probes::run_validated(&DiskProbe::<SysinfoDisk>::subject_for(mount), built).await
        }
        ProbeCommand::Memory { warning, critical } => {
            let built = MemoryProbe::new(warning, critical, SysinfoMemory);
            probes::run_validated(MemoryProbe::<SysinfoMemory>::SUBJECT, built).await
        }
        ProbeCommand::Cpu { warning, critical } => {
            let built = CpuProbe::total(
                warning,
                critical,
                |instance| ProcStatCounter::new(&sources.proc_stat, instance),
                TokioPause,
                interval,
            );
            let subject = CpuProbe::<ProcStatCounter, TokioPause>::subject_for("_Total");
            probes::run_validated(&subject, built).await
        }
        ProbeCommand::CpuCore {
            instance,
            warning,
            critical,
        } => {
            let built = CpuProbe::core(
                instance,
                warning,
                critical,
                |instance| ProcStatCounter::new(&sources.proc_stat, instance),
                TokioPause,
                interval,
            );
            let subject = CpuProbe::<ProcStatCounter, TokioPause>::subject_for(instance);
            probes::run_validated(&subject, built).await
        }
        ProbeCommand::Service { name } => {
            let built = ServiceProbe::new(name, |name| {
                SystemdService::new(name, sources.systemctl.as_str(), timeout)
            });
            probes::run_validated(&ServiceProbe::<SystemdService>::subject_for(name), built).await
        }
        ProbeCommand::Port { number } => {
            let built = PortProbe::new(number, host, |port| {
                ProcNetListeners::new(port, sources.tcp_tables.clone())
            });
            probes::run_validated(host, built).await
        }
        ProbeCommand::Uptime { warning, critical } => {
            let built = UptimeProbe::new(warning, critical, host, BootClock);
            probes::run_validated(host, built).await
        }
        ProbeCommand::Eventlog {
            log,
            provider,
            event_id,
            window_ms,
        } => {
            let built = EventLogProbe::new(log, provider, event_id, window_ms, |query| {
                JournalEvents::new(query.clone(), sources.journalctl.as_str(), timeout)
            });
            probes::run_validated(&EventLogProbe::<JournalEvents>::subject_for(log), built).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> ProbeCommand {
        let mut argv = vec!["symbion-probe"];
        argv.extend_from_slice(args);
        parse(argv).unwrap().command
    }

    #[test]
    fn test_parse_subcommands() {
        assert_eq!(
            command(&["memory", "80", "90"]),
            ProbeCommand::Memory {
                warning: "80".into(),
                critical: "90".into()
            }
        );
        assert_eq!(
            command(&["cpu-core", "3", "60.5", "80"]),
            ProbeCommand::CpuCore {
                instance: "3".into(),
                warning: "60.5".into(),
                critical: "80".into()
            }
        );
        assert_eq!(
            command(&["eventlog", "system", "sshd", "*", "60000"]),
            ProbeCommand::Eventlog {
                log: "system".into(),
                provider: "sshd".into(),
                event_id: "*".into(),
                window_ms: "60000".into()
            }
        );
    }

    #[test]
    fn test_negative_thresholds_reach_the_probe() {
        assert_eq!(
            command(&["uptime", "-5", "-10"]),
            ProbeCommand::Uptime {
                warning: "-5".into(),
                critical: "-10".into()
            }
        );
    }

    #[test]
    fn test_usage_errors_are_unknown() {
        let exit = parse(["symbion-probe", "memory", "80"]).unwrap_err();
        assert_eq!(exit.code, 3);
        assert!(!exit.text.is_empty());

        let exit = parse(["symbion-probe", "swap", "1", "2"]).unwrap_err();
        assert_eq!(exit.code, 3);
    }

    #[test]
    fn test_no_arguments_prints_usage() {
        let exit = parse(["symbion-probe"]).unwrap_err();
        assert_eq!(exit.code, 3);
        assert!(exit.text.contains("Usage"));
        assert!(exit.text.contains("memory"));
    }

    #[test]
    fn test_help_exits_zero() {
        let exit = parse(["symbion-probe", "--help"]).unwrap_err();
        assert_eq!(exit.code, 0);
        assert!(exit.text.contains("disk"));
    }

    #[tokio::test]
    async fn test_rejected_thresholds_touch_nothing() {
        let report = execute(
            &ProbeCommand::Memory {
                warning: "90".into(),
                critical: "80".into(),
            },
            &ProbeConfig::default(),
            "host",
        )
        .await;
        assert_eq!(report.exit_code(), 3);
        assert!(report.render().starts_with("Memory: UNKNOWN! "));
    }

    #[tokio::test]
    async fn test_cpu_core_from_stat_file() {
        use std::io::Write;

        // Same content twice: zero tick interval, reported as UNKNOWN
        let mut stat = tempfile::NamedTempFile::new().unwrap();
        stat.write_all(b"cpu  10 0 10 80 0 0 0 0 0 0\ncpu0 10 0 10 80 0 0 0 0 0 0\n")
            .unwrap();

        let mut config = ProbeConfig::default();
        config.sources.proc_stat = stat.path().to_path_buf();
        config.sampling.interval_ms = 0;

        let report = execute(
            &ProbeCommand::CpuCore {
                instance: "0".into(),
                warning: "60".into(),
                critical: "80".into(),
            },
            &config,
            "host",
        )
        .await;
        assert_eq!(report.exit_code(), 3);
        assert!(report.render().starts_with("[0]: UNKNOWN! "));

        let report = execute(
            &ProbeCommand::CpuCore {
                instance: "7".into(),
                warning: "60".into(),
                critical: "80".into(),
            },
            &config,
            "host",
        )
        .await;
        assert_eq!(report.exit_code(), 3);
        assert!(report.summary.contains("Processor Instance [7]"));
    }

    #[tokio::test]
    async fn test_port_from_listener_table() {
        use std::io::Write;

        let mut table = tempfile::NamedTempFile::new().unwrap();
        table
            .write_all(
                b"  sl  local_address rem_address   st tx_queue rx_queue\n   \
                  0: 00000000:01BB 00000000:0000 0A 00000000:00000000\n",
            )
            .unwrap();

        let mut config = ProbeConfig::default();
        config.sources.tcp_tables = vec![table.path().to_path_buf()];

        let open = execute(&ProbeCommand::Port { number: "443".into() }, &config, "web01").await;
        assert_eq!(open.exit_code(), 0);

        let closed = execute(&ProbeCommand::Port { number: "8443".into() }, &config, "web01").await;
        assert_eq!(closed.exit_code(), 2);
    }
}
