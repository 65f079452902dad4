//! `symbion-probe` entry point: run one probe, print its line, exit with its code

use symbion_probes::cli;
use symbion_probes::config::{warn_rejected, ProbeConfig};
use symbion_probes::providers::hostname;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Log filter override, e.g. `SYMBION_PROBES_LOG=symbion_probes=debug`
const LOG_ENV: &str = "SYMBION_PROBES_LOG";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = match cli::parse(std::env::args_os()) {
        Ok(cli) => cli,
        Err(usage) => {
            println!("{}", usage.text.trim_end());
            std::process::exit(usage.code);
        }
    };

    let (config, rejected) = ProbeConfig::load(cli.config.as_deref());
    init_logging(&config);
    if let Some(reason) = &rejected {
        warn_rejected(reason);
    }
    debug!("Loaded config: {:?}", config);

    let report = cli::execute(&cli.command, &config, &hostname()).await;
    println!("{}", report);
    std::process::exit(report.exit_code());
}

// Logs go to stderr; stdout carries only the status line
fn init_logging(config: &ProbeConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
