//! DriveGuard daemon: entry point for running an ignition attempt.

mod scenario;

use anyhow::Context;
use clap::Parser;
use driveguard_controller::shutdown::interrupted;
use driveguard_controller::{ControllerConfig, IgnitionController, ShutdownController};
use driveguard_nullables::NullActuator;
use driveguard_types::{Clock, SystemClock};
use driveguard_utils::{format_duration, init_logging, LogFormat};
use scenario::Scenario;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "driveguard", about = "DriveGuard ignition gate")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "DRIVEGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Directory under which session workspaces are created.
    #[arg(long, env = "DRIVEGUARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DRIVEGUARD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DRIVEGUARD_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Skip the gas sensor stabilization delay.
    #[arg(long, env = "DRIVEGUARD_NO_WARMUP")]
    no_warmup: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run a verification attempt.
    Attempt {
        #[command(subcommand)]
        action: AttemptAction,
    },
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect session records.
    Record {
        #[command(subcommand)]
        action: RecordAction,
    },
}

#[derive(clap::Subcommand)]
enum AttemptAction {
    /// Run one attempt against simulated hardware described by a scenario file.
    Simulate {
        #[arg(long)]
        scenario: PathBuf,

        /// Keep an allowed ignition until interrupted instead of releasing
        /// the relay right away.
        #[arg(long)]
        hold: bool,

        /// Print the Prometheus text exposition after the attempt.
        #[arg(long)]
        metrics: bool,
    },
}

#[derive(clap::Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML.
    Show,
}

#[derive(clap::Subcommand)]
enum RecordAction {
    /// Print a session record.
    Show { path: PathBuf },
}

fn load_config(cli: &Cli) -> anyhow::Result<ControllerConfig> {
    let mut config = match &cli.config {
        Some(path) => ControllerConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ControllerConfig::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    if cli.no_warmup {
        config.sensor_warmup = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format, &config.log_level);
    if let Some(path) = &cli.config {
        tracing::info!(path = %path.display(), "loaded config");
    }

    match cli.command {
        Command::Attempt { action } => match action {
            AttemptAction::Simulate {
                scenario,
                hold,
                metrics,
            } => simulate(config, &scenario, hold, metrics).await,
        },
        Command::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", config.to_toml_string()?);
                Ok(())
            }
        },
        Command::Record { action } => match action {
            RecordAction::Show { path } => {
                let record = driveguard_store::read_record(&path)?;
                println!("{}", serde_json::to_string_pretty(&record)?);
                Ok(())
            }
        },
    }
}

async fn simulate(
    config: ControllerConfig,
    scenario_path: &Path,
    hold: bool,
    print_metrics: bool,
) -> anyhow::Result<()> {
    let scenario = Scenario::from_toml_file(scenario_path)?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let collaborators = scenario.collaborators(&config.params, Arc::clone(&clock));

    let shutdown = Arc::new(ShutdownController::new());
    let mut interrupt = shutdown.subscribe();
    let signals = {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move { shutdown.wait_for_signal().await })
    };

    let mut controller =
        IgnitionController::new(config, collaborators, Box::new(NullActuator::new()), clock)?;

    let outcome = controller.run_attempt(&mut interrupt).await;
    match &outcome {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report.record)?);
            tracing::info!(
                session = %report.session_id,
                verdict = report.verdict,
                relay = %report.actuator_state,
                elapsed = %format_duration(report.elapsed),
                "attempt finished"
            );
            if report.verdict && hold {
                tracing::info!("ignition allowed; holding until interrupted");
                let cause = interrupted(&mut interrupt).await;
                tracing::info!(%cause, "releasing ignition");
            }
        }
        Err(e) if e.is_interrupt() => tracing::warn!("attempt interrupted; ignition blocked"),
        Err(e) => tracing::error!(error = %e, "attempt failed; ignition blocked"),
    }

    if print_metrics {
        print!("{}", controller.metrics().encode());
    }

    controller.shutdown()?;
    signals.abort();
    tracing::info!("relay released");

    outcome.map(|_| ()).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("driveguard.toml");
        std::fs::write(
            &path,
            "data_dir = \"/var/lib/driveguard\"\nlog_level = \"debug\"\nsensor_warmup = true\n",
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "driveguard",
            "--config",
            path.to_str().unwrap(),
            "--log-format",
            "json",
            "--no-warmup",
            "config",
            "show",
        ])
        .unwrap();
        let config = load_config(&cli).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/var/lib/driveguard"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(!config.sensor_warmup);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::try_parse_from([
            "driveguard",
            "--config",
            "/nonexistent/driveguard.toml",
            "config",
            "show",
        ])
        .unwrap();
        assert!(load_config(&cli).is_err());
    }
}
