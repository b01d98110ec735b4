//! Binary entrypoint for the SwitchKey macOS app.
use std::{
    env,
    path::{Path, PathBuf},
    process,
    sync::Arc,
    time::Duration,
};

use clap::{Parser, Subcommand};
use switchkey_engine::{Error as EngineError, Switcher, WorkspaceActivator};
use tracing::{info, warn};

/// Config document loading and validation.
mod config;

#[derive(Parser, Debug)]
#[command(name = "switchkey", about = "A right-Command application switcher for macOS", version)]
/// Command-line interface for the `switchkey` binary.
struct Cli {
    /// Optional subcommand.
    #[command(subcommand)]
    command: Option<Command>,

    /// Logging controls
    #[command(flatten)]
    log: logging::LogArgs,

    /// Optional path to the config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
/// Top-level CLI subcommands.
enum Command {
    /// Load and validate the configuration then exit.
    Check {
        /// Path to configuration file to check (defaults to ~/.switchkey/config.ron)
        path: Option<PathBuf>,

        /// Dump the resolved trigger table as JSON to stdout
        #[arg(long)]
        dump: bool,
    },
    /// Print the current permission status as JSON and exit.
    Permissions,
}

/// Default location of the config document.
fn default_config_path() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".switchkey")
        .join("config.ron")
}

/// Load the config or exit with a diagnostic.
fn load_config_or_exit(path: &Path) -> config::Config {
    match config::load(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

/// Open the Input Monitoring pane of System Settings.
fn open_input_monitoring_settings() {
    if process::Command::new("open")
        .arg("x-apple.systempreferences:com.apple.preference.security?Privacy_ListenEvent")
        .spawn()
        .is_err()
    {
        warn!("failed to open Input Monitoring settings");
    }
}

/// Retry `start()` until Input Monitoring is granted.
///
/// The system prompt fires at most once; beyond that the user has to act in
/// System Settings, so we deep-link there and poll.
async fn start_when_permitted(switcher: &Switcher) {
    let mut prompted = false;
    loop {
        match switcher.start() {
            Ok(()) => return,
            Err(EngineError::PermissionDenied(which)) => {
                if !prompted {
                    prompted = true;
                    let _ = permissions::request_input_monitoring();
                    open_input_monitoring_settings();
                    eprintln!(
                        "switchkey needs the Input Monitoring permission; \
                         grant it in System Settings → Privacy & Security → Input Monitoring"
                    );
                }
                info!(permission = which, "waiting_for_permission_grant");
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
            Err(err) => {
                eprintln!("failed to start interception: {err}");
                process::exit(1);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_subscriber(&cli.log.spec());

    match cli.command {
        Some(Command::Check { path, dump }) => {
            let path = path
                .or(cli.config)
                .unwrap_or_else(default_config_path);
            let cfg = load_config_or_exit(&path);
            if dump {
                let view: std::collections::BTreeMap<char, Vec<&str>> = cfg
                    .mappings
                    .iter()
                    .map(|(k, ids)| (k.to_char(), ids.iter().map(|a| a.as_str()).collect()))
                    .collect();
                match serde_json::to_string_pretty(&view) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("failed to serialize trigger table: {e}");
                        process::exit(1);
                    }
                }
            } else {
                println!("OK");
            }
        }
        Some(Command::Permissions) => {
            let status = permissions::check_permissions();
            match serde_json::to_string_pretty(&status) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("failed to serialize permission status: {e}");
                    process::exit(1);
                }
            }
        }
        None => {
            let path = cli.config.unwrap_or_else(default_config_path);
            let cfg = load_config_or_exit(&path);

            let switcher = Switcher::new(Arc::new(WorkspaceActivator::new()));
            switcher.update_app_mappings(cfg.mappings);

            start_when_permitted(&switcher).await;
            info!("switchkey_running");

            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "ctrl_c_listener_failed");
            }
            switcher.stop();
        }
    }
}
