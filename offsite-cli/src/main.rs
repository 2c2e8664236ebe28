//! Offsite — background directory-mirroring daemon.
//!
//! # Usage
//!
//! ```text
//! offsite start [--config <path>] [--foreground]
//! offsite config [--config <path>]
//! ```
//!
//! `start` detaches from the terminal and runs the sync loop until killed;
//! `--foreground` skips the detach so logs stay on stderr. `config`
//! resolves, validates, and prints the effective configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use offsite_core::{config, Config};

#[derive(Parser, Debug)]
#[command(
    name = "offsite",
    version,
    about = "Mirror local directories to a remote host on a fixed interval",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Detach from the terminal and run the sync loop until killed.
    Start(StartArgs),

    /// Print the resolved configuration after validation.
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct StartArgs {
    /// Config file path (default: ~/.offsite/config.yaml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stay attached to the terminal instead of daemonizing.
    #[arg(long)]
    foreground: bool,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Config file path (default: ~/.offsite/config.yaml).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start(args) => {
            let config = load_config(args.config.as_deref())?;
            if !args.foreground {
                // Everything after this line runs in the final surviving
                // process; the intermediate fork branches exit 0.
                offsite_daemon::detach(&config.log_dir, config.umask)
                    .context("failed to detach from terminal")?;
            }
            offsite_daemon::start_blocking(config).context("daemon exited with error")?;
        }
        Commands::Config(args) => {
            let config = load_config(args.config.as_deref())?;
            print!(
                "{}",
                serde_yaml::to_string(&config).context("failed to render config YAML")?
            );
        }
    }

    Ok(())
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => config::load_at(path)
            .with_context(|| format!("failed to load config from {}", path.display())),
        None => config::load().context("failed to load ~/.offsite/config.yaml"),
    }
}
