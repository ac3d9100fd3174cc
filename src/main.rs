//! ouro - self-regenerating file-agent cascade runtime
//!
//! Usage:
//!   ouro run                → run one orchestrator cascade over the store
//!   ouro agent FILE         → interpret a single agent artifact (spawn form)
//!   ouro watch              → trigger watcher + matrix work units
//!   ouro reap               → delete a named artifact whenever it appears
//!   ouro train              → linear-regression trainer over the data log
//!   ouro select             → interactive trigger selector

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{info, warn};

use ouro::cascade::launcher::LaunchMode;
use ouro::cascade::namestore::Namestore;
use ouro::cascade::orchestrator::{Cascade, CascadeBranch, CascadeConfig};
use ouro::selector;
use ouro::watcher::poll::{self, WatcherConfig};
use ouro::watcher::reaper::{self, ReaperConfig};
use ouro::watcher::train::{self, TrainerConfig};

#[derive(Parser)]
#[command(
    name = "ouro",
    about = "Self-regenerating file-agent cascade runtime",
    version = env!("CARGO_PKG_VERSION")
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding the shared artifact namestore
    #[arg(long, global = true, default_value = ".")]
    store: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one orchestrator cascade over the store
    Run {
        /// Interpret supervised agents in-process and only record detached
        /// spawns, instead of launching child processes
        #[arg(long, default_value_t = false)]
        in_process: bool,

        /// Recovery countdown tick length in milliseconds
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
    },
    /// Interpret a single agent artifact (the form spawns use)
    Agent {
        /// Path to the agent artifact; its directory is the store
        path: PathBuf,

        /// Recovery countdown tick length in milliseconds
        #[arg(long, default_value_t = 1000)]
        tick_ms: u64,
    },
    /// Watch for trigger artifacts and run the bound matrix work units
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value_t = 2)]
        interval_secs: u64,
    },
    /// Delete a named artifact whenever it appears
    Reap {
        /// Artifact name to delete on sight
        #[arg(long, default_value = ouro_core::SUCCESSOR)]
        name: String,

        /// Poll interval in seconds
        #[arg(long, default_value_t = 1)]
        interval_secs: u64,
    },
    /// Train the linear model over the accumulated data log
    Train {
        /// Look-back window size
        #[arg(long, default_value_t = 5)]
        look_back: usize,

        /// Seconds between data-log checks while waiting for samples
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,

        /// Steps to predict (default: as many as there are samples)
        #[arg(long)]
        predict_steps: Option<usize>,
    },
    /// Present the numeric menu and write the chosen trigger artifact
    Select,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { in_process, tick_ms } => {
            let mut config = CascadeConfig::new(&cli.store, std::env::current_exe()?);
            config.mode = if in_process {
                LaunchMode::InProcess
            } else {
                LaunchMode::Subprocess
            };
            config.countdown_tick = Duration::from_millis(tick_ms);

            let mut cascade = Cascade::new(config);
            let report = cascade.run().await?;
            match report.branch {
                CascadeBranch::Success => info!("cascade finished on the success branch"),
                CascadeBranch::Failure => warn!(
                    "cascade finished on the failure branch: {}",
                    report
                        .load
                        .error_detail
                        .unwrap_or_else(|| "no detail".into())
                ),
            }
        }

        Commands::Agent { path, tick_ms } => {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| anyhow::anyhow!("artifact path has no file name"))?
                .to_string();
            let store_root = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => std::env::current_dir()?,
            };

            let mut config = CascadeConfig::new(store_root, std::env::current_exe()?);
            config.countdown_tick = Duration::from_millis(tick_ms);

            let mut cascade = Cascade::new(config);
            let outcome = cascade.attempt(&name).await;
            if !outcome.succeeded {
                // surface failure to the supervising parent via exit status
                anyhow::bail!(
                    "agent {name} failed: {}",
                    outcome.error_detail.unwrap_or_else(|| "no detail".into())
                );
            }
        }

        Commands::Watch { interval_secs } => {
            poll::run_watcher(WatcherConfig {
                store_root: cli.store,
                interval: Duration::from_secs(interval_secs),
            })
            .await;
        }

        Commands::Reap {
            name,
            interval_secs,
        } => {
            reaper::run_reaper(ReaperConfig {
                store_root: cli.store,
                name,
                interval: Duration::from_secs(interval_secs),
            })
            .await;
        }

        Commands::Train {
            look_back,
            interval_secs,
            predict_steps,
        } => {
            train::run_trainer(TrainerConfig {
                store_root: cli.store,
                look_back,
                check_interval: Duration::from_secs(interval_secs),
                predict_steps,
            })
            .await?;
        }

        Commands::Select => {
            let store = Namestore::new(&cli.store);
            selector::run_menu(&store).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ouro=info".into()),
        )
        .init();
}
