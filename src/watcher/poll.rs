//! Trigger watcher: polls the store for `trigger-N.flag` artifacts and
//! runs the bound matrix work unit once per appearance. A trigger that
//! disappears and reappears is re-armed; one that merely persists is not
//! re-run. Interrupt exits the loop cleanly with no further cleanup.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use ouro_core::{trigger_name, DATA_LOG};

use super::datalog;
use super::matrix::{self, MatrixOp};
use crate::cascade::namestore::Namestore;

#[derive(Clone, Debug)]
pub struct WatcherConfig {
    pub store_root: PathBuf,
    pub interval: Duration,
}

pub async fn run_watcher(config: WatcherConfig) {
    let store = Namestore::new(&config.store_root);
    let mut processed: HashSet<u8> = HashSet::new();
    let mut ticker = tokio::time::interval(config.interval);

    info!(
        "watching {} for trigger artifacts (ctrl-c to stop)",
        config.store_root.display()
    );
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("watcher stopped by interrupt");
                break;
            }
            _ = ticker.tick() => {
                check_triggers(&store, &mut processed).await;
            }
        }
    }
}

async fn check_triggers(store: &Namestore, processed: &mut HashSet<u8>) {
    for choice in 1..=4u8 {
        let name = trigger_name(choice);
        let present = store.exists(&name).await;

        if present && !processed.contains(&choice) {
            let Some(op) = MatrixOp::for_trigger(choice) else {
                continue;
            };
            info!("found {name}, running {} work unit", op.name());
            let results = matrix::run_work_unit(op);
            match datalog::append(&store.path(DATA_LOG), &results).await {
                Ok(()) => info!("appended {} results to {DATA_LOG}", results.len()),
                Err(e) => warn!("failed to append results for {name}: {e}"),
            }
            processed.insert(choice);
        } else if present {
            info!("{name} still present (already processed)");
        } else if processed.remove(&choice) {
            info!("{name} disappeared, trigger re-armed");
        } else {
            info!("{name} is missing");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn trigger_runs_once_per_appearance_and_rearms() {
        let dir = tempfile::tempdir().unwrap();
        let store = Namestore::new(dir.path());
        let mut processed = HashSet::new();

        store.write(&trigger_name(4), b"").await.unwrap();
        check_triggers(&store, &mut processed).await;
        let first = datalog::load(&store.path(DATA_LOG)).await.unwrap();
        assert_eq!(first.len(), 25);

        // persisting trigger does not re-run the work unit
        check_triggers(&store, &mut processed).await;
        assert_eq!(datalog::load(&store.path(DATA_LOG)).await.unwrap().len(), 25);

        // disappearance re-arms, reappearance re-runs
        store.remove(&trigger_name(4)).await;
        check_triggers(&store, &mut processed).await;
        assert!(!processed.contains(&4));
        store.write(&trigger_name(4), b"").await.unwrap();
        check_triggers(&store, &mut processed).await;
        assert_eq!(datalog::load(&store.path(DATA_LOG)).await.unwrap().len(), 50);
    }
}
