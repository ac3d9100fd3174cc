//! Artifact reaper: deletes one named artifact whenever it appears. This
//! is the external antagonist that forces the cascade onto its failure
//! path by deleting the successor between write and load.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::cascade::namestore::{Namestore, RemoveStatus};

#[derive(Clone, Debug)]
pub struct ReaperConfig {
    pub store_root: PathBuf,
    /// Artifact name to delete on sight.
    pub name: String,
    pub interval: Duration,
}

pub async fn run_reaper(config: ReaperConfig) {
    let store = Namestore::new(&config.store_root);
    let mut ticker = tokio::time::interval(config.interval);

    info!("watching for {} to delete (ctrl-c to stop)", config.name);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("reaper stopped by interrupt");
                break;
            }
            _ = ticker.tick() => {
                reap_once(&store, &config.name).await;
            }
        }
    }
}

/// One reaper tick: best-effort removal of the named artifact, logged.
pub async fn reap_once(store: &Namestore, name: &str) -> RemoveStatus {
    let status = store.remove(name).await;
    match &status {
        RemoveStatus::Removed => info!("deleted {name}"),
        RemoveStatus::NotFound => info!("no {name} found"),
        RemoveStatus::Failed(cause) => warn!("failed to delete {name}: {cause}"),
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reap_deletes_on_sight_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let store = Namestore::new(dir.path());

        assert_eq!(
            reap_once(&store, "successor.agent").await,
            RemoveStatus::NotFound
        );

        store.write("successor.agent", b"{}").await.unwrap();
        assert_eq!(
            reap_once(&store, "successor.agent").await,
            RemoveStatus::Removed
        );
        assert!(!store.exists("successor.agent").await);

        // the next tick over the now-empty store is a quiet miss
        assert_eq!(
            reap_once(&store, "successor.agent").await,
            RemoveStatus::NotFound
        );
    }
}
