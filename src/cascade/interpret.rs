//! Agent interpretation: the role switch that executes one agent artifact
//! inside the current process.
//!
//! Generated agents are data, never code. "Loading" an agent means reading
//! its artifact, parsing the versioned record, and executing the role's
//! fixed behavior; the three failure shapes (missing artifact, malformed
//! record, failing role action) all collapse into one typed outcome.

use futures::future::BoxFuture;
use serde_json::json;

use ouro_core::{
    AgentDefinition, AgentRole, Error, ExecutionOutcome, Result, SpawnDirective,
    AGENT_FORMAT_VERSION, ORCHESTRATOR, SELECTOR,
};

use super::launcher::LaunchMode;
use super::log;
use super::namestore::RemoveStatus;
use super::orchestrator::Cascade;

impl Cascade {
    /// The branch decision primitive: interpret an artifact and fold any
    /// error into an [`ExecutionOutcome`]. No partial-success states, no
    /// automatic retry.
    pub async fn attempt(&mut self, name: &str) -> ExecutionOutcome {
        log::info("load_attempt", json!({ "artifact": name }));
        match self.interpret(name).await {
            Ok(()) => ExecutionOutcome::success(),
            Err(e) => ExecutionOutcome::failure(e.to_string()),
        }
    }

    /// Read, parse, and execute one agent artifact. Boxed because the
    /// orchestrator role re-enters the cascade, which re-enters here.
    pub fn interpret<'a>(&'a mut self, name: &'a str) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            let raw = self.store.read(name).await?;
            let def: AgentDefinition = serde_json::from_slice(&raw).map_err(|e| Error::Malformed {
                artifact: name.to_string(),
                source: e,
            })?;
            if def.version != AGENT_FORMAT_VERSION {
                return Err(Error::Version {
                    artifact: name.to_string(),
                    found: def.version,
                });
            }

            log::info(
                "agent_start",
                json!({ "artifact": name, "role": def.role.to_string() }),
            );
            self.execute_role(name, &def).await?;

            if def.self_delete {
                self.self_delete(name).await;
            }

            // Detached hand-off is always the agent's very last action; its
            // failure is logged but cannot fail an already-finished agent.
            if let SpawnDirective::Detached { artifact } = &def.spawn {
                let path = self.store.path(artifact);
                if let Err(e) = self.launcher.spawn_detached(&path) {
                    log::warn(
                        "detached_spawn_failed",
                        json!({ "artifact": artifact, "error": e.to_string() }),
                    );
                }
            }
            Ok(())
        })
    }

    async fn execute_role(&mut self, name: &str, def: &AgentDefinition) -> Result<()> {
        match def.role {
            AgentRole::Orchestrator => {
                self.run().await?;
            }

            AgentRole::Successor => {
                let source = embedded(name, def)?;
                self.store.write(ORCHESTRATOR, source.as_bytes()).await?;
                log::info(
                    "orchestrator_overwritten",
                    json!({ "artifact": ORCHESTRATOR, "bytes": source.len() }),
                );
            }

            AgentRole::Marker => {
                // The written record is itself the success marker; executing
                // it confirms the evidence is in place.
                log::info("marker_confirmed", json!({ "artifact": name }));
                println!("cascade success: marker artifact {name} is in place");
            }

            AgentRole::RecoveryA => {
                let source = embedded(name, def)?;
                for remaining in (1..=self.config.countdown_ticks).rev() {
                    log::info("countdown_tick", json!({ "remaining": remaining }));
                    tokio::time::sleep(self.config.countdown_tick).await;
                }
                self.store.write(ORCHESTRATOR, source.as_bytes()).await?;
                log::info("orchestrator_recreated", json!({ "artifact": ORCHESTRATOR }));
            }

            AgentRole::RecoveryB => {
                let target = match &def.spawn {
                    SpawnDirective::Supervised { artifact } => artifact.clone(),
                    _ => SELECTOR.to_string(),
                };
                if self.store.exists(&target).await {
                    let outcome = match self.launcher.mode() {
                        LaunchMode::Subprocess => {
                            let path = self.store.path(&target);
                            self.launcher.spawn_supervised(&path).await
                        }
                        LaunchMode::InProcess => self.attempt(&target).await,
                    };
                    log::info(
                        "selector_exit",
                        json!({
                            "artifact": target,
                            "succeeded": outcome.succeeded,
                            "detail": outcome.error_detail,
                        }),
                    );
                } else {
                    log::info("selector_missing", json!({ "artifact": target }));
                }
            }

            AgentRole::Selector => {
                crate::selector::run_menu(&self.store).await?;
            }
        }
        Ok(())
    }

    /// Per-agent self-deletion: attempted exactly once, never retried, and
    /// never allowed to fail the agent that requested it.
    async fn self_delete(&mut self, name: &str) {
        match self.store.remove(name).await {
            RemoveStatus::Removed => log::info("self_delete", json!({ "artifact": name })),
            RemoveStatus::NotFound => {
                log::info("self_delete_not_found", json!({ "artifact": name }))
            }
            RemoveStatus::Failed(cause) => log::error(
                "self_delete_failed",
                json!({ "artifact": name, "cause": cause }),
            ),
        }
    }
}

fn embedded<'a>(name: &str, def: &'a AgentDefinition) -> Result<&'a str> {
    def.embedded_source
        .as_deref()
        .ok_or_else(|| Error::artifact(name, "record carries no embedded source"))
}
