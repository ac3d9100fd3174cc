//! Agent Template Builder: produces the versioned agent record for each
//! cascade role. Pure text generation; no filesystem access happens here.

use ouro_core::{
    AgentDefinition, AgentRole, Result, SpawnDirective, AGENT_FORMAT_VERSION, ORCHESTRATOR,
    SELECTOR,
};

fn definition(role: AgentRole, embedded_source: Option<String>) -> AgentDefinition {
    AgentDefinition {
        version: AGENT_FORMAT_VERSION,
        role,
        embedded_source,
        self_delete: true,
        spawn: SpawnDirective::None,
    }
}

/// First-generation orchestrator record, written only when the store holds
/// no orchestrator artifact yet. Every later generation is an overwrite of
/// the same name by a successor or recovery agent. The cascade run performs
/// its own terminal self-delete, so the record must not request a second
/// one from the interpreter.
pub fn orchestrator_seed() -> AgentDefinition {
    AgentDefinition {
        self_delete: false,
        ..definition(AgentRole::Orchestrator, None)
    }
}

/// Overwrites the orchestrator artifact with the embedded capture, then
/// self-deletes.
pub fn successor(embedded: &str) -> AgentDefinition {
    definition(AgentRole::Successor, Some(embedded.to_string()))
}

/// Success evidence. Deliberately the only role that never self-deletes:
/// the written record is the durable proof the success path completed.
pub fn marker() -> AgentDefinition {
    AgentDefinition {
        self_delete: false,
        ..definition(AgentRole::Marker, None)
    }
}

/// Countdown, recreate the orchestrator artifact from the embedded capture,
/// self-delete, then hand off to a fresh detached orchestrator.
pub fn recovery_a(embedded: &str) -> AgentDefinition {
    AgentDefinition {
        spawn: SpawnDirective::Detached {
            artifact: ORCHESTRATOR.to_string(),
        },
        ..definition(AgentRole::RecoveryA, Some(embedded.to_string()))
    }
}

/// Runs the external selector under supervision if its artifact exists,
/// then self-deletes.
pub fn recovery_b() -> AgentDefinition {
    AgentDefinition {
        spawn: SpawnDirective::Supervised {
            artifact: SELECTOR.to_string(),
        },
        ..definition(AgentRole::RecoveryB, None)
    }
}

/// Record the external selector writes for itself so recovery agents can
/// find and supervise it.
pub fn selector() -> AgentDefinition {
    definition(AgentRole::Selector, None)
}

/// Render a record to its on-disk form.
pub fn render(def: &AgentDefinition) -> Result<String> {
    let mut text = serde_json::to_string_pretty(def)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successor_carries_capture_and_self_deletes() {
        let def = successor("captured blob");
        assert_eq!(def.role, AgentRole::Successor);
        assert_eq!(def.embedded_source.as_deref(), Some("captured blob"));
        assert!(def.self_delete);
        assert_eq!(def.spawn, SpawnDirective::None);
    }

    #[test]
    fn self_delete_requests_per_role() {
        // the marker persists as evidence; the orchestrator's terminal
        // delete belongs to the cascade run, never to the interpreter
        assert!(!marker().self_delete);
        assert!(!orchestrator_seed().self_delete);
        for def in [successor(""), recovery_a(""), recovery_b(), selector()] {
            assert!(def.self_delete, "{} should self-delete", def.role);
        }
    }

    #[test]
    fn recovery_a_respawns_the_orchestrator_detached() {
        let def = recovery_a("blob");
        assert_eq!(
            def.spawn,
            SpawnDirective::Detached {
                artifact: ORCHESTRATOR.to_string()
            }
        );
        assert!(def.embedded_source.is_some());
    }

    #[test]
    fn recovery_b_supervises_the_selector() {
        let def = recovery_b();
        assert_eq!(
            def.spawn,
            SpawnDirective::Supervised {
                artifact: SELECTOR.to_string()
            }
        );
        assert!(def.embedded_source.is_none());
    }

    #[test]
    fn rendered_records_parse_back() {
        let text = render(&recovery_a("blob")).unwrap();
        assert!(text.ends_with('\n'));
        let back: AgentDefinition = serde_json::from_str(&text).unwrap();
        assert_eq!(back, recovery_a("blob"));
    }
}
