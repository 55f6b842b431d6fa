//! Audit trail for gateway actions

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::engine::clock::Clock;

/// One librarian-facing action as the gateway saw it
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AuditEntry {
    pub at: DateTime<Utc>,
    /// Acting librarian, when the action has one (submissions and
    /// cancellations are patron-initiated)
    pub actor_id: Option<i64>,
    pub action: &'static str,
    pub entity_id: i64,
    pub title_id: Option<i64>,
}

/// Append-only in-memory audit log
#[derive(Clone)]
pub struct AuditService {
    entries: Arc<RwLock<Vec<AuditEntry>>>,
    clock: Arc<dyn Clock>,
}

impl AuditService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
            clock,
        }
    }

    pub async fn record(
        &self,
        actor_id: Option<i64>,
        action: &'static str,
        entity_id: i64,
        title_id: Option<i64>,
    ) {
        let entry = AuditEntry {
            at: self.clock.now(),
            actor_id,
            action,
            entity_id,
            title_id,
        };
        tracing::info!(
            actor_id = ?entry.actor_id,
            action = entry.action,
            entity_id = entry.entity_id,
            title_id = ?entry.title_id,
            "gateway action"
        );
        self.entries.write().await.push(entry);
    }

    /// Most recent entries first
    pub async fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        let entries = self.entries.read().await;
        entries.iter().rev().take(limit).cloned().collect()
    }
}
