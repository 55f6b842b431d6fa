//! Audit trail endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::services::audit::AuditEntry;

#[derive(Deserialize, IntoParams)]
pub struct AuditQuery {
    /// Maximum number of entries, newest first
    pub limit: Option<usize>,
}

/// Recent gateway actions, newest first
#[utoipa::path(
    get,
    path = "/audit",
    tag = "audit",
    params(AuditQuery),
    responses(
        (status = 200, description = "Recent audit entries", body = Vec<AuditEntry>)
    )
)]
pub async fn list_audit(
    State(state): State<crate::AppState>,
    Query(query): Query<AuditQuery>,
) -> Json<Vec<AuditEntry>> {
    let limit = query.limit.unwrap_or(100);
    Json(state.services.audit.recent(limit).await)
}
