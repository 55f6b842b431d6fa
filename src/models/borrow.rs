//! Borrow request model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::BorrowStatus;

/// A user's request to take a specific title, and the permanent loan record
/// once approved. Requests are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BorrowRequest {
    pub id: i64,
    pub user_id: i64,
    pub title_id: i64,
    /// The copy held for this request; assigned at submission so the
    /// approval window cannot oversubscribe the title
    pub copy_id: Option<i64>,
    pub status: BorrowStatus,
    pub requested_at: DateTime<Utc>,
    pub approver_id: Option<i64>,
    pub borrow_date: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub return_date: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

impl BorrowRequest {
    /// Overdue-ness is derived, never stored: past due and not yet returned
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        match (self.due_date, self.return_date) {
            (Some(due), None) => now > due,
            _ => false,
        }
    }
}

/// Borrow request with derived fields for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BorrowDetails {
    #[serde(flatten)]
    pub request: BorrowRequest,
    pub is_overdue: bool,
}

impl BorrowDetails {
    pub fn new(request: BorrowRequest, now: DateTime<Utc>) -> Self {
        let is_overdue = request.is_overdue(now);
        Self { request, is_overdue }
    }
}
