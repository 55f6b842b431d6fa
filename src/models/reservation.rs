//! Reservation (wait-list entry) model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::ReservationStatus;

/// A wait-list entry for a title with no free copies.
///
/// Queue position is purely `(reserved_at, id)` ascending; no position field
/// is stored, so cancellations never renumber anything.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub title_id: i64,
    pub status: ReservationStatus,
    pub reserved_at: DateTime<Utc>,
    /// Set when a freed copy is held for this reservation
    pub fulfilled_at: Option<DateTime<Utc>>,
    /// The copy held for pickup while pending librarian approval
    pub copy_id: Option<i64>,
    pub approver_id: Option<i64>,
    pub rejection_reason: Option<String>,
}
