//! Fine model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::FineStatus;

/// Monetary penalty derived from a loan's dates.
///
/// Computed on read until a librarian settles it; `pay`/`waive` freeze the
/// amount and the record is kept from then on.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Fine {
    pub borrow_request_id: i64,
    #[schema(value_type = String, example = "1.50")]
    pub amount: Decimal,
    pub status: FineStatus,
    /// When the fine was settled (paid or waived), if it was
    pub settled_at: Option<DateTime<Utc>>,
    pub settled_by: Option<i64>,
}
