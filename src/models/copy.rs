//! Physical copy model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::enums::CopyStatus;

/// One physical, individually trackable instance of a title.
///
/// A copy is referenced by at most one open borrow request or one held
/// reservation at a time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Copy {
    pub id: i64,
    pub title_id: i64,
    /// Shelf/barcode label, minted when the copy is created
    pub accession_label: String,
    pub status: CopyStatus,
}
