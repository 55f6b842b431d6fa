//! Title (catalog entry) model and related types

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A catalog entry, distinct from its physical copies.
///
/// `0 <= available <= total` holds after every engine operation; both counts
/// are mutated only by the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Title {
    pub id: i64,
    pub name: String,
    pub total_copies: u32,
    pub available_copies: u32,
}

/// Create title request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTitle {
    pub name: String,
    /// Number of physical copies to mint immediately
    #[serde(default)]
    pub total_copies: u32,
}
