//! Shared domain status enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// CopyStatus
// ---------------------------------------------------------------------------

/// Physical copy status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum CopyStatus {
    Free = 0,
    OnLoan = 1,
    HeldForPickup = 2,
}

impl CopyStatus {
    /// A copy counts against availability unless it is free
    pub fn is_free(self) -> bool {
        self == CopyStatus::Free
    }
}

impl std::fmt::Display for CopyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CopyStatus::Free => "Free",
            CopyStatus::OnLoan => "On loan",
            CopyStatus::HeldForPickup => "Held for pickup",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// BorrowStatus
// ---------------------------------------------------------------------------

/// Borrow request lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum BorrowStatus {
    Pending = 0,
    Rejected = 1,
    Active = 2,
    Returned = 3,
}

impl BorrowStatus {
    /// Pending and active requests hold a copy
    pub fn is_open(self) -> bool {
        matches!(self, BorrowStatus::Pending | BorrowStatus::Active)
    }
}

impl std::fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            BorrowStatus::Pending => "Pending",
            BorrowStatus::Rejected => "Rejected",
            BorrowStatus::Active => "Active",
            BorrowStatus::Returned => "Returned",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// ReservationStatus
// ---------------------------------------------------------------------------

/// Reservation lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum ReservationStatus {
    Active = 0,
    FulfilledPendingApproval = 1,
    Approved = 2,
    Rejected = 3,
    Cancelled = 4,
}

impl ReservationStatus {
    /// Approved, rejected and cancelled reservations never rejoin the queue
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ReservationStatus::Approved
                | ReservationStatus::Rejected
                | ReservationStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReservationStatus::Active => "Active",
            ReservationStatus::FulfilledPendingApproval => "Fulfilled, pending approval",
            ReservationStatus::Approved => "Approved",
            ReservationStatus::Rejected => "Rejected",
            ReservationStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", label)
    }
}

// ---------------------------------------------------------------------------
// FineStatus
// ---------------------------------------------------------------------------

/// Fine status; `None` means nothing is owed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[repr(i16)]
pub enum FineStatus {
    None = 0,
    Unpaid = 1,
    Paid = 2,
    Waived = 3,
}

impl FineStatus {
    /// Paid and waived fines are frozen; the amount is never recomputed
    pub fn is_settled(self) -> bool {
        matches!(self, FineStatus::Paid | FineStatus::Waived)
    }
}

impl std::fmt::Display for FineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FineStatus::None => "None",
            FineStatus::Unpaid => "Unpaid",
            FineStatus::Paid => "Paid",
            FineStatus::Waived => "Waived",
        };
        write!(f, "{}", label)
    }
}
