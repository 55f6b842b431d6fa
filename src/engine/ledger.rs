//! Inventory ledger: the single source of truth for "is a copy free"
//!
//! `TitleState` is the aggregate guarded by the per-title lock. Everything
//! that reads-then-writes availability goes through the methods here, so the
//! `0 <= available <= total` invariant has exactly one owner.

use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::models::{
    copy::Copy, enums::CopyStatus, BorrowRequest, Fine, Reservation, Title,
};

/// Per-title aggregate state: counts, copies, the permanent request ledger,
/// the reservation queue and any settled fines.
pub struct TitleState {
    pub title: Title,
    pub copies: Vec<Copy>,
    /// Permanent loan ledger; requests are never deleted
    pub requests: Vec<BorrowRequest>,
    /// Arrival-ordered wait list; scanned lazily, never renumbered
    pub reservations: Vec<Reservation>,
    /// Fines frozen by librarian action, keyed by borrow request id
    pub fines: HashMap<i64, Fine>,
    next_accession: u32,
}

impl TitleState {
    pub fn new(id: i64, name: String) -> Self {
        Self {
            title: Title {
                id,
                name,
                total_copies: 0,
                available_copies: 0,
            },
            copies: Vec::new(),
            requests: Vec::new(),
            reservations: Vec::new(),
            fines: HashMap::new(),
            next_accession: 1,
        }
    }

    /// Copies currently out of the pool (on loan or held for pickup)
    pub fn committed_count(&self) -> u32 {
        self.copies.iter().filter(|c| !c.status.is_free()).count() as u32
    }

    /// Atomically take one free copy, marking it `hold` (on loan or held for
    /// pickup) and decrementing the available count.
    pub fn reserve_copy(&mut self, hold: CopyStatus) -> AppResult<i64> {
        let copy = self
            .copies
            .iter_mut()
            .find(|c| c.status.is_free())
            .ok_or(AppError::OutOfStock(self.title.id))?;
        copy.status = hold;
        let copy_id = copy.id;
        self.title.available_copies -= 1;
        Ok(copy_id)
    }

    /// Put a copy back in the pool and increment the available count
    pub fn release_copy(&mut self, copy_id: i64) -> AppResult<()> {
        let copy = self
            .copies
            .iter_mut()
            .find(|c| c.id == copy_id)
            .ok_or(AppError::UnknownCopy(copy_id))?;
        if copy.status.is_free() {
            return Err(AppError::UnknownCopy(copy_id));
        }
        copy.status = CopyStatus::Free;
        self.title.available_copies += 1;
        Ok(())
    }

    /// Convert a pickup hold into a loan without touching availability.
    /// This is the only path that hands out a copy without re-acquisition.
    pub fn convert_hold_to_loan(&mut self, copy_id: i64) -> AppResult<()> {
        let copy = self
            .copies
            .iter_mut()
            .find(|c| c.id == copy_id)
            .ok_or(AppError::UnknownCopy(copy_id))?;
        if copy.status != CopyStatus::HeldForPickup {
            return Err(AppError::InvalidState(format!(
                "copy {} is {}, not held for pickup",
                copy_id, copy.status
            )));
        }
        copy.status = CopyStatus::OnLoan;
        Ok(())
    }

    /// Grow or shrink the copy pool. Shrinking withdraws free copies only
    /// (latest accession first); going below the committed count is rejected.
    pub fn adjust_total(
        &mut self,
        new_total: u32,
        mut mint_id: impl FnMut() -> i64,
    ) -> AppResult<()> {
        let committed = self.committed_count();
        if new_total < committed {
            return Err(AppError::InvalidAdjustment(format!(
                "cannot reduce title {} to {} copies while {} are on loan or held",
                self.title.id, new_total, committed
            )));
        }

        while (self.copies.len() as u32) > new_total {
            let idx = self
                .copies
                .iter()
                .rposition(|c| c.status.is_free())
                .ok_or_else(|| {
                    AppError::InvalidAdjustment(format!(
                        "no free copy of title {} left to withdraw",
                        self.title.id
                    ))
                })?;
            self.copies.remove(idx);
        }
        while (self.copies.len() as u32) < new_total {
            let label = format!("{}-{:04}", self.title.id, self.next_accession);
            self.next_accession += 1;
            self.copies.push(Copy {
                id: mint_id(),
                title_id: self.title.id,
                accession_label: label,
                status: CopyStatus::Free,
            });
        }

        self.title.total_copies = new_total;
        self.title.available_copies = new_total - committed;
        Ok(())
    }

    /// Sanity check used by tests after every operation sequence
    #[cfg(test)]
    pub fn check_invariants(&self) {
        let free = self.copies.iter().filter(|c| c.status.is_free()).count() as u32;
        assert_eq!(self.title.available_copies, free);
        assert_eq!(self.title.total_copies, self.copies.len() as u32);
        assert!(self.title.available_copies <= self.title.total_copies);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_copies(n: u32) -> TitleState {
        let mut ids = 100..;
        let mut state = TitleState::new(1, "The Rust Programming Language".into());
        state.adjust_total(n, || ids.next().unwrap()).unwrap();
        state
    }

    #[test]
    fn reserve_and_release_round_trip() {
        let mut state = state_with_copies(2);
        let copy_id = state.reserve_copy(CopyStatus::OnLoan).unwrap();
        assert_eq!(state.title.available_copies, 1);
        state.check_invariants();

        state.release_copy(copy_id).unwrap();
        assert_eq!(state.title.available_copies, 2);
        state.check_invariants();
    }

    #[test]
    fn reserve_fails_when_out_of_stock() {
        let mut state = state_with_copies(1);
        state.reserve_copy(CopyStatus::OnLoan).unwrap();
        let err = state.reserve_copy(CopyStatus::OnLoan).unwrap_err();
        assert!(matches!(err, AppError::OutOfStock(1)));
        state.check_invariants();
    }

    #[test]
    fn release_of_free_copy_is_rejected() {
        let mut state = state_with_copies(1);
        let copy_id = state.copies[0].id;
        let err = state.release_copy(copy_id).unwrap_err();
        assert!(matches!(err, AppError::UnknownCopy(id) if id == copy_id));
    }

    #[test]
    fn release_of_unknown_copy_is_rejected() {
        let mut state = state_with_copies(1);
        assert!(matches!(
            state.release_copy(9999).unwrap_err(),
            AppError::UnknownCopy(9999)
        ));
    }

    #[test]
    fn shrink_below_committed_count_is_rejected() {
        // Scenario: adjust from 3 to 1 while 2 copies are on loan
        let mut state = state_with_copies(3);
        state.reserve_copy(CopyStatus::OnLoan).unwrap();
        state.reserve_copy(CopyStatus::OnLoan).unwrap();

        let mut ids = 200..;
        let err = state.adjust_total(1, || ids.next().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::InvalidAdjustment(_)));
        // Aggregate unchanged on error
        assert_eq!(state.title.total_copies, 3);
        assert_eq!(state.title.available_copies, 1);
        state.check_invariants();
    }

    #[test]
    fn shrink_withdraws_free_copies_only() {
        let mut state = state_with_copies(3);
        let loaned = state.reserve_copy(CopyStatus::OnLoan).unwrap();

        let mut ids = 200..;
        state.adjust_total(1, || ids.next().unwrap()).unwrap();
        assert_eq!(state.title.total_copies, 1);
        assert_eq!(state.title.available_copies, 0);
        assert_eq!(state.copies.len(), 1);
        assert_eq!(state.copies[0].id, loaned);
        state.check_invariants();
    }

    #[test]
    fn grow_mints_labelled_copies() {
        let mut state = state_with_copies(2);
        assert_eq!(state.copies[0].accession_label, "1-0001");
        assert_eq!(state.copies[1].accession_label, "1-0002");

        let mut ids = 200..;
        state.adjust_total(3, || ids.next().unwrap()).unwrap();
        assert_eq!(state.copies[2].accession_label, "1-0003");
        assert_eq!(state.title.available_copies, 3);
        state.check_invariants();
    }

    #[test]
    fn held_copies_count_as_committed() {
        let mut state = state_with_copies(2);
        state.reserve_copy(CopyStatus::HeldForPickup).unwrap();
        assert_eq!(state.committed_count(), 1);

        let mut ids = 200..;
        let err = state.adjust_total(0, || ids.next().unwrap()).unwrap_err();
        assert!(matches!(err, AppError::InvalidAdjustment(_)));
    }

    #[test]
    fn hold_conversion_requires_a_hold() {
        let mut state = state_with_copies(1);
        let copy_id = state.reserve_copy(CopyStatus::OnLoan).unwrap();
        let err = state.convert_hold_to_loan(copy_id).unwrap_err();
        assert!(matches!(err, AppError::InvalidState(_)));
    }
}
