//! Lending & reservation lifecycle engine
//!
//! Owns all circulation state in memory. Every read-then-write operation on a
//! title (reserve/release a copy, advance the reservation queue, approve or
//! reject anything) runs under that title's mutex, so two concurrent
//! approvals, or an approval racing a return-triggered cascade, can never
//! both take the same copy or both advance the queue head. Operations on
//! different titles never contend. Locks are held only for the in-memory
//! transition; notifications are handed back to the caller for dispatch
//! after the critical section commits.

pub mod clock;
pub mod fines;
pub mod ledger;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration;
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::models::{
    enums::{BorrowStatus, CopyStatus, FineStatus, ReservationStatus},
    BorrowRequest, Fine, Reservation, Title,
};
use clock::Clock;
use ledger::TitleState;

/// Event kinds handed to the notification dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum NotificationKind {
    /// A freed copy is now held for the user's reservation
    ReservationReady,
    BorrowApproved,
    BorrowRejected,
    ReservationApproved,
    ReservationRejected,
}

/// Fire-and-forget payload for the notification dispatcher; the delivery
/// transport lives outside this crate
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Notification {
    pub user_id: i64,
    pub kind: NotificationKind,
    pub title_id: i64,
}

/// The circulation engine: a registry of per-title aggregates plus the
/// indexes needed to route request/reservation ids to their title lock.
pub struct Engine {
    titles: RwLock<HashMap<i64, Arc<Mutex<TitleState>>>>,
    /// borrow request id -> title id
    requests: RwLock<HashMap<i64, i64>>,
    /// reservation id -> title id
    reservations: RwLock<HashMap<i64, i64>>,
    ids: std::sync::Mutex<snowflaked::Generator>,
    clock: Arc<dyn Clock>,
}

impl Engine {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            titles: RwLock::new(HashMap::new()),
            requests: RwLock::new(HashMap::new()),
            reservations: RwLock::new(HashMap::new()),
            ids: std::sync::Mutex::new(snowflaked::Generator::new(0)),
            clock,
        }
    }

    /// Time-ordered unique id; ordering doubles as the queue tie-break
    fn next_id(&self) -> i64 {
        self.ids.lock().unwrap().generate()
    }

    async fn title_handle(&self, title_id: i64) -> AppResult<Arc<Mutex<TitleState>>> {
        self.titles
            .read()
            .await
            .get(&title_id)
            .cloned()
            .ok_or(AppError::UnknownEntity {
                kind: "title",
                id: title_id,
            })
    }

    async fn request_title(&self, request_id: i64) -> AppResult<i64> {
        self.requests
            .read()
            .await
            .get(&request_id)
            .copied()
            .ok_or(AppError::UnknownEntity {
                kind: "borrow request",
                id: request_id,
            })
    }

    async fn reservation_title(&self, reservation_id: i64) -> AppResult<i64> {
        self.reservations
            .read()
            .await
            .get(&reservation_id)
            .copied()
            .ok_or(AppError::UnknownEntity {
                kind: "reservation",
                id: reservation_id,
            })
    }

    // -----------------------------------------------------------------------
    // Catalog
    // -----------------------------------------------------------------------

    pub async fn create_title(&self, name: String, total_copies: u32) -> AppResult<Title> {
        let title_id = self.next_id();
        let mut state = TitleState::new(title_id, name);
        state.adjust_total(total_copies, || self.next_id())?;
        let title = state.title.clone();

        self.titles
            .write()
            .await
            .insert(title_id, Arc::new(Mutex::new(state)));
        Ok(title)
    }

    pub async fn get_title(&self, title_id: i64) -> AppResult<Title> {
        let handle = self.title_handle(title_id).await?;
        let state = handle.lock().await;
        Ok(state.title.clone())
    }

    pub async fn list_titles(&self) -> Vec<Title> {
        let handles: Vec<_> = self.titles.read().await.values().cloned().collect();
        let mut titles = Vec::with_capacity(handles.len());
        for handle in handles {
            titles.push(handle.lock().await.title.clone());
        }
        titles.sort_by_key(|t| t.id);
        titles
    }

    /// Change a title's total copy count, minting or withdrawing copies
    pub async fn adjust_total(&self, title_id: i64, new_total: u32) -> AppResult<Title> {
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;
        state.adjust_total(new_total, || self.next_id())?;
        Ok(state.title.clone())
    }

    // -----------------------------------------------------------------------
    // Borrow workflow
    // -----------------------------------------------------------------------

    /// Submit a borrow request. The copy is held from submission so the
    /// approval window cannot oversubscribe the title.
    pub async fn submit_borrow(&self, user_id: i64, title_id: i64) -> AppResult<BorrowRequest> {
        let handle = self.title_handle(title_id).await?;
        let request = {
            let mut state = handle.lock().await;
            let copy_id = state.reserve_copy(CopyStatus::OnLoan).map_err(|e| match e {
                AppError::OutOfStock(t) => AppError::NoCopyAvailable(t),
                other => other,
            })?;
            let request = BorrowRequest {
                id: self.next_id(),
                user_id,
                title_id,
                copy_id: Some(copy_id),
                status: BorrowStatus::Pending,
                requested_at: self.clock.now(),
                approver_id: None,
                borrow_date: None,
                due_date: None,
                return_date: None,
                rejection_reason: None,
            };
            state.requests.push(request.clone());
            request
        };

        self.requests.write().await.insert(request.id, title_id);
        Ok(request)
    }

    pub async fn approve_borrow(
        &self,
        request_id: i64,
        approver_id: i64,
        loan_period_days: i64,
    ) -> AppResult<(BorrowRequest, Vec<Notification>)> {
        let title_id = self.request_title(request_id).await?;
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;

        let now = self.clock.now();
        let request = find_request(&mut state, request_id)?;
        if request.status != BorrowStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "cannot approve borrow request {} in status {}",
                request_id, request.status
            )));
        }
        request.status = BorrowStatus::Active;
        request.approver_id = Some(approver_id);
        request.borrow_date = Some(now);
        request.due_date = Some(now + Duration::days(loan_period_days));
        let request = request.clone();

        let notifications = vec![Notification {
            user_id: request.user_id,
            kind: NotificationKind::BorrowApproved,
            title_id,
        }];
        Ok((request, notifications))
    }

    pub async fn reject_borrow(
        &self,
        request_id: i64,
        approver_id: i64,
        reason: &str,
    ) -> AppResult<(BorrowRequest, Vec<Notification>)> {
        if reason.trim().is_empty() {
            return Err(AppError::ReasonRequired);
        }
        let title_id = self.request_title(request_id).await?;
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;

        let request = find_request(&mut state, request_id)?;
        if request.status != BorrowStatus::Pending {
            return Err(AppError::InvalidState(format!(
                "cannot reject borrow request {} in status {}",
                request_id, request.status
            )));
        }
        request.status = BorrowStatus::Rejected;
        request.approver_id = Some(approver_id);
        request.rejection_reason = Some(reason.trim().to_string());
        let copy_id = request.copy_id.take();
        let request = request.clone();

        let mut notifications = vec![Notification {
            user_id: request.user_id,
            kind: NotificationKind::BorrowRejected,
            title_id,
        }];
        // The held copy goes back through the queue, never straight to the
        // pool ahead of waiting reservations.
        if let Some(copy_id) = copy_id {
            state.release_copy(copy_id)?;
            notifications.extend(on_copy_freed(&mut state, &*self.clock));
        }
        Ok((request, notifications))
    }

    /// Return an active loan. Frees the copy and offers it to the earliest
    /// waiting reservation before it rejoins the general pool.
    pub async fn return_copy(
        &self,
        request_id: i64,
    ) -> AppResult<(BorrowRequest, Vec<Notification>)> {
        let title_id = self.request_title(request_id).await?;
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;

        let now = self.clock.now();
        let request = find_request(&mut state, request_id)?;
        match request.status {
            BorrowStatus::Active => {}
            BorrowStatus::Returned => return Err(AppError::AlreadyReturned(request_id)),
            other => {
                return Err(AppError::InvalidState(format!(
                    "cannot return borrow request {} in status {}",
                    request_id, other
                )))
            }
        }
        request.status = BorrowStatus::Returned;
        request.return_date = Some(now);
        let copy_id = request.copy_id;
        let request = request.clone();

        let mut notifications = Vec::new();
        if let Some(copy_id) = copy_id {
            state.release_copy(copy_id)?;
            notifications.extend(on_copy_freed(&mut state, &*self.clock));
        }
        Ok((request, notifications))
    }

    pub async fn get_request(&self, request_id: i64) -> AppResult<BorrowRequest> {
        let title_id = self.request_title(request_id).await?;
        let handle = self.title_handle(title_id).await?;
        let state = handle.lock().await;
        state
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .cloned()
            .ok_or(AppError::UnknownEntity {
                kind: "borrow request",
                id: request_id,
            })
    }

    /// All open (pending or active) requests held by a user, across titles
    pub async fn open_borrows_for_user(&self, user_id: i64) -> Vec<BorrowRequest> {
        let handles: Vec<_> = self.titles.read().await.values().cloned().collect();
        let mut open = Vec::new();
        for handle in handles {
            let state = handle.lock().await;
            open.extend(
                state
                    .requests
                    .iter()
                    .filter(|r| r.user_id == user_id && r.status.is_open())
                    .cloned(),
            );
        }
        open.sort_by_key(|r| r.id);
        open
    }

    // -----------------------------------------------------------------------
    // Reservation queue
    // -----------------------------------------------------------------------

    /// Join the tail of a title's wait list
    pub async fn enqueue_reservation(
        &self,
        user_id: i64,
        title_id: i64,
    ) -> AppResult<Reservation> {
        let handle = self.title_handle(title_id).await?;
        let reservation = {
            let mut state = handle.lock().await;

            let already_queued = state
                .reservations
                .iter()
                .any(|r| r.user_id == user_id && !r.status.is_terminal());
            let already_borrowing = state
                .requests
                .iter()
                .any(|r| r.user_id == user_id && r.status.is_open());
            if already_queued || already_borrowing {
                return Err(AppError::DuplicateReservation { user_id, title_id });
            }

            let reservation = Reservation {
                id: self.next_id(),
                user_id,
                title_id,
                status: ReservationStatus::Active,
                reserved_at: self.clock.now(),
                fulfilled_at: None,
                copy_id: None,
                approver_id: None,
                rejection_reason: None,
            };
            state.reservations.push(reservation.clone());
            reservation
        };

        self.reservations
            .write()
            .await
            .insert(reservation.id, title_id);
        Ok(reservation)
    }

    /// Approve a fulfilled reservation, converting its pickup hold directly
    /// into an active loan without re-acquiring inventory.
    pub async fn approve_reservation(
        &self,
        reservation_id: i64,
        approver_id: i64,
        loan_period_days: i64,
    ) -> AppResult<(Reservation, BorrowRequest, Vec<Notification>)> {
        let title_id = self.reservation_title(reservation_id).await?;
        let handle = self.title_handle(title_id).await?;
        let (reservation, request) = {
            let mut state = handle.lock().await;

            let now = self.clock.now();
            let reservation = find_reservation(&mut state, reservation_id)?;
            if reservation.status != ReservationStatus::FulfilledPendingApproval {
                return Err(AppError::InvalidState(format!(
                    "cannot approve reservation {} in status {}",
                    reservation_id, reservation.status
                )));
            }
            let copy_id = reservation.copy_id.ok_or(AppError::UnknownEntity {
                kind: "held copy for reservation",
                id: reservation_id,
            })?;
            // Convert the hold before touching the reservation so a failure
            // leaves the aggregate untouched.
            state.convert_hold_to_loan(copy_id)?;
            let reservation = find_reservation(&mut state, reservation_id)?;
            reservation.status = ReservationStatus::Approved;
            reservation.approver_id = Some(approver_id);
            let reservation = reservation.clone();
            let request = BorrowRequest {
                id: self.next_id(),
                user_id: reservation.user_id,
                title_id,
                copy_id: Some(copy_id),
                status: BorrowStatus::Active,
                requested_at: now,
                approver_id: Some(approver_id),
                borrow_date: Some(now),
                due_date: Some(now + Duration::days(loan_period_days)),
                return_date: None,
                rejection_reason: None,
            };
            state.requests.push(request.clone());
            (reservation, request)
        };

        self.requests.write().await.insert(request.id, title_id);
        let notifications = vec![Notification {
            user_id: reservation.user_id,
            kind: NotificationKind::ReservationApproved,
            title_id,
        }];
        Ok((reservation, request, notifications))
    }

    /// Reject a fulfilled reservation. The held copy cascades to the next
    /// queued reservation before it can rejoin the general pool.
    pub async fn reject_reservation(
        &self,
        reservation_id: i64,
        approver_id: i64,
        reason: &str,
    ) -> AppResult<(Reservation, Vec<Notification>)> {
        if reason.trim().is_empty() {
            return Err(AppError::ReasonRequired);
        }
        let title_id = self.reservation_title(reservation_id).await?;
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;

        let reservation = find_reservation(&mut state, reservation_id)?;
        if reservation.status != ReservationStatus::FulfilledPendingApproval {
            return Err(AppError::InvalidState(format!(
                "cannot reject reservation {} in status {}",
                reservation_id, reservation.status
            )));
        }
        reservation.status = ReservationStatus::Rejected;
        reservation.approver_id = Some(approver_id);
        reservation.rejection_reason = Some(reason.trim().to_string());
        let copy_id = reservation.copy_id.take();
        let reservation = reservation.clone();

        let mut notifications = vec![Notification {
            user_id: reservation.user_id,
            kind: NotificationKind::ReservationRejected,
            title_id,
        }];
        if let Some(copy_id) = copy_id {
            state.release_copy(copy_id)?;
            notifications.extend(on_copy_freed(&mut state, &*self.clock));
        }
        Ok((reservation, notifications))
    }

    /// Cancel an active or fulfilled reservation. Non-head cancellations
    /// leave the rest of the queue untouched; a held copy cascades onward.
    pub async fn cancel_reservation(
        &self,
        reservation_id: i64,
    ) -> AppResult<(Reservation, Vec<Notification>)> {
        let title_id = self.reservation_title(reservation_id).await?;
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;

        let reservation = find_reservation(&mut state, reservation_id)?;
        match reservation.status {
            ReservationStatus::Active | ReservationStatus::FulfilledPendingApproval => {}
            other => {
                return Err(AppError::InvalidState(format!(
                    "cannot cancel reservation {} in status {}",
                    reservation_id, other
                )))
            }
        }
        reservation.status = ReservationStatus::Cancelled;
        let copy_id = reservation.copy_id.take();
        let reservation = reservation.clone();

        let mut notifications = Vec::new();
        if let Some(copy_id) = copy_id {
            state.release_copy(copy_id)?;
            notifications.extend(on_copy_freed(&mut state, &*self.clock));
        }
        Ok((reservation, notifications))
    }

    /// Snapshot of a title's reservations in arrival order
    pub async fn title_reservations(&self, title_id: i64) -> AppResult<Vec<Reservation>> {
        let handle = self.title_handle(title_id).await?;
        let state = handle.lock().await;
        Ok(state.reservations.clone())
    }

    // -----------------------------------------------------------------------
    // Fines
    // -----------------------------------------------------------------------

    /// The fine owed on a request: the frozen record if a librarian already
    /// settled it, otherwise computed from the loan's dates as of now.
    pub async fn get_fine(
        &self,
        request_id: i64,
        daily_rate: Decimal,
        grace_period_days: i64,
    ) -> AppResult<Fine> {
        let title_id = self.request_title(request_id).await?;
        let handle = self.title_handle(title_id).await?;
        let state = handle.lock().await;

        if let Some(frozen) = state.fines.get(&request_id) {
            return Ok(frozen.clone());
        }
        let request = state
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or(AppError::UnknownEntity {
                kind: "borrow request",
                id: request_id,
            })?;
        Ok(fines::compute_fine(
            request,
            self.clock.now(),
            daily_rate,
            grace_period_days,
        ))
    }

    pub async fn record_fine_payment(
        &self,
        request_id: i64,
        approver_id: i64,
        daily_rate: Decimal,
        grace_period_days: i64,
    ) -> AppResult<Fine> {
        self.settle_fine(request_id, approver_id, FineStatus::Paid, daily_rate, grace_period_days)
            .await
    }

    pub async fn waive_fine(
        &self,
        request_id: i64,
        approver_id: i64,
        daily_rate: Decimal,
        grace_period_days: i64,
    ) -> AppResult<Fine> {
        self.settle_fine(request_id, approver_id, FineStatus::Waived, daily_rate, grace_period_days)
            .await
    }

    /// Freeze the currently-accrued amount as paid or waived; terminal.
    async fn settle_fine(
        &self,
        request_id: i64,
        approver_id: i64,
        status: FineStatus,
        daily_rate: Decimal,
        grace_period_days: i64,
    ) -> AppResult<Fine> {
        let title_id = self.request_title(request_id).await?;
        let handle = self.title_handle(title_id).await?;
        let mut state = handle.lock().await;

        if let Some(existing) = state.fines.get(&request_id) {
            return Err(AppError::InvalidState(format!(
                "fine for borrow request {} is already {}",
                request_id, existing.status
            )));
        }
        let request = state
            .requests
            .iter()
            .find(|r| r.id == request_id)
            .ok_or(AppError::UnknownEntity {
                kind: "borrow request",
                id: request_id,
            })?;
        let mut fine = fines::compute_fine(
            request,
            self.clock.now(),
            daily_rate,
            grace_period_days,
        );
        if fine.amount.is_zero() {
            return Err(AppError::InvalidState(format!(
                "nothing is owed on borrow request {}",
                request_id
            )));
        }
        fine.status = status;
        fine.settled_at = Some(self.clock.now());
        fine.settled_by = Some(approver_id);
        state.fines.insert(request_id, fine.clone());
        Ok(fine)
    }
}

/// Offer a freed copy to the earliest still-active reservation, if any.
/// Runs inside the title's critical section; an empty queue leaves the copy
/// free for direct borrowing.
fn on_copy_freed(state: &mut TitleState, clock: &dyn Clock) -> Option<Notification> {
    let title_id = state.title.id;
    let next = state
        .reservations
        .iter()
        .position(|r| r.status == ReservationStatus::Active)?;
    let copy_id = state.reserve_copy(CopyStatus::HeldForPickup).ok()?;

    let reservation = &mut state.reservations[next];
    reservation.status = ReservationStatus::FulfilledPendingApproval;
    reservation.fulfilled_at = Some(clock.now());
    reservation.copy_id = Some(copy_id);

    Some(Notification {
        user_id: reservation.user_id,
        kind: NotificationKind::ReservationReady,
        title_id,
    })
}

fn find_request<'a>(
    state: &'a mut TitleState,
    request_id: i64,
) -> AppResult<&'a mut BorrowRequest> {
    state
        .requests
        .iter_mut()
        .find(|r| r.id == request_id)
        .ok_or(AppError::UnknownEntity {
            kind: "borrow request",
            id: request_id,
        })
}

fn find_reservation<'a>(
    state: &'a mut TitleState,
    reservation_id: i64,
) -> AppResult<&'a mut Reservation> {
    state
        .reservations
        .iter_mut()
        .find(|r| r.id == reservation_id)
        .ok_or(AppError::UnknownEntity {
            kind: "reservation",
            id: reservation_id,
        })
}
