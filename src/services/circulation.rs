//! Approval gateway: the façade for librarian-facing circulation actions
//!
//! Pure composition over the engine. Each operation maps 1:1 onto an engine
//! transition, records an audit entry, and dispatches notifications once the
//! title's critical section has committed. No business rule lives only here.

use std::sync::Arc;

use crate::{
    config::CirculationConfig,
    engine::{clock::Clock, Engine, Notification},
    error::AppResult,
    models::{BorrowDetails, BorrowRequest, Reservation},
};

use super::{audit::AuditService, notify::Notifier};

#[derive(Clone)]
pub struct CirculationService {
    engine: Arc<Engine>,
    notifier: Arc<dyn Notifier>,
    audit: AuditService,
    clock: Arc<dyn Clock>,
    policy: CirculationConfig,
}

impl CirculationService {
    pub fn new(
        engine: Arc<Engine>,
        notifier: Arc<dyn Notifier>,
        audit: AuditService,
        clock: Arc<dyn Clock>,
        policy: CirculationConfig,
    ) -> Self {
        Self {
            engine,
            notifier,
            audit,
            clock,
            policy,
        }
    }

    fn loan_period(&self, requested: Option<i64>) -> i64 {
        requested.unwrap_or(self.policy.loan_period_days)
    }

    /// Best-effort dispatch after the state transition has committed;
    /// failures are logged and never surfaced to the caller.
    async fn dispatch_all(&self, notifications: &[Notification]) {
        for notification in notifications {
            if let Err(e) = self.notifier.dispatch(notification).await {
                tracing::warn!(
                    user_id = notification.user_id,
                    title_id = notification.title_id,
                    error = %e,
                    "notification dispatch failed"
                );
            }
        }
    }

    pub async fn submit_borrow(&self, user_id: i64, title_id: i64) -> AppResult<BorrowRequest> {
        let request = self.engine.submit_borrow(user_id, title_id).await?;
        self.audit
            .record(None, "borrow.submit", request.id, Some(title_id))
            .await;
        Ok(request)
    }

    pub async fn approve_borrow(
        &self,
        request_id: i64,
        approver_id: i64,
        loan_period_days: Option<i64>,
    ) -> AppResult<BorrowRequest> {
        let (request, notifications) = self
            .engine
            .approve_borrow(request_id, approver_id, self.loan_period(loan_period_days))
            .await?;
        self.audit
            .record(
                Some(approver_id),
                "borrow.approve",
                request_id,
                Some(request.title_id),
            )
            .await;
        self.dispatch_all(&notifications).await;
        Ok(request)
    }

    pub async fn reject_borrow(
        &self,
        request_id: i64,
        approver_id: i64,
        reason: &str,
    ) -> AppResult<BorrowRequest> {
        let (request, notifications) = self
            .engine
            .reject_borrow(request_id, approver_id, reason)
            .await?;
        self.audit
            .record(
                Some(approver_id),
                "borrow.reject",
                request_id,
                Some(request.title_id),
            )
            .await;
        self.dispatch_all(&notifications).await;
        Ok(request)
    }

    pub async fn return_book(&self, request_id: i64) -> AppResult<BorrowDetails> {
        let (request, notifications) = self.engine.return_copy(request_id).await?;
        self.audit
            .record(None, "borrow.return", request_id, Some(request.title_id))
            .await;
        self.dispatch_all(&notifications).await;
        Ok(BorrowDetails::new(request, self.clock.now()))
    }

    pub async fn reserve(&self, user_id: i64, title_id: i64) -> AppResult<Reservation> {
        let reservation = self.engine.enqueue_reservation(user_id, title_id).await?;
        self.audit
            .record(None, "reservation.enqueue", reservation.id, Some(title_id))
            .await;
        Ok(reservation)
    }

    pub async fn approve_reservation(
        &self,
        reservation_id: i64,
        approver_id: i64,
        loan_period_days: Option<i64>,
    ) -> AppResult<(Reservation, BorrowRequest)> {
        let (reservation, request, notifications) = self
            .engine
            .approve_reservation(
                reservation_id,
                approver_id,
                self.loan_period(loan_period_days),
            )
            .await?;
        self.audit
            .record(
                Some(approver_id),
                "reservation.approve",
                reservation_id,
                Some(reservation.title_id),
            )
            .await;
        self.dispatch_all(&notifications).await;
        Ok((reservation, request))
    }

    pub async fn reject_reservation(
        &self,
        reservation_id: i64,
        approver_id: i64,
        reason: &str,
    ) -> AppResult<Reservation> {
        let (reservation, notifications) = self
            .engine
            .reject_reservation(reservation_id, approver_id, reason)
            .await?;
        self.audit
            .record(
                Some(approver_id),
                "reservation.reject",
                reservation_id,
                Some(reservation.title_id),
            )
            .await;
        self.dispatch_all(&notifications).await;
        Ok(reservation)
    }

    pub async fn cancel_reservation(&self, reservation_id: i64) -> AppResult<Reservation> {
        let (reservation, notifications) =
            self.engine.cancel_reservation(reservation_id).await?;
        self.audit
            .record(
                None,
                "reservation.cancel",
                reservation_id,
                Some(reservation.title_id),
            )
            .await;
        self.dispatch_all(&notifications).await;
        Ok(reservation)
    }

    pub async fn get_request(&self, request_id: i64) -> AppResult<BorrowDetails> {
        let request = self.engine.get_request(request_id).await?;
        Ok(BorrowDetails::new(request, self.clock.now()))
    }

    /// A user's open loans and pending requests with derived overdue flags
    pub async fn user_loans(&self, user_id: i64) -> Vec<BorrowDetails> {
        let now = self.clock.now();
        self.engine
            .open_borrows_for_user(user_id)
            .await
            .into_iter()
            .map(|request| BorrowDetails::new(request, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::clock::ManualClock;
    use crate::engine::NotificationKind;
    use crate::services::notify::test_support::RecordingNotifier;
    use chrono::TimeZone;

    struct Fixture {
        service: CirculationService,
        notifier: Arc<RecordingNotifier>,
        title_id: i64,
    }

    async fn fixture_with(notifier: Arc<RecordingNotifier>) -> Fixture {
        let clock = Arc::new(ManualClock::new(
            chrono::Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap(),
        ));
        let engine = Arc::new(Engine::new(clock.clone()));
        let title_id = engine.create_title("Dune".into(), 1).await.unwrap().id;
        let audit = AuditService::new(clock.clone());
        let service = CirculationService::new(
            engine,
            notifier.clone(),
            audit,
            clock,
            CirculationConfig::default(),
        );
        Fixture {
            service,
            notifier,
            title_id,
        }
    }

    #[tokio::test]
    async fn approval_dispatches_a_notification() {
        let fx = fixture_with(Arc::new(RecordingNotifier::new())).await;
        let request = fx.service.submit_borrow(1, fx.title_id).await.unwrap();
        fx.service.approve_borrow(request.id, 99, None).await.unwrap();

        let dispatched = fx.notifier.dispatched.lock().await;
        assert_eq!(dispatched.len(), 1);
        assert_eq!(dispatched[0].kind, NotificationKind::BorrowApproved);
        assert_eq!(dispatched[0].user_id, 1);
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_fail_the_transition() {
        let fx = fixture_with(Arc::new(RecordingNotifier::failing())).await;
        let request = fx.service.submit_borrow(1, fx.title_id).await.unwrap();
        let approved = fx.service.approve_borrow(request.id, 99, None).await;
        assert!(approved.is_ok());

        // The transition committed despite the notifier being down
        let details = fx.service.get_request(request.id).await.unwrap();
        assert_eq!(
            details.request.status,
            crate::models::BorrowStatus::Active
        );
    }

    #[tokio::test]
    async fn default_loan_period_comes_from_policy() {
        let fx = fixture_with(Arc::new(RecordingNotifier::new())).await;
        let request = fx.service.submit_borrow(1, fx.title_id).await.unwrap();
        let approved = fx.service.approve_borrow(request.id, 99, None).await.unwrap();

        let expected = approved.borrow_date.unwrap() + chrono::Duration::days(21);
        assert_eq!(approved.due_date.unwrap(), expected);
    }
}
