//! Fine management service

use std::sync::Arc;

use crate::{config::CirculationConfig, engine::Engine, error::AppResult, models::Fine};

use super::audit::AuditService;

#[derive(Clone)]
pub struct FinesService {
    engine: Arc<Engine>,
    audit: AuditService,
    policy: CirculationConfig,
}

impl FinesService {
    pub fn new(engine: Arc<Engine>, audit: AuditService, policy: CirculationConfig) -> Self {
        Self {
            engine,
            audit,
            policy,
        }
    }

    /// The fine owed on a borrow request: frozen if settled, otherwise
    /// computed from the loan's dates as of now.
    pub async fn get_fine(&self, request_id: i64) -> AppResult<Fine> {
        self.engine
            .get_fine(
                request_id,
                self.policy.daily_fine_rate,
                self.policy.grace_period_days,
            )
            .await
    }

    pub async fn record_payment(&self, request_id: i64, approver_id: i64) -> AppResult<Fine> {
        let fine = self
            .engine
            .record_fine_payment(
                request_id,
                approver_id,
                self.policy.daily_fine_rate,
                self.policy.grace_period_days,
            )
            .await?;
        self.audit
            .record(Some(approver_id), "fine.pay", request_id, None)
            .await;
        Ok(fine)
    }

    pub async fn waive(&self, request_id: i64, approver_id: i64) -> AppResult<Fine> {
        let fine = self
            .engine
            .waive_fine(
                request_id,
                approver_id,
                self.policy.daily_fine_rate,
                self.policy.grace_period_days,
            )
            .await?;
        self.audit
            .record(Some(approver_id), "fine.waive", request_id, None)
            .await;
        Ok(fine)
    }
}
