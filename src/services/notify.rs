//! Notification dispatcher seam
//!
//! The engine never talks to a delivery transport; it hands notifications to
//! a `Notifier` after the per-title critical section commits. Delivery is
//! best-effort: a failed dispatch is logged and never rolls anything back.

use async_trait::async_trait;

use crate::engine::Notification;
use crate::error::AppResult;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, notification: &Notification) -> AppResult<()>;
}

/// Default notifier: emits a structured log line per event. Deployments wire
/// a real transport (email, SMS, push) behind the same trait.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn dispatch(&self, notification: &Notification) -> AppResult<()> {
        tracing::info!(
            user_id = notification.user_id,
            title_id = notification.title_id,
            kind = ?notification.kind,
            "notification dispatched"
        );
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use crate::error::AppError;
    use tokio::sync::Mutex;

    /// Records every dispatched notification; can be told to fail
    pub struct RecordingNotifier {
        pub dispatched: Mutex<Vec<Notification>>,
        pub fail: bool,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self {
                dispatched: Mutex::new(Vec::new()),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            Self {
                dispatched: Mutex::new(Vec::new()),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn dispatch(&self, notification: &Notification) -> AppResult<()> {
            if self.fail {
                return Err(AppError::Infrastructure("smtp relay down".into()));
            }
            self.dispatched.lock().await.push(notification.clone());
            Ok(())
        }
    }
}
