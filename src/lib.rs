//! Circula - Library Circulation Lifecycle Engine
//!
//! A Rust server for library circulation: copy-availability accounting, a
//! borrow-request approval workflow, fair FIFO reservation queues with
//! cascading promotion, and time-derived overdue fines, exposed over a REST
//! JSON API.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
