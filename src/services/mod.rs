//! Business logic services

pub mod audit;
pub mod catalog;
pub mod circulation;
pub mod fines;
pub mod notify;

use std::sync::Arc;

use crate::{config::CirculationConfig, engine::clock::Clock, engine::Engine};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub circulation: circulation::CirculationService,
    pub fines: fines::FinesService,
    pub audit: audit::AuditService,
}

impl Services {
    /// Create all services over a shared engine
    pub fn new(
        engine: Arc<Engine>,
        notifier: Arc<dyn notify::Notifier>,
        clock: Arc<dyn Clock>,
        policy: CirculationConfig,
    ) -> Self {
        let audit = audit::AuditService::new(clock.clone());
        Self {
            catalog: catalog::CatalogService::new(engine.clone(), audit.clone()),
            circulation: circulation::CirculationService::new(
                engine.clone(),
                notifier,
                audit.clone(),
                clock,
                policy.clone(),
            ),
            fines: fines::FinesService::new(engine, audit.clone(), policy),
            audit,
        }
    }
}
