//! Catalog service: titles and their copy pools

use std::sync::Arc;

use crate::{
    engine::Engine,
    error::AppResult,
    models::{Reservation, Title},
};

use super::audit::AuditService;

#[derive(Clone)]
pub struct CatalogService {
    engine: Arc<Engine>,
    audit: AuditService,
}

impl CatalogService {
    pub fn new(engine: Arc<Engine>, audit: AuditService) -> Self {
        Self { engine, audit }
    }

    pub async fn create_title(&self, name: String, total_copies: u32) -> AppResult<Title> {
        let title = self.engine.create_title(name, total_copies).await?;
        self.audit
            .record(None, "title.create", title.id, Some(title.id))
            .await;
        Ok(title)
    }

    pub async fn get_title(&self, title_id: i64) -> AppResult<Title> {
        self.engine.get_title(title_id).await
    }

    pub async fn list_titles(&self) -> Vec<Title> {
        self.engine.list_titles().await
    }

    /// Change a title's total copy count; reductions below the number of
    /// loaned or held copies are rejected by the ledger.
    pub async fn adjust_total_copies(
        &self,
        title_id: i64,
        new_total: u32,
        actor_id: Option<i64>,
    ) -> AppResult<Title> {
        let title = self.engine.adjust_total(title_id, new_total).await?;
        self.audit
            .record(actor_id, "title.adjust_copies", title_id, Some(title_id))
            .await;
        Ok(title)
    }

    /// A title's reservation queue snapshot, in arrival order
    pub async fn title_reservations(&self, title_id: i64) -> AppResult<Vec<Reservation>> {
        self.engine.title_reservations(title_id).await
    }
}
