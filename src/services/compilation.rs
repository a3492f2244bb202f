//! Compilation service implementation
//!
//! Curated event compilations for the billboard front page: admin
//! create/update/delete plus public listing and fetch.

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::compilation::{
    Compilation, CompilationView, NewCompilationRequest, UpdateCompilationRequest,
};
use crate::models::event::EventShortView;
use crate::services::page_params;
use crate::utils::errors::{AfishaError, Result};

/// Service for managing event compilations
#[derive(Clone)]
pub struct CompilationService {
    db: DatabaseService,
}

impl CompilationService {
    /// Create a new CompilationService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create_compilation(
        &self,
        request: NewCompilationRequest,
    ) -> Result<CompilationView> {
        let title = validate_title(&request.title)?;

        let mut tx = self.db.begin().await?;
        let compilation = self
            .db
            .compilations
            .create(&mut tx, title, request.pinned)
            .await?;
        self.db
            .compilations
            .replace_events(&mut tx, compilation.id, &request.events)
            .await?;
        tx.commit().await?;

        info!(compilation_id = compilation.id, "Compilation created");
        self.build_view(compilation).await
    }

    pub async fn update_compilation(
        &self,
        compilation_id: i64,
        request: UpdateCompilationRequest,
    ) -> Result<CompilationView> {
        let mut compilation = self
            .db
            .compilations
            .find_by_id(compilation_id)
            .await?
            .ok_or(AfishaError::CompilationNotFound { compilation_id })?;

        if let Some(title) = request.title.as_deref() {
            compilation.title = validate_title(title)?.to_string();
        }
        if let Some(pinned) = request.pinned {
            compilation.pinned = pinned;
        }

        let mut tx = self.db.begin().await?;
        if let Some(event_ids) = request.events.as_deref() {
            self.db
                .compilations
                .replace_events(&mut tx, compilation_id, event_ids)
                .await?;
        }
        let compilation = self
            .db
            .compilations
            .update(compilation_id, &compilation.title, compilation.pinned)
            .await?;
        tx.commit().await?;

        info!(compilation_id = compilation_id, "Compilation updated");
        self.build_view(compilation).await
    }

    pub async fn delete_compilation(&self, compilation_id: i64) -> Result<()> {
        self.db
            .compilations
            .find_by_id(compilation_id)
            .await?
            .ok_or(AfishaError::CompilationNotFound { compilation_id })?;

        self.db.compilations.delete(compilation_id).await?;
        info!(compilation_id = compilation_id, "Compilation deleted");
        Ok(())
    }

    /// Public listing, optionally restricted to pinned compilations
    pub async fn list_compilations(
        &self,
        pinned: Option<bool>,
        from: i64,
        size: i64,
    ) -> Result<Vec<CompilationView>> {
        let (limit, offset) = page_params(from, size)?;
        debug!(pinned = ?pinned, "Listing compilations");

        let compilations = self.db.compilations.list(pinned, limit, offset).await?;
        let mut views = Vec::with_capacity(compilations.len());
        for compilation in compilations {
            views.push(self.build_view(compilation).await?);
        }
        Ok(views)
    }

    pub async fn get_compilation(&self, compilation_id: i64) -> Result<CompilationView> {
        let compilation = self
            .db
            .compilations
            .find_by_id(compilation_id)
            .await?
            .ok_or(AfishaError::CompilationNotFound { compilation_id })?;
        self.build_view(compilation).await
    }

    async fn build_view(&self, compilation: Compilation) -> Result<CompilationView> {
        let event_ids = self.db.compilations.find_event_ids(compilation.id).await?;
        let events = self.db.events.find_by_ids(&event_ids).await?;

        Ok(CompilationView {
            id: compilation.id,
            title: compilation.title,
            pinned: compilation.pinned,
            events: events.into_iter().map(EventShortView::from).collect(),
        })
    }
}

fn validate_title(title: &str) -> Result<&str> {
    let trimmed = title.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return Err(AfishaError::InvalidInput(
            "Compilation title must be between 1 and 50 characters".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_validate_title() {
        assert_eq!(validate_title(" Weekend picks ").unwrap(), "Weekend picks");
        assert_matches!(validate_title(""), Err(AfishaError::InvalidInput(_)));
        assert_matches!(
            validate_title(&"t".repeat(51)),
            Err(AfishaError::InvalidInput(_))
        );
    }
}
