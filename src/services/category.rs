//! Category service implementation

use tracing::{debug, info};

use crate::database::DatabaseService;
use crate::models::category::{CategoryView, NewCategoryRequest};
use crate::services::page_params;
use crate::utils::errors::{AfishaError, Result};

/// Service for managing event categories
#[derive(Clone)]
pub struct CategoryService {
    db: DatabaseService,
}

impl CategoryService {
    /// Create a new CategoryService instance
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    pub async fn create_category(&self, request: NewCategoryRequest) -> Result<CategoryView> {
        let name = validate_name(&request.name)?;
        if self.db.categories.find_by_name(name).await?.is_some() {
            return Err(AfishaError::Conflict(format!(
                "Category '{}' already exists",
                name
            )));
        }

        let category = self.db.categories.create(name).await?;
        info!(category_id = category.id, name = %category.name, "Category created");
        Ok(CategoryView::from(category))
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        request: NewCategoryRequest,
    ) -> Result<CategoryView> {
        let name = validate_name(&request.name)?;
        self.db
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or(AfishaError::CategoryNotFound { category_id })?;
        if let Some(existing) = self.db.categories.find_by_name(name).await? {
            if existing.id != category_id {
                return Err(AfishaError::Conflict(format!(
                    "Category '{}' already exists",
                    name
                )));
            }
        }

        let category = self.db.categories.update(category_id, name).await?;
        info!(category_id = category_id, name = %category.name, "Category updated");
        Ok(CategoryView::from(category))
    }

    /// Delete a category; refused while any event still references it
    pub async fn delete_category(&self, category_id: i64) -> Result<()> {
        self.db
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or(AfishaError::CategoryNotFound { category_id })?;
        if self.db.events.exists_by_category(category_id).await? {
            return Err(AfishaError::Conflict(
                "The category is still referenced by events".to_string(),
            ));
        }

        self.db.categories.delete(category_id).await?;
        info!(category_id = category_id, "Category deleted");
        Ok(())
    }

    pub async fn list_categories(&self, from: i64, size: i64) -> Result<Vec<CategoryView>> {
        let (limit, offset) = page_params(from, size)?;
        debug!(from = from, size = size, "Listing categories");

        let categories = self.db.categories.list(limit, offset).await?;
        Ok(categories.into_iter().map(CategoryView::from).collect())
    }

    pub async fn get_category(&self, category_id: i64) -> Result<CategoryView> {
        let category = self
            .db
            .categories
            .find_by_id(category_id)
            .await?
            .ok_or(AfishaError::CategoryNotFound { category_id })?;
        Ok(CategoryView::from(category))
    }
}

fn validate_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.chars().count() > 50 {
        return Err(AfishaError::InvalidInput(
            "Category name must be between 1 and 50 characters".to_string(),
        ));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_validate_name() {
        assert_eq!(validate_name("  Concerts ").unwrap(), "Concerts");
        assert_matches!(validate_name("   "), Err(AfishaError::InvalidInput(_)));
        assert_matches!(
            validate_name(&"x".repeat(51)),
            Err(AfishaError::InvalidInput(_))
        );
    }
}
