//! Category service

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::domain::input::CategoryForm;
use crate::domain::{Category, Session, Table, DEFAULT_CATEGORIES};
use crate::ports::{RecordStore, RecordStoreExt};

use super::notifier::Notifier;

pub struct CategoryService {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
}

impl CategoryService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    pub async fn add(&self, session: &Session, form: &CategoryForm) -> Result<Category> {
        let category = form.validate(session.user_id())?;
        self.store
            .put_entity(Table::Categories, &category)
            .await
            .context("Failed to save category")?;
        self.notifier.log_table("record_saved", Table::Categories);
        Ok(category)
    }

    /// Categories sorted by name
    pub async fn list(&self, session: &Session) -> Result<Vec<Category>> {
        let mut categories = self
            .store
            .get_entities::<Category>(Table::Categories, session.user_id())
            .await
            .context("Failed to read categories")?;
        categories.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(categories)
    }

    /// Seed the default set when the user has no categories at all
    ///
    /// Returns the categories created, empty when the user already had some.
    pub async fn ensure_defaults(&self, session: &Session) -> Result<Vec<Category>> {
        if !self.list(session).await?.is_empty() {
            return Ok(Vec::new());
        }

        let mut created = Vec::with_capacity(DEFAULT_CATEGORIES.len());
        for (name, color) in DEFAULT_CATEGORIES {
            let category = Category::new(session.user_id(), *name, *color);
            self.store
                .put_entity(Table::Categories, &category)
                .await
                .with_context(|| format!("Failed to create default category '{}'", name))?;
            created.push(category);
        }
        self.notifier.log_table("default_categories_created", Table::Categories);
        Ok(created)
    }

    /// Delete a category; records keep referencing its id
    pub async fn delete(&self, session: &Session, id: &str) -> Result<bool> {
        let owned = self.list(session).await?.iter().any(|c| c.id == id);
        if !owned {
            return Ok(false);
        }
        self.store
            .delete(Table::Categories, id)
            .await
            .with_context(|| format!("Failed to delete category '{}'", id))?;
        self.notifier.log_table("record_deleted", Table::Categories);
        Ok(true)
    }
}
