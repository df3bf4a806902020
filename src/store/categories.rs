//! Category cache and inline creation

use crate::error::{ApiError, ValidationError};
use crate::models::Category;

#[derive(Clone, Debug, Default)]
pub struct CategoryState {
    pub categories: Vec<Category>,
    pub is_loading: bool,
    /// Title typed into the "new category" popup
    pub new_title: String,
    pub is_creating: bool,
    pub error: Option<String>,
    /// Request id of the newest fetch; answers to older ones are stale
    latest_fetch: Option<u64>,
}

impl CategoryState {
    /// Mark fetch `id` as the one whose answer should be kept
    pub fn begin_fetch(&mut self, id: u64) {
        self.is_loading = true;
        self.latest_fetch = Some(id);
    }

    /// Apply a fetch completion. Returns false when a newer fetch superseded it.
    pub fn apply_fetched(&mut self, id: u64, result: Result<Vec<Category>, ApiError>) -> bool {
        if self.latest_fetch != Some(id) {
            tracing::debug!(id, "Dropping superseded categories response");
            return false;
        }
        self.latest_fetch = None;
        self.is_loading = false;
        match result {
            Ok(categories) => {
                self.categories = categories;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        true
    }

    /// Title of the category after (or before) `current` in list order, wrapping
    pub fn cycle_title(&self, current: Option<&str>, forward: bool) -> Option<&str> {
        if self.categories.is_empty() {
            return None;
        }
        let len = self.categories.len();
        let index = match current.and_then(|t| self.categories.iter().position(|c| c.title == t)) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        Some(&self.categories[index].title)
    }

    /// Validate the typed title and mark creation as running
    pub fn begin_create(&mut self) -> Result<String, ValidationError> {
        let title = self.new_title.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyCategoryTitle);
        }
        if self
            .categories
            .iter()
            .any(|c| c.title.eq_ignore_ascii_case(title))
        {
            return Err(ValidationError::DuplicateCategory(title.to_string()));
        }
        self.is_creating = true;
        self.error = None;
        Ok(title.to_string())
    }

    /// Apply a create completion. The new category is cached right away;
    /// returns true when the list should be refreshed.
    pub fn apply_created(&mut self, result: Result<Category, ApiError>) -> bool {
        self.is_creating = false;
        match result {
            Ok(category) => {
                tracing::info!(id = %category.id, title = %category.title, "Category created");
                if !self.categories.iter().any(|c| c.id == category.id) {
                    self.categories.push(category);
                }
                self.new_title.clear();
                true
            }
            Err(e) => {
                self.error = Some(e.to_string());
                false
            }
        }
    }
}
