//! Repository traits the persistence backend must satisfy.
//!
//! The core consumes these traits and never implements storage itself; the
//! bundled [`memory::InMemoryRepository`] is the reference implementation
//! used by tests. Referential integrity between categories and products is
//! the backing store's responsibility.

use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::types::{CategoryId, ProductId};
use crate::pagination::Pagination;
use crate::query::{ProductFilter, SortField};

use thiserror::Error;

pub mod memory;

/// Errors surfaced by repository implementations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// The addressed record does not exist.
    #[error("record not found")]
    NotFound,
    /// A uniqueness constraint (slug) was violated.
    #[error("conflict: {0}")]
    Conflict(String),
    /// The record failed a store-side validation rule.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The backing store itself failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Convenient alias for results returned from repository methods.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Query parameters used when listing products.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    /// Compiled record predicate.
    pub filter: ProductFilter,
    /// Requested ordering.
    pub sort: SortField,
    /// Pagination parameters; `None` returns the full result set.
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn filter(mut self, filter: ProductFilter) -> Self {
        self.filter = filter;
        self
    }
    pub fn sort(mut self, sort: SortField) -> Self {
        self.sort = sort;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

/// Query parameters used when listing categories.
#[derive(Debug, Clone, Default)]
pub struct CategoryListQuery {
    pub include_inactive: bool,
    pub pagination: Option<Pagination>,
}

impl CategoryListQuery {
    pub fn include_inactive(mut self, include: bool) -> Self {
        self.include_inactive = include;
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination::new(page, per_page));
        self
    }
}

/// Read-only operations for category records.
pub trait CategoryReader {
    /// List categories ordered by `(order, id)`, with the total match count.
    fn list_categories(&self, query: CategoryListQuery)
    -> RepositoryResult<(usize, Vec<Category>)>;
    /// Retrieve a category by its identifier.
    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>>;
    /// Retrieve a category by its slug.
    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>>;
    /// True when a category already owns the slug.
    fn category_slug_exists(&self, slug: &str) -> RepositoryResult<bool>;
}

/// Write operations for category records.
pub trait CategoryWriter {
    /// Persist a new category and return it with its assigned identifier.
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category>;
    /// Apply a partial patch and return the updated record.
    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category>;
    /// Set the sibling sort key of one category. Returns affected row count.
    fn update_category_order(&self, id: CategoryId, order: u32) -> RepositoryResult<usize>;
    /// Delete a category and return the removed record.
    fn delete_category(&self, id: CategoryId) -> RepositoryResult<Category>;
}

/// Read-only operations for product records.
pub trait ProductReader {
    /// List products matching the query, with the total match count
    /// computed before pagination.
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Retrieve a product by its identifier.
    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>>;
    /// Retrieve a product by its slug.
    fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>>;
    /// True when a product already owns the slug.
    fn product_slug_exists(&self, slug: &str) -> RepositoryResult<bool>;
}

/// Write operations for product records.
pub trait ProductWriter {
    /// Persist a new product and return it with its assigned identifier.
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    /// Apply a partial patch and return the updated record.
    fn update_product(&self, id: ProductId, update: &ProductUpdate) -> RepositoryResult<Product>;
    /// Delete a product and return the removed record.
    fn delete_product(&self, id: ProductId) -> RepositoryResult<Product>;
    /// Atomically bump the view counter of one product.
    fn increment_product_views(&self, id: ProductId) -> RepositoryResult<()>;
}
