//! In-memory repository backed by an `RwLock`-guarded store.
//!
//! Reference implementation of the repository traits, used throughout the
//! test suites. It enforces the same hard guarantees a production store
//! must provide: per-kind slug uniqueness and atomic counter increments.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::domain::category::{Category, CategoryUpdate, NewCategory};
use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::types::{CategoryId, ProductId};
use crate::query;

use super::{
    CategoryListQuery, CategoryReader, CategoryWriter, ProductListQuery, ProductReader,
    ProductWriter, RepositoryError, RepositoryResult,
};

#[derive(Default)]
struct Store {
    categories: HashMap<CategoryId, Category>,
    products: HashMap<ProductId, Product>,
    next_category_id: i32,
    next_product_id: i32,
}

/// Thread-safe in-memory repository.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing category records.
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        if let Ok(store) = self.store.get_mut() {
            for category in categories {
                store.next_category_id = store.next_category_id.max(category.id.get());
                store.categories.insert(category.id, category);
            }
        }
        self
    }

    /// Seed the repository with existing product records.
    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        if let Ok(store) = self.store.get_mut() {
            for product in products {
                store.next_product_id = store.next_product_id.max(product.id.get());
                store.products.insert(product.id, product);
            }
        }
        self
    }

    fn read(&self) -> RepositoryResult<RwLockReadGuard<'_, Store>> {
        self.store
            .read()
            .map_err(|_| RepositoryError::Backend("store lock poisoned".to_string()))
    }

    fn write(&self) -> RepositoryResult<RwLockWriteGuard<'_, Store>> {
        self.store
            .write()
            .map_err(|_| RepositoryError::Backend("store lock poisoned".to_string()))
    }
}

impl CategoryReader for InMemoryRepository {
    fn list_categories(
        &self,
        query: CategoryListQuery,
    ) -> RepositoryResult<(usize, Vec<Category>)> {
        let store = self.read()?;
        let mut items: Vec<Category> = store
            .categories
            .values()
            .filter(|c| query.include_inactive || c.is_active)
            .cloned()
            .collect();
        items.sort_by_key(|c| (c.order, c.id));

        let total = items.len();
        if let Some(pagination) = query.pagination {
            items = items
                .into_iter()
                .skip(pagination.skip())
                .take(pagination.per_page)
                .collect();
        }
        Ok((total, items))
    }

    fn get_category_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.read()?.categories.get(&id).cloned())
    }

    fn get_category_by_slug(&self, slug: &str) -> RepositoryResult<Option<Category>> {
        Ok(self
            .read()?
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    fn category_slug_exists(&self, slug: &str) -> RepositoryResult<bool> {
        Ok(self.read()?.categories.values().any(|c| c.slug == slug))
    }
}

impl CategoryWriter for InMemoryRepository {
    fn create_category(&self, category: &NewCategory) -> RepositoryResult<Category> {
        let mut store = self.write()?;
        if store.categories.values().any(|c| c.slug == category.slug) {
            return Err(RepositoryError::Conflict(format!(
                "category slug already exists: {}",
                category.slug
            )));
        }

        store.next_category_id += 1;
        let id = CategoryId::new(store.next_category_id)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;
        let record = Category {
            id,
            name: category.name.clone(),
            slug: category.slug.clone(),
            parent: category.parent,
            parent_categories: category.parent_categories.clone(),
            order: category.order,
            is_active: category.is_active,
            description: category.description.clone(),
            image: category.image.clone(),
            icon: category.icon.clone(),
            meta_title: category.meta_title.clone(),
            meta_description: category.meta_description.clone(),
            meta_keywords: category.meta_keywords.clone(),
            created_at: category.created_at,
            updated_at: category.updated_at,
        };
        store.categories.insert(id, record.clone());
        Ok(record)
    }

    fn update_category(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> RepositoryResult<Category> {
        let mut store = self.write()?;
        if !store.categories.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(slug) = &update.slug {
            if store
                .categories
                .values()
                .any(|c| c.id != id && c.slug == *slug)
            {
                return Err(RepositoryError::Conflict(format!(
                    "category slug already exists: {slug}"
                )));
            }
        }
        let category = store
            .categories
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        category.apply_update(update);
        category.updated_at = Utc::now().naive_utc();
        Ok(category.clone())
    }

    fn update_category_order(&self, id: CategoryId, order: u32) -> RepositoryResult<usize> {
        let mut store = self.write()?;
        match store.categories.get_mut(&id) {
            Some(category) => {
                category.order = order;
                category.updated_at = Utc::now().naive_utc();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_category(&self, id: CategoryId) -> RepositoryResult<Category> {
        self.write()?
            .categories
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }
}

impl ProductReader for InMemoryRepository {
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let store = self.read()?;
        let mut items: Vec<Product> = store
            .products
            .values()
            .filter(|p| query.filter.matches(p))
            .cloned()
            .collect();
        items.sort_by(|a, b| query::compare(query.sort, a, b));

        let total = items.len();
        if let Some(pagination) = query.pagination {
            items = items
                .into_iter()
                .skip(pagination.skip())
                .take(pagination.per_page)
                .collect();
        }
        Ok((total, items))
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.read()?.products.get(&id).cloned())
    }

    fn get_product_by_slug(&self, slug: &str) -> RepositoryResult<Option<Product>> {
        Ok(self
            .read()?
            .products
            .values()
            .find(|p| p.slug == slug)
            .cloned())
    }

    fn product_slug_exists(&self, slug: &str) -> RepositoryResult<bool> {
        Ok(self.read()?.products.values().any(|p| p.slug == slug))
    }
}

impl ProductWriter for InMemoryRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut store = self.write()?;
        if store.products.values().any(|p| p.slug == product.slug) {
            return Err(RepositoryError::Conflict(format!(
                "product slug already exists: {}",
                product.slug
            )));
        }

        store.next_product_id += 1;
        let id = ProductId::new(store.next_product_id)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;
        let mut record = Product {
            id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            description: product.description.clone(),
            short_description: product.short_description.clone(),
            category: product.category,
            categories: product.categories.clone(),
            price: product.price.clone(),
            variants: product.variants.clone(),
            attributes: product.attributes.clone(),
            images: product.images.clone(),
            sku: product.sku.clone(),
            stock: product.stock,
            order: product.order,
            is_active: product.is_active,
            is_new: product.is_new,
            is_featured: product.is_featured,
            is_on_sale: product.is_on_sale,
            views: 0,
            sales: 0,
            rating: 0.0,
            reviews_count: 0,
            meta_title: product.meta_title.clone(),
            meta_description: product.meta_description.clone(),
            meta_keywords: product.meta_keywords.clone(),
            custom_fields: product.custom_fields.clone(),
            created_at: product.created_at,
            updated_at: product.updated_at,
        };
        crate::domain::product::normalize_main_image(&mut record.images);
        store.products.insert(id, record.clone());
        Ok(record)
    }

    fn update_product(&self, id: ProductId, update: &ProductUpdate) -> RepositoryResult<Product> {
        let mut store = self.write()?;
        if !store.products.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(slug) = &update.slug {
            if store.products.values().any(|p| p.id != id && p.slug == *slug) {
                return Err(RepositoryError::Conflict(format!(
                    "product slug already exists: {slug}"
                )));
            }
        }
        let product = store
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.apply_update(update);
        product.updated_at = Utc::now().naive_utc();
        Ok(product.clone())
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<Product> {
        self.write()?
            .products
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    fn increment_product_views(&self, id: ProductId) -> RepositoryResult<()> {
        let mut store = self.write()?;
        let product = store
            .products
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        product.views = product.views.saturating_add(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::localized::LocalizedText;
    use crate::domain::product::Price;
    use crate::domain::types::PriceValue;
    use crate::query::{FilterSpec, SortField};
    use std::collections::{BTreeMap, BTreeSet};

    fn new_category(slug: &str) -> NewCategory {
        let now = Utc::now().naive_utc();
        NewCategory {
            name: LocalizedText::en(slug.to_string()),
            slug: slug.to_string(),
            parent: None,
            parent_categories: BTreeSet::new(),
            order: 0,
            is_active: true,
            description: None,
            image: None,
            icon: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn new_product(slug: &str, price: f64) -> NewProduct {
        let now = Utc::now().naive_utc();
        NewProduct {
            name: LocalizedText::en(slug.to_string()),
            slug: slug.to_string(),
            description: None,
            short_description: None,
            category: None,
            categories: BTreeSet::new(),
            price: Price::new(PriceValue::new(price).unwrap()),
            variants: Vec::new(),
            attributes: Vec::new(),
            images: Vec::new(),
            sku: None,
            stock: 0,
            order: 0,
            is_active: true,
            is_new: false,
            is_featured: false,
            is_on_sale: false,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
            custom_fields: BTreeMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn assigns_sequential_identifiers() {
        let repo = InMemoryRepository::new();
        let first = repo.create_category(&new_category("tea")).unwrap();
        let second = repo.create_category(&new_category("coffee")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
    }

    #[test]
    fn rejects_duplicate_slugs_per_kind() {
        let repo = InMemoryRepository::new();
        repo.create_category(&new_category("tea")).unwrap();
        let err = repo.create_category(&new_category("tea")).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // Product slugs live in their own namespace.
        assert!(repo.create_product(&new_product("tea", 1.0)).is_ok());
    }

    #[test]
    fn update_rejects_slug_taken_by_another_record() {
        let repo = InMemoryRepository::new();
        repo.create_product(&new_product("tea", 1.0)).unwrap();
        let coffee = repo.create_product(&new_product("coffee", 2.0)).unwrap();

        let update = ProductUpdate {
            slug: Some("tea".into()),
            ..ProductUpdate::default()
        };
        let err = repo.update_product(coffee.id, &update).unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        // Re-asserting a record's own slug is not a conflict.
        let update = ProductUpdate {
            slug: Some("coffee".into()),
            ..ProductUpdate::default()
        };
        assert!(repo.update_product(coffee.id, &update).is_ok());
    }

    #[test]
    fn update_of_missing_record_is_not_found_even_with_taken_slug() {
        let repo = InMemoryRepository::new();
        repo.create_product(&new_product("tea", 1.0)).unwrap();
        repo.create_category(&new_category("drinks")).unwrap();

        let update = ProductUpdate {
            slug: Some("tea".into()),
            ..ProductUpdate::default()
        };
        let err = repo
            .update_product(ProductId::new(99).unwrap(), &update)
            .unwrap_err();
        assert_eq!(err, RepositoryError::NotFound);

        let update = CategoryUpdate {
            slug: Some("drinks".into()),
            ..CategoryUpdate::default()
        };
        let err = repo
            .update_category(CategoryId::new(99).unwrap(), &update)
            .unwrap_err();
        assert_eq!(err, RepositoryError::NotFound);
    }

    #[test]
    fn counters_start_at_zero_and_views_increment() {
        let repo = InMemoryRepository::new();
        let product = repo.create_product(&new_product("tea", 1.0)).unwrap();
        assert_eq!(product.views, 0);

        repo.increment_product_views(product.id).unwrap();
        repo.increment_product_views(product.id).unwrap();
        let reloaded = repo.get_product_by_id(product.id).unwrap().unwrap();
        assert_eq!(reloaded.views, 2);
    }

    #[test]
    fn list_products_paginates_with_total_before_slicing() {
        let repo = InMemoryRepository::new();
        for i in 0..25 {
            repo.create_product(&new_product(&format!("p-{i}"), i as f64))
                .unwrap();
        }

        let query = ProductListQuery::default()
            .filter(FilterSpec::default().compile())
            .sort(SortField::PriceAsc)
            .paginate(3, 10);
        let (total, items) = repo.list_products(query).unwrap();
        assert_eq!(total, 25);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].price.current.get(), 20.0);
    }

    #[test]
    fn delete_missing_record_is_not_found() {
        let repo = InMemoryRepository::new();
        let err = repo.delete_product(ProductId::new(9).unwrap()).unwrap_err();
        assert_eq!(err, RepositoryError::NotFound);
    }
}
