use crate::domain::product::{Product, ProductImage, ProductUpdate};
use crate::domain::types::{CategoryId, ProductId};
use crate::dto::products::ProductStatistics;
use crate::forms::products::CreateProductPayload;
use crate::pagination::Paginated;
use crate::query::{self, FilterSpec, ProductFilter, SortField};
use crate::repository::{
    CategoryReader, ProductListQuery, ProductReader, ProductWriter, RepositoryError,
};
use crate::slug;

use super::{ServiceError, ServiceResult, resolve_unique_slug, validate_pagination};

fn list<R: ProductReader>(query: ProductListQuery, repo: &R) -> ServiceResult<(usize, Vec<Product>)> {
    match repo.list_products(query) {
        Ok(result) => Ok(result),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Creates a product, deriving and de-duplicating the slug when no
/// explicit one was supplied. The primary category must exist when set.
pub fn create_product<R>(payload: CreateProductPayload, repo: &R) -> ServiceResult<Product>
where
    R: CategoryReader + ProductReader + ProductWriter,
{
    if let Some(category) = payload.category {
        match repo.get_category_by_id(category) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(ServiceError::InvalidArgument(format!(
                    "category does not exist: {category}"
                )));
            }
            Err(e) => {
                log::error!("Failed to look up category: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    let base = match &payload.slug {
        Some(explicit) => explicit.clone(),
        None => slug::generate_localized(&payload.name),
    };
    if base.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "product name does not yield a usable slug".to_string(),
        ));
    }
    let slug = resolve_unique_slug(&base, |s| repo.product_slug_exists(s))?;

    match repo.create_product(&payload.into_new_product(slug)) {
        Ok(product) => Ok(product),
        Err(e) => {
            log::error!("Failed to create product: {e}");
            Err(e.into())
        }
    }
}

/// Compiles the filter request and returns one page of matches together
/// with the total computed before slicing.
pub fn filter_products<R: ProductReader>(
    spec: FilterSpec,
    repo: &R,
) -> ServiceResult<Paginated<Product>> {
    let pagination = validate_pagination(spec.page, spec.limit)?;
    let query = ProductListQuery::default()
        .filter(spec.compile())
        .sort(spec.sort_by)
        .paginate(pagination.page, pagination.per_page);
    let (total, products) = list(query, repo)?;
    Ok(Paginated::new(products, total, spec.page, spec.limit))
}

/// Unpaginated listing in the default ordering.
pub fn list_products<R: ProductReader>(
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Product>> {
    let query = ProductListQuery::default().filter(ProductFilter::all(include_inactive));
    Ok(list(query, repo)?.1)
}

/// Paginated unfiltered listing with the total computed before slicing.
pub fn list_products_paginated<R: ProductReader>(
    page: usize,
    limit: usize,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Paginated<Product>> {
    let pagination = validate_pagination(page, limit)?;
    let query = ProductListQuery::default()
        .filter(ProductFilter::all(include_inactive))
        .paginate(pagination.page, pagination.per_page);
    let (total, products) = list(query, repo)?;
    Ok(Paginated::new(products, total, page, limit))
}

fn bump_views<R: ProductWriter>(id: ProductId, repo: &R) -> ServiceResult<()> {
    match repo.increment_product_views(id) {
        Ok(()) => Ok(()),
        Err(RepositoryError::NotFound) => Err(ServiceError::NotFound),
        Err(e) => {
            // A failed counter bump must not fail the read.
            log::error!("Failed to increment product views: {e}");
            Ok(())
        }
    }
}

/// Retrieves a product by id, counting the retrieval as a view.
pub fn get_product<R>(id: i32, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;
    bump_views(id, repo)?;
    match repo.get_product_by_id(id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Retrieves a product by slug, counting the retrieval as a view.
pub fn get_product_by_slug<R>(slug: &str, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    let product = match repo.get_product_by_slug(slug) {
        Ok(Some(product)) => product,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product by slug: {e}");
            return Err(ServiceError::Internal);
        }
    };
    bump_views(product.id, repo)?;
    match repo.get_product_by_id(product.id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Relevance-ranked free-text search over active products.
///
/// Results are ordered by descending score with the identifier tiebreak;
/// zero-score records are dropped entirely.
pub fn search_products<R: ProductReader>(
    query: &str,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Product>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::InvalidArgument(
            "search query cannot be empty".to_string(),
        ));
    }
    let (_total, products) = list(
        ProductListQuery::default().filter(ProductFilter::all(include_inactive)),
        repo,
    )?;

    let mut scored: Vec<(u32, Product)> = products
        .into_iter()
        .filter_map(|p| {
            let score = query::text_score(&p, trimmed);
            (score > 0).then_some((score, p))
        })
        .collect();
    scored.sort_by(|(sa, a), (sb, b)| sb.cmp(sa).then_with(|| a.id.cmp(&b.id)));
    Ok(scored.into_iter().map(|(_score, p)| p).collect())
}

/// Active products belonging to a category through the primary or a
/// secondary membership edge.
pub fn products_by_category<R: ProductReader>(
    category_id: i32,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Product>> {
    let category_id = CategoryId::new(category_id).map_err(|e| {
        ServiceError::InvalidArgument(e.to_string())
    })?;
    let query = ProductListQuery::default()
        .filter(ProductFilter::in_category(category_id, include_inactive));
    Ok(list(query, repo)?.1)
}

fn flagged<R: ProductReader>(
    spec: FilterSpec,
    limit: usize,
    repo: &R,
) -> ServiceResult<Vec<Product>> {
    let pagination = validate_pagination(1, limit)?;
    let query = ProductListQuery::default()
        .filter(spec.compile())
        .sort(spec.sort_by)
        .paginate(pagination.page, pagination.per_page);
    Ok(list(query, repo)?.1)
}

/// Up to `limit` featured products in the default ordering.
pub fn featured_products<R: ProductReader>(limit: usize, repo: &R) -> ServiceResult<Vec<Product>> {
    let spec = FilterSpec {
        is_featured: true,
        ..FilterSpec::default()
    };
    flagged(spec, limit, repo)
}

/// Up to `limit` discounted products in the default ordering.
pub fn on_sale_products<R: ProductReader>(limit: usize, repo: &R) -> ServiceResult<Vec<Product>> {
    let spec = FilterSpec {
        is_on_sale: true,
        ..FilterSpec::default()
    };
    flagged(spec, limit, repo)
}

/// Up to `limit` new-arrival products, newest first.
pub fn new_products<R: ProductReader>(limit: usize, repo: &R) -> ServiceResult<Vec<Product>> {
    let spec = FilterSpec {
        is_new: true,
        sort_by: SortField::CreatedAtDesc,
        ..FilterSpec::default()
    };
    flagged(spec, limit, repo)
}

/// Applies a partial update. A new primary category must exist.
pub fn update_product<R>(id: i32, update: ProductUpdate, repo: &R) -> ServiceResult<Product>
where
    R: CategoryReader + ProductReader + ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;

    if let Some(Some(category)) = update.category {
        match repo.get_category_by_id(category) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(ServiceError::InvalidArgument(format!(
                    "category does not exist: {category}"
                )));
            }
            Err(e) => {
                log::error!("Failed to look up category: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }

    match repo.update_product(id, &update) {
        Ok(product) => Ok(product),
        Err(e) => {
            log::error!("Failed to update product: {e}");
            Err(e.into())
        }
    }
}

/// Appends an image to the product gallery. The single-main-image
/// invariant is restored by the update itself.
pub fn add_product_image<R>(id: i32, image: ProductImage, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;
    let product = match repo.get_product_by_id(id) {
        Ok(Some(product)) => product,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let mut images = product.images;
    images.push(image);
    let update = ProductUpdate {
        images: Some(images),
        ..ProductUpdate::default()
    };
    match repo.update_product(id, &update) {
        Ok(product) => Ok(product),
        Err(e) => {
            log::error!("Failed to add product image: {e}");
            Err(e.into())
        }
    }
}

/// Removes the gallery image with the given URL.
pub fn remove_product_image<R>(id: i32, url: &str, repo: &R) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;
    let product = match repo.get_product_by_id(id) {
        Ok(Some(product)) => product,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product: {e}");
            return Err(ServiceError::Internal);
        }
    };

    let mut images = product.images;
    let before = images.len();
    images.retain(|image| image.url != url);
    if images.len() == before {
        return Err(ServiceError::NotFound);
    }
    let update = ProductUpdate {
        images: Some(images),
        ..ProductUpdate::default()
    };
    match repo.update_product(id, &update) {
        Ok(product) => Ok(product),
        Err(e) => {
            log::error!("Failed to remove product image: {e}");
            Err(e.into())
        }
    }
}

pub fn delete_product<R: ProductWriter>(id: i32, repo: &R) -> ServiceResult<Product> {
    let id = ProductId::new(id).map_err(|_| ServiceError::NotFound)?;
    match repo.delete_product(id) {
        Ok(product) => Ok(product),
        Err(e) => {
            log::error!("Failed to delete product: {e}");
            Err(e.into())
        }
    }
}

/// Aggregate counts over the whole product set, inactive included.
pub fn product_statistics<R: ProductReader>(repo: &R) -> ServiceResult<ProductStatistics> {
    let (_total, products) = list(
        ProductListQuery::default().filter(ProductFilter::all(true)),
        repo,
    )?;
    let active = products.iter().filter(|p| p.is_active).count();
    Ok(ProductStatistics {
        total: products.len(),
        active,
        inactive: products.len() - active,
        featured: products.iter().filter(|p| p.is_featured).count(),
        on_sale: products.iter().filter(|p| p.is_on_sale).count(),
        new: products.iter().filter(|p| p.is_new).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::localized::LocalizedText;
    use crate::domain::product::Price;
    use crate::domain::types::PriceValue;
    use crate::repository::memory::InMemoryRepository;

    fn payload(name: &str, price: f64) -> CreateProductPayload {
        CreateProductPayload {
            name: LocalizedText::ua(name),
            slug: None,
            description: None,
            short_description: None,
            category: None,
            categories: Default::default(),
            price: Price::new(PriceValue::new(price).unwrap()),
            variants: Vec::new(),
            attributes: Vec::new(),
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
            custom_fields: Default::default(),
        }
    }

    fn image(url: &str, is_main: bool) -> ProductImage {
        ProductImage {
            url: url.into(),
            alt: None,
            order: 0,
            is_main,
        }
    }

    #[test]
    fn create_derives_transliterated_slug() {
        let repo = InMemoryRepository::new();
        let product = create_product(payload("Смартфон Samsung", 100.0), &repo).unwrap();
        assert_eq!(product.slug, "smartfon-samsung");
        assert_eq!(product.views, 0);
    }

    #[test]
    fn create_rejects_missing_primary_category() {
        let repo = InMemoryRepository::new();
        let mut request = payload("Tea", 1.0);
        request.category = Some(CategoryId::new(42).unwrap());
        let err = create_product(request, &repo).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn get_product_counts_a_view() {
        let repo = InMemoryRepository::new();
        let created = create_product(payload("Tea", 1.0), &repo).unwrap();

        let first = get_product(created.id.get(), &repo).unwrap();
        assert_eq!(first.views, 1);
        let second = get_product_by_slug(&created.slug, &repo).unwrap();
        assert_eq!(second.views, 2);
    }

    #[test]
    fn get_product_missing_is_not_found() {
        let repo = InMemoryRepository::new();
        assert_eq!(get_product(9, &repo).unwrap_err(), ServiceError::NotFound);
        assert_eq!(get_product(0, &repo).unwrap_err(), ServiceError::NotFound);
    }

    #[test]
    fn filter_products_pages_with_total() {
        let repo = InMemoryRepository::new();
        for i in 0..25 {
            create_product(payload(&format!("product {i}"), i as f64), &repo).unwrap();
        }

        let spec = FilterSpec {
            page: 3,
            limit: 10,
            sort_by: SortField::PriceAsc,
            ..FilterSpec::default()
        };
        let page = filter_products(spec, &repo).unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.page, 3);
        assert_eq!(page.limit, 10);
    }

    #[test]
    fn filter_products_survives_extreme_page_numbers() {
        let repo = InMemoryRepository::new();
        for i in 0..3 {
            create_product(payload(&format!("product {i}"), i as f64), &repo).unwrap();
        }

        let spec = FilterSpec {
            page: usize::MAX,
            limit: 100,
            ..FilterSpec::default()
        };
        let page = filter_products(spec, &repo).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.total, 3);
        assert_eq!(page.page, usize::MAX);
    }

    #[test]
    fn search_ranks_name_hits_above_description_hits() {
        let repo = InMemoryRepository::new();
        let mut by_description = payload("Kettle", 1.0);
        by_description.description = Some(LocalizedText::en("brews green tea"));
        create_product(by_description, &repo).unwrap();
        create_product(payload("Green tea", 1.0), &repo).unwrap();
        create_product(payload("Coffee", 1.0), &repo).unwrap();

        let results = search_products("tea", false, &repo).unwrap();
        let slugs: Vec<&str> = results.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["green-tea", "kettle"]);

        assert!(matches!(
            search_products("   ", false, &repo).unwrap_err(),
            ServiceError::InvalidArgument(_)
        ));
    }

    #[test]
    fn flag_listings_respect_limit_and_flag() {
        let repo = InMemoryRepository::new();
        for i in 0..5 {
            let mut request = payload(&format!("featured {i}"), 1.0);
            request.is_featured = true;
            create_product(request, &repo).unwrap();
        }
        create_product(payload("plain", 1.0), &repo).unwrap();

        let featured = featured_products(3, &repo).unwrap();
        assert_eq!(featured.len(), 3);
        assert!(featured.iter().all(|p| p.is_featured));

        assert!(on_sale_products(10, &repo).unwrap().is_empty());
    }

    #[test]
    fn new_products_come_newest_first() {
        let repo = InMemoryRepository::new();
        let mut older = payload("older", 1.0);
        older.is_new = true;
        let mut newer = payload("newer", 1.0);
        newer.is_new = true;

        create_product(older, &repo).unwrap();
        let newer = create_product(newer, &repo).unwrap();

        let listed = new_products(10, &repo).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().any(|p| p.id == newer.id));
    }

    #[test]
    fn image_operations_keep_single_main_invariant() {
        let repo = InMemoryRepository::new();
        let created = create_product(payload("Tea", 1.0), &repo).unwrap();

        let with_one = add_product_image(created.id.get(), image("a.jpg", false), &repo).unwrap();
        assert!(with_one.images[0].is_main);

        let with_two = add_product_image(created.id.get(), image("b.jpg", true), &repo).unwrap();
        let mains: Vec<bool> = with_two.images.iter().map(|i| i.is_main).collect();
        assert_eq!(mains.iter().filter(|m| **m).count(), 1);

        let after_remove = remove_product_image(created.id.get(), "a.jpg", &repo).unwrap();
        assert_eq!(after_remove.images.len(), 1);
        assert!(after_remove.images[0].is_main);

        assert_eq!(
            remove_product_image(created.id.get(), "missing.jpg", &repo).unwrap_err(),
            ServiceError::NotFound
        );
    }

    #[test]
    fn statistics_count_flags() {
        let repo = InMemoryRepository::new();
        let mut featured = payload("featured", 1.0);
        featured.is_featured = true;
        create_product(featured, &repo).unwrap();
        let mut hidden = payload("hidden", 1.0);
        hidden.is_active = false;
        hidden.is_on_sale = true;
        create_product(hidden, &repo).unwrap();

        let stats = product_statistics(&repo).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.active, 1);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.featured, 1);
        assert_eq!(stats.on_sale, 1);
        assert_eq!(stats.new, 0);
    }
}
