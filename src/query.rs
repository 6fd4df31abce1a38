//! Product query compilation: faceted filtering, deterministic ordering and
//! relevance scoring for free-text search.
//!
//! A [`FilterSpec`] is the typed form of the flat filter parameters a caller
//! supplies; [`FilterSpec::compile`] turns it into a [`ProductFilter`]
//! predicate the repository evaluates against its records. Ordering is
//! always total (every sort ends with the identifier tiebreak), so repeated
//! queries over unchanged data page consistently.

use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::domain::product::Product;
use crate::domain::types::{CategoryId, TypeConstraintError};
use crate::pagination::{DEFAULT_PAGE_SIZE, Pagination};

/// Sort orders accepted by product listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
    CreatedAtAsc,
    CreatedAtDesc,
    ViewsDesc,
    SalesDesc,
    /// `order` ascending with newest-first as tiebreak; the default.
    #[default]
    OrderAsc,
}

impl SortField {
    /// Wire representation used in filter parameters.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::CreatedAtAsc => "createdAt_asc",
            Self::CreatedAtDesc => "createdAt_desc",
            Self::ViewsDesc => "views_desc",
            Self::SalesDesc => "sales_desc",
            Self::OrderAsc => "order_asc",
        }
    }
}

impl Display for SortField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortField {
    type Err = TypeConstraintError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "name_asc" => Ok(Self::NameAsc),
            "name_desc" => Ok(Self::NameDesc),
            "createdAt_asc" => Ok(Self::CreatedAtAsc),
            "createdAt_desc" => Ok(Self::CreatedAtDesc),
            "views_desc" => Ok(Self::ViewsDesc),
            "sales_desc" => Ok(Self::SalesDesc),
            "order_asc" => Ok(Self::OrderAsc),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "sort field: {other}"
            ))),
        }
    }
}

/// Typed filter/sort/pagination request for product listings.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub category: Option<CategoryId>,
    pub categories: Vec<CategoryId>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub in_stock: bool,
    pub is_new: bool,
    pub is_featured: bool,
    pub is_on_sale: bool,
    pub sort_by: SortField,
    pub include_inactive: bool,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            search: None,
            category: None,
            categories: Vec::new(),
            min_price: None,
            max_price: None,
            in_stock: false,
            is_new: false,
            is_featured: false,
            is_on_sale: false,
            sort_by: SortField::default(),
            include_inactive: false,
        }
    }
}

impl FilterSpec {
    /// Compiles the request into an executable record predicate.
    pub fn compile(&self) -> ProductFilter {
        let search = self
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut category_ids: Vec<CategoryId> =
            self.category.into_iter().chain(self.categories.clone()).collect();
        category_ids.sort_unstable();
        category_ids.dedup();

        ProductFilter {
            include_inactive: self.include_inactive,
            search,
            category_ids,
            min_price: self.min_price,
            max_price: self.max_price,
            in_stock: self.in_stock,
            is_new: self.is_new,
            is_featured: self.is_featured,
            is_on_sale: self.is_on_sale,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// Compiled predicate over product records.
///
/// A facet group left empty is omitted entirely; it never matches
/// vacuously against nothing. When both the search and the category groups
/// are present a record must satisfy both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub include_inactive: bool,
    search: Option<String>,
    category_ids: Vec<CategoryId>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    in_stock: bool,
    is_new: bool,
    is_featured: bool,
    is_on_sale: bool,
}

impl ProductFilter {
    /// Predicate matching every record except inactive ones (unless told to
    /// include them).
    pub fn all(include_inactive: bool) -> Self {
        Self {
            include_inactive,
            ..Self::default()
        }
    }

    /// Predicate for membership in a single category (primary or secondary).
    pub fn in_category(category_id: CategoryId, include_inactive: bool) -> Self {
        Self {
            include_inactive,
            category_ids: vec![category_id],
            ..Self::default()
        }
    }

    fn matches_search(&self, product: &Product, needle: &str) -> bool {
        product.name.contains_lower(needle)
            || product
                .description
                .as_ref()
                .is_some_and(|d| d.contains_lower(needle))
            || product
                .short_description
                .as_ref()
                .is_some_and(|d| d.contains_lower(needle))
            || product
                .sku
                .as_ref()
                .is_some_and(|sku| sku.to_lowercase().contains(needle))
    }

    fn matches_categories(&self, product: &Product) -> bool {
        self.category_ids.iter().any(|id| {
            product.category == Some(*id) || product.categories.contains(id)
        })
    }

    /// Evaluates the compiled predicate against one record.
    pub fn matches(&self, product: &Product) -> bool {
        if !self.include_inactive && !product.is_active {
            return false;
        }
        if let Some(needle) = &self.search {
            if !self.matches_search(product, needle) {
                return false;
            }
        }
        if !self.category_ids.is_empty() && !self.matches_categories(product) {
            return false;
        }
        let price = product.price.current.get();
        if self.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| price > max) {
            return false;
        }
        if self.in_stock && product.stock == 0 {
            return false;
        }
        if self.is_new && !product.is_new {
            return false;
        }
        if self.is_featured && !product.is_featured {
            return false;
        }
        if self.is_on_sale && !product.is_on_sale {
            return false;
        }
        true
    }
}

/// Total ordering for product listings. The identifier tiebreak keeps every
/// ordering stable across repeated calls over unchanged data.
pub fn compare(sort: SortField, a: &Product, b: &Product) -> Ordering {
    let primary = match sort {
        SortField::PriceAsc => a.price.current.get().total_cmp(&b.price.current.get()),
        SortField::PriceDesc => b.price.current.get().total_cmp(&a.price.current.get()),
        SortField::NameAsc => name_key(a).cmp(&name_key(b)),
        SortField::NameDesc => name_key(b).cmp(&name_key(a)),
        SortField::CreatedAtAsc => a.created_at.cmp(&b.created_at),
        SortField::CreatedAtDesc => b.created_at.cmp(&a.created_at),
        SortField::ViewsDesc => b.views.cmp(&a.views),
        SortField::SalesDesc => b.sales.cmp(&a.sales),
        SortField::OrderAsc => a
            .order
            .cmp(&b.order)
            .then_with(|| b.created_at.cmp(&a.created_at)),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn name_key(product: &Product) -> String {
    product.name.display_text().to_lowercase()
}

/// Relevance score for the dedicated free-text search operation.
///
/// Every whitespace-separated term is matched case-insensitively against
/// the localized fields and the SKU; field weights follow display priority
/// (name 4, sku 3, short description 2, description 1). A zero score means
/// the product does not match at all.
pub fn text_score(product: &Product, query: &str) -> u32 {
    let mut score = 0;
    for term in query.to_lowercase().split_whitespace() {
        if product.name.contains_lower(term) {
            score += 4;
        }
        if product
            .sku
            .as_ref()
            .is_some_and(|sku| sku.to_lowercase().contains(term))
        {
            score += 3;
        }
        if product
            .short_description
            .as_ref()
            .is_some_and(|d| d.contains_lower(term))
        {
            score += 2;
        }
        if product
            .description
            .as_ref()
            .is_some_and(|d| d.contains_lower(term))
        {
            score += 1;
        }
    }
    score
}
