use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::localized::LocalizedText;
use crate::domain::product::{
    NewProduct, Price, ProductAttribute, ProductUpdate, ProductVariant,
};
use crate::domain::types::{CategoryId, CustomFieldValue, PriceValue, TypeConstraintError};
use crate::forms::{LocalizedTextForm, double_option};
use crate::pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::query::{FilterSpec, SortField};
use crate::slug;

#[derive(Debug, Error)]
pub enum ProductFormError {
    #[error("product form validation failed: {0}")]
    Validation(String),
    #[error("product form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for ProductFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn require_valid_slug(value: &str) -> Result<String, ProductFormError> {
    if slug::is_valid(value) {
        Ok(value.to_string())
    } else {
        Err(ProductFormError::TypeConstraint(format!(
            "invalid slug: {value}"
        )))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PriceForm {
    #[validate(range(min = 0.0))]
    pub current: f64,
    pub old: Option<f64>,
    pub currency: Option<String>,
}

impl TryFrom<PriceForm> for Price {
    type Error = TypeConstraintError;

    fn try_from(form: PriceForm) -> Result<Self, Self::Error> {
        Ok(Price {
            current: PriceValue::new(form.current)?,
            old: form.old.map(PriceValue::new).transpose()?,
            currency: form
                .currency
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| Price::DEFAULT_CURRENCY.to_string()),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantForm {
    pub name: LocalizedTextForm,
    pub price: PriceForm,
    pub sku: Option<String>,
    pub stock: u32,
    pub is_active: Option<bool>,
}

impl TryFrom<VariantForm> for ProductVariant {
    type Error = TypeConstraintError;

    fn try_from(form: VariantForm) -> Result<Self, Self::Error> {
        Ok(ProductVariant {
            name: form.name.into_localized(),
            price: form.price.try_into()?,
            sku: form.sku,
            stock: form.stock,
            is_active: form.is_active.unwrap_or(true),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AttributeForm {
    pub name: LocalizedTextForm,
    pub value: LocalizedTextForm,
    pub unit: Option<String>,
}

impl From<AttributeForm> for ProductAttribute {
    fn from(form: AttributeForm) -> Self {
        Self {
            name: form.name.into_localized(),
            value: form.value.into_localized(),
            unit: form.unit,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateProductForm {
    pub name: LocalizedTextForm,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    pub description: Option<LocalizedTextForm>,
    pub short_description: Option<LocalizedTextForm>,
    pub category: Option<i32>,
    pub categories: Vec<i32>,
    #[validate(nested)]
    pub price: PriceForm,
    pub variants: Vec<VariantForm>,
    pub attributes: Vec<AttributeForm>,
    pub sku: Option<String>,
    pub stock: u32,
    pub order: u32,
    pub is_active: Option<bool>,
    pub is_new: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_on_sale: Option<bool>,
    pub meta_title: Option<LocalizedTextForm>,
    pub meta_description: Option<LocalizedTextForm>,
    pub meta_keywords: Option<LocalizedTextForm>,
    pub custom_fields: Option<BTreeMap<String, CustomFieldValue>>,
}

/// Validated product creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProductPayload {
    pub name: LocalizedText,
    /// Explicit slug, already shape-checked. `None` means derive from name.
    pub slug: Option<String>,
    pub description: Option<LocalizedText>,
    pub short_description: Option<LocalizedText>,
    pub category: Option<CategoryId>,
    pub categories: BTreeSet<CategoryId>,
    pub price: Price,
    pub variants: Vec<ProductVariant>,
    pub attributes: Vec<ProductAttribute>,
    pub sku: Option<String>,
    pub stock: u32,
    pub order: u32,
    pub is_active: bool,
    pub is_new: bool,
    pub is_featured: bool,
    pub is_on_sale: bool,
    pub meta_title: Option<LocalizedText>,
    pub meta_description: Option<LocalizedText>,
    pub meta_keywords: Option<LocalizedText>,
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
}

impl CreateProductPayload {
    /// Builds the record to persist once the unique slug is resolved.
    /// Images are attached through the dedicated image operations, never
    /// at creation time.
    pub fn into_new_product(self, slug: String) -> NewProduct {
        let now = Utc::now().naive_utc();
        NewProduct {
            name: self.name,
            slug,
            description: self.description,
            short_description: self.short_description,
            category: self.category,
            categories: self.categories,
            price: self.price,
            variants: self.variants,
            attributes: self.attributes,
            images: Vec::new(),
            sku: self.sku,
            stock: self.stock,
            order: self.order,
            is_active: self.is_active,
            is_new: self.is_new,
            is_featured: self.is_featured,
            is_on_sale: self.is_on_sale,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            meta_keywords: self.meta_keywords,
            custom_fields: self.custom_fields,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CreateProductForm> for CreateProductPayload {
    type Error = ProductFormError;

    fn try_from(form: CreateProductForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = form.name.into_localized();
        if name.is_empty() {
            return Err(TypeConstraintError::EmptyString("product name").into());
        }
        let slug = form.slug.as_deref().map(require_valid_slug).transpose()?;
        let price = Price::try_from(form.price)?;
        let variants = form
            .variants
            .into_iter()
            .map(ProductVariant::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            slug,
            description: form.description.map(LocalizedTextForm::into_localized),
            short_description: form
                .short_description
                .map(LocalizedTextForm::into_localized),
            // A malformed primary category id degrades to "no category".
            category: form.category.and_then(|id| CategoryId::new(id).ok()),
            categories: form
                .categories
                .into_iter()
                .filter_map(|id| CategoryId::new(id).ok())
                .collect(),
            price,
            variants,
            attributes: form.attributes.into_iter().map(Into::into).collect(),
            sku: form.sku.filter(|s| !s.trim().is_empty()),
            stock: form.stock,
            order: form.order,
            is_active: form.is_active.unwrap_or(true),
            is_new: form.is_new.unwrap_or(false),
            is_featured: form.is_featured.unwrap_or(false),
            is_on_sale: form.is_on_sale.unwrap_or(false),
            meta_title: form.meta_title.map(LocalizedTextForm::into_localized),
            meta_description: form.meta_description.map(LocalizedTextForm::into_localized),
            meta_keywords: form.meta_keywords.map(LocalizedTextForm::into_localized),
            custom_fields: form.custom_fields.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateProductForm {
    pub name: Option<LocalizedTextForm>,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub short_description: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub category: Option<Option<i32>>,
    pub categories: Option<Vec<i32>>,
    pub price: Option<PriceForm>,
    pub variants: Option<Vec<VariantForm>>,
    pub attributes: Option<Vec<AttributeForm>>,
    #[serde(deserialize_with = "double_option")]
    pub sku: Option<Option<String>>,
    pub stock: Option<u32>,
    pub order: Option<u32>,
    pub is_active: Option<bool>,
    pub is_new: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_on_sale: Option<bool>,
    #[serde(deserialize_with = "double_option")]
    pub meta_title: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub meta_description: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub meta_keywords: Option<Option<LocalizedTextForm>>,
    pub custom_fields: Option<BTreeMap<String, CustomFieldValue>>,
}

impl TryFrom<UpdateProductForm> for ProductUpdate {
    type Error = ProductFormError;

    fn try_from(form: UpdateProductForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = form
            .name
            .map(LocalizedTextForm::into_localized)
            .map(|name| {
                if name.is_empty() {
                    Err(TypeConstraintError::EmptyString("product name"))
                } else {
                    Ok(name)
                }
            })
            .transpose()?;
        let slug = form.slug.as_deref().map(require_valid_slug).transpose()?;
        let price = form.price.map(Price::try_from).transpose()?;
        let variants = form
            .variants
            .map(|variants| {
                variants
                    .into_iter()
                    .map(ProductVariant::try_from)
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(Self {
            name,
            slug,
            description: form
                .description
                .map(|d| d.map(LocalizedTextForm::into_localized)),
            short_description: form
                .short_description
                .map(|d| d.map(LocalizedTextForm::into_localized)),
            category: form
                .category
                .map(|category| category.and_then(|id| CategoryId::new(id).ok())),
            categories: form.categories.map(|ids| {
                ids.into_iter()
                    .filter_map(|id| CategoryId::new(id).ok())
                    .collect()
            }),
            price,
            variants,
            attributes: form
                .attributes
                .map(|attributes| attributes.into_iter().map(Into::into).collect()),
            images: None,
            sku: form.sku,
            stock: form.stock,
            order: form.order,
            is_active: form.is_active,
            is_new: form.is_new,
            is_featured: form.is_featured,
            is_on_sale: form.is_on_sale,
            meta_title: form
                .meta_title
                .map(|t| t.map(LocalizedTextForm::into_localized)),
            meta_description: form
                .meta_description
                .map(|t| t.map(LocalizedTextForm::into_localized)),
            meta_keywords: form
                .meta_keywords
                .map(|t| t.map(LocalizedTextForm::into_localized)),
            custom_fields: form.custom_fields,
        })
    }
}

/// Flat filter parameters exactly as a caller supplies them, every value a
/// raw string. Parsing applies the documented defaults (page 1, limit 10,
/// booleans false, sort `order_asc`).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterProductsForm {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    /// Comma-joined category ids.
    pub categories: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub in_stock: Option<String>,
    pub is_new: Option<String>,
    pub is_featured: Option<String>,
    pub is_on_sale: Option<String>,
    pub sort_by: Option<String>,
    pub include_inactive: Option<String>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterFormError {
    #[error("invalid page value: {0}")]
    Page(String),
    #[error("invalid limit value: {0}")]
    Limit(String),
    #[error("invalid price bound: {0}")]
    Price(String),
    #[error("unknown sort field: {0}")]
    Sort(String),
}

fn parse_flag(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn parse_price(value: Option<&str>) -> Result<Option<f64>, FilterFormError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    match raw.parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(Some(price)),
        _ => Err(FilterFormError::Price(raw.to_string())),
    }
}

impl TryFrom<FilterProductsForm> for FilterSpec {
    type Error = FilterFormError;

    fn try_from(form: FilterProductsForm) -> Result<Self, Self::Error> {
        let page = match form.page.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => 1,
            Some(raw) => match raw.parse::<usize>() {
                Ok(page) if page >= 1 => page,
                _ => return Err(FilterFormError::Page(raw.to_string())),
            },
        };
        let limit = match form.limit.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            None => DEFAULT_PAGE_SIZE,
            Some(raw) => match raw.parse::<usize>() {
                Ok(limit) if (1..=MAX_PAGE_SIZE).contains(&limit) => limit,
                _ => return Err(FilterFormError::Limit(raw.to_string())),
            },
        };
        let sort_by = match form
            .sort_by
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
        {
            None => SortField::default(),
            Some(raw) => raw
                .parse::<SortField>()
                .map_err(|_| FilterFormError::Sort(raw.to_string()))?,
        };

        // Malformed individual category ids are dropped, not fatal.
        let category = form
            .category
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .and_then(|id| CategoryId::new(id).ok());
        let categories: Vec<CategoryId> = form
            .categories
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse::<i32>().ok())
                    .filter_map(|id| CategoryId::new(id).ok())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            page,
            limit,
            search: form.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            category,
            categories,
            min_price: parse_price(form.min_price.as_deref())?,
            max_price: parse_price(form.max_price.as_deref())?,
            in_stock: parse_flag(form.in_stock.as_deref()),
            is_new: parse_flag(form.is_new.as_deref()),
            is_featured: parse_flag(form.is_featured.as_deref()),
            is_on_sale: parse_flag(form.is_on_sale.as_deref()),
            sort_by,
            include_inactive: parse_flag(form.include_inactive.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_form_applies_documented_defaults() {
        let spec = FilterSpec::try_from(FilterProductsForm::default()).unwrap();
        assert_eq!(spec.page, 1);
        assert_eq!(spec.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(spec.sort_by, SortField::OrderAsc);
        assert!(!spec.in_stock);
        assert!(!spec.include_inactive);
        assert_eq!(spec.search, None);
    }

    #[test]
    fn filter_form_parses_populated_values() {
        let form = FilterProductsForm {
            page: Some("3".into()),
            limit: Some("20".into()),
            search: Some("  чай  ".into()),
            category: Some("7".into()),
            categories: Some("1, 2,oops, -4, 9".into()),
            min_price: Some("10".into()),
            max_price: Some("99.5".into()),
            in_stock: Some("true".into()),
            is_featured: Some("TRUE".into()),
            sort_by: Some("price_desc".into()),
            ..FilterProductsForm::default()
        };
        let spec = FilterSpec::try_from(form).unwrap();

        assert_eq!(spec.page, 3);
        assert_eq!(spec.limit, 20);
        assert_eq!(spec.search.as_deref(), Some("чай"));
        assert_eq!(spec.category.unwrap(), 7);
        let ids: Vec<i32> = spec.categories.iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![1, 2, 9]);
        assert_eq!(spec.min_price, Some(10.0));
        assert_eq!(spec.max_price, Some(99.5));
        assert!(spec.in_stock);
        assert!(spec.is_featured);
        assert!(!spec.is_on_sale);
        assert_eq!(spec.sort_by, SortField::PriceDesc);
    }

    #[test]
    fn filter_form_rejects_malformed_required_scalars() {
        let form = FilterProductsForm {
            page: Some("0".into()),
            ..FilterProductsForm::default()
        };
        assert_eq!(
            FilterSpec::try_from(form).unwrap_err(),
            FilterFormError::Page("0".into())
        );

        let form = FilterProductsForm {
            limit: Some("1000".into()),
            ..FilterProductsForm::default()
        };
        assert!(matches!(
            FilterSpec::try_from(form).unwrap_err(),
            FilterFormError::Limit(_)
        ));

        let form = FilterProductsForm {
            sort_by: Some("price".into()),
            ..FilterProductsForm::default()
        };
        assert!(matches!(
            FilterSpec::try_from(form).unwrap_err(),
            FilterFormError::Sort(_)
        ));

        let form = FilterProductsForm {
            min_price: Some("-5".into()),
            ..FilterProductsForm::default()
        };
        assert!(matches!(
            FilterSpec::try_from(form).unwrap_err(),
            FilterFormError::Price(_)
        ));
    }

    #[test]
    fn create_product_form_round_trips_through_payload() {
        let json = serde_json::json!({
            "name": { "ua": "Зелений чай", "en": "Green tea" },
            "price": { "current": 120.0, "old": 150.0 },
            "category": 3,
            "categories": [4, 0, 5],
            "stock": 7,
            "isFeatured": true,
        });
        let form: CreateProductForm = serde_json::from_value(json).unwrap();
        let payload = CreateProductPayload::try_from(form).unwrap();

        assert_eq!(payload.name.display_text(), "Зелений чай");
        assert_eq!(payload.price.current, 120.0);
        assert_eq!(payload.price.old.unwrap(), 150.0);
        assert_eq!(payload.price.currency, "UAH");
        assert_eq!(payload.category.unwrap(), 3);
        let ids: Vec<i32> = payload.categories.iter().map(|id| id.get()).collect();
        assert_eq!(ids, vec![4, 5]);
        assert_eq!(payload.stock, 7);
        assert!(payload.is_featured);
        assert!(payload.is_active);
        assert!(!payload.is_on_sale);
    }

    #[test]
    fn create_product_form_rejects_negative_price() {
        let json = serde_json::json!({
            "name": { "en": "Tea" },
            "price": { "current": -1.0 },
        });
        let form: CreateProductForm = serde_json::from_value(json).unwrap();
        assert!(CreateProductPayload::try_from(form).is_err());
    }

    #[test]
    fn update_product_form_clears_fields_with_explicit_null() {
        let json = serde_json::json!({
            "sku": null,
            "stock": 3,
        });
        let form: UpdateProductForm = serde_json::from_value(json).unwrap();
        let update = ProductUpdate::try_from(form).unwrap();

        assert_eq!(update.sku, Some(None));
        assert_eq!(update.stock, Some(3));
        assert_eq!(update.name, None);
        assert_eq!(update.images, None);
    }
}
