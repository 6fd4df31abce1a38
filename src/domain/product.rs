use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::localized::LocalizedText;
use crate::domain::types::{CategoryId, CustomFieldValue, PriceValue, ProductId};

/// Price of a product or variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub current: PriceValue,
    pub old: Option<PriceValue>,
    pub currency: String,
}

impl Price {
    pub const DEFAULT_CURRENCY: &'static str = "UAH";

    pub fn new(current: PriceValue) -> Self {
        Self {
            current,
            old: None,
            currency: Self::DEFAULT_CURRENCY.to_string(),
        }
    }
}

/// A sellable variation of a product (size, flavour, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductVariant {
    pub name: LocalizedText,
    pub price: Price,
    pub sku: Option<String>,
    pub stock: u32,
    pub is_active: bool,
}

/// A displayed characteristic such as weight or country of origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: LocalizedText,
    pub value: LocalizedText,
    pub unit: Option<String>,
}

/// Reference to an externally stored product image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub url: String,
    pub alt: Option<String>,
    pub order: u32,
    pub is_main: bool,
}

/// Catalog product.
///
/// `category` is the primary membership; `categories` holds secondary
/// memberships. The counters (`views`, `sales`, `rating`, `reviews_count`)
/// are server-maintained and never client-settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: LocalizedText,
    pub slug: String,
    pub description: Option<LocalizedText>,
    pub short_description: Option<LocalizedText>,
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
    pub price: Price,
    #[serde(default)]
    pub variants: Vec<ProductVariant>,
    #[serde(default)]
    pub attributes: Vec<ProductAttribute>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub sku: Option<String>,
    pub stock: u32,
    pub order: u32,
    pub is_active: bool,
    pub is_new: bool,
    pub is_featured: bool,
    pub is_on_sale: bool,
    pub views: u32,
    pub sales: u32,
    pub rating: f64,
    pub reviews_count: u32,
    pub meta_title: Option<LocalizedText>,
    pub meta_description: Option<LocalizedText>,
    pub meta_keywords: Option<LocalizedText>,
    #[serde(default)]
    pub custom_fields: BTreeMap<String, CustomFieldValue>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Applies a partial update in place and restores the main-image
    /// invariant. Timestamps are left to the caller.
    pub fn apply_update(&mut self, update: &ProductUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            self.slug = slug.clone();
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(short_description) = &update.short_description {
            self.short_description = short_description.clone();
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(categories) = &update.categories {
            self.categories = categories.clone();
        }
        if let Some(price) = &update.price {
            self.price = price.clone();
        }
        if let Some(variants) = &update.variants {
            self.variants = variants.clone();
        }
        if let Some(attributes) = &update.attributes {
            self.attributes = attributes.clone();
        }
        if let Some(images) = &update.images {
            self.images = images.clone();
        }
        if let Some(sku) = &update.sku {
            self.sku = sku.clone();
        }
        if let Some(stock) = update.stock {
            self.stock = stock;
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_new) = update.is_new {
            self.is_new = is_new;
        }
        if let Some(is_featured) = update.is_featured {
            self.is_featured = is_featured;
        }
        if let Some(is_on_sale) = update.is_on_sale {
            self.is_on_sale = is_on_sale;
        }
        if let Some(meta_title) = &update.meta_title {
            self.meta_title = meta_title.clone();
        }
        if let Some(meta_description) = &update.meta_description {
            self.meta_description = meta_description.clone();
        }
        if let Some(meta_keywords) = &update.meta_keywords {
            self.meta_keywords = meta_keywords.clone();
        }
        if let Some(custom_fields) = &update.custom_fields {
            self.custom_fields = custom_fields.clone();
        }
        normalize_main_image(&mut self.images);
    }
}

/// Restores the invariant that exactly one image is marked `is_main` once
/// any image exists: the first marked image wins, every other mark is
/// cleared, and the first image is promoted when none is marked.
pub fn normalize_main_image(images: &mut [ProductImage]) {
    let main = images.iter().position(|image| image.is_main);
    match main {
        Some(keep) => {
            for (index, image) in images.iter_mut().enumerate() {
                image.is_main = index == keep;
            }
        }
        None => {
            if let Some(first) = images.first_mut() {
                first.is_main = true;
            }
        }
    }
}

/// Information required to create a new [`Product`].
///
/// The slug must already be resolved to its unique form; counters start at
/// zero and are omitted here on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: LocalizedText,
    pub slug: String,
    pub description: Option<LocalizedText>,
    pub short_description: Option<LocalizedText>,
    pub category: Option<CategoryId>,
    pub categories: BTreeSet<CategoryId>,
    pub price: Price,
    pub variants: Vec<ProductVariant>,
    pub attributes: Vec<ProductAttribute>,
    pub images: Vec<ProductImage>,
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
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial patch for a [`Product`]. Counters cannot be patched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductUpdate {
    pub name: Option<LocalizedText>,
    pub slug: Option<String>,
    pub description: Option<Option<LocalizedText>>,
    pub short_description: Option<Option<LocalizedText>>,
    pub category: Option<Option<CategoryId>>,
    pub categories: Option<BTreeSet<CategoryId>>,
    pub price: Option<Price>,
    pub variants: Option<Vec<ProductVariant>>,
    pub attributes: Option<Vec<ProductAttribute>>,
    pub images: Option<Vec<ProductImage>>,
    pub sku: Option<Option<String>>,
    pub stock: Option<u32>,
    pub order: Option<u32>,
    pub is_active: Option<bool>,
    pub is_new: Option<bool>,
    pub is_featured: Option<bool>,
    pub is_on_sale: Option<bool>,
    pub meta_title: Option<Option<LocalizedText>>,
    pub meta_description: Option<Option<LocalizedText>>,
    pub meta_keywords: Option<Option<LocalizedText>>,
    pub custom_fields: Option<BTreeMap<String, CustomFieldValue>>,
}
