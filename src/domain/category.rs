use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::localized::LocalizedText;
use crate::domain::types::CategoryId;

/// Catalog category.
///
/// `parent` is the single primary edge defining the canonical tree position;
/// `parent_categories` carries additional parent edges, turning the overall
/// structure into a DAG for sub-categories shared under multiple branches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: LocalizedText,
    pub slug: String,
    pub parent: Option<CategoryId>,
    #[serde(default)]
    pub parent_categories: BTreeSet<CategoryId>,
    pub order: u32,
    pub is_active: bool,
    pub description: Option<LocalizedText>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub meta_title: Option<LocalizedText>,
    pub meta_description: Option<LocalizedText>,
    pub meta_keywords: Option<LocalizedText>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Category {
    /// Applies a partial update in place. Timestamps are left to the caller.
    pub fn apply_update(&mut self, update: &CategoryUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(slug) = &update.slug {
            self.slug = slug.clone();
        }
        if let Some(parent) = update.parent {
            self.parent = parent;
        }
        if let Some(parent_categories) = &update.parent_categories {
            self.parent_categories = parent_categories.clone();
        }
        if let Some(order) = update.order {
            self.order = order;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(description) = &update.description {
            self.description = description.clone();
        }
        if let Some(image) = &update.image {
            self.image = image.clone();
        }
        if let Some(icon) = &update.icon {
            self.icon = icon.clone();
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
    }
}

/// Information required to create a new [`Category`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: LocalizedText,
    pub slug: String,
    pub parent: Option<CategoryId>,
    pub parent_categories: BTreeSet<CategoryId>,
    pub order: u32,
    pub is_active: bool,
    pub description: Option<LocalizedText>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub meta_title: Option<LocalizedText>,
    pub meta_description: Option<LocalizedText>,
    pub meta_keywords: Option<LocalizedText>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Partial patch for a [`Category`].
///
/// `None` means "leave the field unchanged"; the nested `Option` on
/// clearable fields distinguishes "set to null" from "not provided".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    pub name: Option<LocalizedText>,
    pub slug: Option<String>,
    pub parent: Option<Option<CategoryId>>,
    pub parent_categories: Option<BTreeSet<CategoryId>>,
    pub order: Option<u32>,
    pub is_active: Option<bool>,
    pub description: Option<Option<LocalizedText>>,
    pub image: Option<Option<String>>,
    pub icon: Option<Option<String>>,
    pub meta_title: Option<Option<LocalizedText>>,
    pub meta_description: Option<Option<LocalizedText>>,
    pub meta_keywords: Option<Option<LocalizedText>>,
}

/// A category with its children attached, as produced by tree assembly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTreeNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryTreeNode>,
}
