use std::collections::BTreeSet;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{CategoryUpdate, NewCategory};
use crate::domain::localized::LocalizedText;
use crate::domain::types::{CategoryId, TypeConstraintError};
use crate::forms::{LocalizedTextForm, double_option};
use crate::slug;

#[derive(Debug, Error)]
pub enum CategoryFormError {
    #[error("category form validation failed: {0}")]
    Validation(String),
    #[error("category form contains invalid data: {0}")]
    TypeConstraint(String),
}

impl From<ValidationErrors> for CategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<TypeConstraintError> for CategoryFormError {
    fn from(value: TypeConstraintError) -> Self {
        Self::TypeConstraint(value.to_string())
    }
}

fn require_valid_slug(value: &str) -> Result<String, CategoryFormError> {
    if slug::is_valid(value) {
        Ok(value.to_string())
    } else {
        Err(CategoryFormError::TypeConstraint(format!(
            "invalid slug: {value}"
        )))
    }
}

/// Secondary parent ids are optional hints; malformed entries are dropped
/// instead of failing the whole request.
fn collect_valid_ids(raw: Vec<i32>) -> BTreeSet<CategoryId> {
    raw.into_iter()
        .filter_map(|id| CategoryId::new(id).ok())
        .collect()
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCategoryForm {
    pub name: LocalizedTextForm,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    pub parent: Option<i32>,
    pub parent_categories: Vec<i32>,
    pub order: u32,
    pub is_active: Option<bool>,
    pub description: Option<LocalizedTextForm>,
    pub image: Option<String>,
    pub icon: Option<String>,
    pub meta_title: Option<LocalizedTextForm>,
    pub meta_description: Option<LocalizedTextForm>,
    pub meta_keywords: Option<LocalizedTextForm>,
}

/// Validated category creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCategoryPayload {
    pub name: LocalizedText,
    /// Explicit slug, already shape-checked. `None` means derive from name.
    pub slug: Option<String>,
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
}

impl CreateCategoryPayload {
    /// Builds the record to persist once the unique slug is resolved.
    pub fn into_new_category(self, slug: String) -> NewCategory {
        let now = Utc::now().naive_utc();
        NewCategory {
            name: self.name,
            slug,
            parent: self.parent,
            parent_categories: self.parent_categories,
            order: self.order,
            is_active: self.is_active,
            description: self.description,
            image: self.image,
            icon: self.icon,
            meta_title: self.meta_title,
            meta_description: self.meta_description,
            meta_keywords: self.meta_keywords,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<CreateCategoryForm> for CreateCategoryPayload {
    type Error = CategoryFormError;

    fn try_from(form: CreateCategoryForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = form.name.into_localized();
        if name.is_empty() {
            return Err(TypeConstraintError::EmptyString("category name").into());
        }
        let slug = form.slug.as_deref().map(require_valid_slug).transpose()?;
        let parent = form
            .parent
            .map(CategoryId::new)
            .transpose()
            .map_err(CategoryFormError::from)?;

        Ok(Self {
            name,
            slug,
            parent,
            parent_categories: collect_valid_ids(form.parent_categories),
            order: form.order,
            is_active: form.is_active.unwrap_or(true),
            description: form.description.map(LocalizedTextForm::into_localized),
            image: form.image,
            icon: form.icon,
            meta_title: form.meta_title.map(LocalizedTextForm::into_localized),
            meta_description: form.meta_description.map(LocalizedTextForm::into_localized),
            meta_keywords: form.meta_keywords.map(LocalizedTextForm::into_localized),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateCategoryForm {
    pub name: Option<LocalizedTextForm>,
    #[validate(length(min = 1, max = 100))]
    pub slug: Option<String>,
    #[serde(deserialize_with = "double_option")]
    pub parent: Option<Option<i32>>,
    pub parent_categories: Option<Vec<i32>>,
    pub order: Option<u32>,
    pub is_active: Option<bool>,
    #[serde(deserialize_with = "double_option")]
    pub description: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub icon: Option<Option<String>>,
    #[serde(deserialize_with = "double_option")]
    pub meta_title: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub meta_description: Option<Option<LocalizedTextForm>>,
    #[serde(deserialize_with = "double_option")]
    pub meta_keywords: Option<Option<LocalizedTextForm>>,
}

impl TryFrom<UpdateCategoryForm> for CategoryUpdate {
    type Error = CategoryFormError;

    fn try_from(form: UpdateCategoryForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let name = form
            .name
            .map(LocalizedTextForm::into_localized)
            .map(|name| {
                if name.is_empty() {
                    Err(TypeConstraintError::EmptyString("category name"))
                } else {
                    Ok(name)
                }
            })
            .transpose()?;
        let slug = form.slug.as_deref().map(require_valid_slug).transpose()?;
        let parent = form
            .parent
            .map(|parent| parent.map(CategoryId::new).transpose())
            .transpose()
            .map_err(CategoryFormError::from)?;

        Ok(Self {
            name,
            slug,
            parent,
            parent_categories: form.parent_categories.map(collect_valid_ids),
            order: form.order,
            is_active: form.is_active,
            description: form
                .description
                .map(|d| d.map(LocalizedTextForm::into_localized)),
            image: form.image,
            icon: form.icon,
            meta_title: form
                .meta_title
                .map(|t| t.map(LocalizedTextForm::into_localized)),
            meta_description: form
                .meta_description
                .map(|t| t.map(LocalizedTextForm::into_localized)),
            meta_keywords: form
                .meta_keywords
                .map(|t| t.map(LocalizedTextForm::into_localized)),
        })
    }
}

/// One entry of a bulk sibling reorder request.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryOrderEntry {
    pub id: i32,
    pub order: u32,
}

/// Bulk `order` reassignment across categories.
#[derive(Debug, Default, Deserialize)]
pub struct ReorderCategoriesForm {
    pub updates: Vec<CategoryOrderEntry>,
}

impl ReorderCategoriesForm {
    /// Entries with malformed ids are dropped.
    pub fn into_payload(self) -> Vec<(CategoryId, u32)> {
        self.updates
            .into_iter()
            .filter_map(|entry| CategoryId::new(entry.id).ok().map(|id| (id, entry.order)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_requires_a_displayable_name() {
        let form = CreateCategoryForm::default();
        let err = CreateCategoryPayload::try_from(form).unwrap_err();
        assert!(matches!(err, CategoryFormError::TypeConstraint(_)));
    }

    #[test]
    fn create_rejects_malformed_explicit_slug() {
        let form = CreateCategoryForm {
            name: LocalizedTextForm {
                ua: Some("Чай".into()),
                ..LocalizedTextForm::default()
            },
            slug: Some("Bad Slug!".into()),
            ..CreateCategoryForm::default()
        };
        assert!(CreateCategoryPayload::try_from(form).is_err());
    }

    #[test]
    fn create_drops_invalid_secondary_parent_ids() {
        let form = CreateCategoryForm {
            name: LocalizedTextForm {
                en: Some("Tea".into()),
                ..LocalizedTextForm::default()
            },
            parent_categories: vec![3, 0, -7, 5],
            ..CreateCategoryForm::default()
        };
        let payload = CreateCategoryPayload::try_from(form).unwrap();
        let ids: Vec<i32> = payload
            .parent_categories
            .iter()
            .map(|id| id.get())
            .collect();
        assert_eq!(ids, vec![3, 5]);
        assert!(payload.is_active);
    }

    #[test]
    fn update_distinguishes_clear_from_absent() {
        let json = serde_json::json!({ "parent": null, "order": 2 });
        let form: UpdateCategoryForm = serde_json::from_value(json).unwrap();
        let update = CategoryUpdate::try_from(form).unwrap();

        assert_eq!(update.parent, Some(None));
        assert_eq!(update.order, Some(2));
        assert_eq!(update.slug, None);
        assert_eq!(update.description, None);
    }

    #[test]
    fn reorder_drops_malformed_ids() {
        let form = ReorderCategoriesForm {
            updates: vec![
                CategoryOrderEntry { id: 1, order: 2 },
                CategoryOrderEntry { id: 0, order: 3 },
            ],
        };
        let payload = form.into_payload();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].0, 1);
    }
}
