use serde::Serialize;

use crate::domain::category::Category;

/// Compact category reference for embedding into listings.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryDto {
    pub id: i32,
    pub name: String,
    pub slug: String,
}

impl From<&Category> for CategoryDto {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.get(),
            name: category.name.display_text().to_string(),
            slug: category.slug.clone(),
        }
    }
}

/// Aggregate counts over the whole category set.
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CategoryStatistics {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    /// Categories without a primary parent.
    pub main: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::localized::LocalizedText;

    use chrono::DateTime;
    use std::collections::BTreeSet;

    use crate::domain::types::CategoryId;

    #[test]
    fn dto_uses_display_name() {
        let ts = DateTime::from_timestamp(0, 0).unwrap().naive_utc();
        let category = Category {
            id: CategoryId::new(4).unwrap(),
            name: LocalizedText::new(None::<String>, Some("Чай"), Some("Tea")),
            slug: "tea".into(),
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
            created_at: ts,
            updated_at: ts,
        };
        let dto = CategoryDto::from(&category);
        assert_eq!(dto.id, 4);
        assert_eq!(dto.name, "Чай");
        assert_eq!(dto.slug, "tea");
    }
}
