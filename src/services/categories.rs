use crate::domain::category::{Category, CategoryTreeNode, CategoryUpdate};
use crate::domain::types::CategoryId;
use crate::dto::categories::CategoryStatistics;
use crate::forms::categories::CreateCategoryPayload;
use crate::hierarchy;
use crate::pagination::Paginated;
use crate::repository::{CategoryListQuery, CategoryReader, CategoryWriter};
use crate::slug;

use super::{ServiceError, ServiceResult, resolve_unique_slug, validate_pagination};

/// Full category snapshot the hierarchy functions operate on; filtering by
/// activity happens downstream.
fn snapshot<R: CategoryReader>(repo: &R) -> ServiceResult<Vec<Category>> {
    match repo.list_categories(CategoryListQuery::default().include_inactive(true)) {
        Ok((_total, categories)) => Ok(categories),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Creates a category, deriving and de-duplicating the slug when no
/// explicit one was supplied. The primary parent must exist.
pub fn create_category<R>(payload: CreateCategoryPayload, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter,
{
    if let Some(parent) = payload.parent {
        match repo.get_category_by_id(parent) {
            Ok(Some(_)) => {}
            Ok(None) => {
                return Err(ServiceError::InvalidArgument(format!(
                    "parent category does not exist: {parent}"
                )));
            }
            Err(e) => {
                log::error!("Failed to look up parent category: {e}");
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
            "category name does not yield a usable slug".to_string(),
        ));
    }
    let slug = resolve_unique_slug(&base, |s| repo.category_slug_exists(s))?;

    match repo.create_category(&payload.into_new_category(slug)) {
        Ok(category) => Ok(category),
        Err(e) => {
            log::error!("Failed to create category: {e}");
            Err(e.into())
        }
    }
}

/// Flat `(order, id)` sorted category listing.
pub fn list_categories<R: CategoryReader>(
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Category>> {
    match repo.list_categories(CategoryListQuery::default().include_inactive(include_inactive)) {
        Ok((_total, categories)) => Ok(categories),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Paginated flat listing with the total computed before slicing.
pub fn list_categories_paginated<R: CategoryReader>(
    page: usize,
    limit: usize,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Paginated<Category>> {
    let pagination = validate_pagination(page, limit)?;
    let query = CategoryListQuery::default()
        .include_inactive(include_inactive)
        .paginate(pagination.page, pagination.per_page);
    match repo.list_categories(query) {
        Ok((total, categories)) => Ok(Paginated::new(categories, total, page, limit)),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Assembles the whole category forest.
pub fn category_tree<R: CategoryReader>(
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<CategoryTreeNode>> {
    let categories = snapshot(repo)?;
    Ok(hierarchy::build_tree(&categories, include_inactive))
}

/// Assembles the subtree rooted at `root_id`.
pub fn category_tree_from<R: CategoryReader>(
    root_id: i32,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<CategoryTreeNode> {
    let root_id = CategoryId::new(root_id).map_err(|_| ServiceError::NotFound)?;
    let categories = snapshot(repo)?;
    hierarchy::build_tree_from(root_id, &categories, include_inactive)
        .ok_or(ServiceError::NotFound)
}

/// Root categories without children attached.
pub fn main_categories<R: CategoryReader>(
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Category>> {
    let categories = snapshot(repo)?;
    Ok(hierarchy::main_categories(&categories, include_inactive))
}

/// Categories under `parent_id` through the primary edge or a secondary
/// membership edge.
pub fn sub_categories<R: CategoryReader>(
    parent_id: i32,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Category>> {
    let parent_id = CategoryId::new(parent_id).map_err(|_| ServiceError::NotFound)?;
    let categories = snapshot(repo)?;
    Ok(hierarchy::sub_categories(
        parent_id,
        &categories,
        include_inactive,
    ))
}

/// Substring search over category names and descriptions.
pub fn search_categories<R: CategoryReader>(
    query: &str,
    include_inactive: bool,
    repo: &R,
) -> ServiceResult<Vec<Category>> {
    let categories = snapshot(repo)?;
    Ok(hierarchy::search(query, &categories, include_inactive))
}

pub fn get_category<R: CategoryReader>(id: i32, repo: &R) -> ServiceResult<Category> {
    let id = CategoryId::new(id).map_err(|_| ServiceError::NotFound)?;
    match repo.get_category_by_id(id) {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_category_by_slug<R: CategoryReader>(slug: &str, repo: &R) -> ServiceResult<Category> {
    match repo.get_category_by_slug(slug) {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category by slug: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Walks the primary-parent chain upwards from `start` and fails when it
/// reaches `moving`, which would close a cycle.
fn ensure_parent_chain_acyclic(
    moving: CategoryId,
    start: CategoryId,
    categories: &[Category],
) -> ServiceResult<()> {
    let mut current = Some(start);
    let mut seen = std::collections::HashSet::new();
    while let Some(id) = current {
        if id == moving {
            return Err(ServiceError::InvalidArgument(format!(
                "category {moving} cannot become a descendant of itself"
            )));
        }
        if !seen.insert(id) {
            break;
        }
        current = categories
            .iter()
            .find(|c| c.id == id)
            .and_then(|c| c.parent);
    }
    Ok(())
}

/// Applies a partial update. Re-parenting checks that the new parent exists
/// and that the move keeps the primary-parent chain acyclic.
pub fn update_category<R>(id: i32, update: CategoryUpdate, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter,
{
    let id = CategoryId::new(id).map_err(|_| ServiceError::NotFound)?;

    if let Some(Some(new_parent)) = update.parent {
        if new_parent == id {
            return Err(ServiceError::InvalidArgument(format!(
                "category {id} cannot be its own parent"
            )));
        }
        let categories = snapshot(repo)?;
        if !categories.iter().any(|c| c.id == new_parent) {
            return Err(ServiceError::InvalidArgument(format!(
                "parent category does not exist: {new_parent}"
            )));
        }
        ensure_parent_chain_acyclic(id, new_parent, &categories)?;
    }

    match repo.update_category(id, &update) {
        Ok(category) => Ok(category),
        Err(e) => {
            log::error!("Failed to update category: {e}");
            Err(e.into())
        }
    }
}

/// Bulk `order` reassignment. Unknown identifiers are skipped; returns the
/// number of records actually updated.
pub fn reorder_categories<R: CategoryWriter>(
    updates: Vec<(CategoryId, u32)>,
    repo: &R,
) -> ServiceResult<usize> {
    let mut affected = 0;
    for (id, order) in updates {
        match repo.update_category_order(id, order) {
            Ok(count) => affected += count,
            Err(e) => {
                log::error!("Failed to reorder category {id}: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }
    Ok(affected)
}

/// Deletes a category. Refused while other categories still point at it
/// through their primary parent edge.
pub fn delete_category<R>(id: i32, repo: &R) -> ServiceResult<Category>
where
    R: CategoryReader + CategoryWriter,
{
    let id = CategoryId::new(id).map_err(|_| ServiceError::NotFound)?;
    let categories = snapshot(repo)?;
    if categories.iter().any(|c| c.parent == Some(id)) {
        return Err(ServiceError::InvalidArgument(format!(
            "category {id} still has child categories"
        )));
    }
    match repo.delete_category(id) {
        Ok(category) => Ok(category),
        Err(e) => {
            log::error!("Failed to delete category: {e}");
            Err(e.into())
        }
    }
}

/// Aggregate counts over the whole category set, inactive included.
pub fn category_statistics<R: CategoryReader>(repo: &R) -> ServiceResult<CategoryStatistics> {
    let categories = snapshot(repo)?;
    let active = categories.iter().filter(|c| c.is_active).count();
    Ok(CategoryStatistics {
        total: categories.len(),
        active,
        inactive: categories.len() - active,
        main: categories.iter().filter(|c| c.parent.is_none()).count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::localized::LocalizedText;
    use crate::repository::memory::InMemoryRepository;

    fn payload(name: &str, parent: Option<CategoryId>) -> CreateCategoryPayload {
        CreateCategoryPayload {
            name: LocalizedText::ua(name),
            slug: None,
            parent,
            parent_categories: Default::default(),
            order: 0,
            is_active: true,
            description: None,
            image: None,
            icon: None,
            meta_title: None,
            meta_description: None,
            meta_keywords: None,
        }
    }

    #[test]
    fn create_derives_transliterated_slug() {
        let repo = InMemoryRepository::new();
        let category = create_category(payload("Электроника", None), &repo).unwrap();
        assert_eq!(category.slug, "elektronika");
    }

    #[test]
    fn create_resolves_slug_collisions_with_suffixes() {
        let repo = InMemoryRepository::new();
        let first = create_category(payload("Shoes", None), &repo).unwrap();
        let second = create_category(payload("Shoes", None), &repo).unwrap();
        let third = create_category(payload("Shoes", None), &repo).unwrap();
        assert_eq!(first.slug, "shoes");
        assert_eq!(second.slug, "shoes-1");
        assert_eq!(third.slug, "shoes-2");
    }

    #[test]
    fn create_rejects_name_without_usable_slug() {
        let repo = InMemoryRepository::new();
        let err = create_category(payload("!!!", None), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn create_rejects_missing_parent() {
        let repo = InMemoryRepository::new();
        let parent = CategoryId::new(42).unwrap();
        let err = create_category(payload("Tea", Some(parent)), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));
    }

    #[test]
    fn update_rejects_reparenting_into_own_subtree() {
        let repo = InMemoryRepository::new();
        let root = create_category(payload("Root", None), &repo).unwrap();
        let child = create_category(payload("Child", Some(root.id)), &repo).unwrap();
        let grandchild = create_category(payload("Grandchild", Some(child.id)), &repo).unwrap();

        let update = CategoryUpdate {
            parent: Some(Some(grandchild.id)),
            ..CategoryUpdate::default()
        };
        let err = update_category(root.id.get(), update, &repo).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        // Moving sideways is fine.
        let other = create_category(payload("Other", None), &repo).unwrap();
        let update = CategoryUpdate {
            parent: Some(Some(other.id)),
            ..CategoryUpdate::default()
        };
        assert!(update_category(child.id.get(), update, &repo).is_ok());
    }

    #[test]
    fn delete_refused_while_children_exist() {
        let repo = InMemoryRepository::new();
        let root = create_category(payload("Root", None), &repo).unwrap();
        let child = create_category(payload("Child", Some(root.id)), &repo).unwrap();

        let err = delete_category(root.id.get(), &repo).unwrap_err();
        assert!(matches!(err, ServiceError::InvalidArgument(_)));

        delete_category(child.id.get(), &repo).unwrap();
        assert!(delete_category(root.id.get(), &repo).is_ok());
    }

    #[test]
    fn tree_and_lookups_ignore_malformed_ids() {
        let repo = InMemoryRepository::new();
        create_category(payload("Root", None), &repo).unwrap();

        assert_eq!(
            category_tree_from(0, false, &repo).unwrap_err(),
            ServiceError::NotFound
        );
        assert_eq!(get_category(-1, &repo).unwrap_err(), ServiceError::NotFound);
    }

    #[test]
    fn reorder_skips_unknown_ids() {
        let repo = InMemoryRepository::new();
        let a = create_category(payload("A", None), &repo).unwrap();
        let b = create_category(payload("B", None), &repo).unwrap();

        let affected = reorder_categories(
            vec![
                (a.id, 5),
                (b.id, 1),
                (CategoryId::new(99).unwrap(), 3),
            ],
            &repo,
        )
        .unwrap();
        assert_eq!(affected, 2);

        let listed = list_categories(false, &repo).unwrap();
        let slugs: Vec<&str> = listed.iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }

    #[test]
    fn statistics_count_activity_and_roots() {
        let repo = InMemoryRepository::new();
        let root = create_category(payload("Root", None), &repo).unwrap();
        create_category(payload("Child", Some(root.id)), &repo).unwrap();
        let mut inactive = payload("Hidden", None);
        inactive.is_active = false;
        create_category(inactive, &repo).unwrap();

        let stats = category_statistics(&repo).unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active, 2);
        assert_eq!(stats.inactive, 1);
        assert_eq!(stats.main, 2);
    }
}
