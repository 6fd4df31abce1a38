//! Category hierarchy assembly and lookups.
//!
//! Categories form a DAG: the primary `parent` edge defines the canonical
//! tree rendered to clients, while `parent_categories` side-edges only
//! participate in membership queries. All functions here are pure over a
//! flat snapshot of records supplied by the repository.

use std::collections::{HashMap, HashSet};

use crate::domain::category::{Category, CategoryTreeNode};
use crate::domain::types::CategoryId;

fn visible(categories: &[Category], include_inactive: bool) -> Vec<&Category> {
    categories
        .iter()
        .filter(|c| include_inactive || c.is_active)
        .collect()
}

/// Sibling ordering inside trees and flat listings: `order` ascending,
/// identifier as the stable tiebreak.
fn sort_by_position(categories: &mut [&Category]) {
    categories.sort_by_key(|c| (c.order, c.id));
}

fn attach(
    category: &Category,
    children: &HashMap<CategoryId, Vec<&Category>>,
    visited: &mut HashSet<CategoryId>,
) -> CategoryTreeNode {
    visited.insert(category.id);
    let mut nodes = Vec::new();
    if let Some(list) = children.get(&category.id) {
        for &child in list {
            if visited.contains(&child.id) {
                continue;
            }
            nodes.push(attach(child, children, visited));
        }
    }
    CategoryTreeNode {
        category: category.clone(),
        children: nodes,
    }
}

/// Assembles the category forest from a flat record set.
///
/// Roots are categories without a primary parent. A category referencing a
/// parent that is missing from the snapshot (or filtered out) is rendered
/// as a root, and nodes trapped in a primary-parent cycle are appended as
/// roots as well; one bad record must not break the whole tree.
pub fn build_tree(categories: &[Category], include_inactive: bool) -> Vec<CategoryTreeNode> {
    let visible = visible(categories, include_inactive);
    let ids: HashSet<CategoryId> = visible.iter().map(|c| c.id).collect();

    let mut roots: Vec<&Category> = Vec::new();
    let mut children: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    for &category in &visible {
        match category.parent {
            Some(parent) if ids.contains(&parent) => {
                children.entry(parent).or_default().push(category);
            }
            _ => roots.push(category),
        }
    }
    sort_by_position(&mut roots);
    for list in children.values_mut() {
        sort_by_position(list);
    }

    let mut visited = HashSet::new();
    let mut forest: Vec<CategoryTreeNode> = roots
        .into_iter()
        .map(|root| attach(root, &children, &mut visited))
        .collect();

    // Whatever is still unvisited sits on a parent cycle.
    let mut stranded: Vec<&Category> = visible
        .iter()
        .filter(|c| !visited.contains(&c.id))
        .copied()
        .collect();
    sort_by_position(&mut stranded);
    for category in stranded {
        if !visited.contains(&category.id) {
            forest.push(attach(category, &children, &mut visited));
        }
    }

    forest
}

/// Assembles the subtree rooted at `root_id`.
///
/// Returns `None` when the root is absent from the snapshot or filtered
/// out, a distinct outcome from a present root with no children.
pub fn build_tree_from(
    root_id: CategoryId,
    categories: &[Category],
    include_inactive: bool,
) -> Option<CategoryTreeNode> {
    let visible = visible(categories, include_inactive);
    let root = visible.iter().copied().find(|c| c.id == root_id)?;

    let mut children: HashMap<CategoryId, Vec<&Category>> = HashMap::new();
    for &category in &visible {
        if let Some(parent) = category.parent {
            children.entry(parent).or_default().push(category);
        }
    }
    for list in children.values_mut() {
        sort_by_position(list);
    }

    let mut visited = HashSet::new();
    Some(attach(root, &children, &mut visited))
}

/// Flat list of root categories, `(order, id)` sorted. No children attached.
pub fn main_categories(categories: &[Category], include_inactive: bool) -> Vec<Category> {
    let mut roots: Vec<&Category> = visible(categories, include_inactive)
        .into_iter()
        .filter(|c| c.parent.is_none())
        .collect();
    sort_by_position(&mut roots);
    roots.into_iter().cloned().collect()
}

/// Categories sitting under `parent_id` through either the primary edge or
/// a `parent_categories` side-edge, deduplicated by construction and
/// `(order, id)` sorted.
pub fn sub_categories(
    parent_id: CategoryId,
    categories: &[Category],
    include_inactive: bool,
) -> Vec<Category> {
    let mut subs: Vec<&Category> = visible(categories, include_inactive)
        .into_iter()
        .filter(|c| c.parent == Some(parent_id) || c.parent_categories.contains(&parent_id))
        .collect();
    sort_by_position(&mut subs);
    subs.into_iter().cloned().collect()
}

/// Case-insensitive substring search across every localized variant of the
/// category name and description. No relevance ranking; results keep the
/// default `(order, name)` ordering.
pub fn search(query: &str, categories: &[Category], include_inactive: bool) -> Vec<Category> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    let mut matches: Vec<&Category> = visible(categories, include_inactive)
        .into_iter()
        .filter(|c| {
            c.name.contains_lower(&needle)
                || c.description
                    .as_ref()
                    .is_some_and(|d| d.contains_lower(&needle))
        })
        .collect();
    matches.sort_by(|a, b| {
        (a.order, a.name.display_text().to_lowercase(), a.id).cmp(&(
            b.order,
            b.name.display_text().to_lowercase(),
            b.id,
        ))
    });
    matches.into_iter().cloned().collect()
}
