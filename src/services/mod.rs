//! Service layer: operation-per-function business logic generic over the
//! repository traits. Repository errors are logged here and mapped into
//! [`ServiceError`] so callers stay thin.

pub mod categories;
pub mod errors;
pub mod products;

pub use errors::{ServiceError, ServiceResult};

use crate::pagination::{MAX_PAGE_SIZE, Pagination};
use crate::repository::RepositoryResult;

/// Resolves `base` against the existing slug set by appending `-1`, `-2`,
/// ... until a free slug is found. The store still enforces the hard
/// uniqueness constraint; a conflict slipping through surfaces as
/// [`ServiceError::Conflict`] from the write itself.
pub(crate) fn resolve_unique_slug<F>(base: &str, exists: F) -> ServiceResult<String>
where
    F: Fn(&str) -> RepositoryResult<bool>,
{
    let mut candidate = base.to_string();
    let mut suffix = 0usize;
    loop {
        match exists(&candidate) {
            Ok(false) => return Ok(candidate),
            Ok(true) => {
                suffix += 1;
                candidate = format!("{base}-{suffix}");
            }
            Err(e) => {
                log::error!("Failed to check slug availability: {e}");
                return Err(ServiceError::Internal);
            }
        }
    }
}

/// Validates raw pagination parameters. Pages are 1-based and the page
/// size is capped at [`MAX_PAGE_SIZE`].
pub(crate) fn validate_pagination(page: usize, limit: usize) -> ServiceResult<Pagination> {
    if page < 1 {
        return Err(ServiceError::InvalidArgument(format!(
            "page must be at least 1, got {page}"
        )));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(ServiceError::InvalidArgument(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE}, got {limit}"
        )));
    }
    Ok(Pagination::new(page, limit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_unique_slug_appends_numeric_suffix() {
        let taken = ["shoes".to_string(), "shoes-1".to_string()];
        let resolved =
            resolve_unique_slug("shoes", |s| Ok(taken.iter().any(|t| t == s))).unwrap();
        assert_eq!(resolved, "shoes-2");

        let free = resolve_unique_slug("boots", |_| Ok(false)).unwrap();
        assert_eq!(free, "boots");
    }

    #[test]
    fn validate_pagination_bounds() {
        assert!(validate_pagination(1, 10).is_ok());
        assert!(validate_pagination(0, 10).is_err());
        assert!(validate_pagination(1, 0).is_err());
        assert!(validate_pagination(1, MAX_PAGE_SIZE + 1).is_err());
    }
}
