//! Error conversion glue between the layers.
//!
//! The domain layer must not depend on service or repository error types;
//! the conversions the upper layers need live here instead.

use crate::domain::types::TypeConstraintError;
use crate::forms::categories::CategoryFormError;
use crate::forms::products::{FilterFormError, ProductFormError};
use crate::repository::RepositoryError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::InvalidArgument(val.to_string())
    }
}

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::Validation(val.to_string())
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(val: RepositoryError) -> Self {
        match val {
            RepositoryError::NotFound => ServiceError::NotFound,
            RepositoryError::Conflict(message) => ServiceError::Conflict(message),
            RepositoryError::Validation(message) => ServiceError::InvalidArgument(message),
            RepositoryError::Backend(_) => ServiceError::Internal,
        }
    }
}

impl From<CategoryFormError> for ServiceError {
    fn from(val: CategoryFormError) -> Self {
        ServiceError::InvalidArgument(val.to_string())
    }
}

impl From<ProductFormError> for ServiceError {
    fn from(val: ProductFormError) -> Self {
        ServiceError::InvalidArgument(val.to_string())
    }
}

impl From<FilterFormError> for ServiceError {
    fn from(val: FilterFormError) -> Self {
        ServiceError::InvalidArgument(val.to_string())
    }
}
