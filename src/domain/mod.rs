pub mod category;
pub mod localized;
pub mod product;
pub mod types;
