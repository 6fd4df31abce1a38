//! Core library for the Lavka catalog backend.
//!
//! This crate exposes the catalog domain model, slug assignment, the
//! category hierarchy and product query engines, the service layer and the
//! repository traits a persistence backend must satisfy.

pub mod domain;
pub mod dto;
mod error_conversions;
pub mod forms;
pub mod hierarchy;
pub mod pagination;
pub mod query;
pub mod repository;
pub mod services;
pub mod slug;
