//! # Blog Core
//!
//! The domain layer of the blog service.
//! Posts, validation, permissions and filtering with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod filter;
pub mod pagination;
pub mod permission;
pub mod ports;
pub mod validation;

pub use error::DomainError;
pub use validation::FieldErrors;
