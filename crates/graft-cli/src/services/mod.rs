//! Service layer for business logic with dependency injection.
//!
//! Services accept trait-based repositories so they can run against real
//! git repositories or test doubles alike.

pub mod import;

pub use import::{ImportService, effective_options, summary};
