//! # graft-git
//!
//! Git operations for graft. A [`Repository`] pairs a git2 handle (used for
//! discovery and HEAD lookups) with a `git` subprocess runner for everything
//! whose command-line behavior must be honored exactly: log, format-patch,
//! am, reset, config.

mod command;
mod error;
mod host;
mod repository;
mod source;
mod traits;

pub use error::{Error, Result};
pub use git2::Oid;
pub use repository::Repository;
pub use traits::{ApplyOptions, HostOps, Identity, SourceOps};
