//! Plain-text Case Registry
//!
//! Cases are YAML documents stored in a directory.

pub mod domain;
pub use domain::{Case, CaseGraph, Config, LinkError, SearchCriteria};

/// Filesystem storage and directory management for cases.
pub mod storage;
pub use storage::Directory;
