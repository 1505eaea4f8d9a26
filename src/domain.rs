//! Domain models for the case registry.
//!
//! This module contains the case record, the classification labels it
//! carries, the relation graph between cases, and configuration.

/// The case record.
pub mod case;
pub use case::Case;

mod config;
pub use config::Config;

/// Helpers for taxpayer ids and filing numbers.
pub mod document;

mod graph;
pub use graph::{CaseGraph, LinkError, LinkOutcome};

/// Classification labels.
pub mod label;
pub use label::{Hypothesis, InvalidLabelError, ProcessStatus, ServiceGroup, Stage, Status};

/// Case search.
pub mod search;
pub use search::{SearchCriteria, SearchError, search};
