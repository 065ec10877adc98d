//! Service layer for business logic
//!
//! Shared by every interface that drives the core (currently the CLI).

pub mod deletion;
mod shortening;

pub use deletion::{DeletionFailure, DeletionPipeline, DeletionReport};
pub use shortening::*;
