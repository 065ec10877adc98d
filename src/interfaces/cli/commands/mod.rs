//! CLI command implementations
//!
//! This module re-exports all CLI command functions.

mod batch;
mod config_gen;
mod delete;
mod links;
mod status;

pub use batch::*;
pub use config_gen::*;
pub use delete::*;
pub use links::*;
pub use status::*;
