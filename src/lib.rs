//! tinylink - a small URL shortener core
//!
//! Deterministic short codes scoped per owner, soft delete with tombstones,
//! and two storage backends behind one trait.
//!
//! # Architecture
//! - `utils`: code encoder and URL validation (pure)
//! - `storage`: `Storage` trait, memory store with journal, SeaORM store
//! - `services`: shortening service and bulk deletion pipeline
//! - `config`: configuration loading (TOML + env + CLI)
//! - `runtime`: startup wiring and shutdown backup
//! - `interfaces`: command-line adapter
//! - `system`: logging

pub mod cli;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
