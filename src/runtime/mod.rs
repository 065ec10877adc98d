//! Application lifecycle
//!
//! Wiring shared by every entry point: build the storage, service and
//! deletion pipeline on the way in, flush state on the way out.

pub mod lifetime;
