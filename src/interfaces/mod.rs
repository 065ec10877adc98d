//! User-facing interfaces driving the service layer

pub mod cli;
