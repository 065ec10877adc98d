pub mod shutdown;
pub mod startup;

pub use shutdown::shutdown;
pub use startup::{StartupContext, prepare_startup};
