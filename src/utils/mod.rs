pub mod encoder;
pub mod url_validator;

pub use encoder::{CodeScheme, encode};
pub use url_validator::validate_url;
