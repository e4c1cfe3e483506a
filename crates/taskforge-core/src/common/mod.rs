pub mod compute;
pub mod error;
pub mod types;

pub use error::{Error, Result};
