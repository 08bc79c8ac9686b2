pub mod envelope;
pub mod fields;
pub mod filter;
pub mod record;
pub mod time_fmt;

mod error;

pub use error::{Error, Result};
