pub mod solr;
pub mod xslt;

mod error;

pub use error::{Error, Result};
