//! Input helpers.
//!
//! - CSV point ingest + row validation (`ingest`)

pub mod ingest;

pub use ingest::*;
