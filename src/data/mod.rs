//! Point sources for the front-ends.

pub mod synthetic;

pub use synthetic::*;
