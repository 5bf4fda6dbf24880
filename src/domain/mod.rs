//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - observations and fitted models (`Point`, `Model`, `ModelKind`)
//! - per-round and terminal results (`RoundOutcome`, `FitResult`)
//! - run configuration (`FitConfig`, `DemoConfig`)

pub mod config;
pub mod types;

pub use config::*;
pub use types::*;
