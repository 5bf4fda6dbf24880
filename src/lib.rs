//! `ransac-fit` library crate.
//!
//! The binary (`rfit`) is a thin wrapper around this library so that:
//!
//! - the RANSAC core (`fit`, `models`, `math`) is usable without the CLI
//! - front-ends (text, SVG, TUI) share one pipeline and are testable in-process

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
pub mod tui;
