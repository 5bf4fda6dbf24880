//! RANSAC fitting.
//!
//! Responsibilities:
//!
//! - normalize the input once and draw minimal random samples (`sampler`)
//! - split residual points into inliers/outliers (`consensus`)
//! - run rounds under an acceptance ratio and an iteration budget (`controller`)

pub mod consensus;
pub mod controller;
pub mod sampler;

pub use consensus::*;
pub use controller::*;
pub use sampler::*;
