//! Mathematical utilities: small linear solves, polynomial roots, and
//! equality-constrained minimization.

pub mod constrained;
pub mod linear;
pub mod poly;

pub use constrained::*;
pub use linear::*;
pub use poly::*;
