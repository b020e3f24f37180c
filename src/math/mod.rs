//! Mathematical utilities: least squares, polynomial bases, and small statistics.

pub mod basis;
pub mod ols;
pub mod stats;

pub use basis::*;
pub use ols::*;
pub use stats::*;
