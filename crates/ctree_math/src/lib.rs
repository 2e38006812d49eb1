//! Exact arithmetic backing the compute-tree evaluator.
//!
//! - [`MultiPoly`]: sparse multivariate polynomials over Q, kept in expanded
//!   canonical form.
//! - [`AbsRatio`]: sums of products of `|p|` factors over a product of `|p|`
//!   factors, with common factors cancelled. Condition-number bounds live
//!   here.
//! - [`Point`]: exact variable bindings for numeric instantiation.

pub mod abs_ratio;
pub mod error;
pub mod multipoly;
pub mod point;

pub use abs_ratio::{abs_decompose, AbsProduct, AbsRatio};
pub use error::{PointError, PolyError};
pub use multipoly::{Monomial, MultiPoly, PolyBudget};
pub use point::Point;
