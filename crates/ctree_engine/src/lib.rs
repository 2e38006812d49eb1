//! Evaluation and construction of compute trees.
//!
//! - [`eval`]: bottom-up value / martingale length / condition bound.
//! - [`martingale`]: the structural martingale walk on its own.
//! - [`builders`]: naive and Karatsuba multiplication trees.

pub mod builders;
pub mod error;
pub mod eval;
pub mod martingale;
pub mod options;

pub use builders::{complete, karatsuba, naive, operands, padd, psub, shift, Limbs, MulAlgorithm};
pub use error::{BuildError, EvalError};
pub use eval::{evaluate, ConditionBound, ConditionNumber, EvalResult, Evaluator};
pub use martingale::{martingale_length, martingale_lengths};
pub use options::EvalOptions;
