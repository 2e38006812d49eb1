use ctree_math::{PointError, PolyError};
use thiserror::Error;

/// Errors raised while evaluating a compute tree or instantiating its result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    #[error("polynomial error: {0}")]
    Polynomial(#[from] PolyError),
    #[error(transparent)]
    Point(#[from] PointError),
    #[error("condition number was not tracked for this evaluation")]
    ConditionNotTracked,
    #[error("martingale length exceeds u64::MAX")]
    MartingaleOverflow,
}

/// Precondition failures of the multiplication-tree builders.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("operand lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    #[error("operand length {0} is not a power of two")]
    NotPowerOfTwo(usize),
    #[error("cannot complete {len} limbs to length {target}")]
    CompleteOverflow { len: usize, target: usize },
}
