//! Martingale length: the longest chain of dependent rounding events along
//! any evaluation path. Products chain both operands, sums chain the longer.
//!
//! Lengths are `u64`. Shared subtrees let a product chain double per node,
//! so a handful of nodes can still exceed that; overflow is reported as
//! [`EvalError::MartingaleOverflow`] rather than wrapped.

use ctree_ast::{try_fold, try_fold_all, CompareTree, Leaf, Op, TreeFold};
use std::rc::Rc;

use crate::error::EvalError;

/// Martingale length of a node with operator `op` over children of length
/// `left` and `right`.
pub fn combine(op: Op, left: u64, right: u64) -> Result<u64, EvalError> {
    let chained = match op {
        Op::Mul => left.checked_add(right),
        Op::Add | Op::Sub => Some(left.max(right)),
    };
    chained
        .and_then(|m| m.checked_add(1))
        .ok_or(EvalError::MartingaleOverflow)
}

struct Martingale;

impl TreeFold for Martingale {
    type Output = u64;
    type Error = EvalError;

    fn leaf(&mut self, _leaf: &Leaf) -> Result<u64, EvalError> {
        Ok(0)
    }

    fn binary(&mut self, op: Op, left: &u64, right: &u64) -> Result<u64, EvalError> {
        combine(op, *left, *right)
    }
}

/// Structural martingale length, without any algebra.
pub fn martingale_length(tree: &CompareTree) -> Result<u64, EvalError> {
    try_fold(tree, &mut Martingale)
}

/// Martingale length of every limb, sharing work across limbs that reuse
/// the same subtrees.
pub fn martingale_lengths(limbs: &[Rc<CompareTree>]) -> Result<Vec<u64>, EvalError> {
    try_fold_all(limbs, &mut Martingale)
}
