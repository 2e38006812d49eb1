//! Compute trees: strictly binary `+`, `-`, `*` trees over named variables
//! and exact rational literals.

pub mod tree;
pub mod visitor;

pub use tree::{CompareTree, Leaf, Op};
pub use visitor::{fold, try_fold, try_fold_all, TreeFold};
