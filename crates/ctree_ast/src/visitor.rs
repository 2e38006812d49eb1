//! Post-order folding over compute trees.
//!
//! Traversal uses an explicit stack, so tree height is not limited by the
//! host call stack. Each distinct node (by address) is folded once; trees
//! that share subtrees through `Rc` are therefore folded in time linear in
//! their number of distinct nodes.

use rustc_hash::FxHashMap;
use std::convert::Infallible;
use std::rc::Rc;

use crate::tree::{CompareTree, Leaf, Op};

pub trait TreeFold {
    type Output;
    type Error;

    fn leaf(&mut self, leaf: &Leaf) -> Result<Self::Output, Self::Error>;

    fn binary(
        &mut self,
        op: Op,
        left: &Self::Output,
        right: &Self::Output,
    ) -> Result<Self::Output, Self::Error>;
}

fn key(node: &CompareTree) -> *const CompareTree {
    node as *const CompareTree
}

type Memo<T> = FxHashMap<*const CompareTree, T>;

// Folds every node reachable from `roots` into `done`.
fn fold_into<'t, F: TreeFold>(
    roots: impl IntoIterator<Item = &'t CompareTree>,
    folder: &mut F,
    done: &mut Memo<F::Output>,
) -> Result<(), F::Error> {
    // (node, children already scheduled)
    let mut stack: Vec<(&CompareTree, bool)> = Vec::new();

    for root in roots {
        stack.push((root, false));
        while let Some((node, expanded)) = stack.pop() {
            if done.contains_key(&key(node)) {
                continue;
            }
            match node {
                CompareTree::Leaf(leaf) => {
                    let out = folder.leaf(leaf)?;
                    done.insert(key(node), out);
                }
                CompareTree::Binary { op, left, right } if expanded => {
                    let (Some(l), Some(r)) = (done.get(&key(left)), done.get(&key(right))) else {
                        unreachable!("children are folded before their parent");
                    };
                    let out = folder.binary(*op, l, r)?;
                    done.insert(key(node), out);
                }
                CompareTree::Binary { left, right, .. } => {
                    stack.push((node, true));
                    stack.push((right.as_ref(), false));
                    stack.push((left.as_ref(), false));
                }
            }
        }
    }
    Ok(())
}

/// Fold `tree` bottom-up, stopping at the first error.
pub fn try_fold<F: TreeFold>(tree: &CompareTree, folder: &mut F) -> Result<F::Output, F::Error> {
    let mut done = Memo::default();
    fold_into([tree], folder, &mut done)?;
    match done.remove(&key(tree)) {
        Some(out) => Ok(out),
        None => unreachable!("root is folded last"),
    }
}

/// Fold several roots with one shared memo, so subtrees shared between
/// roots are folded once. Outputs are returned in root order.
pub fn try_fold_all<F>(roots: &[Rc<CompareTree>], folder: &mut F) -> Result<Vec<F::Output>, F::Error>
where
    F: TreeFold,
    F::Output: Clone,
{
    let mut done = Memo::default();
    fold_into(roots.iter().map(|r| r.as_ref()), folder, &mut done)?;
    Ok(roots
        .iter()
        .filter_map(|r| done.get(&key(r)).cloned())
        .collect())
}

/// Fold with a folder that cannot fail.
pub fn fold<F: TreeFold<Error = Infallible>>(tree: &CompareTree, folder: &mut F) -> F::Output {
    match try_fold(tree, folder) {
        Ok(out) => out,
        Err(never) => match never {},
    }
}
