use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use crate::visitor::{fold, TreeFold};

/// Binary operator of an internal node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Op {
    Add, // +
    Sub, // -
    Mul, // *
}

impl Op {
    pub fn symbol(self) -> &'static str {
        match self {
            Op::Add => "+",
            Op::Sub => "-",
            Op::Mul => "*",
        }
    }

    pub fn from_symbol(s: &str) -> Option<Self> {
        match s {
            "+" => Some(Op::Add),
            "-" => Some(Op::Sub),
            "*" => Some(Op::Mul),
            _ => None,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A leaf carries either a variable name or an exact numeric literal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Leaf {
    Variable(String),
    Number(BigRational),
}

impl fmt::Display for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Variable(name) => f.write_str(name),
            Leaf::Number(n) => write!(f, "{}", n),
        }
    }
}

/// Immutable compute tree.
///
/// Children are reference counted so that builders can share common
/// sub-results between limbs. Equality and hashing are structural; sharing
/// is never observable through them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompareTree {
    Leaf(Leaf),
    Binary {
        op: Op,
        left: Rc<CompareTree>,
        right: Rc<CompareTree>,
    },
}

// The derived drop glue recurses once per level, which overflows the stack
// on trees the folds handle fine. Uniquely owned interior children are
// unlinked onto a heap stack instead; shared children only lose a count.
impl Drop for CompareTree {
    fn drop(&mut self) {
        if !owns_interior_child(self) {
            return;
        }
        let hole = Rc::new(CompareTree::Leaf(Leaf::Number(BigRational::zero())));
        let mut pending = Vec::new();
        detach_children(self, &hole, &mut pending);
        while let Some(child) = pending.pop() {
            if let Ok(mut node) = Rc::try_unwrap(child) {
                detach_children(&mut node, &hole, &mut pending);
            }
        }
    }
}

fn owns_interior_child(node: &CompareTree) -> bool {
    match node {
        CompareTree::Leaf(_) => false,
        CompareTree::Binary { left, right, .. } => [left, right]
            .into_iter()
            .any(|c| !c.is_leaf() && Rc::strong_count(c) == 1),
    }
}

fn detach_children(
    node: &mut CompareTree,
    hole: &Rc<CompareTree>,
    pending: &mut Vec<Rc<CompareTree>>,
) {
    if let CompareTree::Binary { left, right, .. } = node {
        pending.push(std::mem::replace(left, Rc::clone(hole)));
        pending.push(std::mem::replace(right, Rc::clone(hole)));
    }
}

impl CompareTree {
    pub fn var(name: &str) -> Rc<Self> {
        Rc::new(CompareTree::Leaf(Leaf::Variable(name.to_string())))
    }

    pub fn num(n: BigRational) -> Rc<Self> {
        Rc::new(CompareTree::Leaf(Leaf::Number(n)))
    }

    pub fn int(n: i64) -> Rc<Self> {
        Self::num(BigRational::from_integer(BigInt::from(n)))
    }

    /// The literal `0`, used as the padding limb by the multiplication builders.
    pub fn zero() -> Rc<Self> {
        Self::int(0)
    }

    pub fn binary(op: Op, left: Rc<CompareTree>, right: Rc<CompareTree>) -> Rc<Self> {
        Rc::new(CompareTree::Binary { op, left, right })
    }

    pub fn add(left: Rc<CompareTree>, right: Rc<CompareTree>) -> Rc<Self> {
        Self::binary(Op::Add, left, right)
    }

    pub fn sub(left: Rc<CompareTree>, right: Rc<CompareTree>) -> Rc<Self> {
        Self::binary(Op::Sub, left, right)
    }

    pub fn mul(left: Rc<CompareTree>, right: Rc<CompareTree>) -> Rc<Self> {
        Self::binary(Op::Mul, left, right)
    }
}

impl CompareTree {
    pub fn is_leaf(&self) -> bool {
        matches!(self, CompareTree::Leaf(_))
    }

    pub fn op(&self) -> Option<Op> {
        match self {
            CompareTree::Leaf(_) => None,
            CompareTree::Binary { op, .. } => Some(*op),
        }
    }

    pub fn children(&self) -> Option<(&Rc<CompareTree>, &Rc<CompareTree>)> {
        match self {
            CompareTree::Leaf(_) => None,
            CompareTree::Binary { left, right, .. } => Some((left, right)),
        }
    }

    /// True only for a numeric leaf equal to zero. A variable is never zero
    /// here, whatever value it may later be bound to.
    pub fn is_zero_literal(&self) -> bool {
        matches!(self, CompareTree::Leaf(Leaf::Number(n)) if n.is_zero())
    }

    /// Longest leaf-to-root path, counted in edges (a leaf has height 0).
    pub fn height(&self) -> usize {
        struct Height;
        impl TreeFold for Height {
            type Output = usize;
            type Error = std::convert::Infallible;
            fn leaf(&mut self, _leaf: &Leaf) -> Result<usize, Self::Error> {
                Ok(0)
            }
            fn binary(&mut self, _op: Op, l: &usize, r: &usize) -> Result<usize, Self::Error> {
                Ok(*l.max(r) + 1)
            }
        }
        fold(self, &mut Height)
    }

    /// Number of distinct nodes. Shared subtrees are counted once.
    pub fn node_count(&self) -> usize {
        struct Count(usize);
        impl TreeFold for Count {
            type Output = ();
            type Error = std::convert::Infallible;
            fn leaf(&mut self, _leaf: &Leaf) -> Result<(), Self::Error> {
                self.0 += 1;
                Ok(())
            }
            fn binary(&mut self, _op: Op, _l: &(), _r: &()) -> Result<(), Self::Error> {
                self.0 += 1;
                Ok(())
            }
        }
        let mut count = Count(0);
        fold(self, &mut count);
        count.0
    }

    /// Sorted set of variable names appearing in the tree.
    pub fn variables(&self) -> BTreeSet<String> {
        struct Collect(BTreeSet<String>);
        impl TreeFold for Collect {
            type Output = ();
            type Error = std::convert::Infallible;
            fn leaf(&mut self, leaf: &Leaf) -> Result<(), Self::Error> {
                if let Leaf::Variable(name) = leaf {
                    self.0.insert(name.clone());
                }
                Ok(())
            }
            fn binary(&mut self, _op: Op, _l: &(), _r: &()) -> Result<(), Self::Error> {
                Ok(())
            }
        }
        let mut collect = Collect(BTreeSet::new());
        fold(self, &mut collect);
        collect.0
    }
}

impl fmt::Display for CompareTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareTree::Leaf(leaf) => write!(f, "{}", leaf),
            CompareTree::Binary { op, left, right } => {
                write!(f, "({} {} {})", op, left, right)
            }
        }
    }
}
