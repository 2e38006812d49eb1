use ctree_ast::{CompareTree, Leaf, Op};
use ctree_math::Point;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, Zero};
use proptest::prelude::*;
use std::rc::Rc;

pub const VARS: [&str; 4] = ["a", "b", "x", "y"];

pub fn arb_leaf() -> impl Strategy<Value = Rc<CompareTree>> {
    prop_oneof![
        (-5i64..6).prop_map(CompareTree::int),
        prop::sample::select(VARS.to_vec()).prop_map(CompareTree::var),
    ]
}

pub fn arb_tree() -> impl Strategy<Value = Rc<CompareTree>> {
    arb_leaf().prop_recursive(
        4,  // levels deep
        32, // max size
        2,  // items per collection
        |inner| {
            prop_oneof![
                (inner.clone(), inner.clone()).prop_map(|(l, r)| CompareTree::add(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| CompareTree::sub(l, r)),
                (inner.clone(), inner.clone()).prop_map(|(l, r)| CompareTree::mul(l, r)),
            ]
        },
    )
}

pub fn arb_rational() -> impl Strategy<Value = BigRational> {
    (-9i64..10, 1i64..5).prop_map(|(n, d)| BigRational::new(BigInt::from(n), BigInt::from(d)))
}

/// A point binding every name in [`VARS`].
pub fn arb_point() -> impl Strategy<Value = Point> {
    prop::collection::vec(arb_rational(), VARS.len()).prop_map(|values| {
        VARS.iter()
            .zip(values)
            .fold(Point::new(), |p, (name, v)| p.bind(name, v))
    })
}

/// Value and condition number computed straight from the recurrences at
/// `point`, without any symbolic simplification. The condition number is
/// `None` once any sum or difference on the way up evaluates to zero.
pub fn direct(tree: &CompareTree, point: &Point) -> (BigRational, Option<BigRational>) {
    match tree {
        CompareTree::Leaf(Leaf::Number(n)) => (n.clone(), Some(BigRational::from_integer(1.into()))),
        CompareTree::Leaf(Leaf::Variable(name)) => (
            point.get(name).cloned().unwrap_or_else(BigRational::zero),
            Some(BigRational::from_integer(1.into())),
        ),
        CompareTree::Binary { op, left, right } => {
            let (x, kx) = direct(left, point);
            let (y, ky) = direct(right, point);
            let value = match op {
                Op::Add => &x + &y,
                Op::Sub => &x - &y,
                Op::Mul => &x * &y,
            };
            let k = match (kx, ky) {
                (Some(kx), Some(ky)) => match op {
                    Op::Mul => Some(kx * ky),
                    Op::Add | Op::Sub if value.is_zero() => None,
                    Op::Add | Op::Sub => Some((x.abs() * kx + y.abs() * ky) / value.abs()),
                },
                _ => None,
            };
            (value, k)
        }
    }
}
