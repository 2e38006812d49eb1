//! Recursive evaluation of compute trees.
//!
//! Every node yields a triple: its exact value as a polynomial in the
//! tree's variables, its martingale length, and a symbolic upper bound on
//! its condition number. Triples combine bottom-up:
//!
//! | node    | value   | m                | K                                      |
//! |---------|---------|------------------|----------------------------------------|
//! | leaf    | v       | 0                | 1                                      |
//! | `x * y` | x·y     | m(x) + m(y) + 1  | K(x)·K(y)                              |
//! | `x ± y` | x ± y   | max(m(x),m(y))+1 | (\|x\|K(x) + \|y\|K(y)) / \|x ± y\|    |
//!
//! Bounds are kept in reduced form after every step. A sum or difference
//! whose value is identically zero has no finite bound; that node and all
//! of its ancestors report [`ConditionBound::Unbounded`].

use ctree_ast::{try_fold, try_fold_all, CompareTree, Leaf, Op, TreeFold};
use ctree_math::{AbsRatio, MultiPoly, Point};
use num_rational::BigRational;
use num_traits::ToPrimitive;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, trace, warn};

use crate::error::EvalError;
use crate::martingale;
use crate::options::EvalOptions;

// =============================================================================
// Results
// =============================================================================

/// Symbolic condition-number bound of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionBound {
    Bounded(AbsRatio),
    /// Exact cancellation somewhere at or below this node.
    Unbounded,
    /// Evaluated with `track_condition` off.
    Untracked,
}

impl ConditionBound {
    pub fn one() -> Self {
        ConditionBound::Bounded(AbsRatio::one())
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, ConditionBound::Unbounded)
    }

    pub fn as_ratio(&self) -> Option<&AbsRatio> {
        match self {
            ConditionBound::Bounded(r) => Some(r),
            _ => None,
        }
    }

    fn product(x: &Self, y: &Self) -> Self {
        match (x, y) {
            (ConditionBound::Untracked, _) | (_, ConditionBound::Untracked) => {
                ConditionBound::Untracked
            }
            (ConditionBound::Bounded(kx), ConditionBound::Bounded(ky)) => {
                ConditionBound::Bounded(kx.mul(ky))
            }
            _ => ConditionBound::Unbounded,
        }
    }

    /// `(|x|·K(x) + |y|·K(y)) / |combined|`
    fn weighted_sum(x: &EvalResult, y: &EvalResult, combined: &MultiPoly) -> Self {
        match (&x.condition, &y.condition) {
            (ConditionBound::Untracked, _) | (_, ConditionBound::Untracked) => {
                ConditionBound::Untracked
            }
            (ConditionBound::Bounded(kx), ConditionBound::Bounded(ky)) => {
                let weighted = AbsRatio::abs_of(&x.value)
                    .mul(kx)
                    .add(&AbsRatio::abs_of(&y.value).mul(ky));
                match weighted.div_abs(combined) {
                    Some(k) => ConditionBound::Bounded(k),
                    None => ConditionBound::Unbounded,
                }
            }
            _ => ConditionBound::Unbounded,
        }
    }
}

impl fmt::Display for ConditionBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionBound::Bounded(k) => write!(f, "{}", k),
            ConditionBound::Unbounded => write!(f, "unbounded"),
            ConditionBound::Untracked => write!(f, "untracked"),
        }
    }
}

/// A condition number instantiated at a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionNumber<T> {
    Finite(T),
    Unbounded,
}

impl<T> ConditionNumber<T> {
    pub fn is_finite(&self) -> bool {
        matches!(self, ConditionNumber::Finite(_))
    }

    pub fn finite(self) -> Option<T> {
        match self {
            ConditionNumber::Finite(v) => Some(v),
            ConditionNumber::Unbounded => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConditionNumber<U> {
        match self {
            ConditionNumber::Finite(v) => ConditionNumber::Finite(f(v)),
            ConditionNumber::Unbounded => ConditionNumber::Unbounded,
        }
    }
}

impl<T: fmt::Display> fmt::Display for ConditionNumber<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionNumber::Finite(v) => write!(f, "{}", v),
            ConditionNumber::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Value, martingale length and condition bound of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalResult {
    pub value: MultiPoly,
    pub martingale_length: u64,
    pub condition: ConditionBound,
}

fn rational_to_f64(r: &BigRational) -> f64 {
    r.to_f64().unwrap_or(f64::NAN)
}

impl EvalResult {
    /// Exact value at `point`. Every variable of the tree must be bound.
    pub fn value_at(&self, point: &Point) -> Result<BigRational, EvalError> {
        Ok(self.value.eval_at(point)?)
    }

    pub fn value_at_f64(&self, point: &Point) -> Result<f64, EvalError> {
        self.value_at(point).map(|v| rational_to_f64(&v))
    }

    /// Exact condition number at `point`.
    pub fn condition_at(&self, point: &Point) -> Result<ConditionNumber<BigRational>, EvalError> {
        match &self.condition {
            ConditionBound::Untracked => Err(EvalError::ConditionNotTracked),
            ConditionBound::Unbounded => {
                // still reject points that do not bind the tree's variables
                point.values_for(&self.value.vars)?;
                Ok(ConditionNumber::Unbounded)
            }
            ConditionBound::Bounded(k) => Ok(match k.eval_at(point)? {
                Some(v) => ConditionNumber::Finite(v),
                None => ConditionNumber::Unbounded,
            }),
        }
    }

    pub fn condition_at_f64(&self, point: &Point) -> Result<ConditionNumber<f64>, EvalError> {
        self.condition_at(point)
            .map(|k| k.map(|v| rational_to_f64(&v)))
    }
}

impl fmt::Display for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "m = {}", self.martingale_length)?;
        writeln!(f, "v = {}", self.value)?;
        write!(f, "K = {}", self.condition)
    }
}

// =============================================================================
// Evaluator
// =============================================================================

struct Combine<'a> {
    vars: &'a [String],
    options: &'a EvalOptions,
}

impl TreeFold for Combine<'_> {
    type Output = EvalResult;
    type Error = EvalError;

    fn leaf(&mut self, leaf: &Leaf) -> Result<EvalResult, EvalError> {
        let value = match leaf {
            Leaf::Variable(name) => MultiPoly::from_var(self.vars.to_vec(), name)?,
            Leaf::Number(n) => MultiPoly::constant(self.vars.to_vec(), n.clone()),
        };
        let condition = if self.options.track_condition {
            ConditionBound::one()
        } else {
            ConditionBound::Untracked
        };
        Ok(EvalResult {
            value,
            martingale_length: 0,
            condition,
        })
    }

    fn binary(
        &mut self,
        op: Op,
        x: &EvalResult,
        y: &EvalResult,
    ) -> Result<EvalResult, EvalError> {
        let budget = &self.options.budget;
        let value = match op {
            Op::Mul => x.value.mul(&y.value, budget)?,
            Op::Add => x.value.add(&y.value)?,
            Op::Sub => x.value.sub(&y.value)?,
        };
        budget.check(&value)?;

        let condition = match op {
            Op::Mul => ConditionBound::product(&x.condition, &y.condition),
            Op::Add | Op::Sub => ConditionBound::weighted_sum(x, y, &value),
        };
        let martingale_length =
            martingale::combine(op, x.martingale_length, y.martingale_length)?;

        trace!(
            target: "eval",
            op = %op,
            m = martingale_length,
            terms = value.num_terms(),
            unbounded = condition.is_unbounded(),
            "node"
        );

        Ok(EvalResult {
            value,
            martingale_length,
            condition,
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    options: EvalOptions,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Evaluate `tree`. Shared subtrees are evaluated once.
    pub fn evaluate(&self, tree: &CompareTree) -> Result<EvalResult, EvalError> {
        let vars: Vec<String> = tree.variables().into_iter().collect();
        debug!(
            target: "eval",
            vars = vars.len(),
            nodes = tree.node_count(),
            track_condition = self.options.track_condition,
            "evaluate_start"
        );

        let mut combine = Combine {
            vars: &vars,
            options: &self.options,
        };
        let result = try_fold(tree, &mut combine).inspect_err(log_failure)?;

        debug!(
            target: "eval",
            m = result.martingale_length,
            terms = result.value.num_terms(),
            bound_size = result.condition.as_ratio().map_or(0, AbsRatio::size),
            "evaluate_end"
        );
        Ok(result)
    }

    /// Evaluate several trees over one common variable list, folding
    /// subtrees they share only once. Intended for builder limbs.
    pub fn evaluate_all(&self, trees: &[Rc<CompareTree>]) -> Result<Vec<EvalResult>, EvalError> {
        let mut vars: Vec<String> = trees.iter().flat_map(|t| t.variables()).collect();
        vars.sort();
        vars.dedup();
        debug!(target: "eval", roots = trees.len(), vars = vars.len(), "evaluate_all_start");

        let mut combine = Combine {
            vars: &vars,
            options: &self.options,
        };
        try_fold_all(trees, &mut combine).inspect_err(log_failure)
    }
}

fn log_failure(error: &EvalError) {
    warn!(target: "eval", error = %error, "evaluation failed");
}

/// Evaluate with default options.
pub fn evaluate(tree: &CompareTree) -> Result<EvalResult, EvalError> {
    Evaluator::new().evaluate(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctree_math::{PolyBudget, PolyError};
    use num_bigint::BigInt;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_leaf_triples() {
        let r = evaluate(&CompareTree::var("x")).unwrap();
        assert_eq!(r.martingale_length, 0);
        assert_eq!(r.condition, ConditionBound::one());
        assert_eq!(r.value.to_string(), "x");

        let r = evaluate(&CompareTree::int(-7)).unwrap();
        assert_eq!(r.martingale_length, 0);
        assert_eq!(r.condition, ConditionBound::one());
        assert_eq!(r.value.to_string(), "-7");
    }

    #[test]
    fn test_display() {
        let t = CompareTree::add(CompareTree::var("a"), CompareTree::var("b"));
        let r = evaluate(&t).unwrap();
        assert_eq!(r.to_string(), "m = 1\nv = a + b\nK = (|a| + |b|)/|a + b|");
    }

    #[test]
    fn test_product_of_leaves_is_well_conditioned() {
        let t = CompareTree::mul(CompareTree::var("x"), CompareTree::var("y"));
        let r = evaluate(&t).unwrap();
        assert_eq!(r.martingale_length, 1);
        assert_eq!(r.condition, ConditionBound::one());
    }

    #[test]
    fn test_exact_cancellation_is_unbounded() {
        let a = CompareTree::var("a");
        let t = CompareTree::sub(a.clone(), a.clone());
        let r = evaluate(&t).unwrap();
        assert!(r.condition.is_unbounded());
        assert_eq!(r.to_string(), "m = 1\nv = 0\nK = unbounded");

        // propagates through every ancestor
        let outer = CompareTree::mul(CompareTree::add(t, CompareTree::int(1)), a);
        let r = evaluate(&outer).unwrap();
        assert!(r.condition.is_unbounded());
        assert_eq!(r.martingale_length, 3);

        let point = Point::new().bind("a", rat(2, 1));
        assert_eq!(r.condition_at(&point).unwrap(), ConditionNumber::Unbounded);
        assert_eq!(r.value_at(&point).unwrap(), rat(2, 1));
    }

    #[test]
    fn test_untracked() {
        let t = CompareTree::sub(CompareTree::var("x"), CompareTree::int(1));
        let r = Evaluator::with_options(EvalOptions::value_only())
            .evaluate(&t)
            .unwrap();
        assert_eq!(r.condition, ConditionBound::Untracked);
        assert_eq!(r.martingale_length, 1);
        let point = Point::new().bind("x", rat(3, 1));
        assert_eq!(r.condition_at(&point), Err(EvalError::ConditionNotTracked));
        assert_eq!(r.value_at(&point).unwrap(), rat(2, 1));
    }

    #[test]
    fn test_budget_exceeded() {
        let x = CompareTree::var("x");
        let x2 = CompareTree::mul(x.clone(), x.clone());
        let x4 = CompareTree::mul(x2.clone(), x2);
        let options = EvalOptions {
            track_condition: true,
            budget: PolyBudget {
                max_terms: 100,
                max_total_degree: 3,
            },
        };
        let err = Evaluator::with_options(options).evaluate(&x4).unwrap_err();
        assert!(matches!(
            err,
            EvalError::Polynomial(PolyError::BudgetExceeded { .. })
        ));
    }

    #[test]
    fn test_condition_at_pole() {
        // K = (|x| + 1)/|x - 1|
        let t = CompareTree::sub(CompareTree::var("x"), CompareTree::int(1));
        let r = evaluate(&t).unwrap();
        let at = |v: i64| r.condition_at(&Point::new().bind("x", rat(v, 1))).unwrap();
        assert_eq!(at(1), ConditionNumber::Unbounded);
        assert_eq!(at(3), ConditionNumber::Finite(rat(2, 1)));
        assert_eq!(at(-1), ConditionNumber::Finite(rat(1, 1)));

        let f = r
            .condition_at_f64(&Point::new().bind_f64("x", 0.5).unwrap())
            .unwrap();
        assert_eq!(f, ConditionNumber::Finite(3.0));
    }

    #[test]
    fn test_unbound_variable() {
        let t = CompareTree::add(CompareTree::var("x"), CompareTree::var("y"));
        let r = evaluate(&t).unwrap();
        let point = Point::new().bind("x", rat(1, 1));
        assert!(matches!(r.value_at(&point), Err(EvalError::Point(_))));
        assert!(matches!(r.condition_at(&point), Err(EvalError::Point(_))));
    }

    #[test]
    fn test_evaluate_all_shares_variables() {
        let a = CompareTree::var("a");
        let b = CompareTree::var("b");
        let shared = CompareTree::mul(a.clone(), b.clone());
        let roots = vec![CompareTree::add(shared.clone(), a), shared, b];
        let results = Evaluator::new().evaluate_all(&roots).unwrap();
        assert_eq!(results.len(), 3);
        for r in &results {
            assert_eq!(r.value.vars, vec!["a".to_string(), "b".to_string()]);
        }
        assert_eq!(results[0].martingale_length, 2);
        assert_eq!(results[1].value.to_string(), "a*b");
    }
}
