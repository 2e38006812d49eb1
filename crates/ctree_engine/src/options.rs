//! Evaluation options.

use ctree_math::PolyBudget;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalOptions {
    /// Compute the symbolic condition bound. When off, only the value and
    /// the martingale length are produced and the bound is reported as
    /// untracked.
    pub track_condition: bool,
    /// Size limits for every intermediate value polynomial.
    pub budget: PolyBudget,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            track_condition: true,
            budget: PolyBudget::default(),
        }
    }
}

impl EvalOptions {
    pub fn value_only() -> Self {
        Self {
            track_condition: false,
            ..Self::default()
        }
    }
}
