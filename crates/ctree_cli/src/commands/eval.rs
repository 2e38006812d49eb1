//! eval subcommand: one tree, its triple, and optionally its numeric
//! instantiation.

use anyhow::{Context, Result};
use ctree_engine::{ConditionBound, ConditionNumber, EvalError, EvalResult, Evaluator};
use ctree_math::Point;
use num_rational::BigRational;
use num_traits::ToPrimitive;

use crate::config::CtConfig;

pub fn point_from(bindings: &[(String, BigRational)]) -> Point {
    bindings
        .iter()
        .fold(Point::new(), |point, (name, value)| point.bind(name, value.clone()))
}

pub fn format_point(point: &Point) -> String {
    point
        .iter()
        .map(|(name, value)| format!("{} = {}", name, value))
        .collect::<Vec<_>>()
        .join(", ")
}

fn approx(value: &BigRational) -> String {
    match value.to_f64() {
        Some(f) => format!("{} ≈ {}", value, f),
        None => value.to_string(),
    }
}

/// The `m / v / K` block, followed by the values at `point` when it binds
/// anything.
pub fn render(result: &EvalResult, point: &Point) -> Result<String, EvalError> {
    let mut out = result.to_string();
    if point.is_empty() {
        return Ok(out);
    }
    out.push_str(&format!("\nat {}", format_point(point)));
    out.push_str(&format!("\nv = {}", approx(&result.value_at(point)?)));
    if !matches!(result.condition, ConditionBound::Untracked) {
        match result.condition_at(point)? {
            ConditionNumber::Finite(k) => out.push_str(&format!("\nK = {}", approx(&k))),
            ConditionNumber::Unbounded => out.push_str("\nK = unbounded"),
        }
    }
    Ok(out)
}

pub fn run(
    expr: &str,
    bindings: &[(String, BigRational)],
    no_condition: bool,
    config: &CtConfig,
) -> Result<String> {
    let tree = ctree_parser::parse(expr).with_context(|| format!("cannot parse '{}'", expr))?;
    let mut options = config.eval_options();
    if no_condition {
        options.track_condition = false;
    }
    let result = Evaluator::with_options(options).evaluate(&tree)?;
    Ok(render(&result, &point_from(bindings))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_point() {
        let bindings = vec![("x".to_string(), BigRational::from_integer(3.into()))];
        let out = run("(- x 1)", &bindings, false, &CtConfig::default()).unwrap();
        assert_eq!(
            out,
            "m = 1\nv = x - 1\nK = (|x| + 1)/|x - 1|\nat x = 3\nv = 2 ≈ 2\nK = 2 ≈ 2"
        );
    }

    #[test]
    fn test_run_without_condition() {
        let out = run("(* a b)", &[], true, &CtConfig::default()).unwrap();
        assert_eq!(out, "m = 1\nv = a*b\nK = untracked");
    }

    #[test]
    fn test_parse_failure_has_context() {
        let err = run("(+ a", &[], false, &CtConfig::default()).unwrap_err();
        assert!(err.to_string().contains("cannot parse"));
    }
}
