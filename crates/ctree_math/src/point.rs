//! Numeric points: exact values bound to variable names.

use num_rational::BigRational;
use std::collections::BTreeMap;

use crate::error::PointError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Point {
    bindings: BTreeMap<String, BigRational>,
}

impl Point {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: &str, value: BigRational) -> Self {
        self.insert(name, value);
        self
    }

    /// Bind the exact binary value of `value`.
    pub fn bind_f64(mut self, name: &str, value: f64) -> Result<Self, PointError> {
        let exact = BigRational::from_float(value).ok_or_else(|| PointError::NonFinite {
            name: name.to_string(),
        })?;
        self.insert(name, exact);
        Ok(self)
    }

    pub fn insert(&mut self, name: &str, value: BigRational) {
        self.bindings.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<&BigRational> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigRational)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Values aligned with `vars`; every variable must be bound.
    pub fn values_for(&self, vars: &[String]) -> Result<Vec<BigRational>, PointError> {
        vars.iter()
            .map(|name| {
                self.get(name)
                    .cloned()
                    .ok_or_else(|| PointError::UnboundVariable(name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_for() {
        let p = Point::new()
            .bind("x", BigRational::from_integer(2.into()))
            .bind("y", BigRational::from_integer(3.into()));
        let vars = vec!["y".to_string(), "x".to_string()];
        let values = p.values_for(&vars).unwrap();
        assert_eq!(values[0], BigRational::from_integer(3.into()));
        assert_eq!(values[1], BigRational::from_integer(2.into()));

        let missing = vec!["z".to_string()];
        assert_eq!(
            p.values_for(&missing),
            Err(PointError::UnboundVariable("z".to_string()))
        );
    }

    #[test]
    fn test_bind_f64_is_exact() {
        let p = Point::new().bind_f64("x", 0.5).unwrap();
        assert_eq!(p.get("x"), Some(&BigRational::new(1.into(), 2.into())));
        assert!(matches!(
            Point::new().bind_f64("x", f64::NAN),
            Err(PointError::NonFinite { .. })
        ));
    }
}
