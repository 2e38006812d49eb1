//! Exact node values: polynomials over Q in expanded canonical form.
//!
//! All polynomials built for one tree share the tree's sorted variable list,
//! and exponent vectors are indexed by it. Terms are kept sorted by exponent
//! vector with no zero coefficients, so two values are equal exactly when
//! their term lists are.

use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{PointError, PolyError};
use crate::point::Point;

/// Exponents, one per variable of the owning polynomial.
pub type Monomial = Vec<u32>;

/// Size limits checked after each product, so a tree whose expansion
/// explodes fails instead of exhausting memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PolyBudget {
    pub max_terms: usize,
    pub max_total_degree: u32,
}

impl Default for PolyBudget {
    fn default() -> Self {
        Self {
            max_terms: 200_000,
            max_total_degree: 4096,
        }
    }
}

impl PolyBudget {
    pub fn check(&self, p: &MultiPoly) -> Result<(), PolyError> {
        self.check_terms(p.num_terms())?;
        self.check_degree(u64::from(p.total_degree()))
    }

    fn check_terms(&self, used: usize) -> Result<(), PolyError> {
        if used > self.max_terms {
            return Err(PolyError::BudgetExceeded {
                what: "terms",
                used,
                limit: self.max_terms,
            });
        }
        Ok(())
    }

    fn check_degree(&self, used: u64) -> Result<(), PolyError> {
        if used > u64::from(self.max_total_degree) {
            return Err(PolyError::BudgetExceeded {
                what: "total degree",
                used: usize::try_from(used).unwrap_or(usize::MAX),
                limit: self.max_total_degree as usize,
            });
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MultiPoly {
    pub vars: Vec<String>,
    pub terms: Vec<(BigRational, Monomial)>,
}

impl MultiPoly {
    pub fn zero(vars: Vec<String>) -> Self {
        Self {
            vars,
            terms: Vec::new(),
        }
    }

    pub fn constant(vars: Vec<String>, c: BigRational) -> Self {
        if c.is_zero() {
            return Self::zero(vars);
        }
        let exps = vec![0; vars.len()];
        Self {
            vars,
            terms: vec![(c, exps)],
        }
    }

    /// The polynomial `var`; fails if `var` is not in `vars`.
    pub fn from_var(vars: Vec<String>, var: &str) -> Result<Self, PolyError> {
        let idx = vars
            .iter()
            .position(|v| v == var)
            .ok_or(PolyError::VarMismatch)?;
        Ok(Self::from_var_index(vars, idx))
    }

    pub(crate) fn from_var_index(vars: Vec<String>, idx: usize) -> Self {
        let mut exps = vec![0; vars.len()];
        exps[idx] = 1;
        Self {
            vars,
            terms: vec![(BigRational::one(), exps)],
        }
    }

    // Sorted by exponent vector, zeros dropped.
    fn from_sorted(vars: Vec<String>, acc: BTreeMap<Monomial, BigRational>) -> Self {
        let terms = acc
            .into_iter()
            .filter(|(_, c)| !c.is_zero())
            .map(|(m, c)| (c, m))
            .collect();
        Self { vars, terms }
    }

    fn same_vars(&self, other: &Self) -> Result<(), PolyError> {
        if self.vars == other.vars {
            Ok(())
        } else {
            Err(PolyError::VarMismatch)
        }
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// True for zero and for nonzero constants.
    pub fn is_constant(&self) -> bool {
        match self.terms.as_slice() {
            [] => true,
            [(_, exps)] => exps.iter().all(|&e| e == 0),
            _ => false,
        }
    }

    pub fn total_degree(&self) -> u32 {
        self.terms
            .iter()
            .map(|(_, m)| m.iter().sum::<u32>())
            .max()
            .unwrap_or(0)
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn neg(&self) -> Self {
        Self {
            vars: self.vars.clone(),
            terms: self
                .terms
                .iter()
                .map(|(c, m)| (-c.clone(), m.clone()))
                .collect(),
        }
    }

    pub fn add(&self, other: &Self) -> Result<Self, PolyError> {
        self.same_vars(other)?;
        let mut acc: BTreeMap<Monomial, BigRational> = self
            .terms
            .iter()
            .map(|(c, m)| (m.clone(), c.clone()))
            .collect();
        for (c, m) in &other.terms {
            *acc.entry(m.clone()).or_insert_with(BigRational::zero) += c;
        }
        Ok(Self::from_sorted(self.vars.clone(), acc))
    }

    pub fn sub(&self, other: &Self) -> Result<Self, PolyError> {
        self.add(&other.neg())
    }

    /// Product, failing as soon as the result would exceed `budget`.
    pub fn mul(&self, other: &Self, budget: &PolyBudget) -> Result<Self, PolyError> {
        self.same_vars(other)?;
        if self.is_zero() || other.is_zero() {
            return Ok(Self::zero(self.vars.clone()));
        }
        budget.check_degree(u64::from(self.total_degree()) + u64::from(other.total_degree()))?;

        let mut acc: BTreeMap<Monomial, BigRational> = BTreeMap::new();
        for (c1, m1) in &self.terms {
            for (c2, m2) in &other.terms {
                let exps: Monomial = m1.iter().zip(m2).map(|(a, b)| a + b).collect();
                *acc.entry(exps).or_insert_with(BigRational::zero) += c1 * c2;
                budget.check_terms(acc.len())?;
            }
        }
        Ok(Self::from_sorted(self.vars.clone(), acc))
    }

    /// Positive rational `c` such that `self / c` has coprime integer
    /// coefficients. Zero for the zero polynomial.
    pub fn content(&self) -> BigRational {
        let Some(((first, _), rest)) = self.terms.split_first() else {
            return BigRational::zero();
        };
        let (numer, denom) = rest.iter().fold(
            (first.numer().abs(), first.denom().clone()),
            |(n, d), (c, _)| (n.gcd(c.numer()), d.lcm(c.denom())),
        );
        BigRational::new(numer, denom)
    }

    /// `(content, self / content)`.
    pub fn primitive_part(&self) -> (BigRational, Self) {
        let c = self.content();
        if c.is_zero() || c.is_one() {
            return (c, self.clone());
        }
        let scaled = Self {
            vars: self.vars.clone(),
            terms: self.terms.iter().map(|(k, m)| (k / &c, m.clone())).collect(),
        };
        (c, scaled)
    }

    /// Largest monomial dividing every term.
    pub fn monomial_gcd(&self) -> Monomial {
        let mut terms = self.terms.iter();
        let Some((_, first)) = terms.next() else {
            return vec![0; self.vars.len()];
        };
        terms.fold(first.clone(), |mut lowest, (_, m)| {
            for (l, &e) in lowest.iter_mut().zip(m) {
                *l = (*l).min(e);
            }
            lowest
        })
    }

    /// `self / mono`, or `None` unless `mono` divides every term.
    pub fn div_monomial_exact(&self, mono: &Monomial) -> Option<Self> {
        if mono.len() != self.vars.len() {
            return None;
        }
        // Subtracting the same exponents keeps the term order.
        let terms = self
            .terms
            .iter()
            .map(|(c, m)| {
                let exps = m
                    .iter()
                    .zip(mono)
                    .map(|(a, b)| a.checked_sub(*b))
                    .collect::<Option<Monomial>>()?;
                Some((c.clone(), exps))
            })
            .collect::<Option<Vec<_>>>()?;
        Some(Self {
            vars: self.vars.clone(),
            terms,
        })
    }

    /// Exact value with `values[i]` substituted for `vars[i]`.
    pub fn eval(&self, values: &[BigRational]) -> BigRational {
        self.terms
            .iter()
            .map(|(c, m)| {
                values
                    .iter()
                    .zip(m)
                    .filter(|(_, e)| **e > 0)
                    .fold(c.clone(), |acc, (x, &e)| acc * num_traits::pow(x.clone(), e as usize))
            })
            .fold(BigRational::zero(), |sum, t| sum + t)
    }

    /// Exact value at a named point.
    pub fn eval_at(&self, point: &Point) -> Result<BigRational, PointError> {
        let values = point.values_for(&self.vars)?;
        Ok(self.eval(&values))
    }

    fn fmt_monomial(&self, mono: &Monomial, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let factors = self.vars.iter().zip(mono).filter(|(_, e)| **e > 0);
        for (i, (name, &e)) in factors.enumerate() {
            if i > 0 {
                f.write_str("*")?;
            }
            match e {
                1 => write!(f, "{}", name)?,
                _ => write!(f, "{}^{}", name, e)?,
            }
        }
        Ok(())
    }
}

/// Terms are printed from the largest exponent vector down, so `a0 + a1*x`
/// reads in the order the variables are declared.
impl fmt::Display for MultiPoly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        for (i, (coeff, mono)) in self.terms.iter().rev().enumerate() {
            let sign = match (i, coeff.is_negative()) {
                (0, true) => "-",
                (0, false) => "",
                (_, true) => " - ",
                (_, false) => " + ",
            };
            f.write_str(sign)?;
            let magnitude = coeff.abs();
            if mono.iter().all(|&e| e == 0) {
                write!(f, "{}", magnitude)?;
            } else if magnitude.is_one() {
                self.fmt_monomial(mono, f)?;
            } else {
                write!(f, "{}*", magnitude)?;
                self.fmt_monomial(mono, f)?;
            }
        }
        Ok(())
    }
}
