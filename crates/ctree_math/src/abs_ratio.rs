//! Ratios of sums of absolute-value products.
//!
//! A condition-number bound is kept as
//!
//! ```text
//!   Σ c_k · Π |p_kj|^e_kj
//!   ---------------------
//!        Π |q_j|^f_j
//! ```
//!
//! with positive rational `c_k` and canonical polynomial atoms `p`, `q`.
//! An atom is a single variable or a primitive polynomial (integer
//! coefficients with gcd 1, no monomial factor, positive leading
//! coefficient), so `|p|` has one representation and equal factors meet in
//! the same map slot. Factors common to the denominator and to every
//! numerator term are cancelled after each operation.

use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::PointError;
use crate::multipoly::MultiPoly;
use crate::point::Point;

/// Product `Π |atom|^e`. The empty product is 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AbsProduct {
    factors: BTreeMap<MultiPoly, u32>,
}

impl AbsProduct {
    pub fn one() -> Self {
        Self::default()
    }

    pub fn is_one(&self) -> bool {
        self.factors.is_empty()
    }

    pub fn factors(&self) -> impl Iterator<Item = (&MultiPoly, u32)> {
        self.factors.iter().map(|(p, &e)| (p, e))
    }

    /// Sum of exponents.
    pub fn degree(&self) -> u32 {
        self.factors.values().sum()
    }

    fn push(&mut self, atom: MultiPoly, e: u32) {
        if e > 0 {
            *self.factors.entry(atom).or_insert(0) += e;
        }
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (atom, e) in other.factors() {
            out.push(atom.clone(), e);
        }
        out
    }

    fn gcd(&self, other: &Self) -> Self {
        let mut out = Self::one();
        for (atom, e) in self.factors() {
            if let Some(&f) = other.factors.get(atom) {
                out.push(atom.clone(), e.min(f));
            }
        }
        out
    }

    fn lcm(&self, other: &Self) -> Self {
        let mut out = self.clone();
        for (atom, f) in other.factors() {
            let slot = out.factors.entry(atom.clone()).or_insert(0);
            *slot = (*slot).max(f);
        }
        out
    }

    /// `self / divisor`; `divisor` must divide `self`.
    fn div_exact(&self, divisor: &Self) -> Self {
        let mut out = self.clone();
        for (atom, f) in divisor.factors() {
            if let Some(e) = out.factors.get_mut(atom) {
                *e = e.saturating_sub(f);
                if *e == 0 {
                    out.factors.remove(atom);
                }
            }
        }
        out
    }

    pub fn eval_at(&self, point: &Point) -> Result<BigRational, PointError> {
        let mut acc = BigRational::one();
        for (atom, e) in self.factors() {
            let v = atom.eval_at(point)?.abs();
            acc *= num_traits::pow(v, e as usize);
        }
        Ok(acc)
    }
}

impl fmt::Display for AbsProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        for (i, (atom, e)) in self.factors().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            write!(f, "|{}|", atom)?;
            if e > 1 {
                write!(f, "^{}", e)?;
            }
        }
        Ok(())
    }
}

/// Split `|p|` into a positive rational and a product of canonical atoms.
///
/// `|p| = content · Π |x_i|^m_i · |rest|` where `rest` is primitive with
/// positive leading coefficient. The zero polynomial maps to `(0, 1)`.
pub fn abs_decompose(p: &MultiPoly) -> (BigRational, AbsProduct) {
    if p.is_zero() {
        return (BigRational::zero(), AbsProduct::one());
    }
    let (content, pp) = p.primitive_part();
    let mono = pp.monomial_gcd();
    let rest = pp.div_monomial_exact(&mono).unwrap_or(pp);
    // sign-normalize on the leading term so |p| and |-p| share one atom
    let rest = match rest.terms.last() {
        Some((c, _)) if c.is_negative() => rest.neg(),
        _ => rest,
    };

    let mut product = AbsProduct::one();
    for (idx, &e) in mono.iter().enumerate() {
        if e > 0 {
            product.push(MultiPoly::from_var_index(p.vars.clone(), idx), e);
        }
    }
    if !rest.is_constant() {
        product.push(rest, 1);
    }
    (content, product)
}

/// `Σ c·Π|p|^e / Π|q|^f`, always in reduced form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsRatio {
    numer: BTreeMap<AbsProduct, BigRational>,
    denom: AbsProduct,
}

impl AbsRatio {
    pub fn one() -> Self {
        let mut numer = BTreeMap::new();
        numer.insert(AbsProduct::one(), BigRational::one());
        Self {
            numer,
            denom: AbsProduct::one(),
        }
    }

    pub fn zero() -> Self {
        Self {
            numer: BTreeMap::new(),
            denom: AbsProduct::one(),
        }
    }

    /// `|p|`
    pub fn abs_of(p: &MultiPoly) -> Self {
        let (c, product) = abs_decompose(p);
        if c.is_zero() {
            return Self::zero();
        }
        let mut numer = BTreeMap::new();
        numer.insert(product, c);
        Self {
            numer,
            denom: AbsProduct::one(),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.numer.is_empty()
    }

    pub fn is_one(&self) -> bool {
        *self == Self::one()
    }

    pub fn numerator_terms(&self) -> impl Iterator<Item = (&AbsProduct, &BigRational)> {
        self.numer.iter()
    }

    pub fn denominator(&self) -> &AbsProduct {
        &self.denom
    }

    /// Number of numerator terms plus denominator factors; a size measure
    /// for logging.
    pub fn size(&self) -> usize {
        self.numer.len() + self.denom.factors.len()
    }

    pub fn mul(&self, other: &Self) -> Self {
        let mut numer: BTreeMap<AbsProduct, BigRational> = BTreeMap::new();
        for (p1, c1) in &self.numer {
            for (p2, c2) in &other.numer {
                *numer.entry(p1.mul(p2)).or_insert_with(BigRational::zero) += c1 * c2;
            }
        }
        Self {
            numer,
            denom: self.denom.mul(&other.denom),
        }
        .reduce()
    }

    pub fn add(&self, other: &Self) -> Self {
        let denom = self.denom.lcm(&other.denom);
        let mut numer: BTreeMap<AbsProduct, BigRational> = BTreeMap::new();
        for side in [self, other] {
            let scale = denom.div_exact(&side.denom);
            for (p, c) in &side.numer {
                *numer.entry(p.mul(&scale)).or_insert_with(BigRational::zero) += c;
            }
        }
        Self { numer, denom }.reduce()
    }

    /// `self / |p|`, or `None` when `p` is the zero polynomial.
    pub fn div_abs(&self, p: &MultiPoly) -> Option<Self> {
        let (c, product) = abs_decompose(p);
        if c.is_zero() {
            return None;
        }
        let numer = self
            .numer
            .iter()
            .map(|(prod, coeff)| (prod.clone(), coeff / &c))
            .collect();
        Some(
            Self {
                numer,
                denom: self.denom.mul(&product),
            }
            .reduce(),
        )
    }

    /// Cancel the largest factor shared by the denominator and every
    /// numerator term.
    fn reduce(mut self) -> Self {
        self.numer.retain(|_, c| !c.is_zero());
        if self.numer.is_empty() {
            return Self::zero();
        }
        let mut common = self.denom.clone();
        for prod in self.numer.keys() {
            if common.is_one() {
                break;
            }
            common = common.gcd(prod);
        }
        if common.is_one() {
            return self;
        }
        let numer = self
            .numer
            .into_iter()
            .map(|(p, c)| (p.div_exact(&common), c))
            .collect();
        Self {
            numer,
            denom: self.denom.div_exact(&common),
        }
    }

    /// Exact value at `point`; `Ok(None)` when the denominator vanishes there.
    pub fn eval_at(&self, point: &Point) -> Result<Option<BigRational>, PointError> {
        let denom = self.denom.eval_at(point)?;
        let mut numer = BigRational::zero();
        for (prod, c) in &self.numer {
            numer += c * prod.eval_at(point)?;
        }
        if denom.is_zero() {
            return Ok(None);
        }
        Ok(Some(numer / denom))
    }
}

fn fmt_term(f: &mut fmt::Formatter<'_>, prod: &AbsProduct, c: &BigRational) -> fmt::Result {
    if prod.is_one() {
        write!(f, "{}", c)
    } else if c.is_one() {
        write!(f, "{}", prod)
    } else {
        write!(f, "{}*{}", c, prod)
    }
}

impl fmt::Display for AbsRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.numer.is_empty() {
            return write!(f, "0");
        }
        let wrap_numer = !self.denom.is_one() && self.numer.len() > 1;
        if wrap_numer {
            write!(f, "(")?;
        }
        for (i, (prod, c)) in self.numer.iter().rev().enumerate() {
            if i > 0 {
                write!(f, " + ")?;
            }
            fmt_term(f, prod, c)?;
        }
        if wrap_numer {
            write!(f, ")")?;
        }
        if !self.denom.is_one() {
            if self.denom.factors.len() > 1 {
                write!(f, "/({})", self.denom)?;
            } else {
                write!(f, "/{}", self.denom)?;
            }
        }
        Ok(())
    }
}
