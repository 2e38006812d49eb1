//! Multiplication trees for limb-wise polynomial products.
//!
//! Operands are slices of coefficient trees, lowest limb first. Both
//! builders return exactly `2n` limbs for inputs of length `n`; the top
//! limb is always the literal zero. Limbs share subtrees through `Rc`.

use ctree_ast::CompareTree;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

use crate::error::BuildError;

pub type Limbs = Vec<Rc<CompareTree>>;

fn check_lengths(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<(), BuildError> {
    if a.len() != b.len() {
        return Err(BuildError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(())
}

fn check_operands(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<(), BuildError> {
    check_lengths(a, b)?;
    if !a.len().is_power_of_two() {
        return Err(BuildError::NotPowerOfTwo(a.len()));
    }
    Ok(())
}

/// Limb-wise `a + b`. A literal zero on either side yields the other limb.
pub fn padd(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
    check_lengths(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| {
            if y.is_zero_literal() {
                x.clone()
            } else if x.is_zero_literal() {
                y.clone()
            } else {
                CompareTree::add(x.clone(), y.clone())
            }
        })
        .collect())
}

/// Limb-wise `a - b`. Only a zero subtrahend is elided; `0 - y` stays a
/// subtraction node.
pub fn psub(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
    check_lengths(a, b)?;
    Ok(a.iter()
        .zip(b)
        .map(|(x, y)| {
            if y.is_zero_literal() {
                x.clone()
            } else {
                CompareTree::sub(x.clone(), y.clone())
            }
        })
        .collect())
}

/// Multiply by `X^k`: prepend `k` zero limbs.
pub fn shift(a: &[Rc<CompareTree>], k: usize) -> Limbs {
    let zero = CompareTree::zero();
    std::iter::repeat(zero)
        .take(k)
        .chain(a.iter().cloned())
        .collect()
}

/// Pad with zero limbs up to length `n`.
pub fn complete(mut a: Limbs, n: usize) -> Result<Limbs, BuildError> {
    if a.len() > n {
        return Err(BuildError::CompleteOverflow {
            len: a.len(),
            target: n,
        });
    }
    a.resize(n, CompareTree::zero());
    Ok(a)
}

/// Variable leaves `prefix0 .. prefix{n-1}`.
pub fn operands(prefix: &str, n: usize) -> Limbs {
    (0..n)
        .map(|i| CompareTree::var(&format!("{}{}", prefix, i)))
        .collect()
}

fn base_case(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Limbs {
    vec![CompareTree::mul(a[0].clone(), b[0].clone()), CompareTree::zero()]
}

fn naive_rec(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
    let n = a.len();
    if n == 1 {
        return Ok(base_case(a, b));
    }
    let h = n / 2;
    let (al, au) = a.split_at(h);
    let (bl, bu) = b.split_at(h);

    let d0 = naive_rec(al, bl)?;
    let d1 = naive_rec(au, bu)?;
    let d2 = padd(&naive_rec(al, bu)?, &naive_rec(au, bl)?)?;

    let low_high = padd(&complete(d0, 2 * n)?, &complete(shift(&d1, n), 2 * n)?)?;
    padd(&low_high, &complete(shift(&d2, h), 2 * n)?)
}

fn karatsuba_rec(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
    let n = a.len();
    if n == 1 {
        return Ok(base_case(a, b));
    }
    let h = n / 2;
    let (al, au) = a.split_at(h);
    let (bl, bu) = b.split_at(h);

    let d0 = karatsuba_rec(al, bl)?;
    let d1 = karatsuba_rec(au, bu)?;
    let d2 = karatsuba_rec(&padd(al, au)?, &padd(bl, bu)?)?;

    // D1·X^n − D1·X^h and D0 − D0·X^h
    let high = psub(&complete(shift(&d1, n), 2 * n)?, &complete(shift(&d1, h), 2 * n)?)?;
    let low = psub(&complete(d0.clone(), 2 * n)?, &complete(shift(&d0, h), 2 * n)?)?;
    padd(&complete(shift(&d2, h), 2 * n)?, &padd(&high, &low)?)
}

/// Schoolbook product tree: four half-size products per level.
pub fn naive(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
    check_operands(a, b)?;
    let limbs = naive_rec(a, b)?;
    debug!(target: "builders", n = a.len(), limbs = limbs.len(), "naive");
    Ok(limbs)
}

/// Karatsuba product tree: three half-size products per level, trading
/// multiplications for longer chains of additions and subtractions.
pub fn karatsuba(a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
    check_operands(a, b)?;
    let limbs = karatsuba_rec(a, b)?;
    debug!(target: "builders", n = a.len(), limbs = limbs.len(), "karatsuba");
    Ok(limbs)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MulAlgorithm {
    Naive,
    Karatsuba,
}

impl MulAlgorithm {
    pub fn build(self, a: &[Rc<CompareTree>], b: &[Rc<CompareTree>]) -> Result<Limbs, BuildError> {
        match self {
            MulAlgorithm::Naive => naive(a, b),
            MulAlgorithm::Karatsuba => karatsuba(a, b),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MulAlgorithm::Naive => "naive",
            MulAlgorithm::Karatsuba => "karatsuba",
        }
    }
}

impl fmt::Display for MulAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::martingale::martingale_lengths;

    fn v(name: &str) -> Rc<CompareTree> {
        CompareTree::var(name)
    }

    #[test]
    fn test_padd_elides_zeros() {
        let z = CompareTree::zero();
        let out = padd(&[v("a"), z.clone(), z.clone()], &[z.clone(), v("b"), z]).unwrap();
        assert_eq!(out[0], v("a"));
        assert_eq!(out[1], v("b"));
        assert!(out[2].is_zero_literal());
    }

    #[test]
    fn test_psub_keeps_negation() {
        let z = CompareTree::zero();
        let out = psub(&[v("a"), z.clone()], &[z, v("b")]).unwrap();
        assert_eq!(out[0], v("a"));
        assert_eq!(out[1].to_string(), "(- 0 b)");
    }

    #[test]
    fn test_shift_and_complete() {
        let s = shift(&[v("a"), v("b")], 2);
        let rendered: Vec<String> = s.iter().map(|t| t.to_string()).collect();
        assert_eq!(rendered, ["0", "0", "a", "b"]);

        let c = complete(vec![v("a")], 3).unwrap();
        assert_eq!(c.len(), 3);
        assert!(c[1].is_zero_literal() && c[2].is_zero_literal());
        assert_eq!(complete(c.clone(), 3).unwrap(), c);
        assert_eq!(
            complete(c, 2),
            Err(BuildError::CompleteOverflow { len: 3, target: 2 })
        );
    }

    #[test]
    fn test_base_case() {
        for build in [naive, karatsuba] {
            let out = build(&[v("a0")], &[v("b0")]).unwrap();
            assert_eq!(out.len(), 2);
            assert_eq!(out[0].to_string(), "(* a0 b0)");
            assert!(out[1].is_zero_literal());
        }
    }

    #[test]
    fn test_n4_martingale_profile() {
        let a = operands("a", 4);
        let b = operands("b", 4);
        let k = martingale_lengths(&karatsuba(&a, &b).unwrap()).unwrap();
        let n = martingale_lengths(&naive(&a, &b).unwrap()).unwrap();
        assert_eq!(k, vec![1, 4, 4, 7, 4, 4, 1, 0]);
        assert_eq!(n, vec![1, 2, 3, 3, 3, 2, 1, 0]);
    }

    #[test]
    fn test_operand_errors() {
        let a = operands("a", 4);
        let b = operands("b", 2);
        assert_eq!(
            karatsuba(&a, &b),
            Err(BuildError::LengthMismatch { left: 4, right: 2 })
        );
        let c = operands("c", 3);
        assert_eq!(naive(&c, &c), Err(BuildError::NotPowerOfTwo(3)));
        assert_eq!(naive(&[], &[]), Err(BuildError::NotPowerOfTwo(0)));
    }

    #[test]
    fn test_inputs_untouched() {
        let a = operands("a", 2);
        let before = a.clone();
        let _ = karatsuba(&a, &a).unwrap();
        assert_eq!(a, before);
    }
}
