use ctree_ast::{CompareTree, Op};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, digit0, digit1, multispace0, one_of},
    combinator::{all_consuming, map, map_opt, opt},
    multi::many0,
    sequence::{delimited, pair, preceded, tuple},
    IResult,
};
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{pow, Zero};
use std::rc::Rc;

use crate::error::ParseError;

/// Largest decimal exponent accepted in a literal such as `1e-3`.
const MAX_EXPONENT: i32 = 4096;

// Intermediate s-expression, validated when lowered to a tree
#[derive(Debug, Clone)]
enum ParseNode {
    Atom(String),
    List(Vec<ParseNode>),
}

impl ParseNode {
    fn lower(self) -> Result<Rc<CompareTree>, ParseError> {
        match self {
            ParseNode::Atom(token) => lower_leaf(&token),
            ParseNode::List(items) => {
                let mut items = items.into_iter();
                let head = match items.next() {
                    Some(ParseNode::Atom(head)) => head,
                    Some(list @ ParseNode::List(_)) => {
                        return Err(ParseError::UnknownOperator(list.to_string()))
                    }
                    None => return Err(ParseError::EmptyList),
                };
                let op = Op::from_symbol(&head).ok_or(ParseError::UnknownOperator(head))?;
                let operands: Vec<ParseNode> = items.collect();
                if operands.len() != 2 {
                    return Err(ParseError::Arity {
                        op: op.symbol().to_string(),
                        found: operands.len(),
                    });
                }
                let mut operands = operands.into_iter();
                let (Some(left), Some(right)) = (operands.next(), operands.next()) else {
                    unreachable!("arity checked above");
                };
                Ok(CompareTree::binary(op, left.lower()?, right.lower()?))
            }
        }
    }
}

impl std::fmt::Display for ParseNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseNode::Atom(s) => write!(f, "{}", s),
            ParseNode::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
        }
    }
}

fn lower_leaf(token: &str) -> Result<Rc<CompareTree>, ParseError> {
    if all_consuming(parse_identifier)(token).is_ok() {
        return Ok(CompareTree::var(token));
    }
    parse_number_literal(token).map(CompareTree::num)
}

// ============================================================================
// Tokens
// ============================================================================

fn is_atom_char(c: char) -> bool {
    !c.is_whitespace() && c != '(' && c != ')'
}

fn parse_atom(input: &str) -> IResult<&str, ParseNode> {
    map(take_while1(is_atom_char), |s: &str| {
        ParseNode::Atom(s.to_string())
    })(input)
}

// An operator right after `(` is a token of its own, so `(+a b)` reads as
// `(+ a b)`. Elsewhere `+`/`-` stay part of signed literals such as `-5`.
fn parse_head_operator(input: &str) -> IResult<&str, ParseNode> {
    map(preceded(multispace0, one_of("+-*")), |c: char| {
        ParseNode::Atom(c.to_string())
    })(input)
}

fn parse_list(input: &str) -> IResult<&str, ParseNode> {
    map(
        delimited(
            tag("("),
            pair(opt(parse_head_operator), many0(parse_node)),
            preceded(multispace0, tag(")")),
        ),
        |(head, rest)| ParseNode::List(head.into_iter().chain(rest).collect()),
    )(input)
}

fn parse_node(input: &str) -> IResult<&str, ParseNode> {
    preceded(multispace0, alt((parse_list, parse_atom)))(input)
}

fn parse_identifier(input: &str) -> IResult<&str, &str> {
    // First char must be a letter or underscore
    let mut chars = input.chars();
    let first = chars.next();
    if !matches!(first, Some(c) if c.is_ascii_alphabetic() || c == '_') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Alpha,
        )));
    }

    let mut len = 1;
    for c in chars {
        if c.is_ascii_alphanumeric() || c == '_' {
            len += c.len_utf8();
        } else {
            break;
        }
    }

    Ok((&input[len..], &input[..len]))
}

// ============================================================================
// Numeric literals
// ============================================================================

fn ten_pow(k: u32) -> BigInt {
    pow(BigInt::from(10), k as usize)
}

/// Exact value of `[-]int.frac * 10^exponent`.
/// "8.2" → 41/5, ".5" → 1/2, "8." → 8, "1e-3" → 1/1000
fn decimal_to_rational(
    negative: bool,
    integer_part: &str,
    fractional_part: &str,
    exponent: i32,
) -> BigRational {
    let digits = format!("{}{}", integer_part, fractional_part);
    let mantissa: BigInt = digits.parse().unwrap_or_default();
    let scale = exponent - fractional_part.len() as i32;

    let magnitude = if scale >= 0 {
        BigRational::from_integer(mantissa * ten_pow(scale as u32))
    } else {
        BigRational::new(mantissa, ten_pow(scale.unsigned_abs()))
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn parse_sign(input: &str) -> IResult<&str, bool> {
    map(opt(one_of("+-")), |sign| sign == Some('-'))(input)
}

// p/q with q != 0
fn parse_fraction(input: &str) -> IResult<&str, BigRational> {
    map_opt(
        tuple((parse_sign, digit1, char('/'), digit1)),
        |(negative, numer, _, denom): (bool, &str, char, &str)| {
            let numer: BigInt = numer.parse().ok()?;
            let denom: BigInt = denom.parse().ok()?;
            if denom.is_zero() {
                return None;
            }
            let value = BigRational::new(numer, denom);
            Some(if negative { -value } else { value })
        },
    )(input)
}

// 123, 8.2, .5, 8., 2.5e+2
fn parse_decimal(input: &str) -> IResult<&str, BigRational> {
    map_opt(
        tuple((
            parse_sign,
            digit0,
            opt(preceded(char('.'), digit0)),
            opt(preceded(one_of("eE"), pair(parse_sign, digit1))),
        )),
        |(negative, int_part, frac, exp): (bool, &str, Option<&str>, Option<(bool, &str)>)| {
            let frac_part = frac.unwrap_or("");
            if int_part.is_empty() && frac_part.is_empty() {
                return None;
            }
            let exponent = match exp {
                Some((exp_negative, digits)) => {
                    let e: i32 = digits.parse().ok()?;
                    if e > MAX_EXPONENT {
                        return None;
                    }
                    if exp_negative {
                        -e
                    } else {
                        e
                    }
                }
                None => 0,
            };
            Some(decimal_to_rational(negative, int_part, frac_part, exponent))
        },
    )(input)
}

/// Parse a whole token as an exact numeric literal.
///
/// Accepts integers, decimals with an optional exponent and `p/q`
/// fractions, each with an optional sign.
pub fn parse_number_literal(token: &str) -> Result<BigRational, ParseError> {
    match all_consuming(alt((parse_fraction, parse_decimal)))(token) {
        Ok((_, value)) => Ok(value),
        Err(_) => Err(ParseError::InvalidNumber(token.to_string())),
    }
}

/// Parse an s-expression such as `(* (+ 3.14 a) (- x y))` into a compute tree.
///
/// Tokens are separated by whitespace and parentheses. The operator that
/// opens a list may also be glued to its first operand, as in `(*x (-y 1))`;
/// a sign anywhere else belongs to a numeric literal.
pub fn parse(input: &str) -> Result<Rc<CompareTree>, ParseError> {
    let (remaining, node) =
        parse_node(input).map_err(|e| ParseError::NomError(format!("{}", e)))?;

    let remaining = remaining.trim();
    if !remaining.is_empty() {
        return Err(ParseError::UnconsumedInput(remaining.to_string()));
    }

    node.lower()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_parse_nested() {
        let t = parse("(* (+ 3.14 a) (- x y))").unwrap();
        let expected = CompareTree::mul(
            CompareTree::add(CompareTree::num(rat(157, 50)), CompareTree::var("a")),
            CompareTree::sub(CompareTree::var("x"), CompareTree::var("y")),
        );
        assert_eq!(t, expected);
    }

    #[test]
    fn test_parse_leaf_only() {
        assert_eq!(parse("x").unwrap(), CompareTree::var("x"));
        assert_eq!(parse("  42 ").unwrap(), CompareTree::int(42));
    }

    #[test]
    fn test_parse_free_whitespace() {
        let a = parse("(+ (* x 14 ) x)").unwrap();
        let b = parse("(+\n\t(* x   14)\n x)").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_parse_decimal_literals() {
        let cases = [
            ("8.2", rat(41, 5)),
            ("0.5", rat(1, 2)),
            (".5", rat(1, 2)),
            ("8.", rat(8, 1)),
            ("100.001", rat(100001, 1000)),
            ("-2.999", rat(-2999, 1000)),
            ("1e-3", rat(1, 1000)),
            ("2.5E+2", rat(250, 1)),
            ("+7", rat(7, 1)),
            ("3/6", rat(1, 2)),
            ("-1/3", rat(-1, 3)),
        ];
        for (input, expected) in cases {
            assert_eq!(
                parse_number_literal(input).unwrap(),
                expected,
                "literal {}",
                input
            );
        }
    }

    #[test]
    fn test_invalid_literals() {
        for bad in ["", ".", "-", "1/0", "1.2.3", "1e", "3x", "1e99999"] {
            assert!(
                matches!(parse_number_literal(bad), Err(ParseError::InvalidNumber(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_unknown_operator() {
        assert_eq!(
            parse("(/ a b)"),
            Err(ParseError::UnknownOperator("/".to_string()))
        );
        assert!(matches!(
            parse("((+ a b) c d)"),
            Err(ParseError::UnknownOperator(_))
        ));
    }

    #[test]
    fn test_operator_glued_to_first_operand() {
        assert_eq!(parse("(+a b)").unwrap(), parse("(+ a b)").unwrap());
        assert_eq!(
            parse("(*x (-y 1))").unwrap(),
            CompareTree::mul(
                CompareTree::var("x"),
                CompareTree::sub(CompareTree::var("y"), CompareTree::int(1)),
            )
        );
        // the operand keeps its own sign
        assert_eq!(parse("(--5 x)").unwrap(), parse("(- -5 x)").unwrap());
        assert_eq!(
            parse("(/a b)"),
            Err(ParseError::UnknownOperator("/a".to_string()))
        );
    }

    #[test]
    fn test_arity() {
        assert_eq!(
            parse("(+ a b c)"),
            Err(ParseError::Arity {
                op: "+".to_string(),
                found: 3
            })
        );
        assert_eq!(
            parse("(- a)"),
            Err(ParseError::Arity {
                op: "-".to_string(),
                found: 1
            })
        );
    }

    #[test]
    fn test_bad_leaf() {
        assert_eq!(
            parse("(+ a 3x)"),
            Err(ParseError::InvalidNumber("3x".to_string()))
        );
        // An operator symbol in operand position is not a leaf
        assert_eq!(
            parse("(+ a *)"),
            Err(ParseError::InvalidNumber("*".to_string()))
        );
    }

    #[test]
    fn test_structure_errors() {
        assert_eq!(parse("()"), Err(ParseError::EmptyList));
        assert!(matches!(parse("(+ a b"), Err(ParseError::NomError(_))));
        assert!(matches!(parse(""), Err(ParseError::NomError(_))));
        assert_eq!(
            parse("(+ a b))"),
            Err(ParseError::UnconsumedInput(")".to_string()))
        );
    }

    #[test]
    fn test_display_round_trip() {
        let inputs = [
            "(+ (+ (+ a1 a2) a3) a4)",
            "(- (* (- (* (+ (* (+ x 14) x) 47) x) 38) x) 240)",
            "(* 1/3 (- -5 y_2))",
        ];
        for input in inputs {
            let tree = parse(input).unwrap();
            assert_eq!(tree.to_string(), input);
            assert_eq!(parse(&tree.to_string()).unwrap(), tree);
        }
    }
}
