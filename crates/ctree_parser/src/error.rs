use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Parse error: {0}")]
    NomError(String),
    #[error("Unconsumed input: {0}")]
    UnconsumedInput(String),
    #[error("Unknown operator '{0}' (expected +, - or *)")]
    UnknownOperator(String),
    #[error("Invalid leaf '{0}': neither an identifier nor a numeric literal")]
    InvalidNumber(String),
    #[error("Operator '{op}' takes exactly 2 operands, found {found}")]
    Arity { op: String, found: usize },
    #[error("Empty list '()'")]
    EmptyList,
}
