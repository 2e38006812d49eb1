use thiserror::Error;

/// Errors from polynomial arithmetic.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolyError {
    #[error("budget exceeded: {what} reached {used} (limit {limit})")]
    BudgetExceeded {
        what: &'static str,
        used: usize,
        limit: usize,
    },
    #[error("variable mismatch")]
    VarMismatch,
}

/// Errors from instantiating symbolic results at a numeric point.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    #[error("variable '{0}' has no value at this point")]
    UnboundVariable(String),
    #[error("value bound to '{name}' is not finite")]
    NonFinite { name: String },
}
