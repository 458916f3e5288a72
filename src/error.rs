//! Error type shared by construction, evaluation and distance computation.

use thiserror::Error;

use crate::operator::Operator;
use crate::types::Domain;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The constraint exceeds the configured size limit and was not built.
    #[error("constraint of size {size} exceeds the maximum of {max}")]
    ConstructionRejected { size: usize, max: usize },

    /// The operator has no case for the given shape.
    #[error("operator '{op}' is not implemented for {shape}")]
    UnknownOperator { op: Operator, shape: String },

    #[error("domain mismatch: expected {expected}, found {found}")]
    DomainMismatch { expected: String, found: String },

    #[error("operator '{op}' expects {expected} operand(s), found {found}")]
    ArityMismatch {
        op: Operator,
        expected: String,
        found: usize,
    },

    #[error("variable '{name}' was already registered with a different value")]
    ConflictingVariable { name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("index {index} out of bounds for length {length}")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("cannot parse '{input}' as an integer")]
    NumberFormat { input: String },

    #[error("{0} is not a valid code point")]
    InvalidCodePoint(i64),

    #[error("no more tokens")]
    NoSuchToken,

    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl Error {
    pub(crate) fn domain_mismatch(expected: impl ToString, found: impl ToString) -> Self {
        Error::DomainMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn unknown_operator(op: Operator, operands: &[Domain]) -> Self {
        let shape = operands
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Error::UnknownOperator {
            op,
            shape: format!("({})", shape),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
