use thiserror::Error;

/// Errors produced while compiling a formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedCharacter { found: String, position: usize },
    #[error("unexpected {found} at position {position}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: &'static str,
        position: usize,
    },
    #[error("unexpected end of formula, expected {expected}")]
    UnexpectedEnd { expected: &'static str },
    #[error("formula nests deeper than {max} levels")]
    TooDeep { max: usize },
}

/// Errors produced while evaluating a compiled formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("result is not a finite number")]
    NonFinite,
}

/// Errors produced at the storage boundary when decoding session documents
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("malformed session JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed session YAML: {0}")]
    Yaml(String),
    #[error("invalid session: {reason}")]
    Invalid { reason: String },
}

impl SessionError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SessionError::Invalid {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
