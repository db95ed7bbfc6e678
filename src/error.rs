//! Bridge error type

use std::time::Duration;

use thiserror::Error;

use crate::host::HostError;

pub type Result<T> = std::result::Result<T, BridgeError>;

/// Everything that can go wrong while crossing the bridge
#[derive(Debug, Clone, Error)]
pub enum BridgeError {
    /// Malformed expression text
    #[error("compile error: {0}")]
    Compile(String),

    /// Runtime error raised while evaluating guest code
    #[error("evaluation error: {0}")]
    Eval(String),

    /// The result could not be converted to a string
    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("evaluation exceeded its {0:?} deadline")]
    Timeout(Duration),

    #[error("evaluation was cancelled")]
    Cancelled,

    #[error("wrong type argument: expected {expected}, got {found}")]
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("interpreter is already initialized")]
    AlreadyInitialized,

    #[error("config error: {0}")]
    Config(String),
}

impl BridgeError {
    /// Label recorded in the diagnostic stream for this failure
    pub fn operation(&self) -> &'static str {
        match self {
            BridgeError::Compile(_) => "compiling",
            BridgeError::Eval(_) | BridgeError::Timeout(_) | BridgeError::Cancelled => {
                "evaluating expression"
            }
            BridgeError::Conversion(_) => "converting to string",
            BridgeError::WrongType { .. } => "checking argument",
            BridgeError::Host(_) => "accessing host value",
            BridgeError::AlreadyInitialized => "initializing",
            BridgeError::Config(_) => "loading config",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operation_labels() {
        assert_eq!(BridgeError::Compile("x".into()).operation(), "compiling");
        assert_eq!(
            BridgeError::Eval("x".into()).operation(),
            "evaluating expression"
        );
        assert_eq!(BridgeError::Cancelled.operation(), "evaluating expression");
        assert_eq!(
            BridgeError::Conversion("x".into()).operation(),
            "converting to string"
        );
    }

    #[test]
    fn host_errors_convert() {
        let err: BridgeError = HostError::Void("foo".into()).into();
        assert_eq!(
            err.to_string(),
            "symbol's function definition is void: foo"
        );
    }
}
