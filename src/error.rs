//! Error handling for plyr-rs
//!
//! This module defines the crate-wide error type and a Result alias. The
//! variants fall into four groups:
//!
//! - **Construction**: structural problems found while building expressions
//!   or pipes (`UnsupportedOperator`, `MalformedCall`, `MalformedPipeTarget`)
//! - **Evaluation**: failures local to one expression node (`UnresolvedSymbol`,
//!   `AttributeNotFound`, `KeyNotFound`, ...)
//! - **Dispatch**: a usage or configuration gap (`NoBackendForType`,
//!   `VerbNotImplemented`, `RecursionLimit`, ...)
//! - **Backend**: errors raised by a plugin's verb implementation, carried
//!   opaquely in [`PlyrError::Backend`]

use thiserror::Error;

/// Main error type for plyr-rs operations
#[derive(Error, Debug)]
pub enum PlyrError {
    /// Operator token that has no expression-node counterpart
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// Call node with an invalid shape (non-callable literal, duplicate keyword)
    #[error("Malformed call: {0}")]
    MalformedCall(String),

    /// Right-hand side of a pipe is not a verb call
    #[error("Malformed pipe target: {0}")]
    MalformedPipeTarget(String),

    /// Symbol not registered in the evaluation context
    #[error("Unresolved symbol: {0}")]
    UnresolvedSymbol(String),

    /// Attribute access on a value that does not expose it
    #[error("Attribute '{name}' not found on {type_key}")]
    AttributeNotFound { type_key: String, name: String },

    /// Index access with a key the value does not contain
    #[error("Key {key} not found on {type_key}")]
    KeyNotFound { type_key: String, key: String },

    /// Call node whose function evaluated to something that cannot be called
    #[error("Value of type {0} is not callable")]
    NotCallable(String),

    /// Operator applied to operands that do not support it
    #[error("Operator '{op}' not supported for {left} and {right}")]
    UnsupportedOperand {
        op: &'static str,
        left: String,
        right: String,
    },

    /// A verb or function received an argument of the wrong kind
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Dispatch was attempted without a subject argument
    #[error("Verb '{0}' called without a subject")]
    MissingSubject(String),

    /// No registered plugin claims the subject type or any of its ancestors
    #[error("No backend registered for type {0}")]
    NoBackendForType(String),

    /// Plugins claim the type, but none implements the verb
    #[error("Verb '{verb}' is not implemented for type {type_key}")]
    VerbNotImplemented { verb: String, type_key: String },

    /// Re-dispatch nested deeper than the configured limit
    #[error("Dispatch depth limit of {limit} exceeded while calling '{verb}'")]
    RecursionLimit { verb: String, limit: usize },

    /// A plugin with the same name is already registered
    #[error("Plugin '{0}' is already registered")]
    DuplicatePlugin(String),

    /// No plugin with this name is registered
    #[error("Plugin '{0}' is not registered")]
    UnknownPlugin(String),

    /// Errors raised by a backend's verb implementation
    #[error(transparent)]
    Backend(#[from] anyhow::Error),

    /// Errors related to configuration loading
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PlyrError>,
    },
}

impl PlyrError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PlyrError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Create a backend error from a message
    pub fn backend(message: impl std::fmt::Display) -> Self {
        PlyrError::Backend(anyhow::anyhow!("{}", message))
    }

    /// Shorthand for a type mismatch
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        PlyrError::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Whether this error came out of dispatch resolution rather than evaluation
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            PlyrError::NoBackendForType(_)
                | PlyrError::VerbNotImplemented { .. }
                | PlyrError::MissingSubject(_)
                | PlyrError::RecursionLimit { .. }
        )
    }
}

/// Result type alias for plyr-rs operations
pub type Result<T> = std::result::Result<T, PlyrError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlyrError::UnresolvedSymbol("dataset".to_string());
        assert_eq!(err.to_string(), "Unresolved symbol: dataset");
    }

    #[test]
    fn test_error_with_context() {
        let err = PlyrError::Config("bad priority".to_string());
        let with_ctx = err.with_context("Failed to load plyr.toml");
        assert!(with_ctx.to_string().contains("Failed to load plyr.toml"));
        assert!(with_ctx.to_string().contains("bad priority"));
    }

    #[test]
    fn test_verb_not_implemented_message() {
        let err = PlyrError::VerbNotImplemented {
            verb: "mutate".to_string(),
            type_key: "vector".to_string(),
        };
        assert!(err.to_string().contains("'mutate'"));
        assert!(err.to_string().contains("vector"));
        assert!(err.is_dispatch_error());
    }

    #[test]
    fn test_backend_error_is_transparent() {
        let err = PlyrError::backend("division by zero in kernel");
        assert_eq!(err.to_string(), "division by zero in kernel");
        assert!(!err.is_dispatch_error());
    }
}
