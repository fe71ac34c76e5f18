// SPDX-License-Identifier: MIT

//! Typed error handling for ruleflow-rs
//!
//! Every failure raised while evaluating or running a workflow is an
//! `EngineError`. Batch operations on the factory catch these per workflow
//! and log them; nothing above a batch boundary sees them.

use std::any::Any;
use std::fmt;
use thiserror::Error;

use super::dispatch::ActionError;

/// Top-level error type for ruleflow-rs
#[derive(Debug, Error)]
pub enum EngineError {
    /// A rule line references a (property, kind) pair with no registered behavior
    #[error("No {table} method registered for property {property} with kind {kind}")]
    DispatchLookup {
        table: DispatchKind,
        property: String,
        kind: String,
    },

    /// A host action reported a failure
    #[error("Activity {kind} on property {property} failed: {source}")]
    Activity {
        property: String,
        kind: String,
        #[source]
        source: ActionError,
    },

    /// Malformed rule data or context assignment
    #[error("Structural violation: {0}")]
    Structure(#[from] StructuralError),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A background parsing task panicked or was cancelled
    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Host behavior panicked while a workflow was checked or run
    #[error("Workflow panicked: {0}")]
    Panicked(String),
}

/// Which dispatch table a lookup went to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Eligibility,
    Activity,
}

impl fmt::Display for DispatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchKind::Eligibility => write!(f, "eligibility"),
            DispatchKind::Activity => write!(f, "activity"),
        }
    }
}

/// Rule data or context that cannot be evaluated as given
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// An eligibility sequence (top level or group) has no lines
    #[error("eligibility sequence is empty")]
    EmptySequence,

    /// A line carries both condition fields and a group
    #[error("eligibility line {index} has both a condition and a group")]
    AmbiguousNode { index: usize },

    /// A line has no group and is missing its property or kind
    #[error("eligibility line {index} is missing its property or kind")]
    IncompleteCondition { index: usize },

    /// Wrong number of context objects for the workflow type
    #[error("context expects {expected} object(s), got {actual}")]
    ContextArity { expected: usize, actual: usize },

    /// A context object has the wrong type for its position
    #[error("context slot {slot} is not a {expected}")]
    ContextType { slot: usize, expected: &'static str },

    /// Evaluation or run attempted before any context was assigned
    #[error("no context assigned")]
    ContextUnset,
}

impl EngineError {
    /// Create a dispatch lookup error
    pub fn dispatch_lookup(
        table: DispatchKind,
        property: &impl fmt::Debug,
        kind: &impl fmt::Debug,
    ) -> Self {
        Self::DispatchLookup {
            table,
            property: format!("{:?}", property),
            kind: format!("{:?}", kind),
        }
    }

    /// Create an activity failure
    pub fn activity(property: &impl fmt::Debug, kind: &impl fmt::Debug, source: ActionError) -> Self {
        Self::Activity {
            property: format!("{:?}", property),
            kind: format!("{:?}", kind),
            source,
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Convert a caught panic payload, keeping its message when it has one
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(message) => *message,
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(message) => message.to_string(),
                Err(_) => "non-string panic payload".to_string(),
            },
        };
        Self::Panicked(message)
    }

    /// Whether this is a missing dispatch entry
    pub fn is_dispatch_lookup(&self) -> bool {
        matches!(self, Self::DispatchLookup { .. })
    }
}
