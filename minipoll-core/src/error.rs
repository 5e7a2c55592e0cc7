//! Error types for the Minipoll core library.
//!
//! Ordinary gameplay input never produces an error: numeric setters clamp,
//! unknown keys read as defaults and empty identifiers are ignored. Errors
//! are reserved for configuration and wiring mistakes that should surface
//! when an agent or population is constructed.

use thiserror::Error;

/// Top-level error type for all Minipoll operations.
#[derive(Error, Debug)]
pub enum MinipollError {
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration value parsed but is outside its legal range.
    #[error("Invalid tuning value for {field}: {value} ({reason})")]
    InvalidTuning {
        /// Dotted path of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
        /// What the value must satisfy.
        reason: &'static str,
    },

    /// No agent with the given ID exists in the population.
    #[error("Agent not found: {0}")]
    UnknownAgent(crate::AgentId),

    /// A required collaborator was never supplied to a builder.
    #[error("Missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, MinipollError>;
