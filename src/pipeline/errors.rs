//! Error taxonomy for the annotation stage
//!
//! Only two classes of failure ever cross this crate's public boundary:
//! fatal construction errors ([`ConfigError`]) and structural invariant
//! violations during post-processing ([`StructuralError`]). Resource-gate
//! and engine failures are absorbed by the invoker and surface only as a
//! fallback tree plus a tracing event.

use thiserror::Error;

/// Fatal construction-time errors. Never recovered: the stage cannot be
/// built without a valid configuration and a loaded model.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The required model identity property is absent or blank
    #[error("missing required property \"{0}.model\"")]
    MissingModel(String),

    /// The model loader could not produce an oracle
    #[error("failed to load model \"{model}\": {reason}")]
    ModelLoad {
        /// Model identity that failed to load
        model: String,
        /// Loader-supplied reason
        reason: String,
    },

    /// Builder construction finished without a parse oracle
    #[error("no parse oracle supplied")]
    MissingOracle,
}

/// Structural errors during post-processing: malformed trees or converter
/// failures. These indicate invariant violations rather than expected
/// operational conditions, so they propagate to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StructuralError {
    /// The working tree violated a structural invariant
    #[error("malformed tree: {0}")]
    MalformedTree(String),

    /// The grammatical-structure converter failed
    #[error("dependency conversion failed: {0}")]
    Conversion(String),
}
