//! The parse-oracle boundary
//!
//! The grammar engine that scores and searches candidate parses is an
//! external collaborator. This module defines the single-entry
//! [`ParseOracle`] trait it is consumed through, the closed set of failure
//! conditions it may raise, and the cooperative cancellation primitive the
//! invoker shares with it.
//!
//! # Contract
//!
//! - **Input**: tokens, advisory constraints, a k-best width, an optional
//!   deadline, and a cancel token.
//! - **Output**: a ranked candidate list (first-ranked is primary). A
//!   single-best request (`k <= 1`) returns at most one entry. Entries may
//!   be absent — the invoker filters them.
//! - **Failure**: one of the [`EngineError`] variants. The oracle never
//!   decides retry or fallback; the invoker owns those.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;

use crate::pipeline::errors::ConfigError;
use crate::tree::Tree;
use crate::types::{ParseConstraint, Token};

/// Failure conditions the oracle may raise, matched exhaustively by the
/// invoker. None of these propagate past the invoker.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Catastrophic memory pressure inside the engine
    #[error("engine exhausted available memory")]
    Exhausted,
    /// The calling thread was asked to stop mid-attempt
    #[error("parse attempt was interrupted")]
    Interrupted,
    /// Any other engine failure, including constraint-handling errors
    #[error("engine failure: {0}")]
    Failed(String),
}

/// Cooperative cancellation flag shared between the scheduler, the
/// invoker, and the oracle.
///
/// Cloning is cheap; all clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. All holders of this token observe it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Returns `true` once cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// One parse attempt's inputs.
#[derive(Debug)]
pub struct ParseRequest<'a> {
    /// Token sequence to parse
    pub tokens: &'a [Token],
    /// Advisory span constraints; never validated by the invoker
    pub constraints: &'a [ParseConstraint],
    /// Number of ranked candidates requested; 1 means single-best
    pub k: usize,
    /// Deadline the oracle must observe, derived from the per-sentence
    /// time budget; `None` means unbounded
    pub deadline: Option<Instant>,
    /// Cooperative cancellation signal the oracle must observe
    pub cancel: CancelToken,
}

/// The external parse-search/scoring engine, treated as opaque.
///
/// Implementations must be `Send + Sync`: one oracle instance serves all
/// worker threads.
pub trait ParseOracle: Send + Sync {
    /// Attempt one parse. Returns the ranked candidates (possibly empty,
    /// possibly containing absent entries), or a failure condition.
    fn parse(&self, request: &ParseRequest<'_>) -> Result<Vec<Option<Tree>>, EngineError>;

    /// Whether the engine needs part-of-speech tags on its input tokens.
    fn requires_tags(&self) -> bool {
        true
    }

    /// Whether the engine's grammar supports dependency derivation; used
    /// as the default for the `buildgraphs` property.
    fn supports_dependencies(&self) -> bool {
        true
    }

    /// Default for the `originalDependencies` property: `true` selects
    /// legacy dependency semantics.
    fn original_dependencies_default(&self) -> bool {
        false
    }
}

/// The external model loader: turns a model identity and start-up flags
/// into a ready-to-query oracle.
///
/// Loading failure is fatal at construction time — the stage cannot be
/// built without a model.
pub trait OracleLoader {
    /// Load the model named by `model` with the given start-up flags.
    fn load(&self, model: &str, flags: &[String]) -> Result<Arc<dyn ParseOracle>, ConfigError>;
}
