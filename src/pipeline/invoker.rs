//! Resource-gated parse invocation
//!
//! Per-sentence state machine: `Gate → Attempt → {Success, Empty,
//! Failed}`. The length gate is the single most important resource
//! protection in the stage — arbitrarily long sentences must never reach
//! the engine. Every engine failure class is absorbed here; nothing the
//! oracle raises propagates past this module.

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::engine::{CancelToken, EngineError, ParseOracle, ParseRequest};
use crate::pipeline::config::ParserConfig;
use crate::tree::Tree;
use crate::types::{ParseConstraint, Token};

/// Why an attempt failed; observability only — every kind routes to the
/// fallback synthesizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Sentence exceeded the configured length bound; no oracle call
    Oversized,
    /// Engine memory exhaustion
    Exhausted,
    /// Cooperative cancellation
    Interrupted,
    /// Any other engine failure
    Engine,
}

impl FailureKind {
    /// Stable name used in log events.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oversized => "oversized",
            Self::Exhausted => "exhausted",
            Self::Interrupted => "interrupted",
            Self::Engine => "engine",
        }
    }
}

/// Uniform classification of one parse attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    /// Ranked candidate trees, first-ranked primary; never empty
    Success(Vec<Tree>),
    /// The oracle produced no usable candidate
    Empty,
    /// The attempt was gated away or the engine failed
    Failed(FailureKind),
}

/// Invokes the parse oracle for one sentence under the configured
/// resource bounds.
pub struct ParseInvoker<'a> {
    config: &'a ParserConfig,
    oracle: &'a dyn ParseOracle,
}

impl<'a> ParseInvoker<'a> {
    /// Create an invoker over `config` and `oracle`.
    pub fn new(config: &'a ParserConfig, oracle: &'a dyn ParseOracle) -> Self {
        Self { config, oracle }
    }

    /// Run the gate and, if it passes, one parse attempt.
    ///
    /// The sentence's tokens are left exactly as they were regardless of
    /// outcome; tag repair belongs to the fallback path.
    pub fn invoke(
        &self,
        tokens: &[Token],
        constraints: &[ParseConstraint],
        cancel: &CancelToken,
    ) -> ParseOutcome {
        // Gate: oversized sentences never reach the engine.
        if self.config.max_len > 0 && tokens.len() as i64 > self.config.max_len {
            debug!(
                len = tokens.len(),
                max_len = self.config.max_len,
                "sentence exceeds length bound, skipping parse"
            );
            return ParseOutcome::Failed(FailureKind::Oversized);
        }

        if cancel.is_cancelled() {
            debug!("cancellation requested before parse attempt");
            return ParseOutcome::Failed(FailureKind::Interrupted);
        }

        let deadline = (self.config.max_time_ms > 0)
            .then(|| Instant::now() + Duration::from_millis(self.config.max_time_ms as u64));
        let request = ParseRequest {
            tokens,
            constraints,
            k: self.config.kbest.max(1),
            deadline,
            cancel: cancel.clone(),
        };

        match self.oracle.parse(&request) {
            Ok(candidates) => {
                let trees: Vec<Tree> = candidates.into_iter().flatten().collect();
                if trees.is_empty() {
                    debug!("oracle returned no usable candidate");
                    ParseOutcome::Empty
                } else {
                    ParseOutcome::Success(trees)
                }
            }
            Err(EngineError::Exhausted) => {
                warn!("engine exhausted memory during parse, falling back");
                ParseOutcome::Failed(FailureKind::Exhausted)
            }
            Err(EngineError::Interrupted) => {
                debug!("parse attempt interrupted, falling back");
                ParseOutcome::Failed(FailureKind::Interrupted)
            }
            Err(EngineError::Failed(reason)) => {
                warn!(%reason, "engine failure during parse, falling back");
                ParseOutcome::Failed(FailureKind::Engine)
            }
        }
    }
}
