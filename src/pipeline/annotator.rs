//! The annotator facade
//!
//! [`ParserAnnotator`] is the stage the pipeline scheduler sees: it
//! advertises its input requirements and output guarantees through the
//! [`Annotator`] contract and dispatches per-sentence processing through
//! the invoker, the fallback synthesizer, and the post-processor.

use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::{debug, warn};

use crate::engine::{CancelToken, OracleLoader, ParseOracle};
use crate::graph::{DependencyConverter, DependencyStyle, ExtraDependencies};
use crate::pipeline::config::{ParserConfig, Properties};
use crate::pipeline::errors::{ConfigError, StructuralError};
use crate::pipeline::fallback::synthesize_fallback;
use crate::pipeline::invoker::{ParseInvoker, ParseOutcome};
use crate::pipeline::postprocess::TreePostProcessor;
use crate::tree::transform::TreeTransform;
use crate::types::{Sentence, FALLBACK_TREE_LABEL};

/// Annotation capabilities a stage can require from upstream stages or
/// guarantee to downstream ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Sentence container produced by the splitter
    Sentences,
    /// Token sequence on every sentence
    Tokens,
    /// Raw sentence text
    Text,
    /// Part-of-speech tags on every token
    PosTags,
    /// Parse tree annotation
    ParseTree,
    /// Binarized parse tree annotation
    BinarizedTree,
    /// Basic dependency graph annotation
    BasicDependencies,
    /// Enhanced/CC-processed dependency graph annotation
    EnhancedDependencies,
}

/// The stage contract declared to the pipeline scheduler.
///
/// Implementations are shared across worker threads; `annotate` takes
/// `&self` and may run concurrently on independent sentences.
pub trait Annotator: Send + Sync {
    /// Annotations this stage needs present before it runs.
    fn requires(&self) -> FxHashSet<Capability>;

    /// Annotations this stage guarantees after it runs.
    fn satisfies(&self) -> FxHashSet<Capability>;

    /// Stage-level processing bound; zero means unbounded. Distinct from
    /// any per-sentence budget the stage applies internally.
    fn max_time(&self) -> Duration {
        Duration::ZERO
    }

    /// Worker-thread count declared for scheduler planning.
    fn nthreads(&self) -> usize {
        1
    }

    /// Annotate one sentence in place.
    fn annotate(&self, sentence: &mut Sentence) -> Result<(), StructuralError>;
}

/// The parse-and-repair annotation stage.
///
/// Callers never see an error for ordinary parse failure: every sentence
/// leaves with a tree annotation (or an explicitly absent one when a
/// configured transform discards the parse). Only structural errors from
/// post-processing propagate.
pub struct ParserAnnotator {
    config: ParserConfig,
    oracle: Arc<dyn ParseOracle>,
    converter: Option<Arc<dyn DependencyConverter>>,
    build_graphs: bool,
    style: DependencyStyle,
    cancel: CancelToken,
}

impl std::fmt::Debug for ParserAnnotator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParserAnnotator")
            .field("config", &self.config)
            .field("build_graphs", &self.build_graphs)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl ParserAnnotator {
    /// Build the stage from named properties, loading the model through
    /// `loader`. Model-loading failure is fatal.
    pub fn from_properties(
        prefix: &str,
        props: &Properties,
        loader: &dyn OracleLoader,
    ) -> Result<Self, ConfigError> {
        let config = ParserConfig::from_properties(prefix, props)?;
        let oracle = loader.load(&config.model, &config.flags)?;
        Ok(Self::from_config(config, oracle, None))
    }

    /// Build the stage from an already-resolved configuration and oracle.
    ///
    /// The configuration's engine-default options (`buildgraphs`,
    /// `originalDependencies`) are resolved against the oracle here.
    pub fn from_config(
        config: ParserConfig,
        oracle: Arc<dyn ParseOracle>,
        converter: Option<Arc<dyn DependencyConverter>>,
    ) -> Self {
        let wants_graphs = config
            .build_graphs
            .unwrap_or_else(|| oracle.supports_dependencies());
        if wants_graphs && converter.is_none() {
            warn!("dependency graphs requested but no converter supplied, graphs disabled");
        }
        let build_graphs = wants_graphs && converter.is_some();
        let original = config
            .original_dependencies
            .unwrap_or_else(|| oracle.original_dependencies_default());
        let style = if original {
            DependencyStyle::Original
        } else {
            DependencyStyle::Enhanced
        };
        Self {
            config,
            oracle,
            converter,
            build_graphs,
            style,
            cancel: CancelToken::new(),
        }
    }

    /// Start building a stage with explicit parts.
    pub fn builder() -> ParserAnnotatorBuilder {
        ParserAnnotatorBuilder::new()
    }

    /// The resolved, immutable configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// The ambient cancellation token; cancelling it makes in-flight and
    /// future parse attempts fall back.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Annotate a batch of independent sentences, using up to the
    /// configured `nthreads` rayon workers.
    pub fn annotate_all(&self, sentences: &mut [Sentence]) -> Result<(), StructuralError> {
        if self.config.nthreads <= 1 {
            for sentence in sentences.iter_mut() {
                self.annotate(sentence)?;
            }
            return Ok(());
        }
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.nthreads)
            .build()
        {
            Ok(pool) => pool.install(|| {
                sentences
                    .par_iter_mut()
                    .try_for_each(|sentence| self.annotate(sentence))
            }),
            Err(error) => {
                warn!(%error, "could not build scoped thread pool, using global pool");
                sentences
                    .par_iter_mut()
                    .try_for_each(|sentence| self.annotate(sentence))
            }
        }
    }
}

impl Annotator for ParserAnnotator {
    fn requires(&self) -> FxHashSet<Capability> {
        let mut set: FxHashSet<Capability> =
            [Capability::Sentences, Capability::Tokens, Capability::Text]
                .into_iter()
                .collect();
        if self.oracle.requires_tags() {
            set.insert(Capability::PosTags);
        }
        set
    }

    fn satisfies(&self) -> FxHashSet<Capability> {
        let mut set: FxHashSet<Capability> = [Capability::ParseTree].into_iter().collect();
        if self.config.save_binarized {
            set.insert(Capability::BinarizedTree);
        }
        if self.build_graphs {
            set.insert(Capability::BasicDependencies);
            if self.config.extra_dependencies != ExtraDependencies::None {
                set.insert(Capability::EnhancedDependencies);
            }
        }
        set
    }

    fn nthreads(&self) -> usize {
        self.config.nthreads
    }

    fn annotate(&self, sentence: &mut Sentence) -> Result<(), StructuralError> {
        // Squash suppression short-circuits before any oracle work; the
        // post-processor applies the same rule for direct callers.
        if self.config.no_squash {
            if let Some(tree) = &sentence.tree {
                if tree.label != FALLBACK_TREE_LABEL {
                    return Ok(());
                }
            }
        }

        let invoker = ParseInvoker::new(&self.config, self.oracle.as_ref());
        let outcome = invoker.invoke(&sentence.tokens, &sentence.constraints, &self.cancel);
        let candidates = match outcome {
            ParseOutcome::Success(trees) => trees,
            ParseOutcome::Empty | ParseOutcome::Failed(_) => {
                vec![synthesize_fallback(&mut sentence.tokens, true)]
            }
        };

        let post = TreePostProcessor::new(
            &self.config,
            self.converter.as_deref(),
            self.build_graphs,
            self.style,
        );
        post.process(sentence, candidates)?;

        if self.config.debug {
            match &sentence.tree {
                Some(tree) => debug!(%tree, "committed parse tree"),
                None => debug!("committed absent parse tree"),
            }
        }
        Ok(())
    }
}

/// Fluent builder for a [`ParserAnnotator`] with explicitly injected
/// parts — the construction path embedding code and tests use instead of
/// property resolution.
pub struct ParserAnnotatorBuilder {
    config: ParserConfig,
    oracle: Option<Arc<dyn ParseOracle>>,
    converter: Option<Arc<dyn DependencyConverter>>,
}

impl ParserAnnotatorBuilder {
    /// Start from an inline default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::new("inline"),
            oracle: None,
            converter: None,
        }
    }

    /// Replace the configuration.
    pub fn config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Supply the parse oracle (required).
    pub fn oracle(mut self, oracle: Arc<dyn ParseOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    /// Supply the grammatical-structure converter.
    pub fn converter(mut self, converter: Arc<dyn DependencyConverter>) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Supply a tree transform, superseding any registry-resolved one.
    pub fn tree_map(mut self, transform: Arc<dyn TreeTransform>) -> Self {
        self.config.tree_map = Some(transform);
        self
    }

    /// Finish construction. Fails if no oracle was supplied.
    pub fn build(self) -> Result<ParserAnnotator, ConfigError> {
        let oracle = self.oracle.ok_or(ConfigError::MissingOracle)?;
        Ok(ParserAnnotator::from_config(
            self.config,
            oracle,
            self.converter,
        ))
    }
}

impl Default for ParserAnnotatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
