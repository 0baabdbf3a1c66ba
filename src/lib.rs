//! treegate — resource-bounded constituency parse annotation
//!
//! A pipeline annotation stage that turns a tokenized, POS-tagged
//! sentence into a validated parse tree (and derived dependency graph)
//! under strict resource bounds, with guaranteed forward progress: when
//! the grammar engine fails, times out, is interrupted, or the sentence
//! is gated away as oversized, the stage synthesizes a canonical fallback
//! tree instead of surfacing an error.
//!
//! The grammar engine itself is an external collaborator consumed through
//! the [`engine::ParseOracle`] trait; dependency extraction likewise
//! through [`graph::DependencyConverter`].
//!
//! # Quick start
//!
//! ```rust,ignore
//! use treegate::{ParserAnnotator, Properties};
//!
//! let mut props = Properties::default();
//! props.insert("parse.model".into(), "english.gz".into());
//! props.insert("parse.maxlen".into(), "80".into());
//!
//! let stage = ParserAnnotator::from_properties("parse", &props, &loader)?;
//! stage.annotate_all(&mut sentences)?;
//! ```

pub mod engine;
pub mod graph;
pub mod pipeline;
pub mod tree;
pub mod types;

pub use pipeline::annotator::{Annotator, Capability, ParserAnnotator, ParserAnnotatorBuilder};
pub use pipeline::config::{signature, ParserConfig, Properties};
pub use pipeline::errors::{ConfigError, StructuralError};
pub use pipeline::invoker::{FailureKind, ParseOutcome};
pub use tree::Tree;
pub use types::{ParseConstraint, Sentence, Token};
