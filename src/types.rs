//! Core sentence-level data types
//!
//! This module provides the sentence container that flows through the
//! annotation pipeline: tokens with mutable part-of-speech tags, advisory
//! parse constraints, and the annotation slots written by the parse stage.

use crate::graph::DependencyGraph;
use crate::tree::Tree;

/// Root label of the degenerate tree synthesized when no trustworthy parse
/// exists.
pub const FALLBACK_TREE_LABEL: &str = "X";

/// Sentinel part-of-speech tag written by the fallback path.
pub const FALLBACK_POS_TAG: &str = "XX";

/// A single token within a sentence.
///
/// Tokens are owned by their sentence and mutated in place: the fallback
/// path may overwrite the tag with [`FALLBACK_POS_TAG`]. After the stage
/// completes, every token in a processed sentence carries a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Surface word form
    pub word: String,
    /// Part-of-speech tag; `None` until a tagger (or the fallback) sets it
    pub tag: Option<String>,
    /// Position of this token within its sentence
    pub index: usize,
}

impl Token {
    /// Create an untagged token.
    pub fn new(word: impl Into<String>, index: usize) -> Self {
        Self {
            word: word.into(),
            tag: None,
            index,
        }
    }

    /// Attach a part-of-speech tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }
}

/// An advisory span-label constraint passed through to the parse oracle.
///
/// Constraints are hints; the invoker never validates or rejects them, and
/// any error the oracle raises while incorporating one is treated like any
/// other engine failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseConstraint {
    /// Start token index (inclusive)
    pub start: usize,
    /// End token index (exclusive)
    pub end: usize,
    /// Label the spanning node is required to carry
    pub label: String,
}

impl ParseConstraint {
    /// Create a new span constraint.
    pub fn new(start: usize, end: usize, label: impl Into<String>) -> Self {
        Self {
            start,
            end,
            label: label.into(),
        }
    }
}

/// A sentence flowing through the annotation pipeline.
///
/// Created upstream with tokens populated; mutated exactly once per
/// pipeline pass by the parse stage, which commits the tree annotation
/// (and optionally the binarized tree and dependency graph).
#[derive(Debug, Clone, Default)]
pub struct Sentence {
    /// Raw sentence text
    pub text: String,
    /// Ordered token sequence
    pub tokens: Vec<Token>,
    /// Sentence position within the document, assigned upstream; may be
    /// absent when the sentence was constructed outside a document
    pub index: Option<usize>,
    /// Advisory parse constraints for this sentence
    pub constraints: Vec<ParseConstraint>,
    /// Parse tree annotation
    pub tree: Option<Tree>,
    /// Binarized parse tree annotation
    pub binary_tree: Option<Tree>,
    /// Dependency graph annotation
    pub dependencies: Option<DependencyGraph>,
}

impl Sentence {
    /// Create a sentence from raw text and tokens.
    pub fn new(text: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            text: text.into(),
            tokens,
            ..Self::default()
        }
    }

    /// Set the document-level sentence index.
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Attach advisory parse constraints.
    pub fn with_constraints(mut self, constraints: Vec<ParseConstraint>) -> Self {
        self.constraints = constraints;
        self
    }

    /// Number of tokens in the sentence.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the sentence has no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
