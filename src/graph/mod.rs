//! Dependency graph representation and the converter boundary
//!
//! A [`DependencyGraph`] is derived structurally from a parse tree by an
//! external grammatical-structure converter, consumed here as an opaque
//! [`DependencyConverter`]. The post-processor owns the repair step that
//! stamps every vertex with the owning sentence's index.

use serde::Serialize;

use crate::pipeline::errors::StructuralError;
use crate::tree::Tree;
use crate::types::Token;

/// Legacy vs. enhanced dependency semantics, selected by the
/// `originalDependencies` property (engine-default when unset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyStyle {
    /// Original (legacy) dependency semantics
    Original,
    /// Enhanced dependency semantics
    Enhanced,
}

/// Extra-dependency selector for the converter.
///
/// Unrecognized property values fail soft to [`ExtraDependencies::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraDependencies {
    /// No extra dependencies
    #[default]
    None,
    /// Only reference (relative-clause) extras
    RefOnly,
    /// Only controlled/raised-subject extras
    SubjOnly,
    /// Every extra dependency the converter can produce
    Maximal,
}

impl ExtraDependencies {
    /// Parse a property value, case-insensitively. Returns `None` for
    /// unrecognized values so the caller can fail soft.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "ref_only" | "refonly" => Some(Self::RefOnly),
            "subj_only" | "subjonly" => Some(Self::SubjOnly),
            "maximal" => Some(Self::Maximal),
            _ => None,
        }
    }

    /// Lower-case name used in signatures and display output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::RefOnly => "ref_only",
            Self::SubjOnly => "subj_only",
            Self::Maximal => "maximal",
        }
    }
}

/// Options handed to the converter for one derivation.
#[derive(Debug, Clone, Copy)]
pub struct ConvertOptions {
    /// Legacy vs. enhanced semantics
    pub style: DependencyStyle,
    /// Extra-dependency selection
    pub extras: ExtraDependencies,
    /// When `false`, tokens matching [`is_punctuation_tag`] are dropped
    /// from the graph
    pub keep_punctuation: bool,
}

/// A vertex: a back-reference to a token, augmented with the owning
/// sentence's index.
///
/// Vertices may be constructed from tokens that do not yet carry a correct
/// sentence index; the post-processor stamps the final value onto every
/// vertex before commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyVertex {
    /// Index of the backing token within its sentence
    pub token_index: usize,
    /// Surface word of the backing token
    pub word: String,
    /// Part-of-speech tag of the backing token
    pub tag: Option<String>,
    /// Index of the owning sentence; absent until stamped
    pub sentence_index: Option<usize>,
}

impl DependencyVertex {
    /// Create a vertex backed by `token`, with no sentence index yet.
    pub fn from_token(token: &Token) -> Self {
        Self {
            token_index: token.index,
            word: token.word.clone(),
            tag: token.tag.clone(),
            sentence_index: None,
        }
    }
}

/// A labeled directed edge between two vertices, by position in the
/// graph's vertex list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    /// Governor vertex position
    pub governor: usize,
    /// Dependent vertex position
    pub dependent: usize,
    /// Grammatical relation label
    pub relation: String,
}

/// A dependency graph derived from a parse tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DependencyGraph {
    /// Graph vertices
    pub vertices: Vec<DependencyVertex>,
    /// Labeled directed edges
    pub edges: Vec<DependencyEdge>,
    /// Root vertex position, if the converter designated one
    pub root: Option<usize>,
}

impl DependencyGraph {
    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Overwrite every vertex's sentence index with `index`.
    ///
    /// Stale or absent indices left by vertex construction are repaired
    /// here; after this call every vertex carries `Some(index)`.
    pub fn stamp_sentence_index(&mut self, index: usize) {
        for vertex in &mut self.vertices {
            vertex.sentence_index = Some(index);
        }
    }
}

/// Returns `true` for PTB-style punctuation tags.
pub fn is_punctuation_tag(tag: &str) -> bool {
    matches!(
        tag,
        "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" | "NFP" | "SYM" | "$" | "#"
    )
}

/// The external grammatical-structure converter boundary.
///
/// Accepts a tree, the backing tokens, and derivation options; returns a
/// dependency graph. Structural failures propagate — by the time the
/// converter runs, resource and engine failures have already been absorbed
/// upstream, so an error here indicates an invariant violation.
pub trait DependencyConverter: Send + Sync {
    /// Derive a dependency graph from `tree`.
    fn derive(
        &self,
        tree: &Tree,
        tokens: &[Token],
        options: &ConvertOptions,
    ) -> Result<DependencyGraph, StructuralError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extra_dependencies_parse_case_insensitive() {
        assert_eq!(
            ExtraDependencies::from_name("MAXIMAL"),
            Some(ExtraDependencies::Maximal)
        );
        assert_eq!(
            ExtraDependencies::from_name("ref_only"),
            Some(ExtraDependencies::RefOnly)
        );
        assert_eq!(ExtraDependencies::from_name("bogus"), None);
    }

    #[test]
    fn test_extra_dependencies_round_trip_names() {
        for extras in [
            ExtraDependencies::None,
            ExtraDependencies::RefOnly,
            ExtraDependencies::SubjOnly,
            ExtraDependencies::Maximal,
        ] {
            assert_eq!(ExtraDependencies::from_name(extras.as_str()), Some(extras));
        }
    }

    #[test]
    fn test_vertex_from_token_has_no_sentence_index() {
        let token = Token::new("dog", 2).with_tag("NN");
        let vertex = DependencyVertex::from_token(&token);
        assert_eq!(vertex.token_index, 2);
        assert_eq!(vertex.word, "dog");
        assert!(vertex.sentence_index.is_none());
    }

    #[test]
    fn test_stamp_overwrites_every_vertex() {
        let mut graph = DependencyGraph {
            vertices: vec![
                DependencyVertex::from_token(&Token::new("a", 0)),
                DependencyVertex {
                    token_index: 1,
                    word: "b".into(),
                    tag: None,
                    sentence_index: Some(99), // stale
                },
            ],
            edges: vec![],
            root: None,
        };
        graph.stamp_sentence_index(4);
        assert!(graph
            .vertices
            .iter()
            .all(|v| v.sentence_index == Some(4)));
    }

    #[test]
    fn test_punctuation_tags() {
        assert!(is_punctuation_tag("."));
        assert!(is_punctuation_tag(","));
        assert!(is_punctuation_tag("-LRB-"));
        assert!(!is_punctuation_tag("NN"));
        assert!(!is_punctuation_tag("XX"));
    }

    #[test]
    fn test_style_serializes_snake_case() {
        let json = serde_json::to_string(&DependencyStyle::Enhanced).unwrap();
        assert_eq!(json, "\"enhanced\"");
        let json = serde_json::to_string(&ExtraDependencies::RefOnly).unwrap();
        assert_eq!(json, "\"ref_only\"");
    }
}
