//! Parse tree representation and structural transforms
//!
//! This module provides the recursive labeled tree produced by the parse
//! stage, along with the deterministic transforms applied during
//! post-processing: height flattening and binarization.

pub mod binarize;
pub mod flatten;
pub mod transform;

use std::fmt;

/// A recursive labeled parse tree node.
///
/// A node with no children is a leaf (a surface word); an internal node
/// carries an ordered, non-empty sequence of children. A numeric score may
/// be attached by the parse oracle; absence of a score is valid and must
/// not be treated as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    /// Node label: a category for internal nodes, a word for leaves
    pub label: String,
    /// Ordered children; empty for leaves
    pub children: Vec<Tree>,
    /// Optional parse score attached by the oracle
    pub score: Option<f64>,
}

impl Tree {
    /// Create a leaf node.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            score: None,
        }
    }

    /// Create an internal node with the given children.
    pub fn internal(label: impl Into<String>, children: Vec<Tree>) -> Self {
        debug_assert!(
            !children.is_empty(),
            "internal nodes carry at least one child"
        );
        Self {
            label: label.into(),
            children,
            score: None,
        }
    }

    /// Attach a score to this node.
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Returns `true` if this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth of the tree: 1 for a leaf, 1 + the deepest child otherwise.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(Tree::depth)
            .max()
            .unwrap_or(0)
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&Tree> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Tree>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in &self.children {
                child.collect_leaves(out);
            }
        }
    }

    /// Number of leaves under this node.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            1
        } else {
            self.children.iter().map(Tree::leaf_count).sum()
        }
    }

    /// Preorder traversal over all nodes.
    pub fn preorder(&self) -> Vec<&Tree> {
        let mut out = Vec::new();
        self.collect_preorder(&mut out);
        out
    }

    fn collect_preorder<'a>(&'a self, out: &mut Vec<&'a Tree>) {
        out.push(self);
        for child in &self.children {
            child.collect_preorder(out);
        }
    }
}

/// Penn-style bracketed rendering: leaves print bare, internal nodes as
/// `(LABEL child ...)`.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_leaf() {
            return write!(f, "{}", self.label);
        }
        write!(f, "({}", self.label)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}
