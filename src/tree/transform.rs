//! User-supplied tree transforms
//!
//! A [`TreeTransform`] rewrites the working tree between flattening and
//! commit. Returning `None` is a first-class "discard" signal: the final
//! tree annotation is cleared, not treated as an error.
//!
//! Transforms configured by name (the `treemap` property) are resolved
//! against a registry; unknown names leave the transform unset rather than
//! failing construction.

use std::sync::Arc;

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;

use super::Tree;

/// A tree rewrite applied at exactly one point during post-processing.
///
/// Implementations are stateless and shared across worker threads. Scores
/// attached to the input tree are not carried over unless the transform
/// itself copies them.
pub trait TreeTransform: Send + Sync {
    /// Stable name this transform is registered under.
    fn name(&self) -> &str;

    /// Rewrite `tree`, or return `None` to discard the parse entirely.
    fn apply(&self, tree: &Tree) -> Option<Tree>;
}

/// A [`TreeTransform`] backed by a plain function or closure.
pub struct FnTransform {
    name: String,
    func: Box<dyn Fn(&Tree) -> Option<Tree> + Send + Sync>,
}

impl FnTransform {
    /// Wrap a closure as a named transform.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&Tree) -> Option<Tree> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Box::new(func),
        }
    }
}

impl TreeTransform for FnTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, tree: &Tree) -> Option<Tree> {
        (self.func)(tree)
    }
}

/// Collapses unary chains: an internal node with a single internal child
/// is spliced out in favor of that child, keeping the topmost label.
pub struct CollapseUnary;

impl TreeTransform for CollapseUnary {
    fn name(&self) -> &str {
        "collapse_unary"
    }

    fn apply(&self, tree: &Tree) -> Option<Tree> {
        Some(collapse_unary(tree))
    }
}

fn collapse_unary(tree: &Tree) -> Tree {
    if tree.is_leaf() {
        return tree.clone();
    }
    // Walk down through single-internal-child links before recursing.
    let mut node = tree;
    while node.children.len() == 1 && !node.children[0].is_leaf() {
        node = &node.children[0];
    }
    Tree {
        label: tree.label.clone(),
        children: node.children.iter().map(collapse_unary).collect(),
        score: tree.score,
    }
}

/// Registry of named transforms used to resolve the `treemap` property.
pub struct TransformRegistry {
    transforms: FxHashMap<String, Arc<dyn TreeTransform>>,
}

impl TransformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            transforms: FxHashMap::default(),
        }
    }

    /// Register a transform under its own name.
    pub fn register(&mut self, transform: Arc<dyn TreeTransform>) {
        self.transforms
            .insert(transform.name().to_string(), transform);
    }

    /// Look up a transform by name.
    pub fn resolve(&self, name: &str) -> Option<Arc<dyn TreeTransform>> {
        self.transforms.get(name).cloned()
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The built-in transforms available to the `treemap` property.
pub fn builtin_registry() -> &'static TransformRegistry {
    static REGISTRY: Lazy<TransformRegistry> = Lazy::new(|| {
        let mut registry = TransformRegistry::new();
        registry.register(Arc::new(CollapseUnary));
        registry
    });
    &REGISTRY
}
