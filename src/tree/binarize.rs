//! Right-factored tree binarization
//!
//! Rewrites nodes with more than two children into a right-leaning chain of
//! intermediate nodes so every internal node has at most two children. The
//! intermediate nodes are labeled `@LABEL` after the node they factor.

use super::Tree;

/// Binarize `tree` with right factoring.
///
/// Nodes with at most two children keep their shape; a node with children
/// `c1 .. cn` (n > 2) becomes `(LABEL c1 (@LABEL c2 (@LABEL ... cn)))`.
/// Leaf order and identity are preserved, and an already-binary tree comes
/// back structurally unchanged.
pub fn binarize(tree: &Tree) -> Tree {
    if tree.is_leaf() {
        return tree.clone();
    }

    let children: Vec<Tree> = tree.children.iter().map(binarize).collect();
    let factored = factor(&tree.label, children);
    Tree {
        label: tree.label.clone(),
        children: factored,
        score: tree.score,
    }
}

/// Reduce `children` to at most two, chaining the tail under `@label`
/// nodes.
fn factor(label: &str, mut children: Vec<Tree>) -> Vec<Tree> {
    if children.len() <= 2 {
        return children;
    }
    let head = children.remove(0);
    let tail = Tree {
        label: format!("@{label}"),
        children: factor(label, children),
        score: None,
    };
    vec![head, tail]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(tree: &Tree) -> Vec<String> {
        tree.leaves().iter().map(|l| l.label.clone()).collect()
    }

    #[test]
    fn test_leaf_unchanged() {
        let leaf = Tree::leaf("dog");
        assert_eq!(binarize(&leaf), leaf);
    }

    #[test]
    fn test_binary_tree_unchanged() {
        let tree = Tree::internal(
            "S",
            vec![
                Tree::internal("NP", vec![Tree::leaf("the"), Tree::leaf("dog")]),
                Tree::internal("VP", vec![Tree::leaf("barks")]),
            ],
        );
        assert_eq!(binarize(&tree), tree);
    }

    #[test]
    fn test_ternary_node_is_factored() {
        let tree = Tree::internal(
            "NP",
            vec![Tree::leaf("the"), Tree::leaf("big"), Tree::leaf("dog")],
        );
        let bin = binarize(&tree);
        assert_eq!(bin.to_string(), "(NP the (@NP big dog))");
    }

    #[test]
    fn test_wide_node_chains_right() {
        let tree = Tree::internal(
            "X",
            vec![
                Tree::leaf("a"),
                Tree::leaf("b"),
                Tree::leaf("c"),
                Tree::leaf("d"),
            ],
        );
        let bin = binarize(&tree);
        assert_eq!(bin.to_string(), "(X a (@X b (@X c d)))");
    }

    #[test]
    fn test_every_node_has_at_most_two_children() {
        let tree = Tree::internal(
            "S",
            vec![
                Tree::internal(
                    "NP",
                    vec![
                        Tree::leaf("the"),
                        Tree::leaf("big"),
                        Tree::leaf("brown"),
                        Tree::leaf("dog"),
                    ],
                ),
                Tree::leaf("barked"),
                Tree::leaf("."),
            ],
        );
        let bin = binarize(&tree);
        assert!(bin.preorder().iter().all(|n| n.children.len() <= 2));
    }

    #[test]
    fn test_leaf_order_preserved() {
        let tree = Tree::internal(
            "S",
            vec![
                Tree::leaf("a"),
                Tree::internal("Y", vec![Tree::leaf("b"), Tree::leaf("c"), Tree::leaf("d")]),
                Tree::leaf("e"),
            ],
        );
        assert_eq!(words(&binarize(&tree)), words(&tree));
    }

    #[test]
    fn test_root_score_preserved() {
        let tree = Tree::internal(
            "S",
            vec![Tree::leaf("a"), Tree::leaf("b"), Tree::leaf("c")],
        )
        .with_score(-2.0);
        assert_eq!(binarize(&tree).score, Some(-2.0));
    }
}
