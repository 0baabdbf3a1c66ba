//! Height-based tree flattening
//!
//! Collapses a tree's internal structure to respect a maximum depth bound
//! without changing its leaf sequence. Nodes are collapsed from the bottom:
//! an internal node that would exceed the budget is replaced by its leaf
//! fringe, spliced into its parent in order.

use super::Tree;

/// Flatten `tree` so its depth does not exceed `max_height`.
///
/// A `max_height` of 0 disables flattening entirely (no limit enforced).
/// The root label (and score) are preserved, leaf order and identity are
/// preserved, and flattening an already-compliant tree is a no-op clone.
///
/// An internal root plus its leaf fringe is already depth 2, so that is
/// the minimum achievable depth for a non-leaf tree.
pub fn flatten_to_height(tree: &Tree, max_height: usize) -> Tree {
    if max_height == 0 || tree.depth() <= max_height {
        return tree.clone();
    }
    if tree.is_leaf() {
        return tree.clone();
    }

    let mut children = Vec::with_capacity(tree.children.len());
    for child in &tree.children {
        clamp(child, max_height.saturating_sub(1), &mut children);
    }
    Tree {
        label: tree.label.clone(),
        children,
        score: tree.score,
    }
}

/// Append `node`, constrained to `budget` levels, onto `out`.
///
/// A node that cannot fit within the budget is replaced by its leaves.
fn clamp(node: &Tree, budget: usize, out: &mut Vec<Tree>) {
    if node.is_leaf() {
        out.push(node.clone());
        return;
    }
    if budget <= 1 {
        out.extend(node.leaves().into_iter().cloned());
        return;
    }
    let mut children = Vec::with_capacity(node.children.len());
    for child in &node.children {
        clamp(child, budget - 1, &mut children);
    }
    out.push(Tree {
        label: node.label.clone(),
        children,
        score: node.score,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A left-leaning chain: (A (B (C (D d1 d2) c2) b2) a2), depth 5.
    fn deep() -> Tree {
        Tree::internal(
            "A",
            vec![
                Tree::internal(
                    "B",
                    vec![
                        Tree::internal(
                            "C",
                            vec![
                                Tree::internal("D", vec![Tree::leaf("d1"), Tree::leaf("d2")]),
                                Tree::leaf("c2"),
                            ],
                        ),
                        Tree::leaf("b2"),
                    ],
                ),
                Tree::leaf("a2"),
            ],
        )
    }

    fn words(tree: &Tree) -> Vec<String> {
        tree.leaves().iter().map(|l| l.label.clone()).collect()
    }

    #[test]
    fn test_compliant_tree_is_untouched() {
        let tree = deep();
        let flat = flatten_to_height(&tree, 10);
        assert_eq!(flat, tree);
    }

    #[test]
    fn test_zero_disables_flattening() {
        let tree = deep();
        assert_eq!(flatten_to_height(&tree, 0), tree);
    }

    #[test]
    fn test_depth_bound_is_enforced() {
        let tree = deep();
        for max in 2..=5 {
            let flat = flatten_to_height(&tree, max);
            assert!(
                flat.depth() <= max,
                "depth {} exceeds max {}",
                flat.depth(),
                max
            );
        }
    }

    #[test]
    fn test_leaf_order_preserved() {
        let tree = deep();
        let before = words(&tree);
        for max in 2..=5 {
            assert_eq!(words(&flatten_to_height(&tree, max)), before);
        }
    }

    #[test]
    fn test_root_label_preserved() {
        let flat = flatten_to_height(&deep(), 2);
        assert_eq!(flat.label, "A");
    }

    #[test]
    fn test_flattening_is_idempotent() {
        let once = flatten_to_height(&deep(), 3);
        let twice = flatten_to_height(&once, 3);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_minimum_depth_is_root_plus_fringe() {
        let flat = flatten_to_height(&deep(), 2);
        assert_eq!(flat.depth(), 2);
        assert!(flat.children.iter().all(Tree::is_leaf));
        assert_eq!(words(&flat), vec!["d1", "d2", "c2", "b2", "a2"]);
    }

    #[test]
    fn test_leaf_is_untouched() {
        let leaf = Tree::leaf("only");
        assert_eq!(flatten_to_height(&leaf, 1), leaf);
    }

    #[test]
    fn test_root_score_preserved() {
        let tree = deep().with_score(-4.5);
        let flat = flatten_to_height(&tree, 2);
        assert_eq!(flat.score, Some(-4.5));
    }
}
