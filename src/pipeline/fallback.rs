//! Fallback tree synthesis
//!
//! The last-resort guarantee of the stage: when no trustworthy parse
//! exists, every sentence still leaves with a structurally valid tree.

use crate::tree::Tree;
use crate::types::{Token, FALLBACK_POS_TAG, FALLBACK_TREE_LABEL};

/// Synthesize the canonical degenerate tree for `tokens`.
///
/// The result is rooted at the sentinel `X` with exactly one leaf per
/// token in original order (zero leaves for an empty sentence). As a side
/// effect, token tags are repaired to the sentinel `XX`: unconditionally
/// when `reset_tags` is set — the standard path after a failed or gated
/// parse, whose tags cannot be trusted — otherwise only where a tag is
/// missing.
///
/// This function never fails.
pub fn synthesize_fallback(tokens: &mut [Token], reset_tags: bool) -> Tree {
    for token in tokens.iter_mut() {
        if reset_tags || token.tag.is_none() {
            token.tag = Some(FALLBACK_POS_TAG.to_string());
        }
    }
    Tree {
        label: FALLBACK_TREE_LABEL.to_string(),
        children: tokens.iter().map(|t| Tree::leaf(t.word.clone())).collect(),
        score: None,
    }
}
