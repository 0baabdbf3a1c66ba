//! Tree post-processing and annotation commit
//!
//! Applies the configured sequence of structural transforms to the
//! candidate trees and commits the final annotations onto the sentence.
//! Commit is the single all-or-nothing write point per sentence: nothing
//! is written until every fallible step has succeeded.

use tracing::debug;

use crate::graph::{ConvertOptions, DependencyConverter, DependencyStyle};
use crate::pipeline::config::ParserConfig;
use crate::pipeline::errors::StructuralError;
use crate::tree::binarize::binarize;
use crate::tree::flatten::flatten_to_height;
use crate::tree::Tree;
use crate::types::{Sentence, FALLBACK_TREE_LABEL};

/// Post-processes candidate trees for one sentence.
///
/// `build_graphs` and `style` are the facade-resolved values (the
/// configuration's engine-default options resolved against the oracle).
pub struct TreePostProcessor<'a> {
    config: &'a ParserConfig,
    converter: Option<&'a dyn DependencyConverter>,
    build_graphs: bool,
    style: DependencyStyle,
}

impl<'a> TreePostProcessor<'a> {
    /// Create a post-processor for one configuration.
    pub fn new(
        config: &'a ParserConfig,
        converter: Option<&'a dyn DependencyConverter>,
        build_graphs: bool,
        style: DependencyStyle,
    ) -> Self {
        Self {
            config,
            converter,
            build_graphs,
            style,
        }
    }

    /// Apply all configured steps and commit the final annotations.
    ///
    /// With squash suppression active and a non-fallback tree already
    /// present, the sentence is returned untouched. An empty candidate
    /// list stops before commit — fabricating trees is exclusively the
    /// fallback synthesizer's job.
    pub fn process(
        &self,
        sentence: &mut Sentence,
        candidates: Vec<Tree>,
    ) -> Result<(), StructuralError> {
        // 1. Squash suppression: an existing non-fallback tree is
        //    authoritative. A fallback-rooted tree is replaced.
        if self.config.no_squash {
            if let Some(existing) = &sentence.tree {
                if existing.label != FALLBACK_TREE_LABEL {
                    debug!("existing tree is authoritative, skipping post-processing");
                    return Ok(());
                }
            }
        }

        // 2. Selection: first-ranked candidate is primary.
        let mut candidates = candidates.into_iter();
        let Some(mut working) = candidates.next() else {
            debug!("no candidate tree, leaving annotation absent");
            return Ok(());
        };

        // 3. Binarization retention, from the unflattened working tree; a
        //    previously stored binarized annotation is never overwritten.
        let binarized = (self.config.save_binarized && sentence.binary_tree.is_none())
            .then(|| binarize(&working));

        // 4. Height flattening.
        if self.config.max_height > 0 && working.depth() > self.config.max_height {
            working = flatten_to_height(&working, self.config.max_height);
        }

        // 5. User transform. A `None` return is an intentional discard,
        //    committed as an explicitly absent tree.
        let final_tree = match &self.config.tree_map {
            Some(transform) => {
                let out = transform.apply(&working);
                if out.is_none() {
                    debug!(transform = transform.name(), "tree transform discarded the parse");
                }
                out
            }
            None => Some(working),
        };

        // 6. Dependency derivation, with mandatory sentence-index repair
        //    on every vertex.
        let graph = match (&final_tree, self.converter) {
            (Some(tree), Some(converter)) if self.build_graphs => {
                let options = ConvertOptions {
                    style: self.style,
                    extras: self.config.extra_dependencies,
                    keep_punctuation: self.config.keep_punct,
                };
                let mut graph = converter.derive(tree, &sentence.tokens, &options)?;
                graph.stamp_sentence_index(sentence.index.unwrap_or(0));
                Some(graph)
            }
            _ => None,
        };

        // 7. Commit.
        sentence.tree = final_tree;
        if let Some(binarized) = binarized {
            sentence.binary_tree = Some(binarized);
        }
        if let Some(graph) = graph {
            sentence.dependencies = Some(graph);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{DependencyEdge, DependencyGraph, DependencyVertex, ExtraDependencies};
    use crate::tree::transform::FnTransform;
    use crate::types::Token;
    use std::sync::Arc;

    /// Converter producing one vertex per non-filtered token and a flat
    /// root-to-dependent edge fan.
    struct FlatConverter;

    impl DependencyConverter for FlatConverter {
        fn derive(
            &self,
            _tree: &Tree,
            tokens: &[Token],
            options: &ConvertOptions,
        ) -> Result<DependencyGraph, StructuralError> {
            let vertices: Vec<DependencyVertex> = tokens
                .iter()
                .filter(|t| {
                    options.keep_punctuation
                        || !t
                            .tag
                            .as_deref()
                            .is_some_and(crate::graph::is_punctuation_tag)
                })
                .map(DependencyVertex::from_token)
                .collect();
            let edges = (1..vertices.len())
                .map(|dependent| DependencyEdge {
                    governor: 0,
                    dependent,
                    relation: "dep".into(),
                })
                .collect();
            Ok(DependencyGraph {
                vertices,
                edges,
                root: Some(0),
            })
        }
    }

    struct FailingConverter;

    impl DependencyConverter for FailingConverter {
        fn derive(
            &self,
            _tree: &Tree,
            _tokens: &[Token],
            _options: &ConvertOptions,
        ) -> Result<DependencyGraph, StructuralError> {
            Err(StructuralError::Conversion("no head found".into()))
        }
    }

    fn sentence() -> Sentence {
        Sentence::new(
            "the dog barks",
            vec![
                Token::new("the", 0).with_tag("DT"),
                Token::new("dog", 1).with_tag("NN"),
                Token::new("barks", 2).with_tag("VBZ"),
            ],
        )
        .with_index(7)
    }

    fn parse_tree() -> Tree {
        Tree::internal(
            "ROOT",
            vec![Tree::internal(
                "S",
                vec![
                    Tree::internal("NP", vec![Tree::leaf("the"), Tree::leaf("dog")]),
                    Tree::internal("VP", vec![Tree::leaf("barks")]),
                ],
            )],
        )
    }

    fn processor<'a>(
        config: &'a ParserConfig,
        converter: Option<&'a dyn DependencyConverter>,
        build_graphs: bool,
    ) -> TreePostProcessor<'a> {
        TreePostProcessor::new(config, converter, build_graphs, DependencyStyle::Enhanced)
    }

    #[test]
    fn test_commits_first_candidate() {
        let config = ParserConfig::new("m");
        let mut sent = sentence();
        processor(&config, None, false)
            .process(&mut sent, vec![parse_tree(), Tree::leaf("second")])
            .unwrap();
        assert_eq!(sent.tree.as_ref().unwrap().label, "ROOT");
    }

    #[test]
    fn test_empty_candidates_leave_sentence_untouched() {
        let config = ParserConfig::new("m");
        let mut sent = sentence();
        processor(&config, None, false)
            .process(&mut sent, vec![])
            .unwrap();
        assert!(sent.tree.is_none());
        assert!(sent.dependencies.is_none());
    }

    #[test]
    fn test_squash_suppression_is_reference_stable() {
        let config = ParserConfig::new("m").with_no_squash(true);
        let mut sent = sentence();
        sent.tree = Some(parse_tree().with_score(42.0));
        processor(&config, None, false)
            .process(&mut sent, vec![Tree::leaf("replacement")])
            .unwrap();
        let kept = sent.tree.as_ref().unwrap();
        assert_eq!(kept.label, "ROOT");
        assert_eq!(kept.score, Some(42.0));
    }

    #[test]
    fn test_squash_suppression_replaces_fallback_tree() {
        let config = ParserConfig::new("m").with_no_squash(true);
        let mut sent = sentence();
        sent.tree = Some(Tree {
            label: FALLBACK_TREE_LABEL.into(),
            children: vec![Tree::leaf("the")],
            score: None,
        });
        processor(&config, None, false)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        assert_eq!(sent.tree.as_ref().unwrap().label, "ROOT");
    }

    #[test]
    fn test_binarized_annotation_saved_and_not_overwritten() {
        let config = ParserConfig::new("m").with_save_binarized(true);
        let mut sent = sentence();
        processor(&config, None, false)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        assert!(sent.binary_tree.is_some());

        let prior = Tree::leaf("prior");
        let mut sent = sentence();
        sent.binary_tree = Some(prior.clone());
        processor(&config, None, false)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        assert_eq!(sent.binary_tree, Some(prior));
    }

    #[test]
    fn test_height_flattening_applied() {
        let config = ParserConfig::new("m").with_max_height(3);
        let mut sent = sentence();
        let tree = parse_tree();
        let leaf_count = tree.leaf_count();
        processor(&config, None, false)
            .process(&mut sent, vec![tree])
            .unwrap();
        let committed = sent.tree.as_ref().unwrap();
        assert!(committed.depth() <= 3);
        assert_eq!(committed.leaf_count(), leaf_count);
        assert_eq!(committed.label, "ROOT");
    }

    #[test]
    fn test_transform_rewrites_working_tree() {
        let relabel = FnTransform::new("relabel", |t: &Tree| {
            let mut out = t.clone();
            out.label = "TOP".into();
            Some(out)
        });
        let config = ParserConfig::new("m").with_tree_map(Arc::new(relabel));
        let mut sent = sentence();
        processor(&config, None, false)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        assert_eq!(sent.tree.as_ref().unwrap().label, "TOP");
    }

    #[test]
    fn test_transform_discard_clears_annotation() {
        let discard = FnTransform::new("discard", |_: &Tree| None);
        let config = ParserConfig::new("m").with_tree_map(Arc::new(discard));
        let mut sent = sentence();
        sent.tree = Some(Tree::leaf("stale"));
        processor(&config, None, false)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        assert!(sent.tree.is_none());
        assert!(sent.dependencies.is_none());
    }

    #[test]
    fn test_graph_derived_and_vertices_stamped() {
        let config = ParserConfig::new("m");
        let converter = FlatConverter;
        let mut sent = sentence();
        processor(&config, Some(&converter), true)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        let graph = sent.dependencies.as_ref().unwrap();
        assert_eq!(graph.num_vertices(), 3);
        assert!(graph.vertices.iter().all(|v| v.sentence_index == Some(7)));
    }

    #[test]
    fn test_stamping_defaults_absent_sentence_index_to_zero() {
        let config = ParserConfig::new("m");
        let converter = FlatConverter;
        let mut sent = sentence();
        sent.index = None;
        processor(&config, Some(&converter), true)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        let graph = sent.dependencies.as_ref().unwrap();
        assert!(graph.vertices.iter().all(|v| v.sentence_index == Some(0)));
    }

    #[test]
    fn test_keep_punct_false_drops_punctuation() {
        let config = ParserConfig::new("m").with_keep_punct(false);
        let converter = FlatConverter;
        let mut sent = Sentence::new(
            "dog .",
            vec![
                Token::new("dog", 0).with_tag("NN"),
                Token::new(".", 1).with_tag("."),
            ],
        )
        .with_index(0);
        processor(&config, Some(&converter), true)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        let graph = sent.dependencies.as_ref().unwrap();
        assert_eq!(graph.num_vertices(), 1);
        assert_eq!(graph.vertices[0].word, "dog");
    }

    #[test]
    fn test_converter_error_propagates_without_commit() {
        let config = ParserConfig::new("m");
        let converter = FailingConverter;
        let mut sent = sentence();
        let err = processor(&config, Some(&converter), true)
            .process(&mut sent, vec![parse_tree()])
            .unwrap_err();
        assert_eq!(err, StructuralError::Conversion("no head found".into()));
        // Nothing was committed.
        assert!(sent.tree.is_none());
        assert!(sent.dependencies.is_none());
    }

    #[test]
    fn test_converter_receives_configured_options() {
        struct OptionsRecorder(std::sync::Mutex<Option<(DependencyStyle, ExtraDependencies, bool)>>);
        impl DependencyConverter for OptionsRecorder {
            fn derive(
                &self,
                _tree: &Tree,
                _tokens: &[Token],
                options: &ConvertOptions,
            ) -> Result<DependencyGraph, StructuralError> {
                *self.0.lock().unwrap() =
                    Some((options.style, options.extras, options.keep_punctuation));
                Ok(DependencyGraph::default())
            }
        }

        let config = ParserConfig::new("m")
            .with_extra_dependencies(ExtraDependencies::Maximal)
            .with_keep_punct(false);
        let converter = OptionsRecorder(std::sync::Mutex::new(None));
        let mut sent = sentence();
        TreePostProcessor::new(&config, Some(&converter), true, DependencyStyle::Original)
            .process(&mut sent, vec![parse_tree()])
            .unwrap();
        assert_eq!(
            *converter.0.lock().unwrap(),
            Some((DependencyStyle::Original, ExtraDependencies::Maximal, false))
        );
    }
}
