//! Configuration resolution and cache signatures
//!
//! A [`ParserConfig`] is derived once, at construction time, from a named
//! prefix and a flat string-keyed property set, and is never mutated
//! afterward. Everything except the model identity has a default; bad
//! values on recognized keys fail soft to the default with a warning
//! rather than aborting construction.
//!
//! [`signature`] renders the same recognized keys (with resolved defaults)
//! as a canonical string the surrounding pipeline uses as a cache/reuse
//! key.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::warn;

use crate::graph::ExtraDependencies;
use crate::pipeline::errors::ConfigError;
use crate::tree::transform::{builtin_registry, TreeTransform};

/// Flat string-keyed property set, as handed down by the pipeline
/// container.
pub type Properties = FxHashMap<String, String>;

/// Default maximum tree height.
pub const DEFAULT_MAX_HEIGHT: usize = 80;

/// Recognized key suffixes in canonical signature order, paired with the
/// default value rendered when the property is absent.
///
/// The two engine-default keys (`buildgraphs`, `originalDependencies`)
/// render fixed documented defaults here so the signature stays computable
/// without an engine; their runtime values are resolved against the
/// oracle at facade construction.
const RECOGNIZED: &[(&str, &str)] = &[
    ("model", ""),
    ("debug", "false"),
    ("flags", ""),
    ("maxlen", "-1"),
    ("maxheight", "80"),
    ("maxtime", "-1"),
    ("nthreads", "1"),
    ("kbest", "1"),
    ("keepPunct", "true"),
    ("nosquash", "false"),
    ("buildgraphs", "true"),
    ("binaryTrees", "false"),
    ("extradependencies", "none"),
    ("treemap", ""),
    ("originalDependencies", "false"),
];

/// Immutable configuration of the parse stage.
///
/// Built once from properties (or via the `with_*` builders in tests and
/// embedding code); no hidden mutable state exists after construction.
#[derive(Clone)]
pub struct ParserConfig {
    /// Model identity handed to the loader
    pub model: String,
    /// Diagnostic flag
    pub debug: bool,
    /// Whitespace-delimited engine start-up flags
    pub flags: Vec<String>,
    /// Maximum sentence length; `<= 0` means unbounded
    pub max_len: i64,
    /// Maximum tree height; 0 disables flattening
    pub max_height: usize,
    /// Maximum parse time per sentence in milliseconds; `<= 0` means
    /// unbounded
    pub max_time_ms: i64,
    /// Worker count declared to the pipeline scheduler
    pub nthreads: usize,
    /// k-best width; 1 requests only the single best parse
    pub kbest: usize,
    /// Retain punctuation tokens in the dependency graph
    pub keep_punct: bool,
    /// Suppress re-parsing sentences that already carry a non-fallback
    /// tree
    pub no_squash: bool,
    /// Derive dependency graphs; `None` defers to the engine default
    pub build_graphs: Option<bool>,
    /// Retain a binarized tree annotation
    pub save_binarized: bool,
    /// Extra-dependency selector for the converter
    pub extra_dependencies: ExtraDependencies,
    /// Legacy vs. enhanced dependency semantics; `None` defers to the
    /// engine default
    pub original_dependencies: Option<bool>,
    /// Optional user tree transform applied before commit
    pub tree_map: Option<Arc<dyn TreeTransform>>,
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("model", &self.model)
            .field("debug", &self.debug)
            .field("flags", &self.flags)
            .field("max_len", &self.max_len)
            .field("max_height", &self.max_height)
            .field("max_time_ms", &self.max_time_ms)
            .field("nthreads", &self.nthreads)
            .field("kbest", &self.kbest)
            .field("keep_punct", &self.keep_punct)
            .field("no_squash", &self.no_squash)
            .field("build_graphs", &self.build_graphs)
            .field("save_binarized", &self.save_binarized)
            .field("extra_dependencies", &self.extra_dependencies)
            .field("original_dependencies", &self.original_dependencies)
            .field("tree_map", &self.tree_map.as_ref().map(|t| t.name().to_string()))
            .finish()
    }
}

impl ParserConfig {
    /// Create a configuration with the given model and every other field
    /// at its default.
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            debug: false,
            flags: Vec::new(),
            max_len: -1,
            max_height: DEFAULT_MAX_HEIGHT,
            max_time_ms: -1,
            nthreads: 1,
            kbest: 1,
            keep_punct: true,
            no_squash: false,
            build_graphs: None,
            save_binarized: false,
            extra_dependencies: ExtraDependencies::None,
            original_dependencies: None,
            tree_map: None,
        }
    }

    /// Resolve a configuration from `props` under the given prefix.
    ///
    /// Fails only when `<prefix>.model` is absent or blank; every other
    /// recognized key falls back to its default on a bad value, with a
    /// warning.
    pub fn from_properties(prefix: &str, props: &Properties) -> Result<Self, ConfigError> {
        let model = match lookup(props, prefix, "model") {
            Some(value) if !value.trim().is_empty() => value.to_string(),
            _ => return Err(ConfigError::MissingModel(prefix.to_string())),
        };

        let mut config = Self::new(model);
        config.debug = parse_or_default(props, prefix, "debug", false);
        config.flags = lookup(props, prefix, "flags")
            .map(|v| v.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
        config.max_len = parse_or_default(props, prefix, "maxlen", -1);
        config.max_height = parse_or_default(props, prefix, "maxheight", DEFAULT_MAX_HEIGHT);
        config.max_time_ms = parse_or_default(props, prefix, "maxtime", -1);
        config.nthreads = resolve_nthreads(props, prefix);
        config.kbest = parse_or_default(props, prefix, "kbest", 1);
        config.keep_punct = parse_or_default(props, prefix, "keepPunct", true);
        config.no_squash = parse_or_default(props, prefix, "nosquash", false);
        config.build_graphs = parse_optional(props, prefix, "buildgraphs");
        config.save_binarized = parse_or_default(props, prefix, "binaryTrees", false);
        config.original_dependencies = parse_optional(props, prefix, "originalDependencies");

        if let Some(value) = lookup(props, prefix, "extradependencies") {
            match ExtraDependencies::from_name(value) {
                Some(extras) => config.extra_dependencies = extras,
                None => warn!(
                    key = %format!("{prefix}.extradependencies"),
                    %value,
                    "unrecognized extra-dependency selector, using \"none\""
                ),
            }
        }

        if let Some(name) = lookup(props, prefix, "treemap") {
            match builtin_registry().resolve(name) {
                Some(transform) => config.tree_map = Some(transform),
                None => warn!(
                    key = %format!("{prefix}.treemap"),
                    %name,
                    "tree transform not found, leaving treemap unset"
                ),
            }
        }

        Ok(config)
    }

    /// Set the maximum sentence length.
    pub fn with_max_len(mut self, max_len: i64) -> Self {
        self.max_len = max_len;
        self
    }

    /// Set the maximum tree height (0 disables flattening).
    pub fn with_max_height(mut self, max_height: usize) -> Self {
        self.max_height = max_height;
        self
    }

    /// Set the per-sentence parse time budget in milliseconds.
    pub fn with_max_time(mut self, max_time_ms: i64) -> Self {
        self.max_time_ms = max_time_ms;
        self
    }

    /// Set the k-best width.
    pub fn with_kbest(mut self, kbest: usize) -> Self {
        self.kbest = kbest;
        self
    }

    /// Set the worker count declared to the scheduler.
    pub fn with_nthreads(mut self, nthreads: usize) -> Self {
        self.nthreads = nthreads;
        self
    }

    /// Enable or disable squash suppression.
    pub fn with_no_squash(mut self, no_squash: bool) -> Self {
        self.no_squash = no_squash;
        self
    }

    /// Retain or drop punctuation tokens in derived graphs.
    pub fn with_keep_punct(mut self, keep_punct: bool) -> Self {
        self.keep_punct = keep_punct;
        self
    }

    /// Force dependency-graph derivation on or off.
    pub fn with_build_graphs(mut self, build_graphs: bool) -> Self {
        self.build_graphs = Some(build_graphs);
        self
    }

    /// Retain a binarized tree annotation.
    pub fn with_save_binarized(mut self, save_binarized: bool) -> Self {
        self.save_binarized = save_binarized;
        self
    }

    /// Select the extra-dependency style.
    pub fn with_extra_dependencies(mut self, extras: ExtraDependencies) -> Self {
        self.extra_dependencies = extras;
        self
    }

    /// Inject a tree transform directly, superseding the registry.
    pub fn with_tree_map(mut self, transform: Arc<dyn TreeTransform>) -> Self {
        self.tree_map = Some(transform);
        self
    }
}

/// Render the canonical configuration signature for `prefix` over
/// `props`.
///
/// Every recognized key is rendered as a `prefix.key:value` line in fixed
/// order, using the resolved default when the property is absent. Values
/// are not trimmed; the enumerated `extradependencies` value is
/// lower-cased. Unrecognized properties never contribute.
pub fn signature(prefix: &str, props: &Properties) -> String {
    let mut lines = Vec::with_capacity(RECOGNIZED.len());
    for &(key, default) in RECOGNIZED {
        let mut value = match lookup(props, prefix, key) {
            Some(v) => v.to_string(),
            None if key == "nthreads" => props
                .get("nthreads")
                .cloned()
                .unwrap_or_else(|| default.to_string()),
            None => default.to_string(),
        };
        if key == "extradependencies" {
            value = value.to_ascii_lowercase();
        }
        lines.push(format!("{prefix}.{key}:{value}"));
    }
    lines.join("\n")
}

fn lookup<'a>(props: &'a Properties, prefix: &str, key: &str) -> Option<&'a str> {
    props.get(&format!("{prefix}.{key}")).map(String::as_str)
}

/// Parse a recognized property, falling back to `default` (with a
/// warning) on a bad value.
fn parse_or_default<T>(props: &Properties, prefix: &str, key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match lookup(props, prefix, key) {
        Some(value) => value.parse().unwrap_or_else(|_| {
            warn!(
                key = %format!("{prefix}.{key}"),
                %value,
                "unparseable property value, using default"
            );
            default
        }),
        None => default,
    }
}

/// Parse an engine-default property: absent stays `None`, bad values warn
/// and stay `None`.
fn parse_optional(props: &Properties, prefix: &str, key: &str) -> Option<bool> {
    let value = lookup(props, prefix, key)?;
    match value.parse() {
        Ok(flag) => Some(flag),
        Err(_) => {
            warn!(
                key = %format!("{prefix}.{key}"),
                %value,
                "unparseable property value, deferring to engine default"
            );
            None
        }
    }
}

fn resolve_nthreads(props: &Properties, prefix: &str) -> usize {
    let value = lookup(props, prefix, "nthreads")
        .or_else(|| props.get("nthreads").map(String::as_str));
    match value {
        Some(v) => v.parse().unwrap_or_else(|_| {
            warn!(%v, "unparseable nthreads value, using 1");
            1
        }),
        None => 1,
    }
}
