//! The parse annotation stage
//!
//! This module composes the stage out of its parts: configuration
//! resolution, the resource-gated parse invoker, the fallback
//! synthesizer, the tree post-processor, and the annotator facade the
//! pipeline scheduler talks to.
//!
//! Control flow per sentence: the facade consults the squash rule, the
//! invoker attempts a parse (or is gated away), any disqualifying outcome
//! routes to the fallback synthesizer, and the post-processor performs the
//! structural transforms and commits the final annotations.

pub mod annotator;
pub mod config;
pub mod errors;
pub mod fallback;
pub mod invoker;
pub mod postprocess;
