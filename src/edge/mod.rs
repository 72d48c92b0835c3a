//! Edge handler adapter.
//!
//! # Data Flow
//! ```text
//! cold start:   bundle dir → cache.rs (manifest.json, kept while build id matches)
//! per request:  OriginRequest → router::route → handler.rs → OriginAction
//! ```
//!
//! # Design Decisions
//! - The adapter adds no routing rules of its own; it only maps decisions
//!   onto storage keys, modules and responses
//! - Execution timing is logged only when the manifest asks for it

pub mod cache;
pub mod handler;

pub use cache::ManifestCache;
pub use handler::{handle, OriginAction, OriginRequest};
