//! CDN cache behavior generation.
//!
//! # Data Flow
//! ```text
//! Manifest + CdnConfig + function versions
//!     → validate.rs (user paths must reach the build)
//!     → generator.rs (system behaviors, user merge, default behavior)
//!     → Distribution (serializable descriptor)
//! ```
//!
//! # Design Decisions
//! - The generator never talks to a cloud API; it only emits a descriptor
//! - User paths are written relative to the base path and prefixed here
//! - behavior.rs owns the merge rules so every path shares them

pub mod behavior;
pub mod generator;
pub mod validate;

pub use behavior::{CacheBehavior, Forward, ForwardKeyword, ForwardSet, Method, Trigger};
pub use generator::{generate, Distribution, EdgeFunctions, Origin, PathPatternBehavior};
pub use validate::{glob_match, path_pattern, validate_paths, SYSTEM_PATTERNS};
