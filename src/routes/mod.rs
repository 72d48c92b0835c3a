//! Route classification and ordering.
//!
//! # Data Flow
//! ```text
//! pages manifest entry (template, file)
//!     → segment.rs (tokenize template, compile matcher)
//!     → classify.rs (category, render kind, parameter names)
//!     → sort.rs (specificity order for dynamic buckets)
//!     → Route[] handed to the manifest compiler
//! ```
//!
//! # Design Decisions
//! - Routes are compiled at build time and immutable afterwards
//! - No regex in the matching path (segment walk only)
//! - Deterministic: the sorted sequence is the only source of precedence

pub mod classify;
pub mod segment;
pub mod sort;

pub use classify::{classify, Category, RenderKind, Route, SourceKind};
pub use segment::{ParamValue, Params, Segment};
pub use sort::{sort_routes, sorted};

/// A route template that cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route {0:?} must start with '/'")]
    MissingLeadingSlash(String),

    #[error("route {0:?} contains an empty segment")]
    EmptySegment(String),

    #[error("route {template:?}: segment {segment:?} mixes literal text with a parameter")]
    PartialSegment { template: String, segment: String },

    #[error("route {template:?}: segment {segment:?} has an invalid parameter name")]
    InvalidParamName { template: String, segment: String },

    #[error("route {template:?}: catch-all {name:?} must be the last segment")]
    CatchAllNotLast { template: String, name: String },

    #[error("route {template:?}: parameter {name:?} is declared twice")]
    DuplicateParam { template: String, name: String },
}
