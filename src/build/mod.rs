//! Build subsystem.
//!
//! # Data Flow
//! ```text
//! DeployConfig + next.config.json
//!     → context.rs (BuildContext, immutable)
//!     → artifacts.rs (pages manifest, BUILD_ID, prerender/routes manifests,
//!                     public files)
//!     → compiler.rs (classify, sort, bucket → Manifest + RoutesDescriptor)
//!     → bundle.rs (default-lambda, api-lambda)
//!     → assets.rs (assets.json)
//! ```
//!
//! # Design Decisions
//! - Steps never share mutable state; each reads the context and the
//!   previous step's output
//! - Missing required artifacts are configuration errors naming the file
//! - File operations inside a step run concurrently and fail fast

pub mod artifacts;
pub mod assets;
pub mod bundle;
pub mod compiler;
pub mod context;
pub mod pipeline;

pub use artifacts::BuildArtifacts;
pub use assets::{AssetEntry, AssetIndex, CachePolicy};
pub use bundle::{BundlePlan, BundleReport};
pub use compiler::{compile, Compiled};
pub use context::{BuildContext, RuntimeConfig};
pub use pipeline::{run, BuildOutput};
