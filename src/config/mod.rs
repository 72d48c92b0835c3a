//! Deploy configuration.
//!
//! # Data Flow
//! ```text
//! deploy.toml
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks, all errors at once)
//!     → DeployConfig (validated, immutable)
//!     → build::BuildContext / cdn::generate / functions sizing
//! ```
//!
//! # Design Decisions
//! - Every section has defaults so a minimal file is valid
//! - Syntactic checks are serde's job; semantic checks live in validation.rs
//! - Per-function-group values resolve independently: setting one group
//!   never changes the other

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_config_from_str, ConfigError};
pub use schema::{
    AssetsConfig, BehaviorOverride, BuildConfig, CdnConfig, DeployConfig, ForwardOverride,
    FunctionGroup, FunctionSizing, FunctionsConfig, ObservabilityConfig, OriginConfig,
    PathBehavior, PerGroup, PublicDirectoryCache,
};
