//! Configuration schema definitions.
//!
//! This module defines the complete `deploy.toml` structure.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::cdn::behavior::{ForwardSet, Method, Trigger};

/// Root deploy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DeployConfig {
    /// Build input and output locations.
    pub build: BuildConfig,

    /// Function group sizing.
    pub functions: FunctionsConfig,

    /// Public asset upload policy.
    pub assets: AssetsConfig,

    /// CDN distribution overrides.
    pub cdn: CdnConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Build configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Application root directory.
    pub app_dir: PathBuf,

    /// Framework build output, relative to `app_dir`.
    pub build_dir: PathBuf,

    /// Where the two function bundles are assembled.
    pub output_dir: PathBuf,

    /// Page handler runtime entrypoint, relative to `app_dir`.
    pub page_entrypoint: PathBuf,

    /// API handler runtime entrypoint, relative to `app_dir`.
    pub api_entrypoint: PathBuf,

    /// Optional user handler copied into the page bundle.
    pub custom_handler: Option<PathBuf>,

    /// Files selected by dependency tracing, relative to `app_dir`.
    pub traced_files: Vec<PathBuf>,

    /// Log routing durations in the deployed handlers.
    pub log_execution_times: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            app_dir: PathBuf::from("."),
            build_dir: PathBuf::from(".next"),
            output_dir: PathBuf::from(".edge-deploy"),
            page_entrypoint: PathBuf::from("handlers/default-handler.js"),
            api_entrypoint: PathBuf::from("handlers/api-handler.js"),
            custom_handler: None,
            traced_files: Vec::new(),
            log_execution_times: false,
        }
    }
}

/// The two deployable function groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionGroup {
    Page,
    Api,
}

impl FunctionGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionGroup::Page => "page",
            FunctionGroup::Api => "api",
        }
    }
}

/// A value set for both function groups at once, or per group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PerGroup<T> {
    Both(T),
    Split {
        #[serde(default)]
        page: Option<T>,
        #[serde(default)]
        api: Option<T>,
    },
}

impl<T> Default for PerGroup<T> {
    fn default() -> Self {
        PerGroup::Split {
            page: None,
            api: None,
        }
    }
}

impl<T: Clone> PerGroup<T> {
    /// The value configured for `group`, if any.
    pub fn get(&self, group: FunctionGroup) -> Option<T> {
        match (self, group) {
            (PerGroup::Both(value), _) => Some(value.clone()),
            (PerGroup::Split { page, .. }, FunctionGroup::Page) => page.clone(),
            (PerGroup::Split { api, .. }, FunctionGroup::Api) => api.clone(),
        }
    }
}

/// Per-function-group sizing.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct FunctionsConfig {
    /// Memory in MB.
    pub memory: PerGroup<u32>,

    /// Timeout in seconds.
    pub timeout: PerGroup<u32>,

    /// Runtime identifier.
    pub runtime: PerGroup<String>,

    /// Function name; generated by the deployer when unset.
    pub name: PerGroup<String>,
}

fn default_memory() -> u32 {
    512
}

fn default_timeout() -> u32 {
    10
}

fn default_runtime() -> String {
    "nodejs12.x".to_string()
}

/// Resolved sizing for one function group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSizing {
    pub memory: u32,
    pub timeout: u32,
    pub runtime: String,
    pub name: Option<String>,
}

impl FunctionsConfig {
    /// Resolve sizing for one group; unset values keep their defaults.
    pub fn resolve(&self, group: FunctionGroup) -> FunctionSizing {
        FunctionSizing {
            memory: self.memory.get(group).unwrap_or_else(default_memory),
            timeout: self.timeout.get(group).unwrap_or_else(default_timeout),
            runtime: self.runtime.get(group).unwrap_or_else(default_runtime),
            name: self.name.get(group),
        }
    }
}

/// Cache-Control policy for files under `public/` and `static/`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PublicDirectoryCache {
    /// `true` applies the default policy, `false` disables it.
    Enabled(bool),
    /// Override the file-name test and/or the header value.
    Custom {
        #[serde(default)]
        test: Option<String>,
        #[serde(default)]
        value: Option<String>,
    },
}

impl Default for PublicDirectoryCache {
    fn default() -> Self {
        PublicDirectoryCache::Enabled(true)
    }
}

/// Asset configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AssetsConfig {
    pub public_directory_cache: PublicDirectoryCache,
}

/// Cookie/header/querystring forwarding overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ForwardOverride {
    pub cookies: Option<ForwardSet>,
    pub headers: Option<ForwardSet>,
    pub query_string: Option<bool>,
}

/// User overrides for one cache behavior. Unset fields keep the base value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BehaviorOverride {
    pub min_ttl: Option<u64>,
    pub default_ttl: Option<u64>,
    pub max_ttl: Option<u64>,
    pub forward: ForwardOverride,
    pub allowed_methods: Option<Vec<Method>>,
    pub compress: Option<bool>,

    /// Trigger name → function version reference.
    pub triggers: BTreeMap<Trigger, String>,
}

/// A user cache behavior for one path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathBehavior {
    pub path: String,

    #[serde(flatten)]
    pub overrides: BehaviorOverride,
}

/// An additional user origin.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OriginConfig {
    pub url: String,

    #[serde(default)]
    pub private: bool,

    #[serde(default)]
    pub behaviors: Vec<PathBehavior>,
}

/// CDN distribution configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CdnConfig {
    /// `PriceClass_All`, `PriceClass_200` or `PriceClass_100`.
    pub price_class: String,

    /// Overrides for the default (catch-all) behavior.
    pub defaults: BehaviorOverride,

    /// Per-path behaviors on the storage origin, in precedence order.
    pub behaviors: Vec<PathBehavior>,

    /// Extra origins passed through to the distribution.
    pub origins: Vec<OriginConfig>,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            price_class: "PriceClass_All".to_string(),
            defaults: BehaviorOverride::default(),
            behaviors: Vec::new(),
            origins: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
