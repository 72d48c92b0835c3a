//! Immutable inputs for one build run.
//!
//! # Design Decisions
//! - Every path is resolved against the app directory up front; no step
//!   changes the working directory
//! - The application runtime config is resolved to plain values once, before
//!   compilation starts

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;

use crate::config::{DeployConfig, PublicDirectoryCache};
use crate::error::{Error, Result};

/// Phase name passed to a runtime config producer.
pub const PRODUCTION_SERVER_PHASE: &str = "phase-production-server";

/// Application runtime config file, relative to the app directory.
pub const RUNTIME_CONFIG_FILE: &str = "next.config.json";

/// Page bundle directory name inside the output directory.
pub const PAGE_BUNDLE: &str = "default-lambda";

/// API bundle directory name inside the output directory.
pub const API_BUNDLE: &str = "api-lambda";

/// A function producing the runtime config for a phase.
pub type ConfigProducer = Arc<dyn Fn(&str, &Value) -> Value + Send + Sync>;

/// The application's runtime config in whichever form it was declared.
#[derive(Clone, Default)]
pub enum RuntimeConfig {
    #[default]
    Absent,
    Value(Value),
    Producer(ConfigProducer),
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeConfig::Absent => f.write_str("Absent"),
            RuntimeConfig::Value(v) => f.debug_tuple("Value").field(v).finish(),
            RuntimeConfig::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

impl RuntimeConfig {
    /// Read `next.config.json` from the app directory, if present.
    pub async fn load(app_dir: &Path) -> Result<Self> {
        let path = app_dir.join(RUNTIME_CONFIG_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let value = serde_json::from_slice(&bytes).map_err(|e| Error::json(&path, e))?;
                Ok(RuntimeConfig::Value(value))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RuntimeConfig::Absent),
            Err(e) => Err(Error::io(path, e)),
        }
    }

    /// Materialize the config. A producer is invoked exactly once.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            RuntimeConfig::Absent => None,
            RuntimeConfig::Value(value) => Some(value.clone()),
            RuntimeConfig::Producer(produce) => Some(produce(
                PRODUCTION_SERVER_PHASE,
                &Value::Object(Default::default()),
            )),
        }
    }

    /// The `trailingSlash` setting, `false` when unset.
    pub fn resolve_trailing_slash(&self) -> bool {
        self.resolve()
            .and_then(|config| config.get("trailingSlash").and_then(Value::as_bool))
            .unwrap_or(false)
    }
}

/// Everything a build step may read. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct BuildContext {
    pub app_dir: PathBuf,
    pub build_dir: PathBuf,
    pub output_dir: PathBuf,
    pub page_entrypoint: PathBuf,
    pub api_entrypoint: PathBuf,
    pub custom_handler: Option<PathBuf>,
    /// Relative to `app_dir`.
    pub traced_files: Vec<PathBuf>,
    pub log_execution_times: bool,
    pub trailing_slash: bool,
    pub public_cache: PublicDirectoryCache,
}

impl BuildContext {
    pub fn new(config: &DeployConfig, runtime: &RuntimeConfig) -> Self {
        let build = &config.build;
        let app_dir = build.app_dir.clone();
        Self {
            build_dir: app_dir.join(&build.build_dir),
            output_dir: app_dir.join(&build.output_dir),
            page_entrypoint: app_dir.join(&build.page_entrypoint),
            api_entrypoint: app_dir.join(&build.api_entrypoint),
            custom_handler: build.custom_handler.as_ref().map(|p| app_dir.join(p)),
            traced_files: build.traced_files.clone(),
            log_execution_times: build.log_execution_times,
            trailing_slash: runtime.resolve_trailing_slash(),
            public_cache: config.assets.public_directory_cache.clone(),
            app_dir,
        }
    }

    /// Load the runtime config from the app directory and build the context.
    pub async fn from_config(config: &DeployConfig) -> Result<Self> {
        let runtime = RuntimeConfig::load(&config.build.app_dir).await?;
        Ok(Self::new(config, &runtime))
    }

    /// Serverless build output (`<build_dir>/serverless`).
    pub fn serverless_dir(&self) -> PathBuf {
        self.build_dir.join("serverless")
    }

    pub fn public_dir(&self) -> PathBuf {
        self.app_dir.join("public")
    }

    pub fn static_dir(&self) -> PathBuf {
        self.app_dir.join("static")
    }

    pub fn page_bundle_dir(&self) -> PathBuf {
        self.output_dir.join(PAGE_BUNDLE)
    }

    pub fn api_bundle_dir(&self) -> PathBuf {
        self.output_dir.join(API_BUNDLE)
    }
}
