//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::DeployConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::Validation(_) => None,
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<DeployConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    load_config_from_str(&content)
}

/// Parse and validate configuration from TOML text.
pub fn load_config_from_str(content: &str) -> Result<DeployConfig, ConfigError> {
    let config: DeployConfig = toml::from_str(content).map_err(ConfigError::Parse)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    tracing::debug!(
        behaviors = config.cdn.behaviors.len(),
        origins = config.cdn.origins.len(),
        "Deploy configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdn::behavior::Trigger;
    use crate::config::{FunctionGroup, PublicDirectoryCache};

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.build.build_dir, Path::new(".next"));
        assert_eq!(config.cdn.price_class, "PriceClass_All");
        assert_eq!(
            config.assets.public_directory_cache,
            PublicDirectoryCache::Enabled(true)
        );
        let page = config.functions.resolve(FunctionGroup::Page);
        assert_eq!((page.memory, page.timeout), (512, 10));
        assert_eq!(page.runtime, "nodejs12.x");
    }

    #[test]
    fn test_full_file() {
        let toml = r#"
[build]
app_dir = "app"
log_execution_times = true
traced_files = ["node_modules/react/index.js"]

[functions]
memory = 1024

[functions.runtime]
page = "nodejs14.x"

[assets.public_directory_cache]
test = "\\.(txt|xml)$"
value = "public, max-age=60"

[cdn]
price_class = "PriceClass_100"

[cdn.defaults]
default_ttl = 5

[cdn.defaults.triggers]
viewer-request = "arn:aws:lambda:us-east-1:123:function:auth:1"

[[cdn.behaviors]]
path = "blog/*"
default_ttl = 60
allowed_methods = ["GET", "HEAD"]

[cdn.behaviors.forward]
cookies = ["session"]
query_string = false

[[cdn.origins]]
url = "https://api.example.com"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert!(config.build.log_execution_times);
        assert_eq!(config.functions.resolve(FunctionGroup::Api).memory, 1024);
        assert_eq!(config.functions.resolve(FunctionGroup::Page).runtime, "nodejs14.x");
        assert_eq!(config.functions.resolve(FunctionGroup::Api).runtime, "nodejs12.x");
        assert_eq!(config.cdn.defaults.default_ttl, Some(5));
        assert!(config
            .cdn
            .defaults
            .triggers
            .contains_key(&Trigger::ViewerRequest));
        assert_eq!(config.cdn.behaviors[0].path, "blog/*");
        assert_eq!(config.cdn.behaviors[0].overrides.default_ttl, Some(60));
        assert_eq!(config.cdn.behaviors[0].overrides.forward.query_string, Some(false));
        assert_eq!(config.cdn.origins[0].url, "https://api.example.com");
    }

    #[test]
    fn test_api_only_overrides_leave_page_defaults() {
        let toml = r#"
[functions.memory]
api = 2048

[functions.timeout]
api = 25

[functions.runtime]
api = "nodejs14.x"

[functions.name]
api = "site-api"
"#;
        let config = load_config_from_str(toml).unwrap();
        let api = config.functions.resolve(FunctionGroup::Api);
        let page = config.functions.resolve(FunctionGroup::Page);
        assert_eq!((api.memory, api.timeout), (2048, 25));
        assert_eq!(api.runtime, "nodejs14.x");
        assert_eq!(api.name.as_deref(), Some("site-api"));
        assert_eq!((page.memory, page.timeout), (512, 10));
        assert_eq!(page.runtime, "nodejs12.x");
        assert_eq!(page.name, None);
    }

    #[test]
    fn test_names_split_per_group() {
        let toml = r#"
[functions]
name = { page = "site-pages", api = "site-api" }
timeout = 20
"#;
        let config = load_config_from_str(toml).unwrap();
        let api = config.functions.resolve(FunctionGroup::Api);
        let page = config.functions.resolve(FunctionGroup::Page);
        assert_eq!(page.name.as_deref(), Some("site-pages"));
        assert_eq!(api.name.as_deref(), Some("site-api"));
        assert_eq!((page.timeout, api.timeout), (20, 20));
    }

    #[test]
    fn test_validation_errors_are_reported_together() {
        let toml = r#"
[functions]
memory = 64
timeout = 90

[cdn]
price_class = "PriceClass_Cheap"
"#;
        let err = load_config_from_str(toml).unwrap_err();
        match &err {
            ConfigError::Validation(errors) => assert_eq!(errors.len(), 5),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("PriceClass_Cheap"));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            load_config_from_str("[build"),
            Err(ConfigError::Parse(_))
        ));
    }
}
