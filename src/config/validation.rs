//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (memory, timeout)
//! - Check enumerations serde cannot express (price class)
//! - Check that user patterns and origin URLs parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Pure function: DeployConfig → Result<(), Vec<ValidationError>>
//! - Whether a cache-behavior path exists in the build is checked later, by
//!   the distribution generator, once the manifest is known

use regex::Regex;
use url::Url;

use crate::config::schema::{
    BehaviorOverride, DeployConfig, FunctionGroup, PathBehavior, PublicDirectoryCache,
};

const PRICE_CLASSES: [&str; 3] = ["PriceClass_All", "PriceClass_200", "PriceClass_100"];
const MEMORY_RANGE: std::ops::RangeInclusive<u32> = 128..=10240;
const TIMEOUT_RANGE: std::ops::RangeInclusive<u32> = 1..=30;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Validate a deploy configuration, collecting every error.
pub fn validate_config(config: &DeployConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for group in [FunctionGroup::Page, FunctionGroup::Api] {
        let sizing = config.functions.resolve(group);
        if !MEMORY_RANGE.contains(&sizing.memory) {
            errors.push(ValidationError::new(
                format!("functions.memory.{}", group.as_str()),
                format!(
                    "{} MB is outside {}..={} MB",
                    sizing.memory,
                    MEMORY_RANGE.start(),
                    MEMORY_RANGE.end()
                ),
            ));
        }
        if !TIMEOUT_RANGE.contains(&sizing.timeout) {
            errors.push(ValidationError::new(
                format!("functions.timeout.{}", group.as_str()),
                format!(
                    "{} s is outside {}..={} s",
                    sizing.timeout,
                    TIMEOUT_RANGE.start(),
                    TIMEOUT_RANGE.end()
                ),
            ));
        }
        if sizing.runtime.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("functions.runtime.{}", group.as_str()),
                "runtime must not be empty",
            ));
        }
    }

    if let PublicDirectoryCache::Custom {
        test: Some(test), ..
    } = &config.assets.public_directory_cache
    {
        if let Err(e) = Regex::new(test) {
            errors.push(ValidationError::new(
                "assets.public_directory_cache.test",
                format!("invalid pattern {test:?}: {e}"),
            ));
        }
    }

    if !PRICE_CLASSES.contains(&config.cdn.price_class.as_str()) {
        errors.push(ValidationError::new(
            "cdn.price_class",
            format!(
                "unknown price class {:?}, expected one of {}",
                config.cdn.price_class,
                PRICE_CLASSES.join(", ")
            ),
        ));
    }

    validate_override("cdn.defaults", &config.cdn.defaults, &mut errors);
    validate_behaviors("cdn.behaviors", &config.cdn.behaviors, &mut errors);

    for (i, origin) in config.cdn.origins.iter().enumerate() {
        let field = format!("cdn.origins[{i}]");
        if let Err(e) = Url::parse(&origin.url) {
            errors.push(ValidationError::new(
                format!("{field}.url"),
                format!("invalid URL {:?}: {e}", origin.url),
            ));
        }
        validate_behaviors(&format!("{field}.behaviors"), &origin.behaviors, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_behaviors(field: &str, behaviors: &[PathBehavior], errors: &mut Vec<ValidationError>) {
    for (i, behavior) in behaviors.iter().enumerate() {
        let field = format!("{field}[{i}]");
        if behavior.path.trim_start_matches('/').is_empty() {
            errors.push(ValidationError::new(
                format!("{field}.path"),
                "path pattern must not be empty",
            ));
        }
        validate_override(&field, &behavior.overrides, errors);
    }
}

fn validate_override(field: &str, overrides: &BehaviorOverride, errors: &mut Vec<ValidationError>) {
    if let (Some(min), Some(max)) = (overrides.min_ttl, overrides.max_ttl) {
        if min > max {
            errors.push(ValidationError::new(
                format!("{field}.min_ttl"),
                format!("min_ttl {min} exceeds max_ttl {max}"),
            ));
        }
    }
    for (trigger, function) in &overrides.triggers {
        if function.trim().is_empty() {
            errors.push(ValidationError::new(
                format!("{field}.triggers.{}", trigger.as_str()),
                "function reference must not be empty",
            ));
        }
    }
}
