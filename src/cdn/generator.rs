//! Cache behavior descriptor generation.
//!
//! # Responsibilities
//! - Seed the system behaviors every deployment needs
//! - Merge user per-path behaviors in declaration order
//! - Keep the router's own triggers on the default and API behaviors
//! - Wrap everything into a distribution descriptor
//!
//! # Design Decisions
//! - Reserved triggers are stripped from user input only for the default
//!   and the API-prefix behaviors; `_next/data/*` and custom paths take user
//!   triggers as given
//! - Behavior order is explicit (a `Vec`), never map iteration order
//! - Validation runs before anything is generated

use serde::Serialize;
use url::Url;

use crate::cdn::behavior::{CacheBehavior, Forward, ForwardSet, Method, Trigger};
use crate::cdn::validate::{path_pattern, validate_paths};
use crate::config::{BehaviorOverride, CdnConfig, PathBehavior};
use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::observability::metrics;

/// Published function versions the behaviors point at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeFunctions {
    /// Page handler version reference (`arn:...:function:name:version`).
    pub page: String,
    /// API handler version reference.
    pub api: String,
}

/// A behavior bound to a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathPatternBehavior {
    pub path_pattern: String,
    #[serde(flatten)]
    pub behavior: CacheBehavior,
}

/// A distribution origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Origin {
    pub url: String,
    pub private: bool,
    pub path_patterns: Vec<PathPatternBehavior>,
}

/// The CDN distribution descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub origins: Vec<Origin>,
    pub default_behavior: CacheBehavior,
    pub price_class: String,
}

impl Distribution {
    /// Behaviors of the storage origin, in precedence order.
    pub fn behaviors(&self) -> &[PathPatternBehavior] {
        self.origins
            .first()
            .map(|o| o.path_patterns.as_slice())
            .unwrap_or_default()
    }

    pub fn behavior(&self, path_pattern: &str) -> Option<&CacheBehavior> {
        self.behaviors()
            .iter()
            .find(|b| b.path_pattern == path_pattern)
            .map(|b| &b.behavior)
    }
}

fn api_behavior(functions: &EdgeFunctions) -> CacheBehavior {
    CacheBehavior {
        allowed_methods: Method::ALL.to_vec(),
        forward: Forward {
            cookies: ForwardSet::all(),
            headers: ForwardSet::none(),
            query_string: true,
        },
        ..CacheBehavior::uncached()
    }
    .with_trigger(Trigger::OriginRequest, &functions.api)
}

fn default_behavior(functions: &EdgeFunctions) -> CacheBehavior {
    CacheBehavior {
        allowed_methods: Method::ALL.to_vec(),
        forward: Forward {
            cookies: ForwardSet::all(),
            headers: ForwardSet::none(),
            query_string: true,
        },
        ..CacheBehavior::uncached()
    }
    .with_trigger(Trigger::OriginRequest, &functions.page)
    .with_trigger(Trigger::OriginResponse, &functions.page)
}

/// System behaviors for the storage origin, in precedence order.
fn system_behaviors(manifest: &Manifest, functions: &EdgeFunctions) -> Vec<PathPatternBehavior> {
    let base = &manifest.base_path;
    let mut behaviors = vec![
        PathPatternBehavior {
            path_pattern: path_pattern("_next/static/*", base),
            behavior: CacheBehavior::static_assets(),
        },
        PathPatternBehavior {
            path_pattern: path_pattern("static/*", base),
            behavior: CacheBehavior::static_assets(),
        },
    ];
    if manifest.has_api_routes() {
        behaviors.push(PathPatternBehavior {
            path_pattern: path_pattern("api/*", base),
            behavior: api_behavior(functions),
        });
    }
    behaviors.push(PathPatternBehavior {
        path_pattern: path_pattern("_next/data/*", base),
        behavior: CacheBehavior::uncached()
            .with_trigger(Trigger::OriginRequest, &functions.page)
            .with_trigger(Trigger::OriginResponse, &functions.page),
    });
    behaviors
}

/// Copy of `overrides` without the router's reserved triggers.
fn without_reserved(overrides: &BehaviorOverride, path_pattern: &str) -> BehaviorOverride {
    let mut filtered = overrides.clone();
    filtered.triggers.retain(|trigger, _| {
        if trigger.is_reserved() {
            tracing::warn!(
                path_pattern = %path_pattern,
                trigger = trigger.as_str(),
                "Discarding user trigger reserved for the edge router"
            );
            metrics::record_discarded_trigger(path_pattern);
            false
        } else {
            true
        }
    });
    filtered
}

fn merge_user_behaviors(
    behaviors: &mut Vec<PathPatternBehavior>,
    user: &[PathBehavior],
    manifest: &Manifest,
    functions: &EdgeFunctions,
) {
    let api_pattern = path_pattern("api/*", &manifest.base_path);

    for entry in user {
        let pattern = path_pattern(&entry.path, &manifest.base_path);
        let is_api = pattern == api_pattern;
        let overrides = if is_api {
            without_reserved(&entry.overrides, &pattern)
        } else {
            entry.overrides.clone()
        };

        match behaviors.iter_mut().find(|b| b.path_pattern == pattern) {
            Some(existing) => existing.behavior.apply(&overrides),
            None => {
                let mut behavior = if is_api {
                    api_behavior(functions)
                } else {
                    CacheBehavior::uncached().with_trigger(Trigger::OriginRequest, &functions.page)
                };
                behavior.apply(&overrides);
                behaviors.push(PathPatternBehavior {
                    path_pattern: pattern,
                    behavior,
                });
            }
        }
    }
}

/// Generate the distribution descriptor for a compiled build.
pub fn generate(
    config: &CdnConfig,
    manifest: &Manifest,
    storage_origin: &str,
    functions: &EdgeFunctions,
) -> Result<Distribution> {
    validate_paths(config.behaviors.iter().map(|b| b.path.as_str()), manifest)?;
    let storage_origin = Url::parse(storage_origin).map_err(|e| {
        Error::Validation(format!("invalid storage origin URL {storage_origin:?}: {e}"))
    })?;

    let mut behaviors = system_behaviors(manifest, functions);
    merge_user_behaviors(&mut behaviors, &config.behaviors, manifest, functions);

    let mut default = default_behavior(functions);
    default.apply(&without_reserved(&config.defaults, "*"));

    let mut origins = vec![Origin {
        url: storage_origin.to_string(),
        private: true,
        path_patterns: behaviors,
    }];
    for origin in &config.origins {
        origins.push(Origin {
            url: origin.url.clone(),
            private: origin.private,
            path_patterns: origin
                .behaviors
                .iter()
                .map(|b| {
                    let mut behavior = CacheBehavior::uncached();
                    behavior.apply(&b.overrides);
                    PathPatternBehavior {
                        path_pattern: b.path.trim_start_matches('/').to_owned(),
                        behavior,
                    }
                })
                .collect(),
        });
    }

    tracing::info!(
        behaviors = origins[0].path_patterns.len(),
        origins = origins.len(),
        price_class = %config.price_class,
        "Distribution descriptor generated"
    );

    Ok(Distribution {
        origins,
        default_behavior: default,
        price_class: config.price_class.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{PageGroups, RouteGroup};
    use std::collections::BTreeMap;

    const PAGE_FN: &str = "arn:aws:lambda:us-east-1:1:function:page:7";
    const API_FN: &str = "arn:aws:lambda:us-east-1:1:function:api:3";
    const STORAGE: &str = "https://bucket.s3.amazonaws.com";

    fn functions() -> EdgeFunctions {
        EdgeFunctions {
            page: PAGE_FN.into(),
            api: API_FN.into(),
        }
    }

    fn manifest(base_path: &str) -> Manifest {
        let mut pages = PageGroups::default();
        pages
            .ssr
            .non_dynamic
            .insert("/about".into(), "pages/about.js".into());
        let mut apis = RouteGroup::default();
        apis.non_dynamic
            .insert("/api/ping".into(), "pages/api/ping.js".into());
        Manifest {
            build_id: "b".into(),
            base_path: base_path.into(),
            trailing_slash: false,
            log_execution_times: false,
            pages,
            apis,
            public_files: BTreeMap::new(),
            redirects: Vec::new(),
        }
    }

    fn user(path: &str, overrides: BehaviorOverride) -> PathBehavior {
        PathBehavior {
            path: path.into(),
            overrides,
        }
    }

    fn triggers(pairs: &[(Trigger, &str)]) -> BTreeMap<Trigger, String> {
        pairs.iter().map(|(t, f)| (*t, f.to_string())).collect()
    }

    #[test]
    fn test_system_behaviors_in_order() {
        let d = generate(&CdnConfig::default(), &manifest(""), STORAGE, &functions()).unwrap();
        let patterns: Vec<_> = d.behaviors().iter().map(|b| b.path_pattern.as_str()).collect();
        assert_eq!(patterns, ["_next/static/*", "static/*", "api/*", "_next/data/*"]);
        assert_eq!(d.behavior("api/*").unwrap().triggers[&Trigger::OriginRequest], API_FN);
        assert_eq!(d.default_behavior.triggers[&Trigger::OriginResponse], PAGE_FN);
        assert!(d.origins[0].private);
    }

    #[test]
    fn test_user_reserved_trigger_on_api_discarded() {
        let mut config = CdnConfig::default();
        config.behaviors.push(user(
            "api/*",
            BehaviorOverride {
                default_ttl: Some(30),
                triggers: triggers(&[
                    (Trigger::OriginRequest, "user:fn:1"),
                    (Trigger::ViewerRequest, "user:fn:2"),
                ]),
                ..Default::default()
            },
        ));
        let d = generate(&config, &manifest(""), STORAGE, &functions()).unwrap();
        let api = d.behavior("api/*").unwrap();
        assert_eq!(api.triggers[&Trigger::OriginRequest], API_FN);
        assert_eq!(api.triggers[&Trigger::ViewerRequest], "user:fn:2");
        assert_eq!(api.default_ttl, 30);
    }

    #[test]
    fn test_user_reserved_trigger_on_default_discarded() {
        let mut config = CdnConfig::default();
        config.defaults.triggers = triggers(&[
            (Trigger::OriginResponse, "user:fn:1"),
            (Trigger::ViewerResponse, "user:fn:2"),
        ]);
        let d = generate(&config, &manifest(""), STORAGE, &functions()).unwrap();
        assert_eq!(d.default_behavior.triggers[&Trigger::OriginResponse], PAGE_FN);
        assert_eq!(d.default_behavior.triggers[&Trigger::ViewerResponse], "user:fn:2");
    }

    #[test]
    fn test_data_prefix_passes_user_triggers_through() {
        let mut config = CdnConfig::default();
        config.behaviors.push(user(
            "_next/data/*",
            BehaviorOverride {
                triggers: triggers(&[(Trigger::OriginRequest, "user:fn:9")]),
                ..Default::default()
            },
        ));
        let d = generate(&config, &manifest(""), STORAGE, &functions()).unwrap();
        let data = d.behavior("_next/data/*").unwrap();
        assert_eq!(data.triggers[&Trigger::OriginRequest], "user:fn:9");
        assert_eq!(data.triggers[&Trigger::OriginResponse], PAGE_FN);
    }

    #[test]
    fn test_custom_page_path_appended_with_router_trigger() {
        let mut config = CdnConfig::default();
        config.behaviors.push(user(
            "/about",
            BehaviorOverride {
                default_ttl: Some(300),
                ..Default::default()
            },
        ));
        let d = generate(&config, &manifest("/docs"), STORAGE, &functions()).unwrap();
        let last = d.behaviors().last().unwrap();
        assert_eq!(last.path_pattern, "docs/about");
        assert_eq!(last.behavior.default_ttl, 300);
        assert_eq!(last.behavior.triggers[&Trigger::OriginRequest], PAGE_FN);
        assert_eq!(d.behaviors()[0].path_pattern, "docs/_next/static/*");
    }

    #[test]
    fn test_invalid_path_fails() {
        let mut config = CdnConfig::default();
        config
            .behaviors
            .push(user("some-invalid-page-route", BehaviorOverride::default()));
        let err = generate(&config, &manifest(""), STORAGE, &functions()).unwrap_err();
        assert!(err.to_string().contains("some-invalid-page-route"));
    }

    #[test]
    fn test_invalid_storage_origin() {
        let err = generate(&CdnConfig::default(), &manifest(""), "bucket", &functions()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
