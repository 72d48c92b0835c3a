//! Redirect engine.
//!
//! # Data Flow
//! ```text
//! Build time:
//!     routes-manifest.json redirects
//!     → trailing_slash.rs (drop rules the automatic redirect already covers)
//!     → custom.rs (compile sources into segment matchers)
//!     → manifest.redirects
//!
//! Request time (router step 7):
//!     base-stripped path
//!     → trailing_slash::target (automatic rule, status 308)
//!     → custom redirects in declaration order
//!     → Redirect or None
//! ```
//!
//! # Design Decisions
//! - API paths are never redirected, automatically or by user rules
//! - The automatic rule is consulted before user rules
//! - Locations carry the base path; query strings are appended by the caller

use serde::Serialize;

pub mod custom;
pub mod trailing_slash;

pub use custom::{CustomRedirect, RedirectEntry, UnsupportedSource};
pub use trailing_slash::is_api_path;

/// Which rule produced a redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RedirectScope {
    /// The global trailing-slash normalization.
    TrailingSlash,
    /// A user rule for a specific source pattern.
    Custom { source: String },
}

/// A resolved redirect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
    pub scope: RedirectScope,
}

/// Resolve the automatic trailing-slash redirect for a base-stripped path.
pub fn resolve(path: &str, trailing_slash: bool) -> Option<Redirect> {
    trailing_slash::target(path, trailing_slash).map(|location| Redirect {
        status: trailing_slash::TRAILING_SLASH_STATUS,
        location,
        scope: RedirectScope::TrailingSlash,
    })
}

/// Redirect rules for one manifest.
#[derive(Debug, Clone, Copy)]
pub struct RedirectEngine<'m> {
    base_path: &'m str,
    trailing_slash: bool,
    custom: &'m [CustomRedirect],
}

impl<'m> RedirectEngine<'m> {
    pub fn new(base_path: &'m str, trailing_slash: bool, custom: &'m [CustomRedirect]) -> Self {
        Self {
            base_path,
            trailing_slash,
            custom,
        }
    }

    /// Resolve a redirect for a base-stripped, decoded path.
    pub fn resolve(&self, path: &str) -> Option<Redirect> {
        if let Some(mut redirect) = resolve(path, self.trailing_slash) {
            redirect.location.insert_str(0, self.base_path);
            return Some(redirect);
        }

        if is_api_path(path) || self.custom.is_empty() {
            return None;
        }

        let full = format!("{}{}", self.base_path, path);
        self.custom.iter().find_map(|rule| {
            rule.apply(&full).map(|location| Redirect {
                status: rule.status(),
                location,
                scope: RedirectScope::Custom {
                    source: rule.source().to_owned(),
                },
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(source: &str, destination: &str) -> CustomRedirect {
        CustomRedirect::try_from(RedirectEntry {
            source: source.into(),
            destination: destination.into(),
            status_code: Some(301),
            permanent: None,
            internal: false,
            regex: None,
        })
        .unwrap()
    }

    #[test]
    fn test_automatic_rule_prefixes_base_path() {
        let engine = RedirectEngine::new("/docs", false, &[]);
        let redirect = engine.resolve("/intro/").unwrap();
        assert_eq!(redirect.location, "/docs/intro");
        assert_eq!(redirect.status, 308);
        assert_eq!(redirect.scope, RedirectScope::TrailingSlash);
    }

    #[test]
    fn test_custom_rule_matches_full_path() {
        let rules = [rule("/docs/old/:page", "/docs/new/:page")];
        let engine = RedirectEngine::new("/docs", false, &rules);
        let redirect = engine.resolve("/old/intro").unwrap();
        assert_eq!(redirect.location, "/docs/new/intro");
        assert_eq!(redirect.status, 301);
        assert_eq!(
            redirect.scope,
            RedirectScope::Custom {
                source: "/docs/old/:page".into()
            }
        );
    }

    #[test]
    fn test_custom_rules_skip_api() {
        let rules = [rule("/api/:rest*", "/v2/api/:rest*")];
        let engine = RedirectEngine::new("", false, &rules);
        assert_eq!(engine.resolve("/api/users"), None);
    }

    #[test]
    fn test_first_declared_rule_wins() {
        let rules = [rule("/a/:x", "/first/:x"), rule("/a/:x", "/second/:x")];
        let engine = RedirectEngine::new("", false, &rules);
        assert_eq!(engine.resolve("/a/1").unwrap().location, "/first/1");
    }
}
