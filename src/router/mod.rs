//! Request router.
//!
//! # Responsibilities
//! - Resolve a request path against a loaded [`Manifest`]
//! - Return exactly one terminal decision per request
//!
//! # Algorithm
//! ```text
//! received
//!     → normalize (strip base path, percent-decode)
//!     → exact non-dynamic page       → MatchedStatic
//!     → exact non-dynamic API        → MatchedApi
//!     → dynamic pages, sorted order  → MatchedDynamic
//!     → dynamic APIs, sorted order   → MatchedApi
//!     → exact public asset           → MatchedAsset
//!     → redirect engine              → Redirect
//!     → NotFound
//! ```
//!
//! # Design Decisions
//! - Pure and synchronous: no I/O, no shared state, no cancellation points
//! - Precedence comes only from the pre-sorted manifest sequences
//! - Page lookups only run on paths already in the trailing-slash policy's
//!   canonical form; other paths fall through to the redirect step
//! - API lookups ignore a trailing slash and always run
//! - Percent-decoding borrows the input unless something was encoded

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::manifest::Manifest;
use crate::observability::metrics;
use crate::redirect::{self, Redirect, RedirectEngine};
use crate::routes::{Params, RenderKind};

/// Terminal routing decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum RouteDecision<'m> {
    MatchedStatic {
        route: &'m str,
        render: RenderKind,
        file: &'m str,
    },
    MatchedDynamic {
        route: &'m str,
        render: RenderKind,
        file: &'m str,
        params: Params,
    },
    MatchedApi {
        route: &'m str,
        file: &'m str,
        params: Params,
    },
    MatchedAsset {
        path: &'m str,
        key: &'m str,
    },
    Redirect(Redirect),
    NotFound,
}

impl RouteDecision<'_> {
    /// Stable state name, used as a metric label.
    pub fn state(&self) -> &'static str {
        match self {
            RouteDecision::MatchedStatic { .. } => "matched-static",
            RouteDecision::MatchedDynamic { .. } => "matched-dynamic",
            RouteDecision::MatchedApi { .. } => "matched-api",
            RouteDecision::MatchedAsset { .. } => "matched-asset",
            RouteDecision::Redirect(_) => "redirect",
            RouteDecision::NotFound => "not-found",
        }
    }
}

/// Strip the base path and percent-decode.
///
/// Returns `None` when the path lies outside the base path.
pub fn normalize<'p>(path: &'p str, base_path: &str) -> Option<Cow<'p, str>> {
    let stripped = if base_path.is_empty() {
        path
    } else {
        match path.strip_prefix(base_path) {
            Some("") => "/",
            Some(rest) if rest.starts_with('/') => rest,
            _ => return None,
        }
    };
    let stripped = if stripped.is_empty() { "/" } else { stripped };
    Some(percent_decode_str(stripped).decode_utf8_lossy())
}

/// Resolve a request path against the manifest.
pub fn route<'m>(manifest: &'m Manifest, path: &str) -> RouteDecision<'m> {
    let decision = resolve(manifest, path);
    metrics::record_route_decision(decision.state());
    tracing::debug!(path = %path, state = decision.state(), "Route resolved");
    decision
}

fn resolve<'m>(manifest: &'m Manifest, raw: &str) -> RouteDecision<'m> {
    let Some(path) = normalize(raw, &manifest.base_path) else {
        return RouteDecision::NotFound;
    };
    let path: &str = &path;

    let canonical = redirect::trailing_slash::is_canonical(path, manifest.trailing_slash);
    let page_key = lookup_key(path);

    if canonical {
        if let Some((route, render, file)) = manifest.static_page(page_key) {
            return RouteDecision::MatchedStatic {
                route,
                render,
                file,
            };
        }
    }

    if let Some((route, file)) = manifest.apis.non_dynamic.get_key_value(page_key) {
        return RouteDecision::MatchedApi {
            route: route.as_str(),
            file: file.as_str(),
            params: Params::default(),
        };
    }

    if canonical {
        for (render, entry) in manifest.dynamic_pages() {
            if let Some(params) = entry.matches(page_key) {
                return RouteDecision::MatchedDynamic {
                    route: entry.route(),
                    render,
                    file: entry.file(),
                    params,
                };
            }
        }
    }

    for entry in &manifest.apis.dynamic {
        if let Some(params) = entry.matches(page_key) {
            return RouteDecision::MatchedApi {
                route: entry.route(),
                file: entry.file(),
                params,
            };
        }
    }

    if let Some((path, key)) = manifest.public_files.get_key_value(path) {
        return RouteDecision::MatchedAsset {
            path: path.as_str(),
            key: key.as_str(),
        };
    }

    let engine = RedirectEngine::new(
        &manifest.base_path,
        manifest.trailing_slash,
        &manifest.redirects,
    );
    match engine.resolve(path) {
        Some(redirect) => RouteDecision::Redirect(redirect),
        None => RouteDecision::NotFound,
    }
}

/// Lookup form of a path: one trailing slash dropped, root kept.
fn lookup_key(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some("") | None => path,
        Some(trimmed) => trimmed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_base_path() {
        assert_eq!(normalize("/docs/intro", "/docs").as_deref(), Some("/intro"));
        assert_eq!(normalize("/docs", "/docs").as_deref(), Some("/"));
        assert_eq!(normalize("/docsx/intro", "/docs"), None);
        assert_eq!(normalize("/intro", "/docs"), None);
        assert_eq!(normalize("/intro", "").as_deref(), Some("/intro"));
    }

    #[test]
    fn test_normalize_decodes_without_copying_plain_paths() {
        assert!(matches!(normalize("/plain", ""), Some(Cow::Borrowed("/plain"))));
        assert_eq!(
            normalize("/caf%C3%A9/a%20b", "").as_deref(),
            Some("/café/a b")
        );
    }

    #[test]
    fn test_lookup_key() {
        assert_eq!(lookup_key("/"), "/");
        assert_eq!(lookup_key("/about/"), "/about");
        assert_eq!(lookup_key("/about"), "/about");
    }
}
