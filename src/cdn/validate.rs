//! User path-pattern validation against the compiled manifest.
//!
//! # Responsibilities
//! - Reject duplicate path patterns
//! - Reject custom behaviors under the API prefix
//! - Require every remaining pattern to reach at least one page, API route,
//!   or public file in the manifest
//!
//! # Design Decisions
//! - Patterns use CloudFront glob semantics: `*` any run of characters,
//!   `?` exactly one
//! - Static paths are tested with the glob; dynamic routes are globbed in
//!   their express form, so `blog/*` reaches `/blog/:id` while a literal
//!   pattern never reaches a root `/:slug` page

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::manifest::Manifest;
use crate::redirect::is_api_path;

/// Patterns served by system behaviors; no page needs to back them.
pub const SYSTEM_PATTERNS: [&str; 5] = [
    "_next/static/*",
    "static/*",
    "api/*",
    "_next/data/*",
    "_next/*",
];

/// Prefix a path pattern with the base path (without its leading slash).
pub fn path_pattern(pattern: &str, base_path: &str) -> String {
    let pattern = pattern.trim_start_matches('/');
    let base = base_path.trim_matches('/');
    if base.is_empty() {
        pattern.to_owned()
    } else {
        format!("{base}/{pattern}")
    }
}

/// CloudFront-style glob match.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let (p, t) = (pattern.as_bytes(), text.as_bytes());
    let (mut pi, mut ti) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        match p.get(pi) {
            Some(b'*') => {
                backtrack = Some((pi, ti));
                pi += 1;
            }
            Some(&c) if c == b'?' || c == t[ti] => {
                pi += 1;
                ti += 1;
            }
            _ => match backtrack {
                Some((star, matched)) => {
                    pi = star + 1;
                    ti = matched + 1;
                    backtrack = Some((star, matched + 1));
                }
                None => return false,
            },
        }
    }
    p[pi..].iter().all(|&c| c == b'*')
}

fn reaches_manifest(pattern: &str, manifest: &Manifest) -> bool {
    let path = format!("/{pattern}");

    let static_paths = manifest
        .pages
        .ssr
        .non_dynamic
        .keys()
        .chain(manifest.pages.html.non_dynamic.keys())
        .chain(manifest.apis.non_dynamic.keys())
        .chain(manifest.public_files.keys());
    if static_paths.into_iter().any(|p| glob_match(&path, p)) {
        return true;
    }

    manifest
        .dynamic_pages()
        .map(|(_, route)| route)
        .chain(manifest.apis.dynamic.iter())
        .any(|route| glob_match(&path, &route.express()))
}

/// Validate user path patterns (relative to the base path).
pub fn validate_paths<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
    manifest: &Manifest,
) -> Result<()> {
    let mut seen = HashSet::new();
    let mut missing = Vec::new();

    for raw in patterns {
        let pattern = raw.trim_start_matches('/');
        if !seen.insert(pattern) {
            return Err(Error::Validation(format!(
                "Duplicate path {raw:?} declared in CDN configuration"
            )));
        }
        if SYSTEM_PATTERNS.contains(&pattern) {
            continue;
        }
        if is_api_path(&format!("/{pattern}")) {
            return Err(Error::Validation(format!(
                "Setting a custom cache behavior for API route {raw:?} is not supported"
            )));
        }
        if !reaches_manifest(pattern, manifest) {
            missing.push(raw);
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(Error::Validation(format!(
            "CDN configuration failed validation. Could not find pages for {}",
            missing
                .iter()
                .map(|p| format!("{p:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{DynamicRoute, PageGroups, RouteGroup};
    use crate::routes::classify;
    use std::collections::BTreeMap;

    fn manifest() -> Manifest {
        let mut pages = PageGroups::default();
        pages
            .ssr
            .non_dynamic
            .insert("/about".into(), "pages/about.js".into());
        pages
            .html
            .non_dynamic
            .insert("/terms".into(), "pages/terms.html".into());
        pages.ssr.dynamic.push(DynamicRoute::from_route(
            &classify("/blog/[id]", "pages/blog/[id].js").unwrap(),
            0,
        ));
        let mut public_files = BTreeMap::new();
        public_files.insert("/favicon.ico".into(), "public/favicon.ico".into());
        Manifest {
            build_id: "b".into(),
            base_path: String::new(),
            trailing_slash: false,
            log_execution_times: false,
            pages,
            apis: RouteGroup::default(),
            public_files,
            redirects: Vec::new(),
        }
    }

    #[test]
    fn test_glob() {
        assert!(glob_match("/blog/*", "/blog/a/b"));
        assert!(glob_match("/*", "/"));
        assert!(glob_match("/a?c", "/abc"));
        assert!(!glob_match("/a?c", "/ac"));
        assert!(glob_match("*.ico", "/favicon.ico"));
        assert!(!glob_match("/about", "/about/team"));
    }

    #[test]
    fn test_path_pattern_prefixes_base_path() {
        assert_eq!(path_pattern("api/*", ""), "api/*");
        assert_eq!(path_pattern("/api/*", "/docs"), "docs/api/*");
    }

    #[test]
    fn test_known_paths_pass() {
        let m = manifest();
        validate_paths(
            ["about", "/terms", "blog/*", "*.ico", "_next/data/*", "static/*"],
            &m,
        )
        .unwrap();
    }

    #[test]
    fn test_unknown_path_named_in_error() {
        let err = validate_paths(["about", "some-invalid-page-route"], &manifest()).unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("some-invalid-page-route"));
    }

    #[test]
    fn test_root_dynamic_page_does_not_absorb_literal_patterns() {
        let mut m = manifest();
        m.pages.ssr.dynamic.push(DynamicRoute::from_route(
            &classify("/[slug]", "pages/[slug].js").unwrap(),
            1,
        ));
        m.pages.ssr.dynamic.push(DynamicRoute::from_route(
            &classify("/docs/[...path]", "pages/docs/[...path].js").unwrap(),
            2,
        ));
        let err = validate_paths(["some-invalid-page-route"], &m).unwrap_err();
        assert!(err.to_string().contains("some-invalid-page-route"));
        validate_paths(["docs/*", "/:slug", "blog/:id"], &m).unwrap();
    }

    #[test]
    fn test_duplicates_and_api_rejected() {
        let m = manifest();
        assert!(validate_paths(["about", "/about"], &m)
            .unwrap_err()
            .to_string()
            .contains("Duplicate"));
        assert!(validate_paths(["api/users"], &m)
            .unwrap_err()
            .to_string()
            .contains("api/users"));
    }
}
