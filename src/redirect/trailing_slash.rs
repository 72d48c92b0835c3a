//! Automatic trailing-slash normalization.

use super::RedirectEntry;

/// Status used for every automatic trailing-slash redirect.
pub const TRAILING_SLASH_STATUS: u16 = 308;

/// API paths are never redirected.
pub fn is_api_path(path: &str) -> bool {
    path == "/api" || path.starts_with("/api/")
}

fn has_file_extension(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or_default();
    matches!(last.rfind('.'), Some(i) if i > 0 && i + 1 < last.len())
}

/// Whether `path` is already in the form the policy asks for.
pub fn is_canonical(path: &str, trailing_slash: bool) -> bool {
    target(path, trailing_slash).is_none()
}

/// Target path for the automatic redirect, if `path` needs one.
///
/// `path` has the base path stripped. Root, API paths, and paths already in
/// the desired form never redirect; with `trailing_slash` set, paths whose
/// last segment carries a file extension are left alone.
pub fn target(path: &str, trailing_slash: bool) -> Option<String> {
    if path == "/" || is_api_path(path) {
        return None;
    }

    if trailing_slash {
        if path.ends_with('/') || has_file_extension(path) {
            return None;
        }
        Some(format!("{path}/"))
    } else if path.ends_with('/') {
        let trimmed = path.trim_end_matches('/');
        Some(if trimmed.is_empty() { "/" } else { trimmed }.to_owned())
    } else {
        None
    }
}

/// Whether a user redirect duplicates the automatic behavior.
///
/// The framework flags the rules it generates for its own trailing-slash
/// handling as `internal`; the known generated pairs are matched as well so
/// older build outputs without the flag are filtered too.
pub fn duplicates_automatic(entry: &RedirectEntry, base_path: &str) -> bool {
    if entry.internal {
        return true;
    }
    let (Some(source), Some(destination)) = (
        entry.source.strip_prefix(base_path),
        entry.destination.strip_prefix(base_path),
    ) else {
        return false;
    };

    (source == "/:path+/" && destination == "/:path+")
        || (source.starts_with("/:file(") && source.ends_with(")/") && destination == "/:file")
        || (source.starts_with("/:notfile(") && destination == "/:notfile/")
}

/// Drop user redirects that the automatic rule already performs.
pub fn filter_duplicates(entries: Vec<RedirectEntry>, base_path: &str) -> Vec<RedirectEntry> {
    entries
        .into_iter()
        .filter(|entry| {
            let duplicate = duplicates_automatic(entry, base_path);
            if duplicate {
                tracing::debug!(source = %entry.source, "Dropping redirect handled by trailing-slash normalization");
            }
            !duplicate
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(source: &str, destination: &str) -> RedirectEntry {
        RedirectEntry {
            source: source.into(),
            destination: destination.into(),
            status_code: Some(308),
            permanent: None,
            internal: false,
            regex: None,
        }
    }

    #[test]
    fn test_strip_when_policy_off() {
        assert_eq!(target("/about/", false).as_deref(), Some("/about"));
        assert_eq!(target("/about", false), None);
        assert_eq!(target("/", false), None);
    }

    #[test]
    fn test_add_when_policy_on() {
        assert_eq!(target("/about", true).as_deref(), Some("/about/"));
        assert_eq!(target("/about/", true), None);
        assert_eq!(target("/robots.txt", true), None);
        assert_eq!(target("/", true), None);
    }

    #[test]
    fn test_api_paths_never_redirect() {
        assert_eq!(target("/api/users/", false), None);
        assert_eq!(target("/api/users", true), None);
        assert_eq!(target("/api", true), None);
        assert!(target("/apiary", true).is_some());
    }

    #[test]
    fn test_duplicate_detection() {
        assert!(duplicates_automatic(&entry("/:path+/", "/:path+"), ""));
        assert!(duplicates_automatic(
            &entry("/docs/:path+/", "/docs/:path+"),
            "/docs"
        ));
        assert!(duplicates_automatic(
            &entry(r"/:file((?:[^/]+/)*[^/]+\.\w+)/", "/:file"),
            ""
        ));
        assert!(duplicates_automatic(
            &entry(r"/:notfile((?:[^/]+/)*[^/\.]+)", "/:notfile/"),
            ""
        ));
        assert!(!duplicates_automatic(&entry("/old", "/new"), ""));

        let mut flagged = entry("/anything", "/else");
        flagged.internal = true;
        assert!(duplicates_automatic(&flagged, ""));
    }

    #[test]
    fn test_filter_keeps_user_rules() {
        let kept = filter_duplicates(
            vec![entry("/:path+/", "/:path+"), entry("/old", "/new")],
            "",
        );
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].source, "/old");
    }
}
