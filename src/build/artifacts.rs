//! Reading the framework's build output.
//!
//! # Responsibilities
//! - Load the required declarations (pages manifest, build id)
//! - Load the optional ones with empty defaults
//! - Enumerate files under a directory tree with forward-slash paths

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::build::context::BuildContext;
use crate::error::{Error, Result};
use crate::manifest::RoutesDescriptor;

pub const PAGES_MANIFEST: &str = "pages-manifest.json";
pub const PRERENDER_MANIFEST: &str = "prerender-manifest.json";
pub const ROUTES_MANIFEST: &str = "routes-manifest.json";
pub const BUILD_ID: &str = "BUILD_ID";

/// One pre-rendered output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerenderRoute {
    /// The dynamic page template this output came from, if any.
    #[serde(default)]
    pub src_route: Option<String>,
    #[serde(default)]
    pub data_route: Option<String>,
}

/// Pre-render metadata emitted by the framework.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrerenderManifest {
    #[serde(default)]
    pub routes: BTreeMap<String, PrerenderRoute>,
}

impl PrerenderManifest {
    /// Whether the page at `template` is fully served by its pre-rendered
    /// HTML, so its module is never needed at request time.
    ///
    /// Dynamic templates never qualify: paths outside the pre-rendered set
    /// still render through the module.
    pub fn is_build_time_only(&self, template: &str) -> bool {
        self.routes
            .get(template)
            .is_some_and(|route| route.src_route.is_none())
    }

    /// Pre-rendered outputs of the dynamic page `template`.
    pub fn outputs_of<'a>(&'a self, template: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.routes
            .iter()
            .filter(move |(_, r)| r.src_route.as_deref() == Some(template))
            .map(|(path, _)| path.as_str())
    }
}

/// Serverless output file holding the pre-rendered HTML for `path`
/// (`/` → `pages/index.html`, `/blog/first` → `pages/blog/first.html`).
pub fn prerendered_html_file(path: &str) -> String {
    match path.trim_matches('/') {
        "" => "pages/index.html".to_owned(),
        page => format!("pages/{page}.html"),
    }
}

/// Everything the compiler and bundler read from disk.
#[derive(Debug, Clone)]
pub struct BuildArtifacts {
    pub build_id: String,
    /// Route template → file relative to the serverless directory.
    pub pages: BTreeMap<String, String>,
    pub prerender: PrerenderManifest,
    pub routes: RoutesDescriptor,
    /// Paths relative to `public/`, forward slashes.
    pub public_files: Vec<String>,
}

impl BuildArtifacts {
    /// Read every artifact of the build at `ctx.build_dir`.
    pub async fn load(ctx: &BuildContext) -> Result<Self> {
        let pages_path = ctx.serverless_dir().join(PAGES_MANIFEST);
        let pages: Option<BTreeMap<String, String>> = read_json(&pages_path).await?;
        let pages = pages.ok_or(Error::Configuration {
            artifact: PAGES_MANIFEST,
            path: pages_path,
            hint: "Check that the build target is set to \"serverless\" in the framework config",
        })?;

        let id_path = ctx.build_dir.join(BUILD_ID);
        let build_id = match tokio::fs::read_to_string(&id_path).await {
            Ok(id) => id.trim().to_owned(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::Configuration {
                    artifact: BUILD_ID,
                    path: id_path,
                    hint: "Run the framework build before deploying",
                })
            }
            Err(e) => return Err(Error::io(id_path, e)),
        };

        let prerender = read_json(&ctx.build_dir.join(PRERENDER_MANIFEST))
            .await?
            .unwrap_or_default();
        let routes = read_json(&ctx.build_dir.join(ROUTES_MANIFEST))
            .await?
            .unwrap_or_default();
        let public_files = walk(&ctx.public_dir()).await?;

        tracing::info!(
            build_id = %build_id,
            pages = pages.len(),
            public_files = public_files.len(),
            "Build artifacts loaded"
        );

        Ok(Self {
            build_id,
            pages,
            prerender,
            routes,
            public_files,
        })
    }
}

/// Read a JSON file; `None` when it does not exist.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| Error::json(path, e)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

/// Every file under `root`, relative to it, with forward slashes, sorted.
///
/// A missing root yields an empty list.
pub async fn walk(root: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && dir == root => {
                return Ok(files)
            }
            Err(e) => return Err(Error::io(dir, e)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| Error::io(&dir, e))? {
            let path = entry.path();
            let file_type = entry.file_type().await.map_err(|e| Error::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if let Ok(relative) = path.strip_prefix(root) {
                files.push(to_slash(relative));
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Render a relative path with forward slashes.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeployConfig;
    use crate::build::context::RuntimeConfig;

    fn context(app_dir: &Path) -> BuildContext {
        let mut config = DeployConfig::default();
        config.build.app_dir = app_dir.to_path_buf();
        BuildContext::new(&config, &RuntimeConfig::Absent)
    }

    #[tokio::test]
    async fn test_missing_pages_manifest_names_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let err = BuildArtifacts::load(&context(dir.path())).await.unwrap_err();
        let message = err.to_string();
        assert!(matches!(err, Error::Configuration { artifact: PAGES_MANIFEST, .. }));
        assert!(message.contains("pages-manifest.json"));
        assert!(message.contains("serverless"));
    }

    #[tokio::test]
    async fn test_missing_build_id() {
        let dir = tempfile::tempdir().unwrap();
        let serverless = dir.path().join(".next/serverless");
        std::fs::create_dir_all(&serverless).unwrap();
        std::fs::write(serverless.join(PAGES_MANIFEST), "{}").unwrap();
        let err = BuildArtifacts::load(&context(dir.path())).await.unwrap_err();
        assert!(matches!(err, Error::Configuration { artifact: BUILD_ID, .. }));
    }

    #[tokio::test]
    async fn test_walk_uses_forward_slashes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
        std::fs::write(dir.path().join("a/b/c.txt"), "").unwrap();
        std::fs::write(dir.path().join("root.txt"), "").unwrap();
        assert_eq!(walk(dir.path()).await.unwrap(), ["a/b/c.txt", "root.txt"]);
        assert!(walk(&dir.path().join("missing")).await.unwrap().is_empty());
    }

    #[test]
    fn test_prerendered_pages() {
        let manifest: PrerenderManifest = serde_json::from_value(serde_json::json!({
            "routes": {
                "/about": {},
                "/blog/first": {"srcRoute": "/blog/[id]", "dataRoute": "/_next/data/b/blog/first.json"}
            }
        }))
        .unwrap();
        assert!(manifest.is_build_time_only("/about"));
        assert!(!manifest.is_build_time_only("/blog/[id]"));
        assert!(!manifest.is_build_time_only("/blog/first"));
        assert!(!manifest.is_build_time_only("/contact"));
        assert_eq!(manifest.outputs_of("/blog/[id]").collect::<Vec<_>>(), ["/blog/first"]);
    }

    #[test]
    fn test_prerendered_html_file() {
        assert_eq!(prerendered_html_file("/"), "pages/index.html");
        assert_eq!(prerendered_html_file("/blog/first"), "pages/blog/first.html");
    }
}
