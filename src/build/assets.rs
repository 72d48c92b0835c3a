//! Public asset index.
//!
//! Lists every file that is served from storage rather than a function,
//! with its storage key and Cache-Control header. The upload itself is a
//! collaborator's job; this module only decides what goes where.

use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::build::artifacts::walk;
use crate::build::context::BuildContext;
use crate::config::PublicDirectoryCache;
use crate::error::{Error, Result};
use crate::manifest::Manifest;

/// File name of the index inside the output directory.
pub const ASSET_INDEX_FILE: &str = "assets.json";

pub const IMMUTABLE_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
pub const PUBLIC_CACHE_CONTROL: &str = "public, max-age=31536000, must-revalidate";
pub const HTML_CACHE_CONTROL: &str = "public, max-age=0, s-maxage=2678400, must-revalidate";
pub const DEFAULT_PUBLIC_CACHE_TEST: &str = r"(?i)\.(gif|jpe?g|jp2|tiff|png|webp|bmp|svg|ico)$";

/// Storage prefix for pre-rendered pages.
pub const STATIC_PAGES_PREFIX: &str = "static-pages";

/// One uploadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEntry {
    /// URL path the file answers.
    pub path: String,
    /// Key in the storage origin.
    pub key: String,
    pub source: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

/// Every uploadable file of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetIndex {
    pub entries: Vec<AssetEntry>,
}

impl AssetIndex {
    pub fn get(&self, key: &str) -> Option<&AssetEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache-Control policy for `public/` and `static/` files.
#[derive(Debug, Clone)]
pub enum CachePolicy {
    Disabled,
    Matching { test: Regex, value: String },
}

impl CachePolicy {
    pub fn from_config(config: &PublicDirectoryCache) -> Result<Self> {
        let (test, value) = match config {
            PublicDirectoryCache::Enabled(false) => return Ok(CachePolicy::Disabled),
            PublicDirectoryCache::Enabled(true) => (None, None),
            PublicDirectoryCache::Custom { test, value } => (test.as_deref(), value.as_deref()),
        };
        let pattern = test.unwrap_or(DEFAULT_PUBLIC_CACHE_TEST);
        let test = Regex::new(pattern).map_err(|source| Error::Pattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(CachePolicy::Matching {
            test,
            value: value.unwrap_or(PUBLIC_CACHE_CONTROL).to_owned(),
        })
    }

    /// Header for the file at `path`, if the policy covers it.
    pub fn header_for(&self, path: &str) -> Option<String> {
        match self {
            CachePolicy::Disabled => None,
            CachePolicy::Matching { test, value } => test.is_match(path).then(|| value.clone()),
        }
    }
}

/// Build the asset index for a compiled manifest.
pub async fn build_index(ctx: &BuildContext, manifest: &Manifest) -> Result<AssetIndex> {
    let policy = CachePolicy::from_config(&ctx.public_cache)?;
    let mut entries = Vec::new();

    let next_static = ctx.build_dir.join("static");
    for rel in walk(&next_static).await? {
        entries.push(AssetEntry {
            path: format!("/_next/static/{rel}"),
            key: format!("_next/static/{rel}"),
            source: next_static.join(&rel),
            cache_control: Some(IMMUTABLE_CACHE_CONTROL.to_owned()),
        });
    }

    let serverless = ctx.serverless_dir();
    let html_pages = manifest
        .pages
        .html
        .non_dynamic
        .iter()
        .map(|(route, file)| (route.as_str(), file.as_str()))
        .chain(
            manifest
                .pages
                .html
                .dynamic
                .iter()
                .map(|r| (r.route(), r.file())),
        );
    for (route, file) in html_pages {
        entries.push(AssetEntry {
            path: route.to_owned(),
            key: static_page_key(file),
            source: serverless.join(file),
            cache_control: Some(HTML_CACHE_CONTROL.to_owned()),
        });
    }

    for (path, key) in &manifest.public_files {
        entries.push(public_entry(&policy, path, key, &ctx.app_dir));
    }

    let static_dir = ctx.static_dir();
    for rel in walk(&static_dir).await? {
        let path = format!("/static/{rel}");
        let key = format!("static/{rel}");
        entries.push(public_entry(&policy, &path, &key, &ctx.app_dir));
    }

    Ok(AssetIndex { entries })
}

fn public_entry(policy: &CachePolicy, path: &str, key: &str, app_dir: &Path) -> AssetEntry {
    AssetEntry {
        path: path.to_owned(),
        key: key.to_owned(),
        source: app_dir.join(key),
        cache_control: policy.header_for(path),
    }
}

/// Storage key of a pre-rendered page file (`pages/a/b.html` → `static-pages/a/b.html`).
pub fn static_page_key(file: &str) -> String {
    let page = file.strip_prefix("pages/").unwrap_or(file);
    format!("{STATIC_PAGES_PREFIX}/{page}")
}

/// Write the index as `assets.json` into the output directory.
pub async fn write_index(index: &AssetIndex, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(ASSET_INDEX_FILE);
    let json = serde_json::to_vec_pretty(index).map_err(|e| Error::json(&path, e))?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| Error::io(&path, e))?;
    Ok(path)
}
