//! Warm manifest cache for a long-lived handler process.
//!
//! # Design Decisions
//! - Readers take a snapshot with a single atomic load and never block
//! - A cached manifest is replaced only when the build id changes, so a
//!   redeploy is picked up without restarting the process

use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwapOption;

use crate::build::artifacts::read_json;
use crate::error::{Error, Result};
use crate::manifest::{Manifest, MANIFEST_FILE};

#[derive(Debug, Default)]
pub struct ManifestCache {
    current: ArcSwapOption<Manifest>,
}

impl ManifestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot, if anything was loaded.
    pub fn get(&self) -> Option<Arc<Manifest>> {
        self.current.load_full()
    }

    /// Keep the cached manifest when `fresh` has the same build id,
    /// otherwise install `fresh`. Returns the manifest to use.
    pub fn refresh(&self, fresh: Manifest) -> Arc<Manifest> {
        if let Some(cached) = self.current.load_full() {
            if cached.build_id == fresh.build_id {
                return cached;
            }
            tracing::info!(
                previous = %cached.build_id,
                current = %fresh.build_id,
                "Replacing cached manifest"
            );
        }
        let fresh = Arc::new(fresh);
        self.current.store(Some(Arc::clone(&fresh)));
        fresh
    }

    /// Read `manifest.json` from a bundle directory and refresh the cache.
    pub async fn load(&self, bundle_dir: &Path) -> Result<Arc<Manifest>> {
        let path = bundle_dir.join(MANIFEST_FILE);
        let manifest: Option<Manifest> = read_json(&path).await?;
        let manifest = manifest.ok_or(Error::Configuration {
            artifact: MANIFEST_FILE,
            path,
            hint: "Deploy the bundle produced by the build command",
        })?;
        Ok(self.refresh(manifest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{PageGroups, RouteGroup};
    use std::collections::BTreeMap;

    fn manifest(build_id: &str) -> Manifest {
        Manifest {
            build_id: build_id.into(),
            base_path: String::new(),
            trailing_slash: false,
            log_execution_times: false,
            pages: PageGroups::default(),
            apis: RouteGroup::default(),
            public_files: BTreeMap::new(),
            redirects: Vec::new(),
        }
    }

    #[test]
    fn test_same_build_keeps_snapshot() {
        let cache = ManifestCache::new();
        assert!(cache.get().is_none());
        let first = cache.refresh(manifest("a"));
        let second = cache.refresh(manifest("a"));
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_new_build_replaces_snapshot() {
        let cache = ManifestCache::new();
        let first = cache.refresh(manifest("a"));
        let second = cache.refresh(manifest("b"));
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.get().unwrap().build_id, "b");
    }

    #[tokio::test]
    async fn test_load_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let err = ManifestCache::new().load(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("manifest.json"));
    }
}
