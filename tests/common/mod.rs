//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use edge_deploy::config::DeployConfig;
use tempfile::TempDir;

pub const BUILD_ID: &str = "test-build-1";

/// Pages of the default fixture: route template → file.
pub const PAGES: &[(&str, &str)] = &[
    ("/", "pages/index.js"),
    ("/_error", "pages/_error.js"),
    ("/404", "pages/404.html"),
    ("/about", "pages/about.js"),
    ("/post", "pages/post.js"),
    ("/terms", "pages/terms.html"),
    ("/[slug]", "pages/[slug].js"),
    ("/blog/[id]", "pages/blog/[id].js"),
    ("/docs/[...slug]", "pages/docs/[...slug].js"),
    ("/api/ping", "pages/api/ping.js"),
    ("/api/users/[id]", "pages/api/users/[id].js"),
];

/// A fake application directory with a serverless build output.
pub struct Fixture {
    pub dir: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_pages(PAGES)
    }

    pub fn with_pages(pages: &[(&str, &str)]) -> Self {
        let fixture = Self {
            dir: tempfile::tempdir().unwrap(),
        };

        fixture.write(".next/BUILD_ID", &format!("{BUILD_ID}\n"));
        let manifest: serde_json::Map<String, serde_json::Value> = pages
            .iter()
            .map(|(route, file)| (route.to_string(), serde_json::Value::from(*file)))
            .collect();
        fixture.write(
            ".next/serverless/pages-manifest.json",
            &serde_json::to_string(&manifest).unwrap(),
        );
        for (_, file) in pages {
            fixture.write(&format!(".next/serverless/{file}"), "module.exports = {}");
        }
        fixture.write(".next/serverless/pages/about.json", "{}");
        fixture.write(".next/serverless/pages/about.html", "<html></html>");
        fixture.write(
            ".next/prerender-manifest.json",
            r#"{"version": 2, "routes": {"/about": {"initialRevalidateSeconds": false}}}"#,
        );
        fixture.write(".next/static/chunks/main.js", "");

        fixture.write("handlers/default-handler.js", "// page handler");
        fixture.write("handlers/api-handler.js", "// api handler");

        fixture.write("public/favicon.ico", "");
        fixture.write("public/img/logo.png", "");
        fixture.write("public/robots.txt", "User-agent: *");
        fixture
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, contents: &str) {
        let path = self.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    pub fn remove(&self, rel: &str) {
        std::fs::remove_file(self.join(rel)).unwrap();
    }

    /// Deploy configuration pointing at this app directory.
    pub fn config(&self) -> DeployConfig {
        let mut config = DeployConfig::default();
        config.build.app_dir = self.path().to_path_buf();
        config
    }
}
