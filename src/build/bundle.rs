//! Function bundle assembly.
//!
//! # Responsibilities
//! - Plan the copy/write operations for the page and API bundles
//! - Execute every operation concurrently, failing on the first error
//!
//! # Design Decisions
//! - Planning is separate from execution so the file set can be inspected
//! - The API bundle only exists when the build has API routes
//! - Modules of pages served entirely from pre-rendered HTML stay out of the
//!   page bundle unless API routes exist; dynamic pages always keep theirs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::future::try_join_all;

use crate::build::artifacts::{to_slash, walk, BuildArtifacts, PRERENDER_MANIFEST};
use crate::build::compiler::Compiled;
use crate::build::context::BuildContext;
use crate::error::{Error, Result};
use crate::manifest::{MANIFEST_FILE, ROUTES_FILE};

/// Runtime entrypoint name inside a bundle.
pub const ENTRYPOINT_FILE: &str = "index.js";

/// One file operation inside a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleOp {
    Copy { from: PathBuf, to: PathBuf },
    Write { to: PathBuf, contents: Arc<Vec<u8>> },
}

impl BundleOp {
    pub fn target(&self) -> &Path {
        match self {
            BundleOp::Copy { to, .. } | BundleOp::Write { to, .. } => to,
        }
    }

    async fn execute(self) -> Result<()> {
        let target = self.target().to_path_buf();
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::io(parent, e))?;
        }
        match self {
            BundleOp::Copy { from, to } => {
                tokio::fs::copy(&from, &to)
                    .await
                    .map_err(|e| Error::io(from, e))?;
            }
            BundleOp::Write { to, contents } => {
                tokio::fs::write(&to, contents.as_slice())
                    .await
                    .map_err(|e| Error::io(to, e))?;
            }
        }
        Ok(())
    }
}

/// Operations for both bundles.
#[derive(Debug, Clone, Default)]
pub struct BundlePlan {
    pub page: Vec<BundleOp>,
    /// `None` when the build has no API routes.
    pub api: Option<Vec<BundleOp>>,
}

/// What was assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleReport {
    pub page_dir: PathBuf,
    pub api_dir: Option<PathBuf>,
    pub files: usize,
}

/// Decide which files go into which bundle.
pub async fn plan(
    ctx: &BuildContext,
    artifacts: &BuildArtifacts,
    compiled: &Compiled,
) -> Result<BundlePlan> {
    let manifest_json = Arc::new(
        serde_json::to_vec_pretty(&compiled.manifest).map_err(|e| Error::json(MANIFEST_FILE, e))?,
    );
    let routes_json = Arc::new(
        serde_json::to_vec_pretty(&compiled.routes).map_err(|e| Error::json(ROUTES_FILE, e))?,
    );
    let has_api = compiled.manifest.has_api_routes();

    let serverless = ctx.serverless_dir();
    let page_files = walk(&serverless.join("pages")).await?;

    let shared = |dir: &Path, entrypoint: &Path| {
        let mut ops = vec![
            BundleOp::Copy {
                from: entrypoint.to_path_buf(),
                to: dir.join(ENTRYPOINT_FILE),
            },
            BundleOp::Write {
                to: dir.join(MANIFEST_FILE),
                contents: Arc::clone(&manifest_json),
            },
            BundleOp::Write {
                to: dir.join(ROUTES_FILE),
                contents: Arc::clone(&routes_json),
            },
        ];
        ops.extend(ctx.traced_files.iter().map(|rel| BundleOp::Copy {
            from: ctx.app_dir.join(rel),
            to: dir.join(to_slash(rel)),
        }));
        ops
    };

    let page_dir = ctx.page_bundle_dir();
    let mut page = shared(&page_dir, &ctx.page_entrypoint);
    for rel in &page_files {
        if include_in_page_bundle(rel, artifacts, has_api) {
            page.push(BundleOp::Copy {
                from: serverless.join("pages").join(rel),
                to: page_dir.join("pages").join(rel),
            });
        }
    }
    let prerender = ctx.build_dir.join(PRERENDER_MANIFEST);
    if tokio::fs::try_exists(&prerender)
        .await
        .map_err(|e| Error::io(&prerender, e))?
    {
        page.push(BundleOp::Copy {
            from: prerender,
            to: page_dir.join(PRERENDER_MANIFEST),
        });
    }
    if let Some(handler) = &ctx.custom_handler {
        let name = handler.file_name().map(PathBuf::from).unwrap_or_default();
        page.push(BundleOp::Copy {
            from: handler.clone(),
            to: page_dir.join(name),
        });
    }

    let api = has_api.then(|| {
        let api_dir = ctx.api_bundle_dir();
        let mut ops = shared(&api_dir, &ctx.api_entrypoint);
        for rel in &page_files {
            if rel.starts_with("api/") || rel == "_error.js" {
                ops.push(BundleOp::Copy {
                    from: serverless.join("pages").join(rel),
                    to: api_dir.join("pages").join(rel),
                });
            }
        }
        ops
    });

    Ok(BundlePlan { page, api })
}

/// Page bundle filter for a file relative to `pages/`.
fn include_in_page_bundle(rel: &str, artifacts: &BuildArtifacts, has_api: bool) -> bool {
    if rel.starts_with("api/") || rel.ends_with(".html") || rel.ends_with(".json") {
        return false;
    }
    if has_api {
        return true;
    }
    let file = format!("pages/{rel}");
    !artifacts
        .pages
        .iter()
        .any(|(template, f)| *f == file && artifacts.prerender.is_build_time_only(template))
}

/// Assemble both bundles into the output directory.
pub async fn assemble(
    ctx: &BuildContext,
    artifacts: &BuildArtifacts,
    compiled: &Compiled,
) -> Result<BundleReport> {
    let plan = plan(ctx, artifacts, compiled).await?;
    let api_dir = plan.api.as_ref().map(|_| ctx.api_bundle_dir());
    let ops: Vec<BundleOp> = plan
        .page
        .into_iter()
        .chain(plan.api.into_iter().flatten())
        .collect();
    let files = ops.len();

    try_join_all(ops.into_iter().map(BundleOp::execute)).await?;

    tracing::info!(
        page_dir = %ctx.page_bundle_dir().display(),
        api_bundle = api_dir.is_some(),
        files,
        "Bundles assembled"
    );

    Ok(BundleReport {
        page_dir: ctx.page_bundle_dir(),
        api_dir,
        files,
    })
}
