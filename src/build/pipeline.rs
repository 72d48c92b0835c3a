//! One build run, end to end.

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::build::artifacts::BuildArtifacts;
use crate::build::assets::{self, AssetIndex};
use crate::build::bundle::{self, BundleReport};
use crate::build::compiler::{self, Compiled};
use crate::build::context::BuildContext;
use crate::error::{Error, Result};
use crate::observability::metrics;

/// Result of a successful build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub compiled: Compiled,
    pub bundles: BundleReport,
    pub assets: AssetIndex,
    pub asset_index_path: PathBuf,
}

/// Clear the output directory, then load, compile, assemble and index.
///
/// Not re-entrant on the same output directory.
pub async fn run(ctx: &BuildContext) -> Result<BuildOutput> {
    let started = Instant::now();
    tracing::info!(app_dir = %ctx.app_dir.display(), "Starting build");

    clear_dir(&ctx.output_dir).await?;

    let artifacts = BuildArtifacts::load(ctx).await?;
    let compiled = compiler::compile(&artifacts, ctx)?;
    let bundles = bundle::assemble(ctx, &artifacts, &compiled).await?;
    let assets = assets::build_index(ctx, &compiled.manifest).await?;
    let asset_index_path = assets::write_index(&assets, &ctx.output_dir).await?;

    let elapsed = started.elapsed();
    metrics::record_build_duration(elapsed);
    tracing::info!(
        build_id = %compiled.manifest.build_id,
        elapsed_ms = elapsed.as_millis() as u64,
        assets = assets.len(),
        "Build complete"
    );

    Ok(BuildOutput {
        compiled,
        bundles,
        assets,
        asset_index_path,
    })
}

async fn clear_dir(dir: &Path) -> Result<()> {
    match tokio::fs::remove_dir_all(dir).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::io(dir, e)),
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::io(dir, e))
}
