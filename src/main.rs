//! edge-deploy command line.
//!
//! # Architecture Overview
//!
//! ```text
//!   deploy.toml ──▶ config ──▶ BuildContext
//!                                  │
//!        .next/ ──▶ build::artifacts ──▶ build::compiler ──▶ Manifest
//!                                                              │
//!                  ┌──────────────────────┬────────────────────┤
//!                  ▼                      ▼                    ▼
//!           build::bundle          build::assets        cdn::generate
//!       (default-lambda,           (assets.json)      (distribution JSON)
//!          api-lambda)
//!                  │
//!                  ▼
//!   request ──▶ edge::handler ──▶ router::route ──▶ OriginAction
//! ```
//!
//! # Commands
//! - `build`: compile the manifest and assemble bundles and the asset index
//! - `route`: resolve one request against a built bundle
//! - `distribution`: print the CDN distribution descriptor

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use edge_deploy::build::{self, BuildContext};
use edge_deploy::cdn::{self, EdgeFunctions};
use edge_deploy::config::{load_config, DeployConfig};
use edge_deploy::edge::{self, ManifestCache, OriginRequest};
use edge_deploy::observability::logging;

#[derive(Parser)]
#[command(name = "edge-deploy")]
#[command(about = "Compile a serverless build into edge function bundles", long_about = None)]
struct Cli {
    /// Deploy configuration file.
    #[arg(short, long, default_value = "deploy.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile the manifest and assemble the bundles
    Build,
    /// Resolve a request path against a built page bundle
    Route {
        path: String,
        #[arg(short, long, default_value = "")]
        query: String,
    },
    /// Print the CDN distribution descriptor
    Distribution {
        #[arg(long)]
        storage_origin: String,
        #[arg(long)]
        page_function: String,
        #[arg(long)]
        api_function: String,
    },
}

fn read_config(path: &Path) -> Result<DeployConfig, Box<dyn std::error::Error>> {
    if path.exists() {
        Ok(load_config(path)?)
    } else {
        Ok(DeployConfig::default())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = read_config(&cli.config)?;
    logging::init(&config.observability);

    tracing::info!(config = %cli.config.display(), "edge-deploy starting");

    let ctx = BuildContext::from_config(&config).await?;

    match cli.command {
        Commands::Build => {
            let output = build::run(&ctx).await?;
            let summary = serde_json::json!({
                "buildId": output.compiled.manifest.build_id,
                "routes": output.compiled.manifest.route_count(),
                "pageBundle": output.bundles.page_dir,
                "apiBundle": output.bundles.api_dir,
                "assetIndex": output.asset_index_path,
                "assets": output.assets.len(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Route { path, query } => {
            let cache = ManifestCache::new();
            let manifest = cache.load(&ctx.page_bundle_dir()).await?;
            let action = edge::handle(
                &manifest,
                &OriginRequest {
                    uri: path,
                    querystring: query,
                },
            );
            println!("{}", serde_json::to_string_pretty(&action)?);
        }
        Commands::Distribution {
            storage_origin,
            page_function,
            api_function,
        } => {
            let cache = ManifestCache::new();
            let manifest = cache.load(&ctx.page_bundle_dir()).await?;
            let functions = EdgeFunctions {
                page: page_function,
                api: api_function,
            };
            let distribution = cdn::generate(&config.cdn, &manifest, &storage_origin, &functions)?;
            println!("{}", serde_json::to_string_pretty(&distribution)?);
        }
    }

    Ok(())
}
