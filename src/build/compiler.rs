//! Build manifest compiler.
//!
//! # Responsibilities
//! - Classify every compiled route and bucket it by group
//! - Order each dynamic bucket with the route sorter
//! - Serve pre-rendered outputs from their HTML files
//! - Map public files to storage keys
//! - Keep only the user redirects the automatic rule does not cover
//!
//! # Design Decisions
//! - Pages are sorted as one sequence and ranked before being split into
//!   ssr and html buckets, so precedence across render kinds is preserved
//! - Compilation is pure: all I/O happened in artifacts.rs

use std::collections::BTreeMap;

use crate::build::artifacts::{prerendered_html_file, BuildArtifacts};
use crate::build::context::BuildContext;
use crate::error::Result;
use crate::manifest::{DynamicRoute, Manifest, PageGroups, RouteGroup, RoutesDescriptor};
use crate::observability::metrics;
use crate::redirect::trailing_slash::filter_duplicates;
use crate::redirect::CustomRedirect;
use crate::routes::{classify, sorted, RenderKind, Route};

/// Compiler output: the manifest plus the routes descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub manifest: Manifest,
    pub routes: RoutesDescriptor,
}

/// Compile loaded artifacts into a manifest.
pub fn compile(artifacts: &BuildArtifacts, ctx: &BuildContext) -> Result<Compiled> {
    let mut pages = Vec::new();
    let mut apis = Vec::new();
    for (template, file) in &artifacts.pages {
        let route = classify(template, file)?;
        if route.is_api() {
            apis.push(route);
            continue;
        }
        if route.render_kind() == Some(RenderKind::Ssr)
            && artifacts.prerender.is_build_time_only(template)
        {
            pages.push(classify(template, &prerendered_html_file(template))?);
            continue;
        }
        if route.is_dynamic() {
            for output in artifacts.prerender.outputs_of(template) {
                if !artifacts.pages.contains_key(output) {
                    pages.push(classify(output, &prerendered_html_file(output))?);
                }
            }
        }
        pages.push(route);
    }

    let page_groups = bucket_pages(sorted(pages));
    let api_group = bucket(sorted(apis));

    let public_files: BTreeMap<String, String> = artifacts
        .public_files
        .iter()
        .map(|rel| (format!("/{rel}"), format!("public/{rel}")))
        .collect();

    let base_path = artifacts.routes.base_path.clone();
    let redirects = filter_duplicates(artifacts.routes.redirects.clone(), &base_path);
    let compiled_redirects = redirects
        .iter()
        .cloned()
        .filter_map(|entry| match CustomRedirect::try_from(entry) {
            Ok(redirect) => Some(redirect),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping redirect");
                None
            }
        })
        .collect();

    let manifest = Manifest {
        build_id: artifacts.build_id.clone(),
        base_path: base_path.clone(),
        trailing_slash: ctx.trailing_slash,
        log_execution_times: ctx.log_execution_times,
        pages: page_groups,
        apis: api_group,
        public_files,
        redirects: compiled_redirects,
    };

    record_group("ssr", &manifest.pages.ssr);
    record_group("html", &manifest.pages.html);
    record_group("api", &manifest.apis);
    metrics::record_routes("public", manifest.public_files.len());

    tracing::info!(
        build_id = %manifest.build_id,
        routes = manifest.route_count(),
        public_files = manifest.public_files.len(),
        redirects = manifest.redirects.len(),
        trailing_slash = manifest.trailing_slash,
        "Manifest compiled"
    );

    Ok(Compiled {
        manifest,
        routes: RoutesDescriptor {
            base_path,
            redirects,
        },
    })
}

fn record_group(group: &'static str, routes: &RouteGroup) {
    metrics::record_routes(group, routes.dynamic.len() + routes.non_dynamic.len());
}

/// Split sorted pages by render kind; dynamic entries keep their global rank.
fn bucket_pages(pages: Vec<Route>) -> PageGroups {
    let mut groups = PageGroups::default();
    let mut rank = 0;
    for route in pages {
        let group = match route.render_kind() {
            Some(RenderKind::Html) => &mut groups.html,
            _ => &mut groups.ssr,
        };
        insert(group, &route, &mut rank);
    }
    groups
}

fn bucket(routes: Vec<Route>) -> RouteGroup {
    let mut group = RouteGroup::default();
    let mut rank = 0;
    for route in routes {
        insert(&mut group, &route, &mut rank);
    }
    group
}

fn insert(group: &mut RouteGroup, route: &Route, rank: &mut usize) {
    if route.is_dynamic() {
        group.dynamic.push(DynamicRoute::from_route(route, *rank));
        *rank += 1;
    } else {
        group
            .non_dynamic
            .insert(route.template().to_owned(), route.file().to_owned());
    }
}
