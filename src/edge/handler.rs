//! Origin-request adapter.
//!
//! Turns a router decision into what the deployed handler does with the
//! request: forward it to storage, render a page, invoke an API module, or
//! answer with a redirect.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::build::assets::static_page_key;
use crate::manifest::Manifest;
use crate::router::{self, RouteDecision};
use crate::routes::{Params, RenderKind};

/// The parts of a CDN origin request the router needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OriginRequest {
    pub uri: String,
    #[serde(default)]
    pub querystring: String,
}

/// What the handler does with one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum OriginAction {
    /// Send the request on to storage under a rewritten uri.
    Forward {
        uri: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
    /// Render a server page module.
    Render {
        route: String,
        file: String,
        params: Params,
        #[serde(skip_serializing_if = "Option::is_none")]
        status: Option<u16>,
    },
    /// Invoke an API module.
    InvokeApi {
        route: String,
        file: String,
        params: Params,
    },
    /// Answer directly without touching an origin.
    Respond { status: u16, location: String },
}

const NOT_FOUND_PAGE: &str = "/404";
const ERROR_PAGE: &str = "/_error";
const ERROR_PAGE_FILE: &str = "pages/_error.js";

/// Route one origin request.
pub fn handle(manifest: &Manifest, request: &OriginRequest) -> OriginAction {
    let started = manifest.log_execution_times.then(Instant::now);

    let decision = router::route(manifest, &request.uri);
    let action = to_action(manifest, decision, &request.querystring);

    if let Some(started) = started {
        tracing::info!(
            uri = %request.uri,
            elapsed_us = started.elapsed().as_micros() as u64,
            "Routing finished"
        );
    }
    action
}

fn to_action(manifest: &Manifest, decision: RouteDecision<'_>, querystring: &str) -> OriginAction {
    match decision {
        RouteDecision::MatchedStatic { route, render, file } => {
            page_action(render, route, file, Params::default())
        }
        RouteDecision::MatchedDynamic {
            route,
            render,
            file,
            params,
        } => page_action(render, route, file, params),
        RouteDecision::MatchedApi {
            route,
            file,
            params,
        } => OriginAction::InvokeApi {
            route: route.to_owned(),
            file: file.to_owned(),
            params,
        },
        RouteDecision::MatchedAsset { key, .. } => OriginAction::Forward {
            uri: format!("/{key}"),
            status: None,
        },
        RouteDecision::Redirect(redirect) => {
            let location = if querystring.is_empty() {
                redirect.location
            } else if redirect.location.contains('?') {
                format!("{}&{querystring}", redirect.location)
            } else {
                format!("{}?{querystring}", redirect.location)
            };
            OriginAction::Respond {
                status: redirect.status,
                location,
            }
        }
        RouteDecision::NotFound => not_found(manifest),
    }
}

fn page_action(render: RenderKind, route: &str, file: &str, params: Params) -> OriginAction {
    match render {
        RenderKind::Html => OriginAction::Forward {
            uri: format!("/{}", static_page_key(file)),
            status: None,
        },
        RenderKind::Ssr => OriginAction::Render {
            route: route.to_owned(),
            file: file.to_owned(),
            params,
            status: None,
        },
    }
}

fn not_found(manifest: &Manifest) -> OriginAction {
    if let Some(file) = manifest.pages.html.non_dynamic.get(NOT_FOUND_PAGE) {
        return OriginAction::Forward {
            uri: format!("/{}", static_page_key(file)),
            status: Some(404),
        };
    }
    let file = manifest
        .pages
        .ssr
        .non_dynamic
        .get(ERROR_PAGE)
        .map_or(ERROR_PAGE_FILE, String::as_str);
    OriginAction::Render {
        route: ERROR_PAGE.to_owned(),
        file: file.to_owned(),
        params: Params::default(),
        status: Some(404),
    }
}
