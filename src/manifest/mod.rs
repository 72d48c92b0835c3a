//! Build manifest and routes descriptor.
//!
//! # Data Flow
//! ```text
//! build::compiler (sole producer)
//!     → Manifest (immutable)
//!     → manifest.json in both function bundles
//!
//! edge handler cold start
//!     → manifest.json
//!     → Manifest (dynamic matchers recompiled from route templates)
//!     → router::route (read-only, per request)
//! ```
//!
//! # Design Decisions
//! - Dynamic groups are JSON arrays so precedence survives serialization
//! - Non-dynamic groups are exact-match maps; their order never matters
//! - Dynamic page entries carry a global `rank`: the ssr and html groups are
//!   each ascending in rank, so walking both in rank order reproduces the
//!   sorter's single page sequence without re-sorting

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::redirect::{CustomRedirect, RedirectEntry};
use crate::routes::segment::{self, Params, Segment};
use crate::routes::{RenderKind, Route, RouteError};

/// File name of the manifest inside each bundle.
pub const MANIFEST_FILE: &str = "manifest.json";

/// File name of the routes descriptor inside each bundle.
pub const ROUTES_FILE: &str = "routes-manifest.json";

/// The compiled routing manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub build_id: String,
    #[serde(default)]
    pub base_path: String,
    pub trailing_slash: bool,
    pub log_execution_times: bool,
    pub pages: PageGroups,
    pub apis: RouteGroup,
    pub public_files: BTreeMap<String, String>,
    #[serde(default)]
    pub redirects: Vec<CustomRedirect>,
}

/// Page routes split by render kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageGroups {
    pub ssr: RouteGroup,
    pub html: RouteGroup,
}

/// One dynamic/non-dynamic route pair of groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGroup {
    /// Most specific first.
    pub dynamic: Vec<DynamicRoute>,
    /// Exact path → source file.
    pub non_dynamic: BTreeMap<String, String>,
}

/// A dynamic route entry with its compiled matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DynamicRouteRepr", into = "DynamicRouteRepr")]
pub struct DynamicRoute {
    route: String,
    file: String,
    rank: usize,
    segments: Vec<Segment>,
}

#[derive(Serialize, Deserialize)]
struct DynamicRouteRepr {
    route: String,
    file: String,
    rank: usize,
    #[serde(default)]
    regex: String,
}

impl TryFrom<DynamicRouteRepr> for DynamicRoute {
    type Error = RouteError;

    fn try_from(repr: DynamicRouteRepr) -> Result<Self, Self::Error> {
        Ok(Self {
            segments: segment::parse_template(&repr.route)?,
            route: repr.route,
            file: repr.file,
            rank: repr.rank,
        })
    }
}

impl From<DynamicRoute> for DynamicRouteRepr {
    fn from(route: DynamicRoute) -> Self {
        Self {
            regex: segment::render_regex(&route.segments),
            route: route.route,
            file: route.file,
            rank: route.rank,
        }
    }
}

impl DynamicRoute {
    pub fn from_route(route: &Route, rank: usize) -> Self {
        Self {
            route: route.template().to_owned(),
            file: route.file().to_owned(),
            rank,
            segments: route.segments().to_vec(),
        }
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Express-style form of the template (`/blog/:id`).
    pub fn express(&self) -> String {
        segment::render_express(&self.segments)
    }

    pub fn matches(&self, path: &str) -> Option<Params> {
        segment::match_segments(&self.segments, path)
    }
}

impl Manifest {
    /// Exact lookup among non-dynamic pages: `(route, render kind, file)`.
    pub fn static_page(&self, path: &str) -> Option<(&str, RenderKind, &str)> {
        if let Some((route, file)) = self.pages.ssr.non_dynamic.get_key_value(path) {
            return Some((route.as_str(), RenderKind::Ssr, file.as_str()));
        }
        self.pages
            .html
            .non_dynamic
            .get_key_value(path)
            .map(|(route, file)| (route.as_str(), RenderKind::Html, file.as_str()))
    }

    /// Exact lookup among non-dynamic API routes.
    pub fn static_api(&self, path: &str) -> Option<&str> {
        self.apis.non_dynamic.get(path).map(String::as_str)
    }

    /// Dynamic pages in precedence order.
    pub fn dynamic_pages(&self) -> DynamicPages<'_> {
        DynamicPages {
            ssr: &self.pages.ssr.dynamic,
            html: &self.pages.html.dynamic,
        }
    }

    pub fn has_api_routes(&self) -> bool {
        !self.apis.dynamic.is_empty() || !self.apis.non_dynamic.is_empty()
    }

    /// Number of routes across every group.
    pub fn route_count(&self) -> usize {
        [&self.pages.ssr, &self.pages.html, &self.apis]
            .iter()
            .map(|g| g.dynamic.len() + g.non_dynamic.len())
            .sum()
    }
}

/// Walks the ssr and html dynamic groups in global rank order.
#[derive(Debug, Clone)]
pub struct DynamicPages<'m> {
    ssr: &'m [DynamicRoute],
    html: &'m [DynamicRoute],
}

impl<'m> Iterator for DynamicPages<'m> {
    type Item = (RenderKind, &'m DynamicRoute);

    fn next(&mut self) -> Option<Self::Item> {
        let take_ssr = match (self.ssr.first(), self.html.first()) {
            (Some(s), Some(h)) => s.rank <= h.rank,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => return None,
        };
        if take_ssr {
            let (first, rest) = self.ssr.split_first()?;
            self.ssr = rest;
            Some((RenderKind::Ssr, first))
        } else {
            let (first, rest) = self.html.split_first()?;
            self.html = rest;
            Some((RenderKind::Html, first))
        }
    }
}

/// The routes descriptor written next to the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesDescriptor {
    #[serde(default)]
    pub base_path: String,
    #[serde(default)]
    pub redirects: Vec<RedirectEntry>,
}
