//! Route classification.
//!
//! A route's category and dynamic-ness are derived exactly once, when the
//! route is classified from its template and source file. Nothing downstream
//! re-derives them.

use serde::{Deserialize, Serialize};

use super::segment::{self, Params, Segment};
use super::RouteError;

/// Where a route's compiled output comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Module under the API namespace (`pages/api/...`).
    Api,
    /// Pre-rendered static markup (`*.html`).
    StaticMarkup,
    /// Server-rendered page module.
    ServerRendered,
}

impl SourceKind {
    /// Derive the source kind from a pages-manifest file reference.
    pub fn from_file(file: &str) -> Self {
        if file.starts_with("pages/api/") {
            SourceKind::Api
        } else if file.ends_with(".html") {
            SourceKind::StaticMarkup
        } else {
            SourceKind::ServerRendered
        }
    }
}

/// How a page is produced at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderKind {
    Ssr,
    Html,
}

/// Route category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    StaticPage,
    DynamicPage,
    ApiRoute,
    PreRenderOnly,
}

/// A classified route with its compiled matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    template: String,
    file: String,
    source: SourceKind,
    category: Category,
    dynamic: bool,
    segments: Vec<Segment>,
    param_names: Vec<String>,
}

/// Classify a route template and its source file.
pub fn classify(template: &str, file: &str) -> Result<Route, RouteError> {
    let file = file.replace('\\', "/");
    let segments = segment::parse_template(template)?;
    let dynamic = segments.iter().any(Segment::is_dynamic);
    let source = SourceKind::from_file(&file);
    let category = match (source, dynamic) {
        (SourceKind::Api, _) => Category::ApiRoute,
        (SourceKind::StaticMarkup, _) => Category::PreRenderOnly,
        (SourceKind::ServerRendered, true) => Category::DynamicPage,
        (SourceKind::ServerRendered, false) => Category::StaticPage,
    };
    let param_names = segments
        .iter()
        .filter_map(|s| s.name().map(str::to_owned))
        .collect();

    Ok(Route {
        template: template.to_owned(),
        file,
        source,
        category,
        dynamic,
        segments,
        param_names,
    })
}

impl Route {
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn source(&self) -> SourceKind {
        self.source
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn is_api(&self) -> bool {
        self.category == Category::ApiRoute
    }

    /// Render kind for pages; `None` for API routes.
    pub fn render_kind(&self) -> Option<RenderKind> {
        match self.source {
            SourceKind::Api => None,
            SourceKind::StaticMarkup => Some(RenderKind::Html),
            SourceKind::ServerRendered => Some(RenderKind::Ssr),
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Match a concrete path, capturing parameters in declared order.
    pub fn match_path(&self, path: &str) -> Option<Params> {
        segment::match_segments(&self.segments, path)
    }

    pub fn regex(&self) -> String {
        segment::render_regex(&self.segments)
    }

    pub fn express(&self) -> String {
        segment::render_express(&self.segments)
    }
}
