//! Route template tokens and segment matching.
//!
//! # Responsibilities
//! - Tokenize a bracketed route template (`/blog/[id]`, `/docs/[...slug]`,
//!   `/docs/[[...slug]]`) into an ordered segment sequence
//! - Match a concrete path against a segment sequence, capturing parameters
//!
//! # Design Decisions
//! - No regex engine: matching walks `/`-separated parts once, O(n)
//! - Parameters never match an empty part, so `/blog/` is not `/blog/[id]`
//! - Catch-alls may only close a template
//! - Captures are only allocated once a route matches

use serde::Serialize;

use super::RouteError;

/// One token of a route template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Matches verbatim.
    Literal(String),
    /// `[name]`: exactly one part.
    Param(String),
    /// `[...name]`: one or more trailing parts.
    CatchAll(String),
    /// `[[...name]]`: zero or more trailing parts.
    OptionalCatchAll(String),
}

impl Segment {
    /// Specificity rank; lower ranks are more specific.
    pub fn rank(&self) -> u8 {
        match self {
            Segment::Literal(_) => 0,
            Segment::Param(_) => 1,
            Segment::CatchAll(_) => 2,
            Segment::OptionalCatchAll(_) => 3,
        }
    }

    /// Parameter name, if this token captures.
    pub fn name(&self) -> Option<&str> {
        match self {
            Segment::Literal(_) => None,
            Segment::Param(n) | Segment::CatchAll(n) | Segment::OptionalCatchAll(n) => Some(n),
        }
    }

    pub fn is_dynamic(&self) -> bool {
        !matches!(self, Segment::Literal(_))
    }

    fn is_catch_all(&self) -> bool {
        matches!(self, Segment::CatchAll(_) | Segment::OptionalCatchAll(_))
    }
}

/// A captured parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Single(String),
    Multi(Vec<String>),
}

impl ParamValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Single(s) => Some(s),
            ParamValue::Multi(_) => None,
        }
    }

    pub fn as_slice(&self) -> Option<&[String]> {
        match self {
            ParamValue::Single(_) => None,
            ParamValue::Multi(v) => Some(v),
        }
    }

    /// Value as it appears in a path, catch-all parts joined with `/`.
    pub fn to_path(&self) -> String {
        match self {
            ParamValue::Single(s) => s.clone(),
            ParamValue::Multi(v) => v.join("/"),
        }
    }
}

/// Captured parameters, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, ParamValue)>,
}

impl Params {
    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn push(&mut self, name: &str, value: ParamValue) {
        self.entries.push((name.to_owned(), value));
    }
}

impl Serialize for Params {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Tokenize a bracketed route template.
pub fn parse_template(template: &str) -> Result<Vec<Segment>, RouteError> {
    let rest = template
        .strip_prefix('/')
        .ok_or_else(|| RouteError::MissingLeadingSlash(template.to_owned()))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for part in rest.split('/') {
        segments.push(parse_bracketed(template, part)?);
    }
    check_segments(template, &segments)?;
    Ok(segments)
}

fn parse_bracketed(template: &str, part: &str) -> Result<Segment, RouteError> {
    if part.is_empty() {
        return Err(RouteError::EmptySegment(template.to_owned()));
    }

    let (segment, name) = if let Some(inner) = part
        .strip_prefix("[[...")
        .and_then(|p| p.strip_suffix("]]"))
    {
        (Segment::OptionalCatchAll(inner.to_owned()), inner)
    } else if let Some(inner) = part.strip_prefix("[...").and_then(|p| p.strip_suffix(']')) {
        (Segment::CatchAll(inner.to_owned()), inner)
    } else if let Some(inner) = part.strip_prefix('[').and_then(|p| p.strip_suffix(']')) {
        (Segment::Param(inner.to_owned()), inner)
    } else if part.contains(['[', ']']) {
        return Err(RouteError::PartialSegment {
            template: template.to_owned(),
            segment: part.to_owned(),
        });
    } else {
        return Ok(Segment::Literal(part.to_owned()));
    };

    if name.is_empty() || name.contains(['[', ']', '.']) {
        return Err(RouteError::InvalidParamName {
            template: template.to_owned(),
            segment: part.to_owned(),
        });
    }
    Ok(segment)
}

/// Enforce catch-all placement and unique parameter names.
pub(crate) fn check_segments(template: &str, segments: &[Segment]) -> Result<(), RouteError> {
    let last = segments.len().saturating_sub(1);
    for (i, segment) in segments.iter().enumerate() {
        if segment.is_catch_all() && i != last {
            return Err(RouteError::CatchAllNotLast {
                template: template.to_owned(),
                name: segment.name().unwrap_or_default().to_owned(),
            });
        }
        if let Some(name) = segment.name() {
            if segments[..i].iter().any(|s| s.name() == Some(name)) {
                return Err(RouteError::DuplicateParam {
                    template: template.to_owned(),
                    name: name.to_owned(),
                });
            }
        }
    }
    Ok(())
}

/// Match `path` against `segments`, returning captures in declared order.
pub fn match_segments(segments: &[Segment], path: &str) -> Option<Params> {
    let rest = path.strip_prefix('/')?;
    let mut parts = (!rest.is_empty())
        .then(|| rest.split('/'))
        .into_iter()
        .flatten();
    let mut params = Params::default();

    for segment in segments {
        match segment {
            Segment::Literal(literal) => {
                if parts.next()? != literal.as_str() {
                    return None;
                }
            }
            Segment::Param(name) => {
                let part = parts.next()?;
                if part.is_empty() {
                    return None;
                }
                params.push(name, ParamValue::Single(part.to_owned()));
            }
            Segment::CatchAll(name) | Segment::OptionalCatchAll(name) => {
                let mut values = Vec::new();
                for part in parts.by_ref() {
                    if part.is_empty() {
                        return None;
                    }
                    values.push(part.to_owned());
                }
                if values.is_empty() && matches!(segment, Segment::CatchAll(_)) {
                    return None;
                }
                params.push(name, ParamValue::Multi(values));
            }
        }
    }

    if parts.next().is_some() {
        return None;
    }
    Some(params)
}

/// Render an anchored regex string equivalent to the segment matcher.
pub fn render_regex(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "^/$".to_owned();
    }
    let mut out = String::from("^");
    for segment in segments {
        match segment {
            Segment::Literal(l) => {
                out.push('/');
                out.push_str(&regex::escape(l));
            }
            Segment::Param(_) => out.push_str("/([^/]+?)"),
            Segment::CatchAll(_) => out.push_str("/(.+?)"),
            Segment::OptionalCatchAll(_) => out.push_str("(?:/(.+?))?"),
        }
    }
    out.push('$');
    out
}

/// Render the express-style form (`/blog/:id`, `/docs/:slug+`, `/docs/:slug*`).
pub fn render_express(segments: &[Segment]) -> String {
    if segments.is_empty() {
        return "/".to_owned();
    }
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        match segment {
            Segment::Literal(l) => out.push_str(l),
            Segment::Param(n) => {
                out.push(':');
                out.push_str(n);
            }
            Segment::CatchAll(n) => {
                out.push(':');
                out.push_str(n);
                out.push('+');
            }
            Segment::OptionalCatchAll(n) => {
                out.push(':');
                out.push_str(n);
                out.push('*');
            }
        }
    }
    out
}
