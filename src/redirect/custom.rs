//! User-declared redirects from the routes manifest.

use serde::{Deserialize, Serialize};

use crate::routes::segment::{self, Params, Segment};

/// A redirect as declared in `routes-manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectEntry {
    pub source: String,
    pub destination: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permanent: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub internal: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

impl RedirectEntry {
    /// Effective status code.
    pub fn status(&self) -> u16 {
        match (self.status_code, self.permanent) {
            (Some(code), _) => code,
            (None, Some(true)) => 308,
            _ => 307,
        }
    }
}

/// Why a redirect source cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported redirect source {pattern:?}: {reason}")]
pub struct UnsupportedSource {
    pub pattern: String,
    pub reason: &'static str,
}

/// A redirect whose source has been compiled into a segment matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RedirectEntry", into = "RedirectEntry")]
pub struct CustomRedirect {
    entry: RedirectEntry,
    segments: Vec<Segment>,
}

impl TryFrom<RedirectEntry> for CustomRedirect {
    type Error = UnsupportedSource;

    fn try_from(entry: RedirectEntry) -> Result<Self, Self::Error> {
        let segments = parse_source(&entry.source)?;
        Ok(Self { entry, segments })
    }
}

impl From<CustomRedirect> for RedirectEntry {
    fn from(redirect: CustomRedirect) -> Self {
        redirect.entry
    }
}

impl CustomRedirect {
    pub fn entry(&self) -> &RedirectEntry {
        &self.entry
    }

    pub fn source(&self) -> &str {
        &self.entry.source
    }

    pub fn status(&self) -> u16 {
        self.entry.status()
    }

    /// Match a full request path (base path included) and build the target.
    pub fn apply(&self, path: &str) -> Option<String> {
        let params = segment::match_segments(&self.segments, path)?;
        Some(substitute(&self.entry.destination, &params))
    }
}

fn unsupported(source: &str, reason: &'static str) -> UnsupportedSource {
    UnsupportedSource {
        pattern: source.to_owned(),
        reason,
    }
}

/// Parse a `:name` / `:name*` / `:name+` source pattern.
fn parse_source(source: &str) -> Result<Vec<Segment>, UnsupportedSource> {
    let rest = source
        .strip_prefix('/')
        .ok_or_else(|| unsupported(source, "must start with '/'"))?;
    if rest.is_empty() {
        return Ok(Vec::new());
    }

    let mut segments = Vec::new();
    for part in rest.split('/') {
        let segment = match part.strip_prefix(':') {
            Some(param) => {
                let name = param.trim_end_matches(['+', '*']);
                if name.is_empty() || !name.chars().all(is_name_char) {
                    return Err(unsupported(source, "parameters must be plain names"));
                }
                let name = name.to_owned();
                match &param[name.len()..] {
                    "" => Segment::Param(name),
                    "+" => Segment::CatchAll(name),
                    "*" => Segment::OptionalCatchAll(name),
                    _ => return Err(unsupported(source, "unknown parameter modifier")),
                }
            }
            None if part.is_empty() => {
                return Err(unsupported(source, "empty segment"));
            }
            None if part.contains([':', '(', ')', '*', '+', '?']) => {
                return Err(unsupported(source, "inline patterns are not supported"));
            }
            None => Segment::Literal(part.to_owned()),
        };
        segments.push(segment);
    }

    segment::check_segments(source, &segments)
        .map_err(|_| unsupported(source, "catch-all must close the pattern"))?;
    Ok(segments)
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Replace `:name`, `:name*`, `:name+` in `destination` with captured values.
fn substitute(destination: &str, params: &Params) -> String {
    let mut out = String::with_capacity(destination.len());
    let mut rest = destination;

    while let Some(idx) = rest.find(':') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];
        let len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
        match params.get(&after[..len]) {
            Some(value) if len > 0 => {
                out.push_str(&value.to_path());
                let mut tail = &after[len..];
                if let Some(stripped) = tail.strip_prefix(['*', '+']) {
                    tail = stripped;
                }
                rest = tail;
            }
            _ => {
                out.push(':');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}
