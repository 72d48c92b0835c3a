//! Cache behavior model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::BehaviorOverride;

/// A hook point in the CDN request/response lifecycle.
///
/// Deserialized through a plain string so it also works as a map key in
/// every config format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum Trigger {
    ViewerRequest,
    OriginRequest,
    OriginResponse,
    ViewerResponse,
}

impl Trigger {
    pub fn as_str(self) -> &'static str {
        match self {
            Trigger::ViewerRequest => "viewer-request",
            Trigger::OriginRequest => "origin-request",
            Trigger::OriginResponse => "origin-response",
            Trigger::ViewerResponse => "viewer-response",
        }
    }

    /// Triggers bound to this system's router entrypoints.
    pub fn is_reserved(self) -> bool {
        matches!(self, Trigger::OriginRequest | Trigger::OriginResponse)
    }
}

impl TryFrom<String> for Trigger {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        [
            Trigger::ViewerRequest,
            Trigger::OriginRequest,
            Trigger::OriginResponse,
            Trigger::ViewerResponse,
        ]
        .into_iter()
        .find(|t| t.as_str() == name)
        .ok_or_else(|| format!("unknown trigger {name:?}"))
    }
}

/// HTTP methods a behavior accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Options,
    Put,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub const READ: [Method; 2] = [Method::Get, Method::Head];

    pub const ALL: [Method; 7] = [
        Method::Get,
        Method::Head,
        Method::Options,
        Method::Put,
        Method::Post,
        Method::Patch,
        Method::Delete,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwardKeyword {
    All,
    None,
}

/// Cookies or headers forwarded to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ForwardSet {
    Keyword(ForwardKeyword),
    Whitelist(Vec<String>),
}

impl ForwardSet {
    pub fn all() -> Self {
        ForwardSet::Keyword(ForwardKeyword::All)
    }

    pub fn none() -> Self {
        ForwardSet::Keyword(ForwardKeyword::None)
    }
}

/// Forwarding policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Forward {
    pub cookies: ForwardSet,
    pub headers: ForwardSet,
    pub query_string: bool,
}

impl Forward {
    pub fn nothing() -> Self {
        Self {
            cookies: ForwardSet::none(),
            headers: ForwardSet::none(),
            query_string: false,
        }
    }
}

/// One CDN cache behavior.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheBehavior {
    pub min_ttl: u64,
    pub default_ttl: u64,
    pub max_ttl: u64,
    pub forward: Forward,
    pub allowed_methods: Vec<Method>,
    pub compress: bool,
    /// Trigger → function version reference.
    pub triggers: BTreeMap<Trigger, String>,
}

impl CacheBehavior {
    /// Dynamic content: not cached unless the origin says so.
    pub fn uncached() -> Self {
        Self {
            min_ttl: 0,
            default_ttl: 0,
            max_ttl: 31_536_000,
            forward: Forward::nothing(),
            allowed_methods: Method::READ.to_vec(),
            compress: true,
            triggers: BTreeMap::new(),
        }
    }

    /// Immutable build assets.
    pub fn static_assets() -> Self {
        Self {
            default_ttl: 86_400,
            ..Self::uncached()
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger, function: impl Into<String>) -> Self {
        self.triggers.insert(trigger, function.into());
        self
    }

    /// Merge user overrides on top of this behavior, field by field.
    ///
    /// Trigger maps merge key-wise: user entries replace same-named ones.
    pub fn apply(&mut self, overrides: &BehaviorOverride) {
        if let Some(v) = overrides.min_ttl {
            self.min_ttl = v;
        }
        if let Some(v) = overrides.default_ttl {
            self.default_ttl = v;
        }
        if let Some(v) = overrides.max_ttl {
            self.max_ttl = v;
        }
        if let Some(v) = &overrides.forward.cookies {
            self.forward.cookies = v.clone();
        }
        if let Some(v) = &overrides.forward.headers {
            self.forward.headers = v.clone();
        }
        if let Some(v) = overrides.forward.query_string {
            self.forward.query_string = v;
        }
        if let Some(v) = &overrides.allowed_methods {
            self.allowed_methods = v.clone();
        }
        if let Some(v) = overrides.compress {
            self.compress = v;
        }
        for (trigger, function) in &overrides.triggers {
            self.triggers.insert(*trigger, function.clone());
        }
    }
}
