//! Request descriptors and client identity resolution.
//!
//! The pipeline never sees a real HTTP request; callers translate whatever
//! transport they use into a [`RequestDescriptor`] and hand it to the
//! pipeline together with the wall-clock instant the request arrived.

use crate::domain::error::Rejection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::User;
use std::fmt;
use std::str::FromStr;

/// HTTP method of an intercepted request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Uppercase wire name of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown method name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown method: {0}")]
pub struct MethodParseError(pub String);

impl FromStr for Method {
    type Err = MethodParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("GET") {
            Ok(Self::Get)
        } else if s.eq_ignore_ascii_case("POST") {
            Ok(Self::Post)
        } else if s.eq_ignore_ascii_case("PUT") {
            Ok(Self::Put)
        } else if s.eq_ignore_ascii_case("PATCH") {
            Ok(Self::Patch)
        } else if s.eq_ignore_ascii_case("DELETE") {
            Ok(Self::Delete)
        } else {
            Err(MethodParseError(s.to_string()))
        }
    }
}

/// Opaque key the rate limiter buckets clients under.
///
/// Resolved fresh on every request from the forwarded-for chain (first entry,
/// trimmed) or the transport-level remote address. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientKey(pub String);

impl ClientKey {
    /// Resolve the key for a request.
    ///
    /// A forwarded-for header wins when it carries a non-empty first entry;
    /// otherwise the remote address is used as-is.
    #[must_use]
    pub fn resolve(forwarded_for: Option<&str>, remote_addr: &str) -> Self {
        if let Some(forwarded) = forwarded_for {
            if let Some(first) = forwarded.split(',').next() {
                let first = first.trim();
                if !first.is_empty() {
                    return Self(first.to_string());
                }
            }
        }
        Self(remote_addr.to_string())
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ClientKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Everything the pipeline needs to know about one inbound request.
///
/// `received_at` is the wall-clock input to the time gate and the limiter;
/// production callers stamp it with `Utc::now()`, tests construct whatever
/// instant the scenario needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Request path, e.g. `/api/messages/`
    pub path: String,
    /// Transport-level peer address
    pub remote_addr: String,
    /// Raw forwarded-for header, when a proxy supplied one
    pub forwarded_for: Option<String>,
    /// Authenticated principal, when authentication succeeded upstream
    pub identity: Option<User>,
    /// Wall-clock instant the request arrived
    pub received_at: DateTime<Utc>,
}

impl RequestDescriptor {
    /// Create a descriptor stamped with the current wall clock.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>, remote_addr: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            remote_addr: remote_addr.into(),
            forwarded_for: None,
            identity: None,
            received_at: Utc::now(),
        }
    }

    /// Attach an authenticated identity.
    #[must_use]
    pub fn with_identity(mut self, user: User) -> Self {
        self.identity = Some(user);
        self
    }

    /// Attach a forwarded-for header value.
    #[must_use]
    pub fn with_forwarded_for(mut self, value: impl Into<String>) -> Self {
        self.forwarded_for = Some(value.into());
        self
    }

    /// Override the arrival instant.
    #[must_use]
    pub fn with_received_at(mut self, at: DateTime<Utc>) -> Self {
        self.received_at = at;
        self
    }

    /// The key the rate limiter buckets this request under.
    #[must_use]
    pub fn client_key(&self) -> ClientKey {
        ClientKey::resolve(self.forwarded_for.as_deref(), &self.remote_addr)
    }

    /// Username for the audit line, if authenticated.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.identity.as_ref().map(|user| user.username.as_str())
    }
}

/// Outcome of evaluating the full pipeline for one request
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyDecision {
    /// Every stage passed; the terminal handler may run
    Allowed,
    /// A stage rejected; the terminal handler must not run
    Rejected(Rejection),
}

impl PolicyDecision {
    /// Whether the request may proceed to the terminal handler.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }

    /// The rejection, when one was produced.
    #[must_use]
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Self::Allowed => None,
            Self::Rejected(rejection) => Some(rejection),
        }
    }
}
