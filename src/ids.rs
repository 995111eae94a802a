//! Request identity
//!
//! Every [`HandlerRequest`](crate::dispatcher::HandlerRequest) carries a
//! [`RequestId`]. It is adopted from an incoming [`REQUEST_ID_HEADER`] when
//! that holds a valid ULID, so callers can correlate logs across services,
//! and generated otherwise.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Header an upstream request ID is read from (matched case-insensitively)
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ULID-backed request identifier, serialised as its 26-character string
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RequestId(ulid::Ulid);

impl RequestId {
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Parse a header value, ignoring surrounding whitespace
    #[must_use]
    pub fn parse_header(value: &str) -> Option<Self> {
        value.trim().parse().ok()
    }

    /// The ID carried by `header_value`, or a fresh one when it is absent or
    /// not a ULID
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value.and_then(Self::parse_header).unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(Self)
    }
}

impl TryFrom<String> for RequestId {
    type Error = ulid::DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> Self {
        id.to_string()
    }
}
