//! Noise header classification.
//!
//! A header is noise when it is builtin or user-listed, unless the user has
//! disabled it. The disable override always wins.

use serde::Serialize;

use crate::filter::exclusion::FilterMap;

pub const BUILTIN_NOISE_HEADERS: &[&str] = &[
    ":authority",
    ":method",
    ":path",
    ":scheme",
    ":status",
    "accept",
    "accept-encoding",
    "accept-language",
    "age",
    "cache-control",
    "connection",
    "content-encoding",
    "content-length",
    "date",
    "etag",
    "expect",
    "expires",
    "if-match",
    "if-modified-since",
    "if-none-match",
    "if-range",
    "if-unmodified-since",
    "keep-alive",
    "last-modified",
    "pragma",
    "range",
    "referer",
    "sec-ch-ua",
    "sec-ch-ua-mobile",
    "sec-ch-ua-platform",
    "sec-fetch-dest",
    "sec-fetch-mode",
    "sec-fetch-site",
    "sec-fetch-user",
    "server",
    "strict-transport-security",
    "transfer-encoding",
    "upgrade-insecure-requests",
    "user-agent",
    "vary",
    "via",
    "x-content-type-options",
    "x-frame-options",
    "x-powered-by",
    "x-xss-protection",
];

pub fn is_builtin_noise(name: &str) -> bool {
    BUILTIN_NOISE_HEADERS.contains(&name.to_lowercase().as_str())
}

pub fn is_noise(name: &str, user: &FilterMap, disabled: &FilterMap) -> bool {
    let key = name.to_lowercase();
    if disabled.get(&key).copied().unwrap_or(false) {
        return false;
    }
    BUILTIN_NOISE_HEADERS.contains(&key.as_str()) || user.get(&key).copied().unwrap_or(false)
}

/// One row of the noise header listing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NoiseHeader {
    pub name: String,
    pub builtin: bool,
    pub enabled: bool,
}

/// Builtin headers followed by user-added ones, each with its effective
/// state.
pub fn noise_headers(user: &FilterMap, disabled: &FilterMap) -> Vec<NoiseHeader> {
    let builtin = BUILTIN_NOISE_HEADERS.iter().map(|name| NoiseHeader {
        name: (*name).to_string(),
        builtin: true,
        enabled: is_noise(name, user, disabled),
    });
    let custom = user
        .iter()
        .filter(|(name, on)| **on && !is_builtin_noise(name))
        .map(|(name, _)| NoiseHeader {
            name: name.clone(),
            builtin: false,
            enabled: is_noise(name, user, disabled),
        });
    builtin.chain(custom).collect()
}
