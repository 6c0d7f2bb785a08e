//! Export settings of one archive.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::export::noise;
use crate::filter::exclusion::FilterMap;

/// Original position -> flag.
pub type PositionMap = BTreeMap<usize, bool>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub request_body: bool,
    pub request_cookies: bool,
    pub response_body: bool,
    pub response_cookies: bool,
    pub timings: bool,
    pub server_ip: bool,
    pub query_string: bool,
    pub include_initiator: bool,
    pub hide_noise_req: bool,
    pub hide_noise_resp: bool,
    pub use_original_order: bool,
    pub minify_html: bool,
    pub minify_json: bool,
    pub strip_base64: bool,
    /// Lowercase header name -> included. Absent names are included.
    pub included_request_headers: FilterMap,
    pub included_response_headers: FilterMap,
    pub user_noise_headers: FilterMap,
    pub disabled_noise_headers: FilterMap,
    pub deselected_entries: PositionMap,
    pub excluded_responses: PositionMap,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            request_body: true,
            request_cookies: true,
            response_body: true,
            response_cookies: true,
            timings: true,
            server_ip: true,
            query_string: true,
            include_initiator: true,
            hide_noise_req: true,
            hide_noise_resp: true,
            use_original_order: true,
            minify_html: true,
            minify_json: true,
            strip_base64: true,
            included_request_headers: FilterMap::new(),
            included_response_headers: FilterMap::new(),
            user_noise_headers: FilterMap::new(),
            disabled_noise_headers: FilterMap::new(),
            deselected_entries: PositionMap::new(),
            excluded_responses: PositionMap::new(),
        }
    }
}

impl ExportSettings {
    pub fn is_noise(&self, name: &str) -> bool {
        noise::is_noise(name, &self.user_noise_headers, &self.disabled_noise_headers)
    }

    pub fn is_deselected(&self, position: usize) -> bool {
        self.deselected_entries.get(&position).copied().unwrap_or(false)
    }

    pub fn is_response_excluded(&self, position: usize) -> bool {
        self.excluded_responses.get(&position).copied().unwrap_or(false)
    }

    pub fn with_deselected(&self, position: usize, deselected: bool) -> Self {
        let mut next = self.clone();
        if deselected {
            next.deselected_entries.insert(position, true);
        } else {
            next.deselected_entries.remove(&position);
        }
        next
    }

    pub fn with_response_excluded(&self, position: usize, excluded: bool) -> Self {
        let mut next = self.clone();
        if excluded {
            next.excluded_responses.insert(position, true);
        } else {
            next.excluded_responses.remove(&position);
        }
        next
    }

    /// Mark a user noise header. Any disable override for it is cleared.
    pub fn add_user_noise_header(&self, name: &str) -> Self {
        let key = name.trim().to_lowercase();
        let mut next = self.clone();
        if key.is_empty() {
            return next;
        }
        next.disabled_noise_headers.remove(&key);
        next.user_noise_headers.insert(key, true);
        next
    }

    pub fn remove_user_noise_header(&self, name: &str) -> Self {
        let key = name.trim().to_lowercase();
        let mut next = self.clone();
        next.user_noise_headers.remove(&key);
        next.disabled_noise_headers.remove(&key);
        next
    }

    /// `enabled = false` records a disable override; `true` clears it.
    pub fn toggle_noise_header(&self, name: &str, enabled: bool) -> Self {
        let key = name.trim().to_lowercase();
        let mut next = self.clone();
        if enabled {
            next.disabled_noise_headers.remove(&key);
        } else {
            next.disabled_noise_headers.insert(key, true);
        }
        next
    }
}
