//! Configuration for the discovery engine

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A discovery method the engine may attempt, in fallback order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryMethod {
    /// The fetched document is itself an XRDS document
    Xrds,
    /// Follow an X-XRDS-Location response header
    HttpHeader,
    /// Follow an X-XRDS-Location HTML meta tag
    HtmlMeta,
    /// Read OpenID link tags straight out of the HTML
    HtmlBased,
}

/// Configuration for a [`DiscoveryEngine`](crate::DiscoveryEngine)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Methods to attempt, in order
    #[serde(default = "default_methods")]
    pub methods: Vec<DiscoveryMethod>,

    /// Maximum X-XRDS-Location hops before giving up
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Per-request timeout (seconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Overall deadline for one discovery run (seconds); None means unbounded
    #[serde(default)]
    pub deadline_secs: Option<u64>,

    /// How long resolved identifiers stay cached (seconds)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
}

impl DiscoveryMethod {
    /// The full fallback chain in default priority order.
    pub fn all() -> Vec<DiscoveryMethod> {
        vec![
            DiscoveryMethod::Xrds,
            DiscoveryMethod::HttpHeader,
            DiscoveryMethod::HtmlMeta,
            DiscoveryMethod::HtmlBased,
        ]
    }
}

fn default_methods() -> Vec<DiscoveryMethod> {
    DiscoveryMethod::all()
}

fn default_max_redirects() -> u32 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_cache_ttl() -> u64 {
    3600
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            methods: default_methods(),
            max_redirects: default_max_redirects(),
            request_timeout_secs: default_request_timeout(),
            deadline_secs: None,
            cache_ttl_secs: default_cache_ttl(),
        }
    }
}

impl DiscoveryConfig {
    /// Returns the per-request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Returns the cache TTL as a Duration
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.methods.is_empty() {
            return Err("at least one discovery method must be configured".to_string());
        }

        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs cannot be 0".to_string());
        }

        if self.cache_ttl_secs == 0 {
            return Err("cache_ttl_secs cannot be 0".to_string());
        }

        if self.deadline_secs == Some(0) {
            return Err("deadline_secs cannot be 0".to_string());
        }

        Ok(())
    }
}
