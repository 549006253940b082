//! The discovery engine
//!
//! One engine instance is cheap to clone behind an Arc and safe to share.
//! Discovery fetches the identifier URL once, then walks the configured
//! methods in order against that response; only the XRDS-location methods
//! issue further requests, each counted against the redirect budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use openid_core::{normalize, DiscoveryInfo, DiscoveryResult, Identifier, ProtocolVersion};
use openid_xrds::parse_xrds;

use crate::config::{DiscoveryConfig, DiscoveryMethod};
use crate::error::{DiscoveryError, Result};
use crate::html::HtmlParser;
use crate::storage::DiscoveryStore;
use crate::transport::{HttpMethod, HttpResponse, HttpTransport, Transport};

/// Accept header sent with every discovery request. XRDS is preferred,
/// HTML is acceptable, anything else is a last resort.
pub const XRDS_ACCEPT: &str = "application/xrds+xml;q=1.0,text/html;q=0.9,\
application/xhtml+xml;q=0.9,application/xml;q=0.8,*/*;q=0.7";

const XRDS_CONTENT_TYPE: &str = "application/xrds+xml";
const XRDS_LOCATION_HEADER: &str = "x-xrds-location";

/// The three values the pre-2.0 consumer API worked in
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyDiscovery {
    /// Identifier to assert at the OP: the delegate when one was declared,
    /// otherwise the claimed identifier itself
    pub local_identifier: String,
    /// OP endpoint URL
    pub endpoint_url: String,
    pub version: ProtocolVersion,
}

/// Multi-method identifier discovery over a pluggable transport
pub struct DiscoveryEngine {
    transport: Arc<dyn Transport>,
    store: Option<Arc<dyn DiscoveryStore>>,
    config: DiscoveryConfig,
    html: HtmlParser,
}

impl DiscoveryEngine {
    pub fn new(transport: Arc<dyn Transport>, config: DiscoveryConfig) -> Result<Self> {
        config.validate().map_err(DiscoveryError::InvalidConfig)?;
        Ok(Self {
            transport,
            store: None,
            config,
            html: HtmlParser::new(),
        })
    }

    /// Builds an engine over a real HTTP client with the configured
    /// per-request timeout.
    pub fn over_http(config: DiscoveryConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.request_timeout())?;
        Self::new(Arc::new(transport), config)
    }

    /// Attaches a cache consulted and populated by [`resolve`](Self::resolve).
    pub fn with_store(mut self, store: Arc<dyn DiscoveryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Runs full discovery on a user-supplied identifier.
    ///
    /// Returns `Ok(None)` when every configured method came up empty on an
    /// otherwise healthy response. A non-success status, transport failure,
    /// or malformed XRDS is an error, not an empty result.
    pub async fn discover(&self, raw: &str) -> Result<Option<DiscoveryResult>> {
        self.discover_with(raw, &self.config.methods).await
    }

    /// Like [`discover`](Self::discover), with an explicit method order for
    /// this call. An empty list means the full default chain.
    pub async fn discover_with(
        &self,
        raw: &str,
        methods: &[DiscoveryMethod],
    ) -> Result<Option<DiscoveryResult>> {
        let default_order;
        let methods = if methods.is_empty() {
            default_order = DiscoveryMethod::all();
            default_order.as_slice()
        } else {
            methods
        };

        let normalized = normalize(raw)?;
        let supplied = Identifier::supplied(&normalized);
        let deadline = self.deadline();

        debug!(identifier = %normalized, "starting discovery");
        let response = self.fetch(&normalized, deadline).await?;

        for method in methods {
            match method {
                DiscoveryMethod::Xrds => {
                    if response.content_type().as_deref() == Some(XRDS_CONTENT_TYPE) {
                        let result = parse_xrds(supplied.as_str(), &response.body)?;
                        info!(
                            identifier = %normalized,
                            services = result.len(),
                            "discovered via direct XRDS"
                        );
                        return Ok(Some(result));
                    }
                }
                DiscoveryMethod::HttpHeader => {
                    if let Some(location) = response.header(XRDS_LOCATION_HEADER) {
                        let location = location.trim().to_string();
                        let result = self.follow_xrds(&supplied, location, deadline).await?;
                        info!(
                            identifier = %normalized,
                            services = result.len(),
                            "discovered via X-XRDS-Location header"
                        );
                        return Ok(Some(result));
                    }
                }
                DiscoveryMethod::HtmlMeta => {
                    if let Some(location) = self.html.xrds_location(&response.body_str()) {
                        let result = self.follow_xrds(&supplied, location, deadline).await?;
                        info!(
                            identifier = %normalized,
                            services = result.len(),
                            "discovered via X-XRDS-Location meta tag"
                        );
                        return Ok(Some(result));
                    }
                }
                DiscoveryMethod::HtmlBased => {
                    if let Some(result) = self.html.discover(&supplied, &response.body_str()) {
                        info!(
                            identifier = %normalized,
                            services = result.len(),
                            "discovered via HTML link tags"
                        );
                        return Ok(Some(result));
                    }
                }
            }
        }

        debug!(identifier = %normalized, "no discovery method produced a result");
        Ok(None)
    }

    /// Cached resolution of an identifier down to a single endpoint summary.
    ///
    /// The best-priority service wins. Discovery that yields nothing is
    /// [`DiscoveryError::NotFound`] here, since the caller asked for an
    /// endpoint, not a survey.
    pub async fn resolve(&self, raw: &str) -> Result<DiscoveryInfo> {
        let normalized = normalize(raw)?;

        if let Some(store) = &self.store {
            if let Some(info) = store.get(&normalized).await {
                debug!(identifier = %normalized, "resolved from cache");
                return Ok(info);
            }
        }

        let result = self.discover(&normalized).await?;
        let service = result
            .as_ref()
            .and_then(DiscoveryResult::first)
            .ok_or_else(|| DiscoveryError::NotFound(normalized.clone()))?;

        let supplied = Identifier::supplied(&normalized);
        let info = DiscoveryInfo::from_service(&supplied, service);
        if let Some(store) = &self.store {
            store
                .put(&normalized, info.clone(), self.config.cache_ttl())
                .await;
        }
        Ok(info)
    }

    /// Pre-2.0 style discovery: HTML link tags only, condensed to the
    /// (local identifier, endpoint URL, version) triple. Returns `Ok(None)`
    /// when the page declares no OpenID endpoint.
    pub async fn legacy_discover(&self, raw: &str) -> Result<Option<LegacyDiscovery>> {
        let normalized = normalize(raw)?;
        let supplied = Identifier::supplied(&normalized);
        let deadline = self.deadline();

        let response = self.fetch(&normalized, deadline).await?;
        let Some(result) = self.html.discover(&supplied, &response.body_str()) else {
            return Ok(None);
        };
        let Some(service) = result.first() else {
            return Ok(None);
        };
        let Some(endpoint_url) = service.op_endpoint_url() else {
            return Ok(None);
        };

        Ok(Some(LegacyDiscovery {
            local_identifier: service
                .op_local_identifier()
                .unwrap_or(service.claimed_identifier())
                .to_string(),
            endpoint_url: endpoint_url.to_string(),
            version: service.version(),
        }))
    }

    /// Follows a chain of X-XRDS-Location hops until a document parses,
    /// spending at most `max_redirects` requests.
    async fn follow_xrds(
        &self,
        supplied: &Identifier,
        location: String,
        deadline: Option<Instant>,
    ) -> Result<DiscoveryResult> {
        let mut url = location;
        for hop in 0..self.config.max_redirects {
            debug!(%url, hop, "following XRDS location");
            let response = self.fetch(&url, deadline).await?;
            if let Some(next) = response.header(XRDS_LOCATION_HEADER) {
                let next = next.trim();
                if !next.is_empty() && next != url {
                    url = next.to_string();
                    continue;
                }
            }
            return Ok(parse_xrds(supplied.as_str(), &response.body)?);
        }
        Err(DiscoveryError::RedirectLimitExceeded {
            limit: self.config.max_redirects,
        })
    }

    /// One GET against the budget: deadline checked first, non-success
    /// statuses rejected.
    async fn fetch(&self, url: &str, deadline: Option<Instant>) -> Result<HttpResponse> {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(DiscoveryError::DeadlineExceeded {
                    deadline_secs: self.config.deadline_secs.unwrap_or_default(),
                });
            }
        }
        let response = self
            .transport
            .send(HttpMethod::Get, url, Some(XRDS_ACCEPT))
            .await?;
        if !response.is_success() {
            return Err(DiscoveryError::HttpStatus {
                url: url.to_string(),
                status: response.status,
            });
        }
        Ok(response)
    }

    fn deadline(&self) -> Option<Instant> {
        self.config
            .deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs))
    }
}
