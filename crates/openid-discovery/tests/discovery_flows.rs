//! End-to-end discovery flows against a scripted transport

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use openid_core::{ProtocolVersion, IDENTIFIER_SELECT};
use openid_discovery::{
    DiscoveryConfig, DiscoveryEngine, DiscoveryError, DiscoveryMethod, DiscoveryStore,
    HttpMethod, HttpResponse, MemoryStore, Transport, TransportError,
};

const USER_URL: &str = "http://id.example.org/alice";

const OP_XRDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xrds:XRDS xmlns:xrds="xri://$xrds" xmlns="xri://$xrd*($v*2.0)">
  <XRD>
    <Service priority="0">
      <Type>http://specs.openid.net/auth/2.0/server</Type>
      <URI>https://op.example.com/endpoint</URI>
    </Service>
  </XRD>
</xrds:XRDS>"#;

const SIGNON_XRDS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xrds:XRDS xmlns:xrds="xri://$xrds" xmlns="xri://$xrd*($v*2.0)">
  <XRD>
    <Service priority="0">
      <Type>http://specs.openid.net/auth/2.0/signon</Type>
      <URI>https://op.example.com/endpoint</URI>
      <LocalID>http://op-local.example.com/alice</LocalID>
    </Service>
    <Service priority="1">
      <Type>http://openid.net/signon/1.1</Type>
      <URI>https://op.example.com/v1endpoint</URI>
    </Service>
  </XRD>
</xrds:XRDS>"#;

/// Transport that serves canned responses and records every request URL.
struct MockTransport {
    responses: HashMap<String, HttpResponse>,
    requests: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockTransport {
    fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    fn with_response(mut self, url: &str, response: HttpResponse) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        _method: HttpMethod,
        url: &str,
        accept: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        assert!(
            accept.map(|a| a.starts_with("application/xrds+xml;q=1.0")).unwrap_or(false),
            "every discovery request must prefer XRDS"
        );
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(url.to_string());
        Ok(self.responses.get(url).cloned().unwrap_or(HttpResponse {
            status: 404,
            headers: Vec::new(),
            body: Vec::new(),
        }))
    }
}

/// Wraps another transport, stalling every response long enough to burn
/// through a short whole-chain deadline.
struct SlowTransport {
    inner: Arc<MockTransport>,
    delay: Duration,
}

#[async_trait]
impl Transport for SlowTransport {
    async fn send(
        &self,
        method: HttpMethod,
        url: &str,
        accept: Option<&str>,
    ) -> Result<HttpResponse, TransportError> {
        let response = self.inner.send(method, url, accept).await;
        std::thread::sleep(self.delay);
        response
    }
}

fn html_response(body: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: vec![("Content-Type".to_string(), "text/html".to_string())],
        body: body.as_bytes().to_vec(),
    }
}

fn xrds_response(body: &str) -> HttpResponse {
    HttpResponse {
        status: 200,
        headers: vec![(
            "Content-Type".to_string(),
            "application/xrds+xml; charset=utf-8".to_string(),
        )],
        body: body.as_bytes().to_vec(),
    }
}

fn engine(transport: MockTransport) -> (DiscoveryEngine, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let engine = DiscoveryEngine::new(transport.clone(), DiscoveryConfig::default()).unwrap();
    (engine, transport)
}

#[tokio::test]
async fn direct_xrds_document() {
    let (engine, transport) =
        engine(MockTransport::new().with_response(USER_URL, xrds_response(OP_XRDS)));

    let result = engine.discover(USER_URL).await.unwrap().unwrap();
    assert_eq!(result.len(), 1);
    let service = result.first().unwrap();
    assert_eq!(service.claimed_identifier(), IDENTIFIER_SELECT);
    assert_eq!(service.op_endpoint_url(), Some("https://op.example.com/endpoint"));
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn xrds_location_header_is_followed_once() {
    let xrds_url = "https://id.example.org/xrds";
    let mut page = html_response("<html><head><title>alice</title></head></html>");
    page.headers
        .push(("X-XRDS-Location".to_string(), xrds_url.to_string()));

    let (engine, transport) = engine(
        MockTransport::new()
            .with_response(USER_URL, page)
            .with_response(xrds_url, xrds_response(SIGNON_XRDS)),
    );

    let result = engine.discover(USER_URL).await.unwrap().unwrap();
    assert_eq!(result.len(), 2);
    let best = result.first().unwrap();
    assert_eq!(best.version(), ProtocolVersion::V2_0);
    assert_eq!(best.claimed_identifier(), USER_URL);
    assert_eq!(
        best.op_local_identifier(),
        Some("http://op-local.example.com/alice")
    );

    assert_eq!(transport.call_count(), 2);
    assert_eq!(transport.requests(), vec![USER_URL.to_string(), xrds_url.to_string()]);
}

#[tokio::test]
async fn xrds_location_meta_tag_is_followed() {
    let xrds_url = "https://id.example.org/xrds";
    let page = html_response(
        r#"<html><head>
             <meta http-equiv="X-XRDS-Location" content="https://id.example.org/xrds">
           </head></html>"#,
    );

    let (engine, transport) = engine(
        MockTransport::new()
            .with_response(USER_URL, page)
            .with_response(xrds_url, xrds_response(OP_XRDS)),
    );

    let result = engine.discover(USER_URL).await.unwrap().unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(transport.call_count(), 2);
}

#[tokio::test]
async fn html_link_tags_as_last_resort() {
    let page = html_response(
        r#"<html><head>
             <link rel="openid.server" href="http://op.example.com/server">
             <link rel="openid.delegate" href="http://id.example.org/alice-delegate">
           </head></html>"#,
    );
    let (engine, transport) = engine(MockTransport::new().with_response(USER_URL, page));

    let result = engine.discover(USER_URL).await.unwrap().unwrap();
    let service = result.first().unwrap();
    assert_eq!(service.version(), ProtocolVersion::V1_1);
    assert_eq!(
        service.op_local_identifier(),
        Some("http://id.example.org/alice-delegate")
    );
    assert_eq!(transport.call_count(), 1);
}

#[tokio::test]
async fn plain_page_is_none_not_an_error() {
    let page = html_response("<html><head><title>nothing here</title></head></html>");
    let (engine, _) = engine(MockTransport::new().with_response(USER_URL, page));
    assert!(engine.discover(USER_URL).await.unwrap().is_none());
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (engine, _) = engine(MockTransport::new());
    let err = engine.discover(USER_URL).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::HttpStatus { status: 404, .. }));
}

#[tokio::test]
async fn xrds_location_loop_hits_redirect_limit() {
    let a = "https://id.example.org/a";
    let b = "https://id.example.org/b";
    let bounce = |target: &str| HttpResponse {
        status: 200,
        headers: vec![("X-XRDS-Location".to_string(), target.to_string())],
        body: Vec::new(),
    };

    let transport = Arc::new(
        MockTransport::new()
            .with_response(USER_URL, bounce(a))
            .with_response(a, bounce(b))
            .with_response(b, bounce(a)),
    );
    let config = DiscoveryConfig {
        max_redirects: 4,
        ..Default::default()
    };
    let engine = DiscoveryEngine::new(transport.clone(), config).unwrap();

    let err = engine.discover(USER_URL).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::RedirectLimitExceeded { limit: 4 }));
    // The initial fetch plus four hops.
    assert_eq!(transport.call_count(), 5);
}

#[tokio::test]
async fn configured_method_order_is_respected() {
    // XRDS content is on the wire, but the engine is told to only look at
    // link tags, so it sees nothing.
    let transport = Arc::new(MockTransport::new().with_response(USER_URL, xrds_response(OP_XRDS)));
    let config = DiscoveryConfig {
        methods: vec![DiscoveryMethod::HtmlBased],
        ..Default::default()
    };
    let engine = DiscoveryEngine::new(transport, config).unwrap();
    assert!(engine.discover(USER_URL).await.unwrap().is_none());
}

#[tokio::test]
async fn deadline_aborts_the_chain_before_the_next_request() {
    let a = "https://id.example.org/a";
    let bounce = |target: &str| HttpResponse {
        status: 200,
        headers: vec![("X-XRDS-Location".to_string(), target.to_string())],
        body: Vec::new(),
    };

    let inner = Arc::new(
        MockTransport::new()
            .with_response(USER_URL, bounce(a))
            .with_response(a, bounce(a)),
    );
    let transport = SlowTransport {
        inner: inner.clone(),
        delay: Duration::from_millis(1200),
    };
    let config = DiscoveryConfig {
        deadline_secs: Some(1),
        ..Default::default()
    };
    let engine = DiscoveryEngine::new(Arc::new(transport), config).unwrap();

    let err = engine.discover(USER_URL).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::DeadlineExceeded { .. }));
    // The initial fetch consumed the whole budget, so the hop to the
    // advertised XRDS location was never issued.
    assert_eq!(inner.call_count(), 1);
    assert_eq!(inner.requests(), vec![USER_URL.to_string()]);
}

#[tokio::test]
async fn empty_method_list_means_the_full_chain() {
    let page = html_response(
        r#"<link rel="openid2.provider" href="https://op.example.com/op">"#,
    );
    let (engine, _) = engine(MockTransport::new().with_response(USER_URL, page));

    let result = engine.discover_with(USER_URL, &[]).await.unwrap().unwrap();
    assert_eq!(
        result.first().unwrap().op_endpoint_url(),
        Some("https://op.example.com/op")
    );
}

#[tokio::test]
async fn resolve_populates_and_reads_cache() {
    let transport = Arc::new(
        MockTransport::new().with_response(USER_URL, xrds_response(SIGNON_XRDS)),
    );
    let store = Arc::new(MemoryStore::new());
    let engine = DiscoveryEngine::new(transport.clone(), DiscoveryConfig::default())
        .unwrap()
        .with_store(store.clone());

    let info = engine.resolve("id.example.org/alice").await.unwrap();
    assert_eq!(info.op_endpoint_url.as_deref(), Some("https://op.example.com/endpoint"));
    assert_eq!(info.protocol_version, ProtocolVersion::V2_0);
    assert_eq!(transport.call_count(), 1);

    // Second resolution is served from the store.
    let cached = engine.resolve("id.example.org/alice").await.unwrap();
    assert_eq!(cached, info);
    assert_eq!(transport.call_count(), 1);
    assert!(store.get(USER_URL).await.is_some());
}

#[tokio::test]
async fn resolve_not_found_when_nothing_discovered() {
    let page = html_response("<html></html>");
    let (engine, _) = engine(MockTransport::new().with_response(USER_URL, page));
    let err = engine.resolve(USER_URL).await.unwrap_err();
    assert!(matches!(err, DiscoveryError::NotFound(_)));
}

#[tokio::test]
async fn legacy_v1_page() {
    let page = html_response(
        r#"<link rel="openid.server" href="http://op.example.com/server">
           <link rel="openid.delegate" href="http://id.example.org/alice-delegate">"#,
    );
    let (engine, _) = engine(MockTransport::new().with_response(USER_URL, page));

    let legacy = engine.legacy_discover(USER_URL).await.unwrap().unwrap();
    assert_eq!(legacy.endpoint_url, "http://op.example.com/server");
    assert_eq!(legacy.local_identifier, "http://id.example.org/alice-delegate");
    assert_eq!(legacy.version, ProtocolVersion::V1_1);
}

#[tokio::test]
async fn legacy_prefers_v2_when_both_generations_present() {
    let page = html_response(
        r#"<link rel="openid.server" href="http://op.example.com/v1">
           <link rel='openid2.provider' href='https://op.example.com/v2'>"#,
    );
    let (engine, _) = engine(MockTransport::new().with_response(USER_URL, page));

    let legacy = engine.legacy_discover(USER_URL).await.unwrap().unwrap();
    assert_eq!(legacy.endpoint_url, "https://op.example.com/v2");
    assert_eq!(legacy.version, ProtocolVersion::V2_0);
    // No local_id tag, so the claimed identifier stands in.
    assert_eq!(legacy.local_identifier, USER_URL);
}

#[tokio::test]
async fn legacy_none_for_unrelated_page() {
    let page = html_response(r#"<link rel="stylesheet" href="/main.css">"#);
    let (engine, _) = engine(MockTransport::new().with_response(USER_URL, page));
    assert!(engine.legacy_discover(USER_URL).await.unwrap().is_none());
}
