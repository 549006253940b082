//! Multi-method OpenID identifier discovery
//!
//! This crate turns a user-supplied identifier into the OpenID Provider
//! endpoints published for it:
//! - Fetch the identifier URL once with an XRDS-preferring Accept header
//! - Try the configured methods in order: direct XRDS content, the
//!   X-XRDS-Location response header, the equivalent HTML meta tag, and
//!   finally OpenID `<link>` tags in the page itself
//! - First method that yields anything wins; an exhausted chain on a
//!   healthy response is `Ok(None)`, not an error
//!
//! # Architecture
//!
//! The engine talks HTTP through the [`Transport`] trait so tests can
//! script responses, and caches resolutions through the [`DiscoveryStore`]
//! trait. The bundled [`HttpTransport`] never follows HTTP redirects on its
//! own; X-XRDS-Location hops are counted by the engine against its
//! configured budget.
//!
//! # Example
//!
//! ```no_run
//! use openid_discovery::{DiscoveryConfig, DiscoveryEngine, MemoryStore};
//! use std::sync::Arc;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), openid_discovery::DiscoveryError> {
//!     let engine = DiscoveryEngine::over_http(DiscoveryConfig::default())?
//!         .with_store(Arc::new(MemoryStore::new()));
//!
//!     let info = engine.resolve("id.example.org/alice").await?;
//!     println!("OP endpoint: {:?}", info.op_endpoint_url);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod html;
pub mod storage;
pub mod transport;

pub use config::{DiscoveryConfig, DiscoveryMethod};
pub use engine::{DiscoveryEngine, LegacyDiscovery, XRDS_ACCEPT};
pub use error::{DiscoveryError, Result};
pub use html::HtmlParser;
pub use storage::{DiscoveryStore, MemoryStore};
pub use transport::{HttpMethod, HttpResponse, HttpTransport, Transport, TransportError};
