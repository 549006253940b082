//! # OpenID Core
//!
//! Core data model for OpenID relying-party discovery:
//!
//! - **Identifiers**: role-tagged wrapper for supplied/claimed/OP-local
//!   identifiers plus URL normalization of user input.
//! - **Services**: a discovered service advertisement (`ServiceEndpoint`)
//!   with priority, declared type URIs, endpoint URIs, and the derived
//!   attributes (claimed identifier, OP endpoint URL, OP-local identifier,
//!   protocol version) classified once at construction.
//! - **Results**: `DiscoveryResult`, a priority-ordered collection of
//!   service endpoints, and `DiscoveryInfo`, the flat summary of a single
//!   resolved identifier suitable for caching.
//!
//! # Example
//!
//! ```
//! use openid_core::{ServiceEndpoint, ProtocolVersion, OPENID_20};
//!
//! let service = ServiceEndpoint::new(
//!     "https://example.org/id",
//!     vec![OPENID_20.to_string()],
//!     vec!["https://op.example.org/auth".to_string()],
//!     Vec::new(),
//!     0,
//! );
//!
//! assert_eq!(service.version(), ProtocolVersion::V2_0);
//! assert_eq!(service.op_endpoint_url(), Some("https://op.example.org/auth"));
//! ```

pub mod identifier;
pub mod result;
pub mod service;

pub use identifier::{normalize, Identifier, IdentifierError, Role};
pub use result::{DiscoveryInfo, DiscoveryResult};
pub use service::{
    ProtocolVersion, ServiceAttribute, ServiceEndpoint, IDENTIFIER_SELECT, OPENID_10, OPENID_11,
    OPENID_20, OPENID_20_OP, OPENID_20_RP,
};
