//! Error types for identifier discovery

use openid_core::IdentifierError;
use openid_xrds::XrdsError;
use thiserror::Error;

use crate::transport::TransportError;

/// Result type alias for discovery operations
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Errors that can occur while discovering an identifier
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The identifier could not be normalized
    #[error(transparent)]
    Identifier(#[from] IdentifierError),

    /// The HTTP transport failed before a response was received
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A server answered with a non-success status
    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// An XRDS document could not be parsed
    #[error(transparent)]
    Xrds(#[from] XrdsError),

    /// Too many X-XRDS-Location hops
    #[error("XRDS location chain exceeded {limit} redirects")]
    RedirectLimitExceeded { limit: u32 },

    /// The overall discovery deadline elapsed
    #[error("discovery deadline of {deadline_secs}s exceeded")]
    DeadlineExceeded { deadline_secs: u64 },

    /// Discovery succeeded but produced no usable endpoint
    #[error("no OpenID endpoint found for '{0}'")]
    NotFound(String),

    /// Invalid engine configuration
    #[error("invalid discovery configuration: {0}")]
    InvalidConfig(String),
}
