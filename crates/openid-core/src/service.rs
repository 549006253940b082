//! Service advertisement data model and type classification

use serde::{Deserialize, Serialize};
use std::fmt;

/// OpenID 1.0 signon service type
pub const OPENID_10: &str = "http://openid.net/signon/1.0";

/// OpenID 1.1 signon service type
pub const OPENID_11: &str = "http://openid.net/signon/1.1";

/// OpenID 2.0 signon service type (claimed identifier entered by the user)
pub const OPENID_20: &str = "http://specs.openid.net/auth/2.0/signon";

/// OpenID 2.0 OP Identifier service type (identifier select)
pub const OPENID_20_OP: &str = "http://specs.openid.net/auth/2.0/server";

/// OpenID 2.0 relying-party return_to service type
pub const OPENID_20_RP: &str = "http://specs.openid.net/auth/2.0/return_to";

/// Placeholder identifier signalling that the OP chooses the identifier
pub const IDENTIFIER_SELECT: &str = "http://specs.openid.net/auth/2.0/identifier_select";

/// Protocol version derived from the declared service type URIs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtocolVersion {
    V1_0,
    V1_1,
    V2_0,
    /// No recognized OpenID type URI was declared
    Unknown,
}

impl ProtocolVersion {
    /// Numeric form used by the legacy three-value discovery API
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            ProtocolVersion::V1_0 => Some(1.0),
            ProtocolVersion::V1_1 => Some(1.1),
            ProtocolVersion::V2_0 => Some(2.0),
            ProtocolVersion::Unknown => None,
        }
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolVersion::V1_0 => f.write_str("1.0"),
            ProtocolVersion::V1_1 => f.write_str("1.1"),
            ProtocolVersion::V2_0 => f.write_str("2.0"),
            ProtocolVersion::Unknown => f.write_str("unknown"),
        }
    }
}

/// Keys for the attributes derived during classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceAttribute {
    ClaimedIdentifier,
    OpEndpointUrl,
    OpLocalIdentifier,
}

/// One discovered service advertisement.
///
/// Built from the raw pieces of a `<Service>` element (or a synthesized
/// equivalent from HTML link tags). Classification against the well-known
/// OpenID type URIs runs exactly once here; the derived attributes are never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEndpoint {
    priority: u32,
    types: Vec<String>,
    uris: Vec<String>,
    extra: Vec<(String, String)>,
    version: ProtocolVersion,
    claimed_identifier: String,
    op_endpoint_url: Option<String>,
    op_local_identifier: Option<String>,
}

impl ServiceEndpoint {
    /// Construct and classify a service advertisement.
    ///
    /// `supplied` is the identifier discovery was performed on; it becomes
    /// the claimed identifier unless the service is an OP Identifier
    /// (identifier select) advertisement.
    pub fn new(
        supplied: &str,
        types: Vec<String>,
        uris: Vec<String>,
        extra: Vec<(String, String)>,
        priority: u32,
    ) -> Self {
        let endpoint = uris.first().cloned();

        // Fixed precedence: first matching rule wins, later types are
        // ignored even when also present.
        let (version, claimed, op_endpoint, op_local) =
            if types.iter().any(|t| t == OPENID_20_OP) {
                (
                    ProtocolVersion::V2_0,
                    IDENTIFIER_SELECT.to_string(),
                    endpoint,
                    Some(IDENTIFIER_SELECT.to_string()),
                )
            } else if types.iter().any(|t| t == OPENID_20) {
                (
                    ProtocolVersion::V2_0,
                    supplied.to_string(),
                    endpoint,
                    first_extra(&extra, &["LocalID", "openid2.local_id"]),
                )
            } else if types.iter().any(|t| t == OPENID_11) {
                (
                    ProtocolVersion::V1_1,
                    supplied.to_string(),
                    endpoint,
                    first_extra(&extra, &["openid:Delegate", "LocalID", "openid.delegate"]),
                )
            } else if types.iter().any(|t| t == OPENID_10) {
                (
                    ProtocolVersion::V1_0,
                    supplied.to_string(),
                    endpoint,
                    first_extra(&extra, &["openid:Delegate", "LocalID", "openid.delegate"]),
                )
            } else {
                (ProtocolVersion::Unknown, supplied.to_string(), None, None)
            };

        Self {
            priority,
            types,
            uris,
            extra,
            version,
            claimed_identifier: claimed,
            op_endpoint_url: op_endpoint,
            op_local_identifier: op_local,
        }
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    /// Declared type URIs, in document order
    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn has_type(&self, type_uri: &str) -> bool {
        self.types.iter().any(|t| t == type_uri)
    }

    /// Endpoint URIs, in document order; index 0 is primary
    pub fn uris(&self) -> &[String] {
        &self.uris
    }

    /// Unrecognized child elements as (name, value), in document order
    pub fn extra(&self) -> &[(String, String)] {
        &self.extra
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Always present; defaults to the identifier under discovery
    pub fn claimed_identifier(&self) -> &str {
        &self.claimed_identifier
    }

    /// Present whenever a recognized type URI matched
    pub fn op_endpoint_url(&self) -> Option<&str> {
        self.op_endpoint_url.as_deref()
    }

    pub fn op_local_identifier(&self) -> Option<&str> {
        self.op_local_identifier.as_deref()
    }

    /// Derived attribute lookup by key
    pub fn attribute(&self, key: ServiceAttribute) -> Option<&str> {
        match key {
            ServiceAttribute::ClaimedIdentifier => Some(&self.claimed_identifier),
            ServiceAttribute::OpEndpointUrl => self.op_endpoint_url.as_deref(),
            ServiceAttribute::OpLocalIdentifier => self.op_local_identifier.as_deref(),
        }
    }
}

fn first_extra(extra: &[(String, String)], names: &[&str]) -> Option<String> {
    extra
        .iter()
        .find(|(name, _)| names.contains(&name.as_str()))
        .map(|(_, value)| value.clone())
}
