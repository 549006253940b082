//! Ordered discovery results and the cacheable summary form

use crate::identifier::Identifier;
use crate::service::{ProtocolVersion, ServiceEndpoint};
use serde::{Deserialize, Serialize};

/// Priority-ordered collection of discovered service endpoints.
///
/// Services are kept sorted ascending by priority (lower value is
/// preferred, per XRD priority semantics). The sort is stable, so services
/// with equal priority stay in insertion order, which is document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    services: Vec<ServiceEndpoint>,
}

impl DiscoveryResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a service, maintaining priority order.
    pub fn push(&mut self, service: ServiceEndpoint) {
        self.services.push(service);
        self.services.sort_by_key(ServiceEndpoint::priority);
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Highest-priority service, if any
    pub fn first(&self) -> Option<&ServiceEndpoint> {
        self.services.first()
    }

    pub fn get(&self, index: usize) -> Option<&ServiceEndpoint> {
        self.services.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ServiceEndpoint> {
        self.services.iter()
    }

    pub fn services(&self) -> &[ServiceEndpoint] {
        &self.services
    }
}

impl<'a> IntoIterator for &'a DiscoveryResult {
    type Item = &'a ServiceEndpoint;
    type IntoIter = std::slice::Iter<'a, ServiceEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.iter()
    }
}

impl IntoIterator for DiscoveryResult {
    type Item = ServiceEndpoint;
    type IntoIter = std::vec::IntoIter<ServiceEndpoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.services.into_iter()
    }
}

/// Flat summary of a resolved identifier (Section 7.3.1 of the OpenID 2.0
/// spec): OP endpoint URL and protocol version, plus claimed and OP-local
/// identifiers when the user did not enter an OP Identifier.
///
/// This is the unit stored by discovery caches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryInfo {
    pub supplied_identifier: Identifier,
    pub claimed_identifier: Identifier,
    pub op_local_identifier: Option<Identifier>,
    pub op_endpoint_url: Option<String>,
    pub protocol_version: ProtocolVersion,
}

impl DiscoveryInfo {
    /// Summarize one service endpoint for the given supplied identifier.
    pub fn from_service(supplied: &Identifier, service: &ServiceEndpoint) -> Self {
        Self {
            supplied_identifier: supplied.clone(),
            claimed_identifier: Identifier::claimed(service.claimed_identifier()),
            op_local_identifier: service.op_local_identifier().map(Identifier::op_local),
            op_endpoint_url: service.op_endpoint_url().map(str::to_string),
            protocol_version: service.version(),
        }
    }
}
