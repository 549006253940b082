//! XRDS document parsing for OpenID discovery
//!
//! XRDS (Extensible Resource Descriptor Sequence) is the XML format a Yadis
//! endpoint serves to advertise its services. This crate turns an XRDS
//! document into a priority-ordered [`DiscoveryResult`](openid_core::DiscoveryResult):
//! one [`ServiceEndpoint`](openid_core::ServiceEndpoint) per `<Service>`
//! element, with `<Type>` and `<URI>` children collected in document order
//! and everything else preserved as unrecognized extension fields (that is
//! where legacy `openid:Delegate` / `LocalID` elements live).
//!
//! # Example
//!
//! ```
//! use openid_xrds::parse_xrds;
//!
//! let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
//! <xrds:XRDS xmlns:xrds="xri://$xrds" xmlns="xri://$xrd*($v*2.0)">
//!   <XRD>
//!     <Service priority="0">
//!       <Type>http://specs.openid.net/auth/2.0/signon</Type>
//!       <URI>https://op.example.org/auth</URI>
//!     </Service>
//!   </XRD>
//! </xrds:XRDS>"#;
//!
//! let result = parse_xrds("https://example.org/id", xml).unwrap();
//! assert_eq!(result.len(), 1);
//! ```

pub mod parser;

pub use parser::{parse_xrds, XrdsError};
