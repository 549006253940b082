//! Event-driven XRDS parser built on quick-xml

use openid_core::{DiscoveryResult, ServiceEndpoint};
use quick_xml::events::attributes::AttrError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum XrdsError {
    /// Document is not well-formed XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed attribute inside a tag
    #[error("invalid XML attribute: {0}")]
    Attr(#[from] AttrError),

    /// Document ended inside an open <Service> element
    #[error("unexpected end of document inside <Service> element")]
    UnexpectedEof,
}

/// Parse an XRDS document into a priority-ordered discovery result.
///
/// `supplied` is the identifier discovery was performed on; it seeds the
/// claimed identifier of every parsed service. A well-formed document with
/// zero `<Service>` elements is an empty result, not an error.
pub fn parse_xrds(supplied: &str, xml: &[u8]) -> Result<DiscoveryResult, XrdsError> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut result = DiscoveryResult::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"Service" => {
                let priority = service_priority(&e)?;
                let service = parse_service(&mut reader, supplied, priority)?;
                result.push(service);
            }
            Event::Empty(e) if e.local_name().as_ref() == b"Service" => {
                // A childless service advertises nothing but is still present.
                let priority = service_priority(&e)?;
                result.push(ServiceEndpoint::new(
                    supplied,
                    Vec::new(),
                    Vec::new(),
                    Vec::new(),
                    priority,
                ));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    debug!(services = result.len(), "parsed XRDS document");
    Ok(result)
}

/// The priority attribute on <Service>; absent or non-numeric means 0.
fn service_priority(element: &BytesStart) -> Result<u32, XrdsError> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"priority" {
            let value = String::from_utf8_lossy(attr.value.as_ref());
            return Ok(value.trim().parse().unwrap_or(0));
        }
    }
    Ok(0)
}

/// Consume events up to the matching </Service>, collecting children.
///
/// Children are dispatched on their qualified name: `Type` and `URI` feed
/// the typed fields, anything else (including prefixed elements such as
/// `openid:Delegate`) is preserved verbatim as an extension field.
fn parse_service(
    reader: &mut Reader<&[u8]>,
    supplied: &str,
    priority: u32,
) -> Result<ServiceEndpoint, XrdsError> {
    let mut types = Vec::new();
    let mut uris = Vec::new();
    let mut extra = Vec::new();

    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut text = String::new();
    let mut depth = 0usize;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                if depth == 1 {
                    current = Some(String::from_utf8_lossy(e.name().as_ref()).into_owned());
                    text.clear();
                }
            }
            Event::Empty(e) => {
                if depth == 0 {
                    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                    record_child(&mut types, &mut uris, &mut extra, &name, String::new());
                }
            }
            Event::Text(t) => {
                if current.is_some() {
                    text.push_str(&t.unescape()?);
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    // </Service>
                    break;
                }
                depth -= 1;
                if depth == 0 {
                    if let Some(name) = current.take() {
                        record_child(
                            &mut types,
                            &mut uris,
                            &mut extra,
                            &name,
                            std::mem::take(&mut text),
                        );
                    }
                }
            }
            Event::Eof => return Err(XrdsError::UnexpectedEof),
            _ => {}
        }
        buf.clear();
    }

    Ok(ServiceEndpoint::new(supplied, types, uris, extra, priority))
}

fn record_child(
    types: &mut Vec<String>,
    uris: &mut Vec<String>,
    extra: &mut Vec<(String, String)>,
    name: &str,
    value: String,
) {
    match name {
        "Type" => types.push(value),
        "URI" => uris.push(value),
        _ => extra.push((name.to_string(), value)),
    }
}
