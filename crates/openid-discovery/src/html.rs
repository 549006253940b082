//! HTML scanning for discovery hints
//!
//! Two things are pulled out of an HTML document: an X-XRDS-Location meta
//! tag pointing at an XRDS document, and OpenID `<link>` tags declaring
//! endpoints directly. Scanning runs in two stages: one pass finds candidate
//! tags, a second pass splits each tag into attributes. Attribute order
//! inside a tag and quoting style never matter; when the same relation
//! appears in several tags the last one wins.

use regex::Regex;
use tracing::debug;

use openid_core::{DiscoveryResult, Identifier, ServiceEndpoint, OPENID_11, OPENID_20};

/// Relations recognized in `rel` attributes
const REL_SERVER_V1: &str = "openid.server";
const REL_DELEGATE_V1: &str = "openid.delegate";
const REL_PROVIDER_V2: &str = "openid2.provider";
const REL_LOCAL_ID_V2: &str = "openid2.local_id";

/// Raw link-tag hints collected from a document
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LinkHints {
    pub server_v1: Option<String>,
    pub delegate_v1: Option<String>,
    pub provider_v2: Option<String>,
    pub local_id_v2: Option<String>,
}

impl LinkHints {
    pub fn is_empty(&self) -> bool {
        self.server_v1.is_none() && self.provider_v2.is_none()
    }
}

/// Regex-based scanner for the HTML fallback methods
pub struct HtmlParser {
    link_re: Regex,
    meta_re: Regex,
    attr_re: Regex,
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlParser {
    pub fn new() -> Self {
        // Fixed patterns, so compilation cannot fail at runtime.
        Self {
            link_re: Regex::new(r"(?is)<link\s+[^>]*>").unwrap(),
            meta_re: Regex::new(r"(?is)<meta\s+[^>]*>").unwrap(),
            attr_re: Regex::new(r#"(?is)([a-z][a-z0-9._:-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
                .unwrap(),
        }
    }

    /// Splits a single tag into (lowercased name, value) attribute pairs.
    fn attributes(&self, tag: &str) -> Vec<(String, String)> {
        self.attr_re
            .captures_iter(tag)
            .filter_map(|cap| {
                let name = cap.get(1)?.as_str().to_ascii_lowercase();
                let value = cap.get(2).or_else(|| cap.get(3))?.as_str().to_string();
                Some((name, value))
            })
            .collect()
    }

    fn attribute<'a>(attrs: &'a [(String, String)], name: &str) -> Option<&'a str> {
        attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the X-XRDS-Location named by a meta tag, if any.
    ///
    /// Yadis-conformant pages use `http-equiv`, but `name` is accepted too
    /// since deployed identity pages use either spelling.
    pub fn xrds_location(&self, body: &str) -> Option<String> {
        for tag in self.meta_re.find_iter(body) {
            let attrs = self.attributes(tag.as_str());
            let key = Self::attribute(&attrs, "http-equiv")
                .or_else(|| Self::attribute(&attrs, "name"));
            let Some(key) = key else {
                continue;
            };
            if key.eq_ignore_ascii_case("x-xrds-location") {
                if let Some(content) = Self::attribute(&attrs, "content") {
                    let content = content.trim();
                    if !content.is_empty() {
                        return Some(content.to_string());
                    }
                }
            }
        }
        None
    }

    /// Collects OpenID link-tag hints from a document.
    ///
    /// A `rel` attribute holds a whitespace-separated list of relations, so
    /// `rel=" aaa openid.server bbb "` still counts.
    pub fn link_hints(&self, body: &str) -> LinkHints {
        let mut hints = LinkHints::default();
        for tag in self.link_re.find_iter(body) {
            let attrs = self.attributes(tag.as_str());
            let Some(rel) = Self::attribute(&attrs, "rel") else {
                continue;
            };
            let Some(href) = Self::attribute(&attrs, "href") else {
                continue;
            };
            for relation in rel.split_ascii_whitespace() {
                let slot = match relation.to_ascii_lowercase().as_str() {
                    REL_SERVER_V1 => &mut hints.server_v1,
                    REL_DELEGATE_V1 => &mut hints.delegate_v1,
                    REL_PROVIDER_V2 => &mut hints.provider_v2,
                    REL_LOCAL_ID_V2 => &mut hints.local_id_v2,
                    _ => continue,
                };
                *slot = Some(href.to_string());
            }
        }
        hints
    }

    /// Builds a discovery result from link tags, or None when the document
    /// declares no OpenID endpoint. A 2.0 provider outranks a 1.1 server
    /// when both appear.
    pub fn discover(&self, supplied: &Identifier, body: &str) -> Option<DiscoveryResult> {
        let hints = self.link_hints(body);
        if hints.is_empty() {
            return None;
        }
        debug!(
            has_v2 = hints.provider_v2.is_some(),
            has_v1 = hints.server_v1.is_some(),
            "html link tags yielded endpoint hints"
        );

        let mut result = DiscoveryResult::default();
        if let Some(provider) = hints.provider_v2 {
            let extra = hints
                .local_id_v2
                .map(|id| vec![(REL_LOCAL_ID_V2.to_string(), id)])
                .unwrap_or_default();
            result.push(ServiceEndpoint::new(
                supplied.as_str(),
                vec![OPENID_20.to_string()],
                vec![provider],
                extra,
                0,
            ));
        }
        if let Some(server) = hints.server_v1 {
            let extra = hints
                .delegate_v1
                .map(|id| vec![(REL_DELEGATE_V1.to_string(), id)])
                .unwrap_or_default();
            result.push(ServiceEndpoint::new(
                supplied.as_str(),
                vec![OPENID_11.to_string()],
                vec![server],
                extra,
                1,
            ));
        }
        Some(result)
    }
}
