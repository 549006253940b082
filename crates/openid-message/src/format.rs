//! Wire encodings for protocol messages

use url::form_urlencoded;

use crate::message::Message;

/// The two OpenID message encodings: the newline-delimited key-value form
/// used in direct responses, and the `openid.`-prefixed query-string form
/// used in indirect requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    KeyValue,
    Query,
}

impl MessageFormat {
    pub fn encode(&self, message: &Message) -> String {
        match self {
            MessageFormat::KeyValue => {
                let mut out = String::new();
                for (key, value) in message.iter() {
                    out.push_str(key);
                    out.push(':');
                    out.push_str(value);
                    out.push('\n');
                }
                out
            }
            MessageFormat::Query => {
                let mut out = String::new();
                for (key, value) in message.iter() {
                    if !out.is_empty() {
                        out.push('&');
                    }
                    out.push_str("openid.");
                    out.extend(form_urlencoded::byte_serialize(key.as_bytes()));
                    out.push('=');
                    out.extend(form_urlencoded::byte_serialize(value.as_bytes()));
                }
                out
            }
        }
    }

    /// Decoding is lenient: key-value lines without a colon and query pairs
    /// without the `openid.` prefix are skipped rather than rejected.
    pub fn decode(&self, input: &str) -> Message {
        match self {
            MessageFormat::KeyValue => {
                let mut msg = Message::new();
                for line in input.lines() {
                    if line.is_empty() {
                        continue;
                    }
                    if let Some((key, value)) = line.split_once(':') {
                        msg.set(key, value);
                    }
                }
                msg
            }
            MessageFormat::Query => {
                let mut msg = Message::new();
                for (key, value) in form_urlencoded::parse(input.as_bytes()) {
                    if let Some(bare) = key.strip_prefix("openid.") {
                        msg.set(bare, value.as_ref());
                    }
                }
                msg
            }
        }
    }
}
