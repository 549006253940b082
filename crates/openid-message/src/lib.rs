//! Wire-format codecs for OpenID protocol messages
//!
//! OpenID 2.0 defines two message encodings (Section 4): the key-value form
//! used in direct responses (`key:value` lines) and the x-www-urlencoded
//! form used in indirect requests (`openid.`-prefixed query parameters).
//! Both are simple reversible codecs over an ordered key-value message.
//!
//! The format is chosen explicitly via [`MessageFormat`]; there is no
//! process-wide encoder registry.
//!
//! # Example
//!
//! ```
//! use openid_message::{Message, MessageFormat};
//!
//! let mut msg = Message::new();
//! msg.set("mode", "checkid_setup");
//! msg.set("identity", "https://id.example.org/alice");
//!
//! let wire = MessageFormat::KeyValue.encode(&msg);
//! assert_eq!(wire, "mode:checkid_setup\nidentity:https://id.example.org/alice\n");
//!
//! let back = MessageFormat::KeyValue.decode(&wire);
//! assert_eq!(back.get("mode"), Some("checkid_setup"));
//! ```

mod format;
mod message;

pub use format::MessageFormat;
pub use message::Message;
