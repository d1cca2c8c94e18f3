//! Prefixed JSON envelope codec for cross-frame messages.
//!
//! Every message on the wire is a string made of:
//! - The protocol tag `amp-`
//! - A JSON object carrying `type`, `sentinel` and the payload keys
//!
//! Anything else on the shared transport is not ours and decodes to an error.

pub mod codec;
pub mod error;
pub mod message_type;

pub use codec::{
    deserialize_message, is_protocol_message, serialize_message, Envelope, MESSAGE_PREFIX,
};
pub use error::{CodecError, Result};
pub use message_type::MessageType;
