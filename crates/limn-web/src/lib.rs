//! Web rendering platform for the limn depiction core.
//!
//! Binds the platform-agnostic core to a web client talking JSON over HTTP:
//! a closed [`WebCommand`] set, the wire protocol for inbound events and
//! reply envelopes, user-agent capability negotiation, and a concurrent
//! session registry. Transport-level HTTP framing, cookies and connection
//! management stay outside this crate; it consumes already-framed bodies.

pub mod command;
pub mod config;
pub mod platform;
pub mod protocol;
pub mod sessions;

pub use command::WebCommand;
pub use config::WebConfig;
pub use platform::{connect, detect_quirks, handle_request, WebPlatform};
pub use protocol::{decode_event, encode_reply, WireReply};
pub use sessions::{SessionId, SessionRegistry};
