use crate::command::WebCommand;
use limn_core::{
    CommandMessage, ControlEvent, DepictError, EventSource, InboundEvent, ObjectId, Params,
    PingEvent, PollEvent, Result,
};
use serde::{Deserialize, Serialize};

/// JSON shapes accepted from the client. The transport layer frames and
/// delivers the body; this module only maps it to typed events.
#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireEvent {
    Control {
        source: WireSource,
        kind: String,
        #[serde(default)]
        params: Params,
    },
    Poll {
        source: WireSource,
    },
    Ping {
        source: WireSource,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireSource {
    Object(u32),
    Named(String),
}

impl WireSource {
    fn resolve(self) -> Result<EventSource> {
        match self {
            WireSource::Object(id) => Ok(EventSource::Object(ObjectId(id))),
            WireSource::Named(name) if name == "platform" => Ok(EventSource::Platform),
            WireSource::Named(name) => Err(DepictError::malformed(format!(
                "unknown event source '{name}'"
            ))),
        }
    }
}

/// Decode a client-submitted JSON body into a typed inbound event.
pub fn decode_event(body: &str) -> Result<InboundEvent> {
    let wire: WireEvent = serde_json::from_str(body)
        .map_err(|e| DepictError::malformed(format!("invalid event body: {e}")))?;
    match wire {
        WireEvent::Control {
            source,
            kind,
            params,
        } => Ok(InboundEvent::Control(ControlEvent {
            source: source.resolve()?,
            kind,
            params,
        })),
        WireEvent::Poll { source } => Ok(InboundEvent::Poll(PollEvent {
            source: source.resolve()?,
        })),
        WireEvent::Ping { source } => Ok(InboundEvent::Ping(PingEvent {
            source: source.resolve()?,
        })),
    }
}

/// Reply envelope sent back for every request.
///
/// `markup` carries the flushed render-cycle output when anything was
/// depicted; `commands` are the drained outbound messages; `error` reports a
/// non-fatal rejection in-band (the session continues).
#[derive(Debug, Default, Serialize)]
pub struct WireReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub markup: Option<String>,
    pub commands: Vec<CommandMessage<WebCommand>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn encode_reply(reply: &WireReply) -> String {
    serde_json::to_string(reply)
        .unwrap_or_else(|_| r#"{"commands":[],"error":"reply encoding failed"}"#.to_string())
}

pub fn encode_error(error: &DepictError) -> String {
    encode_reply(&WireReply {
        markup: None,
        commands: Vec::new(),
        error: Some(error.to_string()),
    })
}
