use crate::error::{DepictError, Result};
use crate::object::ObjectId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Originator of an inbound event.
///
/// Every event carries a source; control events must originate from a live
/// depicted object, heartbeats may originate from the platform itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Object(ObjectId),
    Platform,
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Object(id) => write!(f, "{id}"),
            EventSource::Platform => write!(f, "platform"),
        }
    }
}

/// String-keyed parameter payload carried by events and command messages.
///
/// Values are opaque to the core; it performs presence checks only and
/// passes everything else through to the depictor or client interpreter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Params(HashMap<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Fetch a required parameter, failing with `MalformedEvent` if absent.
    pub fn require(&self, key: &str) -> Result<&Value> {
        self.0
            .get(key)
            .ok_or_else(|| DepictError::malformed(format!("missing required parameter '{key}'")))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// User-originated action event.
#[derive(Debug, Clone)]
pub struct ControlEvent {
    pub source: EventSource,
    pub kind: String,
    pub params: Params,
}

/// Idle client heartbeat; confirms liveness and flushes queued commands.
#[derive(Debug, Clone)]
pub struct PollEvent {
    pub source: EventSource,
}

/// Explicit keepalive; mutates nothing and flushes nothing.
#[derive(Debug, Clone)]
pub struct PingEvent {
    pub source: EventSource,
}

/// Closed set of events flowing client -> server.
#[derive(Debug, Clone)]
pub enum InboundEvent {
    Control(ControlEvent),
    Poll(PollEvent),
    Ping(PingEvent),
}

impl InboundEvent {
    /// Get the source for this event
    pub fn source(&self) -> EventSource {
        match self {
            InboundEvent::Control(e) => e.source,
            InboundEvent::Poll(e) => e.source,
            InboundEvent::Ping(e) => e.source,
        }
    }
}

/// Marker for a platform's closed set of outbound command kinds.
pub trait CommandKind: Copy + Eq + fmt::Debug + Send + Sync + 'static {}

/// Server-originated instruction for the client to apply.
#[derive(Debug, Clone, Serialize)]
pub struct CommandMessage<C: CommandKind> {
    pub command: C,
    pub params: Params,
}

impl<C: CommandKind> CommandMessage<C> {
    pub fn new(command: C, params: Params) -> Self {
        Self { command, params }
    }
}

/// Terminal state of a dispatched inbound event.
///
/// `Applied` marks the affected object stale for the next render cycle;
/// `Acknowledged` is the heartbeat answer (no state touched); `Rejected` is
/// non-fatal and the session keeps processing subsequent events.
#[derive(Debug)]
pub enum DispatchOutcome {
    Applied { object: ObjectId },
    Acknowledged,
    Rejected { reason: DepictError },
}

impl DispatchOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, DispatchOutcome::Applied { .. })
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, DispatchOutcome::Rejected { .. })
    }
}
