//! Depiction core for server-driven UIs.
//!
//! Maps abstract server-held UI objects to a concrete rendering platform
//! through per-kind depiction strategies, and routes typed events between
//! the two: inbound control/poll/ping events mutate object state, outbound
//! command messages instruct the client. The server never manipulates the
//! client imperatively; it renders into a per-cycle sink and queues
//! commands.

pub mod context;
pub mod depictor;
pub mod error;
pub mod event;
pub mod kind;
pub mod object;
pub mod platform;

pub use context::{CycleId, DepictContext, DepictSink};
pub use depictor::{Depictor, DepictorRegistry};
pub use error::{DepictError, Result};
pub use event::{
    CommandKind, CommandMessage, ControlEvent, DispatchOutcome, EventSource, InboundEvent, Params,
    PingEvent, PollEvent,
};
pub use kind::{KindId, KindTable};
pub use object::{DepictedObject, ObjectArena, ObjectId};
pub use platform::{CycleOutput, Platform, DEFAULT_OUTBOUND_LIMIT};
