use crate::kind::KindId;
use crate::object::ObjectId;
use thiserror::Error;

/// Errors raised by the depiction core.
///
/// None of these terminate a session: registry misses skip a single object,
/// malformed events are dropped, and depictor failures leave the object
/// stale so it is retried on the next cycle.
#[derive(Error, Debug)]
pub enum DepictError {
    #[error("no depictor registered for kind '{kind}' or any of its ancestors")]
    NoStrategyFound { kind: String },

    #[error("a render cycle is already active")]
    CycleAlreadyActive,

    #[error("no render cycle is active")]
    NoActiveCycle,

    #[error("malformed event: {reason}")]
    MalformedEvent { reason: String },

    #[error("unknown object {0}")]
    UnknownObject(ObjectId),

    #[error("depictor for kind '{kind}' failed")]
    DispatchFailure {
        kind: String,
        #[source]
        source: Box<DepictError>,
    },

    #[error("kind '{0}' is already registered")]
    DuplicateKind(String),

    #[error("unknown kind {0}")]
    UnknownKind(KindId),

    #[error("a depictor is already registered for kind '{0}'")]
    AlreadyRegistered(String),

    /// Failure inside a concrete depictor implementation.
    #[error("{0}")]
    Internal(String),
}

impl DepictError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        DepictError::MalformedEvent {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepictError>;
