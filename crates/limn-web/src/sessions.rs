use crate::platform::WebPlatform;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Identifier for one connected client session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Concurrent registry of live sessions.
///
/// Each platform sits behind its own mutex, so distinct sessions are served
/// in parallel while events and render cycles within one session stay
/// serialized. Sessions share no mutable state with each other; the kind
/// table and depictor registry they reference are read-only `Arc`s.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<WebPlatform>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Register a freshly connected platform and hand out its session id.
    pub fn open(&self, platform: WebPlatform) -> SessionId {
        let id = SessionId(Uuid::new_v4());
        self.sessions
            .write()
            .insert(id, Arc::new(Mutex::new(platform)));
        debug!(session = %id, "session opened");
        id
    }

    pub fn get(&self, id: SessionId) -> Option<Arc<Mutex<WebPlatform>>> {
        self.sessions.read().get(&id).cloned()
    }

    /// Drop a session on disconnect. Returns false if it was already gone.
    pub fn close(&self, id: SessionId) -> bool {
        let removed = self.sessions.write().remove(&id).is_some();
        if removed {
            debug!(session = %id, "session closed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use limn_core::{DepictorRegistry, KindTable, Platform};

    fn platform() -> WebPlatform {
        let kinds = Arc::new(KindTable::new());
        let depictors = Arc::new(DepictorRegistry::new(Arc::clone(&kinds)));
        Platform::new(kinds, depictors, false)
    }

    #[test]
    fn test_open_get_close() {
        let registry = SessionRegistry::new();
        assert!(registry.is_empty());

        let id = registry.open(platform());
        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_some());

        assert!(registry.close(id));
        assert!(!registry.close(id));
        assert!(registry.get(id).is_none());
    }

    #[test]
    fn test_session_ids_unique() {
        let registry = SessionRegistry::new();
        let a = registry.open(platform());
        let b = registry.open(platform());
        assert_ne!(a, b);
        assert_eq!(registry.len(), 2);
    }
}
