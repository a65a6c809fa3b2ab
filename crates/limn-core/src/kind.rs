use crate::error::{DepictError, Result};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Identifier for a registered object kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KindId(pub u32);

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "kind#{}", self.0)
    }
}

struct KindEntry {
    name: String,
    parent: Option<KindId>,
}

/// Interned table of object kinds with single-parent ancestry.
///
/// Depicted objects carry a `KindId` instead of relying on runtime type
/// inspection; depictor resolution walks the parent chain recorded here.
/// The table is built during startup and shared read-only afterwards.
pub struct KindTable {
    kinds: Vec<KindEntry>,
    by_name: HashMap<String, KindId>,
}

impl KindTable {
    pub fn new() -> Self {
        Self {
            kinds: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Register a kind under a unique name, optionally below a parent kind.
    pub fn register(&mut self, name: &str, parent: Option<KindId>) -> Result<KindId> {
        if self.by_name.contains_key(name) {
            return Err(DepictError::DuplicateKind(name.to_string()));
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(DepictError::UnknownKind(p));
            }
        }
        let id = KindId(self.kinds.len() as u32);
        self.kinds.push(KindEntry {
            name: name.to_string(),
            parent,
        });
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn lookup(&self, name: &str) -> Option<KindId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: KindId) -> Option<&str> {
        self.kinds.get(id.0 as usize).map(|k| k.name.as_str())
    }

    pub fn parent(&self, id: KindId) -> Option<KindId> {
        self.kinds.get(id.0 as usize).and_then(|k| k.parent)
    }

    pub fn contains(&self, id: KindId) -> bool {
        (id.0 as usize) < self.kinds.len()
    }

    /// Ancestry chain starting at `id` itself, most-derived first.
    pub fn ancestry(&self, id: KindId) -> SmallVec<[KindId; 4]> {
        let mut chain = SmallVec::new();
        let mut current = Some(id);
        while let Some(k) = current {
            if !self.contains(k) {
                break;
            }
            chain.push(k);
            current = self.parent(k);
        }
        chain
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl Default for KindTable {
    fn default() -> Self {
        Self::new()
    }
}
