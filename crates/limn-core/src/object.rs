use crate::kind::KindId;
use std::any::Any;
use std::fmt;

/// Identifier for an object held in an [`ObjectArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// A server-held UI object that can be depicted and receive platform events.
///
/// Declared as a capability set: concrete widgets implement this plus the
/// downcast hooks so their depictor can reach the concrete type.
pub trait DepictedObject: Any + Send {
    fn kind(&self) -> KindId;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Slot {
    object: Box<dyn DepictedObject>,
    needs_depiction: bool,
}

/// Slab of depicted objects with per-slot staleness tracking.
///
/// Objects are owned by their parent container in the UI tree; the arena is
/// the platform's lookup view of them. A freshly inserted object starts
/// stale, mutation re-marks it, and a successful depiction clears the flag.
/// A failed depiction leaves the flag set so the object is retried on the
/// next cycle.
pub struct ObjectArena {
    slots: Vec<Option<Slot>>,
    free_list: Vec<u32>,
}

impl ObjectArena {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    pub fn insert(&mut self, object: Box<dyn DepictedObject>) -> ObjectId {
        let slot = Slot {
            object,
            needs_depiction: true,
        };
        let index = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(slot);
            idx as usize
        } else {
            self.slots.push(Some(slot));
            self.slots.len() - 1
        };
        ObjectId(index as u32)
    }

    pub fn get(&self, id: ObjectId) -> Option<&dyn DepictedObject> {
        self.slots
            .get(id.0 as usize)?
            .as_ref()
            .map(|s| s.object.as_ref())
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut dyn DepictedObject> {
        self.slots
            .get_mut(id.0 as usize)?
            .as_mut()
            .map(|s| s.object.as_mut())
    }

    pub fn kind_of(&self, id: ObjectId) -> Option<KindId> {
        self.get(id).map(|o| o.kind())
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Box<dyn DepictedObject>> {
        let idx = id.0 as usize;
        let slot = self.slots.get_mut(idx)?.take()?;
        self.free_list.push(id.0);
        Some(slot.object)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.slots
            .get(id.0 as usize)
            .map_or(false, |s| s.is_some())
    }

    /// Mark an object as needing depiction on the next cycle.
    pub fn mark_stale(&mut self, id: ObjectId) {
        if let Some(Some(slot)) = self.slots.get_mut(id.0 as usize) {
            slot.needs_depiction = true;
        }
    }

    pub fn clear_stale(&mut self, id: ObjectId) {
        if let Some(Some(slot)) = self.slots.get_mut(id.0 as usize) {
            slot.needs_depiction = false;
        }
    }

    pub fn needs_depiction(&self, id: ObjectId) -> bool {
        self.slots
            .get(id.0 as usize)
            .and_then(|s| s.as_ref())
            .map_or(false, |s| s.needs_depiction)
    }

    /// Ids of all stale objects in ascending order (deterministic cycle order).
    pub fn stale_ids(&self) -> Vec<ObjectId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match s {
                Some(slot) if slot.needs_depiction => Some(ObjectId(i as u32)),
                _ => None,
            })
            .collect()
    }

    pub fn has_stale(&self) -> bool {
        self.slots
            .iter()
            .any(|s| s.as_ref().map_or(false, |slot| slot.needs_depiction))
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObjectArena {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Label {
        text: String,
    }

    impl DepictedObject for Label {
        fn kind(&self) -> KindId {
            KindId(0)
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn test_insert_starts_stale() {
        let mut arena = ObjectArena::new();
        let id = arena.insert(Box::new(Label {
            text: "hi".to_string(),
        }));

        assert!(arena.contains(id));
        assert!(arena.needs_depiction(id));
        assert_eq!(arena.stale_ids(), vec![id]);
    }

    #[test]
    fn test_clear_and_remark_stale() {
        let mut arena = ObjectArena::new();
        let id = arena.insert(Box::new(Label {
            text: "hi".to_string(),
        }));

        arena.clear_stale(id);
        assert!(!arena.needs_depiction(id));
        assert!(!arena.has_stale());

        arena.mark_stale(id);
        assert!(arena.needs_depiction(id));
    }

    #[test]
    fn test_downcast_mutation() {
        let mut arena = ObjectArena::new();
        let id = arena.insert(Box::new(Label {
            text: "old".to_string(),
        }));

        let object = arena.get_mut(id).unwrap();
        let label = object.as_any_mut().downcast_mut::<Label>().unwrap();
        label.text = "new".to_string();

        let label = arena.get(id).unwrap().as_any().downcast_ref::<Label>();
        assert_eq!(label.unwrap().text, "new");
    }

    #[test]
    fn test_remove_and_slot_reuse() {
        let mut arena = ObjectArena::new();
        let a = arena.insert(Box::new(Label {
            text: "a".to_string(),
        }));
        let b = arena.insert(Box::new(Label {
            text: "b".to_string(),
        }));

        assert!(arena.remove(a).is_some());
        assert!(!arena.contains(a));
        assert_eq!(arena.len(), 1);

        // Freed slot is reused
        let c = arena.insert(Box::new(Label {
            text: "c".to_string(),
        }));
        assert_eq!(c, a);
        assert!(arena.contains(b));
    }

    #[test]
    fn test_stale_ids_ascending() {
        let mut arena = ObjectArena::new();
        let ids: Vec<_> = (0..4)
            .map(|i| {
                arena.insert(Box::new(Label {
                    text: i.to_string(),
                }))
            })
            .collect();
        arena.clear_stale(ids[1]);

        assert_eq!(arena.stale_ids(), vec![ids[0], ids[2], ids[3]]);
    }
}
