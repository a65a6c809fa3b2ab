use crate::context::DepictContext;
use crate::error::{DepictError, Result};
use crate::event::{CommandKind, ControlEvent};
use crate::kind::{KindId, KindTable};
use crate::object::DepictedObject;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Rendering/interpretation strategy for one object kind.
///
/// Stateless per call: a depictor holds no per-object state and may be
/// shared across sessions. `render` writes the object's platform-specific
/// representation into the context's sink; `interpret_event` applies an
/// inbound control event to the object's state. Implementations check
/// required parameters with [`crate::event::Params::require`] before
/// mutating anything.
pub trait Depictor<C: CommandKind>: Send + Sync {
    fn render(&self, object: &dyn DepictedObject, ctx: &mut DepictContext) -> Result<()>;

    fn interpret_event(&self, object: &mut dyn DepictedObject, event: &ControlEvent)
        -> Result<()>;
}

impl<C: CommandKind> std::fmt::Debug for dyn Depictor<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Depictor")
    }
}

/// Kind-keyed table of depiction strategies.
///
/// Resolution walks the object's ancestry most-derived-first and returns the
/// first registered strategy; within a single kind the first registration
/// wins and later ones are rejected, so the strategy rendering an ambiguous
/// object is always deterministic. Built at startup, then shared read-only
/// across sessions.
pub struct DepictorRegistry<C: CommandKind> {
    kinds: Arc<KindTable>,
    depictors: HashMap<KindId, Arc<dyn Depictor<C>>>,
}

impl<C: CommandKind> DepictorRegistry<C> {
    pub fn new(kinds: Arc<KindTable>) -> Self {
        Self {
            kinds,
            depictors: HashMap::new(),
        }
    }

    pub fn kinds(&self) -> &Arc<KindTable> {
        &self.kinds
    }

    /// Register a depictor for `kind`. First registration wins; a second
    /// registration for the same kind fails with `AlreadyRegistered`.
    pub fn register(&mut self, kind: KindId, depictor: Arc<dyn Depictor<C>>) -> Result<()> {
        if !self.kinds.contains(kind) {
            return Err(DepictError::UnknownKind(kind));
        }
        if self.depictors.contains_key(&kind) {
            let name = self.kind_name(kind);
            return Err(DepictError::AlreadyRegistered(name));
        }
        self.depictors.insert(kind, depictor);
        Ok(())
    }

    pub fn has(&self, kind: KindId) -> bool {
        self.depictors.contains_key(&kind)
    }

    /// Resolve the most specific strategy for `kind`, falling back through
    /// its ancestor kinds. A miss over the whole chain is `NoStrategyFound`.
    pub fn resolve(&self, kind: KindId) -> Result<Arc<dyn Depictor<C>>> {
        for ancestor in self.kinds.ancestry(kind) {
            if let Some(depictor) = self.depictors.get(&ancestor) {
                trace!(kind = %kind, resolved = %ancestor, "resolved depictor");
                return Ok(Arc::clone(depictor));
            }
        }
        Err(DepictError::NoStrategyFound {
            kind: self.kind_name(kind),
        })
    }

    fn kind_name(&self, kind: KindId) -> String {
        self.kinds
            .name(kind)
            .map_or_else(|| kind.to_string(), str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum NoCommand {}
    impl CommandKind for NoCommand {}

    struct Widget {
        kind: KindId,
    }

    impl DepictedObject for Widget {
        fn kind(&self) -> KindId {
            self.kind
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct TagDepictor {
        tag: &'static str,
        renders: AtomicUsize,
    }

    impl TagDepictor {
        fn new(tag: &'static str) -> Arc<Self> {
            Arc::new(Self {
                tag,
                renders: AtomicUsize::new(0),
            })
        }
    }

    impl Depictor<NoCommand> for TagDepictor {
        fn render(&self, _object: &dyn DepictedObject, ctx: &mut DepictContext) -> Result<()> {
            self.renders.fetch_add(1, Ordering::SeqCst);
            ctx.sink_mut().write(self.tag);
            Ok(())
        }

        fn interpret_event(
            &self,
            _object: &mut dyn DepictedObject,
            _event: &ControlEvent,
        ) -> Result<()> {
            Ok(())
        }
    }

    fn kinds() -> (Arc<KindTable>, KindId, KindId, KindId) {
        let mut table = KindTable::new();
        let component = table.register("component", None).unwrap();
        let container = table.register("container", Some(component)).unwrap();
        let panel = table.register("panel", Some(container)).unwrap();
        (Arc::new(table), component, container, panel)
    }

    #[test]
    fn test_resolve_exact_kind() {
        let (table, _, _, panel) = kinds();
        let mut registry = DepictorRegistry::new(table);
        registry.register(panel, TagDepictor::new("<panel/>")).unwrap();

        assert!(registry.resolve(panel).is_ok());
    }

    #[test]
    fn test_resolve_falls_back_to_ancestor() {
        let (table, component, _, panel) = kinds();
        let mut registry = DepictorRegistry::new(table);
        registry
            .register(component, TagDepictor::new("<component/>"))
            .unwrap();

        // Nothing registered for panel or container, so the root wins
        assert!(registry.resolve(panel).is_ok());
    }

    #[test]
    fn test_resolve_prefers_most_derived() {
        let (table, component, container, panel) = kinds();
        let mut registry = DepictorRegistry::new(table);
        let for_component = TagDepictor::new("<component/>");
        let for_container = TagDepictor::new("<container/>");
        registry.register(component, for_component).unwrap();
        registry
            .register(container, Arc::clone(&for_container) as Arc<dyn Depictor<NoCommand>>)
            .unwrap();

        let resolved = registry.resolve(panel).unwrap();
        let mut ctx = DepictContext::new(crate::context::CycleId(0), false);
        let widget = Widget { kind: panel };
        resolved.render(&widget, &mut ctx).unwrap();

        assert_eq!(ctx.into_output(), "<container/>");
        assert_eq!(for_container.renders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resolve_miss_is_no_strategy_found() {
        let (table, _, _, panel) = kinds();
        let registry: DepictorRegistry<NoCommand> = DepictorRegistry::new(table);

        let err = registry.resolve(panel).unwrap_err();
        assert!(matches!(err, DepictError::NoStrategyFound { ref kind } if kind == "panel"));
    }

    #[test]
    fn test_first_registration_wins() {
        let (table, component, _, _) = kinds();
        let mut registry = DepictorRegistry::new(table);
        registry
            .register(component, TagDepictor::new("<first/>"))
            .unwrap();

        let err = registry
            .register(component, TagDepictor::new("<second/>"))
            .unwrap_err();
        assert!(matches!(err, DepictError::AlreadyRegistered(_)));

        let resolved = registry.resolve(component).unwrap();
        let mut ctx = DepictContext::new(crate::context::CycleId(0), false);
        let widget = Widget { kind: component };
        resolved.render(&widget, &mut ctx).unwrap();
        assert_eq!(ctx.into_output(), "<first/>");
    }

    #[test]
    fn test_register_unknown_kind_rejected() {
        let (table, _, _, _) = kinds();
        let mut registry = DepictorRegistry::new(table);
        let err = registry
            .register(KindId(99), TagDepictor::new("<x/>"))
            .unwrap_err();
        assert!(matches!(err, DepictError::UnknownKind(_)));
    }
}
