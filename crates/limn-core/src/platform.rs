use crate::context::{CycleId, DepictContext};
use crate::depictor::DepictorRegistry;
use crate::error::{DepictError, Result};
use crate::event::{
    CommandKind, CommandMessage, ControlEvent, DispatchOutcome, EventSource, InboundEvent,
};
use crate::kind::{KindId, KindTable};
use crate::object::{DepictedObject, ObjectArena, ObjectId};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Default bound on the outbound command queue.
pub const DEFAULT_OUTBOUND_LIMIT: usize = 256;

/// Flushed result of one render cycle.
#[derive(Debug)]
pub struct CycleOutput {
    pub markup: String,
    /// Objects whose depiction failed; they stay stale and are retried on
    /// the next cycle.
    pub failures: Vec<(ObjectId, DepictError)>,
}

/// Server-side representative of one connected client session.
///
/// Owns the object arena, the outbound command queue and the at-most-one
/// live [`DepictContext`]; shares the kind table and depictor registry
/// read-only with every other session. All operations take `&mut self`, so
/// inbound events and render cycles of a session are serialized by
/// construction while distinct sessions proceed concurrently.
pub struct Platform<C: CommandKind> {
    kinds: Arc<KindTable>,
    depictors: Arc<DepictorRegistry<C>>,
    objects: ObjectArena,
    context: Option<DepictContext>,
    outbound: VecDeque<CommandMessage<C>>,
    outbound_limit: usize,
    quirks_mode: bool,
    next_cycle: u64,
}

impl<C: CommandKind> Platform<C> {
    pub fn new(
        kinds: Arc<KindTable>,
        depictors: Arc<DepictorRegistry<C>>,
        quirks_mode: bool,
    ) -> Self {
        Self {
            kinds,
            depictors,
            objects: ObjectArena::new(),
            context: None,
            outbound: VecDeque::new(),
            outbound_limit: DEFAULT_OUTBOUND_LIMIT,
            quirks_mode,
            next_cycle: 0,
        }
    }

    pub fn with_outbound_limit(mut self, limit: usize) -> Self {
        self.outbound_limit = limit.max(1);
        self
    }

    pub fn quirks_mode(&self) -> bool {
        self.quirks_mode
    }

    pub fn objects(&self) -> &ObjectArena {
        &self.objects
    }

    pub fn objects_mut(&mut self) -> &mut ObjectArena {
        &mut self.objects
    }

    /// Add an object to this session. Fails with `UnknownKind` if the
    /// object's declared kind was never registered in the kind table.
    pub fn insert_object(&mut self, object: Box<dyn DepictedObject>) -> Result<ObjectId> {
        let kind = object.kind();
        if !self.kinds.contains(kind) {
            return Err(DepictError::UnknownKind(kind));
        }
        let id = self.objects.insert(object);
        debug!(object = %id, kind = %kind, "object inserted");
        Ok(id)
    }

    pub fn remove_object(&mut self, id: ObjectId) -> Option<Box<dyn DepictedObject>> {
        self.objects.remove(id)
    }

    /// Open a render cycle. Fails with `CycleAlreadyActive` if one is open.
    pub fn begin_cycle(&mut self) -> Result<CycleId> {
        if self.context.is_some() {
            return Err(DepictError::CycleAlreadyActive);
        }
        let cycle = CycleId(self.next_cycle);
        self.next_cycle += 1;
        self.context = Some(DepictContext::new(cycle, self.quirks_mode));
        debug!(%cycle, "render cycle opened");
        Ok(cycle)
    }

    /// Current cycle's context. Fails with `NoActiveCycle` outside a cycle.
    pub fn depict_context(&mut self) -> Result<&mut DepictContext> {
        self.context.as_mut().ok_or(DepictError::NoActiveCycle)
    }

    pub fn cycle_active(&self) -> bool {
        self.context.is_some()
    }

    /// Close the cycle and flush its sink atomically.
    pub fn end_cycle(&mut self) -> Result<String> {
        let ctx = self.context.take().ok_or(DepictError::NoActiveCycle)?;
        debug!(cycle = %ctx.cycle(), bytes = ctx.sink().len(), "render cycle flushed");
        Ok(ctx.into_output())
    }

    /// Force-release the context without surfacing any output. Used on the
    /// error path so render state never leaks into the next request.
    pub fn abort_cycle(&mut self) {
        if let Some(ctx) = self.context.take() {
            warn!(cycle = %ctx.cycle(), "render cycle aborted, output discarded");
        }
    }

    /// Depict a single object into the active cycle.
    ///
    /// On success the object's needs-depiction flag is cleared; on failure
    /// it stays set and any partial sink output is rolled back, so one
    /// failing object never blocks or corrupts its siblings.
    pub fn depict(&mut self, id: ObjectId) -> Result<()> {
        let mut ctx = self.context.take().ok_or(DepictError::NoActiveCycle)?;
        let result = self.depict_into(id, &mut ctx);
        self.context = Some(ctx);
        result
    }

    fn depict_into(&mut self, id: ObjectId, ctx: &mut DepictContext) -> Result<()> {
        let kind = self
            .objects
            .kind_of(id)
            .ok_or(DepictError::UnknownObject(id))?;
        let depictor = self.depictors.resolve(kind)?;

        let mark = ctx.sink_mut().checkpoint();
        let object = self.objects.get(id).ok_or(DepictError::UnknownObject(id))?;
        match depictor.render(object, ctx) {
            Ok(()) => {
                self.objects.clear_stale(id);
                trace!(object = %id, "object depicted");
                Ok(())
            }
            Err(e) => {
                ctx.sink_mut().rollback(mark);
                Err(DepictError::DispatchFailure {
                    kind: self.kind_name(kind),
                    source: Box::new(e),
                })
            }
        }
    }

    /// Run one full render cycle: depict every stale object in ascending id
    /// order with per-object failure isolation, then flush.
    pub fn run_cycle(&mut self) -> Result<CycleOutput> {
        self.begin_cycle()?;
        let mut failures = Vec::new();
        for id in self.objects.stale_ids() {
            if let Err(e) = self.depict(id) {
                warn!(object = %id, error = %e, "depiction failed, object stays stale");
                failures.push((id, e));
            }
        }
        let markup = self.end_cycle()?;
        Ok(CycleOutput { markup, failures })
    }

    /// Route an inbound event: Received -> Validated -> Dispatched ->
    /// Applied | Rejected.
    ///
    /// Rejection is non-fatal; the platform logs and keeps processing
    /// subsequent events. Poll and ping are answered without touching any
    /// object state.
    pub fn dispatch(&mut self, event: InboundEvent) -> DispatchOutcome {
        match event {
            InboundEvent::Control(control) => self.dispatch_control(control),
            InboundEvent::Poll(poll) => {
                trace!(source = %poll.source, queued = self.outbound.len(), "poll");
                DispatchOutcome::Acknowledged
            }
            InboundEvent::Ping(ping) => {
                trace!(source = %ping.source, "ping");
                DispatchOutcome::Acknowledged
            }
        }
    }

    fn dispatch_control(&mut self, event: ControlEvent) -> DispatchOutcome {
        // Validate: the source must resolve to a live object.
        let id = match event.source {
            EventSource::Object(id) => id,
            EventSource::Platform => {
                return self.reject(DepictError::malformed(
                    "control event must originate from a depicted object",
                ));
            }
        };
        let Some(kind) = self.objects.kind_of(id) else {
            return self.reject(DepictError::malformed(format!(
                "control event source {id} is not a live object"
            )));
        };
        let depictor = match self.depictors.resolve(kind) {
            Ok(d) => d,
            Err(e) => return self.reject(e),
        };
        let Some(object) = self.objects.get_mut(id) else {
            return self.reject(DepictError::UnknownObject(id));
        };

        match depictor.interpret_event(object, &event) {
            Ok(()) => {
                self.objects.mark_stale(id);
                debug!(object = %id, kind = %event.kind, "event applied");
                DispatchOutcome::Applied { object: id }
            }
            Err(e @ DepictError::MalformedEvent { .. }) => self.reject(e),
            Err(e) => self.reject(DepictError::DispatchFailure {
                kind: self.kind_name(kind),
                source: Box::new(e),
            }),
        }
    }

    fn reject(&self, reason: DepictError) -> DispatchOutcome {
        warn!(error = %reason, "inbound event rejected");
        DispatchOutcome::Rejected { reason }
    }

    /// Queue a server-originated command. The queue is bounded; the oldest
    /// message is dropped when the bound is hit.
    pub fn queue_command(&mut self, message: CommandMessage<C>) {
        if self.outbound.len() >= self.outbound_limit {
            self.outbound.pop_front();
            warn!(limit = self.outbound_limit, "outbound queue full, oldest command dropped");
        }
        self.outbound.push_back(message);
    }

    /// Drain all queued outbound commands in FIFO order.
    pub fn take_outbound(&mut self) -> Vec<CommandMessage<C>> {
        self.outbound.drain(..).collect()
    }

    pub fn outbound_len(&self) -> usize {
        self.outbound.len()
    }

    pub fn has_stale(&self) -> bool {
        self.objects.has_stale()
    }

    fn kind_name(&self, kind: KindId) -> String {
        self.kinds
            .name(kind)
            .map_or_else(|| kind.to_string(), str::to_string)
    }
}
