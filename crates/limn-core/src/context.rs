use std::fmt;

/// Identifier for one render cycle of a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleId(pub u64);

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle#{}", self.0)
    }
}

/// Position marker returned by [`DepictSink::checkpoint`].
#[derive(Debug, Clone, Copy)]
pub struct SinkMark(usize);

/// Write-only, append-order output buffer for one render cycle.
///
/// Depictors only ever append. The platform takes a checkpoint before each
/// object and rolls back on failure, so partial output from a failed
/// depictor is never surfaced to the client. The whole buffer is flushed
/// atomically at cycle end.
#[derive(Debug, Default)]
pub struct DepictSink {
    buf: String,
}

impl DepictSink {
    pub fn new() -> Self {
        Self { buf: String::new() }
    }

    pub fn write(&mut self, fragment: &str) {
        self.buf.push_str(fragment);
    }

    pub fn checkpoint(&self) -> SinkMark {
        SinkMark(self.buf.len())
    }

    /// Discard everything appended since `mark`.
    pub fn rollback(&mut self, mark: SinkMark) {
        self.buf.truncate(mark.0);
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    fn flush(self) -> String {
        self.buf
    }
}

/// Per-render-cycle context: negotiated capabilities plus the output sink.
///
/// Exclusively owned by the platform for the duration of one cycle and never
/// shared across cycles.
#[derive(Debug)]
pub struct DepictContext {
    cycle: CycleId,
    quirks_mode: bool,
    sink: DepictSink,
}

impl DepictContext {
    pub fn new(cycle: CycleId, quirks_mode: bool) -> Self {
        Self {
            cycle,
            quirks_mode,
            sink: DepictSink::new(),
        }
    }

    pub fn cycle(&self) -> CycleId {
        self.cycle
    }

    /// Reduced-compatibility rendering mode, negotiated at session start.
    /// Immutable for the cycle's lifetime.
    pub fn quirks_mode(&self) -> bool {
        self.quirks_mode
    }

    pub fn sink(&self) -> &DepictSink {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut DepictSink {
        &mut self.sink
    }

    /// Consume the context, flushing the accumulated output.
    pub fn into_output(self) -> String {
        self.sink.flush()
    }
}
