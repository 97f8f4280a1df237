use std::fmt;


/// Opaque identifier shared by every span belonging to the same trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct TraceId(u64);

impl TraceId {
    /// The invalid (all zeroes) trace ID.
    pub const INVALID: TraceId = TraceId(0);

    /// Wrap a raw trace ID.
    pub fn from_u64(id: u64) -> TraceId {
        TraceId(id)
    }

    /// Access the raw trace ID.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}


/// Opaque identifier of a single span within a trace.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SpanId(u64);

impl SpanId {
    /// The invalid (all zeroes) span ID.
    pub const INVALID: SpanId = SpanId(0);

    /// Wrap a raw span ID.
    pub fn from_u64(id: u64) -> SpanId {
        SpanId(id)
    }

    /// Access the raw span ID.
    pub fn to_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}


/// Sampling decision attached to a span at creation.
///
/// The decision is computed upstream (by whatever sampler the application
/// uses) and carried, immutable, for the lifetime of the span.
/// `Drop`ped spans never reach the export sink; they may still contribute
/// to metrics.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SamplingDecision {
    /// The span is recorded and exported on finish.
    Sample,
    /// The span is discarded at finish; annotations are not observable.
    Drop,
}


/// Immutable identity of a span: trace ID, span ID and sampling decision.
///
/// A `SpanContext` is created once, by the factory that starts the span,
/// and is never mutated afterwards. Spans hand out references to it for
/// correlation purposes.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct SpanContext {
    trace_id: TraceId,
    span_id: SpanId,
    sampling: SamplingDecision,
}

impl SpanContext {
    /// The identity carried by empty spans: invalid IDs, never sampled.
    pub const NONE: SpanContext = SpanContext {
        trace_id: TraceId::INVALID,
        span_id: SpanId::INVALID,
        sampling: SamplingDecision::Drop,
    };

    /// Creates a new `SpanContext`.
    pub fn new(trace_id: TraceId, span_id: SpanId, sampling: SamplingDecision) -> SpanContext {
        SpanContext {
            trace_id,
            span_id,
            sampling,
        }
    }

    /// Access the trace ID.
    pub fn trace_id(&self) -> TraceId {
        self.trace_id
    }

    /// Access the span ID.
    pub fn span_id(&self) -> SpanId {
        self.span_id
    }

    /// Access the sampling decision made for this span.
    pub fn sampling(&self) -> SamplingDecision {
        self.sampling
    }

    /// Returns `true` if the sampling decision is [`SamplingDecision::Sample`].
    pub fn is_sampled(&self) -> bool {
        self.sampling == SamplingDecision::Sample
    }

    /// Returns `true` if both trace and span IDs are non-zero.
    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }
}
