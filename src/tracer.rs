use std::sync::Arc;

use crossbeam_channel::unbounded;
use rand::random;

use crate::clock::Clock;
use crate::clock::SystemClock;
use crate::metrics::MetricsSink;
use crate::metrics::NullMetricsSink;
use crate::span::LocalSpan;
use crate::span::Span;
use crate::span::SpanOptions;
use crate::span::SpanReceiver;
use crate::span::SpanRuntime;
use crate::span_context::SamplingDecision;
use crate::span_context::SpanContext;
use crate::span_context::SpanId;
use crate::span_context::TraceId;


/// Starts spans and collects their finished snapshots.
///
/// The tracer is the factory for `Span`s: it assigns identifiers,
/// resolves sampling, and injects the clock and sinks every span needs
/// to finish itself. Finished spans are delivered on the `SpanReceiver`
/// returned by `Tracer::new`, usually drained by a reporting thread.
///
/// # Examples
///
/// ```
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
///
/// let (tracer, receiver) = Tracer::new(TracerOptions::default());
/// tracer.span("example", SpanOptions::default()).finish();
/// let finished = receiver.recv().unwrap();
/// assert_eq!(finished.name(), "example");
/// ```
#[derive(Debug)]
pub struct Tracer {
    runtime: SpanRuntime,
}

impl Tracer {
    /// Creates a tracer and the receiving end of its finished span channel.
    pub fn new(options: TracerOptions) -> (Tracer, SpanReceiver) {
        let (sender, receiver) = unbounded();
        let runtime = SpanRuntime {
            clock: options.clock,
            metrics: options.metrics,
            metrics_sink: options.metrics_sink,
            scope_metrics_to_parent: options.scope_metrics_to_parent,
            sender,
        };
        (Tracer { runtime }, receiver)
    }
}

impl Tracer {
    /// Starts a new span for the named operation.
    ///
    /// Root spans receive a fresh trace id and are sampled by default.
    /// Spans started with `SpanOptions::child_of` continue the parent's
    /// trace and inherit its sampling decision unless the options
    /// override it.
    pub fn span(&self, name: &str, options: SpanOptions) -> Span {
        let parent = options.parent.as_ref().map(|parent| parent.context.clone());
        let trace_id = parent
            .as_ref()
            .map(SpanContext::trace_id)
            .unwrap_or_else(|| TraceId::from_u64(random::<u64>()));
        let sampling = options
            .sampling
            .or_else(|| parent.as_ref().map(SpanContext::sampling))
            .unwrap_or(SamplingDecision::Sample);
        let context = SpanContext::new(trace_id, SpanId::from_u64(random::<u64>()), sampling);
        Span::Local(LocalSpan::new(name, context, options, self.runtime.clone()))
    }
}


/// Configuration used to build a `Tracer`.
///
/// # Examples
///
/// ```
/// use tracelet::InMemoryMetricsSink;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
///
/// let sink = InMemoryMetricsSink::new();
/// let options = TracerOptions::default()
///     .metrics_sink(sink.clone())
///     .scope_metrics_to_parent(true);
/// let (tracer, _receiver) = Tracer::new(options);
/// ```
#[derive(Debug)]
pub struct TracerOptions {
    clock: Arc<dyn Clock>,
    metrics: bool,
    metrics_sink: Arc<dyn MetricsSink>,
    scope_metrics_to_parent: bool,
}

impl TracerOptions {
    /// Sets the clock spans read their timestamps from.
    pub fn clock<C: Clock + 'static>(mut self, clock: C) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets whether spans collect the processing-time metric by default.
    ///
    /// Individual spans can override this with `SpanOptions::metrics` or
    /// by toggling `Span::enable_metrics` and `Span::disable_metrics`.
    pub fn metrics(mut self, metrics: bool) -> Self {
        self.metrics = metrics;
        self
    }

    /// Sets the sink span processing times are recorded into.
    pub fn metrics_sink<S: MetricsSink + 'static>(mut self, sink: S) -> Self {
        self.metrics_sink = Arc::new(sink);
        self
    }

    /// Sets whether metrics are additionally keyed by the parent span's
    /// operation name, under the `parentOperation` tag.
    pub fn scope_metrics_to_parent(mut self, scope: bool) -> Self {
        self.scope_metrics_to_parent = scope;
        self
    }
}

impl Default for TracerOptions {
    /// Returns a default set of `TracerOptions`.
    ///
    /// By default the tracer will:
    ///
    ///   * Read the system clock.
    ///   * Collect span metrics into a sink that drops them.
    ///   * Not key metrics by the parent operation.
    fn default() -> TracerOptions {
        TracerOptions {
            clock: Arc::new(SystemClock::new()),
            metrics: true,
            metrics_sink: Arc::new(NullMetricsSink::new()),
            scope_metrics_to_parent: false,
        }
    }
}
