use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;

use crossbeam_channel::Receiver;
use crossbeam_channel::Sender;
use log::debug;
use log::warn;

use crate::clock::Clock;
use crate::metrics::MetricsSink;
use crate::metrics::SPAN_PROCESSING_TIME;
use crate::metrics::Unit;
use crate::span_context::SamplingDecision;
use crate::span_context::SpanContext;

pub mod mark;
pub mod tag;

use self::mark::Mark;
use self::tag::MetricTags;
use self::tag::SpanTags;
use self::tag::TagValue;


const ERROR_TAG: &str = "error";
const ERROR_OBJECT_TAG: &str = "error.object";
const OPERATION_TAG: &str = "operation";
const PARENT_OPERATION_TAG: &str = "parentOperation";


/// A span that represents a finished operation.
///
/// The snapshot can no longer be altered since the operation is finished.
/// `Tracer`s provide the receiving end of a channel that collects
/// `FinishedSpan`s so they can be shipped to the distributed tracer.
#[derive(Clone, Debug, PartialEq)]
pub struct FinishedSpan {
    context: SpanContext,
    finish_time: SystemTime,
    marks: Vec<Mark>,
    name: String,
    start_time: SystemTime,
    tags: SpanTags,
}

impl FinishedSpan {
    /// Access the operation's `SpanContext`.
    pub fn context(&self) -> &SpanContext {
        &self.context
    }

    /// Access the `SystemTime` the span was finished.
    pub fn finish_time(&self) -> &SystemTime {
        &self.finish_time
    }

    /// Access the marks recorded on this span, most recent first.
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Access the name of the operation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Access the `SystemTime` the span was started.
    pub fn start_time(&self) -> &SystemTime {
        &self.start_time
    }

    /// Access the tags attached to this span.
    pub fn tags(&self) -> &SpanTags {
        &self.tags
    }
}


/// Model of an in-progress operation.
///
/// A span is to a distributed trace what a stack frame is to a stack trace.
///
/// Spans are started by `Tracer::span` and annotated through shared
/// references: every operation takes `&self` and returns `&Self` so calls
/// chain and threads can work on the same span concurrently. Clones share
/// state with the span they were cloned from.
///
/// # Examples
///
/// ```
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
///
/// let (tracer, receiver) = Tracer::new(TracerOptions::default());
/// let span = tracer.span("fetch-user", SpanOptions::default());
/// span.tag("http.status", 200)
///     .mark("cache-miss")
///     .finish();
///
/// let finished = receiver.recv().unwrap();
/// assert_eq!(finished.name(), "fetch-user");
/// ```
#[derive(Clone, Debug)]
pub enum Span {
    /// Stands in when no span is active, every operation is a no-op.
    Empty,

    /// A live span owned by this process.
    Local(LocalSpan),

    /// Identity of a span owned by another process, every operation is
    /// a no-op.
    Remote(SpanContext),
}

impl Span {
    /// Flag the span as failed.
    ///
    /// Sets the error state carried into the processing-time metric and,
    /// on sampled spans, the `error` and `error.object` tags.
    /// Ignored once the span has finished.
    pub fn add_error(&self, message: &str) -> &Self {
        if let Span::Local(span) = self {
            span.record_error(String::from(message));
        }
        self
    }

    /// Flag the span as failed, rendering the cause as the error object.
    ///
    /// Same contract as `Span::add_error` with the message taken from the
    /// cause's `Display` rendering.
    pub fn add_error_cause(&self, cause: &dyn Error) -> &Self {
        if let Span::Local(span) = self {
            span.record_error(cause.to_string());
        }
        self
    }

    /// Access the `SpanContext` of this span.
    ///
    /// Empty spans return a context with invalid identifiers and a `Drop`
    /// sampling decision.
    pub fn context(&self) -> &SpanContext {
        match self {
            Span::Empty => &SpanContext::NONE,
            Span::Local(span) => &span.context,
            Span::Remote(context) => context,
        }
    }

    /// Stop collecting the processing-time metric for this span.
    pub fn disable_metrics(&self) -> &Self {
        if let Span::Local(span) = self {
            span.set_metrics(false);
        }
        self
    }

    /// Start collecting the processing-time metric for this span.
    pub fn enable_metrics(&self) -> &Self {
        if let Span::Local(span) = self {
            span.set_metrics(true);
        }
        self
    }

    /// Close the span and emit its outputs.
    ///
    /// The first call wins: it flips the span to closed, records the
    /// processing-time metric if metrics collection is enabled and sends
    /// the finished snapshot to the tracer's receiver if the span is
    /// sampled. Every later call, from any thread, is a no-op.
    ///
    /// The two outputs are independent: sampling only gates the export
    /// and the metrics flag only gates the metric.
    pub fn finish(&self) -> &Self {
        if let Span::Local(span) = self {
            span.finish();
        }
        self
    }

    /// Close the span as of the given time.
    ///
    /// Same contract as `Span::finish`. A time earlier than the span's
    /// start is kept in the snapshot as given; the metric clamps the
    /// duration to zero.
    pub fn finish_at(&self, at: SystemTime) -> &Self {
        if let Span::Local(span) = self {
            span.finish_at(at);
        }
        self
    }

    /// Returns `true` if this is the `Span::Empty` placeholder.
    pub fn is_empty(&self) -> bool {
        matches!(self, Span::Empty)
    }

    /// Returns `true` if this span is live in the current process.
    pub fn is_local(&self) -> bool {
        matches!(self, Span::Local(_))
    }

    /// Record a timestamped label on the span.
    ///
    /// Marks are stored most recent first and are accepted even after the
    /// span has finished; the snapshot only carries the marks recorded
    /// before it was assembled.
    pub fn mark(&self, label: &str) -> &Self {
        if let Span::Local(span) = self {
            span.mark(label);
        }
        self
    }

    /// Record a label on the span as of the given time.
    pub fn mark_at(&self, at: SystemTime, label: &str) -> &Self {
        if let Span::Local(span) = self {
            span.mark_at(at, label);
        }
        self
    }

    /// Returns the operation name.
    ///
    /// Empty and remote spans return the empty string.
    pub fn operation_name(&self) -> String {
        match self {
            Span::Local(span) => span.operation_name(),
            _ => String::new(),
        }
    }

    /// Updates the operation name.
    ///
    /// Ignored once the span has finished.
    pub fn set_operation_name(&self, name: &str) -> &Self {
        if let Span::Local(span) = self {
            span.set_operation_name(name);
        }
        self
    }

    /// Append a tag to the span.
    ///
    /// Tags are only recorded while the span is open and sampled; calls on
    /// a closed or unsampled span keep the chain going and change nothing.
    pub fn tag<TV: Into<TagValue>>(&self, tag: &str, value: TV) -> &Self {
        if let Span::Local(span) = self {
            span.tag(tag, value.into());
        }
        self
    }

    /// Append a tag that also keys the processing-time metric.
    ///
    /// While the span is open the value lands in the metric tag set if
    /// metrics collection is enabled and in the span tag set if the span
    /// is sampled; the two writes are independent of each other.
    pub fn tag_metric(&self, tag: &str, value: &str) -> &Self {
        if let Span::Local(span) = self {
            span.tag_metric(tag, value);
        }
        self
    }
}


/// The live state machine behind `Span::Local`.
///
/// All mutable state sits behind one lock owned by this span alone, so
/// unrelated spans never contend. The open flag transitions exactly once,
/// open to closed, and the closing thread is the only one to emit the
/// span's outputs.
#[derive(Clone, Debug)]
pub struct LocalSpan {
    clock: Arc<dyn Clock>,
    context: SpanContext,
    metrics_sink: Arc<dyn MetricsSink>,
    parent: Option<ParentLink>,
    scope_metrics_to_parent: bool,
    sender: SpanSender,
    start_time: SystemTime,
    state: Arc<Mutex<SpanState>>,
}

impl LocalSpan {
    /// Creates a new `LocalSpan` and applies any passed `SpanOptions`.
    ///
    /// For use by `Tracer::span`, which resolves the span's context and
    /// the tracer-wide runtime handles first.
    pub(crate) fn new(
        name: &str,
        context: SpanContext,
        options: SpanOptions,
        runtime: SpanRuntime,
    ) -> LocalSpan {
        let start_time = options.start_time.unwrap_or_else(|| runtime.clock.now());
        let metrics = options.metrics.unwrap_or(runtime.metrics);
        let span = LocalSpan {
            clock: runtime.clock,
            context,
            metrics_sink: runtime.metrics_sink,
            parent: options.parent,
            scope_metrics_to_parent: runtime.scope_metrics_to_parent,
            sender: runtime.sender,
            start_time,
            state: Arc::new(Mutex::new(SpanState {
                errored: false,
                marks: VecDeque::new(),
                metric_tags: MetricTags::new(),
                metrics,
                name: String::from(name),
                open: true,
                tags: SpanTags::new(),
            })),
        };
        for (tag, value) in options.tags {
            span.tag(&tag, value);
        }
        for (tag, value) in options.metric_tags {
            span.tag_metric(&tag, &value);
        }
        span
    }
}

impl LocalSpan {
    fn finish(&self) {
        self.finish_at(self.clock.now());
    }

    fn finish_at(&self, at: SystemTime) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(_) => return,
        };
        if !state.open {
            return;
        }
        state.open = false;
        let name = state.name.clone();
        let errored = state.errored;
        let metrics = state.metrics;
        let metric_tags = state.metric_tags.clone();
        let snapshot = if self.context.is_sampled() {
            Some(FinishedSpan {
                context: self.context.clone(),
                finish_time: at,
                marks: state.marks.iter().cloned().collect(),
                name: name.clone(),
                start_time: self.start_time,
                tags: state.tags.clone(),
            })
        } else {
            None
        };
        // The span is now closed so the sinks can be called without
        // holding the lock.
        drop(state);

        if metrics {
            self.record_processing_time(at, &name, errored, metric_tags);
        }
        if let Some(snapshot) = snapshot {
            if self.sender.send(snapshot).is_err() {
                debug!("Dropping finished span, the receiver was disconnected");
            }
        }
    }

    fn mark(&self, label: &str) {
        self.mark_at(self.clock.now(), label);
    }

    fn mark_at(&self, at: SystemTime, label: &str) {
        if let Ok(mut state) = self.state.lock() {
            state.marks.push_front(Mark::new(at, label));
        }
    }

    fn operation_name(&self) -> String {
        self.state
            .lock()
            .ok()
            .map(|state| state.name.clone())
            .unwrap_or_default()
    }

    fn record_error(&self, message: String) {
        if let Ok(mut state) = self.state.lock() {
            if state.open {
                state.errored = true;
                if self.context.is_sampled() {
                    state.tags.tag(ERROR_TAG, TagValue::Boolean(true));
                    state.tags.tag(ERROR_OBJECT_TAG, TagValue::String(message));
                }
            }
        }
    }

    fn record_processing_time(
        &self,
        at: SystemTime,
        name: &str,
        errored: bool,
        accumulated: MetricTags,
    ) {
        let elapsed = match at.duration_since(self.start_time) {
            Ok(elapsed) => elapsed,
            Err(_) => {
                warn!("Span finished before it started, recording a zero processing time");
                Duration::ZERO
            }
        };
        let mut tags = MetricTags::new();
        tags.tag(OPERATION_TAG, name);
        tags.tag(ERROR_TAG, TagValue::boolean_text(errored));
        for (tag, value) in accumulated.iter() {
            tags.tag(tag, value);
        }
        if self.scope_metrics_to_parent {
            if let Some(operation) = self.parent.as_ref().and_then(ParentLink::operation_name) {
                tags.tag(PARENT_OPERATION_TAG, &operation);
            }
        }
        self.metrics_sink
            .record(SPAN_PROCESSING_TIME, Unit::NANOSECONDS, &tags, elapsed);
    }

    fn set_metrics(&self, enabled: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.metrics = enabled;
        }
    }

    fn set_operation_name(&self, name: &str) {
        if let Ok(mut state) = self.state.lock() {
            if state.open {
                state.name = String::from(name);
            }
        }
    }

    fn tag(&self, tag: &str, value: TagValue) {
        if !self.context.is_sampled() {
            return;
        }
        if let Ok(mut state) = self.state.lock() {
            if state.open {
                state.tags.tag(tag, value);
            }
        }
    }

    fn tag_metric(&self, tag: &str, value: &str) {
        if let Ok(mut state) = self.state.lock() {
            if state.open {
                if state.metrics {
                    state.metric_tags.tag(tag, value);
                }
                if self.context.is_sampled() {
                    state.tags.tag(tag, TagValue::String(String::from(value)));
                }
            }
        }
    }
}


/// Mutable state of a `LocalSpan`, only touched under the span's lock.
#[derive(Debug)]
struct SpanState {
    errored: bool,
    marks: VecDeque<Mark>,
    metric_tags: MetricTags,
    metrics: bool,
    name: String,
    open: bool,
    tags: SpanTags,
}


/// Handle on a parent span, kept only to read its operation name.
///
/// The handle shares ownership of the parent's state so the name stays
/// readable even after the parent finished or went out of scope.
#[derive(Clone, Debug)]
pub(crate) struct ParentLink {
    pub(crate) context: SpanContext,
    state: Option<Arc<Mutex<SpanState>>>,
}

impl ParentLink {
    fn from_span(span: &Span) -> Option<ParentLink> {
        match span {
            Span::Empty => None,
            Span::Local(span) => Some(ParentLink {
                context: span.context.clone(),
                state: Some(Arc::clone(&span.state)),
            }),
            Span::Remote(context) => Some(ParentLink {
                context: context.clone(),
                state: None,
            }),
        }
    }

    fn operation_name(&self) -> Option<String> {
        let state = self.state.as_ref()?;
        state.lock().ok().map(|state| state.name.clone())
    }
}


/// Type alias for a `crossbeam_channel::Receiver` of `FinishedSpan`s.
pub type SpanReceiver = Receiver<FinishedSpan>;

/// Type alias for a `crossbeam_channel::Sender` of `FinishedSpan`s.
pub type SpanSender = Sender<FinishedSpan>;


/// Additional options that are passed to `Tracer::span`.
///
/// These options specify initial attributes of a span.
/// All values are optional.
///
/// # Examples
///
/// ```
/// use std::time::SystemTime;
///
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
///
/// let (tracer, _receiver) = Tracer::new(TracerOptions::default());
/// let parent = tracer.span("parent", SpanOptions::default());
///
/// let options = SpanOptions::default()
///     .child_of(&parent)
///     .start_time(SystemTime::now());
/// let span = tracer.span("child", options);
/// ```
pub struct SpanOptions {
    pub(crate) metric_tags: Vec<(String, String)>,
    pub(crate) metrics: Option<bool>,
    pub(crate) parent: Option<ParentLink>,
    pub(crate) sampling: Option<SamplingDecision>,
    pub(crate) start_time: Option<SystemTime>,
    pub(crate) tags: Vec<(String, TagValue)>,
}

impl SpanOptions {
    /// Declares the span a child of the given span.
    ///
    /// The child inherits the parent's trace id and, unless overridden
    /// with `SpanOptions::sampling`, its sampling decision. An empty
    /// parent leaves the span a root span.
    pub fn child_of(mut self, parent: &Span) -> Self {
        self.parent = ParentLink::from_span(parent);
        self
    }

    /// Sets whether the span collects the processing-time metric.
    ///
    /// Overrides the tracer-wide default.
    pub fn metrics(mut self, metrics: bool) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Sets the sampling decision for the span.
    ///
    /// Overrides both the parent's decision and the root default.
    pub fn sampling(mut self, sampling: SamplingDecision) -> Self {
        self.sampling = Some(sampling);
        self
    }

    /// Sets the start time for the operation.
    pub fn start_time(mut self, start_time: SystemTime) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Append an initial tag to the span.
    pub fn tag<TV: Into<TagValue>>(mut self, tag: &str, value: TV) -> Self {
        self.tags.push((String::from(tag), value.into()));
        self
    }

    /// Append an initial metric tag to the span.
    pub fn tag_metric(mut self, tag: &str, value: &str) -> Self {
        self.metric_tags
            .push((String::from(tag), String::from(value)));
        self
    }
}

impl Default for SpanOptions {
    /// Returns a default set of `SpanOptions`.
    ///
    /// By default the span will:
    ///
    ///   * Be a root span, with no parent.
    ///   * Start at the current clock time.
    ///   * Inherit the parent's sampling decision, or be sampled if it
    ///     has no parent.
    ///   * Collect metrics according to the tracer's configuration.
    ///   * Carry no initial tags or metric tags.
    fn default() -> SpanOptions {
        SpanOptions {
            metric_tags: Vec::new(),
            metrics: None,
            parent: None,
            sampling: None,
            start_time: None,
            tags: Vec::new(),
        }
    }
}


/// Handles a tracer injects into every local span it starts.
#[derive(Clone, Debug)]
pub(crate) struct SpanRuntime {
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) metrics: bool,
    pub(crate) metrics_sink: Arc<dyn MetricsSink>,
    pub(crate) scope_metrics_to_parent: bool,
    pub(crate) sender: SpanSender,
}
