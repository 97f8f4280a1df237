use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::Error;
use crate::errors::Result;
use crate::span::tag::MetricTags;


/// Name of the histogram metric recording how long spans took to process.
pub const SPAN_PROCESSING_TIME: &str = "span.processing.time";

/// Name of the counter metric for spans that finished in error.
///
/// Reserved so sinks can pre-register it; the span lifecycle does not
/// emit it yet.
pub const SPAN_ERROR_COUNT: &str = "span.error.count";


/// Units denote the underlying data unit of recorded metric values.
#[derive(Clone, Debug, Default, Hash, PartialEq)]
pub struct Unit(Cow<'static, str>);

impl Unit {
    /// Nanoseconds, the unit span durations are recorded in.
    pub const NANOSECONDS: Unit = Unit(Cow::Borrowed("ns"));

    /// Create a new `Unit` from its text form.
    pub fn new<S>(value: S) -> Unit
    where
        S: Into<Cow<'static, str>>,
    {
        Unit(value.into())
    }

    /// View the unit as a `&str`.
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl AsRef<str> for Unit {
    #[inline]
    fn as_ref(&self) -> &str {
        self.0.as_ref()
    }
}


/// Receiver of the aggregate metrics emitted when spans finish.
///
/// The span lifecycle emits at most one value per finished span, the
/// [`SPAN_PROCESSING_TIME`] duration, keyed by the span's metric tags.
/// Implementations adapt that stream to a concrete metrics backend and
/// must not block: `record` is called while finishing spans.
pub trait MetricsSink: fmt::Debug + Send + Sync {
    /// Record a single duration value for the named metric.
    fn record(&self, name: &'static str, unit: Unit, tags: &MetricTags, value: Duration);
}


/// A metrics sink that drops every value.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullMetricsSink;

impl NullMetricsSink {
    /// Creates a sink that records nothing.
    pub fn new() -> NullMetricsSink {
        NullMetricsSink
    }
}

impl MetricsSink for NullMetricsSink {
    fn record(&self, _: &'static str, _: Unit, _: &MetricTags, _: Duration) {}
}


/// A single value recorded through an [`InMemoryMetricsSink`].
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRecord {
    name: &'static str,
    unit: Unit,
    tags: MetricTags,
    value: Duration,
}

impl MetricRecord {
    /// Access the name of the metric the value belongs to.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Access the unit the value is expressed in.
    pub fn unit(&self) -> &Unit {
        &self.unit
    }

    /// Access the metric tags the value is keyed by.
    pub fn tags(&self) -> &MetricTags {
        &self.tags
    }

    /// Access the recorded duration.
    pub fn value(&self) -> Duration {
        self.value
    }
}


/// A metrics sink that stores recorded values in memory.
///
/// Useful for tests and debugging: clones share the same storage so a
/// clone can be handed to the tracer while the original is inspected.
///
/// # Examples
///
/// ```
/// use tracelet::metrics;
/// use tracelet::InMemoryMetricsSink;
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
///
/// let sink = InMemoryMetricsSink::new();
/// let (tracer, _receiver) = Tracer::new(
///     TracerOptions::default().metrics_sink(sink.clone())
/// );
///
/// tracer.span("example", SpanOptions::default()).finish();
///
/// let records = sink.records().unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].name(), metrics::SPAN_PROCESSING_TIME);
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryMetricsSink {
    records: Arc<Mutex<Vec<MetricRecord>>>,
}

impl InMemoryMetricsSink {
    /// Creates a sink with empty storage.
    pub fn new() -> InMemoryMetricsSink {
        InMemoryMetricsSink {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl InMemoryMetricsSink {
    /// Returns a copy of every value recorded so far.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::SinkPoisoned`] if a thread panicked while
    /// recording.
    pub fn records(&self) -> Result<Vec<MetricRecord>> {
        self.records
            .lock()
            .map(|records| records.iter().cloned().collect())
            .map_err(|_| Error::SinkPoisoned)
    }

    /// Clears the recorded values.
    pub fn reset(&self) {
        let _ = self.records.lock().map(|mut records| records.clear());
    }
}

impl MetricsSink for InMemoryMetricsSink {
    fn record(&self, name: &'static str, unit: Unit, tags: &MetricTags, value: Duration) {
        let mut records = self.records.lock().unwrap_or_else(|err| err.into_inner());
        records.push(MetricRecord {
            name,
            unit,
            tags: tags.clone(),
            value,
        });
    }
}


#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::InMemoryMetricsSink;
    use super::MetricsSink;
    use super::MetricTags;
    use super::NullMetricsSink;
    use super::Unit;
    use super::SPAN_PROCESSING_TIME;

    #[test]
    fn in_memory_sink_stores_records() {
        let sink = InMemoryMetricsSink::new();
        let mut tags = MetricTags::new();
        tags.tag("operation", "fetch");
        sink.record(
            SPAN_PROCESSING_TIME,
            Unit::NANOSECONDS,
            &tags,
            Duration::from_millis(10),
        );
        let records = sink.records().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name(), SPAN_PROCESSING_TIME);
        assert_eq!(records[0].unit().as_str(), "ns");
        assert_eq!(records[0].tags().get("operation"), Some("fetch"));
        assert_eq!(records[0].value(), Duration::from_millis(10));
    }

    #[test]
    fn in_memory_sink_clones_share_storage() {
        let sink = InMemoryMetricsSink::new();
        let clone = sink.clone();
        clone.record(
            SPAN_PROCESSING_TIME,
            Unit::NANOSECONDS,
            &MetricTags::new(),
            Duration::from_secs(1),
        );
        assert_eq!(sink.records().unwrap().len(), 1);
    }

    #[test]
    fn in_memory_sink_resets() {
        let sink = InMemoryMetricsSink::new();
        sink.record(
            SPAN_PROCESSING_TIME,
            Unit::NANOSECONDS,
            &MetricTags::new(),
            Duration::from_secs(1),
        );
        sink.reset();
        assert_eq!(sink.records().unwrap().len(), 0);
    }

    #[test]
    fn null_sink_drops_values() {
        let sink = NullMetricsSink::new();
        sink.record(
            SPAN_PROCESSING_TIME,
            Unit::NANOSECONDS,
            &MetricTags::new(),
            Duration::from_secs(1),
        );
    }

    #[test]
    fn unit_text_forms() {
        assert_eq!(Unit::NANOSECONDS.as_str(), "ns");
        assert_eq!(Unit::new("ms").as_str(), "ms");
        assert_eq!(Unit::new(String::from("req")).as_str(), "req");
    }
}
