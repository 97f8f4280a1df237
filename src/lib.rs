//! A span lifecycle library for distributed tracing instrumentation.
//!
//! `tracelet` models a unit of traced work as a [`Span`]: started by a
//! [`Tracer`], annotated from any thread while the operation runs and
//! finished exactly once. Finishing a span emits up to two independent
//! outputs:
//!
//!   * An immutable [`FinishedSpan`] snapshot, sent to the tracer's
//!     receiver when the span is sampled.
//!   * A processing time measurement, recorded against the configured
//!     [`MetricsSink`] when metrics collection is enabled.
//!
//! ```
//! use tracelet::SpanOptions;
//! use tracelet::Tracer;
//! use tracelet::TracerOptions;
//!
//! let (tracer, receiver) = Tracer::new(TracerOptions::default());
//!
//! let span = tracer.span("fetch-user", SpanOptions::default());
//! span.tag("http.status", 200).mark("cache-miss");
//! span.finish();
//!
//! let finished = receiver.recv().unwrap();
//! assert_eq!(finished.name(), "fetch-user");
//! ```
//!
//! The [`utils`] module adds the pieces around the lifecycle: a background
//! [`utils::ReporterThread`] draining the receiver, the [`utils::FailSpan`]
//! extension for `Result`s, the process wide [`utils::GlobalTracer`] and a
//! plain text [`utils::dump_span`] renderer.
mod clock;
mod errors;
mod span;
mod span_context;
mod tracer;

pub mod metrics;
pub mod utils;


pub use self::clock::Clock;
pub use self::clock::ManualClock;
pub use self::clock::SystemClock;

pub use self::errors::Error;
pub use self::errors::Result;

pub use self::metrics::InMemoryMetricsSink;
pub use self::metrics::MetricRecord;
pub use self::metrics::MetricsSink;
pub use self::metrics::NullMetricsSink;
pub use self::metrics::Unit;

pub use self::span::FinishedSpan;
pub use self::span::LocalSpan;
pub use self::span::Span;
pub use self::span::SpanOptions;
pub use self::span::SpanReceiver;
pub use self::span::SpanSender;
pub use self::span::mark::Mark;
pub use self::span::tag::MetricTags;
pub use self::span::tag::SpanTags;
pub use self::span::tag::TagValue;

pub use self::span_context::SamplingDecision;
pub use self::span_context::SpanContext;
pub use self::span_context::SpanId;
pub use self::span_context::TraceId;

pub use self::tracer::Tracer;
pub use self::tracer::TracerOptions;
