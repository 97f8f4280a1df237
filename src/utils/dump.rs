use std::io::Write;

use crate::errors::Result;
use crate::span::FinishedSpan;


/// Renders a `FinishedSpan` as human readable text.
///
/// Intended for debugging and for reporter closures that ship spans to a
/// log file or the console. Tags are rendered sorted by name; marks keep
/// their most recent first order and show their offset from the span's
/// start. Durations and offsets clamp to zero when the recorded times run
/// backwards.
///
/// # Errors
///
/// Fails when writing to `out` fails.
///
/// # Examples
///
/// ```
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
/// use tracelet::utils::dump_span;
///
/// let (tracer, receiver) = Tracer::new(TracerOptions::default());
/// tracer.span("fetch-user", SpanOptions::default()).finish();
///
/// let span = receiver.recv().unwrap();
/// let mut buffer = Vec::new();
/// dump_span(&span, &mut buffer).unwrap();
/// let text = String::from_utf8(buffer).unwrap();
/// assert!(text.starts_with("==>> Span: fetch-user"));
/// ```
pub fn dump_span<W: Write>(span: &FinishedSpan, out: &mut W) -> Result<()> {
    let mut buffer = String::new();
    buffer.push_str(&format!("==>> Span: {}\n", span.name()));
    buffer.push_str(&format!("===> Trace ID: {}\n", span.context().trace_id()));
    buffer.push_str(&format!("===> Span ID: {}\n", span.context().span_id()));

    let start = *span.start_time();
    let duration = span.finish_time().duration_since(start).unwrap_or_default();
    let delta = duration.as_secs() as f64 + duration.subsec_nanos() as f64 * 1e-9;
    buffer.push_str(&format!("===> Duration: {}\n", delta));

    buffer.push_str("===> Tags: [\n");
    let mut tags: Vec<_> = span.tags().iter().collect();
    tags.sort_by(|first, second| first.0.cmp(second.0));
    for (tag, value) in tags {
        buffer.push_str(&format!("===>   * {}: {}\n", tag, value.as_str()));
    }
    buffer.push_str("===> ]\n");

    buffer.push_str("===> Marks: [\n");
    for mark in span.marks() {
        let offset = mark.at().duration_since(start).unwrap_or_default();
        let offset = offset.as_secs() as f64 + offset.subsec_nanos() as f64 * 1e-9;
        buffer.push_str(&format!("===>   * {}: +{}\n", mark.label(), offset));
    }
    buffer.push_str("===> ]\n");

    out.write_all(buffer.as_bytes())?;
    Ok(())
}
