use std::error::Error;

use crate::span::Span;


/// Trait to make failing spans on error easier and nicer.
///
/// The most common use is for `Result` instances in combination with the
/// `?` operator.
///
/// # Examples
///
/// ```
/// use std::num::ParseIntError;
///
/// use tracelet::Span;
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
/// use tracelet::utils::FailSpan;
///
/// fn work(span: &Span) -> Result<i32, ParseIntError> {
///     let ten: i32 = "10".parse().fail_span(span)?;
///     let two: i32 = "2".parse().fail_span(span)?;
///     Ok(ten * two)
/// }
///
/// let (tracer, _receiver) = Tracer::new(TracerOptions::default());
/// let span = tracer.span("test", SpanOptions::default());
/// let result = work(&span).unwrap();
/// assert_eq!(result, 20);
/// ```
pub trait FailSpan {
    type Error: Error + ?Sized;

    /// Access the current error information, if any.
    ///
    /// Returns `None` if there was no error.
    fn error(&self) -> Option<&Self::Error>;

    /// Flags a span as failed if there was an error.
    ///
    /// The error's `Display` rendering becomes the span's error object,
    /// the way `Span::add_error_cause` records it.
    ///
    /// Nothing is done if there was no error (`error()` returns `None`).
    fn fail_span(self, span: &Span) -> Self;
}

impl<T, E> FailSpan for Result<T, E>
where
    E: Error,
{
    type Error = E;

    fn error(&self) -> Option<&E> {
        self.as_ref().err()
    }

    fn fail_span(self, span: &Span) -> Result<T, E> {
        if let Err(ref error) = self {
            span.add_error_cause(error);
        }
        self
    }
}
