use std::time::SystemTime;


/// Timestamped label attached to a span.
///
/// Marks record that a point of interest was reached while the span was
/// being processed, without the weight of a full tag or of a child span.
/// A span stores its marks most recent first.
///
/// Unlike tags, marks are accepted even after the span has finished so
/// that late observations are not silently lost.
///
/// # Examples
///
/// ```
/// use tracelet::SpanOptions;
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
///
/// let (tracer, receiver) = Tracer::new(TracerOptions::default());
/// let span = tracer.span("example", SpanOptions::default());
/// span.mark("cache-hit");
/// span.finish();
///
/// let finished = receiver.recv().unwrap();
/// assert_eq!(finished.marks()[0].label(), "cache-hit");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Mark {
    at: SystemTime,
    label: String,
}

impl Mark {
    /// Creates a mark with the given label, recorded at the given time.
    pub fn new(at: SystemTime, label: &str) -> Mark {
        Mark {
            at,
            label: String::from(label),
        }
    }
}

impl Mark {
    /// Access the time the mark was recorded at.
    pub fn at(&self) -> &SystemTime {
        &self.at
    }

    /// Access the mark's label.
    pub fn label(&self) -> &str {
        &self.label
    }
}


#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use super::Mark;

    #[test]
    fn access_attributes() {
        let at = SystemTime::now();
        let mark = Mark::new(at, "retry");
        assert_eq!(mark.at(), &at);
        assert_eq!(mark.label(), "retry");
    }

    #[test]
    fn marks_with_same_label_and_time_are_equal() {
        let at = SystemTime::now();
        assert_eq!(Mark::new(at, "retry"), Mark::new(at, "retry"));
        assert_ne!(Mark::new(at, "retry"), Mark::new(at, "other"));
    }
}
