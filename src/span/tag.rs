use std::borrow::Cow;
use std::collections::HashMap;
use std::collections::hash_map::Iter;


/// Map strings to `TagValue`s.
///
/// This structure is a tailored wrapper around `HashMap`s.
/// Keys are unique and writes are last-write-wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpanTags(HashMap<String, TagValue>);

impl SpanTags {
    /// Returns a new empty tag map.
    pub fn new() -> SpanTags {
        SpanTags(HashMap::new())
    }
}

impl SpanTags {
    /// Attempt to extract a tag by name.
    pub fn get(&self, tag: &str) -> Option<&TagValue> {
        self.0.get(tag)
    }

    /// Returns `true` if no tags have been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all tags.
    pub fn iter(&self) -> Iter<'_, String, TagValue> {
        self.0.iter()
    }

    /// Returns the number of tags set so far.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Set a tag to the given value.
    pub fn tag(&mut self, tag: &str, value: TagValue) {
        self.0.insert(String::from(tag), value);
    }
}


/// Map strings to metric tag values.
///
/// Metric tags key the aggregate duration metric emitted when a span
/// finishes and are kept separate from span tags: they never appear in
/// the exported span.
/// Keys are unique and writes are last-write-wins.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricTags(HashMap<String, String>);

impl MetricTags {
    /// Returns a new empty metric tag map.
    pub fn new() -> MetricTags {
        MetricTags(HashMap::new())
    }
}

impl MetricTags {
    /// Attempt to extract a metric tag by name.
    pub fn get(&self, tag: &str) -> Option<&str> {
        self.0.get(tag).map(String::as_str)
    }

    /// Returns `true` if no metric tags have been set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns an iterator over all metric tags.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.0.iter()
    }

    /// Returns the number of metric tags set so far.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Set a metric tag to the given value.
    pub fn tag(&mut self, tag: &str, value: &str) {
        self.0.insert(String::from(tag), String::from(value));
    }
}


/// Enumeration of valid types for tag values.
///
/// The set is closed: booleans, integers and strings.
#[derive(Clone, Debug, PartialEq)]
pub enum TagValue {
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl TagValue {
    /// Fixed text rendering of a boolean value.
    ///
    /// Booleans that feed the string-valued metric tags, such as the
    /// `error` tag, always render this way.
    pub fn boolean_text(value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    /// String rendering of the value.
    ///
    /// Borrows for booleans and strings, allocates for integers.
    pub fn as_str(&self) -> Cow<'_, str> {
        match *self {
            TagValue::Boolean(value) => Cow::Borrowed(TagValue::boolean_text(value)),
            TagValue::Integer(value) => Cow::Owned(value.to_string()),
            TagValue::String(ref value) => Cow::Borrowed(value),
        }
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> TagValue {
        TagValue::Boolean(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> TagValue {
        TagValue::Integer(value)
    }
}

impl<'a> From<&'a str> for TagValue {
    fn from(value: &'a str) -> TagValue {
        TagValue::String(String::from(value))
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> TagValue {
        TagValue::String(value)
    }
}
