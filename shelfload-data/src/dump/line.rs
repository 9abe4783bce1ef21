use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when a dump line does not carry a JSON object.
#[derive(Debug, Error)]
pub enum LineParseError {
    /// The line contains no `{`, so there is no object to parse.
    #[error("line does not contain a JSON object")]
    NoJsonObject,
    /// The text from the first `{` onwards is not a valid JSON object.
    #[error("invalid JSON object: {source}")]
    Json {
        /// Parser error reported by `simd-json`.
        #[source]
        source: simd_json::Error,
    },
}

/// A dump line reduced to its top-level JSON fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLine {
    fields: Map<String, Value>,
}

impl ParsedLine {
    /// Raw value of a top-level field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Follow a chain of object keys, e.g. `["created", "value"]`.
    #[must_use]
    pub fn path(&self, keys: &[&str]) -> Option<&Value> {
        let (first, rest) = keys.split_first()?;
        rest.iter()
            .try_fold(self.get(first)?, |value, key| value.get(key))
    }

    /// Field rendered as text when it holds a string, number or boolean.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).and_then(scalar_text)
    }

    /// Field as a list, if it holds one.
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&[Value]> {
        self.get(name)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
    }

    /// Number of top-level fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the object had no fields at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse a dump line, skipping any prefix before the first `{`.
///
/// Open Library dumps prefix each object with tab-separated metadata (type,
/// key, revision, timestamp); everything up to the first brace is ignored and
/// the remainder of the line must be a single JSON object.
///
/// # Examples
/// ```
/// use shelfload_data::parse_line;
///
/// let line = parse_line("/type/author\t/authors/OL1A\t{\"key\":\"/authors/OL1A\"}")?;
/// assert_eq!(line.text("key").as_deref(), Some("/authors/OL1A"));
/// # Ok::<(), shelfload_data::LineParseError>(())
/// ```
pub fn parse_line(line: &str) -> Result<ParsedLine, LineParseError> {
    let start = line.find('{').ok_or(LineParseError::NoJsonObject)?;
    let (_, json) = line.split_at(start);
    let mut bytes = json.trim_end().as_bytes().to_vec();
    let fields: Map<String, Value> = simd_json::from_slice(bytes.as_mut_slice())
        .map_err(|source| LineParseError::Json { source })?;
    Ok(ParsedLine { fields })
}

/// Render a scalar JSON value as text; arrays, objects and null yield `None`.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
