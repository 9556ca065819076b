//! Query execution engine.

use crate::error::{Error, Result};
use crate::query::path::{PathSegment, QueryPath};
use crate::query::shortcuts::expand_shortcut;
use serde::Serialize;
use serde_json::Value as JsonValue;

/// Result of a query execution.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// A single value.
    Single(QueryValue),
    /// Multiple values (from wildcard expansion).
    Multiple(Vec<QueryValue>),
}

/// A queryable value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<QueryValue>),
    Object(serde_json::Map<String, JsonValue>),
}

impl From<JsonValue> for QueryValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => QueryValue::Null,
            JsonValue::Bool(b) => QueryValue::Bool(b),
            JsonValue::Number(n) => QueryValue::Number(n),
            JsonValue::String(s) => QueryValue::String(s),
            JsonValue::Array(arr) => {
                QueryValue::Array(arr.into_iter().map(QueryValue::from).collect())
            }
            JsonValue::Object(map) => QueryValue::Object(map),
        }
    }
}

/// Execute a query against the JSON view of a decoded transaction.
///
/// An empty query selects the whole view.
pub fn execute_query(view: &JsonValue, query: &str) -> Result<QueryResult> {
    let expanded = expand_shortcut(query);
    let path = QueryPath::parse(&expanded)?;

    if path.has_wildcard() {
        let results = execute_path_recursive(view, &path.segments)?;
        Ok(QueryResult::Multiple(results))
    } else {
        let result = execute_path(view, &path.segments)?;
        Ok(QueryResult::Single(result))
    }
}

/// Execute a path query without wildcards.
fn execute_path(value: &JsonValue, segments: &[PathSegment]) -> Result<QueryValue> {
    let mut current = value;

    for segment in segments {
        current = match segment {
            PathSegment::Field(name) => current
                .get(name)
                .ok_or_else(|| Error::FieldNotFound(name.clone()))?,
            PathSegment::Index(idx) => current.get(*idx).ok_or(Error::IndexOutOfBounds(*idx))?,
            PathSegment::Wildcard => {
                return Err(Error::InvalidQuery(
                    "Unexpected wildcard in non-wildcard path".to_string(),
                ));
            }
        };
    }

    Ok(QueryValue::from(current.clone()))
}

/// Recursively execute path with wildcard expansion.
fn execute_path_recursive(value: &JsonValue, segments: &[PathSegment]) -> Result<Vec<QueryValue>> {
    let Some((current_segment, rest)) = segments.split_first() else {
        return Ok(vec![QueryValue::from(value.clone())]);
    };

    match current_segment {
        PathSegment::Field(name) => {
            let next = value
                .get(name)
                .ok_or_else(|| Error::FieldNotFound(name.clone()))?;
            execute_path_recursive(next, rest)
        }
        PathSegment::Index(idx) => {
            let next = value.get(*idx).ok_or(Error::IndexOutOfBounds(*idx))?;
            execute_path_recursive(next, rest)
        }
        PathSegment::Wildcard => {
            let arr = value
                .as_array()
                .ok_or_else(|| Error::InvalidQuery("Wildcard on non-array".to_string()))?;

            let mut results = Vec::new();
            for item in arr {
                results.extend(execute_path_recursive(item, rest)?);
            }
            Ok(results)
        }
    }
}
