//! Query path parsing.

use crate::error::{Error, Result};

/// A segment in a query path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Named field access (e.g., "tx", "raw_log", "@type").
    Field(String),
    /// Array index access (e.g., "0", "1").
    Index(usize),
    /// Wildcard for all array elements (e.g., "*").
    Wildcard,
}

/// A parsed query path.
#[derive(Debug, Clone)]
pub struct QueryPath {
    /// The segments that make up this path.
    pub segments: Vec<PathSegment>,
}

impl QueryPath {
    /// Parse a dot-notation query path.
    ///
    /// # Examples
    ///
    /// - `"tx.raw_log"` → `[Field("tx"), Field("raw_log")]`
    /// - `"responses.0.json"` → `[Field("responses"), Index(0), Field("json")]`
    /// - `"tx.events.*.type"` → `[Field("tx"), Field("events"), Wildcard, Field("type")]`
    pub fn parse(input: &str) -> Result<Self> {
        if input.is_empty() {
            return Ok(QueryPath { segments: vec![] });
        }

        let segments = input
            .split('.')
            .map(Self::parse_segment)
            .collect::<Result<Vec<_>>>()?;

        Ok(QueryPath { segments })
    }

    /// Parse a single path segment.
    fn parse_segment(s: &str) -> Result<PathSegment> {
        if s.is_empty() {
            return Err(Error::InvalidQuery(
                "Empty path segment (consecutive dots?)".to_string(),
            ));
        }

        if s == "*" {
            return Ok(PathSegment::Wildcard);
        }

        if let Ok(idx) = s.parse::<usize>() {
            return Ok(PathSegment::Index(idx));
        }

        Ok(PathSegment::Field(s.to_string()))
    }

    /// Check if this path contains any wildcards.
    pub fn has_wildcard(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, PathSegment::Wildcard))
    }

    /// Check if this path is empty (no segments).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_index() {
        let path = QueryPath::parse("responses.0.json").unwrap();
        assert_eq!(
            path.segments,
            vec![
                PathSegment::Field("responses".into()),
                PathSegment::Index(0),
                PathSegment::Field("json".into()),
            ]
        );
        assert!(!path.has_wildcard());
    }

    #[test]
    fn test_parse_with_wildcard() {
        let path = QueryPath::parse("tx.events.*.attributes").unwrap();
        assert_eq!(path.segments[2], PathSegment::Wildcard);
        assert!(path.has_wildcard());
    }

    #[test]
    fn test_parse_type_url_field() {
        let path = QueryPath::parse("msgs.0.@type").unwrap();
        assert_eq!(path.segments[2], PathSegment::Field("@type".into()));
    }

    #[test]
    fn test_parse_empty() {
        assert!(QueryPath::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_consecutive_dots_error() {
        assert!(matches!(
            QueryPath::parse("tx..code"),
            Err(Error::InvalidQuery(_))
        ));
    }
}
