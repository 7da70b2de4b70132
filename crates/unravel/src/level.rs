//! Decode levels.
//!
//! A level names the scope a decode step operates at and selects both the
//! separators that apply and the target shapes that are legal. `Root` and
//! `KeyChain` are internal markers: they annotate entry validation and
//! key-chain failures but are never valid entry points or mode subjects.

use std::fmt;

/// Scope of a single decode step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Entry validation marker, not a decodable scope.
    Root,
    /// A full query: fields joined by the field separators.
    Query,
    /// One `key=value-list` pair.
    Field,
    /// The key half of a field.
    Key,
    /// The value half of a field: values joined by the value separators.
    ValueList,
    /// A single value.
    Value,
    /// Key-chain walk marker, not a decodable scope.
    KeyChain,
}

impl Level {
    pub(crate) const PUBLIC: [Level; 5] = [
        Level::Query,
        Level::Field,
        Level::Key,
        Level::ValueList,
        Level::Value,
    ];

    /// Whether this level may be used as a decode entry point or as the
    /// subject of a set-mode option.
    pub fn is_public(self) -> bool {
        !matches!(self, Level::Root | Level::KeyChain)
    }

    /// Parse the set-tag spelling of a public level.
    pub(crate) fn parse_tag(s: &str) -> Option<Level> {
        match s {
            "query" => Some(Level::Query),
            "field" => Some(Level::Field),
            "key" => Some(Level::Key),
            "valueList" => Some(Level::ValueList),
            "value" => Some(Level::Value),
            _ => None,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Level::Root => "root",
            Level::Query => "query",
            Level::Field => "field",
            Level::Key => "key",
            Level::ValueList => "value list",
            Level::Value => "value",
            Level::KeyChain => "key chain",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_levels() {
        assert!(Level::Query.is_public());
        assert!(Level::Value.is_public());
        assert!(!Level::Root.is_public());
        assert!(!Level::KeyChain.is_public());
    }

    #[test]
    fn tag_spelling_roundtrip() {
        assert_eq!(Level::parse_tag("valueList"), Some(Level::ValueList));
        assert_eq!(Level::parse_tag("query"), Some(Level::Query));
        assert_eq!(Level::parse_tag("value list"), None);
        assert_eq!(Level::parse_tag("root"), None);
    }

    #[test]
    fn display_names() {
        insta::assert_snapshot!(
            Level::PUBLIC.map(|l| l.to_string()).join(", "),
            @"query, field, key, value list, value"
        );
    }
}
