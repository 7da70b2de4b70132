//! Decode errors.
//!
//! Failures are wrapped exactly once, at the site that observed them, into a
//! [`DecodeError`] carrying the level, the raw fragment, and a descriptor of
//! the target. Everything below that is reachable through
//! `std::error::Error::source`, down to the innermost cause.

use std::fmt;

use crate::level::Level;
use crate::target::{Kind, TypeMeta};
use crate::unescape::UnescapeError;

/// Diagnostic snapshot of one decode step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeInfo {
    pub level: Level,
    /// Raw input fragment, before unescaping.
    pub input: String,
    pub type_name: &'static str,
    pub kind: Kind,
}

impl DecodeInfo {
    pub(crate) fn new(level: Level, input: &str, meta: TypeMeta) -> Self {
        DecodeInfo {
            level,
            input: input.to_string(),
            type_name: meta.name,
            kind: meta.kind,
        }
    }
}

impl fmt::Display for DecodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:?} => {} ({})",
            self.level, self.input, self.type_name, self.kind
        )
    }
}

/// A level-annotated decode failure.
#[derive(Debug, thiserror::Error)]
#[error("{info}: {cause}")]
pub struct DecodeError {
    pub info: DecodeInfo,
    #[source]
    pub cause: ErrorCause,
}

impl DecodeError {
    pub(crate) fn at(level: Level, input: &str, meta: TypeMeta, cause: ErrorCause) -> Self {
        DecodeError {
            info: DecodeInfo::new(level, input, meta),
            cause,
        }
    }
}

/// The inner cause of a [`DecodeError`].
#[derive(Debug, thiserror::Error)]
pub enum ErrorCause {
    /// Decoding was entered at an internal level.
    #[error("invalid entry level '{0}'")]
    InvalidEntryLevel(Level),

    /// The depth guard tripped.
    #[error("recursion limit exceeded")]
    RecursionLimit,

    /// No handler claims this target at this level.
    #[error("unsupported target type")]
    UnsupportedTarget,

    #[error(transparent)]
    Unescape(#[from] UnescapeError),

    #[error(transparent)]
    ParseBool(#[from] std::str::ParseBoolError),

    #[error(transparent)]
    ParseInt(#[from] std::num::ParseIntError),

    #[error(transparent)]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error(transparent)]
    ParseChar(#[from] std::char::ParseCharError),

    /// A text-decode capability returned an error.
    #[error("{0}")]
    Text(Box<dyn std::error::Error + Send + Sync>),

    #[error("insufficient destination array length")]
    InsufficientArray,

    /// A key-chain fragment named no record field.
    #[error("unknown key '{0}'")]
    UnknownKey(String),

    /// A key-chain step reached a target that is not a pointer, map, or
    /// record.
    #[error("non-indexable key chain target")]
    NonIndexable,

    /// The record resolver rejected a field.
    #[error(transparent)]
    Field(#[from] Box<FieldError>),

    /// Unreachable by construction.
    #[error("internal: {0}")]
    Internal(&'static str),
}

/// A resolver failure, annotated with the offending field.
#[derive(Debug, thiserror::Error)]
#[error("field '{field}' of {record}: {cause}")]
pub struct FieldError {
    pub field: &'static str,
    pub record: &'static str,
    #[source]
    pub cause: TagError,
}

/// Record tag grammar violations. Messages are part of the contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TagError {
    #[error("empty base tag")]
    EmptyBaseTag,

    #[error("invalid base tag directive '{0}'")]
    InvalidBaseDirective(String),

    #[error("mutually exclusive base tag directive 'embed' and non-empty name")]
    EmbedWithName,

    #[error("empty set tag")]
    EmptySetTag,

    #[error("invalid set tag option '{0}'")]
    InvalidSetOption(String),

    #[error("invalid set tag level '{0}'")]
    InvalidSetLevel(String),

    #[error("mutually exclusive base tag name '-' (omit) and set tag options")]
    OmitWithSetOptions,

    #[error("mutually exclusive base tag directive 'embed' and set tag options")]
    EmbedWithSetOptions,

    #[error("'embed' directive on non-anonymous unexported field")]
    EmbedUnexported,

    #[error("'embed' directive on unexported pointer field")]
    EmbedUnexportedPointer,

    #[error("'embed' directive on invalid type")]
    EmbedInvalidType,

    #[error("tag on unexported field")]
    TagOnUnexported,
}

/// Decoder construction failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Set-mode options may only target the five public levels.
    #[error("invalid set mode level '{0}'")]
    InvalidSetLevel(Level),

    /// Integer bases are 0 (infer) or 2 through 36.
    #[error("invalid integer base {0}")]
    InvalidIntegerBase(u32),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::Kind;

    fn info() -> DecodeInfo {
        DecodeInfo {
            level: Level::Value,
            input: "abc%20xyz".to_string(),
            type_name: "alloc::string::String",
            kind: Kind::Text,
        }
    }

    #[test]
    fn decode_error_rendering() {
        let err = DecodeError {
            info: info(),
            cause: ErrorCause::UnsupportedTarget,
        };
        insta::assert_snapshot!(
            err.to_string(),
            @r#"[value] "abc%20xyz" => alloc::string::String (text): unsupported target type"#
        );
    }

    #[test]
    fn field_errors_unwrap_to_the_tag_cause() {
        let err = DecodeError {
            info: info(),
            cause: ErrorCause::Field(Box::new(FieldError {
                field: "key_a",
                record: "Params",
                cause: TagError::EmptyBaseTag,
            })),
        };

        let mut cause: &dyn std::error::Error = &err;
        while let Some(inner) = cause.source() {
            cause = inner;
        }
        assert_eq!(cause.to_string(), "empty base tag");
    }

    #[test]
    fn transparent_causes_keep_their_message() {
        let err = DecodeError {
            info: info(),
            cause: ErrorCause::Unescape(UnescapeError::InvalidUtf8),
        };
        assert!(err.to_string().ends_with("escaped text is not valid utf-8"));
    }
}
