//! Text-decode capabilities.
//!
//! User types opt into leaf decoding by implementing [`DecodeText`]
//! (receives unescaped text) or [`DecodeRawText`] (receives the raw
//! fragment verbatim), then wiring up `Target` with the
//! [`text_target!`](crate::text_target) or
//! [`raw_text_target!`](crate::raw_text_target) helper.

use std::fmt;

/// Boxed user-side failure from a text-decode capability.
pub type TextError = Box<dyn std::error::Error + Send + Sync>;

/// Consumes unescaped text.
pub trait DecodeText {
    fn decode_text(&mut self, text: &str) -> Result<(), TextError>;
}

/// Consumes the raw, pre-unescape fragment.
pub trait DecodeRawText {
    fn decode_raw_text(&mut self, raw: &str) -> Result<(), TextError>;
}

/// Stores the raw fragment verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawText(pub String);

impl DecodeRawText for RawText {
    fn decode_raw_text(&mut self, raw: &str) -> Result<(), TextError> {
        self.0 = raw.to_string();
        Ok(())
    }
}

impl fmt::Display for RawText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RawText> for String {
    fn from(raw: RawText) -> String {
        raw.0
    }
}

/// Implement `Target` for a [`DecodeText`] type.
#[macro_export]
macro_rules! text_target {
    ($ty:ty) => {
        impl $crate::Target for $ty {
            fn meta() -> $crate::TypeMeta {
                $crate::TypeMeta::text::<$ty>()
            }

            fn dyn_meta(&self) -> $crate::TypeMeta {
                <$ty as $crate::Target>::meta()
            }

            fn is_vacant(&self) -> bool {
                false
            }

            fn shape(&mut self) -> $crate::Shape<'_> {
                $crate::Shape::Text($crate::TextShape::Unescaped(self))
            }
        }
    };
}

/// Implement `Target` for a [`DecodeRawText`] type. Raw capability wins
/// when a type implements both.
#[macro_export]
macro_rules! raw_text_target {
    ($ty:ty) => {
        impl $crate::Target for $ty {
            fn meta() -> $crate::TypeMeta {
                $crate::TypeMeta::text::<$ty>()
            }

            fn dyn_meta(&self) -> $crate::TypeMeta {
                <$ty as $crate::Target>::meta()
            }

            fn is_vacant(&self) -> bool {
                false
            }

            fn shape(&mut self) -> $crate::Shape<'_> {
                $crate::Shape::Text($crate::TextShape::Raw(self))
            }
        }
    };
}

raw_text_target!(RawText);
