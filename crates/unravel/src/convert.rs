//! Scalar conversion.
//!
//! Unescapes a raw fragment and parses it into a literal slot. Parsing
//! delegates to the standard library; the only local logic is integer base
//! handling: an explicit base is passed straight through, base 0 infers
//! `0x` / `0o` / `0b` prefixes (a bare leading zero means octal) and
//! accepts `_` separators between digits.

use std::borrow::Cow;

use crate::error::{DecodeError, ErrorCause};
use crate::level::Level;
use crate::target::{Literal, TypeMeta};
use crate::unescape::UnescapeFn;

pub(crate) struct Converter {
    pub integer_base: u32,
    pub unescape: UnescapeFn,
}

impl Converter {
    pub fn apply(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        lit: Literal<'_>,
    ) -> Result<(), DecodeError> {
        let text =
            (self.unescape)(raw).map_err(|e| DecodeError::at(level, raw, meta, e.into()))?;
        self.set(&text, lit)
            .map_err(|cause| DecodeError::at(level, raw, meta, cause))
    }

    fn set(&self, text: &str, lit: Literal<'_>) -> Result<(), ErrorCause> {
        let base = self.integer_base;

        macro_rules! int_slot {
            ($ty:ty, $slot:expr) => {{
                let (radix, digits) = int_form(text, base);
                *$slot = <$ty>::from_str_radix(&digits, radix)?;
            }};
        }

        match lit {
            Literal::Str(slot) => *slot = text.to_string(),
            Literal::Bool(slot) => *slot = text.parse()?,
            Literal::Char(slot) => *slot = text.parse()?,
            Literal::I8(slot) => int_slot!(i8, slot),
            Literal::I16(slot) => int_slot!(i16, slot),
            Literal::I32(slot) => int_slot!(i32, slot),
            Literal::I64(slot) => int_slot!(i64, slot),
            Literal::I128(slot) => int_slot!(i128, slot),
            Literal::Isize(slot) => int_slot!(isize, slot),
            Literal::U8(slot) => int_slot!(u8, slot),
            Literal::U16(slot) => int_slot!(u16, slot),
            Literal::U32(slot) => int_slot!(u32, slot),
            Literal::U64(slot) => int_slot!(u64, slot),
            Literal::U128(slot) => int_slot!(u128, slot),
            Literal::Usize(slot) => int_slot!(usize, slot),
            Literal::F32(slot) => *slot = text.parse()?,
            Literal::F64(slot) => *slot = text.parse()?,
        }
        Ok(())
    }
}

/// Normalize integer text for `from_str_radix`. With an explicit base the
/// text passes through untouched; base 0 resolves the radix from the
/// prefix and strips digit-separating underscores.
fn int_form(text: &str, base: u32) -> (u32, Cow<'_, str>) {
    if base != 0 {
        return (base, Cow::Borrowed(text));
    }

    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => ("-", &text[1..]),
        Some(b'+') => ("", &text[1..]),
        _ => ("", text),
    };

    let (radix, digits, prefixed) = if let Some(rest) = strip_prefix2(body, "0x", "0X") {
        (16, rest, true)
    } else if let Some(rest) = strip_prefix2(body, "0o", "0O") {
        (8, rest, true)
    } else if let Some(rest) = strip_prefix2(body, "0b", "0B") {
        (2, rest, true)
    } else if body.len() > 1 && body.starts_with('0') {
        (8, body, false)
    } else {
        (10, body, false)
    };

    if !digits.contains('_') && sign.is_empty() && radix == 10 {
        return (10, Cow::Borrowed(body));
    }

    let chars: Vec<char> = digits.chars().collect();
    let mut out = String::with_capacity(text.len());
    out.push_str(sign);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' {
            let prev_ok = if i == 0 {
                prefixed
            } else {
                chars[i - 1].is_ascii_alphanumeric()
            };
            let next_ok = chars.get(i + 1).is_some_and(|n| n.is_ascii_alphanumeric());
            if prev_ok && next_ok {
                continue;
            }
        }
        out.push(c);
    }

    (radix, Cow::Owned(out))
}

fn strip_prefix2<'s>(s: &'s str, lower: &str, upper: &str) -> Option<&'s str> {
    s.strip_prefix(lower).or_else(|| s.strip_prefix(upper))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(text: &str) -> (u32, String) {
        let (radix, digits) = int_form(text, 0);
        (radix, digits.into_owned())
    }

    #[test]
    fn explicit_base_passes_through() {
        let (radix, digits) = int_form("ff", 16);
        assert_eq!((radix, &*digits), (16, "ff"));
    }

    #[test]
    fn base_zero_infers_prefixes() {
        assert_eq!(form("33"), (10, "33".to_string()));
        assert_eq!(form("0x1f"), (16, "1f".to_string()));
        assert_eq!(form("0O17"), (8, "17".to_string()));
        assert_eq!(form("0b101"), (2, "101".to_string()));
        assert_eq!(form("-0x10"), (16, "-10".to_string()));
        assert_eq!(form("+33"), (10, "33".to_string()));
    }

    #[test]
    fn base_zero_legacy_octal() {
        assert_eq!(form("010"), (8, "010".to_string()));
        assert_eq!(form("0"), (10, "0".to_string()));
    }

    #[test]
    fn underscores_between_digits_are_stripped() {
        assert_eq!(form("1_000"), (10, "1000".to_string()));
        assert_eq!(form("0x_ff"), (16, "ff".to_string()));
        // Dangling separators stay put and fail the parse downstream.
        assert_eq!(form("_1"), (10, "_1".to_string()));
        assert_eq!(form("1_"), (10, "1_".to_string()));
    }
}
