//! Percent unescaping.
//!
//! The engine never unescapes on its own authority; it calls whatever
//! function the decoder was configured with. `percent_unescape` is the
//! default: `application/x-www-form-urlencoded` rules, so `+` becomes a
//! space and `%XY` becomes the byte `0xXY`. The decoded bytes must form
//! valid UTF-8.

use std::sync::Arc;

/// An injectable unescape function.
pub type UnescapeFn = Arc<dyn Fn(&str) -> Result<String, UnescapeError> + Send + Sync>;

/// Failure to unescape a fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnescapeError {
    /// A `%` not followed by two hex digits.
    #[error("invalid percent escape '{0}'")]
    InvalidEscape(String),

    /// The decoded bytes are not valid UTF-8.
    #[error("escaped text is not valid utf-8")]
    InvalidUtf8,
}

/// Decode form-urlencoded text: `+` to space, `%XY` to the byte `0xXY`.
pub fn percent_unescape(s: &str) -> Result<String, UnescapeError> {
    let mut out = Vec::with_capacity(s.len());
    let mut bytes = s.bytes().enumerate();

    while let Some((idx, b)) = bytes.next() {
        match b {
            b'+' => out.push(b' '),
            b'%' => {
                let hi = bytes.next().and_then(|(_, b)| hex_digit(b));
                let lo = bytes.next().and_then(|(_, b)| hex_digit(b));
                match (hi, lo) {
                    (Some(hi), Some(lo)) => out.push(hi << 4 | lo),
                    _ => {
                        // idx sits on '%', so this is a char boundary.
                        let snippet: String = s[idx..].chars().take(3).collect();
                        return Err(UnescapeError::InvalidEscape(snippet));
                    }
                }
            }
            _ => out.push(b),
        }
    }

    String::from_utf8(out).map_err(|_| UnescapeError::InvalidUtf8)
}

fn hex_digit(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// The default unescape function, boxed for configuration.
pub(crate) fn default_unescape() -> UnescapeFn {
    Arc::new(percent_unescape)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(percent_unescape("abc").as_deref(), Ok("abc"));
        assert_eq!(percent_unescape("").as_deref(), Ok(""));
    }

    #[test]
    fn escapes_and_plus() {
        assert_eq!(percent_unescape("abc%20xyz").as_deref(), Ok("abc xyz"));
        assert_eq!(percent_unescape("a+b").as_deref(), Ok("a b"));
        assert_eq!(percent_unescape("%41%42").as_deref(), Ok("AB"));
    }

    #[test]
    fn multibyte_sequences() {
        // 三 is 0xE4 0xB8 0x89.
        assert_eq!(percent_unescape("%E4%B8%89").as_deref(), Ok("三"));
        assert_eq!(percent_unescape("abc%20三").as_deref(), Ok("abc 三"));
    }

    #[test]
    fn truncated_or_invalid_escape() {
        assert_eq!(
            percent_unescape("ab%2"),
            Err(UnescapeError::InvalidEscape("%2".to_string()))
        );
        assert_eq!(
            percent_unescape("%zz"),
            Err(UnescapeError::InvalidEscape("%zz".to_string()))
        );
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        assert_eq!(percent_unescape("%FF"), Err(UnescapeError::InvalidUtf8));
    }
}
