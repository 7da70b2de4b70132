use super::{all_literal, innermost};
use crate::{DecodeText, Decoder, TextError};

// a, b, c, space: one byte each; 三: three bytes, one char.
const INPUT: &str = "abc%20三";

#[test]
fn byte_vectors_take_the_whole_fragment() {
    let mut target: Vec<u8> = vec![1, 2, 3];
    Decoder::new().decode_value(INPUT, &mut target).expect("decodes");
    assert_eq!(target, b"abc \xe4\xb8\x89");
}

#[test]
fn char_vectors_take_the_whole_fragment() {
    let mut target: Vec<char> = Vec::new();
    Decoder::new().decode_value(INPUT, &mut target).expect("decodes");
    assert_eq!(target, ['a', 'b', 'c', ' ', '三']);
}

#[test]
fn byte_arrays_zero_fill_the_tail() {
    let mut target = [0xFFu8; 8];
    Decoder::new().decode_value(INPUT, &mut target).expect("decodes");
    assert_eq!(&target[..7], b"abc \xe4\xb8\x89");
    assert_eq!(target[7], 0);
}

#[test]
fn short_byte_arrays_are_insufficient() {
    let mut target = [0u8; 6];
    let err = Decoder::new()
        .decode_value(INPUT, &mut target)
        .expect_err("seven bytes");
    assert_eq!(innermost(&err), "insufficient destination array length");
}

#[test]
fn char_arrays_check_character_counts() {
    let mut exact = ['x'; 5];
    Decoder::new().decode_value(INPUT, &mut exact).expect("decodes");
    assert_eq!(exact, ['a', 'b', 'c', ' ', '三']);

    let mut short = ['x'; 4];
    let err = Decoder::new()
        .decode_value(INPUT, &mut short)
        .expect_err("five chars");
    assert_eq!(innermost(&err), "insufficient destination array length");
}

#[test]
fn key_level_supports_the_faux_path() {
    let mut target: Vec<u8> = Vec::new();
    Decoder::new().decode_key("k%20A", &mut target).expect("decodes");
    assert_eq!(target, b"k A");
}

/// Stores the first byte of whatever text it is handed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct FirstByte(u8);

impl DecodeText for FirstByte {
    fn decode_text(&mut self, text: &str) -> Result<(), TextError> {
        self.0 = text.bytes().next().unwrap_or(0);
        Ok(())
    }
}

crate::text_target!(FirstByte);

#[test]
fn text_capable_elements_stay_element_wise() {
    // Byte-sized elements with their own decode behavior must not be
    // flattened into a single unescaped blob.
    let decoder = all_literal();

    let mut target: Vec<FirstByte> = Vec::new();
    decoder
        .decode_value_list("%20%20,三三", &mut target)
        .expect("decodes");
    assert_eq!(target, [FirstByte(0x20), FirstByte(0xE4)]);

    let mut fixed = [FirstByte::default(); 2];
    decoder
        .decode_value_list("%20%20,三三", &mut fixed)
        .expect("decodes");
    assert_eq!(fixed, [FirstByte(0x20), FirstByte(0xE4)]);
}
