//! Decode engine tests, split by handler.

mod faux_tests;
mod trace_tests;

use crate::{DecodeError, Decoder, DecoderBuilder, SetOption};

/// A decoder allowing literals at every level, the baseline most suites
/// run under.
fn all_literal() -> Decoder {
    all_literal_builder().build().expect("valid configuration")
}

fn all_literal_builder() -> DecoderBuilder {
    Decoder::builder().with_all_level_options([SetOption::AllowLiteral])
}

/// Walk an error chain to its innermost cause's message.
fn innermost(err: &DecodeError) -> String {
    let mut cause: &dyn std::error::Error = err;
    while let Some(next) = cause.source() {
        cause = next;
    }
    cause.to_string()
}
