#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Type-directed decoding of delimited query strings.
//!
//! `unravel` maps a query-like input string onto an arbitrary typed
//! destination: scalars, text-decodable leaves, `Option`/`Box`
//! indirections, a dynamic [`Value`] holder, lists, arrays, maps, and
//! records derived with `#[derive(Target)]`. Decoding is recursive in both
//! the input (separator splitting per level) and the destination (following
//! indirections and field locators), with per-level control over
//! replace-vs-update semantics.
//!
//! # Example
//!
//! ```
//! use unravel::{Decoder, Level, SetOption};
//!
//! #[derive(Debug, Default, PartialEq, unravel::Target)]
//! struct Params {
//!     name: String,
//!     tags: Vec<String>,
//!     limit: Option<u32>,
//! }
//!
//! let decoder = Decoder::builder()
//!     .with_level_options(Level::ValueList, [SetOption::AllowLiteral])
//!     .build()?;
//!
//! let mut params = Params::default();
//! decoder.decode_query("name=ada%20lovelace&tags=math,engines&limit=42", &mut params)?;
//!
//! assert_eq!(params.name, "ada lovelace");
//! assert_eq!(params.tags, ["math", "engines"]);
//! assert_eq!(params.limit, Some(42));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The baseline modes expect the container structure natural to each level
//! (a query is fields, a field is a key and a value list, a value list is
//! values); scalar writes at the outer levels are opt-in via
//! [`SetOption::AllowLiteral`], per level or per field through the
//! `qrySet` tag.

// Lets the derive's `::unravel` paths resolve inside this crate's own
// tests.
extern crate self as unravel;

mod convert;
mod decode;
mod error;
mod level;
mod modes;
mod resolve;
mod separator;
mod target;
mod trace;
mod unescape;
mod value;


pub use decode::{Decoder, DecoderBuilder, MarkFn};
pub use error::{
    ConfigError, DecodeError, DecodeInfo, ErrorCause, FieldError, TagError,
};
pub use level::Level;
pub use modes::{LevelModes, SetMode, SetOption};
pub use separator::SeparatorSet;
pub use target::{
    ArrayTarget, DecodeRawText, DecodeText, FieldInfo, Kind, ListTarget, Literal, MapTarget,
    PointerTarget, RawText, RecordMeta, RecordTarget, Shape, Target, TextError, TextShape,
    TypeMeta,
};
pub use trace::{TraceCallback, TraceId, TraceList, TraceTree, Tracer};
pub use unescape::{UnescapeError, UnescapeFn, percent_unescape};
pub use value::{FieldPair, Value};

/// Derives [`Target`] (and record access) for named-field structs.
///
/// Field attributes carry tag strings verbatim: `#[qry("keyA")]`,
/// `#[qry(",embed")]`, `#[qry("-")]`, `#[qry_set("allowLiteral")]`,
/// `#[qry_set("valueList=replaceContainer")]`.
pub use unravel_macros::Target;
