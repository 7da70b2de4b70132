//! The decoder: configuration and entry points.
//!
//! A [`Decoder`] is immutable after construction and shareable across
//! threads; each decode call creates fresh call-scoped state. Configuration
//! goes through [`DecoderBuilder`].

mod chain;
mod engine;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use crate::convert::Converter;
use crate::error::{ConfigError, DecodeError, DecodeInfo, ErrorCause};
use crate::level::Level;
use crate::modes::{LevelModes, Overrides, SetOption};
use crate::resolve::{RecordCache, TagNames};
use crate::separator::SeparatorSet;
use crate::target::Target;
use crate::trace::{TraceCallback, TraceId, TraceList, Tracer};
use crate::unescape::{UnescapeError, UnescapeFn, default_unescape};

/// Decoder-configured per-mark trace callback.
pub type MarkFn = Box<dyn Fn(&DecodeInfo) + Send + Sync>;

const DEFAULT_MAX_DEPTH: u32 = 128;

pub(crate) struct Separators {
    pub fields: SeparatorSet,
    pub key_vals: SeparatorSet,
    pub values: SeparatorSet,
    pub key_chain: SeparatorSet,
}

impl Default for Separators {
    fn default() -> Self {
        Separators {
            fields: SeparatorSet::new(['&']),
            key_vals: SeparatorSet::new(['=']),
            values: SeparatorSet::new([',']),
            key_chain: SeparatorSet::empty(),
        }
    }
}

/// Call-scoped recursion state: the active modes and the current trace
/// node. Children fork the trace and inherit the modes.
#[derive(Clone, Copy)]
pub(crate) struct DecodeState {
    pub modes: LevelModes,
    pub node: TraceId,
    pub depth: u32,
}

impl DecodeState {
    fn root(modes: LevelModes) -> Self {
        DecodeState {
            modes,
            node: TraceId::ROOT,
            depth: 0,
        }
    }

    pub fn child(self, tr: &mut dyn Tracer) -> Self {
        DecodeState {
            modes: self.modes,
            node: tr.child(self.node),
            depth: self.depth + 1,
        }
    }

    pub fn child_with_overrides(
        self,
        tr: &mut dyn Tracer,
        default_level: Level,
        overrides: &Overrides,
    ) -> Self {
        DecodeState {
            modes: self.modes.overlaid(default_level, overrides),
            node: tr.child(self.node),
            depth: self.depth + 1,
        }
    }
}

/// Decodes delimited query-like strings into typed destinations.
pub struct Decoder {
    pub(crate) separators: Separators,
    pub(crate) modes: LevelModes,
    pub(crate) converter: Converter,
    pub(crate) unescape_fn: UnescapeFn,
    pub(crate) ignore_invalid_keys: bool,
    pub(crate) max_depth: u32,
    pub(crate) tags: TagNames,
    mark: Option<MarkFn>,
    pub(crate) records: RecordCache,
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("modes", &self.modes)
            .field("ignore_invalid_keys", &self.ignore_invalid_keys)
            .field("max_depth", &self.max_depth)
            .field("has_mark", &self.mark.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Decoder::new()
    }
}

impl Decoder {
    /// A decoder with the default configuration.
    pub fn new() -> Self {
        DecoderBuilder::new()
            .build()
            .expect("default configuration is valid")
    }

    pub fn builder() -> DecoderBuilder {
        DecoderBuilder::new()
    }

    /// Run the configured unescape function.
    pub fn unescape(&self, s: &str) -> Result<String, UnescapeError> {
        (self.unescape_fn)(s)
    }

    /// Decode `input` into `target`, entering the recursion at `level`.
    pub fn decode<T: Target>(
        &self,
        level: Level,
        input: &str,
        target: &mut T,
    ) -> Result<(), DecodeError> {
        self.decode_traced(level, input, target, &mut [])
    }

    /// Like [`decode`](Decoder::decode), with additional trace sinks for
    /// this call. The decoder's own mark callback, if configured, runs
    /// alongside them.
    pub fn decode_traced<T: Target>(
        &self,
        level: Level,
        input: &str,
        target: &mut T,
        traces: &mut [&mut dyn Tracer],
    ) -> Result<(), DecodeError> {
        let mut own = self
            .mark
            .as_ref()
            .map(|mark| TraceCallback::new(move |info: &DecodeInfo| mark(info)));

        let mut sinks: Vec<&mut dyn Tracer> = Vec::with_capacity(traces.len() + 1);
        for sink in traces.iter_mut() {
            sinks.push(&mut **sink);
        }
        if let Some(cb) = own.as_mut() {
            sinks.push(cb);
        }

        let mut tracer = TraceList::new(sinks);
        self.run(level, input, target, &mut tracer)
    }

    pub fn decode_query<T: Target>(&self, input: &str, target: &mut T) -> Result<(), DecodeError> {
        self.decode(Level::Query, input, target)
    }

    pub fn decode_field<T: Target>(&self, input: &str, target: &mut T) -> Result<(), DecodeError> {
        self.decode(Level::Field, input, target)
    }

    pub fn decode_key<T: Target>(&self, input: &str, target: &mut T) -> Result<(), DecodeError> {
        self.decode(Level::Key, input, target)
    }

    pub fn decode_value_list<T: Target>(
        &self,
        input: &str,
        target: &mut T,
    ) -> Result<(), DecodeError> {
        self.decode(Level::ValueList, input, target)
    }

    pub fn decode_value<T: Target>(&self, input: &str, target: &mut T) -> Result<(), DecodeError> {
        self.decode(Level::Value, input, target)
    }

    fn run(
        &self,
        level: Level,
        input: &str,
        target: &mut dyn Target,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        if !level.is_public() {
            return Err(DecodeError::at(
                Level::Root,
                input,
                target.dyn_meta(),
                ErrorCause::InvalidEntryLevel(level),
            ));
        }
        let state = DecodeState::root(self.modes);
        self.step(level, input, target, state, tr)
    }
}

/// Builder for [`Decoder`].
pub struct DecoderBuilder {
    integer_base: u32,
    unescape: UnescapeFn,
    ignore_invalid_keys: bool,
    max_depth: u32,
    separators: Separators,
    level_opts: Vec<(Level, Vec<SetOption>)>,
    tags: TagNames,
    mark: Option<MarkFn>,
}

impl Default for DecoderBuilder {
    fn default() -> Self {
        DecoderBuilder::new()
    }
}

impl DecoderBuilder {
    pub fn new() -> Self {
        DecoderBuilder {
            integer_base: 0,
            unescape: default_unescape(),
            ignore_invalid_keys: false,
            max_depth: DEFAULT_MAX_DEPTH,
            separators: Separators::default(),
            level_opts: Vec::new(),
            tags: TagNames::default(),
            mark: None,
        }
    }

    /// Base for integer parses; 0 infers `0x`/`0o`/`0b` prefixes.
    pub fn with_integer_base(mut self, base: u32) -> Self {
        self.integer_base = base;
        self
    }

    /// Replace the percent-unescape function.
    pub fn with_unescape<F>(mut self, unescape: F) -> Self
    where
        F: Fn(&str) -> Result<String, UnescapeError> + Send + Sync + 'static,
    {
        self.unescape = Arc::new(unescape);
        self
    }

    /// Turn key-chain `unknown key` and `non-indexable` failures into
    /// silent success.
    pub fn with_ignore_invalid_keys(mut self, ignore: bool) -> Self {
        self.ignore_invalid_keys = ignore;
        self
    }

    /// Bound the decode recursion depth.
    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_field_separators(mut self, seps: impl IntoIterator<Item = char>) -> Self {
        self.separators.fields = SeparatorSet::new(seps);
        self
    }

    pub fn with_key_val_separators(mut self, seps: impl IntoIterator<Item = char>) -> Self {
        self.separators.key_vals = SeparatorSet::new(seps);
        self
    }

    pub fn with_value_separators(mut self, seps: impl IntoIterator<Item = char>) -> Self {
        self.separators.values = SeparatorSet::new(seps);
        self
    }

    pub fn with_key_chain_separators(mut self, seps: impl IntoIterator<Item = char>) -> Self {
        self.separators.key_chain = SeparatorSet::new(seps);
        self
    }

    /// Apply options to one level's baseline mode. The level must be
    /// public; [`build`](DecoderBuilder::build) rejects internal levels.
    pub fn with_level_options(
        mut self,
        level: Level,
        opts: impl IntoIterator<Item = SetOption>,
    ) -> Self {
        self.level_opts.push((level, opts.into_iter().collect()));
        self
    }

    /// Apply options to every public level.
    pub fn with_all_level_options(mut self, opts: impl IntoIterator<Item = SetOption>) -> Self {
        let opts: Vec<SetOption> = opts.into_iter().collect();
        for level in Level::PUBLIC {
            self.level_opts.push((level, opts.clone()));
        }
        self
    }

    /// Rename the base and set record tags.
    pub fn with_tag_names(mut self, base: impl Into<String>, set: impl Into<String>) -> Self {
        self.tags = TagNames {
            base: base.into(),
            set: set.into(),
        };
        self
    }

    /// Observe every decode step through a callback carried by the decoder.
    pub fn with_mark<F>(mut self, mark: F) -> Self
    where
        F: Fn(&DecodeInfo) + Send + Sync + 'static,
    {
        self.mark = Some(Box::new(mark));
        self
    }

    pub fn build(self) -> Result<Decoder, ConfigError> {
        if self.integer_base != 0 && !(2..=36).contains(&self.integer_base) {
            return Err(ConfigError::InvalidIntegerBase(self.integer_base));
        }

        let mut modes = LevelModes::default();
        for (level, opts) in &self.level_opts {
            if !level.is_public() {
                return Err(ConfigError::InvalidSetLevel(*level));
            }
            modes = modes.with(*level, opts);
        }

        Ok(Decoder {
            converter: Converter {
                integer_base: self.integer_base,
                unescape: Arc::clone(&self.unescape),
            },
            unescape_fn: self.unescape,
            separators: self.separators,
            modes,
            ignore_invalid_keys: self.ignore_invalid_keys,
            max_depth: self.max_depth,
            tags: self.tags,
            mark: self.mark,
            records: RecordCache::default(),
        })
    }
}
