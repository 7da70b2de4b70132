//! The recursion core.
//!
//! Every step marks its trace node, then dispatches on the target's shape:
//! indirections first, then literals (text capability, converter, faux
//! path), then containers, with the per-level mode flags gating what may be
//! written where. A shape/level combination with no rule is the
//! unsupported-target error.

use super::{DecodeState, Decoder};
use crate::error::{DecodeError, DecodeInfo, ErrorCause};
use crate::level::Level;
use crate::modes::SetMode;
use crate::target::{
    ArrayTarget, ListTarget, MapTarget, RecordTarget, Shape, Target, TextShape, TypeMeta,
};
use crate::trace::Tracer;
use crate::value::Value;

impl Decoder {
    pub(super) fn step(
        &self,
        level: Level,
        raw: &str,
        target: &mut dyn Target,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        let meta = target.dyn_meta();
        tr.mark(state.node, &DecodeInfo::new(level, raw, meta));

        if state.depth >= self.max_depth {
            return Err(DecodeError::at(level, raw, meta, ErrorCause::RecursionLimit));
        }

        let mode = state.modes.get(level);
        let vacant = target.is_vacant();

        match target.shape() {
            Shape::Pointer(ptr) => {
                if mode.replace_indirect || vacant {
                    ptr.reset();
                }
                let child = state.child(tr);
                match ptr.pointee_mut() {
                    Some(inner) => self.step(level, raw, inner, child, tr),
                    None => Err(DecodeError::at(
                        level,
                        raw,
                        meta,
                        ErrorCause::Internal("vacant pointer after reset"),
                    )),
                }
            }

            Shape::Dynamic(value) => {
                if mode.replace_indirect || vacant {
                    *value = Value::fresh(level);
                }
                let child = state.child(tr);
                match value.slot_mut() {
                    Some(inner) => self.step(level, raw, inner, child, tr),
                    None => Err(DecodeError::at(
                        level,
                        raw,
                        meta,
                        ErrorCause::Internal("vacant dynamic holder after reset"),
                    )),
                }
            }

            Shape::Text(text) => self.apply_text(level, raw, meta, text),

            Shape::Literal(lit) => {
                if mode.allow_literal {
                    self.converter.apply(level, raw, meta, lit)
                } else {
                    Err(DecodeError::at(level, raw, meta, ErrorCause::UnsupportedTarget))
                }
            }

            Shape::List(list) => {
                if mode.allow_literal {
                    if let Some(res) = self.faux_list(level, raw, meta, list) {
                        return res;
                    }
                }
                self.list_container(level, raw, meta, list, mode, vacant, state, tr)
            }

            Shape::Array(array) => {
                if mode.allow_literal {
                    if let Some(res) = self.faux_array(level, raw, meta, array) {
                        return res;
                    }
                }
                self.array_container(level, raw, meta, array, state, tr)
            }

            Shape::Map(map) => self.map_container(level, raw, meta, map, mode, vacant, state, tr),

            Shape::Record(record) => {
                self.record_container(level, raw, meta, record, mode, vacant, state, tr)
            }
        }
    }

    fn apply_text(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        text: TextShape<'_>,
    ) -> Result<(), DecodeError> {
        match text {
            TextShape::Raw(target) => target
                .decode_raw_text(raw)
                .map_err(|e| DecodeError::at(level, raw, meta, ErrorCause::Text(e))),
            TextShape::Unescaped(target) => {
                let unescaped = (self.unescape_fn)(raw)
                    .map_err(|e| DecodeError::at(level, raw, meta, e.into()))?;
                target
                    .decode_text(&unescaped)
                    .map_err(|e| DecodeError::at(level, raw, meta, ErrorCause::Text(e)))
            }
        }
    }

    /// The faux-literal path for `Vec<u8>` / `Vec<char>`: the whole raw
    /// fragment unescapes into the buffer. `None` when the element type
    /// does not qualify.
    fn faux_list(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        list: &mut dyn ListTarget,
    ) -> Option<Result<(), DecodeError>> {
        if list.as_byte_buf().is_none() && list.as_char_buf().is_none() {
            return None;
        }

        let text = match (self.unescape_fn)(raw) {
            Ok(text) => text,
            Err(e) => return Some(Err(DecodeError::at(level, raw, meta, e.into()))),
        };

        if let Some(buf) = list.as_byte_buf() {
            *buf = text.into_bytes();
            return Some(Ok(()));
        }
        if let Some(buf) = list.as_char_buf() {
            *buf = text.chars().collect();
            return Some(Ok(()));
        }
        Some(Err(DecodeError::at(
            level,
            raw,
            meta,
            ErrorCause::Internal("faux buffer vanished"),
        )))
    }

    /// The faux-literal path for `[u8; N]` / `[char; N]`: length-checked,
    /// then the array is rebuilt from zero and the decoded text copied in.
    fn faux_array(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        array: &mut dyn ArrayTarget,
    ) -> Option<Result<(), DecodeError>> {
        if array.as_byte_buf().is_none() && array.as_char_buf().is_none() {
            return None;
        }

        let text = match (self.unescape_fn)(raw) {
            Ok(text) => text,
            Err(e) => return Some(Err(DecodeError::at(level, raw, meta, e.into()))),
        };

        if let Some(buf) = array.as_byte_buf() {
            let bytes = text.as_bytes();
            if bytes.len() > buf.len() {
                return Some(Err(DecodeError::at(
                    level,
                    raw,
                    meta,
                    ErrorCause::InsufficientArray,
                )));
            }
            buf.fill(0);
            buf[..bytes.len()].copy_from_slice(bytes);
            return Some(Ok(()));
        }
        if let Some(buf) = array.as_char_buf() {
            let chars: Vec<char> = text.chars().collect();
            if chars.len() > buf.len() {
                return Some(Err(DecodeError::at(
                    level,
                    raw,
                    meta,
                    ErrorCause::InsufficientArray,
                )));
            }
            buf.fill('\0');
            buf[..chars.len()].copy_from_slice(&chars);
            return Some(Ok(()));
        }
        Some(Err(DecodeError::at(
            level,
            raw,
            meta,
            ErrorCause::Internal("faux buffer vanished"),
        )))
    }

    #[allow(clippy::too_many_arguments)]
    fn list_container(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        list: &mut dyn ListTarget,
        mode: SetMode,
        vacant: bool,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        let (child_level, items) = match level {
            Level::Query => (Level::Field, self.separators.fields.split(raw)),
            Level::ValueList => (Level::Value, self.separators.values.split(raw)),
            _ => return Err(DecodeError::at(level, raw, meta, ErrorCause::UnsupportedTarget)),
        };

        if mode.replace_container || vacant {
            list.clear();
        }

        for item in items {
            let child = state.child(tr);
            let slot = list.append_slot();
            self.step(child_level, item, slot, child, tr)?;
        }
        Ok(())
    }

    fn array_container(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        array: &mut dyn ArrayTarget,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        let (child_level, items) = match level {
            Level::Query => (Level::Field, self.separators.fields.split(raw)),
            Level::ValueList => (Level::Value, self.separators.values.split(raw)),
            _ => return Err(DecodeError::at(level, raw, meta, ErrorCause::UnsupportedTarget)),
        };

        // Fixed storage can only be rebuilt; the mode flags do not apply.
        if items.len() > array.len() {
            return Err(DecodeError::at(level, raw, meta, ErrorCause::InsufficientArray));
        }
        array.reset();

        for (i, item) in items.into_iter().enumerate() {
            let child = state.child(tr);
            let Some(slot) = array.slot_mut(i) else {
                return Err(DecodeError::at(
                    level,
                    raw,
                    meta,
                    ErrorCause::Internal("array slot out of range"),
                ));
            };
            self.step(child_level, item, slot, child, tr)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn map_container(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        map: &mut dyn MapTarget,
        mode: SetMode,
        vacant: bool,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        let raw_fields: Vec<&str> = match level {
            Level::Query => self.separators.fields.split(raw),
            Level::Field => vec![raw],
            _ => return Err(DecodeError::at(level, raw, meta, ErrorCause::UnsupportedTarget)),
        };

        if mode.replace_container || vacant {
            map.clear();
        }

        for raw_field in raw_fields {
            let (raw_key, raw_values) = self.separators.key_vals.pair(raw_field);
            let chain = self.separators.key_chain.split(raw_key);
            self.chain_into_map(map, &chain, raw_values, meta, state, tr)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn record_container(
        &self,
        level: Level,
        raw: &str,
        meta: TypeMeta,
        record: &mut dyn RecordTarget,
        mode: SetMode,
        vacant: bool,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        if level != Level::Query && level != Level::Field {
            return Err(DecodeError::at(level, raw, meta, ErrorCause::UnsupportedTarget));
        }

        if mode.replace_container || vacant {
            record.reset();
        }

        let record_meta = record.record_meta();
        let index = self
            .records
            .resolve(&record_meta, &self.tags)
            .map_err(|fe| DecodeError::at(level, raw, meta, ErrorCause::Field(Box::new(fe))))?;

        match level {
            Level::Query => {
                for raw_field in self.separators.fields.split(raw) {
                    let (raw_key, raw_values) = self.separators.key_vals.pair(raw_field);
                    let chain = self.separators.key_chain.split(raw_key);
                    self.chain_into_record(record, &chain, raw_values, meta, state, tr)?;
                }
                Ok(())
            }
            _ => {
                let (raw_key, raw_values) = self.separators.key_vals.pair(raw);

                if let Some(resolved) = index.get("key") {
                    let field = super::chain::locate(&mut *record, &resolved.locator)
                        .map_err(|msg| DecodeError::at(level, raw, meta, ErrorCause::Internal(msg)))?;
                    let child =
                        state.child_with_overrides(tr, Level::Key, &resolved.overrides);
                    self.step(Level::Key, raw_key, field, child, tr)?;
                }

                if let Some(resolved) = index.get("values") {
                    let field = super::chain::locate(&mut *record, &resolved.locator)
                        .map_err(|msg| DecodeError::at(level, raw, meta, ErrorCause::Internal(msg)))?;
                    let child =
                        state.child_with_overrides(tr, Level::ValueList, &resolved.overrides);
                    self.step(Level::ValueList, raw_values, field, child, tr)?;
                }

                Ok(())
            }
        }
    }
}
