//! The key-chain resolver.
//!
//! A key may split into a chain of fragments, each reaching one level
//! deeper through nested maps and records. The walk consumes one fragment
//! per keyed step, descends through pointers without consuming, and decodes
//! the value-list into whatever the exhausted chain lands on.

use super::{DecodeState, Decoder};
use crate::error::{DecodeError, ErrorCause};
use crate::level::Level;
use crate::resolve::LocatorStep;
use crate::target::{Kind, MapTarget, RecordTarget, Shape, Target, TypeMeta};
use crate::trace::Tracer;

impl Decoder {
    pub(super) fn decode_chain(
        &self,
        chain: &[&str],
        raw_values: &str,
        node: &mut dyn Target,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        if chain.is_empty() {
            return self.step(Level::ValueList, raw_values, node, state, tr);
        }

        let meta = node.dyn_meta();
        if state.depth >= self.max_depth {
            return Err(DecodeError::at(
                Level::KeyChain,
                chain[0],
                meta,
                ErrorCause::RecursionLimit,
            ));
        }

        match node.shape() {
            Shape::Pointer(ptr) => {
                ptr.ensure();
                let child = state.child(tr);
                match ptr.pointee_mut() {
                    Some(inner) => self.decode_chain(chain, raw_values, inner, child, tr),
                    None => Err(DecodeError::at(
                        Level::KeyChain,
                        chain[0],
                        meta,
                        ErrorCause::Internal("vacant pointer after ensure"),
                    )),
                }
            }
            Shape::Map(map) => self.chain_into_map(map, chain, raw_values, meta, state, tr),
            Shape::Record(record) => {
                self.chain_into_record(record, chain, raw_values, meta, state, tr)
            }
            _ => {
                if self.ignore_invalid_keys {
                    Ok(())
                } else {
                    Err(DecodeError::at(
                        Level::KeyChain,
                        chain[0],
                        meta,
                        ErrorCause::NonIndexable,
                    ))
                }
            }
        }
    }

    /// One keyed step into a map: decode the fragment into a fresh key of
    /// the map's key type, then recurse into the entry slot.
    pub(super) fn chain_into_map(
        &self,
        map: &mut dyn MapTarget,
        chain: &[&str],
        raw_values: &str,
        meta: TypeMeta,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        let Some((&head, rest)) = chain.split_first() else {
            // An empty key with chain separators configured: a value list
            // cannot land on a map.
            return Err(DecodeError::at(
                Level::ValueList,
                raw_values,
                meta,
                ErrorCause::UnsupportedTarget,
            ));
        };

        let mut key = map.new_key();
        let child = state.child(tr);
        self.step(Level::Key, head, key.as_mut(), child, tr)?;

        let child = state.child(tr);
        let Some(slot) = map.entry_mut(key) else {
            return Err(DecodeError::at(
                Level::KeyChain,
                head,
                meta,
                ErrorCause::Internal("map key type mismatch"),
            ));
        };
        self.decode_chain(rest, raw_values, slot, child, tr)
    }

    /// One keyed step into a record: unescape the fragment, look it up in
    /// the record index, then recurse into the located field under its
    /// overrides.
    pub(super) fn chain_into_record(
        &self,
        record: &mut dyn RecordTarget,
        chain: &[&str],
        raw_values: &str,
        meta: TypeMeta,
        state: DecodeState,
        tr: &mut dyn Tracer,
    ) -> Result<(), DecodeError> {
        let Some((&head, rest)) = chain.split_first() else {
            return Err(DecodeError::at(
                Level::ValueList,
                raw_values,
                meta,
                ErrorCause::UnsupportedTarget,
            ));
        };

        let record_meta = record.record_meta();
        let index = self
            .records
            .resolve(&record_meta, &self.tags)
            .map_err(|fe| {
                DecodeError::at(Level::KeyChain, head, meta, ErrorCause::Field(Box::new(fe)))
            })?;

        let key = (self.unescape_fn)(head)
            .map_err(|e| DecodeError::at(Level::KeyChain, head, meta, e.into()))?;

        let Some(resolved) = index.get(&key) else {
            if self.ignore_invalid_keys {
                return Ok(());
            }
            return Err(DecodeError::at(
                Level::KeyChain,
                head,
                meta,
                ErrorCause::UnknownKey(key),
            ));
        };

        let field = locate(record, &resolved.locator)
            .map_err(|msg| DecodeError::at(Level::KeyChain, head, meta, ErrorCause::Internal(msg)))?;

        let child = state.child_with_overrides(tr, Level::ValueList, &resolved.overrides);
        self.decode_chain(rest, raw_values, field, child, tr)
    }
}

/// Walk a locator: index into the record, peel pointers on embed steps,
/// and step through intermediate records.
pub(super) fn locate<'a>(
    record: &'a mut dyn RecordTarget,
    steps: &[LocatorStep],
) -> Result<&'a mut dyn Target, &'static str> {
    let Some((step, rest)) = steps.split_first() else {
        return Err("empty field locator");
    };

    let field = match record.field_mut(step.index) {
        Some(field) => field,
        None => return Err("field locator index out of range"),
    };
    let field = if step.follow_pointer {
        peel(field)?
    } else {
        field
    };

    if rest.is_empty() {
        return Ok(field);
    }

    match field.shape() {
        Shape::Record(inner) => locate(inner, rest),
        _ => Err("field locator step into non-record"),
    }
}

/// Descend through pointer layers, allocating vacant ones.
fn peel<'a>(target: &'a mut dyn Target) -> Result<&'a mut dyn Target, &'static str> {
    if target.dyn_meta().kind != Kind::Pointer {
        return Ok(target);
    }
    match target.shape() {
        Shape::Pointer(ptr) => {
            ptr.ensure();
            match ptr.pointee_mut() {
                Some(inner) => peel(inner),
                None => Err("vacant pointer after ensure"),
            }
        }
        _ => Err("pointer metadata without pointer shape"),
    }
}
