//! Record metadata and access.
//!
//! A record exposes a static field table and indexed mutable access to its
//! fields. `#[derive(Target)]` generates both; the resolver turns the table
//! into a decode-name index at decode time.

use std::any::TypeId;

use super::{Target, TypeMeta};

/// Static description of one declared record field.
#[derive(Debug, Clone, Copy)]
pub struct FieldInfo {
    /// Declared field name.
    pub name: &'static str,
    /// Whether the field is visible to callers. The derive always marks
    /// fields exported; hand-written metadata may not.
    pub exported: bool,
    /// Whether the field is an embedded (unnamed) one. Always false from
    /// the derive; hand-written metadata may differ.
    pub anonymous: bool,
    /// `(tag name, tag value)` pairs, e.g. `("qry", "keyA,embed")`.
    pub tags: &'static [(&'static str, &'static str)],
    /// Metadata of the field's type.
    pub ty: fn() -> TypeMeta,
}

impl FieldInfo {
    pub fn tag(&self, name: &str) -> Option<&'static str> {
        self.tags
            .iter()
            .find(|(tag, _)| *tag == name)
            .map(|(_, value)| *value)
    }
}

/// Static description of a record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordMeta {
    pub type_name: &'static str,
    pub type_id: TypeId,
    pub fields: &'static [FieldInfo],
}

/// Runtime access into a record value.
pub trait RecordTarget {
    fn record_meta(&self) -> RecordMeta;

    /// The field at `index` in declaration order.
    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Target>;

    /// Restore every field to its default.
    fn reset(&mut self);
}
