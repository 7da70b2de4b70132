//! The type-erased holder.
//!
//! `Value` is the destination to use when the shape of the input is not
//! known up front. Vacant (`Null`) holders are given the decoding level's
//! natural shape: a query becomes a map, a field a key/values pair, a value
//! list a list, and a key or value plain text. A non-vacant holder keeps
//! its shape and is updated in place.

use std::fmt;

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::level::Level;
use crate::target::{
    FieldInfo, RecordMeta, RecordTarget, Shape, Target, TypeMeta,
};

/// A self-describing decoded value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Field(FieldPair),
}

impl Value {
    /// The natural shape installed when decoding `level` into a vacant or
    /// replaced holder.
    pub(crate) fn fresh(level: Level) -> Value {
        match level {
            Level::Query => Value::Map(IndexMap::new()),
            Level::Field => Value::Field(FieldPair::default()),
            Level::ValueList => Value::List(Vec::new()),
            _ => Value::Text(String::new()),
        }
    }

    /// Mutable access to the held value; `None` for `Null`.
    pub(crate) fn slot_mut(&mut self) -> Option<&mut dyn Target> {
        match self {
            Value::Null => None,
            Value::Text(text) => Some(text),
            Value::List(list) => Some(list),
            Value::Map(map) => Some(map),
            Value::Field(pair) => Some(pair),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl Target for Value {
    fn meta() -> TypeMeta {
        TypeMeta::dynamic::<Value>()
    }

    fn dyn_meta(&self) -> TypeMeta {
        Value::meta()
    }

    fn is_vacant(&self) -> bool {
        self.is_null()
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Dynamic(self)
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Text(text) => serializer.serialize_str(text),
            Value::List(list) => {
                let mut seq = serializer.serialize_seq(Some(list.len()))?;
                for item in list {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
            Value::Field(pair) => pair.serialize(serializer),
        }
    }
}

/// The field-level default shape: one key and its values.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FieldPair {
    pub key: String,
    pub values: Vec<String>,
}

impl fmt::Display for FieldPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.values.join(","))
    }
}

// Hand-written record wiring; the reference for what #[derive(Target)]
// emits.
static FIELD_PAIR_FIELDS: [FieldInfo; 2] = [
    FieldInfo {
        name: "key",
        exported: true,
        anonymous: false,
        tags: &[],
        ty: <String as Target>::meta,
    },
    FieldInfo {
        name: "values",
        exported: true,
        anonymous: false,
        tags: &[],
        ty: <Vec<String> as Target>::meta,
    },
];

fn field_pair_meta() -> RecordMeta {
    RecordMeta {
        type_name: std::any::type_name::<FieldPair>(),
        type_id: std::any::TypeId::of::<FieldPair>(),
        fields: &FIELD_PAIR_FIELDS,
    }
}

impl Target for FieldPair {
    fn meta() -> TypeMeta {
        TypeMeta::record::<FieldPair>(field_pair_meta)
    }

    fn dyn_meta(&self) -> TypeMeta {
        FieldPair::meta()
    }

    fn is_vacant(&self) -> bool {
        self.key.is_vacant() && self.values.is_vacant()
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Record(self)
    }
}

impl RecordTarget for FieldPair {
    fn record_meta(&self) -> RecordMeta {
        field_pair_meta()
    }

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Target> {
        match index {
            0 => Some(&mut self.key),
            1 => Some(&mut self.values),
            _ => None,
        }
    }

    fn reset(&mut self) {
        self.key = String::default();
        self.values = Vec::default();
    }
}
