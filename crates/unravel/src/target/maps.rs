//! Keyed containers: `IndexMap`, `HashMap`, `BTreeMap`.
//!
//! Keys are produced as boxed fresh defaults for the engine to decode at
//! the `Key` level, then downcast back on lookup. Entries are created from
//! the element default when absent and decoded in place either way.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

use indexmap::IndexMap;

use super::{MapTarget, Shape, Target, TypeMeta};

macro_rules! map_target {
    ($map:ident, $($key_bounds:tt)+) => {
        impl<K, V> Target for $map<K, V>
        where
            K: Target + Default + $($key_bounds)+,
            V: Target + Default,
        {
            fn meta() -> TypeMeta {
                TypeMeta::map::<Self>()
            }

            fn dyn_meta(&self) -> TypeMeta {
                Self::meta()
            }

            fn is_vacant(&self) -> bool {
                self.is_empty()
            }

            fn shape(&mut self) -> Shape<'_> {
                Shape::Map(self)
            }
        }

        impl<K, V> MapTarget for $map<K, V>
        where
            K: Target + Default + $($key_bounds)+,
            V: Target + Default,
        {
            fn key_meta(&self) -> TypeMeta {
                K::meta()
            }

            fn elem_meta(&self) -> TypeMeta {
                V::meta()
            }

            fn clear(&mut self) {
                $map::clear(self);
            }

            fn new_key(&self) -> Box<dyn Target> {
                Box::new(K::default())
            }

            fn entry_mut(&mut self, key: Box<dyn Target>) -> Option<&mut dyn Target> {
                let key: Box<dyn Any> = key;
                let key = key.downcast::<K>().ok()?;
                Some(self.entry(*key).or_insert_with(V::default))
            }
        }
    };
}

map_target!(IndexMap, Eq + Hash);
map_target!(HashMap, Eq + Hash);
map_target!(BTreeMap, Ord);
