//! Element containers: `Vec<T>` and `[T; N]`.
//!
//! Plain byte and char elements additionally expose their faux-literal
//! buffers through `Any` downcasts, so the engine can treat `Vec<u8>`,
//! `Vec<char>`, and their array forms as a single decoded text when
//! literals are allowed. Element newtypes (including text-decode capable
//! ones) have distinct type ids and never match the downcast, which keeps
//! user-customized element semantics element-wise.

use std::any::Any;

use super::{ArrayTarget, ListTarget, Shape, Target, TypeMeta};

impl<T: Target + Default> Target for Vec<T> {
    fn meta() -> TypeMeta {
        TypeMeta::list::<Self>()
    }

    fn dyn_meta(&self) -> TypeMeta {
        Self::meta()
    }

    fn is_vacant(&self) -> bool {
        self.is_empty()
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::List(self)
    }
}

impl<T: Target + Default> ListTarget for Vec<T> {
    fn elem_meta(&self) -> TypeMeta {
        T::meta()
    }

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn append_slot(&mut self) -> &mut dyn Target {
        self.push(T::default());
        self.last_mut().expect("push yields a last element")
    }

    fn as_byte_buf(&mut self) -> Option<&mut Vec<u8>> {
        (self as &mut dyn Any).downcast_mut()
    }

    fn as_char_buf(&mut self) -> Option<&mut Vec<char>> {
        (self as &mut dyn Any).downcast_mut()
    }
}

impl<T: Target + Default, const N: usize> Target for [T; N] {
    fn meta() -> TypeMeta {
        TypeMeta::array::<Self>()
    }

    fn dyn_meta(&self) -> TypeMeta {
        Self::meta()
    }

    fn is_vacant(&self) -> bool {
        self.iter().all(Target::is_vacant)
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Array(self)
    }
}

impl<T: Target + Default, const N: usize> ArrayTarget for [T; N] {
    fn elem_meta(&self) -> TypeMeta {
        T::meta()
    }

    fn len(&self) -> usize {
        N
    }

    fn reset(&mut self) {
        for slot in self.iter_mut() {
            *slot = T::default();
        }
    }

    fn slot_mut(&mut self, index: usize) -> Option<&mut dyn Target> {
        self.get_mut(index).map(|slot| slot as &mut dyn Target)
    }

    fn as_byte_buf(&mut self) -> Option<&mut [u8]> {
        (self as &mut dyn Any)
            .downcast_mut::<[u8; N]>()
            .map(|arr| arr.as_mut_slice())
    }

    fn as_char_buf(&mut self) -> Option<&mut [char]> {
        (self as &mut dyn Any)
            .downcast_mut::<[char; N]>()
            .map(|arr| arr.as_mut_slice())
    }
}
