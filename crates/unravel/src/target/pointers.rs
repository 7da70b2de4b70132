//! Pointer-like targets: `Option<T>` and `Box<T>`.
//!
//! `Option` is the nullable pointer (`None` is vacant); `Box` always holds
//! a pointee, so it is never vacant and replacing it resets the pointee.

use super::{PointerTarget, Shape, Target, TypeMeta};

impl<T: Target + Default> Target for Option<T> {
    fn meta() -> TypeMeta {
        TypeMeta::pointer::<Self>(T::meta)
    }

    fn dyn_meta(&self) -> TypeMeta {
        Self::meta()
    }

    fn is_vacant(&self) -> bool {
        self.is_none()
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Pointer(self)
    }
}

impl<T: Target + Default> PointerTarget for Option<T> {
    fn reset(&mut self) {
        *self = Some(T::default());
    }

    fn ensure(&mut self) {
        if self.is_none() {
            *self = Some(T::default());
        }
    }

    fn pointee_mut(&mut self) -> Option<&mut dyn Target> {
        self.as_mut().map(|v| v as &mut dyn Target)
    }
}

impl<T: Target + Default> Target for Box<T> {
    fn meta() -> TypeMeta {
        TypeMeta::pointer::<Self>(T::meta)
    }

    fn dyn_meta(&self) -> TypeMeta {
        Self::meta()
    }

    fn is_vacant(&self) -> bool {
        false
    }

    fn shape(&mut self) -> Shape<'_> {
        Shape::Pointer(self)
    }
}

impl<T: Target + Default> PointerTarget for Box<T> {
    fn reset(&mut self) {
        **self = T::default();
    }

    fn ensure(&mut self) {}

    fn pointee_mut(&mut self) -> Option<&mut dyn Target> {
        Some(&mut **self)
    }
}
