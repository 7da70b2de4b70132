//! Target implementations for the scalar primitives.

use super::{Kind, Literal, Shape, Target, TypeMeta};

macro_rules! scalar_target {
    ($ty:ty, $kind:expr, $variant:ident, |$slot:ident| $vacant:expr) => {
        impl Target for $ty {
            fn meta() -> TypeMeta {
                TypeMeta::scalar::<$ty>($kind)
            }

            fn dyn_meta(&self) -> TypeMeta {
                <$ty as Target>::meta()
            }

            fn is_vacant(&self) -> bool {
                let $slot = self;
                $vacant
            }

            fn shape(&mut self) -> Shape<'_> {
                Shape::Literal(Literal::$variant(self))
            }
        }
    };
}

scalar_target!(String, Kind::Text, Str, |v| v.is_empty());
scalar_target!(bool, Kind::Bool, Bool, |v| !*v);
scalar_target!(char, Kind::Char, Char, |v| *v == '\0');

scalar_target!(i8, Kind::Int, I8, |v| *v == 0);
scalar_target!(i16, Kind::Int, I16, |v| *v == 0);
scalar_target!(i32, Kind::Int, I32, |v| *v == 0);
scalar_target!(i64, Kind::Int, I64, |v| *v == 0);
scalar_target!(i128, Kind::Int, I128, |v| *v == 0);
scalar_target!(isize, Kind::Int, Isize, |v| *v == 0);

scalar_target!(u8, Kind::Uint, U8, |v| *v == 0);
scalar_target!(u16, Kind::Uint, U16, |v| *v == 0);
scalar_target!(u32, Kind::Uint, U32, |v| *v == 0);
scalar_target!(u64, Kind::Uint, U64, |v| *v == 0);
scalar_target!(u128, Kind::Uint, U128, |v| *v == 0);
scalar_target!(usize, Kind::Uint, Usize, |v| *v == 0);

scalar_target!(f32, Kind::Float, F32, |v| *v == 0.0);
scalar_target!(f64, Kind::Float, F64, |v| *v == 0.0);
