////////////////////////////////////////////////////////////////////////////////
// This file is part of "Ad Astra", an embeddable scripting programming       //
// language platform.                                                         //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/ad-astra/blob/master/EULA.md               //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use std::fmt::{Debug, Display, Formatter};

use crate::runtime::{
    Cell,
    Downcast,
    NumKind,
    NumberCastCause,
    RuntimeError,
    RuntimeResult,
    TypeName,
    Upcast,
};

/// A primitive number tagged with its host numeric type.
///
/// The [Display] implementation prints the bare value without the type
/// suffix.
#[derive(Clone, Copy, PartialEq)]
pub enum Number {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Debug for Number {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{self}{}", self.kind()))
    }
}

impl Display for Number {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::I8(value) => Display::fmt(value, formatter),
            Self::I16(value) => Display::fmt(value, formatter),
            Self::I32(value) => Display::fmt(value, formatter),
            Self::I64(value) => Display::fmt(value, formatter),
            Self::U8(value) => Display::fmt(value, formatter),
            Self::U16(value) => Display::fmt(value, formatter),
            Self::U32(value) => Display::fmt(value, formatter),
            Self::U64(value) => Display::fmt(value, formatter),
            Self::F32(value) => Display::fmt(value, formatter),
            Self::F64(value) => Display::fmt(value, formatter),
        }
    }
}

// An intermediate representation wide enough to hold any primitive number
// without loss.
#[derive(Clone, Copy)]
enum Wide {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Returns the numeric type of this number.
    #[inline(always)]
    pub fn kind(&self) -> NumKind {
        match self {
            Self::I8(_) => NumKind::I8,
            Self::I16(_) => NumKind::I16,
            Self::I32(_) => NumKind::I32,
            Self::I64(_) => NumKind::I64,
            Self::U8(_) => NumKind::U8,
            Self::U16(_) => NumKind::U16,
            Self::U32(_) => NumKind::U32,
            Self::U64(_) => NumKind::U64,
            Self::F32(_) => NumKind::F32,
            Self::F64(_) => NumKind::F64,
        }
    }

    /// Returns true if the number equals zero (of any numeric type).
    #[inline]
    pub fn is_zero(&self) -> bool {
        match self.widen() {
            Wide::Int(value) => value == 0,
            Wide::Float(value) => value == 0.0,
        }
    }

    /// Returns true if the number has no fractional part. Integers are always
    /// integral; NaN and infinities are not.
    #[inline]
    pub fn is_integral(&self) -> bool {
        match self.widen() {
            Wide::Int(_) => true,
            Wide::Float(value) => value.is_finite() && value.fract() == 0.0,
        }
    }

    /// Returns false for NaN and infinite floats.
    #[inline]
    pub fn is_finite(&self) -> bool {
        match self.widen() {
            Wide::Int(_) => true,
            Wide::Float(value) => value.is_finite(),
        }
    }

    /// Converts this number into the specified numeric type, checking that
    /// the value fits into the target range.
    ///
    /// Float-to-integer conversions truncate the fractional part.
    pub fn cast_to(self, to: NumKind) -> Result<Self, NumberCastCause> {
        if self.kind() == to {
            return Ok(self);
        }

        macro_rules! checked {
            ($variant:ident, $cast:ident) => {
                match self.widen() {
                    Wide::Int(value) => Self::$variant(cast::$cast(value)?),
                    Wide::Float(value) => Self::$variant(cast::$cast(value)?),
                }
            };
        }

        let result = match to {
            NumKind::I8 => checked!(I8, i8),
            NumKind::I16 => checked!(I16, i16),
            NumKind::I32 => checked!(I32, i32),
            NumKind::I64 => checked!(I64, i64),
            NumKind::U8 => checked!(U8, u8),
            NumKind::U16 => checked!(U16, u16),
            NumKind::U32 => checked!(U32, u32),
            NumKind::U64 => checked!(U64, u64),

            NumKind::F32 => match self.widen() {
                Wide::Int(value) => Self::F32(value as f32),

                Wide::Float(value) => {
                    if value.is_finite() && value > f32::MAX as f64 {
                        return Err(NumberCastCause::Overflow);
                    }

                    if value.is_finite() && value < f32::MIN as f64 {
                        return Err(NumberCastCause::Underflow);
                    }

                    Self::F32(value as f32)
                }
            },

            NumKind::F64 => match self.widen() {
                Wide::Int(value) => Self::F64(value as f64),
                Wide::Float(value) => Self::F64(value),
            },
        };

        Ok(result)
    }

    /// Like [cast_to](Self::cast_to), but reports the failure as a
    /// [RuntimeError::NumberCast].
    #[inline]
    pub fn try_cast(self, to: NumKind) -> RuntimeResult<Self> {
        self.cast_to(to).map_err(|cause| RuntimeError::NumberCast {
            from: self.kind(),
            to,
            cause,
            value: self,
        })
    }

    #[inline]
    fn widen(self) -> Wide {
        match self {
            Self::I8(value) => Wide::Int(value as i128),
            Self::I16(value) => Wide::Int(value as i128),
            Self::I32(value) => Wide::Int(value as i128),
            Self::I64(value) => Wide::Int(value as i128),
            Self::U8(value) => Wide::Int(value as i128),
            Self::U16(value) => Wide::Int(value as i128),
            Self::U32(value) => Wide::Int(value as i128),
            Self::U64(value) => Wide::Int(value as i128),
            Self::F32(value) => Wide::Float(value as f64),
            Self::F64(value) => Wide::Float(value),
        }
    }
}

macro_rules! impl_num {
    ($ty:ty, $variant:ident, $kind:ident) => {
        impl From<$ty> for Number {
            #[inline(always)]
            fn from(value: $ty) -> Self {
                Self::$variant(value)
            }
        }

        impl Upcast for $ty {
            #[inline(always)]
            fn upcast(self) -> RuntimeResult<Cell> {
                Ok(Cell::Number(Number::$variant(self)))
            }
        }

        impl Downcast for $ty {
            fn downcast(cell: Cell) -> RuntimeResult<Self> {
                let number = match cell {
                    Cell::Number(number) => number,

                    other => {
                        return Err(RuntimeError::mismatch(
                            other.data_type(),
                            TypeName::from(NumKind::$kind.name()),
                        ));
                    }
                };

                match number.try_cast(NumKind::$kind)? {
                    Number::$variant(value) => Ok(value),

                    // The cast above always produces the requested variant.
                    other => Err(RuntimeError::mismatch(
                        TypeName::from(other.kind().name()),
                        TypeName::from(NumKind::$kind.name()),
                    )),
                }
            }
        }
    };
}

impl_num!(i8, I8, I8);
impl_num!(i16, I16, I16);
impl_num!(i32, I32, I32);
impl_num!(i64, I64, I64);
impl_num!(u8, U8, U8);
impl_num!(u16, U16, U16);
impl_num!(u32, U32, U32);
impl_num!(u64, U64, U64);
impl_num!(f32, F32, F32);
impl_num!(f64, F64, F64);
