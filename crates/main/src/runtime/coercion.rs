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

use crate::runtime::{
    BridgeConfig,
    Cell,
    EnumValue,
    MemberDescriptor,
    Registry,
    RuntimeError,
    RuntimeResult,
    TypeFamily,
    TypeName,
};

/// A trait that casts Script data into Rust data.
///
/// By implementing the Downcast trait on a Rust type, you make this type
/// usable in the host-side property accessors and method invokers (see
/// [TypeBuilder](crate::runtime::TypeBuilder) and
/// [Call::take](crate::runtime::Call::take)).
///
/// The opposite operation of transforming Rust data into Script data is
/// provided through the separate [Upcast] trait.
///
/// The crate implements this trait for the primitive numeric types (with
/// range-checked conversion between them), `bool`, `String`, `Option<T>`,
/// `Vec<T>` (from arrays), and the value types of the [Cell] model.
pub trait Downcast: Sized {
    /// Converts the Cell into a Rust value.
    fn downcast(cell: Cell) -> RuntimeResult<Self>;
}

/// A trait that casts Rust data into Script data.
///
/// This is the opposite operation of [Downcast].
pub trait Upcast {
    /// Converts the Rust value into a Cell.
    fn upcast(self) -> RuntimeResult<Cell>;
}

/// A kind of conversion that the coercion of a value into a target type
/// requires.
///
/// The overload resolution prefers candidates whose arguments do not
/// require [Numeric](Conversion::Numeric) conversions.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Conversion {
    /// The value already has the target type.
    Exact,

    /// The value is a number of another numeric type, or the zero sentinel
    /// assigned to an enum target.
    Numeric,

    /// The value is nil, or a reference of a type assignable to the target
    /// (e.g., an object of a class implementing the target interface).
    Reference,
}

/// The Coercion Engine: converts script values into the exact host types
/// required by method parameters and member assignments.
///
/// Coercion is a pure function of its inputs. It never mutates host state;
/// a failed coercion leaves everything as it was.
#[derive(Clone, Copy)]
pub struct Coercion<'a> {
    registry: &'a Registry,
    config: &'a BridgeConfig,
}

impl<'a> Coercion<'a> {
    #[inline(always)]
    pub fn new(registry: &'a Registry, config: &'a BridgeConfig) -> Self {
        Self { registry, config }
    }

    /// Checks whether the value can be coerced into the target type without
    /// performing the coercion, and reports the kind of conversion needed.
    ///
    /// The check of numeric values includes the range check, so a successful
    /// check guarantees that [coerce](Self::coerce) succeeds too.
    pub fn check(&self, value: &Cell, target: &TypeName) -> RuntimeResult<Conversion> {
        let family = self.registry.family(target)?;

        match family {
            TypeFamily::Object => match value {
                Cell::Nil => Ok(Conversion::Reference),

                Cell::Bool(_)
                | Cell::Number(_)
                | Cell::Str(_)
                | Cell::Enum(_)
                | Cell::Struct(_)
                | Cell::Array(_)
                | Cell::Object(_) => Ok(Conversion::Reference),

                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Number(kind) => match value {
                Cell::Number(number) if number.kind() == kind => Ok(Conversion::Exact),

                Cell::Number(number) => {
                    // NaN and infinities fall through to the cast failure.
                    if !kind.is_float() && number.kind().is_float() && number.is_finite() {
                        if !self.config.integral_float_narrowing || !number.is_integral() {
                            return Err(RuntimeError::mismatch(value.data_type(), target));
                        }
                    }

                    let _ = number.try_cast(kind)?;

                    Ok(Conversion::Numeric)
                }

                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Bool => match value {
                Cell::Bool(_) => Ok(Conversion::Exact),
                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Str => match value {
                Cell::Str(_) => Ok(Conversion::Exact),
                Cell::Nil => Ok(Conversion::Reference),
                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Enum => match value {
                Cell::Enum(enum_value) if &enum_value.ty == target => Ok(Conversion::Exact),

                Cell::Number(number) if self.config.zero_enum_sentinel && number.is_zero() => {
                    Ok(Conversion::Numeric)
                }

                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Struct => match value {
                Cell::Struct(struct_value) if &struct_value.ty == target => Ok(Conversion::Exact),
                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Array => match value {
                Cell::Nil => Ok(Conversion::Reference),

                Cell::Array(array) if Some(array.element()) == target.element().as_ref() => {
                    Ok(Conversion::Exact)
                }

                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },

            TypeFamily::Class | TypeFamily::Interface => match value {
                Cell::Nil => Ok(Conversion::Reference),

                Cell::Object(object) if object.ty() == target => Ok(Conversion::Exact),

                Cell::Object(object) if self.registry.is_assignable(object.ty(), target) => {
                    Ok(Conversion::Reference)
                }

                _ => Err(RuntimeError::mismatch(value.data_type(), target)),
            },
        }
    }

    /// Converts the value into the target type.
    ///
    /// Numbers are converted into the target numeric type, and the zero
    /// sentinel assigned to an enum target becomes the zero value of that
    /// enum. Other values pass through unchanged.
    pub fn coerce(&self, value: Cell, target: &TypeName) -> RuntimeResult<Cell> {
        let conversion = self.check(&value, target)?;

        if conversion != Conversion::Numeric {
            return Ok(value);
        }

        match (self.registry.family(target)?, value) {
            (TypeFamily::Number(kind), Cell::Number(number)) => {
                Ok(Cell::Number(number.try_cast(kind)?))
            }

            (TypeFamily::Enum, Cell::Number(_)) => Ok(Cell::Enum(EnumValue::new(target, 0))),

            (_, value) => Ok(value),
        }
    }

    /// Coerces the value assigned to the member into the member's type.
    ///
    /// Fails with [RuntimeError::ReadOnly] if the member cannot be written,
    /// regardless of the value.
    pub fn assign(&self, member: &MemberDescriptor, value: Cell) -> RuntimeResult<Cell> {
        if !member.is_writable() {
            return Err(RuntimeError::ReadOnly {
                receiver_type: member.declaring().clone(),
                member: member.name().clone(),
            });
        }

        match member.ty() {
            Some(ty) => self.coerce(value, ty),
            None => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        BridgeConfig,
        Cell,
        Coercion,
        Conversion,
        EnumValue,
        ErrorKind,
        HostArray,
        Number,
        Registry,
        StructValue,
        TypeBuilder,
        TypeName,
    };

    fn registry() -> Registry {
        Registry::builder()
            .register(
                TypeBuilder::enumeration("Test.TestEnum")
                    .variant("First", 1)
                    .variant("Second", 2),
            )
            .register(TypeBuilder::structure("Test.TimeSpan").layout_field("ticks", "i64"))
            .register(TypeBuilder::structure("Test.DateTime").layout_field("ticks", "i64"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_numeric_coercion() {
        let registry = registry();
        let config = BridgeConfig::new();
        let coercion = Coercion::new(&registry, &config);
        let target = TypeName::from("i16");

        assert_eq!(
            coercion.check(&Cell::Number(Number::I16(1)), &target).ok(),
            Some(Conversion::Exact),
        );

        assert_eq!(
            coercion.coerce(Cell::Number(Number::I32(4321)), &target).ok(),
            Some(Cell::Number(Number::I16(4321))),
        );

        assert_eq!(
            coercion
                .coerce(Cell::Number(Number::I32(54321)), &target)
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::Overflow),
        );

        assert_eq!(
            coercion
                .coerce(Cell::Number(Number::F64(2.5)), &target)
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::TypeMismatch),
        );

        assert_eq!(
            coercion
                .coerce(Cell::Number(Number::F64(f64::NAN)), &target)
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::Overflow),
        );

        assert_eq!(
            coercion
                .coerce(Cell::Enum(EnumValue::new("Test.TestEnum", 1)), &target)
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::TypeMismatch),
        );
    }

    #[test]
    fn test_enum_sentinel() {
        let registry = registry();
        let mut config = BridgeConfig::new();
        let target = TypeName::from("Test.TestEnum");

        {
            let coercion = Coercion::new(&registry, &config);

            assert_eq!(
                coercion.coerce(Cell::Number(Number::I32(0)), &target).ok(),
                Some(Cell::Enum(EnumValue::new("Test.TestEnum", 0))),
            );

            assert_eq!(
                coercion
                    .check(&Cell::Number(Number::I32(1)), &target)
                    .err()
                    .map(|error| error.kind()),
                Some(ErrorKind::TypeMismatch),
            );
        }

        config.zero_enum_sentinel = false;

        let coercion = Coercion::new(&registry, &config);

        assert_eq!(
            coercion
                .check(&Cell::Number(Number::I32(0)), &target)
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::TypeMismatch),
        );
    }

    #[test]
    fn test_nominal_identity() {
        let registry = registry();
        let config = BridgeConfig::new();
        let coercion = Coercion::new(&registry, &config);

        let span = Cell::Struct(StructValue::new("Test.TimeSpan", [Cell::Number(Number::I64(1))]));
        let date = Cell::Struct(StructValue::new("Test.DateTime", [Cell::Number(Number::I64(1))]));

        assert!(coercion.check(&span, &"Test.TimeSpan".into()).is_ok());
        assert!(coercion.check(&date, &"Test.TimeSpan".into()).is_err());
        assert!(coercion.check(&Cell::Nil, &"Test.TimeSpan".into()).is_err());

        let ints = Cell::Array(HostArray::new("i32", Vec::new()));
        let floats = Cell::Array(HostArray::new("f64", Vec::new()));

        assert!(coercion.check(&ints, &"i32[]".into()).is_ok());
        assert!(coercion.check(&Cell::Nil, &"i32[]".into()).is_ok());

        assert_eq!(
            coercion
                .check(&floats, &"i32[]".into())
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::TypeMismatch),
        );

        assert_eq!(
            coercion.check(&floats, &"object".into()).ok(),
            Some(Conversion::Reference),
        );
    }
}
