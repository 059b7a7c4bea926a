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

use std::{
    fmt::{Debug, Formatter},
    sync::Arc,
};

use compact_str::CompactString;

use crate::runtime::{
    Connection,
    Downcast,
    HostArray,
    HostObject,
    Ident,
    Number,
    RuntimeResult,
    ScriptEvent,
    TypeName,
    Upcast,
};

/// A script value crossing the boundary between the Script Engine and the
/// host.
///
/// Value-like cells (booleans, numbers, strings, enums, structs, and type
/// witnesses) compare structurally. Reference-like cells (arrays, host
/// objects, functions, bound methods, events, and connections) compare by
/// identity.
///
/// The [Default] cell is [Nil](Cell::Nil).
#[derive(Clone, Default)]
pub enum Cell {
    /// The absence of a value.
    #[default]
    Nil,

    /// A boolean value.
    Bool(bool),

    /// A primitive number tagged with its numeric type.
    Number(Number),

    /// A string.
    Str(CompactString),

    /// A value of a host enum type.
    Enum(EnumValue),

    /// A value of a host struct type.
    Struct(StructValue),

    /// A host array.
    Array(HostArray),

    /// A handle of a host object.
    Object(HostObject),

    /// A type witness: a value that names a host type (e.g., the `TestEnum`
    /// in `obj.Method(TestEnum, 4)`).
    Type(TypeName),

    /// A script callback.
    Function(ScriptFn),

    /// A method of a host object bound to the handle it has been read
    /// through.
    Method(BoundMethod),

    /// A connectable projection of a host event.
    Event(ScriptEvent),

    /// A live link between a host event and a script callback.
    Connection(Connection),
}

impl Debug for Cell {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nil => formatter.write_str("nil"),
            Self::Bool(value) => Debug::fmt(value, formatter),
            Self::Number(value) => Debug::fmt(value, formatter),
            Self::Str(value) => Debug::fmt(value.as_str(), formatter),
            Self::Enum(value) => Debug::fmt(value, formatter),
            Self::Struct(value) => Debug::fmt(value, formatter),
            Self::Array(value) => Debug::fmt(value, formatter),
            Self::Object(value) => Debug::fmt(value, formatter),
            Self::Type(value) => formatter.write_fmt(format_args!("type {value}")),
            Self::Function(_) => formatter.write_str("fn"),
            Self::Method(value) => Debug::fmt(value, formatter),
            Self::Event(value) => Debug::fmt(value, formatter),
            Self::Connection(value) => Debug::fmt(value, formatter),
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(this), Self::Bool(other)) => this == other,
            (Self::Number(this), Self::Number(other)) => this == other,
            (Self::Str(this), Self::Str(other)) => this == other,
            (Self::Enum(this), Self::Enum(other)) => this == other,
            (Self::Struct(this), Self::Struct(other)) => this == other,
            (Self::Array(this), Self::Array(other)) => this == other,
            (Self::Object(this), Self::Object(other)) => this.same_instance(other),
            (Self::Type(this), Self::Type(other)) => this == other,
            (Self::Function(this), Self::Function(other)) => this == other,
            (Self::Method(this), Self::Method(other)) => this == other,
            (Self::Event(this), Self::Event(other)) => this == other,
            (Self::Connection(this), Self::Connection(other)) => this == other,
            _ => false,
        }
    }
}

impl Cell {
    /// Converts a Rust value into a Cell.
    #[inline(always)]
    pub fn give(data: impl Upcast) -> RuntimeResult<Self> {
        data.upcast()
    }

    /// Converts this Cell into a Rust value.
    #[inline(always)]
    pub fn take<T: Downcast>(self) -> RuntimeResult<T> {
        T::downcast(self)
    }

    /// Returns true if the Cell is [Nil](Cell::Nil).
    #[inline(always)]
    pub fn is_nil(&self) -> bool {
        match self {
            Self::Nil => true,
            _ => false,
        }
    }

    /// Returns the name of the data type of this value, as it appears in
    /// error messages.
    ///
    /// For host objects, this is the concrete type of the object, regardless
    /// of the handle's capability tag.
    pub fn data_type(&self) -> TypeName {
        match self {
            Self::Nil => TypeName::from("nil"),
            Self::Bool(_) => TypeName::from("bool"),
            Self::Number(value) => TypeName::from(value.kind().name()),
            Self::Str(_) => TypeName::from("str"),
            Self::Enum(value) => value.ty.clone(),
            Self::Struct(value) => value.ty.clone(),
            Self::Array(value) => value.ty(),
            Self::Object(value) => value.ty().clone(),
            Self::Type(_) => TypeName::from("type"),
            Self::Function(_) => TypeName::from("fn"),
            Self::Method(_) => TypeName::from("method"),
            Self::Event(_) => TypeName::from("event"),
            Self::Connection(_) => TypeName::from("connection"),
        }
    }

    /// Returns the host type that generic type inference assigns to this
    /// value.
    ///
    /// For capability-tagged object handles, this is the capability type.
    /// Returns None for nil, type witnesses, and script-only values.
    pub fn runtime_type(&self) -> Option<TypeName> {
        match self {
            Self::Nil => None,
            Self::Bool(_) | Self::Number(_) | Self::Str(_) => Some(self.data_type()),
            Self::Enum(_) | Self::Struct(_) | Self::Array(_) => Some(self.data_type()),
            Self::Object(value) => Some(value.view_type().clone()),
            _ => None,
        }
    }
}

/// A value of a host enum type: the enum's type name and the discriminant.
///
/// The discriminant does not necessarily correspond to a named variant of
/// the enum (e.g., the zero value of an enum without a zero variant).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct EnumValue {
    /// The enum type.
    pub ty: TypeName,

    /// The discriminant.
    pub value: i64,
}

impl EnumValue {
    /// Creates an enum value.
    #[inline(always)]
    pub fn new(ty: impl Into<TypeName>, value: i64) -> Self {
        Self {
            ty: ty.into(),
            value,
        }
    }
}

/// A value of a host struct type: the struct's type name and the ordered
/// field values.
///
/// Struct values have value semantics. Two struct values are equal if they
/// have the same type and equal fields.
#[derive(Clone, PartialEq, Debug)]
pub struct StructValue {
    /// The struct type.
    pub ty: TypeName,

    /// The field values in the order of the struct's layout.
    pub fields: Arc<[Cell]>,
}

impl StructValue {
    /// Creates a struct value.
    #[inline]
    pub fn new(ty: impl Into<TypeName>, fields: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            ty: ty.into(),
            fields: fields.into_iter().collect(),
        }
    }

    /// Returns the value of the field with the specified layout index.
    #[inline(always)]
    pub fn field(&self, index: usize) -> Option<&Cell> {
        self.fields.get(index)
    }
}

/// A script callback.
///
/// Two ScriptFn objects are equal if they are clones of the same callback.
#[derive(Clone)]
pub struct ScriptFn(Arc<dyn Fn(&[Cell]) -> RuntimeResult<Cell> + Send + Sync + 'static>);

impl PartialEq for ScriptFn {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Debug for ScriptFn {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("ScriptFn")
    }
}

impl ScriptFn {
    /// Wraps a Rust closure into a script callback.
    #[inline(always)]
    pub fn new(function: impl Fn(&[Cell]) -> RuntimeResult<Cell> + Send + Sync + 'static) -> Self {
        Self(Arc::new(function))
    }

    /// Calls the callback.
    #[inline(always)]
    pub fn call(&self, args: &[Cell]) -> RuntimeResult<Cell> {
        (self.0)(args)
    }
}

/// A method of a host object read as a value (e.g., `let m = obj.Method;`).
///
/// Invoke it with [Bridge::call](crate::runtime::Bridge::call).
#[derive(Clone, Debug)]
pub struct BoundMethod {
    /// The handle through which the method has been read. Overload
    /// resolution of the call uses the effective view of this handle.
    pub receiver: HostObject,

    /// The name of the method.
    pub name: Ident,
}

impl PartialEq for BoundMethod {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.receiver == other.receiver && self.name == other.name
    }
}
