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
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

use crate::runtime::{Ident, MemberDescriptor, MemberKind, TypeName};

/// A primitive numeric type of the host.
///
/// The Script Engine marshals script numbers into one of these kinds, and the
/// [coercion](crate::runtime::Coercion) procedure converts between them with
/// range checking.
///
/// The [Display] implementation prints the Rust-like name of the type (e.g.,
/// `"i16"`), which is also the name of the corresponding registered
/// [TypeMeta].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum NumKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Display for NumKind {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.name())
    }
}

impl NumKind {
    /// All primitive numeric kinds, ordered from the narrowest signed integer
    /// to the widest float.
    pub const ALL: [Self; 10] = [
        Self::I8,
        Self::I16,
        Self::I32,
        Self::I64,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::F32,
        Self::F64,
    ];

    /// Returns the name of the registered host type of this numeric kind.
    #[inline(always)]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
        }
    }

    /// Looks up the numeric kind by the host type name.
    #[inline]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Returns true if this kind is a floating-point number type.
    #[inline(always)]
    pub const fn is_float(self) -> bool {
        match self {
            Self::F32 | Self::F64 => true,
            _ => false,
        }
    }
}

/// A category of host types.
///
/// The family determines how the [coercion](crate::runtime::Coercion)
/// procedure treats the values assigned to a target of this type, and which
/// generic [constraints](crate::runtime::Constraint) the type satisfies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeFamily {
    /// The root reference type `object`. Any data value is assignable to it.
    Object,

    /// A primitive number type.
    Number(NumKind),

    /// The `bool` type.
    Bool,

    /// The `str` type. Strings are references and can be nil.
    Str,

    /// A nominal enumeration type with named discriminants.
    Enum,

    /// A nominal structure type with value semantics.
    Struct,

    /// A class of host objects.
    Class,

    /// An interface (capability) that a class may implement.
    Interface,

    /// An array type `T[]`.
    Array,
}

impl Display for TypeFamily {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object => formatter.write_str("object"),
            Self::Number(kind) => formatter.write_fmt(format_args!("number({kind})")),
            Self::Bool => formatter.write_str("bool"),
            Self::Str => formatter.write_str("str"),
            Self::Enum => formatter.write_str("enum"),
            Self::Struct => formatter.write_str("struct"),
            Self::Class => formatter.write_str("class"),
            Self::Interface => formatter.write_str("interface"),
            Self::Array => formatter.write_str("array"),
        }
    }
}

impl TypeFamily {
    /// Returns true for the families with value semantics: numbers, booleans,
    /// enums, and structs.
    #[inline(always)]
    pub fn is_value(&self) -> bool {
        match self {
            Self::Number(_) | Self::Bool | Self::Enum | Self::Struct => true,
            _ => false,
        }
    }

    /// Returns true for the families with reference semantics. Values of these
    /// types can be nil.
    #[inline(always)]
    pub fn is_reference(&self) -> bool {
        !self.is_value()
    }
}

/// An introspection metadata of a registered host type.
///
/// You cannot create this object directly. Host types are declared with
/// [TypeBuilder](crate::runtime::TypeBuilder) and registered in the
/// [Registry](crate::runtime::Registry), which owns the metadata for the
/// lifetime of the registry.
///
/// The metadata is the raw reflection data of the type: the members the type
/// declares by itself. The effective member sets visible to scripts are
/// derived from this data by the [view selection](crate::runtime::Prototype)
/// procedure.
///
/// The [Display] implementation prints the fully-qualified name of the type.
pub struct TypeMeta {
    pub(crate) name: TypeName,
    pub(crate) doc: Option<&'static str>,
    pub(crate) family: TypeFamily,
    pub(crate) base: Option<TypeName>,
    pub(crate) interfaces: Vec<TypeName>,
    pub(crate) members: Vec<Arc<MemberDescriptor>>,
    pub(crate) contract: Vec<(Ident, MemberKind)>,
    pub(crate) variants: Vec<(Ident, i64)>,
    pub(crate) fields: Vec<(Ident, TypeName)>,
}

impl Debug for TypeMeta {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TypeMeta")
            .field("name", &self.name)
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl Display for TypeMeta {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.name, formatter)
    }
}

impl PartialEq for TypeMeta {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.name.eq(&other.name)
    }
}

impl Eq for TypeMeta {}

impl TypeMeta {
    #[inline(always)]
    pub(crate) fn new(name: TypeName, family: TypeFamily) -> Self {
        Self {
            name,
            doc: None,
            family,
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            contract: Vec::new(),
            variants: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Returns the fully-qualified name of the type.
    #[inline(always)]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Returns the documentation of the type, if specified at registration.
    #[inline(always)]
    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }

    /// Returns the category of this type.
    #[inline(always)]
    pub fn family(&self) -> TypeFamily {
        self.family
    }

    /// Returns the base class of a class type, if any.
    #[inline(always)]
    pub fn base(&self) -> Option<&TypeName> {
        self.base.as_ref()
    }

    /// Returns the interfaces directly implemented by a class, or directly
    /// extended by an interface.
    #[inline(always)]
    pub fn interfaces(&self) -> &[TypeName] {
        &self.interfaces
    }

    /// Returns the members declared by this type itself, excluding inherited
    /// members. For classes, this list includes the members that implement
    /// interfaces, both implicitly and explicitly.
    #[inline(always)]
    pub fn members(&self) -> &[Arc<MemberDescriptor>] {
        &self.members
    }

    /// Returns the members an interface type requires its implementors to
    /// provide. Empty for non-interface types.
    #[inline(always)]
    pub fn contract(&self) -> &[(Ident, MemberKind)] {
        &self.contract
    }

    /// Returns the discriminant of the named variant of an enum type.
    #[inline]
    pub fn variant(&self, name: &str) -> Option<i64> {
        self.variants
            .iter()
            .find(|(variant, _)| variant.as_str() == name)
            .map(|(_, value)| *value)
    }

    /// Returns the named variants of an enum type in declaration order.
    #[inline(always)]
    pub fn variants(&self) -> &[(Ident, i64)] {
        &self.variants
    }

    /// Returns the name of the enum variant with the specified discriminant.
    ///
    /// Returns None if no variant has this discriminant. In particular, the
    /// zero sentinel value does not necessarily have a name.
    #[inline]
    pub fn variant_name(&self, value: i64) -> Option<&Ident> {
        self.variants
            .iter()
            .find(|(_, discriminant)| *discriminant == value)
            .map(|(variant, _)| variant)
    }

    /// Returns the ordered field layout of a struct type.
    #[inline(always)]
    pub fn fields(&self) -> &[(Ident, TypeName)] {
        &self.fields
    }
}
