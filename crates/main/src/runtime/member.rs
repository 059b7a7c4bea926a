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

use crate::runtime::{Cell, HostObject, Ident, Overload, RuntimeResult, TypeName};

/// A host-side property read accessor.
pub type Getter = Arc<dyn Fn(&HostObject) -> RuntimeResult<Cell> + Send + Sync + 'static>;

/// A host-side property write accessor.
///
/// The accessor receives a value that has already been
/// [coerced](crate::runtime::Coercion::coerce) to the property type.
pub type Setter = Arc<dyn Fn(&HostObject, Cell) -> RuntimeResult<()> + Send + Sync + 'static>;

/// A kind of a host object member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MemberKind {
    /// A readable and writable property.
    Property,

    /// A property without a setter.
    ReadOnlyProperty,

    /// A plain data field. From the script's point of view, it behaves like
    /// a writable property.
    Field,

    /// A method with one or more overloads.
    Method,

    /// An event that scripts can connect callbacks to.
    Event,
}

impl Display for MemberKind {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Property => "property",
            Self::ReadOnlyProperty => "read-only property",
            Self::Field => "field",
            Self::Method => "method",
            Self::Event => "event",
        })
    }
}

impl MemberKind {
    /// Returns true if the script can assign values to members of this kind.
    #[inline(always)]
    pub fn is_writable(self) -> bool {
        match self {
            Self::Property | Self::Field => true,
            _ => false,
        }
    }

    /// Returns true if members of this kind are accessed through a getter
    /// accessor.
    #[inline(always)]
    pub fn is_data(self) -> bool {
        match self {
            Self::Property | Self::ReadOnlyProperty | Self::Field => true,
            _ => false,
        }
    }
}

/// Describes how a member of a class participates in the class's views.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum MemberBinding {
    /// A public member of the class that does not implement any interface.
    /// Visible on the untagged view only.
    Own,

    /// A member that implements the member of the interface implicitly.
    /// Visible on the untagged view and on the views of the interface (and
    /// of the interfaces extending it).
    Implicit(TypeName),

    /// A member that implements the member of the interface explicitly.
    /// Visible only on the views of the interface (and of the interfaces
    /// extending it).
    Explicit(TypeName),
}

impl MemberBinding {
    /// Returns the interface this member implements, if any.
    #[inline(always)]
    pub fn capability(&self) -> Option<&TypeName> {
        match self {
            Self::Own => None,
            Self::Implicit(capability) | Self::Explicit(capability) => Some(capability),
        }
    }

    /// Returns true if the member is reachable through the untagged view.
    #[inline(always)]
    pub fn is_public(&self) -> bool {
        match self {
            Self::Own | Self::Implicit(_) => true,
            Self::Explicit(_) => false,
        }
    }
}

/// A reflection record of a single host object member.
///
/// Descriptors are created during type registration (see
/// [TypeBuilder](crate::runtime::TypeBuilder)) and are immutable afterwards.
/// The effective views of host objects share descriptors by reference.
#[derive(Clone)]
pub struct MemberDescriptor {
    pub(crate) name: Ident,
    pub(crate) kind: MemberKind,
    pub(crate) declaring: TypeName,
    pub(crate) binding: MemberBinding,
    pub(crate) ty: Option<TypeName>,
    pub(crate) getter: Option<Getter>,
    pub(crate) setter: Option<Setter>,
    pub(crate) overloads: Vec<Overload>,
    pub(crate) doc: Option<&'static str>,
}

impl Debug for MemberDescriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("declaring", &self.declaring)
            .field("binding", &self.binding)
            .field("ty", &self.ty)
            .field("overloads", &self.overloads.len())
            .finish_non_exhaustive()
    }
}

impl Display for MemberDescriptor {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.ty {
            Some(ty) => formatter.write_fmt(format_args!(
                "{} {}.{}: {ty}",
                self.kind, self.declaring, self.name
            )),

            None => {
                formatter.write_fmt(format_args!("{} {}.{}", self.kind, self.declaring, self.name))
            }
        }
    }
}

impl MemberDescriptor {
    #[inline(always)]
    pub(crate) fn new(
        name: Ident,
        kind: MemberKind,
        declaring: TypeName,
        binding: MemberBinding,
    ) -> Self {
        Self {
            name,
            kind,
            declaring,
            binding,
            ty: None,
            getter: None,
            setter: None,
            overloads: Vec::new(),
            doc: None,
        }
    }

    /// The name of the member.
    #[inline(always)]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// The kind of the member.
    #[inline(always)]
    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// The type that declares this member. For extension methods, this is the
    /// extension's receiver type.
    #[inline(always)]
    pub fn declaring(&self) -> &TypeName {
        &self.declaring
    }

    /// The binding of the member to the declaring type's interfaces.
    #[inline(always)]
    pub fn binding(&self) -> &MemberBinding {
        &self.binding
    }

    /// The type of the property or field, or the payload type of the event.
    /// None for methods.
    #[inline(always)]
    pub fn ty(&self) -> Option<&TypeName> {
        self.ty.as_ref()
    }

    /// The overloads of the method, in declaration order. Empty for
    /// non-method members.
    #[inline(always)]
    pub fn overloads(&self) -> &[Overload] {
        &self.overloads
    }

    /// The documentation of the member, if specified at registration.
    #[inline(always)]
    pub fn doc(&self) -> Option<&'static str> {
        self.doc
    }

    /// Returns true if the member has a setter.
    #[inline(always)]
    pub fn is_writable(&self) -> bool {
        self.kind.is_writable() && self.setter.is_some()
    }

    // Appends the overloads of a shadowed method declared by a base class or
    // by another binding of the same class.
    pub(crate) fn merged(&self, other: &Self) -> Self {
        let mut result = self.clone();

        result.overloads.extend(other.overloads.iter().cloned());

        result
    }
}
