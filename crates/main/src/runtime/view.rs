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
    collections::hash_map::Entry,
    fmt::{Debug, Display, Formatter},
    sync::Arc,
};

use ahash::{AHashMap, AHashSet};

use crate::runtime::{
    Ident,
    MemberDescriptor,
    MemberKind,
    Registry,
    RuntimeError,
    RuntimeResult,
    TypeFamily,
    TypeName,
};

/// A key of the effective member set of a host object handle.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum View {
    /// The untagged view of a class: its public members, including the
    /// members that implement interfaces implicitly, and the public members
    /// of its base classes.
    Concrete(TypeName),

    /// The view of a class through one of its interfaces: only the members
    /// bound to that interface or to the interfaces it extends, including
    /// the explicitly implemented members.
    Capability(TypeName, TypeName),
}

impl Display for View {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concrete(ty) => Display::fmt(ty, formatter),
            Self::Capability(ty, capability) => {
                formatter.write_fmt(format_args!("{ty} as {capability}"))
            }
        }
    }
}

impl View {
    /// The concrete type of the host object.
    #[inline(always)]
    pub fn ty(&self) -> &TypeName {
        match self {
            Self::Concrete(ty) | Self::Capability(ty, _) => ty,
        }
    }

    /// The capability of the view, if any.
    #[inline(always)]
    pub fn capability(&self) -> Option<&TypeName> {
        match self {
            Self::Concrete(_) => None,
            Self::Capability(_, capability) => Some(capability),
        }
    }

    /// The type that the view presents the object as: the capability for
    /// capability views, and the concrete type otherwise.
    #[inline(always)]
    pub fn view_type(&self) -> &TypeName {
        match self {
            Self::Concrete(ty) | Self::Capability(_, ty) => ty,
        }
    }
}

/// The effective member set of a [View].
///
/// Prototypes are computed by the [Registry] on demand and memoized in its
/// [DescriptorCache](crate::runtime::DescriptorCache).
///
/// A member present in the prototype is accessible through the handles of
/// this view. A member absent from the prototype does not exist from the
/// script's point of view, even if the object's class declares it.
pub struct Prototype {
    view: View,
    members: AHashMap<Ident, Arc<MemberDescriptor>>,
}

impl Debug for Prototype {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Prototype")
            .field("view", &self.view)
            .field("members", &self.names())
            .finish()
    }
}

impl Prototype {
    #[inline(always)]
    pub(crate) fn empty(view: View) -> Self {
        Self {
            view,
            members: AHashMap::new(),
        }
    }

    /// Computes the effective member set of the view.
    pub(crate) fn compute(registry: &Registry, view: &View) -> RuntimeResult<Self> {
        let ty = view.ty();
        let meta = registry.type_meta(ty)?;

        if meta.family() != TypeFamily::Class {
            return Err(RuntimeError::mismatch(ty.clone(), "class"));
        }

        let chain = registry.class_chain(ty)?;
        let mut prototype = Self::empty(view.clone());

        match view.capability() {
            None => {
                for class in chain {
                    for member in class.members() {
                        if !member.binding().is_public() {
                            continue;
                        }

                        prototype.include(member);
                    }
                }
            }

            Some(capability) => {
                if !registry.implements(ty, capability) {
                    return Err(RuntimeError::CapabilityNotImplemented {
                        receiver_type: ty.clone(),
                        capability: capability.clone(),
                    });
                }

                let closure = registry
                    .interface_closure(capability)
                    .into_iter()
                    .collect::<AHashSet<_>>();

                for class in chain {
                    for member in class.members() {
                        let Some(bound) = member.binding().capability() else {
                            continue;
                        };

                        if !closure.contains(bound) {
                            continue;
                        }

                        prototype.include(member);
                    }
                }
            }
        }

        Ok(prototype)
    }

    // Members of derived classes are included first. A later method with the
    // same name contributes its overloads; any other later member is shadowed.
    fn include(&mut self, member: &Arc<MemberDescriptor>) {
        match self.members.entry(member.name().clone()) {
            Entry::Vacant(entry) => {
                let _ = entry.insert(member.clone());
            }

            Entry::Occupied(mut entry) => {
                if entry.get().kind() != MemberKind::Method || member.kind() != MemberKind::Method {
                    return;
                }

                let merged = entry.get().merged(member);

                let _ = entry.insert(Arc::new(merged));
            }
        }
    }

    /// The view of this prototype.
    #[inline(always)]
    pub fn view(&self) -> &View {
        &self.view
    }

    /// Returns true if the view has a member with the specified name.
    #[inline(always)]
    pub fn implements_member(&self, name: &str) -> bool {
        self.members.contains_key(name)
    }

    /// Returns the member with the specified name.
    #[inline(always)]
    pub fn member(&self, name: &str) -> Option<&Arc<MemberDescriptor>> {
        self.members.get(name)
    }

    /// Returns the names of all members of the view in alphabetical order.
    pub fn names(&self) -> Vec<&Ident> {
        let mut names = self.members.keys().collect::<Vec<_>>();

        names.sort();

        names
    }

    /// Returns the number of members of the view.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns true if the view has no members.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
