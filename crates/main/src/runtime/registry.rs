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
    marker::PhantomData,
    sync::Arc,
};

use ahash::{AHashMap, AHashSet};
use log::debug;

use crate::runtime::{
    Call,
    CandidateOrigin,
    Cell,
    Constraint,
    DescriptorCache,
    Downcast,
    HostObject,
    Ident,
    MemberBinding,
    MemberDescriptor,
    MemberKind,
    NumKind,
    Overload,
    ParamType,
    Prototype,
    RegistrationError,
    RuntimeError,
    RuntimeResult,
    Signature,
    TypeFamily,
    TypeMeta,
    TypeName,
    Upcast,
    View,
};

/// A collection of host types visible to scripts, together with the
/// extension methods registered over them.
///
/// The Registry is immutable once built (see [RegistryBuilder]). It answers
/// reflection queries about the registered types, computes the effective
/// member sets of host object views, and memoizes them in its
/// [DescriptorCache].
///
/// The primitive types `i8`, `i16`, `i32`, `i64`, `u8`, `u16`, `u32`, `u64`,
/// `f32`, `f64`, `bool`, `str`, and the root reference type `object` are
/// always registered. Any registered type `T` implicitly gives rise to the
/// array type `T[]`.
pub struct Registry {
    types: AHashMap<TypeName, TypeMeta>,
    extensions: Vec<Arc<MemberDescriptor>>,
    cache: DescriptorCache,
}

impl Debug for Registry {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Registry")
            .field("types", &self.types.len())
            .field("extensions", &self.extensions.len())
            .field("cache", &self.cache)
            .finish()
    }
}

impl Registry {
    /// Starts a new registration.
    #[inline(always)]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the metadata of a registered type.
    ///
    /// Array types do not have metadata of their own.
    pub fn type_meta(&self, name: &TypeName) -> RuntimeResult<&TypeMeta> {
        match self.types.get(name) {
            Some(meta) => Ok(meta),
            None => Err(RuntimeError::UnknownType { name: name.clone() }),
        }
    }

    /// Returns the family of a registered type or of an array type.
    pub fn family(&self, name: &TypeName) -> RuntimeResult<TypeFamily> {
        if let Some(element) = name.element() {
            let _ = self.family(&element).map_err(|_| RuntimeError::UnknownType {
                name: name.clone(),
            })?;

            return Ok(TypeFamily::Array);
        }

        Ok(self.type_meta(name)?.family())
    }

    /// Returns the class and all of its base classes, most derived first.
    pub fn class_chain(&self, ty: &TypeName) -> RuntimeResult<Vec<&TypeMeta>> {
        let mut chain = Vec::new();
        let mut next = Some(ty);

        while let Some(name) = next {
            let meta = self.type_meta(name)?;

            // Cycles are rejected at registration.
            if chain.len() > self.types.len() {
                break;
            }

            chain.push(meta);
            next = meta.base();
        }

        Ok(chain)
    }

    /// Returns true if the class is `base` or derives from it.
    pub fn derives_from(&self, ty: &TypeName, base: &TypeName) -> bool {
        let Ok(chain) = self.class_chain(ty) else {
            return false;
        };

        chain.iter().any(|meta| meta.name() == base)
    }

    /// Returns the interface and all interfaces it extends, directly or
    /// indirectly. The first item is the interface itself.
    pub fn interface_closure(&self, interface: &TypeName) -> Vec<TypeName> {
        let mut result = Vec::new();
        let mut visited = AHashSet::new();
        let mut pending = vec![interface.clone()];

        while let Some(name) = pending.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            if let Ok(meta) = self.type_meta(&name) {
                for base in meta.interfaces().iter().rev() {
                    pending.push(base.clone());
                }
            }

            result.push(name);
        }

        result
    }

    /// Returns true if the class (or one of its base classes) implements the
    /// interface, directly or through an interface extending it.
    pub fn implements(&self, ty: &TypeName, interface: &TypeName) -> bool {
        if self.family(interface).ok() != Some(TypeFamily::Interface) {
            return false;
        }

        let Ok(chain) = self.class_chain(ty) else {
            return false;
        };

        for class in chain {
            if class.family() == TypeFamily::Interface {
                return self.interface_closure(class.name()).contains(interface);
            }

            for implemented in class.interfaces() {
                if self.interface_closure(implemented).contains(interface) {
                    return true;
                }
            }
        }

        false
    }

    /// Returns true if a value of type `from` can be used where a value of
    /// type `to` is expected without conversion: the types are equal, `to`
    /// is `object`, or `from` derives from or implements `to`.
    pub fn is_assignable(&self, from: &TypeName, to: &TypeName) -> bool {
        if from == to {
            return true;
        }

        match self.family(to) {
            Ok(TypeFamily::Object) => true,
            Ok(TypeFamily::Class) => self.derives_from(from, to),
            Ok(TypeFamily::Interface) => self.implements(from, to),
            _ => false,
        }
    }

    /// Returns true if the type satisfies the generic constraint.
    pub fn satisfies(&self, ty: &TypeName, constraint: &Constraint) -> RuntimeResult<bool> {
        let family = self.family(ty)?;

        Ok(match constraint {
            Constraint::ValueType => family.is_value(),
            Constraint::ReferenceType => family.is_reference(),
            Constraint::Enum => family == TypeFamily::Enum,
            Constraint::Implements(target) => self.is_assignable(ty, target),
        })
    }

    /// Returns the effective member set of the class viewed either as itself
    /// (if `capability` is None) or through the capability.
    ///
    /// Fails with [RuntimeError::CapabilityNotImplemented] if the class does
    /// not implement the capability.
    pub fn select_view(
        &self,
        ty: &TypeName,
        capability: Option<&TypeName>,
    ) -> RuntimeResult<Arc<Prototype>> {
        let view = match capability {
            None => View::Concrete(ty.clone()),
            Some(capability) => View::Capability(ty.clone(), capability.clone()),
        };

        self.prototype(&view)
    }

    /// Returns the effective member set of the view.
    #[inline]
    pub fn prototype(&self, view: &View) -> RuntimeResult<Arc<Prototype>> {
        self.cache
            .get_or_compute(view, || Prototype::compute(self, view))
    }

    /// Returns the extension methods applicable to the view, in registration
    /// order.
    ///
    /// An extension over type `R` applies to the untagged view of class `T`
    /// if `T` is `R`, derives from `R`, or implements `R` (implicitly or
    /// explicitly). It applies to the view of `T` as capability `I` if `I` is
    /// `R` or extends `R`.
    pub fn applicable_extensions(&self, view: &View) -> Vec<Arc<MemberDescriptor>> {
        self.extensions
            .iter()
            .filter(|extension| self.extension_applies(extension.declaring(), view))
            .cloned()
            .collect()
    }

    /// Returns the applicable extension methods with the specified name.
    pub fn extensions_named(&self, view: &View, name: &str) -> Vec<Arc<MemberDescriptor>> {
        self.extensions
            .iter()
            .filter(|extension| extension.name().as_str() == name)
            .filter(|extension| self.extension_applies(extension.declaring(), view))
            .cloned()
            .collect()
    }

    fn extension_applies(&self, receiver: &TypeName, view: &View) -> bool {
        match view.capability() {
            None => self.is_assignable(view.ty(), receiver),
            Some(capability) => self.interface_closure(capability).contains(receiver),
        }
    }
}

/// A builder of the [Registry].
///
/// ```
/// # use ad_astra_bridge::runtime::{MemberKind, Registry, TypeBuilder};
/// #
/// #[derive(Default)]
/// struct Counter {
///     value: i32,
/// }
///
/// let registry = Registry::builder()
///     .register(TypeBuilder::interface("ICounter").requires("Value", MemberKind::Property))
///     .register(
///         TypeBuilder::class::<Counter>("Counter")
///             .implements("ICounter")
///             .explicit("ICounter")
///             .property(
///                 "Value",
///                 "i32",
///                 |counter| counter.value,
///                 |counter, value| counter.value = value,
///             ),
///     )
///     .build()
///     .unwrap();
///
/// assert!(registry.implements(&"Counter".into(), &"ICounter".into()));
/// ```
pub struct RegistryBuilder {
    types: Vec<TypeMeta>,
    extensions: Vec<(TypeName, Ident, Overload)>,
    errors: Vec<RegistrationError>,
}

impl Default for RegistryBuilder {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl RegistryBuilder {
    /// Creates a builder with the primitive types registered.
    pub fn new() -> Self {
        let mut types = Vec::new();

        for kind in NumKind::ALL {
            types.push(TypeMeta::new(
                TypeName::from(kind.name()),
                TypeFamily::Number(kind),
            ));
        }

        types.push(TypeMeta::new(TypeName::from("bool"), TypeFamily::Bool));
        types.push(TypeMeta::new(TypeName::from("str"), TypeFamily::Str));
        types.push(TypeMeta::new(TypeName::from("object"), TypeFamily::Object));

        Self {
            types,
            extensions: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Registers a host type.
    pub fn register<S>(mut self, builder: TypeBuilder<S>) -> Self {
        self.errors.extend(builder.errors);

        let mut meta = builder.meta;

        meta.members = builder.members.into_iter().map(Arc::new).collect();

        self.types.push(meta);

        self
    }

    /// Registers an extension method over the receiver type (a class or an
    /// interface).
    ///
    /// The receiver is passed to the invoker as [Call::receiver] and is not
    /// part of the signature. Registering several extensions with the same
    /// receiver and name creates overloads of one extension method.
    pub fn extension(
        mut self,
        receiver: impl Into<TypeName>,
        name: impl Into<Ident>,
        signature: Signature,
        invoke: impl Fn(Call) -> RuntimeResult<Cell> + Send + Sync + 'static,
    ) -> Self {
        let receiver = receiver.into();

        let overload = Overload::new(
            signature,
            Arc::new(invoke),
            CandidateOrigin::Extension(receiver.clone()),
        );

        self.extensions.push((receiver, name.into(), overload));

        self
    }

    /// Validates the registered types and builds the Registry.
    pub fn build(self) -> Result<Registry, RegistrationError> {
        if let Some(error) = self.errors.into_iter().next() {
            return Err(error);
        }

        let mut types = AHashMap::with_capacity(self.types.len());

        for meta in self.types {
            if types.contains_key(meta.name()) {
                return Err(RegistrationError::DuplicateType {
                    name: meta.name().clone(),
                });
            }

            let _ = types.insert(meta.name().clone(), meta);
        }

        let mut registry = Registry {
            types,
            extensions: Vec::new(),
            cache: DescriptorCache::new(),
        };

        let mut names = registry.types.keys().cloned().collect::<Vec<_>>();

        names.sort();

        for name in &names {
            registry.validate_references(name)?;
        }

        for name in &names {
            registry.validate_hierarchy(name)?;
        }

        for name in &names {
            registry.validate_bindings(name)?;
        }

        let mut extensions = Vec::<MemberDescriptor>::new();

        for (receiver, name, overload) in self.extensions {
            match registry.family(&receiver) {
                Ok(TypeFamily::Class | TypeFamily::Interface) => (),

                Ok(_) => {
                    return Err(RegistrationError::UnexpectedFamily {
                        owner: receiver.clone(),
                        name: receiver,
                        expected: "a class or an interface",
                    })
                }

                Err(_) => {
                    return Err(RegistrationError::UnknownType {
                        owner: receiver.clone(),
                        name: receiver,
                    })
                }
            }

            registry.validate_signature(&receiver, overload.signature())?;

            let existing = extensions
                .iter_mut()
                .find(|extension| extension.declaring() == &receiver && extension.name() == &name);

            match existing {
                Some(extension) => extension.overloads.push(overload),

                None => {
                    let mut extension = MemberDescriptor::new(
                        name,
                        MemberKind::Method,
                        receiver,
                        MemberBinding::Own,
                    );

                    extension.overloads.push(overload);
                    extensions.push(extension);
                }
            }
        }

        registry.extensions = extensions.into_iter().map(Arc::new).collect();

        debug!(
            "Host type registry built: {} types, {} extension methods.",
            registry.types.len(),
            registry.extensions.len(),
        );

        Ok(registry)
    }
}

impl Registry {
    fn expect_type(&self, owner: &TypeName, name: &TypeName) -> Result<TypeFamily, RegistrationError> {
        self.family(name)
            .map_err(|_| RegistrationError::UnknownType {
                owner: owner.clone(),
                name: name.clone(),
            })
    }

    fn expect_family(
        &self,
        owner: &TypeName,
        name: &TypeName,
        family: TypeFamily,
        expected: &'static str,
    ) -> Result<(), RegistrationError> {
        if self.expect_type(owner, name)? != family {
            return Err(RegistrationError::UnexpectedFamily {
                owner: owner.clone(),
                name: name.clone(),
                expected,
            });
        }

        Ok(())
    }

    fn validate_signature(
        &self,
        owner: &TypeName,
        signature: &Signature,
    ) -> Result<(), RegistrationError> {
        let outputs = signature.output.iter();

        for ty in signature.params.iter().map(|param| &param.ty).chain(outputs) {
            match ty {
                ParamType::Type(ty) => {
                    let _ = self.expect_type(owner, ty)?;
                }

                ParamType::Generic(index) if *index >= signature.generics.len() => {
                    return Err(RegistrationError::UnknownType {
                        owner: owner.clone(),
                        name: TypeName::from(format!("#{index}")),
                    });
                }

                ParamType::Generic(_) => (),
            }
        }

        for generic in &signature.generics {
            for constraint in &generic.constraints {
                if let Constraint::Implements(ty) = constraint {
                    let _ = self.expect_type(owner, ty)?;
                }
            }
        }

        Ok(())
    }

    fn validate_references(&self, name: &TypeName) -> Result<(), RegistrationError> {
        let Ok(meta) = self.type_meta(name) else {
            return Ok(());
        };

        if let Some(base) = meta.base() {
            self.expect_family(name, base, TypeFamily::Class, "a class")?;
        }

        for interface in meta.interfaces() {
            self.expect_family(name, interface, TypeFamily::Interface, "an interface")?;
        }

        for (_, ty) in meta.fields() {
            let _ = self.expect_type(name, ty)?;
        }

        for member in meta.members() {
            if let Some(ty) = member.ty() {
                let _ = self.expect_type(name, ty)?;
            }

            for overload in member.overloads() {
                self.validate_signature(name, overload.signature())?;
            }
        }

        Ok(())
    }

    fn validate_hierarchy(&self, name: &TypeName) -> Result<(), RegistrationError> {
        let Ok(meta) = self.type_meta(name) else {
            return Ok(());
        };

        let mut visited = AHashSet::new();
        let mut next = Some(meta);

        while let Some(class) = next {
            if !visited.insert(class.name()) {
                return Err(RegistrationError::Cycle { name: name.clone() });
            }

            next = class.base().and_then(|base| self.type_meta(base).ok());
        }

        if meta.family() == TypeFamily::Struct {
            let mut pending = meta.fields().iter().map(|(_, ty)| ty).collect::<Vec<_>>();
            let mut visited = AHashSet::new();

            while let Some(field_ty) = pending.pop() {
                if field_ty == name {
                    return Err(RegistrationError::Cycle { name: name.clone() });
                }

                if !visited.insert(field_ty) {
                    continue;
                }

                if let Ok(field) = self.type_meta(field_ty) {
                    if field.family() == TypeFamily::Struct {
                        pending.extend(field.fields().iter().map(|(_, ty)| ty));
                    }
                }
            }
        }

        if meta.family() == TypeFamily::Interface {
            let mut pending = meta.interfaces().iter().collect::<Vec<_>>();
            let mut visited = AHashSet::new();

            while let Some(interface) = pending.pop() {
                if interface == name {
                    return Err(RegistrationError::Cycle { name: name.clone() });
                }

                if !visited.insert(interface) {
                    continue;
                }

                if let Ok(base) = self.type_meta(interface) {
                    pending.extend(base.interfaces());
                }
            }
        }

        Ok(())
    }

    fn validate_bindings(&self, name: &TypeName) -> Result<(), RegistrationError> {
        let Ok(meta) = self.type_meta(name) else {
            return Ok(());
        };

        if meta.family() != TypeFamily::Class {
            return Ok(());
        }

        for member in meta.members() {
            let Some(capability) = member.binding().capability() else {
                continue;
            };

            if !self.implements(name, capability) {
                return Err(RegistrationError::UnimplementedCapability {
                    owner: name.clone(),
                    member: member.name().clone(),
                    capability: capability.clone(),
                });
            }

            let fulfills = self
                .interface_closure(capability)
                .iter()
                .filter_map(|interface| self.type_meta(interface).ok())
                .flat_map(|interface| interface.contract())
                .any(|(required, kind)| {
                    required == member.name() && Self::fulfills(member.kind(), *kind)
                });

            if !fulfills {
                return Err(RegistrationError::ContractMismatch {
                    owner: name.clone(),
                    member: member.name().clone(),
                    capability: capability.clone(),
                });
            }
        }

        let chain = self
            .class_chain(name)
            .map_err(|_| RegistrationError::Cycle { name: name.clone() })?;

        let mut implemented = Vec::new();

        for class in &chain {
            for interface in class.interfaces() {
                for item in self.interface_closure(interface) {
                    if !implemented.contains(&item) {
                        implemented.push(item);
                    }
                }
            }
        }

        for interface in &implemented {
            let Ok(interface_meta) = self.type_meta(interface) else {
                continue;
            };

            for (required, _) in interface_meta.contract() {
                let provided = chain
                    .iter()
                    .flat_map(|class| class.members())
                    .any(|member| {
                        if member.name() != required {
                            return false;
                        }

                        match member.binding().capability() {
                            Some(capability) => {
                                self.interface_closure(capability).contains(interface)
                            }

                            None => false,
                        }
                    });

                if !provided {
                    return Err(RegistrationError::MissingContractMember {
                        owner: name.clone(),
                        capability: interface.clone(),
                        member: required.clone(),
                    });
                }
            }
        }

        Ok(())
    }

    #[inline(always)]
    fn fulfills(member: MemberKind, contract: MemberKind) -> bool {
        match (member, contract) {
            (MemberKind::Field, MemberKind::Property) => true,
            (MemberKind::Property | MemberKind::Field, MemberKind::ReadOnlyProperty) => true,
            (member, contract) => member == contract,
        }
    }
}

/// A declaration of a host type for the [RegistryBuilder].
///
/// The generic parameter `S` is the Rust type of the state of the class
/// instances (see [HostObject::new]). Other kinds of types do not have
/// state.
///
/// Members declared by a class are bound to the class itself by default.
/// The [implicit](Self::implicit) and [explicit](Self::explicit) functions
/// switch the binding of the subsequently declared members to an interface,
/// and the [own](Self::own) function switches it back.
pub struct TypeBuilder<S = ()> {
    meta: TypeMeta,
    members: Vec<MemberDescriptor>,
    binding: MemberBinding,
    errors: Vec<RegistrationError>,
    state: PhantomData<fn(S)>,
}

impl TypeBuilder {
    /// Declares a class of host objects with the state of type `S`.
    #[inline(always)]
    pub fn class<S>(name: impl Into<TypeName>) -> TypeBuilder<S> {
        TypeBuilder::new(name.into(), TypeFamily::Class)
    }

    /// Declares an interface.
    #[inline(always)]
    pub fn interface(name: impl Into<TypeName>) -> Self {
        Self::new(name.into(), TypeFamily::Interface)
    }

    /// Declares an enum type.
    #[inline(always)]
    pub fn enumeration(name: impl Into<TypeName>) -> Self {
        Self::new(name.into(), TypeFamily::Enum)
    }

    /// Declares a struct type.
    #[inline(always)]
    pub fn structure(name: impl Into<TypeName>) -> Self {
        Self::new(name.into(), TypeFamily::Struct)
    }
}

impl<S> TypeBuilder<S> {
    #[inline(always)]
    fn new(name: TypeName, family: TypeFamily) -> Self {
        Self {
            meta: TypeMeta::new(name, family),
            members: Vec::new(),
            binding: MemberBinding::Own,
            errors: Vec::new(),
            state: PhantomData,
        }
    }

    /// Sets the documentation of the type.
    #[inline(always)]
    pub fn doc(mut self, doc: &'static str) -> Self {
        self.meta.doc = Some(doc);

        self
    }

    /// Sets the base class of a class.
    pub fn base(mut self, base: impl Into<TypeName>) -> Self {
        self.expect_family(TypeFamily::Class, "a class");
        self.meta.base = Some(base.into());

        self
    }

    /// Adds an interface that a class implements, or that an interface
    /// extends.
    pub fn implements(mut self, interface: impl Into<TypeName>) -> Self {
        match self.meta.family {
            TypeFamily::Class | TypeFamily::Interface => (),
            _ => self.expect_family(TypeFamily::Class, "a class or an interface"),
        }

        self.meta.interfaces.push(interface.into());

        self
    }

    /// Adds a member to the contract of an interface.
    pub fn requires(mut self, name: impl Into<Ident>, kind: MemberKind) -> Self {
        self.expect_family(TypeFamily::Interface, "an interface");
        self.meta.contract.push((name.into(), kind));

        self
    }

    /// Adds a named variant to an enum.
    pub fn variant(mut self, name: impl Into<Ident>, value: i64) -> Self {
        self.expect_family(TypeFamily::Enum, "an enum");
        self.meta.variants.push((name.into(), value));

        self
    }

    /// Appends a field to the layout of a struct.
    pub fn layout_field(mut self, name: impl Into<Ident>, ty: impl Into<TypeName>) -> Self {
        self.expect_family(TypeFamily::Struct, "a struct");
        self.meta.fields.push((name.into(), ty.into()));

        self
    }

    /// Binds the subsequently declared members to the class itself.
    #[inline(always)]
    pub fn own(mut self) -> Self {
        self.binding = MemberBinding::Own;

        self
    }

    /// Binds the subsequently declared members to the interface as implicit
    /// implementations.
    #[inline(always)]
    pub fn implicit(mut self, interface: impl Into<TypeName>) -> Self {
        self.binding = MemberBinding::Implicit(interface.into());

        self
    }

    /// Binds the subsequently declared members to the interface as explicit
    /// implementations.
    #[inline(always)]
    pub fn explicit(mut self, interface: impl Into<TypeName>) -> Self {
        self.binding = MemberBinding::Explicit(interface.into());

        self
    }

    /// Declares a method overload.
    ///
    /// Declaring several methods with the same name and binding creates
    /// overloads of one method, in declaration order.
    pub fn method(
        mut self,
        name: impl Into<Ident>,
        signature: Signature,
        invoke: impl Fn(Call) -> RuntimeResult<Cell> + Send + Sync + 'static,
    ) -> Self {
        let name = name.into();
        let overload = Overload::new(signature, Arc::new(invoke), CandidateOrigin::Instance);

        let existing = self
            .members
            .iter_mut()
            .find(|member| member.name() == &name && member.binding() == &self.binding);

        match existing {
            Some(member) if member.kind() == MemberKind::Method => {
                member.overloads.push(overload);
            }

            Some(_) => self.errors.push(RegistrationError::DuplicateMember {
                owner: self.meta.name.clone(),
                member: name,
            }),

            None => {
                let mut member = self.member(name, MemberKind::Method);

                member.overloads.push(overload);

                self.push_member(member);
            }
        }

        self
    }

    /// Declares an event with the specified payload type.
    ///
    /// Host code fires the event with [HostObject::raise], using the name of
    /// this class as the owner.
    pub fn event(mut self, name: impl Into<Ident>, payload: impl Into<TypeName>) -> Self {
        let mut member = self.member(name.into(), MemberKind::Event);

        member.ty = Some(payload.into());

        self.push_member(member);

        self
    }

    fn member(&mut self, name: Ident, kind: MemberKind) -> MemberDescriptor {
        self.expect_family(TypeFamily::Class, "a class");

        MemberDescriptor::new(name, kind, self.meta.name.clone(), self.binding.clone())
    }

    fn push_member(&mut self, member: MemberDescriptor) {
        let duplicate = self
            .members
            .iter()
            .any(|other| other.name() == member.name() && other.binding() == member.binding());

        if duplicate {
            self.errors.push(RegistrationError::DuplicateMember {
                owner: self.meta.name.clone(),
                member: member.name().clone(),
            });

            return;
        }

        self.members.push(member);
    }

    fn expect_family(&mut self, family: TypeFamily, expected: &'static str) {
        if self.meta.family == family {
            return;
        }

        self.errors.push(RegistrationError::UnexpectedFamily {
            owner: self.meta.name.clone(),
            name: self.meta.name.clone(),
            expected,
        });
    }
}

impl<S: Send + Sync + 'static> TypeBuilder<S> {
    /// Declares a readable and writable property of the specified type.
    ///
    /// The accessors operate on the object's state. The setter receives the
    /// value coerced to the property type.
    pub fn property<V>(
        self,
        name: impl Into<Ident>,
        ty: impl Into<TypeName>,
        get: impl Fn(&S) -> V + Send + Sync + 'static,
        set: impl Fn(&mut S, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: Upcast + Downcast + 'static,
    {
        self.data_member(name.into(), MemberKind::Property, ty.into(), get, Some(set))
    }

    /// Declares a property without a setter.
    pub fn readonly_property<V>(
        self,
        name: impl Into<Ident>,
        ty: impl Into<TypeName>,
        get: impl Fn(&S) -> V + Send + Sync + 'static,
    ) -> Self
    where
        V: Upcast + Downcast + 'static,
    {
        self.data_member(
            name.into(),
            MemberKind::ReadOnlyProperty,
            ty.into(),
            get,
            None::<fn(&mut S, V)>,
        )
    }

    /// Declares a plain data field of the specified type.
    pub fn field<V>(
        self,
        name: impl Into<Ident>,
        ty: impl Into<TypeName>,
        get: impl Fn(&S) -> V + Send + Sync + 'static,
        set: impl Fn(&mut S, V) + Send + Sync + 'static,
    ) -> Self
    where
        V: Upcast + Downcast + 'static,
    {
        self.data_member(name.into(), MemberKind::Field, ty.into(), get, Some(set))
    }

    fn data_member<V>(
        mut self,
        name: Ident,
        kind: MemberKind,
        ty: TypeName,
        get: impl Fn(&S) -> V + Send + Sync + 'static,
        set: Option<impl Fn(&mut S, V) + Send + Sync + 'static>,
    ) -> Self
    where
        V: Upcast + Downcast + 'static,
    {
        let mut member = self.member(name, kind);

        member.ty = Some(ty);

        member.getter = Some(Arc::new(move |object: &HostObject| {
            object.read(|state: &S| get(state))?.upcast()
        }));

        if let Some(set) = set {
            member.setter = Some(Arc::new(move |object: &HostObject, value: Cell| {
                let value = V::downcast(value)?;

                object.write(|state: &mut S| set(state, value))
            }));
        }

        self.push_member(member);

        self
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{
        Cell,
        MemberKind,
        Registry,
        RegistrationError,
        Signature,
        TypeBuilder,
        TypeFamily,
        TypeName,
    };

    fn hierarchy() -> Registry {
        Registry::builder()
            .register(TypeBuilder::interface("IBase").requires("Value", MemberKind::Property))
            .register(TypeBuilder::interface("IDerived").implements("IBase"))
            .register(TypeBuilder::interface("IOther"))
            .register(
                TypeBuilder::class::<i32>("Base")
                    .implements("IDerived")
                    .explicit("IBase")
                    .property("Value", "i32", |state| *state, |state, value| *state = value),
            )
            .register(TypeBuilder::class::<i32>("Derived").base("Base")).build()
            .unwrap()
    }

    #[test]
    fn test_type_relations() {
        let registry = hierarchy();

        let base = TypeName::from("Base");
        let derived = TypeName::from("Derived");

        assert!(registry.derives_from(&derived, &base));
        assert!(!registry.derives_from(&base, &derived));
        assert!(registry.implements(&derived, &"IBase".into()));
        assert!(registry.implements(&derived, &"IDerived".into()));
        assert!(!registry.implements(&derived, &"IOther".into()));
        assert!(registry.is_assignable(&derived, &"object".into()));
        assert!(registry.is_assignable(&"IDerived".into(), &"IBase".into()));

        assert_eq!(
            registry.interface_closure(&"IDerived".into()),
            vec![TypeName::from("IDerived"), TypeName::from("IBase")],
        );

        assert_eq!(registry.family(&"Base[][]".into()).ok(), Some(TypeFamily::Array));
        assert!(registry.family(&"Missing[]".into()).is_err());
    }

    #[test]
    fn test_registration_errors() {
        let duplicate = Registry::builder()
            .register(TypeBuilder::enumeration("E"))
            .register(TypeBuilder::structure("E"))
            .build();

        assert_eq!(
            duplicate.err(),
            Some(RegistrationError::DuplicateType { name: "E".into() }),
        );

        let unimplemented = Registry::builder()
            .register(TypeBuilder::interface("I").requires("Value", MemberKind::Property))
            .register(
                TypeBuilder::class::<i32>("C")
                    .explicit("I")
                    .property("Value", "i32", |state| *state, |state, value| *state = value),
            )
            .build();

        assert!(matches!(
            unimplemented.err(),
            Some(RegistrationError::UnimplementedCapability { .. }),
        ));

        let missing = Registry::builder()
            .register(TypeBuilder::interface("I").requires("Value", MemberKind::Property))
            .register(TypeBuilder::class::<i32>("C").implements("I"))
            .build();

        assert!(matches!(
            missing.err(),
            Some(RegistrationError::MissingContractMember { .. }),
        ));

        let unknown = Registry::builder()
            .extension("Nowhere", "Method", Signature::new(), |_| Ok(Cell::Nil))
            .build();

        assert!(matches!(
            unknown.err(),
            Some(RegistrationError::UnknownType { .. }),
        ));

        let cycle = Registry::builder()
            .register(TypeBuilder::class::<()>("A").base("B"))
            .register(TypeBuilder::class::<()>("B").base("A"))
            .build();

        assert!(matches!(cycle.err(), Some(RegistrationError::Cycle { .. })));

        let layout = Registry::builder()
            .register(TypeBuilder::structure("Outer").layout_field("inner", "Inner"))
            .register(TypeBuilder::structure("Inner").layout_field("outer", "Outer"))
            .build();

        assert_eq!(layout.err(), Some(RegistrationError::Cycle { name: "Inner".into() }));

        let receiver = Registry::builder()
            .extension("object", "Method", Signature::new(), |_| Ok(Cell::Nil))
            .build();

        assert!(matches!(
            receiver.err(),
            Some(RegistrationError::UnexpectedFamily { .. }),
        ));

        let generic = Registry::builder()
            .register(TypeBuilder::interface("I"))
            .extension("I", "Method", Signature::new().generic_param("value", 0), |_| {
                Ok(Cell::Nil)
            })
            .build();

        assert_eq!(
            generic.err(),
            Some(RegistrationError::UnknownType {
                owner: "I".into(),
                name: "#0".into(),
            }),
        );
    }
}
