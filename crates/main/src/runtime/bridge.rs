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

use std::sync::Arc;

use log::{debug, trace};
use strsim::normalized_damerau_levenshtein;

use crate::runtime::{
    BoundMethod,
    BridgeConfig,
    Cell,
    Coercion,
    EnumValue,
    HostArray,
    HostObject,
    Ident,
    MemberDescriptor,
    MemberKind,
    Number,
    Overload,
    Prototype,
    Registry,
    Resolver,
    RuntimeError,
    RuntimeResult,
    ScriptEvent,
    StructValue,
    TypeFamily,
    TypeName,
};

/// The host-object projection bridge: the member access protocol consumed
/// by a script engine, and the host functions exposed to scripts.
///
/// The Bridge answers the engine's queries about host object handles
/// consistently with their effective views: a member hidden from a view is
/// reported as absent, not merely inaccessible.
///
/// ```
/// # use ad_astra_bridge::runtime::{
/// #     Bridge, Cell, ErrorKind, MemberKind, Number, Registry, Signature, TypeBuilder,
/// # };
/// #
/// let registry = Registry::builder()
///     .register(TypeBuilder::interface("IScalar").requires("Scalar", MemberKind::Property))
///     .register(
///         TypeBuilder::class::<i16>("Counter")
///             .implements("IScalar")
///             .explicit("IScalar")
///             .property("Scalar", "i16", |state| *state, |state, value| *state = value)
///             .own()
///             .method("Reset", Signature::new(), |call| {
///                 call.receiver()?.write(|state: &mut i16| *state = 0)?;
///                 Ok(Cell::Nil)
///             }),
///     )
///     .build()
///     .unwrap();
///
/// let bridge = Bridge::new(registry);
/// let counter = bridge.wrap("Counter", 5i16).unwrap();
/// let scalar = bridge.cast(&"IScalar".into(), &counter).unwrap();
///
/// assert!(!bridge.has_member(&counter, "Scalar"));
/// assert!(bridge.has_member(&scalar, "Scalar"));
/// assert!(!bridge.has_member(&scalar, "Reset"));
///
/// bridge.set(&scalar, "Scalar", Cell::Number(Number::I32(4321))).unwrap();
///
/// assert_eq!(
///     bridge.set(&scalar, "Scalar", Cell::Number(Number::I32(54321))).unwrap_err().kind(),
///     ErrorKind::Overflow,
/// );
///
/// assert_eq!(bridge.get(&scalar, "Scalar").unwrap(), Cell::Number(Number::I16(4321)));
/// ```
#[derive(Clone, Debug)]
pub struct Bridge {
    registry: Arc<Registry>,
    config: BridgeConfig,
}

impl Bridge {
    /// Creates a bridge over the registry with the default configuration.
    #[inline(always)]
    pub fn new(registry: impl Into<Arc<Registry>>) -> Self {
        Self::with_config(registry, BridgeConfig::new())
    }

    /// Creates a bridge over the registry with the specified configuration.
    #[inline(always)]
    pub fn with_config(registry: impl Into<Arc<Registry>>, config: BridgeConfig) -> Self {
        Self {
            registry: registry.into(),
            config,
        }
    }

    /// The registry of host types.
    #[inline(always)]
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// The configuration of the bridge.
    #[inline(always)]
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Creates an untagged handle of a new host object of the registered
    /// class `ty` with the specified state.
    pub fn wrap<S: Send + Sync + 'static>(
        &self,
        ty: impl Into<TypeName>,
        state: S,
    ) -> RuntimeResult<HostObject> {
        let ty = ty.into();

        if self.registry.family(&ty)? != TypeFamily::Class {
            return Err(RuntimeError::mismatch(ty, "class"));
        }

        trace!("Wrapping a host object of {ty}.");

        Ok(HostObject::new(ty, state))
    }

    /// Returns the effective member set of the handle.
    #[inline(always)]
    pub fn view_of(&self, object: &HostObject) -> RuntimeResult<Arc<Prototype>> {
        self.registry.prototype(&object.view())
    }

    /// Returns true if the member with the specified name exists on the
    /// effective view of the handle, including the applicable extension
    /// methods.
    pub fn has_member(&self, object: &HostObject, name: &str) -> bool {
        let Ok(prototype) = self.view_of(object) else {
            return false;
        };

        if prototype.implements_member(name) {
            return true;
        }

        !self
            .registry
            .extensions_named(prototype.view(), name)
            .is_empty()
    }

    /// Returns the names of all members of the effective view of the handle,
    /// including the applicable extension methods, in alphabetical order.
    pub fn members(&self, object: &HostObject) -> RuntimeResult<Vec<Ident>> {
        let prototype = self.view_of(object)?;

        let mut names = prototype
            .names()
            .into_iter()
            .cloned()
            .chain(
                self.registry
                    .applicable_extensions(prototype.view())
                    .iter()
                    .map(|extension| extension.name().clone()),
            )
            .collect::<Vec<_>>();

        names.sort();
        names.dedup();

        Ok(names)
    }

    /// Reads a member of the host object.
    ///
    /// Reading a property or a field returns its value. Reading a method
    /// returns a [Cell::Method] invocable with [call](Self::call). Reading
    /// an event returns a connectable [Cell::Event].
    pub fn get(&self, object: &HostObject, name: &str) -> RuntimeResult<Cell> {
        let prototype = self.view_of(object)?;

        let Some(member) = prototype.member(name) else {
            if !self.registry.extensions_named(prototype.view(), name).is_empty() {
                return Ok(Cell::Method(BoundMethod {
                    receiver: object.clone(),
                    name: Ident::from(name),
                }));
            }

            return Err(self.unknown_member(object, &prototype, name));
        };

        match member.kind() {
            MemberKind::Property | MemberKind::ReadOnlyProperty | MemberKind::Field => {
                let Some(getter) = &member.getter else {
                    return Ok(Cell::Nil);
                };

                let value = getter(object)?;

                match member.ty() {
                    Some(ty) => self.coercion().coerce(value, ty),
                    None => Ok(value),
                }
            }

            MemberKind::Method => Ok(Cell::Method(BoundMethod {
                receiver: object.clone(),
                name: member.name().clone(),
            })),

            MemberKind::Event => Ok(Cell::Event(ScriptEvent::new(
                object.clone(),
                member.declaring().clone(),
                member.name().clone(),
                member.ty().cloned().unwrap_or_else(|| TypeName::from("object")),
                self.clone(),
            ))),
        }
    }

    /// Assigns a value to a member of the host object.
    ///
    /// The value is coerced into the member's type before the host setter is
    /// called. Writing to a read-only property, a method, or an event fails
    /// with [RuntimeError::ReadOnly].
    pub fn set(&self, object: &HostObject, name: &str, value: Cell) -> RuntimeResult<()> {
        let prototype = self.view_of(object)?;

        let Some(member) = prototype.member(name) else {
            if !self.registry.extensions_named(prototype.view(), name).is_empty() {
                return Err(RuntimeError::ReadOnly {
                    receiver_type: object.view_type().clone(),
                    member: Ident::from(name),
                });
            }

            return Err(self.unknown_member(object, &prototype, name));
        };

        let value = self.coercion().assign(member, value)?;

        let Some(setter) = &member.setter else {
            return Err(RuntimeError::ReadOnly {
                receiver_type: member.declaring().clone(),
                member: member.name().clone(),
            });
        };

        setter(object, value)
    }

    /// Invokes a method of the host object.
    ///
    /// The candidate overloads are the overloads of the method declared on
    /// the effective view of the handle followed by the overloads of the
    /// applicable extension methods with the same name.
    pub fn invoke(&self, object: &HostObject, name: &str, args: Vec<Cell>) -> RuntimeResult<Cell> {
        let prototype = self.view_of(object)?;
        let member = prototype.member(name);

        if let Some(member) = member {
            if member.kind() != MemberKind::Method {
                return Err(RuntimeError::NotInvocable {
                    receiver_type: object.view_type().clone(),
                    member: member.name().clone(),
                    kind: member.kind(),
                });
            }
        }

        let extensions = self.registry.extensions_named(prototype.view(), name);

        let candidates = member
            .into_iter()
            .chain(extensions.iter())
            .flat_map(|member: &Arc<MemberDescriptor>| member.overloads().iter().cloned())
            .collect::<Vec<Overload>>();

        if candidates.is_empty() {
            return Err(self.unknown_member(object, &prototype, name));
        }

        let binding = Resolver::new(&self.registry, &self.config).resolve(
            object.view_type(),
            &Ident::from(name),
            &candidates,
            args,
        )?;

        let output = binding.output();
        let result = binding.invoke(Some(object.clone()))?;

        match output {
            Some(ty) => self.coercion().coerce(result, &ty),
            None => Ok(result),
        }
    }

    /// Calls a script callback or a method read from a host object.
    pub fn call(&self, callee: &Cell, args: Vec<Cell>) -> RuntimeResult<Cell> {
        match callee {
            Cell::Function(function) => function.call(&args),
            Cell::Method(method) => self.invoke(&method.receiver, &method.name, args),
            other => Err(RuntimeError::mismatch(other.data_type(), "fn")),
        }
    }

    /// Casts the handle to the specified type.
    ///
    /// Casting to an interface returns a new handle of the same object
    /// tagged with that capability, failing with
    /// [RuntimeError::CapabilityNotImplemented] if the object's class does
    /// not implement it. Casting to the object's class, one of its base
    /// classes, or `object` returns a new untagged handle. Casting to an
    /// unknown type or to a type without reference semantics is an
    /// unsupported cast and fails with
    /// [RuntimeError::CapabilityNotImplemented] too.
    pub fn cast(&self, capability: &TypeName, object: &HostObject) -> RuntimeResult<HostObject> {
        let not_implemented = || RuntimeError::CapabilityNotImplemented {
            receiver_type: object.ty().clone(),
            capability: capability.clone(),
        };

        let Ok(family) = self.registry.family(capability) else {
            return Err(not_implemented());
        };

        match family {
            TypeFamily::Interface => {
                if !self.registry.implements(object.ty(), capability) {
                    return Err(not_implemented());
                }

                debug!("Cast of {} to {capability}.", object.ty());

                Ok(object.with_capability(capability.clone()))
            }

            TypeFamily::Class | TypeFamily::Object => {
                if !self.registry.is_assignable(object.ty(), capability) {
                    return Err(not_implemented());
                }

                Ok(object.untagged())
            }

            _ => Err(not_implemented()),
        }
    }

    /// Allocates an array of the specified length with the elements of the
    /// specified type. Every element is the default value of the element
    /// type: zero for numbers and enums, false for booleans, a struct of
    /// default fields for structs, and nil otherwise.
    pub fn new_array(&self, element: impl Into<TypeName>, len: usize) -> RuntimeResult<HostArray> {
        let element = element.into();
        let default = self.default_value(&element)?;

        Ok(HostArray::new(element, vec![default; len]))
    }

    /// Creates an array of the specified element type from the items,
    /// coercing every item into the element type.
    pub fn array_of(
        &self,
        element: impl Into<TypeName>,
        items: impl IntoIterator<Item = Cell>,
    ) -> RuntimeResult<HostArray> {
        let element = element.into();
        let coercion = self.coercion();

        let items = items
            .into_iter()
            .map(|item| coercion.coerce(item, &element))
            .collect::<RuntimeResult<Vec<_>>>()?;

        Ok(HostArray::new(element, items))
    }

    /// Creates a value of the struct type from the field values in the order
    /// of the struct's layout. Missing trailing fields get their default
    /// values.
    pub fn new_struct(
        &self,
        ty: impl Into<TypeName>,
        fields: impl IntoIterator<Item = Cell>,
    ) -> RuntimeResult<StructValue> {
        let ty = ty.into();
        let meta = self.registry.type_meta(&ty)?;

        if meta.family() != TypeFamily::Struct {
            return Err(RuntimeError::mismatch(ty, "struct"));
        }

        let coercion = self.coercion();
        let mut fields = fields.into_iter();
        let mut values = Vec::with_capacity(meta.fields().len());

        for (_, field_ty) in meta.fields() {
            let value = match fields.next() {
                Some(value) => coercion.coerce(value, field_ty)?,
                None => self.default_value(field_ty)?,
            };

            values.push(value);
        }

        if let Some(extra) = fields.next() {
            return Err(RuntimeError::TypeMismatch {
                data_type: extra.data_type(),
                expected_types: Vec::new(),
            });
        }

        Ok(StructValue::new(ty, values))
    }

    /// Returns the value of the enum type with the specified variant name.
    pub fn enum_value(&self, ty: impl Into<TypeName>, variant: &str) -> RuntimeResult<EnumValue> {
        let ty = ty.into();
        let meta = self.registry.type_meta(&ty)?;

        if meta.family() != TypeFamily::Enum {
            return Err(RuntimeError::mismatch(ty, "enum"));
        }

        match meta.variant(variant) {
            Some(value) => Ok(EnumValue::new(ty, value)),

            None => {
                let suggestion = self.suggest(variant, meta.variants().iter().map(|(name, _)| name));

                Err(RuntimeError::UnknownMember {
                    receiver_type: ty,
                    capability: None,
                    member: Ident::from(variant),
                    suggestion,
                })
            }
        }
    }

    /// Returns the host type of the value. For a capability-tagged handle,
    /// this is the capability.
    #[inline]
    pub fn type_of(&self, value: &Cell) -> TypeName {
        value.runtime_type().unwrap_or_else(|| value.data_type())
    }

    fn default_value(&self, ty: &TypeName) -> RuntimeResult<Cell> {
        Ok(match self.registry.family(ty)? {
            TypeFamily::Number(kind) => Cell::Number(Number::U8(0).try_cast(kind)?),
            TypeFamily::Bool => Cell::Bool(false),
            TypeFamily::Enum => Cell::Enum(EnumValue::new(ty, 0)),

            TypeFamily::Struct => {
                let meta = self.registry.type_meta(ty)?;
                let mut fields = Vec::with_capacity(meta.fields().len());

                for (_, field_ty) in meta.fields() {
                    fields.push(self.default_value(field_ty)?);
                }

                Cell::Struct(StructValue::new(ty, fields))
            }

            _ => Cell::Nil,
        })
    }

    fn unknown_member(&self, object: &HostObject, prototype: &Prototype, name: &str) -> RuntimeError {
        let extensions = self.registry.applicable_extensions(prototype.view());

        let suggestion = self.suggest(
            name,
            prototype
                .names()
                .into_iter()
                .chain(extensions.iter().map(|extension| extension.name())),
        );

        RuntimeError::UnknownMember {
            receiver_type: object.ty().clone(),
            capability: object.capability().cloned(),
            member: Ident::from(name),
            suggestion,
        }
    }

    fn suggest<'n>(&self, name: &str, candidates: impl Iterator<Item = &'n Ident>) -> Option<Ident> {
        let mut best = None;
        let mut best_score = self.config.suggestion_threshold as f64;

        for candidate in candidates {
            let score = normalized_damerau_levenshtein(name, candidate.as_ref());

            if score >= best_score && score < 1.0 {
                best_score = score;
                best = Some(candidate.clone());
            }
        }

        best
    }

    #[inline(always)]
    pub(crate) fn coercion(&self) -> Coercion<'_> {
        Coercion::new(&self.registry, &self.config)
    }
}
