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
    any::{type_name, Any},
    fmt::{Debug, Formatter},
    mem::take,
    sync::{Arc, Mutex, RwLock},
};

use ahash::AHashMap;

use crate::runtime::{
    event::EventHub,
    Cell,
    Connection,
    Downcast,
    Ident,
    RuntimeError,
    RuntimeResult,
    TypeName,
    Upcast,
    View,
};

/// A handle of a host object owned by a script-side proxy.
///
/// The handle refers to a host object instance (a registered class and its
/// Rust state) and optionally carries an active capability tag. An untagged
/// handle exposes the class's own view; a tagged handle exposes exactly the
/// member set of its capability (see [View]).
///
/// Cloning a handle creates another reference to the same handle. Capability
/// casts ([Bridge::cast](crate::runtime::Bridge::cast)) create new handles to
/// the same instance. Event [connections](Connection) made through a handle
/// are disconnected when the last clone of that handle is dropped.
///
/// Two HostObjects are equal if they are clones of the same handle. Use
/// [same_instance](Self::same_instance) to compare the underlying objects.
#[derive(Clone)]
pub struct HostObject(Arc<Handle>);

impl PartialEq for HostObject {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HostObject {}

impl Debug for HostObject {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("HostObject")
            .field("ty", &self.0.instance.ty)
            .field("capability", &self.0.capability)
            .finish_non_exhaustive()
    }
}

impl Upcast for HostObject {
    #[inline(always)]
    fn upcast(self) -> RuntimeResult<Cell> {
        Ok(Cell::Object(self))
    }
}

impl Downcast for HostObject {
    fn downcast(cell: Cell) -> RuntimeResult<Self> {
        match cell {
            Cell::Object(object) => Ok(object),
            other => Err(RuntimeError::mismatch(other.data_type(), "object")),
        }
    }
}

impl HostObject {
    /// Creates an untagged handle of a new host object instance.
    ///
    /// The `ty` must be the name of a registered class whose accessors
    /// operate on the state of type `S`. Otherwise the member access through
    /// this handle fails (see [Bridge::wrap](crate::runtime::Bridge::wrap)
    /// for the checked version).
    pub fn new<S: Send + Sync + 'static>(ty: impl Into<TypeName>, state: S) -> Self {
        let instance = Arc::new(Instance {
            ty: ty.into(),
            state: RwLock::new(Box::new(state)),
            hubs: Mutex::new(AHashMap::new()),
        });

        Self::from_instance(instance, None)
    }

    /// The concrete type of the host object.
    #[inline(always)]
    pub fn ty(&self) -> &TypeName {
        &self.0.instance.ty
    }

    /// The active capability tag of this handle.
    #[inline(always)]
    pub fn capability(&self) -> Option<&TypeName> {
        self.0.capability.as_ref()
    }

    /// The type this handle presents the object as: the capability if the
    /// handle is tagged, and the concrete type otherwise.
    #[inline(always)]
    pub fn view_type(&self) -> &TypeName {
        match &self.0.capability {
            Some(capability) => capability,
            None => &self.0.instance.ty,
        }
    }

    /// The key of the effective member set of this handle.
    pub fn view(&self) -> View {
        match &self.0.capability {
            None => View::Concrete(self.0.instance.ty.clone()),
            Some(capability) => View::Capability(self.0.instance.ty.clone(), capability.clone()),
        }
    }

    /// Returns true if both handles refer to the same host object instance,
    /// regardless of their capability tags.
    #[inline(always)]
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0.instance, &other.0.instance)
    }

    /// Returns a new untagged handle of the same instance.
    #[inline(always)]
    pub fn untagged(&self) -> Self {
        Self::from_instance(self.0.instance.clone(), None)
    }

    /// Calls the function with a shared reference to the object's state.
    ///
    /// Fails with [RuntimeError::HostState] if the state is not of type `S`.
    pub fn read<S: 'static, R>(&self, function: impl FnOnce(&S) -> R) -> RuntimeResult<R> {
        let guard = self
            .0
            .instance
            .state
            .read()
            .unwrap_or_else(|poison| poison.into_inner());

        let state: &(dyn Any + Send + Sync) = &**guard;

        match state.downcast_ref::<S>() {
            Some(state) => Ok(function(state)),
            None => Err(self.state_error::<S>()),
        }
    }

    /// Calls the function with a mutable reference to the object's state.
    ///
    /// The state is locked for the duration of the call; the function must
    /// not access the same object through the bridge.
    pub fn write<S: 'static, R>(&self, function: impl FnOnce(&mut S) -> R) -> RuntimeResult<R> {
        let mut guard = self
            .0
            .instance
            .state
            .write()
            .unwrap_or_else(|poison| poison.into_inner());

        let state: &mut (dyn Any + Send + Sync) = &mut **guard;

        match state.downcast_mut::<S>() {
            Some(state) => Ok(function(state)),
            None => Err(self.state_error::<S>()),
        }
    }

    /// Fires the event declared by the `owner` class with the specified
    /// name.
    ///
    /// The connected callbacks are invoked synchronously in the order of
    /// their connection, each with the arguments `(sender, payload)`, where
    /// the sender is an untagged handle of this object. If a callback fails,
    /// the remaining callbacks are not invoked and the error is returned.
    ///
    /// When the event has connections, the payload is coerced into the
    /// event's declared payload type before any callback runs, and a payload
    /// that cannot be coerced fails the call. Firing an event without
    /// connections does nothing.
    pub fn raise(
        &self,
        owner: impl Into<TypeName>,
        name: impl Into<Ident>,
        payload: Cell,
    ) -> RuntimeResult<()> {
        let key = (owner.into(), name.into());

        let hub = {
            let hubs = self
                .0
                .instance
                .hubs
                .lock()
                .unwrap_or_else(|poison| poison.into_inner());

            hubs.get(&key).cloned()
        };

        let Some(hub) = hub else {
            return Ok(());
        };

        hub.fire(Cell::Object(self.untagged()), payload)
    }

    pub(crate) fn with_capability(&self, capability: TypeName) -> Self {
        Self::from_instance(self.0.instance.clone(), Some(capability))
    }

    pub(crate) fn hub(
        &self,
        owner: &TypeName,
        name: &Ident,
        create: impl FnOnce() -> EventHub,
    ) -> Arc<EventHub> {
        let mut hubs = self
            .0
            .instance
            .hubs
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        hubs.entry((owner.clone(), name.clone()))
            .or_insert_with(|| Arc::new(create()))
            .clone()
    }

    pub(crate) fn track(&self, connection: Connection) {
        let mut connections = self
            .0
            .connections
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        connections.retain(Connection::is_connected);
        connections.push(connection);
    }

    #[inline(always)]
    fn from_instance(instance: Arc<Instance>, capability: Option<TypeName>) -> Self {
        Self(Arc::new(Handle {
            instance,
            capability,
            connections: Mutex::new(Vec::new()),
        }))
    }

    #[inline(always)]
    fn state_error<S>(&self) -> RuntimeError {
        RuntimeError::HostState {
            receiver_type: self.0.instance.ty.clone(),
            expected: type_name::<S>(),
        }
    }
}

struct Handle {
    instance: Arc<Instance>,
    capability: Option<TypeName>,
    connections: Mutex<Vec<Connection>>,
}

impl Drop for Handle {
    fn drop(&mut self) {
        let connections = take(
            self.connections
                .get_mut()
                .unwrap_or_else(|poison| poison.into_inner()),
        );

        for connection in connections {
            connection.disconnect();
        }
    }
}

struct Instance {
    ty: TypeName,
    state: RwLock<Box<dyn Any + Send + Sync>>,
    hubs: Mutex<AHashMap<(TypeName, Ident), Arc<EventHub>>>,
}
