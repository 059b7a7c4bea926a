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
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
        Mutex,
        Weak,
    },
};

use log::{debug, warn};

use crate::runtime::{
    Bridge,
    Cell,
    HostObject,
    Ident,
    RuntimeError,
    RuntimeResult,
    ScriptFn,
    TypeName,
};

/// A host event projected into the script environment: the value produced
/// by reading an event member of a host object.
///
/// ```
/// # use std::sync::{Arc, Mutex};
/// # use ad_astra_bridge::runtime::{Bridge, Cell, Registry, ScriptFn, TypeBuilder};
/// #
/// let registry = Registry::builder()
///     .register(TypeBuilder::class::<()>("Button").event("Click", "i32"))
///     .build()
///     .unwrap();
///
/// let bridge = Bridge::new(registry);
/// let button = bridge.wrap("Button", ()).unwrap();
///
/// let clicks = Arc::new(Mutex::new(Vec::new()));
///
/// let Cell::Event(click) = bridge.get(&button, "Click").unwrap() else {
///     unreachable!();
/// };
///
/// let connection = click
///     .connect(Cell::Function(ScriptFn::new({
///         let clicks = clicks.clone();
///
///         move |args| {
///             clicks.lock().unwrap().push(args[1].clone());
///             Ok(Cell::Nil)
///         }
///     })))
///     .unwrap();
///
/// button.raise("Button", "Click", Cell::give(1i32).unwrap()).unwrap();
/// connection.disconnect();
/// button.raise("Button", "Click", Cell::give(2i32).unwrap()).unwrap();
///
/// assert_eq!(clicks.lock().unwrap().len(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ScriptEvent {
    receiver: HostObject,
    owner: TypeName,
    name: Ident,
    payload: TypeName,
    bridge: Bridge,
}

impl PartialEq for ScriptEvent {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.receiver.same_instance(&other.receiver)
            && self.owner == other.owner
            && self.name == other.name
    }
}

impl ScriptEvent {
    #[inline(always)]
    pub(crate) fn new(
        receiver: HostObject,
        owner: TypeName,
        name: Ident,
        payload: TypeName,
        bridge: Bridge,
    ) -> Self {
        Self {
            receiver,
            owner,
            name,
            payload,
            bridge,
        }
    }

    /// The handle through which the event has been read.
    #[inline(always)]
    pub fn receiver(&self) -> &HostObject {
        &self.receiver
    }

    /// The class declaring the event.
    #[inline(always)]
    pub fn owner(&self) -> &TypeName {
        &self.owner
    }

    /// The name of the event.
    #[inline(always)]
    pub fn name(&self) -> &Ident {
        &self.name
    }

    /// The declared type of the event's payload.
    #[inline(always)]
    pub fn payload(&self) -> &TypeName {
        &self.payload
    }

    /// Registers the callback to be invoked whenever the event fires.
    ///
    /// The callback must be a [Cell::Function]. It receives two arguments:
    /// the sender (an untagged handle of the firing object) and the event's
    /// payload.
    ///
    /// Connecting the same callback twice creates two independent
    /// registrations, each disconnected by its own [Connection].
    pub fn connect(&self, callback: Cell) -> RuntimeResult<Connection> {
        let callback = match callback {
            Cell::Function(callback) => callback,
            other => return Err(RuntimeError::mismatch(other.data_type(), "fn")),
        };

        let hub = self.receiver.hub(&self.owner, &self.name, || {
            EventHub::new(self.payload.clone(), self.bridge.clone())
        });
        let id = hub.register(callback);

        let connection = Connection(Arc::new(ConnectionInner {
            hub: Arc::downgrade(&hub),
            id,
            active: AtomicBool::new(true),
        }));

        self.receiver.track(connection.clone());

        debug!("Connected #{id} to {}.{}.", self.owner, self.name);

        Ok(connection)
    }
}

/// A live link between a host event and a script callback.
///
/// The link is removed by [disconnect](Self::disconnect), or when the handle
/// through which the connection has been made is dropped.
///
/// Two Connections are equal if they are clones of the same registration.
#[derive(Clone)]
pub struct Connection(Arc<ConnectionInner>);

impl PartialEq for Connection {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Connection {}

impl Debug for Connection {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Connection")
            .field("id", &self.0.id)
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl Connection {
    /// Removes the registration of the callback. Subsequent firings of the
    /// event do not invoke it.
    ///
    /// Disconnecting an already disconnected Connection does nothing.
    pub fn disconnect(&self) {
        if !self.0.active.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(hub) = self.0.hub.upgrade() {
            hub.remove(self.0.id);
        }

        debug!("Disconnected #{}.", self.0.id);
    }

    /// Returns true if the callback is still registered.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.0.active.load(Ordering::Acquire) && self.0.hub.strong_count() > 0
    }
}

struct ConnectionInner {
    hub: Weak<EventHub>,
    id: u64,
    active: AtomicBool,
}

// The registrations of one event of one host object instance.
pub(crate) struct EventHub {
    registrations: Mutex<Vec<(u64, ScriptFn)>>,
    next: AtomicU64,
    payload: TypeName,
    bridge: Bridge,
}

impl EventHub {
    #[inline(always)]
    fn new(payload: TypeName, bridge: Bridge) -> Self {
        Self {
            registrations: Mutex::new(Vec::new()),
            next: AtomicU64::new(1),
            payload,
            bridge,
        }
    }

    fn register(&self, callback: ScriptFn) -> u64 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);

        self.registrations
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push((id, callback));

        id
    }

    fn remove(&self, id: u64) {
        self.registrations
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .retain(|(registered, _)| *registered != id);
    }

    fn is_registered(&self, id: u64) -> bool {
        self.registrations
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .iter()
            .any(|(registered, _)| *registered == id)
    }

    // Callbacks run without holding the lock, so they may connect and
    // disconnect. A callback disconnected during the dispatch is skipped.
    pub(crate) fn fire(&self, sender: Cell, payload: Cell) -> RuntimeResult<()> {
        let payload = self.bridge.coercion().coerce(payload, &self.payload)?;
        let args = [sender, payload];

        let snapshot = self
            .registrations
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone();

        for (id, callback) in snapshot {
            if !self.is_registered(id) {
                continue;
            }

            if let Err(error) = callback.call(&args) {
                warn!("Event callback #{id} failed: {error}");
                return Err(error);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::runtime::{
        Bridge,
        Cell,
        ErrorKind,
        HostObject,
        Number,
        Registry,
        RuntimeError,
        ScriptEvent,
        ScriptFn,
        TypeBuilder,
    };

    fn bridge() -> Bridge {
        let registry = Registry::builder()
            .register(TypeBuilder::class::<()>("Test.TestObject").event("TestEvent", "i32"))
            .build()
            .unwrap();

        Bridge::new(registry)
    }

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Cell {
        let log = log.clone();

        Cell::Function(ScriptFn::new(move |args| {
            log.lock().unwrap().push(format!("{tag}:{:?}", args[1]));

            Ok(Cell::Nil)
        }))
    }

    fn event(bridge: &Bridge, object: &HostObject) -> ScriptEvent {
        match bridge.get(object, "TestEvent").unwrap() {
            Cell::Event(event) => event,
            other => panic!("unexpected value {other:?}"),
        }
    }

    fn raise(object: &HostObject, payload: Cell) -> Result<(), RuntimeError> {
        object.raise("Test.TestObject", "TestEvent", payload)
    }

    #[test]
    fn test_dispatch_order() {
        let bridge = bridge();
        let object = bridge.wrap("Test.TestObject", ()).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let first = event(&bridge, &object).connect(recorder(&log, "a")).unwrap();
        let _second = event(&bridge, &object).connect(recorder(&log, "b")).unwrap();

        raise(&object, Cell::Number(Number::I32(1))).unwrap();

        first.disconnect();
        first.disconnect();

        assert!(!first.is_connected());

        raise(&object, Cell::Number(Number::I32(2))).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["a:1i32", "b:1i32", "b:2i32"]);
    }

    #[test]
    fn test_payload_coercion() {
        let bridge = bridge();
        let object = bridge.wrap("Test.TestObject", ()).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let event = event(&bridge, &object);

        assert_eq!(event.payload(), "i32");

        let _connection = event.connect(recorder(&log, "a")).unwrap();

        raise(&object, Cell::Number(Number::U8(3))).unwrap();

        assert_eq!(
            raise(&object, Cell::Str("three".into())).err().map(|error| error.kind()),
            Some(ErrorKind::TypeMismatch),
        );

        assert_eq!(
            raise(&object, Cell::Number(Number::I64(i64::MAX))).err().map(|error| error.kind()),
            Some(ErrorKind::Overflow),
        );

        assert_eq!(*log.lock().unwrap(), vec!["a:3i32"]);
    }

    #[test]
    fn test_handle_release() {
        let bridge = bridge();
        let object = bridge.wrap("Test.TestObject", ()).unwrap();
        let proxy = object.untagged();
        let log = Arc::new(Mutex::new(Vec::new()));

        let connection = event(&bridge, &proxy).connect(recorder(&log, "a")).unwrap();

        assert!(connection.is_connected());

        drop(proxy);

        assert!(!connection.is_connected());

        raise(&object, Cell::Number(Number::I32(1))).unwrap();

        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_callback_failure() {
        let bridge = bridge();
        let object = bridge.wrap("Test.TestObject", ()).unwrap();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _failing = event(&bridge, &object)
            .connect(Cell::Function(ScriptFn::new(|_| {
                Err(RuntimeError::host(std::fmt::Error))
            })))
            .unwrap();

        let _skipped = event(&bridge, &object).connect(recorder(&log, "a")).unwrap();

        let result = raise(&object, Cell::Number(Number::I32(1)));

        assert_eq!(result.err().map(|error| error.kind()), Some(ErrorKind::Host));
        assert!(log.lock().unwrap().is_empty());

        assert_eq!(
            event(&bridge, &object)
                .connect(Cell::Bool(true))
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::TypeMismatch),
        );
    }
}
