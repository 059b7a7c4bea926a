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

use std::sync::{Arc, Mutex};

use ad_astra_bridge::runtime::{Bridge, Cell, Connection, HostObject, ScriptFn, TypeName};

use crate::common::{
    int,
    Fixture,
    BASE_INTERFACE,
    EVENT,
    FIRE_EVENT,
    SCALAR_PROPERTY,
    TEST_OBJECT,
};

mod common;

fn connect(fixture: &Fixture, receiver: &HostObject, callback: ScriptFn) -> Connection {
    let Cell::Event(event) = fixture.get(receiver, EVENT) else {
        panic!("{EVENT} is not an event");
    };

    event.connect(Cell::Function(callback)).unwrap()
}

// Assigns the event's payload to the scalar property of the sender.
fn assign_scalar(bridge: Bridge) -> ScriptFn {
    ScriptFn::new(move |args| {
        let sender = args[0].clone().take::<HostObject>()?;
        let sender = bridge.cast(&TypeName::from(BASE_INTERFACE), &sender)?;

        bridge.set(&sender, SCALAR_PROPERTY, args[1].clone())?;

        Ok(Cell::Nil)
    })
}

#[test]
fn test_connect_and_disconnect() {
    let fixture = Fixture::new();

    let connection = connect(
        &fixture,
        &fixture.test_interface,
        assign_scalar(fixture.bridge.clone()),
    );

    fixture.invoke(&fixture.test_interface, FIRE_EVENT, vec![int(5432)]);

    assert_eq!(fixture.host(|state| state.scalar), 5432);

    connection.disconnect();

    fixture.invoke(&fixture.test_interface, FIRE_EVENT, vec![int(2345)]);

    assert_eq!(fixture.host(|state| state.scalar), 5432);

    connection.disconnect();

    assert!(!connection.is_connected());
}

#[test]
fn test_dispatch_order() {
    let fixture = Fixture::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let recorder = |tag: &'static str| {
        let log = log.clone();

        ScriptFn::new(move |args| {
            log.lock().unwrap().push((tag, args[1].clone()));

            Ok(Cell::Nil)
        })
    };

    let first = connect(&fixture, &fixture.test_interface, recorder("first"));
    let _second = connect(&fixture, &fixture.test_interface, recorder("second"));

    fixture.test_object.raise(TEST_OBJECT, EVENT, int(1)).unwrap();

    first.disconnect();

    fixture.test_object.raise(TEST_OBJECT, EVENT, int(2)).unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec![("first", int(1)), ("second", int(1)), ("second", int(2))],
    );
}

#[test]
fn test_handle_release() {
    let fixture = Fixture::new();

    let proxy = fixture.bridge.cast(&TypeName::from(BASE_INTERFACE), &fixture.test_object).unwrap();

    let connection = connect(&fixture, &proxy, assign_scalar(fixture.bridge.clone()));

    assert!(connection.is_connected());

    drop(proxy);

    assert!(!connection.is_connected());

    fixture.invoke(&fixture.test_interface, FIRE_EVENT, vec![int(5432)]);

    assert_eq!(fixture.host(|state| state.scalar), 0);
}
