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

use ad_astra_bridge::runtime::{
    Cell,
    EnumValue,
    ErrorKind,
    HostArray,
    Ident,
    Number,
    RuntimeError,
    TypeName,
};

use crate::common::{
    date_time,
    int,
    test_enum,
    time_span,
    Fixture,
    BASE_INTERFACE,
    ENUM_PROPERTY,
    EVENT,
    EXTENSION_METHOD,
    FIRE_EVENT,
    METHOD,
    OTHER_INTERFACE,
    PROPERTY,
    READ_ONLY_PROPERTY,
    SCALAR_PROPERTY,
    STRUCT_PROPERTY,
    TEST_ENUM,
    TEST_INTERFACE,
    TEST_OBJECT,
    TICKS_PER_SECOND,
};

mod common;

#[test]
fn test_explicit_members_on_object() {
    let fixture = Fixture::new();

    for name in [
        PROPERTY,
        SCALAR_PROPERTY,
        ENUM_PROPERTY,
        STRUCT_PROPERTY,
        READ_ONLY_PROPERTY,
        EVENT,
        METHOD,
    ] {
        assert!(!fixture.bridge.has_member(&fixture.test_object, name), "{name}");
        assert!(fixture.bridge.has_member(&fixture.test_interface, name), "{name}");
    }

    assert!(fixture.bridge.has_member(&fixture.test_object, "Name"));
    assert!(!fixture.bridge.has_member(&fixture.test_interface, "Name"));

    assert!(fixture.bridge.has_member(&fixture.test_object, EXTENSION_METHOD));
    assert!(fixture.bridge.has_member(&fixture.test_interface, EXTENSION_METHOD));

    let members = fixture.bridge.members(&fixture.test_interface).unwrap();

    assert_eq!(members.len(), 9);
    assert!(members.contains(&Ident::from(FIRE_EVENT)));
    assert!(!members.contains(&Ident::from("Name")));
}

#[test]
fn test_capability_casts() {
    let fixture = Fixture::new();

    let derived = fixture
        .bridge
        .cast(&TypeName::from(TEST_INTERFACE), &fixture.test_object)
        .unwrap();

    assert!(derived.same_instance(&fixture.test_object));
    assert!(fixture.bridge.has_member(&derived, SCALAR_PROPERTY));
    assert!(!fixture.bridge.has_member(&derived, "Name"));

    let error = fixture
        .bridge
        .cast(&TypeName::from(OTHER_INTERFACE), &fixture.test_object)
        .err()
        .map(|error| error.kind());

    assert_eq!(error, Some(ErrorKind::CapabilityNotImplemented));

    for target in ["Test.Missing", TEST_ENUM, "i32", "str"] {
        let error = fixture
            .bridge
            .cast(&TypeName::from(target), &fixture.test_object)
            .err()
            .map(|error| error.kind());

        assert_eq!(error, Some(ErrorKind::CapabilityNotImplemented), "{target}");
    }

    let untagged = fixture
        .bridge
        .cast(&TypeName::from(TEST_OBJECT), &fixture.test_interface)
        .unwrap();

    assert_eq!(untagged.capability(), None);
    assert!(fixture.bridge.has_member(&untagged, "Name"));

    let first = fixture.bridge.view_of(&fixture.test_interface).unwrap();

    let second = fixture.bridge.view_of(&derived.untagged()).unwrap();

    let third = fixture.bridge.view_of(&fixture.test_interface.clone()).unwrap();

    assert!(!Arc::ptr_eq(&first, &second));
    assert!(Arc::ptr_eq(&first, &third));
}

#[test]
fn test_array_property() {
    let fixture = Fixture::new();

    fixture.host(|state| {
        state.array = Some(HostArray::new("i32", (0..10).map(int).collect()));
    });

    match fixture.get(&fixture.test_interface, PROPERTY) {
        Cell::Array(array) => assert_eq!(array.len(), 10),
        other => panic!("unexpected value {other:?}"),
    }

    let array = fixture.bridge.new_array("i32", 5).unwrap();

    assert_eq!(array.get(4), Some(Cell::Number(Number::I32(0))));

    fixture.set(&fixture.test_interface, PROPERTY, Cell::Array(array));

    assert_eq!(fixture.host(|state| state.array.as_ref().map(HostArray::len)), Some(5));

    fixture.set(&fixture.test_interface, PROPERTY, Cell::Nil);

    assert!(fixture.host(|state| state.array.is_none()));

    let doubles = fixture.bridge.new_array("f64", 5).unwrap();

    assert_eq!(
        fixture.set_error(&fixture.test_interface, PROPERTY, Cell::Array(doubles)),
        ErrorKind::TypeMismatch,
    );

    assert!(fixture.host(|state| state.array.is_none()));
}

#[test]
fn test_scalar_property() {
    let fixture = Fixture::new();

    fixture.host(|state| state.scalar = 12345);

    assert_eq!(
        fixture.get(&fixture.test_interface, SCALAR_PROPERTY),
        Cell::Number(Number::I16(12345)),
    );

    fixture.set(&fixture.test_interface, SCALAR_PROPERTY, int(4321));

    assert_eq!(fixture.host(|state| state.scalar), 4321);

    assert_eq!(
        fixture.set_error(&fixture.test_interface, SCALAR_PROPERTY, int(54321)),
        ErrorKind::Overflow,
    );

    assert_eq!(fixture.host(|state| state.scalar), 4321);

    fixture.set(&fixture.test_interface, SCALAR_PROPERTY, int(i16::MAX as i32));

    assert_eq!(fixture.host(|state| state.scalar), i16::MAX);

    assert_eq!(
        fixture.set_error(&fixture.test_interface, SCALAR_PROPERTY, test_enum(1)),
        ErrorKind::TypeMismatch,
    );
}

#[test]
fn test_enum_property() {
    let fixture = Fixture::new();

    fixture.host(|state| state.enumeration = EnumValue::new(TEST_ENUM, 1));

    assert_eq!(fixture.get(&fixture.test_interface, ENUM_PROPERTY), test_enum(1));

    let third = fixture.bridge.enum_value(TEST_ENUM, "Third").unwrap();

    fixture.set(&fixture.test_interface, ENUM_PROPERTY, Cell::Enum(third));

    assert_eq!(fixture.host(|state| state.enumeration.value), 2);

    fixture.set(&fixture.test_interface, ENUM_PROPERTY, int(0));

    assert_eq!(
        fixture.host(|state| state.enumeration.clone()),
        EnumValue::new(TEST_ENUM, 0),
    );

    assert_eq!(
        fixture.set_error(&fixture.test_interface, ENUM_PROPERTY, int(1)),
        ErrorKind::TypeMismatch,
    );

    let missing = fixture.bridge.enum_value(TEST_ENUM, "Sixth").err();

    assert_eq!(missing.map(|error| error.kind()), Some(ErrorKind::UnknownMember));
}

#[test]
fn test_struct_property() {
    let fixture = Fixture::new();

    fixture.host(|state| state.structure = time_span(5 * 86_400 * TICKS_PER_SECOND));

    assert_eq!(
        fixture.get(&fixture.test_interface, STRUCT_PROPERTY),
        Cell::Struct(time_span(5 * 86_400 * TICKS_PER_SECOND)),
    );

    let span = fixture.bridge.new_struct("Test.TimeSpan", [int(25)]).unwrap();

    assert_eq!(span.field(0), Some(&Cell::Number(Number::I64(25))));

    fixture.set(&fixture.test_interface, STRUCT_PROPERTY, Cell::Struct(span));

    assert_eq!(fixture.host(|state| state.structure.clone()), time_span(25));

    assert_eq!(
        fixture.set_error(
            &fixture.test_interface,
            STRUCT_PROPERTY,
            Cell::Struct(date_time(25)),
        ),
        ErrorKind::TypeMismatch,
    );

    assert_eq!(fixture.host(|state| state.structure.clone()), time_span(25));
}

#[test]
fn test_read_only_members() {
    let fixture = Fixture::new();

    assert_eq!(
        fixture.get(&fixture.test_interface, READ_ONLY_PROPERTY),
        Cell::Number(Number::I32(42)),
    );

    assert_eq!(
        fixture.set_error(&fixture.test_interface, READ_ONLY_PROPERTY, int(2)),
        ErrorKind::ReadOnlyViolation,
    );

    assert_eq!(
        fixture.set_error(&fixture.test_interface, METHOD, int(2)),
        ErrorKind::ReadOnlyViolation,
    );

    assert_eq!(
        fixture.set_error(&fixture.test_interface, EVENT, Cell::Nil),
        ErrorKind::ReadOnlyViolation,
    );

    assert_eq!(
        fixture.set_error(&fixture.test_object, EXTENSION_METHOD, Cell::Nil),
        ErrorKind::ReadOnlyViolation,
    );

    assert_eq!(fixture.host(|state| state.read_only), 42);
}

#[test]
fn test_missing_members() {
    let fixture = Fixture::new();

    let error = fixture
        .bridge
        .get(&fixture.test_interface, "ExplicitBaseInterfaceScalarPropety")
        .err();

    match error {
        Some(RuntimeError::UnknownMember {
            capability,
            suggestion,
            ..
        }) => {
            assert_eq!(capability, Some(TypeName::from(BASE_INTERFACE)));
            assert_eq!(suggestion, Some(Ident::from(SCALAR_PROPERTY)));
        }

        other => panic!("unexpected result {other:?}"),
    }

    assert_eq!(
        fixture
            .bridge
            .get(&fixture.test_object, SCALAR_PROPERTY)
            .err()
            .map(|error| error.kind()),
        Some(ErrorKind::UnknownMember),
    );

    assert_eq!(
        fixture.invoke_error(&fixture.test_interface, SCALAR_PROPERTY, Vec::new()),
        ErrorKind::NotInvocable,
    );
}
