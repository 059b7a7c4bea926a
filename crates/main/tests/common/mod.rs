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

#![allow(dead_code)]

use ad_astra_bridge::runtime::{
    Bridge,
    Call,
    Cell,
    Constraint,
    EnumValue,
    ErrorKind,
    HostArray,
    HostObject,
    MemberKind,
    Number,
    Registry,
    RuntimeResult,
    Signature,
    StructValue,
    TypeBuilder,
    TypeName,
};

pub const TEST_OBJECT: &str = "Test.TestObject";
pub const TEST_INTERFACE: &str = "Test.ITestInterface";
pub const BASE_INTERFACE: &str = "Test.IExplicitBaseTestInterface";
pub const OTHER_INTERFACE: &str = "Test.IOtherInterface";
pub const TEST_ENUM: &str = "Test.TestEnum";
pub const TIME_SPAN: &str = "Test.TimeSpan";
pub const DATE_TIME: &str = "Test.DateTime";

pub const PROPERTY: &str = "ExplicitBaseInterfaceProperty";
pub const SCALAR_PROPERTY: &str = "ExplicitBaseInterfaceScalarProperty";
pub const ENUM_PROPERTY: &str = "ExplicitBaseInterfaceEnumProperty";
pub const STRUCT_PROPERTY: &str = "ExplicitBaseInterfaceStructProperty";
pub const READ_ONLY_PROPERTY: &str = "ExplicitBaseInterfaceReadOnlyProperty";
pub const EVENT: &str = "ExplicitBaseInterfaceEvent";
pub const METHOD: &str = "ExplicitBaseInterfaceMethod";
pub const FIRE_EVENT: &str = "ExplicitBaseInterfaceFireEvent";
pub const EXTENSION_METHOD: &str = "ExplicitBaseInterfaceExtensionMethod";

pub const TICKS_PER_SECOND: i64 = 10_000_000;

pub struct TestObject {
    pub name: String,
    pub array: Option<HostArray>,
    pub scalar: i16,
    pub enumeration: EnumValue,
    pub structure: StructValue,
    pub read_only: i32,
}

impl Default for TestObject {
    fn default() -> Self {
        Self {
            name: String::from("test"),
            array: None,
            scalar: 0,
            enumeration: EnumValue::new(TEST_ENUM, 0),
            structure: time_span(0),
            read_only: 42,
        }
    }
}

pub struct Fixture {
    pub bridge: Bridge,
    pub test_object: HostObject,
    pub test_interface: HostObject,
}

impl Fixture {
    pub fn new() -> Self {
        let bridge = Bridge::new(registry());

        let test_object = bridge.wrap(TEST_OBJECT, TestObject::default()).unwrap();

        let test_interface = bridge.cast(&TypeName::from(BASE_INTERFACE), &test_object).unwrap();

        Self {
            bridge,
            test_object,
            test_interface,
        }
    }

    pub fn host<R>(&self, function: impl FnOnce(&mut TestObject) -> R) -> R {
        self.test_object.write(function).unwrap()
    }

    pub fn get(&self, object: &HostObject, name: &str) -> Cell {
        self.bridge.get(object, name).unwrap()
    }

    pub fn set(&self, object: &HostObject, name: &str, value: Cell) {
        self.bridge.set(object, name, value).unwrap()
    }

    pub fn invoke(&self, object: &HostObject, name: &str, args: Vec<Cell>) -> Cell {
        self.bridge.invoke(object, name, args).unwrap()
    }

    pub fn set_error(&self, object: &HostObject, name: &str, value: Cell) -> ErrorKind {
        match self.bridge.set(object, name, value) {
            Ok(()) => panic!("assignment to {name} succeeded"),
            Err(error) => error.kind(),
        }
    }

    pub fn invoke_error(&self, object: &HostObject, name: &str, args: Vec<Cell>) -> ErrorKind {
        match self.bridge.invoke(object, name, args) {
            Ok(result) => panic!("invocation of {name} succeeded: {result:?}"),
            Err(error) => error.kind(),
        }
    }
}

pub fn registry() -> Registry {
    let explicit_base = TypeBuilder::interface(BASE_INTERFACE)
        .requires(PROPERTY, MemberKind::Property)
        .requires(SCALAR_PROPERTY, MemberKind::Property)
        .requires(ENUM_PROPERTY, MemberKind::Property)
        .requires(STRUCT_PROPERTY, MemberKind::Property)
        .requires(READ_ONLY_PROPERTY, MemberKind::ReadOnlyProperty)
        .requires(EVENT, MemberKind::Event)
        .requires(METHOD, MemberKind::Method)
        .requires(FIRE_EVENT, MemberKind::Method);

    let test_object = TypeBuilder::class::<TestObject>(TEST_OBJECT)
        .implements(TEST_INTERFACE)
        .property(
            "Name",
            "str",
            |state| state.name.clone(),
            |state, value| state.name = value,
        )
        .explicit(BASE_INTERFACE)
        .property(
            PROPERTY,
            "i32[]",
            |state| state.array.clone(),
            |state, value| state.array = value,
        )
        .property(
            SCALAR_PROPERTY,
            "i16",
            |state| state.scalar,
            |state, value| state.scalar = value,
        )
        .property(
            ENUM_PROPERTY,
            TEST_ENUM,
            |state| state.enumeration.clone(),
            |state, value| state.enumeration = value,
        )
        .property(
            STRUCT_PROPERTY,
            TIME_SPAN,
            |state| state.structure.clone(),
            |state, value| state.structure = value,
        )
        .readonly_property(READ_ONLY_PROPERTY, "i32", |state| state.read_only)
        .event(EVENT, "i32")
        .method(METHOD, plain_signature(), |call| describe(METHOD, &call))
        .method(METHOD, generic_signature(), |call| describe(METHOD, &call))
        .method(METHOD, explicit_signature(), |call| describe(METHOD, &call))
        .method(
            FIRE_EVENT,
            Signature::new().param("arg", "i32"),
            |mut call| {
                let arg = call.take::<i32>(0)?;

                call.receiver()?
                    .raise(TEST_OBJECT, EVENT, Cell::Number(Number::I32(arg)))?;

                Ok(Cell::Nil)
            },
        );

    Registry::builder()
        .register(
            TypeBuilder::enumeration(TEST_ENUM)
                .variant("First", 0)
                .variant("Second", 1)
                .variant("Third", 2)
                .variant("Fourth", 3)
                .variant("Fifth", 4),
        )
        .register(TypeBuilder::structure(TIME_SPAN).layout_field("Ticks", "i64"))
        .register(TypeBuilder::structure(DATE_TIME).layout_field("Ticks", "i64"))
        .register(explicit_base)
        .register(TypeBuilder::interface(TEST_INTERFACE).implements(BASE_INTERFACE))
        .register(TypeBuilder::interface(OTHER_INTERFACE))
        .register(test_object)
        .extension(BASE_INTERFACE, EXTENSION_METHOD, plain_signature(), |call| {
            describe(EXTENSION_METHOD, &call)
        })
        .extension(BASE_INTERFACE, EXTENSION_METHOD, generic_signature(), |call| {
            describe(EXTENSION_METHOD, &call)
        })
        .extension(BASE_INTERFACE, EXTENSION_METHOD, explicit_signature(), |call| {
            describe(EXTENSION_METHOD, &call)
        })
        .build()
        .unwrap()
}

// fn(a: str, b: i32) -> str
fn plain_signature() -> Signature {
    Signature::new()
        .param("a", "str")
        .param("b", "i32")
        .output("str")
}

// fn<T: struct>(a: str, b: i32, c: T) -> str
fn generic_signature() -> Signature {
    Signature::new()
        .generic("T", [Constraint::ValueType])
        .param("a", "str")
        .param("b", "i32")
        .generic_param("c", 0)
        .output("str")
}

// fn<T: struct>(b: i32) -> str
fn explicit_signature() -> Signature {
    Signature::new()
        .generic("T", [Constraint::ValueType])
        .param("b", "i32")
        .output("str")
}

fn describe(name: &str, call: &Call) -> RuntimeResult<Cell> {
    let receiver = call.receiver()?;
    let read_only = receiver.read(|state: &TestObject| state.read_only)?;

    let type_args = call
        .type_args()
        .iter()
        .map(TypeName::as_str)
        .collect::<Vec<_>>();

    Ok(expected(name, read_only, &type_args, call.args()))
}

/// The value the test methods return for the specified type arguments and
/// arguments, computed without the bridge.
pub fn expected(name: &str, read_only: i32, type_args: &[&str], args: &[Cell]) -> Cell {
    let args = args
        .iter()
        .map(|arg| format!("{arg:?}"))
        .collect::<Vec<_>>();

    Cell::Str(format!("{name}#{read_only}<{}>({})", type_args.join(", "), args.join(", ")).into())
}

pub fn str(value: &str) -> Cell {
    Cell::Str(value.into())
}

pub fn int(value: i32) -> Cell {
    Cell::Number(Number::I32(value))
}

pub fn test_enum(value: i64) -> Cell {
    Cell::Enum(EnumValue::new(TEST_ENUM, value))
}

pub fn ty(name: &str) -> Cell {
    Cell::Type(TypeName::from(name))
}

pub fn time_span(ticks: i64) -> StructValue {
    StructValue::new(TIME_SPAN, [Cell::Number(Number::I64(ticks))])
}

pub fn date_time(ticks: i64) -> StructValue {
    StructValue::new(DATE_TIME, [Cell::Number(Number::I64(ticks))])
}
