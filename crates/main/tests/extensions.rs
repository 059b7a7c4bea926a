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
    Bridge,
    BridgeConfig,
    Cell,
    ErrorKind,
    HostObject,
    MemberKind,
    Number,
    Registry,
    Signature,
    TypeBuilder,
    TypeName,
};

use crate::common::{int, str};

mod common;

const SCALAR: &str = "Ext.Scalar";
const ISCALAR: &str = "Ext.IScalar";

fn unary(ty: &str) -> Signature {
    Signature::new().param("value", ty).output("str")
}

fn registry() -> Arc<Registry> {
    let scalar = TypeBuilder::class::<()>(SCALAR)
        .implements(ISCALAR)
        .explicit(ISCALAR)
        .method("Scale", unary("i32"), |_| Ok(str("instance")))
        .method("Shift", unary("i32"), |_| Ok(str("instance")));

    let registry = Registry::builder()
        .register(
            TypeBuilder::interface(ISCALAR)
                .requires("Scale", MemberKind::Method)
                .requires("Shift", MemberKind::Method),
        )
        .register(scalar)
        .extension(ISCALAR, "Scale", unary("i32"), |_| Ok(str("extension")))
        .extension(ISCALAR, "Shift", unary("i64"), |_| Ok(str("extension"))).build()
        .unwrap();

    Arc::new(registry)
}

fn handles(bridge: &Bridge) -> (HostObject, HostObject) {
    let object = bridge.wrap(SCALAR, ()).unwrap();
    let tagged = bridge.cast(&TypeName::from(ISCALAR), &object).unwrap();

    (object, tagged)
}

fn error(bridge: &Bridge, object: &HostObject, name: &str, args: Vec<Cell>) -> Option<ErrorKind> {
    bridge.invoke(object, name, args).err().map(|error| error.kind())
}

#[test]
fn test_instance_and_extension_ambiguity() {
    let bridge = Bridge::new(registry());
    let (object, tagged) = handles(&bridge);

    assert_eq!(
        error(&bridge, &tagged, "Scale", vec![int(4)]),
        Some(ErrorKind::AmbiguousOverload),
    );

    assert_eq!(
        bridge.invoke(&object, "Scale", vec![int(4)]).unwrap(),
        str("extension"),
    );
}

#[test]
fn test_instance_and_extension_tie_break() {
    let bridge = Bridge::new(registry());
    let (_object, tagged) = handles(&bridge);

    assert_eq!(
        bridge.invoke(&tagged, "Shift", vec![int(4)]).unwrap(),
        str("instance"),
    );

    assert_eq!(
        bridge.invoke(&tagged, "Shift", vec![Cell::Number(Number::I64(4))]).unwrap(),
        str("extension"),
    );

    let mut config = BridgeConfig::new();

    config.prefer_exact_numeric = false;

    let strict = Bridge::with_config(registry(), config);
    let (_object, tagged) = handles(&strict);

    assert_eq!(
        error(&strict, &tagged, "Shift", vec![int(4)]),
        Some(ErrorKind::AmbiguousOverload),
    );
}
