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

mod bridge;
mod cache;
mod cell;
mod coercion;
mod config;
mod error;
mod event;
mod ident;
mod invoke;
mod member;
mod object;
mod registry;
mod resolve;
mod ty;
mod view;

pub use crate::{
    exports::{HostArray, Number},
    runtime::{
        bridge::Bridge,
        cache::DescriptorCache,
        cell::{BoundMethod, Cell, EnumValue, ScriptFn, StructValue},
        coercion::{Coercion, Conversion, Downcast, Upcast},
        config::BridgeConfig,
        error::{ErrorKind, NumberCastCause, RegistrationError, RuntimeError, RuntimeResult},
        event::{Connection, ScriptEvent},
        ident::{Ident, TypeName},
        invoke::{
            Call,
            CandidateOrigin,
            Constraint,
            GenericParam,
            Invoker,
            Overload,
            Param,
            ParamType,
            Signature,
        },
        member::{Getter, MemberBinding, MemberDescriptor, MemberKind, Setter},
        object::HostObject,
        registry::{Registry, RegistryBuilder, TypeBuilder},
        resolve::{ArgumentBinding, Resolver},
        ty::{NumKind, TypeFamily, TypeMeta},
        view::{Prototype, View},
    },
};
