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

//! # Ad Astra Bridge
//!
//! A host-object projection bridge: the layer that exposes statically typed
//! host objects to a dynamically typed script environment.
//!
//! The host declares its types with the [TypeBuilder](runtime::TypeBuilder)
//! and registers them in the [Registry](runtime::Registry): classes with
//! properties, fields, overloaded and generic methods, and events;
//! interfaces that the classes implement either implicitly or explicitly;
//! enums and structs. Extension methods are registered over classes or
//! interfaces.
//!
//! A script engine accesses the host objects through the
//! [Bridge](runtime::Bridge):
//!
//!  - Member access (`has_member`, `get`, `set`, `invoke`) operates on the
//!    effective view of a [HostObject](runtime::HostObject) handle: either
//!    the public members of its class, or, after a capability cast, exactly
//!    the members of that interface, including the explicitly implemented
//!    ones.
//!  - Method invocation picks exactly one overload among the instance and
//!    extension candidates, binds generic type arguments from the leading
//!    type witnesses or by inference, and coerces the arguments into the
//!    parameter types.
//!  - Assignments coerce values with the host typing rules: checked numeric
//!    narrowing, enum and struct nominal identity, array element identity,
//!    and read-only members.
//!  - Events are exposed as connectable values whose connections can be
//!    disconnected.
//!
//! The crate logs through the [log](https://docs.rs/log) facade and does
//! not install a logger.

pub mod runtime;

mod exports;
