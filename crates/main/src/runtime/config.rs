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

/// A general configuration object for the [Bridge](crate::runtime::Bridge).
#[derive(Clone, Copy, PartialEq, Debug)]
#[non_exhaustive]
pub struct BridgeConfig {
    /// If set to true, the bare numeric zero is accepted as a value of any
    /// enum type, regardless of whether the enum has a variant with the zero
    /// discriminant. Any other bare number assigned to an enum target is
    /// rejected in either case.
    ///
    /// The default value is true.
    pub zero_enum_sentinel: bool,

    /// If set to true, when more than one method overload accepts the call
    /// arguments, the overload that does not require numeric conversions of
    /// the arguments wins. Otherwise, such calls are always ambiguous.
    ///
    /// The default value is true.
    pub prefer_exact_numeric: bool,

    /// If set to true, floating-point values without a fractional part (e.g.,
    /// `4.0`) are accepted by integer targets. Otherwise, integer targets
    /// accept integer values only.
    ///
    /// The default value is true.
    pub integral_float_narrowing: bool,

    /// The minimum normalized similarity between a missing member name and a
    /// member of the view for the latter to be suggested in the
    /// [UnknownMember](crate::runtime::RuntimeError::UnknownMember) error.
    ///
    /// Set this value to 1.0 or more to disable suggestions.
    ///
    /// The default value is 0.7.
    pub suggestion_threshold: f32,
}

impl Default for BridgeConfig {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeConfig {
    /// The default constructor for this configuration object.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            zero_enum_sentinel: true,
            prefer_exact_numeric: true,
            integral_float_narrowing: true,
            suggestion_threshold: 0.7,
        }
    }
}
