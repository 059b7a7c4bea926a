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
    error::Error as StdError,
    fmt::{Debug, Display, Formatter},
    result::Result as StdResult,
    sync::Arc,
};

use crate::runtime::{Constraint, Ident, MemberKind, NumKind, Number, Signature, TypeName};

/// A result of a runtime API call, which can either be a normal value or a
/// [RuntimeError].
pub type RuntimeResult<T> = StdResult<T, RuntimeError>;

/// Represents any error that may occur when a script accesses a host object
/// through the [Bridge](crate::runtime::Bridge).
///
/// This object implements the [Debug] and [Display] traits. The Display
/// implementation provides a brief end-user-facing description of the
/// underlying error.
///
/// To classify the error programmatically, use the [RuntimeError::kind]
/// function, which maps each variant onto a coarse [ErrorKind] category.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum RuntimeError {
    /// The requested type name is not registered in the
    /// [Registry](crate::runtime::Registry).
    UnknownType {
        /// The name of the requested type.
        name: TypeName,
    },

    /// The effective view of the host object does not have a member with the
    /// requested name.
    ///
    /// Members hidden from the view (e.g., explicitly implemented interface
    /// members accessed through an untagged handle) are reported by this
    /// error as well.
    UnknownMember {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The active capability tag of the handle, if any.
        capability: Option<TypeName>,

        /// The name of the requested member.
        member: Ident,

        /// The most similar member name of the view, if any.
        suggestion: Option<Ident>,
    },

    /// The concrete type of the host object does not implement the requested
    /// capability (interface).
    CapabilityNotImplemented {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The requested capability.
        capability: TypeName,
    },

    /// The script attempts to invoke a member that is not a method.
    NotInvocable {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The name of the member.
        member: Ident,

        /// The kind of the member.
        kind: MemberKind,
    },

    /// None of the method overloads accepts the provided arguments.
    NoApplicableOverload {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The name of the method.
        member: Ident,

        /// The data types of the provided arguments.
        arguments: Vec<TypeName>,

        /// The signatures of all overloads available for this call.
        candidates: Vec<Arc<Signature>>,
    },

    /// More than one method overload accepts the provided arguments, and
    /// neither is preferable over the others.
    AmbiguousOverload {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The name of the method.
        member: Ident,

        /// The signatures of the applicable overloads.
        candidates: Vec<Arc<Signature>>,
    },

    /// The number of explicitly supplied type arguments does not match the
    /// number of generic parameters of the method.
    TypeArgumentCount {
        /// The name of the generic method.
        member: Ident,

        /// The number of the method's generic parameters.
        expected: usize,

        /// The number of supplied type witnesses.
        provided: usize,
    },

    /// A generic parameter of the method cannot be inferred from the value
    /// arguments, and the caller did not supply a type witness.
    UninferableTypeArgument {
        /// The name of the generic method.
        member: Ident,

        /// The name of the generic parameter.
        parameter: Ident,
    },

    /// The supplied type witness disagrees with the type inferred from the
    /// value arguments, or two value arguments imply different types for the
    /// same generic parameter.
    TypeArgumentMismatch {
        /// The name of the generic method.
        member: Ident,

        /// The name of the generic parameter.
        parameter: Ident,

        /// The supplied (or the first inferred) type argument.
        provided: TypeName,

        /// The type inferred from the value arguments.
        inferred: TypeName,
    },

    /// The bound type argument does not satisfy a constraint of the generic
    /// parameter.
    ConstraintViolation {
        /// The name of the generic method.
        member: Ident,

        /// The name of the generic parameter.
        parameter: Ident,

        /// The bound type argument.
        argument: TypeName,

        /// The violated constraint.
        constraint: Constraint,
    },

    /// The value cannot be coerced to the target type.
    TypeMismatch {
        /// The data type of the provided value.
        data_type: TypeName,

        /// The types that the target would accept.
        expected_types: Vec<TypeName>,
    },

    /// The numeric value does not fit into the target numeric type.
    NumberCast {
        /// The source numeric type.
        from: NumKind,

        /// The destination numeric type.
        to: NumKind,

        /// The cause of the failure.
        cause: NumberCastCause,

        /// The source numeric value.
        value: Number,
    },

    /// The script attempts to write to a member that cannot be assigned: a
    /// read-only property, a method, or an event.
    ReadOnly {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The name of the member.
        member: Ident,
    },

    /// The host object's state is not of the Rust type that the member
    /// accessor expects.
    HostState {
        /// The concrete type of the host object.
        receiver_type: TypeName,

        /// The Rust type expected by the accessor.
        expected: &'static str,
    },

    /// A host accessor, a host method, or a script callback has failed with
    /// a custom error.
    Host {
        /// The source of the error.
        cause: Arc<dyn StdError + Send + Sync + 'static>,
    },
}

impl Display for RuntimeError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownType { name } => {
                formatter.write_fmt(format_args!("unknown type '{name}'"))
            }

            Self::UnknownMember {
                receiver_type,
                capability,
                member,
                suggestion,
            } => {
                match capability {
                    Some(capability) => formatter.write_fmt(format_args!(
                        "'{receiver_type}' viewed as '{capability}' does not have member \
                        '{member}'"
                    ))?,

                    None => formatter.write_fmt(format_args!(
                        "type '{receiver_type}' does not have member '{member}'"
                    ))?,
                }

                match suggestion {
                    Some(suggestion) => {
                        formatter.write_fmt(format_args!(", did you mean '{suggestion}'?"))
                    }

                    None => Ok(()),
                }
            }

            Self::CapabilityNotImplemented {
                receiver_type,
                capability,
            } => formatter.write_fmt(format_args!(
                "type '{receiver_type}' does not implement '{capability}'"
            )),

            Self::NotInvocable {
                receiver_type,
                member,
                kind,
            } => formatter.write_fmt(format_args!(
                "{kind} '{receiver_type}.{member}' cannot be invoked"
            )),

            Self::NoApplicableOverload {
                receiver_type,
                member,
                arguments,
                ..
            } => {
                let arguments = arguments
                    .iter()
                    .map(TypeName::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");

                formatter.write_fmt(format_args!(
                    "no overload of '{receiver_type}.{member}' accepts arguments ({arguments})"
                ))
            }

            Self::AmbiguousOverload {
                receiver_type,
                member,
                candidates,
            } => formatter.write_fmt(format_args!(
                "the call of '{receiver_type}.{member}' is ambiguous between {} overloads",
                candidates.len(),
            )),

            Self::TypeArgumentCount {
                member,
                expected,
                provided,
            } => formatter.write_fmt(format_args!(
                "'{member}' expects {expected} type arguments, but {provided} provided"
            )),

            Self::UninferableTypeArgument { member, parameter } => formatter.write_fmt(
                format_args!("cannot infer type argument '{parameter}' of '{member}'"),
            ),

            Self::TypeArgumentMismatch {
                member,
                parameter,
                provided,
                inferred,
            } => formatter.write_fmt(format_args!(
                "type argument '{parameter}' of '{member}' is '{provided}', but the \
                arguments imply '{inferred}'"
            )),

            Self::ConstraintViolation {
                member,
                parameter,
                argument,
                constraint,
            } => formatter.write_fmt(format_args!(
                "type '{argument}' does not satisfy constraint '{constraint}' of type \
                parameter '{parameter}' of '{member}'"
            )),

            Self::TypeMismatch {
                data_type,
                expected_types,
            } => match expected_types.is_empty() {
                true => formatter.write_fmt(format_args!("unexpected '{data_type}' data type")),

                false => {
                    let expected = expected_types
                        .iter()
                        .map(|ty| format!("'{ty}'"))
                        .collect::<Vec<_>>()
                        .join(", or ");

                    formatter.write_fmt(format_args!(
                        "expected {expected}, but '{data_type}' data type provided"
                    ))
                }
            },

            Self::NumberCast {
                from,
                to,
                cause,
                value,
            } => {
                use NumberCastCause::*;

                match cause {
                    Infinite => formatter.write_fmt(format_args!(
                        "cannot cast infinity value of {from} type to {to}"
                    )),

                    NAN => formatter
                        .write_fmt(format_args!("cannot cast NAN value of {from} type to {to}")),

                    Overflow | Underflow => {
                        formatter.write_fmt(format_args!("cannot cast {value}{from} to {to} type"))
                    }
                }
            }

            Self::ReadOnly {
                receiver_type,
                member,
            } => formatter.write_fmt(format_args!(
                "member '{receiver_type}.{member}' is read-only"
            )),

            Self::HostState {
                receiver_type,
                expected,
            } => formatter.write_fmt(format_args!(
                "the state of '{receiver_type}' object is not '{expected}'"
            )),

            Self::Host { cause } => Display::fmt(cause, formatter),
        }
    }
}

impl StdError for RuntimeError {
    #[inline]
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Host { cause } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

impl RuntimeError {
    /// Wraps an arbitrary error raised by host code into a RuntimeError.
    #[inline(always)]
    pub fn host(cause: impl StdError + Send + Sync + 'static) -> Self {
        Self::Host {
            cause: Arc::new(cause),
        }
    }

    /// Classifies this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownType { .. } => ErrorKind::UnknownType,
            Self::UnknownMember { .. } => ErrorKind::UnknownMember,
            Self::CapabilityNotImplemented { .. } => ErrorKind::CapabilityNotImplemented,
            Self::NotInvocable { .. } => ErrorKind::NotInvocable,
            Self::NoApplicableOverload { .. } => ErrorKind::NoApplicableOverload,
            Self::AmbiguousOverload { .. } => ErrorKind::AmbiguousOverload,
            Self::TypeArgumentCount { .. } => ErrorKind::TypeArgumentCountMismatch,
            Self::UninferableTypeArgument { .. } => ErrorKind::TypeArgumentCountMismatch,
            Self::TypeArgumentMismatch { .. } => ErrorKind::TypeArgumentMismatch,
            Self::ConstraintViolation { .. } => ErrorKind::ConstraintViolation,
            Self::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Self::NumberCast { .. } => ErrorKind::Overflow,
            Self::ReadOnly { .. } => ErrorKind::ReadOnlyViolation,
            Self::HostState { .. } => ErrorKind::Host,
            Self::Host { .. } => ErrorKind::Host,
        }
    }

    /// Returns true if this error is a failure to bind the type arguments of
    /// a generic method.
    #[inline(always)]
    pub fn is_generic_binding(&self) -> bool {
        match self.kind() {
            ErrorKind::TypeArgumentCountMismatch
            | ErrorKind::TypeArgumentMismatch
            | ErrorKind::ConstraintViolation => true,
            _ => false,
        }
    }

    #[inline(always)]
    pub(crate) fn mismatch(data_type: TypeName, expected: impl Into<TypeName>) -> Self {
        Self::TypeMismatch {
            data_type,
            expected_types: Vec::from([expected.into()]),
        }
    }
}

/// A coarse classification of [RuntimeError] variants.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [RuntimeError::UnknownType].
    UnknownType,

    /// See [RuntimeError::UnknownMember].
    UnknownMember,

    /// See [RuntimeError::CapabilityNotImplemented].
    CapabilityNotImplemented,

    /// See [RuntimeError::NotInvocable].
    NotInvocable,

    /// See [RuntimeError::NoApplicableOverload].
    NoApplicableOverload,

    /// See [RuntimeError::AmbiguousOverload].
    AmbiguousOverload,

    /// See [RuntimeError::TypeArgumentCount] and
    /// [RuntimeError::UninferableTypeArgument].
    TypeArgumentCountMismatch,

    /// See [RuntimeError::TypeArgumentMismatch].
    TypeArgumentMismatch,

    /// See [RuntimeError::ConstraintViolation].
    ConstraintViolation,

    /// See [RuntimeError::TypeMismatch].
    TypeMismatch,

    /// See [RuntimeError::NumberCast].
    Overflow,

    /// See [RuntimeError::ReadOnly].
    ReadOnlyViolation,

    /// See [RuntimeError::Host] and [RuntimeError::HostState].
    Host,
}

/// A type of the [RuntimeError::NumberCast] error.
///
/// This object describes the reason why the source numeric value cannot be
/// converted into the destination numeric value.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NumberCastCause {
    /// The target type does not support representation of infinite numbers.
    Infinite,

    /// The target type does not support representation of NaN numbers.
    NAN,

    /// The source numeric value is too large for the range of the target type.
    Overflow,

    /// The source numeric value is too small for the range of the target type.
    Underflow,
}

impl From<cast::Error> for NumberCastCause {
    #[inline(always)]
    fn from(value: cast::Error) -> Self {
        match value {
            cast::Error::Infinite => Self::Infinite,
            cast::Error::NaN => Self::NAN,
            cast::Error::Overflow => Self::Overflow,
            cast::Error::Underflow => Self::Underflow,
        }
    }
}

/// An error that occurs when the [RegistryBuilder](crate::runtime::RegistryBuilder)
/// rejects an inconsistent host type model.
#[derive(Clone, PartialEq, Eq, Debug)]
#[non_exhaustive]
pub enum RegistrationError {
    /// The type is registered more than once.
    DuplicateType {
        /// The name of the type.
        name: TypeName,
    },

    /// The type declares two members with the same name and binding, and at
    /// least one of them is not a method.
    DuplicateMember {
        /// The declaring type.
        owner: TypeName,

        /// The name of the member.
        member: Ident,
    },

    /// The type refers to a type that is not registered.
    UnknownType {
        /// The type that contains the reference.
        owner: TypeName,

        /// The referenced name.
        name: TypeName,
    },

    /// The type refers to a type of an unexpected family (e.g., a class
    /// implementing a struct, or an extension over a number).
    UnexpectedFamily {
        /// The type that contains the reference.
        owner: TypeName,

        /// The referenced name.
        name: TypeName,

        /// The family the reference requires.
        expected: &'static str,
    },

    /// The class chain or the interface hierarchy is cyclic.
    Cycle {
        /// A type that participates in the cycle.
        name: TypeName,
    },

    /// The class binds a member to an interface it does not implement.
    UnimplementedCapability {
        /// The class.
        owner: TypeName,

        /// The bound member.
        member: Ident,

        /// The interface the member is bound to.
        capability: TypeName,
    },

    /// The class binds a member to an interface whose contract does not
    /// declare such a member (or declares a member of another kind).
    ContractMismatch {
        /// The class.
        owner: TypeName,

        /// The bound member.
        member: Ident,

        /// The interface the member is bound to.
        capability: TypeName,
    },

    /// The class implements an interface but does not provide one of its
    /// contract members.
    MissingContractMember {
        /// The class.
        owner: TypeName,

        /// The interface.
        capability: TypeName,

        /// The name of the missing member.
        member: Ident,
    },
}

impl Display for RegistrationError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateType { name } => {
                formatter.write_fmt(format_args!("type '{name}' registered more than once"))
            }

            Self::DuplicateMember { owner, member } => formatter.write_fmt(format_args!(
                "type '{owner}' declares member '{member}' more than once"
            )),

            Self::UnknownType { owner, name } => formatter.write_fmt(format_args!(
                "type '{owner}' refers to unknown type '{name}'"
            )),

            Self::UnexpectedFamily {
                owner,
                name,
                expected,
            } => formatter.write_fmt(format_args!(
                "type '{owner}' refers to '{name}', which is not {expected}"
            )),

            Self::Cycle { name } => {
                formatter.write_fmt(format_args!("type '{name}' inherits from itself"))
            }

            Self::UnimplementedCapability {
                owner,
                member,
                capability,
            } => formatter.write_fmt(format_args!(
                "member '{owner}.{member}' is bound to '{capability}', which '{owner}' does \
                not implement"
            )),

            Self::ContractMismatch {
                owner,
                member,
                capability,
            } => formatter.write_fmt(format_args!(
                "member '{owner}.{member}' does not match any member of '{capability}'"
            )),

            Self::MissingContractMember {
                owner,
                capability,
                member,
            } => formatter.write_fmt(format_args!(
                "type '{owner}' does not provide member '{member}' of '{capability}'"
            )),
        }
    }
}

impl StdError for RegistrationError {}

#[cfg(test)]
mod tests {
    use crate::runtime::{ErrorKind, Ident, NumKind, Number, NumberCastCause, RuntimeError};

    #[test]
    fn test_error_kinds() {
        let error = RuntimeError::NumberCast {
            from: NumKind::I32,
            to: NumKind::I16,
            cause: NumberCastCause::Overflow,
            value: Number::I32(54321),
        };

        assert_eq!(error.kind(), ErrorKind::Overflow);
        assert_eq!(error.to_string(), "cannot cast 54321i32 to i16 type");

        let error = RuntimeError::UninferableTypeArgument {
            member: Ident::from("Method"),
            parameter: Ident::from("T"),
        };

        assert_eq!(error.kind(), ErrorKind::TypeArgumentCountMismatch);
        assert!(error.is_generic_binding());
    }

    #[test]
    fn test_mismatch_message() {
        let error = RuntimeError::TypeMismatch {
            data_type: "f64[]".into(),
            expected_types: vec!["i32[]".into(), "object".into()],
        };

        assert_eq!(
            error.to_string(),
            "expected 'i32[]', or 'object', but 'f64[]' data type provided",
        );
    }
}
