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
    fmt::{Debug, Display, Formatter},
    mem::take,
    sync::Arc,
};

use crate::runtime::{Cell, Downcast, HostObject, Ident, RuntimeError, RuntimeResult, TypeName};

/// A host-side implementation of a method overload.
///
/// The invoker receives the arguments that the
/// [overload resolution](crate::runtime::Resolver) has already coerced to the
/// parameter types of the chosen [Signature].
pub type Invoker = Arc<dyn Fn(Call) -> RuntimeResult<Cell> + Send + Sync + 'static>;

/// A type of a method parameter or of a method's return value.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ParamType {
    /// A concrete host type.
    Type(TypeName),

    /// A generic parameter of the method, referred to by its index in the
    /// [Signature::generics] list.
    Generic(usize),
}

impl<'a> From<&'a str> for ParamType {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Self::Type(TypeName::from(value))
    }
}

impl From<TypeName> for ParamType {
    #[inline(always)]
    fn from(value: TypeName) -> Self {
        Self::Type(value)
    }
}

/// A description of a parameter in the [Signature].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Param {
    /// The name of the parameter.
    pub name: Ident,

    /// The type of the parameter.
    pub ty: ParamType,
}

/// A constraint that a generic parameter imposes on its type argument.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Constraint {
    /// The type argument must be a value type: a number, a boolean, an enum,
    /// or a struct.
    ValueType,

    /// The type argument must be a reference type.
    ReferenceType,

    /// The type argument must be an enum.
    Enum,

    /// The type argument must be, derive from, or implement the specified
    /// type.
    Implements(TypeName),
}

impl Display for Constraint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ValueType => formatter.write_str("struct"),
            Self::ReferenceType => formatter.write_str("class"),
            Self::Enum => formatter.write_str("enum"),
            Self::Implements(ty) => Display::fmt(ty, formatter),
        }
    }
}

/// A generic parameter of a method [Signature].
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct GenericParam {
    /// The name of the generic parameter (e.g., `T`).
    pub name: Ident,

    /// The constraints on the type argument. All of them must hold.
    pub constraints: Vec<Constraint>,
}

/// A signature of a single method overload.
///
/// The Display implementation renders a canonical view of the signature,
/// such as `fn<T: struct>(name: str, index: i32, arg: T) -> str`.
///
/// ```
/// # use ad_astra_bridge::runtime::{Constraint, Signature};
/// #
/// let signature = Signature::new()
///     .generic("T", [Constraint::ValueType])
///     .param("name", "str")
///     .param("index", "i32")
///     .generic_param("arg", 0)
///     .output("str");
///
/// assert_eq!(signature.arity(), 3);
/// assert_eq!(
///     signature.to_string(),
///     "fn<T: struct>(name: str, index: i32, arg: T) -> str",
/// );
/// ```
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Signature {
    /// The ordered value parameters.
    pub params: Vec<Param>,

    /// The generic parameters. Empty for non-generic methods.
    pub generics: Vec<GenericParam>,

    /// The type of the returned value. None if the method returns nothing.
    pub output: Option<ParamType>,
}

impl Display for Signature {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("fn")?;

        if !self.generics.is_empty() {
            formatter.write_str("<")?;

            let mut is_first = true;

            for generic in &self.generics {
                match is_first {
                    true => is_first = false,
                    false => formatter.write_str(", ")?,
                }

                Display::fmt(&generic.name, formatter)?;

                let mut is_first_constraint = true;

                for constraint in &generic.constraints {
                    match is_first_constraint {
                        true => {
                            is_first_constraint = false;
                            formatter.write_str(": ")?;
                        }

                        false => formatter.write_str(" + ")?,
                    }

                    Display::fmt(constraint, formatter)?;
                }
            }

            formatter.write_str(">")?;
        }

        formatter.write_str("(")?;

        let mut is_first = true;

        for param in &self.params {
            match is_first {
                true => is_first = false,
                false => formatter.write_str(", ")?,
            }

            formatter.write_fmt(format_args!("{}: ", param.name))?;
            self.fmt_type(&param.ty, formatter)?;
        }

        formatter.write_str(")")?;

        if let Some(output) = &self.output {
            formatter.write_str(" -> ")?;
            self.fmt_type(output, formatter)?;
        }

        Ok(())
    }
}

impl Signature {
    /// Creates an empty signature without parameters and without a return
    /// value.
    #[inline(always)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value parameter of a concrete type.
    #[inline]
    pub fn param(mut self, name: impl Into<Ident>, ty: impl Into<TypeName>) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: ParamType::Type(ty.into()),
        });

        self
    }

    /// Appends a value parameter whose type is the generic parameter with the
    /// specified index.
    #[inline]
    pub fn generic_param(mut self, name: impl Into<Ident>, generic: usize) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty: ParamType::Generic(generic),
        });

        self
    }

    /// Appends a generic parameter.
    #[inline]
    pub fn generic(
        mut self,
        name: impl Into<Ident>,
        constraints: impl IntoIterator<Item = Constraint>,
    ) -> Self {
        self.generics.push(GenericParam {
            name: name.into(),
            constraints: constraints.into_iter().collect(),
        });

        self
    }

    /// Sets the type of the returned value.
    #[inline]
    pub fn output(mut self, ty: impl Into<ParamType>) -> Self {
        self.output = Some(ty.into());

        self
    }

    /// Returns the number of value parameters.
    #[inline(always)]
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Returns true if the signature has generic parameters.
    #[inline(always)]
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    /// Substitutes the type arguments into the parameter list.
    ///
    /// Returns None if the number of type arguments does not match the number
    /// of generic parameters.
    pub fn instantiate(&self, type_args: &[TypeName]) -> Option<Vec<TypeName>> {
        if type_args.len() != self.generics.len() {
            return None;
        }

        self.params
            .iter()
            .map(|param| Self::substitute(&param.ty, type_args))
            .collect()
    }

    /// Substitutes the type arguments into the return type.
    #[inline]
    pub fn instantiate_output(&self, type_args: &[TypeName]) -> Option<TypeName> {
        Self::substitute(self.output.as_ref()?, type_args)
    }

    #[inline(always)]
    fn substitute(ty: &ParamType, type_args: &[TypeName]) -> Option<TypeName> {
        match ty {
            ParamType::Type(ty) => Some(ty.clone()),
            ParamType::Generic(index) => type_args.get(*index).cloned(),
        }
    }

    fn fmt_type(&self, ty: &ParamType, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match ty {
            ParamType::Type(ty) => Display::fmt(ty, formatter),

            ParamType::Generic(index) => match self.generics.get(*index) {
                Some(generic) => Display::fmt(&generic.name, formatter),
                None => formatter.write_fmt(format_args!("?{index}")),
            },
        }
    }
}

/// An origin of a method overload.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CandidateOrigin {
    /// The overload is declared by the host type.
    Instance,

    /// The overload is an extension method registered for the specified
    /// receiver type.
    Extension(TypeName),
}

/// A single overload of a method: a signature and its host-side
/// implementation.
#[derive(Clone)]
pub struct Overload {
    pub(crate) signature: Arc<Signature>,
    pub(crate) invoker: Invoker,
    pub(crate) origin: CandidateOrigin,
}

impl Debug for Overload {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("Overload")
            .field("signature", &self.signature.to_string())
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl Overload {
    #[inline(always)]
    pub(crate) fn new(signature: Signature, invoker: Invoker, origin: CandidateOrigin) -> Self {
        Self {
            signature: Arc::new(signature),
            invoker,
            origin,
        }
    }

    /// The signature of this overload.
    #[inline(always)]
    pub fn signature(&self) -> &Arc<Signature> {
        &self.signature
    }

    /// Where this overload comes from.
    #[inline(always)]
    pub fn origin(&self) -> &CandidateOrigin {
        &self.origin
    }
}

/// The arguments of a method invocation passed to the host-side [Invoker].
pub struct Call {
    pub(crate) receiver: Option<HostObject>,
    pub(crate) type_args: Vec<TypeName>,
    pub(crate) args: Vec<Cell>,
}

impl Call {
    /// Returns the handle of the object on which the method is invoked.
    ///
    /// For extension methods, this is the object the extension is applied
    /// to.
    pub fn receiver(&self) -> RuntimeResult<&HostObject> {
        match &self.receiver {
            Some(receiver) => Ok(receiver),

            None => Err(RuntimeError::mismatch(TypeName::from("nil"), "object")),
        }
    }

    /// Returns the type arguments bound to the method's generic parameters.
    #[inline(always)]
    pub fn type_args(&self) -> &[TypeName] {
        &self.type_args
    }

    /// Returns the coerced value arguments.
    #[inline(always)]
    pub fn args(&self) -> &[Cell] {
        &self.args
    }

    /// Takes the argument with the specified index and converts it into a
    /// Rust value. A missing or already taken argument is treated as nil.
    #[inline]
    pub fn take<T: Downcast>(&mut self, index: usize) -> RuntimeResult<T> {
        let cell = match self.args.get_mut(index) {
            Some(cell) => take(cell),
            None => Cell::Nil,
        };

        T::downcast(cell)
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Constraint, Signature, TypeName};

    #[test]
    fn test_signature_instantiation() {
        let signature = Signature::new()
            .generic("T", [Constraint::ValueType])
            .param("name", "str")
            .generic_param("arg", 0)
            .output(crate::runtime::ParamType::Generic(0));

        let instance = signature.instantiate(&[TypeName::from("Test.TestEnum")]);

        assert_eq!(
            instance,
            Some(vec![TypeName::from("str"), TypeName::from("Test.TestEnum")]),
        );

        assert_eq!(signature.instantiate(&[]), None);

        assert_eq!(
            signature.instantiate_output(&[TypeName::from("i8")]),
            Some(TypeName::from("i8")),
        );
    }

    #[test]
    fn test_signature_display() {
        let signature = Signature::new().param("index", "i32");

        assert_eq!(signature.to_string(), "fn(index: i32)");
    }
}
