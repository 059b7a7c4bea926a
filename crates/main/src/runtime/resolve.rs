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

use log::{debug, trace};

use crate::runtime::{
    BridgeConfig,
    Call,
    Cell,
    Coercion,
    Conversion,
    HostObject,
    Ident,
    Overload,
    ParamType,
    Registry,
    RuntimeError,
    RuntimeResult,
    Signature,
    TypeName,
};

/// One resolved method call: the chosen overload, the bound type arguments,
/// and the arguments coerced into the parameter types.
pub struct ArgumentBinding {
    overload: Overload,
    type_args: Vec<TypeName>,
    args: Vec<Cell>,
}

impl ArgumentBinding {
    /// The chosen overload.
    #[inline(always)]
    pub fn overload(&self) -> &Overload {
        &self.overload
    }

    /// The signature of the chosen overload.
    #[inline(always)]
    pub fn signature(&self) -> &Arc<Signature> {
        self.overload.signature()
    }

    /// The type arguments bound to the generic parameters of the signature.
    /// Empty for non-generic overloads.
    #[inline(always)]
    pub fn type_args(&self) -> &[TypeName] {
        &self.type_args
    }

    /// The coerced value arguments.
    #[inline(always)]
    pub fn args(&self) -> &[Cell] {
        &self.args
    }

    /// The return type of the signature instantiated with the type
    /// arguments.
    #[inline(always)]
    pub fn output(&self) -> Option<TypeName> {
        self.overload.signature().instantiate_output(&self.type_args)
    }

    /// Calls the host implementation of the overload.
    pub fn invoke(self, receiver: Option<HostObject>) -> RuntimeResult<Cell> {
        let invoker = self.overload.invoker.clone();

        invoker(Call {
            receiver,
            type_args: self.type_args,
            args: self.args,
        })
    }
}

/// The Overload Resolver together with the Generic Binder.
///
/// The resolver filters the candidate overloads by arity, binds the type
/// arguments of the generic candidates, checks every argument against the
/// instantiated parameter types without coercing it, and picks exactly one
/// applicable candidate.
///
/// A generic candidate accepts its type arguments in one of the following
/// forms:
///
///  - Inferred: no type witnesses; every type argument is the runtime type
///    of a value argument passed to a parameter of that generic type.
///  - Explicit: the call starts with exactly as many type witnesses
///    ([Cell::Type]) as the candidate has generic parameters. The value
///    arguments passed to the generic parameters must be compatible with the
///    witnesses, so a witness that merely duplicates the inferred type is
///    accepted as well.
///
/// The resolver does not distinguish instance methods from extension
/// methods.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    registry: &'a Registry,
    config: &'a BridgeConfig,
}

struct Applicable<'c> {
    overload: &'c Overload,
    type_args: Vec<TypeName>,
    params: Vec<TypeName>,
    witnesses: usize,
    numeric: bool,
}

impl<'a> Resolver<'a> {
    #[inline(always)]
    pub fn new(registry: &'a Registry, config: &'a BridgeConfig) -> Self {
        Self { registry, config }
    }

    /// Picks the overload applicable to the arguments and coerces the
    /// arguments into its parameter types.
    ///
    /// If no candidate is applicable, the first generic binding failure (in
    /// candidate order) is reported if there is one, otherwise the function
    /// fails with [RuntimeError::NoApplicableOverload]. If several candidates
    /// are applicable and exactly one of them requires no numeric
    /// conversions, that candidate is chosen. Otherwise the function fails
    /// with [RuntimeError::AmbiguousOverload].
    pub fn resolve(
        &self,
        receiver_type: &TypeName,
        member: &Ident,
        candidates: &[Overload],
        args: Vec<Cell>,
    ) -> RuntimeResult<ArgumentBinding> {
        let coercion = Coercion::new(self.registry, self.config);

        let mut applicable = Vec::new();
        let mut binding_error = None;

        for overload in candidates {
            match self.applicable(&coercion, member, overload, &args) {
                Ok(Some(candidate)) => applicable.push(candidate),

                Ok(None) => (),

                Err(error) => {
                    trace!("{member}: candidate {} rejected: {error}", overload.signature());

                    if binding_error.is_none() && error.is_generic_binding() {
                        binding_error = Some(error);
                    }
                }
            }
        }

        let chosen = match applicable.len() {
            0 => {
                if let Some(error) = binding_error {
                    return Err(error);
                }

                return Err(RuntimeError::NoApplicableOverload {
                    receiver_type: receiver_type.clone(),
                    member: member.clone(),
                    arguments: args.iter().map(Cell::data_type).collect(),
                    candidates: candidates
                        .iter()
                        .map(|overload| overload.signature().clone())
                        .collect(),
                });
            }

            1 => applicable.remove(0),

            _ => {
                let exact = applicable
                    .iter()
                    .filter(|candidate| !candidate.numeric)
                    .count();

                if !self.config.prefer_exact_numeric || exact != 1 {
                    return Err(RuntimeError::AmbiguousOverload {
                        receiver_type: receiver_type.clone(),
                        member: member.clone(),
                        candidates: applicable
                            .iter()
                            .map(|candidate| candidate.overload.signature().clone())
                            .collect(),
                    });
                }

                let index = applicable
                    .iter()
                    .position(|candidate| !candidate.numeric)
                    .unwrap_or_default();

                applicable.remove(index)
            }
        };

        debug!(
            "{receiver_type}.{member} resolved to {}.",
            chosen.overload.signature(),
        );

        let mut coerced = Vec::with_capacity(chosen.params.len());

        for (arg, param) in args.into_iter().skip(chosen.witnesses).zip(&chosen.params) {
            coerced.push(coercion.coerce(arg, param)?);
        }

        Ok(ArgumentBinding {
            overload: chosen.overload.clone(),
            type_args: chosen.type_args,
            args: coerced,
        })
    }

    /// Binds the type arguments of a generic signature.
    ///
    /// The `witnesses` are the explicitly supplied type arguments (possibly
    /// empty), and the `args` are the value arguments.
    pub fn bind_generic(
        &self,
        member: &Ident,
        signature: &Signature,
        witnesses: &[TypeName],
        args: &[Cell],
    ) -> RuntimeResult<Vec<TypeName>> {
        let coercion = Coercion::new(self.registry, self.config);
        let generics = signature.generics.len();

        if !witnesses.is_empty() && witnesses.len() != generics {
            return Err(RuntimeError::TypeArgumentCount {
                member: member.clone(),
                expected: generics,
                provided: witnesses.len(),
            });
        }

        let mut inferred = vec![None::<TypeName>; generics];

        for (param, arg) in signature.params.iter().zip(args) {
            let ParamType::Generic(index) = &param.ty else {
                continue;
            };

            let Some(generic) = signature.generics.get(*index) else {
                continue;
            };

            if let Some(witness) = witnesses.get(*index) {
                if coercion.check(arg, witness).is_err() {
                    return Err(RuntimeError::TypeArgumentMismatch {
                        member: member.clone(),
                        parameter: generic.name.clone(),
                        provided: witness.clone(),
                        inferred: arg.data_type(),
                    });
                }

                continue;
            }

            let Some(runtime_type) = arg.runtime_type() else {
                continue;
            };

            match &inferred[*index] {
                None => inferred[*index] = Some(runtime_type),

                Some(previous) if previous == &runtime_type => (),

                Some(previous) => {
                    return Err(RuntimeError::TypeArgumentMismatch {
                        member: member.clone(),
                        parameter: generic.name.clone(),
                        provided: previous.clone(),
                        inferred: runtime_type,
                    });
                }
            }
        }

        let mut type_args = Vec::with_capacity(generics);

        for (index, generic) in signature.generics.iter().enumerate() {
            let ty = match witnesses.get(index) {
                Some(witness) => witness.clone(),

                None => match inferred[index].take() {
                    Some(ty) => ty,

                    None => {
                        return Err(RuntimeError::UninferableTypeArgument {
                            member: member.clone(),
                            parameter: generic.name.clone(),
                        })
                    }
                },
            };

            for constraint in &generic.constraints {
                if !self.registry.satisfies(&ty, constraint)? {
                    return Err(RuntimeError::ConstraintViolation {
                        member: member.clone(),
                        parameter: generic.name.clone(),
                        argument: ty,
                        constraint: constraint.clone(),
                    });
                }
            }

            type_args.push(ty);
        }

        Ok(type_args)
    }

    // Returns None if the candidate does not accept this number of
    // arguments.
    fn applicable<'c>(
        &self,
        coercion: &Coercion,
        member: &Ident,
        overload: &'c Overload,
        args: &[Cell],
    ) -> RuntimeResult<Option<Applicable<'c>>> {
        let signature = overload.signature();
        let arity = signature.arity();

        let Some(witnesses) = args.len().checked_sub(arity) else {
            trace!("{member}: candidate {signature} skipped by arity.");
            return Ok(None);
        };

        if witnesses > 0 {
            let leading = args
                .iter()
                .take(witnesses)
                .all(|arg| matches!(arg, Cell::Type(_)));

            if !signature.is_generic() || !leading {
                trace!("{member}: candidate {signature} skipped by arity.");
                return Ok(None);
            }
        }

        let witness_types = args
            .iter()
            .take(witnesses)
            .filter_map(|arg| match arg {
                Cell::Type(ty) => Some(ty.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();

        let values = &args[witnesses..];

        let type_args = match signature.is_generic() {
            true => self.bind_generic(member, signature, &witness_types, values)?,
            false => Vec::new(),
        };

        let Some(params) = signature.instantiate(&type_args) else {
            return Ok(None);
        };

        let mut numeric = false;

        for (arg, param) in values.iter().zip(&params) {
            match coercion.check(arg, param) {
                Ok(Conversion::Numeric) => numeric = true,
                Ok(_) => (),

                Err(error) => {
                    trace!("{member}: candidate {signature} is not applicable: {error}");
                    return Ok(None);
                }
            }
        }

        Ok(Some(Applicable {
            overload,
            type_args,
            params,
            witnesses,
            numeric,
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::runtime::{
        BridgeConfig,
        CandidateOrigin,
        Cell,
        Constraint,
        EnumValue,
        ErrorKind,
        Ident,
        Number,
        Overload,
        Registry,
        Resolver,
        Signature,
        TypeBuilder,
        TypeName,
    };

    fn registry() -> Registry {
        Registry::builder()
            .register(
                TypeBuilder::enumeration("Test.TestEnum")
                    .variant("First", 0)
                    .variant("Second", 1),
            )
            .build()
            .unwrap()
    }

    fn overload(signature: Signature) -> Overload {
        Overload::new(
            signature,
            Arc::new(|call| Ok(Cell::Number(Number::U64(call.args().len() as u64)))),
            CandidateOrigin::Instance,
        )
    }

    fn candidates() -> Vec<Overload> {
        vec![
            overload(Signature::new().param("name", "str").param("index", "i32")),
            overload(
                Signature::new()
                    .generic("T", [Constraint::ValueType])
                    .param("name", "str")
                    .param("index", "i32")
                    .generic_param("arg", 0),
            ),
            overload(
                Signature::new()
                    .generic("T", [Constraint::ValueType])
                    .param("index", "i32"),
            ),
        ]
    }

    fn resolve(args: Vec<Cell>) -> Result<(usize, Vec<TypeName>), ErrorKind> {
        let registry = registry();
        let config = BridgeConfig::new();
        let resolver = Resolver::new(&registry, &config);
        let candidates = candidates();

        let binding = resolver
            .resolve(&"Test.TestObject".into(), &Ident::from("Method"), &candidates, args)
            .map_err(|error| error.kind())?;

        let index = candidates
            .iter()
            .position(|candidate| candidate.signature() == binding.signature())
            .unwrap_or_else(|| panic!("unknown candidate"));

        Ok((index, binding.type_args().to_vec()))
    }

    fn str(value: &str) -> Cell {
        Cell::Str(value.into())
    }

    fn second() -> Cell {
        Cell::Enum(EnumValue::new("Test.TestEnum", 1))
    }

    #[test]
    fn test_plain_overloads() {
        assert_eq!(resolve(vec![str("foo"), Cell::Number(Number::I32(4))]), Ok((0, vec![])));

        assert_eq!(
            resolve(vec![str("foo"), second()]),
            Err(ErrorKind::NoApplicableOverload),
        );
    }

    #[test]
    fn test_generic_forms() {
        let test_enum = TypeName::from("Test.TestEnum");

        assert_eq!(
            resolve(vec![str("foo"), Cell::Number(Number::I32(4)), second()]),
            Ok((1, vec![test_enum.clone()])),
        );

        assert_eq!(
            resolve(vec![
                Cell::Type(test_enum.clone()),
                str("foo"),
                Cell::Number(Number::I32(4)),
                second(),
            ]),
            Ok((1, vec![test_enum.clone()])),
        );

        assert_eq!(
            resolve(vec![
                Cell::Type("i32".into()),
                str("foo"),
                Cell::Number(Number::I32(4)),
                second(),
            ]),
            Err(ErrorKind::TypeArgumentMismatch),
        );

        assert_eq!(
            resolve(vec![Cell::Type(test_enum.clone()), Cell::Number(Number::I32(4))]),
            Ok((2, vec![test_enum])),
        );

        assert_eq!(
            resolve(vec![Cell::Number(Number::I32(4))]),
            Err(ErrorKind::TypeArgumentCountMismatch),
        );

        assert_eq!(
            resolve(vec![str("foo"), Cell::Number(Number::I32(4)), str("bar")]),
            Err(ErrorKind::ConstraintViolation),
        );
    }

    #[test]
    fn test_numeric_tie_break() {
        let registry = registry();
        let mut config = BridgeConfig::new();

        let candidates = vec![
            overload(Signature::new().param("value", "i64")),
            overload(Signature::new().param("value", "i32")),
        ];

        let args = vec![Cell::Number(Number::I32(7))];

        {
            let resolver = Resolver::new(&registry, &config);

            let binding = resolver
                .resolve(&"Test".into(), &Ident::from("Set"), &candidates, args.clone())
                .unwrap();

            assert_eq!(binding.signature(), candidates[1].signature());
        }

        let ambiguous = vec![
            overload(Signature::new().param("value", "i64")),
            overload(Signature::new().param("value", "i16")),
        ];

        assert_eq!(
            Resolver::new(&registry, &config)
                .resolve(&"Test".into(), &Ident::from("Set"), &ambiguous, args.clone())
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::AmbiguousOverload),
        );

        config.prefer_exact_numeric = false;

        assert_eq!(
            Resolver::new(&registry, &config)
                .resolve(&"Test".into(), &Ident::from("Set"), &candidates, args)
                .err()
                .map(|error| error.kind()),
            Some(ErrorKind::AmbiguousOverload),
        );
    }
}
