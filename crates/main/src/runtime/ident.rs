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
    borrow::Borrow,
    fmt::{Debug, Display, Formatter},
};

use compact_str::CompactString;

/// A name of a host object member: a property, a field, a method, or an
/// event (e.g., `foo.bar`).
///
/// You can retrieve the actual string of the identifier using the [Display],
/// [Debug], and [AsRef<str>](AsRef) implementations of this type.
///
/// The identifier owns a copy of the string. Short identifiers are stored
/// inline without heap allocation.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ident(CompactString);

impl Debug for Ident {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.0.as_str(), formatter)
    }
}

impl Display for Ident {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.0.as_str(), formatter)
    }
}

impl AsRef<str> for Ident {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for Ident {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl<'a> From<&'a str> for Ident {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Self(CompactString::from(value))
    }
}

impl From<String> for Ident {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self(CompactString::from(value))
    }
}

impl<'a> From<&'a Ident> for Ident {
    #[inline(always)]
    fn from(value: &'a Ident) -> Self {
        value.clone()
    }
}

impl Ident {
    /// Returns the string representation of the identifier.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// A fully-qualified name of a host type, such as `"i16"`, `"str"`,
/// `"Test.TestObject"`, or `"i32[]"`.
///
/// The name is the identity of the type: two TypeNames denote the same host
/// type if and only if their strings are equal.
///
/// Array types are not registered explicitly. Any registered type `T`
/// implicitly gives rise to the array type `T[]` (see [TypeName::array_of]).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeName(CompactString);

impl Debug for TypeName {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self.0.as_str(), formatter)
    }
}

impl Display for TypeName {
    #[inline(always)]
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self.0.as_str(), formatter)
    }
}

impl AsRef<str> for TypeName {
    #[inline(always)]
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl Borrow<str> for TypeName {
    #[inline(always)]
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl<'a> From<&'a str> for TypeName {
    #[inline(always)]
    fn from(value: &'a str) -> Self {
        Self(CompactString::from(value))
    }
}

impl From<String> for TypeName {
    #[inline(always)]
    fn from(value: String) -> Self {
        Self(CompactString::from(value))
    }
}

impl<'a> From<&'a TypeName> for TypeName {
    #[inline(always)]
    fn from(value: &'a TypeName) -> Self {
        value.clone()
    }
}

impl PartialEq<str> for TypeName {
    #[inline(always)]
    fn eq(&self, other: &str) -> bool {
        self.0.as_str() == other
    }
}

impl<'a> PartialEq<&'a str> for TypeName {
    #[inline(always)]
    fn eq(&self, other: &&'a str) -> bool {
        self.0.as_str() == *other
    }
}

impl TypeName {
    const ARRAY_SUFFIX: &'static str = "[]";

    /// Returns the string representation of the type name.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the name of the array type whose elements are of this type.
    ///
    /// ```
    /// # use ad_astra_bridge::runtime::TypeName;
    /// #
    /// assert_eq!(TypeName::from("i32").array_of(), "i32[]");
    /// ```
    #[inline]
    pub fn array_of(&self) -> Self {
        let mut string = self.0.clone();

        string.push_str(Self::ARRAY_SUFFIX);

        Self(string)
    }

    /// If this name denotes an array type, returns the name of its element
    /// type. Otherwise returns None.
    #[inline]
    pub fn element(&self) -> Option<Self> {
        self.0
            .as_str()
            .strip_suffix(Self::ARRAY_SUFFIX)
            .map(|element| Self::from(element))
    }

    /// Returns true if this name denotes an array type.
    #[inline(always)]
    pub fn is_array(&self) -> bool {
        self.0.as_str().ends_with(Self::ARRAY_SUFFIX)
    }
}
