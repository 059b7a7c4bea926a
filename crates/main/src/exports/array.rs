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
    fmt::{Debug, Formatter},
    sync::{Arc, RwLock},
};

use crate::runtime::{Cell, Downcast, RuntimeError, RuntimeResult, TypeName, Upcast};

/// A fixed-size host array of a named element type.
///
/// Arrays have reference semantics: clones of a HostArray share the same
/// storage, and two arrays are equal only if they share the storage.
///
/// The array does not validate the element types of the items by itself.
/// Arrays constructed through
/// [Bridge::new_array](crate::runtime::Bridge::new_array) contain items
/// coerced to the element type.
#[derive(Clone)]
pub struct HostArray {
    element: TypeName,
    items: Arc<RwLock<Vec<Cell>>>,
}

impl PartialEq for HostArray {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }
}

impl Debug for HostArray {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_fmt(format_args!("{}[{}]", self.element, self.len()))
    }
}

impl HostArray {
    /// Creates an array of the specified element type with the specified
    /// items.
    #[inline]
    pub fn new(element: impl Into<TypeName>, items: Vec<Cell>) -> Self {
        Self {
            element: element.into(),
            items: Arc::new(RwLock::new(items)),
        }
    }

    /// Returns the element type of the array.
    #[inline(always)]
    pub fn element(&self) -> &TypeName {
        &self.element
    }

    /// Returns the array type (e.g., `i32[]`).
    #[inline(always)]
    pub fn ty(&self) -> TypeName {
        self.element.array_of()
    }

    /// Returns the number of items in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    /// Returns true if the array has no items.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a copy of the item at the specified index.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.items
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .get(index)
            .cloned()
    }

    /// Replaces the item at the specified index.
    ///
    /// The value is stored as is. Returns false if the index is out of
    /// bounds.
    pub fn set(&self, index: usize, value: Cell) -> bool {
        let mut items = self
            .items
            .write()
            .unwrap_or_else(|poison| poison.into_inner());

        match items.get_mut(index) {
            Some(item) => {
                *item = value;
                true
            }

            None => false,
        }
    }

    /// Returns a copy of all items of the array.
    #[inline]
    pub fn to_vec(&self) -> Vec<Cell> {
        self.items
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl Downcast for HostArray {
    fn downcast(cell: Cell) -> RuntimeResult<Self> {
        match cell {
            Cell::Array(array) => Ok(array),
            other => Err(RuntimeError::mismatch(other.data_type(), "array")),
        }
    }
}

impl Upcast for HostArray {
    #[inline(always)]
    fn upcast(self) -> RuntimeResult<Cell> {
        Ok(Cell::Array(self))
    }
}

impl<T: Downcast> Downcast for Vec<T> {
    fn downcast(cell: Cell) -> RuntimeResult<Self> {
        let array = HostArray::downcast(cell)?;

        array.to_vec().into_iter().map(T::downcast).collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Cell, HostArray, Number};

    #[test]
    fn test_array_identity() {
        let items = vec![Cell::Number(Number::I32(1)), Cell::Number(Number::I32(2))];
        let array = HostArray::new("i32", items.clone());
        let other = HostArray::new("i32", items);

        assert_eq!(array.ty(), "i32[]");
        assert_eq!(array, array.clone());
        assert_ne!(array, other);

        assert!(array.set(1, Cell::Number(Number::I32(3))));
        assert!(!array.set(2, Cell::Nil));
        assert_eq!(array.get(1), Some(Cell::Number(Number::I32(3))));
        assert_eq!(Cell::Array(array).take::<Vec<i64>>().ok(), Some(vec![1, 3]));
    }
}
