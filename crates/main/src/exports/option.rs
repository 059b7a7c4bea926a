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

use crate::runtime::{Cell, Downcast, RuntimeResult, Upcast};

impl<T> Downcast for Option<T>
where
    T: Downcast,
{
    #[inline(always)]
    fn downcast(cell: Cell) -> RuntimeResult<Self> {
        if cell.is_nil() {
            return Ok(None);
        }

        let inner = <T as Downcast>::downcast(cell)?;

        Ok(Some(inner))
    }
}

impl<T> Upcast for Option<T>
where
    T: Upcast,
{
    #[inline(always)]
    fn upcast(self) -> RuntimeResult<Cell> {
        match self {
            Some(inner) => <T as Upcast>::upcast(inner),
            None => Ok(Cell::Nil),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::runtime::{Cell, Number};

    #[test]
    fn test_nullable() {
        assert_eq!(Cell::Nil.take::<Option<i32>>().ok(), Some(None));

        assert_eq!(
            Cell::Number(Number::U8(7)).take::<Option<i32>>().ok(),
            Some(Some(7)),
        );

        assert_eq!(Cell::give(None::<bool>).ok(), Some(Cell::Nil));
    }
}
