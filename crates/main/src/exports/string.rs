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

use compact_str::CompactString;

use crate::runtime::{Cell, Downcast, RuntimeError, RuntimeResult, Upcast};

impl Downcast for CompactString {
    fn downcast(cell: Cell) -> RuntimeResult<Self> {
        match cell {
            Cell::Str(value) => Ok(value),
            other => Err(RuntimeError::mismatch(other.data_type(), "str")),
        }
    }
}

impl Downcast for String {
    #[inline(always)]
    fn downcast(cell: Cell) -> RuntimeResult<Self> {
        Ok(CompactString::downcast(cell)?.into_string())
    }
}

impl Upcast for CompactString {
    #[inline(always)]
    fn upcast(self) -> RuntimeResult<Cell> {
        Ok(Cell::Str(self))
    }
}

impl Upcast for String {
    #[inline(always)]
    fn upcast(self) -> RuntimeResult<Cell> {
        Ok(Cell::Str(CompactString::from(self)))
    }
}

impl<'a> Upcast for &'a str {
    #[inline(always)]
    fn upcast(self) -> RuntimeResult<Cell> {
        Ok(Cell::Str(CompactString::from(self)))
    }
}
