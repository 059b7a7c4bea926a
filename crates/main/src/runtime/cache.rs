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
    sync::Arc,
};

use ahash::RandomState;
use lady_deirdre::sync::Table;
use log::{trace, warn};

use crate::runtime::{Prototype, RuntimeResult, View};

/// The Type Descriptor Cache: memoized effective member sets of the host
/// object views.
///
/// The cache is populated lazily. On a miss, the prototype is computed
/// without holding any lock, and then stored unless another thread has
/// stored a prototype for the same view in the meantime, in which case the
/// earlier prototype is kept and returned. Computation failures are not
/// cached.
///
/// The cache is sharded and safe for concurrent access.
pub struct DescriptorCache {
    table: Table<View, Arc<Prototype>, RandomState>,
}

impl Default for DescriptorCache {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for DescriptorCache {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("DescriptorCache")
            .field("len", &self.len())
            .finish()
    }
}

impl DescriptorCache {
    /// Creates an empty cache.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            table: Table::new(),
        }
    }

    /// Returns the cached prototype of the view, if any.
    pub fn get(&self, view: &View) -> Option<Arc<Prototype>> {
        let shard = self
            .table
            .shards()
            .get(self.table.shard_index_of(view))?;

        let guard = shard.read().unwrap_or_else(|poison| poison.into_inner());

        guard.get(view).cloned()
    }

    /// Returns the cached prototype of the view, or computes and caches it.
    pub fn get_or_compute(
        &self,
        view: &View,
        compute: impl FnOnce() -> RuntimeResult<Prototype>,
    ) -> RuntimeResult<Arc<Prototype>> {
        if let Some(prototype) = self.get(view) {
            trace!("Descriptor cache hit: {view}.");
            return Ok(prototype);
        }

        trace!("Descriptor cache miss: {view}.");

        let prototype = Arc::new(compute()?);

        let Some(shard) = self.table.shards().get(self.table.shard_index_of(view)) else {
            return Ok(prototype);
        };

        let mut guard = shard.write().unwrap_or_else(|poison| poison.into_inner());

        if let Some(stored) = guard.get(view) {
            warn!("Descriptor of {view} computed redundantly.");

            return Ok(stored.clone());
        }

        let _ = guard.insert(view.clone(), prototype.clone());

        Ok(prototype)
    }

    /// Returns the number of cached views.
    pub fn len(&self) -> usize {
        let mut result = 0;

        for shard in self.table.shards() {
            result += shard
                .read()
                .unwrap_or_else(|poison| poison.into_inner())
                .len();
        }

        result
    }

    /// Returns true if no views are cached.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
