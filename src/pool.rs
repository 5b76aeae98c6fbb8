// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Scratch memory for one carving engine.
//!
//! Every seam needs a luminance map, a cost field and a seam path;
//! expansion also needs a table of every recorded seam and, in exact
//! mode, an index map.  A frame of video can take hundreds of seams,
//! so the pool hands out the same allocations over and over, growing
//! them when a bigger frame comes through and never giving memory
//! back.  A pool belongs to exactly one engine; two concurrent carves
//! must never share one.

use crate::twodmap::TwoDimensionalMap;

/// Grow `buf` to hold at least `size` elements.  Existing storage is
/// kept when it is already large enough.
pub(crate) fn ensure<T: Default + Clone>(buf: &mut Vec<T>, size: usize) {
    if buf.len() < size {
        buf.resize(size, T::default());
    }
}

#[derive(Debug, Default)]
pub struct BufferPool {
    pub(crate) luma: TwoDimensionalMap<u8>,
    pub(crate) cost: TwoDimensionalMap<i32>,
    pub(crate) seam: Vec<u32>,
    /// k seams × orthogonal extent, seam-major.
    pub(crate) seam_table: Vec<u32>,
    /// The k coordinates of one line, sorted during reinsertion.
    pub(crate) line: Vec<u32>,
    pub(crate) origins: TwoDimensionalMap<u32>,
}

/// Capacities currently held by a pool.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PoolCapacity {
    pub luma: usize,
    pub cost: usize,
    pub seam: usize,
    pub seam_table: usize,
    pub origins: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn capacity(&self) -> PoolCapacity {
        PoolCapacity {
            luma: self.luma.capacity(),
            cost: self.cost.capacity(),
            seam: self.seam.capacity(),
            seam_table: self.seam_table.len(),
            origins: self.origins.capacity(),
        }
    }
}
