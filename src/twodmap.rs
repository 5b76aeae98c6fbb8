// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! An addressable two-dimensional field.
//!
//! Holds one of the several per-pixel products of a carve: the
//! luminance (energy) map, the accumulated cost field, or the
//! working-copy-to-original index map used by exact expansion.  The
//! backing storage is only ever grown, so a map owned by a
//! [`BufferPool`](crate::pool::BufferPool) can be reshaped for every
//! seam of every frame without going back to the allocator.

use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Default)]
pub struct TwoDimensionalMap<P: Default + Copy> {
    width: u32,
    height: u32,
    data: Vec<P>,
}

impl<P: Default + Copy> TwoDimensionalMap<P> {
    /// Define a new map, filled with the content type's default.
    pub fn new(width: u32, height: u32) -> Self {
        TwoDimensionalMap {
            width,
            height,
            data: vec![P::default(); width as usize * height as usize],
        }
    }

    /// Wrap an existing row-major vector.  Returns `None` if the
    /// vector is too small for the requested dimensions.
    pub fn from_raw(width: u32, height: u32, data: Vec<P>) -> Option<Self> {
        if data.len() < width as usize * height as usize {
            return None;
        }
        Some(TwoDimensionalMap {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of cells the backing store can address without
    /// reallocating.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Change the logical dimensions.  Storage is grown if it is
    /// insufficient and never shrunk; the contents after a reshape are
    /// unspecified and must be overwritten by the caller.
    pub fn reshape(&mut self, width: u32, height: u32) {
        let needed = width as usize * height as usize;
        if self.data.len() < needed {
            self.data.resize(needed, P::default());
        }
        self.width = width;
        self.height = height;
    }

    /// The live (width × height) portion of the map, row-major.
    pub fn as_slice(&self) -> &[P] {
        &self.data[..self.width as usize * self.height as usize]
    }

    pub fn as_mut_slice(&mut self) -> &mut [P] {
        let live = self.width as usize * self.height as usize;
        &mut self.data[..live]
    }

    // Absolutely, the number one name of this game is keep the index
    // math in a singular location and never, ever mess with it.  This
    // particular variant is the same one used in image.rs.
    fn get_index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        (y as usize) * (self.width as usize) + (x as usize)
    }

    /// Drop one cell per row (`seam[y]` is the x to drop) in place,
    /// leaving a map one column narrower.
    pub fn remove_vertical_seam(&mut self, seam: &[u32]) {
        let (width, height) = (self.width as usize, self.height as usize);
        for y in 0..height {
            let sx = seam[y] as usize;
            let src = y * width;
            let dst = y * (width - 1);
            // Rows shift left as they compact, so copy the span before
            // the seam first and the span after it second.
            self.data.copy_within(src..src + sx, dst);
            self.data.copy_within(src + sx + 1..src + width, dst + sx);
        }
        self.width -= 1;
    }

    /// Drop one cell per column (`seam[x]` is the y to drop) in place,
    /// leaving a map one row shorter.
    pub fn remove_horizontal_seam(&mut self, seam: &[u32]) {
        let width = self.width as usize;
        for (x, &sy) in seam.iter().enumerate() {
            for y in sy as usize + 1..self.height as usize {
                self.data[(y - 1) * width + x] = self.data[y * width + x];
            }
        }
        self.height -= 1;
    }
}

impl<P: Default + Copy> Index<(u32, u32)> for TwoDimensionalMap<P> {
    type Output = P;

    /// A convenience addressing mode for getting values.
    fn index(&self, (x, y): (u32, u32)) -> &P {
        let index = self.get_index(x, y);
        &self.data[index]
    }
}

impl<P: Default + Copy> IndexMut<(u32, u32)> for TwoDimensionalMap<P> {
    /// A convenience addressing mode for setting values.
    fn index_mut(&mut self, (x, y): (u32, u32)) -> &mut P {
        let index = self.get_index(x, y);
        &mut self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CELLS: [u8; 12] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];

    #[test]
    fn reshape_never_shrinks_storage() {
        let mut map: TwoDimensionalMap<i32> = TwoDimensionalMap::new(8, 8);
        map.reshape(2, 3);
        assert_eq!(map.capacity(), 64);
        assert_eq!(map.as_slice().len(), 6);
        map.reshape(10, 10);
        assert_eq!(map.capacity(), 100);
    }

    #[test]
    fn vertical_seam_removal_compacts_rows() {
        let mut map = TwoDimensionalMap::from_raw(4, 3, CELLS.to_vec()).unwrap();
        map.remove_vertical_seam(&[0, 1, 3]);
        assert_eq!(map.dimensions(), (3, 3));
        assert_eq!(map.as_slice(), &[1, 2, 3, 4, 6, 7, 8, 9, 10]);
    }

    #[test]
    fn horizontal_seam_removal_compacts_columns() {
        let mut map = TwoDimensionalMap::from_raw(4, 3, CELLS.to_vec()).unwrap();
        map.remove_horizontal_seam(&[0, 1, 2, 0]);
        assert_eq!(map.dimensions(), (4, 2));
        assert_eq!(map.as_slice(), &[4, 1, 2, 7, 8, 9, 6, 11]);
    }
}
