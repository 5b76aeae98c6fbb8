// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Image dimensional flipper
//!
//! A seam runs *along* one axis of the image and picks one coordinate
//! *across* the other at every step.  For a vertical seam (one that
//! narrows the image) "along" is y and "across" is x; for a horizontal
//! seam the two trade places.  The flipper maps the lane coordinates
//! (across, along) onto the real (x, y) of a row-major map, so the cost
//! field and the tracer are written once and run in either direction
//! without ever transposing the image itself.

use crate::seamcarver::Axis;

#[derive(Debug, Copy, Clone)]
pub struct Flipper {
    pub axis: Axis,
    width: u32,
    height: u32,
}

impl Flipper {
    pub fn new(axis: Axis, width: u32, height: u32) -> Self {
        Flipper {
            axis,
            width,
            height,
        }
    }

    /// Number of candidate coordinates at each seam step.
    pub fn across(&self) -> u32 {
        match self.axis {
            Axis::Width => self.width,
            Axis::Height => self.height,
        }
    }

    /// Number of steps in a seam.
    pub fn along(&self) -> u32 {
        match self.axis {
            Axis::Width => self.height,
            Axis::Height => self.width,
        }
    }

    /// Lane coordinates to image coordinates.
    #[inline]
    pub fn xy(&self, across: u32, along: u32) -> (u32, u32) {
        match self.axis {
            Axis::Width => (across, along),
            Axis::Height => (along, across),
        }
    }

    /// Lane coordinates to an offset into a row-major map of the
    /// flipper's dimensions.
    #[inline]
    pub fn index(&self, across: u32, along: u32) -> usize {
        let (x, y) = self.xy(across, along);
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_lanes_are_rows() {
        let f = Flipper::new(Axis::Width, 5, 3);
        assert_eq!((f.across(), f.along()), (5, 3));
        assert_eq!(f.index(4, 2), 14);
    }

    #[test]
    fn horizontal_lanes_are_columns() {
        let f = Flipper::new(Axis::Height, 5, 3);
        assert_eq!((f.across(), f.along()), (3, 5));
        assert_eq!(f.xy(2, 4), (4, 2));
        assert_eq!(f.index(2, 4), 14);
    }
}
