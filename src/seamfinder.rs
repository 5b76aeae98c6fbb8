// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Trace a seam out of a finished cost field.

use crate::error::Result;
use crate::flipper::Flipper;
use crate::seamcarver::Axis;
use crate::twodmap::TwoDimensionalMap;
use image::RgbaImage;
use itertools::Itertools;

/// This trait defines how we will return seams from an image.  It's a
/// primitive interface, just enough to make room for multiple seam
/// finders as well as caching.
pub trait SeamFinder {
    /// The cheapest seam running along `axis`: one x per row for
    /// `Axis::Width`, one y per column for `Axis::Height`.
    fn find_seam(&mut self, image: &RgbaImage, axis: Axis) -> Result<Vec<u32>>;

    /// Request a vertical seam (one that narrows the image).
    fn find_vertical_seam(&mut self, image: &RgbaImage) -> Result<Vec<u32>> {
        self.find_seam(image, Axis::Width)
    }

    /// Request a horizontal seam (one that shortens the image).
    fn find_horizontal_seam(&mut self, image: &RgbaImage) -> Result<Vec<u32>> {
        self.find_seam(image, Axis::Height)
    }
}

// We don't remember which predecessor won during the forward pass.
// Walking back over the cost values themselves lands on a path of the
// same total cost, although on mid-path ties it need not be the one the
// forward pass took.

/// Cost Field -> Seam
///
/// Writes one across-coordinate per lane into `seam`, ordered from the
/// origin boundary to the far one.  The far boundary's cheapest cell is
/// the terminal, lowest index first on ties; each step back prefers the
/// offsets 0, −1, +1 in that order and only moves on a strictly lower
/// cost.
pub fn trace_seam(cost: &TwoDimensionalMap<i32>, axis: Axis, seam: &mut Vec<u32>) {
    let (width, height) = cost.dimensions();
    seam.clear();
    if width == 0 || height == 0 {
        return;
    }

    let f = Flipper::new(axis, width, height);
    let (across, along) = (f.across(), f.along());
    let field = cost.as_slice();
    let at = |a: u32, t: u32| field[f.index(a, t)];

    seam.resize(along as usize, 0);
    let terminal = (0..across)
        .position_min_by_key(|&a| at(a, along - 1))
        .unwrap_or(0) as u32;
    seam[along as usize - 1] = terminal;

    for t in (0..along - 1).rev() {
        let a = seam[t as usize + 1];
        let mut best = a;
        let mut best_cost = at(a, t);
        if a > 0 && at(a - 1, t) < best_cost {
            best = a - 1;
            best_cost = at(a - 1, t);
        }
        if a + 1 < across && at(a + 1, t) < best_cost {
            best = a + 1;
        }
        seam[t as usize] = best;
    }
}

/// A convenience wrapper: a freshly allocated seam.
pub fn find_seam(cost: &TwoDimensionalMap<i32>, axis: Axis) -> Vec<u32> {
    let mut seam = Vec::new();
    trace_seam(cost, axis, &mut seam);
    seam
}

#[cfg(test)]
mod tests {
    use super::*;

    // 5 wide, 4 high.
    const COSTS: [i32; 20] = [
        9, 9, 0, 9, 9, //
        9, 1, 9, 8, 9, //
        9, 9, 9, 9, 0, //
        9, 9, 9, 0, 9,
    ];

    fn field() -> TwoDimensionalMap<i32> {
        TwoDimensionalMap::from_raw(5, 4, COSTS.to_vec()).unwrap()
    }

    #[test]
    fn cost_grid_to_vertical_seam() {
        assert_eq!(find_seam(&field(), Axis::Width), [2, 3, 4, 3]);
    }

    #[test]
    fn cost_grid_to_horizontal_seam() {
        // Column 4 ends cheapest at y=2; stepping back into column 3
        // the 0 below beats the 8 above, and from there every earlier
        // column is a tie that keeps the seam straight.
        assert_eq!(find_seam(&field(), Axis::Height), [3, 3, 3, 3, 2]);
    }

    #[test]
    fn ties_go_to_the_lowest_index_and_straight_line() {
        let flat = TwoDimensionalMap::from_raw(4, 4, vec![3; 16]).unwrap();
        assert_eq!(find_seam(&flat, Axis::Width), [0, 0, 0, 0]);
        assert_eq!(find_seam(&flat, Axis::Height), [0, 0, 0, 0]);
    }

    #[test]
    fn left_beats_right_on_equal_cost() {
        // Terminal at x=1; above it both neighbours cost 1, the cell
        // itself costs 2.
        let costs = vec![1, 2, 1, 5, 0, 5];
        let grid = TwoDimensionalMap::from_raw(3, 2, costs).unwrap();
        assert_eq!(find_seam(&grid, Axis::Width), [0, 1]);
    }

    #[test]
    fn seams_are_connected_and_in_bounds() {
        let grid = TwoDimensionalMap::from_raw(
            6,
            5,
            (0..30).map(|i| (i * 7919 % 31) as i32).collect(),
        )
        .unwrap();
        for &axis in &[Axis::Width, Axis::Height] {
            let seam = find_seam(&grid, axis);
            let bound = if axis == Axis::Width { 6 } else { 5 };
            assert!(seam.iter().all(|&c| c < bound));
            assert!(seam
                .iter()
                .tuple_windows()
                .all(|(a, b)| (*a as i64 - *b as i64).abs() <= 1));
        }
    }
}
