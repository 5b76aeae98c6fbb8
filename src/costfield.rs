// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Accumulate a cost field using the Avidan & Shamir "Forward Energy"
//! formulation.
//!
//! Removing a pixel does not only throw its own energy away; it also
//! makes neighbours of pixels that were not neighbours before.  Forward
//! energy charges a seam for the edges it *exposes*.  In lane terms
//! (see [`Flipper`]), for the cell at (a, t) with neighbours L and R
//! across the lane (clamped to the cell itself at the border) and U, the
//! cell upstream along the seam:
//!
//! ```text
//!  CV(a,t) = |R − L|              straight
//!  CL(a,t) = |R − L| + |U − L|    from (a−1, t−1)
//!  CR(a,t) = |R − L| + |U − R|    from (a+1, t−1)
//!
//!              ⎧ M(a,t−1)   + CV(a,t)
//!  M(a,t) = min⎨ M(a−1,t−1) + CL(a,t)
//!              ⎩ M(a+1,t−1) + CR(a,t)
//! ```
//!
//! The first lane has no predecessor, so M(a,0) = CV(a,0).  On top of
//! the transition term every cell pays `weight × luminance(a,t)`, its
//! own importance; a weight of zero gives the pure forward-energy
//! field.
//!
//! Candidates are tried straight, left, right, and a later candidate
//! only wins on a strictly lower cost.  That order decides between
//! equal-cost seams and is the reason two runs over the same frame
//! always carve the same pixels.

use crate::cq;
use crate::flipper::Flipper;
use crate::pixelpairs::energy_of_pair;
use crate::seamcarver::Axis;
use crate::twodmap::TwoDimensionalMap;

/// Energy Map -> Cost Field
///
/// Fills `cost` (reshaped to the luminance map's dimensions) for seams
/// that run along `axis`.  The whole field is rebuilt on every call.
///
/// Every cell pays `weight × luminance` on top of its forward-energy
/// transition cost, so only `weight == 0` yields the pure transition
/// field.  The engine's default weight is 1.  Sums and products
/// saturate at the `i32` bounds.
pub fn build_cost_field(
    luma: &TwoDimensionalMap<u8>,
    axis: Axis,
    weight: i32,
    cost: &mut TwoDimensionalMap<i32>,
) {
    let (width, height) = luma.dimensions();
    cost.reshape(width, height);
    if width == 0 || height == 0 {
        return;
    }

    let f = Flipper::new(axis, width, height);
    let (across, along) = (f.across(), f.along());
    let last = across - 1;
    let lum = luma.as_slice();
    let field = cost.as_mut_slice();
    let at = |a: u32, t: u32| lum[f.index(a, t)];
    let importance = |a: u32, t: u32| weight.saturating_mul(i32::from(at(a, t)));

    for a in 0..across {
        let l = at(cq!(a == 0, a, a - 1), 0);
        let r = at(cq!(a == last, a, a + 1), 0);
        field[f.index(a, 0)] = energy_of_pair(r, l).saturating_add(importance(a, 0));
    }

    for t in 1..along {
        for a in 0..across {
            let l = at(cq!(a == 0, a, a - 1), t);
            let r = at(cq!(a == last, a, a + 1), t);
            let u = at(a, t - 1);

            let cost_v = energy_of_pair(r, l);
            let mut best = field[f.index(a, t - 1)].saturating_add(cost_v);

            if a != 0 {
                let cost_l = cost_v + energy_of_pair(u, l);
                let candidate = field[f.index(a - 1, t - 1)].saturating_add(cost_l);
                if candidate < best {
                    best = candidate;
                }
            }

            if a != last {
                let cost_r = cost_v + energy_of_pair(u, r);
                let candidate = field[f.index(a + 1, t - 1)].saturating_add(cost_r);
                if candidate < best {
                    best = candidate;
                }
            }

            field[f.index(a, t)] = best.saturating_add(importance(a, t));
        }
    }
}

/// A convenience wrapper: a freshly allocated cost field.
pub fn cost_field(luma: &TwoDimensionalMap<u8>, axis: Axis, weight: i32) -> TwoDimensionalMap<i32> {
    let mut cost = TwoDimensionalMap::new(0, 0);
    build_cost_field(luma, axis, weight, &mut cost);
    cost
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 wide, 2 high.
    const LUMA: [u8; 6] = [10, 50, 20, 0, 30, 90];

    fn luma() -> TwoDimensionalMap<u8> {
        TwoDimensionalMap::from_raw(3, 2, LUMA.to_vec()).unwrap()
    }

    #[test]
    fn first_row_is_the_exposed_edge() {
        let cost = cost_field(&luma(), Axis::Width, 0);
        assert_eq!(&cost.as_slice()[..3], &[40, 10, 30]);
    }

    #[test]
    fn interior_takes_cheapest_predecessor() {
        let cost = cost_field(&luma(), Axis::Width, 0);
        assert_eq!(&cost.as_slice()[3..], &[60, 100, 80]);
    }

    #[test]
    fn importance_weight_charges_each_cell() {
        let cost = cost_field(&luma(), Axis::Width, 1);
        assert_eq!(&cost.as_slice()[..3], &[50, 60, 50]);
        // Row 1: the cheapest predecessors change once row 0 carries
        // its own luminance.
        // a=0: min(50+30, 60+30+20) + 0 = 80
        // a=1: min(60+90, 50+90+50, 50+90+40) + 30 = 180
        // a=2: min(50+60, 60+60+10) + 90 = 200
        assert_eq!(&cost.as_slice()[3..], &[80, 180, 200]);
    }

    #[test]
    fn horizontal_field_is_the_transpose() {
        let upright = luma();
        let mut turned = TwoDimensionalMap::new(2, 3);
        for y in 0..2 {
            for x in 0..3 {
                turned[(y, x)] = upright[(x, y)];
            }
        }
        let vertical = cost_field(&upright, Axis::Width, 1);
        let horizontal = cost_field(&turned, Axis::Height, 1);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(vertical[(x, y)], horizontal[(y, x)]);
            }
        }
    }

    #[test]
    fn extreme_weights_saturate() {
        let column = TwoDimensionalMap::from_raw(1, 3, vec![5u8, 6, 7]).unwrap();
        let cost = cost_field(&column, Axis::Width, i32::MAX);
        assert_eq!(cost.as_slice(), &[i32::MAX; 3]);
        let cost = cost_field(&column, Axis::Width, i32::MIN);
        assert_eq!(cost.as_slice(), &[i32::MIN; 3]);
        let cost = cost_field(&luma(), Axis::Width, 10_000_000);
        assert_eq!(cost[(0, 0)], 40 + 100_000_000);
        assert!(cost.as_slice().iter().all(|&c| c > 0));
    }

    #[test]
    fn single_column_is_a_straight_sum() {
        let column = TwoDimensionalMap::from_raw(1, 3, vec![5u8, 6, 7]).unwrap();
        let cost = cost_field(&column, Axis::Width, 1);
        assert_eq!(cost.as_slice(), &[5, 11, 18]);
    }
}
