// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Luminance of a pixel, and the energy of a pixel pair
//!
//! Every energy the carver uses is built out of two primitives: the
//! 8-bit luminance of one RGBA pixel, and the absolute difference
//! between two luminance values, which is the edge a seam exposes when
//! it brings those two pixels next to each other.

use image::Rgba;

// Rec. 601 luma weights, in thousandths.  Integer weights make the
// truncation exact: 0.299 * 128 + 0.587 * 128 + 0.114 * 128 is 128, not
// 127.99999999999999.
const RED: u32 = 299;
const GREEN: u32 = 587;
const BLUE: u32 = 114;

/// Pixel -> Luminance
///
/// 0.299R + 0.587G + 0.114B, truncated to 8 bits.  Alpha does not
/// contribute.  Every energy provider must come through here so that
/// they all agree to the bit.
#[inline]
pub fn luminance(p: &Rgba<u8>) -> u8 {
    let [r, g, b, _] = p.0;
    luminance_of_channels(r, g, b)
}

#[inline]
pub(crate) fn luminance_of_channels(r: u8, g: u8, b: u8) -> u8 {
    ((u32::from(r) * RED + u32::from(g) * GREEN + u32::from(b) * BLUE) / 1000) as u8
}

/// (Luminance, Luminance) -> Energy
///
/// The edge exposed when two pixels become neighbours.
#[inline]
pub fn energy_of_pair(l1: u8, l2: u8) -> i32 {
    (i32::from(l1) - i32::from(l2)).abs()
}
