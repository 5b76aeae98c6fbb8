// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Grow an image by k seams at once.
//!
//! Inserting the cheapest seam k times would insert the same seam k
//! times.  Instead, a throwaway working copy is shrunk by k ordinary
//! reduction steps, every seam is written down, and then all k are put
//! back into the original in one pass: each line gets its k recorded
//! coordinates, sorted, and at each one a new pixel is synthesized as
//! the average of the original pixels on either side.
//!
//! In [`ExpansionMode::Approximate`] the recorded coordinates are the
//! working copy's, so a seam found after others were removed from the
//! same line lands a little left of (or above) where it was in the
//! original.  [`ExpansionMode::Exact`] carries an index map through the
//! simulation, shrinking it with every seam, and records each seam in
//! original coordinates instead.

use crate::config::ExpansionMode;
use crate::error::{CarveError, Result};
use crate::flipper::Flipper;
use crate::pool::ensure;
use crate::seamcarver::{check_dimensions, Axis, SeamCarver};
use image::{ImageBuffer, RgbaImage};
use log::debug;

// Per-channel floor of the mean, alpha included.
#[inline]
fn average(p1: &[u8], p2: &[u8]) -> [u8; 4] {
    let mut out = [0u8; 4];
    for (o, (a, b)) in out.iter_mut().zip(p1.iter().zip(p2)) {
        *o = ((u16::from(*a) + u16::from(*b)) >> 1) as u8;
    }
    out
}

#[inline]
fn pixel_at<'a>(pixels: &'a [u8], f: &Flipper, a: u32, t: u32) -> &'a [u8] {
    let at = f.index(a, t) * 4;
    &pixels[at..at + 4]
}

impl SeamCarver {
    /// Grow `axis` by `k` seams.  The image passed in is only read; the
    /// result is a new buffer exactly `k` pixels larger along `axis`.
    pub fn expand(&mut self, image: RgbaImage, axis: Axis, k: u32) -> Result<RgbaImage> {
        if k == 0 {
            return Ok(image);
        }
        let dims = image.dimensions();
        check_dimensions("source", dims.0, dims.1)?;
        let extent = axis.extent(dims);
        let grown = extent.checked_add(k).ok_or(CarveError::OutOfRange {
            axis: axis.name(),
            extent: u64::from(extent) + u64::from(k),
            reason: "expanded extent does not fit in 32 bits",
        })?;
        let (out_width, out_height) = match axis {
            Axis::Width => (grown, dims.1),
            Axis::Height => (dims.0, grown),
        };
        check_dimensions("expanded", out_width, out_height)?;

        self.record_seams(&image, axis, k)?;
        debug!(
            "{}: expanding {} -> {} ({:?})",
            axis.name(),
            extent,
            grown,
            self.config.expansion
        );
        self.reinsert(&image, axis, k, out_width, out_height)
    }

    // Step 1: shrink a working copy k times, filling the seam table with
    // k seams of `lines` coordinates each.
    fn record_seams(&mut self, image: &RgbaImage, axis: Axis, k: u32) -> Result<()> {
        let dims = image.dimensions();
        let lines = axis.orthogonal(dims) as usize;
        let exact = self.config.expansion == ExpansionMode::Exact;
        ensure(&mut self.pool.seam_table, k as usize * lines);

        let f = Flipper::new(axis, dims.0, dims.1);
        if exact {
            self.pool.origins.reshape(dims.0, dims.1);
            let origins = self.pool.origins.as_mut_slice();
            for t in 0..f.along() {
                for a in 0..f.across() {
                    origins[f.index(a, t)] = a;
                }
            }
        }

        let mut working = image.clone();
        let mut carried = 0;
        for s in 0..k as usize {
            // A one-pixel-wide copy has exactly one seam and nothing
            // left to give; it is recorded again without removal.
            if axis.extent(working.dimensions()) == 1 {
                let row = &mut self.pool.seam_table[s * lines..(s + 1) * lines];
                for (t, slot) in row.iter_mut().enumerate() {
                    *slot = if exact {
                        self.pool.origins[f.xy(0, t as u32)]
                    } else {
                        0
                    };
                }
                continue;
            }

            working = self.carve_once(&working, axis, &mut carried)?;
            let row = &mut self.pool.seam_table[s * lines..(s + 1) * lines];
            if exact {
                for (t, (slot, &a)) in row.iter_mut().zip(&self.pool.seam).enumerate() {
                    *slot = self.pool.origins[f.xy(a, t as u32)];
                }
                match axis {
                    Axis::Width => self.pool.origins.remove_vertical_seam(&self.pool.seam),
                    Axis::Height => self.pool.origins.remove_horizontal_seam(&self.pool.seam),
                }
            } else {
                row.copy_from_slice(&self.pool.seam);
            }
        }
        Ok(())
    }

    // Step 2: one pass over the original, line by line.
    fn reinsert(
        &mut self,
        image: &RgbaImage,
        axis: Axis,
        k: u32,
        out_width: u32,
        out_height: u32,
    ) -> Result<RgbaImage> {
        let (width, height) = image.dimensions();
        let src = Flipper::new(axis, width, height);
        let dst = Flipper::new(axis, out_width, out_height);
        let (extent, lines) = (src.across(), src.along() as usize);
        let k = k as usize;
        let pixels: &[u8] = image.as_raw();
        let mut raw = vec![0u8; out_width as usize * out_height as usize * 4];

        let pixel = |a: u32, t: u32| pixel_at(pixels, &src, a, t);

        let table = &self.pool.seam_table;
        let line = &mut self.pool.line;
        for t in 0..lines {
            line.clear();
            line.extend((0..k).map(|s| table[s * lines + t]));
            line.sort_unstable();

            let t = t as u32;
            let mut out_a = 0;
            let mut next = 0;
            let mut put = |out_a: &mut u32, p: &[u8]| {
                let at = dst.index(*out_a, t) * 4;
                raw[at..at + 4].copy_from_slice(p);
                *out_a += 1;
            };
            for a in 0..extent {
                while next < k && line[next] <= a {
                    let inserted = average(pixel(a.saturating_sub(1), t), pixel(a, t));
                    put(&mut out_a, &inserted);
                    next += 1;
                }
                put(&mut out_a, pixel(a, t));
            }
            // Coordinates past the last pixel cannot come out of a
            // seam, but a full line must still come out of here.
            while next < k {
                let last = extent - 1;
                let inserted = average(pixel(last, t), pixel(last, t));
                put(&mut out_a, &inserted);
                next += 1;
            }
        }

        ImageBuffer::from_raw(out_width, out_height, raw).ok_or_else(|| {
            CarveError::MalformedRequest(format!(
                "{}x{} expanded buffer is short",
                out_width, out_height
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CarveConfig, EnergyBackend};
    use crate::seamfinder::SeamFinder;
    use image::Rgba;

    fn carver(mode: ExpansionMode) -> SeamCarver {
        SeamCarver::new(
            CarveConfig::new()
                .with_backend(EnergyBackend::Direct)
                .with_expansion(mode),
        )
    }

    fn stripes(width: u32, height: u32) -> RgbaImage {
        ImageBuffer::from_fn(width, height, |x, y| {
            Rgba([(x * 60 % 256) as u8, (y * 30 % 256) as u8, 200, 255 - x as u8])
        })
    }

    #[test]
    fn average_floors_every_channel() {
        assert_eq!(average(&[0, 255, 3, 255], &[255, 255, 4, 0]), [127, 255, 3, 127]);
    }

    #[test]
    fn single_seam_is_inserted_left_of_itself() {
        let image = stripes(5, 4);
        let mut engine = carver(ExpansionMode::Approximate);
        let seam = engine.find_vertical_seam(&image).unwrap();
        let out = engine.expand(image.clone(), Axis::Width, 1).unwrap();
        assert_eq!(out.dimensions(), (6, 4));
        for (y, &sx) in seam.iter().enumerate() {
            let y = y as u32;
            for x in 0..sx {
                assert_eq!(out.get_pixel(x, y), image.get_pixel(x, y));
            }
            let left = image.get_pixel(sx.saturating_sub(1), y);
            let right = image.get_pixel(sx, y);
            assert_eq!(out.get_pixel(sx, y).0, average(&left.0, &right.0));
            for x in sx..5 {
                assert_eq!(out.get_pixel(x + 1, y), image.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn horizontal_expansion_grows_columns() {
        let image = stripes(3, 4);
        let out = carver(ExpansionMode::Approximate)
            .expand(image, Axis::Height, 3)
            .unwrap();
        assert_eq!(out.dimensions(), (3, 7));
    }

    #[test]
    fn expansion_beyond_the_working_copy_repeats_its_last_seam() {
        let image = stripes(2, 3);
        for &mode in &[ExpansionMode::Approximate, ExpansionMode::Exact] {
            let out = carver(mode).expand(image.clone(), Axis::Width, 5).unwrap();
            assert_eq!(out.dimensions(), (7, 3));
        }
    }

    #[test]
    fn exact_mode_never_stacks_seams_while_pixels_remain() {
        // With k below the extent every recorded coordinate in a line
        // names a different original pixel.
        let image = stripes(8, 5);
        let mut engine = carver(ExpansionMode::Exact);
        engine.expand(image, Axis::Width, 6).unwrap();
        let lines = 5;
        for t in 0..lines {
            let mut coords: Vec<u32> = (0..6)
                .map(|s| engine.pool.seam_table[s * lines + t])
                .collect();
            coords.sort_unstable();
            coords.dedup();
            assert_eq!(coords.len(), 6);
        }
    }

    // Rebuild every line of an expansion from the recorded seams and the
    // source pixels, and compare it with what the engine produced.
    fn assert_rebuilt_from_table(
        engine: &SeamCarver,
        image: &RgbaImage,
        out: &RgbaImage,
        axis: Axis,
        k: usize,
    ) {
        let (width, height) = image.dimensions();
        let src = Flipper::new(axis, width, height);
        let (ow, oh) = out.dimensions();
        let dst = Flipper::new(axis, ow, oh);
        let lines = src.along() as usize;
        for t in 0..src.along() {
            let mut coords: Vec<u32> = (0..k)
                .map(|s| engine.pool.seam_table[s * lines + t as usize])
                .collect();
            coords.sort_unstable();
            let mut expected = Vec::new();
            for a in 0..src.across() {
                let (x, y) = src.xy(a, t);
                let here = image.get_pixel(x, y).0;
                let (lx, ly) = src.xy(a.saturating_sub(1), t);
                let left = image.get_pixel(lx, ly).0;
                for _ in coords.iter().filter(|&&c| c == a) {
                    expected.push(average(&left, &here));
                }
                expected.push(here);
            }
            let got: Vec<[u8; 4]> = (0..dst.across())
                .map(|a| {
                    let (x, y) = dst.xy(a, t);
                    out.get_pixel(x, y).0
                })
                .collect();
            assert_eq!(got, expected, "line {}", t);
        }
    }

    #[test]
    fn every_inserted_pixel_averages_its_neighbours() {
        for &axis in &[Axis::Width, Axis::Height] {
            for &mode in &[ExpansionMode::Approximate, ExpansionMode::Exact] {
                let image = stripes(6, 5);
                let mut engine = carver(mode);
                let out = engine.expand(image.clone(), axis, 3).unwrap();
                assert_eq!(axis.extent(out.dimensions()), axis.extent(image.dimensions()) + 3);
                assert_rebuilt_from_table(&engine, &image, &out, axis, 3);
            }
        }
    }

    fn grey_steps(axis: Axis) -> RgbaImage {
        let levels = [0u8, 80, 160, 240];
        let step = |i: u32| {
            let v = levels[i as usize];
            Rgba([v, v, v, 255])
        };
        match axis {
            Axis::Width => ImageBuffer::from_fn(4, 3, |x, _| step(x)),
            Axis::Height => ImageBuffer::from_fn(3, 4, |_, y| step(y)),
        }
    }

    #[test]
    fn stacked_and_spread_insertions_on_grey_steps() {
        // The dark edge is the cheapest seam twice over.  In working-copy
        // coordinates both land on 0 and stack; in source coordinates
        // the second one lands on 1.
        let cases = [
            (ExpansionMode::Approximate, [0u8, 0, 0, 80, 160, 240]),
            (ExpansionMode::Exact, [0u8, 0, 40, 80, 160, 240]),
        ];
        for &axis in &[Axis::Width, Axis::Height] {
            for &(mode, expected) in &cases {
                let image = grey_steps(axis);
                let mut engine = carver(mode);
                let out = engine.expand(image.clone(), axis, 2).unwrap();
                assert_rebuilt_from_table(&engine, &image, &out, axis, 2);
                let f = Flipper::new(axis, out.width(), out.height());
                for t in 0..f.along() {
                    let line: Vec<u8> = (0..f.across())
                        .map(|a| {
                            let (x, y) = f.xy(a, t);
                            out.get_pixel(x, y)[0]
                        })
                        .collect();
                    assert_eq!(line, expected, "{:?} {:?} line {}", axis, mode, t);
                }
            }
        }
    }

    #[test]
    fn zero_seams_is_the_identity() {
        let image = stripes(4, 4);
        let out = carver(ExpansionMode::Approximate)
            .expand(image.clone(), Axis::Height, 0)
            .unwrap();
        assert_eq!(out, image);
    }
}
