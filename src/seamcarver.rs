// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Seamcarve - The main engine
//!
//! Seam removal for either axis, and the engine that drives an image to
//! its target dimensions: width first, then height, each axis shrunk a
//! seam at a time or grown in one expansion pass.

use crate::config::CarveConfig;
use crate::costfield::build_cost_field;
use crate::energy::{EnergyProvider, Luminance};
use crate::error::{CarveError, Result};
use crate::pool::BufferPool;
use crate::seamfinder::{trace_seam, SeamFinder};
use image::{ImageBuffer, RgbaImage};
use log::{debug, trace};

/// The axis an operation changes.  A seam that changes the width runs
/// top to bottom, one x per row; a seam that changes the height runs
/// left to right, one y per column.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Width => "width",
            Axis::Height => "height",
        }
    }

    /// The extent this axis controls.
    pub fn extent(self, (width, height): (u32, u32)) -> u32 {
        match self {
            Axis::Width => width,
            Axis::Height => height,
        }
    }

    /// The extent of the other axis, which is also the length of a
    /// seam along this one.
    pub fn orthogonal(self, (width, height): (u32, u32)) -> u32 {
        match self {
            Axis::Width => height,
            Axis::Height => width,
        }
    }
}

fn from_raw(width: u32, height: u32, raw: Vec<u8>) -> Result<RgbaImage> {
    ImageBuffer::from_raw(width, height, raw).ok_or_else(|| {
        CarveError::MalformedRequest(format!("{}x{} pixel buffer is short", width, height))
    })
}

// Each row is rebuilt from the span left of the seam and the span right
// of it; nothing is blended.
fn remove_vertical_seam(image: &RgbaImage, seam: &[u32]) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let stride = width as usize * 4;
    let mut raw = Vec::with_capacity((width as usize - 1) * height as usize * 4);
    for (row, &sx) in image.as_raw().chunks_exact(stride).zip(seam) {
        let sx = sx as usize * 4;
        raw.extend_from_slice(&row[..sx]);
        raw.extend_from_slice(&row[sx + 4..]);
    }
    from_raw(width - 1, height, raw)
}

// The transposed operation: every column loses the pixel at `seam[x]`
// and the pixels below it move up by one.
fn remove_horizontal_seam(image: &RgbaImage, seam: &[u32]) -> Result<RgbaImage> {
    let (width, height) = image.dimensions();
    let stride = width as usize * 4;
    let src = image.as_raw();
    let mut raw = vec![0u8; stride * (height as usize - 1)];
    for (x, &sy) in seam.iter().enumerate() {
        let sy = sy as usize;
        let column = x * 4;
        for y in 0..height as usize - 1 {
            let from = if y < sy { y } else { y + 1 };
            let dst = y * stride + column;
            let at = from * stride + column;
            raw[dst..dst + 4].copy_from_slice(&src[at..at + 4]);
        }
    }
    from_raw(width, height - 1, raw)
}

/// Remove one seam, producing an image one pixel smaller along `axis`.
/// All four channels are copied verbatim.
pub fn remove_seam(image: &RgbaImage, seam: &[u32], axis: Axis) -> Result<RgbaImage> {
    let dims = image.dimensions();
    let extent = axis.extent(dims);
    if extent <= 1 {
        return Err(CarveError::OutOfRange {
            axis: axis.name(),
            extent: u64::from(extent),
            reason: "removing a seam would leave nothing",
        });
    }
    if seam.len() != axis.orthogonal(dims) as usize {
        return Err(CarveError::MalformedRequest(format!(
            "{} seam has {} coordinates for an image of {}x{}",
            axis.name(),
            seam.len(),
            dims.0,
            dims.1
        )));
    }
    if let Some(c) = seam.iter().find(|&&c| c >= extent) {
        return Err(CarveError::MalformedRequest(format!(
            "seam coordinate {} outside a {} of {}",
            c,
            axis.name(),
            extent
        )));
    }
    match axis {
        Axis::Width => remove_vertical_seam(image, seam),
        Axis::Height => remove_horizontal_seam(image, seam),
    }
}

/// Validate a pair of image dimensions and the buffers they imply.
pub(crate) fn check_dimensions(kind: &str, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CarveError::MalformedRequest(format!(
            "{} dimensions {}x{} must be positive",
            kind, width, height
        )));
    }
    let area = u64::from(width) * u64::from(height);
    let addressable = area
        .checked_mul(4)
        .map_or(false, |bytes| bytes <= isize::MAX as u64);
    if !addressable {
        return Err(CarveError::OutOfRange {
            axis: "area",
            extent: area,
            reason: "the pixel buffer cannot be addressed",
        });
    }
    Ok(())
}

/// The carving engine.  One engine owns one provider and one buffer
/// pool, and carves one image at a time; run independent images on
/// independent engines.
#[derive(Debug)]
pub struct SeamCarver {
    pub(crate) config: CarveConfig,
    pub(crate) provider: Luminance,
    pub(crate) pool: BufferPool,
}

impl SeamCarver {
    pub fn new(config: CarveConfig) -> Self {
        let provider = Luminance::select(config.backend, config.effective_threads());
        Self::with_provider(config, provider)
    }

    pub fn with_provider(config: CarveConfig, provider: Luminance) -> Self {
        SeamCarver {
            config,
            provider,
            pool: BufferPool::new(),
        }
    }

    pub fn config(&self) -> &CarveConfig {
        &self.config
    }

    pub fn provider(&self) -> &Luminance {
        &self.provider
    }

    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }

    /// Leave the next seam of `image` in the pool's seam buffer.  With
    /// `acquire` false the pool's luminance map is trusted to already
    /// describe `image`.
    pub(crate) fn next_seam(&mut self, image: &RgbaImage, axis: Axis, acquire: bool) -> Result<()> {
        if acquire {
            self.provider.provide(image, &mut self.pool.luma)?;
        }
        debug_assert_eq!(self.pool.luma.dimensions(), image.dimensions());
        build_cost_field(
            &self.pool.luma,
            axis,
            self.config.importance_weight,
            &mut self.pool.cost,
        );
        trace_seam(&self.pool.cost, axis, &mut self.pool.seam);
        Ok(())
    }

    /// One reduction step: find a seam, remove it.  `carried` counts the
    /// removals the current luminance map has already served; once it
    /// reaches the batch size the map is acquired afresh, otherwise the
    /// seam is carved out of the map alongside the image.
    pub(crate) fn carve_once(
        &mut self,
        image: &RgbaImage,
        axis: Axis,
        carried: &mut usize,
    ) -> Result<RgbaImage> {
        self.next_seam(image, axis, *carried == 0)?;
        trace!("{} seam: {:?}", axis.name(), self.pool.seam);
        let carved = remove_seam(image, &self.pool.seam, axis)?;

        *carried += 1;
        if *carried >= self.config.batch {
            *carried = 0;
        } else {
            match axis {
                Axis::Width => self.pool.luma.remove_vertical_seam(&self.pool.seam),
                Axis::Height => self.pool.luma.remove_horizontal_seam(&self.pool.seam),
            }
        }
        Ok(carved)
    }

    /// Shrink `axis` to `target` one seam at a time.  Images already at
    /// or below the target come back untouched.
    pub fn reduce(&mut self, image: RgbaImage, axis: Axis, target: u32) -> Result<RgbaImage> {
        if target == 0 {
            return Err(CarveError::OutOfRange {
                axis: axis.name(),
                extent: 0,
                reason: "reduction would leave nothing",
            });
        }
        let mut image = image;
        let mut carried = 0;
        let start = axis.extent(image.dimensions());
        while axis.extent(image.dimensions()) > target {
            image = self.carve_once(&image, axis, &mut carried)?;
        }
        if start > target {
            debug!("{}: reduced {} -> {}", axis.name(), start, target);
        }
        Ok(image)
    }

    // This is still the whole energy map and cost field rebuilt for every
    // seam.  Forward energy depends on who a pixel's neighbours are, and
    // those change with every removal, so there is no cheap patch.

    /// Given an image and a desired new width and height, carve or
    /// insert seams until the image has exactly those dimensions.  Width
    /// is settled completely before height.
    pub fn resize(&mut self, image: RgbaImage, width: u32, height: u32) -> Result<RgbaImage> {
        let (source_width, source_height) = image.dimensions();
        check_dimensions("source", source_width, source_height)?;
        check_dimensions("target", width, height)?;
        check_dimensions("intermediate", width.max(source_width), source_height)?;
        check_dimensions("intermediate", width, height.max(source_height))?;
        debug!(
            "resize {}x{} -> {}x{} with the {} provider",
            source_width,
            source_height,
            width,
            height,
            self.provider.name()
        );

        let mut image = self.reduce(image, Axis::Width, width)?;
        let current = image.width();
        if current < width {
            image = self.expand(image, Axis::Width, width - current)?;
        }

        image = self.reduce(image, Axis::Height, height)?;
        let current = image.height();
        if current < height {
            image = self.expand(image, Axis::Height, height - current)?;
        }

        debug_assert_eq!(image.dimensions(), (width, height));
        Ok(image)
    }
}

impl SeamFinder for SeamCarver {
    fn find_seam(&mut self, image: &RgbaImage, axis: Axis) -> Result<Vec<u32>> {
        let (width, height) = image.dimensions();
        check_dimensions("source", width, height)?;
        self.next_seam(image, axis, true)?;
        Ok(self.pool.seam.clone())
    }
}
