// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calculate the energy map of an image
//!
//! The energy map is the 8-bit luminance of every pixel.  There are two
//! ways to get it: the direct per-pixel formula, and an accelerated
//! provider that splits the image into horizontal bands and fills each
//! band on its own thread.  Both run every pixel through
//! [`luminance`](crate::pixelpairs::luminance), so they are
//! interchangeable to the bit, and the engine picks whichever one is
//! available when it is built.

use crate::config::EnergyBackend;
use crate::error::{CarveError, Result};
use crate::pixelpairs::luminance_of_channels;
use crate::twodmap::TwoDimensionalMap;
use image::RgbaImage;
use log::{debug, warn};
use std::fmt;

/// Image -> Energy Map
///
/// Implementations fill `out`, reshaping it to the image's dimensions.
pub trait EnergyProvider: fmt::Debug + Send {
    fn provide(&mut self, image: &RgbaImage, out: &mut TwoDimensionalMap<u8>) -> Result<()>;

    fn name(&self) -> &'static str;
}

// One band of RGBA bytes into one band of luminance.
fn fill_band(src: &[u8], dst: &mut [u8]) {
    src.chunks_exact(4)
        .zip(dst.iter_mut())
        .for_each(|(p, l)| *l = luminance_of_channels(p[0], p[1], p[2]));
}

/// The per-pixel formula, on the calling thread.
#[derive(Debug, Default, Copy, Clone)]
pub struct DirectLuminance;

impl EnergyProvider for DirectLuminance {
    fn provide(&mut self, image: &RgbaImage, out: &mut TwoDimensionalMap<u8>) -> Result<()> {
        fill_direct(image, out);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

/// The per-pixel formula, one band of rows per thread.  The call still
/// blocks until every band is back.
#[derive(Debug, Copy, Clone)]
pub struct AcceleratedLuminance {
    threads: usize,
}

impl AcceleratedLuminance {
    /// Fails if there is nothing to accelerate with: fewer than two
    /// threads, or a build without the `threaded` feature.
    pub fn new(threads: usize) -> Result<Self> {
        if cfg!(not(feature = "threaded")) {
            return Err(CarveError::EnergyProviderUnavailable(
                "built without the threaded feature".to_string(),
            ));
        }
        if threads < 2 {
            return Err(CarveError::EnergyProviderUnavailable(format!(
                "{} thread(s) available",
                threads
            )));
        }
        Ok(AcceleratedLuminance { threads })
    }

    pub fn threads(&self) -> usize {
        self.threads
    }
}

impl EnergyProvider for AcceleratedLuminance {
    #[cfg(feature = "threaded")]
    fn provide(&mut self, image: &RgbaImage, out: &mut TwoDimensionalMap<u8>) -> Result<()> {
        let (width, height) = image.dimensions();
        out.reshape(width, height);
        if width == 0 || height == 0 {
            return Ok(());
        }
        let rows_per_band = (height as usize + self.threads - 1) / self.threads;
        let band = rows_per_band * width as usize;
        let src = image.as_raw();
        let dst = out.as_mut_slice();

        crossbeam::scope(|scope| {
            for (s, d) in src.chunks(band * 4).zip(dst.chunks_mut(band)) {
                scope.spawn(move |_| fill_band(s, d));
            }
        })
        .map_err(|_| {
            CarveError::EnergyProviderUnavailable("a luminance band panicked".to_string())
        })
    }

    #[cfg(not(feature = "threaded"))]
    fn provide(&mut self, _image: &RgbaImage, _out: &mut TwoDimensionalMap<u8>) -> Result<()> {
        Err(CarveError::EnergyProviderUnavailable(
            "built without the threaded feature".to_string(),
        ))
    }

    fn name(&self) -> &'static str {
        "accelerated"
    }
}

/// The provider an engine actually holds.
#[derive(Debug)]
pub enum Luminance {
    /// Any provider that may fail at run time.  The first failure
    /// replaces it with `Direct` for the life of the engine.
    Accelerated(Box<dyn EnergyProvider>),
    Direct(DirectLuminance),
}

impl Luminance {
    /// Pick a provider by availability.  An accelerated provider that
    /// will not come up is logged and replaced by the direct formula.
    pub fn select(backend: EnergyBackend, threads: usize) -> Self {
        match backend {
            EnergyBackend::Direct => Luminance::Direct(DirectLuminance),
            EnergyBackend::Auto | EnergyBackend::Accelerated => {
                match AcceleratedLuminance::new(threads) {
                    Ok(accelerated) => {
                        debug!(
                            "energy: accelerated provider up with {} threads",
                            accelerated.threads()
                        );
                        Luminance::Accelerated(Box::new(accelerated))
                    }
                    Err(e) => {
                        debug!("energy: {}; using the direct formula", e);
                        Luminance::Direct(DirectLuminance)
                    }
                }
            }
        }
    }

    pub fn is_accelerated(&self) -> bool {
        matches!(self, Luminance::Accelerated(_))
    }
}

impl EnergyProvider for Luminance {
    fn provide(&mut self, image: &RgbaImage, out: &mut TwoDimensionalMap<u8>) -> Result<()> {
        if let Luminance::Accelerated(accelerated) = self {
            match accelerated.provide(image, out) {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!("energy: {}; falling back to the direct formula", e);
                    *self = Luminance::Direct(DirectLuminance);
                }
            }
        }
        DirectLuminance.provide(image, out)
    }

    fn name(&self) -> &'static str {
        match self {
            Luminance::Accelerated(a) => a.name(),
            Luminance::Direct(d) => d.name(),
        }
    }
}

/// A convenience wrapper: the luminance map of an image, computed with
/// the direct formula.
pub fn luminance_map(image: &RgbaImage) -> TwoDimensionalMap<u8> {
    let mut out = TwoDimensionalMap::new(0, 0);
    fill_direct(image, &mut out);
    out
}

fn fill_direct(image: &RgbaImage, out: &mut TwoDimensionalMap<u8>) {
    let (width, height) = image.dimensions();
    out.reshape(width, height);
    fill_band(image.as_raw(), out.as_mut_slice());
}
