// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Content-aware resizing.
//!
//! Images are narrowed or shortened by removing the cheapest connected
//! seam of pixels, priced with forward energy, one seam at a time; they
//! are widened or lengthened by finding k such seams on a working copy
//! and inserting an averaged pixel beside each.  Width is always
//! resolved before height.
//!
//! ```no_run
//! use liquidseam::{CarveConfig, SeamCarver};
//!
//! let image = image::open("in.png").unwrap().to_rgba8();
//! let mut carver = SeamCarver::new(CarveConfig::default());
//! let resized = carver.resize(image, 640, 360).unwrap();
//! resized.save("out.png").unwrap();
//! ```

// #![deny(missing_docs)]

mod ternary;

pub mod config;
pub mod costfield;
pub mod energy;
pub mod error;
pub mod expander;
pub mod flipper;
pub mod pixelpairs;
pub mod pool;
pub mod request;
pub mod seamcarver;
pub mod seamfinder;
pub mod twodmap;
#[cfg(feature = "threaded")]
pub mod worker;

pub use config::{CarveConfig, EnergyBackend, ExpansionMode};
pub use costfield::{build_cost_field, cost_field};
pub use energy::{luminance_map, EnergyProvider, Luminance};
pub use error::{CarveError, RequestFailure};
pub use request::{ResizeRequest, ResizeResponse, ResizeResult};
pub use seamcarver::{remove_seam, Axis, SeamCarver};
pub use seamfinder::{find_seam, trace_seam, SeamFinder};
pub use twodmap::TwoDimensionalMap;
#[cfg(feature = "threaded")]
pub use worker::{resize_batch, WorkerPool};

/// Given an image and a desired new width and height, carve or insert
/// seams until it has exactly those dimensions, with the default
/// configuration.
pub fn seamcarve(
    image: image::RgbaImage,
    width: u32,
    height: u32,
) -> error::Result<image::RgbaImage> {
    SeamCarver::new(CarveConfig::default()).resize(image, width, height)
}
