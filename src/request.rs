// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Frames in, frames out.
//!
//! A request owns its pixel buffer and gives it up to the engine; the
//! response owns the result.  Neither side ever holds a copy of the
//! other's pixels, so a request can cross a channel into a worker and
//! its response can cross back without the bytes being duplicated.

use crate::error::{CarveError, RequestFailure, Result};
use crate::seamcarver::{check_dimensions, SeamCarver};
use image::{ImageBuffer, RgbaImage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeRequest {
    /// Row-major RGBA bytes, `source_width * source_height * 4` long.
    pub pixels: Vec<u8>,
    pub source_width: u32,
    pub source_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    /// Echoed on the response so frames can be reordered.
    pub request_index: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizeResponse {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub request_index: u64,
}

pub type ResizeResult = std::result::Result<ResizeResponse, RequestFailure>;

impl ResizeRequest {
    pub fn new(image: RgbaImage, target_width: u32, target_height: u32, request_index: u64) -> Self {
        let (source_width, source_height) = image.dimensions();
        ResizeRequest {
            pixels: image.into_raw(),
            source_width,
            source_height,
            target_width,
            target_height,
            request_index,
        }
    }

    /// Check the declared dimensions against each other and against the
    /// buffer.
    pub fn validate(&self) -> Result<()> {
        check_dimensions("source", self.source_width, self.source_height)?;
        check_dimensions("target", self.target_width, self.target_height)?;
        let expected = self.source_width as usize * self.source_height as usize * 4;
        if self.pixels.len() != expected {
            return Err(CarveError::MalformedRequest(format!(
                "{} bytes for a {}x{} RGBA frame, expected {}",
                self.pixels.len(),
                self.source_width,
                self.source_height,
                expected
            )));
        }
        Ok(())
    }

    /// Split into the frame and its targets, handing over the buffer.
    pub fn into_image(self) -> Result<(RgbaImage, u32, u32)> {
        self.validate()?;
        let ResizeRequest {
            pixels,
            source_width,
            source_height,
            target_width,
            target_height,
            ..
        } = self;
        let image = ImageBuffer::from_raw(source_width, source_height, pixels).ok_or_else(|| {
            CarveError::MalformedRequest("pixel buffer does not fit its dimensions".to_string())
        })?;
        Ok((image, target_width, target_height))
    }
}

impl ResizeResponse {
    pub fn into_image(self) -> Option<RgbaImage> {
        ImageBuffer::from_raw(self.width, self.height, self.pixels)
    }
}

impl SeamCarver {
    /// Serve one request.  A success always has exactly the requested
    /// dimensions; there are no partial results.
    pub fn process(&mut self, request: ResizeRequest) -> ResizeResult {
        let request_index = request.request_index;
        let fail = |error| RequestFailure {
            request_index,
            error,
        };
        let (image, width, height) = request.into_image().map_err(fail)?;
        let image = self.resize(image, width, height).map_err(fail)?;
        let (width, height) = image.dimensions();
        Ok(ResizeResponse {
            pixels: image.into_raw(),
            width,
            height,
            request_index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CarveConfig, EnergyBackend};

    fn carver() -> SeamCarver {
        SeamCarver::new(CarveConfig::new().with_backend(EnergyBackend::Direct))
    }

    fn request(width: u32, height: u32, target: (u32, u32)) -> ResizeRequest {
        ResizeRequest {
            pixels: vec![90; width as usize * height as usize * 4],
            source_width: width,
            source_height: height,
            target_width: target.0,
            target_height: target.1,
            request_index: 17,
        }
    }

    #[test]
    fn response_echoes_the_index_and_the_targets() {
        let response = carver().process(request(6, 4, (4, 7))).unwrap();
        assert_eq!(response.request_index, 17);
        assert_eq!((response.width, response.height), (4, 7));
        assert_eq!(response.pixels.len(), 4 * 7 * 4);
    }

    #[test]
    fn short_buffer_is_malformed() {
        let mut bad = request(6, 4, (4, 4));
        bad.pixels.truncate(10);
        let failure = carver().process(bad).unwrap_err();
        assert_eq!(failure.request_index, 17);
        assert!(matches!(failure.error, CarveError::MalformedRequest(_)));
    }

    #[test]
    fn zero_dimensions_are_malformed() {
        for bad in vec![request(0, 4, (4, 4)), request(6, 4, (4, 0))] {
            assert!(matches!(
                bad.validate(),
                Err(CarveError::MalformedRequest(_))
            ));
        }
    }

    #[test]
    fn unaddressable_targets_are_out_of_range() {
        let failure = carver()
            .process(request(2, 2, (u32::MAX, u32::MAX)))
            .unwrap_err();
        assert!(matches!(failure.error, CarveError::OutOfRange { .. }));
    }
}
