// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Carve errors.

use failure::Fail;

#[derive(Debug, Clone, PartialEq, Eq, Fail)]
pub enum CarveError {
    /// Missing or non-positive dimensions, or a pixel buffer whose
    /// length does not match the dimensions it claims.
    #[fail(display = "malformed request: {}", _0)]
    MalformedRequest(String),

    /// A requested extent that cannot be reached without an
    /// intermediate buffer collapsing to nothing, or that cannot be
    /// addressed at all.
    #[fail(
        display = "{} of {} is out of range: {}",
        axis, extent, reason
    )]
    OutOfRange {
        axis: &'static str,
        extent: u64,
        reason: &'static str,
    },

    /// The accelerated luminance provider could not be brought up.
    /// The engine never hands this one to its caller; it falls back to
    /// the direct formula instead.
    #[fail(display = "accelerated energy provider unavailable: {}", _0)]
    EnergyProviderUnavailable(String),
}

/// A failed request, still carrying the index it arrived with so the
/// response can be routed back to the right frame.
#[derive(Debug, Clone, PartialEq, Eq, Fail)]
#[fail(display = "request {} failed: {}", request_index, error)]
pub struct RequestFailure {
    pub request_index: u64,
    #[fail(cause)]
    pub error: CarveError,
}

pub type Result<T> = std::result::Result<T, CarveError>;
