use gridscan_core::ImageBufferError;

use crate::viewport::PixelRegion;

/// Faults raised by a [`VisionPrimitives`](crate::VisionPrimitives) backend.
#[derive(thiserror::Error, Debug)]
pub enum VisionError {
    #[error(transparent)]
    Buffer(#[from] ImageBufferError),
    #[error("empty image")]
    EmptyImage,
    #[error("region {region:?} lies outside the {width}x{height} frame")]
    RegionOutOfBounds {
        region: PixelRegion,
        width: usize,
        height: usize,
    },
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

/// A fault that aborts processing of a single frame.
///
/// Unlike a bail, a frame error produces no output frame. The frame loop
/// logs it and carries on with the next frame.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error(transparent)]
    Vision(#[from] VisionError),
    #[error("frame too small to hold a grid ({width}x{height})")]
    EmptyFrame { width: usize, height: usize },
}
