//! Core types for tile grid rectification.
//!
//! This crate is purely geometric: pixel containers, a four-point projective
//! solver, a bilinear perspective warp and a handful of planar helpers. It
//! knows nothing about grids, tiles or contours.

mod geometry;
mod homography;
mod image;
mod logger;

pub use geometry::{
    map_range, median_by, point_distance, three_point_angle_deg, QuadCorners, Rect,
};
pub use homography::{homography_from_4pt, warp_perspective_gray, Homography};
pub use image::{
    sample_bilinear, sample_bilinear_u8, ColorImage, ColorImageView, GrayImage, GrayImageView,
    ImageBufferError,
};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;

pub use nalgebra::Point2;
