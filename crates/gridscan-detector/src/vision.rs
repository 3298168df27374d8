//! Contract with the external vision primitives library.

use gridscan_core::{
    warp_perspective_gray, ColorImage, ColorImageView, GrayImage, Homography, Rect,
};

use crate::error::VisionError;
use crate::viewport::PixelRegion;

/// Pixel-level operations the pipeline consumes but does not implement.
///
/// `Contour` is the backend's handle for one closed boundary. The pipeline
/// takes ownership of every handle returned by [`external_contours`], reads
/// its bounding box and area, and drops it before the frame ends, on every
/// exit path. Backends that manage external resources release them in
/// `Drop`.
///
/// [`external_contours`]: VisionPrimitives::external_contours
pub trait VisionPrimitives {
    type Contour;

    /// Convert a 1, 3 or 4 channel frame to 8-bit grayscale.
    fn to_gray(&self, frame: &ColorImageView<'_>) -> Result<GrayImage, VisionError>;

    /// Gaussian blur with an odd `kernel` size and a positive `sigma`.
    fn gaussian_blur(
        &self,
        image: &GrayImage,
        kernel: usize,
        sigma: f32,
    ) -> Result<GrayImage, VisionError>;

    /// Binary threshold: `value < p` maps to `max_value`, everything else to 0.
    fn threshold(
        &self,
        image: &GrayImage,
        value: u8,
        max_value: u8,
    ) -> Result<GrayImage, VisionError>;

    /// Morphological dilation with a `kernel`×`kernel` square, applied `iterations` times.
    fn dilate(
        &self,
        image: &GrayImage,
        kernel: usize,
        iterations: u32,
    ) -> Result<GrayImage, VisionError>;

    /// Outer boundaries of the foreground components (no holes, no nesting).
    fn external_contours(&self, image: &GrayImage) -> Result<Vec<Self::Contour>, VisionError>;

    fn bounding_rect(&self, contour: &Self::Contour) -> Rect;

    fn contour_area(&self, contour: &Self::Contour) -> f64;

    /// Smoothing resize to exactly `width`×`height`. Downscales should
    /// average over each output pixel's source footprint (area-like), not
    /// pick the nearest sample.
    fn resize(
        &self,
        image: &GrayImage,
        width: usize,
        height: usize,
    ) -> Result<GrayImage, VisionError>;

    /// Crop `region` out of `frame` and scale it to `width`×`height`.
    fn crop_and_scale(
        &self,
        frame: &ColorImageView<'_>,
        region: PixelRegion,
        width: usize,
        height: usize,
    ) -> Result<ColorImage, VisionError>;

    /// Perspective warp with bilinear sampling and a constant zero border.
    ///
    /// `h_src_from_dst` maps output pixels back into `image`.
    fn warp_perspective(
        &self,
        image: &GrayImage,
        h_src_from_dst: &Homography,
        width: usize,
        height: usize,
    ) -> GrayImage {
        warp_perspective_gray(&image.view(), h_src_from_dst, width, height)
    }
}
