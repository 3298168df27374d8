//! [`VisionPrimitives`] on top of `image` and `imageproc`.

use ::image::imageops::FilterType;
use ::image::{DynamicImage, ImageBuffer, Luma, Rgb, Rgba};
use imageproc::contours::{find_contours, BorderType, Contour};
use imageproc::distance_transform::Norm;
use imageproc::filter::gaussian_blur_f32;
use imageproc::map::map_colors;
use imageproc::morphology;

use crate::core::{ColorImage, ColorImageView, GrayImage, ImageBufferError, Rect};
use crate::detector::{PixelRegion, VisionError, VisionPrimitives};

/// Pure-Rust vision backend.
///
/// Contours are plain point lists owned by the pipeline, so releasing them
/// is an ordinary drop.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageprocVision;

/// Convert a core gray image into an `image` buffer.
pub fn to_luma(img: &GrayImage) -> Result<::image::GrayImage, VisionError> {
    ::image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone()).ok_or(
        VisionError::Buffer(ImageBufferError::BufferLength {
            expected: img.width * img.height,
            got: img.data.len(),
        }),
    )
}

/// Convert an `image` gray buffer into the core type.
pub fn from_luma(img: ::image::GrayImage) -> GrayImage {
    GrayImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.into_raw(),
    }
}

/// Wrap an interleaved frame as a [`DynamicImage`].
pub fn dynamic_from_view(frame: &ColorImageView<'_>) -> Result<DynamicImage, VisionError> {
    let (w, h) = (frame.width as u32, frame.height as u32);
    let data = frame.data.to_vec();
    let expected = frame.width * frame.height * frame.channels;
    let mismatch = || {
        VisionError::Buffer(ImageBufferError::BufferLength {
            expected,
            got: frame.data.len(),
        })
    };
    let img = match frame.channels {
        1 => DynamicImage::ImageLuma8(
            ImageBuffer::<Luma<u8>, _>::from_raw(w, h, data).ok_or_else(mismatch)?,
        ),
        3 => DynamicImage::ImageRgb8(
            ImageBuffer::<Rgb<u8>, _>::from_raw(w, h, data).ok_or_else(mismatch)?,
        ),
        4 => DynamicImage::ImageRgba8(
            ImageBuffer::<Rgba<u8>, _>::from_raw(w, h, data).ok_or_else(mismatch)?,
        ),
        channels => return Err(ImageBufferError::UnsupportedChannels { channels }.into()),
    };
    Ok(img)
}

fn ensure_non_empty(img: &GrayImage) -> Result<(), VisionError> {
    if img.is_empty() {
        return Err(VisionError::EmptyImage);
    }
    Ok(())
}

impl VisionPrimitives for ImageprocVision {
    type Contour = Contour<i32>;

    fn to_gray(&self, frame: &ColorImageView<'_>) -> Result<GrayImage, VisionError> {
        Ok(from_luma(dynamic_from_view(frame)?.to_luma8()))
    }

    fn gaussian_blur(
        &self,
        image: &GrayImage,
        _kernel: usize,
        sigma: f32,
    ) -> Result<GrayImage, VisionError> {
        ensure_non_empty(image)?;
        if sigma.is_nan() || sigma <= 0.0 {
            return Err(VisionError::Backend {
                operation: "gaussian_blur",
                message: format!("sigma must be positive, got {sigma}"),
            });
        }
        // imageproc sizes the kernel from sigma
        Ok(from_luma(gaussian_blur_f32(&to_luma(image)?, sigma)))
    }

    fn threshold(
        &self,
        image: &GrayImage,
        value: u8,
        max_value: u8,
    ) -> Result<GrayImage, VisionError> {
        let src = to_luma(image)?;
        let out = map_colors(&src, |Luma([p])| {
            Luma([if p > value { max_value } else { 0 }])
        });
        Ok(from_luma(out))
    }

    fn dilate(
        &self,
        image: &GrayImage,
        kernel: usize,
        iterations: u32,
    ) -> Result<GrayImage, VisionError> {
        ensure_non_empty(image)?;
        // repeated square dilations compose into one larger square
        let reach = (kernel.saturating_sub(1) * iterations as usize).div_ceil(2);
        if reach == 0 {
            return Ok(image.clone());
        }
        let radius = u8::try_from(reach).unwrap_or(u8::MAX);
        Ok(from_luma(morphology::dilate(
            &to_luma(image)?,
            Norm::LInf,
            radius,
        )))
    }

    fn external_contours(&self, image: &GrayImage) -> Result<Vec<Self::Contour>, VisionError> {
        ensure_non_empty(image)?;
        Ok(find_contours::<i32>(&to_luma(image)?)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .collect())
    }

    fn bounding_rect(&self, contour: &Self::Contour) -> Rect {
        let mut pts = contour.points.iter();
        let Some(first) = pts.next() else {
            return Rect::new(0.0, 0.0, 0.0, 0.0);
        };
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in pts {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Rect::new(
            x0 as f64,
            y0 as f64,
            (x1 - x0 + 1) as f64,
            (y1 - y0 + 1) as f64,
        )
    }

    /// Shoelace area of the boundary polygon through pixel centres.
    fn contour_area(&self, contour: &Self::Contour) -> f64 {
        let pts = &contour.points;
        if pts.len() < 3 {
            return 0.0;
        }
        let twice: i64 = pts
            .iter()
            .zip(pts.iter().cycle().skip(1))
            .map(|(a, b)| a.x as i64 * b.y as i64 - b.x as i64 * a.y as i64)
            .sum();
        twice.abs() as f64 / 2.0
    }

    fn resize(
        &self,
        image: &GrayImage,
        width: usize,
        height: usize,
    ) -> Result<GrayImage, VisionError> {
        ensure_non_empty(image)?;
        if image.width == width && image.height == height {
            return Ok(image.clone());
        }
        // the triangle filter widens with the downscale factor, which
        // approximates area averaging
        let out = ::image::imageops::resize(
            &to_luma(image)?,
            width as u32,
            height as u32,
            FilterType::Triangle,
        );
        Ok(from_luma(out))
    }

    fn crop_and_scale(
        &self,
        frame: &ColorImageView<'_>,
        region: PixelRegion,
        width: usize,
        height: usize,
    ) -> Result<ColorImage, VisionError> {
        if !region.fits_within(frame.width, frame.height) {
            return Err(VisionError::RegionOutOfBounds {
                region,
                width: frame.width,
                height: frame.height,
            });
        }
        let cropped = dynamic_from_view(frame)?
            .crop_imm(
                region.x as u32,
                region.y as u32,
                region.width as u32,
                region.height as u32,
            )
            .resize_exact(width as u32, height as u32, FilterType::Triangle);
        let data = match frame.channels {
            1 => cropped.to_luma8().into_raw(),
            3 => cropped.to_rgb8().into_raw(),
            _ => cropped.to_rgba8().into_raw(),
        };
        Ok(ColorImage {
            width,
            height,
            channels: frame.channels,
            data,
        })
    }
}
