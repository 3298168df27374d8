//! Synthetic vision backend: paints and reports a fixed set of tile boxes
//! and counts how many contour handles are alive.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use gridscan_core::{ColorImage, ColorImageView, GrayImage, ImageBufferError, Rect};
use gridscan_detector::{PixelRegion, VisionError, VisionPrimitives};

pub struct SyntheticContour {
    rect: Rect,
    live: Arc<AtomicUsize>,
}

impl Drop for SyntheticContour {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct SyntheticVision {
    blobs: Arc<Mutex<Vec<Rect>>>,
    live: Arc<AtomicUsize>,
    issued: Arc<AtomicUsize>,
}

impl SyntheticVision {
    pub fn new(blobs: Vec<Rect>) -> Self {
        Self {
            blobs: Arc::new(Mutex::new(blobs)),
            ..Self::default()
        }
    }

    /// Swap the scene seen by this backend and every clone of it.
    pub fn set_blobs(&self, blobs: Vec<Rect>) {
        *self.blobs.lock().unwrap() = blobs;
    }

    fn blobs(&self) -> Vec<Rect> {
        self.blobs.lock().unwrap().clone()
    }

    /// Contour handles not yet dropped.
    pub fn live_contours(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn issued_contours(&self) -> usize {
        self.issued.load(Ordering::SeqCst)
    }
}

fn check_channels(channels: usize) -> Result<(), VisionError> {
    if matches!(channels, 1 | 3 | 4) {
        Ok(())
    } else {
        Err(ImageBufferError::UnsupportedChannels { channels }.into())
    }
}

fn nearest(src: &GrayImage, width: usize, height: usize) -> GrayImage {
    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let sx = x * src.width / width;
            let sy = y * src.height / height;
            out.data[y * width + x] = src.data[sy * src.width + sx];
        }
    }
    out
}

impl VisionPrimitives for SyntheticVision {
    type Contour = SyntheticContour;

    fn to_gray(&self, frame: &ColorImageView<'_>) -> Result<GrayImage, VisionError> {
        check_channels(frame.channels)?;
        let mut gray = GrayImage::new(frame.width, frame.height);
        for r in &self.blobs() {
            let x0 = r.x.max(0.0) as usize;
            let y0 = r.y.max(0.0) as usize;
            let x1 = ((r.x + r.width) as usize).min(frame.width);
            let y1 = ((r.y + r.height) as usize).min(frame.height);
            for y in y0..y1 {
                for x in x0..x1 {
                    gray.data[y * frame.width + x] = 230;
                }
            }
        }
        Ok(gray)
    }

    fn gaussian_blur(
        &self,
        image: &GrayImage,
        _kernel: usize,
        _sigma: f32,
    ) -> Result<GrayImage, VisionError> {
        Ok(image.clone())
    }

    fn threshold(
        &self,
        image: &GrayImage,
        value: u8,
        max_value: u8,
    ) -> Result<GrayImage, VisionError> {
        let mut out = image.clone();
        for p in &mut out.data {
            *p = if *p > value { max_value } else { 0 };
        }
        Ok(out)
    }

    fn dilate(
        &self,
        image: &GrayImage,
        _kernel: usize,
        _iterations: u32,
    ) -> Result<GrayImage, VisionError> {
        Ok(image.clone())
    }

    fn external_contours(&self, _image: &GrayImage) -> Result<Vec<Self::Contour>, VisionError> {
        Ok(self
            .blobs()
            .into_iter()
            .map(|rect| {
                self.live.fetch_add(1, Ordering::SeqCst);
                self.issued.fetch_add(1, Ordering::SeqCst);
                SyntheticContour {
                    rect,
                    live: Arc::clone(&self.live),
                }
            })
            .collect())
    }

    fn bounding_rect(&self, contour: &Self::Contour) -> Rect {
        contour.rect
    }

    fn contour_area(&self, contour: &Self::Contour) -> f64 {
        contour.rect.area()
    }

    fn resize(
        &self,
        image: &GrayImage,
        width: usize,
        height: usize,
    ) -> Result<GrayImage, VisionError> {
        if image.is_empty() {
            return Err(VisionError::EmptyImage);
        }
        Ok(nearest(image, width, height))
    }

    fn crop_and_scale(
        &self,
        frame: &ColorImageView<'_>,
        region: PixelRegion,
        width: usize,
        height: usize,
    ) -> Result<ColorImage, VisionError> {
        check_channels(frame.channels)?;
        if !region.fits_within(frame.width, frame.height) {
            return Err(VisionError::RegionOutOfBounds {
                region,
                width: frame.width,
                height: frame.height,
            });
        }
        Ok(ColorImage {
            width,
            height,
            channels: frame.channels,
            data: vec![0; width * height * frame.channels],
        })
    }
}

/// `size`×`size` square boxes of edge `tile` centred on `centres`.
pub fn tiles_at(centres: &[(f64, f64)], tile: f64) -> Vec<Rect> {
    centres
        .iter()
        .map(|&(cx, cy)| Rect::new(cx - tile / 2.0, cy - tile / 2.0, tile, tile))
        .collect()
}

/// Row-major lattice of centres.
pub fn lattice(xs: &[f64], ys: &[f64]) -> Vec<(f64, f64)> {
    ys.iter()
        .flat_map(|&y| xs.iter().map(move |&x| (x, y)))
        .collect()
}

pub fn black_frame(width: usize, height: usize) -> Vec<u8> {
    vec![0; width * height * 3]
}

/// Route pipeline logs through the test harness; `RUST_LOG=debug` shows
/// the per-stage traces.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
