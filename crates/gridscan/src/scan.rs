//! End-to-end helpers: decode images, run the pipeline, save renders.

use std::path::{Path, PathBuf};
use std::time::Instant;

use ::image::ImageReader;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::core::{ColorImageView, GrayImage, ImageBufferError};
use crate::detector::{
    FrameError, FrameEvent, FrameLoop, FrameOutput, GridScanParams, GridScanner,
};
use crate::io::{FrameReport, ScanConfig, ScanIoError, ScanReport};
use crate::vision::{to_luma, ImageprocVision};

/// Errors produced by the high-level scan helpers.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Image(#[from] ::image::ImageError),
    #[error(transparent)]
    Io(#[from] ScanIoError),
    #[error(transparent)]
    Buffer(#[from] ImageBufferError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error("frame throttled by the frame loop")]
    Throttled,
}

/// Scanner wired to the `imageproc` backend.
pub fn default_scanner(params: GridScanParams) -> GridScanner<ImageprocVision> {
    GridScanner::new(ImageprocVision, params)
}

pub fn load_rgb(path: impl AsRef<Path>) -> Result<::image::RgbImage, ScanError> {
    Ok(ImageReader::open(path)
        .map_err(ScanIoError::from)?
        .decode()?
        .to_rgb8())
}

/// Borrow an `image::RgbImage` as a core frame view.
pub fn rgb_view(img: &::image::RgbImage) -> Result<ColorImageView<'_>, ImageBufferError> {
    ColorImageView::new(img.width() as usize, img.height() as usize, 3, img.as_raw())
}

/// Run one image, treated as the grid region, through the pipeline.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(scanner, img), fields(width = img.width(), height = img.height()))
)]
pub fn scan_image(
    scanner: &GridScanner<ImageprocVision>,
    img: &::image::RgbImage,
) -> Result<FrameOutput, ScanError> {
    Ok(scanner.process_frame(&rgb_view(img)?)?)
}

pub fn save_gray(path: impl AsRef<Path>, img: &GrayImage) -> Result<(), ScanError> {
    to_luma(img)
        .map_err(FrameError::from)?
        .save(path.as_ref())?;
    Ok(())
}

fn file_stem(input: &str) -> String {
    Path::new(input)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "frame".to_string())
}

/// Scan every input of `config` and build the report.
///
/// Per-input failures (unreadable file, frame error) are recorded in the
/// report and do not stop the batch. Rendered images are written when an
/// output directory is configured.
pub fn run_scan(config: &ScanConfig) -> Result<ScanReport, ScanError> {
    let out_dir = config.output_dir.as_ref().map(PathBuf::from);
    if let Some(dir) = &out_dir {
        std::fs::create_dir_all(dir).map_err(ScanIoError::from)?;
    }

    let mut frames = FrameLoop::new(default_scanner(config.params.clone()));
    // frames are replayed as if they arrived at a steady pace
    let spacing_ms = config.params.frame_loop.min_frame_interval_ms.max(1.0);
    let mut report = ScanReport::new(config.params.clone());

    for (index, input) in config.inputs.iter().enumerate() {
        let started = Instant::now();
        let mut entry = FrameReport::new(input.clone(), 0, 0);

        let outcome = load_rgb(input).and_then(|img| {
            entry.width = img.width() as usize;
            entry.height = img.height() as usize;
            if config.video_frames {
                let view = rgb_view(&img)?;
                match frames.submit(&view, index as f64 * spacing_ms) {
                    FrameEvent::Processed(output) => Ok(output),
                    FrameEvent::Failed(err) => Err(err.into()),
                    FrameEvent::Throttled => Err(ScanError::Throttled),
                }
            } else {
                scan_image(frames.scanner(), &img)
            }
        });

        match outcome {
            Ok(output) => {
                entry.set_output(&output);
                if let Some(dir) = &out_dir {
                    write_renders(dir, input, &output, &mut entry)?;
                }
            }
            Err(err) => {
                log::warn!("{input}: {err}");
                entry.set_error(err);
            }
        }

        entry.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        report.push(entry);
    }

    log::info!(
        "scanned {} inputs: {} rectified, {} bailed, {} failed",
        report.frames.len(),
        report.summary.rectified,
        report.summary.bailed,
        report.summary.failed
    );
    Ok(report)
}

fn write_renders(
    dir: &Path,
    input: &str,
    output: &FrameOutput,
    entry: &mut FrameReport,
) -> Result<(), ScanError> {
    let stem = file_stem(input);
    let rendered = dir.join(format!("{stem}_rendered.png"));
    save_gray(&rendered, output.rendered())?;
    entry.rendered_path = Some(rendered.to_string_lossy().into_owned());

    if let FrameOutput::Rectified(frame) = output {
        let rectified = dir.join(format!("{stem}_rectified.png"));
        save_gray(&rectified, &frame.image)?;
        entry.rectified_path = Some(rectified.to_string_lossy().into_owned());
    }
    Ok(())
}
