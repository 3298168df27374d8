//! Locate, validate and rectify square tile grids in live video frames.
//!
//! This crate provides:
//! - re-exports of the geometric core and the per-frame detector,
//! - (feature `image`, default) a [`VisionPrimitives`] backend built on
//!   `image` + `imageproc`, plus end-to-end helpers working on
//!   `image::RgbImage`,
//! - JSON configuration and report types for batch scans,
//! - (feature `cli`, default) the `gridscan` command line tool.
//!
//! ## Quickstart
//!
//! ```no_run
//! use gridscan::{scan, GridScanParams};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = scan::load_rgb("grid.png")?;
//! let scanner = scan::default_scanner(GridScanParams::default());
//! let output = scan::scan_image(&scanner, &img)?;
//! match output.rectified() {
//!     Some(frame) => println!("{0}x{0} grid, columns {1:?}", frame.grid_size, frame.columns),
//!     None => println!("no grid: {:?}", output.bail_reason()),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `gridscan::core`: pixel buffers, homographies, planar geometry.
//! - `gridscan::detector`: the pipeline stages, [`GridScanner`] and [`FrameLoop`].
//! - `gridscan::vision` (feature `image`): [`ImageprocVision`].
//! - `gridscan::scan` (feature `image`): decode, scan, save.
//! - `gridscan::io`: [`ScanConfig`] and [`ScanReport`].
//!
//! [`VisionPrimitives`]: detector::VisionPrimitives

pub use gridscan_core as core;
pub use gridscan_detector as detector;

pub use gridscan_core::{ColorImage, ColorImageView, GrayImage, QuadCorners};
pub use gridscan_detector::{
    BailReason, FrameEvent, FrameLoop, FrameOutput, GridScanParams, GridScanner, RectifiedFrame,
};

pub mod io;
pub use io::{FrameReport, ScanConfig, ScanIoError, ScanReport};

#[cfg(feature = "image")]
pub mod scan;
#[cfg(feature = "image")]
pub mod vision;

#[cfg(feature = "image")]
pub use scan::ScanError;
#[cfg(feature = "image")]
pub use vision::ImageprocVision;
