//! Square tile grid detection and rectification, one video frame at a time.
//!
//! A frame of the grid region goes through these stages:
//!
//! 1. preprocess (gray, blur, threshold, dilate, outer contours), delegated
//!    to a [`VisionPrimitives`] backend,
//! 2. [`estimate_grid_size`] from the contour count,
//! 3. [`select_candidates`]: size/aspect filtering and median-based outlier
//!    rejection,
//! 4. [`locate_corners`]: tile midpoints closest to the region corners,
//! 5. [`inspect_quad`]: angle, side ratio and aspect checks,
//! 6. [`plan_rectification`]: padded four-point transform and its
//!    validation, then the warp,
//! 7. [`column_offsets`] for slicing the rectified grid into columns.
//!
//! Any stage may bail; a bailed frame still carries a rendered image.
//! [`GridScanner::process_frame`] runs one frame, [`FrameLoop`] adds the
//! cross-frame state (viewport, last column offsets, frame rate).
//!
//! ```no_run
//! use gridscan_detector::{FrameOutput, GridScanParams, GridScanner, VisionPrimitives};
//! use gridscan_core::ColorImageView;
//!
//! fn scan<V: VisionPrimitives>(vision: V, frame: &ColorImageView<'_>) {
//!     let scanner = GridScanner::new(vision, GridScanParams::default());
//!     match scanner.process_frame(frame) {
//!         Ok(FrameOutput::Rectified(r)) => println!("{}x{} grid, columns {:?}", r.grid_size, r.grid_size, r.columns),
//!         Ok(FrameOutput::Bailed(b)) => println!("bailed: {}", b.reason),
//!         Err(e) => eprintln!("frame error: {e}"),
//!     }
//! }
//! ```

mod candidates;
mod corners;
mod deadline;
mod error;
mod frame_loop;
mod grid_size;
mod params;
mod pipeline;
mod quality;
mod rectify;
mod result;
mod segment;
mod viewport;
mod vision;

pub use candidates::{
    measure_contours, order_row_major, select_candidates, CandidateSelection, MeasuredContour,
    TileCandidate,
};
pub use corners::{closest_to, locate_corners};
pub use deadline::FrameDeadline;
pub use error::{FrameError, VisionError};
pub use frame_loop::{FrameEvent, FrameLoop, FrameRate, FrameStats};
pub use grid_size::{estimate_grid_size, GridEstimate};
pub use params::{
    CandidateParams, FrameLoopParams, GridScanParams, GridSizeParams, OutputParams,
    PreprocessParams, QualityGateParams, RectifyParams, ViewportParams,
};
pub use pipeline::GridScanner;
pub use quality::{inspect_quad, is_quad_too_weird, QuadAngles, QuadDefect, QuadInspection};
pub use rectify::{plan_rectification, square_transform, RectifyPlan, SquareTransform};
pub use result::{
    BailReason, BailedFrame, FrameOutput, PaddingViolation, RectifiedFrame, Stage,
};
pub use segment::{column_offsets, draw_tile_outlines};
pub use viewport::{PixelRegion, Viewport};
pub use vision::VisionPrimitives;
