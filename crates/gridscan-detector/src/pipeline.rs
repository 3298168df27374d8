//! Per-frame orchestration of the detection stages.

use gridscan_core::{ColorImageView, GrayImage};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::candidates::{measure_contours, select_candidates};
use crate::corners::locate_corners;
use crate::deadline::FrameDeadline;
use crate::error::{FrameError, VisionError};
use crate::grid_size::{estimate_grid_size, GridEstimate};
use crate::params::GridScanParams;
use crate::quality::inspect_quad;
use crate::rectify::plan_rectification;
use crate::result::{BailReason, BailedFrame, FrameOutput, RectifiedFrame, Stage};
use crate::segment::{column_offsets, draw_tile_outlines};
use crate::vision::VisionPrimitives;

/// State of one frame as it moves through the stages.
///
/// Built fresh for every frame; nothing in it survives to the next one.
struct FrameContext {
    grid_width: f64,
    grid_height: f64,
    /// Thresholded (pre-dilation) working image, warped on success and
    /// rendered as-is on bail.
    binary: GrayImage,
    grid: GridEstimate,
    deadline: FrameDeadline,
}

/// Early exit from [`GridScanner::detect`].
enum Interrupt {
    Bail(BailReason),
    Fault(FrameError),
}

impl From<BailReason> for Interrupt {
    fn from(reason: BailReason) -> Self {
        Interrupt::Bail(reason)
    }
}

impl From<VisionError> for Interrupt {
    fn from(err: VisionError) -> Self {
        Interrupt::Fault(FrameError::Vision(err))
    }
}

/// Grid detector bound to a vision backend.
pub struct GridScanner<V> {
    vision: V,
    params: GridScanParams,
}

impl<V: VisionPrimitives> GridScanner<V> {
    pub fn new(vision: V, params: GridScanParams) -> Self {
        Self { vision, params }
    }

    #[inline]
    pub fn params(&self) -> &GridScanParams {
        &self.params
    }

    #[inline]
    pub fn vision(&self) -> &V {
        &self.vision
    }

    /// Run the full pipeline on one frame of the grid region.
    ///
    /// Returns a rectified frame, or a bailed frame carrying the thresholded
    /// input when any stage rejects it. `Err` is reserved for faults in the
    /// vision backend or an unusable input buffer.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, frame), fields(width = frame.width, height = frame.height))
    )]
    pub fn process_frame(&self, frame: &ColorImageView<'_>) -> Result<FrameOutput, FrameError> {
        if frame.width < 2 || frame.height < 2 {
            return Err(FrameError::EmptyFrame {
                width: frame.width,
                height: frame.height,
            });
        }

        let deadline = FrameDeadline::start(self.params.frame_budget());
        let (binary, contours) = self.preprocess(frame)?;
        let grid = estimate_grid_size(contours.len(), &self.params.grid_size);
        log::debug!("[grid_size] {} contours -> N={}", contours.len(), grid.size);

        let ctx = FrameContext {
            grid_width: frame.width as f64,
            grid_height: frame.height as f64,
            binary,
            grid,
            deadline,
        };

        match self.detect(&ctx, contours) {
            Ok(rectified) => {
                log::info!(
                    "rectified {n}x{n} grid into {side}px ({ms} ms)",
                    n = rectified.grid_size,
                    side = rectified.image.width,
                    ms = ctx.deadline.elapsed().as_millis()
                );
                Ok(FrameOutput::Rectified(rectified))
            }
            Err(Interrupt::Bail(reason)) => self.bail(ctx, reason).map(FrameOutput::Bailed),
            Err(Interrupt::Fault(err)) => Err(err),
        }
    }

    /// Gray, blur, threshold, dilate, then extract outer contours.
    ///
    /// Returns the thresholded image (not the dilated one) with the contours.
    fn preprocess(
        &self,
        frame: &ColorImageView<'_>,
    ) -> Result<(GrayImage, Vec<V::Contour>), VisionError> {
        let p = &self.params.preprocess;
        let gray = self.vision.to_gray(frame)?;
        let blurred = self
            .vision
            .gaussian_blur(&gray, p.blur_kernel, p.effective_sigma())?;
        drop(gray);
        let binary = self.vision.threshold(&blurred, p.threshold, p.threshold_max)?;
        drop(blurred);
        let dilated = self
            .vision
            .dilate(&binary, p.dilate_kernel, p.dilate_iterations)?;
        let contours = self.vision.external_contours(&dilated)?;
        Ok((binary, contours))
    }

    fn detect(
        &self,
        ctx: &FrameContext,
        contours: Vec<V::Contour>,
    ) -> Result<RectifiedFrame, Interrupt> {
        ctx.deadline.check(Stage::Preprocess)?;
        let measured = measure_contours(&self.vision, contours);
        ctx.deadline.check(Stage::EstimateSize)?;

        let selection = select_candidates(
            &measured,
            ctx.grid,
            ctx.grid_width,
            &self.params.candidates,
        );
        log::debug!(
            "[candidates] {} of {} contours tile-like (max area {:.0}, median {:.1}x{:.1}), kept {}",
            selection.tile_like,
            measured.len(),
            selection.expected_tile_area,
            selection.median_width,
            selection.median_height,
            selection.candidates.len()
        );
        ctx.deadline.check(Stage::FilterCandidates)?;

        let corners = locate_corners(
            &selection.candidates,
            ctx.grid,
            ctx.grid_width,
            ctx.grid_height,
            self.params.grid_size.min_grid_size,
        )?;
        ctx.deadline.check(Stage::LocateCorners)?;

        let inspection = inspect_quad(&corners, &self.params.quality);
        if inspection.is_too_weird() {
            return Err(BailReason::QuadRejected {
                defects: inspection.defects,
            }
            .into());
        }
        ctx.deadline.check(Stage::QualityGate)?;

        let plan = plan_rectification(
            &corners,
            ctx.grid,
            ctx.grid_width,
            ctx.grid_height,
            &self.params.rectify,
        )?;
        let side = plan.output_side();
        let image = self
            .vision
            .warp_perspective(&ctx.binary, &plan.h_src_from_padded, side, side);
        let render = self.params.output.render_size;
        let rendered = if self.params.output.draw_tiles {
            let mut annotated = image.clone();
            draw_tile_outlines(&mut annotated, ctx.grid.size, plan.tile_width, u8::MAX);
            self.vision.resize(&annotated, render, render)?
        } else {
            self.vision.resize(&image, render, render)?
        };
        ctx.deadline.check(Stage::Rectify)?;

        let columns = column_offsets(
            ctx.grid.size,
            plan.tile_width,
            image.width as f64,
            render as f64,
        );
        log::debug!("[segment] columns={columns:?}");

        Ok(RectifiedFrame {
            image,
            rendered,
            grid_size: ctx.grid.size,
            tile_width: plan.tile_width,
            columns,
            corners,
            padded_quad: plan.padded_quad,
        })
    }

    fn bail(&self, ctx: FrameContext, reason: BailReason) -> Result<BailedFrame, FrameError> {
        match &reason {
            BailReason::DeadlineExceeded { .. } | BailReason::DegenerateTransform { .. } => {
                log::warn!("bail: {reason}")
            }
            _ => log::debug!("[bail] {reason}"),
        }
        let render = self.params.output.render_size;
        let rendered = self.vision.resize(&ctx.binary, render, render)?;
        Ok(BailedFrame {
            rendered,
            grid_size: ctx.grid.size,
            reason,
        })
    }
}
