use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Binarisation and blob extraction settings handed to the vision backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessParams {
    /// Gaussian kernel size (odd).
    pub blur_kernel: usize,
    /// Gaussian sigma; `<= 0` derives it from the kernel size.
    pub blur_sigma: f32,
    /// Pixels strictly brighter than this become `threshold_max`, the rest 0.
    pub threshold: u8,
    pub threshold_max: u8,
    /// Square dilation kernel edge length in pixels.
    pub dilate_kernel: usize,
    pub dilate_iterations: u32,
}

impl PreprocessParams {
    /// Blur sigma to use; a non-positive `blur_sigma` is derived from the
    /// kernel size the way common imaging libraries do it.
    pub fn effective_sigma(&self) -> f32 {
        if self.blur_sigma > 0.0 {
            return self.blur_sigma;
        }
        let k = self.blur_kernel.max(1) as f32;
        0.3 * ((k - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            blur_kernel: 5,
            blur_sigma: 0.0,
            threshold: 185,
            threshold_max: 255,
            dilate_kernel: 4,
            dilate_iterations: 5,
        }
    }
}

/// Grid side length heuristic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSizeParams {
    /// Added to the contour count before the square root when the count is
    /// not a perfect square. Negative values discount blobs from UI text
    /// that dilate to tile size.
    pub contour_bias: i32,
    /// Subtracted from the square root before rounding; positive values
    /// prefer the smaller grid.
    pub round_down_skew: f64,
    /// Smallest grid that is rectified at all.
    pub min_grid_size: usize,
}

impl Default for GridSizeParams {
    fn default() -> Self {
        Self {
            contour_bias: -2,
            round_down_skew: 0.25,
            min_grid_size: 3,
        }
    }
}

/// Tile-likeness filter for contour bounding boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateParams {
    /// Exclusive lower bound on `width / height`.
    pub min_aspect: f64,
    /// Exclusive upper bound on `width / height`.
    pub max_aspect: f64,
}

impl Default for CandidateParams {
    fn default() -> Self {
        Self {
            min_aspect: 0.8,
            max_aspect: 2.5,
        }
    }
}

/// Geometric plausibility checks on the outer quadrilateral.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityGateParams {
    /// Tolerance of the opposite-angle ("isosceles trapezoid") check, degrees.
    pub opposite_angle_tolerance_deg: f64,
    /// Tolerance of the parallelogram check, degrees.
    pub parallelogram_tolerance_deg: f64,
    /// Opposite side lengths may differ by at most this factor.
    pub max_side_ratio: f64,
    /// Maximum mean-horizontal over mean-vertical side length.
    pub max_aspect: f64,
    /// Compare the top-left angle against the bottom-left *angle* in the
    /// opposite-angle check.
    ///
    /// Off by default: the deployed behaviour compares the top-left angle
    /// against the bottom-left corner point, a comparison that never holds,
    /// so the opposite-angle check never rejects a quad. Turning this on
    /// enables the check as its name suggests.
    pub compare_bottom_left_angle: bool,
}

impl Default for QualityGateParams {
    fn default() -> Self {
        Self {
            opposite_angle_tolerance_deg: 5.0,
            parallelogram_tolerance_deg: 25.0,
            max_side_ratio: 3.0,
            max_aspect: 3.0,
            compare_bottom_left_angle: false,
        }
    }
}

/// Validation bounds for the padded rectification.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RectifyParams {
    pub min_padded_aspect: f64,
    pub max_padded_aspect: f64,
}

impl Default for RectifyParams {
    fn default() -> Self {
        Self {
            min_padded_aspect: 0.8,
            max_padded_aspect: 1.2,
        }
    }
}

/// Rendered (display) output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputParams {
    /// Edge of the square rendered image.
    pub render_size: usize,
    /// Outline every tile cell on the rendered image of a rectified frame.
    /// The native rectified buffer is never annotated.
    pub draw_tiles: bool,
}

impl Default for OutputParams {
    fn default() -> Self {
        Self {
            render_size: 400,
            draw_tiles: false,
        }
    }
}

/// Mapping from raw video frames to the grid region and the display canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportParams {
    /// Edge of the square working canvas the centred video crop is scaled to.
    pub source_size: usize,
    /// Fraction of the working canvas (centred) that holds the grid.
    pub grid_fraction: f64,
    /// Edge of the square display canvas.
    pub display_size: usize,
}

impl Default for ViewportParams {
    fn default() -> Self {
        Self {
            source_size: 1080,
            grid_fraction: 0.5,
            display_size: 400,
        }
    }
}

/// Pacing of the presentation loop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameLoopParams {
    /// Frames arriving sooner than this after the last processed frame are skipped.
    pub min_frame_interval_ms: f64,
    /// Number of inter-frame intervals averaged into the frame rate.
    pub fps_window: usize,
}

impl Default for FrameLoopParams {
    fn default() -> Self {
        Self {
            min_frame_interval_ms: 33.0,
            fps_window: 6,
        }
    }
}

/// Full configuration of the per-frame pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridScanParams {
    pub preprocess: PreprocessParams,
    pub grid_size: GridSizeParams,
    pub candidates: CandidateParams,
    pub quality: QualityGateParams,
    pub rectify: RectifyParams,
    pub output: OutputParams,
    pub viewport: ViewportParams,
    pub frame_loop: FrameLoopParams,
    /// Optional per-frame time budget. When set, a frame that is still
    /// running after this many milliseconds bails at the next stage boundary.
    pub frame_budget_ms: Option<u64>,
}

impl GridScanParams {
    pub fn frame_budget(&self) -> Option<Duration> {
        self.frame_budget_ms.map(Duration::from_millis)
    }
}
