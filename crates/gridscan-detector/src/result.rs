use std::fmt;

use gridscan_core::{GrayImage, QuadCorners};
use serde::{Deserialize, Serialize};

use crate::quality::QuadDefect;

/// Pipeline stage boundaries, in execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Preprocess,
    EstimateSize,
    FilterCandidates,
    LocateCorners,
    QualityGate,
    Rectify,
    Segment,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Preprocess => "preprocess",
            Stage::EstimateSize => "estimate_size",
            Stage::FilterCandidates => "filter_candidates",
            Stage::LocateCorners => "locate_corners",
            Stage::QualityGate => "quality_gate",
            Stage::Rectify => "rectify",
            Stage::Segment => "segment",
        };
        f.write_str(name)
    }
}

/// Why the padded quad was rejected.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PaddingViolation {
    /// Padded square larger than the grid region plus one padding margin.
    Oversized { side: usize, limit: f64 },
    AspectRatio { ratio: f64 },
    /// A padded corner left the grid region extended by the padding.
    OutOfFrame { x: f64, y: f64 },
}

/// Non-fatal early exit. The frame still renders, just unrectified.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BailReason {
    GridTooSmall { size: usize, minimum: usize },
    InsufficientCandidates { found: usize, expected: usize },
    QuadRejected { defects: Vec<QuadDefect> },
    PaddedQuadRejected { violation: PaddingViolation },
    DegenerateTransform { stage: Stage },
    DeadlineExceeded { stage: Stage, elapsed_ms: u64 },
}

impl BailReason {
    /// Stage whose outcome triggered the bail.
    pub fn stage(&self) -> Stage {
        match self {
            BailReason::GridTooSmall { .. } | BailReason::InsufficientCandidates { .. } => {
                Stage::LocateCorners
            }
            BailReason::QuadRejected { .. } => Stage::QualityGate,
            BailReason::PaddedQuadRejected { .. } => Stage::Rectify,
            BailReason::DegenerateTransform { stage } | BailReason::DeadlineExceeded { stage, .. } => {
                *stage
            }
        }
    }
}

impl fmt::Display for BailReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BailReason::GridTooSmall { size, minimum } => {
                write!(f, "grid size {size} below minimum {minimum}")
            }
            BailReason::InsufficientCandidates { found, expected } => {
                write!(f, "found {found} tile candidates, expected {expected}")
            }
            BailReason::QuadRejected { defects } => write!(f, "quad rejected: {defects:?}"),
            BailReason::PaddedQuadRejected { violation } => {
                write!(f, "padded quad rejected: {violation:?}")
            }
            BailReason::DegenerateTransform { stage } => {
                write!(f, "degenerate transform in {stage}")
            }
            BailReason::DeadlineExceeded { stage, elapsed_ms } => {
                write!(f, "frame budget exceeded after {stage} ({elapsed_ms} ms)")
            }
        }
    }
}

/// A frame whose grid was found and rectified.
#[derive(Clone, Debug)]
pub struct RectifiedFrame {
    /// Padded, rectified binary image at native resolution.
    pub image: GrayImage,
    /// `image` resized to the render size.
    pub rendered: GrayImage,
    pub grid_size: usize,
    /// Tile edge in the unpadded rectified square, native pixels.
    pub tile_width: f64,
    /// Left edge of every tile column in rendered pixels.
    pub columns: Vec<f64>,
    /// Outer tile midpoints in grid-region coordinates.
    pub corners: QuadCorners,
    /// Padded source quad in grid-region coordinates.
    pub padded_quad: QuadCorners,
}

impl RectifiedFrame {
    /// `[start, end)` of every tile column in rendered pixels.
    pub fn column_spans(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        let scale = self.rendered.width as f64 / self.image.width.max(1) as f64;
        let width = self.tile_width * scale;
        self.columns.iter().map(move |&x| (x, x + width))
    }
}

/// A frame that bailed out before rectification.
#[derive(Clone, Debug)]
pub struct BailedFrame {
    /// The thresholded working image resized to the render size.
    pub rendered: GrayImage,
    pub grid_size: usize,
    pub reason: BailReason,
}

#[derive(Clone, Debug)]
pub enum FrameOutput {
    Rectified(RectifiedFrame),
    Bailed(BailedFrame),
}

impl FrameOutput {
    /// Image to present, whichever way the frame ended.
    pub fn rendered(&self) -> &GrayImage {
        match self {
            FrameOutput::Rectified(frame) => &frame.rendered,
            FrameOutput::Bailed(frame) => &frame.rendered,
        }
    }

    pub fn grid_size(&self) -> usize {
        match self {
            FrameOutput::Rectified(frame) => frame.grid_size,
            FrameOutput::Bailed(frame) => frame.grid_size,
        }
    }

    pub fn is_rectified(&self) -> bool {
        matches!(self, FrameOutput::Rectified(_))
    }

    pub fn rectified(&self) -> Option<&RectifiedFrame> {
        match self {
            FrameOutput::Rectified(frame) => Some(frame),
            FrameOutput::Bailed(_) => None,
        }
    }

    pub fn bail_reason(&self) -> Option<&BailReason> {
        match self {
            FrameOutput::Rectified(_) => None,
            FrameOutput::Bailed(frame) => Some(&frame.reason),
        }
    }
}
