//! Tile candidate selection from contour bounding boxes.

use gridscan_core::{median_by, Point2, Rect};
use serde::{Deserialize, Serialize};

use crate::grid_size::GridEstimate;
use crate::params::CandidateParams;
use crate::vision::VisionPrimitives;

/// Bounding box and enclosed area of one contour.
///
/// This is all the pipeline keeps of a contour; the backend handle itself
/// is released as soon as these two values are read.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeasuredContour {
    pub rect: Rect,
    pub area: f64,
}

/// A contour bounding box that survived the tile filters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileCandidate {
    pub rect: Rect,
    pub midpoint: Point2<f64>,
}

impl TileCandidate {
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            rect,
            midpoint: rect.midpoint(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CandidateSelection {
    /// At most `N²` candidates in row-major order.
    pub candidates: Vec<TileCandidate>,
    /// Boxes that passed the area and aspect filters, before truncation.
    pub tile_like: usize,
    pub expected_tile_area: f64,
    pub median_width: f64,
    pub median_height: f64,
}

/// Read bounding box and area of every contour, consuming the handles.
pub fn measure_contours<V: VisionPrimitives>(
    vision: &V,
    contours: Vec<V::Contour>,
) -> Vec<MeasuredContour> {
    contours
        .into_iter()
        .map(|contour| MeasuredContour {
            rect: vision.bounding_rect(&contour),
            area: vision.contour_area(&contour),
        })
        .collect()
}

/// Keep the `N²` boxes that look most like grid tiles.
///
/// A box qualifies when its contour area fits inside one expected tile
/// (`grid_width / (N - 1)` squared) and its aspect ratio lies strictly
/// inside the configured bounds. Qualifying boxes are ranked by distance of
/// their (height, width) from the median (height, width), the closest `N²`
/// kept and finally ordered row-major.
pub fn select_candidates(
    measured: &[MeasuredContour],
    grid: GridEstimate,
    grid_width: f64,
    params: &CandidateParams,
) -> CandidateSelection {
    let tile_edge = grid_width / (grid.size as f64 - 1.0);
    let expected_tile_area = tile_edge * tile_edge;

    let mut candidates: Vec<TileCandidate> = measured
        .iter()
        .filter(|m| m.area <= expected_tile_area)
        .filter(|m| {
            let aspect = m.rect.aspect_ratio();
            aspect > params.min_aspect && aspect < params.max_aspect
        })
        .map(|m| TileCandidate::from_rect(m.rect))
        .collect();
    let tile_like = candidates.len();

    let median_height = median_by(&candidates, |c| c.rect.height);
    let median_width = median_by(&candidates, |c| c.rect.width);
    let deviation = |c: &TileCandidate| {
        (c.rect.height - median_height).hypot(c.rect.width - median_width)
    };
    candidates.sort_by(|a, b| deviation(a).total_cmp(&deviation(b)));
    candidates.truncate(grid.tile_count());
    order_row_major(&mut candidates);

    CandidateSelection {
        candidates,
        tile_like,
        expected_tile_area,
        median_width,
        median_height,
    }
}

/// Sort by `y * 1000 + x` of the midpoints.
///
/// The weighting assumes rows are separated by far more than a pixel and
/// the image is narrower than 1000 px, which holds for the grid region.
pub fn order_row_major(candidates: &mut [TileCandidate]) {
    let key = |c: &TileCandidate| c.midpoint.y * 1000.0 + c.midpoint.x;
    candidates.sort_by(|a, b| key(a).total_cmp(&key(b)));
}
