//! Padded four-point rectification of the outer tile quad.
//!
//! The detected corners are tile *midpoints*, so the primary transform
//! cuts half a tile off every border. The plan maps a destination square
//! grown by half a tile on each side back into the source, re-solves on
//! those padded points, and validates the result before anything is warped.

use gridscan_core::{homography_from_4pt, Homography, Point2, QuadCorners};

use crate::grid_size::GridEstimate;
use crate::params::RectifyParams;
use crate::result::{BailReason, PaddingViolation, Stage};

/// Projective map from a source quad onto a `side`×`side` square.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SquareTransform {
    pub h_dst_from_src: Homography,
    pub side: usize,
}

/// Solve the transform taking `quad` (TL, TR, BR, BL) to an axis-aligned square.
///
/// The side is the smaller of the longer rounded horizontal edge and the
/// longer rounded vertical edge. Returns `None` for squares under two pixels
/// or when the correspondences are degenerate.
pub fn square_transform(quad: &QuadCorners) -> Option<SquareTransform> {
    let width = quad.top_width().round().max(quad.bottom_width().round());
    let height = quad.left_height().round().max(quad.right_height().round());
    let side = width.min(height);
    if !side.is_finite() || side < 2.0 {
        return None;
    }

    let far = side - 1.0;
    let dst = [
        Point2::new(0.0, 0.0),
        Point2::new(far, 0.0),
        Point2::new(far, far),
        Point2::new(0.0, far),
    ];
    let h_dst_from_src = homography_from_4pt(&quad.to_array(), &dst)?;
    Some(SquareTransform {
        h_dst_from_src,
        side: side as usize,
    })
}

/// Everything needed to warp one frame, already validated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RectifyPlan {
    pub primary: SquareTransform,
    pub padded: SquareTransform,
    /// Tile edge in the unpadded square.
    pub tile_width: f64,
    pub pad: f64,
    pub padded_quad: QuadCorners,
    /// Maps padded output pixels back into the grid region.
    pub h_src_from_padded: Homography,
}

impl RectifyPlan {
    #[inline]
    pub fn output_side(&self) -> usize {
        self.padded.side
    }
}

/// Build and validate the padded rectification of `corners`.
pub fn plan_rectification(
    corners: &QuadCorners,
    grid: GridEstimate,
    grid_width: f64,
    grid_height: f64,
    params: &RectifyParams,
) -> Result<RectifyPlan, BailReason> {
    let degenerate = BailReason::DegenerateTransform {
        stage: Stage::Rectify,
    };

    let primary = square_transform(corners).ok_or_else(|| degenerate.clone())?;
    let side = primary.side as f64;
    let tile_width = side / (grid.size as f64 - 1.0);
    let pad = tile_width / 2.0;

    let h_src_from_dst = primary
        .h_dst_from_src
        .pseudo_inverse()
        .ok_or_else(|| degenerate.clone())?;
    let far = side - 1.0 + pad;
    let padded_dst = [
        Point2::new(-pad, -pad),
        Point2::new(far, -pad),
        Point2::new(far, far),
        Point2::new(-pad, far),
    ];
    let padded_pts = h_src_from_dst.apply_all(&padded_dst);
    if padded_pts
        .iter()
        .any(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(degenerate);
    }
    let padded_quad = QuadCorners::from_array(padded_pts);

    let padded = square_transform(&padded_quad).ok_or_else(|| degenerate.clone())?;
    validate_padded(&padded, &padded_pts, grid_width, grid_height, pad, params)
        .map_err(|violation| BailReason::PaddedQuadRejected { violation })?;

    let h_src_from_padded = padded.h_dst_from_src.inverse().ok_or(degenerate)?;

    log::debug!(
        "[rectify] side={} padded_side={} tile={tile_width:.2} pad={pad:.2}",
        primary.side,
        padded.side
    );

    Ok(RectifyPlan {
        primary,
        padded,
        tile_width,
        pad,
        padded_quad,
        h_src_from_padded,
    })
}

fn validate_padded(
    padded: &SquareTransform,
    padded_pts: &[Point2<f64>; 4],
    grid_width: f64,
    grid_height: f64,
    pad: f64,
    params: &RectifyParams,
) -> Result<(), PaddingViolation> {
    let (width, height) = (padded.side as f64, padded.side as f64);
    if height > grid_height + pad || width > grid_width + pad {
        return Err(PaddingViolation::Oversized {
            side: padded.side,
            limit: grid_width.min(grid_height) + pad,
        });
    }

    let ratio = width / height;
    if !(params.min_padded_aspect..=params.max_padded_aspect).contains(&ratio) {
        return Err(PaddingViolation::AspectRatio { ratio });
    }

    let x_range = -pad..=grid_width + pad;
    let y_range = -pad..=grid_height + pad;
    if let Some(p) = padded_pts
        .iter()
        .find(|p| !x_range.contains(&p.x) || !y_range.contains(&p.y))
    {
        return Err(PaddingViolation::OutOfFrame { x: p.x, y: p.y });
    }
    Ok(())
}
