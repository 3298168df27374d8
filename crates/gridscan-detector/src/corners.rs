use gridscan_core::{point_distance, Point2, QuadCorners};

use crate::candidates::TileCandidate;
use crate::grid_size::GridEstimate;
use crate::result::BailReason;

/// Point of `points` nearest to `target`; the earliest one wins ties.
pub fn closest_to(points: &[Point2<f64>], target: Point2<f64>) -> Option<Point2<f64>> {
    points
        .iter()
        .copied()
        .fold(None, |best: Option<(Point2<f64>, f64)>, p| {
            let d = point_distance(p, target);
            match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((p, d)),
            }
        })
        .map(|(p, _)| p)
}

/// Pick the tile midpoints closest to the four corners of the grid region.
///
/// Bails unless exactly `N²` candidates are present and `N` reaches
/// `min_grid_size`.
pub fn locate_corners(
    candidates: &[TileCandidate],
    grid: GridEstimate,
    grid_width: f64,
    grid_height: f64,
    min_grid_size: usize,
) -> Result<QuadCorners, BailReason> {
    if candidates.len() != grid.tile_count() {
        return Err(BailReason::InsufficientCandidates {
            found: candidates.len(),
            expected: grid.tile_count(),
        });
    }
    if grid.size < min_grid_size {
        return Err(BailReason::GridTooSmall {
            size: grid.size,
            minimum: min_grid_size,
        });
    }

    let midpoints: Vec<Point2<f64>> = candidates.iter().map(|c| c.midpoint).collect();
    let pick = |target: Point2<f64>| {
        closest_to(&midpoints, target).ok_or(BailReason::InsufficientCandidates {
            found: 0,
            expected: grid.tile_count(),
        })
    };

    Ok(QuadCorners {
        top_left: pick(Point2::new(0.0, 0.0))?,
        top_right: pick(Point2::new(grid_width, 0.0))?,
        bottom_right: pick(Point2::new(grid_width, grid_height))?,
        bottom_left: pick(Point2::new(0.0, grid_height))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridscan_core::Rect;

    fn lattice(size: usize, step: f64, offset: f64) -> Vec<TileCandidate> {
        let mut out = Vec::new();
        for row in 0..size {
            for col in 0..size {
                let cx = offset + col as f64 * step;
                let cy = offset + row as f64 * step;
                out.push(TileCandidate::from_rect(Rect::new(
                    cx - 10.0,
                    cy - 10.0,
                    20.0,
                    20.0,
                )));
            }
        }
        out
    }

    #[test]
    fn ties_keep_the_first_point() {
        let pts = [Point2::new(1.0, 0.0), Point2::new(0.0, 1.0)];
        assert_eq!(closest_to(&pts, Point2::origin()), Some(pts[0]));
        assert_eq!(closest_to(&[], Point2::origin()), None);
    }

    #[test]
    fn corners_of_a_regular_lattice() {
        let cands = lattice(3, 100.0, 50.0);
        let quad =
            locate_corners(&cands, GridEstimate { size: 3 }, 300.0, 300.0, 3).expect("corners");
        assert_eq!(quad.top_left, Point2::new(50.0, 50.0));
        assert_eq!(quad.top_right, Point2::new(250.0, 50.0));
        assert_eq!(quad.bottom_right, Point2::new(250.0, 250.0));
        assert_eq!(quad.bottom_left, Point2::new(50.0, 250.0));
    }

    #[test]
    fn wrong_count_bails() {
        let mut cands = lattice(3, 100.0, 50.0);
        cands.pop();
        let err = locate_corners(&cands, GridEstimate { size: 3 }, 300.0, 300.0, 3).unwrap_err();
        assert_eq!(
            err,
            BailReason::InsufficientCandidates {
                found: 8,
                expected: 9
            }
        );
    }

    #[test]
    fn tiny_grid_bails() {
        let cands = lattice(2, 100.0, 50.0);
        let err = locate_corners(&cands, GridEstimate { size: 2 }, 200.0, 200.0, 3).unwrap_err();
        assert_eq!(err, BailReason::GridTooSmall { size: 2, minimum: 3 });
    }
}
