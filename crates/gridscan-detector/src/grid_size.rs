use serde::{Deserialize, Serialize};

use crate::params::GridSizeParams;

/// Estimated number of tiles per side of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridEstimate {
    pub size: usize,
}

impl GridEstimate {
    #[inline]
    pub fn tile_count(&self) -> usize {
        self.size * self.size
    }
}

/// Guess the grid side length from the number of external contours.
///
/// An exact square count is taken at face value. Otherwise the count is
/// biased (UI text and buttons tend to dilate into a couple of extra blobs)
/// and the square root is skewed down before rounding, so ambiguous counts
/// settle on the smaller grid.
pub fn estimate_grid_size(contour_count: usize, params: &GridSizeParams) -> GridEstimate {
    let root = contour_count.isqrt();
    if root * root == contour_count {
        return GridEstimate { size: root };
    }

    let biased = (contour_count as f64 + f64::from(params.contour_bias)).max(0.0);
    let size = (biased.sqrt() - params.round_down_skew).round().max(0.0);
    GridEstimate {
        size: size as usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(count: usize) -> usize {
        estimate_grid_size(count, &GridSizeParams::default()).size
    }

    #[test]
    fn perfect_squares_are_exact() {
        assert_eq!(estimate(0), 0);
        assert_eq!(estimate(1), 1);
        assert_eq!(estimate(25), 5);
        assert_eq!(estimate(36), 6);
    }

    #[test]
    fn extra_blobs_round_down() {
        // sqrt(25) - 0.25 = 4.75 -> 5
        assert_eq!(estimate(27), 5);
        // sqrt(35) - 0.25 = 5.67 -> 6
        assert_eq!(estimate(37), 6);
        // sqrt(28) - 0.25 = 5.04 -> 5
        assert_eq!(estimate(30), 5);
        assert_eq!(estimate(2), 0);
        assert_eq!(estimate(3), 1);
    }

    #[test]
    fn large_bias_clamps_at_zero() {
        let params = GridSizeParams {
            contour_bias: -50,
            ..GridSizeParams::default()
        };
        assert_eq!(estimate_grid_size(7, &params).size, 0);
    }
}
