//! Geometric sanity checks on the outer quadrilateral.
//!
//! Angles are turning angles between consecutive edge vectors, so a
//! rectangle measures 90° at every corner and a quad tilted into a
//! trapezoid or parallelogram shows pairs of complementary angles.

use gridscan_core::{three_point_angle_deg, QuadCorners};
use serde::{Deserialize, Serialize};

use crate::params::QualityGateParams;

/// Sides shorter than this count as collapsed.
const MIN_SIDE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuadDefect {
    /// Two corners coincide, so angles are undefined.
    DegenerateSide,
    NotIsoscelesTrapezoid,
    Parallelogram,
    OppositeSideRatio,
    AspectRatio,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadAngles {
    pub top_left: f64,
    pub top_right: f64,
    pub bottom_right: f64,
    pub bottom_left: f64,
}

impl QuadAngles {
    pub fn of(quad: &QuadCorners) -> Self {
        let QuadCorners {
            top_left: tl,
            top_right: tr,
            bottom_right: br,
            bottom_left: bl,
        } = *quad;
        Self {
            top_left: three_point_angle_deg(bl, tl, tr),
            top_right: three_point_angle_deg(tl, tr, br),
            bottom_right: three_point_angle_deg(tr, br, bl),
            bottom_left: three_point_angle_deg(br, bl, tl),
        }
    }
}

/// Measurements taken on a quad together with every check it failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadInspection {
    pub angles: QuadAngles,
    pub top_bottom_ratio: f64,
    pub left_right_ratio: f64,
    /// Mean horizontal side over mean vertical side.
    pub aspect: f64,
    pub defects: Vec<QuadDefect>,
}

impl QuadInspection {
    #[inline]
    pub fn is_too_weird(&self) -> bool {
        !self.defects.is_empty()
    }
}

/// Run every check on `quad`; none short-circuits.
pub fn inspect_quad(quad: &QuadCorners, params: &QualityGateParams) -> QuadInspection {
    let angles = QuadAngles::of(quad);
    let (top, bottom) = (quad.top_width(), quad.bottom_width());
    let (left, right) = (quad.left_height(), quad.right_height());
    let mut defects = Vec::new();

    if [top, bottom, left, right]
        .iter()
        .any(|s| !s.is_finite() || *s < MIN_SIDE)
    {
        log::debug!("[quality] collapsed side: top={top:.1} bottom={bottom:.1} left={left:.1} right={right:.1}");
        defects.push(QuadDefect::DegenerateSide);
    }

    let tol = params.opposite_angle_tolerance_deg;
    let tl_vs_bl = params
        .compare_bottom_left_angle
        .then(|| (angles.top_left - angles.bottom_left).abs());
    let tr_vs_br = (angles.top_right - angles.bottom_right).abs();
    let tl_vs_tr = (angles.top_left - angles.top_right).abs();
    let bl_vs_br = (angles.bottom_left - angles.bottom_right).abs();
    if tl_vs_bl.is_some_and(|d| d > tol) && tr_vs_br > tol && tl_vs_tr > tol && bl_vs_br > tol {
        log::debug!("[quality] not an isosceles trapezoid: {angles:?}");
        defects.push(QuadDefect::NotIsoscelesTrapezoid);
    }

    let par_tol = params.parallelogram_tolerance_deg;
    if tl_vs_tr > par_tol && bl_vs_br > par_tol {
        log::debug!("[quality] parallelogram: |TL-TR|={tl_vs_tr:.1} |BL-BR|={bl_vs_br:.1}");
        defects.push(QuadDefect::Parallelogram);
    }

    let top_bottom_ratio = top / bottom;
    let left_right_ratio = left / right;
    let max_ratio = params.max_side_ratio;
    let out_of_ratio = |r: f64| r > max_ratio || r < 1.0 / max_ratio;
    if out_of_ratio(top_bottom_ratio) || out_of_ratio(left_right_ratio) {
        log::debug!(
            "[quality] opposite sides differ: top/bottom={top_bottom_ratio:.2} left/right={left_right_ratio:.2}"
        );
        defects.push(QuadDefect::OppositeSideRatio);
    }

    let aspect = ((top + bottom) / 2.0) / ((left + right) / 2.0);
    if aspect > params.max_aspect {
        log::debug!("[quality] too wide: aspect={aspect:.2}");
        defects.push(QuadDefect::AspectRatio);
    }

    QuadInspection {
        angles,
        top_bottom_ratio,
        left_right_ratio,
        aspect,
        defects,
    }
}

pub fn is_quad_too_weird(quad: &QuadCorners, params: &QualityGateParams) -> bool {
    inspect_quad(quad, params).is_too_weird()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use gridscan_core::Point2;

    fn quad(pts: [(f64, f64); 4]) -> QuadCorners {
        QuadCorners::from_array(pts.map(|(x, y)| Point2::new(x, y)))
    }

    #[test]
    fn square_passes() {
        let q = quad([(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let inspection = inspect_quad(&q, &QualityGateParams::default());
        assert_abs_diff_eq!(inspection.angles.top_left, 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(inspection.angles.bottom_right, 90.0, epsilon = 1e-9);
        assert!(inspection.defects.is_empty());
    }

    #[test]
    fn sheared_quad_is_a_parallelogram() {
        let q = quad([(20.0, 60.0), (260.0, 60.0), (360.0, 340.0), (120.0, 340.0)]);
        let inspection = inspect_quad(&q, &QualityGateParams::default());
        assert!(inspection.defects.contains(&QuadDefect::Parallelogram));
        assert!(is_quad_too_weird(&q, &QualityGateParams::default()));
    }

    #[test]
    fn mild_perspective_passes() {
        // symmetric trapezoid, narrower on top
        let q = quad([(40.0, 0.0), (160.0, 0.0), (200.0, 150.0), (0.0, 150.0)]);
        assert!(!is_quad_too_weird(&q, &QualityGateParams::default()));
    }

    #[test]
    fn wide_strip_fails_aspect() {
        let q = quad([(0.0, 0.0), (400.0, 0.0), (400.0, 100.0), (0.0, 100.0)]);
        let defects = inspect_quad(&q, &QualityGateParams::default()).defects;
        assert_eq!(defects, vec![QuadDefect::AspectRatio]);
    }

    #[test]
    fn lopsided_sides_fail_ratio() {
        let q = quad([(0.0, 0.0), (40.0, 0.0), (200.0, 200.0), (0.0, 200.0)]);
        let defects = inspect_quad(&q, &QualityGateParams::default()).defects;
        assert!(defects.contains(&QuadDefect::OppositeSideRatio));
    }

    #[test]
    fn collapsed_corner_is_degenerate() {
        let q = quad([(0.0, 0.0), (0.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let defects = inspect_quad(&q, &QualityGateParams::default()).defects;
        assert!(defects.contains(&QuadDefect::DegenerateSide));
    }

    #[test]
    fn collinear_quad_is_weird() {
        let q = quad([(0.0, 0.0), (100.0, 0.0), (200.0, 0.0), (300.0, 0.0)]);
        let inspection = inspect_quad(&q, &QualityGateParams::default());
        assert!(inspection.is_too_weird());
        assert!(inspection.angles.top_left.is_finite());
        assert!(is_quad_too_weird(&q, &QualityGateParams::default()));
    }

    #[test]
    fn opposite_angle_check_only_fires_when_enabled() {
        // angles ~80.5 / 73.3 / 99.1 / 107.1: every compared pair is more
        // than 5 degrees apart, TL/TR and BL/BR stay under 25
        let q = quad([(0.0, 0.0), (100.0, 0.0), (130.0, 100.0), (-20.0, 120.0)]);

        let default = inspect_quad(&q, &QualityGateParams::default());
        assert!(default.defects.is_empty());

        let enabled = QualityGateParams {
            compare_bottom_left_angle: true,
            ..QualityGateParams::default()
        };
        let inspection = inspect_quad(&q, &enabled);
        assert_abs_diff_eq!(inspection.angles.top_left, 80.538, epsilon = 1e-3);
        assert_abs_diff_eq!(inspection.angles.bottom_left, 107.057, epsilon = 1e-3);
        assert_eq!(inspection.defects, vec![QuadDefect::NotIsoscelesTrapezoid]);
    }
}
