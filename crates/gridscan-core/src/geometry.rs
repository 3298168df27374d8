//! Small planar geometry helpers shared by the grid pipeline.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn midpoint(&self) -> Point2<f64> {
        Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// `width / height`; infinite for a zero-height box.
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// The four outer corners of a quadrilateral, named by their role.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuadCorners {
    pub top_left: Point2<f64>,
    pub top_right: Point2<f64>,
    pub bottom_right: Point2<f64>,
    pub bottom_left: Point2<f64>,
}

impl QuadCorners {
    /// Corners in TL, TR, BR, BL order (clockwise in image coordinates).
    pub fn to_array(&self) -> [Point2<f64>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_right,
            self.bottom_left,
        ]
    }

    pub fn from_array([top_left, top_right, bottom_right, bottom_left]: [Point2<f64>; 4]) -> Self {
        Self {
            top_left,
            top_right,
            bottom_right,
            bottom_left,
        }
    }

    pub fn top_width(&self) -> f64 {
        point_distance(self.top_left, self.top_right)
    }

    pub fn bottom_width(&self) -> f64 {
        point_distance(self.bottom_left, self.bottom_right)
    }

    pub fn left_height(&self) -> f64 {
        point_distance(self.top_left, self.bottom_left)
    }

    pub fn right_height(&self) -> f64 {
        point_distance(self.top_right, self.bottom_right)
    }
}

#[inline]
pub fn point_distance(a: Point2<f64>, b: Point2<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Angle in degrees between the edge vectors `a→b` and `b→c`.
///
/// This is the turning angle at `b`; for a rectangle it is 90° at every
/// corner. The cosine is clamped into `[-1, 1]` so that rounding on
/// collinear input cannot produce NaN. Zero-length edges still yield NaN.
pub fn three_point_angle_deg(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> f64 {
    let ab = b - a;
    let bc = c - b;
    let cos = ab.dot(&bc) / (point_distance(a, b) * point_distance(b, c));
    cos.clamp(-1.0, 1.0).acos().to_degrees()
}

/// Linearly remap `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
#[inline]
pub fn map_range(value: f64, in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> f64 {
    (value - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Median of `selector` over `items`.
///
/// Even-length input averages the two central values; empty input yields 0.
pub fn median_by<T>(items: &[T], selector: impl Fn(&T) -> f64) -> f64 {
    match items {
        [] => 0.0,
        [single] => selector(single),
        _ => {
            let mut values: Vec<f64> = items.iter().map(selector).collect();
            values.sort_by(f64::total_cmp);
            let mid = values.len() / 2;
            if values.len() % 2 != 0 {
                values[mid]
            } else {
                (values[mid - 1] + values[mid]) / 2.0
            }
        }
    }
}
