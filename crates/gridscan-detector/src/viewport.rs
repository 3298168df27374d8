//! Geometry linking the raw video frame, the square working canvas, the
//! grid region inside it and the display canvas.

use gridscan_core::{map_range, Point2, QuadCorners, Rect};
use serde::{Deserialize, Serialize};

use crate::params::ViewportParams;

/// Integer pixel rectangle inside a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelRegion {
    pub fn fits_within(&self, width: usize, height: usize) -> bool {
        self.width > 0
            && self.height > 0
            && self.x.checked_add(self.width).is_some_and(|r| r <= width)
            && self.y.checked_add(self.height).is_some_and(|b| b <= height)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub video_width: usize,
    pub video_height: usize,
    /// Centred square crop of the video frame.
    pub crop: PixelRegion,
    pub source_size: usize,
    /// Grid region on the working canvas.
    pub source_grid: Rect,
    pub display_size: usize,
    /// Grid region on the display canvas.
    pub display_grid: Rect,
}

impl Viewport {
    /// `None` when the video has no pixels or the parameters collapse the grid.
    pub fn new(video_width: usize, video_height: usize, params: &ViewportParams) -> Option<Self> {
        let edge = video_width.min(video_height);
        if edge == 0 || params.source_size == 0 || params.display_size == 0 {
            return None;
        }
        if !(params.grid_fraction > 0.0 && params.grid_fraction <= 1.0) {
            return None;
        }

        let crop = PixelRegion {
            x: (video_width - edge) / 2,
            y: (video_height - edge) / 2,
            width: edge,
            height: edge,
        };
        let source = params.source_size as f64;
        let source_grid = centred_square(source, source * params.grid_fraction);
        let display = params.display_size as f64;
        let display_grid = centred_square(display, display * params.grid_fraction);

        Some(Self {
            video_width,
            video_height,
            crop,
            source_size: params.source_size,
            source_grid,
            display_size: params.display_size,
            display_grid,
        })
    }

    /// Whether this viewport was built for the given video resolution.
    pub fn matches(&self, video_width: usize, video_height: usize) -> bool {
        self.video_width == video_width && self.video_height == video_height
    }

    /// Pixel size of the grid buffer handed to the pipeline.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        (
            (self.source_grid.width.round() as usize).max(1),
            (self.source_grid.height.round() as usize).max(1),
        )
    }

    /// The grid region expressed in raw video pixels.
    pub fn grid_region_in_video(&self) -> PixelRegion {
        let edge = self.crop.width as f64;
        let source = self.source_size as f64;
        let to_video = |v: f64| v * edge / source;
        let x = self.crop.x + to_video(self.source_grid.x).floor() as usize;
        let y = self.crop.y + to_video(self.source_grid.y).floor() as usize;
        let width = (to_video(self.source_grid.width).round() as usize)
            .clamp(1, self.video_width.saturating_sub(x).max(1));
        let height = (to_video(self.source_grid.height).round() as usize)
            .clamp(1, self.video_height.saturating_sub(y).max(1));
        PixelRegion {
            x,
            y,
            width,
            height,
        }
    }

    /// Map a point in grid-buffer coordinates onto the display canvas.
    pub fn grid_to_display(&self, p: Point2<f64>) -> Point2<f64> {
        let (gw, gh) = self.grid_dimensions();
        let d = &self.display_grid;
        Point2::new(
            map_range(p.x, 0.0, gw as f64, d.x, d.x + d.width),
            map_range(p.y, 0.0, gh as f64, d.y, d.y + d.height),
        )
    }

    pub fn quad_to_display(&self, quad: &QuadCorners) -> QuadCorners {
        QuadCorners::from_array(quad.to_array().map(|p| self.grid_to_display(p)))
    }
}

fn centred_square(canvas: f64, edge: f64) -> Rect {
    let start = canvas / 2.0 - edge / 2.0;
    Rect::new(start, start, edge, edge)
}
