//! Presentation loop driving the scanner with raw video frames.

use std::collections::VecDeque;

use gridscan_core::{ColorImageView, QuadCorners};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::error::FrameError;
use crate::pipeline::GridScanner;
use crate::result::FrameOutput;
use crate::viewport::Viewport;
use crate::vision::VisionPrimitives;

/// Rolling mean of the instantaneous frame rate.
#[derive(Clone, Debug)]
pub struct FrameRate {
    window: usize,
    samples: VecDeque<f64>,
    last_ms: Option<f64>,
}

impl FrameRate {
    pub fn new(window: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            samples: VecDeque::with_capacity(window),
            last_ms: None,
        }
    }

    /// Record a frame timestamp in milliseconds.
    pub fn tick(&mut self, timestamp_ms: f64) {
        if let Some(last) = self.last_ms {
            let dt = timestamp_ms - last;
            if dt > 0.0 {
                if self.samples.len() == self.window {
                    self.samples.pop_front();
                }
                self.samples.push_back(1000.0 / dt);
            }
        }
        self.last_ms = Some(timestamp_ms);
    }

    /// Frames per second; 0 until two frames were seen.
    pub fn fps(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub rectified: u64,
    pub bailed: u64,
    pub failed: u64,
    pub throttled: u64,
}

/// What happened to one submitted video frame.
#[derive(Debug)]
pub enum FrameEvent {
    /// Arrived too soon after the previous processed frame.
    Throttled,
    Processed(FrameOutput),
    /// The frame was dropped; the loop keeps running.
    Failed(FrameError),
}

/// Owns the only state that outlives a frame: the viewport, the most
/// recent column offsets and the frame rate.
pub struct FrameLoop<V> {
    scanner: GridScanner<V>,
    viewport: Option<Viewport>,
    last_columns: Option<Vec<f64>>,
    last_padded_quad: Option<QuadCorners>,
    last_frame_ms: Option<f64>,
    frame_rate: FrameRate,
    stats: FrameStats,
}

impl<V: VisionPrimitives> FrameLoop<V> {
    pub fn new(scanner: GridScanner<V>) -> Self {
        let frame_rate = FrameRate::new(scanner.params().frame_loop.fps_window);
        Self {
            scanner,
            viewport: None,
            last_columns: None,
            last_padded_quad: None,
            last_frame_ms: None,
            frame_rate,
            stats: FrameStats::default(),
        }
    }

    pub fn scanner(&self) -> &GridScanner<V> {
        &self.scanner
    }

    /// Feed one raw video frame captured at `timestamp_ms`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, video), fields(width = video.width, height = video.height))
    )]
    pub fn submit(&mut self, video: &ColorImageView<'_>, timestamp_ms: f64) -> FrameEvent {
        let min_interval = self.scanner.params().frame_loop.min_frame_interval_ms;
        if let Some(last) = self.last_frame_ms {
            if timestamp_ms - last < min_interval {
                self.stats.throttled += 1;
                return FrameEvent::Throttled;
            }
        }
        self.last_frame_ms = Some(timestamp_ms);
        self.frame_rate.tick(timestamp_ms);

        match self.process(video) {
            Ok(output) => {
                match &output {
                    FrameOutput::Rectified(frame) => {
                        self.stats.rectified += 1;
                        self.last_columns = Some(frame.columns.clone());
                        self.last_padded_quad = Some(frame.padded_quad);
                    }
                    FrameOutput::Bailed(_) => {
                        self.stats.bailed += 1;
                        self.last_padded_quad = None;
                    }
                }
                FrameEvent::Processed(output)
            }
            Err(err) => {
                log::warn!("dropping frame: {err}");
                self.stats.failed += 1;
                FrameEvent::Failed(err)
            }
        }
    }

    fn process(&mut self, video: &ColorImageView<'_>) -> Result<FrameOutput, FrameError> {
        let (region, (grid_w, grid_h)) = {
            let viewport = self.refresh_viewport(video.width, video.height)?;
            (viewport.grid_region_in_video(), viewport.grid_dimensions())
        };
        let grid_frame = self
            .scanner
            .vision()
            .crop_and_scale(video, region, grid_w, grid_h)?;
        self.scanner.process_frame(&grid_frame.view())
    }

    fn refresh_viewport(&mut self, width: usize, height: usize) -> Result<&Viewport, FrameError> {
        let stale = !self
            .viewport
            .as_ref()
            .is_some_and(|vp| vp.matches(width, height));
        if stale {
            let vp = Viewport::new(width, height, &self.scanner.params().viewport)
                .ok_or(FrameError::EmptyFrame { width, height })?;
            log::info!(
                "viewport {width}x{height}: crop {:?}, grid region {:?}",
                vp.crop,
                vp.grid_region_in_video()
            );
            self.viewport = Some(vp);
        }
        self.viewport
            .as_ref()
            .ok_or(FrameError::EmptyFrame { width, height })
    }

    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Column offsets of the most recent rectified frame, for the OCR consumer.
    pub fn last_columns(&self) -> Option<&[f64]> {
        self.last_columns.as_deref()
    }

    /// Padded quad of the latest frame on the display canvas; `None` after a bail.
    pub fn padded_quad_on_display(&self) -> Option<QuadCorners> {
        let vp = self.viewport.as_ref()?;
        self.last_padded_quad.map(|q| vp.quad_to_display(&q))
    }

    pub fn fps(&self) -> f64 {
        self.frame_rate.fps()
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}
