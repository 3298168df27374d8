//! JSON configuration and report helpers for batch scans.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::QuadCorners;
use crate::detector::{BailReason, FrameOutput, GridScanParams};

#[derive(thiserror::Error, Debug)]
pub enum ScanIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Batch scan configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Images to scan.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Where rendered images go; nothing is written when unset.
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub report_path: Option<String>,
    /// Treat inputs as full video frames and crop the grid region through
    /// the viewport instead of scanning the whole image.
    #[serde(default)]
    pub video_frames: bool,
    #[serde(default)]
    pub params: GridScanParams,
}

impl ScanConfig {
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Resolve the report path, defaulting to `gridscan_report.json` in the
    /// output directory (or the working directory).
    pub fn report_path(&self) -> PathBuf {
        match (&self.report_path, &self.output_dir) {
            (Some(path), _) => PathBuf::from(path),
            (None, Some(dir)) => Path::new(dir).join("gridscan_report.json"),
            (None, None) => PathBuf::from("gridscan_report.json"),
        }
    }
}

/// Outcome of scanning one input.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameReport {
    pub input: String,
    pub width: usize,
    pub height: usize,
    pub rectified: bool,
    #[serde(default)]
    pub grid_size: Option<usize>,
    #[serde(default)]
    pub tile_width: Option<f64>,
    #[serde(default)]
    pub columns: Option<Vec<f64>>,
    #[serde(default)]
    pub corners: Option<QuadCorners>,
    #[serde(default)]
    pub padded_quad: Option<QuadCorners>,
    #[serde(default)]
    pub bail: Option<BailReason>,
    #[serde(default)]
    pub rendered_path: Option<String>,
    #[serde(default)]
    pub rectified_path: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl FrameReport {
    pub fn new(input: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            input: input.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Populate report fields from a processed frame.
    pub fn set_output(&mut self, output: &FrameOutput) {
        self.grid_size = Some(output.grid_size());
        match output {
            FrameOutput::Rectified(frame) => {
                self.rectified = true;
                self.tile_width = Some(frame.tile_width);
                self.columns = Some(frame.columns.clone());
                self.corners = Some(frame.corners);
                self.padded_quad = Some(frame.padded_quad);
            }
            FrameOutput::Bailed(frame) => {
                self.rectified = false;
                self.bail = Some(frame.reason.clone());
            }
        }
    }

    pub fn set_error(&mut self, err: impl std::fmt::Display) {
        self.error = Some(err.to_string());
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub rectified: usize,
    pub bailed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub params: GridScanParams,
    pub frames: Vec<FrameReport>,
    pub summary: ScanSummary,
}

impl ScanReport {
    pub fn new(params: GridScanParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn push(&mut self, frame: FrameReport) {
        if frame.error.is_some() {
            self.summary.failed += 1;
        } else if frame.rectified {
            self.summary.rectified += 1;
        } else {
            self.summary.bailed += 1;
        }
        self.frames.push(frame);
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ScanIoError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ScanIoError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
