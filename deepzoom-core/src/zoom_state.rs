//! Viewport state file for resumable zoom sequences.
//!
//! Six CRLF-terminated lines: centre real, centre imaginary, width, zoom
//! factor, iteration limit, frame index.

use crate::{ParseError, Viewport, ViewportError};
use std::fs;
use std::path::Path;

const LINE_COUNT: usize = 6;

#[derive(Clone, Debug, PartialEq)]
pub struct ZoomState {
    pub viewport: Viewport,
    /// Width multiplier applied per frame.
    pub zoom_factor: f64,
    /// Index of the next frame to render.
    pub frame_index: u64,
}

impl ZoomState {
    pub fn new(viewport: Viewport, zoom_factor: f64, frame_index: u64) -> Self {
        Self {
            viewport,
            zoom_factor,
            frame_index,
        }
    }

    pub fn to_text(&self) -> String {
        let lines = [
            self.viewport.center.x.to_plain_string(),
            self.viewport.center.y.to_plain_string(),
            self.viewport.width.to_plain_string(),
            self.zoom_factor.to_string(),
            self.viewport.iteration_limit.to_string(),
            self.frame_index.to_string(),
        ];
        let mut text = lines.join("\r\n");
        text.push_str("\r\n");
        text
    }

    pub fn parse(text: &str) -> Result<Self, ViewportError> {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if lines.len() < LINE_COUNT {
            return Err(ViewportError::Truncated {
                found: lines.len(),
                expected: LINE_COUNT,
            });
        }

        let zoom_factor = lines[3].parse::<f64>().map_err(|_| ParseError::Float {
            value: lines[3].to_string(),
        })?;
        let iteration_limit = lines[4].parse::<u32>().map_err(|_| ParseError::Integer {
            value: lines[4].to_string(),
        })?;
        let frame_index = lines[5].parse::<u64>().map_err(|_| ParseError::Integer {
            value: lines[5].to_string(),
        })?;
        let viewport = Viewport::from_strings(lines[0], lines[1], lines[2], iteration_limit)?;

        Ok(Self {
            viewport,
            zoom_factor,
            frame_index,
        })
    }

    /// Read the state file. Missing or malformed files yield `None`.
    pub fn load(path: &Path) -> Option<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::debug!("No zoom state at {}: {}", path.display(), e);
                return None;
            }
        };
        match Self::parse(&text) {
            Ok(state) => {
                log::info!(
                    "Resuming zoom from {} at frame {}",
                    path.display(),
                    state.frame_index
                );
                Some(state)
            }
            Err(e) => {
                log::warn!("Ignoring malformed zoom state {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ViewportError> {
        fs::write(path, self.to_text())?;
        Ok(())
    }
}
