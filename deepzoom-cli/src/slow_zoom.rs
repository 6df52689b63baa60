//! Slow-zoom sequences.
//!
//! Renders frame after frame, shrinking the width by a fixed factor each
//! time and carrying the adapted iteration limit forward. The state file is
//! rewritten after every frame so an interrupted run can pick up where it
//! stopped.

use crate::capture::FrameSink;
use crate::CliError;
use deepzoom_compute::{FrameStats, RenderError, RenderRequest, RenderSession};
use deepzoom_core::{BigDecimal, Navigator, ZoomState};
use std::path::PathBuf;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug)]
pub struct SlowZoom {
    navigator: Navigator,
    /// Width multiplier per frame
    zoom_factor: f64,
    frame_index: u64,
    state_path: Option<PathBuf>,
    adapt_limit: bool,
}

impl SlowZoom {
    pub fn new(navigator: Navigator, zoom_factor: f64) -> Result<Self, CliError> {
        if !(zoom_factor.is_finite() && zoom_factor > 0.0) {
            return Err(CliError::ZoomFactor(zoom_factor));
        }
        Ok(Self {
            navigator,
            zoom_factor,
            frame_index: 0,
            state_path: None,
            adapt_limit: true,
        })
    }

    /// Persist progress to `path` after every frame.
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = Some(path.into());
        self
    }

    pub fn with_limit_adaptation(mut self, adapt_limit: bool) -> Self {
        self.adapt_limit = adapt_limit;
        self
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    /// Continue from the state file if there is a usable one.
    pub fn resume(&mut self) -> bool {
        let Some(state) = self.state_path.as_deref().and_then(ZoomState::load) else {
            return false;
        };
        log::info!(
            "Resuming at frame {} (width {})",
            state.frame_index,
            state.viewport.width
        );
        self.navigator.set_viewport(state.viewport);
        self.zoom_factor = state.zoom_factor;
        self.frame_index = state.frame_index;
        true
    }

    fn save_state(&self) -> Result<(), CliError> {
        if let Some(path) = &self.state_path {
            let state = ZoomState::new(
                self.navigator.viewport().clone(),
                self.zoom_factor,
                self.frame_index,
            );
            state.save(path)?;
        }
        Ok(())
    }

    /// Render the current frame, write it and advance the view.
    ///
    /// A frame whose sample buffer cannot be allocated is skipped with a
    /// warning and yields `None`; the sequence carries on with the next one.
    pub fn step(
        &mut self,
        session: &mut RenderSession,
        sink: &FrameSink,
    ) -> Result<Option<FrameStats>, CliError> {
        session.submit(RenderRequest::from(&self.navigator))?;
        let result = loop {
            if let Some(result) = session.poll() {
                break result;
            }
            if let Some(progress) = session.progress() {
                log::trace!("Frame {}: {:.0}%", self.frame_index, progress * 100.0);
            }
            std::thread::sleep(POLL_INTERVAL);
        };

        let stats = match result {
            Ok(result) => {
                sink.write(self.frame_index, &result)?;
                Some(result.stats)
            }
            Err(RenderError::Allocation { samples }) => {
                log::warn!(
                    "Frame {}: cannot allocate {} samples, no image",
                    self.frame_index,
                    samples
                );
                None
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(stats) = &stats {
            if self.adapt_limit && stats.next_iteration_limit != stats.iteration_limit {
                log::info!(
                    "Iteration limit {} -> {}",
                    stats.iteration_limit,
                    stats.next_iteration_limit
                );
                self.navigator.set_iteration_limit(stats.next_iteration_limit);
            }
        }
        let digits = self.navigator.viewport().precision_digits();
        let factor = BigDecimal::from_string(&self.zoom_factor.to_string(), digits)?;
        self.navigator.zoom_by(&factor);
        self.frame_index += 1;
        self.save_state()?;
        Ok(stats)
    }

    /// Render `frames` frames in sequence. Skipped frames have no stats.
    pub fn run(
        &mut self,
        frames: u64,
        session: &mut RenderSession,
        sink: &FrameSink,
    ) -> Result<Vec<FrameStats>, CliError> {
        let mut stats = Vec::new();
        for _ in 0..frames {
            stats.extend(self.step(session, sink)?);
        }
        Ok(stats)
    }
}
