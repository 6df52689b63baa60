//! Frame rendering: request in, image and statistics out.
//!
//! A frame runs in five stages: precision setup, reference search, the
//! sector pool, rasterization and statistics. [`render`] runs them on the
//! calling thread, [`RenderJob`] on a background thread, and
//! [`RenderSession`] keeps at most one job in flight.

use crate::index_buffer::IndexBuffer;
use crate::iteration_limit::{next_iteration_limit, NEAR_LIMIT_BUCKETS};
use crate::palette::Palette;
use crate::perturbation::{ApproxArena, Frame};
use crate::rasterizer::rasterize;
use crate::sample_grid::SampleGrid;
use crate::scheduler::{run_sectors, FrameCounters, SectorPlan};
use crate::search::{find_best_reference, seed_reference};
use crate::RenderError;
use deepzoom_core::{ChannelMasks, Navigator, Quality, Vec2, Viewport, MANDELBROT_CONFIG};
use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Immutable description of one frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub viewport: Viewport,
    pub screen: (u32, u32),
    pub quality: Quality,
    pub masks: ChannelMasks,
}

impl From<&Navigator> for RenderRequest {
    fn from(navigator: &Navigator) -> Self {
        Self {
            viewport: navigator.viewport().clone(),
            screen: navigator.screen(),
            quality: navigator.quality(),
            masks: navigator.masks(),
        }
    }
}

/// Per-frame numbers, written next to captured frames.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    pub screen: (u32, u32),
    pub quality: Quality,
    pub samples: u64,
    pub escaped: u64,
    pub near_limit: [u64; NEAR_LIMIT_BUCKETS],
    pub reference_depth: u32,
    pub series_iterations: u32,
    pub relocated_to_nucleus: bool,
    pub search_passes: u32,
    pub reference_rebuilds: u32,
    pub precision_digits: usize,
    pub extra_exponent: i32,
    pub iteration_limit: u32,
    /// Suggested limit for the next frame
    pub next_iteration_limit: u32,
    pub workers: usize,
    pub reference_ms: f64,
    pub sectors_ms: f64,
    pub raster_ms: f64,
    pub total_ms: f64,
}

impl FrameStats {
    /// Fraction of samples that escaped below the limit.
    pub fn escaped_fraction(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.escaped as f64 / self.samples as f64
        }
    }
}

#[derive(Debug)]
pub struct RenderResult {
    /// `None` when the output image could not be allocated
    pub image: Option<RgbImage>,
    /// Raw escape counts at sample resolution
    pub indices: IndexBuffer,
    pub stats: FrameStats,
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Render a frame on the calling thread with the default palette.
pub fn render(request: &RenderRequest) -> Result<RenderResult, RenderError> {
    render_with(request, &Palette::default(), &FrameCounters::new())
}

/// Render a frame, reporting progress through `counters`.
pub fn render_with(
    request: &RenderRequest,
    palette: &Palette,
    counters: &FrameCounters,
) -> Result<RenderResult, RenderError> {
    let (width, height) = request.screen;
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyScreen { width, height });
    }
    let config = &MANDELBROT_CONFIG;
    let started = Instant::now();

    let grid = SampleGrid::new(request.screen, request.quality);
    let (sample_width, sample_height) = grid.size();
    let buffer = IndexBuffer::new(sample_width, sample_height, 0)?;

    let frame = Arc::new(Frame::new(&request.viewport, grid.size()));
    let (digits, extra_exponent, cap) =
        (frame.context.digits, frame.context.extra_exponent, frame.cap);

    let half_extent = grid.half_extent();
    let mut arena = ApproxArena::new();
    let seed = seed_reference(&mut arena, frame, Vec2::ZERO, half_extent.norm());
    let relocated_to_nucleus = arena[seed].original.is_some();
    let outcome = find_best_reference(&mut arena, seed, half_extent);
    let root = &arena[outcome.best];
    let reference_done = Instant::now();

    let plan = SectorPlan::new(config, root, grid);
    let workers = config.worker_count(num_cpus::get());
    run_sectors(&plan, &buffer, counters, workers)?;
    let sectors_done = Instant::now();

    let image = rasterize(&buffer, request.screen, request.quality, palette, &request.masks);
    let raster_done = Instant::now();

    let escaped = counters.escaped.load(Ordering::Relaxed);
    let near_limit = counters.near_limit_snapshot();
    let stats = FrameStats {
        screen: request.screen,
        quality: request.quality,
        samples: counters.samples_done.load(Ordering::Relaxed),
        escaped,
        near_limit,
        reference_depth: root.depth(),
        series_iterations: root.series_iterations,
        relocated_to_nucleus,
        search_passes: outcome.passes,
        reference_rebuilds: outcome.rebuilds,
        precision_digits: digits,
        extra_exponent,
        iteration_limit: cap,
        next_iteration_limit: next_iteration_limit(cap, escaped, &near_limit),
        workers,
        reference_ms: millis(reference_done - started),
        sectors_ms: millis(sectors_done - reference_done),
        raster_ms: millis(raster_done - sectors_done),
        total_ms: millis(raster_done - started),
    };
    log::info!(
        "Rendered {}x{} ({}) in {:.1} ms: depth {}, series skips {}, {:.1}% escaped",
        width,
        height,
        request.quality.label(),
        stats.total_ms,
        stats.reference_depth,
        stats.series_iterations,
        stats.escaped_fraction() * 100.0
    );

    Ok(RenderResult {
        image,
        indices: buffer,
        stats,
    })
}

/// A frame rendering on a background thread.
#[derive(Debug)]
pub struct RenderJob {
    counters: Arc<FrameCounters>,
    total_samples: u64,
    handle: JoinHandle<Result<RenderResult, RenderError>>,
}

impl RenderJob {
    pub fn spawn(request: RenderRequest, palette: Arc<Palette>) -> Result<Self, RenderError> {
        let counters = Arc::new(FrameCounters::new());
        let (sample_width, sample_height) = request.quality.sample_size(request.screen);
        let total_samples = u64::from(sample_width) * u64::from(sample_height);

        let job_counters = counters.clone();
        let handle = std::thread::Builder::new()
            .name("deepzoom-render".to_string())
            .spawn(move || render_with(&request, &palette, &job_counters))?;

        Ok(Self {
            counters,
            total_samples,
            handle,
        })
    }

    /// Completed fraction of samples, in [0, 1].
    pub fn progress(&self) -> f64 {
        if self.total_samples == 0 {
            return 1.0;
        }
        let done = self.counters.samples_done.load(Ordering::Relaxed);
        (done as f64 / self.total_samples as f64).min(1.0)
    }

    pub fn counters(&self) -> &FrameCounters {
        &self.counters
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the frame is done.
    pub fn wait(self) -> Result<RenderResult, RenderError> {
        self.handle
            .join()
            .map_err(|_| RenderError::WorkerPanicked)?
    }
}

/// Keeps at most one frame in flight.
#[derive(Debug)]
pub struct RenderSession {
    palette: Arc<Palette>,
    job: Option<RenderJob>,
}

impl Default for RenderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSession {
    pub fn new() -> Self {
        Self::with_palette(Palette::default())
    }

    pub fn with_palette(palette: Palette) -> Self {
        Self {
            palette: Arc::new(palette),
            job: None,
        }
    }

    /// Replace the palette for subsequent frames.
    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = Arc::new(palette);
    }

    /// Start rendering `request`.
    ///
    /// Fails with [`RenderError::Busy`] while another frame is rendering.
    /// A finished frame that was never collected is dropped.
    pub fn submit(&mut self, request: RenderRequest) -> Result<(), RenderError> {
        if let Some(job) = &self.job {
            if !job.is_finished() {
                return Err(RenderError::Busy);
            }
            log::debug!("Dropping uncollected frame");
        }
        self.job = Some(RenderJob::spawn(request, self.palette.clone())?);
        Ok(())
    }

    pub fn is_busy(&self) -> bool {
        self.job.as_ref().is_some_and(|job| !job.is_finished())
    }

    pub fn progress(&self) -> Option<f64> {
        self.job.as_ref().map(RenderJob::progress)
    }

    /// Collect the frame if it has finished.
    pub fn poll(&mut self) -> Option<Result<RenderResult, RenderError>> {
        if self.job.as_ref()?.is_finished() {
            self.job.take().map(RenderJob::wait)
        } else {
            None
        }
    }

    /// Block until the current frame is done and collect it.
    pub fn wait(&mut self) -> Option<Result<RenderResult, RenderError>> {
        self.job.take().map(RenderJob::wait)
    }
}
