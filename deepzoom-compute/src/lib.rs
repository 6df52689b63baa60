pub mod driver;
pub mod error;
pub mod index_buffer;
pub mod iteration_limit;
pub mod palette;
pub mod perturbation;
pub mod rasterizer;
pub mod sample_grid;
pub mod scheduler;
pub mod search;

pub use driver::{render, render_with, FrameStats, RenderJob, RenderRequest, RenderResult, RenderSession};
pub use error::RenderError;
pub use index_buffer::{IndexBuffer, IndexView};
pub use iteration_limit::{near_limit_bucket, next_iteration_limit, BUCKET_WIDTH, NEAR_LIMIT_BUCKETS};
pub use palette::{ColorStop, Palette, PALETTE_SIZE};
pub use perturbation::{
    direct_iterations, direct_iterations_big, ApproxArena, ApproxId, Approximation, Frame,
    ReferenceOrbit,
};
pub use rasterizer::rasterize;
pub use sample_grid::SampleGrid;
pub use scheduler::{run_sectors, FrameCounters, SectorPlan};
pub use search::{find_best_reference, seed_reference, CandidateEntry, PeakGrid, SearchOutcome};

// Re-export core types for convenience
pub use deepzoom_core::*;
