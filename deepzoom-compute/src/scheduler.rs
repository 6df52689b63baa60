//! Sector scheduler.
//!
//! The sample raster is cut into macro sectors. A fixed pool of scoped
//! worker threads claims sectors from a shared counter; each worker keeps
//! its own [`ApproxArena`] and walks the sector as a quadtree, deriving
//! every child's series from its parent down to small leaf tiles.

use crate::index_buffer::{IndexBuffer, IndexView};
use crate::iteration_limit::{near_limit_bucket, NEAR_LIMIT_BUCKETS};
use crate::perturbation::{ApproxArena, ApproxId, Approximation};
use crate::sample_grid::SampleGrid;
use crate::RenderError;
use deepzoom_core::{FractalConfig, PixelRect};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Lock-free progress counters shared by every worker of a frame.
#[derive(Debug, Default)]
pub struct FrameCounters {
    pub sectors_claimed: AtomicUsize,
    pub samples_done: AtomicU64,
    /// Samples that escaped below the limit
    pub escaped: AtomicU64,
    pub near_limit: [AtomicU64; NEAR_LIMIT_BUCKETS],
    pub live_workers: AtomicUsize,
}

impl FrameCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn near_limit_snapshot(&self) -> [u64; NEAR_LIMIT_BUCKETS] {
        std::array::from_fn(|i| self.near_limit[i].load(Ordering::Relaxed))
    }

    /// Fold one leaf's local tallies into the shared counters.
    fn add(&self, tally: &LeafTally) {
        self.samples_done.fetch_add(tally.samples, Ordering::Relaxed);
        if tally.escaped > 0 {
            self.escaped.fetch_add(tally.escaped, Ordering::Relaxed);
        }
        for (counter, &count) in self.near_limit.iter().zip(&tally.near_limit) {
            if count > 0 {
                counter.fetch_add(count, Ordering::Relaxed);
            }
        }
    }
}

#[derive(Default)]
struct LeafTally {
    samples: u64,
    escaped: u64,
    near_limit: [u64; NEAR_LIMIT_BUCKETS],
}

/// Work description shared read-only by the pool.
pub struct SectorPlan<'a> {
    pub root: &'a Approximation,
    pub grid: SampleGrid,
    pub sectors: Vec<PixelRect>,
    pub leaf_size: u32,
    pub limit: u32,
}

impl<'a> SectorPlan<'a> {
    pub fn new(config: &FractalConfig, root: &'a Approximation, grid: SampleGrid) -> Self {
        let (columns, rows) = config.sector_grid;
        Self {
            root,
            grid,
            sectors: grid.bounds().grid(columns, rows),
            leaf_size: config.leaf_tile_size.max(1),
            limit: root.frame.cap,
        }
    }
}

/// Render every sector of `plan` into `buffer` with `workers` threads.
///
/// Returns once all workers have joined.
pub fn run_sectors(
    plan: &SectorPlan<'_>,
    buffer: &IndexBuffer,
    counters: &FrameCounters,
    workers: usize,
) -> Result<(), RenderError> {
    let workers = workers.clamp(1, plan.sectors.len().max(1));
    log::debug!(
        "Rendering {} sectors with {} workers",
        plan.sectors.len(),
        workers
    );

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| scope.spawn(|| worker_loop(plan, buffer, counters)))
            .collect();

        let mut result = Ok(());
        for handle in handles {
            if handle.join().is_err() {
                log::error!("Render worker panicked");
                result = Err(RenderError::WorkerPanicked);
            }
        }
        result
    })
}

fn worker_loop(plan: &SectorPlan<'_>, buffer: &IndexBuffer, counters: &FrameCounters) {
    counters.live_workers.fetch_add(1, Ordering::Relaxed);
    let mut arena = ApproxArena::new();
    let root = arena.push(plan.root.clone());

    loop {
        let index = counters.sectors_claimed.fetch_add(1, Ordering::Relaxed);
        let Some(&sector) = plan.sectors.get(index) else {
            break;
        };
        let mark = arena.len();
        let id = push_child(&mut arena, root, &plan.grid, sector);
        sub_calculate(&mut arena, id, buffer.view(sector), plan, counters);
        arena.truncate(mark);
    }

    counters.live_workers.fetch_sub(1, Ordering::Relaxed);
}

fn push_child(arena: &mut ApproxArena, parent: ApproxId, grid: &SampleGrid, rect: PixelRect) -> ApproxId {
    let mut child = arena[parent].derive_child(grid.rect_center(&rect), grid.rect_radius(&rect));
    child.parent = Some(parent);
    arena.push(child)
}

/// Recursively split `view` into quadrants, deriving a child approximation
/// for each, and iterate the samples of leaf tiles.
fn sub_calculate(
    arena: &mut ApproxArena,
    id: ApproxId,
    view: IndexView<'_>,
    plan: &SectorPlan<'_>,
    counters: &FrameCounters,
) {
    let rect = view.rect();
    if rect.width <= plan.leaf_size && rect.height <= plan.leaf_size {
        calculate_leaf(&arena[id], view, plan, counters);
        return;
    }

    for quadrant in rect.quadrants() {
        let mark = arena.len();
        let child = push_child(arena, id, &plan.grid, quadrant);
        sub_calculate(arena, child, view.sub_view(quadrant), plan, counters);
        arena.truncate(mark);
    }
}

fn calculate_leaf(
    approx: &Approximation,
    view: IndexView<'_>,
    plan: &SectorPlan<'_>,
    counters: &FrameCounters,
) {
    let rect = view.rect();
    let mut tally = LeafTally {
        samples: u64::from(rect.area()),
        ..LeafTally::default()
    };

    for y in 0..rect.height {
        for x in 0..rect.width {
            let offset = plan.grid.sample_offset(rect.x + x, rect.y + y);
            let iterations = approx.calculate_iterations(offset - approx.center);
            view.set(x, y, iterations);

            if iterations > 0 {
                tally.escaped += 1;
                if let Some(bucket) = near_limit_bucket(iterations, plan.limit) {
                    tally.near_limit[bucket] += 1;
                }
            }
        }
    }
    counters.add(&tally);
}
