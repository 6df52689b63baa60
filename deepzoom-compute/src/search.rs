//! Best reference point search.
//!
//! A reference that escapes early cuts the series short and makes every
//! deeper pixel rebase over and over, so before the sectors are rendered
//! the reference is moved towards the deepest point on screen. Each pass samples a
//! shrinking grid with the current approximation, buckets the samples by
//! iteration count and rebuilds the orbit at the most promising point.

use crate::perturbation::{ApproxArena, ApproxId, Approximation, Frame};
use deepzoom_core::Vec2;
use std::collections::BTreeMap;
use std::sync::Arc;

const MAX_PASSES: u32 = 100;
const GRID_SIDE: u32 = 10;
/// Search stops once the sampled range falls below this fraction of the tile.
const MIN_RANGE: f64 = 0.02;
const RANGE_DECAY: f64 = 0.5;

/// A shallower bucket wins outright with this many times the hits.
const DOMINANT_HITS: u64 = 5;
/// Or with this many times the hits while being nearly as deep.
const CROWDED_HITS: u64 = 3;
const CROWDED_DEPTH_RATIO: f64 = 0.67777;

/// Drift from the tile centre (in tile sizes) that triggers the peak scan.
const MAX_DRIFT: f64 = 0.3;
const PEAK_GRID_SIDE: u32 = 20;

/// Samples of one iteration count seen during a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CandidateEntry {
    pub iterations: u32,
    pub hits: u64,
    /// Hit closest to the grid centre
    pub nearest: Vec2,
    pub nearest_dist_sq: f64,
}

impl CandidateEntry {
    fn new(iterations: u32, position: Vec2, dist_sq: f64) -> Self {
        Self {
            iterations,
            hits: 1,
            nearest: position,
            nearest_dist_sq: dist_sq,
        }
    }

    fn record(&mut self, position: Vec2, dist_sq: f64) {
        self.hits += 1;
        if dist_sq < self.nearest_dist_sq {
            self.nearest = position;
            self.nearest_dist_sq = dist_sq;
        }
    }
}

/// Per-cell maximum iteration count over a tile.
///
/// Every sample the search evaluates is folded in, so a cell holds the
/// deepest point seen inside it. Equal counts keep the sample closer to
/// the tile centre.
#[derive(Clone, Debug)]
pub struct PeakGrid {
    center: Vec2,
    half_extent: Vec2,
    cells: Vec<Option<(u32, Vec2)>>,
}

impl PeakGrid {
    pub fn new(center: Vec2, half_extent: Vec2) -> Self {
        Self {
            center,
            half_extent,
            cells: vec![None; (PEAK_GRID_SIDE * PEAK_GRID_SIDE) as usize],
        }
    }

    fn cell_index(&self, position: Vec2) -> usize {
        let side = PEAK_GRID_SIDE as f64;
        let along = |p: f64, c: f64, h: f64| {
            (((p - (c - h)) / (2.0 * h) * side).floor()).clamp(0.0, side - 1.0) as usize
        };
        let i = along(position.x, self.center.x, self.half_extent.x);
        let j = along(position.y, self.center.y, self.half_extent.y);
        j * PEAK_GRID_SIDE as usize + i
    }

    /// Centre of cell (i, j), with i along x and j along y.
    pub fn cell_center(&self, i: u32, j: u32) -> Vec2 {
        let side = PEAK_GRID_SIDE as f64;
        let origin = self.center - self.half_extent;
        let size = self.half_extent * 2.0;
        Vec2::new(
            origin.x + (i as f64 + 0.5) / side * size.x,
            origin.y + (j as f64 + 0.5) / side * size.y,
        )
    }

    pub fn record(&mut self, position: Vec2, iterations: u32) {
        let index = self.cell_index(position);
        let closer =
            |other: Vec2| (position - self.center).norm_sq() < (other - self.center).norm_sq();
        let replace = match self.cells[index] {
            None => true,
            Some((best, at)) => iterations > best || (iterations == best && closer(at)),
        };
        if replace {
            self.cells[index] = Some((iterations, position));
        }
    }

    /// Deepest cell, ties going to the cell whose centre is nearest the
    /// tile centre. Returns the count and the sample position.
    pub fn peak(&self) -> Option<(u32, Vec2)> {
        let side = PEAK_GRID_SIDE as usize;
        let mut peak: Option<(u32, f64, Vec2)> = None;
        for (index, cell) in self.cells.iter().enumerate() {
            let Some((iterations, position)) = *cell else {
                continue;
            };
            let cell_center = self.cell_center((index % side) as u32, (index / side) as u32);
            let dist_sq = (cell_center - self.center).norm_sq();
            let better = match peak {
                None => true,
                Some((best, best_dist_sq, _)) => {
                    iterations > best || (iterations == best && dist_sq < best_dist_sq)
                }
            };
            if better {
                peak = Some((iterations, dist_sq, position));
            }
        }
        peak.map(|(iterations, _, position)| (iterations, position))
    }
}

/// Buckets keyed by negative iteration count, deepest first.
pub type Candidates = BTreeMap<i64, CandidateEntry>;

/// What the search did, for frame statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchOutcome {
    pub best: ApproxId,
    pub passes: u32,
    pub rebuilds: u32,
}

/// Build the approximation for a tile with its reference at the tile
/// centre, then try moving the reference onto a nearby nucleus.
///
/// The relocated approximation is kept only when its reference is at
/// least as deep, and links back to the seed through `original`.
pub fn seed_reference(
    arena: &mut ApproxArena,
    frame: Arc<Frame>,
    center: Vec2,
    radius: f64,
) -> ApproxId {
    let seed = arena.push(Approximation::fill_in_cubic(frame, center, radius));
    let Some(mut relocated) = arena[seed].relocate_to_nucleus() else {
        return seed;
    };
    if relocated.depth() < arena[seed].depth() {
        log::debug!(
            "Discarding nucleus reference: depth {} < {}",
            relocated.depth(),
            arena[seed].depth()
        );
        return seed;
    }
    relocated.original = Some(seed);
    arena.push(relocated)
}

/// Iteration count used for ranking: points that never escape rank deepest.
#[inline]
fn rank(iterations: u32, cap: u32) -> u32 {
    if iterations == 0 {
        cap
    } else {
        iterations
    }
}

fn clamp_to_tile(point: Vec2, center: Vec2, half_extent: Vec2) -> Vec2 {
    Vec2::new(
        point.x.clamp(center.x - half_extent.x, center.x + half_extent.x),
        point.y.clamp(center.y - half_extent.y, center.y + half_extent.y),
    )
}

/// Sample a `GRID_SIDE`² grid spanning `range` tile sizes around `guess`.
/// Every sample is also folded into `peaks`.
pub fn sample_candidates(
    approx: &Approximation,
    guess: Vec2,
    range: f64,
    half_extent: Vec2,
    peaks: &mut PeakGrid,
) -> Candidates {
    let cap = approx.frame.cap;
    let side = GRID_SIDE as f64;
    let span = half_extent * (2.0 * range);
    let mut candidates = Candidates::new();

    for j in 0..GRID_SIDE {
        for i in 0..GRID_SIDE {
            let grid_offset = Vec2::new(
                ((i as f64 + 0.5) / side - 0.5) * span.x,
                ((j as f64 + 0.5) / side - 0.5) * span.y,
            );
            let position = clamp_to_tile(guess + grid_offset, approx.center, half_extent);
            let iterations = rank(approx.calculate_iterations(position - approx.center), cap);
            let dist_sq = (position - guess).norm_sq();
            peaks.record(position, iterations);

            candidates
                .entry(-i64::from(iterations))
                .and_modify(|entry| entry.record(position, dist_sq))
                .or_insert_with(|| CandidateEntry::new(iterations, position, dist_sq));
        }
    }
    candidates
}

/// Walk from the deepest bucket towards shallower ones, switching when a
/// shallower bucket is much more populated.
pub fn choose_bucket(candidates: &Candidates) -> Option<&CandidateEntry> {
    let mut entries = candidates.values();
    let mut chosen = entries.next()?;
    for entry in entries {
        let dominant = entry.hits > DOMINANT_HITS * chosen.hits;
        let crowded = entry.hits > CROWDED_HITS * chosen.hits
            && entry.iterations as f64 >= CROWDED_DEPTH_RATIO * chosen.iterations as f64;
        if dominant || crowded {
            chosen = entry;
        }
    }
    Some(chosen)
}

/// Rebuild `current`'s orbit at `point` and keep it when it is not shallower.
fn rebuild_at(arena: &mut ApproxArena, current: ApproxId, point: Vec2) -> Option<ApproxId> {
    let mut rebuilt = arena[current].re_fill_in_cubic(point);
    if rebuilt.depth() < arena[current].depth() {
        return None;
    }
    rebuilt.original = Some(current);
    Some(arena.push(rebuilt))
}

/// Move the reference of `seed` towards the deepest reachable point of its
/// tile. Returns the seed unchanged when nothing deeper turns up.
pub fn find_best_reference(
    arena: &mut ApproxArena,
    seed: ApproxId,
    half_extent: Vec2,
) -> SearchOutcome {
    let tile_center = arena[seed].center;
    let mut outcome = SearchOutcome {
        best: seed,
        passes: 0,
        rebuilds: 0,
    };
    let mut guess = arena[seed].reference_offset;
    let mut range = 1.0;
    let mut peaks = PeakGrid::new(tile_center, half_extent);

    while outcome.passes < MAX_PASSES && range >= MIN_RANGE {
        if arena[outcome.best].reference.reached_cap() {
            break;
        }
        outcome.passes += 1;

        let candidates =
            sample_candidates(&arena[outcome.best], guess, range, half_extent, &mut peaks);
        let Some(chosen) = choose_bucket(&candidates).copied() else {
            break;
        };
        let current = &arena[outcome.best];
        if chosen.iterations >= current.depth() && chosen.nearest != current.reference_offset {
            if let Some(rebuilt) = rebuild_at(arena, outcome.best, chosen.nearest) {
                outcome.best = rebuilt;
                outcome.rebuilds += 1;
            }
        }
        guess = chosen.nearest;
        range *= RANGE_DECAY;
    }

    let drift = arena[outcome.best].reference_offset - tile_center;
    let normalised = Vec2::new(
        drift.x / (2.0 * half_extent.x),
        drift.y / (2.0 * half_extent.y),
    );
    if normalised.norm() > MAX_DRIFT {
        if let Some(peak) = peak_scan(arena, outcome.best, &mut peaks) {
            outcome.best = peak;
            outcome.rebuilds += 1;
        }
    }

    log::debug!(
        "Reference search: {} passes, {} rebuilds, depth {} -> {}",
        outcome.passes,
        outcome.rebuilds,
        arena[seed].depth(),
        arena[outcome.best].depth()
    );
    outcome
}

/// Add one sample per cell of the whole tile to `peaks` and rebuild at
/// the peak when it is at least as deep as the current reference.
fn peak_scan(
    arena: &mut ApproxArena,
    current: ApproxId,
    peaks: &mut PeakGrid,
) -> Option<ApproxId> {
    let approx = &arena[current];
    let cap = approx.frame.cap;
    for j in 0..PEAK_GRID_SIDE {
        for i in 0..PEAK_GRID_SIDE {
            let position = peaks.cell_center(i, j);
            let iterations = rank(approx.calculate_iterations(position - approx.center), cap);
            peaks.record(position, iterations);
        }
    }

    let (iterations, point) = peaks.peak()?;
    if iterations < approx.depth() || point == approx.reference_offset {
        return None;
    }
    log::debug!(
        "Peak scan: depth {} at ({:.6}, {:.6})",
        iterations,
        point.x,
        point.y
    );
    rebuild_at(arena, current, point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deepzoom_core::Viewport;

    fn frame(re: &str, im: &str, width: &str, limit: u32) -> Arc<Frame> {
        let viewport = Viewport::from_strings(re, im, width, limit).unwrap();
        Arc::new(Frame::new(&viewport, (640, 480)))
    }

    const HALF: Vec2 = Vec2::new(0.5, 0.375);

    fn entry(iterations: u32, hits: u64) -> CandidateEntry {
        CandidateEntry {
            iterations,
            hits,
            nearest: Vec2::new(iterations as f64, 0.0),
            nearest_dist_sq: 0.0,
        }
    }

    fn buckets(entries: &[(u32, u64)]) -> Candidates {
        entries
            .iter()
            .map(|&(iterations, hits)| (-i64::from(iterations), entry(iterations, hits)))
            .collect()
    }

    #[test]
    fn deepest_bucket_wins_by_default() {
        let candidates = buckets(&[(100, 4), (90, 10), (20, 19)]);
        assert_eq!(choose_bucket(&candidates).unwrap().iterations, 100);
    }

    #[test]
    fn much_larger_shallow_bucket_wins() {
        let candidates = buckets(&[(100, 2), (10, 11)]);
        assert_eq!(choose_bucket(&candidates).unwrap().iterations, 10);
    }

    #[test]
    fn crowded_bucket_needs_comparable_depth() {
        // 4x the hits at 70% depth switches, at 60% it does not
        let near = buckets(&[(100, 2), (70, 8)]);
        assert_eq!(choose_bucket(&near).unwrap().iterations, 70);
        let far = buckets(&[(100, 2), (60, 8)]);
        assert_eq!(choose_bucket(&far).unwrap().iterations, 100);
    }

    #[test]
    fn empty_candidates_choose_nothing() {
        assert!(choose_bucket(&Candidates::new()).is_none());
    }

    #[test]
    fn grid_counts_every_sample_once() {
        let frame = frame("-0.75", "0", "3.0", 256);
        let mut arena = ApproxArena::new();
        let seed = seed_reference(&mut arena, frame, Vec2::ZERO, HALF.norm());

        let mut peaks = PeakGrid::new(Vec2::ZERO, HALF);
        let candidates = sample_candidates(&arena[seed], Vec2::ZERO, 1.0, HALF, &mut peaks);
        let hits: u64 = candidates.values().map(|e| e.hits).sum();
        assert_eq!(hits, u64::from(GRID_SIDE * GRID_SIDE));
        for entry in candidates.values() {
            assert!(entry.nearest.x.abs() <= HALF.x && entry.nearest.y.abs() <= HALF.y);
        }

        // the deepest bucket is also the deepest cell
        let deepest = candidates.values().next().unwrap().iterations;
        assert_eq!(peaks.peak().unwrap().0, deepest);
    }

    #[test]
    fn peak_cells_keep_their_maximum() {
        let mut peaks = PeakGrid::new(Vec2::ZERO, HALF);
        // both samples fall in cell (0, 0)
        peaks.record(Vec2::new(-0.49, -0.37), 40);
        peaks.record(Vec2::new(-0.48, -0.36), 25);
        assert_eq!(peaks.peak(), Some((40, Vec2::new(-0.49, -0.37))));

        peaks.record(Vec2::new(-0.48, -0.36), 40);
        assert_eq!(peaks.peak(), Some((40, Vec2::new(-0.48, -0.36))));
    }

    #[test]
    fn peak_ties_go_to_the_cell_nearest_the_centre() {
        let mut peaks = PeakGrid::new(Vec2::ZERO, HALF);
        peaks.record(Vec2::new(-0.45, 0.3), 90);
        peaks.record(Vec2::new(0.1, -0.05), 90);
        peaks.record(Vec2::new(0.4, 0.0), 60);
        assert_eq!(peaks.peak(), Some((90, Vec2::new(0.1, -0.05))));

        peaks.record(Vec2::new(0.45, 0.35), 91);
        assert_eq!(peaks.peak(), Some((91, Vec2::new(0.45, 0.35))));
        assert_eq!(PeakGrid::new(Vec2::ZERO, HALF).peak(), None);
    }

    #[test]
    fn cell_centres_tile_the_screen() {
        let peaks = PeakGrid::new(Vec2::new(1.0, -1.0), HALF);
        let first = peaks.cell_center(0, 0);
        assert!((first - Vec2::new(0.525, -1.35625)).norm() < 1e-12);
        let last = peaks.cell_center(PEAK_GRID_SIDE - 1, PEAK_GRID_SIDE - 1);
        assert!((last - Vec2::new(1.475, -0.64375)).norm() < 1e-12);
    }

    #[test]
    fn reference_that_reaches_the_cap_is_kept() {
        // -0.75 is the cusp between cardioid and bulb and never escapes
        let frame = frame("-0.75", "0", "3.0", 512);
        let mut arena = ApproxArena::new();
        let seed = seed_reference(&mut arena, frame, Vec2::ZERO, HALF.norm());
        assert!(arena[seed].reference.reached_cap());

        let outcome = find_best_reference(&mut arena, seed, HALF);
        assert_eq!(outcome.best, seed);
        assert_eq!(outcome.passes, 0);
    }

    #[test]
    fn escaping_reference_moves_into_the_set() {
        let frame = frame("0.5", "0", "3.0", 500);
        let mut arena = ApproxArena::new();
        let seed = seed_reference(&mut arena, frame, Vec2::ZERO, HALF.norm());
        assert_eq!(arena[seed].depth(), 5);

        let outcome = find_best_reference(&mut arena, seed, HALF);
        let best = &arena[outcome.best];
        assert!(best.depth() > 5);
        assert!(outcome.rebuilds >= 1);
        assert_eq!(best.center, Vec2::ZERO);
        assert!(best.reference_offset.x.abs() <= HALF.x);
        assert!(best.reference_offset.y.abs() <= HALF.y);
        assert_eq!(arena.relocation_chain(outcome.best).last(), Some(&seed));
    }

    #[test]
    fn drifted_reference_is_pulled_back_to_the_nearest_peak() {
        // Only the left third of the screen is inside the set. The first
        // pass lands on the cardioid at x = -0.35, too far from the centre,
        // and the peak scan moves it to the deep cell nearest the centre.
        let frame = frame("1.2", "0", "3.0", 500);
        let mut arena = ApproxArena::new();
        let seed = arena.push(Approximation::fill_in_cubic(frame, Vec2::ZERO, HALF.norm()));
        assert_eq!(arena[seed].depth(), 2);

        let outcome = find_best_reference(&mut arena, seed, HALF);
        assert_eq!(outcome.passes, 1);
        assert_eq!(outcome.rebuilds, 2);

        let chain = arena.relocation_chain(outcome.best);
        assert_eq!(chain.len(), 3);
        let drifted = &arena[chain[1]];
        assert!((drifted.reference_offset - Vec2::new(-0.35, -0.0375)).norm() < 1e-12);

        let best = &arena[outcome.best];
        assert!(best.reference.reached_cap());
        assert!((best.reference_offset - Vec2::new(-0.325, -0.01875)).norm() < 1e-12);
        assert!(best.reference_offset.norm() < drifted.reference_offset.norm());
    }
}
