//! Adaptive iteration limit.
//!
//! Escaped samples are binned in [`NEAR_LIMIT_BUCKETS`] buckets of
//! [`BUCKET_WIDTH`] iterations directly below the limit, bucket 0 being
//! the one touching it. A well chosen limit leaves bucket 0 nearly empty.

pub const NEAR_LIMIT_BUCKETS: usize = 16;
pub const BUCKET_WIDTH: u32 = 256;

/// Share of escaped samples the top bucket may hold before the limit grows.
const TOP_SHARE_THRESHOLD: f64 = 1e-3;
/// Absolute cap on growth per frame.
const MAX_GROWTH: u32 = 5000;

/// Near-limit bucket of an escape count, if it falls in one.
pub fn near_limit_bucket(iterations: u32, limit: u32) -> Option<usize> {
    if iterations == 0 || iterations >= limit {
        return None;
    }
    let bucket = ((limit - 1 - iterations) / BUCKET_WIDTH) as usize;
    (bucket < NEAR_LIMIT_BUCKETS).then_some(bucket)
}

/// Iteration limit for the next frame given this frame's escape statistics.
///
/// Never returns less than `limit`.
pub fn next_iteration_limit(limit: u32, escaped: u64, near_limit: &[u64; NEAR_LIMIT_BUCKETS]) -> u32 {
    if escaped == 0 {
        return limit;
    }
    let top_share = near_limit[0] as f64 / escaped as f64;
    if top_share < TOP_SHARE_THRESHOLD {
        return limit;
    }
    let max_growth = MAX_GROWTH.min(limit / 2);

    // Ratio of each bucket to the one below it, towards the limit.
    let ratios: Vec<f64> = near_limit
        .windows(2)
        .filter(|pair| pair[0] > 0 && pair[1] > 0)
        .map(|pair| pair[0] as f64 / pair[1] as f64)
        .collect();
    if ratios.is_empty() {
        return limit.saturating_add(max_growth);
    }
    let decay = ratios.iter().sum::<f64>() / ratios.len() as f64;
    if decay >= 1.0 {
        return limit.saturating_add(max_growth);
    }

    let extra_buckets = ((TOP_SHARE_THRESHOLD / top_share).ln() / decay.ln()).ceil();
    let growth = (extra_buckets.max(0.0) * BUCKET_WIDTH as f64).min(max_growth as f64) as u32;
    log::debug!(
        "Top bucket share {:.2e}, decay {:.3}: limit {} -> {}",
        top_share,
        decay,
        limit,
        limit.saturating_add(growth)
    );
    limit.saturating_add(growth)
}
