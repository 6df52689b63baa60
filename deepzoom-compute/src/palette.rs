//! Iteration count to colour mapping.
//!
//! Colours come from a gradient repeated in bands whose length grows with
//! the iteration count, darkened slowly towards a floor the deeper the
//! count. Results are cached per count (mod [`PALETTE_SIZE`]) in a table
//! that workers fill lazily; a slot holding [`UNFILLED`] has not been
//! computed yet. Count 0 means "did not escape" and is always black.

use std::sync::atomic::{AtomicU32, Ordering};

pub const PALETTE_SIZE: usize = 1 << 16;
const UNFILLED: u32 = u32::MAX;

/// A colour at a position along the gradient.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorStop {
    pub position: f64,
    pub color: [u8; 3],
}

const CLASSIC_STOPS: [ColorStop; 6] = [
    ColorStop {
        position: 0.0,
        color: [0, 7, 100],
    },
    ColorStop {
        position: 0.16,
        color: [32, 107, 203],
    },
    ColorStop {
        position: 0.42,
        color: [237, 255, 255],
    },
    ColorStop {
        position: 0.6425,
        color: [255, 170, 0],
    },
    ColorStop {
        position: 0.8575,
        color: [0, 2, 0],
    },
    ColorStop {
        position: 1.0,
        color: [0, 7, 100],
    },
];

/// Banded gradient palette with a lazily filled lookup table.
#[derive(Debug)]
pub struct Palette {
    stops: Vec<ColorStop>,
    /// Gradient repeats per unit of sqrt(iterations)
    band_rate: f64,
    /// Iteration count at which brightness has decayed by 1/e towards the floor
    decay_length: f64,
    decay_floor: f64,
    table: Box<[AtomicU32]>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(CLASSIC_STOPS.to_vec(), 0.25, 20_000.0, 0.45)
    }
}

impl Palette {
    /// Create a palette; stops are sorted by position. An empty stop list
    /// renders every escaped count white.
    pub fn new(mut stops: Vec<ColorStop>, band_rate: f64, decay_length: f64, decay_floor: f64) -> Self {
        stops.sort_by(|a, b| a.position.total_cmp(&b.position));
        let table = (0..PALETTE_SIZE).map(|_| AtomicU32::new(UNFILLED)).collect();
        Self {
            stops,
            band_rate,
            decay_length: decay_length.max(1.0),
            decay_floor: decay_floor.clamp(0.0, 1.0),
            table,
        }
    }

    /// Packed `0xRRGGBB` colour of an iteration count.
    #[inline]
    pub fn packed(&self, iterations: u32) -> u32 {
        let slot = iterations as usize % PALETTE_SIZE;
        let cached = self.table[slot].load(Ordering::Relaxed);
        if cached != UNFILLED {
            return cached;
        }
        let rgb = pack(self.shade(slot as u32));
        self.table[slot].store(rgb, Ordering::Relaxed);
        rgb
    }

    pub fn color(&self, iterations: u32) -> [u8; 3] {
        unpack(self.packed(iterations))
    }

    /// Number of table slots computed so far.
    pub fn filled(&self) -> usize {
        self.table
            .iter()
            .filter(|slot| slot.load(Ordering::Relaxed) != UNFILLED)
            .count()
    }

    fn shade(&self, index: u32) -> [u8; 3] {
        if index == 0 {
            return [0, 0, 0];
        }
        let t = ((index as f64).sqrt() * self.band_rate).fract();
        let base = self.gradient(t);
        let decay = (-(index as f64) / self.decay_length).exp();
        let brightness = self.decay_floor + (1.0 - self.decay_floor) * decay;
        base.map(|channel| (channel as f64 * brightness).round() as u8)
    }

    fn gradient(&self, t: f64) -> [u8; 3] {
        let Some(first) = self.stops.first() else {
            return [255, 255, 255];
        };
        if t <= first.position {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.position {
                let span = b.position - a.position;
                let f = if span > 0.0 { (t - a.position) / span } else { 1.0 };
                return std::array::from_fn(|i| {
                    let (ca, cb) = (a.color[i] as f64, b.color[i] as f64);
                    (ca + (cb - ca) * f).round() as u8
                });
            }
        }
        self.stops[self.stops.len() - 1].color
    }

    /// Per-channel rounded mean of the colours of `samples`.
    pub fn average(&self, samples: &[u32]) -> [u8; 3] {
        let mut sums = [0u64; 3];
        for &iterations in samples {
            let rgb = self.color(iterations);
            for (sum, channel) in sums.iter_mut().zip(rgb) {
                *sum += u64::from(channel);
            }
        }
        divide(sums, samples.len() as u64)
    }

    /// Per-channel rounded weighted mean of `(iterations, weight)` pairs.
    pub fn weighted_average(&self, samples: &[(u32, u32)]) -> [u8; 3] {
        let mut sums = [0u64; 3];
        let mut total = 0u64;
        for &(iterations, weight) in samples {
            let rgb = self.color(iterations);
            for (sum, channel) in sums.iter_mut().zip(rgb) {
                *sum += u64::from(channel) * u64::from(weight);
            }
            total += u64::from(weight);
        }
        divide(sums, total)
    }
}

fn divide(sums: [u64; 3], count: u64) -> [u8; 3] {
    if count == 0 {
        return [0, 0, 0];
    }
    sums.map(|sum| ((sum + count / 2) / count) as u8)
}

#[inline]
pub fn pack(rgb: [u8; 3]) -> u32 {
    (u32::from(rgb[0]) << 16) | (u32::from(rgb[1]) << 8) | u32::from(rgb[2])
}

#[inline]
pub fn unpack(rgb: u32) -> [u8; 3] {
    [(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8]
}
