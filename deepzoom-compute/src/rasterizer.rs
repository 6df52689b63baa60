//! Resolve the sample raster into output pixels.

use crate::index_buffer::IndexBuffer;
use crate::palette::{pack, Palette};
use deepzoom_core::{ChannelMasks, Quality};
use image::RgbImage;

/// (1, 2, 1) tent used by the smoothed 4x level, per axis.
const TENT: [u32; 3] = [1, 2, 1];

/// Colour every output pixel of a frame.
///
/// `buffer` must hold `quality`'s sample raster for a `screen` sized
/// output. Returns `None` when the pixel storage cannot be allocated.
pub fn rasterize(
    buffer: &IndexBuffer,
    screen: (u32, u32),
    quality: Quality,
    palette: &Palette,
    masks: &ChannelMasks,
) -> Option<RgbImage> {
    let (width, height) = screen;
    let bytes = width as usize * height as usize * 3;
    let mut raw: Vec<u8> = Vec::new();
    if raw.try_reserve_exact(bytes).is_err() {
        log::warn!("Could not allocate a {}x{} image, skipping frame", width, height);
        return None;
    }
    debug_assert_eq!(
        (buffer.width(), buffer.height()),
        quality.sample_size(screen)
    );

    let (fx, fy) = quality.factor();
    let mut samples: Vec<(u32, u32)> = Vec::with_capacity(36);
    for py in 0..height {
        for px in 0..width {
            samples.clear();
            match quality {
                Quality::X4Smooth => {
                    for (dy, wy) in TENT.iter().enumerate() {
                        for (dx, wx) in TENT.iter().enumerate() {
                            let nx = (px + dx as u32).saturating_sub(1).min(width - 1);
                            let ny = (py + dy as u32).saturating_sub(1).min(height - 1);
                            push_block(&mut samples, buffer, nx, ny, (fx, fy), wx * wy);
                        }
                    }
                }
                _ => push_block(&mut samples, buffer, px, py, (fx, fy), 1),
            }
            let averaged = palette.weighted_average(&samples);
            raw.extend_from_slice(&masks.apply(pack(averaged)));
        }
    }

    RgbImage::from_raw(width, height, raw)
}

fn push_block(
    samples: &mut Vec<(u32, u32)>,
    buffer: &IndexBuffer,
    px: u32,
    py: u32,
    (fx, fy): (u32, u32),
    weight: u32,
) {
    for sy in py * fy..(py + 1) * fy {
        for sx in px * fx..(px + 1) * fx {
            samples.push((buffer.get(sx, sy), weight));
        }
    }
}
