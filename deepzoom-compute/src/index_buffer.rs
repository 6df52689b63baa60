//! Shared buffer of raw iteration counts.
//!
//! Workers write disjoint sub-rectangles through [`IndexView`]s while the
//! rasterizer reads the whole buffer once every worker has been joined.

use crate::RenderError;
use deepzoom_core::PixelRect;
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug)]
pub struct IndexBuffer {
    width: u32,
    height: u32,
    data: Vec<AtomicU32>,
}

impl IndexBuffer {
    /// Allocate a buffer filled with `value`.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn new(width: u32, height: u32, value: u32) -> Result<Self, RenderError> {
        let samples = width as usize * height as usize;
        let mut data = Vec::new();
        data.try_reserve_exact(samples)
            .map_err(|_| RenderError::Allocation { samples })?;
        data.extend((0..samples).map(|_| AtomicU32::new(value)));
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.data[self.index(x, y)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, x: u32, y: u32, value: u32) {
        self.data[self.index(x, y)].store(value, Ordering::Relaxed);
    }

    /// View of a sub-rectangle, clipped to the buffer.
    pub fn view(&self, rect: PixelRect) -> IndexView<'_> {
        let x = rect.x.min(self.width);
        let y = rect.y.min(self.height);
        let rect = PixelRect::new(
            x,
            y,
            rect.width.min(self.width - x),
            rect.height.min(self.height - y),
        );
        IndexView {
            buffer: self,
            offset: self.index(rect.x, rect.y),
            stride: self.width as usize,
            rect,
        }
    }

    /// Snapshot of every count in row-major order.
    pub fn to_vec(&self) -> Vec<u32> {
        self.data.iter().map(|v| v.load(Ordering::Relaxed)).collect()
    }
}

/// A rectangular window into an [`IndexBuffer`] in local coordinates.
#[derive(Clone, Copy, Debug)]
pub struct IndexView<'a> {
    buffer: &'a IndexBuffer,
    offset: usize,
    stride: usize,
    rect: PixelRect,
}

impl<'a> IndexView<'a> {
    /// The viewed rectangle in buffer coordinates.
    pub fn rect(&self) -> PixelRect {
        self.rect
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.rect.width && y < self.rect.height);
        self.offset + y as usize * self.stride + x as usize
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.buffer.data[self.index(x, y)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, x: u32, y: u32, value: u32) {
        self.buffer.data[self.index(x, y)].store(value, Ordering::Relaxed);
    }

    /// Narrow to a rectangle given in buffer coordinates.
    pub fn sub_view(&self, rect: PixelRect) -> IndexView<'a> {
        let x = rect.x.clamp(self.rect.x, self.rect.x + self.rect.width);
        let y = rect.y.clamp(self.rect.y, self.rect.y + self.rect.height);
        let rect = PixelRect::new(
            x,
            y,
            rect.width.min(self.rect.x + self.rect.width - x),
            rect.height.min(self.rect.y + self.rect.height - y),
        );
        IndexView {
            buffer: self.buffer,
            offset: self.buffer.index(rect.x, rect.y),
            stride: self.stride,
            rect,
        }
    }
}
