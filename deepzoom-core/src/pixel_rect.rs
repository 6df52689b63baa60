use serde::{Deserialize, Serialize};

/// Rectangle in pixel space (always u32 coordinates)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create new pixel rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Calculate area in pixels
    pub fn area(&self) -> u32 {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Centre in continuous pixel coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Split into up to four quadrants.
    ///
    /// For odd dimensions, uses floor division for left/top children
    /// and the remainder goes to right/bottom children, ensuring
    /// perfect area conservation with no gaps or overlaps. Empty
    /// quadrants (from 1-pixel wide or tall rectangles) are skipped.
    pub fn quadrants(&self) -> Vec<PixelRect> {
        let left_w = self.width / 2;
        let right_w = self.width - left_w;
        let top_h = self.height / 2;
        let bottom_h = self.height - top_h;

        [
            PixelRect::new(self.x, self.y, left_w, top_h),
            PixelRect::new(self.x + left_w, self.y, right_w, top_h),
            PixelRect::new(self.x, self.y + top_h, left_w, bottom_h),
            PixelRect::new(self.x + left_w, self.y + top_h, right_w, bottom_h),
        ]
        .into_iter()
        .filter(|r| !r.is_empty())
        .collect()
    }

    /// Partition into a `columns` × `rows` grid in row-major order.
    /// The last column and row absorb any remainder.
    pub fn grid(&self, columns: u32, rows: u32) -> Vec<PixelRect> {
        let columns = columns.clamp(1, self.width.max(1));
        let rows = rows.clamp(1, self.height.max(1));
        let cell_w = self.width / columns;
        let cell_h = self.height / rows;

        let mut cells = Vec::with_capacity((columns * rows) as usize);
        for row in 0..rows {
            let y = self.y + row * cell_h;
            let h = if row == rows - 1 {
                self.height - row * cell_h
            } else {
                cell_h
            };
            for column in 0..columns {
                let x = self.x + column * cell_w;
                let w = if column == columns - 1 {
                    self.width - column * cell_w
                } else {
                    cell_w
                };
                cells.push(PixelRect::new(x, y, w, h));
            }
        }
        cells.retain(|r| !r.is_empty());
        cells
    }
}
