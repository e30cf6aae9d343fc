use crate::units::PageSpec;

/// Row cursor for deterministic shelf packing on a single sheet.
///
/// Pieces are laid out left to right; when a piece no longer fits in the
/// current row the cursor wraps below the tallest piece of that row. Greedy
/// approximation: packing largest-first reduces fragmentation but gives no
/// optimality guarantee.
#[derive(Clone, Copy, Debug)]
pub struct ShelfCursor {
    x: u32,
    y: u32,
    row_height: u32,
}

impl ShelfCursor {
    pub fn new(margin: u32) -> Self {
        ShelfCursor {
            x: margin,
            y: margin,
            row_height: 0,
        }
    }

    /// Returns the top-left position for a `width x height` piece and advances
    /// the cursor, or `None` if the piece does not fit on this sheet anymore.
    pub fn try_place(
        &mut self,
        width: u32,
        height: u32,
        page: PageSpec,
        margin: u32,
        spacing: u32,
    ) -> Option<(u32, u32)> {
        let (mut x, mut y) = (self.x, self.y);
        let mut row_height = self.row_height;
        if x + width > page.width_px - margin {
            // wrap to the next row
            x = margin;
            y += row_height + spacing;
            row_height = 0;
        }
        if x + width > page.width_px - margin || y + height > page.height_px - margin {
            return None;
        }
        self.x = x + width + spacing;
        self.y = y;
        self.row_height = row_height.max(height);
        Some((x, y))
    }
}
