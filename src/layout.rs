//! # Grid Layout
//!
//! Pixel geometry of a page: tickets of identical size laid out row-major in
//! a `cols × rows` grid, separated by gaps and surrounded by margins.
//!
//! ```text
//! page_width  = (cell_width  + gap_x) * cols - gap_x + margin_left + margin_right
//! page_height = (cell_height + gap_y) * rows - gap_y + margin_top  + margin_bottom
//!
//! cell i:  col = i % cols, row = i / cols
//!          left = margin_left + col * (cell_width  + gap_x)
//!          top  = margin_top  + row * (cell_height + gap_y)
//! ```
//!
//! Fractional results are truncated toward zero.

use crate::spec::{Gap, Layout, Margin};

/// Page geometry for one template size and layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub cell_width: u32,
    pub cell_height: u32,
    pub cols: usize,
    pub rows: usize,
    pub gap: Gap,
    pub margin: Margin,
}

impl GridGeometry {
    pub fn new(cell_width: u32, cell_height: u32, layout: &Layout) -> Self {
        Self {
            cell_width,
            cell_height,
            cols: layout.grid_size.0,
            rows: layout.grid_size.1,
            gap: layout.gap,
            margin: layout.margin,
        }
    }

    /// Tickets per page.
    pub fn grid_area(&self) -> usize {
        self.cols.saturating_mul(self.rows)
    }

    /// Page size in pixels. Meaningless when the grid is empty.
    pub fn page_size(&self) -> (u32, u32) {
        let width = (self.cell_width as f64 + self.gap.x) * self.cols as f64 - self.gap.x
            + self.margin.left
            + self.margin.right;
        let height = (self.cell_height as f64 + self.gap.y) * self.rows as f64 - self.gap.y
            + self.margin.top
            + self.margin.bottom;
        (width.max(0.0) as u32, height.max(0.0) as u32)
    }

    /// Grid position `(col, row)` of the `index`-th ticket on a page.
    pub fn cell_position(&self, index: usize) -> (usize, usize) {
        (index % self.cols, index / self.cols)
    }

    /// Top-left pixel of the `index`-th ticket on a page.
    ///
    /// # Panics
    ///
    /// Panics if the grid has no columns.
    pub fn cell_offset(&self, index: usize) -> (i64, i64) {
        let (col, row) = self.cell_position(index);
        let left = self.margin.left + col as f64 * (self.cell_width as f64 + self.gap.x);
        let top = self.margin.top + row as f64 * (self.cell_height as f64 + self.gap.y);
        (left as i64, top as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(cols: usize, rows: usize, gap: Gap, margin: Margin) -> GridGeometry {
        GridGeometry {
            cell_width: 100,
            cell_height: 50,
            cols,
            rows,
            gap,
            margin,
        }
    }

    #[test]
    fn test_page_size_with_gaps() {
        let g = geometry(3, 2, Gap { x: 10.0, y: 5.0 }, Margin::default());
        assert_eq!(g.grid_area(), 6);
        assert_eq!(g.page_size(), (320, 105));
    }

    #[test]
    fn test_cell_offsets_row_major() {
        let g = geometry(3, 2, Gap { x: 10.0, y: 5.0 }, Margin::default());
        assert_eq!(g.cell_position(4), (1, 1));
        assert_eq!(g.cell_offset(0), (0, 0));
        assert_eq!(g.cell_offset(2), (220, 0));
        assert_eq!(g.cell_offset(3), (0, 55));
        assert_eq!(g.cell_offset(4), (110, 55));
    }

    #[test]
    fn test_margins_shift_cells_and_grow_page() {
        let margin = Margin {
            top: 1.0,
            right: 2.0,
            bottom: 3.0,
            left: 4.0,
        };
        let g = geometry(2, 2, Gap::default(), margin);
        assert_eq!(g.page_size(), (206, 104));
        assert_eq!(g.cell_offset(0), (4, 1));
        assert_eq!(g.cell_offset(3), (104, 51));
    }

    #[test]
    fn test_fractional_values_truncate() {
        let g = geometry(2, 1, Gap { x: 0.5, y: 0.0 }, Margin::uniform(0.75));
        assert_eq!(g.page_size(), (202, 51));
        assert_eq!(g.cell_offset(1), (101, 0));
    }

    #[test]
    fn test_single_cell() {
        let g = geometry(1, 1, Gap { x: 30.0, y: 30.0 }, Margin::uniform(10.0));
        assert_eq!(g.page_size(), (120, 70));
        assert_eq!(g.cell_offset(0), (10, 10));
    }
}
