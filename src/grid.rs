//! Fits the week grid into a viewport without scrolling.

use serde::{Deserialize, Serialize};

const MIN_VIEWPORT: u32 = 320;
const HORIZONTAL_CHROME: u32 = 32;
const VERTICAL_CHROME: u32 = 160;
const MAX_COLS: u32 = 52;
const MIN_COLS: u32 = 8;
const MIN_CELL: u32 = 4;
const COMFORTABLE_CELL: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 800,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub cols: u32,
    pub rows: u32,
    pub cell_size: u32,
}

impl GridLayout {
    pub fn fit(total_weeks: usize, viewport: Viewport) -> Self {
        let weeks = if total_weeks == 0 { 52 } else { total_weeks as u32 };
        let vw = viewport.width.max(MIN_VIEWPORT);
        let vh = viewport.height.max(MIN_VIEWPORT);

        let cols = if vw < 640 {
            (vw / 18).max(10)
        } else if vw < 1024 {
            (vw / 22).max(20)
        } else {
            (vw / 24).min(MAX_COLS)
        };
        let mut cols = cols.min(weeks);

        let cell_for = |cols: u32| {
            let rows = weeks.div_ceil(cols);
            let by_width = (vw - HORIZONTAL_CHROME) / cols;
            let by_height = (vh - VERTICAL_CHROME) / rows;
            (rows, by_width.min(by_height).max(MIN_CELL))
        };

        let (mut rows, mut cell_size) = cell_for(cols);
        // Shrinking columns trades width for height; stop at MIN_COLS.
        while cell_size < COMFORTABLE_CELL && cols > MIN_COLS {
            cols = (cols * 9 / 10).max(MIN_COLS);
            (rows, cell_size) = cell_for(cols);
        }

        GridLayout {
            cols,
            rows,
            cell_size,
        }
    }

    /// Pixel position of bucket `index`, row-major.
    pub fn cell_origin(&self, index: usize) -> (u32, u32) {
        let i = index as u32;
        ((i % self.cols) * self.cell_size, (i / self.cols) * self.cell_size)
    }

    pub fn width(&self) -> u32 {
        self.cols * self.cell_size
    }

    pub fn height(&self) -> u32 {
        self.rows * self.cell_size
    }
}
