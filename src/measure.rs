//! Content-derived block heights. Only widths are stored, so every load and
//! every link change recomputes `h` from the title and the tile grid.

use unicode_width::UnicodeWidthStr;

use crate::config::LayoutConfig;

/// Box model of a category block: title bar on top, tile grid below.
pub struct BlockMetrics {
    pub char_width: i64,
    pub title_line_height: i64,
    pub padding: i64,
    pub title_gap: i64,
    /// Horizontal room taken by the edit and add buttons in the title bar.
    pub title_buttons: i64,
    pub tile_width: i64,
    pub tile_height: i64,
    pub tile_gap: i64,
    pub empty_grid_height: i64,
}

impl Default for BlockMetrics {
    fn default() -> Self {
        Self {
            char_width: 8,
            title_line_height: 24,
            padding: 8,
            title_gap: 6,
            title_buttons: 48,
            tile_width: 72,
            tile_height: 96,
            tile_gap: 8,
            empty_grid_height: 100,
        }
    }
}

impl BlockMetrics {
    pub fn from_config(config: &LayoutConfig) -> Self {
        Self {
            empty_grid_height: config.fallback_tile_height,
            ..Self::default()
        }
    }

    pub fn text_width(&self, text: &str) -> i64 {
        UnicodeWidthStr::width(text) as i64 * self.char_width
    }

    fn inner_width(&self, w: i64) -> i64 {
        (w - self.padding * 2).max(1)
    }

    pub fn title_lines(&self, name: &str, w: i64) -> i64 {
        let available = (self.inner_width(w) - self.title_buttons).max(self.char_width);
        let text = self.text_width(name);
        if text == 0 {
            1
        } else {
            (text + available - 1) / available
        }
    }

    pub fn grid_columns(&self, w: i64) -> i64 {
        ((self.inner_width(w) + self.tile_gap) / (self.tile_width + self.tile_gap)).max(1)
    }

    pub fn grid_height(&self, w: i64, tiles: usize) -> i64 {
        if tiles == 0 {
            return self.empty_grid_height;
        }
        let cols = self.grid_columns(w);
        let rows = (tiles as i64 + cols - 1) / cols;
        rows * self.tile_height + (rows - 1) * self.tile_gap
    }

    /// Full height of a block of width `w` titled `name` holding `tiles` links.
    pub fn block_height(&self, name: &str, w: i64, tiles: usize) -> i64 {
        self.padding * 2
            + self.title_lines(name, w) * self.title_line_height
            + self.title_gap
            + self.grid_height(w, tiles)
    }
}
