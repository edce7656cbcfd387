//! Free-space placement for newly created blocks.

use crate::geometry::{Point, Rect, is_clear};

/// Find the first clear slot for a `w`×`h` block, scanning row-major.
///
/// Columns step by `w + gap` from zero while the block still fits inside
/// `max_w`; rows step by `h + gap` from zero. The column at `x = 0` is
/// always tried, so a block wider than `max_w` lands at the left edge.
/// Once a row lies below every existing block it is clear, hence the scan
/// always terminates.
pub fn find_free_position(w: i64, h: i64, others: &[Rect], max_w: i64, gap: i64) -> Point {
    let block = Rect::new(0, 0, w, h);
    let step_x = block.w + gap;
    let step_y = block.h + gap;

    let mut y = 0;
    loop {
        let mut x = 0;
        loop {
            let candidate = block.at(Point::new(x, y));
            if is_clear(&candidate, others, gap) {
                tracing::debug!(x, y, w = block.w, h = block.h, "placed block in free space");
                return Point::new(x, y);
            }
            x += step_x;
            if x + block.w > max_w {
                break;
            }
        }
        y += step_y;
    }
}
