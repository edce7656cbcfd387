//! Axis-aligned block rectangles and the clearance test behind every
//! placement decision.

use serde::Serialize;

/// A position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Bounding box of one category block.
///
/// Coordinates are never negative and both extents are at least one unit;
/// [`Rect::new`] clamps anything else into range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Rect {
    pub x: i64,
    pub y: i64,
    pub w: i64,
    pub h: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            x: x.max(0),
            y: y.max(0),
            w: w.max(1),
            h: h.max(1),
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.h
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Same size, moved to `p`.
    pub fn at(self, p: Point) -> Self {
        Self::new(p.x, p.y, self.w, self.h)
    }

    pub fn with_width(self, w: i64) -> Self {
        Self::new(self.x, self.y, w, self.h)
    }

    /// At least `gap` units of daylight between the horizontal spans.
    pub fn clear_x(&self, other: &Rect, gap: i64) -> bool {
        self.right() + gap <= other.x || self.x >= other.right() + gap
    }

    /// At least `gap` units of daylight between the vertical spans.
    pub fn clear_y(&self, other: &Rect, gap: i64) -> bool {
        self.bottom() + gap <= other.y || self.y >= other.bottom() + gap
    }
}

/// True iff `a` and `b` have `gap` clearance along X or along Y.
///
/// Two blocks that are only diagonally apart by less than `gap` on each
/// axis count as colliding.
pub fn separated(a: &Rect, b: &Rect, gap: i64) -> bool {
    a.clear_x(b, gap) || a.clear_y(b, gap)
}

/// `rect` is separated from every rectangle in `others`.
pub fn is_clear(rect: &Rect, others: &[Rect], gap: i64) -> bool {
    others.iter().all(|o| separated(rect, o, gap))
}

/// Index pairs `(i, j)`, `i < j`, of rectangles that are not separated.
pub fn colliding_pairs(rects: &[Rect], gap: i64) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, a) in rects.iter().enumerate() {
        for (j, b) in rects.iter().enumerate().skip(i + 1) {
            if !separated(a, b, gap) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clamps_into_range() {
        let r = Rect::new(-5, -1, 0, -3);
        assert_eq!(r, Rect { x: 0, y: 0, w: 1, h: 1 });
    }

    #[test]
    fn test_side_by_side_with_exact_gap() {
        let a = Rect::new(0, 0, 260, 100);
        let b = Rect::new(280, 0, 260, 100);
        assert!(separated(&a, &b, 20));
        assert!(separated(&b, &a, 20));
    }

    #[test]
    fn test_gap_one_short_collides() {
        let a = Rect::new(0, 0, 260, 100);
        let b = Rect::new(279, 0, 260, 100);
        assert!(!separated(&a, &b, 20));
    }

    #[test]
    fn test_stacked_vertically() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(50, 120, 100, 100);
        assert!(separated(&a, &b, 20));
    }

    #[test]
    fn test_diagonal_near_miss_collides() {
        // Disjoint spans on both axes, but under the gap on each.
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(110, 110, 100, 100);
        assert!(!separated(&a, &b, 20));
        assert!(separated(&a, &b, 10));
    }

    #[test]
    fn test_colliding_pairs() {
        let rects = [
            Rect::new(0, 0, 100, 100),
            Rect::new(50, 50, 100, 100),
            Rect::new(500, 0, 100, 100),
        ];
        assert_eq!(colliding_pairs(&rects, 20), vec![(0, 1)]);
        assert!(is_clear(&rects[2], &rects[..2], 20));
    }
}
