//! Smart guides: edge alignment and equal-spacing snapping for a block
//! being dragged over a frozen set of other blocks.

use serde::Serialize;

use crate::config::LayoutConfig;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    Alignment,
    Spacing,
}

impl GuideKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alignment => "alignment",
            Self::Spacing => "spacing",
        }
    }
}

/// A line the host draws while a snap is active. Carries no state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Guide {
    pub orientation: Orientation,
    /// Y for horizontal guides, X for vertical ones.
    pub offset: i64,
    pub kind: GuideKind,
}

impl Guide {
    fn horizontal(offset: i64, kind: GuideKind) -> Self {
        Self { orientation: Orientation::Horizontal, offset, kind }
    }

    fn vertical(offset: i64, kind: GuideKind) -> Self {
        Self { orientation: Orientation::Vertical, offset, kind }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapResult {
    pub x: i64,
    pub y: i64,
    pub guides: Vec<Guide>,
}

/// Snap `candidate` against `others`.
///
/// Alignment runs first on both axes, then equal spacing runs on the
/// aligned position. The order of `others` matters: the last aligning
/// block wins.
pub fn snap(candidate: Rect, others: &[Rect], config: &LayoutConfig) -> SnapResult {
    let mut guides = Vec::new();

    let (x, y) = align(candidate.x, candidate.y, others, config.snap_tolerance, &mut guides);

    let x = match spacing_snap(
        x,
        candidate.w,
        others.iter().map(|o| (o.x, o.right())),
        config.spacing_tolerance,
    ) {
        Some(snapped) => {
            guides.push(Guide::vertical(snapped.before, GuideKind::Spacing));
            guides.push(Guide::vertical(snapped.after, GuideKind::Spacing));
            snapped.start
        }
        None => x,
    };

    let y = match spacing_snap(
        y,
        candidate.h,
        others.iter().map(|o| (o.y, o.bottom())),
        config.spacing_tolerance,
    ) {
        Some(snapped) => {
            guides.push(Guide::horizontal(snapped.before, GuideKind::Spacing));
            guides.push(Guide::horizontal(snapped.after, GuideKind::Spacing));
            snapped.start
        }
        None => y,
    };

    SnapResult { x, y, guides }
}

fn align(
    x: i64,
    y: i64,
    others: &[Rect],
    tolerance: i64,
    guides: &mut Vec<Guide>,
) -> (i64, i64) {
    let mut snap_x = None;
    let mut snap_y = None;
    for o in others {
        if (y - o.y).abs() < tolerance {
            snap_y = Some(o.y);
        }
        if (x - o.x).abs() < tolerance {
            snap_x = Some(o.x);
        }
    }

    if let Some(sy) = snap_y {
        guides.push(Guide::horizontal(sy, GuideKind::Alignment));
    }
    if let Some(sx) = snap_x {
        guides.push(Guide::vertical(sx, GuideKind::Alignment));
    }

    (snap_x.unwrap_or(x), snap_y.unwrap_or(y))
}

struct SpacingSnap {
    start: i64,
    /// Trailing edge of the nearest neighbour before the block.
    before: i64,
    /// Leading edge of the nearest neighbour after the block.
    after: i64,
}

/// One-axis equal-spacing test over `(start, end)` extents.
fn spacing_snap(
    start: i64,
    len: i64,
    extents: impl Iterator<Item = (i64, i64)>,
    tolerance: i64,
) -> Option<SpacingSnap> {
    let end = start + len;
    let mut before: Option<i64> = None;
    let mut after: Option<i64> = None;

    for (o_start, o_end) in extents {
        if o_end <= start {
            before = Some(before.map_or(o_end, |b| b.max(o_end)));
        }
        if o_start >= end {
            after = Some(after.map_or(o_start, |a| a.min(o_start)));
        }
    }

    let (before, after) = (before?, after?);
    let gap_before = start - before;
    let gap_after = after - end;
    if (gap_before - gap_after).abs() >= tolerance {
        return None;
    }

    Some(SpacingSnap {
        start: before + (after - before - len) / 2,
        before,
        after,
    })
}
