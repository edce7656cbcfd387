//! Per-axis collision clamp for a dragged block.

use crate::geometry::{Point, Rect, is_clear};

/// Advance `last_valid` toward `candidate` on each axis that stays clear.
///
/// `last_valid` carries the block size and the position accepted on the
/// previous frame. X is tested with Y pinned at its previous value and Y
/// with X pinned at its previous value, so a block blocked diagonally can
/// still slide along a wall. When both axes pass on their own but the
/// combined corner position collides, only the X move is kept.
pub fn constrain_move(last_valid: Rect, candidate: Point, others: &[Rect], gap: i64) -> Point {
    let prev = last_valid.origin();

    let x_ok = is_clear(&last_valid.at(Point::new(candidate.x, prev.y)), others, gap);
    let y_ok = is_clear(&last_valid.at(Point::new(prev.x, candidate.y)), others, gap);

    let next = Point::new(
        if x_ok { candidate.x } else { prev.x },
        if y_ok { candidate.y } else { prev.y },
    );

    if x_ok && y_ok && !is_clear(&last_valid.at(next), others, gap) {
        tracing::trace!(?candidate, "diagonal move blocked at corner, keeping X only");
        return Point::new(candidate.x, prev.y);
    }

    next
}
