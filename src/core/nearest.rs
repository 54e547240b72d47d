use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use crate::core::CanvasPoint;
use crate::core::interval_index::find_boundary;

/// Index of the point whose `x` is closest to `query_x`.
///
/// `points` must be sorted ascending by `x`. The right neighbour is located
/// by binary search; when both neighbours are equally distant the left one
/// wins. Returns `None` for an empty slice.
#[must_use]
pub fn nearest_point_index(points: &[CanvasPoint], query_x: f64) -> Option<usize> {
    if points.is_empty() {
        return None;
    }

    let Some(right) = find_boundary(points, |point| f64::from(point.x) > query_x) else {
        return Some(points.len() - 1);
    };
    if right == 0 {
        return Some(0);
    }

    let left = right - 1;
    let mut candidates: SmallVec<[(OrderedFloat<f64>, usize); 2]> = SmallVec::new();
    candidates.push((distance(points[left], query_x), left));
    candidates.push((distance(points[right], query_x), right));

    // `min_by_key` keeps the first minimum, which is the left neighbour.
    candidates
        .into_iter()
        .min_by_key(|item| item.0)
        .map(|(_, idx)| idx)
}

#[must_use]
pub fn nearest_point(points: &[CanvasPoint], query_x: f64) -> Option<CanvasPoint> {
    nearest_point_index(points, query_x).map(|idx| points[idx])
}

fn distance(point: CanvasPoint, query_x: f64) -> OrderedFloat<f64> {
    OrderedFloat((f64::from(point.x) - query_x).abs())
}
