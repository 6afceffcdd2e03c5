//! Closest-corners drop target matching.
//!
//! Simple point-in-rect hit testing is unstable for kanban: columns are often
//! taller than the viewport and a center-point test flips targets erratically
//! near column boundaries. Summing the distances between the four matched
//! corners of the dragged rect and each candidate gives a smooth handoff
//! between adjacent columns and empty-column drop zones.

use crate::dnd::registry::{DroppableRegion, RegionId};
use crate::geometry::Rect;

/// Tuning for the collision detector.
#[derive(Debug, Clone)]
pub struct CollisionConfig {
    /// Maximum summed corner distance for a candidate that does not overlap
    /// the dragged rect (default: 192.0, i.e. 48 logical px per corner on
    /// average, roughly one card height of slack). Overlapping candidates
    /// always qualify.
    pub max_total_distance: f64,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            max_total_distance: 192.0,
        }
    }
}

/// Sum of distances between corresponding corners of two rectangles.
/// Zero when the rectangles coincide.
pub fn corner_distance(a: Rect, b: Rect) -> f64 {
    a.corners()
        .iter()
        .zip(b.corners().iter())
        .map(|(p, q)| p.distance_to(*q))
        .sum()
}

/// Picks the best-match droppable for the dragged rectangle, or `None` when
/// nothing overlaps or sits within matching distance.
///
/// The winner is the qualifying region with the smallest summed corner
/// distance. Equal distances tie-break on the lexicographically smaller
/// region id, so the result never depends on registration order.
pub fn closest_corners(
    dragged: Rect,
    regions: &[DroppableRegion],
    config: &CollisionConfig,
) -> Option<RegionId> {
    let mut best: Option<(f64, &RegionId)> = None;

    for region in regions {
        let total = corner_distance(dragged, region.rect);
        if !dragged.intersects(&region.rect) && total > config.max_total_distance {
            continue;
        }

        best = match best {
            None => Some((total, &region.id)),
            Some((best_total, best_id)) => {
                if total < best_total || (total == best_total && region.id < *best_id) {
                    Some((total, &region.id))
                } else {
                    Some((best_total, best_id))
                }
            }
        };
    }

    best.map(|(_, id)| id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ordering::DropTarget;

    fn region(id: &str, rect: Rect) -> DroppableRegion {
        DroppableRegion::new(id, "col", DropTarget::ColumnArea, rect)
    }

    #[test]
    fn test_corner_distance_zero_for_identical_rects() {
        let rect = Rect::new(10.0, 10.0, 50.0, 80.0);
        assert_eq!(corner_distance(rect, rect), 0.0);
    }

    #[test]
    fn test_corner_distance_pure_offset() {
        // Same size, offset by (3, 4): every corner pair is 5 apart.
        let a = Rect::new(0.0, 0.0, 50.0, 80.0);
        let b = a.translated(3.0, 4.0);
        assert_eq!(corner_distance(a, b), 20.0);
    }

    #[test]
    fn test_nearest_region_wins() {
        let regions = vec![
            region("far", Rect::new(500.0, 0.0, 100.0, 400.0)),
            region("near", Rect::new(10.0, 0.0, 100.0, 400.0)),
        ];
        let dragged = Rect::new(20.0, 50.0, 90.0, 40.0);
        let config = CollisionConfig::default();

        assert_eq!(
            closest_corners(dragged, &regions, &config),
            Some(RegionId::from("near"))
        );
    }

    #[test]
    fn test_no_match_when_everything_is_far() {
        let regions = vec![region("a", Rect::new(5000.0, 5000.0, 100.0, 400.0))];
        let dragged = Rect::new(0.0, 0.0, 90.0, 40.0);
        let config = CollisionConfig::default();

        assert_eq!(closest_corners(dragged, &regions, &config), None);
        assert_eq!(closest_corners(dragged, &[], &config), None);
    }

    #[test]
    fn test_overlap_qualifies_regardless_of_distance() {
        // A huge region overlapping the dragged rect has a large corner sum
        // but must still qualify.
        let regions = vec![region("big", Rect::new(0.0, 0.0, 2000.0, 2000.0))];
        let dragged = Rect::new(10.0, 10.0, 90.0, 40.0);
        let config = CollisionConfig::default();

        assert_eq!(
            closest_corners(dragged, &regions, &config),
            Some(RegionId::from("big"))
        );
    }

    #[test]
    fn test_tie_breaks_lexicographically() {
        // Two regions mirrored around the dragged rect: identical corner sums.
        let dragged = Rect::new(100.0, 0.0, 50.0, 50.0);
        let left = region("zeta", Rect::new(40.0, 0.0, 50.0, 50.0));
        let right = region("alpha", Rect::new(160.0, 0.0, 50.0, 50.0));
        let config = CollisionConfig {
            max_total_distance: 1000.0,
        };

        let forward = vec![left.clone(), right.clone()];
        let reversed = vec![right, left];

        assert_eq!(
            closest_corners(dragged, &forward, &config),
            Some(RegionId::from("alpha"))
        );
        assert_eq!(
            closest_corners(dragged, &reversed, &config),
            Some(RegionId::from("alpha"))
        );
    }
}
