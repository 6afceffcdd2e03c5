//! Tracking of currently-mounted drop targets.
//!
//! The host renderer registers a region when a droppable component mounts and
//! unregisters it on unmount. Columns re-render and scroll while a drag is in
//! flight, so churn here is normal: re-registering an id refreshes its rect,
//! and a region that disappears simply stops being a match candidate on the
//! next detector pass.

use crate::domain::board::ColumnId;
use crate::domain::ordering::DropTarget;
use crate::geometry::Rect;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a droppable region. By convention the column id for
/// a column's footer area, or `column:index` for a card slot, but the engine
/// only ever compares ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RegionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A rectangular area that can accept a dropped card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppableRegion {
    pub id: RegionId,
    pub column_id: ColumnId,
    pub target: DropTarget,
    pub rect: Rect,
}

impl DroppableRegion {
    pub fn new(
        id: impl Into<RegionId>,
        column_id: impl Into<ColumnId>,
        target: DropTarget,
        rect: Rect,
    ) -> Self {
        Self {
            id: id.into(),
            column_id: column_id.into(),
            target,
            rect,
        }
    }
}

/// Snapshot registry of the droppable regions currently visible.
///
/// Insertion order is preserved in [`DroppableRegistry::all`] but carries no
/// meaning for matching; the collision detector's result is independent of it.
#[derive(Debug, Default)]
pub struct DroppableRegistry {
    regions: Vec<DroppableRegion>,
}

impl DroppableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a region. If the id is already known the region is replaced
    /// in place, which is how remounts refresh a stale rect.
    pub fn register(&mut self, region: DroppableRegion) {
        if let Some(existing) = self.regions.iter_mut().find(|r| r.id == region.id) {
            *existing = region;
        } else {
            self.regions.push(region);
        }
    }

    /// Removes a region. Unknown ids are ignored; components unmounting in
    /// any order mid-drag must never be an error.
    pub fn unregister(&mut self, id: &RegionId) {
        self.regions.retain(|r| &r.id != id);
    }

    /// Updates the bounding rect of a registered region (scroll, resize).
    /// Returns false if the region is not currently registered.
    pub fn update_rect(&mut self, id: &RegionId, rect: Rect) -> bool {
        match self.regions.iter_mut().find(|r| &r.id == id) {
            Some(region) => {
                region.rect = rect;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &RegionId) -> Option<&DroppableRegion> {
        self.regions.iter().find(|r| &r.id == id)
    }

    /// The current snapshot, in insertion order.
    pub fn all(&self) -> &[DroppableRegion] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn clear(&mut self) {
        self.regions.clear();
    }
}
