//! # Driftboard Core
//!
//! Drag-and-drop board reordering engine for Driftboard kanban dashboards.
//!
//! This crate provides the interaction engine behind the kanban view:
//! tracking pointer-driven drag sessions, detecting the droppable a dragged
//! card is over, computing live preview orderings, and committing moves to
//! the board with optimistic persistence and rollback. It has no dependency
//! on any UI runtime; any renderer that can report element rectangles and
//! forward pointer events can host it.

pub mod dnd;
pub mod domain;
pub mod error;
pub mod geometry;
pub mod persist;
pub mod store;

// Re-export commonly used types
pub use dnd::{
    BoardEngine, CollisionConfig, DragConfig, DragController, DragOutcome, DragSession,
    DroppableRegion, DroppableRegistry, GestureOutcome, InFlightCommit, PersistFailure,
    RegionId, ReleaseOutcome,
};
pub use domain::{Board, Card, CardId, CardMove, Column, ColumnId, DropTarget};
pub use error::{DriftboardError, Result};
pub use geometry::{Point, Rect};
pub use persist::{FileJournal, MovePersistence};
pub use store::{BoardStore, CommitSnapshot};
