pub mod collision;
pub mod engine;
pub mod registry;
pub mod session;

pub use collision::{closest_corners, corner_distance, CollisionConfig};
pub use engine::{BoardEngine, GestureOutcome, InFlightCommit, PersistFailure, ReleaseOutcome};
pub use registry::{DroppableRegion, DroppableRegistry, RegionId};
pub use session::{DragConfig, DragController, DragOutcome, DragSession};
