//! Drag gesture lifecycle: `Idle → Pending → Dragging → {commit | cancel}`.
//!
//! [`DragController`] is a stateful processor fed raw pointer events by the
//! host. A pointer-down parks the gesture in `Pending` until the pointer
//! travels past the activation distance, so a plain click is never misread as
//! a drag. Once dragging, every move tick re-runs the collision detector and
//! keeps a preview board up to date; release either produces a [`CardMove`]
//! for the board store to commit or a cancellation.
//!
//! # Invariants
//!
//! 1. The authoritative board passed to [`DragController::pointer_move`] is
//!    never written here; only the session's preview copy changes.
//! 2. The preview always satisfies the board's card-uniqueness invariant: it
//!    is rebuilt from a fresh clone on every target change.
//! 3. A gesture that ends without a matched droppable reports `Cancelled`
//!    and leaves no trace.

use crate::dnd::collision::{closest_corners, CollisionConfig};
use crate::dnd::registry::{DroppableRegistry, RegionId};
use crate::domain::board::{Board, CardId, CardMove, ColumnId};
use crate::domain::ordering::{apply_move, insertion_index};
use crate::geometry::{Point, Rect};
use tracing::{debug, warn};
use uuid::Uuid;

/// Thresholds and tuning for drag recognition.
#[derive(Debug, Clone)]
pub struct DragConfig {
    /// Minimum pointer travel (logical px) before a pointer-down becomes a
    /// drag (default: 8.0).
    pub activation_distance: f64,
    /// Collision detector tuning.
    pub collision: CollisionConfig,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance: 8.0,
            collision: CollisionConfig::default(),
        }
    }
}

/// Live state of one activated drag gesture. Created when the activation
/// threshold is crossed, destroyed on release or cancel.
#[derive(Debug, Clone)]
pub struct DragSession {
    gesture_id: Uuid,
    card_id: CardId,
    source_column: ColumnId,
    source_index: usize,
    /// Pointer position at pointer-down; the dragged rect is the grabbed
    /// card's rect translated by the pointer delta from here.
    pressed: Point,
    pointer: Point,
    grab_rect: Rect,
    over: Option<RegionId>,
    /// Destination column and final insertion index of the current preview.
    target: Option<(ColumnId, usize)>,
    preview: Board,
}

impl DragSession {
    /// Correlation id for logs; unique per gesture.
    pub fn gesture_id(&self) -> Uuid {
        self.gesture_id
    }

    pub fn card_id(&self) -> &CardId {
        &self.card_id
    }

    pub fn source_column(&self) -> &ColumnId {
        &self.source_column
    }

    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Best-match droppable of the last tick, for drop-zone highlighting.
    pub fn over(&self) -> Option<&RegionId> {
        self.over.as_ref()
    }

    /// The preview board with the live reordering applied. Render-only;
    /// never persisted.
    pub fn preview(&self) -> &Board {
        &self.preview
    }

    /// Current rect of the dragged card.
    pub fn dragged_rect(&self) -> Rect {
        self.grab_rect.translated(
            self.pointer.x - self.pressed.x,
            self.pointer.y - self.pressed.y,
        )
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Pending {
        card_id: CardId,
        card_rect: Rect,
        pressed: Point,
    },
    Dragging(Box<DragSession>),
}

/// How a gesture finished.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Pointer released before the activation threshold, or no gesture was
    /// in progress. Not an error; the click passes through untouched.
    Ignored,
    /// Drag ended with no matched droppable, or was cancelled explicitly.
    /// The authoritative board was never touched.
    Cancelled,
    /// Drag ended over a droppable; hand this move to the board store.
    Commit(CardMove),
}

/// State machine driving one drag gesture at a time.
#[derive(Debug, Default)]
pub struct DragController {
    config: DragConfig,
    phase: Phase,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DragConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
        }
    }

    /// True once the activation threshold has been crossed.
    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging(_))
    }

    /// The active session, if a drag is in progress.
    pub fn session(&self) -> Option<&DragSession> {
        match &self.phase {
            Phase::Dragging(session) => Some(session),
            _ => None,
        }
    }

    /// The dragged card id, for "lifted" styling.
    pub fn active_card(&self) -> Option<&CardId> {
        self.session().map(|s| s.card_id())
    }

    /// The currently highlighted drop target.
    pub fn drop_target(&self) -> Option<&RegionId> {
        self.session().and_then(|s| s.over())
    }

    /// Pointer pressed on a card. Enters `Pending`; a gesture already in
    /// progress is discarded first.
    pub fn pointer_down(&mut self, card_id: CardId, card_rect: Rect, position: Point) {
        if !matches!(self.phase, Phase::Idle) {
            debug!(card = %card_id, "pointer_down during active gesture, resetting");
        }
        self.phase = Phase::Pending {
            card_id,
            card_rect,
            pressed: position,
        };
    }

    /// Pointer moved. In `Pending` this may activate the drag; in `Dragging`
    /// it re-runs collision detection against the registry snapshot and
    /// refreshes the preview when the drop target or insertion index changed.
    ///
    /// `board` is the authoritative board and is only ever read.
    pub fn pointer_move(&mut self, position: Point, board: &Board, registry: &DroppableRegistry) {
        match std::mem::take(&mut self.phase) {
            Phase::Idle => {}
            Phase::Pending {
                card_id,
                card_rect,
                pressed,
            } => {
                if pressed.distance_to(position) < self.config.activation_distance {
                    self.phase = Phase::Pending {
                        card_id,
                        card_rect,
                        pressed,
                    };
                    return;
                }

                let Some((source_column, source_index)) = board.find_card(&card_id) else {
                    // Board was reloaded out from under the gesture.
                    warn!(card = %card_id, "drag activation for unknown card, dropping gesture");
                    return;
                };

                let session = DragSession {
                    gesture_id: Uuid::new_v4(),
                    card_id,
                    source_column,
                    source_index,
                    pressed,
                    pointer: position,
                    grab_rect: card_rect,
                    over: None,
                    target: None,
                    preview: board.clone(),
                };
                debug!(
                    gesture = %session.gesture_id,
                    card = %session.card_id,
                    column = %session.source_column,
                    index = session.source_index,
                    "drag activated"
                );
                self.phase = Phase::Dragging(Box::new(session));
                self.tick(position, board, registry);
            }
            Phase::Dragging(session) => {
                self.phase = Phase::Dragging(session);
                self.tick(position, board, registry);
            }
        }
    }

    /// One move tick while dragging: detector pass plus preview refresh.
    fn tick(&mut self, position: Point, board: &Board, registry: &DroppableRegistry) {
        let Phase::Dragging(session) = &mut self.phase else {
            return;
        };
        session.pointer = position;

        let dragged = session.dragged_rect();
        let best = closest_corners(dragged, registry.all(), &self.config.collision);

        let candidate = best.as_ref().and_then(|id| registry.get(id)).map(|region| {
            let index = board
                .column(&region.column_id)
                .map(|col| insertion_index(col, &region.target, region.rect, position))
                .unwrap_or(0);
            (region.column_id.clone(), index)
        });

        let changed = best != session.over
            || candidate.as_ref().map(|(c, i)| (c, *i))
                != session.target.as_ref().map(|(c, i)| (c, *i));
        if !changed {
            return;
        }

        session.over = best;
        match candidate {
            Some((to_column, index)) => {
                let mut preview = board.clone();
                match apply_move(&mut preview, &session.card_id, &to_column, index) {
                    Ok(mv) => {
                        session.target = Some((to_column, mv.to_index));
                        session.preview = preview;
                    }
                    Err(err) => {
                        // Card or column vanished (board reloaded mid-drag);
                        // the gesture stays alive but has nowhere to land.
                        warn!(gesture = %session.gesture_id, %err, "preview rebuild failed");
                        session.target = None;
                        session.preview = board.clone();
                    }
                }
            }
            None => {
                session.target = None;
                session.preview = board.clone();
            }
        }
    }

    /// Pointer released. Produces the gesture's outcome and returns to idle.
    pub fn pointer_up(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.phase) {
            Phase::Idle => DragOutcome::Ignored,
            Phase::Pending { card_id, .. } => {
                debug!(card = %card_id, "released before activation threshold");
                DragOutcome::Ignored
            }
            Phase::Dragging(session) => match session.target {
                Some((to_column, to_index)) => {
                    let mv = CardMove {
                        card_id: session.card_id,
                        from_column: session.source_column,
                        from_index: session.source_index,
                        to_column,
                        to_index,
                    };
                    debug!(gesture = %session.gesture_id, ?mv, "drag committed");
                    DragOutcome::Commit(mv)
                }
                None => {
                    debug!(gesture = %session.gesture_id, "released outside droppables");
                    DragOutcome::Cancelled
                }
            },
        }
    }

    /// Explicit cancel (escape key, focus loss). Discards any preview and
    /// returns to idle without touching the board.
    pub fn cancel(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.phase) {
            Phase::Idle | Phase::Pending { .. } => DragOutcome::Ignored,
            Phase::Dragging(session) => {
                debug!(gesture = %session.gesture_id, "drag cancelled");
                DragOutcome::Cancelled
            }
        }
    }
}
