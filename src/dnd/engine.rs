//! Top-level wiring of the reordering engine.
//!
//! [`BoardEngine`] owns the board store, the droppable registry, and the drag
//! controller, and connects them to the persistence collaborator. Hosts feed
//! it pointer events and mount/unmount notifications, and read the render
//! boundary back out each tick: the visible board (preview while dragging),
//! the lifted card, and the highlighted drop target.
//!
//! Gestures resolve synchronously: [`BoardEngine::pointer_up`] applies a
//! committed move to the board and reports it before returning, handing the
//! host an [`InFlightCommit`] to drive. Persistence therefore never blocks
//! the next pointer event; a new drag may begin while an earlier commit is
//! still persisting, and a late failure rolls back only the columns that
//! commit touched.

use crate::dnd::registry::{DroppableRegion, DroppableRegistry, RegionId};
use crate::dnd::session::{DragConfig, DragController, DragOutcome};
use crate::domain::board::{Board, CardId, CardMove, Column};
use crate::error::{DriftboardError, Result};
use crate::geometry::{Point, Rect};
use crate::persist::MovePersistence;
use crate::store::{BoardStore, CommitSnapshot};
use std::fmt;
use std::sync::Arc;

/// Reported once per finished gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureOutcome {
    /// The gesture ended in a committed move.
    Moved(CardMove),
    /// The gesture was cancelled; the board is unchanged.
    Cancelled,
}

/// Result of a pointer release.
#[derive(Debug)]
pub enum ReleaseOutcome {
    /// No gesture was active (a plain click).
    Ignored,
    /// The gesture ended without a matched droppable; the board is unchanged.
    Cancelled,
    /// The move is applied and reported; persistence is still in flight.
    Committed(InFlightCommit),
}

/// A committed move whose persistence has not resolved yet.
///
/// The in-memory board already shows the move. The host drives [`settle`] to
/// completion, concurrently with any further gestures, and hands a failure
/// back to [`BoardEngine::apply_rollback`] whenever it arrives.
///
/// [`settle`]: InFlightCommit::settle
pub struct InFlightCommit {
    mv: CardMove,
    snapshot: CommitSnapshot,
    persistence: Arc<dyn MovePersistence>,
}

impl fmt::Debug for InFlightCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InFlightCommit")
            .field("mv", &self.mv)
            .finish_non_exhaustive()
    }
}

impl InFlightCommit {
    /// The move this commit applied.
    pub fn card_move(&self) -> &CardMove {
        &self.mv
    }

    /// Awaits the persistence collaborator. Does not borrow the engine, so
    /// pointer events keep flowing while this is pending.
    pub async fn settle(self) -> std::result::Result<CardMove, PersistFailure> {
        match self.persistence.persist_move(&self.mv).await {
            Ok(()) => Ok(self.mv),
            Err(err) => Err(PersistFailure {
                message: err.to_string(),
                snapshot: self.snapshot,
            }),
        }
    }
}

/// A persistence failure carrying the rollback snapshot of its commit.
#[derive(Debug)]
pub struct PersistFailure {
    message: String,
    snapshot: CommitSnapshot,
}

impl PersistFailure {
    /// The collaborator's failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

type CompletionCallback = Box<dyn Fn(&GestureOutcome) + Send>;

/// The drag-and-drop reordering engine for one board.
pub struct BoardEngine {
    store: BoardStore,
    registry: DroppableRegistry,
    controller: DragController,
    persistence: Arc<dyn MovePersistence>,
    on_complete: Option<CompletionCallback>,
}

impl BoardEngine {
    pub fn new(persistence: Arc<dyn MovePersistence>) -> Self {
        Self::with_config(persistence, DragConfig::default())
    }

    pub fn with_config(persistence: Arc<dyn MovePersistence>, config: DragConfig) -> Self {
        Self {
            store: BoardStore::new(),
            registry: DroppableRegistry::new(),
            controller: DragController::with_config(config),
            persistence,
            on_complete: None,
        }
    }

    /// Registers the completion callback, replacing any previous one.
    pub fn set_on_complete(&mut self, callback: impl Fn(&GestureOutcome) + Send + 'static) {
        self.on_complete = Some(Box::new(callback));
    }

    /// Replaces the board wholesale with a fresh data-provider response. An
    /// in-flight gesture is cancelled first; its session referred to an order
    /// that no longer exists.
    pub fn load(&mut self, columns: Vec<Column>) -> Result<()> {
        self.cancel();
        self.store.load(columns)
    }

    // -- droppable mount/unmount -------------------------------------------

    pub fn register_droppable(&mut self, region: DroppableRegion) {
        self.registry.register(region);
    }

    pub fn unregister_droppable(&mut self, id: &RegionId) {
        self.registry.unregister(id);
    }

    pub fn update_droppable_rect(&mut self, id: &RegionId, rect: Rect) -> bool {
        self.registry.update_rect(id, rect)
    }

    // -- pointer events ----------------------------------------------------

    /// Pointer pressed on a card. A gesture still in progress is cancelled
    /// and reported first, so every started drag finishes with exactly one
    /// completion signal.
    pub fn pointer_down(&mut self, card_id: CardId, card_rect: Rect, position: Point) {
        self.cancel();
        self.controller.pointer_down(card_id, card_rect, position);
    }

    pub fn pointer_move(&mut self, position: Point) {
        self.controller
            .pointer_move(position, self.store.board(), &self.registry);
    }

    /// Pointer released: finishes the gesture synchronously. A committed move
    /// is applied to the board and reported through the completion callback
    /// before this returns; the caller receives the [`InFlightCommit`] whose
    /// persistence it must drive. A stale session (board reloaded mid-drag)
    /// surfaces [`DriftboardError::StaleMove`] and mutates nothing.
    pub fn pointer_up(&mut self) -> Result<ReleaseOutcome> {
        match self.controller.pointer_up() {
            DragOutcome::Ignored => Ok(ReleaseOutcome::Ignored),
            DragOutcome::Cancelled => {
                self.notify(&GestureOutcome::Cancelled);
                Ok(ReleaseOutcome::Cancelled)
            }
            DragOutcome::Commit(mv) => {
                let snapshot = match self.store.commit(&mv) {
                    Ok(snapshot) => snapshot,
                    Err(err) => {
                        // The gesture ends as a cancellation, nothing mutated.
                        self.notify(&GestureOutcome::Cancelled);
                        return Err(err);
                    }
                };

                self.notify(&GestureOutcome::Moved(mv.clone()));
                Ok(ReleaseOutcome::Committed(InFlightCommit {
                    mv,
                    snapshot,
                    persistence: self.persistence.clone(),
                }))
            }
        }
    }

    /// Explicit cancel (escape key). Returns the outcome when a drag was
    /// actually discarded.
    pub fn cancel(&mut self) -> Option<GestureOutcome> {
        match self.controller.cancel() {
            DragOutcome::Cancelled => {
                let outcome = GestureOutcome::Cancelled;
                self.notify(&outcome);
                Some(outcome)
            }
            _ => None,
        }
    }

    /// Applies the rollback for a persistence failure, whenever it arrives.
    /// The snapshot restores only the columns its commit touched, so commits
    /// that completed in the meantime on other columns are unaffected.
    /// Returns the surfaced error for user notification.
    pub fn apply_rollback(&mut self, failure: PersistFailure) -> DriftboardError {
        self.store.rollback(failure.snapshot);
        DriftboardError::PersistenceFailed(failure.message)
    }

    // -- render boundary ---------------------------------------------------

    /// The board to render this tick: the session's preview while dragging,
    /// the authoritative board otherwise.
    pub fn visible_board(&self) -> &Board {
        match self.controller.session() {
            Some(session) => session.preview(),
            None => self.store.board(),
        }
    }

    /// The authoritative board, regardless of any active drag.
    pub fn board(&self) -> &Board {
        self.store.board()
    }

    /// The dragged card, for "lifted" styling.
    pub fn active_card(&self) -> Option<&CardId> {
        self.controller.active_card()
    }

    /// The current best-match droppable, for drop-zone highlighting.
    pub fn drop_target(&self) -> Option<&RegionId> {
        self.controller.drop_target()
    }

    fn notify(&self, outcome: &GestureOutcome) {
        if let Some(callback) = &self.on_complete {
            callback(outcome);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::board::{Card, ColumnId};
    use crate::domain::ordering::DropTarget;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct FakePersistence {
        fail: AtomicBool,
        moves: Mutex<Vec<CardMove>>,
    }

    impl FakePersistence {
        fn new(fail: bool) -> Arc<Self> {
            Arc::new(Self {
                fail: AtomicBool::new(fail),
                moves: Mutex::new(Vec::new()),
            })
        }

        fn set_fail(&self, fail: bool) {
            self.fail.store(fail, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl MovePersistence for FakePersistence {
        async fn persist_move(&self, mv: &CardMove) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DriftboardError::PersistenceFailed(
                    "backend unavailable".to_string(),
                ));
            }
            self.moves.lock().unwrap().push(mv.clone());
            Ok(())
        }
    }

    fn engine(persistence: Arc<FakePersistence>) -> BoardEngine {
        let mut engine = BoardEngine::new(persistence);
        engine
            .load(vec![
                Column::new("a", "A").with_cards(vec![
                    Card::new("c1", "One"),
                    Card::new("c2", "Two"),
                    Card::new("c3", "Three"),
                ]),
                Column::new("b", "B").with_cards(vec![Card::new("c4", "Four")]),
            ])
            .unwrap();

        for (i, id) in ["a:0", "a:1", "a:2"].iter().enumerate() {
            engine.register_droppable(DroppableRegion::new(
                *id,
                "a",
                DropTarget::Slot { index: i },
                Rect::new(0.0, 60.0 * i as f64, 200.0, 60.0),
            ));
        }
        engine.register_droppable(DroppableRegion::new(
            "b:0",
            "b",
            DropTarget::Slot { index: 0 },
            Rect::new(300.0, 0.0, 200.0, 60.0),
        ));
        engine.register_droppable(DroppableRegion::new(
            "b",
            "b",
            DropTarget::ColumnArea,
            Rect::new(300.0, 60.0, 200.0, 340.0),
        ));
        engine
    }

    fn ids(board: &Board, column: &str) -> Vec<String> {
        board
            .column(&ColumnId::from(column))
            .unwrap()
            .cards
            .iter()
            .map(|c| c.id.to_string())
            .collect()
    }

    fn drag_c2_over_b(engine: &mut BoardEngine) {
        engine.pointer_down(
            CardId::from("c2"),
            Rect::new(0.0, 60.0, 200.0, 60.0),
            Point::new(100.0, 90.0),
        );
        engine.pointer_move(Point::new(400.0, 10.0));
    }

    fn committed(outcome: ReleaseOutcome) -> InFlightCommit {
        match outcome {
            ReleaseOutcome::Committed(commit) => commit,
            other => panic!("expected a committed move, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_full_gesture_commits_and_persists() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence.clone());

        drag_c2_over_b(&mut engine);
        assert_eq!(engine.active_card(), Some(&CardId::from("c2")));
        assert_eq!(engine.drop_target(), Some(&RegionId::from("b:0")));

        // Render boundary shows the preview while the store is untouched.
        assert_eq!(ids(engine.visible_board(), "b"), vec!["c2", "c4"]);
        assert_eq!(ids(engine.board(), "b"), vec!["c4"]);

        let commit = committed(engine.pointer_up().unwrap());
        assert_eq!(commit.card_move().to_column, ColumnId::from("b"));

        // The move is applied before persistence resolves.
        assert_eq!(ids(engine.board(), "a"), vec!["c1", "c3"]);
        assert_eq!(ids(engine.board(), "b"), vec!["c2", "c4"]);
        assert_eq!(engine.active_card(), None);

        let mv = commit.settle().await.unwrap();
        assert_eq!(mv.card_id, CardId::from("c2"));
        assert_eq!(persistence.moves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_completion_callback_fires_once_per_gesture() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence);

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = outcomes.clone();
        engine.set_on_complete(move |outcome| sink.lock().unwrap().push(outcome.clone()));

        drag_c2_over_b(&mut engine);
        committed(engine.pointer_up().unwrap()).settle().await.unwrap();

        // A second, cancelled gesture.
        engine.pointer_down(
            CardId::from("c1"),
            Rect::new(0.0, 0.0, 200.0, 60.0),
            Point::new(100.0, 30.0),
        );
        engine.pointer_move(Point::new(100.0, 3000.0));
        assert!(matches!(
            engine.pointer_up().unwrap(),
            ReleaseOutcome::Cancelled
        ));

        let outcomes = outcomes.lock().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0], GestureOutcome::Moved(_)));
        assert_eq!(outcomes[1], GestureOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_interrupting_pointer_down_reports_cancellation() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence);

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = outcomes.clone();
        engine.set_on_complete(move |outcome| sink.lock().unwrap().push(outcome.clone()));

        drag_c2_over_b(&mut engine);
        assert!(engine.active_card().is_some());

        // A second pointer-down lands without the first being released; the
        // interrupted gesture must still finish with a cancellation signal.
        engine.pointer_down(
            CardId::from("c1"),
            Rect::new(0.0, 0.0, 200.0, 60.0),
            Point::new(100.0, 30.0),
        );

        {
            let outcomes = outcomes.lock().unwrap();
            assert_eq!(outcomes.as_slice(), &[GestureOutcome::Cancelled]);
        }

        // A pointer-down on top of a still-pending press reports nothing
        // extra: the pending press never became a gesture.
        engine.pointer_down(
            CardId::from("c3"),
            Rect::new(0.0, 120.0, 200.0, 60.0),
            Point::new(100.0, 150.0),
        );
        assert_eq!(outcomes.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_plain_click_reports_nothing() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence);

        let outcomes = Arc::new(Mutex::new(Vec::new()));
        let sink = outcomes.clone();
        engine.set_on_complete(move |outcome| sink.lock().unwrap().push(outcome.clone()));

        engine.pointer_down(
            CardId::from("c2"),
            Rect::new(0.0, 60.0, 200.0, 60.0),
            Point::new(100.0, 90.0),
        );
        engine.pointer_move(Point::new(102.0, 91.0));

        assert!(matches!(
            engine.pointer_up().unwrap(),
            ReleaseOutcome::Ignored
        ));
        assert!(outcomes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persistence_failure_rolls_back_board() {
        let persistence = FakePersistence::new(true);
        let mut engine = engine(persistence);
        let before = engine.board().clone();

        drag_c2_over_b(&mut engine);
        let commit = committed(engine.pointer_up().unwrap());
        assert_ne!(engine.board(), &before);

        let failure = commit.settle().await.unwrap_err();
        let err = engine.apply_rollback(failure);

        assert!(matches!(err, DriftboardError::PersistenceFailed(_)));
        assert_eq!(engine.board(), &before);
        engine.board().check_integrity().unwrap();
    }

    #[tokio::test]
    async fn test_new_gesture_while_persistence_in_flight() {
        // Three columns so the two gestures touch disjoint column pairs.
        let persistence = FakePersistence::new(false);
        let mut engine = BoardEngine::new(persistence.clone());
        engine
            .load(vec![
                Column::new("a", "A").with_cards(vec![
                    Card::new("c1", "One"),
                    Card::new("c2", "Two"),
                ]),
                Column::new("b", "B"),
                Column::new("c", "C").with_cards(vec![
                    Card::new("c5", "Five"),
                    Card::new("c6", "Six"),
                ]),
            ])
            .unwrap();
        engine.register_droppable(DroppableRegion::new(
            "b",
            "b",
            DropTarget::ColumnArea,
            Rect::new(300.0, 0.0, 200.0, 400.0),
        ));
        engine.register_droppable(DroppableRegion::new(
            "c:0",
            "c",
            DropTarget::Slot { index: 0 },
            Rect::new(600.0, 0.0, 200.0, 60.0),
        ));

        // First gesture: c2 into column b. Its persistence stays unsettled.
        engine.pointer_down(
            CardId::from("c2"),
            Rect::new(0.0, 60.0, 200.0, 60.0),
            Point::new(100.0, 90.0),
        );
        engine.pointer_move(Point::new(400.0, 100.0));
        let first = committed(engine.pointer_up().unwrap());

        // Second gesture begins and commits while the first is in flight.
        engine.pointer_down(
            CardId::from("c6"),
            Rect::new(600.0, 60.0, 200.0, 60.0),
            Point::new(700.0, 90.0),
        );
        engine.pointer_move(Point::new(700.0, 10.0));
        let second = committed(engine.pointer_up().unwrap());
        second.settle().await.unwrap();
        assert_eq!(ids(engine.board(), "c"), vec!["c6", "c5"]);

        // The first commit's persistence fails late; its rollback restores
        // columns a and b only, leaving the second commit intact.
        persistence.set_fail(true);
        let failure = first.settle().await.unwrap_err();
        engine.apply_rollback(failure);

        assert_eq!(ids(engine.board(), "a"), vec!["c1", "c2"]);
        assert_eq!(ids(engine.board(), "b"), Vec::<String>::new());
        assert_eq!(ids(engine.board(), "c"), vec!["c6", "c5"]);
        engine.board().check_integrity().unwrap();
    }

    #[tokio::test]
    async fn test_noop_drag_leaves_board_identical() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence);
        let before = engine.board().clone();

        // Lift c2 and put it straight back on its own slot's upper half.
        engine.pointer_down(
            CardId::from("c2"),
            Rect::new(0.0, 60.0, 200.0, 60.0),
            Point::new(100.0, 90.0),
        );
        engine.pointer_move(Point::new(100.0, 75.0));
        let commit = committed(engine.pointer_up().unwrap());

        assert_eq!(engine.board(), &before);
        commit.settle().await.unwrap();
        assert_eq!(engine.board(), &before);
    }

    #[tokio::test]
    async fn test_escape_cancels_without_mutation() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence.clone());
        let before = engine.board().clone();

        drag_c2_over_b(&mut engine);
        assert_ne!(engine.visible_board(), &before);

        assert_eq!(engine.cancel(), Some(GestureOutcome::Cancelled));
        assert_eq!(engine.board(), &before);
        assert_eq!(engine.visible_board(), &before);
        assert!(persistence.moves.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reload_mid_drag_rejects_stale_commit() {
        let persistence = FakePersistence::new(false);
        let mut engine = engine(persistence.clone());

        drag_c2_over_b(&mut engine);

        // Reload on the store directly, simulating a refetch racing the
        // gesture: the session's activation coordinates go stale.
        engine.store
            .load(vec![
                Column::new("a", "A").with_cards(vec![Card::new("c9", "Nine")]),
                Column::new("b", "B").with_cards(vec![Card::new("c4", "Four")]),
            ])
            .unwrap();

        let result = engine.pointer_up();
        assert!(matches!(result, Err(DriftboardError::StaleMove { .. })));
        assert_eq!(ids(engine.board(), "a"), vec!["c9"]);
        assert_eq!(ids(engine.board(), "b"), vec!["c4"]);
        assert!(persistence.moves.lock().unwrap().is_empty());
    }
}
