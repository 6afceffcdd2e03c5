//! The authoritative board and its single writer.
//!
//! All mutation of the board goes through [`BoardStore`]: wholesale `load`
//! after a data refresh, and validated `commit` at the end of a drag gesture.
//! Commits apply synchronously and optimistically; persistence runs after the
//! fact, and a failure rolls the affected columns back to the snapshot taken
//! at commit time.

use crate::domain::board::{Board, CardMove, Column, ColumnId};
use crate::error::{DriftboardError, Result};
use crate::persist::MovePersistence;
use tracing::warn;

/// Snapshot of the column sequences a commit touched, captured before the
/// commit applied. Feeding it back to [`BoardStore::rollback`] undoes exactly
/// that commit and nothing else: later commits on other columns are
/// unaffected even when persistence results arrive out of order.
#[derive(Debug, Clone)]
pub struct CommitSnapshot {
    mv: CardMove,
    columns: Vec<Column>,
}

impl CommitSnapshot {
    /// The move this snapshot guards.
    pub fn card_move(&self) -> &CardMove {
        &self.mv
    }
}

/// Owner of the authoritative board.
#[derive(Debug)]
pub struct BoardStore {
    board: Board,
}

impl Default for BoardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardStore {
    pub fn new() -> Self {
        Self {
            board: Board::empty(),
        }
    }

    /// Replaces the board wholesale with the data provider's column list,
    /// validating the card-uniqueness invariant.
    pub fn load(&mut self, columns: Vec<Column>) -> Result<()> {
        self.board = Board::from_columns(columns)?;
        Ok(())
    }

    /// Read access to the authoritative board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Applies a validated move synchronously and returns the snapshot needed
    /// to undo it.
    ///
    /// Rejects with [`DriftboardError::StaleMove`] when the card is not at
    /// `from_column[from_index]` anymore, which happens when the board was
    /// reloaded while a drag session was still holding its activation-time
    /// coordinates. A rejected commit mutates nothing.
    pub fn commit(&mut self, mv: &CardMove) -> Result<CommitSnapshot> {
        let valid = self
            .board
            .column(&mv.from_column)
            .and_then(|col| col.cards.get(mv.from_index))
            .is_some_and(|card| card.id == mv.card_id);
        if !valid {
            warn!(
                card = %mv.card_id,
                column = %mv.from_column,
                index = mv.from_index,
                "stale move rejected"
            );
            return Err(DriftboardError::StaleMove {
                card: mv.card_id.to_string(),
                column: mv.from_column.to_string(),
                index: mv.from_index,
            });
        }

        if self.board.column(&mv.to_column).is_none() {
            return Err(DriftboardError::ColumnNotFound(mv.to_column.to_string()));
        }

        let snapshot = CommitSnapshot {
            mv: mv.clone(),
            columns: self.snapshot_columns(&[&mv.from_column, &mv.to_column]),
        };

        // `to_index` is already the final position (post-removal), so the
        // card is removed and reinserted without further index arithmetic.
        let card = self
            .board
            .column_mut(&mv.from_column)
            .ok_or_else(|| DriftboardError::ColumnNotFound(mv.from_column.to_string()))?
            .cards
            .remove(mv.from_index);
        let dest = self
            .board
            .column_mut(&mv.to_column)
            .ok_or_else(|| DriftboardError::ColumnNotFound(mv.to_column.to_string()))?;
        let index = mv.to_index.min(dest.cards.len());
        dest.cards.insert(index, card);
        Ok(snapshot)
    }

    /// Restores the column sequences a commit captured. Columns that have
    /// since been removed from the board are skipped.
    pub fn rollback(&mut self, snapshot: CommitSnapshot) {
        warn!(card = %snapshot.mv.card_id, "rolling back committed move");
        for saved in snapshot.columns {
            if let Some(column) = self.board.column_mut(&saved.id) {
                *column = saved;
            }
        }
    }

    /// Commits the move, then asks the persistence collaborator to record it.
    /// On persistence failure the commit is rolled back and the failure is
    /// surfaced for user notification.
    ///
    /// The in-memory order is updated before the first await, so callers see
    /// the move take effect immediately. This convenience serializes
    /// persistence with further store access; hosts that let a new gesture
    /// begin while persistence is in flight should use [`BoardStore::commit`]
    /// and [`BoardStore::rollback`] directly, as the engine facade does.
    pub async fn commit_and_persist(
        &mut self,
        mv: &CardMove,
        persistence: &dyn MovePersistence,
    ) -> Result<()> {
        let snapshot = self.commit(mv)?;
        match persistence.persist_move(mv).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.rollback(snapshot);
                Err(DriftboardError::PersistenceFailed(err.to_string()))
            }
        }
    }

    fn snapshot_columns(&self, ids: &[&ColumnId]) -> Vec<Column> {
        let mut columns: Vec<Column> = Vec::new();
        for id in ids {
            if columns.iter().any(|c| c.id == **id) {
                continue;
            }
            if let Some(column) = self.board.column(id) {
                columns.push(column.clone());
            }
        }
        columns
    }
}
