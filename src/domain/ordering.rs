//! Insertion-index computation and card reordering.
//!
//! This is the piece that turns "the drag is over droppable X" into "the card
//! now sits at index N of column Y". [`apply_move`] performs the removal and
//! reinsertion in one call, so no intermediate board state ever has the card
//! in zero or two columns.

use crate::domain::board::{Board, CardId, CardMove, Column, ColumnId};
use crate::error::{DriftboardError, Result};
use crate::geometry::{Point, Rect};
use serde::{Deserialize, Serialize};

/// What a droppable region resolves to inside its column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DropTarget {
    /// The slot occupied by the card at `index`. Dropping here inserts
    /// adjacent to that card.
    Slot { index: usize },
    /// The column's empty area / footer. Dropping here appends.
    ColumnArea,
}

/// Computes the insertion index for a drop into `column`.
///
/// For a card slot the pointer's vertical position decides the side: upper
/// half inserts before the slot, lower half after. The column footer appends.
/// The returned index is pre-removal; [`apply_move`] does the shift
/// accounting when the dragged card leaves the same column.
pub fn insertion_index(
    column: &Column,
    target: &DropTarget,
    target_rect: Rect,
    pointer: Point,
) -> usize {
    match target {
        DropTarget::ColumnArea => column.cards.len(),
        DropTarget::Slot { index } => {
            let slot = (*index).min(column.cards.len());
            if pointer.y <= target_rect.center().y {
                slot
            } else {
                slot + 1
            }
        }
    }
}

/// Moves `card_id` to position `index` of `to_column`, removing it from
/// wherever it currently lives.
///
/// `index` is interpreted against the destination column *before* removal;
/// when the card moves within its own column the removal shifts later
/// positions down by one, and the index is adjusted accordingly. Out-of-range
/// indices clamp to the end. Returns the normalized move that was applied.
pub fn apply_move(
    board: &mut Board,
    card_id: &CardId,
    to_column: &ColumnId,
    index: usize,
) -> Result<CardMove> {
    let (from_column, from_index) = board
        .find_card(card_id)
        .ok_or_else(|| DriftboardError::CardNotFound(card_id.to_string()))?;

    if board.column(to_column).is_none() {
        return Err(DriftboardError::ColumnNotFound(to_column.to_string()));
    }

    let card = {
        let source = board
            .column_mut(&from_column)
            .ok_or_else(|| DriftboardError::ColumnNotFound(from_column.to_string()))?;
        source.cards.remove(from_index)
    };

    let mut to_index = index;
    if from_column == *to_column && to_index > from_index {
        to_index -= 1;
    }

    let dest = board
        .column_mut(to_column)
        .ok_or_else(|| DriftboardError::ColumnNotFound(to_column.to_string()))?;
    to_index = to_index.min(dest.cards.len());
    dest.cards.insert(to_index, card);

    Ok(CardMove {
        card_id: card_id.clone(),
        from_column,
        from_index,
        to_column: to_column.clone(),
        to_index,
    })
}
