use crate::error::{DriftboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Unique identifier for a card. Opaque and stable; supplied by the data
/// provider, never interpreted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColumnId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A kanban card. `payload` carries domain fields (assignee, due date, etc.)
/// that the reordering engine never inspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    #[serde(flatten)]
    pub payload: serde_json::Value,
}

impl Card {
    pub fn new(id: impl Into<CardId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            payload: serde_json::Value::Object(serde_json::Map::new()),
        }
    }
}

/// A board column. The order of `cards` is the display order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub color: String,
    pub cards: Vec<Card>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: String::new(),
            cards: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_cards(mut self, cards: Vec<Card>) -> Self {
        self.cards = cards;
        self
    }

    /// The ordered card ids of this column.
    pub fn card_ids(&self) -> Vec<CardId> {
        self.cards.iter().map(|c| c.id.clone()).collect()
    }

    /// Position of a card within this column.
    pub fn position_of(&self, card_id: &CardId) -> Option<usize> {
        self.cards.iter().position(|c| &c.id == card_id)
    }
}

/// A completed (or in-progress) reordering of one card.
///
/// `from_index` is the card's position at the moment the drag activated;
/// `to_index` is its final position in the destination column after removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMove {
    pub card_id: CardId,
    pub from_column: ColumnId,
    pub from_index: usize,
    pub to_column: ColumnId,
    pub to_index: usize,
}

/// The authoritative board state: an ordered sequence of columns, each with an
/// ordered sequence of cards.
///
/// Invariant: every card id appears in exactly one column, with no duplicates
/// anywhere on the board. Construction through [`Board::from_columns`]
/// enforces this; mutation goes through the board store or the ordering
/// module, both of which preserve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub columns: Vec<Column>,
}

impl Board {
    /// Builds a board from the data provider's column list, validating the
    /// card-uniqueness invariant.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::new();
        for column in &columns {
            for card in &column.cards {
                if !seen.insert(card.id.clone()) {
                    return Err(DriftboardError::DuplicateCard(card.id.to_string()));
                }
            }
        }
        Ok(Self { columns })
    }

    /// An empty board.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Locates a card, returning its column id and index within that column.
    pub fn find_card(&self, card_id: &CardId) -> Option<(ColumnId, usize)> {
        self.columns.iter().find_map(|col| {
            col.position_of(card_id)
                .map(|index| (col.id.clone(), index))
        })
    }

    /// Borrow a column by id.
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| &c.id == id)
    }

    /// Mutably borrow a column by id.
    pub fn column_mut(&mut self, id: &ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| &c.id == id)
    }

    /// Total number of cards across all columns.
    pub fn card_count(&self) -> usize {
        self.columns.iter().map(|c| c.cards.len()).sum()
    }

    /// Verifies the card-uniqueness invariant over the current state.
    pub fn check_integrity(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for column in &self.columns {
            for card in &column.cards {
                if !seen.insert(&card.id) {
                    return Err(DriftboardError::DuplicateCard(card.id.to_string()));
                }
            }
        }
        Ok(())
    }
}
