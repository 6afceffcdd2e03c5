pub mod board;
pub mod ordering;

pub use board::{Board, Card, CardId, CardMove, Column, ColumnId};
pub use ordering::{apply_move, insertion_index, DropTarget};
