use crate::domain::board::CardMove;
use crate::error::Result;
use async_trait::async_trait;

pub mod journal;

pub use journal::{FileJournal, MoveRecord};

/// Persistence collaborator invoked after a commit.
///
/// The engine assumes nothing about the transport; implementations may call a
/// REST backend, write to disk, or record calls in tests. A returned error
/// triggers rollback of the commit that requested it.
#[async_trait]
pub trait MovePersistence: Send + Sync {
    /// Records a committed move.
    async fn persist_move(&self, mv: &CardMove) -> Result<()>;
}
