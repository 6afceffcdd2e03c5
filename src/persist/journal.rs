use crate::domain::board::{Board, CardMove};
use crate::error::{DriftboardError, Result};
use crate::persist::MovePersistence;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// One journal entry: a committed move and when it was recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveRecord {
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub card_move: CardMove,
}

/// File-based persistence: a board snapshot plus an append-only move journal
/// under a `.driftboard` directory.
pub struct FileJournal {
    root_path: PathBuf,
}

impl FileJournal {
    const DRIFTBOARD_DIR: &'static str = ".driftboard";
    const BOARD_FILE: &'static str = "board.json";
    const MOVES_FILE: &'static str = "moves.json";

    /// Creates a new FileJournal instance for the given project root
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self {
            root_path: project_root.as_ref().join(Self::DRIFTBOARD_DIR),
        }
    }

    fn board_file(&self) -> PathBuf {
        self.root_path.join(Self::BOARD_FILE)
    }

    fn moves_file(&self) -> PathBuf {
        self.root_path.join(Self::MOVES_FILE)
    }

    async fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_path.exists() {
            fs::create_dir_all(&self.root_path).await?;
        }
        Ok(())
    }

    /// Creates the .driftboard directory structure with an empty journal.
    pub async fn initialize(&self) -> Result<()> {
        self.ensure_directory_exists().await?;

        if !self.moves_file().exists() {
            fs::write(self.moves_file(), "[]").await?;
        }

        Ok(())
    }

    pub async fn is_initialized(&self) -> bool {
        self.root_path.exists() && self.moves_file().exists()
    }

    /// Saves a board snapshot.
    pub async fn save_board(&self, board: &Board) -> Result<()> {
        self.ensure_directory_exists().await?;

        let json = serde_json::to_string_pretty(board)?;
        fs::write(self.board_file(), json).await?;
        Ok(())
    }

    /// Loads the last saved board snapshot.
    pub async fn load_board(&self) -> Result<Board> {
        let board_file = self.board_file();

        if !board_file.exists() {
            return Err(DriftboardError::JournalNotInitialized);
        }

        let contents = fs::read_to_string(&board_file).await?;
        let board: Board = serde_json::from_str(&contents)?;
        board.check_integrity()?;

        Ok(board)
    }

    /// All recorded moves, oldest first.
    pub async fn entries(&self) -> Result<Vec<MoveRecord>> {
        let moves_file = self.moves_file();

        if !moves_file.exists() {
            return Err(DriftboardError::JournalNotInitialized);
        }

        let contents = fs::read_to_string(&moves_file).await?;
        let records: Vec<MoveRecord> = serde_json::from_str(&contents)?;
        Ok(records)
    }

    async fn append(&self, record: MoveRecord) -> Result<()> {
        if !self.moves_file().exists() {
            return Err(DriftboardError::JournalNotInitialized);
        }

        let mut records = self.entries().await?;
        records.push(record);

        let json = serde_json::to_string_pretty(&records)?;
        fs::write(self.moves_file(), json).await?;
        Ok(())
    }
}

#[async_trait]
impl MovePersistence for FileJournal {
    async fn persist_move(&self, mv: &CardMove) -> Result<()> {
        self.append(MoveRecord {
            recorded_at: Utc::now(),
            card_move: mv.clone(),
        })
        .await
    }
}
