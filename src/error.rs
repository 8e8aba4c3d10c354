use std::path::PathBuf;

/// Failures of the flat JSON snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to write snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot {path} is malformed: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Snapshot writer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Rejections and failures surfaced by the movie list and meeting services.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Index {index} is out of range (list has {len} entries)")]
    IndexOutOfRange { index: i64, len: usize },
    #[error("The list is empty")]
    EmptyList,
    #[error("Invalid title: {0}")]
    InvalidTitle(String),
    #[error("Date `{0}` is not in DD/MM/YYYY format")]
    InvalidDate(String),
    #[error("Time `{0}` is not in HH:MM format")]
    InvalidTime(String),
    #[error(transparent)]
    Persist(#[from] StoreError),
    #[error("Messaging failed: {0}")]
    Messaging(anyhow::Error),
}

impl CommandError {
    /// Text shown to the member who invoked the command.
    pub fn user_message(&self) -> String {
        match self {
            CommandError::IndexOutOfRange { .. } => "❌ Invalid index.".to_string(),
            CommandError::EmptyList => "📂 The list is empty.".to_string(),
            CommandError::InvalidTitle(reason) => format!("❌ {}", reason),
            CommandError::InvalidDate(date) => {
                format!("❌ Invalid date `{}`. Use DD/MM/YYYY.", date)
            }
            CommandError::InvalidTime(time) => format!("❌ Invalid time `{}`. Use HH:MM.", time),
            CommandError::Persist(_) => "❌ Could not save the change. Try again.".to_string(),
            CommandError::Messaging(_) => {
                "❌ Could not talk to Discord. Try again.".to_string()
            }
        }
    }
}

pub type CommandResult<T> = Result<T, CommandError>;
