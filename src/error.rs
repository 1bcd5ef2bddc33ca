use thiserror::Error;

/// Why a category operation was skipped.
///
/// None of these are shown to the reader; the category panel drops them
/// silently and they only surface in debug logs and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryError {
    #[error("category name is empty")]
    EmptyName,
    #[error("category {0:?} already exists")]
    Duplicate(String),
    #[error("category name {0:?} is unchanged")]
    Unchanged(String),
    #[error("category {0:?} does not exist")]
    Unknown(String),
    #[error("no category is being renamed")]
    NotRenaming,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("invalid password")]
    InvalidPassword,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BufferError {
    #[error("range {start}..{end} is out of bounds for text of length {len}")]
    InvalidRange { start: usize, end: usize, len: usize },
    #[error("range {next_start}..{next_end} overlaps {first_start}..{first_end}")]
    OverlappingChanges {
        first_start: usize,
        first_end: usize,
        next_start: usize,
        next_end: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("unsupported file type {0:?}, expected an image")]
    UnsupportedMime(String),
    #[error("failed to read image bytes: {0}")]
    Read(String),
    #[error("no editor is open")]
    NoDraft,
}

#[derive(Debug, Error)]
pub enum BlogError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Login(#[from] LoginError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Ingest(#[from] IngestError),
    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),
}
