use thiserror::Error;

use crate::live::LiveError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
}

/// Operation kinds that carry their own rejection message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateNote,
    UpdateNote,
    DeleteNote,
    RenameGroup,
}

impl Operation {
    fn login_target(self) -> &'static str {
        match self {
            Operation::CreateNote => "create notes",
            Operation::UpdateNote => "update notes",
            Operation::DeleteNote => "delete notes",
            Operation::RenameGroup => "rename groups",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Operation::CreateNote => "create",
            Operation::UpdateNote => "update",
            Operation::DeleteNote => "delete",
            Operation::RenameGroup => "rename",
        }
    }
}

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Must be logged in to {}", .0.login_target())]
    Unauthenticated(Operation),
    #[error("Note not found")]
    NotFound,
    #[error("Cannot {} another user's note", .0.verb())]
    NotOwner(Operation),
    #[error("Note content cannot be empty")]
    EmptyContent,
    #[error("New group name cannot be empty")]
    EmptyGroupName,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Live(#[from] LiveError),
}

