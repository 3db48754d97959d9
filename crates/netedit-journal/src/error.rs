use netedit_core::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum JournalError {
    /// A record did not match the model; every applied record was rolled back.
    #[error("failed to commit transaction '{label}'")]
    CommitFailed {
        label: String,
        #[source]
        source: ModelError,
    },

    #[error("failed to undo '{label}'")]
    UndoFailed {
        label: String,
        #[source]
        source: ModelError,
    },

    #[error("failed to redo '{label}'")]
    RedoFailed {
        label: String,
        #[source]
        source: ModelError,
    },

    #[error("failed to parse session configuration")]
    ConfigParse(#[from] toml::de::Error),

    #[error("invalid session configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, JournalError>;
