use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read script '{path}'")]
    ReadScript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse script '{path}'")]
    ParseScript {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid script")]
    InvalidScript(#[source] toml::de::Error),

    #[error("invalid model")]
    Model(#[from] netedit_core::ModelError),

    #[error("undo history error")]
    Journal(#[from] netedit_journal::JournalError),

    #[error("operation failed to start")]
    Operation(#[from] netedit_operations::OperationError),

    #[error("engine error")]
    Engine(#[from] netedit_engine::EngineError),

    #[error("failed to write the model")]
    WriteModel(#[from] toml::ser::Error),

    #[error("script step {index} ('{operation}') ran out of answers at step '{step}'")]
    AnswersExhausted {
        index: usize,
        operation: &'static str,
        step: &'static str,
    },

    #[error("interactive mode requires a terminal")]
    NotATty,

    #[error("prompt failed")]
    Prompt(#[from] dialoguer::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
