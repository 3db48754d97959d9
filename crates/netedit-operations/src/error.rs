use netedit_engine::EngineError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum OperationError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("unknown operation '{name}' (available: {available})")]
    UnknownOperation { name: String, available: String },

    #[error("invalid arguments for '{operation}'")]
    InvalidPreload {
        operation: &'static str,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, OperationError>;
