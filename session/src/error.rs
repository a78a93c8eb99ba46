use thiserror::Error;

/// Failures that stop a session from starting. Reported once, never retried.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scene could not be loaded: {0}")]
    SceneLoad(String),

    #[error("prototype node `{0}` not found in scene")]
    MissingPrototype(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("lane prototypes are not loaded yet")]
    PrototypesNotLoaded,

    #[error("player {0} already exists")]
    DuplicatePlayer(u32),
}
