use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClickerError {
    #[error("add at least one point")]
    NoPoints,
    #[error("accessibility permission is required")]
    PermissionDenied,
    #[error("a run is already in progress")]
    AlreadyRunning,
    #[error("display enumeration failed: {0}")]
    Display(String),
}

pub type Result<T> = std::result::Result<T, ClickerError>;
