use thiserror::Error;

use crate::service::ServiceError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Tree service error: {0}")]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

pub type AppResult<T> = Result<T, AppError>;
