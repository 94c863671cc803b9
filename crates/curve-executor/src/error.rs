use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("executor is shutting down, new tasks are no longer accepted")]
    ShuttingDown,
}
