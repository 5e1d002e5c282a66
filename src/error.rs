use thiserror::Error;

// Unified error type for conjgrad. Numerical outcomes are reported through
// `TerminationStatus`, never through this enum.

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CgError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("configuration error: {0}")]
    Configuration(&'static str),
    #[error("invalid option: {0}")]
    InvalidOption(String),
    #[error("preconditioner failed: {0}")]
    Preconditioner(String),
}
