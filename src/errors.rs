use std::io;
use thiserror::Error;

/// Error type for improperly defined parameters, states and convergence problems.
#[derive(Error, Debug)]
pub enum EosError {
    // errors related to algorithms
    #[error("`{0}` did not converge within the maximum number of iterations.")]
    NotConverged(String),
    #[error("Invalid state in {0}: {1} = {2}.")]
    InvalidState(String, String, f64),

    // errors related to file handling
    #[error(transparent)]
    FileIO(#[from] io::Error),

    // json errors
    #[error(transparent)]
    Serde(#[from] serde_json::Error),

    // errors related to parameter handling
    #[error("The following component(s) were not found: {0}")]
    ComponentsNotFound(String),
    #[error("Incompatible parameters: {0}")]
    IncompatibleParameters(String),
    #[error("Missing parameters: {0}")]
    MissingParameters(String),
}

/// Convenience type for `Result<T, EosError>`.
pub type EosResult<T> = Result<T, EosError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = EosError::MissingParameters(String::from("pc"));
        assert_eq!(err.to_string(), "Missing parameters: pc");

        let err = EosError::InvalidState(String::from("mixture"), String::from("temperature"), -1.0);
        assert!(err.to_string().contains("temperature = -1"));
    }
}
