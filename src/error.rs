use thiserror::Error;

/// Hard failures of the fitting core.
///
/// Degenerate rounds and an exhausted budget are not errors: they surface as
/// [`crate::domain::RoundModel::Degenerate`] and
/// [`crate::domain::FitResult::NotFound`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    /// Fewer distinct points than the minimal sample size.
    #[error("need at least {required} distinct points, got {available}")]
    InsufficientPoints { required: usize, available: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match err {
            FitError::InsufficientPoints { .. } => 3,
            FitError::InvalidConfiguration(_) => 2,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let err: AppError = FitError::InsufficientPoints {
            required: 3,
            available: 1,
        }
        .into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.to_string(), "need at least 3 distinct points, got 1");

        let err: AppError = FitError::InvalidConfiguration("ratio".to_string()).into();
        assert_eq!(err.exit_code(), 2);
    }
}
