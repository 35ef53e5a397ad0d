use crate::domain::ModelKind;

/// Errors raised by the fitting core.
///
/// `Validation` is about caller input and aborts an operation before any
/// numeric work. `DomainViolation` is local to one model kind: single-fit
/// operations fail with it, compare/sample-all operations skip that kind.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FitError {
    /// Malformed sample set or request parameters.
    #[error("invalid input: {0}")]
    Validation(String),

    /// The data lies outside the domain the model's linearization needs.
    #[error("{} fit not possible: {reason}", kind.display_name())]
    DomainViolation { kind: ModelKind, reason: String },

    /// A pivot fell below the singularity threshold during elimination.
    #[error("linear system is singular or numerically unstable (pivot {pivot:e} in column {column})")]
    SingularSystem { column: usize, pivot: f64 },
}

impl FitError {
    pub fn validation(message: impl Into<String>) -> Self {
        FitError::Validation(message.into())
    }

    pub fn domain(kind: ModelKind, reason: impl Into<String>) -> Self {
        FitError::DomainViolation {
            kind,
            reason: reason.into(),
        }
    }

    /// Exit code used when this error terminates the binary.
    pub fn exit_code(&self) -> u8 {
        match self {
            FitError::Validation(_) => 3,
            FitError::DomainViolation { .. } | FitError::SingularSystem { .. } => 4,
        }
    }
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
        AppError::new(err.exit_code(), err.to_string())
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
    fn domain_violation_names_model_and_reason() {
        let err = FitError::domain(ModelKind::Exponential, "y values must be positive");
        assert_eq!(
            err.to_string(),
            "Exponential fit not possible: y values must be positive"
        );
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn app_error_keeps_fit_error_exit_code() {
        let app: AppError = FitError::validation("x and y must have the same length").into();
        assert_eq!(app.exit_code(), 3);
        assert!(app.to_string().contains("same length"));
    }
}
