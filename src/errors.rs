use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmortizationError {
    #[error("invalid input: {field}: {reason}")]
    InvalidInput {
        field: String,
        reason: String,
    },

    #[error("calculation error: {message}")]
    Calculation {
        message: String,
    },

    #[error("export failed: {message}")]
    Export {
        message: String,
    },
}

impl AmortizationError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// true for errors the caller should surface to the user and carry on
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AmortizationError::InvalidInput { .. })
    }
}

impl From<csv::Error> for AmortizationError {
    fn from(e: csv::Error) -> Self {
        AmortizationError::Export {
            message: e.to_string(),
        }
    }
}

impl From<std::io::Error> for AmortizationError {
    fn from(e: std::io::Error) -> Self {
        AmortizationError::Export {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::Export {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AmortizationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message() {
        let err = AmortizationError::invalid_input("principal", "must be positive");
        assert_eq!(err.to_string(), "invalid input: principal: must be positive");
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_io_error_maps_to_export() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: AmortizationError = io.into();
        assert!(matches!(err, AmortizationError::Export { .. }));
        assert!(!err.is_invalid_input());
    }
}
