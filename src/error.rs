use aqargo_shared::FieldErrors;
use aqargo_shared::envelope::EnvelopeError;
use thiserror::Error;

// =========================================================
// 核心错误类型 (Client Errors)
// =========================================================

/// Everything a console operation can fail with.
///
/// The UI never swallows these: list and form screens surface them as a
/// toast or inline message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AdminError {
    /// Transport failure, the request never produced a status code.
    #[error("network error: {0}")]
    Network(String),
    /// 401 from any endpoint. The session has already been dropped.
    #[error("session expired, please sign in again")]
    Unauthorized,
    /// 422 (or a 400 carrying field errors), keyed by form field.
    #[error("{}", .0.first_message().unwrap_or("the submitted data is invalid"))]
    Validation(FieldErrors),
    #[error("not found")]
    NotFound,
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },
    /// Response body did not match any known envelope.
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    /// The owning list page unmounted before a mutation settled.
    #[error("request cancelled")]
    Cancelled,
}

impl AdminError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Machine readable code, used in logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Network(_) => "NETWORK",
            AdminError::Unauthorized => "UNAUTHORIZED",
            AdminError::Validation(_) => "VALIDATION",
            AdminError::NotFound => "NOT_FOUND",
            AdminError::Server { .. } => "SERVER",
            AdminError::Decode(_) => "DECODE",
            AdminError::Storage(_) => "STORAGE",
            AdminError::Cancelled => "CANCELLED",
        }
    }

    /// Worth offering a retry button for.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AdminError::Network(_) | AdminError::Server { .. } | AdminError::Decode(_)
        )
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AdminError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}

impl From<EnvelopeError> for AdminError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            // A 2xx answer that names no record, e.g. `{"data": []}`.
            EnvelopeError::MissingEntity => AdminError::NotFound,
            other => AdminError::Decode(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        AdminError::Decode(e.to_string())
    }
}

pub type AdminResult<T> = std::result::Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_displays_first_field_message() {
        let fields: FieldErrors = [("email", "The email has already been taken.")]
            .into_iter()
            .collect();
        let err = AdminError::Validation(fields);
        assert_eq!(err.to_string(), "The email has already been taken.");
        assert_eq!(
            AdminError::Validation(FieldErrors::new()).to_string(),
            "the submitted data is invalid"
        );
    }

    #[test]
    fn retryable_classification() {
        assert!(AdminError::Network("offline".into()).is_retryable());
        assert!(AdminError::server(500, "boom").is_retryable());
        assert!(!AdminError::Unauthorized.is_retryable());
        assert!(!AdminError::NotFound.is_retryable());
        assert_eq!(AdminError::Cancelled.error_code(), "CANCELLED");
    }

    #[test]
    fn missing_entity_reads_as_not_found() {
        assert_eq!(AdminError::from(EnvelopeError::MissingEntity), AdminError::NotFound);
        assert!(matches!(
            AdminError::from(EnvelopeError::MissingCollection),
            AdminError::Decode(_)
        ));
    }
}
