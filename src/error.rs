use thiserror::Error;

#[derive(Error, Debug)]
pub enum CreditoError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("Server responded {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Server { status: u16, message: Option<String> },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No active session. Run `credito login` first.")]
    NoSession,

    #[error("Settings error: {0}")]
    Settings(String),
}

impl CreditoError {
    /// Text shown to the user for this error. Validation failures and
    /// server-provided messages are shown verbatim; everything else falls
    /// back to `generic`.
    pub fn user_message(&self, generic: &str) -> String {
        match self {
            CreditoError::Validation(msg) => msg.clone(),
            CreditoError::Server {
                message: Some(msg), ..
            } if !msg.trim().is_empty() => msg.clone(),
            CreditoError::NoSession => {
                "No se encontró el ID de usuario. Inicia sesión nuevamente.".to_string()
            }
            _ => generic.to_string(),
        }
    }

    /// True for failures that never reached the backend.
    pub fn is_local(&self) -> bool {
        matches!(self, CreditoError::Validation(_) | CreditoError::NoSession)
    }
}

pub type Result<T> = std::result::Result<T, CreditoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins_over_generic() {
        let err = CreditoError::Server {
            status: 400,
            message: Some("Trimestre cerrado".into()),
        };
        assert_eq!(err.user_message("No se pudo guardar."), "Trimestre cerrado");
    }

    #[test]
    fn test_blank_server_message_falls_back() {
        let err = CreditoError::Server {
            status: 500,
            message: Some("  ".into()),
        };
        assert_eq!(err.user_message("No se pudo guardar."), "No se pudo guardar.");
        let err = CreditoError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("No se pudo guardar."), "No se pudo guardar.");
    }

    #[test]
    fn test_transport_errors_use_generic_text() {
        let err = CreditoError::MalformedResponse("expected value".into());
        assert_eq!(err.user_message("Error de conexión"), "Error de conexión");
        assert!(!err.is_local());
    }

    #[test]
    fn test_validation_is_local() {
        let err = CreditoError::Validation("El trimestre ingresado no existe.".into());
        assert!(err.is_local());
        assert_eq!(err.user_message("x"), "El trimestre ingresado no existe.");
    }
}
