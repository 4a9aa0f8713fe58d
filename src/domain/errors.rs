use thiserror::Error;

/// Códigos de error del servicio de autenticación que la UI distingue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    EmailInUse,
    InvalidCredential,
    Other(String),
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0}")]
    Network(String),
    #[error("HTTP error! status: {0}")]
    Http(u16),
    #[error("{0}")]
    Backend(String),
    #[error("auth error: {0:?}")]
    Auth(AuthFailure),
    #[error("session expired, redirected to {0}")]
    SessionExpired(String),
    #[error("No encontrado: {0}")]
    NotFound(String),
    #[error("Entrada inválida: {0}")]
    InvalidInput(String),
    #[error("Error de operación: {0}")]
    OperationFailed(String),
}

impl DomainError {
    /// Texto de estado tal como lo muestra el bucle de captura.
    pub fn status_text(&self) -> String {
        match self {
            DomainError::Backend(msg) => format!("System Error: {msg}"),
            other => format!("Network Error: {other}"),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_text_separates_backend_errors() {
        let backend = DomainError::Backend("Could not decode image".into());
        assert_eq!(backend.status_text(), "System Error: Could not decode image");

        let net = DomainError::Network("connection refused".into());
        assert_eq!(net.status_text(), "Network Error: connection refused");

        assert_eq!(DomainError::Http(502).status_text(), "Network Error: HTTP error! status: 502");
    }
}
