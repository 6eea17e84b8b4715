use thiserror::Error;

use crate::store::StoreError;

/// Failure of a pipeline operation.
///
/// Display strings are short Italian messages safe to return to the caller;
/// upstream and persistence details are logged where they happen.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    /// The user has no linked LinkedIn credential.
    #[error("LinkedIn non collegato")]
    Forbidden,

    #[error("{0}")]
    Conflict(&'static str),

    /// Image attachment requested for a draft with no text.
    #[error("Nessun testo disponibile per generare l'immagine")]
    NoContent,

    #[error("{capability} non disponibile: {message}")]
    Upstream {
        capability: &'static str,
        message: String,
    },

    #[error("errore di persistenza: {0}")]
    Persistence(#[from] StoreError),
}

impl PipelineError {
    pub(crate) fn upstream(capability: &'static str, err: impl std::fmt::Display) -> Self {
        let message = err.to_string();
        tracing::error!(capability, error = %message, "upstream capability failed");
        Self::Upstream {
            capability,
            message,
        }
    }

    /// Machine-readable error code for API responses.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::NotFound(_) => "not_found",
            Self::Forbidden => "forbidden",
            Self::Conflict(_) => "conflict",
            Self::NoContent => "bad_request",
            Self::Upstream { .. } => "upstream_error",
            Self::Persistence(_) => "internal_error",
        }
    }

    /// Message suitable for an API response body.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Upstream { .. } => "Servizio esterno non disponibile, riprova più tardi".to_string(),
            Self::Persistence(_) => "Errore interno, riprova più tardi".to_string(),
            other => other.to_string(),
        }
    }
}
