//! Error types for JsCloak

use crate::request::RequestId;
use thiserror::Error;

/// Structural problems with client-supplied input. Detected locally, the
/// obfuscator is never invoked when one of these is raised.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("code required")]
    CodeRequired,

    #[error("invalid domain format: {0}")]
    InvalidDomain(String),

    #[error("duplicate domains")]
    DuplicateDomains,
}

/// The obfuscator rejected the input, usually a syntax error in the
/// submitted source.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransformError {
    pub message: String,
}

/// Failures of the external obfuscator call.
#[derive(Error, Debug)]
pub enum ObfuscatorError {
    #[error("{0}")]
    Rejected(String),

    #[error("failed to start obfuscator process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("obfuscator process exited with {status}: {stderr}")]
    Exited { status: String, stderr: String },

    #[error("malformed obfuscator reply: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("tokio task error: {0}")]
    Tokio(#[from] tokio::task::JoinError),
}

impl From<serde_json::Error> for ObfuscatorError {
    fn from(err: serde_json::Error) -> Self {
        ObfuscatorError::Protocol(err.to_string())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandleErrorKind {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transform(#[from] TransformError),
}

/// Error returned by the request handler. Always carries the identifier
/// assigned to the request so failures can be matched with the audit log.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}")]
pub struct HandleError {
    pub request_id: RequestId,
    pub kind: HandleErrorKind,
}

impl HandleError {
    pub fn validation(request_id: RequestId, error: ValidationError) -> Self {
        Self {
            request_id,
            kind: HandleErrorKind::Validation(error),
        }
    }

    pub fn transform(request_id: RequestId, message: impl Into<String>) -> Self {
        Self {
            request_id,
            kind: HandleErrorKind::Transform(TransformError {
                message: message.into(),
            }),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.kind, HandleErrorKind::Validation(_))
    }
}
