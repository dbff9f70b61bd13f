use thiserror::Error;

use crate::domain::entities::environment::Environment;

/// Failure modes of entitlement resolution.
///
/// The orchestrator is the only place allowed to recover from one of these
/// (and only from `TransactionNotFound` in production); every other layer
/// surfaces them unchanged.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// A required configuration value was absent at startup. Never raised
    /// per-request.
    #[error("missing configuration value: {0}")]
    ConfigurationMissing(&'static str),

    /// The request body was empty, so no transaction id could be derived.
    #[error("request body does not contain a purchase proof")]
    MalformedBody,

    /// The App Store Server API does not know this transaction id in the
    /// given environment. Non-fatal in production (triggers the sandbox
    /// attempt); fatal in sandbox.
    #[error("transaction not found in {environment}")]
    TransactionNotFound { environment: Environment },

    /// Any other non-success response from the App Store Server API. The
    /// remote status code and error body are passed through unmodified.
    #[error("App Store Server API returned {status}: {message}")]
    RemoteApi {
        status: u16,
        error_code: Option<i64>,
        message: String,
        raw: String,
    },

    /// A signed payload failed cryptographic verification. Unauthorized;
    /// aborts the whole resolution.
    #[error("signed payload verification failed: {0}")]
    SignatureInvalid(String),

    /// A trusted root certificate is missing or unreadable. Fatal at load
    /// time; verification cannot proceed with an incomplete trust set.
    #[error("trusted root certificate unavailable: {0}")]
    CertificateMissing(String),

    #[error("App Store Server API call failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cryptographic operation failed: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    #[error("failed to sign App Store Connect token: {0}")]
    TokenSigning(#[from] jsonwebtoken::errors::Error),
}

impl EntitlementError {
    /// HTTP-like status code for surfacing this error from an embedding
    /// server. Remote API failures pass their original code through.
    pub fn status_code(&self) -> u16 {
        match self {
            EntitlementError::MalformedBody => 400,
            EntitlementError::SignatureInvalid(_) => 401,
            EntitlementError::TransactionNotFound { .. } => 404,
            EntitlementError::RemoteApi { status, .. } => *status,
            EntitlementError::ConfigurationMissing(_)
            | EntitlementError::CertificateMissing(_)
            | EntitlementError::Http(_)
            | EntitlementError::Crypto(_)
            | EntitlementError::TokenSigning(_) => 500,
        }
    }
}
