pub mod client;
pub mod token;

pub use client::{CompletionClient, MockCompletionClient, YandexGptClient};
pub use token::{IamExchanger, IamTokenManager, TokenExchanger};

use thiserror::Error;

/// Credential exchange failures. Fatal to the current request, never
/// retried — a failed exchange must abort the enclosing analysis rather
/// than hand out a stale or empty token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to sign service-account assertion: {0}")]
    Signing(String),

    #[error("IAM endpoint unreachable at {0}")]
    Connection(String),

    #[error("IAM token exchange timed out after {0}s")]
    Timeout(u64),

    #[error("IAM token exchange failed (status {status}): {body}")]
    Exchange { status: u16, body: String },

    #[error("HTTP client error during token exchange: {0}")]
    HttpClient(String),

    #[error("Malformed IAM token response: {0}")]
    MalformedResponse(String),

    #[error("Token state lock poisoned")]
    LockPoisoned,
}

/// Completion call failures. Fatal to the current request, never retried,
/// never cached.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Completion endpoint unreachable at {0}")]
    Connection(String),

    #[error("Completion request timed out after {0}s")]
    Timeout(u64),

    #[error("Completion request failed (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("HTTP client error during completion: {0}")]
    HttpClient(String),

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),
}

/// Either failure leg of one completion round trip.
#[derive(Debug, Error)]
pub enum GptError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
