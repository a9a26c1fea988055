use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

/// Errors surfaced by ledger and node operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("missing value: {0}")]
    MissingField(&'static str),

    #[error("chain has no blocks")]
    EmptyChain,

    #[error("invalid peer address: {0}")]
    InvalidPeerAddress(String),

    #[error("proof-of-work search aborted")]
    MiningAborted,

    #[error("chain tip moved while mining ({attempts} attempts)")]
    StaleTip { attempts: u32 },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ResponseError for LedgerError {
    fn status_code(&self) -> StatusCode {
        match self {
            LedgerError::MissingField(_) | LedgerError::InvalidPeerAddress(_) => {
                StatusCode::BAD_REQUEST
            }
            LedgerError::MiningAborted => StatusCode::SERVICE_UNAVAILABLE,
            LedgerError::StaleTip { .. } => StatusCode::CONFLICT,
            LedgerError::EmptyChain | LedgerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).body(self.to_string())
    }
}

/// Failure to retrieve a peer's chain. Always recovered by skipping the peer.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {peer} failed: {source}")]
    Request {
        peer: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{peer} answered with status {status}")]
    Status { peer: String, status: u16 },

    #[error("malformed chain payload from {peer}: {reason}")]
    Malformed { peer: String, reason: String },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
