use thiserror::Error;

#[derive(Debug, Error)]
pub enum EndpointError {
    /// The endpoint did not respond in time or refused the connection
    #[error("endpoint unresponsive: {0}")]
    Transient(String),

    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("no {type_name} contract at {address}")]
    NoContract { type_name: String, address: String },

    #[error("unknown contract type: {0}")]
    UnknownContract(String),

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("abi error: {0}")]
    Abi(String),

    #[error("contract artifact error: {0}")]
    Artifact(String),
}

impl EndpointError {
    /// Retry classifier: only endpoint unavailability is recoverable
    pub fn is_transient(&self) -> bool {
        matches!(self, EndpointError::Transient(_))
    }
}

impl From<reqwest::Error> for EndpointError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            EndpointError::Transient(err.to_string())
        } else if err.is_decode() {
            EndpointError::InvalidResponse(err.to_string())
        } else {
            EndpointError::Transport(err.to_string())
        }
    }
}
