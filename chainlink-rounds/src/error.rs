//! Error types for feed lookups, RPC reads and fixture output.

use std::time::Duration;

/// Broad failure class, used by callers to report what went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input: unknown network, missing or malformed endpoint, bad round count.
    Configuration,
    /// The RPC call failed or did not answer in time.
    Network,
    /// The feed answered with data that breaks round sequencing.
    Data,
    /// Writing the fixture failed.
    Io,
}

/// Errors returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The network name is not in the registry.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// At least one round must be requested.
    #[error("round count must be at least 1, got {0}")]
    InvalidRoundCount(usize),

    /// No RPC endpoint was configured for the network.
    #[error("no RPC endpoint configured for {0}")]
    MissingRpc(String),

    /// The RPC endpoint could not be parsed as a URL.
    #[error("invalid RPC URL {url}: {reason}")]
    InvalidRpcUrl {
        /// The offending URL after template expansion.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A contract read failed (transport error, revert or undecodable return data).
    #[error("contract call failed: {0}")]
    Contract(#[from] alloy::contract::Error),

    /// A contract read did not complete within the request timeout.
    #[error("{call} timed out after {timeout:?}")]
    Timeout {
        /// Name of the contract function.
        call: &'static str,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// `getRoundData` answered for a different round than requested.
    #[error("requested round {requested} but feed returned round {returned}")]
    RoundMismatch {
        /// Round ID passed to `getRoundData`.
        requested: String,
        /// Round ID found in the response.
        returned: String,
    },

    /// The round cursor reached zero before enough rounds were collected.
    #[error("round history exhausted after {collected} of {wanted} rounds")]
    RoundUnderflow {
        /// Records gathered so far.
        collected: usize,
        /// Records requested.
        wanted: usize,
    },

    /// Filesystem error while writing output.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownNetwork(_)
            | Self::InvalidRoundCount(_)
            | Self::MissingRpc(_)
            | Self::InvalidRpcUrl { .. } => ErrorKind::Configuration,
            Self::Contract(_) | Self::Timeout { .. } => ErrorKind::Network,
            Self::RoundMismatch { .. } | Self::RoundUnderflow { .. } => ErrorKind::Data,
            Self::Io(_) | Self::Json(_) => ErrorKind::Io,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
