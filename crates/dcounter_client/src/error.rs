//! # Client Error Types
//!
//! Failure taxonomy for the synchronization core. Every operation
//! returns [`ClientResult`]; failures are reported to the host, never
//! allowed to escape as panics, and always leave cached state and the
//! provider session in their last-known-good condition.

use thiserror::Error;

/// Errors that can occur in the synchronization core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// No wallet provider is injected into the environment. Fatal for
    /// all operations until the user installs/enables a wallet.
    #[error("no wallet provider available - install or enable a wallet")]
    ProviderUnavailable,

    /// A connection request is already in flight. Retry after the
    /// pending wallet prompt resolves; this is not an error state.
    #[error("a wallet connection request is already pending")]
    RequestAlreadyPending,

    /// The provider failed while establishing the connection.
    #[error("wallet connection failed: {0}")]
    ConnectionFailed(String),

    /// The operation needs a connected account and none is present.
    #[error("no wallet account connected")]
    NotConnected,

    /// A read call failed (transient network/provider issue). The
    /// previous cached value remains authoritative.
    #[error("read call failed: {0}")]
    ReadFailed(String),

    /// The user declined the wallet signature prompt. No state change.
    #[error("wallet signature request rejected by user")]
    UserRejected,

    /// Transaction submission or execution failed. No state change;
    /// previous cached values remain authoritative.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// User-supplied text rejected before any network interaction.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Invalid configuration file or value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A call was constructed for a method the binding does not carry.
    #[error("method not present in contract binding: {0}")]
    UnknownMethod(String),
}

impl ClientError {
    /// Whether the session can recover without user intervention
    /// beyond retrying the action.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::ProviderUnavailable)
    }
}

/// Result type for synchronization core operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(!ClientError::ProviderUnavailable.is_recoverable());
        assert!(ClientError::RequestAlreadyPending.is_recoverable());
        assert!(ClientError::UserRejected.is_recoverable());
        assert!(ClientError::ReadFailed("timeout".into()).is_recoverable());
    }

    #[test]
    fn test_display_messages() {
        let err = ClientError::InvalidInput("not a number: \"abc\"".into());
        assert!(err.to_string().contains("invalid input"));

        let err = ClientError::TransactionFailed("reverted".into());
        assert!(err.to_string().contains("reverted"));
    }
}
