use crate::RouterId;

/// Errors that end a routing session.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    #[error("failed to connect to relay {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] std::io::Error),

    #[error("relay closed the connection")]
    ConnectionClosed,

    #[error("session ended before any link costs were received")]
    NotInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("cost vector length {actual} does not match network size {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("router id {router_id} is outside a network of {size} nodes")]
    RouterIdOutOfRange { router_id: RouterId, size: usize },

    #[error("announcement from {source_id} is outside a network of {size} nodes")]
    SourceOutOfRange { source_id: RouterId, size: usize },

    #[error("link cost to self must be 0, got {cost}")]
    SelfCostNotZero { cost: crate::Cost },

    #[error("{kind} message from {from} carries no cost vector")]
    MissingCosts {
        kind: crate::protocol::PacketKind,
        from: crate::protocol::Peer,
    },
}

impl RouterError {
    /// True for errors raised by a bad payload rather than the channel itself.
    pub fn is_protocol_violation(&self) -> bool {
        !matches!(
            self,
            RouterError::Connect { .. }
                | RouterError::Transport(_)
                | RouterError::ConnectionClosed
                | RouterError::NotInitialized
                | RouterError::InvalidConfig(_)
        )
    }
}
