pub mod protocol;
pub mod network;
pub mod algorithms;
pub mod config;
pub mod error;

use std::sync::Arc;
use tokio::sync::Mutex;

pub use algorithms::bellman_ford::DistanceVectorTable;
pub use config::RouterConfig;
pub use error::RouterError;
pub use protocol::{Cost, EngineHandle, ForwardingTable, ProtocolEngine, SessionReport, SessionState};

/// Index of a router in `[0, N)`.
pub type RouterId = usize;

/// State shared between the receive loop and the periodic update task.
pub type SharedRouterState<W> = Arc<Mutex<protocol::RouterState<W>>>;
