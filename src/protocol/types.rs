use crate::error::RouterError;
use crate::protocol::routing_table::ForwardingTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Cost of a path. `Infinity` marks a destination with no known path and
/// orders above every finite cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Cost {
    Finite(u32),
    Infinity,
}

impl Cost {
    pub const ZERO: Cost = Cost::Finite(0);

    pub fn is_finite(self) -> bool {
        matches!(self, Cost::Finite(_))
    }
}

impl Add for Cost {
    type Output = Cost;

    // Overflow saturates to Infinity instead of wrapping.
    fn add(self, rhs: Cost) -> Cost {
        match (self, rhs) {
            (Cost::Finite(a), Cost::Finite(b)) => a.checked_add(b).map_or(Cost::Infinity, Cost::Finite),
            _ => Cost::Infinity,
        }
    }
}

impl From<u32> for Cost {
    fn from(value: u32) -> Self {
        Cost::Finite(value)
    }
}

impl From<Option<u32>> for Cost {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Cost::Infinity, Cost::Finite)
    }
}

impl From<Cost> for Option<u32> {
    fn from(cost: Cost) -> Self {
        match cost {
            Cost::Finite(value) => Some(value),
            Cost::Infinity => None,
        }
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cost::Finite(value) => write!(f, "{}", value),
            Cost::Infinity => f.write_str("INF"),
        }
    }
}

/// Lifecycle of a routing session as seen from outside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Uninitialized,
    Initialized,
    Terminated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initialized => "initialized",
            SessionState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
pub enum TerminationCause {
    /// The relay sent QUIT.
    Quit,
    Failed(RouterError),
}

/// What `ProtocolEngine::start` hands back once the session is over.
#[derive(Debug)]
pub struct SessionReport {
    /// Absent when the session ended before the first cost announcement.
    pub table: Option<ForwardingTable>,
    pub cause: TerminationCause,
}

impl SessionReport {
    pub fn is_clean(&self) -> bool {
        matches!(self.cause, TerminationCause::Quit) && self.table.is_some()
    }

    pub fn error(&self) -> Option<&RouterError> {
        match &self.cause {
            TerminationCause::Failed(e) => Some(e),
            TerminationCause::Quit => None,
        }
    }

    /// Drops the partial table of a failed session and keeps only the error.
    pub fn into_result(self) -> Result<ForwardingTable, RouterError> {
        match (self.cause, self.table) {
            (TerminationCause::Quit, Some(table)) => Ok(table),
            (TerminationCause::Quit, None) => Err(RouterError::NotInitialized),
            (TerminationCause::Failed(e), _) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infinity_orders_above_finite() {
        assert!(Cost::Finite(u32::MAX) < Cost::Infinity);
        assert!(Cost::Finite(3) < Cost::Finite(4));
        assert_eq!(Cost::Infinity.max(Cost::ZERO), Cost::Infinity);
    }

    #[test]
    fn addition_never_wraps() {
        assert_eq!(Cost::Finite(2) + Cost::Finite(1), Cost::Finite(3));
        assert_eq!(Cost::Infinity + Cost::Finite(1), Cost::Infinity);
        assert_eq!(Cost::Finite(1) + Cost::Infinity, Cost::Infinity);
        assert_eq!(Cost::Finite(u32::MAX) + Cost::Finite(1), Cost::Infinity);
    }

    #[test]
    fn infinity_is_null_on_the_wire() {
        let costs = vec![Cost::ZERO, Cost::Infinity, Cost::Finite(7)];
        let json = serde_json::to_string(&costs).unwrap();
        assert_eq!(json, "[0,null,7]");
        let back: Vec<Cost> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, costs);
    }

    #[test]
    fn quit_without_table_is_not_clean() {
        let report = SessionReport { table: None, cause: TerminationCause::Quit };
        assert!(!report.is_clean());
        assert!(report.into_result().is_err());
    }
}
