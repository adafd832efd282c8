use serde::{Deserialize, Serialize};
use std::fmt;
use crate::RouterId;
use crate::error::RouterError;
use super::Cost;

/// An endpoint on the relay: the topology server or one of the routers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Peer {
    Server,
    Node(RouterId),
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::Server => f.write_str("server"),
            Peer::Node(id) => write!(f, "router {}", id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacketKind {
    Hello,
    Route,
    Quit,
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PacketKind::Hello => "HELLO",
            PacketKind::Route => "ROUTE",
            PacketKind::Quit => "QUIT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvrPacket {
    pub source: Peer,
    pub dest: Peer,
    pub kind: PacketKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub costs: Option<Vec<Cost>>,
}

impl DvrPacket {
    pub fn hello(source: Peer, dest: Peer) -> Self {
        Self { source, dest, kind: PacketKind::Hello, costs: None }
    }

    pub fn route(source: Peer, dest: Peer, costs: Vec<Cost>) -> Self {
        Self { source, dest, kind: PacketKind::Route, costs: Some(costs) }
    }

    pub fn quit(source: Peer, dest: Peer) -> Self {
        Self { source, dest, kind: PacketKind::Quit, costs: None }
    }

    pub fn from_server(&self) -> bool {
        self.source == Peer::Server
    }

    /// The carried cost vector, or a protocol error when there is none.
    pub fn require_costs(&self) -> Result<&[Cost], RouterError> {
        self.costs.as_deref().ok_or(RouterError::MissingCosts {
            kind: self.kind,
            from: self.source,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(data: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(data)
    }

    pub fn from_slice(data: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(data)
    }
}

impl fmt::Display for DvrPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {} -> {}]", self.kind, self.source, self.dest)?;
        if let Some(costs) = &self.costs {
            let rendered: Vec<String> = costs.iter().map(Cost::to_string).collect();
            write!(f, " [{}]", rendered.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_packet_wire_shape() {
        let packet = DvrPacket::route(
            Peer::Node(1),
            Peer::Node(2),
            vec![Cost::Finite(1), Cost::ZERO, Cost::Infinity],
        );
        let json = packet.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"source":{"node":1},"dest":{"node":2},"kind":"route","costs":[1,0,null]}"#
        );
        assert_eq!(DvrPacket::from_json(&json).unwrap(), packet);
    }

    #[test]
    fn hello_has_no_costs_field() {
        let json = DvrPacket::hello(Peer::Node(0), Peer::Server).to_json().unwrap();
        assert_eq!(json, r#"{"source":{"node":0},"dest":"server","kind":"hello"}"#);
    }

    #[test]
    fn route_without_costs_is_rejected() {
        let packet = DvrPacket::from_json(r#"{"source":"server","dest":{"node":0},"kind":"route"}"#).unwrap();
        assert!(packet.from_server());
        assert!(matches!(
            packet.require_costs(),
            Err(RouterError::MissingCosts { kind: PacketKind::Route, from: Peer::Server })
        ));
    }

    #[test]
    fn display_lists_costs() {
        let packet = DvrPacket::route(Peer::Server, Peer::Node(3), vec![Cost::ZERO, Cost::Infinity]);
        assert_eq!(packet.to_string(), "[ROUTE server -> router 3] [0, INF]");
    }
}
