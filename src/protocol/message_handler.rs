use super::{DvrPacket, PacketKind, Peer, RouterState, Session};
use crate::algorithms::bellman_ford::DistanceVectorTable;
use crate::error::RouterError;
use log::{debug, info, warn};

/// What the receive loop should do after a packet has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Continue,
    /// First link costs arrived; periodic updates must be armed.
    Initialized,
    Quit,
}

pub fn handle_packet<W>(state: &mut RouterState<W>, packet: &DvrPacket) -> Result<Dispatch, RouterError> {
    if packet.dest != Peer::Node(state.router_id) {
        debug!("{} is addressed to {}, processing anyway", packet, packet.dest);
    }

    match (packet.kind, packet.source) {
        (PacketKind::Quit, source) => {
            info!("QUIT received from {}", source);
            Ok(Dispatch::Quit)
        }
        (_, Peer::Server) => handle_link_costs(state, packet),
        (PacketKind::Route, Peer::Node(source)) => handle_route(state, source, packet),
        (PacketKind::Hello, Peer::Node(source)) => {
            if matches!(state.session, Session::Uninitialized) {
                warn!("Ignoring HELLO from router {} received before link costs", source);
            } else {
                debug!("Ignoring HELLO from router {}", source);
            }
            Ok(Dispatch::Continue)
        }
    }
}

fn handle_link_costs<W>(state: &mut RouterState<W>, packet: &DvrPacket) -> Result<Dispatch, RouterError> {
    if packet.kind == PacketKind::Hello && packet.costs.is_none() {
        debug!("Ignoring HELLO from server without link costs");
        return Ok(Dispatch::Continue);
    }
    let costs = packet.require_costs()?;

    match &mut state.session {
        Session::Uninitialized => {
            let table = DistanceVectorTable::with_link_costs(state.router_id, costs)?;
            info!(
                "Initialization complete - {} routers, neighbors {:?}",
                table.len(),
                table.neighbors().collect::<Vec<_>>()
            );
            state.session = Session::Initialized(table);
            Ok(Dispatch::Initialized)
        }
        Session::Initialized(table) => {
            table.initialize(costs)?;
            info!("Topology update - link costs reset, neighbors {:?}", table.neighbors().collect::<Vec<_>>());
            Ok(Dispatch::Continue)
        }
        Session::Terminated(_) => Ok(Dispatch::Continue),
    }
}

fn handle_route<W>(state: &mut RouterState<W>, source: usize, packet: &DvrPacket) -> Result<Dispatch, RouterError> {
    let Session::Initialized(table) = &mut state.session else {
        warn!("Ignoring {} received before link costs", packet);
        return Ok(Dispatch::Continue);
    };

    let improved = table.relax(source, packet.require_costs()?)?;
    if improved > 0 {
        info!("Mincost update from router {}: {} routes improved", source, improved);
    } else {
        debug!("No improvement from router {}", source);
    }

    Ok(Dispatch::Continue)
}
