use serde::{Deserialize, Serialize};
use std::fmt;
use crate::RouterId;
use super::Cost;

/// Final forwarding table produced when a session terminates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardingTable {
    pub router_id: RouterId,
    routes: Vec<RouteEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub destination: RouterId,
    pub cost: Cost,
    pub next_hop: RouterId,
}

impl ForwardingTable {
    pub fn new(router_id: RouterId, min_cost: &[Cost], next_hop: &[RouterId]) -> Self {
        let routes = min_cost
            .iter()
            .zip(next_hop)
            .enumerate()
            .map(|(destination, (&cost, &next_hop))| RouteEntry { destination, cost, next_hop })
            .collect();

        Self { router_id, routes }
    }

    pub fn get_route(&self, destination: RouterId) -> Option<&RouteEntry> {
        self.routes.get(destination)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes.iter()
    }

    pub fn costs(&self) -> Vec<Cost> {
        self.routes.iter().map(|route| route.cost).collect()
    }

    pub fn next_hops(&self) -> Vec<RouterId> {
        self.routes.iter().map(|route| route.next_hop).collect()
    }

    pub fn reachable(&self) -> usize {
        self.routes.iter().filter(|route| route.cost.is_finite()).count()
    }
}

impl fmt::Display for ForwardingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Routing Table at Router #{}", self.router_id)?;
        writeln!(f, "{:>11} {:>6} {:>8}", "destination", "cost", "next hop")?;
        for route in &self.routes {
            writeln!(f, "{:>11} {:>6} {:>8}", route.destination, route.cost.to_string(), route.next_hop)?;
        }
        Ok(())
    }
}
