//! Distance-vector table and the Bellman-Ford relaxation step.
//!
//! No loop prevention (split horizon, poison reverse) is applied, so stale
//! announcements after a link loss can count to infinity.

use crate::RouterId;
use crate::error::RouterError;
use crate::protocol::{Cost, ForwardingTable};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceVectorTable {
    router_id: RouterId,
    link_cost: Vec<Cost>,
    min_cost: Vec<Cost>,
    next_hop: Vec<RouterId>,
}

impl DistanceVectorTable {
    /// An empty table; the network size is learned on the first `initialize`.
    pub fn new(router_id: RouterId) -> Self {
        Self {
            router_id,
            link_cost: Vec::new(),
            min_cost: Vec::new(),
            next_hop: Vec::new(),
        }
    }

    pub fn with_link_costs(router_id: RouterId, link_cost: &[Cost]) -> Result<Self, RouterError> {
        let mut table = Self::new(router_id);
        table.initialize(link_cost)?;
        Ok(table)
    }

    /// Replaces all state with a fresh link-cost vector. Nothing learned under
    /// the previous vector survives.
    pub fn initialize(&mut self, link_cost: &[Cost]) -> Result<(), RouterError> {
        if self.is_initialized() && link_cost.len() != self.len() {
            return Err(RouterError::LengthMismatch {
                expected: self.len(),
                actual: link_cost.len(),
            });
        }

        match link_cost.get(self.router_id) {
            None => {
                return Err(RouterError::RouterIdOutOfRange {
                    router_id: self.router_id,
                    size: link_cost.len(),
                });
            }
            Some(&cost) if cost != Cost::ZERO => return Err(RouterError::SelfCostNotZero { cost }),
            Some(_) => {}
        }

        self.link_cost = link_cost.to_vec();
        self.min_cost = link_cost.to_vec();
        self.next_hop = (0..link_cost.len()).collect();
        Ok(())
    }

    /// Relaxes every destination through `source` using its announced vector.
    /// Returns the number of destinations whose cost improved.
    pub fn relax(&mut self, source: RouterId, announced: &[Cost]) -> Result<usize, RouterError> {
        if announced.len() != self.len() {
            return Err(RouterError::LengthMismatch {
                expected: self.len(),
                actual: announced.len(),
            });
        }

        let link = match self.link_cost.get(source) {
            Some(&link) => link,
            None => {
                return Err(RouterError::SourceOutOfRange {
                    source_id: source,
                    size: self.len(),
                });
            }
        };

        // Not a neighbor: nothing can be learned through it.
        if !link.is_finite() {
            return Ok(0);
        }

        let mut improved = 0;
        for (destination, &via) in announced.iter().enumerate() {
            let candidate = via + link;
            if candidate < self.min_cost[destination] {
                self.min_cost[destination] = candidate;
                self.next_hop[destination] = source;
                improved += 1;
            }
        }

        Ok(improved)
    }

    pub fn snapshot(&self) -> Vec<Cost> {
        self.min_cost.clone()
    }

    /// Routers with a finite direct link, excluding this one.
    pub fn neighbors(&self) -> impl Iterator<Item = RouterId> + '_ {
        self.link_cost
            .iter()
            .enumerate()
            .filter(|&(id, cost)| id != self.router_id && cost.is_finite())
            .map(|(id, _)| id)
    }

    pub fn forwarding_table(&self) -> ForwardingTable {
        ForwardingTable::new(self.router_id, &self.min_cost, &self.next_hop)
    }

    pub fn router_id(&self) -> RouterId {
        self.router_id
    }

    pub fn link_cost(&self) -> &[Cost] {
        &self.link_cost
    }

    pub fn min_cost(&self) -> &[Cost] {
        &self.min_cost
    }

    pub fn next_hop(&self) -> &[RouterId] {
        &self.next_hop
    }

    pub fn len(&self) -> usize {
        self.link_cost.len()
    }

    pub fn is_initialized(&self) -> bool {
        !self.link_cost.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INF: Cost = Cost::Infinity;

    fn costs(values: &[u32]) -> Vec<Cost> {
        values.iter().copied().map(Cost::Finite).collect()
    }

    #[test]
    fn initialize_copies_link_costs_and_identity_next_hops() {
        let link = vec![Cost::ZERO, Cost::Finite(5), INF, Cost::Finite(2)];
        let table = DistanceVectorTable::with_link_costs(0, &link).unwrap();

        assert_eq!(table.link_cost(), link.as_slice());
        assert_eq!(table.min_cost(), link.as_slice());
        assert_eq!(table.next_hop(), &[0, 1, 2, 3]);
        assert_eq!(table.neighbors().collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn relax_takes_strictly_better_paths_only() {
        let mut table = DistanceVectorTable::with_link_costs(0, &costs(&[0, 1, 4])).unwrap();

        let improved = table.relax(1, &costs(&[1, 0, 2])).unwrap();

        assert_eq!(improved, 1);
        assert_eq!(table.min_cost(), costs(&[0, 1, 3]).as_slice());
        assert_eq!(table.next_hop(), &[0, 1, 1]);
    }

    #[test]
    fn relax_through_unreachable_link_is_skipped() {
        let mut table = DistanceVectorTable::with_link_costs(0, &[Cost::ZERO, Cost::Finite(9), INF]).unwrap();
        let before = table.clone();

        assert_eq!(table.relax(2, &costs(&[0, 0, 0])).unwrap(), 0);
        assert_eq!(table, before);
    }

    #[test]
    fn relax_without_improvement_changes_nothing() {
        let mut table = DistanceVectorTable::with_link_costs(1, &costs(&[1, 0, 1])).unwrap();
        let before = table.clone();

        assert_eq!(table.relax(0, &[Cost::ZERO, Cost::Finite(1), INF]).unwrap(), 0);
        assert_eq!(table, before);
    }

    #[test]
    fn relax_never_increases_a_cost() {
        let mut table = DistanceVectorTable::with_link_costs(0, &[Cost::ZERO, Cost::Finite(2), Cost::Finite(3), INF]).unwrap();
        let announcements = [
            (1, costs(&[2, 0, 1, 7])),
            (2, costs(&[3, 1, 0, 1])),
            (1, vec![Cost::Finite(2), Cost::ZERO, INF, INF]),
            (2, costs(&[9, 9, 0, 50])),
        ];

        let mut previous = table.snapshot();
        for (source, announced) in &announcements {
            table.relax(*source, announced).unwrap();
            let current = table.snapshot();
            assert!(current.iter().zip(&previous).all(|(now, before)| now <= before));
            previous = current;
        }

        assert_eq!(table.min_cost(), costs(&[0, 2, 3, 4]).as_slice());
        assert_eq!(table.next_hop(), &[0, 1, 2, 2]);
    }

    #[test]
    fn reinitialize_discards_learned_routes() {
        let mut table = DistanceVectorTable::with_link_costs(0, &costs(&[0, 1, 10])).unwrap();
        table.relax(1, &costs(&[1, 0, 1])).unwrap();
        assert_eq!(table.min_cost()[2], Cost::Finite(2));

        table.initialize(&[Cost::ZERO, INF, Cost::Finite(7)]).unwrap();

        assert_eq!(table.min_cost(), &[Cost::ZERO, INF, Cost::Finite(7)]);
        assert_eq!(table.next_hop(), &[0, 1, 2]);
        assert_eq!(table.neighbors().collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn malformed_vectors_leave_state_untouched() {
        let mut table = DistanceVectorTable::with_link_costs(0, &costs(&[0, 1, 4])).unwrap();
        let before = table.clone();

        assert!(matches!(
            table.relax(1, &costs(&[1, 0])),
            Err(RouterError::LengthMismatch { expected: 3, actual: 2 })
        ));
        assert!(matches!(
            table.relax(5, &costs(&[1, 0, 0])),
            Err(RouterError::SourceOutOfRange { source_id: 5, size: 3 })
        ));
        assert!(matches!(
            table.initialize(&costs(&[0, 1, 4, 4])),
            Err(RouterError::LengthMismatch { expected: 3, actual: 4 })
        ));
        assert_eq!(table, before);
    }

    #[test]
    fn initialize_validates_self_entry() {
        assert!(matches!(
            DistanceVectorTable::with_link_costs(3, &costs(&[0, 1])),
            Err(RouterError::RouterIdOutOfRange { router_id: 3, size: 2 })
        ));
        assert!(matches!(
            DistanceVectorTable::with_link_costs(1, &costs(&[1, 2])),
            Err(RouterError::SelfCostNotZero { cost: Cost::Finite(2) })
        ));
    }

    #[test]
    fn triangle_converges_to_shortest_paths() {
        // 0 --1-- 1 --1-- 2, plus a direct 0 --4-- 2 edge.
        let mut r0 = DistanceVectorTable::with_link_costs(0, &costs(&[0, 1, 4])).unwrap();
        let mut r1 = DistanceVectorTable::with_link_costs(1, &costs(&[1, 0, 1])).unwrap();
        let mut r2 = DistanceVectorTable::with_link_costs(2, &costs(&[4, 1, 0])).unwrap();

        for _ in 0..2 {
            let (s0, s1, s2) = (r0.snapshot(), r1.snapshot(), r2.snapshot());
            r0.relax(1, &s1).unwrap();
            r0.relax(2, &s2).unwrap();
            r1.relax(0, &s0).unwrap();
            r1.relax(2, &s2).unwrap();
            r2.relax(0, &s0).unwrap();
            r2.relax(1, &s1).unwrap();
        }

        assert_eq!(r0.forwarding_table().costs(), costs(&[0, 1, 2]));
        assert_eq!(r0.forwarding_table().next_hops(), vec![0, 1, 1]);
        assert_eq!(r2.forwarding_table().costs(), costs(&[2, 1, 0]));
        assert_eq!(r2.forwarding_table().next_hops(), vec![1, 1, 2]);
        assert_eq!(r1.forwarding_table().next_hops(), vec![0, 1, 2]);
    }
}
