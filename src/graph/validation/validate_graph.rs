// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating the acyclicity of a
//! [`NetworkGraph`][crate::NetworkGraph].

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};

use crate::element::{Element, ElementId};
use crate::graph_traits::Geodesic;

use super::GridValidator;

impl<G> GridValidator<'_, G>
where
    G: Geodesic,
{
    /// Builds a directed graph with an edge for every link between two
    /// existing elements, pointing in the direction of power flow.
    fn flow_graph(&self) -> DiGraph<&ElementId, ()> {
        let mut graph = DiGraph::new();
        let indices = self
            .graph
            .elements
            .keys()
            .map(|id| (id, graph.add_node(id)))
            .collect::<HashMap<_, _>>();

        let mut edges = HashSet::new();
        for element in self.graph.elements() {
            let links: Vec<(&ElementId, &ElementId)> = match element {
                Element::Pdu(pdu) => pdu
                    .cables_out
                    .iter()
                    .map(|c| (&pdu.id, c))
                    .chain(pdu.cable_in.iter().map(|c| (c, &pdu.id)))
                    .collect(),
                Element::Cable(cable) => cable
                    .pdu_from
                    .iter()
                    .map(|p| (p, &cable.id))
                    .chain(cable.pdu_to.iter().map(|p| (&cable.id, p)))
                    .collect(),
            };
            for (from, to) in links {
                if let (Some(from), Some(to)) = (indices.get(from), indices.get(to)) {
                    if edges.insert((*from, *to)) {
                        graph.add_edge(*from, *to, ());
                    }
                }
            }
        }
        graph
    }

    /// Validates that there are no cycles in the graph.
    ///
    /// If a cycle is detected, the returned failure lists the elements in the
    /// cycle, starting from the one with the smallest id.
    pub(super) fn validate_acyclicity(&self) -> Result<(), String> {
        let graph = self.flow_graph();
        let Err(cycle) = petgraph::algo::toposort(&graph, None) else {
            return Ok(());
        };

        let start = cycle.node_id();
        let mut visited = HashSet::new();
        let Some(mut members) = find_path_back(&graph, start, start, &mut visited) else {
            return Err(format!("Cycle detected at {}", graph[start]));
        };

        if let Some(smallest) = members
            .iter()
            .enumerate()
            .min_by_key(|(_, idx)| graph[**idx])
            .map(|(pos, _)| pos)
        {
            members.rotate_left(smallest);
        }
        let mut names = members
            .iter()
            .map(|idx| graph[*idx].to_string())
            .collect::<Vec<_>>();
        names.push(graph[members[0]].to_string());

        Err(format!("Cycle detected: {}", names.join(" -> ")))
    }
}

/// Returns the nodes on a path from `node` back to `target`, starting with
/// `node`.
fn find_path_back(
    graph: &DiGraph<&ElementId, ()>,
    node: NodeIndex,
    target: NodeIndex,
    visited: &mut HashSet<NodeIndex>,
) -> Option<Vec<NodeIndex>> {
    if !visited.insert(node) {
        return None;
    }
    for successor in graph.neighbors_directed(node, petgraph::Direction::Outgoing) {
        if successor == target {
            return Some(vec![node]);
        }
        if let Some(mut rest) = find_path_back(graph, successor, target, visited) {
            rest.insert(0, node);
            return Some(rest);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use crate::element::{Cable, Pdu, Point};
    use crate::graph::test_utils::GridBuilder;
    use crate::size_catalog::PowerSize;
    use crate::snapshot::Snapshot;
    use crate::{Error, GridConfig, NetworkGraph};

    #[test]
    fn test_acyclicity_validation() -> Result<(), Error> {
        let mut builder = GridBuilder::new();
        let source = builder.source(PowerSize::ThreePhase63);
        let a = builder.pdu(PowerSize::ThreePhase32);
        builder.connect(&source, PowerSize::ThreePhase32, 10.0, &a);
        assert!(builder.build(None)?.check_integrity().is_ok());

        let b = builder.pdu(PowerSize::ThreePhase32);
        let c = builder.pdu(PowerSize::ThreePhase32);
        builder.connect(&b, PowerSize::ThreePhase32, 10.0, &c);
        builder.connect(&c, PowerSize::ThreePhase32, 10.0, &b);
        let graph = builder.build(None)?;

        assert_eq!(
            graph.check_integrity(),
            Err(Error::invalid_graph(
                "Cycle detected: cable-5 -> pdu-4 -> cable-6 -> pdu-3 -> cable-5"
            ))
        );
        Ok(())
    }

    #[test]
    fn test_asymmetric_links() -> Result<(), Error> {
        let origin = Point::new(0.0, 0.0);
        let source = Pdu::new("pdu-1", PowerSize::ThreePhase63, origin).with_power_source();
        let leaf = Pdu::new("pdu-2", PowerSize::ThreePhase32, origin);
        let mut cable = Cable::new("cable-1", PowerSize::ThreePhase32, vec![origin, origin]);
        cable.pdu_from = Some("pdu-1".into());
        cable.pdu_to = Some("pdu-2".into());

        let graph = NetworkGraph::try_new(
            Snapshot::new(vec![source.into(), leaf.into(), cable.into()]),
            GridConfig::default(),
        )?;

        // The missing output link is restored on load, the missing input
        // link is not.
        assert_eq!(
            graph.check_integrity(),
            Err(Error::invalid_graph(
                "Cable:cable-1 feeds PDU:pdu-2, which is not fed from it."
            ))
        );
        Ok(())
    }

    #[test]
    fn test_dangling_links() -> Result<(), Error> {
        let origin = Point::new(0.0, 0.0);
        let mut leaf = Pdu::new("pdu-1", PowerSize::ThreePhase32, origin);
        leaf.cable_in = Some("cable-9".into());
        leaf.cables_out = vec!["cable-8".into()];

        let graph = NetworkGraph::try_new(Snapshot::new(vec![leaf.into()]), GridConfig::default())?;
        assert_eq!(
            graph.check_integrity(),
            Err(Error::invalid_graph(
                "PDU:pdu-1 is fed from cable-9, which is not a Cable. \
                 PDU:pdu-1 lists cable-8 in its outputs, which is not a Cable."
            ))
        );
        Ok(())
    }
}
