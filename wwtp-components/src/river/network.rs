//! River network
//!
//! Reaches form a directed acyclic graph flowing downstream. A reach is either a
//! root, fed only by its lateral inflow, or a confluence of exactly two upstream
//! reaches. Any reach may also receive a plant discharge.
//!
//! Evaluation pulls reaches in dependency order: on every pass any reach whose
//! upstream reaches are all computed is mixed and degraded. A pass that makes
//! no progress means the graph has a cycle.

use super::reach::{Reach, ReachHydraulics};
use crate::parameters::Degradation;
use log::debug;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::{Direction, Graph};
use std::collections::HashMap;
use wwtp_core::errors::{WwtpError, WwtpResult};
use wwtp_core::stream::{Component, Stream};

/// Upstream reaches a confluence joins
const CONFLUENCE_PARENTS: usize = 2;

/// Handle of a reach inside a [`RiverNetwork`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReachId(NodeIndex);

#[derive(Debug, Clone)]
struct ReachNode {
    reach: Reach,
    lateral: Option<Stream>,
    discharge: Option<Stream>,
}

/// Computed state of one reach
#[derive(Debug, Clone, PartialEq)]
pub struct ReachOutput {
    /// Mixed stream entering the reach
    pub inflow: Stream,
    /// Stream leaving the reach after degradation
    pub outflow: Stream,
    pub hydraulics: ReachHydraulics,
}

/// Every reach's computed state
#[derive(Debug, Clone, Default)]
pub struct NetworkOutput {
    reaches: HashMap<ReachId, ReachOutput>,
}

impl NetworkOutput {
    pub fn get(&self, id: ReachId) -> Option<&ReachOutput> {
        self.reaches.get(&id)
    }

    pub fn len(&self) -> usize {
        self.reaches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reaches.is_empty()
    }
}

/// Directed graph of river reaches
#[derive(Debug, Clone, Default)]
pub struct RiverNetwork {
    graph: Graph<ReachNode, ()>,
}

impl RiverNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a reach. Roots need a `lateral` inflow; a confluence may also have one.
    pub fn add_reach(&mut self, reach: Reach, lateral: Option<Stream>) -> ReachId {
        ReachId(self.graph.add_node(ReachNode {
            reach,
            lateral,
            discharge: None,
        }))
    }

    /// Route the outflow of `upstream` into `downstream`.
    pub fn connect(&mut self, upstream: ReachId, downstream: ReachId) -> WwtpResult<()> {
        self.node(upstream)?;
        self.node(downstream)?;
        if upstream == downstream {
            return Err(WwtpError::Network(format!(
                "reach '{}' cannot flow into itself",
                self.graph[upstream.0].reach.name
            )));
        }
        if self.children(upstream) > 0 {
            return Err(WwtpError::Network(format!(
                "reach '{}' already flows into another reach",
                self.graph[upstream.0].reach.name
            )));
        }
        if self.parents(downstream).len() >= CONFLUENCE_PARENTS {
            return Err(WwtpError::Network(format!(
                "reach '{}' already joins {CONFLUENCE_PARENTS} upstream reaches",
                self.graph[downstream.0].reach.name
            )));
        }
        self.graph.add_edge(upstream.0, downstream.0, ());
        Ok(())
    }

    /// Discharge a plant effluent into a reach, replacing any earlier discharge.
    pub fn set_discharge(&mut self, id: ReachId, effluent: Stream) -> WwtpResult<()> {
        self.node(id)?;
        self.graph[id.0].discharge = Some(effluent);
        Ok(())
    }

    pub fn reach(&self, id: ReachId) -> Option<&Reach> {
        self.graph.node_weight(id.0).map(|node| &node.reach)
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Evaluate every reach, degrading the listed components along the way.
    pub fn evaluate(
        &self,
        degradation: &HashMap<Component, Degradation>,
    ) -> WwtpResult<NetworkOutput> {
        self.validate()?;

        let mut output = NetworkOutput::default();
        let mut pending: Vec<NodeIndex> = self.graph.node_indices().collect();
        while !pending.is_empty() {
            let ready = pending.iter().position(|&index| {
                self.parents(ReachId(index))
                    .iter()
                    .all(|parent| output.reaches.contains_key(parent))
            });
            let Some(position) = ready else {
                let names: Vec<&str> = pending
                    .iter()
                    .map(|&index| self.graph[index].reach.name.as_str())
                    .collect();
                return Err(WwtpError::Network(format!(
                    "reaches [{}] depend on each other",
                    names.join(", ")
                )));
            };
            let index = pending.swap_remove(position);
            let id = ReachId(index);
            let node = &self.graph[index];

            let mut inflow: Option<Stream> = None;
            let upstream = self
                .parents(id)
                .into_iter()
                .filter_map(|parent| output.reaches.get(&parent).map(|o| o.outflow));
            for stream in upstream.chain(node.lateral).chain(node.discharge) {
                inflow = Some(match inflow {
                    Some(mixed) => mixed.combine(&stream)?,
                    None => stream,
                });
            }
            let inflow = inflow.ok_or_else(|| {
                WwtpError::Network(format!("reach '{}' receives no water", node.reach.name))
            })?;

            let outflow = node.reach.degrade(&inflow, degradation)?;
            let hydraulics = node.reach.hydraulics()?;
            debug!(
                "reach '{}': {:.4} ML/d in, HRT {:.2} min",
                node.reach.name,
                inflow.flow(),
                hydraulics.residence_time
            );
            output.reaches.insert(
                id,
                ReachOutput {
                    inflow,
                    outflow,
                    hydraulics,
                },
            );
        }
        Ok(output)
    }

    /// Graphviz rendering of the network
    pub fn to_dot(&self) -> String {
        let dot = Dot::with_attr_getters(
            &self.graph,
            &[Config::NodeNoLabel, Config::EdgeNoLabel],
            &|_, _| String::new(),
            &|_, (_, node)| {
                let escaped = node.reach.name.replace('\\', "\\\\").replace('"', "\\\"");
                format!("label = \"{escaped}\"")
            },
        );
        format!("{dot:?}")
    }

    /// Roots need a lateral inflow, every other reach exactly two upstream reaches.
    fn validate(&self) -> WwtpResult<()> {
        for index in self.graph.node_indices() {
            let node = &self.graph[index];
            match self.parents(ReachId(index)).len() {
                0 if node.lateral.is_none() => {
                    return Err(WwtpError::Network(format!(
                        "root reach '{}' has no lateral inflow",
                        node.reach.name
                    )))
                }
                0 | CONFLUENCE_PARENTS => {}
                n => {
                    return Err(WwtpError::Network(format!(
                        "reach '{}' joins {n} upstream reaches, a confluence joins {CONFLUENCE_PARENTS}",
                        node.reach.name
                    )))
                }
            }
        }
        Ok(())
    }

    fn node(&self, id: ReachId) -> WwtpResult<&ReachNode> {
        self.graph
            .node_weight(id.0)
            .ok_or_else(|| WwtpError::Network(format!("no reach with index {}", id.0.index())))
    }

    fn parents(&self, id: ReachId) -> Vec<ReachId> {
        self.graph
            .edges_directed(id.0, Direction::Incoming)
            .map(|edge| ReachId(edge.source()))
            .collect()
    }

    fn children(&self, id: ReachId) -> usize {
        self.graph.edges_directed(id.0, Direction::Outgoing).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ReachParameters;
    use approx::assert_relative_eq;
    use wwtp_core::stream::Components;

    fn water(flow: f64, nh4: f64) -> Stream {
        Stream::new(
            flow,
            Components {
                s_nh4: nh4,
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn reach(name: &str) -> Reach {
        Reach::new(name, ReachParameters::default())
    }

    /// Two headwaters joining into one reach
    fn confluence() -> (RiverNetwork, ReachId, ReachId, ReachId) {
        let mut network = RiverNetwork::new();
        let left = network.add_reach(reach("left"), Some(water(10.0, 2.0)));
        let right = network.add_reach(reach("right"), Some(water(30.0, 6.0)));
        let joined = network.add_reach(reach("joined"), None);
        network.connect(left, joined).unwrap();
        network.connect(right, joined).unwrap();
        (network, left, right, joined)
    }

    // ===== Mixing =====

    #[test]
    fn test_confluence_mixes_parents() {
        let (network, _, _, joined) = confluence();
        let output = network.evaluate(&HashMap::new()).unwrap();
        let reach = output.get(joined).unwrap();
        assert_relative_eq!(reach.inflow.flow(), 40.0);
        assert_relative_eq!(reach.outflow.get(Component::Nh4), (20.0 + 180.0) / 40.0);
        assert_eq!(output.len(), 3);
    }

    #[test]
    fn test_discharge_mixes_into_reach() {
        let (mut network, left, _, joined) = confluence();
        network.set_discharge(left, water(10.0, 40.0)).unwrap();
        let output = network.evaluate(&HashMap::new()).unwrap();
        assert_relative_eq!(output.get(left).unwrap().outflow.get(Component::Nh4), 21.0);
        assert_relative_eq!(output.get(joined).unwrap().inflow.flow(), 50.0);
    }

    #[test]
    fn test_degradation_applied_downstream() {
        let (network, _, _, joined) = confluence();
        let degradation = HashMap::from([(
            Component::Nh4,
            Degradation {
                r_20: 1e-6,
                ..Default::default()
            },
        )]);
        let output = network.evaluate(&degradation).unwrap();
        let reach = output.get(joined).unwrap();
        assert!(reach.outflow.get(Component::Nh4) < reach.inflow.get(Component::Nh4));
        assert!(reach.inflow.get(Component::Nh4) < 5.0);
    }

    #[test]
    fn test_evaluation_order_independent_of_insertion() {
        let mut network = RiverNetwork::new();
        let joined = network.add_reach(reach("joined"), None);
        let right = network.add_reach(reach("right"), Some(water(30.0, 6.0)));
        let left = network.add_reach(reach("left"), Some(water(10.0, 2.0)));
        network.connect(left, joined).unwrap();
        network.connect(right, joined).unwrap();
        let output = network.evaluate(&HashMap::new()).unwrap();
        assert_relative_eq!(output.get(joined).unwrap().inflow.flow(), 40.0);
    }

    // ===== Structure =====

    #[test]
    fn test_root_without_inflow_rejected() {
        let mut network = RiverNetwork::new();
        network.add_reach(reach("dry"), None);
        let err = network.evaluate(&HashMap::new()).unwrap_err();
        assert!(matches!(err, WwtpError::Network(message) if message.contains("dry")));
    }

    #[test]
    fn test_single_parent_rejected() {
        let mut network = RiverNetwork::new();
        let up = network.add_reach(reach("up"), Some(water(1.0, 1.0)));
        let down = network.add_reach(reach("down"), None);
        network.connect(up, down).unwrap();
        assert!(network.evaluate(&HashMap::new()).is_err());
    }

    #[test]
    fn test_third_parent_rejected() {
        let (mut network, _, _, joined) = confluence();
        let extra = network.add_reach(reach("extra"), Some(water(1.0, 1.0)));
        assert!(network.connect(extra, joined).is_err());
    }

    #[test]
    fn test_reach_flows_into_one_reach() {
        let (mut network, left, _, _) = confluence();
        let other = network.add_reach(reach("other"), None);
        assert!(network.connect(left, other).is_err());
        assert!(network.connect(other, other).is_err());
    }

    #[test]
    fn test_cycle_detected() {
        let mut network = RiverNetwork::new();
        let a = network.add_reach(reach("a"), Some(water(1.0, 1.0)));
        let b = network.add_reach(reach("b"), Some(water(1.0, 1.0)));
        let c = network.add_reach(reach("c"), Some(water(1.0, 1.0)));
        let d = network.add_reach(reach("d"), Some(water(1.0, 1.0)));
        // c and d each join the other and one headwater
        network.connect(a, c).unwrap();
        network.connect(d, c).unwrap();
        network.connect(b, d).unwrap();
        network.connect(c, d).unwrap();
        let err = network.evaluate(&HashMap::new()).unwrap_err();
        assert!(matches!(err, WwtpError::Network(message) if message.contains("depend")));
    }

    #[test]
    fn test_dot_lists_reaches() {
        let (network, _, _, _) = confluence();
        let dot = network.to_dot();
        assert!(dot.contains("label = \"joined\""));
        assert!(dot.contains("->"));
    }
}
