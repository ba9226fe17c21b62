//! Wire-dependency DAG over a circuit's instructions.
//!
//! Node `i` is instruction `i` of the circuit; an edge `a → b` means `b` is
//! the next instruction after `a` on some shared qubit or classical bit. The
//! DAG answers scheduling questions (depth, ASAP/ALAP layers, slack) used to
//! pick rewrite positions that lengthen the critical path.

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHashMap;

use crate::circuit::Circuit;
use crate::error::{IrError, IrResult};

/// Dependency graph of a circuit.
pub struct CircuitDag {
    graph: DiGraph<Weight, (), u32>,
}

/// Node payload: the instruction index and how many layers it occupies.
#[derive(Debug, Clone, Copy)]
struct Weight {
    index: usize,
    duration: usize,
}

#[derive(Hash, PartialEq, Eq)]
enum Wire {
    Qubit(u32),
    Clbit(u32),
}

impl CircuitDag {
    /// Build the DAG for a circuit.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut graph = DiGraph::with_capacity(circuit.len(), circuit.len() * 2);
        let mut last_on_wire: FxHashMap<Wire, NodeIndex<u32>> = FxHashMap::default();

        for (index, instruction) in circuit.instructions().iter().enumerate() {
            let duration = usize::from(!instruction.is_barrier());
            let node = graph.add_node(Weight { index, duration });

            let wires = instruction
                .qubits
                .iter()
                .map(|q| Wire::Qubit(q.0))
                .chain(instruction.clbits.iter().map(|c| Wire::Clbit(c.0)));
            for wire in wires {
                if let Some(prev) = last_on_wire.insert(wire, node) {
                    graph.update_edge(prev, node, ());
                }
            }
        }

        Self { graph }
    }

    /// Number of instructions.
    pub fn num_ops(&self) -> usize {
        self.graph.node_count()
    }

    fn order(&self) -> IrResult<Vec<NodeIndex<u32>>> {
        toposort(&self.graph, None)
            .map_err(|cycle| IrError::InvalidDag(format!("cycle at node {:?}", cycle.node_id())))
    }

    /// Earliest layer each instruction can finish in (1-based; barriers
    /// share the layer of their latest predecessor). Indexed by instruction.
    pub fn asap_layers(&self) -> Vec<usize> {
        let mut layer = vec![0; self.num_ops()];
        let Ok(order) = self.order() else {
            return layer;
        };
        for node in order {
            let w = self.graph[node];
            let start = self
                .graph
                .neighbors_directed(node, Direction::Incoming)
                .map(|p| layer[self.graph[p].index])
                .max()
                .unwrap_or(0);
            layer[w.index] = start + w.duration;
        }
        layer
    }

    /// Latest layer each instruction can finish in without growing the depth.
    pub fn alap_layers(&self) -> Vec<usize> {
        let depth = self.depth();
        let mut layer = vec![depth; self.num_ops()];
        let Ok(order) = self.order() else {
            return layer;
        };
        for node in order.into_iter().rev() {
            let w = self.graph[node];
            let finish = self
                .graph
                .neighbors_directed(node, Direction::Outgoing)
                .map(|s| {
                    let succ = self.graph[s];
                    layer[succ.index] - succ.duration
                })
                .min()
                .unwrap_or(depth);
            layer[w.index] = finish;
        }
        layer
    }

    /// Scheduling freedom of each instruction. Zero means the instruction is
    /// on a critical path: lengthening it lengthens the whole circuit.
    pub fn slack(&self) -> Vec<usize> {
        let asap = self.asap_layers();
        let alap = self.alap_layers();
        asap.iter()
            .zip(&alap)
            .map(|(early, late)| late.saturating_sub(*early))
            .collect()
    }

    /// Instruction indices on one longest path, in program order.
    pub fn critical_path(&self) -> Vec<usize> {
        let asap = self.asap_layers();
        let Some(end) = self
            .graph
            .node_indices()
            .max_by_key(|&n| (asap[self.graph[n].index], std::cmp::Reverse(self.graph[n].index)))
        else {
            return Vec::new();
        };

        let mut path = vec![self.graph[end].index];
        let mut current = end;
        loop {
            let here = self.graph[current];
            let want = asap[here.index] - here.duration;
            let prev = self
                .graph
                .neighbors_directed(current, Direction::Incoming)
                .filter(|&p| asap[self.graph[p].index] == want)
                .min_by_key(|&p| self.graph[p].index);
            match prev {
                Some(p) => {
                    path.push(self.graph[p].index);
                    current = p;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }

    /// Circuit depth.
    pub fn depth(&self) -> usize {
        self.asap_layers().into_iter().max().unwrap_or(0)
    }
}
