//! The circuit aggregate and its element-building API.

use crate::elements::{Ccvs, CurrentSource, Element, Resistor, Vccs, Vcvs, VoltageSource};
use crate::error::{EsimError, Result};
use crate::solver::{solve_dc, DcSolution, SolverConfig};

use super::types::NodeId;

/// A circuit under construction, ready to be solved.
///
/// Elements are appended through the `add_*` operations, each of which
/// validates its arguments; a failed add leaves the circuit unchanged.
/// Nodes are declared implicitly by being referenced, with node 0 fixed
/// as ground; the highest referenced index determines the node count.
///
/// [`solve`](Circuit::solve) takes the circuit immutably and assembles a
/// fresh system on every call, so a circuit may be mutated and re-solved
/// freely. Sharing one instance across threads for concurrent mutation
/// and solving is unsupported; use one circuit per thread.
#[derive(Debug, Clone, Default)]
pub struct Circuit {
    /// All elements, in insertion order.
    elements: Vec<Element>,
    /// Highest node index referenced so far.
    max_node: usize,
    /// Number of elements carrying a branch-current unknown.
    num_branches: usize,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resistor between two nodes.
    ///
    /// Fails if the resistance is not finite and strictly positive.
    pub fn add_resistor(&mut self, node_a: usize, node_b: usize, resistance: f64) -> Result<()> {
        if !resistance.is_finite() || resistance <= 0.0 {
            return Err(EsimError::invalid_element(format!(
                "resistance must be positive and finite, got {resistance}"
            )));
        }
        self.push(Element::Resistor(Resistor::new(
            [NodeId(node_a), NodeId(node_b)],
            resistance,
        )));
        Ok(())
    }

    /// Add an independent voltage source enforcing
    /// `V(node_pos) - V(node_neg) = voltage`.
    ///
    /// `tag` is caller bookkeeping: it is stored on the element but never
    /// consumed; branch-current ordering follows insertion order.
    ///
    /// Fails if the voltage is not finite or the terminals coincide.
    pub fn add_independent_voltage_source(
        &mut self,
        node_pos: usize,
        node_neg: usize,
        voltage: f64,
        tag: u32,
    ) -> Result<()> {
        require_finite(voltage, "voltage")?;
        require_distinct(node_pos, node_neg, "voltage source")?;
        self.push(Element::VoltageSource(VoltageSource::new(
            [NodeId(node_pos), NodeId(node_neg)],
            voltage,
            tag,
        )));
        Ok(())
    }

    /// Add an independent current source injecting `current` amperes into
    /// `node_pos` and withdrawing it from `node_neg`.
    ///
    /// Fails if the current is not finite.
    pub fn add_independent_current_source(
        &mut self,
        node_pos: usize,
        node_neg: usize,
        current: f64,
    ) -> Result<()> {
        require_finite(current, "current")?;
        self.push(Element::CurrentSource(CurrentSource::new(
            [NodeId(node_pos), NodeId(node_neg)],
            current,
        )));
        Ok(())
    }

    /// Add a voltage-controlled voltage source enforcing
    /// `V(node_pos) - V(node_neg) = gain * (V(ctrl_pos) - V(ctrl_neg))`.
    ///
    /// Fails if the gain is not finite or the output terminals coincide.
    pub fn add_voltage_controlled_voltage_source(
        &mut self,
        node_pos: usize,
        node_neg: usize,
        ctrl_pos: usize,
        ctrl_neg: usize,
        gain: f64,
    ) -> Result<()> {
        require_finite(gain, "gain")?;
        require_distinct(node_pos, node_neg, "VCVS output")?;
        self.push(Element::Vcvs(Vcvs::new(
            [NodeId(node_pos), NodeId(node_neg)],
            [NodeId(ctrl_pos), NodeId(ctrl_neg)],
            gain,
        )));
        Ok(())
    }

    /// Add a voltage-controlled current source driving
    /// `transconductance * (V(ctrl_pos) - V(ctrl_neg))` amperes from
    /// `node_pos` to `node_neg` through itself.
    ///
    /// Fails if the transconductance is not finite.
    pub fn add_voltage_controlled_current_source(
        &mut self,
        node_pos: usize,
        node_neg: usize,
        ctrl_pos: usize,
        ctrl_neg: usize,
        transconductance: f64,
    ) -> Result<()> {
        require_finite(transconductance, "transconductance")?;
        self.push(Element::Vccs(Vccs::new(
            [NodeId(node_pos), NodeId(node_neg)],
            [NodeId(ctrl_pos), NodeId(ctrl_neg)],
            transconductance,
        )));
        Ok(())
    }

    /// Add a current-controlled voltage source enforcing
    /// `V(node_pos) - V(node_neg) = transresistance * I(ctrl)`, where the
    /// controlling current is the branch current of the element at list
    /// index `ctrl_element`.
    ///
    /// Fails if the transresistance is not finite, the output terminals
    /// coincide, or `ctrl_element` does not name an already-added element
    /// carrying a branch current. The reference is re-checked at solve
    /// time, since removals can invalidate it.
    pub fn add_current_controlled_voltage_source(
        &mut self,
        node_pos: usize,
        node_neg: usize,
        ctrl_element: usize,
        transresistance: f64,
    ) -> Result<()> {
        require_finite(transresistance, "transresistance")?;
        require_distinct(node_pos, node_neg, "CCVS output")?;
        let carries_branch = self
            .elements
            .get(ctrl_element)
            .map(Element::has_branch_current)
            .unwrap_or(false);
        if !carries_branch {
            return Err(EsimError::invalid_element(format!(
                "controlling element {ctrl_element} does not carry a branch current"
            )));
        }
        self.push(Element::Ccvs(Ccvs::new(
            [NodeId(node_pos), NodeId(node_neg)],
            ctrl_element,
            transresistance,
        )));
        Ok(())
    }

    /// Remove the element at `index`, shifting later elements down.
    ///
    /// Returns `None` if the index is out of range. The node-count bound
    /// and branch count are recomputed from the surviving elements.
    pub fn remove_element(&mut self, index: usize) -> Option<Element> {
        if index >= self.elements.len() {
            return None;
        }
        let element = self.elements.remove(index);
        self.rescan();
        Some(element)
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.max_node = 0;
        self.num_branches = 0;
    }

    /// All elements, in insertion order.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Number of elements.
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check whether the circuit has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of nodes including ground.
    pub fn num_nodes(&self) -> usize {
        self.max_node + 1
    }

    /// Number of branch-current unknowns.
    pub fn num_branches(&self) -> usize {
        self.num_branches
    }

    /// Dimension of the assembled MNA system: non-ground node voltages
    /// plus branch currents.
    pub fn matrix_size(&self) -> usize {
        self.max_node + self.num_branches
    }

    /// Solve the DC operating point with the default configuration.
    ///
    /// Returns the node voltages (ground included at index 0) and the
    /// branch currents in insertion order. Fails with
    /// [`SingularMatrix`](EsimError::SingularMatrix) when the system has
    /// no unique solution.
    pub fn solve(&self) -> Result<DcSolution> {
        self.solve_with_config(&SolverConfig::default())
    }

    /// Solve the DC operating point with a custom solver configuration.
    pub fn solve_with_config(&self, config: &SolverConfig) -> Result<DcSolution> {
        solve_dc(self, config)
    }

    /// Append a validated element and grow the node-count bound.
    fn push(&mut self, element: Element) {
        self.max_node = self.max_node.max(element.max_node());
        if element.has_branch_current() {
            self.num_branches += 1;
        }
        self.elements.push(element);
    }

    /// Recompute the node-count bound and branch count after a removal.
    fn rescan(&mut self) {
        self.max_node = self
            .elements
            .iter()
            .map(Element::max_node)
            .max()
            .unwrap_or(0);
        self.num_branches = self
            .elements
            .iter()
            .filter(|e| e.has_branch_current())
            .count();
    }
}

fn require_finite(value: f64, what: &str) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EsimError::invalid_element(format!(
            "{what} must be finite, got {value}"
        )))
    }
}

fn require_distinct(node_pos: usize, node_neg: usize, what: &str) -> Result<()> {
    if node_pos == node_neg {
        Err(EsimError::invalid_element(format!(
            "{what} terminals must be distinct, both are {}",
            NodeId(node_pos)
        )))
    } else {
        Ok(())
    }
}
