//! DC analysis: system assembly and result extraction.

use log::debug;

use crate::circuit::Circuit;
use crate::elements::Element;
use crate::error::{EsimError, Result};

use super::{MnaMatrix, SolverConfig};

/// Result of a DC analysis.
///
/// Node voltages are ordered by node index with ground included at
/// position 0 (always 0.0). Branch currents carry one entry per
/// branch-current element (independent voltage sources, VCVS, CCVS) in
/// insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct DcSolution {
    voltages: Vec<f64>,
    currents: Vec<f64>,
}

impl DcSolution {
    /// All node voltages, ground first.
    pub fn voltages(&self) -> &[f64] {
        &self.voltages
    }

    /// All branch currents, in insertion order.
    pub fn currents(&self) -> &[f64] {
        &self.currents
    }

    /// Get the voltage at a node. Ground and unreferenced nodes read 0.0.
    pub fn voltage(&self, node: usize) -> f64 {
        self.voltages.get(node).copied().unwrap_or(0.0)
    }

    /// Get the voltage difference between two nodes.
    pub fn voltage_diff(&self, node_pos: usize, node_neg: usize) -> f64 {
        self.voltage(node_pos) - self.voltage(node_neg)
    }

    /// Get a branch current by insertion index. Out-of-range reads 0.0.
    pub fn current(&self, index: usize) -> f64 {
        self.currents.get(index).copied().unwrap_or(0.0)
    }

    /// Consume the solution into `(voltages, currents)`.
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.voltages, self.currents)
    }
}

/// Solve the DC operating point of a circuit.
///
/// Assembles a fresh MNA system from the circuit's current element list,
/// factors it, and splits the raw solution into node voltages and branch
/// currents.
pub fn solve_dc(circuit: &Circuit, config: &SolverConfig) -> Result<DcSolution> {
    let num_unknowns = circuit.num_nodes() - 1;
    let num_branches = circuit.num_branches();
    let size = num_unknowns + num_branches;

    debug!(
        "assembling MNA system: {} node unknowns, {} branch currents",
        num_unknowns, num_branches
    );

    let mut matrix = MnaMatrix::new(size, config.pivot_threshold);
    stamp_elements(circuit, &mut matrix)?;

    matrix.factor()?;
    matrix.solve()?;
    debug!("solved {}x{} system", size, size);

    let mut voltages = Vec::with_capacity(num_unknowns + 1);
    voltages.push(0.0); // ground
    voltages.extend_from_slice(&matrix.x[..num_unknowns]);
    let currents = matrix.x[num_unknowns..].to_vec();

    Ok(DcSolution { voltages, currents })
}

/// Branch-current index of each element, by element position. Elements
/// without a branch current map to `None`.
fn branch_assignments(circuit: &Circuit) -> Vec<Option<usize>> {
    let mut next = 0usize;
    circuit
        .elements()
        .iter()
        .map(|element| {
            if element.has_branch_current() {
                let branch = next;
                next += 1;
                Some(branch)
            } else {
                None
            }
        })
        .collect()
}

/// Stamp all elements into the MNA matrix.
///
/// Branch rows are allocated by scanning the element list in insertion
/// order, so auxiliary numbering always reflects the current list even
/// after removals.
pub fn stamp_elements(circuit: &Circuit, matrix: &mut MnaMatrix) -> Result<()> {
    let branches = branch_assignments(circuit);
    let offset = circuit.num_nodes() - 1;
    let mut next_branch = offset;

    for (idx, element) in circuit.elements().iter().enumerate() {
        match element {
            Element::Resistor(r) => {
                let n1 = r.nodes[0].matrix_index();
                let n2 = r.nodes[1].matrix_index();
                matrix.stamp_conductance(n1, n2, r.conductance());
            }

            Element::VoltageSource(v) => {
                let n1 = v.nodes[0].matrix_index();
                let n2 = v.nodes[1].matrix_index();
                let br = next_branch;
                next_branch += 1;
                matrix.stamp_voltage_source(n1, n2, br, v.voltage);
            }

            Element::CurrentSource(i) => {
                let n1 = i.nodes[0].matrix_index();
                let n2 = i.nodes[1].matrix_index();
                matrix.stamp_current_source(n1, n2, i.current);
            }

            Element::Vcvs(e) => {
                let br = next_branch;
                next_branch += 1;
                matrix.stamp_vcvs(
                    e.nodes[0].matrix_index(),
                    e.nodes[1].matrix_index(),
                    e.ctrl_nodes[0].matrix_index(),
                    e.ctrl_nodes[1].matrix_index(),
                    br,
                    e.gain,
                );
            }

            Element::Vccs(g) => {
                matrix.stamp_vccs(
                    g.nodes[0].matrix_index(),
                    g.nodes[1].matrix_index(),
                    g.ctrl_nodes[0].matrix_index(),
                    g.ctrl_nodes[1].matrix_index(),
                    g.transconductance,
                );
            }

            Element::Ccvs(h) => {
                let br = next_branch;
                next_branch += 1;
                let ctrl = branches
                    .get(h.ctrl_element)
                    .copied()
                    .flatten()
                    .ok_or_else(|| {
                        EsimError::invalid_element(format!(
                            "element {} references element {} for its controlling \
                             current, which does not carry a branch current",
                            idx, h.ctrl_element
                        ))
                    })?;

                // Output constraint row, then the controlling-current term:
                // V[out+] - V[out-] - r * I[ctrl] = 0
                matrix.stamp_voltage_source(
                    h.nodes[0].matrix_index(),
                    h.nodes[1].matrix_index(),
                    br,
                    0.0,
                );
                matrix.add(br, offset + ctrl, -h.transresistance);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_voltage_divider() {
        // The canonical series divider:
        //
        //   V1 = 5V --- node2 --- R2 = 100 --- node1 --- R1 = 100 --- GND
        //      |                                                       |
        //     GND ----------------------------------------------------+
        //
        // Expected: V(node1) = 2.5V, V(node2) = 5.0V.
        // 25mA flows out of the source's positive terminal, so the
        // branch current reads -0.025A.
        let mut circuit = Circuit::new();
        circuit.add_resistor(1, 0, 100.0).unwrap();
        circuit.add_resistor(2, 1, 100.0).unwrap();
        circuit.add_independent_voltage_source(2, 0, 5.0, 0).unwrap();

        let solution = circuit.solve().unwrap();

        assert_relative_eq!(solution.voltage(1), 2.5, epsilon = 1e-9);
        assert_relative_eq!(solution.voltage(2), 5.0, epsilon = 1e-9);
        assert_relative_eq!(solution.current(0), -0.025, epsilon = 1e-9);

        assert_eq!(solution.voltages().len(), 3);
        assert_eq!(solution.voltages()[0], 0.0);
        assert_eq!(solution.currents().len(), 1);
    }

    #[test]
    fn test_current_divider() {
        // 10mA into node1, two 1k resistors to ground in parallel:
        // V(node1) = 0.01 * 500 = 5V
        let mut circuit = Circuit::new();
        circuit.add_independent_current_source(1, 0, 0.010).unwrap();
        circuit.add_resistor(1, 0, 1000.0).unwrap();
        circuit.add_resistor(1, 0, 1000.0).unwrap();

        let solution = circuit.solve().unwrap();

        assert_relative_eq!(solution.voltage(1), 5.0, epsilon = 1e-9);
        assert!(solution.currents().is_empty());
    }

    #[test]
    fn test_kcl_holds_at_every_node() {
        // Bridge-like resistive network fed by a current source:
        //
        //   I1 = 10mA -> node1 --- R 1k --- node2 --- R 1k --- GND
        //                  |                  |
        //                 R 2k               R 4k7
        //                  |                  |
        //                 GND                GND
        let mut circuit = Circuit::new();
        circuit.add_independent_current_source(1, 0, 0.010).unwrap();
        circuit.add_resistor(1, 2, 1000.0).unwrap();
        circuit.add_resistor(2, 0, 1000.0).unwrap();
        circuit.add_resistor(1, 0, 2000.0).unwrap();
        circuit.add_resistor(2, 0, 4700.0).unwrap();

        let solution = circuit.solve().unwrap();

        // Net resistor current out of each node must match the injection.
        let injected = [0.0, 0.010, 0.0];
        for node in 1..=2usize {
            let mut residual = -injected[node];
            for element in circuit.elements() {
                if let Element::Resistor(r) = element {
                    let (a, b) = (r.nodes[0].index(), r.nodes[1].index());
                    if a == node {
                        residual += solution.voltage_diff(a, b) * r.conductance();
                    } else if b == node {
                        residual += solution.voltage_diff(b, a) * r.conductance();
                    }
                }
            }
            assert_abs_diff_eq!(residual, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_floating_node_is_singular() {
        // A node touched only by a 0A current source has an all-zero row.
        let mut circuit = Circuit::new();
        circuit.add_independent_current_source(1, 0, 0.0).unwrap();

        let result = circuit.solve();
        assert!(matches!(result, Err(EsimError::SingularMatrix { .. })));
    }

    #[test]
    fn test_duplicate_voltage_sources_are_singular() {
        // Two sources across the same pair produce duplicate constraint
        // rows; the current split is indeterminate even when the values
        // agree.
        let mut circuit = Circuit::new();
        circuit.add_resistor(1, 0, 100.0).unwrap();
        circuit.add_independent_voltage_source(1, 0, 5.0, 0).unwrap();
        circuit.add_independent_voltage_source(1, 0, 5.0, 1).unwrap();

        let result = circuit.solve();
        assert!(matches!(result, Err(EsimError::SingularMatrix { .. })));
    }

    #[test]
    fn test_solve_is_deterministic() {
        let mut circuit = Circuit::new();
        circuit.add_resistor(1, 0, 330.0).unwrap();
        circuit.add_resistor(2, 1, 470.0).unwrap();
        circuit.add_independent_voltage_source(2, 0, 9.0, 0).unwrap();

        let first = circuit.solve().unwrap();
        let second = circuit.solve().unwrap();

        // Bit-identical, not merely close.
        assert_eq!(first, second);
    }

    #[test]
    fn test_mutation_after_solve_is_reflected() {
        let mut circuit = Circuit::new();
        circuit.add_independent_voltage_source(1, 0, 5.0, 0).unwrap();
        circuit.add_resistor(1, 0, 1000.0).unwrap();

        let before = circuit.solve().unwrap();
        assert_relative_eq!(before.current(0), -0.005, epsilon = 1e-9);

        // Halve the load; the source current must double.
        circuit.add_resistor(1, 0, 1000.0).unwrap();
        let after = circuit.solve().unwrap();
        assert_relative_eq!(after.current(0), -0.010, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_circuit() {
        let circuit = Circuit::new();
        let solution = circuit.solve().unwrap();

        assert_eq!(solution.voltages(), &[0.0]);
        assert!(solution.currents().is_empty());
    }

    #[test]
    fn test_vcvs_gain() {
        //  V1 = 1V at node1; VCVS doubles it onto node2 (loaded by 1k).
        let mut circuit = Circuit::new();
        circuit.add_independent_voltage_source(1, 0, 1.0, 0).unwrap();
        circuit
            .add_voltage_controlled_voltage_source(2, 0, 1, 0, 2.0)
            .unwrap();
        circuit.add_resistor(2, 0, 1000.0).unwrap();

        let solution = circuit.solve().unwrap();

        assert_relative_eq!(solution.voltage(2), 2.0, epsilon = 1e-9);
        // One branch current per voltage-defining element, in order.
        assert_eq!(solution.currents().len(), 2);
    }

    #[test]
    fn test_vccs_transconductance() {
        // gm = 10mS driven by 1V: 10mA pulled out of node2 through the
        // source, dropped across 1k to ground -> V(node2) = -10V.
        let mut circuit = Circuit::new();
        circuit.add_independent_voltage_source(1, 0, 1.0, 0).unwrap();
        circuit
            .add_voltage_controlled_current_source(2, 0, 1, 0, 0.010)
            .unwrap();
        circuit.add_resistor(2, 0, 1000.0).unwrap();

        let solution = circuit.solve().unwrap();

        assert_relative_eq!(solution.voltage(2), -10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ccvs_transresistance() {
        // The canonical divider carries -25mA through its source
        // (element index 2); a CCVS with r = 1k mirrors that current as
        // -25V onto node3.
        let mut circuit = Circuit::new();
        circuit.add_resistor(1, 0, 100.0).unwrap();
        circuit.add_resistor(2, 1, 100.0).unwrap();
        circuit.add_independent_voltage_source(2, 0, 5.0, 0).unwrap();
        circuit
            .add_current_controlled_voltage_source(3, 0, 2, 1000.0)
            .unwrap();

        let solution = circuit.solve().unwrap();

        assert_relative_eq!(solution.voltage(3), -25.0, epsilon = 1e-9);
    }

    #[test]
    fn test_ccvs_dangling_control_fails_solve() {
        let mut circuit = Circuit::new();
        circuit.add_independent_voltage_source(1, 0, 5.0, 0).unwrap();
        circuit.add_resistor(1, 0, 100.0).unwrap();
        circuit
            .add_current_controlled_voltage_source(2, 0, 0, 50.0)
            .unwrap();

        // Removing the controlling source shifts the resistor into its
        // place; the CCVS control reference no longer names a
        // branch-current element.
        circuit.remove_element(0);

        let result = circuit.solve();
        assert!(matches!(result, Err(EsimError::InvalidElement { .. })));
    }
}
