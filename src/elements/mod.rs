//! Element models for circuit analysis.
//!
//! This module provides the typed records for all supported elements:
//! - Linear: Resistor
//! - Independent sources: Voltage Source, Current Source
//! - Controlled sources: VCVS, VCCS, CCVS
//!
//! Elements are immutable once added to a circuit and are addressed by
//! their position in the circuit's element list.

mod controlled;
mod linear;
mod sources;

pub use controlled::{Ccvs, Vccs, Vcvs};
pub use linear::Resistor;
pub use sources::{CurrentSource, VoltageSource};

/// A circuit element.
#[derive(Debug, Clone)]
pub enum Element {
    Resistor(Resistor),
    VoltageSource(VoltageSource),
    CurrentSource(CurrentSource),
    Vcvs(Vcvs),
    Vccs(Vccs),
    Ccvs(Ccvs),
}

impl Element {
    /// Check whether this element carries a branch-current unknown in the
    /// MNA system. Branch currents are allocated in insertion order, one
    /// per element for which this returns true.
    pub fn has_branch_current(&self) -> bool {
        matches!(
            self,
            Element::VoltageSource(_) | Element::Vcvs(_) | Element::Ccvs(_)
        )
    }

    /// Get the highest node index referenced by this element.
    pub fn max_node(&self) -> usize {
        fn pair_max(nodes: &[crate::circuit::NodeId; 2]) -> usize {
            nodes[0].index().max(nodes[1].index())
        }

        match self {
            Element::Resistor(r) => pair_max(&r.nodes),
            Element::VoltageSource(v) => pair_max(&v.nodes),
            Element::CurrentSource(i) => pair_max(&i.nodes),
            Element::Vcvs(e) => pair_max(&e.nodes).max(pair_max(&e.ctrl_nodes)),
            Element::Vccs(g) => pair_max(&g.nodes).max(pair_max(&g.ctrl_nodes)),
            Element::Ccvs(h) => pair_max(&h.nodes),
        }
    }
}
