//! Linear controlled sources.

use crate::circuit::NodeId;

/// A voltage-controlled voltage source (VCVS).
///
/// Enforces `V(out+) - V(out-) = gain * (V(ctrl+) - V(ctrl-))`.
/// Requires one auxiliary branch-current unknown, with the same current
/// sign convention as [`VoltageSource`](crate::elements::VoltageSource).
#[derive(Debug, Clone)]
pub struct Vcvs {
    pub nodes: [NodeId; 2],      // [out positive, out negative]
    pub ctrl_nodes: [NodeId; 2], // [ctrl positive, ctrl negative]
    pub gain: f64,
}

impl Vcvs {
    /// Create a new VCVS.
    pub fn new(nodes: [NodeId; 2], ctrl_nodes: [NodeId; 2], gain: f64) -> Self {
        Self {
            nodes,
            ctrl_nodes,
            gain,
        }
    }
}

/// A voltage-controlled current source (VCCS).
///
/// Drives `gm * (V(ctrl+) - V(ctrl-))` amperes through itself from the
/// positive output terminal to the negative output terminal. Stamps only
/// the conductance matrix; no auxiliary unknown.
#[derive(Debug, Clone)]
pub struct Vccs {
    pub nodes: [NodeId; 2],      // [out positive, out negative]
    pub ctrl_nodes: [NodeId; 2], // [ctrl positive, ctrl negative]
    pub transconductance: f64,
}

impl Vccs {
    /// Create a new VCCS.
    pub fn new(nodes: [NodeId; 2], ctrl_nodes: [NodeId; 2], transconductance: f64) -> Self {
        Self {
            nodes,
            ctrl_nodes,
            transconductance,
        }
    }
}

/// A current-controlled voltage source (CCVS).
///
/// Enforces `V(out+) - V(out-) = r * I(ctrl)` where the controlling
/// current is the branch current of another element, referenced by its
/// position in the circuit's element list. The referenced element must
/// carry a branch current (an independent voltage source, a VCVS, or
/// another CCVS). Requires one auxiliary branch-current unknown.
#[derive(Debug, Clone)]
pub struct Ccvs {
    pub nodes: [NodeId; 2], // [out positive, out negative]
    /// Element-list index of the element whose branch current controls
    /// this source.
    pub ctrl_element: usize,
    pub transresistance: f64,
}

impl Ccvs {
    /// Create a new CCVS.
    pub fn new(nodes: [NodeId; 2], ctrl_element: usize, transresistance: f64) -> Self {
        Self {
            nodes,
            ctrl_element,
            transresistance,
        }
    }
}
