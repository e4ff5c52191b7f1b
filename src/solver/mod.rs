//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine for DC circuit analysis.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and branch currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ i ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect voltage-defining elements to nodes
//! - D couples branch currents (nonzero only for CCVS)
//! - v is the vector of node voltages (ground excluded)
//! - j is the vector of branch currents
//! - i is the sum of current sources into each node
//! - e is the vector of source voltages
//!
//! Ground contributes no row or column; it is eliminated by construction,
//! which keeps the matrix non-singular for well-posed circuits.

mod dc;
mod mna;

pub use dc::{solve_dc, stamp_elements, DcSolution};
pub use mna::MnaMatrix;

/// Smallest pivot magnitude accepted during LU factorization. A column
/// whose best remaining pivot falls below this is reported as singular.
pub const PIVOT_THRESHOLD: f64 = 1e-12;

/// Configuration for the DC solver.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Minimum acceptable pivot magnitude during factorization.
    pub pivot_threshold: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pivot_threshold: PIVOT_THRESHOLD,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pivot threshold.
    ///
    /// Lower values accept worse-conditioned systems; raising the
    /// threshold trades tolerance of near-singular circuits for earlier
    /// failure reporting.
    pub fn with_pivot_threshold(mut self, pivot_threshold: f64) -> Self {
        self.pivot_threshold = pivot_threshold;
        self
    }
}
