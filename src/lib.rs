//! # esim
//!
//! A linear DC circuit analysis engine.
//!
//! This library computes steady-state node voltages and branch currents
//! for circuits built from resistors, independent sources, and linear
//! controlled sources, using Modified Nodal Analysis (MNA) with a dense
//! LU solver.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`circuit`] - The [`Circuit`] aggregate and its building API
//! - [`elements`] - Typed element records (resistors, sources)
//! - [`solver`] - MNA matrix assembly and numerical solving
//! - [`error`] - The unified error type
//!
//! ## Usage
//!
//! ```
//! use esim::Circuit;
//!
//! // Two 100 ohm resistors in series across a 5V source.
//! let mut dc = Circuit::new();
//! dc.add_resistor(1, 0, 100.0)?;
//! dc.add_resistor(2, 1, 100.0)?;
//! dc.add_independent_voltage_source(2, 0, 5.0, 0)?;
//!
//! let solution = dc.solve()?;
//! assert!((solution.voltage(1) - 2.5).abs() < 1e-9);
//! assert!((solution.voltage(2) - 5.0).abs() < 1e-9);
//! assert!((solution.current(0) + 0.025).abs() < 1e-9);
//! # Ok::<(), esim::EsimError>(())
//! ```
//!
//! ## Analysis Method
//!
//! Each solve call:
//!
//! 1. Assembles the MNA system matrix A and source vector z from the
//!    circuit's current element list, one unknown per non-ground node
//!    voltage plus one per branch current
//! 2. Factors A with partially-pivoted Gaussian elimination
//! 3. Back-substitutes and splits the solution into node voltages and
//!    branch currents
//!
//! Ground (node 0) is eliminated by construction and always reads 0.0 V.
//! Solving never mutates the circuit, and nothing is cached between
//! calls, so elements may be added or removed freely between solves.

pub mod circuit;
pub mod elements;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Circuit, NodeId};
pub use error::{EsimError, Result};
pub use solver::{DcSolution, SolverConfig};
