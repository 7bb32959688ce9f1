//! Numerical primitives for SCPN PV Core.

pub mod interp;
pub mod linalg;
pub mod regression;
pub mod stats;
