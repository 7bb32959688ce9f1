//! I-V curve analysis engine.
//!
//! Stage 1: preprocessing, Voc/Isc, MPP, derived parameters, resistances
//! Stage 2: single-diode fit
//! Stage 3: STC correction, curve translation, uncertainty, coefficients
//! Stage 4: quality scoring, analyzer pipeline, batch fan-out

pub mod analyzer;
pub mod batch;
pub mod boundary;
pub mod coefficients;
pub mod derived;
pub mod diode;
pub mod fit;
pub mod mpp;
pub mod preprocess;
pub mod quality;
pub mod resistance;
pub mod stc;
pub mod translate;
pub mod uncertainty;

pub use analyzer::{Confidence, IvAnalysis, IvAnalyzer};
