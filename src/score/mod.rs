//! ScoreEngine (spec §4.5): a cheap synchronous technical score recomputed
//! on demand, and a budgeted background holder score analyzer.

pub mod holder;
pub mod technical;

pub use holder::HolderAnalyzer;
pub use technical::{compute as compute_technical_score, TechnicalScore};
