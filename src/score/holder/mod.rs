//! Holder score (spec §4.5.2): eligibility, priority, budgeted sampling,
//! tiered enrichment cache, sub-scores, and threshold alerts.

pub mod alerts;
pub mod analyzer;
pub mod budget;
pub mod distribution;
pub mod priority;
pub mod sampling;
pub mod wallet_cache;

pub use analyzer::HolderAnalyzer;
