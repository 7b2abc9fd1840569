//! Statistical significance of gene - GO term similarities
//!
//! A raw similarity between a gene and one of its GO annotations is not
//! comparable across nodes, because well connected nodes end up closer to
//! each other in the embedding space. This module converts similarities
//! into p-values using empirical null distributions that are grouped by
//! node connectivity ([`NullDistributions`]), corrects them for multiple
//! testing per gene ([`correction`]) and keeps the significant GO terms
//! ([`enrichment`]).

pub mod correction;
pub mod enrichment;
mod null;

pub use enrichment::{go_enrichment, go_scores, GoEnrichment};
pub use null::{Bucket, NullDistributions};

/// Converts counts to `f64` for rank based calculations
///
/// Counts above `u32::MAX` lose precision silently otherwise, so they
/// are clamped instead.
fn f64_from_usize(n: usize) -> f64 {
    let intermediate: u32 = n.try_into().unwrap_or(u32::MAX);
    intermediate.into()
}
