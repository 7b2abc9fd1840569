//! Significant GO annotations of a single gene
//!
//! Only GO terms that are direct neighbors of the gene are tested. Each
//! similarity is compared to the null distribution of the less connected
//! node of the pair, and the p-values of all tested GO terms are
//! corrected with Benjamini-Hochberg.
//!
//! # Examples
//!
//! ```
//! use genewalk::{Bucket, Graph, Node, NodeVectors, NullDistributions};
//! use genewalk::stats::go_enrichment;
//!
//! let mut graph = Graph::default();
//! let gene = graph.add_node(Node::gene("KRAS", "HGNC:6407")).unwrap();
//! let go = graph.add_node(Node::go_term("GO:0005515", "protein binding")).unwrap();
//! graph.add_edge(gene, go).unwrap();
//!
//! let mut vectors = NodeVectors::new(2);
//! vectors.insert("KRAS", &[1.0, 0.0]).unwrap();
//! vectors.insert("GO:0005515", &[1.0, 0.1]).unwrap();
//!
//! let mut nulls = NullDistributions::default();
//! nulls.insert(Bucket::from(0), (0..100).map(|i| f64::from(i) / 100.0 - 0.5).collect()).unwrap();
//!
//! let enriched = go_enrichment(&graph, &vectors, &nulls, gene, 1, 0.05).unwrap();
//! assert_eq!(enriched.len(), 1);
//! assert_eq!(enriched[0].go_id(), "GO:0005515");
//! assert!(enriched[0].padj() < 0.05);
//! ```

use tracing::debug;

use crate::graph::{NodeId, GO_ATTRIBUTE};
use crate::stats::correction::benjamini_hochberg;
use crate::stats::NullDistributions;
use crate::vectors::SimilarityIndex;
use crate::GeneWalkError;
use crate::GeneWalkResult;
use crate::Graph;

/// The significance of one GO term for one gene
#[derive(Debug, Clone, PartialEq)]
pub struct GoEnrichment {
    go: NodeId,
    go_id: String,
    description: String,
    connectivity: usize,
    similarity: f64,
    pvalue: f64,
    padj: f64,
}

impl GoEnrichment {
    /// The [`NodeId`] of the GO term
    pub fn node(&self) -> NodeId {
        self.go
    }

    /// The GO identifier, e.g. `GO:0005515`
    pub fn go_id(&self) -> &str {
        &self.go_id
    }

    /// The description of the GO term
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The number of distinct neighbors of the GO term
    pub fn connectivity(&self) -> usize {
        self.connectivity
    }

    /// The similarity between the gene and the GO term
    pub fn similarity(&self) -> f64 {
        self.similarity
    }

    /// The uncorrected p-value
    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    /// The Benjamini-Hochberg adjusted p-value
    pub fn padj(&self) -> f64 {
        self.padj
    }
}

/// Scores every GO annotation of `gene`, without filtering
///
/// The result is ordered by descending similarity. GO terms that are not
/// part of the embedding space are not tested. If the gene has no GO
/// neighbors or is not embedded, the result is empty.
///
/// # Errors
///
/// - [`GeneWalkError::DoesNotExist`]: `gene` is not part of the graph
/// - [`GeneWalkError::MissingAttribute`]: a GO neighbor has no description
/// - [`GeneWalkError::MissingNullBucket`]: no null distribution for a connectivity
pub fn go_scores<S: SimilarityIndex>(
    graph: &Graph,
    similarities: &S,
    nulls: &NullDistributions,
    gene: NodeId,
    gene_connectivity: usize,
) -> GeneWalkResult<Vec<GoEnrichment>> {
    let node = graph.node(gene).ok_or(GeneWalkError::DoesNotExist)?;
    let candidates = graph.go_neighbors(gene).ok_or(GeneWalkError::DoesNotExist)?;
    if candidates.is_empty() {
        debug!("{} has no GO annotations", node);
        return Ok(Vec::new());
    }

    let mut labels = Vec::with_capacity(candidates.len());
    for id in &candidates {
        labels.push(graph.node(id).ok_or(GeneWalkError::DoesNotExist)?.label());
    }

    let Some(ranked) = similarities.ranked(node.label(), labels) else {
        debug!("{} is not embedded", node);
        return Ok(Vec::new());
    };

    let mut scores = Vec::with_capacity(ranked.len());
    for (label, similarity) in ranked {
        let go = graph
            .node_by_label(label)
            .ok_or(GeneWalkError::DoesNotExist)?;
        let term = graph.node(go).ok_or(GeneWalkError::DoesNotExist)?;
        let connectivity = graph.connectivity(go).ok_or(GeneWalkError::DoesNotExist)?;
        let go_id = term
            .go()
            .ok_or_else(|| GeneWalkError::MissingAttribute(label.to_string(), GO_ATTRIBUTE))?;
        let description = term.try_name()?;
        let pvalue = nulls.pvalue(similarity, connectivity.min(gene_connectivity))?;
        scores.push(GoEnrichment {
            go,
            go_id: go_id.to_string(),
            description: description.to_string(),
            connectivity,
            similarity,
            pvalue,
            padj: pvalue,
        });
    }

    let pvalues: Vec<f64> = scores.iter().map(GoEnrichment::pvalue).collect();
    for (score, padj) in scores.iter_mut().zip(benjamini_hochberg(&pvalues)?) {
        score.padj = padj;
    }
    debug!("Tested {} GO terms of {}", scores.len(), node);
    Ok(scores)
}

/// Returns the GO annotations of `gene` with an adjusted p-value below `alpha`
///
/// `gene_connectivity` is the number of distinct neighbors of the gene.
/// See [`go_scores`] for details and errors.
///
/// # Errors
///
/// See [`go_scores`]
pub fn go_enrichment<S: SimilarityIndex>(
    graph: &Graph,
    similarities: &S,
    nulls: &NullDistributions,
    gene: NodeId,
    gene_connectivity: usize,
    alpha: f64,
) -> GeneWalkResult<Vec<GoEnrichment>> {
    let mut scores = go_scores(graph, similarities, nulls, gene, gene_connectivity)?;
    scores.retain(|score| score.padj < alpha);
    Ok(scores)
}
