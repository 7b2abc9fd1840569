//! Node embeddings and similarity queries
//!
//! The embeddings are trained upstream. This module only loads them
//! and answers "how similar are two nodes" queries.

use core::fmt::Debug;
use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::parser;
use crate::GeneWalkError;
use crate::GeneWalkResult;

/// Similarity lookups between labelled nodes
///
/// Implementors return `None` for nodes that are not embedded, so that
/// callers can exclude them instead of failing.
pub trait SimilarityIndex {
    /// Returns the similarity between the nodes `a` and `b`
    fn similarity(&self, a: &str, b: &str) -> Option<f64>;

    /// Returns `true` if the node is part of the embedding space
    fn contains(&self, label: &str) -> bool;

    /// Ranks the `candidates` by descending similarity to `node`
    ///
    /// Unembedded candidates are left out. Returns `None` if `node`
    /// itself is not embedded. Ties keep the order of `candidates`.
    fn ranked<'a, I>(&self, node: &str, candidates: I) -> Option<Vec<(&'a str, f64)>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.contains(node) {
            return None;
        }
        let mut res: Vec<(&'a str, f64)> = candidates
            .into_iter()
            .filter_map(|label| self.similarity(node, label).map(|sim| (label, sim)))
            .collect();
        res.sort_by(|a, b| b.1.total_cmp(&a.1));
        Some(res)
    }
}

/// Embedding vectors of graph nodes, compared by cosine similarity
///
/// # Examples
///
/// ```
/// use genewalk::{NodeVectors, SimilarityIndex};
///
/// let mut vectors = NodeVectors::new(2);
/// vectors.insert("KRAS", &[1.0, 0.0]).unwrap();
/// vectors.insert("GO:0005515", &[1.0, 1.0]).unwrap();
///
/// let sim = vectors.similarity("KRAS", "GO:0005515").unwrap();
/// assert!((sim - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6);
/// assert!(vectors.similarity("KRAS", "BRAF").is_none());
/// ```
#[derive(Default)]
pub struct NodeVectors {
    dim: usize,
    labels: Vec<String>,
    index: HashMap<String, usize>,
    // unit-length vectors, row-major
    data: Vec<f32>,
}

impl Debug for NodeVectors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NodeVectors with {} vectors of dimension {}",
            self.labels.len(),
            self.dim
        )
    }
}

impl NodeVectors {
    /// Constructs an empty store for vectors of dimension `dim`
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            ..Default::default()
        }
    }

    /// Loads vectors from a word2vec text file
    ///
    /// The first line holds the number of vectors and their dimension,
    /// every other line a label followed by the vector components.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::CannotOpenFile`]: the file can't be opened
    /// - [`GeneWalkError::InvalidInput`]: missing header or wrong dimension
    /// - [`GeneWalkError::ParseFloatError`]: invalid vector component
    ///
    /// # Examples
    ///
    /// ```
    /// use genewalk::{NodeVectors, SimilarityIndex};
    ///
    /// let vectors = NodeVectors::from_file("tests/data/GeneWalk_DW_nv.txt").unwrap();
    /// assert_eq!(vectors.dim(), 4);
    /// assert!(vectors.contains("KRAS"));
    /// ```
    pub fn from_file<P: AsRef<Path>>(file: P) -> GeneWalkResult<Self> {
        let vectors = parser::vectors::parse(file)?;
        debug!("Loaded {:?}", vectors);
        Ok(vectors)
    }

    /// The dimension of the vectors
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The number of embedded nodes
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if no node is embedded
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Adds or replaces the vector of a node
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::InvalidInput`] if the vector does not match the dimension
    pub fn insert(&mut self, label: &str, vector: &[f32]) -> GeneWalkResult<()> {
        if vector.len() != self.dim {
            return Err(GeneWalkError::InvalidInput(format!(
                "vector of {label} has dimension {}, expected {}",
                vector.len(),
                self.dim
            )));
        }
        let norm = vector
            .iter()
            .map(|x| f64::from(*x) * f64::from(*x))
            .sum::<f64>()
            .sqrt();
        let unit = vector.iter().map(|x| {
            if norm > 0.0 {
                (f64::from(*x) / norm) as f32
            } else {
                0.0
            }
        });

        if let Some(idx) = self.index.get(label) {
            let start = idx * self.dim;
            for (slot, value) in self.data[start..start + self.dim].iter_mut().zip(unit) {
                *slot = value;
            }
        } else {
            self.index.insert(label.to_string(), self.labels.len());
            self.labels.push(label.to_string());
            self.data.extend(unit);
        }
        Ok(())
    }

    fn vector(&self, label: &str) -> Option<&[f32]> {
        self.index
            .get(label)
            .map(|idx| &self.data[idx * self.dim..(idx + 1) * self.dim])
    }

    /// Ranks every other embedded node by descending similarity to `label`
    ///
    /// Returns `None` if `label` is not embedded
    pub fn most_similar(&self, label: &str) -> Option<Vec<(&str, f64)>> {
        self.ranked(
            label,
            self.labels
                .iter()
                .map(String::as_str)
                .filter(|other| *other != label),
        )
    }
}

impl SimilarityIndex for NodeVectors {
    fn similarity(&self, a: &str, b: &str) -> Option<f64> {
        let a = self.vector(a)?;
        let b = self.vector(b)?;
        Some(
            a.iter()
                .zip(b)
                .map(|(x, y)| f64::from(*x) * f64::from(*y))
                .sum(),
        )
    }

    fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vectors() -> NodeVectors {
        let mut vectors = NodeVectors::new(2);
        vectors.insert("A", &[1.0, 0.0]).unwrap();
        vectors.insert("B", &[0.0, 3.0]).unwrap();
        vectors.insert("C", &[2.0, 2.0]).unwrap();
        vectors.insert("D", &[-1.0, 0.0]).unwrap();
        vectors
    }

    #[test]
    fn cosine() {
        let vectors = vectors();
        assert!((vectors.similarity("A", "A").unwrap() - 1.0).abs() < 1e-6);
        assert!(vectors.similarity("A", "B").unwrap().abs() < 1e-6);
        assert!((vectors.similarity("A", "D").unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn most_similar_order() {
        let vectors = vectors();
        let ranked = vectors.most_similar("A").unwrap();
        let labels: Vec<&str> = ranked.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["C", "B", "D"]);
    }

    #[test]
    fn ranked_skips_unembedded() {
        let vectors = vectors();
        let ranked = vectors.ranked("A", ["D", "X", "C"]).unwrap();
        let labels: Vec<&str> = ranked.iter().map(|(label, _)| *label).collect();
        assert_eq!(labels, vec!["C", "D"]);

        assert!(vectors.ranked("X", ["A"]).is_none());
    }

    #[test]
    fn wrong_dimension() {
        let mut vectors = vectors();
        assert!(vectors.insert("E", &[1.0, 2.0, 3.0]).is_err());
        assert_eq!(vectors.len(), 4);
    }

    #[test]
    fn replace_vector() {
        let mut vectors = vectors();
        vectors.insert("A", &[0.0, 1.0]).unwrap();
        assert_eq!(vectors.len(), 4);
        assert!((vectors.similarity("A", "B").unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector() {
        let mut vectors = vectors();
        vectors.insert("Z", &[0.0, 0.0]).unwrap();
        assert_eq!(vectors.similarity("A", "Z"), Some(0.0));
    }
}
