//! Input and output locations and the significance level of a run

use std::path::{Path, PathBuf};

use crate::GeneWalkError;
use crate::GeneWalkResult;

/// Configuration of a GeneWalk run
///
/// All files are resolved relative to the base folder.
///
/// # Examples
///
/// ```
/// use genewalk::Config;
///
/// let config = Config::new("/data/genewalk")
///     .with_gene_list("screen_hits.csv")
///     .with_output("screen_hits_genewalk.csv")
///     .with_alpha(0.1)
///     .unwrap();
///
/// assert_eq!(config.gene_list(), std::path::Path::new("/data/genewalk/screen_hits.csv"));
/// assert!((config.alpha() - 0.1).abs() < f64::EPSILON);
///
/// assert!(Config::default().with_alpha(0.0).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    folder: PathBuf,
    gene_list: String,
    nodes: String,
    edges: String,
    vectors: String,
    null_distributions: String,
    output: String,
    alpha: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            folder: PathBuf::from("."),
            gene_list: crate::GENE_LIST_FILENAME.to_string(),
            nodes: crate::NODES_FILENAME.to_string(),
            edges: crate::EDGES_FILENAME.to_string(),
            vectors: crate::VECTORS_FILENAME.to_string(),
            null_distributions: crate::NULL_DIST_FILENAME.to_string(),
            output: crate::OUTPUT_FILENAME.to_string(),
            alpha: crate::DEFAULT_ALPHA,
        }
    }
}

impl Config {
    /// Constructs a configuration with default file names inside `folder`
    pub fn new<P: AsRef<Path>>(folder: P) -> Self {
        Self {
            folder: folder.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Sets the file name of the genes of interest
    #[must_use]
    pub fn with_gene_list(mut self, filename: &str) -> Self {
        self.gene_list = filename.to_string();
        self
    }

    /// Sets the file names of the graph node and edge tables
    #[must_use]
    pub fn with_graph(mut self, nodes: &str, edges: &str) -> Self {
        self.nodes = nodes.to_string();
        self.edges = edges.to_string();
        self
    }

    /// Sets the file name of the node vectors
    #[must_use]
    pub fn with_vectors(mut self, filename: &str) -> Self {
        self.vectors = filename.to_string();
        self
    }

    /// Sets the file name of the null distributions
    #[must_use]
    pub fn with_null_distributions(mut self, filename: &str) -> Self {
        self.null_distributions = filename.to_string();
        self
    }

    /// Sets the file name of the report
    #[must_use]
    pub fn with_output(mut self, filename: &str) -> Self {
        self.output = filename.to_string();
        self
    }

    /// Sets the FDR significance level
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::InvalidInput`] if `alpha` is not in `(0, 1]`
    pub fn with_alpha(mut self, alpha: f64) -> GeneWalkResult<Self> {
        self.alpha = check_alpha(alpha)?;
        Ok(self)
    }

    /// The base folder
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// The FDR significance level
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Resolves `filename` inside the base folder
    pub fn path(&self, filename: &str) -> PathBuf {
        self.folder.join(filename)
    }

    /// Path of the genes of interest
    pub fn gene_list(&self) -> PathBuf {
        self.path(&self.gene_list)
    }

    /// Path of the graph node table
    pub fn nodes(&self) -> PathBuf {
        self.path(&self.nodes)
    }

    /// Path of the graph edge table
    pub fn edges(&self) -> PathBuf {
        self.path(&self.edges)
    }

    /// Path of the node vectors
    pub fn vectors(&self) -> PathBuf {
        self.path(&self.vectors)
    }

    /// Path of the null distributions
    pub fn null_distributions(&self) -> PathBuf {
        self.path(&self.null_distributions)
    }

    /// Path of the report
    pub fn output(&self) -> PathBuf {
        self.path(&self.output)
    }
}

pub(crate) fn check_alpha(alpha: f64) -> GeneWalkResult<f64> {
    if alpha > 0.0 && alpha <= 1.0 {
        Ok(alpha)
    } else {
        Err(GeneWalkError::InvalidInput(format!(
            "significance level must be in (0, 1], got {alpha}"
        )))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::new("data");
        assert_eq!(config.gene_list(), Path::new("data/HGNCidForINDRA.csv"));
        assert_eq!(config.nodes(), Path::new("data/GeneWalk_MG_nodes.tsv"));
        assert_eq!(config.edges(), Path::new("data/GeneWalk_MG_edges.tsv"));
        assert_eq!(config.vectors(), Path::new("data/GeneWalk_DW_nv.txt"));
        assert_eq!(
            config.null_distributions(),
            Path::new("data/GeneWalk_DW_rand_simdists.tsv")
        );
        assert_eq!(config.output(), Path::new("data/GeneWalk.csv"));
        assert!((config.alpha() - 0.05).abs() < f64::EPSILON);
    }

    #[test]
    fn alpha_range() {
        assert!(Config::default().with_alpha(1.0).is_ok());
        assert!(Config::default().with_alpha(-0.1).is_err());
        assert!(Config::default().with_alpha(1.5).is_err());
        assert!(Config::default().with_alpha(f64::NAN).is_err());
    }

    #[test]
    fn override_files() {
        let config = Config::new("data")
            .with_graph("nodes.tsv", "edges.tsv")
            .with_vectors("nv.txt")
            .with_null_distributions("nulls.tsv");
        assert_eq!(config.nodes(), Path::new("data/nodes.tsv"));
        assert_eq!(config.edges(), Path::new("data/edges.tsv"));
        assert_eq!(config.vectors(), Path::new("data/nv.txt"));
        assert_eq!(config.null_distributions(), Path::new("data/nulls.tsv"));
    }
}
