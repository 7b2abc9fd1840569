#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

use std::num::{ParseFloatError, ParseIntError};
use thiserror::Error;

pub mod config;
pub mod graph;
pub mod parser;
pub mod report;
pub mod stats;
pub mod vectors;

pub use config::Config;
pub use graph::{Graph, Node, NodeGroup, NodeId};
pub use report::{run, GeneWalk, Report, ReportRow};
pub use stats::{Bucket, NullDistributions};
pub use vectors::{NodeVectors, SimilarityIndex};

const DEFAULT_NUM_NEIGHBORS: usize = 8;
/// The default significance level for the FDR correction
pub const DEFAULT_ALPHA: f64 = 0.05;

const GENE_LIST_FILENAME: &str = "HGNCidForINDRA.csv";
const NODES_FILENAME: &str = "GeneWalk_MG_nodes.tsv";
const EDGES_FILENAME: &str = "GeneWalk_MG_edges.tsv";
const VECTORS_FILENAME: &str = "GeneWalk_DW_nv.txt";
const NULL_DIST_FILENAME: &str = "GeneWalk_DW_rand_simdists.tsv";
const OUTPUT_FILENAME: &str = "GeneWalk.csv";

/// Main Error type for this crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum GeneWalkError {
    /// Indicates that the node does not exist in the [`Graph`]
    #[error("node does not exist")]
    DoesNotExist,
    /// The node exists, but lacks the requested attribute
    #[error("node {0} is missing the attribute `{1}`")]
    MissingAttribute(String, &'static str),
    /// No null distribution is available for the connectivity class
    #[error("no null distribution for bucket {0}")]
    MissingNullBucket(Bucket),
    /// A null distribution does not contain any value
    #[error("null distribution for bucket {0} is empty")]
    EmptyNullBucket(Bucket),
    /// Parsing of an integer failed
    #[error("unable to parse Integer")]
    ParseIntError,
    /// Parsing of a float failed
    #[error("unable to parse Float")]
    ParseFloatError,
    /// Failed to open a file
    #[error("cannot open file {0}")]
    CannotOpenFile(String),
    /// Failed to write the report
    #[error("cannot write file {0}")]
    CannotWriteFile(String),
    /// Invalid data in an input file or invalid parameter
    #[error("invalid input data: {0}")]
    InvalidInput(String),
}

impl From<ParseIntError> for GeneWalkError {
    fn from(_: ParseIntError) -> Self {
        GeneWalkError::ParseIntError
    }
}

impl From<ParseFloatError> for GeneWalkError {
    fn from(_: ParseFloatError) -> Self {
        GeneWalkError::ParseFloatError
    }
}

impl From<csv::Error> for GeneWalkError {
    fn from(err: csv::Error) -> Self {
        GeneWalkError::InvalidInput(err.to_string())
    }
}

/// Shortcut for `Result<T, GeneWalkError>`
pub type GeneWalkResult<T> = Result<T, GeneWalkError>;
