//! Assembling the significant GO terms of all genes of interest
//!
//! [`GeneWalk`] combines the graph, the node vectors and the null
//! distributions and runs the per-gene enrichment for every gene
//! of interest. The results of all genes are merged into one [`Report`]
//! that is ordered by the gene list, then by significance.
//!
//! Genes of interest are missing from the report if they are not part of
//! the graph, have no GO annotations, are not embedded or have no
//! significant GO term.

use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::{debug, info, trace, warn};

use crate::config::check_alpha;
use crate::graph::{Node, NodeId};
use crate::parser::load_genes;
use crate::stats::{go_enrichment, GoEnrichment, NullDistributions};
use crate::vectors::{NodeVectors, SimilarityIndex};
use crate::{Config, GeneWalkError, GeneWalkResult, Graph};

/// The column header of the report
pub const HEADER: [&str; 9] = [
    "HGNC:ID",
    "HUGO",
    "GO description",
    "GO:ID",
    "N_con(gene)",
    "N_con(GO)",
    "similarity",
    "pval",
    "padj",
];

/// One significant GO term of one gene
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    hgnc_id: String,
    symbol: String,
    gene_connectivity: usize,
    go: GoEnrichment,
}

impl ReportRow {
    fn new(gene: &Node, gene_connectivity: usize, go: GoEnrichment) -> GeneWalkResult<Self> {
        Ok(Self {
            hgnc_id: gene.try_hgnc()?.to_string(),
            symbol: gene.label().to_string(),
            gene_connectivity,
            go,
        })
    }

    /// The HGNC identifier of the gene
    pub fn hgnc_id(&self) -> &str {
        &self.hgnc_id
    }

    /// The HUGO symbol of the gene
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The number of distinct neighbors of the gene
    pub fn gene_connectivity(&self) -> usize {
        self.gene_connectivity
    }

    /// The description of the GO term
    pub fn go_description(&self) -> &str {
        self.go.description()
    }

    /// The GO identifier
    pub fn go_id(&self) -> &str {
        self.go.go_id()
    }

    /// The number of distinct neighbors of the GO term
    pub fn go_connectivity(&self) -> usize {
        self.go.connectivity()
    }

    /// The similarity between gene and GO term
    pub fn similarity(&self) -> f64 {
        self.go.similarity()
    }

    /// The uncorrected p-value
    pub fn pvalue(&self) -> f64 {
        self.go.pvalue()
    }

    /// The FDR adjusted p-value
    pub fn padj(&self) -> f64 {
        self.go.padj()
    }

    fn record(&self) -> [String; 9] {
        [
            self.hgnc_id.clone(),
            self.symbol.clone(),
            self.go_description().to_string(),
            self.go_id().to_string(),
            self.gene_connectivity.to_string(),
            self.go_connectivity().to_string(),
            format_float(self.similarity()),
            format_float(self.pvalue()),
            format_float(self.padj()),
        ]
    }
}

/// Formats scores in plain notation, tiny values in scientific notation
fn format_float(value: f64) -> String {
    if value != 0.0 && value.abs() < 1e-4 {
        format!("{value:e}")
    } else {
        value.to_string()
    }
}

/// The significant GO terms of all genes of interest
///
/// Rows are ordered by the position of the gene in the list of genes
/// of interest, then by ascending adjusted p-value and ascending p-value.
#[derive(Debug, Default, Clone)]
pub struct Report {
    rows: Vec<ReportRow>,
}

impl Report {
    /// Merges the per-gene batches and orders the rows
    fn merge(batches: Vec<Vec<ReportRow>>, genes: &[String]) -> Self {
        let ranks = gene_ranks(genes);
        let rank = |row: &ReportRow| ranks.get(row.hgnc_id()).copied().unwrap_or(usize::MAX);

        let mut rows: Vec<ReportRow> = batches.into_iter().flatten().collect();
        rows.sort_by(|a, b| {
            rank(a)
                .cmp(&rank(b))
                .then(a.padj().total_cmp(&b.padj()))
                .then(a.pvalue().total_cmp(&b.pvalue()))
        });
        Self { rows }
    }

    /// The rows of the report
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Iterates the rows of the report
    pub fn iter(&self) -> std::slice::Iter<'_, ReportRow> {
        self.rows.iter()
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if no GO term is significant for any gene
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The distinct HGNC identifiers in report order
    pub fn genes(&self) -> Vec<&str> {
        let mut genes: Vec<&str> = Vec::new();
        for row in &self.rows {
            if genes.last() != Some(&row.hgnc_id()) {
                genes.push(row.hgnc_id());
            }
        }
        genes
    }

    /// Writes the report as CSV, including the header
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::CannotWriteFile`] if writing fails
    pub fn to_writer<W: Write>(&self, writer: W) -> GeneWalkResult<()> {
        let to_error = |err: csv::Error| GeneWalkError::CannotWriteFile(err.to_string());
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(HEADER).map_err(to_error)?;
        for row in &self.rows {
            wtr.write_record(row.record()).map_err(to_error)?;
        }
        wtr.flush()
            .map_err(|err| GeneWalkError::CannotWriteFile(err.to_string()))
    }

    /// Writes the report as CSV file
    ///
    /// # Errors
    ///
    /// [`GeneWalkError::CannotWriteFile`] if the file can't be created or written
    pub fn write_csv<P: AsRef<Path>>(&self, file: P) -> GeneWalkResult<()> {
        let filename = file.as_ref().display().to_string();
        let file = File::create(file).map_err(|_| GeneWalkError::CannotWriteFile(filename))?;
        self.to_writer(file)
    }
}

impl<'a> IntoIterator for &'a Report {
    type Item = &'a ReportRow;
    type IntoIter = std::slice::Iter<'a, ReportRow>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Position of the first occurrence of every gene
fn gene_ranks(genes: &[String]) -> HashMap<&str, usize> {
    let mut ranks = HashMap::with_capacity(genes.len());
    for (idx, gene) in genes.iter().enumerate() {
        ranks.entry(gene.as_str()).or_insert(idx);
    }
    ranks
}

/// All inputs of a GeneWalk run
///
/// The graph, node vectors and null distributions are read-only after
/// construction, so the genes can be processed independently.
///
/// # Examples
///
/// ```
/// use genewalk::{Config, GeneWalk};
///
/// let config = Config::new("tests/data");
/// let genewalk = GeneWalk::load(&config).unwrap();
/// let report = genewalk.generate(config.alpha()).unwrap();
///
/// assert_eq!(report.genes(), vec!["HGNC:6407", "HGNC:1097"]);
/// for row in &report {
///     assert!(row.padj() < 0.05);
/// }
/// ```
#[derive(Debug)]
pub struct GeneWalk<S = NodeVectors> {
    graph: Graph,
    similarities: S,
    nulls: NullDistributions,
    genes: Vec<String>,
}

impl GeneWalk<NodeVectors> {
    /// Loads all input files that are specified in the `config`
    ///
    /// # Errors
    ///
    /// Any error of the individual parsers. No genes are processed
    /// if one of the files can't be loaded.
    pub fn load(config: &Config) -> GeneWalkResult<Self> {
        let genes = load_genes(config.gene_list())?;
        info!("Loaded {} genes of interest", genes.len());
        let graph = Graph::from_files(config.nodes(), config.edges())?;
        let vectors = NodeVectors::from_file(config.vectors())?;
        let nulls = NullDistributions::from_file(config.null_distributions())?;
        Ok(Self::new(graph, vectors, nulls, genes))
    }
}

impl<S: SimilarityIndex> GeneWalk<S> {
    /// Constructs a new `GeneWalk` from already loaded inputs
    pub fn new(graph: Graph, similarities: S, nulls: NullDistributions, genes: Vec<String>) -> Self {
        Self {
            graph,
            similarities,
            nulls,
            genes,
        }
    }

    /// The gene - GO term network
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The node similarities
    pub fn similarities(&self) -> &S {
        &self.similarities
    }

    /// The null distributions
    pub fn nulls(&self) -> &NullDistributions {
        &self.nulls
    }

    /// The HGNC identifiers of the genes of interest
    pub fn genes(&self) -> &[String] {
        &self.genes
    }

    /// The gene nodes whose HGNC identifier is in the list of genes of interest
    fn genes_of_interest(&self) -> Vec<(NodeId, &Node)> {
        let ranks = gene_ranks(&self.genes);
        let mut nodes = Vec::new();
        for (id, node) in &self.graph {
            match node.hgnc() {
                Some(hgnc) if ranks.contains_key(hgnc) => nodes.push((id, node)),
                Some(_) => {}
                None => trace!("{} is not a gene", node),
            }
        }
        info!(
            "Found {} gene nodes for {} genes of interest",
            nodes.len(),
            self.genes.len()
        );
        nodes
    }

    /// The significant GO terms of a single gene
    ///
    /// Genes with GO terms that lack an attribute are skipped. All other
    /// errors, e.g. missing null distributions, are returned.
    fn gene_batch(&self, id: NodeId, gene: &Node, alpha: f64) -> GeneWalkResult<Vec<ReportRow>> {
        let connectivity = self
            .graph
            .connectivity(id)
            .ok_or(GeneWalkError::DoesNotExist)?;
        let enriched = match go_enrichment(
            &self.graph,
            &self.similarities,
            &self.nulls,
            id,
            connectivity,
            alpha,
        ) {
            Ok(enriched) => enriched,
            Err(GeneWalkError::MissingAttribute(label, attribute)) => {
                warn!(
                    "Skipping {}: {} has no attribute `{}`",
                    gene, label, attribute
                );
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };
        debug!("{} significant GO terms for {}", enriched.len(), gene);
        enriched
            .into_iter()
            .map(|go| ReportRow::new(gene, connectivity, go))
            .collect()
    }

    /// Calculates the significant GO terms of all genes of interest
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::InvalidInput`]: `alpha` is not in `(0, 1]`
    /// - [`GeneWalkError::MissingNullBucket`]: a null distribution is missing
    pub fn generate(&self, alpha: f64) -> GeneWalkResult<Report> {
        let alpha = check_alpha(alpha)?;
        let batches = self
            .genes_of_interest()
            .into_iter()
            .map(|(id, gene)| self.gene_batch(id, gene, alpha))
            .collect::<GeneWalkResult<Vec<_>>>()?;
        let report = Report::merge(batches, &self.genes);
        info!("{} significant GO terms in total", report.len());
        Ok(report)
    }

    /// Same as [`GeneWalk::generate`], but processes the genes in parallel
    ///
    /// The report is identical to the sequential one.
    ///
    /// # Errors
    ///
    /// See [`GeneWalk::generate`]
    #[cfg(feature = "parallel")]
    pub fn generate_parallel(&self, alpha: f64) -> GeneWalkResult<Report>
    where
        S: Sync,
    {
        use rayon::prelude::*;

        let alpha = check_alpha(alpha)?;
        let batches = self
            .genes_of_interest()
            .into_par_iter()
            .map(|(id, gene)| self.gene_batch(id, gene, alpha))
            .collect::<GeneWalkResult<Vec<_>>>()?;
        let report = Report::merge(batches, &self.genes);
        info!("{} significant GO terms in total", report.len());
        Ok(report)
    }
}

/// Loads all inputs, calculates the report and writes it to the output file
///
/// # Errors
///
/// Any error while loading the inputs, calculating or writing the report
///
/// # Examples
///
/// ```no_run
/// use genewalk::Config;
///
/// let config = Config::new("/path/to/genewalk/files").with_alpha(0.1).unwrap();
/// let report = genewalk::run(&config).unwrap();
/// println!("{} significant GO terms", report.len());
/// ```
pub fn run(config: &Config) -> GeneWalkResult<Report> {
    let genewalk = GeneWalk::load(config)?;
    let report = genewalk.generate(config.alpha())?;
    report.write_csv(config.output())?;
    info!("Wrote report to {}", config.output().display());
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::stats::enrichment::test::{two_genes, uniform_nulls, FixedSimilarities};
    use crate::stats::Bucket;

    fn genewalk(genes: &[&str]) -> GeneWalk<FixedSimilarities> {
        let (graph, sims) = two_genes();
        GeneWalk::new(
            graph,
            sims,
            uniform_nulls(),
            genes.iter().map(|g| g.to_string()).collect(),
        )
    }

    /// G1 (HGNC:1) and G3 (HGNC:3) with three significant GO terms each
    fn three_terms_each(genes: &[&str]) -> GeneWalk<FixedSimilarities> {
        let mut graph = Graph::default();
        let mut sims = FixedSimilarities::default();
        for (gene, hgnc) in [("G1", "HGNC:1"), ("G3", "HGNC:3")] {
            let id = graph.add_node(Node::gene(gene, hgnc)).unwrap();
            for (term, sim) in [("T1", 0.995), ("T2", 0.975), ("T3", 0.985)] {
                let go = graph.add_node(Node::go_term(term, term)).unwrap();
                graph.add_edge(id, go).unwrap();
                sims.set(gene, term, sim);
            }
        }
        GeneWalk::new(
            graph,
            sims,
            uniform_nulls(),
            genes.iter().map(|g| g.to_string()).collect(),
        )
    }

    #[test]
    fn end_to_end() {
        let report = genewalk(&["HGNC:1", "HGNC:2"]).generate(0.05).unwrap();
        assert_eq!(report.len(), 1);
        let row = &report.rows()[0];
        assert_eq!(row.hgnc_id(), "HGNC:1");
        assert_eq!(row.symbol(), "G1");
        assert_eq!(row.go_id(), "T1");
        assert_eq!(row.go_description(), "term one");
        assert_eq!(row.gene_connectivity(), 3);
        assert_eq!(row.go_connectivity(), 1);
        assert!((row.pvalue() - 0.01).abs() < 1e-12);
        assert!((row.padj() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn genes_not_of_interest_are_ignored() {
        let report = genewalk(&["HGNC:2"]).generate(0.05).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn order_follows_gene_list() {
        let report = three_terms_each(&["HGNC:3", "HGNC:1"]).generate(0.05).unwrap();
        assert_eq!(report.len(), 6);
        assert_eq!(report.genes(), vec!["HGNC:3", "HGNC:1"]);

        let report = three_terms_each(&["HGNC:1", "HGNC:3"]).generate(0.05).unwrap();
        assert_eq!(report.genes(), vec!["HGNC:1", "HGNC:3"]);
    }

    #[test]
    fn order_within_gene() {
        let report = three_terms_each(&["HGNC:3", "HGNC:1"]).generate(0.05).unwrap();
        let terms: Vec<&str> = report.iter().take(3).map(ReportRow::go_id).collect();
        assert_eq!(terms, vec!["T1", "T3", "T2"]);
        for w in report.rows().windows(2) {
            if w[0].hgnc_id() == w[1].hgnc_id() {
                assert!(w[0].padj() <= w[1].padj());
            }
        }
    }

    #[test]
    fn duplicate_genes_of_interest() {
        let report = three_terms_each(&["HGNC:3", "HGNC:1", "HGNC:3"])
            .generate(0.05)
            .unwrap();
        assert_eq!(report.len(), 6);
        assert_eq!(report.genes(), vec!["HGNC:3", "HGNC:1"]);
    }

    #[test]
    fn invalid_alpha() {
        assert!(genewalk(&["HGNC:1"]).generate(0.0).is_err());
    }

    #[test]
    fn missing_null_bucket_is_fatal() {
        let (graph, sims) = two_genes();
        let mut nulls = NullDistributions::default();
        nulls.insert(Bucket::from(5), vec![0.1, 0.2]).unwrap();
        let genewalk = GeneWalk::new(graph, sims, nulls, vec!["HGNC:1".to_string()]);
        assert!(matches!(
            genewalk.generate(0.05),
            Err(GeneWalkError::MissingNullBucket(_))
        ));
    }

    #[test]
    fn missing_description_skips_gene() {
        let (mut graph, mut sims) = two_genes();
        let g2 = graph.node_by_label("G2").unwrap();
        let t3 = graph.add_node(Node::new("T3").with_go("T3")).unwrap();
        graph.add_edge(g2, t3).unwrap();
        sims.set("G2", "T3", 0.999);
        let genewalk = GeneWalk::new(
            graph,
            sims,
            uniform_nulls(),
            vec!["HGNC:2".to_string(), "HGNC:1".to_string()],
        );
        let report = genewalk.generate(0.05).unwrap();
        assert_eq!(report.genes(), vec!["HGNC:1"]);
    }

    #[test]
    fn csv_output() {
        let report = genewalk(&["HGNC:1"]).generate(0.05).unwrap();
        let mut out = Vec::new();
        report.to_writer(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("HGNC:ID,HUGO,GO description,GO:ID,N_con(gene),N_con(GO),similarity,pval,padj")
        );
        assert!(lines.next().unwrap().starts_with("HGNC:1,G1,term one,T1,3,1,0.985,"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_quotes_descriptions() {
        let mut graph = Graph::default();
        let gene = graph.add_node(Node::gene("G1", "HGNC:1")).unwrap();
        let go = graph
            .add_node(Node::go_term("GO:1", "regulation of transcription, DNA-templated"))
            .unwrap();
        graph.add_edge(gene, go).unwrap();
        let mut sims = FixedSimilarities::default();
        sims.set("G1", "GO:1", 0.999);
        let report = GeneWalk::new(graph, sims, uniform_nulls(), vec!["HGNC:1".to_string()])
            .generate(0.05)
            .unwrap();

        let mut out = Vec::new();
        report.to_writer(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("\"regulation of transcription, DNA-templated\""));
    }

    #[test]
    fn small_scores_use_scientific_notation() {
        assert_eq!(format_float(0.985), "0.985");
        assert_eq!(format_float(0.01), "0.01");
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(1.0), "1");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(3.3e-6), "3.3e-6");
        assert_eq!(format_float(-2.5e-5), "-2.5e-5");
    }

    #[test]
    fn csv_output_with_tiny_padj() {
        let mut graph = Graph::default();
        let gene = graph.add_node(Node::gene("G1", "HGNC:1")).unwrap();
        let go = graph.add_node(Node::go_term("GO:1", "term one")).unwrap();
        graph.add_edge(gene, go).unwrap();
        let mut sims = FixedSimilarities::default();
        // one out of 100_000 null values is above the similarity
        sims.set("G1", "GO:1", 0.0999985);
        let mut nulls = NullDistributions::default();
        nulls
            .insert(Bucket::from(0), (0..100_000).map(|i| f64::from(i) * 1e-6).collect())
            .unwrap();

        let report = GeneWalk::new(graph, sims, nulls, vec!["HGNC:1".to_string()])
            .generate(0.05)
            .unwrap();
        let mut out = Vec::new();
        report.to_writer(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        let row = out.lines().nth(1).unwrap();
        assert!(row.starts_with("HGNC:1,G1,term one,GO:1,1,1,0.0999985,"), "{row}");
        let fields: Vec<&str> = row.split(',').collect();
        for field in &fields[7..] {
            assert!(field.contains("e-5"), "{row}");
            let value: f64 = field.parse().unwrap();
            assert!((value - 1e-5).abs() < 1e-12);
        }
    }

    #[test]
    fn deterministic() {
        let mut first = Vec::new();
        let mut second = Vec::new();
        three_terms_each(&["HGNC:3", "HGNC:1"])
            .generate(0.05)
            .unwrap()
            .to_writer(&mut first)
            .unwrap();
        three_terms_each(&["HGNC:3", "HGNC:1"])
            .generate(0.05)
            .unwrap()
            .to_writer(&mut second)
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn run_with_files() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("GeneWalk.csv");
        let config = Config::new("tests/data").with_output(output.to_str().unwrap());

        let report = run(&config).unwrap();
        assert_eq!(report.len(), 3);
        assert_eq!(report.genes(), vec!["HGNC:6407", "HGNC:1097"]);

        let content = std::fs::read_to_string(output).unwrap();
        let rows: Vec<&str> = content.lines().collect();
        assert_eq!(rows.len(), 4);
        assert!(rows[1].starts_with("HGNC:6407,KRAS,Ras protein signal transduction,GO:0007265,5,1,"));
        assert!(rows[2].starts_with("HGNC:1097,BRAF,protein kinase activity,GO:0004672,6,2,"));
        assert!(rows[3].starts_with("HGNC:1097,BRAF,MAPK cascade,GO:0000165,6,2,"));
    }

    #[test]
    fn run_with_missing_file() {
        let config = Config::new("tests/data").with_vectors("does_not_exist.txt");
        assert!(matches!(
            run(&config),
            Err(GeneWalkError::CannotOpenFile(_))
        ));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_is_identical() {
        let genewalk = three_terms_each(&["HGNC:3", "HGNC:1"]);
        let sequential = genewalk.generate(0.05).unwrap();
        let parallel = genewalk.generate_parallel(0.05).unwrap();
        assert_eq!(sequential.rows(), parallel.rows());
    }
}
