//! Parsing the GeneWalk input artifacts
//!
//! All artifacts are plain text files:
//!
//! - the list of genes of interest (comma or tab separated, first column)
//! - the graph as node and edge tables
//! - the node vectors in word2vec text format
//! - the null distributions, one bucket per line

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use crate::{GeneWalkError, GeneWalkResult};

fn open<P: AsRef<Path>>(file: P) -> GeneWalkResult<BufReader<File>> {
    let filename = file.as_ref().display().to_string();
    let file = File::open(file).map_err(|_| GeneWalkError::CannotOpenFile(filename))?;
    Ok(BufReader::new(file))
}

/// Iterates the non-empty lines that are not comments
fn content_lines<R: BufRead>(reader: R) -> impl Iterator<Item = GeneWalkResult<String>> {
    reader
        .lines()
        .map(|line| line.map_err(|err| GeneWalkError::InvalidInput(err.to_string())))
        .filter(|line| match line {
            Ok(line) => !line.trim().is_empty() && !line.starts_with('#'),
            Err(_) => true,
        })
}

/// Loads the list of genes of interest
///
/// The file is comma or tab separated. The first column holds the gene
/// identifier (e.g. `HGNC:6407`), all other columns are ignored. An optional
/// header row is recognized by its first cell (`HGNC:ID`, `HGNC` or
/// `hgnc_id`). Order and duplicates are preserved.
///
/// # Errors
///
/// - [`GeneWalkError::CannotOpenFile`]: the file can't be opened
/// - [`GeneWalkError::InvalidInput`]: the file is not valid delimited UTF-8 text
///
/// # Examples
///
/// ```
/// use genewalk::parser::load_genes;
///
/// let genes = load_genes("tests/data/HGNCidForINDRA.csv").unwrap();
/// assert_eq!(genes.first().map(String::as_str), Some("HGNC:6407"));
/// ```
pub fn load_genes<P: AsRef<Path>>(file: P) -> GeneWalkResult<Vec<String>> {
    let filename = file.as_ref().display().to_string();
    let mut reader = open(file)?;
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|_| GeneWalkError::CannotOpenFile(filename))?;
    gene_list::parse(&content)
}

pub(crate) mod gene_list {
    use crate::GeneWalkResult;

    const HEADERS: [&str; 3] = ["HGNC:ID", "HGNC", "hgnc_id"];

    /// Tab if the first data line contains one, comma otherwise
    fn delimiter(content: &[u8]) -> u8 {
        let first_line = content
            .split(|c| *c == b'\n')
            .find(|line| {
                line.iter()
                    .find(|c| !c.is_ascii_whitespace())
                    .is_some_and(|c| *c != b'#')
            })
            .unwrap_or_default();
        if first_line.contains(&b'\t') {
            b'\t'
        } else {
            b','
        }
    }

    pub(crate) fn parse(content: &[u8]) -> GeneWalkResult<Vec<String>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .comment(Some(b'#'))
            .delimiter(delimiter(content))
            .from_reader(content);

        let mut genes = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record?;
            let Some(gene) = record.get(0).map(str::trim) else {
                continue;
            };
            if gene.is_empty() || (idx == 0 && HEADERS.contains(&gene)) {
                continue;
            }
            genes.push(gene.to_string());
        }
        Ok(genes)
    }

    #[cfg(test)]
    mod test_gene_list {
        use super::*;

        #[test]
        fn single_column() {
            let genes = parse(b"HGNC:6407\nHGNC:1097\n").unwrap();
            assert_eq!(genes, vec!["HGNC:6407", "HGNC:1097"]);
        }

        #[test]
        fn skip_header() {
            let genes = parse(b"HGNC:ID,HUGO\nHGNC:6407,KRAS\nHGNC:1097,BRAF\n").unwrap();
            assert_eq!(genes, vec!["HGNC:6407", "HGNC:1097"]);
        }

        #[test]
        fn tab_separated() {
            let genes = parse(b"HGNC:6407\tKRAS\nHGNC:1097\tBRAF").unwrap();
            assert_eq!(genes, vec!["HGNC:6407", "HGNC:1097"]);
        }

        #[test]
        fn keep_order_and_duplicates() {
            let genes = parse(b"HGNC:2\n\nHGNC:1\n# comment\nHGNC:2\n").unwrap();
            assert_eq!(genes, vec!["HGNC:2", "HGNC:1", "HGNC:2"]);
        }

        #[test]
        fn empty_file() {
            assert!(parse(b"").unwrap().is_empty());
        }

        #[test]
        fn comment_before_tab_separated() {
            let genes = parse(b"# screen hits\nHGNC:6407\tKRAS\nHGNC:1097\tBRAF\n").unwrap();
            assert_eq!(genes, vec!["HGNC:6407", "HGNC:1097"]);

            let genes = parse(b"\n# hits\n\nHGNC:6407\tKRAS\n").unwrap();
            assert_eq!(genes, vec!["HGNC:6407"]);
        }

        #[test]
        fn comment_with_tab_before_comma_separated() {
            let genes = parse(b"# id\tsymbol\nHGNC:6407,KRAS\n").unwrap();
            assert_eq!(genes, vec!["HGNC:6407"]);
        }

        #[test]
        fn invalid_utf8() {
            assert!(matches!(
                parse(b"HGNC:6407\nHGNC:\xff\xfe\n"),
                Err(crate::GeneWalkError::InvalidInput(_))
            ));
        }
    }
}


/// Module to parse the node and edge tables of the [`Graph`](crate::Graph)
pub(crate) mod graph {
    use std::path::Path;

    use tracing::{debug, info};

    use super::{content_lines, open};
    use crate::graph::Node;
    use crate::GeneWalkError;
    use crate::GeneWalkResult;
    use crate::Graph;

    /// Parses a single line of the node table
    ///
    /// ```text
    /// KRAS    HGNC:6407
    /// GO:0005515      GO:0005515  protein binding
    /// ```
    fn node_line(line: &str) -> GeneWalkResult<Node> {
        let mut cols = line.split('\t').map(str::trim);

        let Some(label) = cols.next().filter(|label| !label.is_empty()) else {
            return Err(GeneWalkError::InvalidInput(line.to_string()));
        };
        let mut node = Node::new(label);
        if let Some(hgnc) = cols.next().filter(|hgnc| !hgnc.is_empty()) {
            node = node.with_hgnc(hgnc);
        }
        if let Some(go) = cols.next().filter(|go| !go.is_empty()) {
            node = node.with_go(go);
        }
        if let Some(name) = cols.next().filter(|name| !name.is_empty()) {
            node = node.with_name(name);
        }
        Ok(node)
    }

    /// Parses a single line of the edge table
    ///
    /// ```text
    /// KRAS    BRAF    Activation
    /// KRAS    GO:0005515  GO annotation
    /// ```
    fn edge_line(line: &str) -> GeneWalkResult<(&str, &str)> {
        let mut cols = line.split('\t').map(str::trim);

        let Some(source) = cols.next().filter(|source| !source.is_empty()) else {
            return Err(GeneWalkError::InvalidInput(line.to_string()));
        };
        let Some(target) = cols.next().filter(|target| !target.is_empty()) else {
            return Err(GeneWalkError::InvalidInput(line.to_string()));
        };
        Ok((source, target))
    }

    pub(crate) fn parse_nodes<P: AsRef<Path>>(file: P, graph: &mut Graph) -> GeneWalkResult<()> {
        let reader = open(file)?;
        let mut count = 0usize;
        for line in content_lines(reader) {
            let line = line?;
            graph.add_node(node_line(&line)?)?;
            count += 1;
        }
        info!("Parsed {} nodes", count);
        Ok(())
    }

    pub(crate) fn parse_edges<P: AsRef<Path>>(file: P, graph: &mut Graph) -> GeneWalkResult<()> {
        let reader = open(file)?;
        let before = graph.len();
        for line in content_lines(reader) {
            let line = line?;
            let (source, target) = edge_line(&line)?;
            graph.add_edge_by_label(source, target)?;
        }
        if graph.len() > before {
            debug!("Added {} nodes from edges", graph.len() - before);
        }
        info!("Parsed {} edges", graph.edge_count());
        Ok(())
    }

}

/// Module to parse node vectors in word2vec text format
pub(crate) mod vectors {
    use std::io::BufRead;
    use std::path::Path;

    use tracing::{info, warn};

    use super::{content_lines, open};
    use crate::GeneWalkError;
    use crate::GeneWalkResult;
    use crate::NodeVectors;

    fn header(line: &str) -> GeneWalkResult<(usize, usize)> {
        let mut cols = line.split_whitespace();
        let (Some(count), Some(dim), None) = (cols.next(), cols.next(), cols.next()) else {
            return Err(GeneWalkError::InvalidInput(format!(
                "invalid header of vector file: {line}"
            )));
        };
        Ok((count.parse()?, dim.parse()?))
    }

    fn vector_line(line: &str) -> GeneWalkResult<(&str, Vec<f32>)> {
        let mut cols = line.split_whitespace();
        let Some(label) = cols.next() else {
            return Err(GeneWalkError::InvalidInput(line.to_string()));
        };
        let vector = cols
            .map(str::parse::<f32>)
            .collect::<Result<Vec<f32>, _>>()?;
        Ok((label, vector))
    }

    pub(crate) fn from_reader<R: BufRead>(reader: R) -> GeneWalkResult<NodeVectors> {
        let mut lines = content_lines(reader);
        let Some(first) = lines.next() else {
            return Err(GeneWalkError::InvalidInput(
                "vector file must contain a header".to_string(),
            ));
        };
        let (count, dim) = header(&first?)?;

        let mut vectors = NodeVectors::new(dim);
        for line in lines {
            let line = line?;
            let (label, vector) = vector_line(&line)?;
            vectors.insert(label, &vector)?;
        }
        if vectors.len() != count {
            warn!(
                "Vector file announced {} vectors, but contains {}",
                count,
                vectors.len()
            );
        }
        info!("Parsed {} vectors of dimension {}", vectors.len(), dim);
        Ok(vectors)
    }

    pub(crate) fn parse<P: AsRef<Path>>(file: P) -> GeneWalkResult<NodeVectors> {
        from_reader(open(file)?)
    }

}

/// Module to parse the null distributions of similarities
pub(crate) mod null_distributions {
    use std::io::BufRead;
    use std::path::Path;

    use tracing::info;

    use super::{content_lines, open};
    use crate::stats::{Bucket, NullDistributions};
    use crate::GeneWalkError;
    use crate::GeneWalkResult;

    fn parse_line(line: &str) -> GeneWalkResult<(Bucket, Vec<f64>)> {
        let Some((key, values)) = line.split_once('\t') else {
            return Err(GeneWalkError::InvalidInput(line.to_string()));
        };
        let bucket = Bucket::try_from(key)?;
        let values = values
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|value| !value.is_empty())
            .map(str::parse::<f64>)
            .collect::<Result<Vec<f64>, _>>()?;
        Ok((bucket, values))
    }

    pub(crate) fn from_reader<R: BufRead>(reader: R) -> GeneWalkResult<NullDistributions> {
        let mut nulls = NullDistributions::default();
        for line in content_lines(reader) {
            let (bucket, values) = parse_line(&line?)?;
            if nulls.get(&bucket).is_some() {
                return Err(GeneWalkError::InvalidInput(format!(
                    "duplicate null distribution {bucket}"
                )));
            }
            nulls.insert(bucket, values)?;
        }
        info!("Parsed {} null distributions", nulls.len());
        Ok(nulls)
    }

    pub(crate) fn parse<P: AsRef<Path>>(file: P) -> GeneWalkResult<NullDistributions> {
        from_reader(open(file)?)
    }

}
