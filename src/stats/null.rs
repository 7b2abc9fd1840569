use core::fmt::Debug;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::Path;

use tracing::{debug, warn};

use crate::parser;
use crate::stats::f64_from_usize;
use crate::GeneWalkError;
use crate::GeneWalkResult;

/// A connectivity class of the null distributions
///
/// Connectivities are grouped in powers of two: the bucket of a
/// connectivity `n` is `floor(log2(n))`, so `8` and `9` both belong
/// to bucket `d3`.
///
/// # Examples
///
/// ```
/// use genewalk::Bucket;
///
/// assert_eq!(Bucket::from_connectivity(8), Some(Bucket::from(3)));
/// assert_eq!(Bucket::from_connectivity(9), Some(Bucket::from(3)));
/// assert_eq!(Bucket::from_connectivity(0), None);
///
/// // keys written by float formatting are accepted as well
/// assert_eq!(Bucket::try_from("d3.0").unwrap(), Bucket::from(3));
/// assert_eq!(Bucket::from(3).to_string(), "d3");
/// ```
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Bucket {
    exponent: u32,
}

impl Bucket {
    /// Returns the bucket of the connectivity `n`
    ///
    /// Returns `None` for `n == 0`, which has no logarithm
    pub fn from_connectivity(n: usize) -> Option<Self> {
        n.checked_ilog2().map(|exponent| Self { exponent })
    }

    /// The power of two of the bucket
    pub fn exponent(&self) -> u32 {
        self.exponent
    }
}

impl From<u32> for Bucket {
    fn from(exponent: u32) -> Self {
        Self { exponent }
    }
}

impl TryFrom<&str> for Bucket {
    type Error = GeneWalkError;
    /// Parses `d3`, `d3.0` or `3`
    fn try_from(value: &str) -> GeneWalkResult<Self> {
        let value = value.trim();
        let number = value.strip_prefix('d').unwrap_or(value);
        let exponent = match number.split_once('.') {
            Some((int, frac)) if frac.chars().all(|c| c == '0') => int.parse::<u32>()?,
            Some(_) => {
                return Err(GeneWalkError::InvalidInput(format!(
                    "bucket key {value} is not an integer"
                )))
            }
            None => number.parse::<u32>()?,
        };
        Ok(Self { exponent })
    }
}

impl Debug for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bucket({})", self)
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "d{}", self.exponent)
    }
}

/// Empirical null distributions of similarities, one per [`Bucket`]
///
/// Each bucket holds similarities of random node pairs of comparable
/// connectivity, sorted ascending.
///
/// # Examples
///
/// ```
/// use genewalk::{Bucket, NullDistributions};
///
/// let mut nulls = NullDistributions::default();
/// nulls.insert(Bucket::from(3), vec![0.9, 0.1, 0.5, 0.3, 0.7]).unwrap();
///
/// // 3 of 5 null values are below 0.6
/// let pvalue = nulls.pvalue(0.6, 8).unwrap();
/// assert!((pvalue - 0.4).abs() < 1e-12);
///
/// // no null distribution for connectivity 2
/// assert!(nulls.pvalue(0.6, 2).is_err());
/// ```
#[derive(Default, Clone)]
pub struct NullDistributions {
    buckets: BTreeMap<Bucket, Vec<f64>>,
}

impl Debug for NullDistributions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "NullDistributions with {} buckets ({} values)",
            self.buckets.len(),
            self.buckets.values().map(Vec::len).sum::<usize>()
        )
    }
}

impl NullDistributions {
    /// Loads the null distributions from a tab-separated file
    ///
    /// Each line contains the bucket key and the similarity values,
    /// separated by whitespace or commas.
    ///
    /// ```text
    /// d0.0    -0.12 0.03 0.41
    /// d1.0    -0.08 0.11 0.38
    /// ```
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::CannotOpenFile`]: the file can't be opened
    /// - [`GeneWalkError::InvalidInput`]: a line has no values, an invalid key or a non-finite value
    /// - [`GeneWalkError::ParseFloatError`]: a value is not a number
    /// - [`GeneWalkError::EmptyNullBucket`]: a bucket has no values
    pub fn from_file<P: AsRef<Path>>(file: P) -> GeneWalkResult<Self> {
        let nulls = parser::null_distributions::parse(file)?;
        debug!("Loaded {:?}", nulls);
        Ok(nulls)
    }

    /// Adds the null distribution of a bucket, replacing an existing one
    ///
    /// The values are sorted ascending if they are not already.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::EmptyNullBucket`]: `values` is empty
    /// - [`GeneWalkError::InvalidInput`]: a value is `NaN` or infinite
    pub fn insert(&mut self, bucket: Bucket, mut values: Vec<f64>) -> GeneWalkResult<()> {
        if values.is_empty() {
            return Err(GeneWalkError::EmptyNullBucket(bucket));
        }
        if let Some(value) = values.iter().find(|v| !v.is_finite()) {
            return Err(GeneWalkError::InvalidInput(format!(
                "null distribution {bucket} contains {value}"
            )));
        }
        if !values.windows(2).all(|w| w[0] <= w[1]) {
            warn!("Null distribution {} is not sorted", bucket);
            values.sort_by(f64::total_cmp);
        }
        self.buckets.insert(bucket, values);
        Ok(())
    }

    /// Returns the sorted null similarities of a bucket
    pub fn get(&self, bucket: &Bucket) -> Option<&[f64]> {
        self.buckets.get(bucket).map(Vec::as_slice)
    }

    /// The number of buckets
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if there are no buckets
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Iterates the buckets in ascending order
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.keys()
    }

    /// Returns the upper-tail p-value of `similarity` for a node pair
    /// with the given `connectivity`
    ///
    /// The p-value is `1 - rank / len` where `rank` is the number of null
    /// values strictly lower than `similarity`. Ties with null values
    /// therefore count as not more extreme.
    ///
    /// # Errors
    ///
    /// - [`GeneWalkError::MissingNullBucket`]: no null distribution for the connectivity
    /// - [`GeneWalkError::InvalidInput`]: `connectivity` is `0`
    pub fn pvalue(&self, similarity: f64, connectivity: usize) -> GeneWalkResult<f64> {
        let bucket = Bucket::from_connectivity(connectivity).ok_or_else(|| {
            GeneWalkError::InvalidInput("connectivity must be positive".to_string())
        })?;
        let null = self
            .get(&bucket)
            .ok_or(GeneWalkError::MissingNullBucket(bucket))?;

        let rank = null.partition_point(|value| *value < similarity);
        Ok(1.0 - f64_from_usize(rank) / f64_from_usize(null.len()))
    }
}
