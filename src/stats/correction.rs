//! Multiple testing correction
//!
//! Every GO annotation of a gene is tested separately, so the p-values
//! of one gene are corrected together to control the false discovery rate.

use crate::stats::f64_from_usize;
use crate::GeneWalkError;
use crate::GeneWalkResult;

/// Benjamini-Hochberg adjusted p-values for independent tests
///
/// Returns the adjusted p-values in the same order as `pvalues`.
/// Adjusted values are `p * n / rank`, made monotonic from the largest
/// p-value downwards and clamped to `1.0`.
///
/// # Errors
///
/// [`GeneWalkError::InvalidInput`] if a p-value is outside of `[0, 1]`
///
/// # Examples
///
/// ```
/// use genewalk::stats::correction::benjamini_hochberg;
///
/// let padj = benjamini_hochberg(&[0.01, 0.6]).unwrap();
/// assert!((padj[0] - 0.02).abs() < 1e-12);
/// assert!((padj[1] - 0.6).abs() < 1e-12);
/// ```
pub fn benjamini_hochberg(pvalues: &[f64]) -> GeneWalkResult<Vec<f64>> {
    for (idx, pvalue) in pvalues.iter().enumerate() {
        if !(0.0..=1.0).contains(pvalue) {
            return Err(GeneWalkError::InvalidInput(format!(
                "p-value at index {idx} is out of range [0, 1]: {pvalue}"
            )));
        }
    }
    let n = pvalues.len();
    if n == 0 {
        return Ok(Vec::new());
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|a, b| pvalues[*a].total_cmp(&pvalues[*b]));

    let total = f64_from_usize(n);
    let mut adjusted = vec![0.0; n];
    let mut previous = 1.0f64;
    for (rank, idx) in order.iter().enumerate().rev() {
        let adj = (pvalues[*idx] * total / f64_from_usize(rank + 1)).min(previous);
        adjusted[*idx] = adj;
        previous = adj;
    }
    Ok(adjusted)
}
