//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A sparse numeric vector: parallel arrays of strictly increasing indices
/// and their non-zero values.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SparseVector {
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Create a sparse vector from parallel arrays.
    ///
    /// Indices must be strictly increasing and aligned with `values`;
    /// builders in this crate (the vectorizer) guarantee that.
    pub fn new(indices: Vec<u32>, values: Vec<f64>) -> Self {
        debug_assert_eq!(indices.len(), values.len());
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));
        Self { indices, values }
    }

    /// The all-zero vector.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// True if the vector has no non-zero entries.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Iterate over `(index, value)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Euclidean norm.
    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    /// Scale all values in place.
    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }

    /// Dot product against a dense weight vector. Indices outside the
    /// dense vector contribute nothing.
    pub fn dot_dense(&self, dense: &[f64]) -> f64 {
        self.iter()
            .filter_map(|(idx, value)| dense.get(idx as usize).map(|w| w * value))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_dense() {
        let v = SparseVector::new(vec![0, 2, 4], vec![1.0, 2.0, 3.0]);
        let dense = [0.5, 9.0, 0.25, 9.0, 2.0];
        assert!((v.dot_dense(&dense) - (0.5 + 0.5 + 6.0)).abs() < 1e-12);
    }

    #[test]
    fn test_dot_dense_out_of_range_ignored() {
        let v = SparseVector::new(vec![0, 10], vec![1.0, 5.0]);
        assert!((v.dot_dense(&[2.0]) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_l2_norm_and_scale() {
        let mut v = SparseVector::new(vec![1, 3], vec![3.0, 4.0]);
        assert!((v.l2_norm() - 5.0).abs() < 1e-12);
        v.scale(1.0 / 5.0);
        assert!((v.l2_norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_vector() {
        let v = SparseVector::empty();
        assert_eq!(v.nnz(), 0);
        assert!(v.is_empty());
        assert_eq!(v.l2_norm(), 0.0);
        assert_eq!(v.dot_dense(&[1.0, 2.0]), 0.0);
    }
}
