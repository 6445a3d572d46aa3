//! Vector primitives for both engines: sparse TF-IDF vectors for the
//! content engine, dense cosine for latent factors.

/// A sparse feature vector: (dimension, weight) pairs sorted by dimension.
///
/// Content vectors are L2-normalized at build time, so cosine similarity
/// between two of them reduces to a sparse dot product.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(u32, f32)>,
}

impl SparseVector {
    /// Build from unordered (dimension, weight) pairs. Zero weights are
    /// dropped; duplicate dimensions are summed.
    pub fn from_entries(mut entries: Vec<(u32, f32)>) -> Self {
        entries.sort_unstable_by_key(|(dim, _)| *dim);
        let mut merged: Vec<(u32, f32)> = Vec::with_capacity(entries.len());
        for (dim, weight) in entries {
            match merged.last_mut() {
                Some((last_dim, last_weight)) if *last_dim == dim => *last_weight += weight,
                _ => merged.push((dim, weight)),
            }
        }
        merged.retain(|(_, w)| *w != 0.0);
        Self { entries: merged }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn norm(&self) -> f32 {
        self.entries
            .iter()
            .map(|(_, w)| w * w)
            .sum::<f32>()
            .sqrt()
    }

    /// Scale to unit L2 norm. A zero vector stays zero.
    pub fn l2_normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }

    /// Sparse dot product via merge over the sorted entry lists
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (da, wa) = self.entries[i];
            let (db, wb) = other.entries[j];
            match da.cmp(&db) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += wa * wb;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }
}

/// Cosine similarity between two dense vectors.
///
/// Returns 0.0 for mismatched lengths or zero-norm inputs rather than
/// dividing by zero.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_entries_sorts_and_merges() {
        let v = SparseVector::from_entries(vec![(3, 1.0), (1, 2.0), (3, 0.5)]);
        assert_eq!(v.nnz(), 2);
        assert!((v.dot(&SparseVector::from_entries(vec![(3, 1.0)])) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_and_dot() {
        let mut a = SparseVector::from_entries(vec![(0, 3.0), (1, 4.0)]);
        a.l2_normalize();
        assert!((a.norm() - 1.0).abs() < 1e-6);

        // Unit vector dotted with itself is 1
        assert!((a.dot(&a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_disjoint_vectors_are_orthogonal() {
        let a = SparseVector::from_entries(vec![(0, 1.0), (2, 1.0)]);
        let b = SparseVector::from_entries(vec![(1, 1.0), (3, 1.0)]);
        assert_eq!(a.dot(&b), 0.0);
    }

    #[test]
    fn test_zero_vector_stays_zero() {
        let mut v = SparseVector::default();
        v.l2_normalize();
        assert!(v.is_empty());
        assert_eq!(v.norm(), 0.0);
    }

    #[test]
    fn test_dense_cosine() {
        assert!((cosine(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!((cosine(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
        assert!((cosine(&[1.0, 1.0], &[-1.0, -1.0]) + 1.0).abs() < 1e-6);
        // Degenerate inputs
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine(&[1.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_dot_is_symmetric() {
        let a = SparseVector::from_entries(vec![(0, 0.3), (5, 0.7), (9, 0.2)]);
        let b = SparseVector::from_entries(vec![(0, 0.5), (9, 0.4)]);
        assert_eq!(a.dot(&b), b.dot(&a));
    }
}
