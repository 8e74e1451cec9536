//! Small vector helpers used by the stabilization math in [`crate::engine`].
//!
//! Mirrors the teacher's `linalg::vector_ops` module (component-wise helpers
//! over `faer::Col`), adapted to operate over an *active index set* rather
//! than a whole dense vector, since the engine's dual vectors are indexed by
//! the model's original row ids but only a subset of rows is "active" after
//! compaction (§4.4 step 2).

use crate::{E, I};

/// Euclidean norm of `vec`, restricted to `indices`.
pub fn norm_restricted(indices: &[I], vec: &[E]) -> E {
    indices
        .iter()
        .map(|&i| {
            let v = vec.get(i).copied().unwrap_or(0.0);
            v * v
        })
        .sum::<E>()
        .sqrt()
}

/// Euclidean norm of `v1 - v2`, restricted to `indices`.
pub fn norm_diff_restricted(indices: &[I], v1: &[E], v2: &[E]) -> E {
    indices
        .iter()
        .map(|&i| {
            let d = v1.get(i).copied().unwrap_or(0.0) - v2.get(i).copied().unwrap_or(0.0);
            d * d
        })
        .sum::<E>()
        .sqrt()
}

/// `a + t * (b - a)`, restricted to `indices` (all other entries copied
/// from `a`). Used for every convex combination / affine step in the
/// stabilization math (`pi_sep`, `pi_g`, `rho`, ...).
pub fn affine_combine(indices: &[I], a: &[E], b: &[E], t: E, len: usize) -> Vec<E> {
    let mut out = a.to_vec();
    out.resize(len, 0.0);
    for &i in indices {
        let a_i = a.get(i).copied().unwrap_or(0.0);
        let b_i = b.get(i).copied().unwrap_or(0.0);
        out[i] = a_i + t * (b_i - a_i);
    }
    out
}

/// Inner product of `x` and `y`, restricted to `indices`.
pub fn dot_restricted(indices: &[I], x: &[E], y: &[E]) -> E {
    indices
        .iter()
        .map(|&i| x.get(i).copied().unwrap_or(0.0) * y.get(i).copied().unwrap_or(0.0))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn norm_restricted_ignores_inactive_indices() {
        let v = vec![3.0, 4.0, 100.0];
        assert_eq!(norm_restricted(&[0, 1], &v), 5.0);
    }

    #[test]
    fn norm_diff_restricted_matches_manual_computation() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![0.0, 2.0, 10.0];
        // only index 0 differs: |1 - 0| = 1
        assert_eq!(norm_diff_restricted(&[0, 1], &a, &b), 1.0);
    }

    #[test]
    fn affine_combine_interpolates() {
        let a = vec![0.0, 0.0];
        let b = vec![2.0, 4.0];
        let mid = affine_combine(&[0, 1], &a, &b, 0.5, 2);
        assert_eq!(mid, vec![1.0, 2.0]);
    }

    #[test]
    fn dot_restricted_sums_only_active_indices() {
        let x = vec![1.0, 2.0, 3.0];
        let y = vec![1.0, 1.0, 1.0];
        assert_eq!(dot_restricted(&[0, 2], &x, &y), 4.0);
    }
}
