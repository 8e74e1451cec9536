//! Wentges and directional-smoothing stabilization math (§4.4 "Stabilized
//! pricing inner loop" and "Self-adjusting alpha").
//!
//! Kept as a handful of small, independently testable pure functions over
//! full-length dual vectors and an active-row index set, the way the
//! teacher keeps its step-size/line-search strategies
//! (`nlp::gd::stepsize`, `nlp::ipm::line_search`) separate from the driver
//! loop that calls them.

use crate::linalg::{affine_combine, dot_restricted, norm_diff_restricted, norm_restricted};
use crate::{E, I};

/// Tolerance subtracted inside `alpha_k` so that it reaches exactly `0.0`
/// once `k` is large enough, matching the formula in §4.4 verbatim.
const ALPHA_EPSILON: E = 1e-9;

/// `alpha_k = max(0, 1 - k*(1 - alpha) - epsilon)` for mispricing attempt
/// `k` (1-indexed).
pub fn wentges_alpha_k(alpha: E, k: usize) -> E {
    (1.0 - (k as E) * (1.0 - alpha) - ALPHA_EPSILON).max(0.0)
}

/// Tracks the two smoothing parameters across one CG call's main loop.
///
/// `beta` only changes inside [`StabilizationState::directional_beta`],
/// which is called at most once per main-loop iteration (attempt `k == 1`
/// of the mispricing loop); plain-smoothing attempts (`k > 1`) reuse
/// whatever `beta` currently holds, matching the spec's rule that
/// directional smoothing is only ever attempted on the first mispricing
/// attempt of a given main-loop iteration.
#[derive(Debug, Clone, Copy)]
pub struct StabilizationState {
    pub alpha: E,
    pub beta: E,
}

impl StabilizationState {
    pub fn new(alpha0: E, beta0: E) -> Self {
        Self {
            alpha: alpha0,
            beta: beta0,
        }
    }

    /// Self-adjusting alpha update (§4.4 step H). No-op unless
    /// `duals_sep != duals_in` on the active set.
    ///
    /// The source carries a comment "I don't understand why" next to the
    /// sign of the inner product used here (§9 Open Questions); this
    /// implements the formula exactly as specified rather than guessing at
    /// a correction.
    pub fn self_adjust_alpha(
        &mut self,
        active_rows: &[I],
        subgradient: &[E],
        duals_sep: &[E],
        duals_in: &[E],
    ) {
        if norm_diff_restricted(active_rows, duals_sep, duals_in) == 0.0 {
            return;
        }
        let delta: Vec<E> = (0..duals_sep.len().max(duals_in.len()))
            .map(|i| duals_sep.get(i).copied().unwrap_or(0.0) - duals_in.get(i).copied().unwrap_or(0.0))
            .collect();
        let v = dot_restricted(active_rows, subgradient, &delta);
        if v > 0.0 {
            self.alpha = (self.alpha - 0.1).max(0.0);
        } else {
            self.alpha = self.alpha + 0.1 * (1.0 - self.alpha);
            self.alpha = self.alpha.min(0.99);
        }
    }

    /// Computes (and stores) beta for the directional-smoothing branch,
    /// guarding both degenerate divisions the design notes call out:
    /// `‖g‖ = 0` and `‖pi_in - pi_g‖ = 0` both fall through to the plain
    /// `(pi_out - pi_in)` direction rather than dividing by zero.
    fn directional_beta(
        &mut self,
        active_rows: &[I],
        auto: bool,
        duals_in: &[E],
        duals_out: &[E],
        pi_g: &[E],
    ) -> E {
        if !auto {
            return self.beta;
        }
        let norm_in_out = norm_diff_restricted(active_rows, duals_in, duals_out);
        let norm_in_g = norm_diff_restricted(active_rows, duals_in, pi_g);
        let beta = if norm_in_out > 0.0 && norm_in_g > 0.0 {
            let diff_out: Vec<E> = (0..duals_out.len())
                .map(|i| duals_out[i] - duals_in.get(i).copied().unwrap_or(0.0))
                .collect();
            let diff_g: Vec<E> = (0..pi_g.len())
                .map(|i| pi_g[i] - duals_in.get(i).copied().unwrap_or(0.0))
                .collect();
            let ip = dot_restricted(active_rows, &diff_out, &diff_g);
            (ip / (norm_in_out * norm_in_g)).max(0.0)
        } else {
            0.0
        };
        self.beta = beta;
        beta
    }
}

/// The separation point `pi_sep` for one mispricing attempt (§4.4).
///
/// `len` is the full vector length (number of original model rows);
/// `attempt` is 1-indexed; `directional_allowed` encodes "k == 1, not the
/// first main-loop iteration, and directional smoothing is configured" —
/// the caller decides that once per main-loop iteration, since it depends
/// on whether this is iteration 1 of the CG call.
#[allow(clippy::too_many_arguments)]
pub fn separation_point(
    state: &mut StabilizationState,
    active_rows: &[I],
    duals_in: &[E],
    duals_out: &[E],
    subgradient: &[E],
    attempt: usize,
    len: usize,
    directional_allowed: bool,
    auto_directional: bool,
) -> Vec<E> {
    let alpha_k = wentges_alpha_k(state.alpha, attempt);

    let no_directional_room = state.beta == 0.0 && !auto_directional;
    let norm_in_out = norm_diff_restricted(active_rows, duals_in, duals_out);
    let use_plain = attempt > 1 || !directional_allowed || norm_in_out == 0.0 || no_directional_room;

    if use_plain {
        return affine_combine(active_rows, duals_in, duals_out, 1.0 - alpha_k, len);
    }

    let pi_tilde = affine_combine(active_rows, duals_in, duals_out, 1.0 - alpha_k, len);

    let norm_g = norm_restricted(active_rows, subgradient);
    let pi_g = if norm_g > 0.0 {
        let scale = norm_in_out / norm_g;
        let mut out = duals_in.to_vec();
        out.resize(len, 0.0);
        for &r in active_rows {
            out[r] = duals_in.get(r).copied().unwrap_or(0.0) + scale * subgradient.get(r).copied().unwrap_or(0.0);
        }
        out
    } else {
        duals_in.to_vec()
    };

    let beta = state.directional_beta(active_rows, auto_directional, duals_in, duals_out, &pi_g);

    let mut rho = duals_out.to_vec();
    rho.resize(len, 0.0);
    for &r in active_rows {
        let g_val = beta * pi_g.get(r).copied().unwrap_or(0.0) + (1.0 - beta) * duals_out.get(r).copied().unwrap_or(0.0);
        rho[r] = g_val;
    }

    let norm_in_rho = norm_diff_restricted(active_rows, duals_in, &rho);
    if norm_in_rho == 0.0 {
        // Guard against division by zero (design notes: the newer source
        // falls through to plain smoothing here; the older one does not).
        return pi_tilde;
    }
    let norm_in_tilde = norm_diff_restricted(active_rows, duals_in, &pi_tilde);
    let scale = norm_in_tilde / norm_in_rho;

    let mut out = duals_in.to_vec();
    out.resize(len, 0.0);
    for &r in active_rows {
        let in_r = duals_in.get(r).copied().unwrap_or(0.0);
        out[r] = in_r + scale * (rho[r] - in_r);
    }
    out
}

/// Subgradient update (§4.4 step G): `g_r = clamp(u'_r - a_r, -inf, 0) +
/// clamp(l'_r - a_r, 0, inf)` over active rows, where `a_r` is the sum of
/// the raw coefficients the new columns this iteration carry on row `r`.
pub fn subgradient(active_rows: &[I], shifted_lb: &[E], shifted_ub: &[E], a: &[E], len: usize) -> Vec<E> {
    let mut g = vec![0.0; len];
    for &r in active_rows {
        let a_r = a.get(r).copied().unwrap_or(0.0);
        let u = shifted_ub.get(r).copied().unwrap_or(0.0);
        let l = shifted_lb.get(r).copied().unwrap_or(0.0);
        g[r] = (u - a_r).min(0.0) + (l - a_r).max(0.0);
    }
    g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_k_decreases_to_zero_with_attempts() {
        assert!(wentges_alpha_k(0.9, 1) > wentges_alpha_k(0.9, 5));
        assert_eq!(wentges_alpha_k(0.9, 100), 0.0);
    }

    #[test]
    fn separation_point_lies_between_in_and_out_for_plain_smoothing() {
        let mut state = StabilizationState::new(0.5, 0.0);
        let duals_in = vec![0.0, 0.0];
        let duals_out = vec![4.0, 2.0];
        let g = vec![0.0, 0.0];
        let sep = separation_point(&mut state, &[0, 1], &duals_in, &duals_out, &g, 1, 2, false, false);
        // alpha_k for attempt 1, alpha=0.5 -> 1 - 1*0.5 - eps ~= 0.5
        // pi_sep = alpha_k*in + (1-alpha_k)*out, strictly inside [in, out] componentwise
        for i in 0..2 {
            assert!(sep[i] >= duals_in[i] - 1e-9 && sep[i] <= duals_out[i] + 1e-9);
        }
    }

    #[test]
    fn separation_point_with_directional_smoothing_does_not_divide_by_zero() {
        let mut state = StabilizationState::new(0.5, 0.5);
        let duals_in = vec![0.0, 0.0];
        let duals_out = vec![1.0, 1.0];
        let g = vec![0.0, 0.0]; // zero subgradient: must fall back gracefully
        let sep = separation_point(&mut state, &[0, 1], &duals_in, &duals_out, &g, 2, 2, true, true);
        assert!(sep.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn self_adjust_alpha_stays_in_unit_interval() {
        let mut state = StabilizationState::new(0.9, 0.0);
        let g = vec![1.0, -1.0];
        let duals_sep = vec![1.0, 1.0];
        let duals_in = vec![0.0, 0.0];
        for _ in 0..20 {
            state.self_adjust_alpha(&[0, 1], &g, &duals_sep, &duals_in);
            assert!(state.alpha >= 0.0 && state.alpha <= 0.99);
        }
    }

    #[test]
    fn subgradient_matches_clamp_formula() {
        let active = [0usize];
        let shifted_lb = vec![2.0];
        let shifted_ub = vec![5.0];
        let a = vec![3.0];
        let g = subgradient(&active, &shifted_lb, &shifted_ub, &a, 1);
        // u - a = 2 (clamped to <=0 -> 0), l - a = -1 (clamped to >=0 -> 0)
        assert_eq!(g[0], 0.0);

        let a_low = vec![0.0];
        let g_low = subgradient(&active, &shifted_lb, &shifted_ub, &a_low, 1);
        // u - a = 5 -> clamp <=0 -> 0 ; l - a = 2 -> clamp >=0 -> 2
        assert_eq!(g_low[0], 2.0);
    }
}
