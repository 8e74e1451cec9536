use crate::E;

/// A single constraint row: `lower_bound <= sum(value * coefficient) <= upper_bound`.
///
/// `coefficient_lower_bound`/`coefficient_upper_bound` are declarative hints,
/// not enforced constraints of the row itself: they promise that any column
/// the framework generates has its coefficient on this row inside that
/// range, and are used both to validate pricing-oracle output
/// ([`crate::model::Model::check_generated_column`]) and to decide whether
/// the row can be dropped from the compacted active set (§4.4 step 2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row {
    pub lower_bound: E,
    pub upper_bound: E,
    pub coefficient_lower_bound: E,
    pub coefficient_upper_bound: E,
}

impl Row {
    /// Creates a row, panicking if `lower_bound > upper_bound`.
    ///
    /// This invariant is a programmer error on the caller's part (it
    /// describes the static problem structure, not a computed quantity), so
    /// it is checked eagerly rather than folded into the fallible error
    /// taxonomy.
    pub fn new(
        lower_bound: E,
        upper_bound: E,
        coefficient_lower_bound: E,
        coefficient_upper_bound: E,
    ) -> Self {
        assert!(
            lower_bound <= upper_bound,
            "row lower_bound {lower_bound} exceeds upper_bound {upper_bound}"
        );
        Self {
            lower_bound,
            upper_bound,
            coefficient_lower_bound,
            coefficient_upper_bound,
        }
    }

    /// An equality row: `lower_bound == upper_bound == value`.
    pub fn equality(value: E, coefficient_lower_bound: E, coefficient_upper_bound: E) -> Self {
        Self::new(value, value, coefficient_lower_bound, coefficient_upper_bound)
    }

    /// Whether `coefficient` lies within `[coefficient_lower_bound, coefficient_upper_bound]`,
    /// within `epsilon`.
    pub fn coefficient_in_range(&self, coefficient: E, epsilon: E) -> bool {
        coefficient >= self.coefficient_lower_bound - epsilon
            && coefficient <= self.coefficient_upper_bound + epsilon
    }

    /// `true` when all declared coefficients on this row are nonnegative,
    /// the sign condition used by the compacted-active-row test (§4.4 step 2).
    pub fn has_nonnegative_coefficients(&self) -> bool {
        self.coefficient_lower_bound >= 0.0
    }

    /// Whether the row is saturated at its upper bound given the current
    /// contribution `row_value`, under the nonnegative-coefficient
    /// compaction rule.
    pub fn is_saturated(&self, row_value: E, epsilon: E) -> bool {
        self.has_nonnegative_coefficients() && (row_value - self.upper_bound).abs() <= epsilon
    }

    /// Whether `row_value` already exceeds the upper bound under the
    /// nonnegative-coefficient compaction rule, i.e. the row is infeasible
    /// before any column generation even starts.
    pub fn is_over_saturated(&self, row_value: E, epsilon: E) -> bool {
        self.has_nonnegative_coefficients() && row_value > self.upper_bound + epsilon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saturation_requires_nonnegative_coefficients() {
        let row = Row::new(0.0, 1.0, 0.0, 1.0);
        assert!(row.is_saturated(1.0, crate::EPSILON));
        assert!(!row.is_saturated(0.5, crate::EPSILON));

        let mixed_sign_row = Row::new(0.0, 1.0, -1.0, 1.0);
        assert!(!mixed_sign_row.is_saturated(1.0, crate::EPSILON));
    }

    #[test]
    fn over_saturation_detects_infeasible_fixed_contribution() {
        let row = Row::new(0.0, 1.0, 0.0, 1.0);
        assert!(row.is_over_saturated(1.5, crate::EPSILON));
        assert!(!row.is_over_saturated(1.0, crate::EPSILON));
    }

    #[test]
    #[should_panic]
    fn rejects_inverted_bounds() {
        Row::new(1.0, 0.0, 0.0, 1.0);
    }
}
