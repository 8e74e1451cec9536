//! Error kinds for the column-generation framework.
//!
//! Follows the teacher's `problemo`-based convention: small `derive_more`
//! error enums per failure family, converted into the crate-wide
//! [`Problem`](problemo::Problem) via `problemo::ProblemResult::via`, with
//! `problemo::common::IntoCommonProblem::gloss` for ad hoc string context.

use derive_more::{Display, Error as ErrorTrait};

/// Top-level error returned by driver entry points.
///
/// `ResourceExhausted` (timer expiry) is deliberately not a variant here:
/// per the propagation policy, it is not an error at all, it is folded into
/// [`crate::Output`] as [`crate::Status::TimeLimit`].
#[derive(Debug, Display, ErrorTrait)]
pub enum Error {
    #[display("invalid argument: {_0}")]
    InvalidArgument(InvalidArgument),

    #[display("restricted master proved infeasible")]
    InfeasibleMaster,

    #[display("pricing oracle violated its contract: {_0}")]
    PricingContractViolation(PricingContractViolation),

    #[display("LP backend error: {_0}")]
    LpBackendError(problemo::Problem),
}

impl From<InvalidArgument> for Error {
    fn from(value: InvalidArgument) -> Self {
        Error::InvalidArgument(value)
    }
}

impl From<PricingContractViolation> for Error {
    fn from(value: PricingContractViolation) -> Self {
        Error::PricingContractViolation(value)
    }
}

impl From<problemo::Problem> for Error {
    fn from(value: problemo::Problem) -> Self {
        Error::LpBackendError(value)
    }
}

/// Arguments rejected at a driver entry point, before any LP or pricing
/// call is made.
#[derive(Debug, Display, ErrorTrait, Clone, Copy, PartialEq)]
pub enum InvalidArgument {
    #[display("dummy_column_objective_coefficient (M) must be nonzero")]
    ZeroDummyObjectiveCoefficient,

    #[display("row index {_0} is negative or otherwise invalid")]
    NegativeRowIndex(#[error(not(source))] crate::I),

    #[display(
        "column coefficient on row {row} is {coefficient}, outside the declared range [{lo}, {hi}]"
    )]
    CoefficientOutOfRange {
        row: crate::I,
        coefficient: crate::E,
        lo: crate::E,
        hi: crate::E,
    },

    #[display("discrepancy_limit must be nonnegative")]
    NegativeDiscrepancyLimit,
}

/// A pricing oracle returned a column that violates the contract of
/// `solve_pricing`: an unknown row, or a coefficient outside the row's
/// declared bounds. Distinct from [`InvalidArgument`] because it is
/// detected mid-solve against columns the caller did not construct by
/// hand, and is always fatal to the current CG call (per §7 of
/// `SPEC_FULL.md`).
#[derive(Debug, Display, ErrorTrait, Clone, Copy, PartialEq)]
pub enum PricingContractViolation {
    #[display("generated column references unknown row {_0}")]
    UnknownRow(#[error(not(source))] crate::I),

    #[display(
        "generated column coefficient on row {row} is {coefficient}, outside the declared range [{lo}, {hi}]"
    )]
    CoefficientOutOfRange {
        row: crate::I,
        coefficient: crate::E,
        lo: crate::E,
        hi: crate::E,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_converts_into_error() {
        let err: Error = InvalidArgument::ZeroDummyObjectiveCoefficient.into();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn pricing_violation_converts_into_error() {
        let err: Error = PricingContractViolation::UnknownRow(3).into();
        assert!(matches!(err, Error::PricingContractViolation(_)));
    }
}
