use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::{E, I};

/// A single `(row, coefficient)` entry of a column's sparse representation.
/// Row indices need not be sorted within a column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTerm {
    pub row: I,
    pub coefficient: E,
}

impl LinearTerm {
    pub fn new(row: I, coefficient: E) -> Self {
        Self { row, coefficient }
    }
}

/// The domain of a master-problem variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnType {
    #[default]
    Continuous,
    Integer,
}

/// A variable in the master problem.
///
/// Columns are never mutated after creation; they are shared via
/// [`ColumnHandle`] (a reference-counted handle) so that the LP backend,
/// the column pool, any in-flight [`crate::model::Solution`], and tree-search
/// nodes can all hold the same column without duplicating it. Handle
/// equality is identity (`Arc::ptr_eq`); *structural* equality (used for
/// pool deduplication) is provided separately by [`StructuralKey`].
pub struct Column {
    pub r#type: ColumnType,
    pub lower_bound: E,
    pub upper_bound: E,
    pub objective_coefficient: E,
    pub elements: Vec<LinearTerm>,
    pub branching_priority: E,
    /// Opaque, read-only user payload used to decode a column back into a
    /// domain object (a route, a bin-packing pattern, ...). Downcast with
    /// [`Column::extra_as`].
    pub extra: Option<Arc<dyn Any + Send + Sync>>,
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("type", &self.r#type)
            .field("lower_bound", &self.lower_bound)
            .field("upper_bound", &self.upper_bound)
            .field("objective_coefficient", &self.objective_coefficient)
            .field("elements", &self.elements)
            .field("branching_priority", &self.branching_priority)
            .field("extra", &self.extra.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}

/// Shared, immutable handle to a [`Column`].
pub type ColumnHandle = Arc<Column>;

impl Column {
    /// Builds a column with the domain defaults from the spec: a
    /// continuous variable bounded in `[0, 1]`.
    pub fn new(objective_coefficient: E, elements: Vec<LinearTerm>) -> Self {
        Self {
            r#type: ColumnType::Continuous,
            lower_bound: 0.0,
            upper_bound: 1.0,
            objective_coefficient,
            elements,
            branching_priority: 0.0,
            extra: None,
        }
    }

    pub fn with_type(mut self, r#type: ColumnType) -> Self {
        self.r#type = r#type;
        self
    }

    pub fn with_bounds(mut self, lower_bound: E, upper_bound: E) -> Self {
        self.lower_bound = lower_bound;
        self.upper_bound = upper_bound;
        self
    }

    pub fn with_branching_priority(mut self, branching_priority: E) -> Self {
        self.branching_priority = branching_priority;
        self
    }

    pub fn with_extra<T: Any + Send + Sync>(mut self, extra: T) -> Self {
        self.extra = Some(Arc::new(extra));
        self
    }

    pub fn into_handle(self) -> ColumnHandle {
        Arc::new(self)
    }

    /// Downcasts the opaque `extra` payload, if one was set and matches `T`.
    pub fn extra_as<T: Any>(&self) -> Option<&T> {
        self.extra.as_ref().and_then(|e| e.downcast_ref::<T>())
    }

    /// The coefficient this column has on `row`, if any. Sparse and
    /// unsorted, so this is a linear scan (as are all row lookups, per the
    /// source's own sparse representation).
    pub fn coefficient_on(&self, row: I) -> Option<E> {
        self.elements
            .iter()
            .find(|term| term.row == row)
            .map(|term| term.coefficient)
    }
}

/// Hashes and compares [`Column`]s *structurally*: by objective coefficient
/// and the multiset of `(row, coefficient)` elements, independent of
/// insertion order. Two handles that point at distinct but structurally
/// identical columns compare equal under this key; this is what the column
/// pool (P6 "no two distinct column handles are structurally equal") relies
/// on to deduplicate.
///
/// Equality is checked both ways (every element of `a` has a match in `b`
/// and vice versa, by multiplicity) rather than "does `a` contain `b`"
/// alone, to guard against a column that lists the same row twice: a naive
/// one-directional containment check can't tell `[(r,1), (r,1)]` apart from
/// `[(r,1)]`.
pub struct StructuralKey(pub ColumnHandle);

fn sorted_terms(column: &Column) -> Vec<(I, u64)> {
    let mut terms: Vec<(I, u64)> = column
        .elements
        .iter()
        .map(|t| (t.row, t.coefficient.to_bits()))
        .collect();
    terms.sort_unstable();
    terms
}

impl PartialEq for StructuralKey {
    fn eq(&self, other: &Self) -> bool {
        if self.0.objective_coefficient.to_bits() != other.0.objective_coefficient.to_bits() {
            return false;
        }
        sorted_terms(&self.0) == sorted_terms(&other.0)
    }
}

impl Eq for StructuralKey {}

impl Hash for StructuralKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.objective_coefficient.to_bits().hash(state);
        // Order-independent combination so that insertion order of
        // `elements` never affects the hash: fold with a commutative
        // operator instead of hashing the sequence directly.
        let mut acc: u64 = 0;
        for term in &self.0.elements {
            let mut term_hasher = std::collections::hash_map::DefaultHasher::new();
            term.row.hash(&mut term_hasher);
            term.coefficient.to_bits().hash(&mut term_hasher);
            acc ^= term_hasher.finish();
        }
        acc.hash(state);
    }
}

impl Clone for StructuralKey {
    fn clone(&self) -> Self {
        StructuralKey(Arc::clone(&self.0))
    }
}
