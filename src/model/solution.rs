use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use super::{Column, ColumnHandle, ColumnType, Model};
use crate::{E, EPSILON, I};

/// Identity key for a [`ColumnHandle`]: two handles are equal under this key
/// iff they point at the same `Column` allocation. Distinct from
/// [`super::StructuralKey`], which compares by content — a [`ColumnMap`]
/// represents a partial *assignment* over specific column objects (e.g.
/// "this exact column, fixed to 3"), not a structural dedup set.
struct IdentityKey(ColumnHandle);

impl PartialEq for IdentityKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for IdentityKey {}
impl Hash for IdentityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        (Arc::as_ptr(&self.0) as usize).hash(state);
    }
}

/// Insertion-ordered mapping from column handle to value.
///
/// Used both to represent partial assignments (fixed columns during
/// branching) and, inside [`SolutionBuilder`], to deduplicate columns by
/// summing the value of repeated `add_column` calls.
#[derive(Default, Clone)]
pub struct ColumnMap {
    order: Vec<ColumnHandle>,
    values: HashMap<usize, E>,
    index: HashMap<usize, usize>,
}

fn ptr_key(handle: &ColumnHandle) -> usize {
    Arc::as_ptr(handle) as usize
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn contains(&self, handle: &ColumnHandle) -> bool {
        self.index.contains_key(&ptr_key(handle))
    }

    pub fn get_column_value(&self, handle: &ColumnHandle, default: E) -> E {
        self.index
            .get(&ptr_key(handle))
            .map(|&pos| self.values[&pos])
            .unwrap_or(default)
    }

    /// Sets (overwrites) the value associated with `handle`.
    pub fn set_column_value(&mut self, handle: ColumnHandle, value: E) {
        let key = ptr_key(&handle);
        if let Some(&pos) = self.index.get(&key) {
            self.values.insert(pos, value);
        } else {
            let pos = self.order.len();
            self.index.insert(key, pos);
            self.values.insert(pos, value);
            self.order.push(handle);
        }
    }

    /// Adds `value` to whatever is already associated with `handle`
    /// (inserting a fresh zero-valued entry first if needed).
    pub fn accumulate(&mut self, handle: ColumnHandle, value: E) {
        let existing = self.get_column_value(&handle, 0.0);
        self.set_column_value(handle, existing + value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ColumnHandle, E)> {
        self.order.iter().map(move |h| (h, self.values[&self.index[&ptr_key(h)]]))
    }
}

/// A built, immutable solution: the model it was built against, whether it
/// satisfies every row and integrality constraint, the objective value, the
/// per-row activity, and the nonzero columns with their values.
#[derive(Clone)]
pub struct Solution {
    model: Arc<Model>,
    feasible: bool,
    objective_value: E,
    row_values: Vec<E>,
    columns: Vec<(ColumnHandle, E)>,
}

impl Solution {
    pub fn model(&self) -> &Arc<Model> {
        &self.model
    }

    pub fn feasible(&self) -> bool {
        self.feasible
    }

    pub fn objective_value(&self) -> E {
        self.objective_value
    }

    pub fn row_value(&self, row: I) -> E {
        self.row_values.get(row).copied().unwrap_or(0.0)
    }

    pub fn row_values(&self) -> &[E] {
        &self.row_values
    }

    pub fn columns(&self) -> &[(ColumnHandle, E)] {
        &self.columns
    }
}

/// Builds a [`Solution`]: accumulate columns (duplicates summed), then
/// [`SolutionBuilder::build`] computes `row_values`, `objective_value`, and
/// feasibility in one pass.
#[derive(Default)]
pub struct SolutionBuilder {
    model: Option<Arc<Model>>,
    columns: ColumnMap,
}

impl SolutionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model(&mut self, model: Arc<Model>) -> &mut Self {
        self.model = Some(model);
        self
    }

    /// Adds `value` worth of `handle` to the solution under construction.
    /// Adding the same column twice sums their values (P9).
    pub fn add_column(&mut self, handle: ColumnHandle, value: E) -> &mut Self {
        self.columns.accumulate(handle, value);
        self
    }

    /// Computes `row_values`, `objective_value`, and feasibility, and
    /// returns the finished, immutable [`Solution`].
    ///
    /// Feasibility (P2): for every row, `lower_bound - eps <= row_value <=
    /// upper_bound + eps`, and for every integer-typed column with nonzero
    /// value, `|value - round(value)| <= eps`.
    pub fn build(self) -> Solution {
        let model = self.model.expect("SolutionBuilder::build called without set_model");

        let mut row_values = vec![0.0; model.num_rows()];
        let mut objective_value = 0.0;
        let mut feasible = true;

        let columns: Vec<(ColumnHandle, E)> = self.columns.iter().map(|(h, v)| (h.clone(), v)).collect();

        for (column, value) in &columns {
            objective_value += column.objective_coefficient * value;
            for term in &column.elements {
                if let Some(slot) = row_values.get_mut(term.row) {
                    *slot += value * term.coefficient;
                }
            }
            if column.r#type == ColumnType::Integer
                && (value - value.round()).abs() > EPSILON
            {
                feasible = false;
            }
        }

        for (row, &value) in row_values.iter().enumerate() {
            let row_def = &model.rows()[row];
            if value < row_def.lower_bound - EPSILON || value > row_def.upper_bound + EPSILON {
                feasible = false;
            }
        }

        Solution {
            model,
            feasible,
            objective_value,
            row_values,
            columns,
        }
    }
}
