use std::collections::HashMap;

use crate::model::{ColumnHandle, StructuralKey};

/// Accumulates every unique column generated across all CG iterations and
/// all driver restarts within one driver invocation; destroyed at driver
/// exit (it is owned by the driver, not by any individual CG call).
///
/// Insertion order equals first-generation order (§5), and uniqueness is
/// structural (P6): inserting a column that is structurally equal to one
/// already present is a no-op.
#[derive(Default)]
pub struct ColumnPool {
    order: Vec<ColumnHandle>,
    seen: HashMap<StructuralKey, usize>,
}

impl ColumnPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Inserts `handle` if no structurally-equal column is already present.
    /// Returns `true` if this was a genuinely new column.
    pub fn insert(&mut self, handle: ColumnHandle) -> bool {
        let key = StructuralKey(handle.clone());
        if self.seen.contains_key(&key) {
            return false;
        }
        let pos = self.order.len();
        self.seen.insert(key, pos);
        self.order.push(handle);
        true
    }

    pub fn contains(&self, handle: &ColumnHandle) -> bool {
        self.seen.contains_key(&StructuralKey(handle.clone()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnHandle> {
        self.order.iter()
    }
}
