//! Constrained variables and their arena.
//!
//! A [`Variable`] holds its current value plus the bookkeeping the planner
//! needs to maintain the dataflow graph incrementally: the constraint that
//! currently determines it, its walkabout strength, its stay flag, and a
//! scratch mark used during traversals.
//!
//! Variables live in a [`VariableArena`] owned by the planner and are
//! addressed by [`VariableId`] handles, so the cyclic variable/constraint
//! references of the graph are plain indices rather than owning pointers.

use crate::constraint::ConstraintId;
use crate::strength::Strength;
use std::ops::{Index, IndexMut};

/// Handle to a variable in a planner's arena.
///
/// Ids are scoped to the planner that created them; indexing another
/// planner's arena with this id is a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VariableId(pub(crate) usize);

/// A constrained variable.
///
/// Mutated only by constraint execution and by the edit-constraint protocol
/// of [`Planner::set_value`](crate::Planner::set_value); never destroyed.
#[derive(Debug, Clone)]
pub struct Variable {
    /// Symbolic name, for reporting.
    name: String,
    /// Current value.
    pub(crate) value: i64,
    /// Every constraint that references this variable, in insertion order.
    /// Stable order keeps traversal (and therefore plans) deterministic.
    pub(crate) constraints: Vec<ConstraintId>,
    /// The constraint currently outputting to this variable, if any.
    pub(crate) determined_by: Option<ConstraintId>,
    /// Traversal scratch field. Only meaningful while the planner traversal
    /// that stamped it is in progress.
    pub(crate) mark: u64,
    /// The strength currently winning at this variable.
    pub(crate) walk_strength: Strength,
    /// True if no constraint will change this variable during plan execution.
    pub(crate) stay: bool,
}

impl Variable {
    pub(crate) fn new(name: impl Into<String>, value: i64) -> Self {
        Self {
            name: name.into(),
            value,
            constraints: Vec::with_capacity(2),
            determined_by: None,
            mark: 0,
            walk_strength: Strength::Weakest,
            stay: true,
        }
    }

    /// Symbolic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current value.
    pub fn value(&self) -> i64 {
        self.value
    }

    /// The strength currently governing this variable's value.
    pub fn walk_strength(&self) -> Strength {
        self.walk_strength
    }

    /// Whether this variable is a planning-time constant.
    pub fn stay(&self) -> bool {
        self.stay
    }

    /// The constraint currently determining this variable, if any.
    pub fn determined_by(&self) -> Option<ConstraintId> {
        self.determined_by
    }

    /// Registers a constraint in the back-reference set.
    pub(crate) fn add_constraint(&mut self, c: ConstraintId) {
        self.constraints.push(c);
    }

    /// Removes all traces of `c` from this variable.
    pub(crate) fn remove_constraint(&mut self, c: ConstraintId) {
        self.constraints.retain(|&other| other != c);
        if self.determined_by == Some(c) {
            self.determined_by = None;
        }
    }
}

/// Arena of variables. Slots are never freed.
#[derive(Debug, Default)]
pub(crate) struct VariableArena {
    slots: Vec<Variable>,
}

impl VariableArena {
    pub(crate) fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn alloc(&mut self, name: impl Into<String>, value: i64) -> VariableId {
        let id = VariableId(self.slots.len());
        self.slots.push(Variable::new(name, value));
        id
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

impl Index<VariableId> for VariableArena {
    type Output = Variable;

    fn index(&self, id: VariableId) -> &Variable {
        &self.slots[id.0]
    }
}

impl IndexMut<VariableId> for VariableArena {
    fn index_mut(&mut self, id: VariableId) -> &mut Variable {
        &mut self.slots[id.0]
    }
}
