//! Execution plans.
//!
//! A [`Plan`] is an ordered list of constraints to execute in sequence to
//! resatisfy all currently satisfiable constraints in the face of one or
//! more changing inputs. It is the build-once, run-many fast path: extract
//! a plan once, then re-execute it for every new input value without
//! touching the planner's satisfaction machinery.

use crate::constraint::ConstraintId;
use crate::planner::Planner;

/// A topologically ordered execution sequence of constraints.
///
/// Purely derived data: a plan built by
/// [`Planner::extract_plan_from_constraints`](crate::Planner::extract_plan_from_constraints)
/// stays valid only as long as the graph it was extracted from is unchanged.
/// After adding or destroying constraints, discard the plan and extract a
/// new one; execution does no re-validation.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    constraints: Vec<ConstraintId>,
}

impl Plan {
    pub(crate) fn new() -> Self {
        Self {
            constraints: Vec::new(),
        }
    }

    pub(crate) fn add_constraint(&mut self, c: ConstraintId) {
        self.constraints.push(c);
    }

    /// Number of constraints in the plan.
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// Whether the plan contains no constraints.
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// The constraint at the given position.
    pub fn constraint_at(&self, index: usize) -> ConstraintId {
        self.constraints[index]
    }

    /// Executes each constraint in order, recomputing every downstream
    /// value from the current inputs.
    pub fn execute(&self, planner: &mut Planner) {
        for &c in &self.constraints {
            planner.execute_constraint(c);
        }
    }
}
