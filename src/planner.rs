//! The incremental planner.
//!
//! [`Planner`] owns the constraint graph (both arenas) and is the only
//! component that mutates its satisfaction state as a whole. It implements
//! the incremental algorithms: adding a constraint cascades re-satisfaction
//! through whatever weaker constraints must yield; removing one repairs the
//! downstream graph by retrying displaced constraints strongest-first; and
//! plan extraction walks the satisfied dataflow graph into an executable
//! sequence.
//!
//! Traversals are stamped with values from a monotonically increasing mark
//! counter. A mark identifies one traversal episode: variables carrying the
//! current mark have been visited (or serve as inputs) in this episode, which
//! both prevents revisiting and detects cycles. Marks are planner-scoped and
//! must never be compared across planner instances.

use crate::constraint::{Constraint, ConstraintArena, ConstraintId};
use crate::plan::Plan;
use crate::strength::Strength;
use crate::variable::{Variable, VariableArena, VariableId};
use std::collections::VecDeque;
use thiserror::Error;

/// Unrecoverable planner failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlannerError {
    /// A constraint with [`Strength::Required`] could not be satisfied.
    ///
    /// A correctly constructed graph never produces this: required
    /// constraints are assumed always satisfiable. Treat it as fatal.
    #[error("could not satisfy a required constraint")]
    RequiredConstraintUnsatisfiable,
}

/// Coordinator for one independent constraint graph.
///
/// Create one planner per graph. All operations run to completion before
/// returning; the planner assumes exclusive access and performs no internal
/// locking.
///
/// # Examples
///
/// ```
/// use deltablue::{Planner, Strength};
///
/// let mut planner = Planner::new();
/// let a = planner.add_variable("a", 1);
/// let b = planner.add_variable("b", 2);
/// planner.add_equality(a, b, Strength::Required).unwrap();
///
/// planner.set_value(a, 10, Strength::Preferred).unwrap();
/// assert_eq!(planner.value(b), 10);
/// ```
#[derive(Debug, Default)]
pub struct Planner {
    vars: VariableArena,
    constraints: ConstraintArena,
    current_mark: u64,
    cycles_detected: usize,
}

impl Planner {
    /// Creates an empty planner.
    pub fn new() -> Self {
        Self {
            vars: VariableArena::new(),
            constraints: ConstraintArena::new(),
            current_mark: 0,
            cycles_detected: 0,
        }
    }

    // ---- variables ----

    /// Creates a variable with the given name and initial value.
    ///
    /// New variables start undetermined, with the weakest walkabout strength
    /// and `stay = true`.
    pub fn add_variable(&mut self, name: impl Into<String>, value: i64) -> VariableId {
        self.vars.alloc(name, value)
    }

    /// Read access to a variable.
    pub fn variable(&self, v: VariableId) -> &Variable {
        &self.vars[v]
    }

    /// Current value of a variable.
    pub fn value(&self, v: VariableId) -> i64 {
        self.vars[v].value
    }

    /// Number of variables in the graph.
    pub fn variable_count(&self) -> usize {
        self.vars.len()
    }

    /// Writes a variable's value directly, without propagation.
    ///
    /// This is the fast path used between executions of an extracted
    /// [`Plan`]: the variable is expected to be held by a satisfied edit
    /// constraint, and the following `Plan::execute` pushes the new value
    /// downstream. For a one-shot change outside a plan loop, use
    /// [`set_value`](Self::set_value) instead.
    pub fn write_value(&mut self, v: VariableId, value: i64) {
        self.vars[v].value = value;
    }

    /// Attempts to assign `value` to the variable at the given strength.
    ///
    /// Installs a temporary edit constraint; if it wins against the
    /// variable's current determinant, the value is written and propagated
    /// through the satisfied graph. If it loses, the assignment is silently
    /// dropped: the value stays unchanged and no error is reported. The
    /// temporary constraint is destroyed either way.
    pub fn set_value(
        &mut self,
        v: VariableId,
        value: i64,
        strength: Strength,
    ) -> Result<(), PlannerError> {
        let edit = self.add_edit(v, strength)?;
        if self.constraints.get(edit).is_satisfied() {
            self.vars[v].value = value;
            self.propagate_from(v);
        }
        self.destroy_constraint(edit)?;
        Ok(())
    }

    // ---- constraints ----

    /// Adds an edit constraint: marks `v` as a variable the embedder intends
    /// to change imperatively.
    pub fn add_edit(
        &mut self,
        v: VariableId,
        strength: Strength,
    ) -> Result<ConstraintId, PlannerError> {
        self.add_constraint(Constraint::edit(v, strength))
    }

    /// Adds a stay constraint: a preference that `v` keep its current value.
    pub fn add_stay(
        &mut self,
        v: VariableId,
        strength: Strength,
    ) -> Result<ConstraintId, PlannerError> {
        self.add_constraint(Constraint::stay(v, strength))
    }

    /// Adds an equality constraint `v1 = v2`, enforceable in either
    /// direction.
    pub fn add_equality(
        &mut self,
        v1: VariableId,
        v2: VariableId,
        strength: Strength,
    ) -> Result<ConstraintId, PlannerError> {
        self.add_constraint(Constraint::equality(v1, v2, strength))
    }

    /// Adds a scale constraint `dst = src * scale + offset`, enforceable in
    /// either direction between `src` and `dst`; `scale` and `offset` are
    /// read-only inputs.
    pub fn add_scale(
        &mut self,
        src: VariableId,
        scale: VariableId,
        offset: VariableId,
        dst: VariableId,
        strength: Strength,
    ) -> Result<ConstraintId, PlannerError> {
        self.add_constraint(Constraint::scale(src, scale, offset, dst, strength))
    }

    /// Read access to a constraint.
    pub fn constraint(&self, c: ConstraintId) -> &Constraint {
        self.constraints.get(c)
    }

    /// Whether the given constraint is satisfied.
    pub fn is_satisfied(&self, c: ConstraintId) -> bool {
        self.constraints.get(c).is_satisfied()
    }

    /// Required strength of the given constraint.
    pub fn strength(&self, c: ConstraintId) -> Strength {
        self.constraints.get(c).strength()
    }

    /// Number of live constraints in the graph.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// How many dependency cycles the planner has detected and retracted.
    ///
    /// Closing a cycle is recoverable: the triggering constraint is
    /// automatically removed from the graph and this counter is bumped.
    pub fn cycles_detected(&self) -> usize {
        self.cycles_detected
    }

    /// Deactivates a constraint: removes it from the graph, repairing any
    /// downstream constraints its absence allows to be satisfied, and frees
    /// it. The handle must not be used afterwards.
    pub fn destroy_constraint(&mut self, c: ConstraintId) -> Result<(), PlannerError> {
        if self.constraints.get(c).is_satisfied() {
            self.incremental_remove(c)?;
        } else {
            self.remove_from_graph(c);
        }
        self.constraints.remove(c);
        Ok(())
    }

    /// Extracts a plan from a set of constraints, typically the edit
    /// constraints whose variables are about to change. Only satisfied input
    /// constraints among them seed the plan.
    pub fn extract_plan_from_constraints(&mut self, constraints: &[ConstraintId]) -> Plan {
        let sources: Vec<ConstraintId> = constraints
            .iter()
            .copied()
            .filter(|&c| {
                let c = self.constraints.get(c);
                c.is_input() && c.is_satisfied()
            })
            .collect();
        self.make_plan(sources)
    }

    // ---- incremental algorithms ----

    fn new_mark(&mut self) -> u64 {
        self.current_mark += 1;
        self.current_mark
    }

    fn add_constraint(&mut self, c: Constraint) -> Result<ConstraintId, PlannerError> {
        let id = self.constraints.insert(c);
        self.add_to_graph(id);
        self.incremental_add(id)?;
        Ok(id)
    }

    fn add_to_graph(&mut self, c: ConstraintId) {
        for v in self.constraints.get(c).variables() {
            self.vars[v].add_constraint(c);
        }
        self.constraints.get_mut(c).mark_unsatisfied();
    }

    fn remove_from_graph(&mut self, c: ConstraintId) {
        for v in self.constraints.get(c).variables() {
            self.vars[v].remove_constraint(c);
        }
        self.constraints.get_mut(c).mark_unsatisfied();
    }

    /// Attempts to satisfy `c` and, on success, incrementally updates the
    /// dataflow graph. Satisfying `c` may displace a weaker constraint on
    /// its output; that constraint is then re-satisfied with some other
    /// method, and so on, until the chain of displacements reaches either an
    /// undetermined variable or a constraint too weak to hold anything.
    fn incremental_add(&mut self, c: ConstraintId) -> Result<(), PlannerError> {
        let mark = self.new_mark();
        let mut overridden = self.satisfy(c, mark)?;
        while let Some(displaced) = overridden {
            overridden = self.satisfy(displaced, mark)?;
        }
        Ok(())
    }

    /// Removes a satisfied constraint and repairs the graph downstream of
    /// it. Displaced constraints are retried strongest-first: satisfying a
    /// weak constraint only to immediately override it with a stronger one
    /// found later would waste work.
    fn incremental_remove(&mut self, c: ConstraintId) -> Result<(), PlannerError> {
        let out = self.constraints.get(c).output();
        self.constraints.get_mut(c).mark_unsatisfied();
        self.remove_from_graph(c);

        let unsatisfied = self.remove_propagate_from(out);
        let mut strength = Strength::Required;
        loop {
            for &u in &unsatisfied {
                // A binary constraint is collected once per visited endpoint,
                // so an earlier attempt at this level may already have
                // satisfied it. Re-adding it would displace itself.
                if self.constraints.get(u).strength() == strength
                    && !self.constraints.get(u).is_satisfied()
                {
                    self.incremental_add(u)?;
                }
            }
            strength = strength.next_weaker();
            // A Weakest constraint can never beat a walkabout strength, so
            // the sweep stops one level above the floor.
            if strength == Strength::Weakest {
                break;
            }
        }
        Ok(())
    }

    /// One satisfaction attempt for a currently-unsatisfied constraint.
    /// Returns the constraint it displaced, if any, for the caller to
    /// re-satisfy in turn.
    fn satisfy(
        &mut self,
        c: ConstraintId,
        mark: u64,
    ) -> Result<Option<ConstraintId>, PlannerError> {
        self.constraints.get_mut(c).choose_method(&self.vars, mark);
        if !self.constraints.get(c).is_satisfied() {
            if self.constraints.get(c).strength() == Strength::Required {
                return Err(PlannerError::RequiredConstraintUnsatisfiable);
            }
            return Ok(None);
        }

        // Mark the inputs so add_propagate can recognize a path from the
        // output back to an input as a cycle.
        self.constraints.get(c).mark_inputs(&mut self.vars, mark);
        let out = self.constraints.get(c).output();
        let overridden = self.vars[out].determined_by;
        if let Some(displaced) = overridden {
            self.constraints.get_mut(displaced).mark_unsatisfied();
        }
        self.vars[out].determined_by = Some(c);

        if !self.add_propagate(c, mark)? {
            // The constraint closed a cycle and has been retracted.
            self.cycles_detected += 1;
            return Ok(None);
        }
        self.vars[out].mark = mark;
        Ok(overridden)
    }

    /// Recomputes walkabout strengths and stay flags downstream of `c`,
    /// eagerly re-executing stay outputs. Returns `false` (after retracting
    /// `c`) if a marked variable is encountered downstream, which means the
    /// just-satisfied constraint introduced a cycle from its output back to
    /// one of its inputs.
    fn add_propagate(&mut self, c: ConstraintId, mark: u64) -> Result<bool, PlannerError> {
        let mut todo = VecDeque::new();
        todo.push_back(c);
        while let Some(d) = todo.pop_front() {
            let out = self.constraints.get(d).output();
            if self.vars[out].mark == mark {
                self.incremental_remove(c)?;
                return Ok(false);
            }
            self.constraints.get(d).recalculate(&mut self.vars);
            self.add_constraints_consuming_to(out, &mut todo);
        }
        Ok(true)
    }

    /// Propagates a changed value through the satisfied graph. This is the
    /// runtime path for one-shot edits made outside plan execution.
    fn propagate_from(&mut self, v: VariableId) {
        let mut todo = VecDeque::new();
        self.add_constraints_consuming_to(v, &mut todo);
        while let Some(c) = todo.pop_front() {
            self.constraints.get(c).execute(&mut self.vars);
            let out = self.constraints.get(c).output();
            self.add_constraints_consuming_to(out, &mut todo);
        }
    }

    /// Resets `out` to undetermined and walks the graph forward from it,
    /// collecting every unsatisfied constraint encountered (candidates for
    /// re-satisfaction) and recalculating each still-satisfied consumer
    /// along the way. The variable's own determinant is skipped to avoid
    /// walking back upstream.
    fn remove_propagate_from(&mut self, out: VariableId) -> Vec<ConstraintId> {
        {
            let var = &mut self.vars[out];
            var.determined_by = None;
            var.walk_strength = Strength::Weakest;
            var.stay = true;
        }
        let mut unsatisfied = Vec::new();
        let mut todo = VecDeque::new();
        todo.push_back(out);
        while let Some(v) = todo.pop_front() {
            let touching = self.vars[v].constraints.clone();
            for &c in &touching {
                if !self.constraints.get(c).is_satisfied() {
                    unsatisfied.push(c);
                }
            }
            let determining = self.vars[v].determined_by;
            for &c in &touching {
                if Some(c) != determining && self.constraints.get(c).is_satisfied() {
                    self.constraints.get(c).recalculate(&mut self.vars);
                    todo.push_back(self.constraints.get(c).output());
                }
            }
        }
        unsatisfied
    }

    /// Builds a topologically valid execution sequence starting from a set
    /// of already-satisfied source constraints. A constraint joins the plan
    /// once its output is not yet placed under this episode's mark and all
    /// its inputs are known; its consumers are then enqueued. FIFO order
    /// over the stable back-reference lists makes plans deterministic.
    fn make_plan(&mut self, sources: Vec<ConstraintId>) -> Plan {
        let mark = self.new_mark();
        let mut plan = Plan::new();
        let mut todo: VecDeque<ConstraintId> = sources.into();
        while let Some(c) = todo.pop_front() {
            let out = self.constraints.get(c).output();
            if self.vars[out].mark != mark && self.constraints.get(c).inputs_known(&self.vars, mark)
            {
                plan.add_constraint(c);
                self.vars[out].mark = mark;
                self.add_constraints_consuming_to(out, &mut todo);
            }
        }
        plan
    }

    /// Enqueues every satisfied consumer of `v`'s value: constraints
    /// touching `v` other than the one that determines it.
    fn add_constraints_consuming_to(&self, v: VariableId, todo: &mut VecDeque<ConstraintId>) {
        let determining = self.vars[v].determined_by;
        for &c in &self.vars[v].constraints {
            if Some(c) != determining && self.constraints.get(c).is_satisfied() {
                todo.push_back(c);
            }
        }
    }

    pub(crate) fn execute_constraint(&mut self, c: ConstraintId) {
        self.constraints.get(c).execute(&mut self.vars);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// At most one constraint determines each variable, and that
    /// constraint's output is the variable itself.
    fn assert_determinant_invariant(planner: &Planner) {
        for i in 0..planner.variable_count() {
            let v = VariableId(i);
            if let Some(c) = planner.variable(v).determined_by() {
                assert!(
                    planner.variable(v).constraints.contains(&c),
                    "determinant of {:?} is not registered on it",
                    v
                );
                assert!(planner.is_satisfied(c));
                assert_eq!(planner.constraints.get(c).output(), v);
            }
        }
    }

    #[test]
    fn test_add_equality_propagates_value() {
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 3);
        let b = planner.add_variable("b", 0);
        let eq = planner.add_equality(a, b, Strength::Required).unwrap();

        // Satisfying the constraint eagerly executed it (stay optimization):
        // both sides undetermined, so the output is a planning-time constant.
        assert!(planner.is_satisfied(eq));
        assert_eq!(planner.value(b), 3);
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_set_value_propagates_through_chain() {
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 0);
        let b = planner.add_variable("b", 0);
        let c = planner.add_variable("c", 0);
        planner.add_equality(a, b, Strength::Required).unwrap();
        planner.add_equality(b, c, Strength::Required).unwrap();

        planner.set_value(a, 42, Strength::Preferred).unwrap();
        assert_eq!(planner.value(b), 42);
        assert_eq!(planner.value(c), 42);
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_stronger_edit_displaces_weaker() {
        let mut planner = Planner::new();
        let v = planner.add_variable("v", 0);
        let weak = planner.add_edit(v, Strength::WeakDefault).unwrap();
        assert!(planner.is_satisfied(weak));

        let strong = planner.add_edit(v, Strength::Preferred).unwrap();
        assert!(planner.is_satisfied(strong));
        assert!(!planner.is_satisfied(weak), "weaker edit must yield");
        assert_eq!(planner.variable(v).determined_by(), Some(strong));
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_losing_edit_is_silently_dropped() {
        let mut planner = Planner::new();
        let v = planner.add_variable("v", 10);
        let strong = planner.add_edit(v, Strength::StrongPreferred).unwrap();
        planner.write_value(v, 10);

        // A weaker one-shot assignment loses and leaves the value untouched
        planner.set_value(v, 99, Strength::Normal).unwrap();
        assert_eq!(planner.value(v), 10);
        assert!(planner.is_satisfied(strong));
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_equal_strength_does_not_displace() {
        let mut planner = Planner::new();
        let v = planner.add_variable("v", 1);
        planner.add_edit(v, Strength::Normal).unwrap();

        // Satisfaction requires strictly beating the walkabout strength
        planner.set_value(v, 2, Strength::Normal).unwrap();
        assert_eq!(planner.value(v), 1);
    }

    #[test]
    fn test_required_violation_is_an_error() {
        let mut planner = Planner::new();
        let v = planner.add_variable("v", 0);
        planner.add_edit(v, Strength::Required).unwrap();

        let result = planner.add_edit(v, Strength::Required);
        assert_eq!(result, Err(PlannerError::RequiredConstraintUnsatisfiable));
    }

    #[test]
    fn test_remove_repairs_downstream() {
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 0);
        let b = planner.add_variable("b", 0);
        planner.add_equality(a, b, Strength::Required).unwrap();
        let stay = planner.add_stay(b, Strength::StrongDefault).unwrap();
        let edit = planner.add_edit(a, Strength::Preferred).unwrap();
        assert!(planner.is_satisfied(edit));
        // The edit overpowers the stay side: equality flows a -> b
        assert!(planner.variable(b).determined_by().is_some());

        planner.destroy_constraint(edit).unwrap();
        // With the edit gone, the stay wins again and b is stay once more
        assert!(planner.is_satisfied(stay));
        assert!(planner.variable(b).stay());
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_retraction_is_idempotent() {
        // Destroying a constraint leaves the graph as if it was never added
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 5);
        let b = planner.add_variable("b", 7);
        let stay = planner.add_stay(a, Strength::Normal).unwrap();

        let before_walk = planner.variable(b).walk_strength();
        let before_det = planner.variable(b).determined_by();

        let eq = planner.add_equality(a, b, Strength::Preferred).unwrap();
        assert!(planner.is_satisfied(eq));
        planner.destroy_constraint(eq).unwrap();

        assert_eq!(planner.variable(b).walk_strength(), before_walk);
        assert_eq!(planner.variable(b).determined_by(), before_det);
        assert!(planner.is_satisfied(stay));
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_remove_repair_with_redundant_parallel_constraint() {
        // A weaker equality parallel to a chain link is collected twice by
        // the repair walk (once per endpoint); the sweep must not try to
        // re-satisfy a constraint an earlier pass already handled.
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 0);
        let b = planner.add_variable("b", 0);
        let c = planner.add_variable("c", 0);
        planner.add_equality(a, b, Strength::StrongDefault).unwrap();
        let bc = planner.add_equality(b, c, Strength::StrongDefault).unwrap();
        let bc_weak = planner.add_equality(b, c, Strength::Normal).unwrap();
        let edit = planner.add_edit(a, Strength::Preferred).unwrap();

        planner.destroy_constraint(edit).unwrap();

        // Exactly one of the parallel constraints may hold b = c
        assert!(planner.is_satisfied(bc));
        assert!(!planner.is_satisfied(bc_weak));
        assert_eq!(planner.value(b), planner.value(c));
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_constraint_accessor() {
        let mut planner = Planner::new();
        let v = planner.add_variable("v", 0);
        let e = planner.add_edit(v, Strength::Preferred).unwrap();
        assert_eq!(planner.constraint(e).strength(), Strength::Preferred);
        assert!(planner.constraint(e).is_input());
    }

    #[test]
    fn test_cycle_is_retracted_not_looped() {
        // a = b and b = a: the second constraint closes a cycle. The planner
        // must terminate by retracting it rather than spinning.
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 0);
        let b = planner.add_variable("b", 0);
        planner.add_edit(a, Strength::Preferred).unwrap();
        planner.add_equality(a, b, Strength::Required).unwrap();

        let back = planner.add_equality(b, a, Strength::Required).unwrap();
        assert!(planner.cycles_detected() >= 1);
        assert!(
            !planner.is_satisfied(back),
            "cycle-closing constraint must end up retracted"
        );
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_plan_excludes_stay_held_branches() {
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 0);
        let b = planner.add_variable("b", 0);
        let c = planner.add_variable("c", 0);
        planner.add_equality(a, b, Strength::Required).unwrap();
        // c is independently stay-held; nothing downstream of the edit
        // reaches it, so no plan step may touch it
        planner.add_stay(c, Strength::Normal).unwrap();
        let edit = planner.add_edit(a, Strength::Preferred).unwrap();

        let plan = planner.extract_plan_from_constraints(&[edit]);
        assert_eq!(plan.len(), 2); // the edit and the equality
        planner.write_value(a, 9);
        plan.execute(&mut planner);
        assert_eq!(planner.value(b), 9);
        assert_eq!(planner.value(c), 0);
    }

    #[test]
    fn test_extract_plan_ignores_non_input_sources() {
        let mut planner = Planner::new();
        let a = planner.add_variable("a", 0);
        let b = planner.add_variable("b", 0);
        let eq = planner.add_equality(a, b, Strength::Required).unwrap();
        let stay = planner.add_stay(a, Strength::Normal).unwrap();

        // Neither an equality nor a stay is an input constraint
        let plan = planner.extract_plan_from_constraints(&[eq, stay]);
        assert!(plan.is_empty());
    }

    #[test]
    fn test_plans_are_deterministic() {
        let build = || {
            let mut planner = Planner::new();
            let vars: Vec<_> = (0..6)
                .map(|i| planner.add_variable(format!("v{i}"), 0))
                .collect();
            for w in vars.windows(2) {
                planner.add_equality(w[0], w[1], Strength::Required).unwrap();
            }
            planner.add_stay(vars[5], Strength::StrongDefault).unwrap();
            let edit = planner.add_edit(vars[0], Strength::Preferred).unwrap();
            let plan = planner.extract_plan_from_constraints(&[edit]);
            (0..plan.len()).map(|i| plan.constraint_at(i)).collect::<Vec<_>>()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_scale_chain_consistency() {
        let mut planner = Planner::new();
        let src = planner.add_variable("src", 3);
        let scale = planner.add_variable("scale", 10);
        let offset = planner.add_variable("offset", 1000);
        let dst = planner.add_variable("dst", 0);
        planner.add_stay(src, Strength::Normal).unwrap();
        planner
            .add_scale(src, scale, offset, dst, Strength::Required)
            .unwrap();
        assert_eq!(planner.value(dst), 1030);

        planner.set_value(src, 7, Strength::Preferred).unwrap();
        assert_eq!(planner.value(dst), 1070);

        // Drive backward through the same constraint
        planner.set_value(dst, 1250, Strength::Preferred).unwrap();
        assert_eq!(planner.value(src), 25);
        assert_determinant_invariant(&planner);
    }

    #[test]
    fn test_constraint_count_tracks_destruction() {
        let mut planner = Planner::new();
        let v = planner.add_variable("v", 0);
        let e = planner.add_edit(v, Strength::Preferred).unwrap();
        assert_eq!(planner.constraint_count(), 1);
        planner.destroy_constraint(e).unwrap();
        assert_eq!(planner.constraint_count(), 0);
    }

    proptest! {
        /// Random one-shot edits on a chain never break the graph
        /// invariants, and the ends of a required chain agree whenever the
        /// winning strength reached all the way through.
        #[test]
        fn random_edits_keep_invariants(
            ops in proptest::collection::vec((0usize..4, -100i64..100, 0usize..6), 1..40)
        ) {
            let mut planner = Planner::new();
            let vars: Vec<_> = (0..4)
                .map(|i| planner.add_variable(format!("v{i}"), 0))
                .collect();
            for w in vars.windows(2) {
                planner.add_equality(w[0], w[1], Strength::Required).unwrap();
            }
            planner.add_stay(vars[3], Strength::StrongDefault).unwrap();

            for (var, value, strength) in ops {
                // Required edits could legitimately fail; stay below it
                let strength = Strength::ALL[strength + 1];
                planner.set_value(vars[var], value, strength).unwrap();
                assert_determinant_invariant(&planner);
            }
        }
    }
}
