//! Constraint variants and the shared satisfaction protocol.
//!
//! A [`Constraint`] is a relation between one or two variables that the
//! planner may enforce in either direction. Four variants form a closed set:
//!
//! - **Edit** — unary input constraint marking a variable the embedder is
//!   about to change imperatively.
//! - **Stay** — unary constraint expressing a preference that a variable
//!   keep its current value.
//! - **Equality** — binary `out = in`.
//! - **Scale** — binary affine relation `v2 = v1 * scale + offset`, with the
//!   scale and offset variables as read-only auxiliary inputs.
//!
//! Every variant implements the same protocol the planner drives: choose a
//! method (pick an output), mark inputs, execute, recalculate. A constraint
//! is *satisfied* exactly when it has a chosen output: a boolean flag for the
//! unary variants, a non-`None` [`Direction`] for the binary ones.

use crate::strength::Strength;
use crate::variable::{VariableArena, VariableId};

/// Handle to a constraint in a planner's arena.
///
/// Becomes dangling once the constraint is destroyed; using a dangling
/// handle panics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConstraintId(pub(crate) usize);

/// Dataflow direction of a satisfied binary constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    /// Not satisfied.
    None,
    /// `v2` is the output.
    Forward,
    /// `v1` is the output.
    Backward,
}

/// The variant-specific part of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    Edit {
        output: VariableId,
        satisfied: bool,
    },
    Stay {
        output: VariableId,
        satisfied: bool,
    },
    Equality {
        v1: VariableId,
        v2: VariableId,
        direction: Direction,
    },
    Scale {
        v1: VariableId,
        v2: VariableId,
        scale: VariableId,
        offset: VariableId,
        direction: Direction,
    },
}

/// A system-maintained relation between variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    strength: Strength,
    kind: ConstraintKind,
}

impl Constraint {
    pub(crate) fn edit(v: VariableId, strength: Strength) -> Self {
        Self {
            strength,
            kind: ConstraintKind::Edit {
                output: v,
                satisfied: false,
            },
        }
    }

    pub(crate) fn stay(v: VariableId, strength: Strength) -> Self {
        Self {
            strength,
            kind: ConstraintKind::Stay {
                output: v,
                satisfied: false,
            },
        }
    }

    pub(crate) fn equality(v1: VariableId, v2: VariableId, strength: Strength) -> Self {
        Self {
            strength,
            kind: ConstraintKind::Equality {
                v1,
                v2,
                direction: Direction::None,
            },
        }
    }

    pub(crate) fn scale(
        src: VariableId,
        scale: VariableId,
        offset: VariableId,
        dst: VariableId,
        strength: Strength,
    ) -> Self {
        Self {
            strength,
            kind: ConstraintKind::Scale {
                v1: src,
                v2: dst,
                scale,
                offset,
                direction: Direction::None,
            },
        }
    }

    /// Required strength of this constraint.
    pub fn strength(&self) -> Strength {
        self.strength
    }

    /// Whether this constraint is satisfied in the current solution.
    pub fn is_satisfied(&self) -> bool {
        match self.kind {
            ConstraintKind::Edit { satisfied, .. } | ConstraintKind::Stay { satisfied, .. } => {
                satisfied
            }
            ConstraintKind::Equality { direction, .. }
            | ConstraintKind::Scale { direction, .. } => direction != Direction::None,
        }
    }

    /// Whether this is an input constraint, i.e. one that stands in for an
    /// external, imperative change source. Only Edit constraints are inputs.
    pub fn is_input(&self) -> bool {
        matches!(self.kind, ConstraintKind::Edit { .. })
    }

    /// Records that this constraint is unsatisfied.
    pub(crate) fn mark_unsatisfied(&mut self) {
        match &mut self.kind {
            ConstraintKind::Edit { satisfied, .. } | ConstraintKind::Stay { satisfied, .. } => {
                *satisfied = false
            }
            ConstraintKind::Equality { direction, .. }
            | ConstraintKind::Scale { direction, .. } => *direction = Direction::None,
        }
    }

    /// Every variable this constraint touches, outputs and auxiliary inputs
    /// alike. Used to register and deregister graph back-references.
    pub(crate) fn variables(&self) -> Vec<VariableId> {
        match self.kind {
            ConstraintKind::Edit { output, .. } | ConstraintKind::Stay { output, .. } => {
                vec![output]
            }
            ConstraintKind::Equality { v1, v2, .. } => vec![v1, v2],
            ConstraintKind::Scale {
                v1,
                v2,
                scale,
                offset,
                ..
            } => vec![v1, v2, scale, offset],
        }
    }

    /// The variable this constraint currently drives.
    ///
    /// # Panics
    ///
    /// Panics for an unsatisfied binary constraint: an unsatisfied
    /// constraint has no output and must not be relied upon.
    pub(crate) fn output(&self) -> VariableId {
        match self.kind {
            ConstraintKind::Edit { output, .. } | ConstraintKind::Stay { output, .. } => output,
            ConstraintKind::Equality { v1, v2, direction }
            | ConstraintKind::Scale {
                v1, v2, direction, ..
            } => match direction {
                Direction::Forward => v2,
                Direction::Backward => v1,
                Direction::None => panic!("output() called on an unsatisfied constraint"),
            },
        }
    }

    /// The driving input of a satisfied binary constraint.
    fn input(&self) -> VariableId {
        match self.kind {
            ConstraintKind::Equality { v1, v2, direction }
            | ConstraintKind::Scale {
                v1, v2, direction, ..
            } => match direction {
                Direction::Forward => v1,
                Direction::Backward => v2,
                Direction::None => panic!("input() called on an unsatisfied constraint"),
            },
            _ => panic!("input() called on a unary constraint"),
        }
    }

    /// Decides whether this constraint can be satisfied and records the
    /// decision (the satisfaction flag for unary variants, the direction for
    /// binary ones).
    ///
    /// A unary constraint is feasible iff its output is not stamped with the
    /// current traversal mark and this constraint is strictly stronger than
    /// the output's walkabout strength.
    ///
    /// A binary constraint must drive *away* from a marked side; with
    /// neither side marked it drives toward the side with the weaker
    /// walkabout strength. Feasibility is always gated on strictly beating
    /// the chosen output's walkabout strength.
    pub(crate) fn choose_method(&mut self, vars: &VariableArena, mark: u64) {
        let strength = self.strength;
        match &mut self.kind {
            ConstraintKind::Edit { output, satisfied } | ConstraintKind::Stay { output, satisfied } => {
                *satisfied =
                    vars[*output].mark != mark && strength.stronger(vars[*output].walk_strength);
            }
            ConstraintKind::Equality { v1, v2, direction }
            | ConstraintKind::Scale {
                v1, v2, direction, ..
            } => {
                *direction = choose_direction(strength, *v1, *v2, vars, mark);
            }
        }
    }

    /// Stamps this constraint's input variables with the traversal mark so
    /// that a later visit to one of them is recognized as a cycle. Scale
    /// constraints also stamp their auxiliary inputs.
    pub(crate) fn mark_inputs(&self, vars: &mut VariableArena, mark: u64) {
        match self.kind {
            ConstraintKind::Edit { .. } | ConstraintKind::Stay { .. } => {}
            ConstraintKind::Equality { .. } => {
                vars[self.input()].mark = mark;
            }
            ConstraintKind::Scale { scale, offset, .. } => {
                vars[self.input()].mark = mark;
                vars[scale].mark = mark;
                vars[offset].mark = mark;
            }
        }
    }

    /// Whether every input is known: stamped with the current mark, a stay
    /// variable, or not determined by any constraint. Assumes this
    /// constraint is satisfied.
    pub(crate) fn inputs_known(&self, vars: &VariableArena, mark: u64) -> bool {
        match self.kind {
            ConstraintKind::Edit { .. } | ConstraintKind::Stay { .. } => true,
            ConstraintKind::Equality { .. } | ConstraintKind::Scale { .. } => {
                let input = &vars[self.input()];
                input.mark == mark || input.stay || input.determined_by.is_none()
            }
        }
    }

    /// Recomputes the output's value from the inputs. Assumes this
    /// constraint is satisfied. Edit and Stay do nothing; the values they
    /// govern are set externally or already correct.
    pub(crate) fn execute(&self, vars: &mut VariableArena) {
        match self.kind {
            ConstraintKind::Edit { .. } | ConstraintKind::Stay { .. } => {}
            ConstraintKind::Equality { .. } => {
                vars[self.output()].value = vars[self.input()].value;
            }
            ConstraintKind::Scale {
                v1,
                v2,
                scale,
                offset,
                direction,
            } => match direction {
                Direction::Forward => {
                    vars[v2].value = vars[v1].value * vars[scale].value + vars[offset].value;
                }
                Direction::Backward => {
                    vars[v1].value = (vars[v2].value - vars[offset].value) / vars[scale].value;
                }
                Direction::None => panic!("execute() called on an unsatisfied constraint"),
            },
        }
    }

    /// Recomputes the output's walkabout strength and stay flag after this
    /// constraint becomes satisfied, and eagerly executes once if the output
    /// turns out to be stay (its value will not be recomputed by any plan).
    pub(crate) fn recalculate(&self, vars: &mut VariableArena) {
        match self.kind {
            ConstraintKind::Edit { output, .. } | ConstraintKind::Stay { output, .. } => {
                vars[output].walk_strength = self.strength;
                vars[output].stay = !self.is_input();
                if vars[output].stay {
                    self.execute(vars);
                }
            }
            ConstraintKind::Equality { .. } => {
                let (input, output) = (self.input(), self.output());
                vars[output].walk_strength =
                    self.strength.weakest_of(vars[input].walk_strength);
                vars[output].stay = vars[input].stay;
                if vars[output].stay {
                    self.execute(vars);
                }
            }
            ConstraintKind::Scale { scale, offset, .. } => {
                let (input, output) = (self.input(), self.output());
                vars[output].walk_strength =
                    self.strength.weakest_of(vars[input].walk_strength);
                vars[output].stay = vars[input].stay && vars[scale].stay && vars[offset].stay;
                if vars[output].stay {
                    self.execute(vars);
                }
            }
        }
    }
}

/// The binary tie-break rule. A side already stamped with the traversal mark
/// forces the flow toward the other side; otherwise the constraint drives
/// toward whichever side currently has the weaker walkabout strength.
fn choose_direction(
    strength: Strength,
    v1: VariableId,
    v2: VariableId,
    vars: &VariableArena,
    mark: u64,
) -> Direction {
    if vars[v1].mark == mark {
        return if vars[v2].mark != mark && strength.stronger(vars[v2].walk_strength) {
            Direction::Forward
        } else {
            Direction::None
        };
    }
    if vars[v2].mark == mark {
        return if vars[v1].mark != mark && strength.stronger(vars[v1].walk_strength) {
            Direction::Backward
        } else {
            Direction::None
        };
    }
    // Neither side is marked, so we have a choice: displace the weaker side.
    if vars[v1].walk_strength.weaker(vars[v2].walk_strength) {
        if strength.stronger(vars[v1].walk_strength) {
            Direction::Backward
        } else {
            Direction::None
        }
    } else if strength.stronger(vars[v2].walk_strength) {
        Direction::Forward
    } else {
        Direction::None
    }
}

/// Arena of constraints. Slots are freed on destruction and reused, so the
/// edit-constraint churn of repeated value changes does not grow the arena.
#[derive(Debug, Default)]
pub(crate) struct ConstraintArena {
    slots: Vec<Option<Constraint>>,
    free: Vec<usize>,
}

impl ConstraintArena {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub(crate) fn insert(&mut self, c: Constraint) -> ConstraintId {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(c);
                ConstraintId(slot)
            }
            None => {
                let id = ConstraintId(self.slots.len());
                self.slots.push(Some(c));
                id
            }
        }
    }

    pub(crate) fn remove(&mut self, id: ConstraintId) {
        assert!(
            self.slots[id.0].take().is_some(),
            "constraint {:?} destroyed twice",
            id
        );
        self.free.push(id.0);
    }

    pub(crate) fn get(&self, id: ConstraintId) -> &Constraint {
        self.slots[id.0]
            .as_ref()
            .expect("use of a destroyed constraint")
    }

    pub(crate) fn get_mut(&mut self, id: ConstraintId) -> &mut Constraint {
        self.slots[id.0]
            .as_mut()
            .expect("use of a destroyed constraint")
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
