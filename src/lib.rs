//! Incremental constraint hierarchy solver implementing the DeltaBlue
//! algorithm.
//!
//! DeltaBlue maintains a graph of variables related by constraints of
//! varying [`Strength`]. Instead of re-solving the whole graph on every
//! change, it keeps a satisfiable subset of constraints and incrementally
//! repairs the dataflow when a constraint is added or removed:
//!
//! - **Incremental add**: a newly satisfiable constraint may displace a
//!   weaker constraint on its output; the displaced constraint is then
//!   re-satisfied some other way, cascading until the graph settles.
//! - **Incremental remove**: retracting a constraint re-opens its output,
//!   and previously displaced constraints are retried strongest-first.
//! - **Plan extraction**: for repeated changes to the same inputs, the
//!   planner compiles the satisfied dataflow into a [`Plan`] — an ordered
//!   constraint sequence that can be re-executed without touching the
//!   satisfaction machinery at all.
//!
//! Values are integers related by simple affine constraints (equality and
//! `dst = src * scale + offset`); the interesting machinery is the
//! hierarchy maintenance, not the arithmetic.
//!
//! # Architecture
//!
//! The [`Planner`] owns all variables and constraints in arena storage and
//! hands out [`VariableId`]/[`ConstraintId`] handles, so the inherently
//! cyclic variable/constraint references are plain indices. One planner per
//! independent graph; everything is single-threaded and synchronous.
//!
//! # Examples
//!
//! ```
//! use deltablue::{Planner, Strength};
//!
//! let mut planner = Planner::new();
//!
//! // A chain a = b = c with a stay preference on the far end
//! let a = planner.add_variable("a", 0);
//! let b = planner.add_variable("b", 0);
//! let c = planner.add_variable("c", 0);
//! planner.add_equality(a, b, Strength::Required).unwrap();
//! planner.add_equality(b, c, Strength::Required).unwrap();
//! planner.add_stay(c, Strength::StrongDefault).unwrap();
//!
//! // One-shot change, propagated immediately
//! planner.set_value(a, 7, Strength::Preferred).unwrap();
//! assert_eq!(planner.value(c), 7);
//!
//! // Build-once, run-many: extract a plan for repeated edits of `a`
//! let edit = planner.add_edit(a, Strength::Preferred).unwrap();
//! let plan = planner.extract_plan_from_constraints(&[edit]);
//! for i in 0..10 {
//!     planner.write_value(a, i);
//!     plan.execute(&mut planner);
//!     assert_eq!(planner.value(c), i);
//! }
//! planner.destroy_constraint(edit).unwrap();
//! ```

pub mod constraint;
pub mod plan;
pub mod planner;
pub mod strength;
pub mod variable;

pub use constraint::{Constraint, ConstraintId};
pub use plan::Plan;
pub use planner::{Planner, PlannerError};
pub use strength::Strength;
pub use variable::{Variable, VariableId};
