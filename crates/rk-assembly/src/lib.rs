//! Assembly Constraint Engine
//!
//! This crate provides:
//! - Assembly constraints between sub-elements of two parts
//! - Dependency pairs sampled from constraints, answering the movement and
//!   rotation queries of an iterative rigid-body solver
//! - Degree-of-freedom accounting per rigid body
//! - Solver settings persisted as RON

pub mod constants;
pub mod constraint;
pub mod dependency;
pub mod dof;
pub mod error;
pub mod graph;
pub mod rigid;
pub mod settings;

// Re-exports for convenience
pub use constraint::{Constraint, ConstraintKind, ConstraintParams, Direction, ElementRef};
pub use dependency::{Dependency, DependencyId, DependencyKind, Movement, RefType};
pub use dof::DofState;
pub use error::{AssemblyError, AssemblyResult};
pub use graph::DependencyGraph;
pub use rigid::{RigidBody, WorkList};
pub use settings::{SettingsError, SolverSettings};
