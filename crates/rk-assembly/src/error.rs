//! Assembly engine errors

use rk_cad::{CadError, SubElement};
use uuid::Uuid;

use crate::dependency::DependencyId;
use crate::settings::SettingsError;

/// Assembly-related errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum AssemblyError {
    #[error("Constraint type {0} is not supported")]
    UnsupportedConstraint(String),
    #[error("Constraint {constraint} cannot use element {element}")]
    UnsupportedElement { constraint: Uuid, element: SubElement },
    #[error("Geometry error: {0}")]
    Geometry(#[from] CadError),
    #[error("Rigid body not found: {0}")]
    RigidNotFound(Uuid),
    #[error("Rigid body already exists: {0}")]
    DuplicateRigid(Uuid),
    #[error("Dependency not found: {0}")]
    DependencyNotFound(DependencyId),
    #[error("Constraint not found: {0}")]
    ConstraintNotFound(Uuid),
    #[error("Constraint already exists: {0}")]
    DuplicateConstraint(Uuid),
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}

/// Result type for assembly operations
pub type AssemblyResult<T> = Result<T, AssemblyError>;
