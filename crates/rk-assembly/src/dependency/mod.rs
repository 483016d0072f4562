//! Constraint dependencies
//!
//! Every constraint is split into two dependencies, one per participating
//! rigid body. A dependency holds geometry sampled once from the document
//! (a reference point and optionally the end of a reference axis), keeps it
//! in sync with its body's placement, and answers how the body has to move
//! or rotate to satisfy the constraint against its sibling.

mod factory;
mod motion;

use std::fmt;

use glam::{DAffine3, DVec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constraint::{ConstraintKind, ConstraintParams};
use crate::constants::RIGHT_ANGLE_DEG;
use crate::dof::{
    DofState, angle_alignment, axis_alignment, axis_distance, plane_offset, point_identity,
};

pub(crate) use factory::{PairSeed, SideSeed, sample_pair};

/// Handle of a dependency inside a [`crate::DependencyGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DependencyId(pub(crate) usize);

impl DependencyId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for DependencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How the sampled geometry of a dependency is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RefType {
    /// A bare point
    Point,
    /// A point on an axis, the axis end marks its direction
    PointAxis,
    /// A point on a plane, the axis end marks the plane normal
    PointNormal,
    /// Plane side of a point-on-plane relation
    Plane,
}

/// Behaviour variant of a dependency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    PointIdentity,
    PointOnLine,
    PointOnPlane,
    CircularEdge,
    ParallelPlanes,
    AngledPlanes,
    Plane,
    Axial,
    AxisParallel,
    AxisPlaneParallel,
    AxisPlaneAngle,
    AxisPlaneNormal,
    CenterOfMass,
}

impl DependencyKind {
    /// Variant implementing a constraint type
    pub fn from_constraint(kind: ConstraintKind) -> Self {
        match kind {
            ConstraintKind::PointIdentity | ConstraintKind::SphereCenterIdent => {
                DependencyKind::PointIdentity
            }
            ConstraintKind::PointOnLine => DependencyKind::PointOnLine,
            ConstraintKind::PointOnPlane => DependencyKind::PointOnPlane,
            ConstraintKind::CircularEdge => DependencyKind::CircularEdge,
            ConstraintKind::PlanesParallel => DependencyKind::ParallelPlanes,
            ConstraintKind::AngledPlanes => DependencyKind::AngledPlanes,
            ConstraintKind::Plane => DependencyKind::Plane,
            ConstraintKind::Axial => DependencyKind::Axial,
            ConstraintKind::AxisParallel => DependencyKind::AxisParallel,
            ConstraintKind::AxisPlaneParallel => DependencyKind::AxisPlaneParallel,
            ConstraintKind::AxisPlaneAngle => DependencyKind::AxisPlaneAngle,
            ConstraintKind::AxisPlaneNormal => DependencyKind::AxisPlaneNormal,
            ConstraintKind::CenterOfMass => DependencyKind::CenterOfMass,
        }
    }

    /// Point-class dependencies pin a point of the body; their DOF
    /// reduction runs after all others
    pub fn is_point_constraint(&self) -> bool {
        matches!(
            self,
            DependencyKind::PointIdentity
                | DependencyKind::PointOnLine
                | DependencyKind::PointOnPlane
        )
    }

    /// Whether the movement is applied at the reference point (false for
    /// orientation-only relations, which never translate)
    pub fn uses_ref_point_spin(&self) -> bool {
        matches!(
            self,
            DependencyKind::PointIdentity
                | DependencyKind::PointOnLine
                | DependencyKind::PointOnPlane
                | DependencyKind::CircularEdge
                | DependencyKind::Axial
                | DependencyKind::CenterOfMass
        )
    }

    /// Whether the dependency contributes a rotation
    pub fn axis_rotation_enabled(&self) -> bool {
        !self.is_point_constraint()
    }

    /// Target angle in degrees for angle-driven variants
    pub fn target_angle(&self, params: &ConstraintParams) -> Option<f64> {
        match self {
            DependencyKind::AngledPlanes => Some(params.angle.abs()),
            DependencyKind::AxisPlaneParallel => Some(RIGHT_ANGLE_DEG),
            DependencyKind::AxisPlaneAngle => Some(params.angle.abs() + RIGHT_ANGLE_DEG),
            _ => None,
        }
    }
}

/// Where and how far a body has to be translated
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Movement {
    /// Point at which the translation applies
    pub point: DVec3,
    /// Translation vector
    pub vector: DVec3,
}

impl Movement {
    pub fn new(point: DVec3, vector: DVec3) -> Self {
        Self { point, vector }
    }
}

/// One side of a constraint, owned by `current_rigid`
#[derive(Debug, Clone, PartialEq)]
pub struct Dependency {
    pub(crate) kind: DependencyKind,
    pub(crate) constraint: Uuid,
    pub(crate) constraint_kind: ConstraintKind,
    pub(crate) ref_type: RefType,
    pub(crate) current_rigid: Uuid,
    pub(crate) depended_rigid: Uuid,
    pub(crate) foreign: DependencyId,
    pub(crate) ref_point: DVec3,
    pub(crate) ref_axis_end: Option<DVec3>,
    pub(crate) enabled: bool,
    pub(crate) params: ConstraintParams,
}

impl Dependency {
    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// Constraint this dependency was derived from
    pub fn constraint(&self) -> Uuid {
        self.constraint
    }

    pub fn constraint_kind(&self) -> ConstraintKind {
        self.constraint_kind
    }

    pub fn ref_type(&self) -> RefType {
        self.ref_type
    }

    /// Rigid body owning this dependency
    pub fn current_rigid(&self) -> Uuid {
        self.current_rigid
    }

    /// Rigid body of the sibling dependency
    pub fn depended_rigid(&self) -> Uuid {
        self.depended_rigid
    }

    /// Handle of the sibling dependency
    pub fn foreign(&self) -> DependencyId {
        self.foreign
    }

    pub fn ref_point(&self) -> DVec3 {
        self.ref_point
    }

    pub fn ref_axis_end(&self) -> Option<DVec3> {
        self.ref_axis_end
    }

    /// Reference axis (axis end minus reference point)
    pub fn ref_axis(&self) -> Option<DVec3> {
        self.ref_axis_end.map(|end| end - self.ref_point)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn params(&self) -> &ConstraintParams {
        &self.params
    }

    /// Move the sampled geometry along with the owning body
    pub fn apply_placement(&mut self, transform: &DAffine3) {
        self.ref_point = transform.transform_point3(self.ref_point);
        if let Some(end) = self.ref_axis_end {
            self.ref_axis_end = Some(transform.transform_point3(end));
        }
    }

    /// Translation needed to satisfy the constraint against `foreign`
    ///
    /// Returns `None` while disabled.
    pub fn movement(&self, foreign: &Dependency) -> Option<Movement> {
        motion::movement(self, foreign)
    }

    /// Rotation needed to satisfy the constraint against `foreign`
    ///
    /// The direction of the returned vector is the rotation axis, its length
    /// the angle in degrees. Returns `None` while disabled, for variants
    /// without rotation, and when both axes already coincide.
    pub fn rotation<R: Rng + ?Sized>(
        &self,
        foreign: &Dependency,
        spin_accuracy: f64,
        rng: &mut R,
    ) -> Option<DVec3> {
        motion::rotation(self, foreign, spin_accuracy, rng)
    }

    /// Reduce the free axes of the owning body by this dependency
    ///
    /// `pinned` holds the reference points of the point-class dependencies
    /// evaluated before this one on the same body.
    pub fn calc_dof(&self, state: &DofState, pinned: &[DVec3]) -> DofState {
        let axis = self.ref_axis().unwrap_or(DVec3::ZERO);
        let lock = self.params.lock_rotation;

        match self.kind {
            DependencyKind::PointIdentity
            | DependencyKind::PointOnLine
            | DependencyKind::PointOnPlane => point_identity(self.ref_point, state, pinned),
            DependencyKind::CircularEdge => DofState {
                position: state.position.clone(),
                rotation: if lock {
                    Vec::new()
                } else {
                    axis_alignment(axis, &state.rotation)
                },
            },
            DependencyKind::CenterOfMass => DofState {
                position: Vec::new(),
                rotation: if lock {
                    Vec::new()
                } else {
                    axis_alignment(axis, &state.rotation)
                },
            },
            DependencyKind::ParallelPlanes | DependencyKind::AxisParallel => DofState {
                position: state.position.clone(),
                rotation: axis_alignment(axis, &state.rotation),
            },
            DependencyKind::AngledPlanes
            | DependencyKind::AxisPlaneParallel
            | DependencyKind::AxisPlaneAngle
            | DependencyKind::AxisPlaneNormal => DofState {
                position: state.position.clone(),
                rotation: angle_alignment(axis, &state.rotation),
            },
            DependencyKind::Plane => DofState {
                position: plane_offset(axis, &state.position),
                rotation: axis_alignment(axis, &state.rotation),
            },
            DependencyKind::Axial => DofState {
                position: axis_distance(axis, &state.position),
                rotation: if lock {
                    Vec::new()
                } else {
                    axis_alignment(axis, &state.rotation)
                },
            },
        }
    }
}

#[cfg(test)]
pub(crate) fn test_pair(
    kind: DependencyKind,
    first: SideSeed,
    second: SideSeed,
    params: ConstraintParams,
) -> (Dependency, Dependency) {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let make = |side: SideSeed, current, depended, foreign| Dependency {
        kind,
        constraint: Uuid::nil(),
        constraint_kind: ConstraintKind::PointIdentity,
        ref_type: side.ref_type,
        current_rigid: current,
        depended_rigid: depended,
        foreign: DependencyId(foreign),
        ref_point: side.ref_point,
        ref_axis_end: side.ref_axis_end,
        enabled: true,
        params,
    };
    (make(first, a, b, 1), make(second, b, a, 0))
}
