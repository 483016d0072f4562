//! Assembly Constraints
//!
//! Defines the user-authored geometric relations between sub-elements of
//! two parts. Constraints are read-only input to the dependency factory.

use std::fmt;
use std::str::FromStr;

use rk_cad::SubElement;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssemblyError;

/// Type tag of an assembly constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ConstraintKind {
    /// Two vertices coincide
    PointIdentity,
    /// Two sphere centers coincide
    SphereCenterIdent,
    /// A point lies on a line
    PointOnLine,
    /// A point lies on a plane
    PointOnPlane,
    /// Two circular edges are coaxial and coplanar
    CircularEdge,
    /// Two planes are parallel
    PlanesParallel,
    /// Two planes enclose an angle
    AngledPlanes,
    /// Two planes coincide (optionally with an offset)
    Plane,
    /// Two axes are coaxial
    Axial,
    /// Two axes are parallel
    AxisParallel,
    /// An axis is parallel to a plane
    AxisPlaneParallel,
    /// An axis encloses an angle with a plane
    AxisPlaneAngle,
    /// An axis is normal to a plane
    AxisPlaneNormal,
    /// Centers of mass of two faces or closed edge loops coincide
    CenterOfMass,
}

impl ConstraintKind {
    /// All kinds, in declaration order
    pub const ALL: [ConstraintKind; 14] = [
        ConstraintKind::PointIdentity,
        ConstraintKind::SphereCenterIdent,
        ConstraintKind::PointOnLine,
        ConstraintKind::PointOnPlane,
        ConstraintKind::CircularEdge,
        ConstraintKind::PlanesParallel,
        ConstraintKind::AngledPlanes,
        ConstraintKind::Plane,
        ConstraintKind::Axial,
        ConstraintKind::AxisParallel,
        ConstraintKind::AxisPlaneParallel,
        ConstraintKind::AxisPlaneAngle,
        ConstraintKind::AxisPlaneNormal,
        ConstraintKind::CenterOfMass,
    ];

    /// Get the document tag of this kind
    pub fn tag(&self) -> &'static str {
        match self {
            ConstraintKind::PointIdentity => "pointIdentity",
            ConstraintKind::SphereCenterIdent => "sphereCenterIdent",
            ConstraintKind::PointOnLine => "pointOnLine",
            ConstraintKind::PointOnPlane => "pointOnPlane",
            ConstraintKind::CircularEdge => "circularEdge",
            ConstraintKind::PlanesParallel => "planesParallel",
            ConstraintKind::AngledPlanes => "angledPlanes",
            ConstraintKind::Plane => "plane",
            ConstraintKind::Axial => "axial",
            ConstraintKind::AxisParallel => "axisParallel",
            ConstraintKind::AxisPlaneParallel => "axisPlaneParallel",
            ConstraintKind::AxisPlaneAngle => "axisPlaneAngle",
            ConstraintKind::AxisPlaneNormal => "axisPlaneNormal",
            ConstraintKind::CenterOfMass => "CenterOfMass",
        }
    }

    /// Get the display name of this kind
    pub fn type_name(&self) -> &'static str {
        match self {
            ConstraintKind::PointIdentity => "Point Identity",
            ConstraintKind::SphereCenterIdent => "Sphere Center",
            ConstraintKind::PointOnLine => "Point on Line",
            ConstraintKind::PointOnPlane => "Point on Plane",
            ConstraintKind::CircularEdge => "Circular Edge",
            ConstraintKind::PlanesParallel => "Planes Parallel",
            ConstraintKind::AngledPlanes => "Angled Planes",
            ConstraintKind::Plane => "Plane Coincident",
            ConstraintKind::Axial => "Axial",
            ConstraintKind::AxisParallel => "Axis Parallel",
            ConstraintKind::AxisPlaneParallel => "Axis Plane Parallel",
            ConstraintKind::AxisPlaneAngle => "Axis Plane Angle",
            ConstraintKind::AxisPlaneNormal => "Axis Plane Normal",
            ConstraintKind::CenterOfMass => "Center of Mass",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ConstraintKind {
    type Err = AssemblyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // axisPlaneVertical is the old name of axisPlaneNormal
        if s == "axisPlaneVertical" {
            return Ok(ConstraintKind::AxisPlaneNormal);
        }
        ConstraintKind::ALL
            .into_iter()
            .find(|kind| kind.tag() == s)
            .ok_or_else(|| AssemblyError::UnsupportedConstraint(s.to_string()))
    }
}

impl TryFrom<String> for ConstraintKind {
    type Error = AssemblyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ConstraintKind> for String {
    fn from(kind: ConstraintKind) -> Self {
        kind.tag().to_string()
    }
}

/// Requested orientation of the second element relative to the first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Axes or normals point the same way
    Aligned,
    /// Axes or normals point in opposite directions
    Opposed,
    /// Either orientation is accepted
    #[serde(rename = "none")]
    Undirected,
}

/// A sub-element of a specific part
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementRef {
    /// Part (rigid body) the element belongs to
    pub part: Uuid,
    /// Sub-element name
    pub element: SubElement,
}

impl ElementRef {
    pub fn new(part: Uuid, element: SubElement) -> Self {
        Self { part, element }
    }
}

/// Optional parameters of a constraint, copied into its dependencies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ConstraintParams {
    /// Orientation mode (None when the constraint type has none)
    pub direction: Option<Direction>,
    /// Offset along the normal or axis
    pub offset: f64,
    /// Target angle in degrees
    pub angle: f64,
    /// Whether rotation around the constrained axis is locked
    pub lock_rotation: bool,
}

impl ConstraintParams {
    /// Whether the second element's axis has to be flipped
    pub fn is_opposed(&self) -> bool {
        self.direction == Some(Direction::Opposed)
    }
}

/// A geometric constraint between two parts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Unique identifier
    pub id: Uuid,
    /// Constraint type
    pub kind: ConstraintKind,
    /// Element on the first part
    pub first: ElementRef,
    /// Element on the second part
    pub second: ElementRef,
    /// Optional parameters
    #[serde(default)]
    pub params: ConstraintParams,
}

impl Constraint {
    /// Create a constraint without optional parameters
    pub fn new(kind: ConstraintKind, first: ElementRef, second: ElementRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            first,
            second,
            params: ConstraintParams::default(),
        }
    }

    /// Create a constraint from a document type tag
    pub fn from_tag(
        tag: &str,
        first: ElementRef,
        second: ElementRef,
    ) -> Result<Self, AssemblyError> {
        Ok(Self::new(tag.parse()?, first, second))
    }

    /// Set the direction mode
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.params.direction = Some(direction);
        self
    }

    /// Set the offset
    pub fn with_offset(mut self, offset: f64) -> Self {
        self.params.offset = offset;
        self
    }

    /// Set the target angle in degrees
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.params.angle = angle;
        self
    }

    /// Lock or unlock rotation around the constrained axis
    pub fn with_lock_rotation(mut self, lock_rotation: bool) -> Self {
        self.params.lock_rotation = lock_rotation;
        self
    }

    /// Get the parts referenced by this constraint
    pub fn referenced_parts(&self) -> [Uuid; 2] {
        [self.first.part, self.second.part]
    }

    /// Check if this constraint references a specific part
    pub fn references_part(&self, part: Uuid) -> bool {
        self.referenced_parts().contains(&part)
    }
}
