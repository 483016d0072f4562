//! Sampling constraint geometry into a dependency pair
//!
//! Each constraint type decides which sub-element feeds the reference point
//! and which direction becomes the reference axis of each side. The second
//! side carries the orientation flip and the offset shift.

use glam::DVec3;
use rk_cad::{GeometryQuery, SubElementKind, plane_normal};

use super::{DependencyKind, RefType};
use crate::constants::ON_AXIS_TOLERANCE;
use crate::constraint::{Constraint, ConstraintKind, ElementRef};
use crate::error::{AssemblyError, AssemblyResult};

/// Sampled geometry of one side of a pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SideSeed {
    pub ref_type: RefType,
    pub ref_point: DVec3,
    pub ref_axis_end: Option<DVec3>,
}

impl SideSeed {
    pub fn point(ref_point: DVec3) -> Self {
        Self {
            ref_type: RefType::Point,
            ref_point,
            ref_axis_end: None,
        }
    }

    pub fn with_axis(ref_type: RefType, ref_point: DVec3, axis: DVec3) -> Self {
        Self {
            ref_type,
            ref_point,
            ref_axis_end: Some(ref_point + axis),
        }
    }

    fn shifted(mut self, shift: DVec3) -> Self {
        self.ref_point += shift;
        self.ref_axis_end = self.ref_axis_end.map(|end| end + shift);
        self
    }
}

/// Geometry of both sides, ready to become a dependency pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PairSeed {
    pub kind: DependencyKind,
    pub first: SideSeed,
    pub second: SideSeed,
}

/// Shift applied to the second side, zero when the offset is below
/// `threshold`
fn offset_shift(direction: DVec3, offset: f64, threshold: f64) -> DVec3 {
    if offset.abs() > threshold {
        direction * offset
    } else {
        DVec3::ZERO
    }
}

fn flip_if(opposed: bool, v: DVec3) -> DVec3 {
    if opposed { -v } else { v }
}

/// Planar face sampled as (bbox center, normal)
fn plane<G: GeometryQuery + ?Sized>(
    geometry: &G,
    at: ElementRef,
) -> AssemblyResult<(DVec3, DVec3)> {
    let face = geometry.face(at.part, at.element)?;
    let normal = plane_normal(at.element, &face)?;
    Ok((face.bbox_center, normal))
}

/// Move the reference point of a face of revolution next to the face
///
/// The axis origin of a cylinder can lie far outside the face itself. The
/// bounding box center is projected onto the axis instead.
fn adjust_ref_point<G: GeometryQuery + ?Sized>(
    geometry: &G,
    at: ElementRef,
    ref_point: DVec3,
    axis: DVec3,
) -> AssemblyResult<DVec3> {
    if !at.element.is_face() {
        return Ok(ref_point);
    }
    let center = geometry.face(at.part, at.element)?.bbox_center;
    let axis = axis.normalize_or_zero();
    let along = axis * (center - ref_point).dot(axis);

    if (center - ref_point - along).length() < ON_AXIS_TOLERANCE {
        Ok(center)
    } else {
        Ok(ref_point + along)
    }
}

/// Center of mass and normal of a face or closed edge loop
fn mass_region<G: GeometryQuery + ?Sized>(
    geometry: &G,
    constraint: &Constraint,
    at: ElementRef,
) -> AssemblyResult<(DVec3, DVec3)> {
    match at.element.kind {
        SubElementKind::Face => {
            let face = geometry.face(at.part, at.element)?;
            Ok((face.center_of_mass, plane_normal(at.element, &face)?))
        }
        SubElementKind::Edge => {
            let region = geometry.edge_region(at.part, at.element)?;
            Ok((region.center_of_mass, region.normal))
        }
        SubElementKind::Vertex => Err(AssemblyError::UnsupportedElement {
            constraint: constraint.id,
            element: at.element,
        }),
    }
}

/// Sample the geometry referenced by `constraint`
///
/// `threshold` is the smallest offset that shifts the second side.
pub(crate) fn sample_pair<G: GeometryQuery + ?Sized>(
    constraint: &Constraint,
    geometry: &G,
    threshold: f64,
) -> AssemblyResult<PairSeed> {
    let (a, b) = (constraint.first, constraint.second);
    let params = &constraint.params;
    let opposed = params.is_opposed();
    let position = |at: ElementRef| geometry.position(at.part, at.element);
    let axis = |at: ElementRef| geometry.axis(at.part, at.element);

    let (first, second) = match constraint.kind {
        ConstraintKind::PointIdentity | ConstraintKind::SphereCenterIdent => (
            SideSeed::point(position(a)?),
            SideSeed::point(position(b)?),
        ),
        ConstraintKind::PointOnLine => (
            SideSeed::point(position(a)?),
            SideSeed::with_axis(RefType::PointAxis, position(b)?, axis(b)?),
        ),
        ConstraintKind::PointOnPlane => {
            let (center, normal) = plane(geometry, b)?;
            (
                SideSeed::point(position(a)?),
                SideSeed::with_axis(RefType::Plane, center, normal)
                    .shifted(offset_shift(normal, params.offset, threshold)),
            )
        }
        ConstraintKind::CircularEdge => {
            let axis2 = flip_if(opposed, axis(b)?);
            (
                SideSeed::with_axis(RefType::PointAxis, position(a)?, axis(a)?),
                SideSeed::with_axis(RefType::PointAxis, position(b)?, axis2)
                    .shifted(offset_shift(axis2, params.offset, threshold)),
            )
        }
        ConstraintKind::PlanesParallel | ConstraintKind::AngledPlanes | ConstraintKind::Plane => {
            let (center1, normal1) = plane(geometry, a)?;
            let (center2, normal2) = plane(geometry, b)?;
            // Angled planes measure the angle between the raw normals
            let normal2 = flip_if(
                opposed && constraint.kind != ConstraintKind::AngledPlanes,
                normal2,
            );
            let shift = if constraint.kind == ConstraintKind::Plane {
                offset_shift(normal2, params.offset, threshold)
            } else {
                DVec3::ZERO
            };
            (
                SideSeed::with_axis(RefType::PointNormal, center1, normal1),
                SideSeed::with_axis(RefType::PointNormal, center2, normal2).shifted(shift),
            )
        }
        ConstraintKind::Axial => {
            let axis1 = axis(a)?;
            let axis2 = flip_if(opposed, axis(b)?);
            let point1 = adjust_ref_point(geometry, a, position(a)?, axis1)?;
            let point2 = adjust_ref_point(geometry, b, position(b)?, axis2)?;
            (
                SideSeed::with_axis(RefType::PointAxis, point1, axis1),
                SideSeed::with_axis(RefType::PointAxis, point2, axis2),
            )
        }
        ConstraintKind::AxisParallel => (
            SideSeed::with_axis(RefType::PointAxis, position(a)?, axis(a)?),
            SideSeed::with_axis(RefType::PointAxis, position(b)?, flip_if(opposed, axis(b)?)),
        ),
        ConstraintKind::AxisPlaneParallel
        | ConstraintKind::AxisPlaneAngle
        | ConstraintKind::AxisPlaneNormal => {
            let axis1 = axis(a)?.normalize_or_zero();
            let (center, normal) = plane(geometry, b)?;
            // The parallel relation does not care about the normal's sense
            let normal = flip_if(
                opposed && constraint.kind != ConstraintKind::AxisPlaneParallel,
                normal,
            );
            (
                SideSeed::with_axis(RefType::PointAxis, position(a)?, axis1),
                SideSeed::with_axis(RefType::PointNormal, center, normal),
            )
        }
        ConstraintKind::CenterOfMass => {
            let (center1, normal1) = mass_region(geometry, constraint, a)?;
            let (center2, normal2) = mass_region(geometry, constraint, b)?;
            let normal2 = flip_if(opposed, normal2);
            (
                SideSeed::with_axis(RefType::Point, center1, normal1),
                SideSeed::with_axis(RefType::Point, center2, normal2)
                    .shifted(offset_shift(normal2, params.offset, threshold)),
            )
        }
    };

    Ok(PairSeed {
        kind: DependencyKind::from_constraint(constraint.kind),
        first,
        second,
    })
}
