//! Movement and rotation queries of a dependency against its sibling

use glam::DVec3;
use rand::Rng;

use super::{Dependency, DependencyKind, Movement, RefType};
use crate::constants::{ROTATION_AXIS_SCALE, SPIN_THRESHOLD_FACTOR};
use crate::constraint::Direction;

fn unit_axis(dep: &Dependency) -> DVec3 {
    dep.ref_axis().map_or(DVec3::ZERO, DVec3::normalize_or_zero)
}

/// Small random vector with every component in `[-threshold, threshold]`
fn disturbance<R: Rng + ?Sized>(threshold: f64, rng: &mut R) -> DVec3 {
    let t = threshold.abs();
    DVec3::new(
        rng.gen_range(-t..=t),
        rng.gen_range(-t..=t),
        rng.gen_range(-t..=t),
    )
}

pub(super) fn movement(dep: &Dependency, foreign: &Dependency) -> Option<Movement> {
    if !dep.enabled {
        return None;
    }

    let origin = dep.ref_point;
    let to_foreign = foreign.ref_point - origin;

    let movement = match dep.kind {
        DependencyKind::PointIdentity
        | DependencyKind::CircularEdge
        | DependencyKind::CenterOfMass => Movement::new(origin, to_foreign),
        DependencyKind::PointOnLine => match dep.ref_type {
            RefType::Point => {
                let line = unit_axis(foreign);
                Movement::new(origin, to_foreign - line * to_foreign.dot(line))
            }
            _ => {
                let line = unit_axis(dep);
                let along = line * to_foreign.dot(line);
                Movement::new(origin + along, to_foreign - along)
            }
        },
        DependencyKind::PointOnPlane => match dep.ref_type {
            RefType::Point => {
                let normal = unit_axis(foreign);
                Movement::new(origin, normal * to_foreign.dot(normal))
            }
            _ => {
                let normal = unit_axis(dep);
                let vector = normal * to_foreign.dot(normal);
                Movement::new(origin + (to_foreign - vector), vector)
            }
        },
        DependencyKind::Plane => {
            let normal = unit_axis(foreign);
            Movement::new(origin, normal * to_foreign.dot(normal))
        }
        DependencyKind::Axial => {
            let axis = unit_axis(dep);
            let along = axis * to_foreign.dot(axis);
            Movement::new(origin + along, to_foreign - along)
        }
        DependencyKind::ParallelPlanes
        | DependencyKind::AngledPlanes
        | DependencyKind::AxisParallel
        | DependencyKind::AxisPlaneParallel
        | DependencyKind::AxisPlaneAngle
        | DependencyKind::AxisPlaneNormal => Movement::new(origin, DVec3::ZERO),
    };

    Some(movement)
}

pub(super) fn rotation<R: Rng + ?Sized>(
    dep: &Dependency,
    foreign: &Dependency,
    spin_accuracy: f64,
    rng: &mut R,
) -> Option<DVec3> {
    if !dep.enabled {
        return None;
    }
    let threshold = spin_accuracy * SPIN_THRESHOLD_FACTOR;

    if let Some(target) = dep.kind.target_angle(&dep.params) {
        return target_rotation(dep, foreign, target, threshold, rng);
    }
    if !dep.kind.axis_rotation_enabled() {
        return None;
    }

    let rig = dep.ref_axis()?;
    let mut other = foreign.ref_axis()?;

    // Exactly opposed axes have no defined cross product
    if (rig.normalize_or_zero().dot(other.normalize_or_zero()) + 1.0).abs() < threshold {
        tracing::trace!("Disturbing anti-parallel axes of constraint {}", dep.constraint);
        other += disturbance(threshold, rng);
    }

    if dep.params.direction == Some(Direction::Undirected)
        && rig.angle_between(other) > std::f64::consts::FRAC_PI_2
    {
        other = -other;
    }

    let axis = (rig.cross(other) * ROTATION_AXIS_SCALE).try_normalize()?;
    Some(axis * other.angle_between(rig).to_degrees())
}

/// Rotation driving the angle between both axes towards `target` degrees
fn target_rotation<R: Rng + ?Sized>(
    dep: &Dependency,
    foreign: &Dependency,
    target: f64,
    threshold: f64,
    rng: &mut R,
) -> Option<DVec3> {
    let rig = dep.ref_axis()?;
    let other = foreign.ref_axis()?;
    let delta = target - other.angle_between(rig).to_degrees();

    match rig.cross(other).try_normalize() {
        Some(axis) => Some(axis * -delta),
        None => {
            tracing::trace!(
                "Parallel axes of constraint {}, returning disturbance",
                dep.constraint
            );
            Some(disturbance(threshold, rng))
        }
    }
}
