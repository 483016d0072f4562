//! Degree-of-freedom algebra
//!
//! Free positional directions and free rotational axes of a rigid body are
//! kept as small sets of unit vectors spanning the free subspace. Each
//! reducer takes a constraint axis (or normal) and returns the reduced set.
//! Reducers never grow a set.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::{AXIS_CLEAN_EPSILON, DOF_TOLERANCE};

/// Free positional and rotational axes of one rigid body
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DofState {
    /// Directions the body may still translate along
    pub position: Vec<DVec3>,
    /// Axes the body may still rotate about
    pub rotation: Vec<DVec3>,
}

impl DofState {
    /// Unconstrained body: three positional and three rotational DOF
    pub fn full() -> Self {
        Self {
            position: vec![DVec3::X, DVec3::Y, DVec3::Z],
            rotation: vec![DVec3::X, DVec3::Y, DVec3::Z],
        }
    }

    /// Fully constrained body
    pub fn fixed() -> Self {
        Self::default()
    }

    pub fn position_count(&self) -> usize {
        self.position.len()
    }

    pub fn rotation_count(&self) -> usize {
        self.rotation.len()
    }

    /// Total number of remaining degrees of freedom
    pub fn count(&self) -> usize {
        self.position_count() + self.rotation_count()
    }
}

/// Snap numerical noise to zero and normalize
///
/// Returns `None` for vectors that vanish after cleaning.
pub fn clean_axis(axis: DVec3) -> Option<DVec3> {
    let snap = |c: f64| if c.abs() < AXIS_CLEAN_EPSILON { 0.0 } else { c };
    DVec3::new(snap(axis.x), snap(axis.y), snap(axis.z)).try_normalize()
}

fn is_parallel(a: DVec3, b: DVec3) -> bool {
    a.cross(b).length() < DOF_TOLERANCE
}

fn is_perpendicular(a: DVec3, b: DVec3) -> bool {
    a.dot(b).abs() < DOF_TOLERANCE
}

/// Normal of the plane spanned by two independent directions
fn span_normal(a: DVec3, b: DVec3) -> Option<DVec3> {
    a.cross(b).try_normalize()
}

/// Check whether `axis` lies in the subspace spanned by `basis`
fn in_span(axis: DVec3, basis: &[DVec3]) -> bool {
    match basis {
        [] => false,
        [a] => is_parallel(*a, axis),
        [a, b] => span_normal(*a, *b).is_some_and(|n| is_perpendicular(n, axis)),
        _ => true,
    }
}

/// Only the part of `basis` along `axis` survives
fn restrict_to_axis(axis: DVec3, basis: &[DVec3]) -> Vec<DVec3> {
    let Some(axis) = clean_axis(axis) else {
        return basis.to_vec();
    };
    if in_span(axis, basis) {
        vec![axis]
    } else {
        Vec::new()
    }
}

/// Rotation is only possible about the constraint axis
///
/// Used for coaxial and parallel relations: rotation about the two axes
/// perpendicular to `axis` is removed.
pub fn axis_alignment(axis: DVec3, rotation: &[DVec3]) -> Vec<DVec3> {
    restrict_to_axis(axis, rotation)
}

/// Translation is only possible along the constraint axis
pub fn axis_distance(axis: DVec3, position: &[DVec3]) -> Vec<DVec3> {
    restrict_to_axis(axis, position)
}

/// Translation along the plane normal is removed
pub fn plane_offset(normal: DVec3, position: &[DVec3]) -> Vec<DVec3> {
    let Some(normal) = clean_axis(normal) else {
        return position.to_vec();
    };
    match position {
        [] => Vec::new(),
        [a] => {
            if is_perpendicular(*a, normal) {
                vec![*a]
            } else {
                Vec::new()
            }
        }
        [a, b] => match span_normal(*a, *b) {
            Some(m) if is_parallel(m, normal) => position.to_vec(),
            // Intersection line of the free plane and the constraint plane
            Some(m) => clean_axis(m.cross(normal)).into_iter().collect(),
            None => Vec::new(),
        },
        _ => {
            let u = normal.any_orthonormal_vector();
            vec![u, normal.cross(u)]
        }
    }
}

/// One rotational DOF is removed, rotation about `axis` stays free
///
/// Used for relations fixing an angle between an axis or normal and its
/// counterpart.
pub fn angle_alignment(axis: DVec3, rotation: &[DVec3]) -> Vec<DVec3> {
    let Some(axis) = clean_axis(axis) else {
        return rotation.to_vec();
    };
    match rotation {
        [] => Vec::new(),
        [a] => {
            if is_parallel(*a, axis) {
                vec![*a]
            } else {
                Vec::new()
            }
        }
        [a, b] => {
            if in_span(axis, rotation) {
                return vec![axis];
            }
            match span_normal(*a, *b) {
                Some(m) if is_parallel(m, axis) => vec![*a],
                Some(m) => clean_axis(m.cross(axis)).into_iter().collect(),
                None => Vec::new(),
            }
        }
        _ => vec![axis, axis.any_orthonormal_vector()],
    }
}

/// A point of the body is pinned
///
/// All positional freedom is removed. Rotation is restricted by the points
/// pinned earlier on the same body: without any, the body may still spin
/// about the point; with collinear ones only about the line through them;
/// otherwise not at all. Must run after every axis-based reducer.
pub fn point_identity(point: DVec3, state: &DofState, pinned: &[DVec3]) -> DofState {
    let directions: Vec<DVec3> = pinned
        .iter()
        .filter_map(|p| (*p - point).try_normalize())
        .collect();

    let rotation = match directions.first() {
        None => state.rotation.clone(),
        Some(&line) if directions.iter().all(|d| is_parallel(*d, line)) => {
            axis_alignment(line, &state.rotation)
        }
        Some(_) => Vec::new(),
    };

    DofState {
        position: Vec::new(),
        rotation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans_equal(a: &[DVec3], b: &[DVec3]) -> bool {
        a.len() == b.len() && a.iter().all(|v| in_span(*v, b))
    }

    #[test]
    fn test_full_state() {
        let state = DofState::full();
        assert_eq!(state.count(), 6);
        assert_eq!(DofState::fixed().count(), 0);
    }

    #[test]
    fn test_clean_axis() {
        let axis = clean_axis(DVec3::new(1e-12, 2.0, -1e-11)).unwrap();
        assert_eq!(axis, DVec3::Y);
        assert!(clean_axis(DVec3::splat(1e-12)).is_none());
    }

    #[test]
    fn test_axis_alignment() {
        let state = DofState::full();
        let rot = axis_alignment(DVec3::new(0.0, 0.0, 3.0), &state.rotation);
        assert_eq!(rot, vec![DVec3::Z]);

        // Already restricted to a different axis
        assert!(axis_alignment(DVec3::Y, &[DVec3::X]).is_empty());
        assert_eq!(axis_alignment(DVec3::X, &[DVec3::X]), vec![DVec3::X]);
    }

    #[test]
    fn test_axis_distance_in_plane() {
        let axis = DVec3::new(1.0, 1.0, 0.0);
        let pos = axis_distance(axis, &[DVec3::X, DVec3::Y]);
        assert_eq!(pos.len(), 1);
        assert!(is_parallel(pos[0], axis.normalize()));

        assert!(axis_distance(DVec3::Z, &[DVec3::X, DVec3::Y]).is_empty());
    }

    #[test]
    fn test_plane_offset() {
        let pos = plane_offset(DVec3::Z, &DofState::full().position);
        assert!(spans_equal(&pos, &[DVec3::X, DVec3::Y]));

        // Same plane: nothing more to remove
        let same = plane_offset(-DVec3::Z, &pos);
        assert!(spans_equal(&same, &[DVec3::X, DVec3::Y]));

        // Tilted plane leaves the intersection line
        let tilted = plane_offset(DVec3::new(1.0, 0.0, 1.0), &[DVec3::X, DVec3::Y]);
        assert_eq!(tilted.len(), 1);
        assert!(is_parallel(tilted[0], DVec3::Y));

        assert!(plane_offset(DVec3::X, &[DVec3::X]).is_empty());
        assert_eq!(plane_offset(DVec3::X, &[DVec3::Y]), vec![DVec3::Y]);
    }

    #[test]
    fn test_angle_alignment() {
        let rot = angle_alignment(DVec3::Z, &DofState::full().rotation);
        assert_eq!(rot.len(), 2);
        assert!(in_span(DVec3::Z, &rot));

        assert_eq!(angle_alignment(DVec3::Z, &[DVec3::X, DVec3::Z]), vec![DVec3::Z]);

        let tilted = angle_alignment(DVec3::Z, &[DVec3::X, DVec3::Y]);
        assert_eq!(tilted.len(), 1);
        assert!(is_perpendicular(tilted[0], DVec3::Z));
    }

    #[test]
    fn test_point_identity_without_prior_points() {
        let state = point_identity(DVec3::ONE, &DofState::full(), &[]);
        assert_eq!(state.position_count(), 0);
        assert_eq!(state.rotation_count(), 3);
    }

    #[test]
    fn test_point_identity_with_prior_points() {
        let point = DVec3::ZERO;
        let one = point_identity(point, &DofState::full(), &[DVec3::new(0.0, 0.0, 4.0)]);
        assert_eq!(one.rotation, vec![DVec3::Z]);

        let collinear = point_identity(
            point,
            &DofState::full(),
            &[DVec3::new(0.0, 0.0, 4.0), DVec3::new(0.0, 0.0, -2.0)],
        );
        assert_eq!(collinear.rotation_count(), 1);

        let spread = point_identity(point, &DofState::full(), &[DVec3::X, DVec3::Y]);
        assert_eq!(spread.count(), 0);

        // A prior point at the same location adds nothing
        let same = point_identity(point, &DofState::full(), &[point]);
        assert_eq!(same.rotation_count(), 3);
    }

    #[test]
    fn test_reducers_never_grow() {
        let axes = [
            DVec3::X,
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(0.0, -1.0, 1.0),
            DVec3::Z,
        ];
        let mut state = DofState::full();
        for axis in axes {
            let before = state.count();
            state.rotation = angle_alignment(axis, &state.rotation);
            state.position = plane_offset(axis, &state.position);
            assert!(state.count() <= before);
        }
        for axis in axes {
            let before = state.count();
            state.rotation = axis_alignment(axis, &state.rotation);
            state.position = axis_distance(axis, &state.position);
            assert!(state.count() <= before);
        }
    }

    #[test]
    fn test_point_identity_subsumes_axis_alignment() {
        let point = DVec3::new(1.0, 0.0, 0.0);
        let pinned = [DVec3::new(1.0, 0.0, 5.0)];

        let mut axis_first = DofState::full();
        axis_first.rotation = axis_alignment(DVec3::Y, &axis_first.rotation);
        let axis_first = point_identity(point, &axis_first, &pinned);

        let point_first = point_identity(point, &DofState::full(), &pinned);

        assert!(axis_first.count() <= point_first.count());
    }
}
