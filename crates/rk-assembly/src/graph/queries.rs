//! Per-iteration queries of the outer solver

use glam::DVec3;
use uuid::Uuid;

use super::{DependencyGraph, lookup};
use crate::dependency::{Dependency, DependencyId, Movement};
use crate::dof::DofState;
use crate::error::{AssemblyError, AssemblyResult};

impl DependencyGraph {
    /// Translation the owning body needs for this dependency
    pub fn movement(&self, id: DependencyId) -> AssemblyResult<Option<Movement>> {
        let dep = self.dependency(id)?;
        Ok(dep.movement(self.dependency(dep.foreign)?))
    }

    /// Rotation the owning body needs for this dependency
    ///
    /// Degenerate configurations draw from the graph's random source.
    pub fn rotation(&mut self, id: DependencyId) -> AssemblyResult<Option<DVec3>> {
        let dep = lookup(&self.dependencies, id)?;
        let foreign = lookup(&self.dependencies, dep.foreign)?;
        Ok(dep.rotation(foreign, self.settings.spin_accuracy, &mut self.rng))
    }

    /// Remaining degrees of freedom of a rigid body
    ///
    /// Only enabled dependencies count. Point-class dependencies are
    /// evaluated last so they see all axis restrictions.
    pub fn calc_dof(&self, rigid: Uuid) -> AssemblyResult<DofState> {
        let owned = self
            .rigid(rigid)?
            .dependencies()
            .iter()
            .map(|id| self.dependency(*id))
            .collect::<AssemblyResult<Vec<&Dependency>>>()?;

        let (points, others): (Vec<&Dependency>, Vec<&Dependency>) = owned
            .into_iter()
            .filter(|dep| dep.is_enabled())
            .partition(|dep| dep.kind().is_point_constraint());

        let mut state = others
            .iter()
            .fold(DofState::full(), |state, dep| dep.calc_dof(&state, &[]));

        let mut pinned = Vec::with_capacity(points.len());
        for dep in points {
            state = dep.calc_dof(&state, &pinned);
            pinned.push(dep.ref_point());
        }

        tracing::trace!("Rigid {} has {} DOF left", rigid, state.count());
        Ok(state)
    }

    /// Number of remaining degrees of freedom of a rigid body
    pub fn dof_count(&self, rigid: Uuid) -> AssemblyResult<usize> {
        Ok(self.calc_dof(rigid)?.count())
    }

    /// Human-readable summary of a dependency
    pub fn describe(&self, id: DependencyId) -> AssemblyResult<String> {
        let dep = self.dependency(id)?;
        let label = |rigid: Uuid| {
            self.rigids
                .get(&rigid)
                .map(|r| r.label.as_str())
                .ok_or(AssemblyError::RigidNotFound(rigid))
        };
        Ok(format!(
            "Dependency between {}-{}, type {}",
            label(dep.current_rigid)?,
            label(dep.depended_rigid)?,
            dep.constraint_kind()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::scene;
    use crate::constraint::{Constraint, ConstraintKind, Direction};
    use crate::dof::DofState;
    use crate::error::AssemblyError;
    use approx::assert_relative_eq;
    use glam::{DAffine3, DVec3};
    use rk_cad::SubElement;

    #[test]
    fn test_point_identity_after_translation() {
        let mut s = scene(0.1);
        let c = s.constraint(
            ConstraintKind::PointIdentity,
            SubElement::vertex(1),
            SubElement::vertex(1),
        );
        let (d1, d2) = s.add(&c);
        let work_list = s.work_list();
        s.graph.enable(d1, &work_list).unwrap();

        let m1 = s.graph.movement(d1).unwrap().unwrap();
        let m2 = s.graph.movement(d2).unwrap().unwrap();
        assert_relative_eq!(m1.vector.length(), 10.0);
        assert!(m1.vector.abs_diff_eq(-m2.vector, 1e-12));

        // Bring B down onto A
        let shift = DAffine3::from_translation(DVec3::new(0.0, 0.0, -10.0));
        s.graph.apply_placement(s.b, &shift).unwrap();
        let m1 = s.graph.movement(d1).unwrap().unwrap();
        assert!(m1.vector.abs_diff_eq(DVec3::ZERO, 1e-12));
    }

    #[test]
    fn test_disabled_pair_has_no_motion() {
        let mut s = scene(0.1);
        let c = s.constraint(
            ConstraintKind::AxisParallel,
            SubElement::edge(2),
            SubElement::edge(1),
        );
        let (d1, _) = s.add(&c);

        assert!(s.graph.movement(d1).unwrap().is_none());
        assert!(s.graph.rotation(d1).unwrap().is_none());
    }

    #[test]
    fn test_circular_edge_opposed_dof() {
        let mut s = scene(0.1);
        let c = s
            .constraint(
                ConstraintKind::CircularEdge,
                SubElement::edge(1),
                SubElement::edge(1),
            )
            .with_direction(Direction::Opposed)
            .with_lock_rotation(false);
        let (d1, d2) = s.add(&c);

        // Same-signed geometric axes become anti-parallel
        let a1 = s.graph.dependency(d1).unwrap().ref_axis().unwrap();
        let a2 = s.graph.dependency(d2).unwrap().ref_axis().unwrap();
        assert_relative_eq!(a1.dot(a2), -1.0);

        let work_list = s.work_list();
        s.graph.enable(d1, &work_list).unwrap();
        let dof = s.graph.calc_dof(s.a).unwrap();
        assert_eq!(dof.rotation, vec![DVec3::Z]);
        assert_eq!(dof.position_count(), 3);
    }

    #[test]
    fn test_plane_offset_threshold() {
        let mut s = scene(1.0);
        let shifted = s
            .constraint(ConstraintKind::Plane, SubElement::face(1), SubElement::face(1))
            .with_offset(5.0);
        let (_, d2) = s.add(&shifted);
        let dep = s.graph.dependency(d2).unwrap();
        assert_eq!(dep.ref_point(), DVec3::new(0.0, 0.0, 15.0));
        assert_eq!(dep.ref_axis_end(), Some(DVec3::new(0.0, 0.0, 16.0)));

        let small = s
            .constraint(ConstraintKind::Plane, SubElement::face(1), SubElement::face(1))
            .with_offset(0.05);
        let (_, d2) = s.add(&small);
        let dep = s.graph.dependency(d2).unwrap();
        assert_eq!(dep.ref_point(), DVec3::new(0.0, 0.0, 10.0));
        assert_eq!(dep.ref_axis_end(), Some(DVec3::new(0.0, 0.0, 11.0)));
    }

    #[test]
    fn test_unknown_constraint_type() {
        let mut s = scene(0.1);
        let document = |kind: &str| {
            format!(
                r#"(
                    id: "{}",
                    kind: "{}",
                    first: (part: "{}", element: "Face1"),
                    second: (part: "{}", element: "Face1"),
                )"#,
                uuid::Uuid::new_v4(),
                kind,
                s.a,
                s.b
            )
        };

        let err = ron::from_str::<Constraint>(&document("gearMesh")).unwrap_err();
        assert!(err.to_string().contains("gearMesh"));
        let c = s.constraint(ConstraintKind::Plane, SubElement::face(1), SubElement::face(1));
        assert!(matches!(
            Constraint::from_tag("gearMesh", c.first, c.second),
            Err(AssemblyError::UnsupportedConstraint(tag)) if tag == "gearMesh"
        ));
        assert!(s.graph.is_empty());
        assert!(s.graph.rigid(s.a).unwrap().dependencies().is_empty());
        assert!(s.graph.rigid(s.b).unwrap().dependencies().is_empty());

        // The same document with a known tag goes through
        let plane: Constraint = ron::from_str(&document("plane")).unwrap();
        assert_eq!(plane.kind, ConstraintKind::Plane);
        s.add(&plane);
        assert_eq!(s.graph.len(), 2);
    }

    #[test]
    fn test_undirected_anti_parallel_rotation_is_seeded() {
        let rotations: Vec<DVec3> = (0..2)
            .map(|_| {
                let mut s = scene(0.1);
                let mut transform = DAffine3::from_rotation_x(std::f64::consts::PI);
                transform.translation = DVec3::new(0.0, 0.0, 20.0);
                // B's axis now points down while A's points up
                s.geometry.transform_part(s.b, &transform);

                let c = s
                    .constraint(ConstraintKind::Axial, SubElement::face(2), SubElement::face(2))
                    .with_direction(Direction::Undirected);
                let (d1, _) = s.add(&c);
                let work_list = s.work_list();
                s.graph.enable(d1, &work_list).unwrap();
                s.graph.rotation(d1).unwrap().unwrap()
            })
            .collect();

        assert!(rotations[0].is_finite());
        assert!(rotations[0].length() > 0.0);
        assert_eq!(rotations[0], rotations[1]);
    }

    #[test]
    fn test_point_constraints_dof() {
        let mut s = scene(0.1);
        for index in [1, 2, 3] {
            let c = s.constraint(
                ConstraintKind::PointIdentity,
                SubElement::vertex(index),
                SubElement::vertex(index),
            );
            let (d1, _) = s.add(&c);
            let work_list = s.work_list();
            s.graph.enable(d1, &work_list).unwrap();
            let expected = match index {
                1 => 3,
                2 => 1,
                _ => 0,
            };
            assert_eq!(s.graph.dof_count(s.a).unwrap(), expected);
        }
    }

    #[test]
    fn test_plane_and_axial_dof() {
        let mut s = scene(0.1);
        let work_list = s.work_list();
        let plane = s.constraint(ConstraintKind::Plane, SubElement::face(1), SubElement::face(1));
        s.add(&plane);
        assert_eq!(s.graph.dof_count(s.b).unwrap(), 6);
        s.graph.enable_dependencies(s.b, &work_list).unwrap();
        assert_eq!(s.graph.dof_count(s.b).unwrap(), 3);

        let axial = s.constraint(ConstraintKind::Axial, SubElement::face(2), SubElement::face(2));
        s.add(&axial);
        s.graph.enable_dependencies(s.b, &work_list).unwrap();
        let dof = s.graph.calc_dof(s.b).unwrap();
        assert_eq!(dof.position_count(), 0);
        assert_eq!(dof.rotation, vec![DVec3::Z]);
    }

    #[test]
    fn test_point_after_axis_restriction() {
        let mut s = scene(0.1);
        // Added first so the DOF pass has to reorder
        let point = s.constraint(
            ConstraintKind::PointIdentity,
            SubElement::vertex(1),
            SubElement::vertex(1),
        );
        s.add(&point);
        let parallel = s.constraint(
            ConstraintKind::AxisParallel,
            SubElement::edge(2),
            SubElement::edge(2),
        );
        s.add(&parallel);
        let work_list = s.work_list();
        s.graph.enable_dependencies(s.a, &work_list).unwrap();

        let dof = s.graph.calc_dof(s.a).unwrap();
        assert_eq!(dof.position_count(), 0);
        assert_eq!(dof.rotation, vec![DVec3::X]);
    }

    #[test]
    fn test_disabled_pair_keeps_full_dof() {
        let mut s = scene(0.1);
        let c = s.constraint(ConstraintKind::Plane, SubElement::face(1), SubElement::face(1));
        let (d1, _) = s.add(&c);

        assert_eq!(s.graph.calc_dof(s.a).unwrap(), DofState::full());
        assert_eq!(s.graph.dof_count(s.a).unwrap(), 6);

        let work_list = s.work_list();
        s.graph.enable(d1, &work_list).unwrap();
        assert_eq!(s.graph.dof_count(s.a).unwrap(), 3);

        s.graph.disable(d1).unwrap();
        assert_eq!(s.graph.calc_dof(s.a).unwrap(), DofState::full());
        assert_eq!(s.graph.calc_dof(s.b).unwrap(), DofState::full());
    }

    #[test]
    fn test_every_kind_builds_a_linked_pair() {
        let mut s = scene(0.1);
        let work_list = s.work_list();

        for (n, kind) in ConstraintKind::ALL.into_iter().enumerate() {
            let (first, second) = match kind {
                ConstraintKind::PointIdentity | ConstraintKind::SphereCenterIdent => {
                    (SubElement::vertex(1), SubElement::vertex(1))
                }
                ConstraintKind::PointOnLine => (SubElement::vertex(1), SubElement::edge(2)),
                ConstraintKind::PointOnPlane => (SubElement::vertex(1), SubElement::face(1)),
                ConstraintKind::CircularEdge => (SubElement::edge(1), SubElement::edge(1)),
                ConstraintKind::PlanesParallel
                | ConstraintKind::AngledPlanes
                | ConstraintKind::Plane
                | ConstraintKind::CenterOfMass => (SubElement::face(1), SubElement::face(1)),
                ConstraintKind::Axial => (SubElement::face(2), SubElement::face(2)),
                ConstraintKind::AxisParallel => (SubElement::edge(2), SubElement::edge(2)),
                ConstraintKind::AxisPlaneParallel
                | ConstraintKind::AxisPlaneAngle
                | ConstraintKind::AxisPlaneNormal => (SubElement::edge(2), SubElement::face(1)),
            };
            let c = s.constraint(kind, first, second);
            let (d1, d2) = s.add(&c);

            let foreign = s.graph.dependency(d1).unwrap().foreign();
            assert_eq!(foreign, d2, "{kind}");
            assert_eq!(s.graph.dependency(foreign).unwrap().foreign(), d1, "{kind}");

            let dep1 = s.graph.dependency(d1).unwrap();
            let dep2 = s.graph.dependency(d2).unwrap();
            assert_eq!(dep1.current_rigid(), s.a, "{kind}");
            assert_eq!(dep1.depended_rigid(), s.b, "{kind}");
            assert_eq!(dep2.current_rigid(), s.b, "{kind}");
            assert_eq!(dep2.depended_rigid(), s.a, "{kind}");
            assert_eq!(dep1.constraint_kind(), kind, "{kind}");

            assert_eq!(s.graph.rigid(s.a).unwrap().dependencies().len(), n + 1);
            assert_eq!(s.graph.rigid(s.a).unwrap().dependencies()[n], d1, "{kind}");
            assert_eq!(s.graph.rigid(s.b).unwrap().dependencies()[n], d2, "{kind}");

            for id in [d1, d2] {
                assert!(s.graph.movement(id).unwrap().is_none(), "{kind}");
                assert!(s.graph.rotation(id).unwrap().is_none(), "{kind}");
            }

            assert!(s.graph.enable(d1, &work_list).unwrap(), "{kind}");
            assert!(s.graph.dependency(d2).unwrap().is_enabled(), "{kind}");
            s.graph.disable(d2).unwrap();
            for id in [d1, d2] {
                assert!(!s.graph.dependency(id).unwrap().is_enabled(), "{kind}");
                assert!(s.graph.movement(id).unwrap().is_none(), "{kind}");
                assert!(s.graph.rotation(id).unwrap().is_none(), "{kind}");
            }
        }
        assert_eq!(s.graph.len(), 2 * ConstraintKind::ALL.len());
    }

    #[test]
    fn test_describe() {
        let mut s = scene(0.1);
        let c = s.constraint(ConstraintKind::Plane, SubElement::face(1), SubElement::face(1));
        let (d1, d2) = s.add(&c);

        assert_eq!(
            s.graph.describe(d1).unwrap(),
            "Dependency between A-B, type plane"
        );
        assert_eq!(
            s.graph.describe(d2).unwrap(),
            "Dependency between B-A, type plane"
        );
    }
}
