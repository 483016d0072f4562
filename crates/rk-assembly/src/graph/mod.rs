//! Dependency graph of an assembly
//!
//! Owns the rigid bodies and an arena of dependencies. Sibling dependencies
//! refer to each other through [`DependencyId`] handles, so pair state such
//! as the enabled flag is always changed on both sides at once.

mod queries;

use std::collections::HashMap;

use glam::DAffine3;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rk_cad::GeometryQuery;
use uuid::Uuid;

use crate::constraint::Constraint;
use crate::dependency::{Dependency, DependencyId, PairSeed, SideSeed, sample_pair};
use crate::error::{AssemblyError, AssemblyResult};
use crate::rigid::{RigidBody, WorkList};
use crate::settings::SolverSettings;

/// Rigid bodies and the dependencies between them
#[derive(Debug)]
pub struct DependencyGraph {
    settings: SolverSettings,
    rigids: HashMap<Uuid, RigidBody>,
    /// Removed dependencies leave a hole so handles stay valid. Freed slots
    /// are never reused, so a stale handle can only resolve to nothing.
    dependencies: Vec<Option<Dependency>>,
    rng: StdRng,
}

impl DependencyGraph {
    /// Create an empty graph
    pub fn new(settings: SolverSettings) -> AssemblyResult<Self> {
        settings.validate()?;
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            settings,
            rigids: HashMap::new(),
            dependencies: Vec::new(),
            rng,
        })
    }

    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }

    // ============== Rigid Bodies ==============

    /// Register a rigid body
    pub fn add_rigid(&mut self, rigid: RigidBody) -> AssemblyResult<Uuid> {
        let id = rigid.id();
        if self.rigids.contains_key(&id) {
            return Err(AssemblyError::DuplicateRigid(id));
        }
        self.rigids.insert(id, rigid);
        Ok(id)
    }

    pub fn rigid(&self, id: Uuid) -> AssemblyResult<&RigidBody> {
        self.rigids.get(&id).ok_or(AssemblyError::RigidNotFound(id))
    }

    pub fn rigids(&self) -> impl Iterator<Item = &RigidBody> {
        self.rigids.values()
    }

    /// Remove a rigid body together with every dependency pair touching it
    pub fn remove_rigid(&mut self, id: Uuid) -> AssemblyResult<RigidBody> {
        let owned = self.rigid(id)?.dependencies.clone();
        for dep in owned {
            self.remove_pair(dep);
        }
        let rigid = self
            .rigids
            .remove(&id)
            .ok_or(AssemblyError::RigidNotFound(id))?;
        tracing::debug!("Removed rigid body {}", rigid.label);
        Ok(rigid)
    }

    /// Move a rigid body and all geometry sampled from it
    pub fn apply_placement(&mut self, id: Uuid, transform: &DAffine3) -> AssemblyResult<()> {
        let rigid = self
            .rigids
            .get_mut(&id)
            .ok_or(AssemblyError::RigidNotFound(id))?;
        rigid.apply_placement(transform);

        for handle in &rigid.dependencies {
            if let Some(Some(dep)) = self.dependencies.get_mut(handle.0) {
                dep.apply_placement(transform);
            }
        }
        Ok(())
    }

    // ============== Constraints ==============

    /// Turn a constraint into a pair of dependencies
    ///
    /// Both rigid bodies must be registered and the constraint id must be
    /// new. Nothing is added when sampling the referenced geometry fails.
    pub fn add_constraint<G: GeometryQuery + ?Sized>(
        &mut self,
        constraint: &Constraint,
        geometry: &G,
    ) -> AssemblyResult<(DependencyId, DependencyId)> {
        if self.iter().any(|(_, dep)| dep.constraint == constraint.id) {
            return Err(AssemblyError::DuplicateConstraint(constraint.id));
        }
        for part in constraint.referenced_parts() {
            self.rigid(part)?;
        }
        let seed = sample_pair(constraint, geometry, self.settings.threshold())?;
        Ok(self.insert_pair(constraint, seed))
    }

    /// Add several constraints, skipping the ones that fail
    ///
    /// Returns the rejected constraints with their errors.
    pub fn add_constraints<G: GeometryQuery + ?Sized>(
        &mut self,
        constraints: &[Constraint],
        geometry: &G,
    ) -> Vec<(Uuid, AssemblyError)> {
        let mut rejected = Vec::new();
        for constraint in constraints {
            if let Err(e) = self.add_constraint(constraint, geometry) {
                tracing::warn!(
                    "Constraint {} ({}) rejected: {}",
                    constraint.id,
                    constraint.kind,
                    e
                );
                rejected.push((constraint.id, e));
            }
        }
        rejected
    }

    /// Remove both dependencies created from a constraint
    pub fn remove_constraint(&mut self, constraint: Uuid) -> AssemblyResult<()> {
        let handle = self
            .iter()
            .find(|(_, dep)| dep.constraint == constraint)
            .map(|(id, _)| id)
            .ok_or(AssemblyError::ConstraintNotFound(constraint))?;
        self.remove_pair(handle);
        Ok(())
    }

    fn insert_pair(
        &mut self,
        constraint: &Constraint,
        seed: PairSeed,
    ) -> (DependencyId, DependencyId) {
        let first = DependencyId(self.dependencies.len());
        let second = DependencyId(first.0 + 1);
        let [part1, part2] = constraint.referenced_parts();

        let make = |side: SideSeed, current: Uuid, depended: Uuid, foreign: DependencyId| {
            Dependency {
                kind: seed.kind,
                constraint: constraint.id,
                constraint_kind: constraint.kind,
                ref_type: side.ref_type,
                current_rigid: current,
                depended_rigid: depended,
                foreign,
                ref_point: side.ref_point,
                ref_axis_end: side.ref_axis_end,
                enabled: false,
                params: constraint.params,
            }
        };
        self.dependencies.push(Some(make(seed.first, part1, part2, second)));
        self.dependencies.push(Some(make(seed.second, part2, part1, first)));

        if let Some(rigid) = self.rigids.get_mut(&part1) {
            rigid.dependencies.push(first);
        }
        if let Some(rigid) = self.rigids.get_mut(&part2) {
            rigid.dependencies.push(second);
        }

        tracing::debug!(
            "Added {} dependencies {} and {} for constraint {}",
            constraint.kind,
            first,
            second,
            constraint.id
        );
        (first, second)
    }

    fn remove_pair(&mut self, handle: DependencyId) {
        let Some(dep) = self.dependencies.get_mut(handle.0).and_then(Option::take) else {
            return;
        };
        let foreign = dep.foreign;
        if let Some(slot) = self.dependencies.get_mut(foreign.0) {
            *slot = None;
        }
        for rigid in self.rigids.values_mut() {
            rigid.dependencies.retain(|d| *d != handle && *d != foreign);
        }
        tracing::debug!(
            "Removed dependencies {} and {} of constraint {}",
            handle,
            foreign,
            dep.constraint
        );
    }

    // ============== Dependencies ==============

    pub fn dependency(&self, id: DependencyId) -> AssemblyResult<&Dependency> {
        lookup(&self.dependencies, id)
    }

    /// Sibling of a dependency
    pub fn foreign(&self, id: DependencyId) -> AssemblyResult<&Dependency> {
        let dep = self.dependency(id)?;
        self.dependency(dep.foreign)
    }

    /// Iterate over all live dependencies
    pub fn iter(&self) -> impl Iterator<Item = (DependencyId, &Dependency)> {
        self.dependencies
            .iter()
            .enumerate()
            .filter_map(|(i, dep)| dep.as_ref().map(|dep| (DependencyId(i), dep)))
    }

    /// Number of live dependencies
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enable a dependency and its sibling
    ///
    /// Does nothing when the sibling's body is not in `work_list`. Returns
    /// whether the pair is enabled afterwards.
    pub fn enable<W: WorkList + ?Sized>(
        &mut self,
        id: DependencyId,
        work_list: &W,
    ) -> AssemblyResult<bool> {
        let dep = self.dependency(id)?;
        if !work_list.contains_rigid(dep.depended_rigid) {
            return Ok(dep.enabled);
        }
        self.set_pair_enabled(id, true)?;
        Ok(true)
    }

    /// Disable a dependency and its sibling
    pub fn disable(&mut self, id: DependencyId) -> AssemblyResult<()> {
        self.set_pair_enabled(id, false)
    }

    /// Enable every dependency of a body whose counterpart is in `work_list`
    pub fn enable_dependencies<W: WorkList + ?Sized>(
        &mut self,
        rigid: Uuid,
        work_list: &W,
    ) -> AssemblyResult<()> {
        let owned = self.rigid(rigid)?.dependencies.clone();
        for id in owned {
            self.enable(id, work_list)?;
        }
        Ok(())
    }

    /// Disable every dependency of a body
    pub fn disable_dependencies(&mut self, rigid: Uuid) -> AssemblyResult<()> {
        let owned = self.rigid(rigid)?.dependencies.clone();
        for id in owned {
            self.disable(id)?;
        }
        Ok(())
    }

    fn set_pair_enabled(&mut self, id: DependencyId, enabled: bool) -> AssemblyResult<()> {
        let foreign = self.dependency(id)?.foreign;
        // Validate the sibling before touching either side
        self.dependency(foreign)?;
        for handle in [id, foreign] {
            if let Some(Some(dep)) = self.dependencies.get_mut(handle.0) {
                dep.enabled = enabled;
            }
        }
        Ok(())
    }
}

fn lookup(dependencies: &[Option<Dependency>], id: DependencyId) -> AssemblyResult<&Dependency> {
    dependencies
        .get(id.0)
        .and_then(Option::as_ref)
        .ok_or(AssemblyError::DependencyNotFound(id))
}
