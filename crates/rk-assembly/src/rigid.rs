//! Rigid bodies taking part in the assembly

use std::collections::{BTreeSet, HashSet};
use std::hash::BuildHasher;

use glam::{DAffine3, DVec3};
use uuid::Uuid;

use crate::dependency::DependencyId;

/// A part of the assembly that moves as a whole
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    id: Uuid,
    /// Display label
    pub label: String,
    placement: DAffine3,
    center: DVec3,
    pub(crate) dependencies: Vec<DependencyId>,
}

impl RigidBody {
    /// Create a body at the origin with identity placement
    pub fn new(id: Uuid, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            placement: DAffine3::IDENTITY,
            center: DVec3::ZERO,
            dependencies: Vec::new(),
        }
    }

    /// Set the initial placement
    pub fn with_placement(mut self, placement: DAffine3) -> Self {
        self.placement = placement;
        self
    }

    /// Set the spin center (usually the bounding box center of the part)
    pub fn with_center(mut self, center: DVec3) -> Self {
        self.center = center;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn placement(&self) -> DAffine3 {
        self.placement
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Dependencies owned by this body, in creation order
    pub fn dependencies(&self) -> &[DependencyId] {
        &self.dependencies
    }

    /// Compose a placement change onto the body
    ///
    /// Only the body itself is updated, the owning graph forwards the
    /// transform to the dependencies.
    pub(crate) fn apply_placement(&mut self, transform: &DAffine3) {
        self.placement = *transform * self.placement;
        self.center = transform.transform_point3(self.center);
    }
}

/// Set of rigid bodies the outer solver is currently working on
pub trait WorkList {
    fn contains_rigid(&self, id: Uuid) -> bool;
}

impl<S: BuildHasher> WorkList for HashSet<Uuid, S> {
    fn contains_rigid(&self, id: Uuid) -> bool {
        self.contains(&id)
    }
}

impl WorkList for BTreeSet<Uuid> {
    fn contains_rigid(&self, id: Uuid) -> bool {
        self.contains(&id)
    }
}

impl WorkList for [Uuid] {
    fn contains_rigid(&self, id: Uuid) -> bool {
        self.contains(&id)
    }
}

impl WorkList for Vec<Uuid> {
    fn contains_rigid(&self, id: Uuid) -> bool {
        self.as_slice().contains_rigid(id)
    }
}
