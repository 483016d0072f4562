//! In-memory geometry sampled from a document
//!
//! Hosts that cannot answer queries lazily sample every referenced
//! sub-element up front and hand the table to the assembly engine.

use std::collections::HashMap;

use glam::{DAffine3, DVec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::traits::{
    CadError, CadResult, EdgeInfo, FaceInfo, GeometryQuery, RegionInfo, SubElement,
    SubElementKind,
};

/// A single sampled sub-element
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ElementSample {
    Vertex(DVec3),
    Edge(EdgeInfo),
    Face(FaceInfo),
}

impl ElementSample {
    /// Re-express the sample under a transform
    fn transformed(&self, transform: &DAffine3) -> Self {
        let dir = |v: DVec3| transform.transform_vector3(v).normalize_or_zero();
        match *self {
            ElementSample::Vertex(p) => ElementSample::Vertex(transform.transform_point3(p)),
            ElementSample::Edge(edge) => ElementSample::Edge(EdgeInfo {
                position: transform.transform_point3(edge.position),
                axis: edge.axis.map(dir),
                closed: edge.closed,
                region: edge.region.map(|r| RegionInfo {
                    center_of_mass: transform.transform_point3(r.center_of_mass),
                    normal: dir(r.normal),
                }),
            }),
            ElementSample::Face(face) => ElementSample::Face(FaceInfo {
                position: transform.transform_point3(face.position),
                axis: face.axis.map(dir),
                bbox_center: transform.transform_point3(face.bbox_center),
                normal: face.normal.map(dir),
                center_of_mass: transform.transform_point3(face.center_of_mass),
            }),
        }
    }
}

/// Geometry table keyed by part and sub-element
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SampledGeometry {
    elements: HashMap<Uuid, HashMap<SubElement, ElementSample>>,
}

impl SampledGeometry {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sampled elements across all parts
    pub fn len(&self) -> usize {
        self.elements.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a vertex sample, returns its reference
    pub fn add_vertex(&mut self, part: Uuid, index: u32, position: DVec3) -> SubElement {
        self.insert(part, SubElement::vertex(index), ElementSample::Vertex(position))
    }

    /// Insert an edge sample, returns its reference
    pub fn add_edge(&mut self, part: Uuid, index: u32, edge: EdgeInfo) -> SubElement {
        self.insert(part, SubElement::edge(index), ElementSample::Edge(edge))
    }

    /// Insert a face sample, returns its reference
    pub fn add_face(&mut self, part: Uuid, index: u32, face: FaceInfo) -> SubElement {
        self.insert(part, SubElement::face(index), ElementSample::Face(face))
    }

    fn insert(&mut self, part: Uuid, element: SubElement, sample: ElementSample) -> SubElement {
        self.elements.entry(part).or_default().insert(element, sample);
        element
    }

    /// Get a raw sample
    pub fn get(&self, part: Uuid, element: SubElement) -> Option<&ElementSample> {
        self.elements.get(&part).and_then(|m| m.get(&element))
    }

    /// Move every sample of a part by a transform
    pub fn transform_part(&mut self, part: Uuid, transform: &DAffine3) {
        if let Some(samples) = self.elements.get_mut(&part) {
            for sample in samples.values_mut() {
                *sample = sample.transformed(transform);
            }
        }
    }

    fn lookup(&self, part: Uuid, element: SubElement) -> CadResult<&ElementSample> {
        self.get(part, element)
            .ok_or(CadError::ElementNotFound { part, element })
    }
}

impl GeometryQuery for SampledGeometry {
    fn position(&self, part: Uuid, element: SubElement) -> CadResult<DVec3> {
        Ok(match self.lookup(part, element)? {
            ElementSample::Vertex(p) => *p,
            ElementSample::Edge(edge) => edge.position,
            ElementSample::Face(face) => face.position,
        })
    }

    fn axis(&self, part: Uuid, element: SubElement) -> CadResult<DVec3> {
        let axis = match self.lookup(part, element)? {
            ElementSample::Vertex(_) => None,
            ElementSample::Edge(edge) => edge.axis,
            ElementSample::Face(face) => face.axis.or(face.normal),
        };
        axis.ok_or(CadError::NoAxis(element))
    }

    fn face(&self, part: Uuid, element: SubElement) -> CadResult<FaceInfo> {
        match self.lookup(part, element)? {
            ElementSample::Face(face) => Ok(*face),
            _ => Err(CadError::WrongElementKind {
                element,
                expected: SubElementKind::Face,
            }),
        }
    }

    fn edge_region(&self, part: Uuid, element: SubElement) -> CadResult<RegionInfo> {
        match self.lookup(part, element)? {
            ElementSample::Edge(edge) if !edge.closed => Err(CadError::OpenWire(element)),
            ElementSample::Edge(edge) => edge.region.ok_or(CadError::NonPlanar(element)),
            _ => Err(CadError::WrongElementKind {
                element,
                expected: SubElementKind::Edge,
            }),
        }
    }
}
