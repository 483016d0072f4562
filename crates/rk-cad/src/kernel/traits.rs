//! Geometry query trait definitions
//!
//! These traits define the queries the assembly engine makes against the
//! host CAD document. Implementations resolve named sub-elements of a part
//! (vertices, edges, faces) to sampled geometry.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Kind of a named sub-element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubElementKind {
    Vertex,
    Edge,
    Face,
}

impl SubElementKind {
    /// Name prefix used in sub-element references
    pub fn prefix(&self) -> &'static str {
        match self {
            SubElementKind::Vertex => "Vertex",
            SubElementKind::Edge => "Edge",
            SubElementKind::Face => "Face",
        }
    }
}

/// A named sub-element of a part, e.g. `Face3` or `Edge12`
///
/// Indices are 1-based, matching the naming used by the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SubElement {
    /// Element kind
    pub kind: SubElementKind,
    /// 1-based index within the part
    pub index: u32,
}

impl SubElement {
    /// Create a new sub-element reference
    pub fn new(kind: SubElementKind, index: u32) -> Self {
        Self { kind, index }
    }

    pub fn vertex(index: u32) -> Self {
        Self::new(SubElementKind::Vertex, index)
    }

    pub fn edge(index: u32) -> Self {
        Self::new(SubElementKind::Edge, index)
    }

    pub fn face(index: u32) -> Self {
        Self::new(SubElementKind::Face, index)
    }

    pub fn is_vertex(&self) -> bool {
        self.kind == SubElementKind::Vertex
    }

    pub fn is_edge(&self) -> bool {
        self.kind == SubElementKind::Edge
    }

    pub fn is_face(&self) -> bool {
        self.kind == SubElementKind::Face
    }
}

impl fmt::Display for SubElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.prefix(), self.index)
    }
}

impl FromStr for SubElement {
    type Err = CadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kinds = [
            SubElementKind::Vertex,
            SubElementKind::Edge,
            SubElementKind::Face,
        ];
        for kind in kinds {
            if let Some(rest) = s.strip_prefix(kind.prefix()) {
                return match rest.parse::<u32>() {
                    Ok(index) if index > 0 => Ok(Self::new(kind, index)),
                    _ => Err(CadError::InvalidElementName(s.to_string())),
                };
            }
        }
        Err(CadError::InvalidElementName(s.to_string()))
    }
}

impl TryFrom<String> for SubElement {
    type Error = CadError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SubElement> for String {
    fn from(element: SubElement) -> Self {
        element.to_string()
    }
}

/// Sampled information about a face
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceInfo {
    /// Representative position (the axis origin for cylindrical faces)
    pub position: DVec3,
    /// Axis direction for faces of revolution
    pub axis: Option<DVec3>,
    /// Center of the face bounding box
    pub bbox_center: DVec3,
    /// Surface normal, `None` for non-planar faces
    pub normal: Option<DVec3>,
    /// Center of mass of the face area
    pub center_of_mass: DVec3,
}

impl FaceInfo {
    /// Create info for a planar face whose bbox center, position and
    /// center of mass coincide
    pub fn planar(center: DVec3, normal: DVec3) -> Self {
        Self {
            position: center,
            axis: None,
            bbox_center: center,
            normal: Some(normal.normalize()),
            center_of_mass: center,
        }
    }

    /// Create info for a cylindrical face
    pub fn cylindrical(axis_origin: DVec3, axis: DVec3, bbox_center: DVec3) -> Self {
        Self {
            position: axis_origin,
            axis: Some(axis.normalize()),
            bbox_center,
            normal: None,
            center_of_mass: bbox_center,
        }
    }

    /// Override the center of mass
    pub fn with_center_of_mass(mut self, center_of_mass: DVec3) -> Self {
        self.center_of_mass = center_of_mass;
        self
    }

    /// Override the bounding box center
    pub fn with_bbox_center(mut self, bbox_center: DVec3) -> Self {
        self.bbox_center = bbox_center;
        self
    }

    pub fn is_planar(&self) -> bool {
        self.normal.is_some()
    }
}

/// A planar region bounded by a closed edge loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Center of mass of the enclosed area
    pub center_of_mass: DVec3,
    /// Normal of the region plane
    pub normal: DVec3,
}

impl RegionInfo {
    pub fn new(center_of_mass: DVec3, normal: DVec3) -> Self {
        Self {
            center_of_mass,
            normal: normal.normalize(),
        }
    }
}

/// Sampled information about an edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Representative position (circle center for circular edges)
    pub position: DVec3,
    /// Edge direction for lines, circle axis for circular edges
    pub axis: Option<DVec3>,
    /// Whether the edge forms a closed loop
    pub closed: bool,
    /// Region enclosed by the loop when it is closed and planar
    pub region: Option<RegionInfo>,
}

impl EdgeInfo {
    /// Create info for a straight edge
    pub fn line(start: DVec3, direction: DVec3) -> Self {
        Self {
            position: start,
            axis: Some(direction.normalize()),
            closed: false,
            region: None,
        }
    }

    /// Create info for a circular edge; the circle encloses a planar region
    pub fn circle(center: DVec3, axis: DVec3) -> Self {
        let axis = axis.normalize();
        Self {
            position: center,
            axis: Some(axis),
            closed: true,
            region: Some(RegionInfo::new(center, axis)),
        }
    }
}

/// Error type for geometry queries
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid sub-element name: {0}")]
    InvalidElementName(String),

    #[error("Element {element} not found on part {part}")]
    ElementNotFound { part: Uuid, element: SubElement },

    #[error("Element {element} is not a {expected:?}")]
    WrongElementKind {
        element: SubElement,
        expected: SubElementKind,
    },

    #[error("Element {0} has no axis")]
    NoAxis(SubElement),

    #[error("Element {0} is not planar")]
    NonPlanar(SubElement),

    #[error("Edge {0} does not form a closed loop")]
    OpenWire(SubElement),
}

/// Result type for geometry queries
pub type CadResult<T> = Result<T, CadError>;

/// Geometry queries against the host CAD document
///
/// All methods are pure lookups. Coordinates are global, sampled at the
/// part's placement at the time of the call.
pub trait GeometryQuery {
    /// Resolve any sub-element to a representative point
    fn position(&self, part: Uuid, element: SubElement) -> CadResult<DVec3>;

    /// Resolve an edge or face of revolution to its axis direction
    fn axis(&self, part: Uuid, element: SubElement) -> CadResult<DVec3>;

    /// Resolve a face reference
    fn face(&self, part: Uuid, element: SubElement) -> CadResult<FaceInfo>;

    /// Convert a closed edge loop into a planar region
    ///
    /// Fails with [`CadError::OpenWire`] for open edges and
    /// [`CadError::NonPlanar`] when the loop does not bound a plane.
    fn edge_region(&self, part: Uuid, element: SubElement) -> CadResult<RegionInfo>;
}

/// Get the normal of a planar face
pub fn plane_normal(element: SubElement, face: &FaceInfo) -> CadResult<DVec3> {
    face.normal.ok_or(CadError::NonPlanar(element))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sub_element() {
        assert_eq!("Face3".parse::<SubElement>().unwrap(), SubElement::face(3));
        assert_eq!("Edge12".parse::<SubElement>().unwrap(), SubElement::edge(12));
        assert_eq!(
            "Vertex1".parse::<SubElement>().unwrap(),
            SubElement::vertex(1)
        );
        assert_eq!(SubElement::face(7).to_string(), "Face7");

        let edge = SubElement::edge(4);
        assert!(edge.is_edge());
        assert!(!edge.is_vertex() && !edge.is_face());
        assert!(SubElement::vertex(2).is_vertex());
    }

    #[test]
    fn test_parse_invalid_sub_element() {
        assert!("Face".parse::<SubElement>().is_err());
        assert!("Face0".parse::<SubElement>().is_err());
        assert!("Solid1".parse::<SubElement>().is_err());
        assert!("Edge-2".parse::<SubElement>().is_err());
    }

    #[test]
    fn test_plane_normal() {
        let face = FaceInfo::planar(DVec3::ZERO, DVec3::new(0.0, 0.0, 2.0));
        assert_eq!(plane_normal(SubElement::face(1), &face).unwrap(), DVec3::Z);

        let cylinder = FaceInfo::cylindrical(DVec3::ZERO, DVec3::Z, DVec3::X);
        assert!(face.is_planar());
        assert!(!cylinder.is_planar());
        assert!(matches!(
            plane_normal(SubElement::face(2), &cylinder),
            Err(CadError::NonPlanar(_))
        ));
    }

    #[test]
    fn test_circle_edge_encloses_region() {
        let edge = EdgeInfo::circle(DVec3::new(1.0, 2.0, 3.0), DVec3::new(0.0, 3.0, 0.0));
        assert!(edge.closed);
        let region = edge.region.unwrap();
        assert_eq!(region.center_of_mass, DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(region.normal, DVec3::Y);
    }
}
