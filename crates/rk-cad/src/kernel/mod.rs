//! Geometry kernel abstraction
//!
//! Provides the query interface the assembly engine uses to sample
//! positions, axes and planes from parts.

mod sampled;
mod traits;

pub use sampled::{ElementSample, SampledGeometry};
pub use traits::{
    CadError, CadResult, EdgeInfo, FaceInfo, GeometryQuery, RegionInfo, SubElement,
    SubElementKind, plane_normal,
};
