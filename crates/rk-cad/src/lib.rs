//! CAD Kernel Abstraction
//!
//! This crate provides:
//! - Typed references to named sub-elements of a part (`Face3`, `Edge1`, ...)
//! - The geometry query trait consumed by the assembly constraint engine
//! - An in-memory sampled geometry table implementing the queries

pub mod kernel;

// Re-exports for convenience
pub use kernel::{
    CadError, CadResult, EdgeInfo, ElementSample, FaceInfo, GeometryQuery, RegionInfo,
    SampledGeometry, SubElement, SubElementKind, plane_normal,
};
