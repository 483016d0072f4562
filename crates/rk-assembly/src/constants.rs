//! Global constants for rk-assembly

/// Default solver spin accuracy
pub const DEFAULT_SPIN_ACCURACY: f64 = 0.1;

/// Fraction of the spin accuracy below which offsets and axis
/// misalignments are treated as zero
pub const SPIN_THRESHOLD_FACTOR: f64 = 0.1;

/// Scale applied to cross products before normalizing, keeps tiny but
/// valid rotation axes above the normalization cutoff
pub const ROTATION_AXIS_SCALE: f64 = 1.0e6;

/// Distance below which a face bbox center counts as lying on an axis
pub const ON_AXIS_TOLERANCE: f64 = 1.0e-12;

/// Tolerance for parallel / in-span tests of unit vectors in the DOF algebra
pub const DOF_TOLERANCE: f64 = 1.0e-6;

/// Components of cleaned axes smaller than this are set to zero
pub const AXIS_CLEAN_EPSILON: f64 = 1.0e-10;

/// Angle between axis-plane-parallel axes and normals, in degrees
pub const RIGHT_ANGLE_DEG: f64 = 90.0;
