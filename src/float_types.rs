// Re-export parry for the f64 scalar
pub use parry3d_f64 as parry3d;

// Our Real scalar type:
pub type Real = f64;

use core::str::FromStr;
use std::sync::OnceLock;

/// Classification tolerance used when no override is configured.
pub const EPSILON: Real = 1e-5;

/// Lazily-initialized tolerance used for plane classification.
/// Defaults to [`EPSILON`], but can be overridden:
///  1) **Build-time**: set env var `POLYSOLID_TOLERANCE` (e.g. `POLYSOLID_TOLERANCE=1e-6 cargo build`)
///  2) **Runtime**: call [`set_tolerance`] once before using the library
static TOLERANCE_CELL: OnceLock<Real> = OnceLock::new();

/// Returns the current classification tolerance.
/// If not set yet, it tries `POLYSOLID_TOLERANCE` (parsed as `Real`) and
/// falls back to [`EPSILON`].
pub fn tolerance() -> Real {
    *TOLERANCE_CELL.get_or_init(|| {
        if let Some(environment_variable) = option_env!("POLYSOLID_TOLERANCE") {
            if let Ok(value) = Real::from_str(environment_variable) {
                return value.max(Real::EPSILON);
            }
        }
        EPSILON
    })
}

/// Set the tolerance programmatically once (subsequent calls are ignored).
/// Call near program start: `polysolid::float_types::set_tolerance(1e-6);`
pub fn set_tolerance(value: Real) {
    let _ = TOLERANCE_CELL.set(value.max(Real::EPSILON));
}

/// Archimedes' constant (π)
pub const PI: Real = core::f64::consts::PI;

/// π/2
pub const FRAC_PI_2: Real = core::f64::consts::FRAC_PI_2;

/// The full circle constant (τ)
pub const TAU: Real = core::f64::consts::TAU;

/// Below this distance from ±1 a sine or cosine is snapped to an exact value
/// when building rotations.
pub const ON_SQRT_EPSILON: Real = 1.490116119385e-8;
