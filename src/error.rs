//! Errors surfaced when building and registering colliders.
//!
//! Ticks never fail: everything that can go wrong mid-sweep is skipped instead.

use crate::Fp;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ColliderError {
    #[error("collider mass must be finite and non-negative, got {0}")]
    InvalidMass(Fp),
    #[error("box extent must be finite and non-negative, got {width}x{height}")]
    InvalidExtent { width: Fp, height: Fp },
    #[error("circle radius must be finite and non-negative, got {0}")]
    InvalidRadius(Fp),
    #[error("the body this collider is attached to was dropped before registration")]
    DeadBody,
}

#[inline]
pub(crate) fn non_negative(v: Fp) -> bool {
    v.is_finite() && v >= 0.0
}
