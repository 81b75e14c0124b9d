//! # Member Basis
//!
//! Builds the orthonormal frame a member's solid is drawn in. The local Z axis
//! runs along the member, local Y is the section's "up" (the web direction for
//! wide-flange shapes) and local X completes a right-handed frame.
//!
//! The up direction comes from a per-member-type preference: beams prefer world
//! Z so their webs stand vertical, columns prefer world Y so their webs lie
//! horizontal, matching conventional framing plans.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::basis::member_basis;
//! use frame_core::geometry::Vec3;
//!
//! let rot = member_basis(&Vec3::new(5.0, 0.0, 0.0), &Vec3::z()).unwrap();
//! // local forward maps onto the member direction
//! let fwd = rot * Vec3::z();
//! assert!((fwd - Vec3::x()).norm() < 1e-12);
//! ```

use nalgebra::{Matrix3, Rotation3};

use crate::geometry::Vec3;
use crate::model::MemberType;

/// Below this squared cross-product length the up hint is treated as parallel.
pub const DEGENERACY_EPSILON: f64 = 1e-12;

/// Reference axes tried, in order, when the preferred up is parallel to the member.
fn fallback_axes() -> [Vec3; 2] {
    [Vec3::z(), Vec3::x()]
}

/// Preferred section-up direction for a member type.
pub fn up_preference(member_type: MemberType) -> Vec3 {
    match member_type {
        MemberType::Beam => Vec3::z(),
        MemberType::Column => Vec3::y(),
    }
}

/// Rotation whose columns are (right, up, forward).
///
/// Returns `None` when `forward` has zero length; members with coincident
/// endpoints never reach this point because the store rejects them.
pub fn member_basis(forward: &Vec3, up_pref: &Vec3) -> Option<Rotation3<f64>> {
    let f = forward.try_normalize(0.0)?;

    let mut r = up_pref.cross(&f);
    if r.norm_squared() < DEGENERACY_EPSILON {
        r = fallback_axes()
            .iter()
            .map(|axis| axis.cross(&f))
            .find(|c| c.norm_squared() >= DEGENERACY_EPSILON)?;
    }
    let r = r.normalize();
    let u = f.cross(&r).normalize();

    Some(Rotation3::from_matrix_unchecked(Matrix3::from_columns(&[r, u, f])))
}
