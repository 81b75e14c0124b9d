//! # Solid Synthesis
//!
//! Turns a member plus its section into a positioned, oriented solid in
//! normalized units. Two variants share all placement logic:
//!
//! - **Box**: rectangular envelope `bf × d × L`
//! - **Profile**: wide-flange I cross-section, the same outer rectangle with
//!   the two voids between the flanges and the web carved out
//!
//! The profile lives in the local XY plane (X across the flanges, Y up the
//! web) and is extruded symmetrically along local Z, so both variants have
//! identical oriented bounds for the same member.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::model::{Member, MemberType, Model};
//! use frame_core::settings::{Appearance, RenderMode};
//! use frame_core::solid::synthesize;
//! use frame_core::units::LengthUnit;
//!
//! let model = Model::new("Demo", LengthUnit::Millimeter);
//! let column = Member::new("C1", MemberType::Column, "W4X13", [0.0, 0.0, 0.0], [0.0, 0.0, 6000.0]);
//! let solid = synthesize(&column, &model.sections, LengthUnit::Millimeter, RenderMode::Box, &Appearance::default()).unwrap();
//! assert_eq!(solid.length, 6.0);
//! ```

use log::debug;
use nalgebra::Rotation3;
use uuid::Uuid;

use crate::basis::{member_basis, up_preference};
use crate::geometry::{Point2, Point3, Ray, Vec3};
use crate::model::{EndTag, Member, MemberType, Section};
use crate::settings::{Appearance, Color, RenderMode};
use crate::units::LengthUnit;

/// Which shape a solid was built with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolidVariant {
    Box,
    Profile,
}

impl SolidVariant {
    /// Variant for a render mode and section; profiles need an I-shaped section.
    pub fn for_section(mode: RenderMode, section: &Section) -> Self {
        match mode {
            RenderMode::Profile if section.kind.is_i_shape() => SolidVariant::Profile,
            _ => SolidVariant::Box,
        }
    }
}

/// Closed 2D cross-section with holes, in normalized units.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile2d {
    pub outer: Vec<Point2>,
    pub voids: Vec<Vec<Point2>>,
}

impl Profile2d {
    /// Centered `width × depth` rectangle
    pub fn rectangle(width: f64, depth: f64) -> Self {
        Profile2d {
            outer: rect(-width / 2.0, -depth / 2.0, width / 2.0, depth / 2.0),
            voids: Vec::new(),
        }
    }

    /// Wide-flange profile: outer rectangle minus the two side voids.
    pub fn i_section(bf: f64, d: f64, tw: f64, tf: f64) -> Self {
        let hf = bf / 2.0;
        let hd = d / 2.0;
        let hw = tw / 2.0;
        Profile2d {
            outer: rect(-hf, -hd, hf, hd),
            voids: vec![rect(-hf, -hd + tf, -hw, hd - tf), rect(hw, -hd + tf, hf, hd - tf)],
        }
    }

    /// Area of the outline minus its voids.
    pub fn net_area(&self) -> f64 {
        polygon_area(&self.outer) - self.voids.iter().map(|v| polygon_area(v)).sum::<f64>()
    }

    /// Every loop, outer first
    pub fn loops(&self) -> impl Iterator<Item = &Vec<Point2>> {
        std::iter::once(&self.outer).chain(self.voids.iter())
    }
}

fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Point2> {
    vec![Point2::new(x0, y0), Point2::new(x1, y0), Point2::new(x1, y1), Point2::new(x0, y1)]
}

/// Shoelace area, always positive
fn polygon_area(pts: &[Point2]) -> f64 {
    let n = pts.len();
    let twice: f64 = (0..n)
        .map(|i| {
            let a = pts[i];
            let b = pts[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum();
    twice.abs() / 2.0
}

/// A member solid, independent of the scene that holds it.
#[derive(Debug, Clone, PartialEq)]
pub struct Solid {
    pub visual_id: Uuid,
    /// `None` for previews
    pub member_id: Option<String>,
    pub member_type: MemberType,
    pub variant: SolidVariant,
    /// Member midpoint
    pub position: Point3,
    /// Columns are (right, up, forward)
    pub rotation: Rotation3<f64>,
    pub length: f64,
    /// Flange width along local X
    pub width: f64,
    /// Section depth along local Y
    pub depth: f64,
    pub profile: Profile2d,
    pub color: Color,
    pub ghost: bool,
}

impl Solid {
    /// Local half sizes (x, y, z)
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.width / 2.0, self.depth / 2.0, self.length / 2.0)
    }

    pub fn local_to_world(&self, local: &Vec3) -> Point3 {
        self.position + self.rotation * local
    }

    /// The 8 corners of the oriented bounding box.
    pub fn corners(&self) -> Vec<Point3> {
        let h = self.half_extents();
        let mut out = Vec::with_capacity(8);
        for sz in [-1.0, 1.0] {
            for sy in [-1.0, 1.0] {
                for sx in [-1.0, 1.0] {
                    out.push(self.local_to_world(&Vec3::new(sx * h.x, sy * h.y, sz * h.z)));
                }
            }
        }
        out
    }

    /// Profile vertices at both end caps, in world space.
    pub fn world_vertices(&self) -> Vec<Point3> {
        let hz = self.length / 2.0;
        let mut out = Vec::new();
        for z in [-hz, hz] {
            for lp in self.profile.loops() {
                out.extend(lp.iter().map(|p| self.local_to_world(&Vec3::new(p.x, p.y, z))));
            }
        }
        out
    }

    /// Outline edges: both cap outlines plus one longitudinal edge per profile vertex.
    pub fn edges(&self) -> Vec<(Point3, Point3)> {
        let hz = self.length / 2.0;
        let mut out = Vec::new();
        for lp in self.profile.loops() {
            let n = lp.len();
            for i in 0..n {
                let a = lp[i];
                let b = lp[(i + 1) % n];
                for z in [-hz, hz] {
                    out.push((
                        self.local_to_world(&Vec3::new(a.x, a.y, z)),
                        self.local_to_world(&Vec3::new(b.x, b.y, z)),
                    ));
                }
                out.push((
                    self.local_to_world(&Vec3::new(a.x, a.y, -hz)),
                    self.local_to_world(&Vec3::new(a.x, a.y, hz)),
                ));
            }
        }
        out
    }

    /// Cross-section area, normalized units squared
    pub fn net_area(&self) -> f64 {
        self.profile.net_area()
    }

    /// Nearest ray hit against the oriented bounds.
    pub fn hit(&self, ray: &Ray) -> Option<f64> {
        ray.intersect_oriented_box(&self.position, &self.rotation, &self.half_extents())
    }
}

/// Solid between two normalized points.
///
/// Returns `None` for coincident points or a section that fails validation.
pub fn build_solid(
    member_type: MemberType,
    start: &Point3,
    end: &Point3,
    section: &Section,
    units: LengthUnit,
    variant: SolidVariant,
    color: Color,
) -> Option<Solid> {
    if let Err(err) = section.validate() {
        debug!("Skipping solid for invalid section {}: {}", section.name, err);
        return None;
    }
    let forward = end - start;
    let rotation = member_basis(&forward, &up_preference(member_type))?;

    let bf = units.to_normalized(section.dims.bf);
    let d = units.to_normalized(section.dims.d);
    let profile = match variant {
        SolidVariant::Box => Profile2d::rectangle(bf, d),
        SolidVariant::Profile => Profile2d::i_section(
            bf,
            d,
            units.to_normalized(section.dims.tw),
            units.to_normalized(section.dims.tf),
        ),
    };

    Some(Solid {
        visual_id: Uuid::new_v4(),
        member_id: None,
        member_type,
        variant,
        position: nalgebra::center(start, end),
        rotation,
        length: forward.norm(),
        width: bf,
        depth: d,
        profile,
        color,
        ghost: false,
    })
}

/// Solid for a stored member.
///
/// A missing or invalid section is not an error: the member simply has no
/// visual and the skip is logged at debug level.
pub fn synthesize(member: &Member, sections: &[Section], units: LengthUnit, mode: RenderMode, appearance: &Appearance) -> Option<Solid> {
    let Some(section) = sections.iter().find(|s| s.name == member.section) else {
        debug!("Member {} references unknown section {}; no solid", member.id, member.section);
        return None;
    };
    let start = member.endpoint_normalized(EndTag::Start, units);
    let end = member.endpoint_normalized(EndTag::End, units);
    let variant = SolidVariant::for_section(mode, section);
    let mut solid = build_solid(
        member.member_type,
        &start,
        &end,
        section,
        units,
        variant,
        appearance.member_color(member.member_type),
    );
    if solid.is_none() {
        debug!("Member {} has no drawable geometry", member.id);
    }
    if let Some(s) = solid.as_mut() {
        s.member_id = Some(member.id.clone());
    }
    solid
}

/// Translucent preview box between two normalized points.
pub fn ghost(member_type: MemberType, start: &Point3, end: &Point3, section: &Section, units: LengthUnit, color: Color) -> Option<Solid> {
    build_solid(member_type, start, end, section, units, SolidVariant::Box, color).map(|mut s| {
        s.ghost = true;
        s
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, DEFAULT_SECTION};
    use approx::assert_relative_eq;

    fn model() -> Model {
        Model::new("Test", LengthUnit::Millimeter)
    }

    fn solid(member: &Member, mode: RenderMode) -> Solid {
        let m = model();
        synthesize(member, &m.sections, LengthUnit::Millimeter, mode, &Appearance::default()).unwrap()
    }

    #[test]
    fn test_column_length() {
        let c = Member::new("C1", MemberType::Column, DEFAULT_SECTION, [0.0, 0.0, 0.0], [0.0, 0.0, 6000.0]);
        let s = solid(&c, RenderMode::Box);
        assert_eq!(s.length, 6.0);
        assert_eq!(s.position, Point3::new(0.0, 0.0, 3.0));
        assert_eq!(s.member_id.as_deref(), Some("C1"));
    }

    #[test]
    fn test_variants_share_bounds() {
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [100.0, 200.0, 3000.0], [4100.0, 2200.0, 3500.0]);
        let boxed = solid(&b, RenderMode::Box);
        let profiled = solid(&b, RenderMode::Profile);
        assert_eq!(boxed.variant, SolidVariant::Box);
        assert_eq!(profiled.variant, SolidVariant::Profile);
        assert_eq!(boxed.position, profiled.position);
        assert_eq!(boxed.rotation, profiled.rotation);
        assert_eq!(boxed.half_extents(), profiled.half_extents());

        // every profile vertex lies on or inside the box
        let inv = boxed.rotation.inverse();
        let h = boxed.half_extents();
        for v in profiled.world_vertices() {
            let local = inv * (v - boxed.position);
            for axis in 0..3 {
                assert!(local[axis].abs() <= h[axis] + 1e-9);
            }
        }
    }

    #[test]
    fn test_i_section_area() {
        let p = Profile2d::i_section(4.0, 4.0, 0.25, 0.35);
        let expected = 4.0 * 4.0 - (4.0 - 0.25) * (4.0 - 0.7);
        assert_relative_eq!(p.net_area(), expected, epsilon = 1e-12);
        assert_relative_eq!(Profile2d::rectangle(2.0, 3.0).net_area(), 6.0);
    }

    #[test]
    fn test_profile_falls_back_for_other_kinds() {
        let mut m = model();
        m.sections[0].kind = crate::model::SectionKind::Hss;
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [1000.0, 0.0, 0.0]);
        let s = synthesize(&b, &m.sections, LengthUnit::Millimeter, RenderMode::Profile, &Appearance::default()).unwrap();
        assert_eq!(s.variant, SolidVariant::Box);
    }

    #[test]
    fn test_missing_section_is_skipped() {
        let b = Member::new("B1", MemberType::Beam, "NOPE", [0.0, 0.0, 0.0], [1000.0, 0.0, 0.0]);
        assert!(synthesize(&b, &model().sections, LengthUnit::Millimeter, RenderMode::Box, &Appearance::default()).is_none());
    }

    #[test]
    fn test_invalid_section_is_skipped() {
        let mut m = model();
        m.sections[0].dims.d = -1.0;
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [1000.0, 0.0, 0.0]);
        assert!(synthesize(&b, &m.sections, LengthUnit::Millimeter, RenderMode::Box, &Appearance::default()).is_none());
    }

    #[test]
    fn test_beam_web_is_vertical() {
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [5000.0, 0.0, 0.0]);
        let s = solid(&b, RenderMode::Box);
        let corners = s.corners();
        let zmax = corners.iter().map(|c| c.z).fold(f64::MIN, f64::max);
        assert_relative_eq!(zmax, s.depth / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_visual_ids_are_unique() {
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [1000.0, 0.0, 0.0]);
        assert_ne!(solid(&b, RenderMode::Box).visual_id, solid(&b, RenderMode::Box).visual_id);
    }

    #[test]
    fn test_box_edges() {
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [1000.0, 0.0, 0.0]);
        assert_eq!(solid(&b, RenderMode::Box).edges().len(), 12);
        assert_eq!(solid(&b, RenderMode::Profile).edges().len(), 36);
    }

    #[test]
    fn test_ray_hits_solid() {
        let b = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [2000.0, 0.0, 0.0]);
        let s = solid(&b, RenderMode::Box);
        assert!(s.hit(&Ray::looking_down(1.0, 0.0)).is_some());
        assert!(s.hit(&Ray::looking_down(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_ghost() {
        let m = model();
        let g = ghost(
            MemberType::Beam,
            &Point3::new(0.0, 0.0, 0.0),
            &Point3::new(1.0, 0.0, 0.0),
            &m.sections[0],
            LengthUnit::Millimeter,
            Color::hex(0x1976D2),
        )
        .unwrap();
        assert!(g.ghost);
        assert!(g.member_id.is_none());
        assert!(ghost(MemberType::Beam, &Point3::origin(), &Point3::origin(), &m.sections[0], LengthUnit::Millimeter, Color(0)).is_none());
    }
}
