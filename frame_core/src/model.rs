//! # Model Data Structures
//!
//! The `Model` is the canonical framing model: project settings, levels, the
//! active section catalog and the members placed in the scene. Everything
//! here is plain data in *project units*; the editor converts to normalized
//! units only when it builds geometry.
//!
//! ## Structure
//!
//! ```text
//! Model
//! ├── meta: ModelMetadata (created / modified timestamps)
//! ├── project: Project (name, units, origin, density)
//! ├── levels: Vec<Level>
//! ├── sections: Vec<Section> (referenced by name)
//! └── members: Vec<Member> (ids like "B3", "C1")
//! ```
//!
//! ## Example
//!
//! ```rust
//! use frame_core::model::{Model, MemberType};
//! use frame_core::units::LengthUnit;
//!
//! let model = Model::new("Warehouse", LengthUnit::Millimeter);
//! assert_eq!(model.next_member_id(MemberType::Beam), "B1");
//! assert!(model.first_section().is_some());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{EditError, EditResult};
use crate::geometry::{length3, Point3};
use crate::sections;
use crate::units::{point_to_normalized, LengthUnit};

/// Steel density used for new projects (kg/m³)
pub const DEFAULT_DENSITY_KG_PER_M3: f64 = 7850.0;

/// Section seeded into new models
pub const DEFAULT_SECTION: &str = "W4X13";

/// Root model container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    pub meta: ModelMetadata,
    pub project: Project,
    #[serde(default)]
    pub levels: Vec<Level>,
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Model {
    /// Create a new model with one level and the default section.
    pub fn new(name: impl Into<String>, units: LengthUnit) -> Self {
        let now = Utc::now();
        let sections = sections::catalog_section(DEFAULT_SECTION, units)
            .into_iter()
            .collect();
        Model {
            meta: ModelMetadata {
                created: now,
                modified: now,
            },
            project: Project {
                name: name.into(),
                units,
                origin: [0.0, 0.0, 0.0],
                density_kg_per_m3: DEFAULT_DENSITY_KG_PER_M3,
            },
            levels: vec![Level {
                name: "L1".to_string(),
                elevation: 0.0,
            }],
            sections,
            members: Vec::new(),
        }
    }

    /// Project length units
    pub fn units(&self) -> LengthUnit {
        self.project.units
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    /// Look up a member by id.
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Look up a section by name.
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// First section in the catalog, used for new members and previews.
    pub fn first_section(&self) -> Option<&Section> {
        self.sections.first()
    }

    /// Next unused sequential id for a member type.
    ///
    /// One greater than the largest numeric suffix among existing ids with
    /// the type's prefix, or 1 when there are none. Ids whose suffix is not a
    /// number, or is too large to increment, are ignored.
    pub fn next_member_id(&self, member_type: MemberType) -> String {
        let prefix = member_type.id_prefix();
        let next = self
            .members
            .iter()
            .filter(|m| m.member_type == member_type)
            .filter_map(|m| m.id.strip_prefix(prefix))
            .filter_map(|suffix| suffix.parse::<u64>().ok())
            .filter_map(|n| n.checked_add(1))
            .max()
            .unwrap_or(1);
        format!("{}{}", prefix, next)
    }

    /// Members that have an endpoint at `node` (within `tol`, project units).
    pub fn members_at_node(&self, node: [f64; 3], tol: f64) -> Vec<(&Member, EndTag)> {
        let mut found = Vec::new();
        for m in &self.members {
            for tag in EndTag::BOTH {
                if length3(m.endpoint(tag), node) <= tol {
                    found.push((m, tag));
                }
            }
        }
        found
    }
}

impl Default for Model {
    fn default() -> Self {
        Model::new("New Project", LengthUnit::default())
    }
}

/// Model timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Project-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub units: LengthUnit,
    pub origin: [f64; 3],
    pub density_kg_per_m3: f64,
}

/// Named elevation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub elevation: f64,
}

// ============================================================================
// Sections
// ============================================================================

/// Cross-section family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    /// Wide flange (I)
    W,
    /// American Standard beam (I)
    S,
    /// Channel
    C,
    /// Angle
    L,
    /// Hollow structural section
    #[serde(rename = "HSS")]
    Hss,
    Pipe,
    Box,
    Custom,
}

impl SectionKind {
    /// Shapes that can be drawn as a flanged I profile
    pub fn is_i_shape(&self) -> bool {
        matches!(self, SectionKind::W | SectionKind::S)
    }
}

/// I-section dimensions in project units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionDims {
    /// Flange width
    pub bf: f64,
    /// Web thickness
    pub tw: f64,
    /// Flange thickness
    pub tf: f64,
    /// Overall depth
    pub d: f64,
    /// Root radius (not drawn)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
}

/// Named cross-section profile shared by members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SectionKind,
    pub dims: SectionDims,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_mm2: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perimeter_mm: Option<f64>,
}

impl Section {
    /// Reject non-positive or non-finite dimensions.
    pub fn validate(&self) -> EditResult<()> {
        let dims = [("bf", self.dims.bf), ("tw", self.dims.tw), ("tf", self.dims.tf), ("d", self.dims.d)];
        for (field, value) in dims {
            if !value.is_finite() || value <= 0.0 {
                return Err(EditError::invalid_input(
                    format!("{}.dims.{}", self.name, field),
                    value.to_string(),
                    "Section dimensions must be positive",
                ));
            }
        }
        if 2.0 * self.dims.tf >= self.dims.d {
            return Err(EditError::invalid_input(
                format!("{}.dims.tf", self.name),
                self.dims.tf.to_string(),
                "Flanges must be thinner than half the depth",
            ));
        }
        if self.dims.tw > self.dims.bf {
            return Err(EditError::invalid_input(
                format!("{}.dims.tw", self.name),
                self.dims.tw.to_string(),
                "Web must not be wider than the flange",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Members
// ============================================================================

/// Member role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberType {
    Beam,
    Column,
}

impl MemberType {
    /// Letter that starts generated ids
    pub fn id_prefix(&self) -> &'static str {
        match self {
            MemberType::Beam => "B",
            MemberType::Column => "C",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            MemberType::Beam => "Beam",
            MemberType::Column => "Column",
        }
    }
}

impl std::fmt::Display for MemberType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which end of a member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndTag {
    Start,
    End,
}

impl EndTag {
    pub const BOTH: [EndTag; 2] = [EndTag::Start, EndTag::End];

    /// The other end
    pub fn opposite(self) -> Self {
        match self {
            EndTag::Start => EndTag::End,
            EndTag::End => EndTag::Start,
        }
    }
}

/// Steel grade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// e.g. "A992", "A36"
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fu: Option<f64>,
}

/// Fabrication properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberProps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camber: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_prep: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub splice: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A straight structural member between two points (project units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    #[serde(rename = "type")]
    pub member_type: MemberType,
    /// Name of a `Section` in the model
    pub section: String,
    pub start: [f64; 3],
    pub end: [f64; 3],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<MemberProps>,
    /// Piece mark
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Member {
    /// Bare member with no material or fabrication data.
    pub fn new(
        id: impl Into<String>,
        member_type: MemberType,
        section: impl Into<String>,
        start: [f64; 3],
        end: [f64; 3],
    ) -> Self {
        Member {
            id: id.into(),
            member_type,
            section: section.into(),
            start,
            end,
            material: None,
            properties: None,
            mark: None,
            label: None,
        }
    }

    /// Length in project units
    pub fn length(&self) -> f64 {
        length3(self.start, self.end)
    }

    /// Length in normalized units
    pub fn length_normalized(&self, units: LengthUnit) -> f64 {
        units.to_normalized(self.length())
    }

    pub fn endpoint(&self, tag: EndTag) -> [f64; 3] {
        match tag {
            EndTag::Start => self.start,
            EndTag::End => self.end,
        }
    }

    /// Endpoint as a normalized point
    pub fn endpoint_normalized(&self, tag: EndTag, units: LengthUnit) -> Point3 {
        point_to_normalized(self.endpoint(tag), units)
    }

    /// Midpoint as a normalized point
    pub fn midpoint_normalized(&self, units: LengthUnit) -> Point3 {
        let a = self.endpoint_normalized(EndTag::Start, units);
        let b = self.endpoint_normalized(EndTag::End, units);
        nalgebra::center(&a, &b)
    }

    /// Check the member invariants: finite coordinates, distinct endpoints.
    pub fn validate(&self) -> EditResult<()> {
        if self.id.trim().is_empty() {
            return Err(EditError::invalid_input("id", "", "Member id must not be empty"));
        }
        for (field, p) in [("start", self.start), ("end", self.end)] {
            if p.iter().any(|v| !v.is_finite()) {
                return Err(EditError::invalid_input(
                    format!("{}.{}", self.id, field),
                    format!("{:?}", p),
                    "Coordinates must be finite",
                ));
            }
        }
        if self.start == self.end {
            return Err(EditError::zero_length(&self.id));
        }
        Ok(())
    }

    /// Apply a patch to a copy of this member.
    pub fn patched(&self, patch: &MemberPatch) -> Member {
        let mut m = self.clone();
        if let Some(start) = patch.start {
            m.start = start;
        }
        if let Some(end) = patch.end {
            m.end = end;
        }
        if let Some(section) = &patch.section {
            m.section = section.clone();
        }
        if let Some(member_type) = patch.member_type {
            m.member_type = member_type;
        }
        if let Some(material) = &patch.material {
            m.material = Some(material.clone());
        }
        m
    }
}

/// Partial member update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<[f64; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_type: Option<MemberType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material: Option<Material>,
}

impl MemberPatch {
    /// Patch moving a single endpoint
    pub fn endpoint(tag: EndTag, p: [f64; 3]) -> Self {
        match tag {
            EndTag::Start => MemberPatch {
                start: Some(p),
                ..Default::default()
            },
            EndTag::End => MemberPatch {
                end: Some(p),
                ..Default::default()
            },
        }
    }

    /// Patch moving both endpoints
    pub fn endpoints(start: [f64; 3], end: [f64; 3]) -> Self {
        MemberPatch {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == MemberPatch::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beam(id: &str) -> Member {
        Member::new(id, MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [240.0, 0.0, 0.0])
    }

    #[test]
    fn test_new_model_is_seeded() {
        let model = Model::new("Test", LengthUnit::Inch);
        assert_eq!(model.project.units, LengthUnit::Inch);
        assert_eq!(model.levels.len(), 1);
        assert_eq!(model.first_section().map(|s| s.name.as_str()), Some(DEFAULT_SECTION));
        assert!(model.members.is_empty());
    }

    #[test]
    fn test_next_member_id() {
        let mut model = Model::new("Test", LengthUnit::Inch);
        assert_eq!(model.next_member_id(MemberType::Beam), "B1");
        assert_eq!(model.next_member_id(MemberType::Column), "C1");

        model.members.push(beam("B1"));
        model.members.push(beam("B7"));
        model.members.push(beam("B-custom"));
        assert_eq!(model.next_member_id(MemberType::Beam), "B8");
        assert_eq!(model.next_member_id(MemberType::Column), "C1");
    }

    #[test]
    fn test_next_id_with_huge_suffixes() {
        let mut model = Model::new("Test", LengthUnit::Meter);
        model.members.push(beam("B4294967295"));
        assert_eq!(model.next_member_id(MemberType::Beam), "B4294967296");

        model.members.push(beam("B18446744073709551615"));
        assert_eq!(model.next_member_id(MemberType::Beam), "B4294967296");
    }

    #[test]
    fn test_next_id_ignores_other_types_with_prefix() {
        let mut model = Model::new("Test", LengthUnit::Inch);
        let mut odd = beam("C9");
        odd.member_type = MemberType::Beam;
        model.members.push(odd);
        assert_eq!(model.next_member_id(MemberType::Column), "C1");
    }

    #[test]
    fn test_member_length_in_normalized_units() {
        let m = Member::new("C1", MemberType::Column, DEFAULT_SECTION, [0.0, 0.0, 0.0], [0.0, 0.0, 6000.0]);
        assert_eq!(m.length_normalized(LengthUnit::Millimeter), 6.0);
    }

    #[test]
    fn test_zero_length_member_is_invalid() {
        let m = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [1.0, 2.0, 3.0], [1.0, 2.0, 3.0]);
        assert_eq!(m.validate(), Err(EditError::zero_length("B1")));
        assert!(beam("B2").validate().is_ok());
    }

    #[test]
    fn test_non_finite_member_is_invalid() {
        let m = Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [f64::NAN, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(matches!(m.validate(), Err(EditError::InvalidInput { .. })));
    }

    #[test]
    fn test_section_validation() {
        let mut sec = sections::catalog_section("W8X31", LengthUnit::Inch).unwrap();
        assert!(sec.validate().is_ok());
        sec.dims.tw = 0.0;
        assert!(sec.validate().is_err());
        sec.dims.tw = 0.285;
        sec.dims.tf = 5.0;
        assert!(sec.validate().is_err());
    }

    #[test]
    fn test_patch_touches_only_given_fields() {
        let m = beam("B1");
        let patched = m.patched(&MemberPatch::endpoint(EndTag::End, [120.0, 0.0, 0.0]));
        assert_eq!(patched.start, m.start);
        assert_eq!(patched.end, [120.0, 0.0, 0.0]);
        assert_eq!(patched.section, m.section);
        assert!(MemberPatch::default().is_empty());
    }

    #[test]
    fn test_members_at_node() {
        let mut model = Model::new("Test", LengthUnit::Inch);
        model.members.push(beam("B1"));
        model.members.push(Member::new("C1", MemberType::Column, DEFAULT_SECTION, [240.0, 0.0, 0.0], [240.0, 0.0, 144.0]));
        let at = model.members_at_node([240.0, 0.0, 0.0], 1e-6);
        assert_eq!(at.len(), 2);
        assert_eq!(at[0].1, EndTag::End);
        assert_eq!(at[1].1, EndTag::Start);
    }

    #[test]
    fn test_model_serialization() {
        let mut model = Model::new("Bridge", LengthUnit::Millimeter);
        model.members.push(beam("B1"));
        let json = serde_json::to_string_pretty(&model).unwrap();
        assert!(json.contains("\"type\": \"beam\""));
        assert!(json.contains("\"units\": \"mm\""));

        let roundtrip: Model = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.members, model.members);
        assert_eq!(roundtrip.project, model.project);
    }
}
