//! # Unit Types
//!
//! Length handling for the editor. Models store coordinates and section
//! dimensions in their *project units* (millimeters, meters or inches); all
//! geometry math runs in a *normalized* unit that is meter-equivalent.
//!
//! ## Conversion factors
//!
//! - mm: exactly 1/1000 of a normalized unit
//! - m: identity
//! - in: the fixed decimal approximation 39.37007874 inches per normalized
//!   unit, used in both directions. Round-trips through inches are close but
//!   not bit-exact.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::units::{to_normalized, from_normalized, LengthUnit};
//!
//! assert_eq!(to_normalized(6000.0, LengthUnit::Millimeter), 6.0);
//! assert_eq!(from_normalized(0.1, LengthUnit::Meter), 0.1);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::Add;

use crate::geometry::Point3;

/// Inches per normalized unit. Deliberately the truncated decimal, not 1/0.0254.
pub const INCHES_PER_NORMALIZED: f64 = 39.37007874;

/// Millimeters per normalized unit
pub const MM_PER_NORMALIZED: f64 = 1000.0;

// ============================================================================
// Project Length Units
// ============================================================================

/// Length unit a project stores its coordinates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LengthUnit {
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "m")]
    Meter,
    #[serde(rename = "in")]
    #[default]
    Inch,
}

impl LengthUnit {
    /// All units for UI selection
    pub const ALL: [LengthUnit; 3] = [LengthUnit::Millimeter, LengthUnit::Meter, LengthUnit::Inch];

    /// Short label as written in project files
    pub fn label(&self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "mm",
            LengthUnit::Meter => "m",
            LengthUnit::Inch => "in",
        }
    }

    /// Parse a short label ("mm", "m", "in")
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "mm" => Some(LengthUnit::Millimeter),
            "m" => Some(LengthUnit::Meter),
            "in" | "inch" | "inches" => Some(LengthUnit::Inch),
            _ => None,
        }
    }

    /// Convert a length in this unit to normalized units
    pub fn to_normalized(self, value: f64) -> f64 {
        match self {
            LengthUnit::Millimeter => value / MM_PER_NORMALIZED,
            LengthUnit::Meter => value,
            LengthUnit::Inch => value / INCHES_PER_NORMALIZED,
        }
    }

    /// Convert a normalized length to this unit
    pub fn from_normalized(self, value: f64) -> f64 {
        match self {
            LengthUnit::Millimeter => value * MM_PER_NORMALIZED,
            LengthUnit::Meter => value,
            LengthUnit::Inch => value * INCHES_PER_NORMALIZED,
        }
    }

    /// Grid snapping grain in project units: 10 mm, 0.1 m or 1 inch
    pub fn snap_quantum(self) -> f64 {
        match self {
            LengthUnit::Millimeter => 10.0,
            LengthUnit::Meter => 0.1,
            LengthUnit::Inch => 1.0,
        }
    }

    /// Grid snapping grain in normalized units
    pub fn snap_quantum_normalized(self) -> f64 {
        self.to_normalized(self.snap_quantum())
    }

    /// Human readable quantum, e.g. "10 mm"
    pub fn snap_quantum_label(self) -> &'static str {
        match self {
            LengthUnit::Millimeter => "10 mm",
            LengthUnit::Meter => "0.1 m",
            LengthUnit::Inch => "1 inch",
        }
    }
}

impl std::fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Convert a project-unit length to normalized units
pub fn to_normalized(value: f64, units: LengthUnit) -> f64 {
    units.to_normalized(value)
}

/// Convert a normalized length to project units
pub fn from_normalized(value: f64, units: LengthUnit) -> f64 {
    units.from_normalized(value)
}

/// Convert a stored coordinate triple to a normalized point
pub fn point_to_normalized(p: [f64; 3], units: LengthUnit) -> Point3 {
    Point3::new(units.to_normalized(p[0]), units.to_normalized(p[1]), units.to_normalized(p[2]))
}

/// Convert a normalized point back to a stored coordinate triple
pub fn point_from_normalized(p: &Point3, units: LengthUnit) -> [f64; 3] {
    [units.from_normalized(p.x), units.from_normalized(p.y), units.from_normalized(p.z)]
}

// ============================================================================
// Grid Spacing Entry Units
// ============================================================================

/// Unit used when typing grid bay spacings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SpacingUnit {
    #[serde(rename = "in")]
    #[default]
    Inch,
    #[serde(rename = "mm")]
    Millimeter,
    #[serde(rename = "m")]
    Meter,
    /// Feet-inches, e.g. `20-6` or `20'6`
    #[serde(rename = "ft-in")]
    FeetInches,
}

impl SpacingUnit {
    /// Convert a plain number typed in this unit to normalized units.
    ///
    /// For `FeetInches` a plain number is taken as inches.
    pub fn to_normalized(self, value: f64) -> f64 {
        match self {
            SpacingUnit::Inch | SpacingUnit::FeetInches => LengthUnit::Inch.to_normalized(value),
            SpacingUnit::Millimeter => LengthUnit::Millimeter.to_normalized(value),
            SpacingUnit::Meter => LengthUnit::Meter.to_normalized(value),
        }
    }
}

// ============================================================================
// Imperial Length Wrappers
// ============================================================================

/// Length in feet
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Feet(pub f64);

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

impl From<Feet> for Inches {
    fn from(ft: Feet) -> Self {
        Inches(ft.0 * 12.0)
    }
}

impl Add for Inches {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Inches(self.0 + rhs.0)
    }
}

impl Inches {
    pub fn value(self) -> f64 {
        self.0
    }
}
