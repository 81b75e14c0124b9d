//! # Built-in Section Catalog
//!
//! A small table of AISC wide-flange shapes used to seed new models and to
//! offer sections in the toolbar. Dimensions are tabulated in inches and
//! converted to the project's units on lookup.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::sections::catalog_section;
//! use frame_core::units::LengthUnit;
//!
//! let w8 = catalog_section("w8x31", LengthUnit::Inch).unwrap();
//! assert_eq!(w8.dims.d, 8.0);
//! ```

use once_cell::sync::Lazy;

use crate::model::{Section, SectionDims, SectionKind};
use crate::units::LengthUnit;

/// Square millimeters per square inch
const MM2_PER_IN2: f64 = 645.16;

/// Tabulated wide-flange shape (inches)
#[derive(Debug, Clone, Copy)]
pub struct CatalogShape {
    pub label: &'static str,
    pub d: f64,
    pub bf: f64,
    pub tw: f64,
    pub tf: f64,
    pub area_in2: f64,
}

impl CatalogShape {
    /// Section for this shape with dimensions in `units`.
    pub fn to_section(&self, units: LengthUnit) -> Section {
        let conv = |inches: f64| units.from_normalized(LengthUnit::Inch.to_normalized(inches));
        // flanges plus both web faces
        let perimeter_in = 4.0 * self.bf + 2.0 * self.d - 2.0 * self.tw;
        Section {
            name: self.label.to_string(),
            kind: SectionKind::W,
            dims: SectionDims {
                bf: conv(self.bf),
                tw: conv(self.tw),
                tf: conv(self.tf),
                d: conv(self.d),
                r: None,
            },
            area_mm2: Some(self.area_in2 * MM2_PER_IN2),
            perimeter_mm: Some(perimeter_in * 25.4),
        }
    }
}

static CATALOG: Lazy<Vec<CatalogShape>> = Lazy::new(|| {
    let shape = |label, d, bf, tw, tf, area_in2| CatalogShape {
        label,
        d,
        bf,
        tw,
        tf,
        area_in2,
    };
    vec![
        shape("W4X13", 4.0, 4.0, 0.25, 0.35, 3.83),
        shape("W8X31", 8.0, 8.0, 0.285, 0.435, 9.13),
        shape("W10X33", 9.73, 7.96, 0.29, 0.435, 9.71),
        shape("W12X26", 12.2, 6.49, 0.23, 0.38, 7.65),
        shape("W14X90", 14.0, 14.5, 0.44, 0.71, 26.5),
        shape("W16X26", 15.7, 5.5, 0.25, 0.345, 7.68),
        shape("W18X35", 17.7, 6.0, 0.3, 0.425, 10.3),
        shape("W21X44", 20.7, 6.5, 0.35, 0.45, 13.0),
        shape("W24X55", 23.6, 7.01, 0.395, 0.505, 16.2),
    ]
});

/// All catalog shapes, lightest depth first.
pub fn catalog() -> &'static [CatalogShape] {
    &CATALOG
}

/// Case-insensitive lookup by AISC label.
pub fn lookup(label: &str) -> Option<&'static CatalogShape> {
    let key = label.trim().to_uppercase();
    CATALOG.iter().find(|s| s.label == key)
}

/// Catalog shape converted to a `Section` in `units`.
pub fn catalog_section(label: &str, units: LengthUnit) -> Option<Section> {
    lookup(label).map(|s| s.to_section(units))
}
