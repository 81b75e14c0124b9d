//! # Settings
//!
//! Appearance colors and editor tuning. Both structs deserialize with
//! `#[serde(default)]`, so a settings file only needs the keys it overrides.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::settings::{EditorSettings, RenderMode};
//!
//! let s: EditorSettings = serde_json::from_str(r#"{"render_mode": "Profile"}"#).unwrap();
//! assert_eq!(s.render_mode, RenderMode::Profile);
//! assert_eq!(s.endpoint_tolerance, 0.1);
//! ```

use serde::{Deserialize, Serialize};

use crate::model::MemberType;

/// 24-bit RGB color, written as a hex integer (e.g. `0xFFC107`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const fn hex(value: u32) -> Self {
        Color(value & 0xFF_FFFF)
    }

    /// Channels as 0..=1 floats
    pub fn rgb_f32(self) -> [f32; 3] {
        let r = ((self.0 >> 16) & 0xFF) as f32 / 255.0;
        let g = ((self.0 >> 8) & 0xFF) as f32 / 255.0;
        let b = (self.0 & 0xFF) as f32 / 255.0;
        [r, g, b]
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

/// Outline color drawn over solids
pub const EDGE_COLOR: Color = Color::hex(0x222222);

/// Viewport background
pub const BACKGROUND_COLOR: Color = Color::hex(0xF5F7FB);

/// Display colors for the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Appearance {
    pub beam_color: Color,
    pub column_color: Color,
    pub grid_major: Color,
    pub grid_minor: Color,
    pub hidden_line: Color,
    pub preview: Color,
    pub selection: Color,
}

impl Default for Appearance {
    fn default() -> Self {
        Appearance {
            beam_color: Color::hex(0xFFC107),
            column_color: Color::hex(0xFFC107),
            grid_major: Color::hex(0x999999),
            grid_minor: Color::hex(0xDDDDDD),
            hidden_line: Color::hex(0x606060),
            preview: Color::hex(0x1976D2),
            selection: Color::hex(0xFF8C00),
        }
    }
}

impl Appearance {
    /// Green beams and purple columns, as in most detailing packages.
    pub fn classic() -> Self {
        Appearance {
            beam_color: Color::hex(0x4CAF50),
            column_color: Color::hex(0x9C27B0),
            ..Default::default()
        }
    }

    /// Body color for a member type
    pub fn member_color(&self, member_type: MemberType) -> Color {
        match member_type {
            MemberType::Beam => self.beam_color,
            MemberType::Column => self.column_color,
        }
    }
}

/// Which solid variant members are drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RenderMode {
    /// Rectangular envelope
    #[default]
    Box,
    /// Flanged I cross-section where the section supports it
    Profile,
}

impl RenderMode {
    pub const ALL: [RenderMode; 2] = [RenderMode::Box, RenderMode::Profile];

    pub fn display_name(&self) -> &'static str {
        match self {
            RenderMode::Box => "Box",
            RenderMode::Profile => "Profile",
        }
    }
}

/// Interaction tuning. Lengths are in normalized units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Endpoint-proximity snap radius
    pub endpoint_tolerance: f64,
    /// Centerline-projection snap radius
    pub line_tolerance: f64,
    /// Height given to new columns
    pub default_column_height: f64,
    /// Radius of endpoint handles and the placement marker
    pub handle_radius: f64,
    /// Ray distance that still counts as a hit on a handle, the grid origin or a UCS arrow
    pub pick_radius: f64,
    pub render_mode: RenderMode,
}

impl Default for EditorSettings {
    fn default() -> Self {
        EditorSettings {
            endpoint_tolerance: 0.1,
            line_tolerance: 0.05,
            default_column_height: 3.0,
            handle_radius: 0.05,
            pick_radius: 0.1,
            render_mode: RenderMode::Box,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_channels() {
        let [r, g, b] = Color::hex(0xFF8000).rgb_f32();
        assert_eq!(r, 1.0);
        assert!((g - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(b, 0.0);
        assert_eq!(Color::hex(0x1976D2).to_string(), "#1976D2");
    }

    #[test]
    fn test_member_colors() {
        let classic = Appearance::classic();
        assert_eq!(classic.member_color(MemberType::Beam), Color::hex(0x4CAF50));
        assert_eq!(classic.member_color(MemberType::Column), Color::hex(0x9C27B0));
        assert_eq!(classic.selection, Appearance::default().selection);
    }

    #[test]
    fn test_partial_settings_file() {
        let s: EditorSettings = serde_json::from_str(r#"{"default_column_height": 4.5}"#).unwrap();
        assert_eq!(s.default_column_height, 4.5);
        assert_eq!(s.line_tolerance, 0.05);

        let a: Appearance = serde_json::from_str(r#"{"beam_color": 255}"#).unwrap();
        assert_eq!(a.beam_color, Color(255));
        assert_eq!(a.preview, Color::hex(0x1976D2));
    }
}
