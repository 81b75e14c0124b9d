//! # Reference Grid
//!
//! Builds the visible column grid from `GridSettings`: one line per grid
//! index on each axis, per-line labels, an optional UCS axis triad and the
//! draggable grid-origin handle.
//!
//! Vertical lines (constant X) are indexed along the X axis and horizontal
//! lines (constant Y) along the Y axis. With `n` bays on an axis there are
//! `n + 1` lines, and label `i` always belongs to line `i`.
//!
//! The builder works in project units. The scene calls
//! [`GridVisual::to_normalized`] before drawing or picking.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::grid::{build_grid, GridAxis, GridSettings};
//! use frame_core::settings::Appearance;
//! use frame_core::units::LengthUnit;
//!
//! let colors = Appearance::default();
//! let grid = build_grid(&GridSettings::default(), colors.grid_major, colors.grid_minor, LengthUnit::Inch);
//! let xs: Vec<f64> = grid.lines_on(GridAxis::X).map(|l| l.start[0]).collect();
//! assert_eq!(xs, vec![0.0, 240.0, 480.0, 720.0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::settings::Color;
use crate::units::{Feet, Inches, LengthUnit, SpacingUnit};

/// Shortest dot step on dotted lines (inches)
const MIN_DOT_STEP_IN: f64 = 0.5;

/// UCS arrow length bounds (inches)
const UCS_MIN_IN: f64 = 6.0;
const UCS_MAX_IN: f64 = 18.0;

/// Gap between an arrow tip and its axis letter (inches)
const UCS_LABEL_GAP_IN: f64 = 6.0;

// ============================================================================
// Settings
// ============================================================================

/// How grid lines are stroked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    #[default]
    Dashed,
    Dots,
}

/// How grid lines are labelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMode {
    /// 1, 2, 3, ...
    Numbers,
    /// A, B, ..., Z, AA, AB, ...
    Letters,
    /// User text, numeric where missing
    Custom,
}

/// Grid axis a line is indexed along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAxis {
    X,
    Y,
}

/// Axis of the UCS triad
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UcsAxis {
    X,
    Y,
    Z,
}

impl UcsAxis {
    pub const ALL: [UcsAxis; 3] = [UcsAxis::X, UcsAxis::Y, UcsAxis::Z];

    pub fn label(&self) -> &'static str {
        match self {
            UcsAxis::X => "X",
            UcsAxis::Y => "Y",
            UcsAxis::Z => "Z",
        }
    }

    fn unit_vector(&self) -> [f64; 3] {
        match self {
            UcsAxis::X => [1.0, 0.0, 0.0],
            UcsAxis::Y => [0.0, 1.0, 0.0],
            UcsAxis::Z => [0.0, 0.0, 1.0],
        }
    }

    fn color(&self) -> Color {
        match self {
            UcsAxis::X => Color::hex(0xFF0000),
            UcsAxis::Y => Color::hex(0x00FF00),
            UcsAxis::Z => Color::hex(0x0000FF),
        }
    }
}

/// Grid configuration. All lengths are in project units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub origin: [f64; 3],
    /// Uniform bay count along X, used when `x_spacings` is empty
    pub x_count: usize,
    pub y_count: usize,
    /// Uniform bay spacing along X
    pub x_spacing: f64,
    pub y_spacing: f64,
    /// Per-bay spacings along X; overrides the uniform count when non-empty
    pub x_spacings: Vec<f64>,
    pub y_spacings: Vec<f64>,
    pub line_style: LineStyle,
    pub dash_size_ratio: f64,
    pub dash_gap_ratio: f64,
    /// Every Nth vertical line is major (0 = off)
    pub major_every_x: usize,
    pub major_every_y: usize,
    pub show_ucs: bool,
    /// Triad at the grid start rather than at the origin
    pub ucs_at_start: bool,
    /// `origin` is the bottom-left corner rather than the grid center
    pub origin_at_start: bool,
    pub label_x: LabelMode,
    pub label_y: LabelMode,
    pub labels_x: Vec<String>,
    pub labels_y: Vec<String>,
    pub show_labels: bool,
    pub extend_left_below: f64,
    pub extend_right_above: f64,
    /// Unit bay lists are typed in
    pub spacing_unit: SpacingUnit,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings {
            origin: [0.0, 0.0, 0.0],
            x_count: 3,
            y_count: 3,
            x_spacing: 240.0,
            y_spacing: 240.0,
            x_spacings: vec![240.0, 240.0, 240.0],
            y_spacings: vec![240.0, 240.0, 240.0],
            line_style: LineStyle::Dashed,
            dash_size_ratio: 0.08,
            dash_gap_ratio: 0.08,
            major_every_x: 0,
            major_every_y: 0,
            show_ucs: true,
            ucs_at_start: true,
            origin_at_start: true,
            label_x: LabelMode::Letters,
            label_y: LabelMode::Numbers,
            labels_x: Vec::new(),
            labels_y: Vec::new(),
            show_labels: true,
            extend_left_below: 24.0,
            extend_right_above: 24.0,
            spacing_unit: SpacingUnit::Inch,
        }
    }
}

impl GridSettings {
    /// The default grid with its lengths expressed in `units`.
    ///
    /// Metric values are kept to whole millimeters.
    pub fn for_units(units: LengthUnit) -> Self {
        let inch = GridSettings::default();
        let (spacing_unit, step) = match units {
            LengthUnit::Inch => return inch,
            LengthUnit::Millimeter => (SpacingUnit::Millimeter, 1.0),
            LengthUnit::Meter => (SpacingUnit::Meter, 0.001),
        };
        let convert = |v: f64| (spacing_to_project(v, SpacingUnit::Inch, units) / step).round() * step;
        GridSettings {
            x_spacing: convert(inch.x_spacing),
            y_spacing: convert(inch.y_spacing),
            x_spacings: inch.x_spacings.iter().map(|v| convert(*v)).collect(),
            y_spacings: inch.y_spacings.iter().map(|v| convert(*v)).collect(),
            extend_left_below: convert(inch.extend_left_below),
            extend_right_above: convert(inch.extend_right_above),
            spacing_unit,
            ..inch
        }
    }

    /// Effective bay spacings along an axis.
    ///
    /// Non-positive and non-finite list entries are dropped. An empty list
    /// falls back to `count` uniform bays (at least one).
    pub fn resolved_spacings(&self, axis: GridAxis) -> Vec<f64> {
        let (list, count, spacing) = match axis {
            GridAxis::X => (&self.x_spacings, self.x_count, self.x_spacing),
            GridAxis::Y => (&self.y_spacings, self.y_count, self.y_spacing),
        };
        let valid: Vec<f64> = list.iter().copied().filter(|s| s.is_finite() && *s > 0.0).collect();
        if !valid.is_empty() {
            return valid;
        }
        if spacing.is_finite() && spacing > 0.0 {
            vec![spacing; count.max(1)]
        } else {
            Vec::new()
        }
    }

    /// Smallest bay on an axis, if the axis has any bays.
    pub fn min_spacing(&self, axis: GridAxis) -> Option<f64> {
        self.resolved_spacings(axis).into_iter().reduce(f64::min)
    }

    fn label_mode(&self, axis: GridAxis) -> (LabelMode, &[String]) {
        match axis {
            GridAxis::X => (self.label_x, &self.labels_x),
            GridAxis::Y => (self.label_y, &self.labels_y),
        }
    }

    fn major_every(&self, axis: GridAxis) -> usize {
        match axis {
            GridAxis::X => self.major_every_x,
            GridAxis::Y => self.major_every_y,
        }
    }

    /// Text for line `index` on `axis`.
    pub fn label_text(&self, axis: GridAxis, index: usize) -> String {
        let (mode, custom) = self.label_mode(axis);
        match mode {
            LabelMode::Custom => custom
                .get(index)
                .filter(|s| !s.is_empty())
                .cloned()
                .unwrap_or_else(|| numeric_label(index)),
            LabelMode::Letters => letter_label(index),
            LabelMode::Numbers => numeric_label(index),
        }
    }
}

// ============================================================================
// Labels
// ============================================================================

/// 1-based numeric label
pub fn numeric_label(index: usize) -> String {
    (index + 1).to_string()
}

/// Spreadsheet-style column letters: 0 → A, 25 → Z, 26 → AA, 27 → AB.
pub fn letter_label(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index as i64;
    loop {
        letters.push((b'A' + (n % 26) as u8) as char);
        n = n / 26 - 1;
        if n < 0 {
            break;
        }
    }
    letters.iter().rev().collect()
}

// ============================================================================
// Bay list parsing
// ============================================================================

/// Parse a typed bay list like `"20-6, 15-0"` into spacings in project units.
///
/// Entries are separated by `,` or `;`. In feet-inches mode an entry is
/// `feet[-inches]` or `feet'inches` (a bare number is feet); otherwise each
/// entry is a plain number in `unit`. Unparsable entries are skipped.
pub fn parse_bay_list(text: &str, unit: SpacingUnit, units: LengthUnit) -> Vec<f64> {
    text.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|entry| match unit {
            SpacingUnit::FeetInches => parse_feet_inches(entry).map(|inches| inches.value()),
            _ => leading_number(entry).map(|(v, _)| v),
        })
        .map(|v| spacing_to_project(v, unit, units))
        .collect()
}

/// Convert a value typed in a spacing unit to project units.
pub fn spacing_to_project(value: f64, unit: SpacingUnit, units: LengthUnit) -> f64 {
    let same = matches!(
        (unit, units),
        (SpacingUnit::Inch | SpacingUnit::FeetInches, LengthUnit::Inch)
            | (SpacingUnit::Millimeter, LengthUnit::Millimeter)
            | (SpacingUnit::Meter, LengthUnit::Meter)
    );
    if same {
        value
    } else {
        units.from_normalized(unit.to_normalized(value))
    }
}

/// `20-6`, `20'6"`, `20 ft 6 in` or `20`
fn parse_feet_inches(entry: &str) -> Option<Inches> {
    let cleaned: String = entry.chars().filter(|c| !c.is_whitespace()).collect();
    let digits = cleaned.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return leading_number(&cleaned).map(|(v, _)| Inches(v));
    }
    let feet: f64 = cleaned[..digits].parse().ok()?;
    let rest = &cleaned[digits..];
    let inches = rest
        .strip_prefix(['-', '\''])
        .and_then(|r| leading_number(r))
        .filter(|(_, text)| !text.starts_with(['-', '+']))
        .map_or(0.0, |(v, _)| v);
    Some(Inches::from(Feet(feet)) + Inches(inches))
}

/// Longest numeric prefix of `s`, like `parseFloat`.
fn leading_number(s: &str) -> Option<(f64, &str)> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        match c {
            '+' | '-' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    let text = &s[..end];
    text.trim_end_matches('.').parse().ok().map(|v| (v, text))
}

// ============================================================================
// Grid visual
// ============================================================================

/// How a single line is drawn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LineStroke {
    Solid,
    Dashed { dash: f64, gap: f64 },
    Dots(Vec<[f64; 3]>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLine {
    pub axis: GridAxis,
    pub index: usize,
    pub start: [f64; 3],
    pub end: [f64; 3],
    pub major: bool,
    pub color: Color,
    pub stroke: LineStroke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLabel {
    pub axis: GridAxis,
    pub index: usize,
    pub text: String,
    pub position: [f64; 3],
}

/// One arrow of the UCS triad
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UcsArrow {
    pub axis: UcsAxis,
    pub tip: [f64; 3],
    pub head_length: f64,
    pub color: Color,
    pub label_position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UcsTriad {
    pub origin: [f64; 3],
    /// Length of the X and Y arrows
    pub length: f64,
    pub arrows: Vec<UcsArrow>,
}

/// Everything drawn for the grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridVisual {
    pub lines: Vec<GridLine>,
    pub labels: Vec<GridLabel>,
    pub ucs: Option<UcsTriad>,
    pub origin_handle: [f64; 3],
    pub bottom_left: [f64; 3],
    pub width: f64,
    pub height: f64,
}

impl GridVisual {
    /// Lines indexed along one axis, in index order
    pub fn lines_on(&self, axis: GridAxis) -> impl Iterator<Item = &GridLine> {
        self.lines.iter().filter(move |l| l.axis == axis)
    }

    pub fn labels_on(&self, axis: GridAxis) -> impl Iterator<Item = &GridLabel> {
        self.labels.iter().filter(move |l| l.axis == axis)
    }

    /// Copy with every length converted to normalized units.
    pub fn to_normalized(&self, units: LengthUnit) -> GridVisual {
        let s = |v: f64| units.to_normalized(v);
        let p = |v: [f64; 3]| [s(v[0]), s(v[1]), s(v[2])];
        GridVisual {
            lines: self
                .lines
                .iter()
                .map(|l| GridLine {
                    start: p(l.start),
                    end: p(l.end),
                    stroke: match &l.stroke {
                        LineStroke::Solid => LineStroke::Solid,
                        LineStroke::Dashed { dash, gap } => LineStroke::Dashed {
                            dash: s(*dash),
                            gap: s(*gap),
                        },
                        LineStroke::Dots(pts) => LineStroke::Dots(pts.iter().map(|d| p(*d)).collect()),
                    },
                    ..l.clone()
                })
                .collect(),
            labels: self
                .labels
                .iter()
                .map(|l| GridLabel {
                    position: p(l.position),
                    ..l.clone()
                })
                .collect(),
            ucs: self.ucs.as_ref().map(|t| UcsTriad {
                origin: p(t.origin),
                length: s(t.length),
                arrows: t
                    .arrows
                    .iter()
                    .map(|a| UcsArrow {
                        tip: p(a.tip),
                        head_length: s(a.head_length),
                        label_position: p(a.label_position),
                        ..a.clone()
                    })
                    .collect(),
            }),
            origin_handle: p(self.origin_handle),
            bottom_left: p(self.bottom_left),
            width: s(self.width),
            height: s(self.height),
        }
    }
}

fn cumulative(spacings: &[f64]) -> Vec<f64> {
    let mut offsets = Vec::with_capacity(spacings.len() + 1);
    let mut acc = 0.0;
    offsets.push(acc);
    for s in spacings {
        acc += s;
        offsets.push(acc);
    }
    offsets
}

fn max_or(spacings: &[f64], fallback: f64) -> f64 {
    spacings.iter().copied().fold(fallback.max(0.0), f64::max)
}

/// Evenly spaced dots from `a` to `b`, endpoints included.
fn dot_line(a: [f64; 3], b: [f64; 3], step: f64) -> Vec<[f64; 3]> {
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let len = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    if len <= 1e-6 {
        return Vec::new();
    }
    let count = ((len / step).floor() as usize).max(2);
    (0..count)
        .map(|i| {
            let t = i as f64 / (count - 1) as f64;
            [a[0] + d[0] * t, a[1] + d[1] * t, a[2] + d[2] * t]
        })
        .collect()
}

/// Build the grid visual in project units.
pub fn build_grid(settings: &GridSettings, major: Color, minor: Color, units: LengthUnit) -> GridVisual {
    let inches = |v: f64| units.from_normalized(LengthUnit::Inch.to_normalized(v));

    let x_list = settings.resolved_spacings(GridAxis::X);
    let y_list = settings.resolved_spacings(GridAxis::Y);
    let x_offsets = cumulative(&x_list);
    let y_offsets = cumulative(&y_list);
    let width: f64 = x_list.iter().sum();
    let height: f64 = y_list.iter().sum();

    let [cx, cy, oz] = settings.origin;
    let (blx, bly) = if settings.origin_at_start {
        (cx, cy)
    } else {
        (cx - width / 2.0, cy - height / 2.0)
    };

    let bays = (x_list.len() + y_list.len()).max(1) as f64;
    let avg = ((width + height) / bays).max(1e-3);
    let max_x_bay = max_or(&x_list, settings.x_spacing);
    let max_y_bay = max_or(&y_list, settings.y_spacing);
    let min_dot = inches(MIN_DOT_STEP_IN);

    let ext_lo = settings.extend_left_below;
    let ext_hi = settings.extend_right_above;

    let stroke = |a: [f64; 3], b: [f64; 3], perpendicular_bay: f64| match settings.line_style {
        LineStyle::Solid => LineStroke::Solid,
        LineStyle::Dashed => LineStroke::Dashed {
            dash: avg * settings.dash_size_ratio,
            gap: avg * settings.dash_gap_ratio,
        },
        LineStyle::Dots => LineStroke::Dots(dot_line(a, b, min_dot.max(perpendicular_bay * 0.1))),
    };
    let is_major = |axis: GridAxis, index: usize| {
        let every = settings.major_every(axis);
        every > 0 && index > 0 && index % every == 0
    };

    let mut lines = Vec::with_capacity(x_offsets.len() + y_offsets.len());
    for (i, off) in x_offsets.iter().enumerate() {
        let x = blx + off;
        let start = [x, bly - ext_lo, oz];
        let end = [x, bly + height + ext_hi, oz];
        let major_line = is_major(GridAxis::X, i);
        lines.push(GridLine {
            axis: GridAxis::X,
            index: i,
            start,
            end,
            major: major_line,
            color: if major_line { major } else { minor },
            stroke: stroke(start, end, max_y_bay),
        });
    }
    for (j, off) in y_offsets.iter().enumerate() {
        let y = bly + off;
        let start = [blx - ext_lo, y, oz];
        let end = [blx + width + ext_hi, y, oz];
        let major_line = is_major(GridAxis::Y, j);
        lines.push(GridLine {
            axis: GridAxis::Y,
            index: j,
            start,
            end,
            major: major_line,
            color: if major_line { major } else { minor },
            stroke: stroke(start, end, max_x_bay),
        });
    }

    let mut labels = Vec::new();
    if settings.show_labels {
        let top = bly + height + ext_hi + max_y_bay * 0.08;
        for (i, off) in x_offsets.iter().enumerate() {
            labels.push(GridLabel {
                axis: GridAxis::X,
                index: i,
                text: settings.label_text(GridAxis::X, i),
                position: [blx + off, top, oz],
            });
        }
        let left = blx - ext_lo - max_x_bay * 0.08;
        for (j, off) in y_offsets.iter().enumerate() {
            labels.push(GridLabel {
                axis: GridAxis::Y,
                index: j,
                text: settings.label_text(GridAxis::Y, j),
                position: [left, bly + off, oz],
            });
        }
    }

    let ucs = settings.show_ucs.then(|| {
        let origin = if settings.ucs_at_start { [blx, bly, oz] } else { [cx, cy, oz] };
        let length = (width.min(height) * 0.08).clamp(inches(UCS_MIN_IN), inches(UCS_MAX_IN));
        let gap = inches(UCS_LABEL_GAP_IN);
        let arrows = UcsAxis::ALL
            .iter()
            .map(|axis| {
                let len = if *axis == UcsAxis::Z { length * 0.6 } else { length };
                let u = axis.unit_vector();
                let along = |d: f64| [origin[0] + u[0] * d, origin[1] + u[1] * d, origin[2] + u[2] * d];
                UcsArrow {
                    axis: *axis,
                    tip: along(len),
                    head_length: length * 0.2,
                    color: axis.color(),
                    label_position: along(length + gap),
                }
            })
            .collect();
        UcsTriad { origin, length, arrows }
    });

    GridVisual {
        lines,
        labels,
        ucs,
        origin_handle: settings.origin,
        bottom_left: [blx, bly, oz],
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn build(settings: &GridSettings) -> GridVisual {
        build_grid(settings, Color::hex(0x999999), Color::hex(0xDDDDDD), LengthUnit::Inch)
    }

    #[test]
    fn test_bay_list_line_positions() {
        let grid = build(&GridSettings::default());
        let xs: Vec<f64> = grid.lines_on(GridAxis::X).map(|l| l.start[0]).collect();
        assert_eq!(xs, vec![0.0, 240.0, 480.0, 720.0]);
    }

    #[test]
    fn test_line_count_is_bays_plus_one() {
        let settings = GridSettings {
            x_spacings: vec![100.0, 200.0, 150.0, 50.0, 75.0],
            y_spacings: vec![300.0],
            ..Default::default()
        };
        let grid = build(&settings);
        assert_eq!(grid.lines_on(GridAxis::X).count(), 6);
        assert_eq!(grid.lines_on(GridAxis::Y).count(), 2);
    }

    #[test]
    fn test_label_index_matches_line_index() {
        let settings = GridSettings {
            x_spacings: vec![120.0, 240.0, 360.0],
            ..Default::default()
        };
        let grid = build(&settings);
        for axis in [GridAxis::X, GridAxis::Y] {
            let lines: Vec<_> = grid.lines_on(axis).collect();
            let labels: Vec<_> = grid.labels_on(axis).collect();
            assert_eq!(lines.len(), labels.len());
            for (line, label) in lines.iter().zip(labels.iter()) {
                assert_eq!(line.index, label.index);
                match axis {
                    GridAxis::X => assert_eq!(line.start[0], label.position[0]),
                    GridAxis::Y => assert_eq!(line.start[1], label.position[1]),
                }
            }
        }
    }

    #[test]
    fn test_uniform_fallback_and_filtering() {
        let settings = GridSettings {
            x_spacings: vec![0.0, -5.0, f64::NAN],
            x_count: 2,
            x_spacing: 100.0,
            ..Default::default()
        };
        assert_eq!(settings.resolved_spacings(GridAxis::X), vec![100.0, 100.0]);
        let grid = build(&settings);
        assert_eq!(grid.lines_on(GridAxis::X).count(), 3);
    }

    #[test]
    fn test_center_origin() {
        let settings = GridSettings {
            origin_at_start: false,
            ..Default::default()
        };
        let grid = build(&settings);
        assert_eq!(grid.bottom_left, [-360.0, -360.0, 0.0]);
        assert_eq!(grid.origin_handle, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_extensions() {
        let grid = build(&GridSettings::default());
        let first = grid.lines_on(GridAxis::X).next().unwrap();
        assert_eq!(first.start[1], -24.0);
        assert_eq!(first.end[1], 720.0 + 24.0);
    }

    #[test]
    fn test_major_lines() {
        let settings = GridSettings {
            major_every_x: 2,
            ..Default::default()
        };
        let grid = build(&settings);
        let majors: Vec<bool> = grid.lines_on(GridAxis::X).map(|l| l.major).collect();
        assert_eq!(majors, vec![false, false, true, false]);
        assert!(grid.lines_on(GridAxis::Y).all(|l| !l.major && l.color == Color::hex(0xDDDDDD)));
    }

    #[test]
    fn test_dash_lengths() {
        let grid = build(&GridSettings::default());
        // avg bay = (720 + 720) / 6 = 240
        match &grid.lines[0].stroke {
            LineStroke::Dashed { dash, gap } => {
                assert_relative_eq!(*dash, 19.2);
                assert_relative_eq!(*gap, 19.2);
            }
            other => panic!("expected dashes, got {:?}", other),
        }
    }

    #[test]
    fn test_dots_include_endpoints() {
        let settings = GridSettings {
            line_style: LineStyle::Dots,
            ..Default::default()
        };
        let grid = build(&settings);
        let line = grid.lines_on(GridAxis::X).next().unwrap();
        match &line.stroke {
            LineStroke::Dots(dots) => {
                // length 768, step 24
                assert_eq!(dots.len(), 32);
                assert_eq!(dots[0], line.start);
                assert_relative_eq!(dots[dots.len() - 1][1], line.end[1], epsilon = 1e-9);
            }
            other => panic!("expected dots, got {:?}", other),
        }
    }

    #[test]
    fn test_label_placement() {
        let grid = build(&GridSettings::default());
        let x0 = grid.labels_on(GridAxis::X).next().unwrap();
        assert_eq!(x0.text, "A");
        assert_relative_eq!(x0.position[1], 720.0 + 24.0 + 19.2);
        let y0 = grid.labels_on(GridAxis::Y).next().unwrap();
        assert_eq!(y0.text, "1");
        assert_relative_eq!(y0.position[0], -24.0 - 19.2);
    }

    #[test]
    fn test_hidden_labels() {
        let settings = GridSettings {
            show_labels: false,
            ..Default::default()
        };
        assert!(build(&settings).labels.is_empty());
    }

    #[test]
    fn test_letter_labels() {
        assert_eq!(letter_label(0), "A");
        assert_eq!(letter_label(25), "Z");
        assert_eq!(letter_label(26), "AA");
        assert_eq!(letter_label(27), "AB");
        assert_eq!(letter_label(51), "AZ");
        assert_eq!(letter_label(52), "BA");
        assert_eq!(letter_label(701), "ZZ");
        assert_eq!(letter_label(702), "AAA");
    }

    #[test]
    fn test_custom_labels_fall_back() {
        let settings = GridSettings {
            label_x: LabelMode::Custom,
            labels_x: vec!["A1".into(), String::new()],
            ..Default::default()
        };
        assert_eq!(settings.label_text(GridAxis::X, 0), "A1");
        assert_eq!(settings.label_text(GridAxis::X, 1), "2");
        assert_eq!(settings.label_text(GridAxis::X, 3), "4");
    }

    #[test]
    fn test_ucs_triad() {
        let grid = build(&GridSettings::default());
        let ucs = grid.ucs.unwrap();
        // 720 * 0.08 = 57.6 clamps to 18 in
        assert_relative_eq!(ucs.length, 18.0, max_relative = 1e-12);
        let z = ucs.arrows.iter().find(|a| a.axis == UcsAxis::Z).unwrap();
        assert_relative_eq!(z.tip[2], 18.0 * 0.6, max_relative = 1e-12);

        let small = GridSettings {
            x_spacings: vec![10.0],
            y_spacings: vec![10.0],
            ..Default::default()
        };
        assert_relative_eq!(build(&small).ucs.unwrap().length, 6.0, max_relative = 1e-12);

        let hidden = GridSettings {
            show_ucs: false,
            ..Default::default()
        };
        assert!(build(&hidden).ucs.is_none());
    }

    #[test]
    fn test_default_grid_follows_units() {
        let mm = GridSettings::for_units(LengthUnit::Millimeter);
        assert_eq!(mm.x_spacings, vec![6096.0, 6096.0, 6096.0]);
        assert_eq!(mm.extend_left_below, 610.0);
        assert_eq!(mm.spacing_unit, SpacingUnit::Millimeter);

        let m = GridSettings::for_units(LengthUnit::Meter);
        assert_relative_eq!(m.x_spacing, 6.096, max_relative = 1e-12);
        assert_relative_eq!(m.extend_right_above, 0.61, max_relative = 1e-12);

        assert_eq!(GridSettings::for_units(LengthUnit::Inch), GridSettings::default());
    }

    #[test]
    fn test_min_spacing() {
        let settings = GridSettings {
            x_spacings: vec![240.0, 120.0, 360.0],
            ..Default::default()
        };
        assert_eq!(settings.min_spacing(GridAxis::X), Some(120.0));
        assert_eq!(settings.min_spacing(GridAxis::Y), Some(240.0));
    }

    #[test]
    fn test_parse_feet_inches() {
        let bays = parse_bay_list("20-6, 15-0; 10'3\", 12", SpacingUnit::FeetInches, LengthUnit::Inch);
        assert_eq!(bays, vec![246.0, 180.0, 123.0, 144.0]);
    }

    #[test]
    fn test_parse_plain_numbers() {
        let bays = parse_bay_list("500, abc, 400;;250", SpacingUnit::Millimeter, LengthUnit::Millimeter);
        assert_eq!(bays, vec![500.0, 400.0, 250.0]);

        let meters = parse_bay_list("1.5", SpacingUnit::Meter, LengthUnit::Millimeter);
        assert_relative_eq!(meters[0], 1500.0);
    }

    #[test]
    fn test_normalized_copy() {
        let grid = build(&GridSettings::default()).to_normalized(LengthUnit::Inch);
        let last = grid.lines_on(GridAxis::X).last().unwrap();
        assert_relative_eq!(last.start[0], 720.0 / 39.37007874, max_relative = 1e-12);
    }
}
