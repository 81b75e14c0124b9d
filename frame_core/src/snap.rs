//! # Spatial Snapping
//!
//! Corrects a raw pointer position with three strategies, always in the same
//! order:
//!
//! 1. **Grid**: round each coordinate to the unit's snap quantum
//! 2. **Endpoint**: jump to an existing handle within the endpoint tolerance
//! 3. **Line**: project onto an existing member centerline within the line
//!    tolerance
//!
//! Endpoint and line snapping test the *grid-quantized* point, and the first
//! strategy that applies wins; distances are never compared across
//! strategies. Only targets currently materialized in the scene are eligible.
//!
//! Every candidate also carries its position in project units. Endpoint snaps
//! return the target's stored coordinates directly, so a snapped endpoint is
//! bit-identical to the one it snapped to.

use serde::{Deserialize, Serialize};

use crate::geometry::{project_to_segment, Point3};
use crate::model::EndTag;
use crate::settings::EditorSettings;
use crate::units::{point_from_normalized, point_to_normalized, LengthUnit};

/// Strategy that produced a snapped position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SnapStrategy {
    Grid,
    Endpoint,
    Line,
}

/// A resolved pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapCandidate {
    /// Normalized units
    pub position: Point3,
    /// Project units
    pub stored: [f64; 3],
    pub strategy: SnapStrategy,
}

/// An endpoint handle that can be snapped to.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointTarget<'a> {
    pub member_id: &'a str,
    pub end: EndTag,
    pub position: Point3,
    pub stored: [f64; 3],
}

/// A member centerline that can be snapped to.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTarget<'a> {
    pub member_id: &'a str,
    pub a: Point3,
    pub b: Point3,
}

/// Source of snap targets; implemented by the scene.
pub trait SnapTargets {
    fn endpoint_targets(&self) -> Vec<EndpointTarget<'_>>;
    fn segment_targets(&self) -> Vec<SegmentTarget<'_>>;
}

/// Round a normalized position to the unit's grid quantum.
pub fn grid_snap(p: &Point3, units: LengthUnit) -> Point3 {
    let q = units.snap_quantum_normalized();
    p.map(|v| (v / q).round() * q)
}

/// Grid snap that also reports the result in project units.
///
/// The stored value is computed from the whole number of quanta, so 5 inches
/// is exactly `5.0` and 12 steps of 0.1 m is exactly `1.2`, rather than a
/// value that went through the normalized conversion.
pub fn grid_candidate(p: &Point3, units: LengthUnit) -> SnapCandidate {
    let q = units.snap_quantum_normalized();
    let steps = p.map(|v| (v / q).round());
    let qu = units.snap_quantum();
    // sub-unit quanta divide by the (exact) number of steps per unit
    let to_stored = |s: f64| if qu >= 1.0 { s * qu } else { s / (1.0 / qu).round() };
    let stored = [to_stored(steps.x), to_stored(steps.y), to_stored(steps.z)];
    SnapCandidate {
        position: point_to_normalized(stored, units),
        stored,
        strategy: SnapStrategy::Grid,
    }
}

/// First endpoint strictly within `tol` of `p`.
pub fn snap_to_endpoints<'a, 'b>(p: &Point3, targets: &'b [EndpointTarget<'a>], tol: f64) -> Option<&'b EndpointTarget<'a>> {
    targets.iter().find(|t| (t.position - p).norm() < tol)
}

/// Projection of `p` onto the first centerline strictly within `tol`.
pub fn snap_to_lines(p: &Point3, targets: &[SegmentTarget<'_>], tol: f64) -> Option<Point3> {
    targets
        .iter()
        .map(|s| project_to_segment(&s.a, &s.b, p))
        .find(|proj| (proj - p).norm() < tol)
}

/// Snapping with fixed tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapEngine {
    pub endpoint_tolerance: f64,
    pub line_tolerance: f64,
}

impl Default for SnapEngine {
    fn default() -> Self {
        SnapEngine::from_settings(&EditorSettings::default())
    }
}

impl SnapEngine {
    pub fn from_settings(settings: &EditorSettings) -> Self {
        SnapEngine {
            endpoint_tolerance: settings.endpoint_tolerance,
            line_tolerance: settings.line_tolerance,
        }
    }

    /// Resolve a raw normalized position.
    ///
    /// Targets belonging to `exclude` (the member being edited) are ignored.
    pub fn resolve(&self, raw: &Point3, units: LengthUnit, targets: &dyn SnapTargets, exclude: Option<&str>) -> SnapCandidate {
        let grid = grid_candidate(raw, units);
        let keep = |id: &str| exclude != Some(id);

        let endpoints: Vec<_> = targets.endpoint_targets().into_iter().filter(|t| keep(t.member_id)).collect();
        if let Some(hit) = snap_to_endpoints(&grid.position, &endpoints, self.endpoint_tolerance) {
            return SnapCandidate {
                position: hit.position,
                stored: hit.stored,
                strategy: SnapStrategy::Endpoint,
            };
        }

        let segments: Vec<_> = targets.segment_targets().into_iter().filter(|s| keep(s.member_id)).collect();
        if let Some(proj) = snap_to_lines(&grid.position, &segments, self.line_tolerance) {
            return SnapCandidate {
                position: proj,
                stored: point_from_normalized(&proj, units),
                strategy: SnapStrategy::Line,
            };
        }

        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    struct Fixed {
        endpoints: Vec<(String, EndTag, Point3)>,
        segments: Vec<(String, Point3, Point3)>,
    }

    impl SnapTargets for Fixed {
        fn endpoint_targets(&self) -> Vec<EndpointTarget<'_>> {
            self.endpoints
                .iter()
                .map(|(id, end, p)| EndpointTarget {
                    member_id: id,
                    end: *end,
                    position: *p,
                    stored: [p.x, p.y, p.z],
                })
                .collect()
        }

        fn segment_targets(&self) -> Vec<SegmentTarget<'_>> {
            self.segments.iter().map(|(id, a, b)| SegmentTarget { member_id: id, a: *a, b: *b }).collect()
        }
    }

    fn one_beam() -> Fixed {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.2, 0.4, 0.0);
        Fixed {
            endpoints: vec![("B1".into(), EndTag::Start, a), ("B1".into(), EndTag::End, b)],
            segments: vec![("B1".into(), a, b)],
        }
    }

    #[test]
    fn test_inch_grid_snap() {
        let raw = Point3::new(5.03, 5.02, 0.0) / 39.37007874;
        let snapped = grid_candidate(&raw, LengthUnit::Inch);
        assert_eq!(snapped.stored, [5.0, 5.0, 0.0]);
        assert_relative_eq!(snapped.position.x * 39.37007874, 5.0, max_relative = 1e-12);
        assert_relative_eq!(snapped.position.y * 39.37007874, 5.0, max_relative = 1e-12);
    }

    #[test]
    fn test_metric_grid_values_are_clean() {
        let snapped = grid_candidate(&Point3::new(1.23, 0.38, 2.96), LengthUnit::Meter);
        assert_eq!(snapped.stored, [1.2, 0.4, 3.0]);
        assert_eq!(snapped.position, Point3::new(1.2, 0.4, 3.0));

        let mm = grid_candidate(&Point3::new(1.2345, 0.0, 0.0), LengthUnit::Millimeter);
        assert_eq!(mm.stored, [1230.0, 0.0, 0.0]);
    }

    #[test]
    fn test_grid_snap_is_idempotent() {
        for units in LengthUnit::ALL {
            for raw in [Point3::new(1.234, -0.567, 3.21), Point3::new(0.0049, 7.77, -2.5)] {
                let once = grid_snap(&raw, units);
                let twice = grid_snap(&once, units);
                assert_eq!(once, twice, "{}", units);
            }
        }
    }

    #[test]
    fn test_endpoint_wins_over_line() {
        let engine = SnapEngine::default();
        let targets = one_beam();
        let c = engine.resolve(&Point3::new(1.23, 0.42, 0.0), LengthUnit::Meter, &targets, None);
        assert_eq!(c.strategy, SnapStrategy::Endpoint);
        assert_eq!(c.position, Point3::new(1.2, 0.4, 0.0));
        assert_eq!(c.stored, [1.2, 0.4, 0.0]);
    }

    #[test]
    fn test_line_projection() {
        let engine = SnapEngine::default();
        let targets = Fixed {
            endpoints: vec![],
            segments: vec![("B1".into(), Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 0.0, 0.0))],
        };
        let c = engine.resolve(&Point3::new(2.0, 0.03, 0.0), LengthUnit::Millimeter, &targets, None);
        assert_eq!(c.strategy, SnapStrategy::Line);
        assert_relative_eq!(c.position, Point3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_tolerance_is_strict() {
        let targets = vec![EndpointTarget {
            member_id: "B1",
            end: EndTag::Start,
            position: Point3::new(0.0, 0.0, 0.0),
            stored: [0.0; 3],
        }];
        assert!(snap_to_endpoints(&Point3::new(0.1, 0.0, 0.0), &targets, 0.1).is_none());
        assert!(snap_to_endpoints(&Point3::new(0.09, 0.0, 0.0), &targets, 0.1).is_some());
    }

    #[test]
    fn test_excluded_member_is_ignored() {
        let engine = SnapEngine::default();
        let targets = one_beam();
        let c = engine.resolve(&Point3::new(1.23, 0.42, 0.0), LengthUnit::Meter, &targets, Some("B1"));
        assert_eq!(c.strategy, SnapStrategy::Grid);
    }

    #[test]
    fn test_nothing_nearby_keeps_grid() {
        let engine = SnapEngine::default();
        let c = engine.resolve(&Point3::new(3.04, 2.96, 0.0), LengthUnit::Meter, &one_beam(), None);
        assert_eq!(c.strategy, SnapStrategy::Grid);
        assert_relative_eq!(c.position, Point3::new(3.0, 3.0, 0.0), epsilon = 1e-12);
    }
}
