//! Connection queries at member nodes

use crate::model::{EndTag, Model};

use super::effects::{Connection, ConnectionReport};

/// Endpoints closer than this (normalized) share a node
const NODE_TOLERANCE: f64 = 1e-6;

fn direction(from: [f64; 3], to: [f64; 3]) -> [f64; 3] {
    [to[0] - from[0], to[1] - from[1], to[2] - from[2]]
}

/// Angle between two vectors in degrees, 0 for degenerate input.
fn angle_between(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dot = a[0] * b[0] + a[1] * b[1] + a[2] * b[2];
    let na = (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt();
    let nb = (b[0] * b[0] + b[1] * b[1] + b[2] * b[2]).sqrt();
    if na * nb <= f64::EPSILON {
        return 0.0;
    }
    (dot / (na * nb)).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Members sharing the node at `member_id`'s `end`, with their angle to it.
///
/// `None` when the member is unknown or nothing else meets it there.
pub fn connections_at(model: &Model, member_id: &str, end: EndTag) -> Option<ConnectionReport> {
    let picked = model.member(member_id)?;
    let node = picked.endpoint(end);
    let picked_dir = direction(node, picked.endpoint(end.opposite()));
    let tol = model.units().from_normalized(NODE_TOLERANCE);

    let connections: Vec<Connection> = model
        .members_at_node(node, tol)
        .into_iter()
        .filter(|(m, _)| m.id != picked.id)
        .map(|(m, tag)| Connection {
            member_id: m.id.clone(),
            angle_deg: angle_between(picked_dir, direction(node, m.endpoint(tag.opposite()))),
        })
        .collect();

    if connections.is_empty() {
        return None;
    }
    Some(ConnectionReport {
        node,
        picked: picked.id.clone(),
        connections,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, MemberType, DEFAULT_SECTION};
    use crate::units::LengthUnit;
    use approx::assert_relative_eq;

    #[test]
    fn test_beam_column_node() {
        let mut model = Model::new("Test", LengthUnit::Meter);
        model
            .members
            .push(Member::new("C1", MemberType::Column, DEFAULT_SECTION, [0.0, 0.0, 0.0], [0.0, 0.0, 3.0]));
        model
            .members
            .push(Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 3.0], [6.0, 0.0, 3.0]));
        model
            .members
            .push(Member::new("B2", MemberType::Beam, DEFAULT_SECTION, [-4.0, 0.0, 3.0], [0.0, 0.0, 3.0]));

        let report = connections_at(&model, "C1", EndTag::End).unwrap();
        assert_eq!(report.node, [0.0, 0.0, 3.0]);
        assert_eq!(report.connections.len(), 2);
        for c in &report.connections {
            assert_relative_eq!(c.angle_deg, 90.0, epsilon = 1e-9);
        }

        let beams = connections_at(&model, "B1", EndTag::Start).unwrap();
        let b2 = beams.connections.iter().find(|c| c.member_id == "B2").unwrap();
        assert_relative_eq!(b2.angle_deg, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_free_end_has_no_connections() {
        let mut model = Model::new("Test", LengthUnit::Meter);
        model
            .members
            .push(Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [0.0, 0.0, 0.0], [6.0, 0.0, 0.0]));
        assert!(connections_at(&model, "B1", EndTag::End).is_none());
        assert!(connections_at(&model, "B9", EndTag::End).is_none());
    }
}
