//! Effects produced by edit transitions

use serde::{Deserialize, Serialize};

use crate::errors::EditError;
use crate::model::{Member, MemberPatch, MemberType};
use crate::scene::PreviewSpec;

/// A single store mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    CreateMember { member: Member },
    PatchMember { id: String, patch: MemberPatch },
    DeleteMember { id: String },
    /// Project units
    SetGridOrigin { origin: [f64; 3] },
}

/// Distance and angles between the two placement points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewReadout {
    /// Project units
    pub distance: f64,
    /// Heading in the XY plane, degrees from +X
    pub plan_angle_deg: f64,
    /// Degrees above the XY plane
    pub elevation_angle_deg: f64,
}

impl PreviewReadout {
    pub fn between(a: [f64; 3], b: [f64; 3]) -> Self {
        let (dx, dy, dz) = (b[0] - a[0], b[1] - a[1], b[2] - a[2]);
        let plan = dx.hypot(dy);
        PreviewReadout {
            distance: (plan * plan + dz * dz).sqrt(),
            plan_angle_deg: dy.atan2(dx).to_degrees(),
            elevation_angle_deg: dz.atan2(plan).to_degrees(),
        }
    }
}

/// Another member meeting the picked one at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub member_id: String,
    /// Angle between the two members, both measured away from the node
    pub angle_deg: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionReport {
    /// Project units
    pub node: [f64; 3],
    pub picked: String,
    pub connections: Vec<Connection>,
}

/// What the UI and store should do after a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", content = "data", rename_all = "snake_case")]
pub enum Effect {
    Mutate(Mutation),
    Select(Option<String>),
    AttachGizmo(String),
    DetachGizmo,
    ShowPreview(PreviewSpec),
    ClearPreview,
    PreviewReadout(PreviewReadout),
    ShowConnections(ConnectionReport),
    CreateModeChanged(Option<MemberType>),
    Rejected(EditError),
}

impl Effect {
    pub fn is_mutation(&self) -> bool {
        matches!(self, Effect::Mutate(_))
    }
}
