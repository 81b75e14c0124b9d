//! Edit session state and input events

use serde::{Deserialize, Serialize};

use crate::geometry::{Plane, Point3, Ray, Vec3};
use crate::model::{EndTag, MemberType};

/// Interaction state. Drag states carry the working plane the pointer ray
/// is intersected with for the whole drag.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditState {
    #[default]
    Idle,
    /// First point recorded, pointer has not moved yet
    PlacingStart {
        member_type: MemberType,
        /// Normalized
        start: Point3,
        /// Project units
        start_at: [f64; 3],
    },
    /// Rubber-banding the second point
    PlacingEnd {
        member_type: MemberType,
        start: Point3,
        start_at: [f64; 3],
        end: Point3,
        end_at: [f64; 3],
    },
    DraggingHandle {
        member_id: String,
        end: EndTag,
        member_type: MemberType,
        plane: Plane,
    },
    DraggingMember {
        member_id: String,
        /// Member midpoint minus the grab point
        grab_offset: Vec3,
        plane: Plane,
    },
    DraggingGridOrigin {
        /// Grid origin minus the grab point
        grab_offset: Vec3,
        plane: Plane,
    },
}

impl EditState {
    pub fn name(&self) -> &'static str {
        match self {
            EditState::Idle => "Idle",
            EditState::PlacingStart { .. } => "PlacingStart",
            EditState::PlacingEnd { .. } => "PlacingEnd",
            EditState::DraggingHandle { .. } => "DraggingHandle",
            EditState::DraggingMember { .. } => "DraggingMember",
            EditState::DraggingGridOrigin { .. } => "DraggingGridOrigin",
        }
    }

    pub fn is_placing(&self) -> bool {
        matches!(self, EditState::PlacingStart { .. } | EditState::PlacingEnd { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(
            self,
            EditState::DraggingHandle { .. } | EditState::DraggingMember { .. } | EditState::DraggingGridOrigin { .. }
        )
    }
}

/// State plus the active creation mode.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EditSession {
    pub state: EditState,
    pub create_mode: Option<MemberType>,
}

impl EditSession {
    pub fn idle(create_mode: Option<MemberType>) -> Self {
        EditSession {
            state: EditState::Idle,
            create_mode,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditKey {
    Escape,
    Delete,
}

/// Input to the state machine. Pointer positions arrive as world rays.
#[derive(Debug, Clone, PartialEq)]
pub enum EditEvent {
    /// `modifier` chains placements (Shift in the GUI)
    PointerDown { ray: Ray, modifier: bool },
    PointerMove { ray: Ray },
    PointerUp,
    Key(EditKey),
    SetCreateMode(Option<MemberType>),
}
