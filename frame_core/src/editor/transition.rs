//! The edit state machine as a pure function.
//!
//! `transition` reads the model, grid and scene but never changes them; every
//! change is described by the returned effects. Pointer rays that miss the
//! working plane leave the session untouched.

use log::{debug, trace};

use crate::errors::EditError;
use crate::geometry::{Plane, Point3, Ray, Vec3, EPSILON};
use crate::grid::{GridAxis, GridSettings};
use crate::model::{EndTag, Member, MemberPatch, MemberType, Model, DEFAULT_SECTION};
use crate::scene::{PickTarget, PreviewSpec, Scene};
use crate::snap::{SnapCandidate, SnapEngine};
use crate::store::ModelStore;
use crate::units::{point_from_normalized, point_to_normalized, LengthUnit};

use super::connections::connections_at;
use super::effects::{Effect, Mutation, PreviewReadout};
use super::state::{EditEvent, EditKey, EditSession, EditState};

/// Read-only view of everything a transition may consult.
#[derive(Clone, Copy)]
pub struct EditContext<'a> {
    pub model: &'a Model,
    pub grid: &'a GridSettings,
    pub scene: &'a Scene,
    pub selection: Option<&'a str>,
}

impl<'a> EditContext<'a> {
    pub fn new(store: &'a dyn ModelStore, scene: &'a Scene) -> Self {
        EditContext {
            model: store.model(),
            grid: store.grid(),
            scene,
            selection: store.selection(),
        }
    }

    fn units(&self) -> LengthUnit {
        self.model.units()
    }

    fn snap(&self, raw: &Point3, exclude: Option<&str>) -> SnapCandidate {
        SnapEngine::from_settings(self.scene.settings()).resolve(raw, self.units(), self.scene, exclude)
    }

    /// Horizontal plane through the grid origin
    fn working_plane(&self) -> Plane {
        Plane::horizontal(self.units().to_normalized(self.grid.origin[2]))
    }
}

type Outcome = (EditSession, Vec<Effect>);

fn unchanged(session: &EditSession) -> Outcome {
    (session.clone(), Vec::new())
}

fn coords(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// Advance the session by one event.
pub fn transition(session: &EditSession, event: &EditEvent, ctx: &EditContext<'_>) -> Outcome {
    let outcome = match event {
        EditEvent::PointerDown { ray, modifier } => pointer_down(session, ray, *modifier, ctx),
        EditEvent::PointerMove { ray } => pointer_move(session, ray, ctx),
        EditEvent::PointerUp => pointer_up(session),
        EditEvent::Key(EditKey::Escape) => cancel(session),
        EditEvent::Key(EditKey::Delete) => delete_selected(session, ctx),
        EditEvent::SetCreateMode(mode) => set_create_mode(session, *mode),
    };
    if outcome.0.state.name() != session.state.name() {
        debug!("edit state {} -> {}", session.state.name(), outcome.0.state.name());
    }
    trace!("{} effect(s)", outcome.1.len());
    outcome
}

// ============================================================================
// Placement
// ============================================================================

/// Snapped pointer position for a placement click: a picked handle's
/// position, or the working-plane hit.
fn placement_point(ray: &Ray, ctx: &EditContext<'_>) -> Option<SnapCandidate> {
    let on_handle = match ctx.scene.pick(ray) {
        Some(PickTarget::Handle { member_id, end }) => ctx.scene.handle(&member_id, end).map(|h| h.position),
        _ => None,
    };
    let raw = on_handle.or_else(|| ctx.working_plane().intersect(ray))?;
    Some(ctx.snap(&raw, None))
}

/// Constrained end point while placing.
///
/// Columns ignore the pointer and rise by the default height; beams stay at
/// the elevation of their start.
fn placement_end(
    member_type: MemberType,
    start: &Point3,
    start_at: [f64; 3],
    ray: &Ray,
    ctx: &EditContext<'_>,
) -> Option<(Point3, [f64; 3])> {
    let units = ctx.units();
    match member_type {
        MemberType::Column => {
            let rise = units.from_normalized(ctx.scene.settings().default_column_height);
            let end_at = [start_at[0], start_at[1], start_at[2] + rise];
            Some((point_to_normalized(end_at, units), end_at))
        }
        MemberType::Beam => {
            let hit = Plane::horizontal(start.z).intersect(ray)?;
            let snapped = ctx.snap(&hit, None);
            let end = Point3::new(snapped.position.x, snapped.position.y, start.z);
            Some((end, [snapped.stored[0], snapped.stored[1], start_at[2]]))
        }
    }
}

fn begin_placement(session: &EditSession, member_type: MemberType, ray: &Ray, ctx: &EditContext<'_>) -> Outcome {
    let Some(start) = placement_point(ray, ctx) else {
        return unchanged(session);
    };
    let next = EditSession {
        state: EditState::PlacingStart {
            member_type,
            start: start.position,
            start_at: start.stored,
        },
        create_mode: session.create_mode,
    };
    let preview = PreviewSpec {
        member_type,
        start: coords(&start.position),
        end: None,
    };
    (next, vec![Effect::ShowPreview(preview)])
}

fn update_preview(
    session: &EditSession,
    member_type: MemberType,
    start: &Point3,
    start_at: [f64; 3],
    ray: &Ray,
    ctx: &EditContext<'_>,
) -> Outcome {
    let Some((end, end_at)) = placement_end(member_type, start, start_at, ray, ctx) else {
        return unchanged(session);
    };
    let next = EditSession {
        state: EditState::PlacingEnd {
            member_type,
            start: *start,
            start_at,
            end,
            end_at,
        },
        create_mode: session.create_mode,
    };
    let preview = PreviewSpec {
        member_type,
        start: coords(start),
        end: Some(coords(&end)),
    };
    (
        next,
        vec![
            Effect::ShowPreview(preview),
            Effect::PreviewReadout(PreviewReadout::between(start_at, end_at)),
        ],
    )
}

fn finalize(
    session: &EditSession,
    member_type: MemberType,
    start: &Point3,
    start_at: [f64; 3],
    ray: &Ray,
    chain: bool,
    ctx: &EditContext<'_>,
) -> Outcome {
    let Some((end, end_at)) = placement_end(member_type, start, start_at, ray, ctx) else {
        return unchanged(session);
    };
    let id = ctx.model.next_member_id(member_type);
    if end_at == start_at {
        return (session.clone(), vec![Effect::Rejected(EditError::zero_length(id))]);
    }

    let section = ctx
        .model
        .first_section()
        .map_or_else(|| DEFAULT_SECTION.to_string(), |s| s.name.clone());
    let member = Member::new(id.clone(), member_type, section, start_at, end_at);
    debug!("placing {} from {:?} to {:?}", id, start_at, end_at);

    let mut effects = vec![
        Effect::Mutate(Mutation::CreateMember { member }),
        Effect::ClearPreview,
        Effect::Select(Some(id.clone())),
        Effect::AttachGizmo(id),
    ];

    if chain {
        // a beam continues from its end; a column from where the click landed
        let next_start = match member_type {
            MemberType::Beam => Some((end, end_at)),
            MemberType::Column => placement_point(ray, ctx).map(|c| (c.position, c.stored)),
        };
        if let Some((position, stored)) = next_start {
            effects.push(Effect::ShowPreview(PreviewSpec {
                member_type,
                start: coords(&position),
                end: None,
            }));
            let next = EditSession {
                state: EditState::PlacingStart {
                    member_type,
                    start: position,
                    start_at: stored,
                },
                create_mode: session.create_mode,
            };
            return (next, effects);
        }
    }

    effects.push(Effect::CreateModeChanged(None));
    (EditSession::idle(None), effects)
}

// ============================================================================
// Picking and dragging
// ============================================================================

/// Vertical plane through `point` facing the viewer.
fn facing_vertical_plane(point: &Point3, ray: &Ray) -> Plane {
    let toward_viewer = -ray.direction.into_inner();
    let horizontal = Vec3::new(toward_viewer.x, toward_viewer.y, 0.0);
    Plane::from_point_normal(point, horizontal).unwrap_or(Plane {
        normal: Vec3::x_axis(),
        offset: point.x,
    })
}

/// Plane through `point` perpendicular to the view ray.
fn facing_plane(point: &Point3, ray: &Ray) -> Plane {
    Plane::from_point_normal(point, -ray.direction.into_inner()).unwrap_or_else(|| Plane::horizontal(point.z))
}

fn pick(session: &EditSession, ray: &Ray, ctx: &EditContext<'_>) -> Outcome {
    let units = ctx.units();
    match ctx.scene.pick(ray) {
        Some(PickTarget::Handle { member_id, end }) => {
            let Some(member) = ctx.model.member(&member_id) else {
                return unchanged(session);
            };
            let handle = member.endpoint_normalized(end, units);
            let plane = match member.member_type {
                MemberType::Beam => Plane::horizontal(handle.z),
                MemberType::Column => facing_vertical_plane(&handle, ray),
            };
            let mut effects = vec![Effect::Select(Some(member_id.clone())), Effect::AttachGizmo(member_id.clone())];
            if let Some(report) = connections_at(ctx.model, &member_id, end) {
                effects.push(Effect::ShowConnections(report));
            }
            let state = EditState::DraggingHandle {
                member_type: member.member_type,
                member_id,
                end,
                plane,
            };
            (EditSession { state, create_mode: None }, effects)
        }
        Some(PickTarget::GridOrigin) | Some(PickTarget::Ucs(_)) => {
            let origin = point_to_normalized(ctx.grid.origin, units);
            let plane = Plane::horizontal(origin.z);
            let grab = plane.intersect(ray).unwrap_or(origin);
            let state = EditState::DraggingGridOrigin {
                grab_offset: origin - grab,
                plane,
            };
            (EditSession { state, create_mode: None }, Vec::new())
        }
        Some(PickTarget::Member { member_id, point }) => {
            let Some(member) = ctx.model.member(&member_id) else {
                return unchanged(session);
            };
            let grab = Point3::from(point);
            let state = EditState::DraggingMember {
                grab_offset: member.midpoint_normalized(units) - grab,
                plane: facing_plane(&grab, ray),
                member_id: member_id.clone(),
            };
            let effects = vec![Effect::Select(Some(member_id.clone())), Effect::AttachGizmo(member_id)];
            (EditSession { state, create_mode: None }, effects)
        }
        None => (session.clone(), vec![Effect::Select(None), Effect::DetachGizmo]),
    }
}

fn drag_handle(
    session: &EditSession,
    member_id: &str,
    end: EndTag,
    member_type: MemberType,
    plane: &Plane,
    ray: &Ray,
    ctx: &EditContext<'_>,
) -> Outcome {
    let (Some(member), Some(hit)) = (ctx.model.member(member_id), plane.intersect(ray)) else {
        return unchanged(session);
    };
    let snapped = ctx.snap(&hit, Some(member_id));
    let current = member.endpoint(end);
    let other = member.endpoint(end.opposite());
    let moved = match member_type {
        MemberType::Column => [other[0], other[1], snapped.stored[2]],
        MemberType::Beam => [snapped.stored[0], snapped.stored[1], current[2]],
    };
    if moved == current {
        return unchanged(session);
    }
    if moved == other {
        return (session.clone(), vec![Effect::Rejected(EditError::zero_length(member_id))]);
    }
    let patch = MemberPatch::endpoint(end, moved);
    (
        session.clone(),
        vec![Effect::Mutate(Mutation::PatchMember {
            id: member_id.to_string(),
            patch,
        })],
    )
}

/// Translation in the view-facing plane: both endpoints move by the same delta.
fn drag_member(session: &EditSession, member_id: &str, grab_offset: &Vec3, plane: &Plane, ray: &Ray, ctx: &EditContext<'_>) -> Outcome {
    let (Some(member), Some(hit)) = (ctx.model.member(member_id), plane.intersect(ray)) else {
        return unchanged(session);
    };
    let units = ctx.units();
    let target = hit + grab_offset;
    // round-off from the plane hit is not a move
    let delta = (target - member.midpoint_normalized(units)).map(|d| if d.abs() < EPSILON { 0.0 } else { d });
    let delta = [
        units.from_normalized(delta.x),
        units.from_normalized(delta.y),
        units.from_normalized(delta.z),
    ];
    if delta == [0.0; 3] {
        return unchanged(session);
    }
    let shift = |p: [f64; 3]| [p[0] + delta[0], p[1] + delta[1], p[2] + delta[2]];
    let patch = MemberPatch::endpoints(shift(member.start), shift(member.end));
    (
        session.clone(),
        vec![Effect::Mutate(Mutation::PatchMember {
            id: member_id.to_string(),
            patch,
        })],
    )
}

/// Origin moves in whole multiples of the smallest bay on each axis.
fn drag_grid_origin(session: &EditSession, grab_offset: &Vec3, plane: &Plane, ray: &Ray, ctx: &EditContext<'_>) -> Outcome {
    let Some(hit) = plane.intersect(ray) else {
        return unchanged(session);
    };
    let target = point_from_normalized(&(hit + grab_offset), ctx.units());
    let round = |v: f64, step: Option<f64>| match step {
        Some(s) if s > 0.0 => (v / s).round() * s,
        _ => v,
    };
    let origin = [
        round(target[0], ctx.grid.min_spacing(GridAxis::X)),
        round(target[1], ctx.grid.min_spacing(GridAxis::Y)),
        ctx.grid.origin[2],
    ];
    if origin == ctx.grid.origin {
        return unchanged(session);
    }
    (session.clone(), vec![Effect::Mutate(Mutation::SetGridOrigin { origin })])
}

// ============================================================================
// Event handlers
// ============================================================================

fn pointer_down(session: &EditSession, ray: &Ray, modifier: bool, ctx: &EditContext<'_>) -> Outcome {
    match &session.state {
        EditState::Idle => match session.create_mode {
            Some(member_type) => begin_placement(session, member_type, ray, ctx),
            None => pick(session, ray, ctx),
        },
        EditState::PlacingStart {
            member_type,
            start,
            start_at,
        }
        | EditState::PlacingEnd {
            member_type,
            start,
            start_at,
            ..
        } => finalize(session, *member_type, start, *start_at, ray, modifier, ctx),
        // already holding a drag
        _ => unchanged(session),
    }
}

fn pointer_move(session: &EditSession, ray: &Ray, ctx: &EditContext<'_>) -> Outcome {
    match &session.state {
        EditState::Idle => unchanged(session),
        EditState::PlacingStart {
            member_type,
            start,
            start_at,
        }
        | EditState::PlacingEnd {
            member_type,
            start,
            start_at,
            ..
        } => update_preview(session, *member_type, start, *start_at, ray, ctx),
        EditState::DraggingHandle {
            member_id,
            end,
            member_type,
            plane,
        } => drag_handle(session, member_id, *end, *member_type, plane, ray, ctx),
        EditState::DraggingMember {
            member_id,
            grab_offset,
            plane,
        } => drag_member(session, member_id, grab_offset, plane, ray, ctx),
        EditState::DraggingGridOrigin { grab_offset, plane } => drag_grid_origin(session, grab_offset, plane, ray, ctx),
    }
}

fn pointer_up(session: &EditSession) -> Outcome {
    if session.state.is_dragging() {
        (EditSession::idle(session.create_mode), Vec::new())
    } else {
        unchanged(session)
    }
}

fn cancel(session: &EditSession) -> Outcome {
    if session.state == EditState::Idle && session.create_mode.is_none() {
        return unchanged(session);
    }
    let mut effects = Vec::new();
    if session.state != EditState::Idle {
        effects.push(Effect::ClearPreview);
    }
    if session.create_mode.is_some() {
        effects.push(Effect::CreateModeChanged(None));
    }
    (EditSession::idle(None), effects)
}

fn delete_selected(session: &EditSession, ctx: &EditContext<'_>) -> Outcome {
    if session.state != EditState::Idle {
        return unchanged(session);
    }
    let Some(id) = ctx.selection.filter(|id| ctx.model.member(id).is_some()) else {
        return unchanged(session);
    };
    (
        session.clone(),
        vec![
            Effect::Mutate(Mutation::DeleteMember { id: id.to_string() }),
            Effect::Select(None),
            Effect::DetachGizmo,
        ],
    )
}

fn set_create_mode(session: &EditSession, mode: Option<MemberType>) -> Outcome {
    let mut effects = Vec::new();
    if session.state.is_placing() {
        effects.push(Effect::ClearPreview);
    }
    if mode != session.create_mode {
        effects.push(Effect::CreateModeChanged(mode));
    }
    (EditSession::idle(mode), effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::EditorSettings;
    use crate::store::InMemoryStore;

    fn setup() -> (InMemoryStore, Scene) {
        let store = InMemoryStore::new("Test", LengthUnit::Meter);
        let scene = Scene::from_store(EditorSettings::default(), &store);
        (store, scene)
    }

    fn placing(member_type: MemberType, at: [f64; 3]) -> EditSession {
        EditSession {
            state: EditState::PlacingStart {
                member_type,
                start: Point3::from(at),
                start_at: at,
            },
            create_mode: Some(member_type),
        }
    }

    #[test]
    fn test_column_preview_ignores_pointer() {
        let (store, scene) = setup();
        let ctx = EditContext::new(&store, &scene);
        let session = placing(MemberType::Column, [2.0, 3.0, 0.0]);

        let (next, effects) = transition(&session, &EditEvent::PointerMove { ray: Ray::looking_down(9.0, -4.0) }, &ctx);
        match next.state {
            EditState::PlacingEnd { end_at, .. } => assert_eq!(end_at, [2.0, 3.0, 3.0]),
            other => panic!("unexpected state {:?}", other),
        }
        assert!(effects.iter().all(|e| !e.is_mutation()));
        assert!(effects.iter().any(|e| matches!(e, Effect::PreviewReadout(r) if r.distance == 3.0)));
    }

    #[test]
    fn test_beam_preview_stays_level() {
        let (store, scene) = setup();
        let ctx = EditContext::new(&store, &scene);
        let session = placing(MemberType::Beam, [0.0, 0.0, 2.5]);

        let ray = Ray::through(Point3::new(10.0, -10.0, 10.0), Point3::new(3.0, 1.0, 2.5)).unwrap();
        let (next, _) = transition(&session, &EditEvent::PointerMove { ray }, &ctx);
        match next.state {
            EditState::PlacingEnd { end, end_at, .. } => {
                assert_eq!(end.z, 2.5);
                assert_eq!(end_at, [3.0, 1.0, 2.5]);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_ray_missing_plane_is_noop() {
        let (store, scene) = setup();
        let ctx = EditContext::new(&store, &scene);
        let session = EditSession::idle(Some(MemberType::Beam));
        let skyward = Ray::new(Point3::new(1.0, 1.0, 5.0), Vec3::z()).unwrap();

        let (next, effects) = transition(&session, &EditEvent::PointerDown { ray: skyward, modifier: false }, &ctx);
        assert_eq!(next, session);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_zero_length_placement_rejected() {
        let (store, scene) = setup();
        let ctx = EditContext::new(&store, &scene);
        let session = placing(MemberType::Beam, [1.0, 1.0, 0.0]);

        let down = EditEvent::PointerDown {
            ray: Ray::looking_down(1.02, 0.99),
            modifier: false,
        };
        let (next, effects) = transition(&session, &down, &ctx);
        assert_eq!(next, session);
        assert_eq!(effects, vec![Effect::Rejected(EditError::zero_length("B1"))]);
    }

    #[test]
    fn test_escape_cancels_placement() {
        let (store, scene) = setup();
        let ctx = EditContext::new(&store, &scene);
        let session = placing(MemberType::Column, [0.0, 0.0, 0.0]);

        let (next, effects) = transition(&session, &EditEvent::Key(EditKey::Escape), &ctx);
        assert_eq!(next, EditSession::idle(None));
        assert_eq!(effects, vec![Effect::ClearPreview, Effect::CreateModeChanged(None)]);

        let (again, none) = transition(&next, &EditEvent::Key(EditKey::Escape), &ctx);
        assert_eq!(again, next);
        assert!(none.is_empty());
    }

    #[test]
    fn test_miss_clears_selection() {
        let (store, scene) = setup();
        let ctx = EditContext::new(&store, &scene);
        let down = EditEvent::PointerDown {
            ray: Ray::looking_down(5.0, 5.0),
            modifier: false,
        };
        let (next, effects) = transition(&EditSession::default(), &down, &ctx);
        assert_eq!(next.state, EditState::Idle);
        assert_eq!(effects, vec![Effect::Select(None), Effect::DetachGizmo]);
    }

    #[test]
    fn test_pointer_up_ends_drag_only() {
        let dragging = EditSession {
            state: EditState::DraggingGridOrigin {
                grab_offset: Vec3::zeros(),
                plane: Plane::horizontal(0.0),
            },
            create_mode: None,
        };
        assert_eq!(pointer_up(&dragging).0, EditSession::idle(None));

        let placing = placing(MemberType::Beam, [0.0; 3]);
        assert_eq!(pointer_up(&placing).0, placing);
    }
}
