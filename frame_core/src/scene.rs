//! # Scene
//!
//! Transient visuals derived from the store: one solid, two endpoint handles
//! and one centerline segment per member, the grid visual, and the placement
//! preview. Everything is in normalized units.
//!
//! The scene never edits the model. It drains `StoreEvent`s and rebuilds the
//! affected visuals, so handles always mirror the stored endpoints. It also
//! answers pick queries and serves as the snap target set.

use std::collections::BTreeMap;

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{Point3, Ray};
use crate::grid::{build_grid, GridVisual, UcsAxis};
use crate::model::{EndTag, MemberType, Model};
use crate::settings::{Appearance, EditorSettings, RenderMode};
use crate::snap::{EndpointTarget, SegmentTarget, SnapTargets};
use crate::solid::{ghost, synthesize, Solid};
use crate::store::{ModelStore, StoreEvent};
use crate::units::{point_to_normalized, LengthUnit};

/// Pickable proxy for one member endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Handle {
    pub visual_id: Uuid,
    pub member_id: String,
    pub end: EndTag,
    /// Normalized
    pub position: Point3,
    /// Project units, copied from the member
    pub stored: [f64; 3],
}

/// Member centerline, for line snapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub member_id: String,
    pub a: Point3,
    pub b: Point3,
}

/// What a pointer ray hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PickTarget {
    Handle { member_id: String, end: EndTag },
    GridOrigin,
    Ucs(UcsAxis),
    Member { member_id: String, point: [f64; 3] },
}

/// Placement preview request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewSpec {
    pub member_type: MemberType,
    /// Normalized
    pub start: [f64; 3],
    /// Normalized; `None` until the pointer moves after the first click
    pub end: Option<[f64; 3]>,
}

/// Materialized preview: start marker, rubber-band line and ghost solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub spec: PreviewSpec,
    pub marker: Point3,
    pub line: Option<(Point3, Point3)>,
    pub ghost: Option<Solid>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    settings: EditorSettings,
    units: LengthUnit,
    solids: BTreeMap<String, Solid>,
    handles: Vec<Handle>,
    segments: Vec<Segment>,
    grid: Option<GridVisual>,
    preview: Option<Preview>,
    selection: Option<String>,
    /// Member the drag gizmo is attached to
    gizmo: Option<String>,
}

impl Scene {
    pub fn new(settings: EditorSettings) -> Self {
        Scene {
            settings,
            units: LengthUnit::default(),
            solids: BTreeMap::new(),
            handles: Vec::new(),
            segments: Vec::new(),
            grid: None,
            preview: None,
            selection: None,
            gizmo: None,
        }
    }

    /// Scene built from the store's current contents.
    pub fn from_store(settings: EditorSettings, store: &dyn ModelStore) -> Self {
        let mut scene = Scene::new(settings);
        scene.rebuild_all(store);
        scene
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    pub fn units(&self) -> LengthUnit {
        self.units
    }

    pub fn solids(&self) -> impl Iterator<Item = &Solid> {
        self.solids.values()
    }

    pub fn solid(&self, member_id: &str) -> Option<&Solid> {
        self.solids.get(member_id)
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    pub fn handle(&self, member_id: &str, end: EndTag) -> Option<&Handle> {
        self.handles.iter().find(|h| h.member_id == member_id && h.end == end)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn grid(&self) -> Option<&GridVisual> {
        self.grid.as_ref()
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn gizmo(&self) -> Option<&str> {
        self.gizmo.as_deref()
    }

    pub fn attach_gizmo(&mut self, member_id: &str) {
        self.gizmo = Some(member_id.to_string());
    }

    pub fn detach_gizmo(&mut self) {
        self.gizmo = None;
    }

    /// Switch solid variant; every member is rebuilt.
    pub fn set_render_mode(&mut self, mode: RenderMode, store: &dyn ModelStore) {
        if self.settings.render_mode != mode {
            self.settings.render_mode = mode;
            self.rebuild_members(store);
        }
    }

    // ========================================================================
    // Rebuilding
    // ========================================================================

    /// Throw away every visual and rebuild from the store.
    pub fn rebuild_all(&mut self, store: &dyn ModelStore) {
        self.units = store.units();
        self.selection = store.selection().map(str::to_string);
        self.preview = None;
        self.gizmo = self.gizmo.take().filter(|id| store.model().member(id).is_some());
        self.rebuild_members(store);
        self.rebuild_grid(store);
    }

    fn rebuild_members(&mut self, store: &dyn ModelStore) {
        self.solids.clear();
        self.handles.clear();
        self.segments.clear();
        let ids: Vec<String> = store.model().members.iter().map(|m| m.id.clone()).collect();
        for id in ids {
            self.add_member_visuals(store.model(), store.appearance(), &id);
        }
    }

    fn rebuild_grid(&mut self, store: &dyn ModelStore) {
        let appearance = store.appearance();
        let visual = build_grid(store.grid(), appearance.grid_major, appearance.grid_minor, self.units);
        self.grid = Some(visual.to_normalized(self.units));
    }

    fn remove_member_visuals(&mut self, id: &str) {
        self.solids.remove(id);
        self.handles.retain(|h| h.member_id != id);
        self.segments.retain(|s| s.member_id != id);
    }

    fn add_member_visuals(&mut self, model: &Model, appearance: &Appearance, id: &str) {
        let Some(member) = model.member(id) else {
            return;
        };
        let units = model.units();
        if let Some(solid) = synthesize(member, &model.sections, units, self.settings.render_mode, appearance) {
            self.solids.insert(member.id.clone(), solid);
        }
        for end in EndTag::BOTH {
            self.handles.push(Handle {
                visual_id: Uuid::new_v4(),
                member_id: member.id.clone(),
                end,
                position: member.endpoint_normalized(end, units),
                stored: member.endpoint(end),
            });
        }
        self.segments.push(Segment {
            member_id: member.id.clone(),
            a: member.endpoint_normalized(EndTag::Start, units),
            b: member.endpoint_normalized(EndTag::End, units),
        });
    }

    fn rebuild_member(&mut self, store: &dyn ModelStore, id: &str) {
        self.remove_member_visuals(id);
        self.add_member_visuals(store.model(), store.appearance(), id);
    }

    /// Drain store notifications and rebuild what they touch.
    pub fn sync(&mut self, store: &mut dyn ModelStore) {
        let events = store.drain_events();
        for event in events {
            trace!("scene sync: {:?}", event);
            match event {
                StoreEvent::MemberAdded { id } | StoreEvent::MemberChanged { id } => self.rebuild_member(store, &id),
                StoreEvent::MemberRemoved { id } => {
                    self.remove_member_visuals(&id);
                    if self.gizmo.as_deref() == Some(id.as_str()) {
                        self.gizmo = None;
                    }
                }
                StoreEvent::MemberRenamed { old, new } => {
                    self.remove_member_visuals(&old);
                    self.rebuild_member(store, &new);
                    if self.gizmo.as_deref() == Some(old.as_str()) {
                        self.gizmo = Some(new);
                    }
                }
                StoreEvent::SectionChanged { name } => {
                    let ids: Vec<String> = store
                        .model()
                        .members
                        .iter()
                        .filter(|m| m.section == name)
                        .map(|m| m.id.clone())
                        .collect();
                    for id in ids {
                        self.rebuild_member(store, &id);
                    }
                }
                StoreEvent::ModelReplaced => self.rebuild_all(store),
                StoreEvent::AppearanceChanged => {
                    self.rebuild_members(store);
                    self.rebuild_grid(store);
                }
                StoreEvent::GridChanged => self.rebuild_grid(store),
                StoreEvent::SelectionChanged { id } => self.selection = id,
            }
        }
    }

    // ========================================================================
    // Preview
    // ========================================================================

    /// Show (or replace) the placement preview, using the first section for the ghost.
    pub fn set_preview(&mut self, spec: PreviewSpec, model: &Model, appearance: &Appearance) {
        let start = Point3::from(spec.start);
        let end = spec.end.map(Point3::from);
        let ghost_solid = end.and_then(|end| {
            let section = model.first_section()?;
            ghost(spec.member_type, &start, &end, section, model.units(), appearance.preview)
        });
        self.preview = Some(Preview {
            marker: start,
            line: end.map(|end| (start, end)),
            ghost: ghost_solid,
            spec,
        });
    }

    pub fn clear_preview(&mut self) {
        if self.preview.take().is_some() {
            debug!("preview discarded");
        }
    }

    // ========================================================================
    // Picking
    // ========================================================================

    /// What the ray hits, by priority: handles, then the grid origin and UCS
    /// arrows, then member bodies. Within a class the nearest hit wins.
    pub fn pick(&self, ray: &Ray) -> Option<PickTarget> {
        let radius = self.settings.pick_radius.max(self.settings.handle_radius);

        let handle = self
            .handles
            .iter()
            .filter_map(|h| ray.intersect_sphere(&h.position, radius).map(|t| (t, h)))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        if let Some((_, h)) = handle {
            return Some(PickTarget::Handle {
                member_id: h.member_id.clone(),
                end: h.end,
            });
        }

        if let Some(grid) = &self.grid {
            let origin = Point3::from(grid.origin_handle);
            if ray.intersect_sphere(&origin, radius).is_some() {
                return Some(PickTarget::GridOrigin);
            }
            if let Some(ucs) = &grid.ucs {
                let base = Point3::from(ucs.origin);
                let arrow = ucs
                    .arrows
                    .iter()
                    .map(|a| (ray.distance_to_segment(&base, &Point3::from(a.tip)), a.axis))
                    .filter(|((dist, _), _)| *dist < radius)
                    .min_by(|a, b| a.0 .1.total_cmp(&b.0 .1));
                if let Some((_, axis)) = arrow {
                    return Some(PickTarget::Ucs(axis));
                }
            }
        }

        self.solids
            .iter()
            .filter_map(|(id, s)| s.hit(ray).map(|t| (t, id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, id)| {
                let p = ray.at(t);
                PickTarget::Member {
                    member_id: id.clone(),
                    point: [p.x, p.y, p.z],
                }
            })
    }
}

impl SnapTargets for Scene {
    fn endpoint_targets(&self) -> Vec<EndpointTarget<'_>> {
        self.handles
            .iter()
            .map(|h| EndpointTarget {
                member_id: &h.member_id,
                end: h.end,
                position: h.position,
                stored: h.stored,
            })
            .collect()
    }

    fn segment_targets(&self) -> Vec<SegmentTarget<'_>> {
        self.segments
            .iter()
            .map(|s| SegmentTarget {
                member_id: &s.member_id,
                a: s.a,
                b: s.b,
            })
            .collect()
    }
}

/// Normalized grid origin for the store's current grid.
pub fn grid_origin_normalized(store: &dyn ModelStore) -> Point3 {
    point_to_normalized(store.grid().origin, store.units())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, MemberPatch, DEFAULT_SECTION};
    use crate::store::InMemoryStore;

    fn store_with_beam() -> InMemoryStore {
        let mut store = InMemoryStore::new("Test", LengthUnit::Meter);
        store
            .create_member(Member::new("B1", MemberType::Beam, DEFAULT_SECTION, [2.0, 2.0, 0.0], [6.0, 2.0, 0.0]))
            .unwrap();
        store.drain_events();
        store
    }

    #[test]
    fn test_visuals_per_member() {
        let store = store_with_beam();
        let scene = Scene::from_store(EditorSettings::default(), &store);
        assert_eq!(scene.solids().count(), 1);
        assert_eq!(scene.handles().len(), 2);
        assert_eq!(scene.segments().len(), 1);
        assert_eq!(scene.handle("B1", EndTag::End).unwrap().position, Point3::new(6.0, 2.0, 0.0));
        assert!(scene.grid().is_some());
    }

    #[test]
    fn test_sync_follows_patches() {
        let mut store = store_with_beam();
        let mut scene = Scene::from_store(EditorSettings::default(), &store);
        let old_id = scene.handle("B1", EndTag::End).unwrap().visual_id;
        store.patch_member("B1", &MemberPatch::endpoint(EndTag::End, [7.0, 3.0, 0.0])).unwrap();
        scene.sync(&mut store);
        let h = scene.handle("B1", EndTag::End).unwrap();
        assert_eq!(h.position, Point3::new(7.0, 3.0, 0.0));
        assert_ne!(h.visual_id, old_id);
        assert_eq!(scene.handles().len(), 2);

        store.delete_member("B1").unwrap();
        scene.sync(&mut store);
        assert!(scene.handles().is_empty());
        assert_eq!(scene.solids().count(), 0);
    }

    #[test]
    fn test_pick_priority() {
        let store = store_with_beam();
        let scene = Scene::from_store(EditorSettings::default(), &store);

        let on_handle = Ray::looking_down(6.0, 2.0);
        assert_eq!(
            scene.pick(&on_handle),
            Some(PickTarget::Handle {
                member_id: "B1".into(),
                end: EndTag::End
            })
        );

        match scene.pick(&Ray::looking_down(4.0, 2.0)) {
            Some(PickTarget::Member { member_id, .. }) => assert_eq!(member_id, "B1"),
            other => panic!("expected member hit, got {:?}", other),
        }

        assert_eq!(scene.pick(&Ray::looking_down(0.0, 0.0)), Some(PickTarget::GridOrigin));
        assert_eq!(scene.pick(&Ray::looking_down(4.0, 4.0)), None);
    }

    #[test]
    fn test_pick_ucs_arrow() {
        let store = store_with_beam();
        let scene = Scene::from_store(EditorSettings::default(), &store);
        let ucs = scene.grid().unwrap().ucs.clone().unwrap();
        let x_tip = ucs.arrows.iter().find(|a| a.axis == UcsAxis::X).unwrap().tip;
        let ray = Ray::looking_down(x_tip[0] * 0.8, 0.0);
        assert_eq!(scene.pick(&ray), Some(PickTarget::Ucs(UcsAxis::X)));
    }

    #[test]
    fn test_missing_section_still_has_handles() {
        let mut store = InMemoryStore::new("Test", LengthUnit::Meter);
        store
            .create_member(Member::new("B1", MemberType::Beam, "UNKNOWN", [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]))
            .unwrap();
        let scene = Scene::from_store(EditorSettings::default(), &store);
        assert!(scene.solid("B1").is_none());
        assert_eq!(scene.handles().len(), 2);
    }

    #[test]
    fn test_preview_lifecycle() {
        let store = store_with_beam();
        let mut scene = Scene::from_store(EditorSettings::default(), &store);
        let spec = PreviewSpec {
            member_type: MemberType::Column,
            start: [1.0, 1.0, 0.0],
            end: Some([1.0, 1.0, 3.0]),
        };
        scene.set_preview(spec, store.model(), store.appearance());
        let preview = scene.preview().unwrap();
        assert!(preview.ghost.as_ref().unwrap().ghost);
        assert!(preview.line.is_some());
        scene.clear_preview();
        assert!(scene.preview().is_none());
    }

    #[test]
    fn test_render_mode_rebuilds() {
        let store = store_with_beam();
        let mut scene = Scene::from_store(EditorSettings::default(), &store);
        scene.set_render_mode(RenderMode::Profile, &store);
        assert_eq!(scene.solid("B1").unwrap().variant, crate::solid::SolidVariant::Profile);
    }
}
