//! # Model Store
//!
//! The mutation API the editor writes through. A store owns the canonical
//! model, grid settings, appearance and selection, validates every change,
//! and queues a `StoreEvent` for each one so the scene can rebuild exactly
//! the visuals that changed.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::model::{Member, MemberType};
//! use frame_core::store::{InMemoryStore, ModelStore, StoreEvent};
//! use frame_core::units::LengthUnit;
//!
//! let mut store = InMemoryStore::new("Demo", LengthUnit::Meter);
//! let id = store.next_member_id(MemberType::Beam);
//! store.create_member(Member::new(id, MemberType::Beam, "W4X13", [0.0; 3], [6.0, 0.0, 0.0])).unwrap();
//! assert_eq!(store.drain_events(), vec![StoreEvent::MemberAdded { id: "B1".into() }]);
//! ```

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::errors::{EditError, EditResult};
use crate::grid::GridSettings;
use crate::model::{Member, MemberPatch, MemberType, Model, Section};
use crate::settings::Appearance;
use crate::units::LengthUnit;

/// Change notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StoreEvent {
    MemberAdded { id: String },
    MemberChanged { id: String },
    MemberRemoved { id: String },
    MemberRenamed { old: String, new: String },
    SectionChanged { name: String },
    ModelReplaced,
    GridChanged,
    AppearanceChanged,
    SelectionChanged { id: Option<String> },
}

/// Data-store mutation API.
pub trait ModelStore {
    fn model(&self) -> &Model;
    fn grid(&self) -> &GridSettings;
    fn appearance(&self) -> &Appearance;
    fn selection(&self) -> Option<&str>;

    /// Insert a new member. Rejects duplicate ids and zero-length members.
    fn create_member(&mut self, member: Member) -> EditResult<()>;

    /// Apply a partial update. The patched member must still be valid.
    fn patch_member(&mut self, id: &str, patch: &MemberPatch) -> EditResult<()>;

    /// Remove a member, clearing the selection if it pointed at it.
    fn delete_member(&mut self, id: &str) -> EditResult<Member>;

    fn rename_member(&mut self, old: &str, new: &str) -> EditResult<()>;

    /// Insert or replace a section by name.
    fn upsert_section(&mut self, section: Section) -> EditResult<()>;

    fn replace_model(&mut self, model: Model);
    fn set_grid(&mut self, grid: GridSettings);
    fn set_appearance(&mut self, appearance: Appearance);
    fn set_selection(&mut self, id: Option<String>);

    /// Take all pending change notifications, oldest first.
    fn drain_events(&mut self) -> Vec<StoreEvent>;

    fn next_member_id(&self, member_type: MemberType) -> String {
        self.model().next_member_id(member_type)
    }

    fn units(&self) -> LengthUnit {
        self.model().units()
    }
}

/// Store keeping everything in memory.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    model: Model,
    grid: GridSettings,
    appearance: Appearance,
    selection: Option<String>,
    events: Vec<StoreEvent>,
    /// Number of accepted mutations
    revision: u64,
}

impl InMemoryStore {
    pub fn new(name: impl Into<String>, units: LengthUnit) -> Self {
        InMemoryStore::from_model(Model::new(name, units))
    }

    pub fn from_model(model: Model) -> Self {
        InMemoryStore {
            grid: GridSettings::for_units(model.units()),
            model,
            appearance: Appearance::default(),
            selection: None,
            events: Vec::new(),
            revision: 0,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, event: StoreEvent) {
        debug!("store event: {:?}", event);
        self.events.push(event);
    }

    fn commit(&mut self, event: StoreEvent) {
        self.revision += 1;
        self.model.touch();
        self.emit(event);
    }

    fn member_index(&self, id: &str) -> EditResult<usize> {
        self.model
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| EditError::member_not_found(id))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        InMemoryStore::from_model(Model::default())
    }
}

impl ModelStore for InMemoryStore {
    fn model(&self) -> &Model {
        &self.model
    }

    fn grid(&self) -> &GridSettings {
        &self.grid
    }

    fn appearance(&self) -> &Appearance {
        &self.appearance
    }

    fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    fn create_member(&mut self, member: Member) -> EditResult<()> {
        if self.model.member(&member.id).is_some() {
            warn!("Rejected member {}: id already in use", member.id);
            return Err(EditError::duplicate_id(&member.id));
        }
        member.validate()?;
        let id = member.id.clone();
        self.model.members.push(member);
        self.commit(StoreEvent::MemberAdded { id });
        Ok(())
    }

    fn patch_member(&mut self, id: &str, patch: &MemberPatch) -> EditResult<()> {
        let idx = self.member_index(id)?;
        let patched = self.model.members[idx].patched(patch);
        patched.validate()?;
        self.model.members[idx] = patched;
        self.commit(StoreEvent::MemberChanged { id: id.to_string() });
        Ok(())
    }

    fn delete_member(&mut self, id: &str) -> EditResult<Member> {
        let idx = self.member_index(id)?;
        let removed = self.model.members.remove(idx);
        self.commit(StoreEvent::MemberRemoved { id: id.to_string() });
        if self.selection.as_deref() == Some(id) {
            self.set_selection(None);
        }
        Ok(removed)
    }

    fn rename_member(&mut self, old: &str, new: &str) -> EditResult<()> {
        let new = new.trim();
        if new.is_empty() {
            return Err(EditError::invalid_input("id", new, "Member id must not be empty"));
        }
        let idx = self.member_index(old)?;
        if old == new {
            return Ok(());
        }
        if self.model.member(new).is_some() {
            return Err(EditError::duplicate_id(new));
        }
        self.model.members[idx].id = new.to_string();
        self.commit(StoreEvent::MemberRenamed {
            old: old.to_string(),
            new: new.to_string(),
        });
        if self.selection.as_deref() == Some(old) {
            self.set_selection(Some(new.to_string()));
        }
        Ok(())
    }

    fn upsert_section(&mut self, section: Section) -> EditResult<()> {
        section.validate()?;
        let name = section.name.clone();
        match self.model.sections.iter_mut().find(|s| s.name == name) {
            Some(existing) => *existing = section,
            None => self.model.sections.push(section),
        }
        self.commit(StoreEvent::SectionChanged { name });
        Ok(())
    }

    fn replace_model(&mut self, model: Model) {
        self.model = model;
        self.selection = None;
        self.revision += 1;
        self.emit(StoreEvent::ModelReplaced);
    }

    fn set_grid(&mut self, grid: GridSettings) {
        if self.grid != grid {
            self.grid = grid;
            self.revision += 1;
            self.emit(StoreEvent::GridChanged);
        }
    }

    fn set_appearance(&mut self, appearance: Appearance) {
        if self.appearance != appearance {
            self.appearance = appearance;
            self.emit(StoreEvent::AppearanceChanged);
        }
    }

    fn set_selection(&mut self, id: Option<String>) {
        if self.selection != id {
            self.selection = id.clone();
            self.emit(StoreEvent::SelectionChanged { id });
        }
    }

    fn drain_events(&mut self) -> Vec<StoreEvent> {
        std::mem::take(&mut self.events)
    }
}
