//! Applies transition effects to the store and scene

use log::{debug, warn};

use crate::errors::EditResult;
use crate::model::MemberType;
use crate::scene::Scene;
use crate::store::ModelStore;

use super::effects::{Effect, Mutation};
use super::state::{EditEvent, EditSession, EditState};
use super::transition::{transition, EditContext};

/// Owns the edit session and drives it with input events.
#[derive(Debug, Clone, Default)]
pub struct EditController {
    session: EditSession,
}

impl EditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn state(&self) -> &EditState {
        &self.session.state
    }

    pub fn create_mode(&self) -> Option<MemberType> {
        self.session.create_mode
    }

    /// Resolve one event completely: transition, store mutations, selection,
    /// scene effects, then a scene sync.
    ///
    /// Returns the effects as applied. A mutation the store refuses is
    /// replaced by `Effect::Rejected`, and the selection and gizmo effects
    /// that followed it are dropped.
    pub fn dispatch(&mut self, event: &EditEvent, store: &mut dyn ModelStore, scene: &mut Scene) -> Vec<Effect> {
        let (next, effects) = {
            let ctx = EditContext::new(&*store, scene);
            transition(&self.session, event, &ctx)
        };
        self.session = next;

        let mut applied = Vec::with_capacity(effects.len());
        let mut failed = false;
        for effect in effects {
            match effect {
                Effect::Mutate(mutation) => match apply_mutation(store, &mutation) {
                    Ok(()) => applied.push(Effect::Mutate(mutation)),
                    Err(e) => {
                        if e.is_precondition() {
                            debug!("mutation rejected [{}]: {}", e.error_code(), e);
                        } else {
                            warn!("mutation rejected [{}]: {}", e.error_code(), e);
                        }
                        failed = true;
                        applied.push(Effect::Rejected(e));
                    }
                },
                Effect::Select(_) | Effect::AttachGizmo(_) if failed => {}
                Effect::Select(id) => {
                    store.set_selection(id.clone());
                    applied.push(Effect::Select(id));
                }
                Effect::AttachGizmo(id) => {
                    scene.attach_gizmo(&id);
                    applied.push(Effect::AttachGizmo(id));
                }
                Effect::DetachGizmo => {
                    scene.detach_gizmo();
                    applied.push(Effect::DetachGizmo);
                }
                Effect::ShowPreview(spec) => {
                    scene.set_preview(spec.clone(), store.model(), store.appearance());
                    applied.push(Effect::ShowPreview(spec));
                }
                Effect::ClearPreview => {
                    scene.clear_preview();
                    applied.push(Effect::ClearPreview);
                }
                other => applied.push(other),
            }
        }

        scene.sync(store);
        applied
    }
}

fn apply_mutation(store: &mut dyn ModelStore, mutation: &Mutation) -> EditResult<()> {
    match mutation {
        Mutation::CreateMember { member } => store.create_member(member.clone()),
        Mutation::PatchMember { id, patch } => store.patch_member(id, patch),
        Mutation::DeleteMember { id } => store.delete_member(id).map(|_| ()),
        Mutation::SetGridOrigin { origin } => {
            let mut grid = store.grid().clone();
            grid.origin = *origin;
            store.set_grid(grid);
            Ok(())
        }
    }
}
