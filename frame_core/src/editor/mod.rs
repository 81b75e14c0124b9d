//! # Edit Controller
//!
//! Interactive member placement and editing as an explicit state machine.
//!
//! ```text
//!            mode + down           move            down
//!   Idle ───────────────▶ PlacingStart ──▶ PlacingEnd ──────▶ Idle
//!    │                         ▲                    │ (modifier)
//!    │                         └────────────────────┘
//!    ├── down on handle ─────▶ DraggingHandle ──┐
//!    ├── down on member ─────▶ DraggingMember ──┼── up ──▶ Idle
//!    └── down on grid origin ▶ DraggingGridOrigin ┘
//! ```
//!
//! `transition` is a pure function from (session, event, context) to
//! (session, effects). `EditController` holds the session and applies the
//! effects: mutations go to the `ModelStore`, previews and the gizmo go to
//! the `Scene`, and everything else is handed back for the UI.
//!
//! ## Example
//!
//! ```rust
//! use frame_core::editor::{EditController, EditEvent};
//! use frame_core::geometry::Ray;
//! use frame_core::model::MemberType;
//! use frame_core::scene::Scene;
//! use frame_core::settings::EditorSettings;
//! use frame_core::store::{InMemoryStore, ModelStore};
//! use frame_core::units::LengthUnit;
//!
//! let mut store = InMemoryStore::new("Demo", LengthUnit::Meter);
//! let mut scene = Scene::from_store(EditorSettings::default(), &store);
//! let mut editor = EditController::new();
//!
//! editor.dispatch(&EditEvent::SetCreateMode(Some(MemberType::Column)), &mut store, &mut scene);
//! for (x, y) in [(2.0, 3.0), (2.0, 3.0)] {
//!     let down = EditEvent::PointerDown { ray: Ray::looking_down(x, y), modifier: false };
//!     editor.dispatch(&down, &mut store, &mut scene);
//! }
//! assert_eq!(store.model().member("C1").unwrap().end, [2.0, 3.0, 3.0]);
//! ```

mod connections;
mod controller;
mod effects;
mod state;
mod transition;

pub use connections::connections_at;
pub use controller::EditController;
pub use effects::{Connection, ConnectionReport, Effect, Mutation, PreviewReadout};
pub use state::{EditEvent, EditKey, EditSession, EditState};
pub use transition::{transition, EditContext};
