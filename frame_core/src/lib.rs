//! # frame_core - Steel Frame Scene-Editing Engine
//!
//! `frame_core` turns a structural model (steel beams and columns with
//! catalog cross-sections) into an editable 3D scene. It owns the geometry
//! math, the snapping rules, the parametric grid and the interactive edit
//! state machine; rendering is left to the GUI.
//!
//! ## Design Philosophy
//!
//! - **Project units at rest**: members store coordinates in mm, m or inches;
//!   geometry runs in a meter-equivalent normalized unit
//! - **One writer**: every change goes through a [`store::ModelStore`]
//! - **Derived visuals**: the [`scene::Scene`] is rebuilt from store events
//!   and never edits the model
//! - **JSON-First**: model, settings and effects implement Serialize/Deserialize
//!
//! ## Quick Start
//!
//! ```rust
//! use frame_core::model::{Member, MemberType};
//! use frame_core::store::{InMemoryStore, ModelStore};
//! use frame_core::units::LengthUnit;
//!
//! let mut store = InMemoryStore::new("Warehouse", LengthUnit::Millimeter);
//! store
//!     .create_member(Member::new("C1", MemberType::Column, "W4X13", [0.0, 0.0, 0.0], [0.0, 0.0, 6000.0]))
//!     .unwrap();
//! let c1 = store.model().member("C1").unwrap();
//! assert_eq!(c1.length_normalized(LengthUnit::Millimeter), 6.0);
//! ```
//!
//! ## Modules
//!
//! - [`units`] - Project units and normalized conversion
//! - [`geometry`] - Rays, planes and segment math
//! - [`basis`] - Member orientation frames
//! - [`model`] - Model, sections and members
//! - [`sections`] - Built-in section catalog
//! - [`solid`] - Member solids (box and profile)
//! - [`grid`] - Parametric structural grid
//! - [`snap`] - Grid, endpoint and line snapping
//! - [`camera`] - Orbit camera and pick rays
//! - [`store`] - Model store trait and in-memory store
//! - [`scene`] - Scene visuals and picking
//! - [`editor`] - Edit state machine and controller
//! - [`settings`] - Editor settings and appearance
//! - [`errors`] - Structured error types

pub mod basis;
pub mod camera;
pub mod editor;
pub mod errors;
pub mod geometry;
pub mod grid;
pub mod model;
pub mod scene;
pub mod sections;
pub mod settings;
pub mod snap;
pub mod solid;
pub mod store;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use editor::{EditController, EditEvent, Effect};
pub use errors::{EditError, EditResult};
pub use model::{Member, MemberType, Model};
pub use scene::Scene;
pub use store::{InMemoryStore, ModelStore};
pub use units::LengthUnit;
