//! UI module for the Steelframe GUI
//!
//! # Panel Structure
//! - `toolbar` - Creation mode (Select, Beam, Column), render mode, view reset
//! - viewport (`crate::viewport`) - 3D canvas filling the middle of the window
//! - `status_bar` - Edit state, selection, placement readout and messages

pub mod status_bar;
pub mod toolbar;
