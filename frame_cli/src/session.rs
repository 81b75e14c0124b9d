//! Scripted editing session
//!
//! Owns a store, scene, editor and camera, and plays script commands
//! through them the way the GUI plays mouse events: a world point becomes a
//! ray from the camera eye through that point.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use frame_core::camera::OrbitCamera;
use frame_core::editor::{EditController, EditEvent, EditKey, Effect};
use frame_core::geometry::{Point3, Ray};
use frame_core::grid::GridSettings;
use frame_core::model::Model;
use frame_core::scene::Scene;
use frame_core::settings::{Appearance, EditorSettings};
use frame_core::store::{InMemoryStore, ModelStore};
use frame_core::units::{point_to_normalized, LengthUnit};

use crate::script::Command;

/// Contents of a `--settings` file; every section is optional. Without a
/// `grid` section the default grid is sized for the project units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub editor: EditorSettings,
    pub appearance: Appearance,
    pub grid: Option<GridSettings>,
}

/// What one command produced.
#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub line: usize,
    pub command: &'static str,
    pub state: &'static str,
    pub effects: Vec<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
}

pub struct Session {
    store: InMemoryStore,
    scene: Scene,
    editor: EditController,
    camera: OrbitCamera,
    /// Grid from the settings file, kept across `units` commands
    grid: Option<GridSettings>,
}

impl Session {
    pub fn new(model: Model, settings: SessionSettings) -> Self {
        let mut store = InMemoryStore::from_model(model);
        if let Some(grid) = &settings.grid {
            store.set_grid(grid.clone());
        }
        store.set_appearance(settings.appearance.clone());
        store.drain_events();
        let scene = Scene::from_store(settings.editor, &store);
        Session {
            store,
            scene,
            editor: EditController::new(),
            camera: OrbitCamera::default(),
            grid: settings.grid,
        }
    }

    pub fn model(&self) -> &Model {
        self.store.model()
    }

    fn pointer(&mut self, at: [f64; 3], make: impl FnOnce(Ray) -> EditEvent) -> Vec<Effect> {
        let world: Point3 = point_to_normalized(at, self.store.units());
        match self.camera.ray_to(&world) {
            Some(ray) => self.send(make(ray)),
            None => {
                warn!("point {:?} coincides with the camera eye; ignored", at);
                Vec::new()
            }
        }
    }

    fn send(&mut self, event: EditEvent) -> Vec<Effect> {
        self.editor.dispatch(&event, &mut self.store, &mut self.scene)
    }

    fn reset_units(&mut self, units: LengthUnit) {
        let name = self.store.model().project.name.clone();
        self.store.replace_model(Model::new(name, units));
        let grid = self.grid.clone().unwrap_or_else(|| GridSettings::for_units(units));
        self.store.set_grid(grid);
        self.editor = EditController::new();
        self.scene.sync(&mut self.store);
        debug!("new model in {}", units);
    }

    /// Run one command.
    pub fn run(&mut self, line: usize, command: &Command) -> StepReport {
        let mut model = None;
        let effects = match command {
            Command::Units(units) => {
                self.reset_units(*units);
                Vec::new()
            }
            Command::Mode(mode) => self.send(EditEvent::SetCreateMode(*mode)),
            Command::Down { at, chain } => {
                let modifier = *chain;
                self.pointer(*at, |ray| EditEvent::PointerDown { ray, modifier })
            }
            Command::Move { at } => self.pointer(*at, |ray| EditEvent::PointerMove { ray }),
            Command::Up => self.send(EditEvent::PointerUp),
            Command::Escape => self.send(EditEvent::Key(EditKey::Escape)),
            Command::Delete => self.send(EditEvent::Key(EditKey::Delete)),
            Command::Render(mode) => {
                self.scene.set_render_mode(*mode, &self.store);
                Vec::new()
            }
            Command::Camera { eye } => {
                let eye = point_to_normalized(*eye, self.store.units());
                self.camera = OrbitCamera::looking_at(eye, Point3::origin());
                Vec::new()
            }
            Command::Dump => {
                model = Some(self.store.model().clone());
                Vec::new()
            }
        };
        StepReport {
            line,
            command: command.name(),
            state: self.editor.state().name(),
            effects,
            model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use frame_core::model::MemberType;

    fn play(script: &str) -> (Session, Vec<StepReport>) {
        let mut session = Session::new(Model::new("Script", LengthUnit::Inch), SessionSettings::default());
        let reports = parse_script(script)
            .unwrap()
            .iter()
            .map(|(line, cmd)| session.run(*line, cmd))
            .collect();
        (session, reports)
    }

    #[test]
    fn test_column_script() {
        let (session, reports) = play("units m\nmode column\ndown 2 3 0\nmove 8 1 0\ndown 8 1 0\n");
        let c1 = session.model().member("C1").unwrap();
        assert_eq!(c1.member_type, MemberType::Column);
        assert_eq!(c1.start, [2.0, 3.0, 0.0]);
        assert_eq!(c1.end, [2.0, 3.0, 3.0]);
        assert_eq!(reports.last().unwrap().state, "Idle");
    }

    #[test]
    fn test_chained_beams_get_sequential_ids() {
        let (session, _) = play("units m\nmode beam\ndown 1 1 0\ndown 4 1 0 mod\ndown 4 5 0\n");
        let ids: Vec<&str> = session.model().members.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["B1", "B2"]);
        assert_eq!(session.model().member("B2").unwrap().start, [4.0, 1.0, 0.0]);
    }

    #[test]
    fn test_escape_leaves_model_empty() {
        let (session, reports) = play("units m\nmode beam\ndown 1 1 0\nmove 3 1 0\nesc\n");
        assert!(session.model().members.is_empty());
        assert!(reports.last().unwrap().effects.contains(&Effect::ClearPreview));
    }

    #[test]
    fn test_dump_includes_model() {
        let (_, reports) = play("units mm\ndump\n");
        let dump = reports.last().unwrap();
        assert_eq!(dump.model.as_ref().unwrap().units(), LengthUnit::Millimeter);
        let json = serde_json::to_value(dump).unwrap();
        assert_eq!(json["command"], "dump");
        assert!(json["model"]["members"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_settings_file_is_partial() {
        let s: SessionSettings = serde_json::from_str(r#"{"editor": {"default_column_height": 4.0}}"#).unwrap();
        assert_eq!(s.editor.default_column_height, 4.0);
        assert_eq!(s.editor.endpoint_tolerance, 0.1);
        assert!(s.grid.is_none());
    }

    #[test]
    fn test_units_command_resizes_default_grid() {
        let (session, _) = play("units mm\n");
        assert_eq!(session.store.grid().x_spacings, vec![6096.0; 3]);

        let custom = SessionSettings {
            grid: Some(GridSettings {
                x_spacings: vec![5000.0],
                ..GridSettings::default()
            }),
            ..SessionSettings::default()
        };
        let mut session = Session::new(Model::new("Script", LengthUnit::Millimeter), custom);
        session.run(1, &Command::Units(LengthUnit::Millimeter));
        assert_eq!(session.store.grid().x_spacings, vec![5000.0]);
    }
}
