//! # Steelframe GUI Application
//!
//! Interactive steel frame editor. Built with Iced; the viewport is a canvas
//! that projects the `frame_core` scene through an orbit camera.
//!
//! Every pointer and key event is handed to the `EditController`, which
//! resolves it completely (snap, store mutation, scene sync) before the next
//! frame is drawn.

mod ui;
mod viewport;

use iced::widget::{column, Canvas};
use iced::{Element, Length, Size, Task};

use frame_core::camera::OrbitCamera;
use frame_core::editor::{ConnectionReport, EditController, EditEvent, Effect, PreviewReadout};
use frame_core::model::MemberType;
use frame_core::scene::Scene;
use frame_core::settings::{EditorSettings, RenderMode};
use frame_core::store::{InMemoryStore, ModelStore};
use frame_core::units::LengthUnit;

use viewport::{Viewport, ViewportEvent};

/// Radians of orbit per pixel of right-drag
const ORBIT_SPEED: f64 = 0.008;

#[derive(Debug, Clone)]
pub enum Message {
    Viewport(ViewportEvent),
    SetCreateMode(Option<MemberType>),
    SetRenderMode(RenderMode),
    ResetCamera,
}

struct App {
    store: InMemoryStore,
    scene: Scene,
    editor: EditController,
    camera: OrbitCamera,
    readout: Option<PreviewReadout>,
    connections: Option<ConnectionReport>,
    status: String,
    status_is_warning: bool,
}

impl App {
    fn new() -> Self {
        let store = InMemoryStore::new("Untitled", LengthUnit::Inch);
        let scene = Scene::from_store(EditorSettings::default(), &store);
        log::info!("new project in {}", store.units());
        Self {
            store,
            scene,
            editor: EditController::new(),
            camera: OrbitCamera::default(),
            readout: None,
            connections: None,
            status: "Ready".to_string(),
            status_is_warning: false,
        }
    }

    fn dispatch(&mut self, event: EditEvent) {
        let effects = self.editor.dispatch(&event, &mut self.store, &mut self.scene);
        for effect in effects {
            match effect {
                Effect::Mutate(_) => {
                    self.status = format!("{} members", self.store.model().members.len());
                    self.status_is_warning = false;
                }
                Effect::Rejected(e) => {
                    self.status = e.to_string();
                    self.status_is_warning = true;
                }
                Effect::PreviewReadout(r) => self.readout = Some(r),
                Effect::ClearPreview => self.readout = None,
                Effect::ShowConnections(report) => self.connections = Some(report),
                Effect::Select(None) => self.connections = None,
                _ => {}
            }
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Viewport(event) => match event {
                ViewportEvent::Pressed { ndc, aspect, modifier } => {
                    if let Some(ray) = self.camera.ray_through(ndc, aspect) {
                        self.dispatch(EditEvent::PointerDown { ray, modifier });
                    }
                }
                ViewportEvent::Moved { ndc, aspect } => {
                    if let Some(ray) = self.camera.ray_through(ndc, aspect) {
                        self.dispatch(EditEvent::PointerMove { ray });
                    }
                }
                ViewportEvent::Released => self.dispatch(EditEvent::PointerUp),
                ViewportEvent::Orbit { dx, dy } => {
                    self.camera
                        .orbit(-f64::from(dx) * ORBIT_SPEED, f64::from(dy) * ORBIT_SPEED);
                }
                ViewportEvent::Zoom(lines) => {
                    self.camera.zoom(if lines > 0.0 { 0.9 } else { 1.0 / 0.9 });
                }
                ViewportEvent::Key(key) => self.dispatch(EditEvent::Key(key)),
            },
            Message::SetCreateMode(mode) => self.dispatch(EditEvent::SetCreateMode(mode)),
            Message::SetRenderMode(mode) => {
                self.scene.set_render_mode(mode, &self.store);
                self.status = format!("{} view", mode.display_name());
                self.status_is_warning = false;
            }
            Message::ResetCamera => self.camera = OrbitCamera::default(),
        }
        Task::none()
    }

    fn view(&self) -> Element<'_, Message> {
        let toolbar = ui::toolbar::view_toolbar(self.editor.create_mode(), self.scene.settings().render_mode);

        let viewport = Canvas::new(Viewport {
            scene: &self.scene,
            camera: &self.camera,
            appearance: self.store.appearance(),
        })
        .width(Length::Fill)
        .height(Length::Fill);

        let status_bar = ui::status_bar::view_status_bar(
            self.editor.state(),
            self.editor.create_mode(),
            self.store.selection(),
            self.store.units(),
            self.readout.as_ref(),
            self.connections.as_ref(),
            &self.status,
            self.status_is_warning,
        );

        column![toolbar, viewport, status_bar].spacing(4).padding(8).into()
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn init_logger() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wgpu_core=warn,wgpu_hal=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

#[cfg(target_arch = "wasm32")]
fn init_logger() {
    console_error_panic_hook::set_once();
}

fn main() -> iced::Result {
    init_logger();

    iced::application(App::new, App::update, App::view)
        .title("Steelframe")
        .window_size(Size::new(1280.0, 800.0))
        .run()
}
