//! 3D viewport canvas
//!
//! Wireframe projection of the scene through the orbit camera. Left mouse
//! drives the editor, right-drag orbits and the wheel zooms. Pointer
//! positions leave the canvas as normalized device coordinates; the app turns
//! them into pick rays.

use iced::widget::canvas::{self, Action, Frame, Geometry, Path, Program, Stroke, Text};
use iced::{keyboard, mouse, Color, Point, Rectangle, Renderer, Size, Theme};

use frame_core::camera::OrbitCamera;
use frame_core::editor::EditKey;
use frame_core::geometry::{Point2, Point3};
use frame_core::grid::{GridVisual, LineStroke};
use frame_core::scene::Scene;
use frame_core::settings::{self, Appearance, BACKGROUND_COLOR, EDGE_COLOR};

use crate::Message;

/// Upper bound on dash segments per grid line
const MAX_DASHES: usize = 2000;

#[derive(Debug, Clone, Copy)]
pub enum ViewportEvent {
    Pressed { ndc: Point2, aspect: f64, modifier: bool },
    Moved { ndc: Point2, aspect: f64 },
    Released,
    /// Right-drag delta in pixels
    Orbit { dx: f32, dy: f32 },
    /// Wheel lines, positive away from the user
    Zoom(f32),
    Key(EditKey),
}

pub struct Viewport<'a> {
    pub scene: &'a Scene,
    pub camera: &'a OrbitCamera,
    pub appearance: &'a Appearance,
}

#[derive(Debug, Default)]
pub struct ViewportState {
    orbiting: bool,
    last_cursor: Option<Point>,
    modifiers: keyboard::Modifiers,
}

fn to_color(c: settings::Color) -> Color {
    let [r, g, b] = c.rgb_f32();
    Color::from_rgb(r, g, b)
}

fn to_ndc(pos: Point, size: Size) -> Point2 {
    let w = f64::from(size.width.max(1.0));
    let h = f64::from(size.height.max(1.0));
    Point2::new(f64::from(pos.x) / w * 2.0 - 1.0, 1.0 - f64::from(pos.y) / h * 2.0)
}

fn aspect(size: Size) -> f64 {
    f64::from(size.width.max(1.0)) / f64::from(size.height.max(1.0))
}

/// World to canvas pixels
struct Projector<'a> {
    camera: &'a OrbitCamera,
    size: Size,
}

impl Projector<'_> {
    fn screen(&self, p: &Point3) -> Option<Point> {
        let ndc = self.camera.project(p, aspect(self.size))?;
        Some(Point::new(
            ((ndc.x + 1.0) * 0.5 * f64::from(self.size.width)) as f32,
            ((1.0 - ndc.y) * 0.5 * f64::from(self.size.height)) as f32,
        ))
    }

    fn line(&self, a: &Point3, b: &Point3) -> Option<Path> {
        Some(Path::line(self.screen(a)?, self.screen(b)?))
    }
}

impl Viewport<'_> {
    fn draw_grid(&self, frame: &mut Frame, proj: &Projector<'_>, grid: &GridVisual) {
        for line in &grid.lines {
            let a = Point3::from(line.start);
            let b = Point3::from(line.end);
            let stroke = Stroke::default()
                .with_color(to_color(line.color))
                .with_width(if line.major { 1.5 } else { 1.0 });
            match &line.stroke {
                LineStroke::Solid => {
                    if let Some(path) = proj.line(&a, &b) {
                        frame.stroke(&path, stroke);
                    }
                }
                LineStroke::Dashed { dash, gap } => {
                    let len = (b - a).norm();
                    let period = dash + gap;
                    if period <= 0.0 || len <= 0.0 {
                        continue;
                    }
                    let dir = (b - a) / len;
                    let count = ((len / period).ceil() as usize).min(MAX_DASHES);
                    for i in 0..count {
                        let t0 = i as f64 * period;
                        let t1 = (t0 + dash).min(len);
                        if let Some(path) = proj.line(&(a + dir * t0), &(a + dir * t1)) {
                            frame.stroke(&path, stroke);
                        }
                    }
                }
                LineStroke::Dots(dots) => {
                    for d in dots {
                        if let Some(p) = proj.screen(&Point3::from(*d)) {
                            frame.fill(&Path::circle(p, 1.2), to_color(line.color));
                        }
                    }
                }
            }
        }

        for label in &grid.labels {
            if let Some(position) = proj.screen(&Point3::from(label.position)) {
                frame.fill_text(Text {
                    content: label.text.clone(),
                    position,
                    color: to_color(self.appearance.grid_major),
                    size: iced::Pixels(12.0),
                    ..Text::default()
                });
            }
        }

        if let Some(ucs) = &grid.ucs {
            let base = Point3::from(ucs.origin);
            for arrow in &ucs.arrows {
                let color = to_color(arrow.color);
                if let Some(path) = proj.line(&base, &Point3::from(arrow.tip)) {
                    frame.stroke(&path, Stroke::default().with_color(color).with_width(2.0));
                }
                if let Some(position) = proj.screen(&Point3::from(arrow.label_position)) {
                    frame.fill_text(Text {
                        content: arrow.axis.label().to_string(),
                        position,
                        color,
                        size: iced::Pixels(11.0),
                        ..Text::default()
                    });
                }
            }
        }

        if let Some(origin) = proj.screen(&Point3::from(grid.origin_handle)) {
            let side = 6.0;
            frame.fill_rectangle(
                Point::new(origin.x - side / 2.0, origin.y - side / 2.0),
                Size::new(side, side),
                to_color(self.appearance.grid_major),
            );
        }
    }

    fn draw_solids(&self, frame: &mut Frame, proj: &Projector<'_>) {
        let selection = self.scene.selection();
        for solid in self.scene.solids() {
            let selected = solid.member_id.as_deref() == selection && selection.is_some();
            let (color, width) = if selected {
                (to_color(self.appearance.selection), 2.0)
            } else {
                (to_color(solid.color), 1.0)
            };
            // centerline in the member color, outline in the edge color
            let centerline = self
                .scene
                .segments()
                .iter()
                .find(|s| solid.member_id.as_deref() == Some(s.member_id.as_str()));
            if let Some(path) = centerline.and_then(|s| proj.line(&s.a, &s.b)) {
                frame.stroke(&path, Stroke::default().with_color(color).with_width(width + 1.0));
            }
            let edge = if selected { color } else { to_color(EDGE_COLOR) };
            for (a, b) in solid.edges() {
                if let Some(path) = proj.line(&a, &b) {
                    frame.stroke(&path, Stroke::default().with_color(edge).with_width(width));
                }
            }
        }
    }

    fn draw_handles(&self, frame: &mut Frame, proj: &Projector<'_>) {
        let selection = self.scene.selection();
        for handle in self.scene.handles() {
            let Some(p) = proj.screen(&handle.position) else {
                continue;
            };
            if Some(handle.member_id.as_str()) == selection {
                frame.fill(&Path::circle(p, 5.0), to_color(self.appearance.selection));
            } else {
                frame.fill(&Path::circle(p, 3.0), to_color(EDGE_COLOR));
            }
        }
    }

    fn draw_preview(&self, frame: &mut Frame, proj: &Projector<'_>) {
        let Some(preview) = self.scene.preview() else {
            return;
        };
        let color = to_color(self.appearance.preview);
        if let Some(p) = proj.screen(&preview.marker) {
            frame.fill(&Path::circle(p, 5.0), color);
        }
        if let Some((a, b)) = &preview.line {
            if let Some(path) = proj.line(a, b) {
                frame.stroke(&path, Stroke::default().with_color(color).with_width(2.0));
            }
        }
        if let Some(ghost) = &preview.ghost {
            let faded = Color { a: 0.5, ..color };
            for (a, b) in ghost.edges() {
                if let Some(path) = proj.line(&a, &b) {
                    frame.stroke(&path, Stroke::default().with_color(faded).with_width(1.0));
                }
            }
        }
    }
}

impl Program<Message> for Viewport<'_> {
    type State = ViewportState;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        use iced::mouse::{Button, Event as MouseEvent};

        let publish = |e: ViewportEvent| Some(Action::publish(Message::Viewport(e)).and_capture());

        match event {
            canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(mods)) => {
                state.modifiers = *mods;
                None
            }
            canvas::Event::Keyboard(keyboard::Event::KeyPressed { key, .. }) => match key {
                keyboard::Key::Named(keyboard::key::Named::Escape) => publish(ViewportEvent::Key(EditKey::Escape)),
                keyboard::Key::Named(keyboard::key::Named::Delete | keyboard::key::Named::Backspace) => {
                    publish(ViewportEvent::Key(EditKey::Delete))
                }
                _ => None,
            },
            canvas::Event::Mouse(MouseEvent::ButtonReleased(Button::Left)) => publish(ViewportEvent::Released),
            canvas::Event::Mouse(MouseEvent::ButtonReleased(Button::Right)) => {
                state.orbiting = false;
                state.last_cursor = None;
                None
            }
            canvas::Event::Mouse(mouse_event) => {
                let pos = cursor.position_in(bounds)?;
                let size = bounds.size();
                match mouse_event {
                    MouseEvent::ButtonPressed(Button::Left) => publish(ViewportEvent::Pressed {
                        ndc: to_ndc(pos, size),
                        aspect: aspect(size),
                        modifier: state.modifiers.shift(),
                    }),
                    MouseEvent::ButtonPressed(Button::Right) => {
                        state.orbiting = true;
                        state.last_cursor = Some(pos);
                        Some(Action::request_redraw().and_capture())
                    }
                    MouseEvent::CursorMoved { .. } if state.orbiting => {
                        let last = state.last_cursor.replace(pos).unwrap_or(pos);
                        publish(ViewportEvent::Orbit {
                            dx: pos.x - last.x,
                            dy: pos.y - last.y,
                        })
                    }
                    MouseEvent::CursorMoved { .. } => publish(ViewportEvent::Moved {
                        ndc: to_ndc(pos, size),
                        aspect: aspect(size),
                    }),
                    MouseEvent::WheelScrolled { delta } => {
                        let amount = match delta {
                            mouse::ScrollDelta::Lines { y, .. } => *y,
                            mouse::ScrollDelta::Pixels { y, .. } => *y / 120.0,
                        };
                        publish(ViewportEvent::Zoom(amount))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), to_color(BACKGROUND_COLOR));

        let proj = Projector {
            camera: self.camera,
            size: bounds.size(),
        };
        if let Some(grid) = self.scene.grid() {
            self.draw_grid(&mut frame, &proj, grid);
        }
        self.draw_solids(&mut frame, &proj);
        self.draw_handles(&mut frame, &proj);
        self.draw_preview(&mut frame, &proj);

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.orbiting {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}
