// app.rs — viewer state and input dispatch

use crate::camera::{OrbitCamera, PointerButton};
use crate::config::ViewerConfig;
use crate::mesh::Mesh;
use crate::model::Model;
use crate::settings::GenerationParams;
use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overlays {
    pub show_axis: bool,
    pub show_grid: bool,
    pub wireframe: bool,
}

/// Input as delivered by the window layer, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    CursorMoved { x: f32, y: f32 },
    Button { button: PointerButton, pressed: bool },
    Scroll { dx: f32, dy: f32 },
    Key { code: u32, pressed: bool },
    Char(char),
}

/// Everything the render loop and the settings panel mutate, owned in one
/// place. `M` is the mesh handle held by the model.
#[derive(Debug)]
pub struct ViewerState<M> {
    pub camera: OrbitCamera,
    pub overlays: Overlays,
    pub params: GenerationParams,
    pub model: Model<M>,
    pub viewport: Vec2,
}

impl<M> ViewerState<M> {
    pub fn new(config: &ViewerConfig) -> Self {
        let mut model = Model::default();
        model.lighting = config.lighting;
        model.material = config.material;
        model.shading = config.shading;

        Self {
            camera: OrbitCamera::new(config.camera.pitch, config.camera.yaw, config.camera.distance),
            overlays: config.overlays,
            params: config.geometry.params(),
            model,
            viewport: Vec2::new(config.window.width as f32, config.window.height as f32),
        }
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width as f32, height as f32);
    }

    pub fn aspect(&self) -> f32 {
        if self.viewport.y > 0.0 {
            self.viewport.x / self.viewport.y
        } else {
            1.0
        }
    }

    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::CursorMoved { x, y } => {
                self.camera.on_cursor_moved(Vec2::new(x, y), self.viewport)
            }
            InputEvent::Button { button, pressed } => self.camera.on_button(button, pressed),
            InputEvent::Scroll { dy, .. } => self.camera.on_scroll(dy),
            // accepted, not bound to anything yet
            InputEvent::Key { .. } | InputEvent::Char(_) => {}
        }
    }

    /// Rebuilds the model's meshes if any generation parameter changed since
    /// the last call. `upload` turns CPU meshes into the model's handle type.
    /// Returns whether a rebuild happened.
    pub fn regenerate_if_dirty(&mut self, upload: impl FnMut(Mesh) -> M) -> bool {
        self.params.enforce_minimum();
        if !self.params.take_dirty() {
            return false;
        }

        let meshes = self.params.generate();
        log::debug!(
            "regenerating {:?}: subdiv={} radius={} meshes={} vertices={} indices={}",
            self.params.mode(),
            self.params.subdivisions(),
            self.params.radius(),
            meshes.len(),
            meshes.iter().map(|m| m.vertices.len()).sum::<usize>(),
            meshes.iter().map(|m| m.indices.len()).sum::<usize>(),
        );
        self.model.replace_meshes(meshes.into_iter().map(upload));
        true
    }
}
