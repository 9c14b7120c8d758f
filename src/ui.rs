// ui.rs — settings panel

use crate::app::ViewerState;
use crate::geometry::GeometryMode;
use crate::model::Shading;
use crate::settings::MAX_RADIUS;
use std::f32::consts::{FRAC_PI_2, PI};
use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Upper bound offered by the subdivision slider.
pub const SUBDIVISION_SLIDER_MAX: u32 = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct FrameStats {
    pub fps: f32,
}

impl FrameStats {
    pub fn frame_ms(&self) -> f32 {
        if self.fps > 0.0 {
            1000.0 / self.fps
        } else {
            0.0
        }
    }
}

/// Window-level toggles that live outside the viewer state.
#[derive(Debug, Clone, Copy)]
pub struct PanelState {
    pub vsync: bool,
    pub wireframe_supported: bool,
}

/// Things the panel asked for that the event loop carries out.
#[derive(Debug, Default, PartialEq)]
pub struct UiActions {
    pub screenshot: bool,
    pub screenshot_as: Option<PathBuf>,
    pub vsync_changed: bool,
}

pub fn draw_ui<M>(
    ctx: &egui::Context,
    state: &mut ViewerState<M>,
    panel: &mut PanelState,
    stats: FrameStats,
) -> UiActions {
    let mut actions = UiActions::default();

    egui::Window::new("Options")
        .default_pos([5.0, 5.0])
        .default_width(340.0)
        .show(ctx, |ui| {
            ui.label(format!(
                "Application {:.3} ms/frame ({:.1} FPS)",
                stats.frame_ms(),
                stats.fps
            ));

            camera_section(ui, state);
            view_section(ui, state, panel, &mut actions);

            ui.separator();
            geometry_section(ui, state);

            ui.separator();
            lighting_section(ui, state);

            ui.separator();
            material_section(ui, state);
        });

    actions
}

fn camera_section<M>(ui: &mut egui::Ui, state: &mut ViewerState<M>) {
    let camera = &mut state.camera;

    let mut pitch = camera.pitch();
    if ui
        .add(egui::Slider::new(&mut pitch, -FRAC_PI_2..=FRAC_PI_2).text("Pitch").fixed_decimals(2))
        .changed()
    {
        camera.set_pitch(pitch);
    }

    let mut yaw = camera.yaw();
    if ui
        .add(egui::Slider::new(&mut yaw, -PI..=PI).text("Yaw").fixed_decimals(2))
        .changed()
    {
        camera.set_yaw(yaw);
    }

    let mut distance = camera.distance();
    if ui
        .add(
            egui::Slider::new(&mut distance, 0.1..=100.0)
                .text("Distance")
                .logarithmic(true)
                .fixed_decimals(2),
        )
        .changed()
    {
        camera.set_distance(distance);
    }

    if ui.button("Reset camera").clicked() {
        camera.reset();
    }
}

fn view_section<M>(
    ui: &mut egui::Ui,
    state: &mut ViewerState<M>,
    panel: &mut PanelState,
    actions: &mut UiActions,
) {
    let overlays = &mut state.overlays;

    ui.horizontal(|ui| {
        ui.checkbox(&mut overlays.show_axis, "Show axis");
        ui.checkbox(&mut overlays.show_grid, "Show grid");
    });

    ui.horizontal(|ui| {
        let wireframe = ui.checkbox(&mut overlays.wireframe, "Wireframe");
        if !panel.wireframe_supported {
            wireframe.on_hover_text("Line rendering is not supported by this GPU");
        }
        if ui.checkbox(&mut panel.vsync, "VSync").changed() {
            actions.vsync_changed = true;
        }
    });

    ui.horizontal(|ui| {
        if ui.button("Screenshot").clicked() {
            actions.screenshot = true;
        }
        if ui.button("Save as…").clicked() {
            actions.screenshot_as = rfd::FileDialog::new()
                .add_filter("PNG", &["png"])
                .set_file_name("screenshot.png")
                .save_file();
        }
    });
}

fn geometry_section<M>(ui: &mut egui::Ui, state: &mut ViewerState<M>) {
    let params = &mut state.params;
    ui.label("Geometry Settings");

    let mut mode = params.mode();
    egui::ComboBox::from_label("Mode")
        .selected_text(mode.label())
        .show_ui(ui, |ui| {
            for m in GeometryMode::ALL {
                ui.selectable_value(&mut mode, m, m.label());
            }
        });
    params.set_mode(mode);

    let min = params.min_subdivisions();
    let mut subdivisions = params.subdivisions();
    let max = SUBDIVISION_SLIDER_MAX.max(subdivisions);
    if ui
        .add(egui::Slider::new(&mut subdivisions, min..=max).text("Subdivisions"))
        .changed()
    {
        params.set_subdivisions(subdivisions);
    }

    let tube_label = if mode == GeometryMode::Torus { "Tube Radius" } else { "Radius" };
    let mut radius = params.radius();
    if ui
        .add(egui::Slider::new(&mut radius, 1..=MAX_RADIUS).text(tube_label))
        .changed()
    {
        params.set_radius(radius);
    }

    if mode == GeometryMode::Torus {
        let mut outer = params.outer_radius();
        if ui
            .add(egui::Slider::new(&mut outer, 1..=MAX_RADIUS).text("Ring Radius"))
            .changed()
        {
            params.set_outer_radius(outer);
        }
    }

    ui.label(format!("Meshes: {}", state.model.meshes().len()));
}

fn lighting_section<M>(ui: &mut egui::Ui, state: &mut ViewerState<M>) {
    let lighting = &mut state.model.lighting;
    ui.label("Lighting Settings");

    ui.horizontal(|ui| {
        ui.color_edit_button_rgb(&mut lighting.color);
        ui.label("Light Color");
    });
    drag3(ui, "Light Position", &mut lighting.position, -100.0..=100.0);
    ui.add(egui::Slider::new(&mut lighting.ambient_strength, 0.0..=1.0).text("Ambient Strength").fixed_decimals(3));
    ui.add(egui::Slider::new(&mut lighting.diffuse_strength, 0.0..=1.0).text("Diffuse Strength").fixed_decimals(3));
    ui.add(egui::Slider::new(&mut lighting.specular_strength, 0.0..=1.0).text("Specular Strength").fixed_decimals(3));
}

fn material_section<M>(ui: &mut egui::Ui, state: &mut ViewerState<M>) {
    let model = &mut state.model;
    ui.label("Material Settings");

    ui.horizontal(|ui| {
        ui.color_edit_button_rgb(&mut model.material.color);
        ui.label("Model Color");
    });
    ui.add(egui::Slider::new(&mut model.material.roughness, 0.0..=1.0).text("Roughness").fixed_decimals(3));
    ui.add(egui::Slider::new(&mut model.material.refraction, 0.0..=100.0).text("Refraction").fixed_decimals(3));

    egui::ComboBox::from_label("Shading")
        .selected_text(model.shading.label())
        .show_ui(ui, |ui| {
            for s in Shading::ALL {
                ui.selectable_value(&mut model.shading, s, s.label());
            }
        });
}

fn drag3(ui: &mut egui::Ui, label: &str, values: &mut [f32; 3], range: RangeInclusive<f32>) {
    ui.horizontal(|ui| {
        for v in values.iter_mut() {
            ui.add(egui::DragValue::new(v).clamp_range(range.clone()).speed(0.1).fixed_decimals(2));
        }
        ui.label(label);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_ms_from_fps() {
        assert_eq!(FrameStats { fps: 50.0 }.frame_ms(), 20.0);
        assert_eq!(FrameStats::default().frame_ms(), 0.0);
    }
}
