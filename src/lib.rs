//! Procedural sphere viewer.
//!
//! The CPU side (mesh generation, orbit camera, generation parameters, scene
//! model) has no GPU dependency and is usable on its own; `renderer` and `ui`
//! put it on screen with wgpu and egui.

pub mod app;
pub mod camera;
pub mod cli;
pub mod config;
pub mod geometry;
pub mod mesh;
pub mod model;
pub mod overlay;
pub mod renderer;
pub mod screenshot;
pub mod settings;
pub mod ui;
