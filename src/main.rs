// main.rs — window, event loop and per-frame orchestration

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

use anyhow::Context as _;
use clap::Parser;
use sphere_viewer::app::{InputEvent, ViewerState};
use sphere_viewer::camera::PointerButton;
use sphere_viewer::cli::Cli;
use sphere_viewer::config::ViewerConfig;
use sphere_viewer::renderer::{GpuMesh, Renderer};
use sphere_viewer::screenshot;
use sphere_viewer::ui::{self, FrameStats, PanelState, UiActions};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let (mut config, source) = ViewerConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    match &source {
        Some(path) => log::info!("config loaded from {}", path.display()),
        None => log::info!("no config file found, using defaults"),
    }

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.window.title)
            .with_inner_size(LogicalSize::new(config.window.width, config.window.height))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone(), config.window.vsync))?;
    let mut state: ViewerState<GpuMesh> = ViewerState::new(&config);
    state.set_viewport(renderer.size.width, renderer.size.height);

    let mut panel = PanelState {
        vsync: config.window.vsync,
        wireframe_supported: renderer.wireframe_supported(),
    };
    let screenshot_dir = config.screenshot_dir.clone();
    let mut is_fullscreen = false;

    // FPS 计算
    let mut last_frame_time = Instant::now();
    let mut frame_count = 0;
    let mut stats = FrameStats::default();

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件; a release still ends a drag started on the scene
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                let is_release = matches!(
                    event,
                    WindowEvent::MouseInput { state: ElementState::Released, .. }
                );
                if response.consumed && !is_release {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                        state.set_viewport(renderer.size.width, renderer.size.height);
                    }

                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        renderer.resize(*new_inner_size);
                        state.set_viewport(renderer.size.width, renderer.size.height);
                    }

                    WindowEvent::KeyboardInput { input, .. } => {
                        let pressed = input.state == ElementState::Pressed;
                        if pressed {
                            match input.virtual_keycode {
                                Some(VirtualKeyCode::F11) => {
                                    is_fullscreen = !is_fullscreen;
                                    if is_fullscreen {
                                        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                                    } else {
                                        window.set_fullscreen(None);
                                    }
                                }
                                Some(VirtualKeyCode::F12) => {
                                    let path = screenshot::timestamped_path(&screenshot_dir);
                                    take_screenshot(&mut renderer, &state, &path);
                                }
                                _ => {}
                            }
                        }
                        state.handle_input(InputEvent::Key {
                            code: input.scancode,
                            pressed,
                        });
                    }

                    WindowEvent::ReceivedCharacter(c) => {
                        state.handle_input(InputEvent::Char(c));
                    }

                    WindowEvent::MouseInput { state: button_state, button, .. } => {
                        state.handle_input(InputEvent::Button {
                            button: pointer_button(button),
                            pressed: button_state == ElementState::Pressed,
                        });
                    }

                    WindowEvent::CursorMoved { position, .. } => {
                        state.handle_input(InputEvent::CursorMoved {
                            x: position.x as f32,
                            y: position.y as f32,
                        });
                    }

                    WindowEvent::MouseWheel { delta, .. } => {
                        let (dx, dy) = match delta {
                            MouseScrollDelta::LineDelta(x, y) => (x, y),
                            MouseScrollDelta::PixelDelta(pos) => {
                                (pos.x as f32 / 20.0, pos.y as f32 / 20.0)
                            }
                        };
                        state.handle_input(InputEvent::Scroll { dx, dy });
                    }

                    _ => {}
                }
            }

            Event::RedrawRequested(_) => {
                // FPS 统计
                frame_count += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(last_frame_time).as_secs_f32();
                if elapsed >= 1.0 {
                    stats.fps = frame_count as f32 / elapsed;
                    frame_count = 0;
                    last_frame_time = now;
                }

                let mut actions = UiActions::default();
                let render_result = renderer.render_with_ui(&window, &mut state, |ctx, state| {
                    actions = ui::draw_ui(ctx, state, &mut panel, stats);
                });

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("GPU out of memory, exiting");
                        *control_flow = ControlFlow::Exit;
                    }
                    Err(e) => log::warn!("render error: {e:?}"),
                }

                if actions.vsync_changed {
                    renderer.set_vsync(panel.vsync);
                }
                if actions.screenshot {
                    let path = screenshot::timestamped_path(&screenshot_dir);
                    take_screenshot(&mut renderer, &state, &path);
                }
                if let Some(path) = actions.screenshot_as {
                    take_screenshot(&mut renderer, &state, &with_png_extension(path));
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

fn init_logging() {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder
        .filter_module("wgpu_core", log::LevelFilter::Warn)
        .filter_module("wgpu_hal", log::LevelFilter::Warn);

    // Release 模式下没有控制台, 日志写入临时目录
    #[cfg(all(windows, not(debug_assertions)))]
    if let Ok(file) = std::fs::File::create(sphere_viewer::config::log_file_path()) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
}

fn pointer_button(button: MouseButton) -> PointerButton {
    match button {
        MouseButton::Left => PointerButton::Primary,
        MouseButton::Right => PointerButton::Secondary,
        MouseButton::Middle => PointerButton::Middle,
        MouseButton::Other(id) => PointerButton::Other(id),
    }
}

fn with_png_extension(mut path: PathBuf) -> PathBuf {
    if path.extension().is_none() {
        path.set_extension("png");
    }
    path
}

fn take_screenshot(renderer: &mut Renderer, state: &ViewerState<GpuMesh>, path: &Path) {
    let result = renderer
        .capture(state)
        .and_then(|image| screenshot::save_png(&image, path));
    match result {
        Ok(()) => log::info!("screenshot saved to {}", path.display()),
        Err(e) => log::error!("screenshot failed: {e}"),
    }
}
