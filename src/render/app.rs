//! Window + event loop runner for the text viewer.
//!
//! `run` creates the winit event loop; the window and the `Viewer` are built on the first
//! `resumed` (the GPU surface needs a live window). Escape or closing the window exits.

use std::sync::Arc;

use anyhow::Context as _;
use log::{error, info};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{WindowAttributes, WindowId},
};

use crate::render::viewer::{Viewer, ViewerScene};

/// Runner configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    /// `Poll` keeps the turntable moving.
    pub control_flow: ControlFlow,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "relief".to_string(),
            control_flow: ControlFlow::Poll,
        }
    }
}

/// Open a window and show `scene` until the user quits.
///
/// Viewer setup failures (no GPU adapter, unreadable font) end the loop and are
/// returned here.
pub fn run(config: AppConfig, scene: ViewerScene) -> anyhow::Result<()> {
    let event_loop = EventLoop::new().context("winit: failed to create EventLoop")?;
    event_loop.set_control_flow(config.control_flow);

    let mut app = App {
        config,
        scene: Some(scene),
        viewer: None,
        setup_error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("winit: run_app failed")?;

    match app.setup_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: AppConfig,
    /// Consumed when the viewer is built.
    scene: Option<ViewerScene>,
    viewer: Option<Viewer>,
    setup_error: Option<anyhow::Error>,
}

impl App {
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        // Glyph buffers go before the device that owns them.
        self.viewer = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.viewer.is_some() {
            return;
        }
        let Some(scene) = self.scene.take() else {
            return;
        };

        let window = Arc::new(
            event_loop
                .create_window(WindowAttributes::default().with_title(self.config.title.as_str()))
                .expect("winit: failed to create window"),
        );

        match pollster::block_on(Viewer::new(window, scene)) {
            Ok(viewer) => {
                viewer.request_redraw();
                self.viewer = Some(viewer);
            }
            Err(e) => {
                self.setup_error = Some(e.context("viewer setup failed"));
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };

        match event {
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                info!("Escape pressed; exiting");
                self.shut_down(event_loop);
            }
            WindowEvent::CloseRequested => {
                info!("Close requested; exiting");
                self.shut_down(event_loop);
            }
            WindowEvent::Resized(size) => {
                viewer.resize(size);
                viewer.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = viewer.render() {
                    error!("render error: {:#}", err);
                }
            }
            _ => {}
        }
    }
}
