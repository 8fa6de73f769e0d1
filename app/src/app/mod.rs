use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use neurobg::{Config, DeviceClass, DrawList, FrameInput, Point, Simulation, StepOutcome};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::ActiveEventLoop,
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};
use winit_input_manager::InputManager;

use crate::app::render::Canvas;

pub mod render;

/// Points at a TOML file overriding the device preset.
pub const CONFIG_ENV: &str = "NEUROBG_CONFIG";

const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Creates the [`App`] once the event loop hands out a window.
#[derive(Default)]
pub struct Handler {
    app: Option<App>,
}

impl ApplicationHandler for Handler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_some() {
            return;
        }
        match App::new(event_loop) {
            Ok(app) => self.app = Some(app),
            Err(e) => {
                tracing::error!("could not open window: {e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            app.window_event(event_loop, window_id, event);
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(app) = &mut self.app {
            app.device_event(event_loop, device_id, event);
        }
    }
}

pub struct App {
    input: InputManager,
    /// `None` when no surface could be created; nothing is ever drawn then.
    canvas: Option<Canvas>,
    /// Built on the first non-zero size.
    simulation: Option<Simulation>,
    draw_list: DrawList,
    config: Config,
    device: DeviceClass,

    pointer: Option<Point>,
    user_paused: bool,
    pause_key_down: bool,
    visibility: Visibility,

    last_stats: Instant,
    window: Arc<Window>,
}

impl App {
    pub fn new(event_loop: &ActiveEventLoop) -> Result<Self, winit::error::OsError> {
        let window = Arc::new(Self::create_window(event_loop)?);
        let width = window.inner_size().to_logical::<f32>(window.scale_factor()).width;
        let device = DeviceClass::from_viewport_width(width);
        let config = load_config(device);
        tracing::info!(?device, width, "starting");

        let canvas = match Canvas::new(window.clone(), config.palette.background) {
            Ok(canvas) => Some(canvas),
            Err(e) => {
                tracing::warn!("no drawing surface, animation disabled: {e}");
                None
            }
        };

        let mut app = Self {
            input: InputManager::new(),
            canvas,
            simulation: None,
            draw_list: DrawList::new(),
            config,
            device,
            pointer: None,
            user_paused: false,
            pause_key_down: false,
            visibility: Visibility::default(),
            last_stats: Instant::now(),
            window,
        };
        app.resize(app.window.inner_size());
        Ok(app)
    }

    pub fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        self.input.process_window_event(&event);
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::Occluded(occluded) => {
                self.visibility.occluded = occluded;
                if self.visibility.is_shown() {
                    self.window.request_redraw();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let logical = position.to_logical::<f32>(self.window.scale_factor());
                self.pointer = Some(Point::new(logical.x, logical.y));
            }
            WindowEvent::CursorLeft { .. } => {
                self.pointer = None;
            }
            WindowEvent::KeyboardInput { .. } => {
                self.handle_keys(event_loop);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    pub fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.input.process_device_event(&event);
    }

    fn create_window(event_loop: &ActiveEventLoop) -> Result<Window, winit::error::OsError> {
        event_loop.create_window(WindowAttributes::default().with_title("Neurobg"))
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.visibility.set_size(size);
        if self.visibility.minimized {
            return;
        }
        let Some(canvas) = &mut self.canvas else {
            return;
        };
        canvas.resize(size.width, size.height);

        let logical = size.to_logical::<f32>(self.window.scale_factor());
        match &mut self.simulation {
            Some(simulation) => simulation.resize(logical.width, logical.height),
            None => {
                self.simulation = start_simulation(
                    self.config.clone(),
                    self.device,
                    logical.width,
                    logical.height,
                );
            }
        }
        if self.visibility.is_shown() {
            self.window.request_redraw();
        }
    }

    fn handle_keys(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.is_logical_key_pressed(Key::Named(NamedKey::Escape)) {
            event_loop.exit();
            return;
        }

        let pause_down = self.input.is_logical_key_pressed(Key::Character("p".into()));
        if pause_down && !self.pause_key_down {
            self.user_paused = !self.user_paused;
            tracing::info!(paused = self.user_paused, "toggled pause");
        }
        self.pause_key_down = pause_down;
    }

    fn redraw(&mut self) {
        let (Some(canvas), Some(simulation)) = (&mut self.canvas, &mut self.simulation) else {
            return;
        };

        let input = FrameInput {
            pointer: self.pointer,
            paused: self.user_paused || !self.visibility.is_shown(),
            scroll_offset: 0.0,
        };
        self.draw_list.clear();
        if simulation.step(&input, &mut self.draw_list) == StepOutcome::Advanced {
            canvas.upload(&self.draw_list);
        }
        canvas.render();

        if self.last_stats.elapsed() >= STATS_INTERVAL {
            self.last_stats = Instant::now();
            let stats = simulation.stats();
            tracing::debug!(
                frame = stats.frame,
                phase = %stats.phase,
                signals = stats.signals,
                particles = stats.particles,
                winner = ?stats.winner,
                output_deliveries = stats.output_deliveries,
                "simulation"
            );
        }

        if self.visibility.is_shown() {
            self.window.request_redraw();
        }
    }
}

/// Minimizing and occlusion are reported separately and either one hides
/// the window.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Visibility {
    /// Zero-sized, which is how minimized windows report
    minimized: bool,
    occluded: bool,
}

impl Visibility {
    fn set_size(&mut self, size: PhysicalSize<u32>) {
        self.minimized = size.width == 0 || size.height == 0;
    }

    fn is_shown(&self) -> bool {
        !self.minimized && !self.occluded
    }
}

fn start_simulation(
    config: Config,
    device: DeviceClass,
    width: f32,
    height: f32,
) -> Option<Simulation> {
    match Simulation::new(config, device, width, height) {
        Ok(simulation) => Some(simulation),
        Err(e) => {
            tracing::error!("could not start simulation: {e}");
            None
        }
    }
}

/// Device preset, overridden by the file in `NEUROBG_CONFIG` if set.
pub fn load_config(device: DeviceClass) -> Config {
    let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) else {
        return Config::for_device(device);
    };
    match Config::load(&path, device) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config");
            config
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring config: {e}");
            Config::for_device(device)
        }
    }
}
