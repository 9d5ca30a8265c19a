use std::any::Any;
use std::env;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

use circuit_scene::{
    max_texture_dimension, projection_matrix, CameraControls, InputState, KeyCode, NamedKey,
    Renderer, Settings, Simulation, TextureSet, TextureSlot,
};

const HEADLESS_FRAME_TIME: f32 = 1.0 / 60.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let mut settings = match &options.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(root) = options.assets.clone() {
        settings.asset_root = root;
    }

    let textures = TextureSet::load(&settings.asset_root, max_texture_dimension());
    println!(
        "Loaded {}/{} textures from {}",
        textures.loaded_count(),
        TextureSlot::ALL.len(),
        settings.asset_root.display()
    );

    if options.summary_only {
        return run_headless(&settings, options.frames);
    }

    match run_interactive(settings.clone(), textures) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or WAYLAND_DISPLAY to enable rendering)."
                );
                run_headless(&settings, options.frames)
            } else {
                Err(err)
            }
        }
    }
}

/// Steps the simulation with a fixed frame time and no input.
fn run_headless(settings: &Settings, frames: u32) -> Result<()> {
    let mut simulation = Simulation::new(settings);
    let controls = CameraControls::default();
    let mut draws = 0;
    for _ in 0..frames {
        draws = simulation.step(&controls, HEADLESS_FRAME_TIME).len();
    }
    println!("Simulated {frames} frame(s), {draws} draw(s) per frame");
    println!("{}", simulation.summary());
    Ok(())
}

fn run_interactive(settings: Settings, textures: TextureSet) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = AppState {
        simulation: Simulation::new(&settings),
        settings,
        textures,
        input: InputState::new(),
        renderer: None,
        last_frame: None,
        last_error: None,
    };
    event_loop
        .run_app(&mut app)
        .context("event loop terminated abnormally")?;

    match app.last_error {
        Some(err) => Err(err),
        None => {
            println!("{}", app.simulation.summary());
            Ok(())
        }
    }
}

struct AppState {
    settings: Settings,
    textures: TextureSet,
    input: InputState,
    simulation: Simulation,
    renderer: Option<Renderer>,
    last_frame: Option<Instant>,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug)]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

impl fmt::Display for WindowInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for WindowInitError {}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn create_renderer(&mut self, event_loop: &ActiveEventLoop) -> Result<Renderer> {
        let attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(LogicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));
        let window = event_loop
            .create_window(attributes)
            .map_err(|err| WindowInitError::from_error("window", err))?;

        apply_cursor_capture(&window, true);

        let projection = projection_matrix(&self.settings);
        block_on(Renderer::new(Arc::new(window), &self.textures, projection))
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        self.last_error = Some(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if CameraControls::quit_requested(&self.input) {
            event_loop.exit();
            return Ok(());
        }

        let now = Instant::now();
        let dt = self
            .last_frame
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        let controls = CameraControls::from_input(&self.input);
        let draws = self.simulation.step(&controls, dt);

        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(());
        };
        if let Err(err) = renderer.render(&draws) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    renderer.reconfigure();
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
                other => {
                    warn!("skipping frame: {other}");
                }
            }
        }
        Ok(())
    }

    fn handle_keyboard(&self, event: &KeyEvent) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(keycode) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed => self.input.set_key_down(keycode),
            ElementState::Released => self.input.set_key_up(keycode),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.renderer.is_some() {
            return;
        }
        match self.create_renderer(event_loop) {
            Ok(renderer) => {
                info!("renderer ready");
                self.renderer = Some(renderer);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if window_id != renderer.window_id() {
            return;
        }
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => renderer.resize(size),
            WindowEvent::Focused(focused) => {
                apply_cursor_capture(renderer.window(), focused);
                self.input.release_all();
            }
            WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(&event),
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input
                .add_mouse_motion(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = self.renderer.as_ref() {
            renderer.window().request_redraw();
        }
    }
}

/// Cursor visibility and the grab modes to try, in order, for a focus
/// state. The cursor is only captured while the window has focus.
fn cursor_capture(focused: bool) -> (bool, &'static [CursorGrabMode]) {
    if focused {
        (false, &[CursorGrabMode::Confined, CursorGrabMode::Locked])
    } else {
        (true, &[CursorGrabMode::None])
    }
}

fn apply_cursor_capture(window: &Window, focused: bool) {
    let (visible, grab_modes) = cursor_capture(focused);
    window.set_cursor_visible(visible);
    let mut last_err = None;
    for &mode in grab_modes {
        match window.set_cursor_grab(mode) {
            Ok(()) => return,
            Err(err) => last_err = Some(err),
        }
    }
    if let Some(err) = last_err {
        warn!("cursor grab {grab_modes:?} unavailable: {err}");
    }
}

fn map_keycode(code: winit::keyboard::KeyCode) -> Option<KeyCode> {
    use winit::keyboard::KeyCode as Key;
    Some(match code {
        Key::Escape => KeyCode::Named(NamedKey::Escape),
        Key::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        Key::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        Key::Digit0 => KeyCode::Digit(0),
        Key::Digit1 => KeyCode::Digit(1),
        Key::Digit2 => KeyCode::Digit(2),
        Key::KeyW => KeyCode::W,
        Key::KeyA => KeyCode::A,
        Key::KeyS => KeyCode::S,
        Key::KeyD => KeyCode::D,
        _ => return None,
    })
}

struct CliOptions {
    config: Option<PathBuf>,
    assets: Option<PathBuf>,
    summary_only: bool,
    frames: u32,
}

impl CliOptions {
    const USAGE: &'static str =
        "Usage: circuit-scene [--config <settings.xml>] [--assets <dir>] [--summary-only] [--frames <n>]";

    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut options = Self {
            config: None,
            assets: None,
            summary_only: false,
            frames: 60,
        };
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config = Some(next_value(&mut args, &arg)?.into()),
                "--assets" => options.assets = Some(next_value(&mut args, &arg)?.into()),
                "--summary-only" => options.summary_only = true,
                "--frames" => {
                    let value = next_value(&mut args, &arg)?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value}"))?;
                }
                "--help" | "-h" => return Err(anyhow!(Self::USAGE)),
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {}", Self::USAGE));
                }
            }
        }
        Ok(options)
    }
}

fn next_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {}", CliOptions::USAGE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions> {
        CliOptions::parse_from(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn defaults_to_interactive() {
        let options = parse(&[]).unwrap();
        assert!(!options.summary_only);
        assert_eq!(options.frames, 60);
        assert!(options.config.is_none());
    }

    #[test]
    fn reads_flag_values() {
        let options = parse(&["--assets", "data", "--summary-only", "--frames", "5"]).unwrap();
        assert_eq!(options.assets, Some(PathBuf::from("data")));
        assert!(options.summary_only);
        assert_eq!(options.frames, 5);
    }

    #[test]
    fn rejects_missing_value_and_unknown_flags() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--frames", "many"]).is_err());
        assert!(parse(&["--fullscreen"]).is_err());
    }

    #[test]
    fn maps_movement_keys() {
        use winit::keyboard::KeyCode as Key;
        assert_eq!(map_keycode(Key::KeyW), Some(KeyCode::W));
        assert_eq!(map_keycode(Key::ShiftRight), Some(KeyCode::Named(NamedKey::RightShift)));
        assert_eq!(map_keycode(Key::KeyQ), None);
    }

    #[test]
    fn cursor_is_captured_only_while_focused() {
        let (visible, grabs) = cursor_capture(true);
        assert!(!visible);
        assert_eq!(grabs, &[CursorGrabMode::Confined, CursorGrabMode::Locked]);

        let (visible, grabs) = cursor_capture(false);
        assert!(visible);
        assert_eq!(grabs, &[CursorGrabMode::None]);
    }

    #[test]
    fn maps_mode_reset_and_quit_keys() {
        use winit::keyboard::KeyCode as Key;
        assert_eq!(map_keycode(Key::Digit0), Some(KeyCode::Digit(0)));
        assert_eq!(map_keycode(Key::Digit1), Some(KeyCode::Digit(1)));
        assert_eq!(map_keycode(Key::Digit2), Some(KeyCode::Digit(2)));
        assert_eq!(map_keycode(Key::Escape), Some(KeyCode::Named(NamedKey::Escape)));
        assert_eq!(map_keycode(Key::Digit3), None);
    }
}
