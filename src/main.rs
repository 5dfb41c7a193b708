use std::any::Any;
use std::env;
use std::fmt;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use log::{error, info, warn};
use pollster::block_on;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use isometric::app::{advance_camera, camera_for_level, level_summary, render_headless};
use isometric::mesh::marker_vertices;
use isometric::{
    Camera, InputState, KeyCode, Level, LitVertex, RenderConfig, Renderer, SceneGeometry,
};

const USAGE: &str = "Usage: isometric <level.xml> [--config <file.toml>] [--ascii] \
[--summary-only] [--render-to <out.png>] [--size <W>x<H>]";

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse(env::args().skip(1))?;
    let config = match &options.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    let text = fs::read_to_string(&options.path)
        .with_context(|| format!("failed to read level {}", options.path.display()))?;
    let level = Level::from_xml(&text)
        .with_context(|| format!("failed to parse level {}", options.path.display()))?;

    println!("{}", level_summary(&level));
    let size = options
        .size
        .unwrap_or((config.window.width, config.window.height));

    if options.ascii {
        print!("{}", level.to_ascii());
        return Ok(());
    }
    if options.summary_only {
        return Ok(());
    }
    if let Some(path) = &options.render_to {
        render_headless(&level, &config, size, path)?;
        println!("Wrote {}", path.display());
        return Ok(());
    }

    match run_interactive(level, config, size) {
        Ok(()) => Ok(()),
        Err(err) => {
            if err.downcast_ref::<WindowInitError>().is_some() {
                eprintln!(
                    "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                );
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn run_interactive(level: Level, config: RenderConfig, (width, height): (u32, u32)) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let mut event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("isometric")
            .with_inner_size(PhysicalSize::new(width.max(1), height.max(1)))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let (floor, wall) = config.load_textures()?;
    let mut renderer = block_on(Renderer::new(Arc::clone(&window), &config, &floor, &wall))?;
    let camera = camera_for_level(&level, renderer.aspect_ratio(), &config);
    let geometry = SceneGeometry::build(&level, &camera);
    renderer.set_level_geometry(&geometry.floor, &geometry.walls);
    info!("level mesh ready: {} triangles", geometry.triangle_count());

    let mut app = AppState {
        renderer,
        markers: geometry.markers,
        level,
        config,
        camera,
        input: InputState::new(),
        last_frame: Instant::now(),
        last_error: None,
    };

    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    match app.last_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct AppState {
    renderer: Renderer,
    level: Level,
    config: RenderConfig,
    camera: Camera,
    // rebuilt when the camera moves; their depth follows it
    markers: Vec<LitVertex>,
    input: InputState,
    last_frame: Instant,
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
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.resize(*size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.resize(**new_inner_size);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input);
                        if self.input.is_key_down(KeyCode::Escape) {
                            control_flow.set_exit();
                        }
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                let now = Instant::now();
                let dt = now.duration_since(self.last_frame).as_secs_f32();
                self.last_frame = now;
                if advance_camera(&mut self.camera, &self.input, dt, &self.config.camera) {
                    self.markers = marker_vertices(&self.level, &self.camera);
                }

                self.renderer
                    .update_uniforms(&self.camera, &self.config.shading());
                if let Err(err) = self.renderer.render(&self.markers) {
                    match err {
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                            warn!("surface {err}; reconfiguring");
                            let size = self.renderer.window().inner_size();
                            self.renderer.resize(size);
                        }
                        wgpu::SurfaceError::OutOfMemory => {
                            error!("surface out of memory");
                            return Err(anyhow!("GPU is out of memory"));
                        }
                        wgpu::SurfaceError::Timeout => {
                            info!("Surface timeout; retrying next frame");
                        }
                    }
                }
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.renderer.resize(size);
        self.camera.set_aspect_ratio(self.renderer.aspect_ratio());
    }

    fn handle_keyboard(&mut self, input: &KeyboardInput) {
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return;
        };
        match input.state {
            ElementState::Pressed => self.input.set_key_down(keycode),
            ElementState::Released => self.input.set_key_up(keycode),
        }
    }
}

fn map_keycode(code: winit::event::VirtualKeyCode) -> Option<KeyCode> {
    use winit::event::VirtualKeyCode as Key;
    Some(match code {
        Key::Left => KeyCode::Left,
        Key::Right => KeyCode::Right,
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::PageUp => KeyCode::PageUp,
        Key::PageDown => KeyCode::PageDown,
        Key::Escape => KeyCode::Escape,
        Key::W => KeyCode::character('w'),
        Key::A => KeyCode::character('a'),
        Key::S => KeyCode::character('s'),
        Key::D => KeyCode::character('d'),
        Key::Q => KeyCode::character('q'),
        Key::E => KeyCode::character('e'),
        _ => return None,
    })
}

struct CliOptions {
    path: PathBuf,
    config: Option<PathBuf>,
    ascii: bool,
    summary_only: bool,
    render_to: Option<PathBuf>,
    size: Option<(u32, u32)>,
}

impl CliOptions {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();
        let Some(path) = args.next() else {
            return Err(anyhow!(USAGE));
        };
        let mut options = Self {
            path: PathBuf::from(path),
            config: None,
            ascii: false,
            summary_only: false,
            render_to: None,
            size: None,
        };
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ascii" => options.ascii = true,
                "--summary-only" => options.summary_only = true,
                "--config" => options.config = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--render-to" => {
                    options.render_to = Some(PathBuf::from(value(&mut args, &arg)?));
                }
                "--size" => options.size = Some(parse_size(&value(&mut args, &arg)?)?),
                other => {
                    return Err(anyhow!("Unknown argument: {other}. {USAGE}"));
                }
            }
        }
        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} expects a value. {USAGE}"))
}

fn parse_size(text: &str) -> Result<(u32, u32)> {
    let parsed = text.split_once(['x', 'X']).and_then(|(w, h)| {
        Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?))
    });
    match parsed {
        Some((w, h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(anyhow!("invalid size '{text}', expected <W>x<H>")),
    }
}
