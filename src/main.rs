mod camera;
mod collision;
mod command;
mod config;
mod game;
mod gfx;
mod input;
mod level;
mod math;
mod mesh;
mod player;
mod render;
mod scene;
mod ui;

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use glam::Vec2;
use log::{debug, error, info, warn};

use winit::dpi::LogicalSize;
use winit::event::MouseScrollDelta;
use winit::window::{Fullscreen, Window};
use winit::{
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

use camera::Projection;
use command::UiCommand;
use config::GameConfig;
use game::Game;
use gfx::Gfx;
use input::{InputEvent, InputState, Key};
use ui::{Screen, UiManager};

// ticks simulated at most per wakeup before the clock is reset
const MAX_CATCH_UP: u32 = 5;
// pixels per scroll step on touchpads
const PIXELS_PER_STEP: f32 = 40.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load()?;
    info!(
        "starting {} at {}x{}",
        config.window.title, config.window.width, config.window.height
    );

    let event_loop = EventLoop::new().context("create event loop")?;

    let mut builder = WindowBuilder::new()
        .with_title(config.window.title.clone())
        .with_inner_size(LogicalSize::new(config.window.width, config.window.height));
    if config.window.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = Arc::new(builder.build(&event_loop).context("create window")?);

    let gfx = pollster::block_on(Gfx::new(window.clone(), config.window.background))?;

    let mut app = App::new(window, gfx, config)?;

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::WaitUntil(app.next_tick));

            match event {
                Event::WindowEvent { event, .. } => app.window_event(event, elwt),
                Event::AboutToWait => app.about_to_wait(elwt),
                _ => {}
            }
        })
        .context("run event loop")?;

    Ok(())
}

/// The window shell: turns winit events into input events, drives fixed ticks
/// and forwards menu commands.
struct App {
    window: Arc<Window>,
    gfx: Gfx,
    game: Game,
    ui: UiManager,
    input: InputState,
    projection: Projection,

    pending: Vec<InputEvent>,
    pointer: Option<Vec2>,

    tick_dt: Duration,
    next_tick: Instant,
}

impl App {
    fn new(window: Arc<Window>, gfx: Gfx, config: GameConfig) -> Result<Self> {
        let tick_dt = Duration::from_secs_f32(config.simulation.tick_dt());
        let game = Game::new(config)?;
        let ui = UiManager::new(game.level_names());

        let app = Self {
            window,
            gfx,
            game,
            ui,
            input: InputState::default(),
            projection: Projection::default(),
            pending: Vec::new(),
            pointer: None,
            tick_dt,
            next_tick: Instant::now() + tick_dt,
        };
        app.update_title();
        Ok(app)
    }

    fn window_event(&mut self, event: WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        match event {
            WindowEvent::CloseRequested => elwt.exit(),

            WindowEvent::Resized(size) => self.gfx.resize(size),

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = self.window.inner_size();
                self.gfx.resize(size);
            }

            WindowEvent::RedrawRequested => self.redraw(elwt),

            WindowEvent::KeyboardInput { event, .. } => {
                if event.repeat {
                    return;
                }
                let PhysicalKey::Code(code) = event.physical_key else {
                    return;
                };
                let Some(key) = map_key(code) else {
                    return;
                };
                self.pending.push(match event.state {
                    ElementState::Pressed => InputEvent::Pressed(key),
                    ElementState::Released => InputEvent::Released(key),
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                let size = self.window.inner_size();
                if size.width == 0 || size.height == 0 {
                    return;
                }
                // [-1, 1] on both axes, +y up
                let x = (position.x as f32 / size.width as f32) * 2.0 - 1.0;
                let y = 1.0 - (position.y as f32 / size.height as f32) * 2.0;
                self.pointer = Some(Vec2::new(x, y));
                self.pending.push(InputEvent::PointerMoved { x, y });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_STEP,
                };
                if steps != 0.0 {
                    self.pending.push(InputEvent::Scroll(steps));
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, elwt: &EventLoopWindowTarget<()>) {
        let now = Instant::now();
        if now < self.next_tick {
            return;
        }

        let mut steps = 0;
        while self.next_tick <= now && steps < MAX_CATCH_UP {
            self.step(elwt);
            self.next_tick += self.tick_dt;
            steps += 1;
        }
        if self.next_tick <= now {
            warn!("simulation fell behind, skipping {:?}", now - self.next_tick);
            self.next_tick = now + self.tick_dt;
        }

        self.window.request_redraw();
    }

    /// One fixed tick: drain the events gathered since the last one and hand
    /// them to either the menu or the simulation.
    fn step(&mut self, elwt: &EventLoopWindowTarget<()>) {
        let events = std::mem::take(&mut self.pending);
        let frame = self.input.accumulate(&events);

        if frame.exit {
            info!("exit requested after {} ticks", self.game.ticks());
            elwt.exit();
            return;
        }

        if self.ui.is_visible() {
            if let Some(p) = frame.pointer {
                self.game.sync_pointer(p);
            }
            let commands = self.ui.handle_keys(&frame.pressed);
            if !commands.is_empty() || !frame.pressed.is_empty() {
                self.update_title();
            }
            for cmd in commands {
                self.apply(cmd, elwt);
            }
            return;
        }

        if frame.pressed.contains(&Key::Back) {
            self.game.unload_level();
            self.input.reset();
            self.ui.show(Screen::MainMenu);
            self.update_title();
            return;
        }

        self.game.tick(self.tick_dt.as_secs_f32(), &frame);
    }

    fn apply(&mut self, cmd: UiCommand, elwt: &EventLoopWindowTarget<()>) {
        match cmd {
            UiCommand::StartLevel(name) => {
                if let Err(err) = self.game.load_level(&name) {
                    error!("{err:#}");
                    elwt.exit();
                    return;
                }
                self.input.reset();
                if let Some(p) = self.pointer {
                    self.game.sync_pointer(p);
                }
                self.update_title();
            }
            UiCommand::SetResolution { width, height } => {
                let _ = self.window.request_inner_size(LogicalSize::new(width, height));
            }
            UiCommand::ToggleFullscreen => {
                let next = match self.window.fullscreen() {
                    Some(_) => None,
                    None => Some(Fullscreen::Borderless(None)),
                };
                self.window.set_fullscreen(next);
            }
            UiCommand::MusicVolume(v) => debug!("music volume {v:.0}"),
            UiCommand::SfxVolume(v) => debug!("sfx volume {v:.0}"),
            UiCommand::Exit => elwt.exit(),
        }
    }

    /// No text rendering yet, so the focused widget is named in the title bar.
    fn update_title(&self) {
        let title = &self.game.config().window.title;
        match (self.ui.focused(), self.game.level()) {
            (Some(w), _) if self.ui.is_visible() => {
                self.window.set_title(&format!("{title} - {}", w.caption()));
            }
            (_, Some(level)) => self.window.set_title(&format!("{title} - {}", level.name())),
            _ => self.window.set_title(title),
        }
    }

    fn redraw(&mut self, elwt: &EventLoopWindowTarget<()>) {
        let size = self.gfx.size;
        let view_proj =
            self.projection
                .view_proj(self.game.camera_transform(), size.width, size.height);
        self.gfx.set_camera(view_proj, &self.game.scene().lighting);

        let (verts, inds) = render::scene_mesh(self.game.scene());
        self.gfx.set_scene_mesh(&verts, &inds);

        let (verts, inds) = render::menu_mesh(&self.ui, self.gfx.aspect());
        self.gfx.set_overlay_mesh(&verts, &inds);

        match self.gfx.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.window.inner_size();
                self.gfx.resize(size);
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("out of GPU memory");
                elwt.exit();
            }
            Err(err) => warn!("frame dropped: {err:?}"),
        }
    }
}

fn map_key(code: KeyCode) -> Option<Key> {
    let key = match code {
        KeyCode::KeyW | KeyCode::ArrowUp => Key::Forward,
        KeyCode::KeyS | KeyCode::ArrowDown => Key::Backward,
        KeyCode::KeyA | KeyCode::ArrowLeft => Key::Left,
        KeyCode::KeyD | KeyCode::ArrowRight => Key::Right,
        KeyCode::Space => Key::Jump,
        KeyCode::Enter => Key::Confirm,
        KeyCode::Backspace => Key::Back,
        KeyCode::Escape => Key::Exit,
        _ => return None,
    };
    Some(key)
}
