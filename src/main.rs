use std::collections::HashSet;
use std::env;
use std::num::NonZeroU32;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use grid_raycaster::config::parse_override;
use grid_raycaster::{
    Camera, CameraUpdate, FrameBuffer, GridMap, Renderer, RendererConfig, TextureAtlas,
};

mod demo;
mod scaler;

use scaler::Stretch;

/// Window and movement settings for the interactive host.
#[derive(Clone, Debug)]
struct HostConfig {
    window_width: f64,
    window_height: f64,
    /// Internal frame height; width follows the window aspect.
    internal_height: usize,
    move_speed: f32, // world units / s
    turn_speed: f32, // rad / s
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            window_width: 800.0,
            window_height: 600.0,
            internal_height: 480,
            move_speed: 192.0,
            turn_speed: std::f32::consts::PI,
        }
    }
}

impl HostConfig {
    /// Environment variables:
    /// - `RAYCAST_WINDOW_WIDTH` / `RAYCAST_WINDOW_HEIGHT` - initial window size (default: 800x600)
    /// - `RAYCAST_INTERNAL_HEIGHT` - rows in the internal frame (default: 480, min 120)
    /// - `RAYCAST_MOVE_SPEED` - world units per second (default: 192)
    /// - `RAYCAST_TURN_SPEED` - radians per second (default: pi)
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        let read = |key: &str| get(key).map(|raw| (key.to_owned(), raw));

        if let Some(w) = read("RAYCAST_WINDOW_WIDTH").and_then(parse_override::<f64>) {
            config.window_width = w.max(160.0);
        }
        if let Some(h) = read("RAYCAST_WINDOW_HEIGHT").and_then(parse_override::<f64>) {
            config.window_height = h.max(120.0);
        }
        if let Some(h) = read("RAYCAST_INTERNAL_HEIGHT").and_then(parse_override::<usize>) {
            config.internal_height = h.max(120);
        }
        if let Some(s) = read("RAYCAST_MOVE_SPEED").and_then(parse_override::<f32>) {
            config.move_speed = s;
        }
        if let Some(s) = read("RAYCAST_TURN_SPEED").and_then(parse_override::<f32>) {
            config.turn_speed = s;
        }

        config
    }
}

struct App {
    window: Option<Rc<Window>>,
    surface: Option<softbuffer::Surface<Rc<Window>, Rc<Window>>>,
    host: HostConfig,

    map: GridMap,
    renderer: Renderer,
    // Filled once the loader thread hands the atlas over
    atlas: Option<TextureAtlas>,
    atlas_rx: Receiver<grid_raycaster::Result<TextureAtlas>>,

    // Player pose, pushed into the renderer before each frame
    pos: [f32; 2],
    angle: f32,

    // HUD
    frame_counter: u32,
    last_fps_print: Instant,

    frame: FrameBuffer,
    stretch: Stretch,

    keys_down: HashSet<KeyCode>,
    last_tick: Instant,
}

impl App {
    fn new(host: HostConfig, config: RendererConfig) -> grid_raycaster::Result<Self> {
        let map = demo::level()?;
        let renderer = Renderer::new(config)?;
        let (x, y, angle) = demo::spawn();

        let (tx, atlas_rx) = mpsc::channel();
        thread::spawn(move || {
            // Receiver may be gone if the window closed first
            let _ = tx.send(demo::atlas());
        });

        let frame = FrameBuffer::new(640, host.internal_height)?;
        Ok(Self {
            window: None,
            surface: None,
            host,
            map,
            renderer,
            atlas: None,
            atlas_rx,
            pos: [x, y],
            angle,
            frame_counter: 0,
            last_fps_print: Instant::now(),
            frame,
            stretch: Stretch::default(),
            keys_down: HashSet::new(),
            last_tick: Instant::now(),
        })
    }

    fn poll_atlas(&mut self, event_loop: &ActiveEventLoop) {
        if self.atlas.is_some() {
            return;
        }
        match self.atlas_rx.try_recv() {
            Ok(Ok(atlas)) => {
                tracing::info!(slices = atlas.slice_count(), "wall textures loaded");
                self.atlas = Some(atlas);
            }
            Ok(Err(err)) => {
                tracing::error!(%err, "wall textures failed to load");
                event_loop.exit();
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                tracing::error!("texture loader exited without an atlas");
                event_loop.exit();
            }
        }
    }

    fn tick(&mut self) {
        // Compute dt with cap to avoid huge jumps if the app was paused
        let now = Instant::now();
        let dt = now.duration_since(self.last_tick).min(Duration::from_millis(100));
        self.last_tick = now;
        let dt_s = dt.as_secs_f32();

        let mut fwd: f32 = 0.0;
        let mut strafe: f32 = 0.0;
        if self.keys_down.contains(&KeyCode::KeyW) {
            fwd += 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyS) {
            fwd -= 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyD) {
            strafe += 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyA) {
            strafe -= 1.0;
        }

        // Normalize diagonal speed
        if fwd != 0.0 || strafe != 0.0 {
            let inv = 1.0 / (fwd * fwd + strafe * strafe).sqrt();
            fwd *= inv;
            strafe *= inv;
        }

        // Q turns left (counter-clockwise), E right
        let mut turn = 0.0;
        if self.keys_down.contains(&KeyCode::KeyQ) {
            turn += 1.0;
        }
        if self.keys_down.contains(&KeyCode::KeyE) {
            turn -= 1.0;
        }
        let mut cam = Camera {
            pos: self.pos,
            angle: self.angle + turn * self.host.turn_speed * dt_s,
            fov: self.renderer.camera().fov,
        };
        cam.wrap_angle();
        self.angle = cam.angle;

        if fwd != 0.0 || strafe != 0.0 {
            let dir_fwd = cam.forward();
            let dir_right = Camera::direction(cam.angle - std::f32::consts::FRAC_PI_2);
            let step = self.host.move_speed * dt_s;
            let dx = (dir_fwd[0] * fwd + dir_right[0] * strafe) * step;
            let dy = (dir_fwd[1] * fwd + dir_right[1] * strafe) * step;

            // Resolve each axis separately so walls can be slid along
            if self.map.is_passable(self.pos[0] + dx, self.pos[1]) {
                self.pos[0] += dx;
            }
            if self.map.is_passable(self.pos[0], self.pos[1] + dy) {
                self.pos[1] += dy;
            }
        }

        let pose = CameraUpdate::pose(self.pos[0], self.pos[1], self.angle);
        if let Err(err) = self.renderer.set_camera(pose) {
            tracing::warn!(%err, "camera update rejected");
        }
    }

    fn rebuild_internal_frame(&mut self, dst_w: usize, dst_h: usize) {
        // Keep internal height fixed (controls pixel size look)
        let target_h = self.host.internal_height;
        let aspect = if dst_h > 0 {
            dst_w as f32 / dst_h as f32
        } else {
            1.0
        };

        let mut target_w = ((target_h as f32 * aspect).round() as usize).max(160);
        if target_w % 2 != 0 {
            target_w += 1;
        }

        if target_w != self.frame.width() || target_h != self.frame.height() {
            match FrameBuffer::new(target_w, target_h) {
                Ok(frame) => self.frame = frame,
                Err(err) => {
                    tracing::error!(%err, "cannot resize internal frame");
                    return;
                }
            }
            tracing::debug!(width = target_w, height = target_h, "internal frame resized");
        }

        self.stretch = Stretch::new(dst_w, dst_h, self.frame.width(), self.frame.height());
    }

    fn draw(&mut self) {
        match &self.atlas {
            Some(atlas) => {
                if let Err(err) = self.renderer.render_frame(&mut self.frame, &self.map, atlas) {
                    tracing::error!(%err, "frame failed");
                }
            }
            None => self.renderer.render_background(&mut self.frame),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let attributes = Window::default_attributes()
            .with_title("Grid Raycaster")
            .with_inner_size(LogicalSize::new(
                self.host.window_width,
                self.host.window_height,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(w) => Rc::new(w),
            Err(err) => {
                tracing::error!(%err, "cannot create window");
                event_loop.exit();
                return;
            }
        };

        let surface = softbuffer::Context::new(window.clone())
            .and_then(|context| softbuffer::Surface::new(&context, window.clone()));
        let surface = match surface {
            Ok(s) => s,
            Err(err) => {
                tracing::error!(%err, "cannot acquire drawing surface");
                event_loop.exit();
                return;
            }
        };

        let size = window.inner_size();
        self.rebuild_internal_frame(size.width as usize, size.height as usize);

        window.request_redraw();
        self.surface = Some(surface);
        self.window = Some(window);
        self.last_tick = Instant::now();
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("close requested; stopping");
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => match state {
                ElementState::Pressed => {
                    self.keys_down.insert(code);
                }
                ElementState::Released => {
                    self.keys_down.remove(&code);
                }
            },

            WindowEvent::RedrawRequested => {
                self.poll_atlas(event_loop);
                self.tick();

                let size = match &self.window {
                    Some(w) if w.id() == id => w.inner_size(),
                    _ => return,
                };
                let (Some(dw), Some(dh)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
                else {
                    return; // Minimized window, skip drawing
                };
                if self.stretch.dst_size() != (dw.get() as usize, dh.get() as usize) {
                    self.rebuild_internal_frame(dw.get() as usize, dh.get() as usize);
                }

                self.draw();

                let Some(surface) = self.surface.as_mut() else {
                    return;
                };
                if let Err(err) = surface.resize(dw, dh) {
                    tracing::error!(%err, "surface resize failed");
                    return;
                }
                let mut buf = match surface.buffer_mut() {
                    Ok(buf) => buf,
                    Err(err) => {
                        tracing::error!(%err, "cannot map surface buffer");
                        return;
                    }
                };
                self.stretch.blit(&mut buf, &self.frame);
                if let Err(err) = buf.present() {
                    tracing::error!(%err, "present failed");
                }

                self.frame_counter += 1;
                let now = Instant::now();
                let elapsed = now.duration_since(self.last_fps_print).as_secs_f32();
                if elapsed >= 1.0 {
                    tracing::info!("FPS: {:.1}", self.frame_counter as f32 / elapsed);
                    self.frame_counter = 0;
                    self.last_fps_print = now;
                }
            }

            WindowEvent::Resized(new_size) => {
                self.rebuild_internal_frame(new_size.width as usize, new_size.height as usize);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let host = HostConfig::from_env();
    let config = RendererConfig::from_env();
    tracing::info!(?host, "starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(host, config)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}
