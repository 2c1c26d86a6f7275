use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop, EventLoopProxy},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::config::VideoConfig;
use crate::error::EngineError;
use crate::game::Game;
use crate::input::InputState;
use crate::render::{create_graphics, Graphics};

enum State {
    Init(Option<EventLoopProxy<Graphics>>),
    Ready(Graphics),
}

/// Owns the event loop and the game it drives.
pub struct EngineContext {
    event_loop: EventLoop<Graphics>,
    app: App,
}

struct App {
    title: String,
    video: VideoConfig,
    state: State,
    game: Box<dyn Game>,
    input: InputState,
    last_frame: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<Graphics>, title: String, video: VideoConfig, game: Box<dyn Game>) -> Self {
        Self {
            title,
            video,
            state: State::Init(Some(event_loop.create_proxy())),
            game,
            input: InputState::default(),
            last_frame: Instant::now(),
        }
    }

    fn window_attributes(&self) -> winit::window::WindowAttributes {
        let (width, height) = self.video.window_size();
        let mut attributes = Window::default_attributes()
            .with_title(self.title.clone())
            .with_inner_size(PhysicalSize::new(width, height));
        if self.video.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        attributes
    }

    fn resized(&mut self, size: PhysicalSize<u32>) {
        if let State::Ready(gfx) = &mut self.state {
            gfx.resize(size);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let State::Ready(gfx) = &mut self.state else {
            return;
        };

        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        self.game.update(&self.input, dt);

        let dropped = self.input.take_dropped();
        match dropped.as_slice() {
            [] => {}
            [path] => self.game.file_dropped(gfx, path),
            many => debug!("ignoring drop of {} files", many.len()),
        }

        let frame = self.game.frame(gfx.size());
        match gfx.render(&frame) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => gfx.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                error!("surface out of memory, exiting");
                event_loop.exit();
            }
            Err(err) => warn!("skipped frame: {err}"),
        }
        drop(frame);

        self.input.end_frame();
        gfx.request_redraw();
    }
}

impl ApplicationHandler<Graphics> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let State::Init(proxy) = &mut self.state else {
            return;
        };
        let Some(proxy) = proxy.take() else {
            return;
        };

        let window = match event_loop.create_window(self.window_attributes()) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                error!("failed to create a window: {err}");
                event_loop.exit();
                return;
            }
        };

        pollster::block_on(create_graphics(window, self.video.vsync, proxy));
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, graphics: Graphics) {
        info!("graphics ready at {:?}", graphics.size());
        self.game.init(&graphics);
        graphics.request_redraw();
        self.last_frame = Instant::now();
        self.state = State::Ready(graphics);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    if code == KeyCode::Escape && event.state == ElementState::Pressed {
                        event_loop.exit();
                        return;
                    }
                    self.input.handle_key(code, event.state, event.repeat);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.input.handle_mouse_button(button, state)
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor(position.x, position.y)
            }
            WindowEvent::MouseWheel { delta, .. } => self.input.handle_wheel(delta),
            WindowEvent::DroppedFile(path) => self.input.handle_dropped_file(path),
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::Resized(size) => self.resized(size),
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }
}

impl EngineContext {
    pub fn new(title: impl Into<String>, video: VideoConfig, game: Box<dyn Game>) -> Result<Self, EngineError> {
        let event_loop = EventLoop::<Graphics>::with_user_event().build()?;
        event_loop.set_control_flow(ControlFlow::Poll);
        let app = App::new(&event_loop, title.into(), video, game);
        Ok(Self { event_loop, app })
    }

    /// Runs until the window closes or Escape is pressed.
    pub fn run(self) -> Result<(), EngineError> {
        let Self { event_loop, mut app } = self;
        event_loop.run_app(&mut app)?;
        Ok(())
    }
}
