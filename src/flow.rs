//! Application event loop.
//!
//! Owns the window and drives the page from winit events. Each display
//! refresh (`RedrawRequested`) does, in order:
//! 1. advance the host clock: timers, tweens, the splash gate
//! 2. run one frame of every mounted visual, each into its own target
//! 3. composite the targets and the splash overlay onto the window
//! 4. present and request the next redraw
//!
//! Resize, cursor and wheel events are forwarded to the page before the next
//! frame, so a frame always sees the latest pointer target.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    window::Window,
};

use crate::{
    animation::splash::SplashConfig,
    context::{Context, ContextConfig},
    gpu::{GpuContext, compositor::Compositor, renderer::WgpuRendererFactory},
    host::PointerPosition,
    page::Page,
};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

/// #1a1a1a, the splash overlay.
const OVERLAY_COLOR: [u8; 4] = [0x1a, 0x1a, 0x1a, 0xff];
/// Pixels scrolled per wheel line.
const LINE_HEIGHT: f32 = 40.0;

/// Everything that exists once the GPU is up.
pub struct AppState {
    gpu: GpuContext,
    ctx: Context,
    page: Page,
    compositor: Compositor,
}

impl AppState {
    async fn new(window: Arc<Window>, splash: SplashConfig) -> anyhow::Result<Self> {
        let scale = window.scale_factor();
        let logical = window.inner_size().to_logical::<f64>(scale);
        let gpu = GpuContext::new(window).await?;

        let renderers = WgpuRendererFactory::new(&gpu.device, &gpu.queue);
        let compositor = Compositor::new(
            &gpu.device,
            &gpu.queue,
            &renderers,
            gpu.config.format,
            OVERLAY_COLOR,
        )?;
        let mut ctx = Context::new(
            ContextConfig {
                viewport: (logical.width as u32, logical.height as u32),
                device_pixel_ratio: scale as f32,
                ..Default::default()
            },
            Box::new(renderers),
        );
        let page = Page::mount(&mut ctx, &splash);
        Ok(Self {
            gpu,
            ctx,
            page,
            compositor,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.gpu.resize(width, height);
        if width == 0 || height == 0 {
            return;
        }
        let scale = self.gpu.window().scale_factor();
        self.ctx.set_device_pixel_ratio(scale as f32);
        let logical = winit::dpi::PhysicalSize::new(width, height).to_logical::<f64>(scale);
        self.page
            .resize(&mut self.ctx, logical.width as u32, logical.height as u32);
    }

    fn pointer_moved(&mut self, x: f64, y: f64) {
        let scale = self.gpu.window().scale_factor();
        let position = PointerPosition {
            x: (x / scale) as f32,
            y: (y / scale) as f32,
        };
        self.page.pointer_moved(&mut self.ctx, position);
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.gpu.window().request_redraw();
        if !self.gpu.is_surface_configured() {
            return Ok(());
        }

        let output = self.gpu.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let layers = self.page.layers(&self.ctx);
        let [r, g, b, a] = self.ctx.clear_color();
        self.compositor.draw(
            &self.gpu.device,
            &self.gpu.queue,
            &view,
            self.ctx.viewport(),
            wgpu::Color { r, g, b, a },
            &layers,
        );
        output.present();
        Ok(())
    }

    fn dispose(&mut self) {
        self.page.dispose(&mut self.ctx);
        log::info!(
            "page disposed, {} listeners and {} timers left",
            self.ctx.subscriptions.len(),
            self.ctx.timers.len()
        );
    }
}

pub(crate) enum FlowEvent {
    #[allow(dead_code)]
    Initialized(Box<AppState>),
    #[allow(dead_code)]
    Failed(String),
}

pub struct App {
    #[cfg(not(target_arch = "wasm32"))]
    async_runtime: tokio::runtime::Runtime,
    #[allow(dead_code)]
    proxy: winit::event_loop::EventLoopProxy<FlowEvent>,
    state: Option<AppState>,
    splash: Option<SplashConfig>,
    last_time: Instant,
}

impl App {
    fn new(event_loop: &EventLoop<FlowEvent>, splash: SplashConfig) -> anyhow::Result<Self> {
        Ok(Self {
            #[cfg(not(target_arch = "wasm32"))]
            async_runtime: tokio::runtime::Runtime::new()?,
            proxy: event_loop.create_proxy(),
            state: None,
            splash: Some(splash),
            last_time: Instant::now(),
        })
    }

    fn initialized(&mut self, mut state: AppState) {
        let size = state.gpu.window().inner_size();
        state.resize(size.width, size.height);
        state.gpu.window().request_redraw();
        self.last_time = Instant::now();
        self.state = Some(state);
    }
}

impl ApplicationHandler<FlowEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // only the first resume builds the page
        let Some(splash) = self.splash.take() else {
            return;
        };

        #[allow(unused_mut)]
        let mut window_attributes = Window::default_attributes().with_title("archviz");

        #[cfg(target_arch = "wasm32")]
        {
            use wasm_bindgen::JsCast;
            use winit::platform::web::WindowAttributesExtWebSys;

            const CANVAS_ID: &str = "canvas";

            let window = wgpu::web_sys::window().unwrap_throw();
            let document = window.document().unwrap_throw();
            let canvas = document.get_element_by_id(CANVAS_ID).unwrap_throw();
            let html_canvas_element = canvas.unchecked_into();
            window_attributes = window_attributes.with_canvas(Some(html_canvas_element));
        }

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("could not create a window: {}", e);
                event_loop.exit();
                return;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        {
            match self.async_runtime.block_on(AppState::new(window, splash)) {
                Ok(state) => self.initialized(state),
                Err(e) => {
                    log::error!("initialization failed: {:#}", e);
                    event_loop.exit();
                }
            }
        }

        #[cfg(target_arch = "wasm32")]
        {
            let proxy = self.proxy.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let event = match AppState::new(window, splash).await {
                    Ok(state) => FlowEvent::Initialized(Box::new(state)),
                    Err(e) => FlowEvent::Failed(format!("{:#}", e)),
                };
                if proxy.send_event(event).is_err() {
                    log::error!("event loop closed before initialization finished");
                }
            });
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: FlowEvent) {
        match event {
            FlowEvent::Initialized(state) => self.initialized(*state),
            FlowEvent::Failed(message) => {
                log::error!("initialization failed: {}", message);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                state.dispose();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => state.resize(size.width, size.height),
            WindowEvent::CursorMoved { position, .. } => {
                state.pointer_moved(position.x, position.y)
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let scale = state.gpu.window().scale_factor();
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, lines) => -lines * LINE_HEIGHT,
                    MouseScrollDelta::PixelDelta(position) => (-position.y / scale) as f32,
                };
                state.page.scroll_by(&mut state.ctx, dy);
            }
            WindowEvent::RedrawRequested => {
                let dt = self.last_time.elapsed();
                self.last_time = Instant::now();
                state.page.frame(&mut state.ctx, dt);

                match state.render() {
                    Ok(()) => {}
                    // Reconfigure the surface if it's lost or outdated
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.gpu.reconfigure();
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Opens the window and runs the page until it is closed.
pub fn run() -> anyhow::Result<()> {
    run_with(SplashConfig::default())
}

pub fn run_with(splash: SplashConfig) -> anyhow::Result<()> {
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Err(e) = env_logger::try_init() {
            println!("Warning: Could not initialize logger: {}", e);
        };
    }

    #[cfg(target_arch = "wasm32")]
    {
        console_log::init_with_level(log::Level::Info).unwrap_throw();
    }

    let event_loop: EventLoop<FlowEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop, splash)?;
    event_loop.run_app(&mut app)?;
    Ok(())
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    run().map_err(|e| wasm_bindgen::JsValue::from_str(&format!("{:#}", e)))
}
