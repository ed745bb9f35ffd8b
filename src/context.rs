//! The application context.
//!
//! One [`Context`] is created when the application starts and passed by
//! reference to everything that mounts visuals or animations. It owns the
//! page-side state that would otherwise be global: containers, listener and
//! timer registrations, the animation sequencer and the renderer factory.

use instant::Duration;

use crate::{
    animation::sequencer::Sequencer,
    host::{Containers, PointerPosition, Rect, Subscriptions, SurfaceId, TimerKey, Timers},
    labels::LabelPainter,
    render::{HeadlessRendererFactory, Renderer, RendererFactory},
    scenes::PointerOffset,
};

#[derive(Clone, Debug, PartialEq)]
pub struct ContextConfig {
    /// Window size in CSS pixels.
    pub viewport: (u32, u32),
    pub device_pixel_ratio: f32,
    /// Renderers never use a higher pixel ratio than this.
    pub max_pixel_ratio: f32,
    /// Page background behind the visuals, linear RGBA.
    pub clear_color: [f64; 4],
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            viewport: (1280, 800),
            device_pixel_ratio: 1.0,
            max_pixel_ratio: 2.0,
            // #f8f6f2
            clear_color: [0.939, 0.922, 0.888, 1.0],
        }
    }
}

pub struct Context {
    pub containers: Containers,
    pub subscriptions: Subscriptions,
    pub timers: Timers,
    pub sequencer: Sequencer,
    config: ContextConfig,
    renderers: Box<dyn RendererFactory>,
    labels: Option<LabelPainter>,
    next_surface: u64,
}

impl Context {
    pub fn new(config: ContextConfig, renderers: Box<dyn RendererFactory>) -> Self {
        log::debug!(
            "context {}x{} @{}x",
            config.viewport.0,
            config.viewport.1,
            config.device_pixel_ratio
        );
        Self {
            containers: Containers::default(),
            subscriptions: Subscriptions::default(),
            timers: Timers::default(),
            sequencer: Sequencer::new(config.viewport.1 as f32),
            config,
            renderers,
            labels: None,
            next_surface: 0,
        }
    }

    /// Context with [`HeadlessRenderer`](crate::render::HeadlessRenderer)s
    /// and no fonts.
    pub fn headless(width: u32, height: u32) -> Self {
        Self::headless_with(width, height, HeadlessRendererFactory::new())
    }

    pub fn headless_with(width: u32, height: u32, factory: HeadlessRendererFactory) -> Self {
        let mut ctx = Self::new(
            ContextConfig {
                viewport: (width, height),
                ..Default::default()
            },
            Box::new(factory),
        );
        ctx.labels = Some(LabelPainter::without_fonts());
        ctx
    }

    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.config.viewport
    }

    pub fn viewport_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            self.config.viewport.0 as f32,
            self.config.viewport.1 as f32,
        )
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.config.viewport = (width, height);
        self.sequencer.set_viewport_height(height as f32);
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.config.device_pixel_ratio = ratio;
    }

    /// Device pixel ratio capped at the configured maximum.
    pub fn pixel_ratio(&self) -> f32 {
        self.config
            .device_pixel_ratio
            .min(self.config.max_pixel_ratio)
            .max(0.1)
    }

    pub fn clear_color(&self) -> [f64; 4] {
        self.config.clear_color
    }

    /// Pointer offset from the centre of the window.
    pub fn pointer_offset(&self, position: PointerPosition) -> PointerOffset {
        let (width, height) = self.config.viewport;
        PointerOffset {
            x: position.x - width as f32 / 2.0,
            y: position.y - height as f32 / 2.0,
        }
    }

    pub fn create_renderer(&mut self, width: u32, height: u32) -> Box<dyn Renderer> {
        let surface = SurfaceId(self.next_surface);
        self.next_surface += 1;
        let ratio = self.pixel_ratio();
        self.renderers.create(surface, width, height, ratio)
    }

    pub fn set_renderer_factory(&mut self, renderers: Box<dyn RendererFactory>) {
        self.renderers = renderers;
    }

    /// Label painter, loading the system fonts on first use.
    pub fn label_painter(&mut self) -> &LabelPainter {
        self.labels.get_or_insert_with(LabelPainter::system)
    }

    pub fn set_label_painter(&mut self, painter: LabelPainter) {
        self.labels = Some(painter);
    }

    /// Moves the host clock forward: fires due timers and advances the
    /// sequencer. Returns the timers that fired.
    pub fn tick(&mut self, dt: Duration) -> Vec<TimerKey> {
        let fired = self.timers.advance(dt);
        self.sequencer.advance(dt.as_secs_f32());
        fired
    }

    pub fn scroll_to(&mut self, scroll: f32) {
        self.sequencer.scroll_to(scroll);
    }
}
