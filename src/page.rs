//! The demo page: splash first, then the sections with their visuals.
//!
//! Content is mounted only once the splash gate opens, the same way the
//! site swaps its splash screen for the routed pages. Everything here is
//! independent of the GPU; [`Page::layers`] flattens the page into
//! compositor layers for whichever backend draws it.

use instant::Duration;

use crate::{
    animation::{
        ElementKey,
        parallax::{DEFAULT_SPEED, InteriorSection, ParallaxLayer},
        splash::{Splash, SplashConfig},
    },
    context::Context,
    host::{Container, ContainerKey, HostEvent, PointerPosition, Rect},
    lifecycle::{Visual, VisualOptions, mount_visual},
    render::{Layer, LayerSource},
    scenes::VisualKind,
};

const ACCENT_SIZE: f32 = 256.0;
const ACCENT_MARGIN: f32 = 32.0;

/// Section and container rectangles in document coordinates. Each section
/// is one viewport tall.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageLayout {
    pub hero: Rect,
    pub accent: Rect,
    pub interior: Rect,
    pub interior_content: Rect,
    pub interior_visual: Rect,
    pub work: Rect,
    pub work_visual: Rect,
}

impl PageLayout {
    pub fn new(width: f32, height: f32) -> Self {
        let section = |index: f32| Rect::new(0.0, index * height, width, height);
        Self {
            hero: section(0.0),
            accent: Rect::new(
                (width - ACCENT_SIZE - ACCENT_MARGIN).max(0.0),
                (height - ACCENT_SIZE - ACCENT_MARGIN).max(0.0),
                ACCENT_SIZE,
                ACCENT_SIZE,
            ),
            interior: section(1.0),
            interior_content: Rect::new(width * 0.08, height * 1.25, width * 0.4, height * 0.5),
            interior_visual: Rect::new(width * 0.5, height * 1.1, width * 0.45, height * 0.8),
            work: section(2.0),
            work_visual: Rect::new(width * 0.1, height * 2.1, width * 0.8, height * 0.8),
        }
    }

    pub fn height(&self) -> f32 {
        self.work.y + self.work.height
    }
}

/// Where a mounted visual sits and what moves it besides scrolling.
struct Mounted {
    visual: Box<dyn Visual>,
    container: ContainerKey,
    /// Animated element whose offset and opacity apply to the container.
    element: Option<ElementKey>,
    parallax: bool,
}

/// Sections mounted once the splash is gone.
struct Content {
    visuals: Vec<Mounted>,
    interior: InteriorSection,
    parallax: ParallaxLayer,
}

impl Content {
    fn mount(ctx: &mut Context, layout: &PageLayout) -> Self {
        let mut visuals = Vec::new();
        let mut add = |ctx: &mut Context, kind: VisualKind, rect: Rect, options: VisualOptions| {
            let container = ctx.containers.insert(Container::new(rect));
            let visual = mount_visual(ctx, kind, Some(container), &options);
            let element = visual.reveal_element();
            visuals.push(Mounted {
                visual,
                container,
                element,
                parallax: false,
            });
        };
        add(ctx, VisualKind::ArchitectureGrid, layout.hero, VisualOptions::default());
        add(ctx, VisualKind::Wireframe, layout.accent, VisualOptions::accent());
        add(
            ctx,
            VisualKind::FloorPlan,
            layout.interior_visual,
            VisualOptions::default(),
        );
        add(
            ctx,
            VisualKind::Particles,
            layout.work_visual,
            VisualOptions {
                scroll_animation: true,
                ..Default::default()
            },
        );
        if let Some(hero) = visuals.first_mut() {
            hero.parallax = true;
        }

        let interior = InteriorSection::mount(
            &mut ctx.sequencer,
            layout.interior,
            layout.interior_content,
            layout.interior_visual,
        );
        if let Some(floor_plan) = visuals.get_mut(2) {
            floor_plan.element = Some(interior.visual);
        }
        let parallax = ParallaxLayer::mount(ctx, layout.hero, DEFAULT_SPEED);
        log::info!("page content mounted with {} visuals", visuals.len());
        Self {
            visuals,
            interior,
            parallax,
        }
    }

    fn relayout(&mut self, ctx: &mut Context, layout: &PageLayout) {
        let rects = [
            layout.hero,
            layout.accent,
            layout.interior_visual,
            layout.work_visual,
        ];
        for (mounted, rect) in self.visuals.iter_mut().zip(rects) {
            if let Some(container) = ctx.containers.get_mut(mounted.container) {
                container.rect = rect;
            }
            if let Some(element) = mounted.element {
                ctx.sequencer.set_rect(element, rect);
            }
        }
        ctx.sequencer.set_rect(self.interior.section, layout.interior);
        ctx.sequencer.set_rect(self.interior.content, layout.interior_content);
        self.parallax.set_section(layout.hero);
    }

    fn dispose(&mut self, ctx: &mut Context) {
        for mounted in &mut self.visuals {
            mounted.visual.dispose(ctx);
            ctx.containers.remove(mounted.container);
        }
        self.interior.unmount(&mut ctx.sequencer);
        self.parallax.dispose(ctx);
    }
}

pub struct Page {
    layout: PageLayout,
    splash: Splash,
    content: Option<Content>,
}

impl Page {
    /// Starts the splash. Sections follow when its gate opens.
    pub fn mount(ctx: &mut Context, splash: &SplashConfig) -> Self {
        let (width, height) = ctx.viewport();
        Self {
            layout: PageLayout::new(width as f32, height as f32),
            splash: Splash::start(ctx, splash),
            content: None,
        }
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn splash(&self) -> &Splash {
        &self.splash
    }

    pub fn content_visible(&self) -> bool {
        self.content.is_some()
    }

    pub fn visuals(&self) -> impl Iterator<Item = &dyn Visual> {
        self.content
            .iter()
            .flat_map(|content| content.visuals.iter())
            .map(|mounted| mounted.visual.as_ref())
    }

    /// Advances the host clock by `dt`, then runs one display frame of every
    /// visual.
    pub fn frame(&mut self, ctx: &mut Context, dt: Duration) {
        let fired = ctx.tick(dt);
        if self.splash.update(ctx, &fired) {
            self.content = Some(Content::mount(ctx, &self.layout));
        }
        if let Some(content) = self.content.as_mut() {
            for mounted in &mut content.visuals {
                mounted.visual.frame(ctx);
            }
        }
    }

    /// Lays the page out for the new viewport. Element rects move before the
    /// viewport height changes, since that change re-evaluates every scroll
    /// trigger and a play-once reveal cannot be taken back.
    pub fn resize(&mut self, ctx: &mut Context, width: u32, height: u32) {
        self.layout = PageLayout::new(width as f32, height as f32);
        if let Some(content) = self.content.as_mut() {
            content.relayout(ctx, &self.layout);
        }
        ctx.set_viewport(width, height);
        if let Some(screen) = self.splash.screen() {
            let overlay = screen.elements().overlay;
            ctx.sequencer.set_rect(overlay, ctx.viewport_rect());
        }
        self.scroll_by(ctx, 0.0);
        if let Some(content) = self.content.as_mut() {
            for mounted in &mut content.visuals {
                mounted.visual.handle_event(ctx, &HostEvent::Resize);
            }
        }
    }

    pub fn pointer_moved(&mut self, ctx: &mut Context, position: PointerPosition) {
        if let Some(content) = self.content.as_mut() {
            for mounted in &mut content.visuals {
                mounted
                    .visual
                    .handle_event(ctx, &HostEvent::PointerMove(position));
            }
        }
    }

    pub fn max_scroll(&self, ctx: &Context) -> f32 {
        (self.layout.height() - ctx.viewport().1 as f32).max(0.0)
    }

    /// Scrolls by `delta` pixels, clamped to the page. Nothing scrolls while
    /// the splash covers the page.
    pub fn scroll_by(&mut self, ctx: &mut Context, delta: f32) {
        if self.content.is_none() {
            return;
        }
        let scroll = (ctx.sequencer.scroll() + delta).clamp(0.0, self.max_scroll(ctx));
        ctx.scroll_to(scroll);
        if let Some(content) = self.content.as_mut() {
            content.parallax.on_scroll(scroll, ctx.viewport().1 as f32);
        }
    }

    /// The page as compositor layers, back to front, in window pixels.
    pub fn layers(&self, ctx: &Context) -> Vec<Layer> {
        let mut layers = Vec::new();
        let scroll = ctx.sequencer.scroll();
        if let Some(content) = &self.content {
            for mounted in &content.visuals {
                let (Some(surface), Some(container)) = (
                    mounted.visual.surface(),
                    ctx.containers.get(mounted.container),
                ) else {
                    continue;
                };
                let mut rect = container.rect;
                rect.y -= scroll;
                if mounted.parallax {
                    rect.y += content.parallax.translate_y();
                }
                let mut opacity = 1.0;
                if let Some(props) = mounted.element.and_then(|e| ctx.sequencer.props(e)) {
                    rect.x += props.x;
                    rect.y += props.translate_y(rect.height);
                    opacity = props.opacity;
                }
                layers.push(Layer {
                    source: LayerSource::Surface(surface),
                    rect,
                    opacity,
                });
            }
        }
        if let Some(screen) = self.splash.screen() {
            let overlay = screen.elements().overlay;
            if let Some(element) = ctx.sequencer.element(overlay) {
                let mut rect = element.rect;
                rect.y += element.props.translate_y(rect.height);
                layers.push(Layer {
                    source: LayerSource::Overlay,
                    rect,
                    opacity: element.props.opacity,
                });
            }
        }
        layers
    }

    pub fn dispose(&mut self, ctx: &mut Context) {
        if let Some(mut content) = self.content.take() {
            content.dispose(ctx);
        }
        self.splash.dispose(ctx);
    }
}
