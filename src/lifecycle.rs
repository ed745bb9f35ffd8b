//! Lifecycle of a decorative visual.
//!
//! A [`SceneManager`] wraps one [`SceneBuilder`] and walks it through
//! `Unmounted -> Constructed -> Running -> Disposed`. `Disposed` is terminal;
//! mounting again means creating a new manager.
//!
//! Teardown order matters: listeners and the frame callback go first so
//! nothing mutates the scene while it is being dismantled, then the scene's
//! nodes and their resources, then the renderer, and finally the renderer's
//! surface is taken out of its container if both are still there.

use crate::{
    animation::{
        ElementKey,
        reveal::{RevealConfig, reveal},
    },
    camera::Camera,
    context::Context,
    data_structures::scene_graph::{Released, SceneGraph},
    host::{ContainerKey, HostEvent, ListenerKind, SubscriptionKey, SurfaceId},
    render::{RenderStats, Renderer},
    scenes::{
        Built, SceneBuilder, VisualKind,
        floor_plan::{FloorPlan, FloorPlanConfig},
        grid::{ArchitectureGrid, ArchitectureGridConfig},
        particles::{ParticleField, ParticleFieldConfig},
        wireframe::{Wireframe, WireframeConfig},
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualState {
    Unmounted,
    Constructed,
    Running,
    Disposed,
}

/// A mounted decorative visual, as seen by the page.
pub trait Visual {
    fn name(&self) -> &'static str;

    fn state(&self) -> VisualState;

    fn surface(&self) -> Option<SurfaceId>;

    /// One display refresh: advance procedural state and render once.
    fn frame(&mut self, ctx: &mut Context);

    fn handle_event(&mut self, ctx: &mut Context, event: &HostEvent);

    /// Tears everything down. Safe to call any number of times.
    fn dispose(&mut self, ctx: &mut Context);

    fn camera(&self) -> Option<&Camera>;

    fn scene(&self) -> Option<&SceneGraph>;

    fn render_stats(&self) -> Option<RenderStats>;

    /// Element animating the container in on scroll, if enabled.
    fn reveal_element(&self) -> Option<ElementKey> {
        None
    }
}

pub struct SceneManager<B: SceneBuilder> {
    builder: B,
    container: ContainerKey,
    state: VisualState,
    graph: SceneGraph,
    built: Built,
    camera: Option<Camera>,
    renderer: Option<Box<dyn Renderer>>,
    size: (u32, u32),
    resize: Option<SubscriptionKey>,
    pointer: Option<SubscriptionKey>,
    frame: Option<SubscriptionKey>,
    reveal: Option<ElementKey>,
    released: Released,
}

impl<B: SceneBuilder> SceneManager<B> {
    pub fn new(builder: B, container: ContainerKey) -> Self {
        Self {
            builder,
            container,
            state: VisualState::Unmounted,
            graph: SceneGraph::new(),
            built: Built::new(),
            camera: None,
            renderer: None,
            size: (0, 0),
            resize: None,
            pointer: None,
            frame: None,
            reveal: None,
            released: Released::default(),
        }
    }

    /// Constructs and starts in one go.
    pub fn mount(builder: B, ctx: &mut Context, container: ContainerKey) -> Self {
        let mut manager = Self::new(builder, container);
        if manager.construct(ctx) {
            manager.start(ctx);
        }
        manager
    }

    /// Measures the container, creates camera and renderer, attaches the
    /// renderer's surface to the container, builds the scene and registers
    /// the resize (and, if the scene wants it, pointer) listener.
    ///
    /// Returns `false` and leaves the manager unmounted if the container is
    /// gone.
    pub fn construct(&mut self, ctx: &mut Context) -> bool {
        if self.state != VisualState::Unmounted {
            log::warn!("{} is {:?}, not constructing again", self.builder.name(), self.state);
            return false;
        }
        let Some(container) = ctx.containers.get(self.container) else {
            log::warn!("{}: container is not mounted, nothing to do", self.builder.name());
            return false;
        };
        let (width, height) = (container.width(), container.height());

        self.camera = Some(self.builder.camera(width, height));
        let renderer = ctx.create_renderer(width, height);
        ctx.containers.attach(self.container, renderer.surface());
        self.renderer = Some(renderer);
        self.size = (width, height);

        let root = self.graph.root();
        self.built = self.builder.build(&mut self.graph, root);

        self.resize = Some(ctx.subscriptions.register(ListenerKind::Resize));
        if self.builder.tracks_pointer() {
            self.pointer = Some(ctx.subscriptions.register(ListenerKind::PointerMove));
        }
        self.state = VisualState::Constructed;
        log::info!(
            "{} constructed at {}x{} with {} nodes",
            self.builder.name(),
            width,
            height,
            self.graph.len() - 1
        );
        true
    }

    /// Registers the per-frame callback.
    pub fn start(&mut self, ctx: &mut Context) {
        if self.state != VisualState::Constructed {
            return;
        }
        self.frame = Some(ctx.subscriptions.register(ListenerKind::AnimationFrame));
        self.state = VisualState::Running;
    }

    /// Re-reads the container size. Perspective cameras get a new aspect,
    /// orthographic ones new extents, and the renderer buffer follows the
    /// container. Calling it repeatedly with an unchanged container is
    /// harmless.
    pub fn resize(&mut self, ctx: &mut Context) {
        let Some(container) = ctx.containers.get(self.container) else {
            return;
        };
        let size = (container.width(), container.height());
        if let Some(camera) = self.camera.as_mut() {
            camera.resize(size.0, size.1);
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.set_pixel_ratio(ctx.pixel_ratio());
            if size != self.size {
                renderer.set_size(size.0, size.1);
            }
        }
        self.size = size;
    }

    /// Animates the container in when it scrolls into view.
    pub fn reveal_on_scroll(&mut self, ctx: &mut Context, config: &RevealConfig) {
        let Some(container) = ctx.containers.get(self.container) else {
            return;
        };
        let element = ctx.sequencer.add_element(container.rect);
        reveal(&mut ctx.sequencer, element, config);
        self.reveal = Some(element);
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    pub fn container(&self) -> ContainerKey {
        self.container
    }

    /// Everything released by disposal so far.
    pub fn released(&self) -> Released {
        self.released
    }

    fn listening(&self, ctx: &Context, key: Option<SubscriptionKey>) -> bool {
        key.is_some_and(|key| ctx.subscriptions.is_active(key))
    }
}

impl<B: SceneBuilder> Visual for SceneManager<B> {
    fn name(&self) -> &'static str {
        self.builder.name()
    }

    fn state(&self) -> VisualState {
        self.state
    }

    fn surface(&self) -> Option<SurfaceId> {
        self.renderer.as_ref().map(|r| r.surface())
    }

    fn frame(&mut self, ctx: &mut Context) {
        if self.state != VisualState::Running || !self.listening(ctx, self.frame) {
            return;
        }
        let (Some(camera), Some(renderer)) = (self.camera.as_mut(), self.renderer.as_mut()) else {
            return;
        };
        self.builder.update(&mut self.graph, camera);
        let released = self.graph.take_released();
        if !released.is_empty() {
            renderer.release(&released);
        }
        renderer.render(&self.graph, camera);
    }

    fn handle_event(&mut self, ctx: &mut Context, event: &HostEvent) {
        match event {
            HostEvent::Resize if self.listening(ctx, self.resize) => self.resize(ctx),
            HostEvent::PointerMove(position) if self.listening(ctx, self.pointer) => {
                let offset = ctx.pointer_offset(*position);
                self.builder.pointer_moved(offset);
            }
            _ => {}
        }
    }

    fn dispose(&mut self, ctx: &mut Context) {
        match self.state {
            VisualState::Disposed => return,
            VisualState::Unmounted => {
                self.state = VisualState::Disposed;
                return;
            }
            VisualState::Constructed | VisualState::Running => {}
        }

        for key in [self.resize.take(), self.pointer.take(), self.frame.take()]
            .into_iter()
            .flatten()
        {
            ctx.subscriptions.remove(key);
        }

        let mut released = self.built.dispose(&mut self.graph);
        released += self.graph.clear();
        self.released += released;

        if let Some(renderer) = self.renderer.as_mut() {
            renderer.release(&self.graph.take_released());
            renderer.dispose();
            let surface = renderer.surface();
            if !ctx.containers.detach(self.container, surface) {
                log::debug!("{}: surface {:?} already detached", self.builder.name(), surface);
            }
        }

        if let Some(element) = self.reveal.take() {
            ctx.sequencer.remove_element(element);
        }

        self.state = VisualState::Disposed;
        log::info!(
            "{} disposed: {} nodes, {} resources released",
            self.builder.name(),
            released.nodes,
            released.resources()
        );
    }

    fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    fn scene(&self) -> Option<&SceneGraph> {
        Some(&self.graph)
    }

    fn render_stats(&self) -> Option<RenderStats> {
        self.renderer.as_ref().map(|r| r.stats())
    }

    fn reveal_element(&self) -> Option<ElementKey> {
        self.reveal
    }
}

/// Stand-in for a visual whose container was missing at mount time.
#[derive(Debug, Default)]
pub struct NoopVisual;

impl Visual for NoopVisual {
    fn name(&self) -> &'static str {
        "none"
    }

    fn state(&self) -> VisualState {
        VisualState::Unmounted
    }

    fn surface(&self) -> Option<SurfaceId> {
        None
    }

    fn frame(&mut self, _ctx: &mut Context) {}

    fn handle_event(&mut self, _ctx: &mut Context, _event: &HostEvent) {}

    fn dispose(&mut self, _ctx: &mut Context) {}

    fn camera(&self) -> Option<&Camera> {
        None
    }

    fn scene(&self) -> Option<&SceneGraph> {
        None
    }

    fn render_stats(&self) -> Option<RenderStats> {
        None
    }
}

/// How the page embeds a visual.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualOptions {
    /// Fixed container size in CSS pixels; the container's own size
    /// otherwise.
    pub sizing: Option<(f32, f32)>,
    /// Fade the container up when it scrolls into view.
    pub scroll_animation: bool,
}

impl VisualOptions {
    /// The small corner accent: 256x256.
    pub fn accent() -> Self {
        Self {
            sizing: Some((256.0, 256.0)),
            scroll_animation: false,
        }
    }
}

/// Mounts the visual `kind` into `container`. A missing container yields a
/// [`NoopVisual`].
pub fn mount_visual(
    ctx: &mut Context,
    kind: VisualKind,
    container: Option<ContainerKey>,
    options: &VisualOptions,
) -> Box<dyn Visual> {
    let Some(key) = container.filter(|key| ctx.containers.get(*key).is_some()) else {
        log::warn!("no container for {} visual, mounting nothing", kind.name());
        return Box::new(NoopVisual);
    };
    if let (Some((width, height)), Some(container)) = (options.sizing, ctx.containers.get_mut(key))
    {
        container.rect.width = width;
        container.rect.height = height;
    }

    fn finish<B: SceneBuilder + 'static>(
        mut manager: SceneManager<B>,
        ctx: &mut Context,
        options: &VisualOptions,
    ) -> Box<dyn Visual> {
        if options.scroll_animation {
            manager.reveal_on_scroll(ctx, &RevealConfig::default());
        }
        Box::new(manager)
    }

    match kind {
        VisualKind::Wireframe => finish(
            SceneManager::mount(Wireframe::new(WireframeConfig::default()), ctx, key),
            ctx,
            options,
        ),
        VisualKind::ArchitectureGrid => finish(
            SceneManager::mount(ArchitectureGrid::new(ArchitectureGridConfig::default()), ctx, key),
            ctx,
            options,
        ),
        VisualKind::Particles => finish(
            SceneManager::mount(ParticleField::new(ParticleFieldConfig::default()), ctx, key),
            ctx,
            options,
        ),
        VisualKind::FloorPlan => {
            let plan = FloorPlan::new(FloorPlanConfig::default(), ctx.label_painter());
            finish(SceneManager::mount(plan, ctx, key), ctx, options)
        }
    }
}
