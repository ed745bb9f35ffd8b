//! Host-side primitives that visuals and animations attach to.
//!
//! A visual never talks to the windowing system directly. It is handed a
//! [`Container`] to render into and registers its interest in host events
//! through [`Subscriptions`]. Unmounting a component must leave no
//! registration behind, which is why every registration is an explicit key
//! that has to be handed back.

use instant::Duration;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Handle to a container owned by the [`crate::context::Context`].
    pub struct ContainerKey;
    /// Handle to a registered listener or frame callback.
    pub struct SubscriptionKey;
    /// Handle to a pending timer.
    pub struct TimerKey;
}

/// Identifies the output surface of a renderer (the canvas in web terms).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

/// Pixel rectangle in window coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// The element a visual renders into.
///
/// Size is read when the visual is constructed and again on every resize;
/// the visual never changes it.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub rect: Rect,
    surfaces: Vec<SurfaceId>,
}

impl Container {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            surfaces: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.rect.width.max(0.0) as u32
    }

    pub fn height(&self) -> u32 {
        self.rect.height.max(0.0) as u32
    }

    pub fn append(&mut self, surface: SurfaceId) {
        if !self.contains(surface) {
            self.surfaces.push(surface);
        }
    }

    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.surfaces.contains(&surface)
    }

    pub fn remove(&mut self, surface: SurfaceId) {
        self.surfaces.retain(|s| *s != surface);
    }

    pub fn surfaces(&self) -> &[SurfaceId] {
        &self.surfaces
    }
}

/// What a subscription listens to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    Resize,
    PointerMove,
    Scroll,
    AnimationFrame,
}

/// Registry of every listener and frame callback currently alive.
#[derive(Debug, Default)]
pub struct Subscriptions {
    active: SlotMap<SubscriptionKey, ListenerKind>,
}

impl Subscriptions {
    pub fn register(&mut self, kind: ListenerKind) -> SubscriptionKey {
        let key = self.active.insert(kind);
        log::trace!("registered {:?} listener {:?}", kind, key);
        key
    }

    /// Removes a registration. Removing twice is fine and returns `false`.
    pub fn remove(&mut self, key: SubscriptionKey) -> bool {
        self.active.remove(key).is_some()
    }

    pub fn is_active(&self, key: SubscriptionKey) -> bool {
        self.active.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn count(&self, kind: ListenerKind) -> usize {
        self.active.values().filter(|k| **k == kind).count()
    }
}

/// One-shot timers driven by the host clock (`setTimeout` in web terms).
#[derive(Debug, Default)]
pub struct Timers {
    now: Duration,
    pending: SlotMap<TimerKey, Duration>,
}

impl Timers {
    pub fn set_timeout(&mut self, after: Duration) -> TimerKey {
        let deadline = self.now + after;
        self.pending.insert(deadline)
    }

    pub fn clear(&mut self, key: TimerKey) -> bool {
        self.pending.remove(key).is_some()
    }

    pub fn is_pending(&self, key: TimerKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Moves the clock forward and returns every timer that fired, in
    /// deadline order. Fired timers are removed.
    pub fn advance(&mut self, dt: Duration) -> Vec<TimerKey> {
        self.now += dt;
        let now = self.now;
        let mut fired: Vec<(TimerKey, Duration)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(key, deadline)| (key, *deadline))
            .collect();
        fired.sort_by_key(|(_, deadline)| *deadline);
        fired
            .into_iter()
            .map(|(key, _)| {
                self.pending.remove(key);
                key
            })
            .collect()
    }
}

/// Pointer position in window (client) coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerPosition {
    pub x: f32,
    pub y: f32,
}

/// Events the host forwards to mounted visuals.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    Resize,
    PointerMove(PointerPosition),
}

/// Containers owned by the page layer, addressed by key so that a visual can
/// tolerate its container disappearing before it is disposed.
#[derive(Debug, Default)]
pub struct Containers {
    slots: SlotMap<ContainerKey, Container>,
}

impl Containers {
    pub fn insert(&mut self, container: Container) -> ContainerKey {
        self.slots.insert(container)
    }

    /// Detaches a container from the page. Anything still pointing at it
    /// observes `None` from now on.
    pub fn remove(&mut self, key: ContainerKey) -> Option<Container> {
        self.slots.remove(key)
    }

    pub fn get(&self, key: ContainerKey) -> Option<&Container> {
        self.slots.get(key)
    }

    pub fn get_mut(&mut self, key: ContainerKey) -> Option<&mut Container> {
        self.slots.get_mut(key)
    }

    pub fn attach(&mut self, key: ContainerKey, surface: SurfaceId) -> bool {
        match self.slots.get_mut(key) {
            Some(container) => {
                container.append(surface);
                true
            }
            None => false,
        }
    }

    /// Detaches `surface` if the container still exists and still holds it.
    pub fn detach(&mut self, key: ContainerKey, surface: SurfaceId) -> bool {
        let Some(container) = self.slots.get_mut(key) else {
            return false;
        };
        if !container.contains(surface) {
            return false;
        }
        container.remove(surface);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContainerKey, &Container)> {
        self.slots.iter()
    }
}
