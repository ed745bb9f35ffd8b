//! The animation runtime.
//!
//! The [`Sequencer`] lives in the application context. It owns every
//! animated element, runs free tweens and timelines on the host clock and
//! evaluates scroll triggers whenever the scroll offset changes. Removing an
//! element cancels everything that still refers to it.

use slotmap::{SlotMap, new_key_type};

use crate::{
    animation::{
        Element, ElementKey, Elements,
        props::{AnimatedProps, Prop},
        scroll::{ScrollTrigger, TriggerEvent},
        timeline::Timeline,
        tween::Tween,
    },
    host::Rect,
};

new_key_type! {
    pub struct TweenKey;
    pub struct TimelineKey;
    pub struct TriggerKey;
}

#[derive(Debug)]
struct Playing {
    tween: Tween,
    time: f32,
}

#[derive(Debug)]
struct Triggered {
    element: ElementKey,
    trigger: ScrollTrigger,
    tween: Tween,
    // running clock of a played tween
    clock: Option<f32>,
}

/// What [`Sequencer::remove_element`] cancelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Cancelled {
    pub tweens: usize,
    pub triggers: usize,
    pub timeline_tweens: usize,
}

#[derive(Debug, Default)]
pub struct Sequencer {
    elements: Elements,
    tweens: SlotMap<TweenKey, Playing>,
    timelines: SlotMap<TimelineKey, Timeline>,
    triggers: SlotMap<TriggerKey, Triggered>,
    scroll: f32,
    viewport_height: f32,
}

impl Sequencer {
    pub fn new(viewport_height: f32) -> Self {
        Self {
            viewport_height,
            ..Default::default()
        }
    }

    pub fn add_element(&mut self, rect: Rect) -> ElementKey {
        self.elements.insert(Element::new(rect))
    }

    pub fn element(&self, key: ElementKey) -> Option<&Element> {
        self.elements.get(key)
    }

    pub fn props(&self, key: ElementKey) -> Option<AnimatedProps> {
        self.elements.get(key).map(|e| e.props)
    }

    pub fn set_rect(&mut self, key: ElementKey, rect: Rect) {
        if let Some(element) = self.elements.get_mut(key) {
            element.rect = rect;
        }
    }

    /// Sets properties immediately, without animation.
    pub fn set(&mut self, key: ElementKey, values: &[(Prop, f32)]) -> bool {
        match self.elements.get_mut(key) {
            Some(element) => {
                element.props.apply(values);
                true
            }
            None => false,
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Starts a tween right away. Returns `None` if its target is gone.
    pub fn play(&mut self, mut tween: Tween) -> Option<TweenKey> {
        let element = self.elements.get_mut(tween.target())?;
        tween.render(&mut element.props, 0.0);
        Some(self.tweens.insert(Playing { tween, time: 0.0 }))
    }

    pub fn play_timeline(&mut self, mut timeline: Timeline) -> TimelineKey {
        timeline.seek(0.0, &mut self.elements);
        self.timelines.insert(timeline)
    }

    pub fn timeline(&self, key: TimelineKey) -> Option<&Timeline> {
        self.timelines.get(key)
    }

    /// Attaches `tween` to a scroll trigger on `element`. The trigger is
    /// evaluated against the current scroll offset straight away, so an
    /// element that is already in view starts animating immediately.
    pub fn on_scroll(
        &mut self,
        element: ElementKey,
        trigger: ScrollTrigger,
        tween: Tween,
    ) -> Option<TriggerKey> {
        let props = &mut self.elements.get_mut(element)?.props;
        tween.render_initial(props);
        let key = self.triggers.insert(Triggered {
            element,
            trigger,
            tween,
            clock: None,
        });
        self.evaluate(key);
        Some(key)
    }

    pub fn trigger(&self, key: TriggerKey) -> Option<&ScrollTrigger> {
        self.triggers.get(key).map(|t| &t.trigger)
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: f32) {
        self.viewport_height = height;
        self.evaluate_all();
    }

    pub fn scroll_to(&mut self, scroll: f32) {
        self.scroll = scroll;
        self.evaluate_all();
    }

    fn evaluate_all(&mut self) {
        let keys: Vec<TriggerKey> = self.triggers.keys().collect();
        for key in keys {
            self.evaluate(key);
        }
    }

    fn evaluate(&mut self, key: TriggerKey) {
        let Some(triggered) = self.triggers.get_mut(key) else {
            return;
        };
        let Some(element) = self.elements.get_mut(triggered.element) else {
            self.triggers.remove(key);
            return;
        };
        let event = triggered
            .trigger
            .update(self.scroll, &element.rect, self.viewport_height);
        match event {
            Some(TriggerEvent::Enter) => {
                log::debug!("scroll trigger {:?} entered at {}", key, self.scroll);
                triggered.clock = Some(0.0);
                triggered.tween.render(&mut element.props, 0.0);
            }
            Some(TriggerEvent::LeaveBack) => {
                triggered.clock = None;
                triggered.tween.reset(&mut element.props);
                triggered.tween.render_initial(&mut element.props);
            }
            Some(TriggerEvent::Progress(progress)) => {
                triggered.tween.render_progress(&mut element.props, progress);
            }
            None => {}
        }
    }

    /// Advances every running tween, timeline and triggered tween by `dt`
    /// seconds. Finished ones are dropped, as are spent triggers whose tween
    /// has completed.
    pub fn advance(&mut self, dt: f32) {
        let dt = dt.max(0.0);
        let elements = &mut self.elements;

        self.tweens.retain(|_, playing| {
            let Some(element) = elements.get_mut(playing.tween.target()) else {
                return false;
            };
            playing.time += dt;
            playing.tween.render(&mut element.props, playing.time);
            !playing.tween.is_complete(playing.time)
        });

        self.timelines
            .retain(|_, timeline| !timeline.advance(dt, elements));

        self.triggers.retain(|_, triggered| {
            let Some(element) = elements.get_mut(triggered.element) else {
                return false;
            };
            let Some(clock) = triggered.clock.as_mut() else {
                return true;
            };
            *clock += dt;
            triggered.tween.render(&mut element.props, *clock);
            let complete = triggered.tween.is_complete(*clock);
            if complete {
                triggered.clock = None;
            }
            !(complete && triggered.trigger.is_spent())
        });
    }

    pub fn kill_tween(&mut self, key: TweenKey) -> bool {
        self.tweens.remove(key).is_some()
    }

    pub fn kill_timeline(&mut self, key: TimelineKey) -> bool {
        self.timelines.remove(key).is_some()
    }

    pub fn kill_trigger(&mut self, key: TriggerKey) -> bool {
        self.triggers.remove(key).is_some()
    }

    /// Removes `key` and cancels every tween, timeline track and scroll
    /// trigger tied to it. Removing an unknown element does nothing.
    pub fn remove_element(&mut self, key: ElementKey) -> Cancelled {
        let mut cancelled = Cancelled::default();
        if self.elements.remove(key).is_none() {
            return cancelled;
        }
        let tweens = self.tweens.len();
        self.tweens.retain(|_, p| p.tween.target() != key);
        cancelled.tweens = tweens - self.tweens.len();

        let triggers = self.triggers.len();
        self.triggers.retain(|_, t| t.element != key);
        cancelled.triggers = triggers - self.triggers.len();

        for timeline in self.timelines.values_mut() {
            cancelled.timeline_tweens += timeline.remove_target(key);
        }
        self.timelines.retain(|_, timeline| !timeline.is_empty());
        log::debug!("removed element {:?}, cancelled {:?}", key, cancelled);
        cancelled
    }

    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    pub fn active_timelines(&self) -> usize {
        self.timelines.len()
    }

    pub fn active_triggers(&self) -> usize {
        self.triggers.len()
    }

    pub fn triggers_for(&self, element: ElementKey) -> usize {
        self.triggers.values().filter(|t| t.element == element).count()
    }

    /// Whether anything is still tied to `element`.
    pub fn is_animating(&self, element: ElementKey) -> bool {
        self.tweens.values().any(|p| p.tween.target() == element)
            || self.triggers.values().any(|t| t.element == element)
            || self
                .timelines
                .values()
                .any(|tl| tl.targets().any(|t| t == element))
    }
}
