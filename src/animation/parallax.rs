//! Scroll-linked parallax.
//!
//! [`ParallaxLayer`] moves a section background by a fraction of the scroll
//! distance while the section is on screen. [`InteriorSection`] combines a
//! one-shot content reveal with a scroll-scrubbed drift of the section's
//! visual.

use crate::{
    animation::{
        ElementKey,
        easing::Ease,
        props::Prop,
        scroll::{Edge, ScrollTrigger, TriggerPosition},
        sequencer::{Sequencer, TriggerKey},
        tween::Tween,
    },
    context::Context,
    host::{ListenerKind, Rect, SubscriptionKey},
};

pub const DEFAULT_SPEED: f32 = 0.15;

/// Background layer of a section, translated by
/// `(scroll - section_top) * speed` whenever the section is in view.
#[derive(Debug)]
pub struct ParallaxLayer {
    section: Rect,
    speed: f32,
    translate_y: f32,
    listener: Option<SubscriptionKey>,
}

impl ParallaxLayer {
    pub fn mount(ctx: &mut Context, section: Rect, speed: f32) -> Self {
        let listener = ctx.subscriptions.register(ListenerKind::Scroll);
        let mut layer = Self {
            section,
            speed,
            translate_y: 0.0,
            listener: Some(listener),
        };
        layer.on_scroll(ctx.sequencer.scroll(), ctx.viewport().1 as f32);
        layer
    }

    pub fn set_section(&mut self, section: Rect) {
        self.section = section;
    }

    /// Whether any part of the section is inside the viewport.
    pub fn in_view(&self, scroll: f32, viewport_height: f32) -> bool {
        scroll + viewport_height >= self.section.y
            && scroll <= self.section.y + self.section.height
    }

    /// Outside the view the last offset is kept.
    pub fn on_scroll(&mut self, scroll: f32, viewport_height: f32) {
        if self.listener.is_none() {
            return;
        }
        if self.in_view(scroll, viewport_height) {
            self.translate_y = (scroll - self.section.y) * self.speed;
        }
    }

    pub fn translate_y(&self) -> f32 {
        self.translate_y
    }

    pub fn dispose(&mut self, ctx: &mut Context) {
        if let Some(listener) = self.listener.take() {
            ctx.subscriptions.remove(listener);
        }
    }
}

/// The interior section: the text block fades up once the section's top
/// passes 80% of the viewport, and the floor plan container drifts up by
/// 50 px as the section scrolls through.
#[derive(Debug)]
pub struct InteriorSection {
    pub section: ElementKey,
    pub content: ElementKey,
    pub visual: ElementKey,
    pub content_trigger: Option<TriggerKey>,
    pub drift_trigger: Option<TriggerKey>,
}

impl InteriorSection {
    pub const DRIFT: f32 = -50.0;

    pub fn mount(sequencer: &mut Sequencer, section: Rect, content: Rect, visual: Rect) -> Self {
        let section_key = sequencer.add_element(section);
        let content_key = sequencer.add_element(content);
        let visual_key = sequencer.add_element(visual);

        let reveal = Tween::from_to(
            content_key,
            &[(Prop::Opacity, 0.0), (Prop::Y, 50.0)],
            &[(Prop::Opacity, 1.0), (Prop::Y, 0.0)],
            1.0,
        )
        .with_ease(Ease::POWER2_OUT);
        // the trigger is the section, the tween moves the content
        let content_trigger = sequencer.on_scroll(
            content_key,
            ScrollTrigger::play(Self::trigger_relative_to(
                &section,
                &content,
                TriggerPosition::new(Edge::TOP, Edge::Fraction(0.8)),
            )),
            reveal,
        );

        let drift = Tween::to(visual_key, &[(Prop::Y, Self::DRIFT)], 0.5).with_ease(Ease::Linear);
        let drift_trigger = sequencer.on_scroll(
            visual_key,
            ScrollTrigger::scrub(
                Self::trigger_relative_to(
                    &section,
                    &visual,
                    TriggerPosition::new(Edge::TOP, Edge::BOTTOM),
                ),
                Self::trigger_relative_to(
                    &section,
                    &visual,
                    TriggerPosition::new(Edge::BOTTOM, Edge::TOP),
                ),
            ),
            drift,
        );

        Self {
            section: section_key,
            content: content_key,
            visual: visual_key,
            content_trigger,
            drift_trigger,
        }
    }

    /// Rewrites a position measured on `section` as one measured on
    /// `target`, so the trigger fires at the same scroll offset.
    fn trigger_relative_to(
        section: &Rect,
        target: &Rect,
        position: TriggerPosition,
    ) -> TriggerPosition {
        let section_edge = section.y + position.element.offset(section.height);
        TriggerPosition::new(Edge::Pixels(section_edge - target.y), position.viewport)
    }

    pub fn unmount(&self, sequencer: &mut Sequencer) {
        for element in [self.content, self.visual, self.section] {
            sequencer.remove_element(element);
        }
    }
}
