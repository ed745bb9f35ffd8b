//! Scroll-gated entrance animations for content blocks.

use std::str::FromStr;

use crate::animation::{
    ElementKey,
    easing::Ease,
    props::Prop,
    scroll::{Edge, ScrollTrigger, TriggerPosition},
    sequencer::{Sequencer, TriggerKey},
    tween::Tween,
};

/// Offset distance of the directional presets, in pixels.
const OFFSET: f32 = 30.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RevealKind {
    #[default]
    FadeUp,
    FadeDown,
    FadeLeft,
    FadeRight,
    ScaleIn,
    Rotate,
}

impl RevealKind {
    /// State applied before the first paint: invisible and displaced.
    pub fn initial(&self) -> Vec<(Prop, f32)> {
        let offset = match self {
            RevealKind::FadeUp => (Prop::Y, OFFSET),
            RevealKind::FadeDown => (Prop::Y, -OFFSET),
            RevealKind::FadeLeft => (Prop::X, OFFSET),
            RevealKind::FadeRight => (Prop::X, -OFFSET),
            RevealKind::ScaleIn => (Prop::Scale, 0.9),
            RevealKind::Rotate => (Prop::Rotation, 5.0),
        };
        vec![offset, (Prop::Opacity, 0.0)]
    }

    /// Resting state the reveal animates to.
    pub fn resting(&self) -> Vec<(Prop, f32)> {
        let prop = match self {
            RevealKind::FadeUp | RevealKind::FadeDown => (Prop::Y, 0.0),
            RevealKind::FadeLeft | RevealKind::FadeRight => (Prop::X, 0.0),
            RevealKind::ScaleIn => (Prop::Scale, 1.0),
            RevealKind::Rotate => (Prop::Rotation, 0.0),
        };
        vec![(Prop::Opacity, 1.0), prop]
    }
}

impl FromStr for RevealKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "fade-up" => RevealKind::FadeUp,
            "fade-down" => RevealKind::FadeDown,
            "fade-left" => RevealKind::FadeLeft,
            "fade-right" => RevealKind::FadeRight,
            "scale-in" => RevealKind::ScaleIn,
            "rotate" => RevealKind::Rotate,
            other => anyhow::bail!("unknown reveal animation '{}'", other),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RevealConfig {
    pub kind: RevealKind,
    pub duration: f32,
    pub delay: f32,
    pub ease: Ease,
    pub start: TriggerPosition,
    /// Progress follows the scroll offset instead of playing on entry.
    pub scrub: bool,
    /// Replays on every re-entry instead of firing once.
    pub replay: bool,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            kind: RevealKind::FadeUp,
            duration: 0.8,
            delay: 0.0,
            ease: Ease::POWER2_OUT,
            start: TriggerPosition::new(Edge::BOTTOM, Edge::BOTTOM),
            scrub: false,
            replay: false,
        }
    }
}

impl RevealConfig {
    pub fn kind(kind: RevealKind) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }
}

/// Hides `element` immediately and reveals it when its trigger is reached.
pub fn reveal(
    sequencer: &mut Sequencer,
    element: ElementKey,
    config: &RevealConfig,
) -> Option<TriggerKey> {
    if !sequencer.set(element, &config.kind.initial()) {
        log::warn!("reveal target {:?} is not mounted", element);
        return None;
    }
    let tween = Tween::to(element, &config.kind.resting(), config.duration)
        .with_delay(config.delay)
        .with_ease(config.ease);
    let trigger = if config.scrub {
        ScrollTrigger::scrub(config.start, TriggerPosition::new(Edge::BOTTOM, Edge::TOP))
    } else if config.replay {
        ScrollTrigger::replaying(config.start)
    } else {
        ScrollTrigger::play(config.start)
    };
    sequencer.on_scroll(element, trigger, tween)
}

/// Reveals `elements` in order, each `step` seconds after the previous.
pub fn reveal_staggered(
    sequencer: &mut Sequencer,
    elements: &[ElementKey],
    config: &RevealConfig,
    step: f32,
) -> Vec<TriggerKey> {
    elements
        .iter()
        .enumerate()
        .filter_map(|(i, element)| {
            let config = RevealConfig {
                delay: config.delay + i as f32 * step,
                ..config.clone()
            };
            reveal(sequencer, *element, &config)
        })
        .collect()
}
