//! Splash screen shown on first load.
//!
//! Two independent parts: the [`SplashScreen`] timeline (logo and text in,
//! rules sweep across, everything out, overlay slides off) and the
//! [`SplashGate`], a fixed timer after which the page content is shown and
//! the splash is unmounted. Content visibility depends only on the gate, never
//! on how far the timeline got or on resource loading.

use instant::Duration;

use crate::{
    animation::{
        ElementKey,
        easing::Ease,
        props::Prop,
        sequencer::{Cancelled, Sequencer, TimelineKey},
        timeline::{Position, Timeline},
        tween::Tween,
    },
    context::Context,
    host::{Rect, TimerKey, Timers},
};

#[derive(Clone, Debug, PartialEq)]
pub struct SplashConfig {
    /// How long the splash covers the page.
    pub gate: Duration,
}

impl Default for SplashConfig {
    fn default() -> Self {
        Self {
            gate: Duration::from_millis(2500),
        }
    }
}

/// The animated parts of the splash screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplashElements {
    pub overlay: ElementKey,
    pub logo: ElementKey,
    pub text: ElementKey,
    pub rules: ElementKey,
    pub lines: [ElementKey; 3],
}

impl SplashElements {
    fn all(&self) -> impl Iterator<Item = ElementKey> + '_ {
        [self.overlay, self.logo, self.text, self.rules]
            .into_iter()
            .chain(self.lines)
    }
}

/// The splash sequence, 4.2 s long:
///
/// | start | end | what |
/// |---|---|---|
/// | 0.0 | 1.0 | logo fades in and grows from 0.8 |
/// | 0.5 | 1.3 | text fades in, rising 20 px |
/// | 1.0 | 2.0 | three rules sweep to full width, 0.1 s apart |
/// | 3.0 | 3.6 | logo, text and rules rise 20 px and fade out |
/// | 3.4 | 4.2 | overlay slides up out of view |
pub fn splash_timeline(elements: &SplashElements) -> Timeline {
    let mut timeline = Timeline::new();
    timeline.add(
        Tween::to(elements.logo, &[(Prop::Opacity, 1.0), (Prop::Scale, 1.0)], 1.0)
            .with_ease(Ease::POWER3_OUT),
        Position::End,
    );
    timeline.add(
        Tween::to(elements.text, &[(Prop::Opacity, 1.0), (Prop::Y, 0.0)], 0.8)
            .with_ease(Ease::POWER2_OUT),
        Position::Relative(-0.5),
    );
    timeline.add_staggered(
        &elements.lines,
        Tween::to(elements.lines[0], &[(Prop::WidthPercent, 100.0)], 0.8)
            .with_ease(Ease::POWER2_IN_OUT),
        0.1,
        Position::Relative(-0.3),
    );
    timeline.add_staggered(
        &[elements.logo, elements.text, elements.rules],
        Tween::to(elements.logo, &[(Prop::Y, -20.0), (Prop::Opacity, 0.0)], 0.6)
            .with_delay(1.0)
            .with_ease(Ease::POWER2_IN),
        0.0,
        Position::End,
    );
    timeline.add(
        Tween::to(elements.overlay, &[(Prop::YPercent, -100.0)], 0.8)
            .with_ease(Ease::POWER3_IN_OUT),
        Position::Relative(-0.2),
    );
    timeline
}

/// Mounted splash screen: its elements and running timeline.
#[derive(Debug)]
pub struct SplashScreen {
    elements: SplashElements,
    timeline: TimelineKey,
}

impl SplashScreen {
    /// Adds the splash elements covering `viewport`, applies their initial
    /// state and starts the sequence.
    pub fn mount(sequencer: &mut Sequencer, viewport: Rect) -> Self {
        let overlay = sequencer.add_element(viewport);
        let logo = sequencer.add_element(Rect::new(0.0, 0.0, 96.0, 96.0));
        let text = sequencer.add_element(Rect::new(0.0, 0.0, 320.0, 80.0));
        let rules = sequencer.add_element(Rect::new(0.0, 0.0, 320.0, 20.0));
        let lines = [0; 3].map(|_| sequencer.add_element(Rect::new(0.0, 0.0, 320.0, 1.0)));
        let elements = SplashElements {
            overlay,
            logo,
            text,
            rules,
            lines,
        };

        sequencer.set(logo, &[(Prop::Opacity, 0.0), (Prop::Scale, 0.8)]);
        sequencer.set(text, &[(Prop::Opacity, 0.0), (Prop::Y, 20.0)]);
        for line in lines {
            sequencer.set(line, &[(Prop::WidthPercent, 0.0)]);
        }
        let timeline = sequencer.play_timeline(splash_timeline(&elements));
        Self { elements, timeline }
    }

    pub fn elements(&self) -> &SplashElements {
        &self.elements
    }

    pub fn timeline(&self) -> TimelineKey {
        self.timeline
    }

    /// Removes every splash element, cancelling the timeline.
    pub fn unmount(self, sequencer: &mut Sequencer) -> Cancelled {
        let mut total = Cancelled::default();
        sequencer.kill_timeline(self.timeline);
        for element in self.elements.all() {
            let cancelled = sequencer.remove_element(element);
            total.tweens += cancelled.tweens;
            total.triggers += cancelled.triggers;
            total.timeline_tweens += cancelled.timeline_tweens;
        }
        total
    }
}

/// Fixed-duration gate in front of the page content.
#[derive(Debug, Default)]
pub struct SplashGate {
    timer: Option<TimerKey>,
    deadline: Duration,
    opened_at: Option<Duration>,
}

impl SplashGate {
    pub fn start(timers: &mut Timers, config: &SplashConfig) -> Self {
        Self {
            timer: Some(timers.set_timeout(config.gate)),
            deadline: timers.now() + config.gate,
            opened_at: None,
        }
    }

    /// Opens the gate if its timer is among `fired`. Returns `true` on the
    /// call that opens it.
    pub fn poll(&mut self, fired: &[TimerKey]) -> bool {
        match self.timer {
            Some(timer) if fired.contains(&timer) => {
                self.timer = None;
                self.opened_at = Some(self.deadline);
                true
            }
            _ => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.opened_at.is_some()
    }

    /// Host time at which the gate opened: its timer's deadline, whatever
    /// the granularity of the clock that fired it.
    pub fn opened_at(&self) -> Option<Duration> {
        self.opened_at
    }

    /// Clears the pending timer, if any.
    pub fn cancel(&mut self, timers: &mut Timers) {
        if let Some(timer) = self.timer.take() {
            timers.clear(timer);
        }
    }
}

/// Splash screen plus gate, as mounted by the application on start.
#[derive(Debug)]
pub struct Splash {
    screen: Option<SplashScreen>,
    gate: SplashGate,
}

impl Splash {
    pub fn start(ctx: &mut Context, config: &SplashConfig) -> Self {
        let viewport = ctx.viewport_rect();
        let screen = SplashScreen::mount(&mut ctx.sequencer, viewport);
        let gate = SplashGate::start(&mut ctx.timers, config);
        log::info!("splash started, content shown after {:?}", config.gate);
        Self {
            screen: Some(screen),
            gate,
        }
    }

    /// Feeds timers fired this tick. Returns `true` on the tick the content
    /// becomes visible; the splash is unmounted at that point.
    pub fn update(&mut self, ctx: &mut Context, fired: &[TimerKey]) -> bool {
        if !self.gate.poll(fired) {
            return false;
        }
        if let Some(screen) = self.screen.take() {
            let cancelled = screen.unmount(&mut ctx.sequencer);
            log::info!(
                "splash gate opened at {:?}, cancelled {} timeline tweens",
                self.gate.opened_at(),
                cancelled.timeline_tweens
            );
        }
        true
    }

    pub fn content_visible(&self) -> bool {
        self.gate.is_open()
    }

    pub fn gate(&self) -> &SplashGate {
        &self.gate
    }

    pub fn screen(&self) -> Option<&SplashScreen> {
        self.screen.as_ref()
    }

    pub fn dispose(&mut self, ctx: &mut Context) {
        self.gate.cancel(&mut ctx.timers);
        if let Some(screen) = self.screen.take() {
            screen.unmount(&mut ctx.sequencer);
        }
    }
}
