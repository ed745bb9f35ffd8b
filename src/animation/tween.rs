use crate::animation::{
    ElementKey,
    easing::Ease,
    props::{AnimatedProps, Prop},
};

/// Time-bounded interpolation of some properties of one element.
///
/// A `to` tween starts from whatever values the element holds when the
/// tween first renders past its delay. A `from_to` tween has explicit start
/// values and applies them as soon as it is rendered at all, so the element
/// never shows its resting state before the tween begins.
#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    target: ElementKey,
    from: Option<Vec<(Prop, f32)>>,
    to: Vec<(Prop, f32)>,
    duration: f32,
    delay: f32,
    ease: Ease,
    captured: Option<Vec<(Prop, f32)>>,
}

impl Tween {
    pub fn to(target: ElementKey, to: &[(Prop, f32)], duration: f32) -> Self {
        Self {
            target,
            from: None,
            to: to.to_vec(),
            duration: duration.max(0.0),
            delay: 0.0,
            ease: Ease::default(),
            captured: None,
        }
    }

    pub fn from_to(
        target: ElementKey,
        from: &[(Prop, f32)],
        to: &[(Prop, f32)],
        duration: f32,
    ) -> Self {
        Self {
            from: Some(from.to_vec()),
            ..Self::to(target, to, duration)
        }
    }

    pub fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay.max(0.0);
        self
    }

    /// Same tween aimed at another element.
    pub fn retarget(&self, target: ElementKey) -> Self {
        Self {
            target,
            captured: None,
            ..self.clone()
        }
    }

    pub fn target(&self) -> ElementKey {
        self.target
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn ease(&self) -> Ease {
        self.ease
    }

    pub fn end_values(&self) -> &[(Prop, f32)] {
        &self.to
    }

    /// Delay plus duration.
    pub fn total(&self) -> f32 {
        self.delay + self.duration
    }

    pub fn has_started(&self) -> bool {
        self.captured.is_some()
    }

    /// Writes the explicit start values, if any.
    pub fn render_initial(&self, props: &mut AnimatedProps) {
        if let Some(from) = &self.from {
            props.apply(from);
        }
    }

    /// Renders the tween at `local` seconds after it was scheduled,
    /// delay included.
    pub fn render(&mut self, props: &mut AnimatedProps, local: f32) {
        if local < self.delay {
            if !self.has_started() {
                self.render_initial(props);
            }
            return;
        }
        let progress = if self.duration <= 0.0 {
            1.0
        } else {
            (local - self.delay) / self.duration
        };
        self.render_progress(props, progress);
    }

    /// Renders at linear progress `progress` (clamped to `[0, 1]`), easing
    /// applied.
    pub fn render_progress(&mut self, props: &mut AnimatedProps, progress: f32) {
        if self.captured.is_none() {
            self.render_initial(props);
            let start = self.to.iter().map(|(prop, _)| (*prop, props.get(*prop))).collect();
            self.captured = Some(start);
        }
        let Some(start) = &self.captured else {
            return;
        };
        let eased = self.ease.apply(progress);
        for ((prop, from), (_, to)) in start.iter().zip(&self.to) {
            props.set(*prop, from + (to - from) * eased);
        }
    }

    /// Puts the element back where the tween found it and forgets the
    /// captured start.
    pub fn reset(&mut self, props: &mut AnimatedProps) {
        if let Some(start) = self.captured.take() {
            props.apply(&start);
        }
    }

    pub fn is_complete(&self, local: f32) -> bool {
        local >= self.total()
    }
}
