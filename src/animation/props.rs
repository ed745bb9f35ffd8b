//! Declarative animated state of one element.
//!
//! Tweens never touch a DOM node or GPU object. They write [`AnimatedProps`]
//! and whatever draws the element reads them back.

/// A single animatable property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prop {
    Opacity,
    /// Horizontal offset in pixels.
    X,
    /// Vertical offset in pixels.
    Y,
    /// Vertical offset as a percentage of the element's own height.
    YPercent,
    Scale,
    /// Rotation in degrees.
    Rotation,
    /// Width as a percentage of the parent.
    WidthPercent,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimatedProps {
    pub opacity: f32,
    pub x: f32,
    pub y: f32,
    pub y_percent: f32,
    pub scale: f32,
    pub rotation: f32,
    pub width_percent: f32,
}

impl Default for AnimatedProps {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            x: 0.0,
            y: 0.0,
            y_percent: 0.0,
            scale: 1.0,
            rotation: 0.0,
            width_percent: 100.0,
        }
    }
}

impl AnimatedProps {
    pub fn get(&self, prop: Prop) -> f32 {
        match prop {
            Prop::Opacity => self.opacity,
            Prop::X => self.x,
            Prop::Y => self.y,
            Prop::YPercent => self.y_percent,
            Prop::Scale => self.scale,
            Prop::Rotation => self.rotation,
            Prop::WidthPercent => self.width_percent,
        }
    }

    pub fn set(&mut self, prop: Prop, value: f32) {
        let slot = match prop {
            Prop::Opacity => &mut self.opacity,
            Prop::X => &mut self.x,
            Prop::Y => &mut self.y,
            Prop::YPercent => &mut self.y_percent,
            Prop::Scale => &mut self.scale,
            Prop::Rotation => &mut self.rotation,
            Prop::WidthPercent => &mut self.width_percent,
        };
        *slot = value;
    }

    pub fn apply(&mut self, values: &[(Prop, f32)]) {
        for (prop, value) in values {
            self.set(*prop, *value);
        }
    }

    /// Total vertical translation for an element `height` pixels tall.
    pub fn translate_y(&self, height: f32) -> f32 {
        self.y + self.y_percent / 100.0 * height
    }

    /// The resting state every reveal animates towards.
    pub fn is_at_rest(&self) -> bool {
        *self == AnimatedProps::default()
    }
}
