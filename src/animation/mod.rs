//! Tween-based animation of page elements.
//!
//! Everything here works on plain [`AnimatedProps`](props::AnimatedProps)
//! keyed by [`ElementKey`]. The [`Sequencer`](sequencer::Sequencer) owns the
//! elements, runs free tweens and [`Timeline`](timeline::Timeline)s against
//! the host clock, and starts or scrubs tweens from scroll triggers.
//!
//! - `easing`: `powerN` easing curves
//! - `props`: the animatable state of one element
//! - `tween`, `timeline`: interpolation and sequencing
//! - `scroll`: trigger positions and scroll triggers
//! - `sequencer`: the runtime that drives all of the above
//! - `reveal`, `splash`, `parallax`: the concrete page animations

pub mod easing;
pub mod parallax;
pub mod props;
pub mod reveal;
pub mod scroll;
pub mod sequencer;
pub mod splash;
pub mod timeline;
pub mod tween;

use slotmap::{SlotMap, new_key_type};

use crate::{animation::props::AnimatedProps, host::Rect};

new_key_type! {
    /// An animated page element (text block, overlay, visual container).
    pub struct ElementKey;
}

/// Layout box (document coordinates) and animated state of an element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub rect: Rect,
    pub props: AnimatedProps,
}

impl Element {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            props: AnimatedProps::default(),
        }
    }
}

pub type Elements = SlotMap<ElementKey, Element>;
