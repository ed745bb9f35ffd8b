//! Scroll triggers.
//!
//! A trigger position is written `"<element edge> <viewport edge>"`, for
//! example `"top 80%"`: the trigger point is reached when the element's top
//! edge meets the line 80% down the viewport. Edges are `top`, `center`,
//! `bottom`, a percentage or a pixel offset.

use std::str::FromStr;

use crate::host::Rect;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    /// Fraction of the box height from its top (`top` = 0, `bottom` = 1).
    Fraction(f32),
    /// Pixels from the top of the box.
    Pixels(f32),
}

impl Edge {
    pub const TOP: Edge = Edge::Fraction(0.0);
    pub const CENTER: Edge = Edge::Fraction(0.5);
    pub const BOTTOM: Edge = Edge::Fraction(1.0);

    pub fn offset(&self, extent: f32) -> f32 {
        match *self {
            Edge::Fraction(f) => f * extent,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Edge::TOP),
            "center" => Ok(Edge::CENTER),
            "bottom" => Ok(Edge::BOTTOM),
            _ => {
                if let Some(percent) = s.strip_suffix('%') {
                    Ok(Edge::Fraction(percent.parse::<f32>()? / 100.0))
                } else if let Some(px) = s.strip_suffix("px") {
                    Ok(Edge::Pixels(px.parse::<f32>()?))
                } else {
                    Ok(Edge::Pixels(s.parse::<f32>().map_err(|_| {
                        anyhow::anyhow!("unknown trigger edge '{}'", s)
                    })?))
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPosition {
    pub element: Edge,
    pub viewport: Edge,
}

impl TriggerPosition {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which this position is reached for `element` (in
    /// document coordinates) and a viewport `viewport_height` tall.
    pub fn scroll_offset(&self, element: &Rect, viewport_height: f32) -> f32 {
        element.y + self.element.offset(element.height) - self.viewport.offset(viewport_height)
    }
}

impl FromStr for TriggerPosition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let element = parts
            .next()
            .ok_or_else(|| anyhow::anyhow!("empty trigger position"))?
            .parse()?;
        // a single edge applies to the element and the viewport alike
        let viewport = match parts.next() {
            Some(edge) => edge.parse()?,
            None => element,
        };
        if let Some(extra) = parts.next() {
            anyhow::bail!("unexpected '{}' in trigger position '{}'", extra, s);
        }
        Ok(Self { element, viewport })
    }
}

/// How a trigger drives its tween.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerMode {
    /// Plays the tween once the start point is passed. With `replay` the
    /// tween resets when scrolling back above the start and plays again on
    /// the next pass.
    Play { replay: bool },
    /// Tween progress follows the scroll offset between start and end.
    Scrub { end: TriggerPosition },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TriggerEvent {
    Enter,
    LeaveBack,
    Progress(f32),
}

/// Scroll condition attached to one element.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollTrigger {
    pub start: TriggerPosition,
    pub mode: TriggerMode,
    inside: bool,
    fired: u32,
    last_progress: Option<f32>,
}

impl ScrollTrigger {
    pub fn play(start: TriggerPosition) -> Self {
        Self::with_mode(start, TriggerMode::Play { replay: false })
    }

    pub fn replaying(start: TriggerPosition) -> Self {
        Self::with_mode(start, TriggerMode::Play { replay: true })
    }

    pub fn scrub(start: TriggerPosition, end: TriggerPosition) -> Self {
        Self::with_mode(start, TriggerMode::Scrub { end })
    }

    fn with_mode(start: TriggerPosition, mode: TriggerMode) -> Self {
        Self {
            start,
            mode,
            inside: false,
            fired: 0,
            last_progress: None,
        }
    }

    /// Times the trigger has entered.
    pub fn fired(&self) -> u32 {
        self.fired
    }

    /// A play-once trigger is spent after its first entry.
    pub fn is_spent(&self) -> bool {
        matches!(self.mode, TriggerMode::Play { replay: false }) && self.fired > 0
    }

    /// Evaluates the trigger for scroll offset `scroll`.
    pub fn update(
        &mut self,
        scroll: f32,
        element: &Rect,
        viewport_height: f32,
    ) -> Option<TriggerEvent> {
        let start = self.start.scroll_offset(element, viewport_height);
        match self.mode {
            TriggerMode::Play { replay } => {
                if self.is_spent() {
                    return None;
                }
                let past = scroll >= start;
                if past && !self.inside {
                    self.inside = true;
                    self.fired += 1;
                    Some(TriggerEvent::Enter)
                } else if !past && self.inside && replay {
                    self.inside = false;
                    Some(TriggerEvent::LeaveBack)
                } else {
                    None
                }
            }
            TriggerMode::Scrub { end } => {
                let end = end.scroll_offset(element, viewport_height);
                let progress = if end <= start {
                    if scroll >= start { 1.0 } else { 0.0 }
                } else {
                    ((scroll - start) / (end - start)).clamp(0.0, 1.0)
                };
                if self.last_progress == Some(progress) {
                    return None;
                }
                if progress > 0.0 && !self.inside {
                    self.inside = true;
                    self.fired += 1;
                }
                self.last_progress = Some(progress);
                Some(TriggerEvent::Progress(progress))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_edges() {
        let p: TriggerPosition = "top 80%".parse().unwrap();
        assert_eq!(p, TriggerPosition::new(Edge::TOP, Edge::Fraction(0.8)));
        let p: TriggerPosition = "bottom top".parse().unwrap();
        assert_eq!(p, TriggerPosition::new(Edge::BOTTOM, Edge::TOP));
        assert!("sideways top".parse::<TriggerPosition>().is_err());
    }
}
