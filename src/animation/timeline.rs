use std::str::FromStr;

use crate::animation::{ElementKey, Elements, tween::Tween};

/// Where a tween is placed in a [`Timeline`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// Right after the current end of the timeline.
    End,
    /// Offset from the current end, `"-=0.5"` or `"+=1"`.
    Relative(f32),
    /// Absolute time from the start of the timeline.
    Absolute(f32),
    /// Same start as the previously added tween, `"<"`.
    WithPrevious,
}

impl FromStr for Position {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == ">" {
            return Ok(Position::End);
        }
        if s == "<" {
            return Ok(Position::WithPrevious);
        }
        if let Some(offset) = s.strip_prefix("-=") {
            return Ok(Position::Relative(-offset.trim().parse::<f32>()?));
        }
        if let Some(offset) = s.strip_prefix("+=") {
            return Ok(Position::Relative(offset.trim().parse::<f32>()?));
        }
        Ok(Position::Absolute(s.parse::<f32>()?))
    }
}

#[derive(Clone, Debug)]
struct Entry {
    start: f32,
    tween: Tween,
    done: bool,
}

/// Tweens placed on a shared clock. Playback only moves forward.
#[derive(Clone, Debug, Default)]
pub struct Timeline {
    entries: Vec<Entry>,
    time: f32,
    end: f32,
    last_start: f32,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve(&self, position: Position) -> f32 {
        let start = match position {
            Position::End => self.end,
            Position::Relative(offset) => self.end + offset,
            Position::Absolute(at) => at,
            Position::WithPrevious => self.last_start,
        };
        start.max(0.0)
    }

    fn insert(&mut self, start: f32, tween: Tween) {
        self.end = self.end.max(start + tween.total());
        // keep start order, stable for equal starts
        let index = self.entries.partition_point(|e| e.start <= start);
        self.entries.insert(
            index,
            Entry {
                start,
                tween,
                done: false,
            },
        );
    }

    /// Adds `tween` at `position` and returns the resolved start time. The
    /// tween's own delay is counted from there.
    pub fn add(&mut self, tween: Tween, position: Position) -> f32 {
        let start = self.resolve(position);
        self.insert(start, tween);
        self.last_start = start;
        start
    }

    /// Adds one copy of `tween` per target, each starting `stagger` seconds
    /// after the previous one.
    pub fn add_staggered(
        &mut self,
        targets: &[ElementKey],
        tween: Tween,
        stagger: f32,
        position: Position,
    ) -> f32 {
        let start = self.resolve(position);
        for (i, target) in targets.iter().enumerate() {
            self.insert(start + i as f32 * stagger, tween.retarget(*target));
        }
        self.last_start = start;
        start
    }

    /// Total length in seconds.
    pub fn duration(&self) -> f32 {
        self.end
    }

    pub fn time(&self) -> f32 {
        self.time
    }

    pub fn is_complete(&self) -> bool {
        self.time >= self.end
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(target, start, start + delay, end)` of every tween in start order.
    pub fn schedule(&self) -> Vec<(ElementKey, f32, f32, f32)> {
        self.entries
            .iter()
            .map(|e| {
                (
                    e.tween.target(),
                    e.start,
                    e.start + e.tween.delay(),
                    e.start + e.tween.total(),
                )
            })
            .collect()
    }

    pub fn targets(&self) -> impl Iterator<Item = ElementKey> + '_ {
        self.entries.iter().map(|e| e.tween.target())
    }

    /// Drops every tween aimed at `target`.
    pub fn remove_target(&mut self, target: ElementKey) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.tween.target() != target);
        before - self.entries.len()
    }

    /// Renders the timeline at absolute time `time`. Tweens are rendered in
    /// start order so later tweens win on shared properties.
    pub fn seek(&mut self, time: f32, elements: &mut Elements) {
        self.time = self.time.max(time);
        let now = self.time;
        for entry in self.entries.iter_mut().filter(|e| !e.done) {
            let local = now - entry.start;
            if local < 0.0 {
                continue;
            }
            let Some(element) = elements.get_mut(entry.tween.target()) else {
                entry.done = true;
                continue;
            };
            entry.tween.render(&mut element.props, local);
            entry.done = entry.tween.is_complete(local);
        }
    }

    /// Advances by `dt` seconds. Returns `true` once complete.
    pub fn advance(&mut self, dt: f32, elements: &mut Elements) -> bool {
        let time = self.time + dt.max(0.0);
        self.seek(time, elements);
        self.is_complete()
    }
}
