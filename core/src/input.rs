//! Input arbitration: several devices report raw pointer activity at once, only
//! one of them may drive a drag at a time.
//!
//! Each source gets an [`ActivationConstraint`]. A press is promoted to a drag
//! once its constraint is met; from then on every other source is ignored until
//! that drag is released or cancelled. When several sources qualify in the same
//! tick the one declared first in [`InputKind`] wins.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::geometry::ScreenPoint;

/// Input device classes, in arbitration priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    // coarse, mouse-like pointer
    Mouse,
    // precision pointer (pen, stylus)
    Pointer,
    Touch,
}

impl InputKind {
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::Mouse => "mouse",
            InputKind::Pointer => "pointer",
            InputKind::Touch => "touch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActivationConstraint {
    // minimum travel from the press origin
    pub distance: Option<f32>,
    // minimum hold time
    pub delay: Option<Duration>,
    // maximum drift allowed while waiting out `delay`
    pub tolerance: Option<f32>,
}

impl ActivationConstraint {
    pub fn distance(distance: f32) -> Self {
        Self {
            distance: Some(distance),
            ..Default::default()
        }
    }

    pub fn delay(delay: Duration, tolerance: f32) -> Self {
        Self {
            delay: Some(delay),
            tolerance: Some(tolerance),
            ..Default::default()
        }
    }

    fn is_satisfied(&self, press: &Press, now: Duration) -> bool {
        let held = self
            .delay
            .is_none_or(|delay| now.saturating_sub(press.started) >= delay);
        let travelled = self
            .distance
            .is_none_or(|distance| press.origin.distance(press.current) >= distance);
        held && travelled
    }

    // Drifting too far before the hold completes turns the press into noise.
    fn is_broken(&self, press: &Press, at: Duration) -> bool {
        match (self.delay, self.tolerance) {
            (Some(delay), Some(tolerance)) => {
                at.saturating_sub(press.started) < delay
                    && press.origin.distance(press.current) > tolerance
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputSource {
    pub kind: InputKind,
    pub constraint: ActivationConstraint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArbiterConfig {
    pub sources: Vec<InputSource>,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                InputSource {
                    kind: InputKind::Mouse,
                    constraint: ActivationConstraint::distance(10.0),
                },
                InputSource {
                    kind: InputKind::Pointer,
                    constraint: ActivationConstraint::distance(8.0),
                },
                InputSource {
                    kind: InputKind::Touch,
                    constraint: ActivationConstraint::delay(Duration::from_millis(250), 5.0),
                },
            ],
        }
    }
}

impl ArbiterConfig {
    pub fn with_constraint(mut self, kind: InputKind, constraint: ActivationConstraint) -> Self {
        match self.sources.iter_mut().find(|s| s.kind == kind) {
            Some(source) => source.constraint = constraint,
            None => self.sources.push(InputSource { kind, constraint }),
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputPhase {
    Down,
    Move,
    Up,
    Cancel,
}

/// One raw report from a device. `time` is measured on the same clock as the
/// `now` passed to [`Arbiter::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputEvent {
    pub kind: InputKind,
    pub phase: InputPhase,
    pub point: ScreenPoint,
    pub time: Duration,
}

impl InputEvent {
    pub fn new(kind: InputKind, phase: InputPhase, point: ScreenPoint, time: Duration) -> Self {
        Self {
            kind,
            phase,
            point,
            time,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArmedGesture {
    pub kind: InputKind,
    pub origin: ScreenPoint,
    pub current: ScreenPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureSignal {
    Armed(ArmedGesture),
    Moved(ScreenPoint),
    Released(ScreenPoint),
    Cancelled,
    // press and release that never qualified as a drag
    Tap(InputKind, ScreenPoint),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    origin: ScreenPoint,
    current: ScreenPoint,
    started: Duration,
}

/// Pick the authoritative gesture among everything that qualified this tick.
pub fn arbitrate(candidates: impl IntoIterator<Item = ArmedGesture>) -> Option<ArmedGesture> {
    candidates
        .into_iter()
        .fold(None, |best: Option<ArmedGesture>, next| match best {
            Some(best) if best.kind <= next.kind => Some(best),
            _ => Some(next),
        })
}

#[derive(Debug, Clone)]
pub struct Arbiter {
    sources: Vec<(InputSource, Option<Press>)>,
    active: Option<InputKind>,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl Arbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        Self {
            sources: config.sources.into_iter().map(|s| (s, None)).collect(),
            active: None,
        }
    }

    // Source currently driving a drag.
    pub fn active(&self) -> Option<InputKind> {
        self.active
    }

    // True while any source is pressed or driving a drag. Hold constraints
    // only complete if the caller keeps ticking during this time.
    pub fn is_pressed(&self) -> bool {
        self.active.is_some() || self.sources.iter().any(|(_, press)| press.is_some())
    }

    /// Feed one tick of raw events. Returns what happened to the authoritative
    /// gesture, in order.
    ///
    /// Constraints are checked at each event's own timestamp, so a press that
    /// qualifies and is released within one tick still arms before it releases.
    /// Events sharing a timestamp qualify together and are arbitrated by priority.
    pub fn tick(&mut self, now: Duration, events: &[InputEvent]) -> Vec<GestureSignal> {
        let mut signals = Vec::new();

        let mut rest = events;
        while let Some(first) = rest.first() {
            if self.active.is_some() {
                self.follow(first, &mut signals);
                rest = &rest[1..];
                continue;
            }
            let len = rest.iter().take_while(|e| e.time == first.time).count();
            let (instant, tail) = rest.split_at(len);
            self.collect(instant, first.time, &mut signals);
            rest = tail;
        }

        // holds complete with time alone
        if self.active.is_none() {
            if let Some(armed) = self.try_arm(now) {
                signals.push(GestureSignal::Armed(armed));
            }
        }

        signals
    }

    fn follow(&mut self, event: &InputEvent, signals: &mut Vec<GestureSignal>) {
        if Some(event.kind) != self.active {
            return;
        }
        match event.phase {
            InputPhase::Down => {}
            InputPhase::Move => signals.push(GestureSignal::Moved(event.point)),
            InputPhase::Up => {
                self.release_all();
                signals.push(GestureSignal::Released(event.point));
            }
            InputPhase::Cancel => {
                self.release_all();
                signals.push(GestureSignal::Cancelled);
            }
        }
    }

    // Events of one instant while nothing is armed. Releases are held back
    // until the instant has been checked for a qualifying press.
    fn collect(&mut self, instant: &[InputEvent], at: Duration, signals: &mut Vec<GestureSignal>) {
        let mut lifted = Vec::new();
        for event in instant {
            let Some((source, press)) = self.sources.iter_mut().find(|(s, _)| s.kind == event.kind)
            else {
                continue;
            };
            match event.phase {
                InputPhase::Down => {
                    if press.is_none() {
                        *press = Some(Press {
                            origin: event.point,
                            current: event.point,
                            started: event.time,
                        });
                    }
                }
                InputPhase::Move => {
                    if let Some(p) = press.as_mut() {
                        p.current = event.point;
                        if source.constraint.is_broken(p, event.time) {
                            log::debug!("{} press drifted before hold completed", event.kind.label());
                            *press = None;
                        }
                    }
                }
                InputPhase::Up => {
                    if let Some(p) = press.as_mut() {
                        p.current = event.point;
                        lifted.push((event.kind, event.point));
                    }
                }
                InputPhase::Cancel => *press = None,
            }
        }

        if let Some(armed) = self.try_arm(at) {
            signals.push(GestureSignal::Armed(armed));
            if let Some(&(_, point)) = lifted.iter().find(|(kind, _)| *kind == armed.kind) {
                self.release_all();
                signals.push(GestureSignal::Released(point));
            }
            return;
        }

        for (kind, point) in lifted {
            if let Some((_, press)) = self.sources.iter_mut().find(|(s, _)| s.kind == kind) {
                if press.take().is_some() {
                    signals.push(GestureSignal::Tap(kind, point));
                }
            }
        }
    }

    fn try_arm(&mut self, at: Duration) -> Option<ArmedGesture> {
        let qualified = self.sources.iter().filter_map(|(source, press)| {
            let press = press.as_ref()?;
            source.constraint.is_satisfied(press, at).then_some(ArmedGesture {
                kind: source.kind,
                origin: press.origin,
                current: press.current,
            })
        });
        let armed = arbitrate(qualified)?;
        log::debug!("{} armed a drag", armed.kind.label());
        self.active = Some(armed.kind);
        // losers are dropped, not queued
        for (source, press) in &mut self.sources {
            if source.kind != armed.kind {
                *press = None;
            }
        }
        Some(armed)
    }

    // Abort whatever is in flight, e.g. on escape.
    pub fn cancel(&mut self) -> Option<GestureSignal> {
        let was_active = self.active.is_some();
        self.release_all();
        was_active.then_some(GestureSignal::Cancelled)
    }

    fn release_all(&mut self) {
        self.active = None;
        for (_, press) in &mut self.sources {
            *press = None;
        }
    }
}
