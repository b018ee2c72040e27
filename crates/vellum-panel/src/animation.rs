//! Animation Driver
//!
//! Frame-driven tweens of inline `transform`/`opacity` for the panel
//! content and backdrop. Each tween hands back a [`Completion`]: a
//! one-shot signal that resolves when the tween reaches its end state, so
//! callers can write "await transition, then release".

use serde::{Deserialize, Serialize};
use smol::channel::{self, Receiver, Sender};
use vellum_dom::{Document, NodeId};

use crate::{Direction, PanelElements, TimingConfig};

/// Easing function (GSAP power curves: power1 = quad, power2 = cubic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    Power1In,
    Power1Out,
    Power1InOut,
    Power2In,
    Power2Out,
    Power2InOut,
}

impl Easing {
    /// Map linear progress `t` in `0..=1` onto the curve
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Power1In => ease_in(t, 2),
            Self::Power1Out => ease_out(t, 2),
            Self::Power1InOut => ease_in_out(t, 2),
            Self::Power2In => ease_in(t, 3),
            Self::Power2Out => ease_out(t, 3),
            Self::Power2InOut => ease_in_out(t, 3),
        }
    }
}

fn ease_in(t: f64, power: i32) -> f64 {
    t.powi(power)
}

fn ease_out(t: f64, power: i32) -> f64 {
    1.0 - (1.0 - t).powi(power)
}

fn ease_in_out(t: f64, power: i32) -> f64 {
    if t < 0.5 {
        ease_in(t * 2.0, power) / 2.0
    } else {
        1.0 - ease_in((1.0 - t) * 2.0, power) / 2.0
    }
}

/// Animated property values at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    /// `translateX` in percent; `None` leaves `transform` untouched
    pub translate_x: Option<f64>,
    pub opacity: f64,
}

impl Keyframe {
    pub fn opacity(opacity: f64) -> Self {
        Self { translate_x: None, opacity }
    }

    pub fn slide(translate_x: f64, opacity: f64) -> Self {
        Self { translate_x: Some(translate_x), opacity }
    }

    fn lerp(&self, to: &Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            translate_x: match (self.translate_x, to.translate_x) {
                (Some(a), Some(b)) => Some(mix(a, b)),
                (_, b) => b,
            },
            opacity: mix(self.opacity, to.opacity),
        }
    }

    fn write(&self, doc: &mut Document, target: NodeId) {
        if let Some(x) = self.translate_x {
            doc.set_style(target, "transform", &format!("translateX({}%)", x));
        }
        doc.set_style(target, "opacity", &self.opacity.to_string());
    }
}

/// Animation timing options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationTiming {
    pub duration_ms: f64,
    pub easing: Easing,
}

/// Animation playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationPlayState {
    /// Scheduled, waiting for its first frame
    #[default]
    Idle,
    Running,
    Finished,
}

/// One-shot "transition finished" signal
#[derive(Debug)]
pub struct Completion {
    rx: Receiver<()>,
}

impl Completion {
    fn pair() -> (Sender<()>, Self) {
        let (tx, rx) = channel::bounded(1);
        (tx, Self { rx })
    }

    fn ready() -> Self {
        let (tx, completion) = Self::pair();
        let _ = tx.try_send(());
        completion
    }

    /// Resolves `true` once the transition completes, or `false` if it was
    /// cancelled (the driver dropped it).
    pub async fn finished(self) -> bool {
        self.rx.recv().await.is_ok()
    }

    /// Completed already (without waiting)
    pub fn is_ready(&self) -> bool {
        !self.rx.is_empty()
    }
}

struct Tween {
    target: NodeId,
    from: Keyframe,
    to: Keyframe,
    timing: AnimationTiming,
    start_time: Option<f64>,
    play_state: AnimationPlayState,
    done: Sender<()>,
}

impl Tween {
    /// Advance to `now`; returns true once finished
    fn update(&mut self, doc: &mut Document, now: f64) -> bool {
        let start = *self.start_time.get_or_insert(now);
        self.play_state = AnimationPlayState::Running;

        let progress = if self.timing.duration_ms > 0.0 {
            ((now - start) / self.timing.duration_ms).clamp(0.0, 1.0)
        } else {
            1.0
        };
        if progress >= 1.0 {
            self.to.write(doc, self.target);
            self.play_state = AnimationPlayState::Finished;
            let _ = self.done.try_send(());
            return true;
        }

        self.from
            .lerp(&self.to, self.timing.easing.apply(progress))
            .write(doc, self.target);
        false
    }
}

/// Drives all running tweens from animation frames
#[derive(Default)]
pub struct Animator {
    tweens: Vec<Tween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tween `target` from `from` to `to`. The start values apply at once;
    /// the clock starts on the next frame. With `reduced` motion only the
    /// end state is written and the returned completion is already fulfilled.
    pub fn animate(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        from: Keyframe,
        to: Keyframe,
        timing: AnimationTiming,
        reduced: bool,
    ) -> Completion {
        if reduced {
            to.write(doc, target);
            return Completion::ready();
        }

        from.write(doc, target);
        let (done, completion) = Completion::pair();
        self.tweens.push(Tween {
            target,
            from,
            to,
            timing,
            start_time: None,
            play_state: AnimationPlayState::Idle,
            done,
        });
        completion
    }

    /// Advance every tween to `now` (milliseconds). Returns how many
    /// finished on this frame.
    pub fn advance(&mut self, doc: &mut Document, now: f64) -> usize {
        let before = self.tweens.len();
        self.tweens.retain_mut(|tween| !tween.update(doc, now));
        before - self.tweens.len()
    }

    /// Drop all tweens; their completions resolve as cancelled
    pub fn cancel_all(&mut self) {
        if !self.tweens.is_empty() {
            tracing::debug!("cancelling {} running tween(s)", self.tweens.len());
        }
        self.tweens.clear();
    }

    /// Nothing is running
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty()
    }

    /// Play state of the most recent tween on `target`
    pub fn play_state(&self, target: NodeId) -> Option<AnimationPlayState> {
        self.tweens.iter().rev().find(|t| t.target == target).map(|t| t.play_state)
    }

    /// Panel enter: content slides in from its side while fading up; the
    /// backdrop fades in on its own shorter clock. Completion tracks the
    /// content.
    pub fn enter(
        &mut self,
        doc: &mut Document,
        panel: &PanelElements,
        direction: Direction,
        timing: &TimingConfig,
        reduced: bool,
    ) -> Completion {
        self.animate(
            doc,
            panel.backdrop,
            Keyframe::opacity(0.0),
            Keyframe::opacity(1.0),
            AnimationTiming { duration_ms: timing.backdrop_enter_ms, easing: timing.backdrop_enter_easing },
            reduced,
        );
        self.animate(
            doc,
            panel.content,
            Keyframe::slide(direction.offscreen_percent(), timing.content_offscreen_opacity),
            Keyframe::slide(0.0, 1.0),
            AnimationTiming { duration_ms: timing.content_ms, easing: timing.enter_easing },
            reduced,
        )
    }

    /// Panel exit: mirror of [`Animator::enter`]. Completion tracks the
    /// content, never the backdrop.
    pub fn exit(
        &mut self,
        doc: &mut Document,
        panel: &PanelElements,
        direction: Direction,
        timing: &TimingConfig,
        reduced: bool,
    ) -> Completion {
        self.animate(
            doc,
            panel.backdrop,
            Keyframe::opacity(1.0),
            Keyframe::opacity(0.0),
            AnimationTiming { duration_ms: timing.backdrop_exit_ms, easing: timing.backdrop_exit_easing },
            reduced,
        );
        let end_opacity = if reduced { 0.0 } else { timing.content_offscreen_opacity };
        self.animate(
            doc,
            panel.content,
            Keyframe::slide(0.0, 1.0),
            Keyframe::slide(direction.offscreen_percent(), end_opacity),
            AnimationTiming { duration_ms: timing.content_ms, easing: timing.exit_easing },
            reduced,
        )
    }
}
