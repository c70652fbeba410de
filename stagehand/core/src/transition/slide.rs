//! Slide one scene off screen and the next one on

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clock::SharedClock;
use crate::controller::ControllerHandle;
use crate::scene::SceneRef;
use crate::surface::Canvas;
use crate::transition::{Pacing, Transition, TransitionBase, TransitionPhase};
use crate::unit::Unit;

/// Which way the scenes move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SlideDirection {
    /// Source exits right, destination enters from the left
    #[default]
    LeftToRight,
    /// Source exits left, destination enters from the right
    RightToLeft,
    /// Source exits down, destination enters from the top
    TopToBottom,
    /// Source exits up, destination enters from the bottom
    BottomToTop,
}

impl SlideDirection {
    /// Offsets `(from, to)` in cells for a `width` x `height` frame at `offset`
    #[allow(clippy::cast_possible_truncation)]
    fn translations(self, width: u16, height: u16, offset: f64) -> ((i32, i32), (i32, i32)) {
        let offset = offset.clamp(0.0, 1.0);
        let w = i32::from(width);
        let h = i32::from(height);
        let along = |extent: i32, fraction: f64| (f64::from(extent) * fraction).round() as i32;

        match self {
            Self::LeftToRight => {
                let x = along(w, offset);
                ((x, 0), (x - w, 0))
            }
            Self::RightToLeft => {
                let x = along(w, 1.0 - offset);
                ((x - w, 0), (x, 0))
            }
            Self::TopToBottom => {
                let y = along(h, offset);
                ((0, y), (0, y - h))
            }
            Self::BottomToTop => {
                let y = along(h, 1.0 - offset);
                ((0, y - h), (0, y))
            }
        }
    }
}

impl fmt::Display for SlideDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeftToRight => write!(f, "left-to-right"),
            Self::RightToLeft => write!(f, "right-to-left"),
            Self::TopToBottom => write!(f, "top-to-bottom"),
            Self::BottomToTop => write!(f, "bottom-to-top"),
        }
    }
}

/// Slide between scenes
///
/// The offset climbs from 0 to 1. The step that finds it at (or past) 1
/// clamps it and commits, so the fully slid frame is presented once
/// before control moves on.
#[derive(Debug)]
pub struct SlideTransition<T> {
    base: TransitionBase<T>,
    pacing: Pacing,
    direction: SlideDirection,
    offset: f64,
}

impl<T> SlideTransition<T> {
    /// Slide that moves the offset by `factor` every step
    #[must_use]
    pub fn new(direction: SlideDirection, factor: f64) -> Self {
        Self::with_pacing(direction, Pacing::stepped(factor))
    }

    /// Slide lasting `duration` when ticked `ticks_per_second` times a second
    #[must_use]
    pub fn ticks_timed(
        direction: SlideDirection,
        ticks_per_second: f64,
        duration: Duration,
    ) -> Self {
        Self::with_pacing(direction, Pacing::ticks(ticks_per_second, duration))
    }

    /// Slide lasting `duration` of wall time
    #[must_use]
    pub fn timed(direction: SlideDirection, duration: Duration) -> Self {
        Self::with_pacing(direction, Pacing::timed(duration))
    }

    /// Slide lasting `duration` as measured by `clock`
    #[must_use]
    pub fn timed_with_clock(
        direction: SlideDirection,
        duration: Duration,
        clock: SharedClock,
    ) -> Self {
        Self::with_pacing(direction, Pacing::timed_with_clock(duration, clock))
    }

    /// Slide driven by an arbitrary pacing strategy
    #[must_use]
    pub fn with_pacing(direction: SlideDirection, pacing: Pacing) -> Self {
        Self {
            base: TransitionBase::new(),
            pacing,
            direction,
            offset: 0.0,
        }
    }

    /// How far the slide has moved (0.0..=1.0 once clamped)
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Direction of travel
    #[must_use]
    pub fn direction(&self) -> SlideDirection {
        self.direction
    }

    /// Pacing strategy driving this slide
    #[must_use]
    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    fn advance(&mut self) {
        if self.offset >= 1.0 {
            self.offset = 1.0;
            self.base.end();
        } else {
            self.offset = self.pacing.advance(0, 1);
        }
    }
}

impl<T> Unit for SlideTransition<T> {
    fn tick(&mut self) -> anyhow::Result<()> {
        if !self.base.is_running() {
            return Ok(());
        }
        self.base.tick_scenes()?;
        if self.base.claim_frame() {
            self.advance();
        }
        Ok(())
    }

    fn present(&mut self, canvas: &mut Canvas) {
        if let Some((from, to)) = self.base.pre_render(canvas) {
            let ((fx, fy), (tx, ty)) =
                self.direction
                    .translations(canvas.width(), canvas.height(), self.offset);
            canvas.blit(&to, tx, ty);
            canvas.blit(&from, fx, fy);
        }
        self.base.release_frame();
    }

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.base.resize(width, height)
    }
}

impl<T> Transition<T> for SlideTransition<T> {
    fn start(&mut self, from: SceneRef<T>, to: SceneRef<T>, controller: ControllerHandle<T>) {
        self.base.start(from, to, controller);
        self.pacing.begin();
        self.offset = 0.0;
    }

    fn end(&mut self) {
        self.base.end();
    }

    fn phase(&self) -> TransitionPhase {
        self.base.phase()
    }
}
