//! Fade through black
//!
//! The fade runs in two phases. While *fading in*, alpha climbs from 0 to 1
//! and the source scene darkens. Once alpha reaches 1 the fade flips to
//! *fading out*: alpha falls back to 0 while the destination brightens.
//! Reaching 0 commits the transition.

use std::time::Duration;

use crate::clock::SharedClock;
use crate::controller::ControllerHandle;
use crate::scene::SceneRef;
use crate::surface::Canvas;
use crate::transition::{Pacing, Transition, TransitionBase, TransitionPhase};
use crate::unit::Unit;

const PHASES: u32 = 2;

/// Two-phase fade between scenes
///
/// # Examples
///
/// ```
/// use stagehand_core::transition::FadeTransition;
///
/// let fade = FadeTransition::<u32>::new(0.05);
/// assert_eq!(fade.alpha(), 0.0);
/// ```
#[derive(Debug)]
pub struct FadeTransition<T> {
    base: TransitionBase<T>,
    pacing: Pacing,
    alpha: f32,
    fading_in: bool,
}

impl<T> FadeTransition<T> {
    /// Fade that moves alpha by `factor` every step
    #[must_use]
    pub fn new(factor: f32) -> Self {
        Self::with_pacing(Pacing::stepped(f64::from(factor)))
    }

    /// Fade lasting `duration` when ticked `ticks_per_second` times a second
    #[must_use]
    pub fn ticks_timed(ticks_per_second: f64, duration: Duration) -> Self {
        Self::with_pacing(Pacing::ticks(ticks_per_second, duration))
    }

    /// Fade lasting `duration` of wall time
    #[must_use]
    pub fn timed(duration: Duration) -> Self {
        Self::with_pacing(Pacing::timed(duration))
    }

    /// Fade lasting `duration` as measured by `clock`
    #[must_use]
    pub fn timed_with_clock(duration: Duration, clock: SharedClock) -> Self {
        Self::with_pacing(Pacing::timed_with_clock(duration, clock))
    }

    /// Fade driven by an arbitrary pacing strategy
    #[must_use]
    pub fn with_pacing(pacing: Pacing) -> Self {
        Self {
            base: TransitionBase::new(),
            pacing,
            alpha: 0.0,
            fading_in: true,
        }
    }

    /// Darkness of the screen (0.0 = scene fully visible, 1.0 = black)
    #[must_use]
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Check whether the fade is still in its first phase
    #[must_use]
    pub fn is_fading_in(&self) -> bool {
        self.fading_in
    }

    /// Pacing strategy driving this fade
    #[must_use]
    pub fn pacing(&self) -> &Pacing {
        &self.pacing
    }

    #[allow(clippy::cast_possible_truncation)]
    fn advance(&mut self) {
        if self.fading_in {
            self.alpha = self.pacing.advance(0, PHASES) as f32;
            if self.alpha >= 1.0 {
                self.alpha = 1.0;
                self.fading_in = false;
                self.pacing.next_phase();
            }
        } else {
            self.alpha = (1.0 - self.pacing.advance(1, PHASES)) as f32;
            if self.alpha <= 0.0 {
                self.alpha = 0.0;
                self.base.end();
            }
        }
    }
}

impl<T> Unit for FadeTransition<T> {
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
        if let Some((mut from, mut to)) = self.base.pre_render(canvas) {
            if self.fading_in {
                from.dim(self.alpha);
                canvas.blit(&from, 0, 0);
            } else {
                to.dim(self.alpha);
                canvas.blit(&to, 0, 0);
            }
        }
        self.base.release_frame();
    }

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.base.resize(width, height)
    }
}

impl<T> Transition<T> for FadeTransition<T> {
    fn start(&mut self, from: SceneRef<T>, to: SceneRef<T>, controller: ControllerHandle<T>) {
        self.base.start(from, to, controller);
        self.pacing.begin();
        self.alpha = 0.0;
        self.fading_in = true;
    }

    fn end(&mut self) {
        self.base.end();
    }

    fn phase(&self) -> TransitionPhase {
        self.base.phase()
    }
}
