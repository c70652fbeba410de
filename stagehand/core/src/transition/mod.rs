//! Transitions between scenes
//!
//! A transition is a [`Unit`] that stands in the controller's current slot
//! while control moves from a source scene to a destination scene. Both
//! scenes keep ticking while it runs; the destination is already loaded
//! with the payload before the first animated frame.
//!
//! # Lifecycle
//!
//! ```text
//!         start()              progress reaches its bound / end()
//!   Idle ─────────► Running ─────────────────────────────────────► Committed
//!                      ▲                                               │
//!                      └────────────────── start() ────────────────────┘
//! ```
//!
//! Committing posts `return_from_transition(dest, source)` to the
//! controller, which installs the destination as current. A transition
//! commits at most once per run; it can be started again afterwards, which
//! is how a director reuses the transition registered on a rule.
//!
//! # Effects
//!
//! - [`FadeTransition`]: fades to black, then up into the destination
//! - [`SlideTransition`]: pushes the source off screen in one of four
//!   directions
//!
//! Each effect is paced by a [`Pacing`] strategy: a fixed factor per step, a
//! factor derived from a tick rate, or elapsed time on a
//! [`Clock`](crate::clock::Clock).

pub mod fade;
pub mod pacing;
pub mod slide;

pub use fade::FadeTransition;
pub use pacing::{calculate_progress, duration_to_factor, Pacing};
pub use slide::{SlideDirection, SlideTransition};

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::controller::ControllerHandle;
use crate::scene::SceneRef;
use crate::surface::{pre_render, Canvas};
use crate::unit::Unit;

/// An animated hand-off between two scenes
pub trait Transition<T>: Unit {
    /// Begin a run from `from` to `to`, reporting back through `controller`
    fn start(&mut self, from: SceneRef<T>, to: SceneRef<T>, controller: ControllerHandle<T>);

    /// Commit immediately
    ///
    /// Has no effect unless the transition is running.
    fn end(&mut self);

    /// Where the transition is in its lifecycle
    fn phase(&self) -> TransitionPhase;
}

/// Lifecycle state of a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPhase {
    /// Never started
    #[default]
    Idle,
    /// Animating between two scenes
    Running,
    /// Finished and handed control to the destination
    Committed,
}

impl fmt::Display for TransitionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Running => write!(f, "running"),
            Self::Committed => write!(f, "committed"),
        }
    }
}

// =============================================================================
// Shared Transition Handle
// =============================================================================

/// Shared handle to a transition
///
/// Like [`SceneRef`], compares by identity.
pub struct TransitionRef<T>(Rc<RefCell<dyn Transition<T>>>);

impl<T> TransitionRef<T> {
    /// Wrap a transition in a new shared handle
    #[must_use]
    pub fn new<X: Transition<T> + 'static>(transition: X) -> Self {
        Self(Rc::new(RefCell::new(transition)))
    }

    /// Check whether this handle points at the same transition as `transition`
    #[must_use]
    pub fn is<X>(&self, transition: &Rc<RefCell<X>>) -> bool {
        self.addr() == Rc::as_ptr(transition).cast::<()>()
    }

    /// Check whether two handles point at the same transition
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    /// Lifecycle state of the transition
    ///
    /// # Panics
    ///
    /// Panics if called from inside the transition's own `tick` or `present`.
    #[must_use]
    pub fn phase(&self) -> TransitionPhase {
        self.0.borrow().phase()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, dyn Transition<T>> {
        self.0.borrow_mut()
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }
}

impl<T, X: Transition<T> + 'static> From<Rc<RefCell<X>>> for TransitionRef<T> {
    fn from(transition: Rc<RefCell<X>>) -> Self {
        Self(transition)
    }
}

impl<T> Clone for TransitionRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for TransitionRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for TransitionRef<T> {}

impl<T> Hash for TransitionRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T> fmt::Debug for TransitionRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransitionRef").field(&self.addr()).finish()
    }
}

// =============================================================================
// Transition Base
// =============================================================================

struct Endpoints<T> {
    from: SceneRef<T>,
    to: SceneRef<T>,
    controller: ControllerHandle<T>,
}

/// State every transition effect shares
///
/// Holds the endpoints and the controller handle of the current run, the
/// lifecycle phase, and the once-per-frame guard: progress may advance only
/// once between two presents, however many times the host ticks.
pub struct TransitionBase<T> {
    endpoints: Option<Endpoints<T>>,
    phase: TransitionPhase,
    frame_updated: bool,
}

impl<T> TransitionBase<T> {
    /// A base that has never been started
    #[must_use]
    pub fn new() -> Self {
        Self {
            endpoints: None,
            phase: TransitionPhase::Idle,
            frame_updated: false,
        }
    }

    /// Record the endpoints of a new run and enter [`TransitionPhase::Running`]
    pub fn start(&mut self, from: SceneRef<T>, to: SceneRef<T>, controller: ControllerHandle<T>) {
        tracing::debug!(from = ?from, to = ?to, "transition started");
        self.endpoints = Some(Endpoints {
            from,
            to,
            controller,
        });
        self.phase = TransitionPhase::Running;
        self.frame_updated = false;
    }

    /// Commit the current run
    ///
    /// Posts `return_from_transition(to, from)` to the controller. Does
    /// nothing unless running.
    pub fn end(&mut self) {
        if self.phase != TransitionPhase::Running {
            tracing::debug!(phase = %self.phase, "end() ignored, transition is not running");
            return;
        }
        self.phase = TransitionPhase::Committed;
        if let Some(ends) = &self.endpoints {
            tracing::debug!(from = ?ends.from, to = ?ends.to, "transition committed");
            ends.controller
                .return_from_transition(ends.to.clone(), ends.from.clone());
        }
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    /// Check whether the transition is running
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == TransitionPhase::Running
    }

    /// Source scene of the current (or last) run
    #[must_use]
    pub fn source(&self) -> Option<&SceneRef<T>> {
        self.endpoints.as_ref().map(|ends| &ends.from)
    }

    /// Destination scene of the current (or last) run
    #[must_use]
    pub fn destination(&self) -> Option<&SceneRef<T>> {
        self.endpoints.as_ref().map(|ends| &ends.to)
    }

    /// Tick both endpoints
    ///
    /// Both are always ticked; if both fail, the source's error wins.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by either scene.
    pub fn tick_scenes(&mut self) -> anyhow::Result<()> {
        let Some(ends) = &self.endpoints else {
            return Ok(());
        };
        let from = ends.from.borrow_mut().tick();
        let to = ends.to.borrow_mut().tick();
        from.and(to)
    }

    /// Resize both endpoints and return the larger of each dimension
    pub fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        let Some(ends) = &self.endpoints else {
            return (width, height);
        };
        let (fw, fh) = ends.from.borrow_mut().resize(width, height);
        let (tw, th) = ends.to.borrow_mut().resize(width, height);
        (fw.max(tw), fh.max(th))
    }

    /// Present both endpoints offscreen at the size of `target`
    ///
    /// Returns `(from, to)`, or `None` before the first start.
    #[must_use]
    pub fn pre_render(&self, target: &Canvas) -> Option<(Canvas, Canvas)> {
        let ends = self.endpoints.as_ref()?;
        if ends.from.ptr_eq(&ends.to) {
            let mut canvas = Canvas::new(target.width(), target.height());
            ends.from.borrow_mut().present(&mut canvas);
            return Some((canvas.clone(), canvas));
        }
        let mut from = ends.from.borrow_mut();
        let mut to = ends.to.borrow_mut();
        Some(pre_render(target.width(), target.height(), &mut *from, &mut *to))
    }

    /// Claim this frame's progress step
    ///
    /// Returns `true` at most once between two calls to
    /// [`release_frame`](Self::release_frame).
    pub fn claim_frame(&mut self) -> bool {
        if self.frame_updated {
            return false;
        }
        self.frame_updated = true;
        true
    }

    /// Allow progress to advance again; called after presenting
    pub fn release_frame(&mut self) {
        self.frame_updated = false;
    }
}

impl<T> Default for TransitionBase<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for TransitionBase<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionBase")
            .field("phase", &self.phase)
            .field("source", &self.source())
            .field("destination", &self.destination())
            .field("frame_updated", &self.frame_updated)
            .finish()
    }
}
