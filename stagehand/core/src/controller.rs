//! The controller capability
//!
//! Scenes and transitions talk back to whoever drives them through a
//! [`ControllerHandle`]. The handle is a cheap, non-owning value: dropping
//! the controller turns every outstanding handle into a no-op.
//!
//! # Architecture
//!
//! ```text
//!   SceneManager / SceneDirector
//!            │ owns
//!            ▼
//!   ┌──────────────────────────────┐      weak      ┌──────────────────┐
//!   │ Stage                        │◄───────────────│ ControllerHandle │
//!   │  slot:  current + rule table │                └──────────────────┘
//!   │  queue: pending requests     │
//!   └──────────────────────────────┘
//! ```
//!
//! Every call the controller makes into a scene or a transition happens
//! while the slot is borrowed. A request that arrives during such a call
//! (a scene asking to switch from inside its own `tick`, a transition
//! committing from inside its `tick`) is queued and applied, in order, the
//! moment the controller call that produced it returns. A request that
//! arrives while the controller is idle (a test ending a transition by
//! hand, say) is applied immediately.
//!
//! Either way, by the time any controller method returns, every request
//! made during it has taken effect.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::director::{RuleSet, Trigger};
use crate::scene::SceneRef;
use crate::transition::TransitionRef;

// =============================================================================
// Requests
// =============================================================================

/// A request posted through a [`ControllerHandle`]
pub(crate) enum Request<T> {
    SwitchTo(SceneRef<T>),
    SwitchWithTransition {
        scene: SceneRef<T>,
        transition: TransitionRef<T>,
    },
    ReturnFromTransition {
        dest: SceneRef<T>,
        origin: SceneRef<T>,
    },
    Trigger(Trigger),
}

impl<T> Request<T> {
    fn kind(&self) -> &'static str {
        match self {
            Self::SwitchTo(_) => "switch_to",
            Self::SwitchWithTransition { .. } => "switch_with_transition",
            Self::ReturnFromTransition { .. } => "return_from_transition",
            Self::Trigger(_) => "trigger",
        }
    }
}

// =============================================================================
// Current Slot
// =============================================================================

/// What a controller is currently driving
pub enum Current<T> {
    /// A scene is active
    Scene(SceneRef<T>),
    /// A transition is running
    Transition(TransitionRef<T>),
}

impl<T> Current<T> {
    /// The active scene, if no transition is running
    #[must_use]
    pub fn scene(&self) -> Option<&SceneRef<T>> {
        match self {
            Self::Scene(scene) => Some(scene),
            Self::Transition(_) => None,
        }
    }

    /// The running transition, if any
    #[must_use]
    pub fn transition(&self) -> Option<&TransitionRef<T>> {
        match self {
            Self::Scene(_) => None,
            Self::Transition(transition) => Some(transition),
        }
    }

    pub(crate) fn tick(&self) -> anyhow::Result<()> {
        match self {
            Self::Scene(scene) => scene.borrow_mut().tick(),
            Self::Transition(transition) => transition.borrow_mut().tick(),
        }
    }

    pub(crate) fn present(&self, canvas: &mut crate::surface::Canvas) {
        match self {
            Self::Scene(scene) => scene.borrow_mut().present(canvas),
            Self::Transition(transition) => transition.borrow_mut().present(canvas),
        }
    }

    pub(crate) fn resize(&self, width: u16, height: u16) -> (u16, u16) {
        match self {
            Self::Scene(scene) => scene.borrow_mut().resize(width, height),
            Self::Transition(transition) => transition.borrow_mut().resize(width, height),
        }
    }
}

impl<T> Clone for Current<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Scene(scene) => Self::Scene(scene.clone()),
            Self::Transition(transition) => Self::Transition(transition.clone()),
        }
    }
}

impl<T> fmt::Debug for Current<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scene(scene) => f.debug_tuple("Scene").field(scene).finish(),
            Self::Transition(transition) => f.debug_tuple("Transition").field(transition).finish(),
        }
    }
}

/// Mutable controller state: the current unit and the rule table
///
/// A manager's rule table stays empty, so triggers never match.
pub(crate) struct Slot<T> {
    pub(crate) current: Current<T>,
    pub(crate) rules: RuleSet<T>,
}

impl<T> Slot<T> {
    fn apply(&mut self, request: Request<T>, handle: &ControllerHandle<T>) {
        tracing::trace!(request = request.kind(), "applying controller request");
        match request {
            Request::SwitchTo(scene) => self.switch_to(scene, handle),
            Request::SwitchWithTransition { scene, transition } => {
                self.switch_with_transition(scene, transition, handle);
            }
            Request::ReturnFromTransition { dest, origin } => {
                self.return_from_transition(dest, origin, handle);
            }
            Request::Trigger(trigger) => self.process_trigger(trigger, handle),
        }
    }
}

// =============================================================================
// Stage
// =============================================================================

/// Shared core of a controller
pub(crate) struct Stage<T> {
    slot: RefCell<Slot<T>>,
    queue: RefCell<VecDeque<Request<T>>>,
}

impl<T> Stage<T> {
    /// Make `scene` current and load it with `state`
    pub(crate) fn install(scene: SceneRef<T>, state: T, rules: RuleSet<T>) -> Rc<Self> {
        let stage = Rc::new(Self {
            slot: RefCell::new(Slot {
                current: Current::Scene(scene.clone()),
                rules,
            }),
            queue: RefCell::new(VecDeque::new()),
        });

        {
            let _driving = stage.slot.borrow();
            scene.borrow_mut().load(state, stage.handle());
        }
        tracing::debug!(scene = ?scene, "initial scene loaded");

        stage.drain();
        stage
    }

    pub(crate) fn handle(self: &Rc<Self>) -> ControllerHandle<T> {
        ControllerHandle {
            stage: Rc::downgrade(self),
        }
    }

    /// Queue `request` and apply it unless the controller is busy
    pub(crate) fn submit(self: &Rc<Self>, request: Request<T>) {
        self.queue.borrow_mut().push_back(request);
        self.drain();
    }

    /// Apply queued requests in order
    ///
    /// If the slot is already borrowed, some controller call further up the
    /// stack is driving a unit and will drain once that returns.
    pub(crate) fn drain(self: &Rc<Self>) {
        let Ok(mut slot) = self.slot.try_borrow_mut() else {
            return;
        };
        let handle = self.handle();
        loop {
            let next = self.queue.borrow_mut().pop_front();
            let Some(request) = next else {
                break;
            };
            slot.apply(request, &handle);
        }
    }

    /// Run `f` against the current unit, then apply whatever it requested
    pub(crate) fn drive<R>(self: &Rc<Self>, f: impl FnOnce(&Current<T>) -> R) -> R {
        let result = {
            let slot = self.slot.borrow();
            f(&slot.current)
        };
        self.drain();
        result
    }

    pub(crate) fn current(&self) -> Current<T> {
        self.slot.borrow().current.clone()
    }

    pub(crate) fn slot(&self) -> Ref<'_, Slot<T>> {
        self.slot.borrow()
    }

    pub(crate) fn slot_mut(&self) -> RefMut<'_, Slot<T>> {
        self.slot.borrow_mut()
    }
}

// =============================================================================
// Controller Handle
// =============================================================================

/// Non-owning address of a scene controller
///
/// Handed to every scene in [`Scene::load`](crate::Scene::load) and to every
/// transition in [`Transition::start`](crate::Transition::start).
pub struct ControllerHandle<T> {
    stage: Weak<Stage<T>>,
}

impl<T> ControllerHandle<T> {
    /// A handle bound to no controller
    ///
    /// Requests made through it are dropped. Useful for driving a transition
    /// or a scene by hand.
    #[must_use]
    pub fn detached() -> Self {
        Self { stage: Weak::new() }
    }

    /// Check whether the controller behind this handle still exists
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.stage.strong_count() > 0
    }

    /// Ask the controller to switch directly to `scene`
    pub fn switch_to(&self, scene: SceneRef<T>) {
        self.post(Request::SwitchTo(scene));
    }

    /// Ask the controller to switch to `scene` through `transition`
    pub fn switch_with_transition(&self, scene: SceneRef<T>, transition: TransitionRef<T>) {
        self.post(Request::SwitchWithTransition { scene, transition });
    }

    /// Report that a transition from `origin` to `dest` has finished
    pub fn return_from_transition(&self, dest: SceneRef<T>, origin: SceneRef<T>) {
        self.post(Request::ReturnFromTransition { dest, origin });
    }

    /// Fire a trigger; only a director acts on it
    pub fn trigger(&self, trigger: impl Into<Trigger>) {
        self.post(Request::Trigger(trigger.into()));
    }

    fn post(&self, request: Request<T>) {
        match self.stage.upgrade() {
            Some(stage) => stage.submit(request),
            None => tracing::trace!(
                request = request.kind(),
                "controller handle is detached, dropping request"
            ),
        }
    }
}

impl<T> Clone for ControllerHandle<T> {
    fn clone(&self) -> Self {
        Self {
            stage: Weak::clone(&self.stage),
        }
    }
}

impl<T> Default for ControllerHandle<T> {
    fn default() -> Self {
        Self::detached()
    }
}

impl<T> fmt::Debug for ControllerHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerHandle")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{shared, MockScene, ScriptedAction};

    #[test]
    fn test_detached_handle_drops_requests() {
        let handle = ControllerHandle::<u32>::detached();
        assert!(!handle.is_attached());
        handle.switch_to(SceneRef::new(MockScene::new("a")));
        handle.trigger(1);
    }

    #[test]
    fn test_idle_controller_applies_immediately() {
        let first = shared(MockScene::new("first"));
        let stage = Stage::install(first.clone().into(), 7, RuleSet::new());
        let handle = stage.handle();
        assert!(handle.is_attached());

        let second = shared(MockScene::new("second"));
        handle.switch_to(second.clone().into());

        assert!(stage.current().scene().is_some_and(|s| s.is(&second)));
        assert_eq!(second.borrow().loads, vec![7]);
    }

    #[test]
    fn test_requests_during_drive_wait_for_it_to_finish() {
        let second = shared(MockScene::new("second"));
        let first = shared(
            MockScene::new("first").on_tick(ScriptedAction::SwitchTo(second.clone().into())),
        );
        let stage = Stage::install(first.clone().into(), 3, RuleSet::new());

        let still_first = stage.drive(|current| {
            current.tick().unwrap();
            current.scene().is_some_and(|s| s.is(&first))
        });

        assert!(still_first);
        assert!(stage.current().scene().is_some_and(|s| s.is(&second)));
        assert_eq!(first.borrow().ticks, 1);
    }

    #[test]
    fn test_request_from_load_is_applied_after_install() {
        let second = shared(MockScene::new("second"));
        let first = shared(
            MockScene::new("first").on_load(ScriptedAction::SwitchTo(second.clone().into())),
        );
        let stage = Stage::install(first.clone().into(), 11, RuleSet::new());

        assert!(stage.current().scene().is_some_and(|s| s.is(&second)));
        assert_eq!(second.borrow().loads, vec![11]);
    }

    #[test]
    fn test_handle_outliving_controller_is_detached() {
        let handle = {
            let stage = Stage::install(SceneRef::new(MockScene::new("a")), 0_u32, RuleSet::new());
            stage.handle()
        };
        assert!(!handle.is_attached());
        handle.trigger(3);
    }
}
