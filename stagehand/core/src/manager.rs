//! Direct-switch scene controller
//!
//! [`SceneManager`] holds exactly one current unit, a scene or a running
//! transition, and changes it only when told to. It is itself a [`Unit`]:
//! the host loop drives the manager and the manager forwards every call to
//! whatever is current.
//!
//! # Hand-off sequences
//!
//! ```text
//! switch_to(next)                    next.load(current.unload())
//! switch_with_transition(next, t)    t.start(current, next)
//!                                    next.load(current.pre_transition(next) or current.unload())
//!                                    current = t
//! return_from_transition(dest, o)    dest.post_transition(o.unload(), o) or dest.load(o.unload())
//!                                    current = dest
//! ```
//!
//! Switching while a transition is running is ignored.

use std::rc::Rc;

use crate::controller::{ControllerHandle, Current, Request, Slot, Stage};
use crate::director::RuleSet;
use crate::scene::{hand_off_to_transition, receive_from_transition, SceneRef};
use crate::surface::Canvas;
use crate::transition::TransitionRef;
use crate::unit::Unit;

/// Controller that switches scenes on explicit command
///
/// # Examples
///
/// ```
/// use stagehand_core::{Canvas, ControllerHandle, Scene, SceneManager, SceneRef, Unit};
///
/// #[derive(Default)]
/// struct Counter {
///     count: u32,
/// }
///
/// impl Unit for Counter {
///     fn tick(&mut self) -> anyhow::Result<()> {
///         self.count += 1;
///         Ok(())
///     }
///     fn present(&mut self, _canvas: &mut Canvas) {}
///     fn resize(&mut self, w: u16, h: u16) -> (u16, u16) { (w, h) }
/// }
///
/// impl Scene<u32> for Counter {
///     fn load(&mut self, state: u32, _controller: ControllerHandle<u32>) {
///         self.count = state;
///     }
///     fn unload(&mut self) -> u32 {
///         self.count
///     }
/// }
///
/// let mut manager = SceneManager::new(SceneRef::new(Counter::default()), 10);
/// manager.tick()?;
///
/// let next = SceneRef::new(Counter::default());
/// manager.switch_to(next.clone());
/// assert_eq!(manager.current_scene(), Some(next));
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct SceneManager<T> {
    stage: Rc<Stage<T>>,
}

impl<T> SceneManager<T> {
    /// Load `scene` with `state` and make it current
    #[must_use]
    pub fn new(scene: SceneRef<T>, state: T) -> Self {
        Self {
            stage: Stage::install(scene, state, RuleSet::new()),
        }
    }

    /// A handle that scenes and transitions can use to reach this manager
    #[must_use]
    pub fn handle(&self) -> ControllerHandle<T> {
        self.stage.handle()
    }

    /// Switch to `scene` immediately
    ///
    /// The payload unloaded from the current scene is loaded into `scene`.
    /// Ignored while a transition is running.
    pub fn switch_to(&mut self, scene: SceneRef<T>) {
        self.stage.submit(Request::SwitchTo(scene));
    }

    /// Start `transition` from the current scene to `scene`
    ///
    /// `scene` is loaded right away; `transition` becomes current until it
    /// commits. Ignored while another transition is running.
    pub fn switch_with_transition(&mut self, scene: SceneRef<T>, transition: TransitionRef<T>) {
        self.stage
            .submit(Request::SwitchWithTransition { scene, transition });
    }

    /// Finish a transition: move the payload from `origin` into `dest` and
    /// make `dest` current
    pub fn return_from_transition(&mut self, dest: SceneRef<T>, origin: SceneRef<T>) {
        self.stage
            .submit(Request::ReturnFromTransition { dest, origin });
    }

    /// The current unit
    #[must_use]
    pub fn current(&self) -> Current<T> {
        self.stage.current()
    }

    /// The current scene, or `None` while a transition is running
    #[must_use]
    pub fn current_scene(&self) -> Option<SceneRef<T>> {
        self.current().scene().cloned()
    }

    /// Check whether a transition is running
    #[must_use]
    pub fn is_transitioning(&self) -> bool {
        matches!(self.current(), Current::Transition(_))
    }
}

impl<T> Unit for SceneManager<T> {
    fn tick(&mut self) -> anyhow::Result<()> {
        self.stage.drive(Current::tick)
    }

    fn present(&mut self, canvas: &mut Canvas) {
        self.stage.drive(|current| current.present(canvas));
    }

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.stage.drive(|current| current.resize(width, height))
    }
}

impl<T> std::fmt::Debug for SceneManager<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneManager")
            .field("current", &self.current())
            .finish()
    }
}

// =============================================================================
// Hand-off Sequences
// =============================================================================

impl<T> Slot<T> {
    pub(crate) fn switch_to(&mut self, next: SceneRef<T>, handle: &ControllerHandle<T>) {
        let Current::Scene(current) = &self.current else {
            tracing::debug!(next = ?next, "switch_to ignored, a transition is running");
            return;
        };

        let state = current.borrow_mut().unload();
        next.borrow_mut().load(state, handle.clone());
        tracing::debug!(from = ?current, to = ?next, "switched scene");

        self.current = Current::Scene(next);
    }

    pub(crate) fn switch_with_transition(
        &mut self,
        next: SceneRef<T>,
        transition: TransitionRef<T>,
        handle: &ControllerHandle<T>,
    ) {
        let Current::Scene(source) = &self.current else {
            tracing::debug!(
                next = ?next,
                "switch_with_transition ignored, a transition is running"
            );
            return;
        };
        let source = source.clone();

        transition
            .borrow_mut()
            .start(source.clone(), next.clone(), handle.clone());
        let state = hand_off_to_transition(&source, &next);
        next.borrow_mut().load(state, handle.clone());
        tracing::debug!(from = ?source, to = ?next, transition = ?transition, "transition begun");

        self.current = Current::Transition(transition);
    }

    pub(crate) fn return_from_transition(
        &mut self,
        dest: SceneRef<T>,
        origin: SceneRef<T>,
        handle: &ControllerHandle<T>,
    ) {
        receive_from_transition(&dest, &origin, handle.clone());
        tracing::debug!(from = ?origin, to = ?dest, "returned from transition");

        self.current = Current::Scene(dest);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{shared, MockAwareScene, MockScene, MockTransition, ScriptedAction};
    use crate::transition::{Transition, TransitionPhase};
    use pretty_assertions::assert_eq;

    // =========================================================================
    // Direct Switching
    // =========================================================================

    #[test]
    fn test_new_loads_initial_scene() {
        let scene = shared(MockScene::new("first"));
        let manager = SceneManager::new(scene.clone().into(), 42);

        assert_eq!(scene.borrow().loads, vec![42]);
        assert!(scene.borrow().controller_attached());
        assert!(manager.current_scene().is_some_and(|s| s.is(&scene)));
        assert!(!manager.is_transitioning());
    }

    #[test]
    fn test_switch_to_moves_payload() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockScene::new("to"));
        let mut manager = SceneManager::new(from.clone().into(), 42);

        manager.switch_to(to.clone().into());

        assert_eq!(from.borrow().unloads, 1);
        assert_eq!(to.borrow().loads, vec![42]);
        assert!(manager.current_scene().is_some_and(|s| s.is(&to)));
    }

    #[test]
    fn test_switch_to_same_scene_reloads_it() {
        let scene = shared(MockScene::new("only"));
        let mut manager = SceneManager::new(scene.clone().into(), 5);

        manager.switch_to(scene.clone().into());

        assert_eq!(scene.borrow().loads, vec![5, 5]);
        assert_eq!(scene.borrow().unloads, 1);
    }

    #[test]
    fn test_unit_calls_are_forwarded() {
        let scene = shared(MockScene::new("first").with_size(320, 200));
        let mut manager = SceneManager::new(scene.clone().into(), 0);

        manager.tick().unwrap();
        manager.present(&mut Canvas::new(4, 4));
        assert_eq!(manager.resize(800, 600), (320, 200));

        let scene = scene.borrow();
        assert_eq!(scene.ticks, 1);
        assert_eq!(scene.presents, 1);
        assert_eq!(scene.resizes, 1);
    }

    #[test]
    fn test_tick_error_is_propagated() {
        let scene = shared(MockScene::new("broken").failing("disk on fire"));
        let mut manager = SceneManager::new(scene.into(), 0);

        let err = manager.tick().unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }

    #[test]
    fn test_scene_requests_switch_from_tick() {
        let to = shared(MockScene::new("to"));
        let from =
            shared(MockScene::new("from").on_tick(ScriptedAction::SwitchTo(to.clone().into())));
        let mut manager = SceneManager::new(from.clone().into(), 9);

        manager.tick().unwrap();

        assert!(manager.current_scene().is_some_and(|s| s.is(&to)));
        assert_eq!(to.borrow().loads, vec![9]);
    }

    #[test]
    fn test_scene_requests_transition_from_tick() {
        let to = shared(MockScene::new("to"));
        let transition = shared(MockTransition::new());
        let from = shared(MockScene::new("from").on_tick(ScriptedAction::SwitchWithTransition(
            to.clone().into(),
            transition.clone().into(),
        )));
        let mut manager = SceneManager::new(from.into(), 2);

        manager.tick().unwrap();

        assert!(manager
            .current()
            .transition()
            .is_some_and(|t| t.is(&transition)));
        assert_eq!(to.borrow().loads, vec![2]);
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    #[test]
    fn test_switch_with_transition_starts_and_loads_destination() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockScene::new("to"));
        let transition = shared(MockTransition::new());
        let mut manager = SceneManager::new(from.clone().into(), 3);

        manager.switch_with_transition(to.clone().into(), transition.clone().into());

        assert_eq!(transition.borrow().starts, 1);
        assert_eq!(to.borrow().loads, vec![3]);
        assert_eq!(from.borrow().unloads, 1);
        assert!(manager.is_transitioning());
        assert!(manager
            .current()
            .transition()
            .is_some_and(|t| t.is(&transition)));
    }

    #[test]
    fn test_commit_installs_destination() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockScene::new("to"));
        let transition = shared(MockTransition::new());
        let mut manager = SceneManager::new(from.clone().into(), 3);

        manager.switch_with_transition(to.clone().into(), transition.clone().into());
        transition.borrow_mut().end();

        assert!(manager.current_scene().is_some_and(|s| s.is(&to)));
        assert_eq!(to.borrow().loads, vec![3, 3]);
        assert_eq!(from.borrow().unloads, 2);
        assert_eq!(transition.borrow().phase(), TransitionPhase::Committed);
    }

    #[test]
    fn test_commit_from_inside_tick() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockScene::new("to"));
        let transition = shared(MockTransition::new().ending_after(2));
        let mut manager = SceneManager::new(from.into(), 1);

        manager.switch_with_transition(to.clone().into(), transition.into());
        manager.tick().unwrap();
        assert!(manager.is_transitioning());
        manager.tick().unwrap();
        assert!(manager.current_scene().is_some_and(|s| s.is(&to)));
    }

    #[test]
    fn test_switches_ignored_while_transitioning() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockScene::new("to"));
        let other = shared(MockScene::new("other"));
        let transition = shared(MockTransition::new());
        let mut manager = SceneManager::new(from.into(), 1);

        manager.switch_with_transition(to.into(), transition.clone().into());
        manager.switch_to(other.clone().into());
        manager.switch_with_transition(other.clone().into(), shared(MockTransition::new()).into());

        assert!(manager
            .current()
            .transition()
            .is_some_and(|t| t.is(&transition)));
        assert!(other.borrow().loads.is_empty());
    }

    #[test]
    fn test_aware_source_uses_pre_transition() {
        let from = shared(MockAwareScene::new("from"));
        let to = shared(MockScene::new("to"));
        let transition = shared(MockTransition::new());
        let mut manager = SceneManager::new(from.clone().into(), 4);

        manager.switch_with_transition(to.clone().into(), transition.clone().into());

        assert_eq!(from.borrow().pre_transitions, 1);
        assert_eq!(from.borrow().scene.unloads, 0);
        assert_eq!(to.borrow().loads, vec![MockAwareScene::pre_transition_state(4)]);

        transition.borrow_mut().end();
        assert_eq!(from.borrow().scene.unloads, 1);
    }

    #[test]
    fn test_aware_destination_uses_post_transition() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockAwareScene::new("to"));
        let transition = shared(MockTransition::new());
        let mut manager = SceneManager::new(from.into(), 8);

        manager.switch_with_transition(to.clone().into(), transition.clone().into());
        assert_eq!(to.borrow().post_transitions, Vec::<u32>::new());
        assert_eq!(to.borrow().scene.loads, vec![8]);

        transition.borrow_mut().end();
        assert_eq!(to.borrow().post_transitions, vec![8]);
        assert_eq!(to.borrow().scene.loads, vec![8]);
    }

    #[test]
    fn test_return_from_transition_directly() {
        let from = shared(MockScene::new("from"));
        let to = shared(MockScene::new("to"));
        let mut manager = SceneManager::new(from.clone().into(), 12);

        manager.return_from_transition(to.clone().into(), from.into());

        assert!(manager.current_scene().is_some_and(|s| s.is(&to)));
        assert_eq!(to.borrow().loads, vec![12]);
    }

    #[test]
    fn test_trigger_is_ignored_by_manager() {
        let from = shared(MockScene::new("from").on_tick(ScriptedAction::Trigger(1)));
        let mut manager = SceneManager::new(from.clone().into(), 0);
        manager.tick().unwrap();
        assert!(manager.current_scene().is_some_and(|s| s.is(&from)));
    }

    #[test]
    fn test_handle_detaches_when_manager_dropped() {
        let scene = shared(MockScene::new("first"));
        let manager = SceneManager::new(scene.clone().into(), 0);
        assert!(scene.borrow().controller_attached());
        drop(manager);
        assert!(!scene.borrow().controller_attached());
    }
}
