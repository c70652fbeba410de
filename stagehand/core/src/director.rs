//! Rule-driven scene controller
//!
//! A [`SceneDirector`] never switches on its own. It waits for a
//! [`Trigger`] and consults a [`RuleSet`]: the directives registered for the
//! current scene decide where to go next and whether to get there through a
//! transition.
//!
//! # Matching
//!
//! ```text
//! current is a scene        first directive of that scene whose trigger matches
//!                           ├── has a transition → switch_with_transition
//!                           └── no transition    → switch_to
//!                           no match             → ignored
//!
//! current is a transition   any directive anywhere pairing this transition
//!                           with this trigger → end the transition now
//!                           no match          → ignored
//! ```
//!
//! The second branch lets the trigger that started a transition also
//! force it to finish.

use std::cell::{Ref, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::controller::{ControllerHandle, Current, Request, Slot, Stage};
use crate::scene::SceneRef;
use crate::surface::Canvas;
use crate::transition::TransitionRef;
use crate::unit::Unit;

// =============================================================================
// Trigger
// =============================================================================

/// Abstract integer event tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Trigger(i32);

impl Trigger {
    /// Wrap a raw trigger value
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The raw trigger value
    #[must_use]
    pub const fn value(self) -> i32 {
        self.0
    }
}

impl From<i32> for Trigger {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Directive
// =============================================================================

/// A rule: on `trigger`, go to `dest`, optionally through a transition
pub struct Directive<T> {
    trigger: Trigger,
    dest: SceneRef<T>,
    transition: Option<TransitionRef<T>>,
}

impl<T> Directive<T> {
    /// Switch straight to `dest` when `trigger` fires
    #[must_use]
    pub fn new(trigger: impl Into<Trigger>, dest: SceneRef<T>) -> Self {
        Self {
            trigger: trigger.into(),
            dest,
            transition: None,
        }
    }

    /// Go through `transition` instead of switching straight
    #[must_use]
    pub fn with_transition(mut self, transition: TransitionRef<T>) -> Self {
        self.transition = Some(transition);
        self
    }

    /// Trigger this directive answers to
    #[must_use]
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Destination scene
    #[must_use]
    pub fn dest(&self) -> &SceneRef<T> {
        &self.dest
    }

    /// Transition to run on the way, if any
    #[must_use]
    pub fn transition(&self) -> Option<&TransitionRef<T>> {
        self.transition.as_ref()
    }

    fn ends(&self, running: &TransitionRef<T>, trigger: Trigger) -> bool {
        self.trigger == trigger
            && self
                .transition
                .as_ref()
                .is_some_and(|transition| transition.ptr_eq(running))
    }
}

impl<T> Clone for Directive<T> {
    fn clone(&self) -> Self {
        Self {
            trigger: self.trigger,
            dest: self.dest.clone(),
            transition: self.transition.clone(),
        }
    }
}

impl<T> fmt::Debug for Directive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Directive")
            .field("trigger", &self.trigger)
            .field("dest", &self.dest)
            .field("transition", &self.transition)
            .finish()
    }
}

// =============================================================================
// Rule Set
// =============================================================================

/// Ordered directives per scene identity
///
/// No validation happens here: a scene without directives, or a directive
/// pointing at a scene nobody registered, is legal and simply never matches.
pub struct RuleSet<T> {
    rules: HashMap<SceneRef<T>, Vec<Directive<T>>>,
}

impl<T> RuleSet<T> {
    /// Empty rule table
    #[must_use]
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Append `directive` to the directives of `scene`
    pub fn insert(&mut self, scene: SceneRef<T>, directive: Directive<T>) {
        self.rules.entry(scene).or_default().push(directive);
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn add(mut self, scene: SceneRef<T>, directive: Directive<T>) -> Self {
        self.insert(scene, directive);
        self
    }

    /// Directives registered for `scene`, in insertion order
    #[must_use]
    pub fn directives_for(&self, scene: &SceneRef<T>) -> &[Directive<T>] {
        self.rules.get(scene).map_or(&[], Vec::as_slice)
    }

    /// Remove every directive registered for `scene`
    pub fn remove(&mut self, scene: &SceneRef<T>) -> Option<Vec<Directive<T>>> {
        self.rules.remove(scene)
    }

    /// Number of scenes with directives
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check whether no scene has directives
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Every scene and its directives, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&SceneRef<T>, &[Directive<T>])> {
        self.rules
            .iter()
            .map(|(scene, directives)| (scene, directives.as_slice()))
    }

    fn first_match(&self, scene: &SceneRef<T>, trigger: Trigger) -> Option<Directive<T>> {
        self.directives_for(scene)
            .iter()
            .find(|directive| directive.trigger == trigger)
            .cloned()
    }

    fn ends(&self, running: &TransitionRef<T>, trigger: Trigger) -> bool {
        self.rules
            .values()
            .flatten()
            .any(|directive| directive.ends(running, trigger))
    }
}

impl<T> Default for RuleSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for RuleSet<T> {
    fn clone(&self) -> Self {
        Self {
            rules: self.rules.clone(),
        }
    }
}

impl<T> fmt::Debug for RuleSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter()).finish()
    }
}

// =============================================================================
// Scene Director
// =============================================================================

/// Controller that switches scenes only when a trigger matches a rule
///
/// # Examples
///
/// ```
/// use stagehand_core::{
///     Canvas, ControllerHandle, Directive, RuleSet, Scene, SceneDirector, SceneRef, Unit,
/// };
///
/// #[derive(Default)]
/// struct Room(u32);
///
/// impl Unit for Room {
///     fn tick(&mut self) -> anyhow::Result<()> { Ok(()) }
///     fn present(&mut self, _canvas: &mut Canvas) {}
///     fn resize(&mut self, w: u16, h: u16) -> (u16, u16) { (w, h) }
/// }
///
/// impl Scene<u32> for Room {
///     fn load(&mut self, state: u32, _controller: ControllerHandle<u32>) { self.0 = state; }
///     fn unload(&mut self) -> u32 { self.0 }
/// }
///
/// let hall = SceneRef::new(Room::default());
/// let kitchen = SceneRef::new(Room::default());
/// let rules = RuleSet::new().add(hall.clone(), Directive::new(2, kitchen.clone()));
///
/// let mut director = SceneDirector::new(hall.clone(), 5, rules);
/// director.process_trigger(1);
/// assert_eq!(director.current_scene(), Some(hall));
/// director.process_trigger(2);
/// assert_eq!(director.current_scene(), Some(kitchen));
/// ```
pub struct SceneDirector<T> {
    stage: Rc<Stage<T>>,
}

impl<T> SceneDirector<T> {
    /// Load `scene` with `state` and make it current under `rules`
    #[must_use]
    pub fn new(scene: SceneRef<T>, state: T, rules: RuleSet<T>) -> Self {
        Self {
            stage: Stage::install(scene, state, rules),
        }
    }

    /// React to `trigger` according to the rule table
    pub fn process_trigger(&mut self, trigger: impl Into<Trigger>) {
        self.stage.submit(Request::Trigger(trigger.into()));
    }

    /// Finish a transition: move the payload from `origin` into `dest` and
    /// make `dest` current
    pub fn return_from_transition(&mut self, dest: SceneRef<T>, origin: SceneRef<T>) {
        self.stage
            .submit(Request::ReturnFromTransition { dest, origin });
    }

    /// The rule table
    ///
    /// # Panics
    ///
    /// If called from inside a scene or transition this director is driving.
    #[must_use]
    pub fn rules(&self) -> Ref<'_, RuleSet<T>> {
        Ref::map(self.stage.slot(), |slot| &slot.rules)
    }

    /// Mutable access to the rule table
    ///
    /// # Panics
    ///
    /// If called from inside a scene or transition this director is driving.
    pub fn rules_mut(&mut self) -> RefMut<'_, RuleSet<T>> {
        RefMut::map(self.stage.slot_mut(), |slot| &mut slot.rules)
    }

    /// A handle that scenes and transitions can use to reach this director
    #[must_use]
    pub fn handle(&self) -> ControllerHandle<T> {
        self.stage.handle()
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

impl<T> Unit for SceneDirector<T> {
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

impl<T> fmt::Debug for SceneDirector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneDirector")
            .field("current", &self.current())
            .finish_non_exhaustive()
    }
}

impl<T> Slot<T> {
    pub(crate) fn process_trigger(&mut self, trigger: Trigger, handle: &ControllerHandle<T>) {
        if self.rules.is_empty() {
            tracing::debug!(%trigger, "trigger ignored, no rules registered");
            return;
        }

        let directive = match &self.current {
            Current::Transition(running) => {
                if self.rules.ends(running, trigger) {
                    tracing::debug!(
                        %trigger,
                        transition = ?running,
                        "trigger ends running transition"
                    );
                    // The commit request this produces is applied by the drain loop
                    // that is applying this trigger.
                    running.borrow_mut().end();
                } else {
                    tracing::trace!(%trigger, "trigger ignored during transition");
                }
                return;
            }
            Current::Scene(scene) => self.rules.first_match(scene, trigger),
        };

        let Some(directive) = directive else {
            tracing::trace!(%trigger, "no directive matches trigger");
            return;
        };

        tracing::debug!(%trigger, dest = ?directive.dest, "directive matched");
        let Directive {
            dest, transition, ..
        } = directive;
        match transition {
            Some(transition) => self.switch_with_transition(dest, transition, handle),
            None => self.switch_to(dest, handle),
        }
    }
}
