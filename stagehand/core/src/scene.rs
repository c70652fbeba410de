//! Scenes and the state hand-off contract
//!
//! A [`Scene`] is a [`Unit`] that can receive and give back the shared state
//! payload `T`. Controllers own the choreography: they call
//! [`Scene::unload`] on the outgoing scene and pass the result straight into
//! [`Scene::load`] on the incoming one, so the payload is never cloned and
//! never dropped between scenes.
//!
//! # Transition awareness
//!
//! A scene that wants to know it is being animated in or out implements
//! [`TransitionAware`] and returns itself from
//! [`Scene::as_transition_aware`]. The capability is queried at every
//! hand-off:
//!
//! ```text
//! switch with transition   source.pre_transition(dest)  instead of  source.unload()
//! transition commits       dest.post_transition(..)     instead of  dest.load(..)
//! ```
//!
//! # Unloading twice
//!
//! When a transition runs, the source scene is asked for its payload twice:
//! once when the transition starts (through `pre_transition` or `unload`) and
//! once more when it commits (`unload`). `unload` must therefore hand back
//! the scene's current payload every time it is called.

use std::cell::{RefCell, RefMut};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::controller::ControllerHandle;
use crate::unit::Unit;

/// A unit that participates in state hand-off
pub trait Scene<T>: Unit {
    /// Become active with `state`; keep `controller` to request switches later
    fn load(&mut self, state: T, controller: ControllerHandle<T>);

    /// Give back the current payload
    fn unload(&mut self) -> T;

    /// Opt in to transition hooks
    ///
    /// Scenes implementing [`TransitionAware`] override this to return
    /// `Some(self)`.
    fn as_transition_aware(&mut self) -> Option<&mut dyn TransitionAware<T>> {
        None
    }
}

/// Hooks that replace plain unload/load around a transition
pub trait TransitionAware<T> {
    /// Called on the source scene when a transition to `to` starts
    ///
    /// The returned payload is loaded into `to`.
    fn pre_transition(&mut self, to: &SceneRef<T>) -> T;

    /// Called on the destination scene when a transition from `from` commits
    fn post_transition(&mut self, state: T, from: &SceneRef<T>);
}

// =============================================================================
// Shared Scene Handle
// =============================================================================

/// Shared handle to a scene
///
/// Equality and hashing use the identity of the scene, not its contents, so
/// handles work as rule table keys.
///
/// # Examples
///
/// ```
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// use stagehand_core::{Canvas, ControllerHandle, Scene, SceneRef, Unit};
///
/// struct Title;
///
/// impl Unit for Title {
///     fn tick(&mut self) -> anyhow::Result<()> { Ok(()) }
///     fn present(&mut self, _canvas: &mut Canvas) {}
///     fn resize(&mut self, w: u16, h: u16) -> (u16, u16) { (w, h) }
/// }
///
/// impl Scene<u32> for Title {
///     fn load(&mut self, _state: u32, _controller: ControllerHandle<u32>) {}
///     fn unload(&mut self) -> u32 { 0 }
/// }
///
/// let title = Rc::new(RefCell::new(Title));
/// let a = SceneRef::from(title.clone());
/// let b = SceneRef::from(title.clone());
/// assert_eq!(a, b);
/// assert!(a.is(&title));
/// assert_ne!(a, SceneRef::new(Title));
/// ```
pub struct SceneRef<T>(Rc<RefCell<dyn Scene<T>>>);

impl<T> SceneRef<T> {
    /// Wrap a scene in a new shared handle
    #[must_use]
    pub fn new<S: Scene<T> + 'static>(scene: S) -> Self {
        Self(Rc::new(RefCell::new(scene)))
    }

    /// Check whether this handle points at the same scene as `scene`
    #[must_use]
    pub fn is<S>(&self, scene: &Rc<RefCell<S>>) -> bool {
        self.addr() == Rc::as_ptr(scene).cast::<()>()
    }

    /// Check whether two handles point at the same scene
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    pub(crate) fn borrow_mut(&self) -> RefMut<'_, dyn Scene<T>> {
        self.0.borrow_mut()
    }

    fn addr(&self) -> *const () {
        Rc::as_ptr(&self.0).cast::<()>()
    }
}

impl<T, S: Scene<T> + 'static> From<Rc<RefCell<S>>> for SceneRef<T> {
    fn from(scene: Rc<RefCell<S>>) -> Self {
        Self(scene)
    }
}

impl<T> Clone for SceneRef<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> PartialEq for SceneRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl<T> Eq for SceneRef<T> {}

impl<T> Hash for SceneRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl<T> fmt::Debug for SceneRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SceneRef").field(&self.addr()).finish()
    }
}

// =============================================================================
// Hand-off Helpers
// =============================================================================

/// Take the payload out of `source` for a transition towards `dest`
pub(crate) fn hand_off_to_transition<T>(source: &SceneRef<T>, dest: &SceneRef<T>) -> T {
    let mut scene = source.borrow_mut();
    if let Some(aware) = scene.as_transition_aware() {
        tracing::debug!(source = ?source, dest = ?dest, "pre-transition hand-off");
        return aware.pre_transition(dest);
    }
    scene.unload()
}

/// Move the payload from `origin` into `dest` once a transition commits
pub(crate) fn receive_from_transition<T>(
    dest: &SceneRef<T>,
    origin: &SceneRef<T>,
    controller: ControllerHandle<T>,
) {
    let state = origin.borrow_mut().unload();

    let mut scene = dest.borrow_mut();
    if let Some(aware) = scene.as_transition_aware() {
        tracing::debug!(origin = ?origin, dest = ?dest, "post-transition hand-off");
        aware.post_transition(state, origin);
        return;
    }
    scene.load(state, controller);
}
