//! Recording doubles shared by the unit tests

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::controller::ControllerHandle;
use crate::director::Trigger;
use crate::scene::{Scene, SceneRef, TransitionAware};
use crate::surface::{Block, Canvas};
use crate::transition::{Transition, TransitionBase, TransitionPhase, TransitionRef};
use crate::unit::Unit;

pub(crate) fn shared<X>(value: X) -> Rc<RefCell<X>> {
    Rc::new(RefCell::new(value))
}

/// Something a mock does through its controller handle, once
pub(crate) enum ScriptedAction {
    SwitchTo(SceneRef<u32>),
    SwitchWithTransition(SceneRef<u32>, TransitionRef<u32>),
    Trigger(i32),
}

impl ScriptedAction {
    fn perform(self, controller: &ControllerHandle<u32>) {
        match self {
            Self::SwitchTo(scene) => controller.switch_to(scene),
            Self::SwitchWithTransition(scene, transition) => {
                controller.switch_with_transition(scene, transition);
            }
            Self::Trigger(trigger) => controller.trigger(Trigger::new(trigger)),
        }
    }
}

// =============================================================================
// Scenes
// =============================================================================

/// Scene that records every call made on it
pub(crate) struct MockScene {
    pub(crate) name: &'static str,
    pub(crate) state: u32,
    pub(crate) loads: Vec<u32>,
    pub(crate) unloads: usize,
    pub(crate) ticks: usize,
    pub(crate) presents: usize,
    pub(crate) resizes: usize,
    size: Option<(u16, u16)>,
    fill: Option<Block>,
    error: Option<&'static str>,
    controller: Option<ControllerHandle<u32>>,
    on_load: Option<ScriptedAction>,
    on_tick: Option<ScriptedAction>,
}

impl MockScene {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            state: 0,
            loads: Vec::new(),
            unloads: 0,
            ticks: 0,
            presents: 0,
            resizes: 0,
            size: None,
            fill: None,
            error: None,
            controller: None,
            on_load: None,
            on_tick: None,
        }
    }

    pub(crate) fn with_size(mut self, width: u16, height: u16) -> Self {
        self.size = Some((width, height));
        self
    }

    pub(crate) fn with_fill(mut self, block: Block) -> Self {
        self.fill = Some(block);
        self
    }

    pub(crate) fn failing(mut self, message: &'static str) -> Self {
        self.error = Some(message);
        self
    }

    pub(crate) fn on_load(mut self, action: ScriptedAction) -> Self {
        self.on_load = Some(action);
        self
    }

    pub(crate) fn on_tick(mut self, action: ScriptedAction) -> Self {
        self.on_tick = Some(action);
        self
    }

    pub(crate) fn controller_attached(&self) -> bool {
        self.controller
            .as_ref()
            .is_some_and(ControllerHandle::is_attached)
    }
}

impl fmt::Debug for MockScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockScene")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Unit for MockScene {
    fn tick(&mut self) -> anyhow::Result<()> {
        self.ticks += 1;
        if let Some(message) = self.error {
            anyhow::bail!(message);
        }
        if let (Some(action), Some(controller)) = (self.on_tick.take(), &self.controller) {
            action.perform(controller);
        }
        Ok(())
    }

    fn present(&mut self, canvas: &mut Canvas) {
        self.presents += 1;
        if let Some(block) = self.fill {
            canvas.fill(block);
        }
    }

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.resizes += 1;
        self.size.unwrap_or((width, height))
    }
}

impl Scene<u32> for MockScene {
    fn load(&mut self, state: u32, controller: ControllerHandle<u32>) {
        self.state = state;
        self.loads.push(state);
        if let Some(action) = self.on_load.take() {
            action.perform(&controller);
        }
        self.controller = Some(controller);
    }

    fn unload(&mut self) -> u32 {
        self.unloads += 1;
        self.state
    }
}

/// Transition-aware scene; `pre_transition` hands on a marked payload
pub(crate) struct MockAwareScene {
    pub(crate) scene: MockScene,
    pub(crate) pre_transitions: usize,
    pub(crate) post_transitions: Vec<u32>,
}

impl MockAwareScene {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            scene: MockScene::new(name),
            pre_transitions: 0,
            post_transitions: Vec::new(),
        }
    }

    /// Payload `pre_transition` returns for a scene holding `state`
    pub(crate) fn pre_transition_state(state: u32) -> u32 {
        state + 100
    }
}

impl Unit for MockAwareScene {
    fn tick(&mut self) -> anyhow::Result<()> {
        self.scene.tick()
    }

    fn present(&mut self, canvas: &mut Canvas) {
        self.scene.present(canvas);
    }

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.scene.resize(width, height)
    }
}

impl Scene<u32> for MockAwareScene {
    fn load(&mut self, state: u32, controller: ControllerHandle<u32>) {
        self.scene.load(state, controller);
    }

    fn unload(&mut self) -> u32 {
        self.scene.unload()
    }

    fn as_transition_aware(&mut self) -> Option<&mut dyn TransitionAware<u32>> {
        Some(self)
    }
}

impl TransitionAware<u32> for MockAwareScene {
    fn pre_transition(&mut self, _to: &SceneRef<u32>) -> u32 {
        self.pre_transitions += 1;
        Self::pre_transition_state(self.scene.state)
    }

    fn post_transition(&mut self, state: u32, _from: &SceneRef<u32>) {
        self.scene.state = state;
        self.post_transitions.push(state);
    }
}

// =============================================================================
// Transitions
// =============================================================================

/// Transition that counts calls and optionally ends itself after N ticks
pub(crate) struct MockTransition {
    base: TransitionBase<u32>,
    pub(crate) starts: usize,
    pub(crate) ticks: usize,
    end_after: Option<usize>,
}

impl MockTransition {
    pub(crate) fn new() -> Self {
        Self {
            base: TransitionBase::new(),
            starts: 0,
            ticks: 0,
            end_after: None,
        }
    }

    pub(crate) fn ending_after(mut self, ticks: usize) -> Self {
        self.end_after = Some(ticks);
        self
    }
}

impl Unit for MockTransition {
    fn tick(&mut self) -> anyhow::Result<()> {
        self.ticks += 1;
        self.base.tick_scenes()?;
        if self.end_after.is_some_and(|n| self.ticks >= n) {
            self.base.end();
        }
        Ok(())
    }

    fn present(&mut self, _canvas: &mut Canvas) {}

    fn resize(&mut self, width: u16, height: u16) -> (u16, u16) {
        self.base.resize(width, height)
    }
}

impl Transition<u32> for MockTransition {
    fn start(&mut self, from: SceneRef<u32>, to: SceneRef<u32>, controller: ControllerHandle<u32>) {
        self.starts += 1;
        self.ticks = 0;
        self.base.start(from, to, controller);
    }

    fn end(&mut self) {
        self.base.end();
    }

    fn phase(&self) -> TransitionPhase {
        self.base.phase()
    }
}
